//! Generator defaults and configuration loading from atlasic.toml.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Path fragments skipped during discovery (case-insensitive substring match).
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "node_modules",
    "dist",
    "build",
    ".git",
    "__pycache__",
    ".venv",
    ".next",
    "out",
    "coverage",
    ".vscode",
    ".idea",
    ".cache",
];

/// Extensions collected by discovery. C/C++/Rust files become nodes but have
/// no extractor.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    ".ts", ".tsx", ".js", ".jsx", ".py", ".java", ".go", ".c", ".h", ".cpp", ".hpp", ".rs",
];

pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Candidate alias-config locations relative to the workspace root, in
/// priority order.
pub const PATH_ALIAS_LOCATIONS: &[&str] = &[
    "tsconfig.json",
    "frontend/tsconfig.json",
    "src/frontend/tsconfig.json",
];

/// Name of the optional per-workspace configuration file.
pub const CONFIG_FILE_NAME: &str = "atlasic.toml";

pub const DEFAULT_HEAT_WINDOW_DAYS: u32 = 90;

/// Inputs to a graph build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub ignore_patterns: Vec<String>,
    pub max_depth: usize,
    /// Extensions with their leading dot, e.g. `.ts`.
    pub extensions: Vec<String>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            ignore_patterns: DEFAULT_IGNORE_PATTERNS.iter().map(|s| s.to_string()).collect(),
            max_depth: DEFAULT_MAX_DEPTH,
            extensions: SUPPORTED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Main configuration structure for atlasic.toml.
#[derive(Debug, Deserialize, Default)]
pub struct AtlasicConfig {
    /// Replaces the default ignore patterns when present.
    pub ignore: Option<Vec<String>>,
    /// Appended to whichever ignore list is in effect.
    pub extra_ignore: Option<Vec<String>>,
    pub max_depth: Option<usize>,
    /// Replaces the default extension list when present.
    pub extensions: Option<Vec<String>>,
    pub cache: Option<CacheConfig>,
    pub heat: Option<HeatConfig>,
}

/// Cache configuration.
#[derive(Debug, Deserialize, Default)]
pub struct CacheConfig {
    pub enabled: Option<bool>,
}

/// Git heat configuration.
#[derive(Debug, Deserialize, Default)]
pub struct HeatConfig {
    /// History window passed to `git log --since`.
    pub window_days: Option<u32>,
}

impl AtlasicConfig {
    /// Merges this file's settings over the defaults.
    pub fn generator_options(&self) -> GeneratorOptions {
        let mut opts = GeneratorOptions::default();
        if let Some(ignore) = &self.ignore {
            opts.ignore_patterns = ignore.clone();
        }
        if let Some(extra) = &self.extra_ignore {
            opts.ignore_patterns.extend(extra.iter().cloned());
        }
        if let Some(depth) = self.max_depth {
            opts.max_depth = depth;
        }
        if let Some(exts) = &self.extensions {
            opts.extensions = exts.iter().map(|e| normalize_extension(e)).collect();
        }
        opts
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache.as_ref().and_then(|c| c.enabled).unwrap_or(true)
    }

    pub fn heat_window_days(&self) -> u32 {
        self.heat
            .as_ref()
            .and_then(|h| h.window_days)
            .unwrap_or(DEFAULT_HEAT_WINDOW_DAYS)
    }
}

/// Lowercases and guarantees a leading dot (`TS` → `.ts`).
pub fn normalize_extension(ext: &str) -> String {
    let lower = ext.trim().to_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{}", lower)
    }
}

/// Loads configuration from atlasic.toml if it exists.
pub fn load_config(root: &Path) -> Result<Option<AtlasicConfig>> {
    let path = root.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let cfg = toml::from_str(&content).context("Invalid atlasic.toml")?;
    Ok(Some(cfg))
}
