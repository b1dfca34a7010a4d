//! Go import scanning: parenthesized blocks and single quoted imports.
//!
//! An import path maps to a directory under the workspace root; the first
//! `.go` file in it (by name) stands in for the package.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use super::ExtractContext;

fn import_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r#"import\s+(?:\(([^)]+)\)|"([^"]+)")"#)
            .expect("Hardcoded regex pattern is valid")
    })
}

fn quoted_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r#""([^"]+)""#).expect("Hardcoded regex pattern is valid"))
}

/// Import paths in source order; blocks contribute every quoted string.
pub(crate) fn import_paths(content: &str) -> Vec<&str> {
    let mut paths = Vec::new();
    for caps in import_regex().captures_iter(content) {
        if let Some(block) = caps.get(1) {
            paths.extend(
                quoted_regex()
                    .captures_iter(block.as_str())
                    .filter_map(|c| c.get(1).map(|m| m.as_str())),
            );
        } else if let Some(single) = caps.get(2) {
            paths.push(single.as_str());
        }
    }
    paths
}

/// Reads the `module` directive of a go.mod file.
pub fn parse_go_module(go_mod: &str) -> Option<String> {
    go_mod.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let module = rest.trim().trim_matches('"');
        (!module.is_empty()).then(|| module.to_string())
    })
}

pub fn extract_go(content: &str, ctx: &ExtractContext) -> Vec<PathBuf> {
    import_paths(content)
        .into_iter()
        .filter(|p| p.contains('/'))
        .filter_map(|p| resolve_import(p, ctx))
        .collect()
}

fn resolve_import(import: &str, ctx: &ExtractContext) -> Option<PathBuf> {
    if let Some(found) = first_go_file(&ctx.workspace_root.join(import)) {
        return Some(found);
    }

    let module = ctx.go_module.as_deref()?;
    let local = import.strip_prefix(module)?.strip_prefix('/')?;
    first_go_file(&ctx.workspace_root.join(local))
}

fn first_go_file(dir: &Path) -> Option<PathBuf> {
    let mut go_files: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "go"))
        .collect();
    go_files.sort();
    go_files.into_iter().next()
}
