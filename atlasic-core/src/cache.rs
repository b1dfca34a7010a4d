//! Best-effort graph snapshot cache under `<root>/.atlasic/`.
//!
//! The cache holds the last generated [`CodebaseGraph`] verbatim as pretty
//! JSON, plus arbitrary named JSON blobs (e.g. `git-heat.json`). Writes go
//! through a temp file and a rename so readers never see a partial file.
//! Reads never fail: anything unreadable is a cache miss.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{AtlasicError, AtlasicResult, IoResultExt};
use crate::types::CodebaseGraph;

/// Directory under the workspace root holding all cache files.
pub const CACHE_DIR: &str = ".atlasic";

/// File name of the graph snapshot.
pub const GRAPH_CACHE_FILE: &str = "graph-cache.json";

/// Maximum snapshot size (50MB); larger graphs are not cached.
const MAX_CACHE_SIZE_BYTES: usize = 50_000_000;

pub fn cache_dir(workspace_root: &Path) -> PathBuf {
    workspace_root.join(CACHE_DIR)
}

pub fn graph_cache_path(workspace_root: &Path) -> PathBuf {
    cache_dir(workspace_root).join(GRAPH_CACHE_FILE)
}

/// Writes `bytes` to `path` via a uniquely named temp file and a rename.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .with_context(|| format!("Cache path has no parent: {}", path.display()))?;
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create cache directory: {}", dir.display()))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let temp_path = dir.join(format!("{}.{}.{}.tmp", file_name, std::process::id(), nanos));

    fs::write(&temp_path, bytes)
        .with_context(|| format!("Failed to write temp cache file: {}", temp_path.display()))?;

    fs::rename(&temp_path, path).with_context(|| {
        let _ = fs::remove_file(&temp_path);
        format!("Failed to rename cache file to: {}", path.display())
    })?;

    Ok(())
}

/// Saves the graph snapshot.
pub fn save_graph(workspace_root: &Path, graph: &CodebaseGraph) -> Result<()> {
    let path = graph_cache_path(workspace_root);
    let json = serde_json::to_string_pretty(graph).context("Failed to serialize graph")?;

    if json.len() > MAX_CACHE_SIZE_BYTES {
        warn!(
            bytes = json.len(),
            limit = MAX_CACHE_SIZE_BYTES,
            "graph exceeds cache size limit, dropping snapshot"
        );
        let _ = fs::remove_file(&path);
        return Ok(());
    }

    write_atomic(&path, json.as_bytes())?;
    debug!(path = %path.display(), nodes = graph.nodes.len(), "graph cached");
    Ok(())
}

/// Reads the graph snapshot, distinguishing "absent" from "unreadable".
pub fn read_graph(workspace_root: &Path) -> AtlasicResult<Option<CodebaseGraph>> {
    let path = graph_cache_path(workspace_root);
    if !path.exists() {
        return Ok(None);
    }

    let text = fs::read_to_string(&path).with_path(&path)?;
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|e| AtlasicError::cache(format!("{}: {}", path.display(), e)))
}

/// Loads the graph snapshot; `None` when absent or unreadable.
pub fn load_graph(workspace_root: &Path) -> Option<CodebaseGraph> {
    match read_graph(workspace_root) {
        Ok(graph) => graph,
        Err(e) => {
            warn!(error = %e, "error loading cached graph, ignoring");
            None
        }
    }
}

/// Deletes the graph snapshot. Returns whether a file was removed.
pub fn clear_cache(workspace_root: &Path) -> Result<bool> {
    let path = graph_cache_path(workspace_root);
    match fs::remove_file(&path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
    }
}

/// Saves a named JSON blob next to the graph snapshot.
pub fn save_json<T: Serialize>(workspace_root: &Path, name: &str, value: &T) -> Result<()> {
    let path = cache_dir(workspace_root).join(name);
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {}", name))?;
    write_atomic(&path, json.as_bytes())
}

/// Loads a named JSON blob; `None` when absent or unreadable.
pub fn load_json<T: DeserializeOwned>(workspace_root: &Path, name: &str) -> Option<T> {
    let path = cache_dir(workspace_root).join(name);
    let text = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&text) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cached blob is corrupt, ignoring");
            None
        }
    }
}
