//! Git "heat": how often each file was touched within a history window.
//!
//! Counting streams `git log --name-only --pretty=format:COMMIT:%H` line by
//! line, so large histories never sit in memory at once.

use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::render::color::HeatScores;

/// Cache blob name used by hosts that persist heat results.
pub const HEAT_CACHE_FILE: &str = "git-heat.json";

const COMMIT_MARKER: &str = "COMMIT:";

/// Outcome of one heat computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHeat {
    pub metric: String,
    pub window_days: u32,
    /// HEAD commit the counts were taken at.
    pub head: String,
    pub scores_by_abs_path: HashMap<String, u32>,
    pub max_score: u32,
}

impl GitHeat {
    /// Converts relative touch counts into absolute-path scores.
    pub fn from_relative(
        repo_root: &Path,
        window_days: u32,
        head: impl Into<String>,
        relative: HashMap<String, u32>,
    ) -> Self {
        let scores_by_abs_path: HashMap<String, u32> = relative
            .into_iter()
            .map(|(rel, count)| {
                let abs = rel
                    .split('/')
                    .filter(|s| !s.is_empty())
                    .fold(repo_root.to_path_buf(), |acc, seg| acc.join(seg));
                (abs.to_string_lossy().to_string(), count)
            })
            .collect();
        let max_score = scores_by_abs_path.values().copied().max().unwrap_or(0);

        Self {
            metric: "touches".to_string(),
            window_days,
            head: head.into(),
            scores_by_abs_path,
            max_score,
        }
    }

    pub fn to_scores(&self) -> HeatScores {
        HeatScores::new(
            self.scores_by_abs_path
                .iter()
                .map(|(k, v)| (k.clone(), f64::from(*v)))
                .collect(),
        )
    }
}

/// Counts path lines in `git log --name-only` output.
///
/// Blank lines, commit markers and `.gitattributes` are skipped.
pub fn count_touches<R: BufRead>(reader: R) -> Result<HashMap<String, u32>> {
    let mut counts: HashMap<String, u32> = HashMap::new();
    for line in reader.lines() {
        let line = line.context("Failed to read git log output")?;
        let s = line.trim();
        if s.is_empty() || s.starts_with(COMMIT_MARKER) || s == ".gitattributes" {
            continue;
        }
        *counts.entry(s.to_string()).or_insert(0) += 1;
    }
    Ok(counts)
}

fn run_git(args: &[&str], cwd: &Path) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .output()
        .with_context(|| format!("Failed to run git {}", args.join(" ")))?;
    if !output.status.success() {
        bail!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Top-level directory of the repository containing `workspace_root`.
pub fn repo_root(workspace_root: &Path) -> Result<PathBuf> {
    run_git(&["rev-parse", "--show-toplevel"], workspace_root).map(PathBuf::from)
}

pub fn head_commit(repo_root: &Path) -> Result<String> {
    run_git(&["rev-parse", "HEAD"], repo_root)
}

/// Streams `git log` for the last `window_days` days and counts touches.
pub fn compute_touches(repo_root: &Path, window_days: u32) -> Result<HashMap<String, u32>> {
    let since = format!("--since={}.days", window_days);
    let mut child = Command::new("git")
        .args([
            "-c",
            "core.quotepath=false",
            "log",
            "--name-only",
            since.as_str(),
            "--pretty=format:COMMIT:%H",
        ])
        .current_dir(repo_root)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .context("Failed to spawn git log")?;

    let counts = collect_touches(&mut child)?;
    debug!(files = counts.len(), window_days, "counted git touches");
    Ok(counts)
}

/// Counts touches from a running `git log`, always reaping the child.
fn collect_touches(child: &mut Child) -> Result<HashMap<String, u32>> {
    let counted = match child.stdout.take() {
        Some(stdout) => count_touches(BufReader::new(stdout)),
        None => Err(anyhow::anyhow!("git log produced no stdout")),
    };

    let counts = match counted {
        Ok(counts) => counts,
        Err(e) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(e);
        }
    };

    let status = child.wait().context("Failed to wait for git log")?;
    if !status.success() {
        bail!("git log failed with {}", status);
    }
    Ok(counts)
}

/// Full heat computation for the repository around `workspace_root`.
pub fn compute_heat(workspace_root: &Path, window_days: u32) -> Result<GitHeat> {
    let root = repo_root(workspace_root)?;
    let head = head_commit(&root)?;
    let relative = compute_touches(&root, window_days)?;
    Ok(GitHeat::from_relative(&root, window_days, head, relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const LOG: &str = "COMMIT:aaa\nsrc/a.ts\nsrc/b.ts\n\nCOMMIT:bbb\nsrc/a.ts\n.gitattributes\n\nCOMMIT:ccc\n  src/a.ts  \n";

    #[cfg(unix)]
    #[test]
    fn test_read_error_still_reaps_child() {
        let mut child = Command::new("sh")
            .args(["-c", "printf 'src/a.ts\\n\\377\\376\\n'; exec sleep 30"])
            .stdout(Stdio::piped())
            .spawn()
            .unwrap();

        assert!(collect_touches(&mut child).is_err());
        assert!(child.try_wait().unwrap().is_some());
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_log_is_error() {
        let mut child = Command::new("sh")
            .args(["-c", "printf 'src/a.ts\\n'; exit 3"])
            .stdout(Stdio::piped())
            .spawn()
            .unwrap();

        assert!(collect_touches(&mut child).is_err());
    }

    #[test]
    fn test_count_touches() {
        let counts = count_touches(Cursor::new(LOG)).unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts["src/a.ts"], 3);
        assert_eq!(counts["src/b.ts"], 1);
    }

    #[test]
    fn test_from_relative_builds_absolute_keys() {
        let counts = count_touches(Cursor::new(LOG)).unwrap();
        let heat = GitHeat::from_relative(Path::new("/repo"), 90, "ccc", counts);
        let a = Path::new("/repo").join("src").join("a.ts");
        assert_eq!(heat.scores_by_abs_path[&a.to_string_lossy().to_string()], 3);
        assert_eq!(heat.max_score, 3);
        assert_eq!(heat.metric, "touches");

        let scores = heat.to_scores();
        assert_eq!(scores.max, 3.0);
        assert_eq!(scores.score(&a.to_string_lossy()), 3.0);
    }

    #[test]
    fn test_empty_log() {
        let counts = count_touches(Cursor::new("")).unwrap();
        let heat = GitHeat::from_relative(Path::new("/repo"), 30, "", counts);
        assert_eq!(heat.max_score, 0);
        assert!(heat.scores_by_abs_path.is_empty());
    }

    #[test]
    fn test_serializes_camel_case() {
        let heat = GitHeat::from_relative(Path::new("/repo"), 7, "abc", HashMap::new());
        let json = serde_json::to_value(&heat).unwrap();
        assert_eq!(json["windowDays"], 7);
        assert!(json.get("scoresByAbsPath").is_some());
    }
}
