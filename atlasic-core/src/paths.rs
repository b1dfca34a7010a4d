//! Lexical path helpers shared by the discoverer, alias resolver and
//! extractors.
//!
//! Node ids are path strings, so a file reached by discovery and the same
//! file reached through `../x` must produce the identical string. Paths are
//! therefore normalized lexically (no symlink resolution) everywhere.

use std::path::{Component, Path, PathBuf};

/// Removes `.` components and folds `..` into the preceding component.
///
/// `..` at the root is dropped; a relative path keeps leading `..`.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Joins `rel` onto `base` and normalizes.
///
/// Unlike `Path::join`, a leading `/` in `rel` does not replace `base`.
pub fn join_normalized(base: &Path, rel: &str) -> PathBuf {
    let trimmed = rel.trim_start_matches(['/', '\\']);
    if trimmed.is_empty() {
        return normalize(base);
    }
    normalize(&base.join(trimmed))
}

/// Appends a suffix to the final component (`a/b` + `.ts` → `a/b.ts`).
pub fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut s = base.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

/// Probes `<base><ext>` then `<base>/index<ext>` for each extension in order.
pub fn probe_module(base: &Path, extensions: &[&str]) -> Option<PathBuf> {
    for ext in extensions {
        let direct = with_suffix(base, ext);
        if direct.is_file() {
            return Some(direct);
        }
        let index = base.join(format!("index{}", ext));
        if index.is_file() {
            return Some(index);
        }
    }
    None
}

/// Root-relative, forward-slash, lowercased form used for ignore matching.
pub fn relative_lowercase(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_parent_and_current() {
        assert_eq!(
            normalize(Path::new("/ws/src/./a/../b.ts")),
            PathBuf::from("/ws/src/b.ts")
        );
        assert_eq!(normalize(Path::new("/../x")), PathBuf::from("/x"));
        assert_eq!(normalize(Path::new("../x/./y")), PathBuf::from("../x/y"));
    }

    #[test]
    fn test_join_normalized_keeps_base_for_rooted_rel() {
        assert_eq!(
            join_normalized(Path::new("/ws/src"), "/utils/helper"),
            PathBuf::from("/ws/src/utils/helper")
        );
        assert_eq!(
            join_normalized(Path::new("/ws/src/app"), "../lib/b"),
            PathBuf::from("/ws/src/lib/b")
        );
        assert_eq!(join_normalized(Path::new("/ws/src"), ""), PathBuf::from("/ws/src"));
    }

    #[test]
    fn test_with_suffix() {
        assert_eq!(
            with_suffix(Path::new("/ws/a/b"), ".tsx"),
            PathBuf::from("/ws/a/b.tsx")
        );
    }

    #[test]
    fn test_relative_lowercase() {
        assert_eq!(
            relative_lowercase(Path::new("/ws"), Path::new("/ws/Src/Node_Modules/x.js")),
            "src/node_modules/x.js"
        );
    }
}
