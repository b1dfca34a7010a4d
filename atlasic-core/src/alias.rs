//! Import path aliases from a tsconfig-style `compilerOptions.paths` table.
//!
//! tsconfig files are JSON with comments and trailing commas. Glob values such
//! as `"src/**/*.ts"` contain `/*` and `*/`, so a regex-based comment stripper
//! corrupts them. [`sanitize_jsonc`] instead tracks string boundaries and
//! only treats `//` and `/* */` as comments outside string literals.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::PATH_ALIAS_LOCATIONS;
use crate::error::{AtlasicError, AtlasicResult, IoResultExt};
use crate::paths::{join_normalized, normalize};

/// Strips comments, then trailing commas, respecting string literals.
pub fn sanitize_jsonc(content: &str) -> String {
    remove_trailing_commas(&strip_comments(content))
}

fn strip_comments(content: &str) -> String {
    let chars: Vec<char> = content.chars().collect();
    let mut out = String::with_capacity(content.len());
    let mut quote: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(n) = next {
                    out.push(n);
                    i += 1;
                }
            } else if c == q {
                quote = None;
            }
            i += 1;
            continue;
        }

        match (c, next) {
            ('"', _) | ('\'', _) => {
                quote = Some(c);
                out.push(c);
                i += 1;
            }
            ('/', Some('/')) => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            ('/', Some('*')) => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i += 2;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

fn remove_trailing_commas(content: &str) -> String {
    let chars: Vec<char> = content.chars().collect();
    let mut out = String::with_capacity(content.len());
    let mut quote: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(&n) = chars.get(i + 1) {
                    out.push(n);
                    i += 1;
                }
            } else if c == q {
                quote = None;
            }
            i += 1;
            continue;
        }

        if c == '"' || c == '\'' {
            quote = Some(c);
        } else if c == ',' {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if matches!(chars.get(j), Some('}') | Some(']')) {
                i += 1;
                continue;
            }
        }
        out.push(c);
        i += 1;
    }

    out
}

/// Alias prefix → absolute directory, ordered longest alias first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathAliases {
    entries: Vec<(String, PathBuf)>,
}

impl PathAliases {
    pub fn new(mut entries: Vec<(String, PathBuf)>) -> Self {
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        Self { entries }
    }

    /// Finds and parses the first alias config under `workspace_root`.
    ///
    /// Never fails: a missing or malformed config yields an empty table.
    pub fn load(workspace_root: &Path) -> Self {
        let Some(config_path) = PATH_ALIAS_LOCATIONS
            .iter()
            .map(|loc| workspace_root.join(loc))
            .find(|p| p.is_file())
        else {
            return Self::default();
        };

        match Self::from_config_file(&config_path) {
            Ok(aliases) => {
                debug!(config = %config_path.display(), count = aliases.len(), "loaded path aliases");
                aliases
            }
            Err(e) => {
                warn!(config = %config_path.display(), error = %e, "error loading path aliases");
                Self::default()
            }
        }
    }

    /// Parses one config file; relative targets resolve against its directory.
    pub fn from_config_file(config_path: &Path) -> AtlasicResult<Self> {
        let content = fs::read_to_string(config_path).with_path(config_path)?;
        let config_dir = config_path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_config_str(&content, config_dir)
            .map_err(|message| AtlasicError::config(config_path, message))
    }

    fn from_config_str(content: &str, config_dir: &Path) -> Result<Self, String> {
        let json: Value =
            serde_json::from_str(&sanitize_jsonc(content)).map_err(|e| e.to_string())?;

        let Some(paths) = json
            .get("compilerOptions")
            .and_then(|c| c.get("paths"))
            .and_then(Value::as_object)
        else {
            return Ok(Self::default());
        };

        let mut entries = Vec::with_capacity(paths.len());
        for (alias, targets) in paths {
            let Some(first) = targets
                .as_array()
                .and_then(|a| a.first())
                .and_then(Value::as_str)
            else {
                continue;
            };

            let clean_alias = alias.strip_suffix("/*").unwrap_or(alias).to_string();
            let clean_target = first.strip_suffix("/*").unwrap_or(first);
            let target = Path::new(clean_target);
            let resolved = if target.is_absolute() {
                normalize(target)
            } else {
                join_normalized(config_dir, clean_target)
            };
            entries.push((clean_alias, resolved));
        }

        Ok(Self::new(entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every alias that prefixes `specifier`, paired with the remainder.
    pub fn candidates<'a>(
        &'a self,
        specifier: &'a str,
    ) -> impl Iterator<Item = (&'a Path, &'a str)> + 'a {
        self.entries.iter().filter_map(move |(alias, dir)| {
            specifier
                .strip_prefix(alias.as_str())
                .map(|rest| (dir.as_path(), rest))
        })
    }

    pub fn get(&self, alias: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(a, _)| a == alias)
            .map(|(_, p)| p.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_inside_string_survives() {
        let input = r#"{ "include": ["src/**/*.ts"], "exclude": ["a/*/b"] }"#;
        assert_eq!(sanitize_jsonc(input), input);
    }

    #[test]
    fn test_comments_outside_strings_removed() {
        let input = "{\n  // line comment\n  \"a\": 1, /* block */ \"b\": \"//not a comment\"\n}";
        let out = sanitize_jsonc(input);
        assert!(!out.contains("line comment"));
        assert!(!out.contains("block"));
        assert!(out.contains("\"//not a comment\""));
        let v: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["b"], "//not a comment");
    }

    #[test]
    fn test_trailing_commas_removed() {
        let input = "{ \"a\": [1, 2, ], \"b\": { \"c\": 1, },\n}";
        let v: Value = serde_json::from_str(&sanitize_jsonc(input)).unwrap();
        assert_eq!(v["a"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_comma_inside_string_before_brace_kept() {
        let input = r#"{ "a": "x, }" }"#;
        assert_eq!(sanitize_jsonc(input), input);
    }

    #[test]
    fn test_escaped_quote_does_not_end_string() {
        let input = r#"{ "a": "say \"/* hi */\"" }"#;
        assert_eq!(sanitize_jsonc(input), input);
    }

    #[test]
    fn test_parse_paths_table() {
        let cfg = r#"{
            // aliases
            "compilerOptions": {
                "baseUrl": ".",
                "paths": {
                    "@/*": ["src/*"],
                    "@components/*": ["src/components/*",],
                    "/abs/*": ["/opt/shared/*"],
                    "broken": [],
                },
            },
        }"#;
        let aliases = PathAliases::from_config_str(cfg, Path::new("/ws")).unwrap();
        assert_eq!(aliases.len(), 3);
        assert_eq!(aliases.get("@"), Some(Path::new("/ws/src")));
        assert_eq!(aliases.get("@components"), Some(Path::new("/ws/src/components")));
        assert_eq!(aliases.get("/abs"), Some(Path::new("/opt/shared")));
    }

    #[test]
    fn test_candidates_longest_first() {
        let aliases = PathAliases::new(vec![
            ("@".to_string(), PathBuf::from("/ws/src")),
            ("@components".to_string(), PathBuf::from("/ws/src/components")),
        ]);
        let found: Vec<_> = aliases.candidates("@components/Button").collect();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0], (Path::new("/ws/src/components"), "/Button"));
        assert_eq!(found[1], (Path::new("/ws/src"), "components/Button"));
    }

    #[test]
    fn test_malformed_config_is_error_not_panic() {
        assert!(PathAliases::from_config_str("{ not json", Path::new("/ws")).is_err());
    }

    #[test]
    fn test_load_missing_config_is_empty() {
        let dir = std::env::temp_dir().join(format!("atlasic_alias_none_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        assert!(PathAliases::load(&dir).is_empty());
        fs::remove_dir_all(&dir).ok();
    }
}
