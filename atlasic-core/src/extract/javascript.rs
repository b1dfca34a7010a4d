//! JS/TS import scanning: static `import`, `require()` and dynamic `import()`.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use super::ExtractContext;
use crate::paths::{join_normalized, probe_module};

const ALIAS_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".js", ".jsx", ".vue"];
const RELATIVE_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".js", ".jsx", ".vue", ".py"];

fn static_import_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r#"import\s+(?:[\w\s{},*]+\s+from\s+)?['"]([^'"]+)['"]"#)
            .expect("Hardcoded regex pattern is valid")
    })
}

fn require_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r#"require\s*\(['"]([^'"]+)['"]\)"#).expect("Hardcoded regex pattern is valid")
    })
}

fn dynamic_import_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r#"import\s*\(['"]([^'"]+)['"]\)"#).expect("Hardcoded regex pattern is valid")
    })
}

/// Project-local specifiers only; bare package names are external.
fn is_local_specifier(specifier: &str) -> bool {
    specifier.starts_with('.') || specifier.starts_with('/') || specifier.starts_with("@/")
}

/// Specifiers in collection order: static imports, then `require`, then
/// dynamic imports.
pub(crate) fn import_specifiers(content: &str) -> Vec<&str> {
    [static_import_regex(), require_regex(), dynamic_import_regex()]
        .into_iter()
        .flat_map(|re| {
            re.captures_iter(content)
                .filter_map(|c| c.get(1).map(|m| m.as_str()))
        })
        .collect()
}

pub fn extract_javascript(file: &Path, content: &str, ctx: &ExtractContext) -> Vec<PathBuf> {
    let from_dir = file.parent().unwrap_or_else(|| Path::new(""));

    import_specifiers(content)
        .into_iter()
        .filter(|s| is_local_specifier(s))
        .filter_map(|s| resolve_specifier(from_dir, s, ctx))
        .collect()
}

fn resolve_specifier(from_dir: &Path, specifier: &str, ctx: &ExtractContext) -> Option<PathBuf> {
    for (alias_dir, rest) in ctx.aliases.candidates(specifier) {
        let base = join_normalized(alias_dir, rest);
        if let Some(found) = probe_module(&base, ALIAS_EXTENSIONS) {
            return Some(found);
        }
    }

    if specifier.starts_with('.') {
        let base = join_normalized(from_dir, specifier);
        return probe_module(&base, RELATIVE_EXTENSIONS);
    }

    None
}
