//! Java `import a.b.C;` scanning against the workspace root.

use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;

use super::ExtractContext;
use crate::paths::with_suffix;

fn import_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"import\s+([a-zA-Z0-9_.]+)(?:\s*\.\*)?;")
            .expect("Hardcoded regex pattern is valid")
    })
}

pub fn extract_java(content: &str, ctx: &ExtractContext) -> Vec<PathBuf> {
    import_regex()
        .captures_iter(content)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .filter(|p| !p.starts_with("java.") && !p.starts_with("javax.") && !p.starts_with('.'))
        .filter_map(|p| {
            let base = p
                .split('.')
                .filter(|s| !s.is_empty())
                .fold(ctx.workspace_root.clone(), |acc, seg| acc.join(seg));
            let file = with_suffix(&base, ".java");
            file.is_file().then_some(file)
        })
        .collect()
}
