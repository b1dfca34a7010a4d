//! Python `from X import Y` scanning.
//!
//! Relative modules count leading dots: `.` is the importing file's own
//! package directory, `..` its parent, and so on. Bare `import X` statements
//! are matched but never resolved.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use super::ExtractContext;
use crate::paths::with_suffix;

/// First segments treated as standard library and never resolved.
const STDLIB_MODULES: &[&str] = &[
    "os",
    "sys",
    "json",
    "re",
    "collections",
    "itertools",
    "typing",
    "pathlib",
    "functools",
    "datetime",
    "logging",
    "__future__",
];

fn import_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"(?m)^(?:from\s+([\w.]+)\s+)?import[ \t]+(?:\(((?:[\w, \t\r\n*]|#[^\n]*)*)\)|\(?([\w, \t*]*))")
            .expect("Hardcoded regex pattern is valid")
    })
}

/// One matched statement: the `from` module (if any) and its imported names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PyImport<'a> {
    pub module: Option<&'a str>,
    pub names: Vec<&'a str>,
}

pub(crate) fn parse_imports(content: &str) -> Vec<PyImport<'_>> {
    import_regex()
        .captures_iter(content)
        .map(|c| {
            let names = c
                .get(2)
                .or_else(|| c.get(3))
                .map(|m| split_names(m.as_str()))
                .unwrap_or_default();
            PyImport {
                module: c.get(1).map(|m| m.as_str()),
                names,
            }
        })
        .collect()
}

/// Splits an import list, which may span lines only inside closed parentheses.
fn split_names(list: &str) -> Vec<&str> {
    list.lines()
        .filter_map(|line| line.split('#').next())
        .flat_map(|line| line.split(','))
        .filter_map(|n| n.split_whitespace().next())
        .filter(|n| n.chars().all(|c| c.is_alphanumeric() || c == '_'))
        .collect()
}

pub fn extract_python(file: &Path, content: &str, ctx: &ExtractContext) -> Vec<PathBuf> {
    let package_dir = file.parent().unwrap_or_else(|| Path::new(""));
    let mut targets = Vec::new();

    for import in parse_imports(content) {
        let Some(module) = import.module else {
            continue;
        };

        if module.starts_with('.') {
            targets.extend(resolve_relative(package_dir, module, &import.names));
        } else if !is_stdlib(module) {
            targets.extend(probe_package(&join_segments(&ctx.workspace_root, module)));
        }
    }

    targets
}

fn is_stdlib(module: &str) -> bool {
    let first = module.split('.').next().unwrap_or(module);
    STDLIB_MODULES.contains(&first)
}

fn join_segments(base: &Path, dotted: &str) -> PathBuf {
    dotted
        .split('.')
        .filter(|s| !s.is_empty())
        .fold(base.to_path_buf(), |acc, seg| acc.join(seg))
}

/// Probes `<p>.py` then `<p>/__init__.py`.
fn probe_package(base: &Path) -> Option<PathBuf> {
    let module_file = with_suffix(base, ".py");
    if module_file.is_file() {
        return Some(module_file);
    }
    let init = base.join("__init__.py");
    init.is_file().then_some(init)
}

fn resolve_relative(package_dir: &Path, module: &str, names: &[&str]) -> Vec<PathBuf> {
    let dots = module.chars().take_while(|c| *c == '.').count();
    let mut dir = package_dir.to_path_buf();
    for _ in 1..dots {
        if !dir.pop() {
            return Vec::new();
        }
    }

    let rest = &module[dots..];
    if !rest.is_empty() {
        return probe_package(&join_segments(&dir, rest)).into_iter().collect();
    }

    let found: Vec<PathBuf> = names
        .iter()
        .filter_map(|name| probe_package(&dir.join(name)))
        .collect();
    if !found.is_empty() {
        return found;
    }

    let init = dir.join("__init__.py");
    if init.is_file() {
        vec![init]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::PathAliases;
    use std::fs;
    use std::sync::atomic::{AtomicU64, Ordering};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_ws(name: &str) -> PathBuf {
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "atlasic_py_{}_{}_{}",
            name,
            std::process::id(),
            id
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_names_stay_on_one_line() {
        let src = "from .a import x, y\nimport os\nfrom pkg.mod import (z as w)\n";
        let imports = parse_imports(src);
        assert_eq!(imports.len(), 3);
        assert_eq!(imports[0].module, Some(".a"));
        assert_eq!(imports[0].names, vec!["x", "y"]);
        assert_eq!(imports[1].module, None);
        assert_eq!(imports[1].names, vec!["os"]);
        assert_eq!(imports[2].module, Some("pkg.mod"));
        assert_eq!(imports[2].names, vec!["z"]);
    }

    #[test]
    fn test_parenthesized_names_across_lines() {
        let src = "from .models import (\n    User,  # the account\n    Group,\n)\nimport os\n";
        let imports = parse_imports(src);
        assert_eq!(imports.len(), 2);
        assert_eq!(imports[0].module, Some(".models"));
        assert_eq!(imports[0].names, vec!["User", "Group"]);
        assert_eq!(imports[1].names, vec!["os"]);
    }

    #[test]
    fn test_unclosed_paren_does_not_swallow_next_line() {
        let imports = parse_imports("from a import (\nfrom b import c\nprint(b.c)\n");
        assert_eq!(imports.len(), 2);
        assert_eq!(imports[0].module, Some("a"));
        assert!(imports[0].names.is_empty());
        assert_eq!(imports[1].module, Some("b"));
        assert_eq!(imports[1].names, vec!["c"]);
    }

    #[test]
    fn test_black_formatted_relative_import_resolves() {
        let ws = temp_ws("black");
        touch(&ws.join("pkg/x.py"));
        touch(&ws.join("pkg/models.py"));
        touch(&ws.join("pkg/__init__.py"));
        let ctx = ExtractContext::new(&ws, PathAliases::default());

        let src = "from .models import (\n    User,\n)\nfrom . import (\n    models,\n)\n";
        let deps = extract_python(&ws.join("pkg/x.py"), src, &ctx);
        assert_eq!(deps, vec![ws.join("pkg/models.py"), ws.join("pkg/models.py")]);
        fs::remove_dir_all(&ws).ok();
    }

    #[test]
    fn test_from_dot_import_sibling() {
        let ws = temp_ws("sibling");
        touch(&ws.join("pkg/x.py"));
        touch(&ws.join("pkg/y.py"));
        let ctx = ExtractContext::new(&ws, PathAliases::default());

        let deps = extract_python(&ws.join("pkg/x.py"), "from . import y\n", &ctx);
        assert_eq!(deps, vec![ws.join("pkg/y.py")]);
        fs::remove_dir_all(&ws).ok();
    }

    #[test]
    fn test_from_dot_falls_back_to_init() {
        let ws = temp_ws("init");
        touch(&ws.join("pkg/__init__.py"));
        let ctx = ExtractContext::new(&ws, PathAliases::default());

        let deps = extract_python(&ws.join("pkg/x.py"), "from . import CONSTANT\n", &ctx);
        assert_eq!(deps, vec![ws.join("pkg/__init__.py")]);
        fs::remove_dir_all(&ws).ok();
    }

    #[test]
    fn test_parent_relative_module() {
        let ws = temp_ws("parent");
        touch(&ws.join("app/core/models.py"));
        touch(&ws.join("app/util/__init__.py"));
        let ctx = ExtractContext::new(&ws, PathAliases::default());

        let src = "from ..core.models import User\nfrom ..util import fmt\n";
        let deps = extract_python(&ws.join("app/views/home.py"), src, &ctx);
        assert_eq!(
            deps,
            vec![ws.join("app/core/models.py"), ws.join("app/util/__init__.py")]
        );
        fs::remove_dir_all(&ws).ok();
    }

    #[test]
    fn test_absolute_project_import_and_stdlib_skip() {
        let ws = temp_ws("abs");
        touch(&ws.join("services/billing.py"));
        touch(&ws.join("os/path.py"));
        let ctx = ExtractContext::new(&ws, PathAliases::default());

        let src = "from services.billing import charge\nfrom os.path import join\nimport services\n";
        let deps = extract_python(&ws.join("main.py"), src, &ctx);
        assert_eq!(deps, vec![ws.join("services/billing.py")]);
        fs::remove_dir_all(&ws).ok();
    }
}
