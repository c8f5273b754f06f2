//! Dotted module names from file paths and relative import specs.

use std::path::{Component, Path};

/// Module name for a file path relative to the source root.
///
/// Returns the name and whether the file is a package `__init__`.
/// `pkg/sub/a.py` → `pkg.sub.a`, `pkg/__init__.py` → `pkg`.
pub fn module_name(rel_path: &Path) -> (String, bool) {
    let mut parts: Vec<String> = rel_path
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str().map(String::from),
            _ => None,
        })
        .collect();
    let Some(file) = parts.pop() else {
        return (String::new(), false);
    };

    let stem = file
        .strip_suffix(".pyi")
        .or_else(|| file.strip_suffix(".py"))
        .unwrap_or(&file);
    let is_package = stem == "__init__";
    if !is_package || parts.is_empty() {
        parts.push(stem.to_string());
    }
    (parts.join("."), is_package)
}

/// Absolute module targeted by a relative import such as `..models` seen from `current`.
pub fn resolve_relative(current: &str, is_package: bool, target: &str) -> String {
    let dots = target.chars().take_while(|&c| c == '.').count();
    let rest = &target[dots..];
    if dots == 0 {
        return rest.to_string();
    }

    let mut parts: Vec<&str> = current.split('.').filter(|p| !p.is_empty()).collect();
    // a single dot names the package containing `current`
    let drop = if is_package { dots - 1 } else { dots };
    parts.truncate(parts.len().saturating_sub(drop));
    if !rest.is_empty() {
        parts.push(rest);
    }
    parts.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_name() {
        assert_eq!(module_name(Path::new("pkg/sub/a.py")), ("pkg.sub.a".to_string(), false));
        assert_eq!(module_name(Path::new("pkg/__init__.py")), ("pkg".to_string(), true));
        assert_eq!(module_name(Path::new("stubs.pyi")), ("stubs".to_string(), false));
        assert_eq!(module_name(Path::new("./top.py")), ("top".to_string(), false));
    }

    #[test]
    fn test_resolve_relative_from_module() {
        assert_eq!(resolve_relative("pkg.sub.a", false, ".b"), "pkg.sub.b");
        assert_eq!(resolve_relative("pkg.sub.a", false, "..core"), "pkg.core");
        assert_eq!(resolve_relative("pkg.sub.a", false, "."), "pkg.sub");
        assert_eq!(resolve_relative("pkg.sub.a", false, "os.path"), "os.path");
    }

    #[test]
    fn test_resolve_relative_from_package() {
        assert_eq!(resolve_relative("pkg.sub", true, ".a"), "pkg.sub.a");
        assert_eq!(resolve_relative("pkg.sub", true, "..core"), "pkg.core");
    }
}
