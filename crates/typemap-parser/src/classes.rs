//! Extract class declarations and imports from a Python module.

use crate::modules::{module_name, resolve_relative};
use crate::treesitter::parse_python;
use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tree_sitter::Node;

/// A class statement and the base expressions it lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    /// Dotted path within the module: `Outer.Inner` for nested classes.
    pub qualname: String,
    /// Base expressions as written, whitespace removed: `Base`, `abc.ABC`.
    pub bases: Vec<String>,
    /// Zero-based line of the `class` keyword.
    pub line: usize,
}

/// What a name bound by an import statement refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Import {
    /// `import m` / `import m as n`
    Module(String),
    /// `from m import X` / `from m import X as Y`
    Symbol { module: String, name: String },
}

/// Everything the resolver needs from one file.
#[derive(Debug, Clone)]
pub struct ModuleDecls {
    pub path: PathBuf,
    pub module: String,
    pub is_package: bool,
    pub classes: Vec<ClassDecl>,
    /// Bound name → import target.
    pub imports: HashMap<String, Import>,
    /// The parse tree contains syntax errors.
    pub has_errors: bool,
}

/// Parse one file. `rel_path` is relative to the source root and determines the module name.
pub fn extract_module(rel_path: &Path, source: &str) -> Result<ModuleDecls> {
    let tree = parse_python(rel_path, source.as_bytes())?;
    let root = tree.root_node();
    let (module, is_package) = module_name(rel_path);

    let mut decls = ModuleDecls {
        path: rel_path.to_path_buf(),
        module,
        is_package,
        classes: Vec::new(),
        imports: HashMap::new(),
        has_errors: root.has_error(),
    };
    let mut scope = Vec::new();
    walk(&root, source, &mut scope, &mut decls);

    tracing::debug!(
        path = %rel_path.display(),
        module = %decls.module,
        classes = decls.classes.len(),
        has_errors = decls.has_errors,
        "parsed module"
    );
    Ok(decls)
}

fn walk(node: &Node, source: &str, scope: &mut Vec<String>, decls: &mut ModuleDecls) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "class_definition" => visit_class(&child, source, scope, decls),
            "decorated_definition" => {
                if let Some(def) = child.child_by_field_name("definition")
                    && def.kind() == "class_definition"
                {
                    visit_class(&def, source, scope, decls);
                }
            }
            // classes built inside functions are not reachable by name
            "function_definition" => {}
            "import_statement" => collect_import(&child, source, decls),
            "import_from_statement" => collect_from_import(&child, source, decls),
            _ => walk(&child, source, scope, decls),
        }
    }
}

fn visit_class(node: &Node, source: &str, scope: &mut Vec<String>, decls: &mut ModuleDecls) {
    let Some(name_node) = node.child_by_field_name("name") else {
        return;
    };
    let name = text(&name_node, source);
    let qualname = if scope.is_empty() {
        name.clone()
    } else {
        format!("{}.{}", scope.join("."), name)
    };

    let bases = node
        .child_by_field_name("superclasses")
        .map(|args| {
            let mut cursor = args.walk();
            args.named_children(&mut cursor)
                .filter_map(|arg| base_expression(&arg, source))
                .collect()
        })
        .unwrap_or_default();

    decls.classes.push(ClassDecl {
        qualname,
        bases,
        line: node.start_position().row,
    });

    if let Some(body) = node.child_by_field_name("body") {
        scope.push(name);
        walk(&body, source, scope, decls);
        scope.pop();
    }
}

/// Name of a base class expression, or None for keyword arguments, calls and splats.
fn base_expression(node: &Node, source: &str) -> Option<String> {
    match node.kind() {
        "identifier" | "attribute" => Some(text(node, source)),
        // Generic[T], typing.Mapping[str, int]
        "subscript" => node
            .child_by_field_name("value")
            .and_then(|value| base_expression(&value, source)),
        _ => None,
    }
}

fn collect_import(node: &Node, source: &str, decls: &mut ModuleDecls) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "dotted_name" => {
                let module = text(&child, source);
                // `import a.b` binds `a`, and `a.b.X` is reachable through it
                if let Some((head, _)) = module.split_once('.') {
                    decls
                        .imports
                        .insert(head.to_string(), Import::Module(head.to_string()));
                }
                decls
                    .imports
                    .insert(module.clone(), Import::Module(module));
            }
            "aliased_import" => {
                if let (Some(name), Some(alias)) = (
                    child.child_by_field_name("name"),
                    child.child_by_field_name("alias"),
                ) {
                    decls
                        .imports
                        .insert(text(&alias, source), Import::Module(text(&name, source)));
                }
            }
            _ => {}
        }
    }
}

fn collect_from_import(node: &Node, source: &str, decls: &mut ModuleDecls) {
    let Some(module_node) = node.child_by_field_name("module_name") else {
        return;
    };
    let module = resolve_relative(
        &decls.module,
        decls.is_package,
        &text(&module_node, source),
    );

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.id() == module_node.id() {
            continue;
        }
        match child.kind() {
            "dotted_name" => {
                let name = text(&child, source);
                decls.imports.insert(
                    name.clone(),
                    Import::Symbol {
                        module: module.clone(),
                        name,
                    },
                );
            }
            "aliased_import" => {
                if let (Some(name), Some(alias)) = (
                    child.child_by_field_name("name"),
                    child.child_by_field_name("alias"),
                ) {
                    decls.imports.insert(
                        text(&alias, source),
                        Import::Symbol {
                            module: module.clone(),
                            name: text(&name, source),
                        },
                    );
                }
            }
            _ => {}
        }
    }
}

fn text(node: &Node, source: &str) -> String {
    source[node.byte_range()]
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> ModuleDecls {
        extract_module(Path::new("pkg/shapes.py"), source).unwrap()
    }

    #[test]
    fn test_class_bases() {
        let decls = extract(
            "\
class Shape:
    pass

class Square(Shape, metaclass=Meta):
    pass
",
        );
        assert_eq!(decls.module, "pkg.shapes");
        assert_eq!(decls.classes.len(), 2);
        assert!(decls.classes[0].bases.is_empty());
        assert_eq!(decls.classes[1].bases, vec!["Shape".to_string()]);
        assert_eq!(decls.classes[1].line, 3);
        assert!(!decls.has_errors);
    }

    #[test]
    fn test_nested_and_decorated_classes() {
        let decls = extract(
            "\
@dataclass
class Outer:
    class Inner(Base):
        pass
",
        );
        let names: Vec<&str> = decls.classes.iter().map(|c| c.qualname.as_str()).collect();
        assert_eq!(names, vec!["Outer", "Outer.Inner"]);
    }

    #[test]
    fn test_generic_and_dotted_bases() {
        let decls = extract("class Box(typing.Generic[T], abc.ABC):\n    pass\n");
        assert_eq!(
            decls.classes[0].bases,
            vec!["typing.Generic".to_string(), "abc.ABC".to_string()]
        );
    }

    #[test]
    fn test_classes_inside_functions_are_skipped() {
        let decls = extract("def make():\n    class Local:\n        pass\n    return Local\n");
        assert!(decls.classes.is_empty());
    }

    #[test]
    fn test_imports() {
        let decls = extract(
            "\
import os.path
import numpy as np
from abc import ABC, abstractmethod as am
from .base import Base
",
        );
        assert_eq!(decls.imports.get("os"), Some(&Import::Module("os".to_string())));
        assert_eq!(
            decls.imports.get("os.path"),
            Some(&Import::Module("os.path".to_string()))
        );
        assert_eq!(decls.imports.get("np"), Some(&Import::Module("numpy".to_string())));
        assert_eq!(
            decls.imports.get("ABC"),
            Some(&Import::Symbol {
                module: "abc".to_string(),
                name: "ABC".to_string(),
            })
        );
        assert_eq!(
            decls.imports.get("am"),
            Some(&Import::Symbol {
                module: "abc".to_string(),
                name: "abstractmethod".to_string(),
            })
        );
        assert_eq!(
            decls.imports.get("Base"),
            Some(&Import::Symbol {
                module: "pkg.base".to_string(),
                name: "Base".to_string(),
            })
        );
    }

    #[test]
    fn test_syntax_errors_are_flagged() {
        let decls = extract("class Broken(:\n    pass\n");
        assert!(decls.has_errors);
    }
}
