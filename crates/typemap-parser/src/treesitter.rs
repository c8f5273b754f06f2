//! Tree-sitter integration for Python AST parsing.

use anyhow::{Context, Result};
use std::path::Path;

/// Parse a Python source file and return the tree-sitter tree.
pub fn parse_python(path: &Path, source: &[u8]) -> Result<tree_sitter::Tree> {
    let language: tree_sitter::Language = tree_sitter_python::LANGUAGE.into();
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&language)
        .context("failed to set tree-sitter language")?;
    parser
        .parse(source, None)
        .ok_or_else(|| anyhow::anyhow!("failed to parse {}", path.display()))
}
