//! Python class hierarchies as a typemap subtype source.
//!
//! Parses a tree of Python files with tree-sitter, extracts class
//! declarations, their bases, and the imports needed to resolve them, and
//! exposes the result as a [`typemap_core::source::SubtypeSource`].

pub mod classes;
pub mod modules;
pub mod source;
pub mod treesitter;
pub mod walk;

pub use source::PythonSource;
pub use walk::{SourceFilter, collect_python_files};
