//! Resolve class bases across modules and serve the result as a subtype source.

use crate::classes::{Import, ModuleDecls, extract_module};
use crate::walk::{SourceFilter, collect_python_files};
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use typemap_core::key::TypeKey;
use typemap_core::source::{EnumerationError, SubtypeSource};

const BUILTINS: &str = "builtins";

/// Subtype relation of the classes declared in a set of Python files.
///
/// Bases that are not declared in any parsed file become external types,
/// direct subtypes of `object builtins`.
#[derive(Debug, Clone, Default)]
pub struct PythonSource {
    subtypes: HashMap<TypeKey, BTreeSet<TypeKey>>,
    /// Declared class → file declaring it.
    declared: HashMap<TypeKey, PathBuf>,
    external: HashSet<TypeKey>,
    /// Classes declared in files with syntax errors.
    malformed: HashSet<TypeKey>,
}

impl PythonSource {
    /// Parse `(relative path, contents)` pairs in parallel and index them.
    ///
    /// Files tree-sitter cannot parse at all are logged and skipped.
    pub fn from_files(files: &[(PathBuf, String)]) -> Self {
        let modules: Vec<ModuleDecls> = files
            .par_iter()
            .filter_map(|(path, source)| match extract_module(path, source) {
                Ok(decls) => Some(decls),
                Err(e) => {
                    tracing::warn!(path = %path.display(), "skipping file: {e:#}");
                    None
                }
            })
            .collect();
        Self::from_modules(&modules)
    }

    /// Collect the Python files under `root` and index them.
    pub fn from_dir(root: &Path, filter: &SourceFilter) -> anyhow::Result<Self> {
        let files = collect_python_files(root, filter)?;
        Ok(Self::from_files(&files))
    }

    pub fn from_modules(modules: &[ModuleDecls]) -> Self {
        let mut source = Self::default();
        let mut by_name: HashMap<&str, BTreeSet<TypeKey>> = HashMap::new();

        for module in modules {
            for class in &module.classes {
                let key = TypeKey::new(class.qualname.as_str(), module.module.as_str());
                if let Some(previous) = source.declared.insert(key.clone(), module.path.clone())
                    && previous != module.path
                {
                    tracing::warn!(
                        %key,
                        first = %previous.display(),
                        second = %module.path.display(),
                        "class declared by two files"
                    );
                }
                if module.has_errors {
                    source.malformed.insert(key.clone());
                }
                by_name.entry(class.qualname.as_str()).or_default().insert(key);
            }
        }

        let object = TypeKey::object();
        for module in modules {
            let resolver = Resolver {
                module,
                declared: &source.declared,
                by_name: &by_name,
            };
            let mut edges = Vec::new();
            for class in &module.classes {
                let child = TypeKey::new(class.qualname.as_str(), module.module.as_str());
                let parents: Vec<TypeKey> = class.bases.iter().map(|b| resolver.resolve(b)).collect();
                if parents.is_empty() {
                    edges.push((object.clone(), child));
                    continue;
                }
                for parent in parents {
                    edges.push((parent, child.clone()));
                }
            }
            for (parent, child) in edges {
                source.add_edge(parent, child);
            }
        }

        tracing::info!(
            modules = modules.len(),
            classes = source.declared.len(),
            external = source.external.len(),
            malformed = source.malformed.len(),
            "indexed python classes"
        );
        source
    }

    fn add_edge(&mut self, parent: TypeKey, child: TypeKey) {
        let object = TypeKey::object();
        if parent != object && !self.declared.contains_key(&parent) && self.external.insert(parent.clone()) {
            self.subtypes
                .entry(object)
                .or_default()
                .insert(parent.clone());
        }
        self.subtypes.entry(parent).or_default().insert(child);
    }

    /// Whether `key` is declared, external, or `object builtins`.
    pub fn contains(&self, key: &TypeKey) -> bool {
        *key == TypeKey::object() || self.declared.contains_key(key) || self.external.contains(key)
    }

    pub fn declared_count(&self) -> usize {
        self.declared.len()
    }

    pub fn external_types(&self) -> impl Iterator<Item = &TypeKey> {
        self.external.iter()
    }
}

impl SubtypeSource for PythonSource {
    type Type = TypeKey;

    fn key_of(&self, ty: &TypeKey) -> TypeKey {
        ty.clone()
    }

    fn direct_subtypes(&self, ty: &TypeKey) -> Result<Vec<TypeKey>, EnumerationError> {
        if self.malformed.contains(ty) {
            let file = self
                .declared
                .get(ty)
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            return Err(EnumerationError::Malformed {
                key: ty.clone(),
                reason: format!("declared in {} which has syntax errors", file),
            });
        }
        if !self.contains(ty) {
            return Err(EnumerationError::UnknownType(ty.clone()));
        }
        let Some(children) = self.subtypes.get(ty) else {
            return Ok(Vec::new());
        };
        if children.contains(ty) {
            return Err(EnumerationError::SelfReferential(ty.clone()));
        }
        Ok(children.iter().cloned().collect())
    }
}

/// Base-name resolution from the point of view of one module.
struct Resolver<'a> {
    module: &'a ModuleDecls,
    declared: &'a HashMap<TypeKey, PathBuf>,
    by_name: &'a HashMap<&'a str, BTreeSet<TypeKey>>,
}

impl Resolver<'_> {
    /// Same module, then imports, then a unique declaration anywhere, then builtins.
    fn resolve(&self, base: &str) -> TypeKey {
        let local = TypeKey::new(base, self.module.module.as_str());
        if self.declared.contains_key(&local) {
            return local;
        }

        let Some((prefix, name)) = base.rsplit_once('.') else {
            return self.resolve_bare(base);
        };

        // longest imported prefix wins: `a.b.C` with `import a.b`
        let mut candidate = prefix;
        loop {
            if let Some(import) = self.module.imports.get(candidate) {
                let target = match import {
                    Import::Module(m) => m.clone(),
                    Import::Symbol { module, name } => format!("{}.{}", module, name),
                };
                let module = match prefix.strip_prefix(candidate) {
                    Some(rest) if !rest.is_empty() => format!("{}{}", target, rest),
                    _ => target,
                };
                return TypeKey::new(name, module);
            }
            match candidate.rsplit_once('.') {
                Some((shorter, _)) => candidate = shorter,
                None => break,
            }
        }
        TypeKey::new(name, prefix)
    }

    fn resolve_bare(&self, name: &str) -> TypeKey {
        if let Some(Import::Symbol { module, name }) = self.module.imports.get(name) {
            return TypeKey::new(name.as_str(), module.as_str());
        }
        if let Some(keys) = self.by_name.get(name)
            && keys.len() == 1
            && let Some(key) = keys.iter().next()
        {
            return key.clone();
        }
        TypeKey::new(name, BUILTINS)
    }
}
