//! The host type system capability consumed by the scanner.

use crate::key::TypeKey;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::hash::Hash;

/// Failure of the "enumerate direct subtypes" capability for one type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnumerationError {
    #[error("unknown type {0}")]
    UnknownType(TypeKey),
    #[error("{key} cannot be introspected: {reason}")]
    Malformed { key: TypeKey, reason: String },
    #[error("{0} lists itself among its own subtypes")]
    SelfReferential(TypeKey),
}

/// Adapter over a runtime or declared type system.
///
/// `Type` is the adapter's notion of type identity. Exclusions and the
/// frontier are tracked by identity, the scanner output only by [`TypeKey`].
pub trait SubtypeSource {
    type Type: Clone + Eq + Hash;

    /// The composite key recorded for `ty`.
    fn key_of(&self, ty: &Self::Type) -> TypeKey;

    /// Direct subtypes of `ty`. No ordering is implied.
    fn direct_subtypes(&self, ty: &Self::Type) -> Result<Vec<Self::Type>, EnumerationError>;
}

/// In-memory subtype relation, keyed directly by [`TypeKey`].
///
/// Types referenced only as subtypes enumerate as childless. Types marked
/// with [`StaticSource::failing`] enumerate with an error.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    subtypes: BTreeMap<TypeKey, BTreeSet<TypeKey>>,
    known: HashSet<TypeKey>,
    failing: HashSet<TypeKey>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a type with no recorded subtypes.
    pub fn declare(&mut self, key: TypeKey) {
        self.known.insert(key);
    }

    /// Record that `child` directly extends `parent`.
    pub fn add_subtype(&mut self, parent: TypeKey, child: TypeKey) {
        self.known.insert(parent.clone());
        self.known.insert(child.clone());
        self.subtypes.entry(parent).or_default().insert(child);
    }

    /// Make enumeration of `key` fail.
    pub fn mark_failing(&mut self, key: TypeKey) {
        self.known.insert(key.clone());
        self.failing.insert(key);
    }

    pub fn with_subtypes(
        mut self,
        parent: TypeKey,
        children: impl IntoIterator<Item = TypeKey>,
    ) -> Self {
        self.declare(parent.clone());
        for child in children {
            self.add_subtype(parent.clone(), child);
        }
        self
    }

    pub fn failing(mut self, key: TypeKey) -> Self {
        self.mark_failing(key);
        self
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

impl SubtypeSource for StaticSource {
    type Type = TypeKey;

    fn key_of(&self, ty: &TypeKey) -> TypeKey {
        ty.clone()
    }

    fn direct_subtypes(&self, ty: &TypeKey) -> Result<Vec<TypeKey>, EnumerationError> {
        if self.failing.contains(ty) {
            return Err(EnumerationError::Malformed {
                key: ty.clone(),
                reason: "declared broken".to_string(),
            });
        }
        if !self.known.contains(ty) {
            return Err(EnumerationError::UnknownType(ty.clone()));
        }
        let children = self.subtypes.get(ty);
        if children.is_some_and(|c| c.contains(ty)) {
            return Err(EnumerationError::SelfReferential(ty.clone()));
        }
        Ok(children
            .map(|c| c.iter().cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_source_enumerates_declared_children() {
        let source = StaticSource::new().with_subtypes(
            TypeKey::object(),
            [TypeKey::new("A", "m"), TypeKey::new("B", "m")],
        );
        let mut children = source.direct_subtypes(&TypeKey::object()).unwrap();
        children.sort();
        assert_eq!(children, vec![TypeKey::new("A", "m"), TypeKey::new("B", "m")]);
        assert!(source.direct_subtypes(&TypeKey::new("A", "m")).unwrap().is_empty());
    }

    #[test]
    fn test_static_source_errors() {
        let a = TypeKey::new("A", "m");
        let source = StaticSource::new()
            .with_subtypes(a.clone(), [a.clone()])
            .failing(TypeKey::new("B", "m"));

        assert_eq!(
            source.direct_subtypes(&a),
            Err(EnumerationError::SelfReferential(a.clone()))
        );
        assert!(matches!(
            source.direct_subtypes(&TypeKey::new("B", "m")),
            Err(EnumerationError::Malformed { .. })
        ));
        assert!(matches!(
            source.direct_subtypes(&TypeKey::new("Z", "m")),
            Err(EnumerationError::UnknownType(_))
        ));
    }
}
