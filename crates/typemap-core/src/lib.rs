//! Core types for typemap: subtype hierarchy discovery and graph materialization.
//!
//! Provides the node identity ([`key::TypeKey`]), the adjacency model
//! ([`graph::TypeGraph`]), the injected subtype-enumeration capability
//! ([`source::SubtypeSource`]), the worklist scanner, JSON persistence of the
//! adjacency data, and the materializer that turns it into a colored,
//! deduplicated [`visual::VisualGraph`].

pub mod catalog;
pub mod config;
pub mod graph;
pub mod key;
pub mod materialize;
pub mod scan;
pub mod source;
pub mod store;
pub mod visual;
