// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type-hierarchy dispatch and cycle-safe object-graph traversal.
//!
//! Handlers are registered per (source type, target type). A request for a
//! type with no exact entry walks that type's ancestors (class chain first,
//! then contracts) and the answer is cached. The traversal engine drives
//! those handlers over arbitrary graphs (shared nodes, self references,
//! longer cycles) and preserves their shape in the result.
//!
//! # Features
//!
//! - **Deep clone**: `object` target, aliasing and cycles preserved
//! - **Deep convert**: per-type leaf converters and structural rebuilders
//! - **Deep compare**: cycle-tolerant structural equality with the path of
//!   the first difference
//!
//! # Quick Start
//!
//! ```
//! use objgraph::{Field, GraphConfig, Node, NodeRef, Value};
//!
//! let engine = GraphConfig::default().build_engine()?;
//!
//! let node = NodeRef::new(Node::record("record", vec![Field::new("n", "int", 1)]));
//! node.set_field("me", node.clone())?;
//!
//! let copy = engine.deep_clone(&Value::from(node.clone()))?;
//! assert!(engine.compare_equal(&Value::from(node.clone()), &copy)?);
//!
//! node.clear();
//! if let Some(copy) = copy.as_node() {
//!     copy.clear();
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Configuration File
//!
//! ```toml
//! [registry]
//! cache_capacity = 512
//!
//! [[types]]
//! name = "Person"
//! parent = "record"
//! ```

pub mod accessor;
pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod handler;
pub mod registry;
pub mod tracker;
pub mod types;
pub mod value;

pub use accessor::{Child, FieldAccessor, ShapeAccessor};
pub use config::{ConfigError, EngineConfig, GraphConfig, RegistryConfig};
pub use convert::{
    standard_comparators, standard_handlers, CloneStructure, ConvertElements, ConvertRecord,
    Identity, NumericEquality, ToBool, ToChar, ToFloat, ToInt, ToText,
};
pub use engine::{GraphEngine, Mismatch, MismatchReason};
pub use error::{GraphError, HandlerError, HierarchyError, RegistryError, ShapeError};
pub use handler::{Comparator, Handler, LeafComparator, LeafHandler, StructuralHandler};
pub use registry::{HandlerRegistry, LookupStats, Resolution, ResolvedBy, TypeKey};
pub use tracker::{IdentityTracker, VisitState};
pub use types::{builtin, TypeDecl, TypeHierarchy, TypeHierarchyBuilder, TypeKind, TypeTag};
pub use value::{Field, Node, NodeId, NodeRef, Shape, Slot, Value};
