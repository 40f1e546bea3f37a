// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for hierarchy construction, registration and traversal.

use crate::types::TypeTag;
use thiserror::Error;

/// Errors raised while building a [`crate::types::TypeHierarchy`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    #[error("type name must not be empty")]
    EmptyName,

    #[error("type `{0}` is declared more than once")]
    Duplicate(TypeTag),

    #[error("type `{ty}` refers to undeclared type `{missing}`")]
    UnknownType { ty: TypeTag, missing: TypeTag },

    #[error("class `{ty}` cannot extend contract `{parent}`")]
    ParentIsContract { ty: TypeTag, parent: TypeTag },

    #[error("`{ty}` lists `{other}` as a contract, but it is a class")]
    NotAContract { ty: TypeTag, other: TypeTag },

    #[error("contract `{0}` cannot have a parent class")]
    ContractWithParent(TypeTag),

    #[error("inheritance cycle through `{0}`")]
    Cycle(TypeTag),
}

/// Errors raised eagerly by [`crate::registry::HandlerRegistry::register`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("type tag must not be empty")]
    EmptyType,

    #[error("type `{0}` is not declared in the registry's hierarchy")]
    UnknownType(TypeTag),

    #[error("registry is frozen; no further registrations accepted")]
    Frozen,
}

/// Writing a child result into a shell slot that does not fit its shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("slot {slot} does not fit a {shape} shell")]
    SlotMismatch { slot: String, shape: &'static str },

    #[error("index {index} skips ahead of length {len}")]
    Gap { index: usize, len: usize },

    #[error("field `{0}` occurs more than once in the record")]
    DuplicateField(String),
}

/// Failure reported by a single handler invocation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HandlerError {
    #[error("cannot convert {source_type} to {target}")]
    Unsupported { source_type: TypeTag, target: TypeTag },

    #[error("cannot parse {input:?} as {target}")]
    Parse { input: String, target: TypeTag },

    #[error("value {value} is out of range for {target}")]
    OutOfRange { value: String, target: TypeTag },

    #[error("expected a {expected} node, found {found}")]
    WrongShape {
        expected: &'static str,
        found: &'static str,
    },
}

/// Failure that aborts a whole traversal.
///
/// Every variant carries the path from the root to the node that failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("no handler for {source_type} -> {target_type} at {path}")]
    DispatchNotFound {
        source_type: TypeTag,
        target_type: TypeTag,
        path: String,
    },

    #[error("handler failed at {path}: {source}")]
    Handler {
        path: String,
        #[source]
        source: HandlerError,
    },

    #[error("cannot assemble result at {path}: {source}")]
    Shape {
        path: String,
        #[source]
        source: ShapeError,
    },

    #[error("field accessor is not deterministic at {path}: {reason}")]
    MalformedAccessor { path: String, reason: String },

    #[error("back-reference to a node with no recorded result at {path}")]
    UnresolvedBackReference { path: String },
}

/// Convenience alias used across traversal code.
pub type Result<T, E = GraphError> = std::result::Result<T, E>;
