// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Handler contracts for dispatch.
//!
//! A [`Handler`] is either a leaf (maps one value to one value, no recursion)
//! or structural (provides a result shell and child targets; the engine does
//! the recursion and fills the shell).

use crate::accessor::Child;
use crate::error::HandlerError;
use crate::types::TypeTag;
use crate::value::{Node, Value};
use std::fmt;
use std::sync::Arc;

/// Converts a value without looking at its children.
pub trait LeafHandler: Send + Sync {
    fn convert(&self, value: &Value, target: &TypeTag) -> Result<Value, HandlerError>;
}

/// Rebuilds a structural node; recursion is driven by the engine.
pub trait StructuralHandler: Send + Sync {
    /// Empty result of the right shape. Recorded before any child is
    /// processed so back-references can point at it.
    fn shell(&self, source: &Node, target: &TypeTag) -> Result<Node, HandlerError>;

    /// Target type for a child, or `None` to leave the child out.
    fn child_target(&self, child: &Child, target: &TypeTag) -> Option<TypeTag>;

    /// Called once every child has been written into the shell.
    fn finish(&self, _shell: &mut Node) -> Result<(), HandlerError> {
        Ok(())
    }
}

/// Decides equality of two leaf values in compare mode.
pub trait LeafComparator: Send + Sync {
    fn equal(&self, left: &Value, right: &Value) -> bool;
}

/// Dispatch entry stored in a [`crate::registry::HandlerRegistry`].
#[derive(Clone)]
pub enum Handler {
    Leaf(Arc<dyn LeafHandler>),
    Structural(Arc<dyn StructuralHandler>),
}

impl Handler {
    pub fn leaf(handler: impl LeafHandler + 'static) -> Self {
        Self::Leaf(Arc::new(handler))
    }

    pub fn structural(handler: impl StructuralHandler + 'static) -> Self {
        Self::Structural(Arc::new(handler))
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// True if both entries are the same handler instance.
    pub fn same_instance(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Leaf(a), Self::Leaf(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            (Self::Structural(a), Self::Structural(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(h) => write!(f, "Handler::Leaf({:p})", Arc::as_ptr(h) as *const ()),
            Self::Structural(h) => {
                write!(f, "Handler::Structural({:p})", Arc::as_ptr(h) as *const ())
            }
        }
    }
}

/// Comparator entry stored in a comparator registry.
pub type Comparator = Arc<dyn LeafComparator>;

impl<F> LeafHandler for F
where
    F: Fn(&Value, &TypeTag) -> Result<Value, HandlerError> + Send + Sync,
{
    fn convert(&self, value: &Value, target: &TypeTag) -> Result<Value, HandlerError> {
        self(value, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{CloneStructure, Identity};

    #[test]
    fn test_same_instance() {
        let identity = Handler::leaf(Identity);
        assert!(identity.same_instance(&identity.clone()));
        assert!(!identity.same_instance(&Handler::leaf(Identity)));

        let structure = Handler::structural(CloneStructure);
        assert!(structure.same_instance(&structure.clone()));
        assert!(!structure.same_instance(&identity));
        assert!(!structure.is_leaf());
    }
}
