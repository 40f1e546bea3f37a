// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Cycle-safe traversal engine.
//!
//! # Overview
//!
//! ```text
//!   convert(root, target)
//!        |
//!        v
//!   Transform ---- IdentityTracker (identity -> shell / result)
//!        |
//!        +-------- HandlerRegistry<Handler>  (runtime type, target) -> handler
//!        |
//!        +-------- FieldAccessor             node -> ordered children
//! ```
//!
//! Each call owns its traversal state, so one engine can serve many threads
//! at once. A failure anywhere aborts the whole call; no partial graph is
//! returned.

mod compare;
mod transform;

pub use compare::{Mismatch, MismatchReason};

use crate::accessor::{Child, FieldAccessor, ShapeAccessor};
use crate::config::EngineConfig;
use crate::error::{GraphError, Result};
use crate::handler::{Comparator, Handler};
use crate::registry::HandlerRegistry;
use crate::types::TypeTag;
use crate::value::{NodeRef, Slot, Value};
use std::fmt;
use std::sync::Arc;

/// Location of the node being processed, relative to the root.
#[derive(Debug, Clone, Default)]
pub(crate) struct TraversalPath(Vec<Slot>);

impl TraversalPath {
    pub(crate) fn push(&mut self, slot: Slot) {
        self.0.push(slot);
    }

    pub(crate) fn pop(&mut self) {
        self.0.pop();
    }
}

impl fmt::Display for TraversalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for slot in &self.0 {
            write!(f, "{slot}")?;
        }
        Ok(())
    }
}

/// Deep convert / clone / compare over object graphs.
pub struct GraphEngine {
    handlers: Arc<HandlerRegistry<Handler>>,
    comparators: Option<Arc<HandlerRegistry<Comparator>>>,
    accessor: Arc<dyn FieldAccessor>,
    config: EngineConfig,
}

impl GraphEngine {
    pub fn new(handlers: Arc<HandlerRegistry<Handler>>) -> Self {
        Self {
            handlers,
            comparators: None,
            accessor: Arc::new(ShapeAccessor),
            config: EngineConfig::default(),
        }
    }

    pub fn with_accessor(mut self, accessor: impl FieldAccessor + 'static) -> Self {
        self.accessor = Arc::new(accessor);
        self
    }

    pub fn with_comparators(mut self, comparators: Arc<HandlerRegistry<Comparator>>) -> Self {
        self.comparators = Some(comparators);
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn handlers(&self) -> &Arc<HandlerRegistry<Handler>> {
        &self.handlers
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Convert the graph rooted at `root` to `target`.
    ///
    /// Every source node is processed at most once; nodes reached twice map
    /// to the same result, and cycles map onto cycles in the result.
    pub fn convert(&self, root: &Value, target: &TypeTag) -> Result<Value> {
        let mut traversal = transform::Transform::new(self);
        let result = traversal.process(root, target);
        log::trace!(
            "[engine] convert to {} made {} visits",
            target,
            traversal.visited()
        );
        result
    }

    /// Convert to `object`, which with the standard handlers is a deep,
    /// identity-preserving copy.
    pub fn deep_clone(&self, root: &Value) -> Result<Value> {
        self.convert(root, &TypeTag::object())
    }

    /// Structural equality of two graphs, tolerant of (mutual) cycles.
    pub fn compare_equal(&self, left: &Value, right: &Value) -> Result<bool> {
        Ok(self.first_mismatch(left, right)?.is_none())
    }

    /// First position where the graphs differ, or `None` if they are equal.
    pub fn first_mismatch(&self, left: &Value, right: &Value) -> Result<Option<Mismatch>> {
        compare::Compare::new(self).run(left, right)
    }

    /// Children of `node`, enumerated twice and cross-checked when
    /// `verify_accessor` is set.
    fn children(&self, node: &NodeRef, path: &TraversalPath) -> Result<Vec<Child>> {
        let first = {
            let guard = node.read();
            self.accessor.children(&guard)
        };
        if !self.config.verify_accessor {
            return Ok(first);
        }

        let second = {
            let guard = node.read();
            self.accessor.children(&guard)
        };
        if first.len() != second.len() {
            return Err(GraphError::MalformedAccessor {
                path: path.to_string(),
                reason: format!("{} children, then {}", first.len(), second.len()),
            });
        }
        if let Some((a, b)) = first
            .iter()
            .zip(&second)
            .find(|(a, b)| !a.same_position(b))
        {
            return Err(GraphError::MalformedAccessor {
                path: path.to_string(),
                reason: format!("child {} enumerated as {}", a.slot, b.slot),
            });
        }
        Ok(first)
    }
}

impl fmt::Debug for GraphEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphEngine")
            .field("handlers", &self.handlers)
            .field("comparators", &self.comparators.is_some())
            .field("config", &self.config)
            .finish()
    }
}
