// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Convert/clone traversal.

use super::{GraphEngine, TraversalPath};
use crate::error::{GraphError, HandlerError, Result};
use crate::handler::{Handler, StructuralHandler};
use crate::tracker::IdentityTracker;
use crate::types::TypeTag;
use crate::value::{NodeRef, Value};

/// State of one `convert` call.
pub(super) struct Transform<'e> {
    engine: &'e GraphEngine,
    tracker: IdentityTracker,
    path: TraversalPath,
}

impl<'e> Transform<'e> {
    pub(super) fn new(engine: &'e GraphEngine) -> Self {
        Self {
            engine,
            tracker: IdentityTracker::new(),
            path: TraversalPath::default(),
        }
    }

    pub(super) fn visited(&self) -> usize {
        self.tracker.len()
    }

    pub(super) fn process(&mut self, value: &Value, target: &TypeTag) -> Result<Value> {
        let node = match value {
            Value::Null => return Ok(Value::Null),
            Value::Node(node) => Some(node),
            _ => None,
        };

        if let Some(node) = node {
            if self.tracker.mark_visited(node, target) {
                log::trace!(
                    "[engine] back-reference to {:?} as {} at {}",
                    node.id(),
                    target,
                    self.path
                );
                return self
                    .tracker
                    .result(node, target)
                    .ok_or_else(|| GraphError::UnresolvedBackReference {
                        path: self.path.to_string(),
                    });
            }
        }

        let source_type = match value.runtime_type() {
            Some(t) => t,
            None => return Ok(Value::Null),
        };
        let Some(handler) = self.engine.handlers.resolve(&source_type, target) else {
            log::debug!(
                "[engine] no handler for {} -> {} at {}",
                source_type,
                target,
                self.path
            );
            return Err(GraphError::DispatchNotFound {
                source_type,
                target_type: target.clone(),
                path: self.path.to_string(),
            });
        };

        match (handler, node) {
            (Handler::Leaf(leaf), node) => {
                let out = leaf
                    .convert(value, target)
                    .map_err(|source| self.handler_error(source))?;
                if let Some(node) = node {
                    self.tracker.record_result(node, target, out.clone());
                }
                Ok(out)
            }
            (Handler::Structural(structural), Some(node)) => {
                self.rebuild(node, structural.as_ref(), target)
            }
            (Handler::Structural(_), None) => Err(self.handler_error(HandlerError::WrongShape {
                expected: "structural",
                found: "leaf",
            })),
        }
    }

    /// Shell first, then children in accessor order.
    fn rebuild(
        &mut self,
        source: &NodeRef,
        handler: &dyn StructuralHandler,
        target: &TypeTag,
    ) -> Result<Value> {
        let shell = {
            let guard = source.read();
            handler.shell(&guard, target)
        }
        .map_err(|e| self.handler_error(e))?;
        let shell = NodeRef::new(shell);
        self.tracker.record_shell(source, target, Value::Node(shell.clone()));

        for child in self.engine.children(source, &self.path)? {
            let Some(child_target) = handler.child_target(&child, target) else {
                continue;
            };
            self.path.push(child.slot.clone());
            let out = self.process(&child.value, &child_target)?;
            shell
                .write()
                .put(&child.slot, out)
                .map_err(|source| GraphError::Shape {
                    path: self.path.to_string(),
                    source,
                })?;
            self.path.pop();
        }

        handler
            .finish(&mut shell.write())
            .map_err(|e| self.handler_error(e))?;

        let result = Value::Node(shell);
        self.tracker.record_result(source, target, result.clone());
        Ok(result)
    }

    fn handler_error(&self, source: HandlerError) -> GraphError {
        GraphError::Handler {
            path: self.path.to_string(),
            source,
        }
    }
}
