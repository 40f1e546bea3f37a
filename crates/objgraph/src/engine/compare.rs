// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Pairwise structural comparison.
//!
//! Node pairs are tracked jointly by identity. A pair seen again (directly
//! or through a cycle) is treated as equal: if it were not, the first
//! comparison of that pair would already have ended the walk.

use super::{GraphEngine, TraversalPath};
use crate::error::Result;
use crate::types::TypeTag;
use crate::value::{NodeId, NodeRef, Value};
use std::collections::HashSet;
use std::fmt;

/// Why two positions differ. Never an error: it only makes the verdict false.
#[derive(Debug, Clone)]
pub enum MismatchReason {
    Type { left: TypeTag, right: TypeTag },
    Shape { left: &'static str, right: &'static str },
    ChildCount { left: usize, right: usize },
    Slot { left: String, right: String },
    NodeAgainstLeaf,
    Leaf { left: Value, right: Value },
}

impl fmt::Display for MismatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type { left, right } => write!(f, "type {left} vs {right}"),
            Self::Shape { left, right } => write!(f, "shape {left} vs {right}"),
            Self::ChildCount { left, right } => write!(f, "{left} children vs {right}"),
            Self::Slot { left, right } => write!(f, "slot {left} vs {right}"),
            Self::NodeAgainstLeaf => f.write_str("node vs leaf"),
            Self::Leaf { left, right } => write!(f, "{left:?} vs {right:?}"),
        }
    }
}

/// First difference found, with its path from the roots.
#[derive(Debug, Clone)]
pub struct Mismatch {
    pub path: String,
    pub reason: MismatchReason,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.reason, self.path)
    }
}

pub(super) struct Compare<'e> {
    engine: &'e GraphEngine,
    pairs: HashSet<(NodeId, NodeId)>,
    // Keeps compared nodes alive so their ids stay unique.
    pinned: Vec<(NodeRef, NodeRef)>,
    path: TraversalPath,
}

impl<'e> Compare<'e> {
    pub(super) fn new(engine: &'e GraphEngine) -> Self {
        Self {
            engine,
            pairs: HashSet::new(),
            pinned: Vec::new(),
            path: TraversalPath::default(),
        }
    }

    pub(super) fn run(mut self, left: &Value, right: &Value) -> Result<Option<Mismatch>> {
        let found = self.values(left, right)?;
        if let Some(m) = &found {
            if self.engine.config.log_mismatches {
                log::debug!("[engine] structural mismatch: {}", m);
            }
        }
        Ok(found)
    }

    fn mismatch(&self, reason: MismatchReason) -> Option<Mismatch> {
        Some(Mismatch {
            path: self.path.to_string(),
            reason,
        })
    }

    fn values(&mut self, left: &Value, right: &Value) -> Result<Option<Mismatch>> {
        match (left, right) {
            (Value::Node(a), Value::Node(b)) => self.nodes(a, b),
            (Value::Node(_), _) | (_, Value::Node(_)) => {
                Ok(self.mismatch(MismatchReason::NodeAgainstLeaf))
            }
            _ if self.leaves_equal(left, right) => Ok(None),
            _ => Ok(self.mismatch(MismatchReason::Leaf {
                left: left.clone(),
                right: right.clone(),
            })),
        }
    }

    fn leaves_equal(&self, left: &Value, right: &Value) -> bool {
        if let (Some(comparators), Some(lt), Some(rt)) = (
            self.engine.comparators.as_ref(),
            left.runtime_type(),
            right.runtime_type(),
        ) {
            if let Some(cmp) = comparators.resolve(&lt, &rt) {
                return cmp.equal(left, right);
            }
        }
        left.leaf_eq(right)
    }

    fn nodes(&mut self, a: &NodeRef, b: &NodeRef) -> Result<Option<Mismatch>> {
        if a.ptr_eq(b) {
            return Ok(None);
        }
        if !self.pairs.insert((a.id(), b.id())) {
            log::trace!("[engine] pair already under comparison at {}", self.path);
            return Ok(None);
        }
        self.pinned.push((a.clone(), b.clone()));

        let (left_type, left_shape) = {
            let n = a.read();
            (n.type_tag.clone(), n.shape.kind_name())
        };
        let (right_type, right_shape) = {
            let n = b.read();
            (n.type_tag.clone(), n.shape.kind_name())
        };
        if left_type != right_type {
            return Ok(self.mismatch(MismatchReason::Type {
                left: left_type,
                right: right_type,
            }));
        }
        if left_shape != right_shape {
            return Ok(self.mismatch(MismatchReason::Shape {
                left: left_shape,
                right: right_shape,
            }));
        }

        let left_children = self.engine.children(a, &self.path)?;
        let right_children = self.engine.children(b, &self.path)?;
        if left_children.len() != right_children.len() {
            return Ok(self.mismatch(MismatchReason::ChildCount {
                left: left_children.len(),
                right: right_children.len(),
            }));
        }

        for (l, r) in left_children.iter().zip(&right_children) {
            if l.slot != r.slot {
                return Ok(self.mismatch(MismatchReason::Slot {
                    left: l.slot.to_string(),
                    right: r.slot.to_string(),
                }));
            }
            self.path.push(l.slot.clone());
            let found = self.values(&l.value, &r.value)?;
            if found.is_some() {
                return Ok(found);
            }
            self.path.pop();
        }
        Ok(None)
    }
}
