// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-traversal record of visited nodes, keyed by identity and target type.
//!
//! The same source node reached under two different targets is two separate
//! visits with two separate results; revisits under the same target share one.

use crate::types::TypeTag;
use crate::value::{NodeId, NodeRef, Value};
use std::collections::HashMap;

/// Progress of one (source node, target) visit within a traversal.
///
/// `Unresolved -> InProgress -> Complete` for structural handlers,
/// `Unresolved -> Complete` for leaf handlers. States never regress.
#[derive(Debug, Clone)]
pub enum VisitState {
    /// Marked, no result recorded yet.
    Unresolved,
    /// Shell recorded; its children are still being filled in.
    InProgress(Value),
    Complete(Value),
}

#[derive(Debug)]
struct Visit {
    // Holding the source keeps its address from being reused mid-traversal.
    _source: NodeRef,
    state: VisitState,
}

/// Side table owned by a single traversal.
#[derive(Debug, Default)]
pub struct IdentityTracker {
    visits: HashMap<(NodeId, TypeTag), Visit>,
}

impl IdentityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(node: &NodeRef, target: &TypeTag) -> (NodeId, TypeTag) {
        (node.id(), target.clone())
    }

    /// True if `node` was already marked for `target`; otherwise marks it
    /// and returns false.
    pub fn mark_visited(&mut self, node: &NodeRef, target: &TypeTag) -> bool {
        let key = Self::key(node, target);
        if self.visits.contains_key(&key) {
            return true;
        }
        self.visits.insert(
            key,
            Visit {
                _source: node.clone(),
                state: VisitState::Unresolved,
            },
        );
        false
    }

    /// Record the shell that stands in for `node` while its children are processed.
    pub fn record_shell(&mut self, node: &NodeRef, target: &TypeTag, shell: Value) {
        if let Some(visit) = self.visits.get_mut(&Self::key(node, target)) {
            debug_assert!(matches!(visit.state, VisitState::Unresolved));
            visit.state = VisitState::InProgress(shell);
        }
    }

    /// Record the final result for `node` converted to `target`.
    pub fn record_result(&mut self, node: &NodeRef, target: &TypeTag, result: Value) {
        if let Some(visit) = self.visits.get_mut(&Self::key(node, target)) {
            visit.state = VisitState::Complete(result);
        }
    }

    /// Result for a marked visit: the finished value, or the in-progress shell.
    ///
    /// `None` if the visit was never marked or nothing is recorded yet.
    pub fn result(&self, node: &NodeRef, target: &TypeTag) -> Option<Value> {
        match &self.visits.get(&Self::key(node, target))?.state {
            VisitState::Unresolved => None,
            VisitState::InProgress(shell) => Some(shell.clone()),
            VisitState::Complete(result) => Some(result.clone()),
        }
    }

    pub fn state(&self, node: &NodeRef, target: &TypeTag) -> Option<&VisitState> {
        self.visits
            .get(&Self::key(node, target))
            .map(|v| &v.state)
    }

    /// Number of distinct (node, target) visits so far.
    pub fn len(&self) -> usize {
        self.visits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }
}
