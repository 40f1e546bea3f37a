// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Enumeration of a node's structural children.

use crate::types::TypeTag;
use crate::value::{Node, Shape, Slot, Value};

/// One structural child of a node.
#[derive(Debug, Clone)]
pub struct Child {
    pub slot: Slot,
    pub value: Value,
    /// Type the parent declares for this position.
    pub declared: TypeTag,
}

impl Child {
    /// Same slot, declared type and child identity (or equal leaf).
    pub fn same_position(&self, other: &Self) -> bool {
        self.slot == other.slot && self.declared == other.declared && self.value.leaf_eq(&other.value)
    }
}

/// Supplies the ordered children of a structural node.
///
/// Implementations must be deterministic: two calls on an unchanged node
/// return the same slots in the same order.
pub trait FieldAccessor: Send + Sync {
    fn children(&self, node: &Node) -> Vec<Child>;
}

/// Default accessor over [`Shape`]: record fields in declaration order, list
/// items by index, and map entries as key then value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeAccessor;

impl FieldAccessor for ShapeAccessor {
    fn children(&self, node: &Node) -> Vec<Child> {
        match &node.shape {
            Shape::Record(fields) => fields
                .iter()
                .map(|f| Child {
                    slot: Slot::Field(f.name.clone()),
                    value: f.value.clone(),
                    declared: f.declared.clone(),
                })
                .collect(),
            Shape::List { element, items } => items
                .iter()
                .enumerate()
                .map(|(i, v)| Child {
                    slot: Slot::Index(i),
                    value: v.clone(),
                    declared: element.clone(),
                })
                .collect(),
            Shape::Map {
                key,
                value,
                entries,
            } => {
                let mut out = Vec::with_capacity(entries.len() * 2);
                for (i, (k, v)) in entries.iter().enumerate() {
                    out.push(Child {
                        slot: Slot::Key(i),
                        value: k.clone(),
                        declared: key.clone(),
                    });
                    out.push(Child {
                        slot: Slot::Value(i),
                        value: v.clone(),
                        declared: value.clone(),
                    });
                }
                out
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Field;

    #[test]
    fn test_record_children_in_declaration_order() {
        let node = Node::record(
            "Person",
            vec![Field::new("name", "string", "Ada"), Field::new("age", "int", 36)],
        );
        let children = ShapeAccessor.children(&node);
        let slots: Vec<String> = children.iter().map(|c| c.slot.to_string()).collect();
        assert_eq!(slots, vec![".name", ".age"]);
        assert_eq!(children[1].declared, TypeTag::new("int"));
    }

    #[test]
    fn test_map_children_interleave_keys_and_values() {
        let node = Node::map(
            "map",
            "string",
            "int",
            vec![(Value::from("a"), Value::from(1)), (Value::from("b"), Value::from(2))],
        );
        let children = ShapeAccessor.children(&node);
        let slots: Vec<Slot> = children.into_iter().map(|c| c.slot).collect();
        assert_eq!(
            slots,
            vec![Slot::Key(0), Slot::Value(0), Slot::Key(1), Slot::Value(1)]
        );
    }

    #[test]
    fn test_enumeration_is_repeatable() {
        let node = Node::list("list", "int", vec![Value::from(1), Value::from(2)]);
        let first = ShapeAccessor.children(&node);
        let second = ShapeAccessor.children(&node);
        assert!(first.iter().zip(&second).all(|(a, b)| a.same_position(b)));
    }
}
