// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-memory object graph.
//!
//! Leaves are plain values; structural nodes live behind a shared
//! [`NodeRef`] so the same node can be reachable from several parents (or
//! from itself). Identity is the address of the shared allocation, never the
//! node's contents.

use crate::error::ShapeError;
use crate::types::{builtin, TypeTag};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::fmt;
use std::sync::Arc;

/// Identity of a shared node. Stable while any [`NodeRef`] to it is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// A value in the graph.
#[derive(Clone)]
pub enum Value {
    /// Absence marker.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    Char(char),
    /// Structural node, shared by identity.
    Node(NodeRef),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Runtime type used for dispatch. `None` for the absence marker.
    pub fn runtime_type(&self) -> Option<TypeTag> {
        let name = match self {
            Self::Null => return None,
            Self::Bool(_) => builtin::BOOL,
            Self::Int(_) => builtin::INT,
            Self::Float(_) => builtin::FLOAT,
            Self::Str(_) => builtin::STRING,
            Self::Char(_) => builtin::CHAR,
            Self::Node(node) => return Some(node.type_tag()),
        };
        Some(TypeTag::new(name))
    }

    pub fn as_node(&self) -> Option<&NodeRef> {
        match self {
            Self::Node(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Equality for leaves; nodes compare by identity only.
    ///
    /// `NaN` equals `NaN` here, so a copied value always equals its source.
    /// Deep comparison of nodes is the engine's job.
    pub fn leaf_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => float_eq(*a, *b),
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::Node(a), Self::Node(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

/// `==` except that `NaN` equals `NaN`.
pub(crate) fn float_eq(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(v) => write!(f, "Bool({v})"),
            Self::Int(v) => write!(f, "Int({v})"),
            Self::Float(v) => write!(f, "Float({v})"),
            Self::Str(v) => write!(f, "Str({v:?})"),
            Self::Char(v) => write!(f, "Char({v:?})"),
            // Never recurse: the node may be part of a cycle.
            Self::Node(n) => write!(f, "Node({} @ {:?})", n.type_tag(), n.id()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Self::Char(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(Arc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(Arc::from(v))
    }
}

impl From<NodeRef> for Value {
    fn from(v: NodeRef) -> Self {
        Self::Node(v)
    }
}

/// Position of a child inside its parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Slot {
    Field(Arc<str>),
    Index(usize),
    /// Key of the n-th map entry.
    Key(usize),
    /// Value of the n-th map entry.
    Value(usize),
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => write!(f, ".{name}"),
            Self::Index(i) | Self::Value(i) => write!(f, "[{i}]"),
            Self::Key(i) => write!(f, "{{{i}}}"),
        }
    }
}

/// A named record member with its declared type.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: Arc<str>,
    pub declared: TypeTag,
    pub value: Value,
}

impl Field {
    pub fn new(name: impl AsRef<str>, declared: impl Into<TypeTag>, value: impl Into<Value>) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            declared: declared.into(),
            value: value.into(),
        }
    }
}

/// Structural layout of a node.
#[derive(Debug, Clone)]
pub enum Shape {
    Record(Vec<Field>),
    List {
        element: TypeTag,
        items: Vec<Value>,
    },
    Map {
        key: TypeTag,
        value: TypeTag,
        entries: Vec<(Value, Value)>,
    },
}

impl Shape {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Record(_) => "record",
            Self::List { .. } => "list",
            Self::Map { .. } => "map",
        }
    }

    /// Same layout with every child slot emptied.
    pub fn empty_like(&self) -> Self {
        match self {
            Self::Record(fields) => Self::Record(
                fields
                    .iter()
                    .map(|f| Field {
                        name: f.name.clone(),
                        declared: f.declared.clone(),
                        value: Value::Null,
                    })
                    .collect(),
            ),
            Self::List { element, items } => Self::List {
                element: element.clone(),
                items: Vec::with_capacity(items.len()),
            },
            Self::Map {
                key,
                value,
                entries,
            } => Self::Map {
                key: key.clone(),
                value: value.clone(),
                entries: Vec::with_capacity(entries.len()),
            },
        }
    }

    /// Number of child slots.
    pub fn len(&self) -> usize {
        match self {
            Self::Record(fields) => fields.len(),
            Self::List { items, .. } => items.len(),
            Self::Map { entries, .. } => entries.len() * 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A structural node: its runtime type plus its children.
#[derive(Debug, Clone)]
pub struct Node {
    pub type_tag: TypeTag,
    pub shape: Shape,
}

impl Node {
    pub fn new(type_tag: impl Into<TypeTag>, shape: Shape) -> Self {
        Self {
            type_tag: type_tag.into(),
            shape,
        }
    }

    /// Record node. Field names are expected to be unique: slots are
    /// addressed by name, and [`put`](Self::put) rejects a name that occurs
    /// more than once.
    pub fn record(type_tag: impl Into<TypeTag>, fields: Vec<Field>) -> Self {
        Self::new(type_tag, Shape::Record(fields))
    }

    pub fn list(type_tag: impl Into<TypeTag>, element: impl Into<TypeTag>, items: Vec<Value>) -> Self {
        Self::new(
            type_tag,
            Shape::List {
                element: element.into(),
                items,
            },
        )
    }

    pub fn map(
        type_tag: impl Into<TypeTag>,
        key: impl Into<TypeTag>,
        value: impl Into<TypeTag>,
        entries: Vec<(Value, Value)>,
    ) -> Self {
        Self::new(
            type_tag,
            Shape::Map {
                key: key.into(),
                value: value.into(),
                entries,
            },
        )
    }

    /// Record field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match &self.shape {
            Shape::Record(fields) => fields.iter().find(|f| &*f.name == name).map(|f| &f.value),
            _ => None,
        }
    }

    /// List item by index.
    pub fn item(&self, index: usize) -> Option<&Value> {
        match &self.shape {
            Shape::List { items, .. } => items.get(index),
            _ => None,
        }
    }

    /// Write `value` into `slot`.
    ///
    /// Record fields are replaced by name (appended if absent; an error if
    /// the name is held by more than one field). List items
    /// and map keys must be written in order; a map value goes to an entry
    /// whose key was already written.
    pub fn put(&mut self, slot: &Slot, value: Value) -> Result<(), ShapeError> {
        let shape = self.shape.kind_name();
        let mismatch = || ShapeError::SlotMismatch {
            slot: slot.to_string(),
            shape,
        };
        match (&mut self.shape, slot) {
            (Shape::Record(fields), Slot::Field(name)) => {
                let mut matching = fields.iter_mut().filter(|f| f.name == *name);
                if let Some(field) = matching.next() {
                    if matching.next().is_some() {
                        return Err(ShapeError::DuplicateField(name.to_string()));
                    }
                    field.value = value;
                } else {
                    fields.push(Field {
                        name: name.clone(),
                        declared: TypeTag::object(),
                        value,
                    });
                }
                Ok(())
            }
            (Shape::List { items, .. }, Slot::Index(i)) => put_indexed(items, *i, value),
            (Shape::Map { entries, .. }, Slot::Key(i)) => {
                if *i < entries.len() {
                    entries[*i].0 = value;
                    Ok(())
                } else if *i == entries.len() {
                    entries.push((value, Value::Null));
                    Ok(())
                } else {
                    Err(ShapeError::Gap {
                        index: *i,
                        len: entries.len(),
                    })
                }
            }
            (Shape::Map { entries, .. }, Slot::Value(i)) => match entries.get_mut(*i) {
                Some(entry) => {
                    entry.1 = value;
                    Ok(())
                }
                None => Err(ShapeError::Gap {
                    index: *i,
                    len: entries.len(),
                }),
            },
            _ => Err(mismatch()),
        }
    }
}

fn put_indexed(items: &mut Vec<Value>, index: usize, value: Value) -> Result<(), ShapeError> {
    if index < items.len() {
        items[index] = value;
        Ok(())
    } else if index == items.len() {
        items.push(value);
        Ok(())
    } else {
        Err(ShapeError::Gap {
            index,
            len: items.len(),
        })
    }
}

/// Shared handle to a [`Node`]; clones alias the same node.
///
/// Graphs containing cycles keep themselves alive; call [`clear`](Self::clear)
/// on a node of the cycle to release it.
#[derive(Clone)]
pub struct NodeRef(Arc<RwLock<Node>>);

impl NodeRef {
    pub fn new(node: Node) -> Self {
        Self(Arc::new(RwLock::new(node)))
    }

    pub fn id(&self) -> NodeId {
        NodeId(Arc::as_ptr(&self.0) as *const () as usize)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn type_tag(&self) -> TypeTag {
        self.0.read().type_tag.clone()
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Node> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Node> {
        self.0.write()
    }

    /// Record field by name (cloned out of the lock).
    pub fn field(&self, name: &str) -> Option<Value> {
        self.read().field(name).cloned()
    }

    /// List item by index (cloned out of the lock).
    pub fn item(&self, index: usize) -> Option<Value> {
        self.read().item(index).cloned()
    }

    /// Set a record field, appending it with declared type `object` if absent.
    pub fn set_field(&self, name: &str, value: impl Into<Value>) -> Result<(), ShapeError> {
        self.write().put(&Slot::Field(Arc::from(name)), value.into())
    }

    /// Empty every child slot, breaking any cycle through this node.
    pub fn clear(&self) {
        let mut node = self.write();
        node.shape = node.shape.empty_like();
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeRef({} @ {:?})", self.type_tag(), self.id())
    }
}
