// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Built-in handlers and comparators.
//!
//! [`standard_handlers`] installs the set that makes `convert(root, object)`
//! a deep, identity-preserving clone, plus scalar conversions between the
//! built-in leaf types.

use crate::accessor::Child;
use crate::error::{HandlerError, RegistryError};
use crate::handler::{Comparator, Handler, LeafComparator, LeafHandler, StructuralHandler};
use crate::registry::HandlerRegistry;
use crate::types::{builtin, TypeTag};
use crate::value::{float_eq, Field, Node, Shape, Slot, Value};
use std::sync::Arc;

fn unsupported(value: &Value, target: &TypeTag) -> HandlerError {
    HandlerError::Unsupported {
        source_type: value.runtime_type().unwrap_or_else(TypeTag::object),
        target: target.clone(),
    }
}

fn parse_error(input: &str, target: &TypeTag) -> HandlerError {
    HandlerError::Parse {
        input: input.to_string(),
        target: target.clone(),
    }
}

// ============================================================================
// Leaf handlers
// ============================================================================

/// Returns the value unchanged. Leaves are immutable, so sharing is a copy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl LeafHandler for Identity {
    fn convert(&self, value: &Value, _target: &TypeTag) -> Result<Value, HandlerError> {
        Ok(value.clone())
    }
}

/// Renders any scalar as text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToText;

impl LeafHandler for ToText {
    fn convert(&self, value: &Value, target: &TypeTag) -> Result<Value, HandlerError> {
        let text = match value {
            Value::Str(_) => return Ok(value.clone()),
            Value::Bool(v) => v.to_string(),
            Value::Int(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Char(v) => v.to_string(),
            Value::Null | Value::Node(_) => return Err(unsupported(value, target)),
        };
        Ok(Value::from(text))
    }
}

/// Integer conversion. Floats are truncated toward zero and must fit `i64`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToInt;

impl LeafHandler for ToInt {
    fn convert(&self, value: &Value, target: &TypeTag) -> Result<Value, HandlerError> {
        match value {
            Value::Int(_) => Ok(value.clone()),
            Value::Bool(v) => Ok(Value::Int(i64::from(*v))),
            Value::Float(v) => float_to_int(*v, target).map(Value::Int),
            Value::Str(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| parse_error(s, target)),
            Value::Char(c) => c
                .to_digit(10)
                .map(|d| Value::Int(i64::from(d)))
                .ok_or_else(|| parse_error(&c.to_string(), target)),
            Value::Null | Value::Node(_) => Err(unsupported(value, target)),
        }
    }
}

// i64::MAX is not representable as f64; 2^63 is the first value past the range.
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

fn float_to_int(v: f64, target: &TypeTag) -> Result<i64, HandlerError> {
    let t = v.trunc();
    if t.is_finite() && t >= i64::MIN as f64 && t < I64_UPPER {
        Ok(t as i64)
    } else {
        Err(HandlerError::OutOfRange {
            value: v.to_string(),
            target: target.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ToFloat;

impl LeafHandler for ToFloat {
    fn convert(&self, value: &Value, target: &TypeTag) -> Result<Value, HandlerError> {
        match value {
            Value::Float(_) => Ok(value.clone()),
            Value::Int(v) => Ok(Value::Float(*v as f64)),
            Value::Bool(v) => Ok(Value::Float(if *v { 1.0 } else { 0.0 })),
            Value::Str(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| parse_error(s, target)),
            Value::Char(_) | Value::Null | Value::Node(_) => Err(unsupported(value, target)),
        }
    }
}

/// Numbers are true when non-zero; text accepts `true`/`false`/`1`/`0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToBool;

impl LeafHandler for ToBool {
    fn convert(&self, value: &Value, target: &TypeTag) -> Result<Value, HandlerError> {
        match value {
            Value::Bool(_) => Ok(value.clone()),
            Value::Int(v) => Ok(Value::Bool(*v != 0)),
            Value::Float(v) => Ok(Value::Bool(*v != 0.0)),
            Value::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(Value::Bool(true)),
                "false" | "0" => Ok(Value::Bool(false)),
                _ => Err(parse_error(s, target)),
            },
            Value::Char(_) | Value::Null | Value::Node(_) => Err(unsupported(value, target)),
        }
    }
}

/// Single-character text to `char`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToChar;

impl LeafHandler for ToChar {
    fn convert(&self, value: &Value, target: &TypeTag) -> Result<Value, HandlerError> {
        match value {
            Value::Char(_) => Ok(value.clone()),
            Value::Str(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::Char(c)),
                    _ => Err(parse_error(s, target)),
                }
            }
            _ => Err(unsupported(value, target)),
        }
    }
}

// ============================================================================
// Structural handlers
// ============================================================================

/// Same type, same layout; every child is cloned in turn.
#[derive(Debug, Clone, Copy, Default)]
pub struct CloneStructure;

impl StructuralHandler for CloneStructure {
    fn shell(&self, source: &Node, _target: &TypeTag) -> Result<Node, HandlerError> {
        Ok(Node::new(source.type_tag.clone(), source.shape.empty_like()))
    }

    fn child_target(&self, _child: &Child, _target: &TypeTag) -> Option<TypeTag> {
        Some(TypeTag::object())
    }
}

/// Converts list items (or map values) to `element`. Map keys are cloned.
///
/// The result node takes the requested target type.
#[derive(Debug, Clone)]
pub struct ConvertElements {
    pub element: TypeTag,
}

impl ConvertElements {
    pub fn new(element: impl Into<TypeTag>) -> Self {
        Self {
            element: element.into(),
        }
    }
}

impl StructuralHandler for ConvertElements {
    fn shell(&self, source: &Node, target: &TypeTag) -> Result<Node, HandlerError> {
        let shape = match &source.shape {
            Shape::List { items, .. } => Shape::List {
                element: self.element.clone(),
                items: Vec::with_capacity(items.len()),
            },
            Shape::Map { key, entries, .. } => Shape::Map {
                key: key.clone(),
                value: self.element.clone(),
                entries: Vec::with_capacity(entries.len()),
            },
            Shape::Record(_) => {
                return Err(HandlerError::WrongShape {
                    expected: "list or map",
                    found: "record",
                })
            }
        };
        Ok(Node::new(target.clone(), shape))
    }

    fn child_target(&self, child: &Child, _target: &TypeTag) -> Option<TypeTag> {
        match child.slot {
            Slot::Key(_) => Some(TypeTag::object()),
            _ => Some(self.element.clone()),
        }
    }
}

/// Maps a record onto a target record type.
///
/// Listed fields are converted to their declared target type; source fields
/// not listed are dropped. A listed field missing from the source stays null.
#[derive(Debug, Clone, Default)]
pub struct ConvertRecord {
    pub fields: Vec<(String, TypeTag)>,
}

impl ConvertRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, ty: impl Into<TypeTag>) -> Self {
        self.fields.push((name.into(), ty.into()));
        self
    }
}

impl StructuralHandler for ConvertRecord {
    fn shell(&self, source: &Node, target: &TypeTag) -> Result<Node, HandlerError> {
        if !matches!(source.shape, Shape::Record(_)) {
            return Err(HandlerError::WrongShape {
                expected: "record",
                found: source.shape.kind_name(),
            });
        }
        let fields = self
            .fields
            .iter()
            .map(|(name, ty)| Field::new(name, ty.clone(), Value::Null))
            .collect();
        Ok(Node::record(target.clone(), fields))
    }

    fn child_target(&self, child: &Child, _target: &TypeTag) -> Option<TypeTag> {
        let Slot::Field(name) = &child.slot else {
            return None;
        };
        self.fields
            .iter()
            .find(|(n, _)| n.as_str() == &**name)
            .map(|(_, ty)| ty.clone())
    }
}

// ============================================================================
// Comparators
// ============================================================================

/// `int` and `float` compare by numeric value; `NaN` equals `NaN`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericEquality;

impl LeafComparator for NumericEquality {
    fn equal(&self, left: &Value, right: &Value) -> bool {
        match (left, right) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                *a as f64 == *b
            }
            (Value::Float(a), Value::Float(b)) => float_eq(*a, *b),
            _ => left.leaf_eq(right),
        }
    }
}

// ============================================================================
// Installers
// ============================================================================

/// Register the built-in handlers.
pub fn standard_handlers(registry: &HandlerRegistry<Handler>) -> Result<(), RegistryError> {
    use builtin::*;
    registry.register(SCALAR, OBJECT, Handler::leaf(Identity))?;
    registry.register(OBJECT, OBJECT, Handler::structural(CloneStructure))?;
    registry.register(SCALAR, STRING, Handler::leaf(ToText))?;
    registry.register(SCALAR, INT, Handler::leaf(ToInt))?;
    registry.register(SCALAR, FLOAT, Handler::leaf(ToFloat))?;
    registry.register(SCALAR, BOOL, Handler::leaf(ToBool))?;
    registry.register(STRING, CHAR, Handler::leaf(ToChar))?;
    log::debug!("[convert] installed {} standard handlers", registry.len());
    Ok(())
}

/// Register the built-in comparators.
pub fn standard_comparators(registry: &HandlerRegistry<Comparator>) -> Result<(), RegistryError> {
    use builtin::*;
    let numeric: Comparator = Arc::new(NumericEquality);
    registry.register(NUMBER, INT, Arc::clone(&numeric))?;
    registry.register(NUMBER, FLOAT, numeric)?;
    Ok(())
}
