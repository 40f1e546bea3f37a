// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Interned type names.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Names of the types every [`super::TypeHierarchy`] starts with.
pub mod builtin {
    /// Universal root; every class chain ends here.
    pub const OBJECT: &str = "object";
    pub const SCALAR: &str = "scalar";
    pub const BOOL: &str = "bool";
    pub const NUMBER: &str = "number";
    pub const INT: &str = "int";
    pub const FLOAT: &str = "float";
    pub const STRING: &str = "string";
    pub const CHAR: &str = "char";
    pub const RECORD: &str = "record";
    pub const LIST: &str = "list";
    pub const MAP: &str = "map";

    pub const COMPARABLE: &str = "comparable";
    pub const COLLECTION: &str = "collection";
    pub const SEQUENCE: &str = "sequence";
}

/// Name of a type, compared structurally.
///
/// Cloning is a reference-count bump, so tags are passed by value freely.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeTag(Arc<str>);

impl TypeTag {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The universal root type.
    pub fn object() -> Self {
        Self::new(builtin::OBJECT)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeTag({})", self.0)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeTag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TypeTag {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl Borrow<str> for TypeTag {
    fn borrow(&self) -> &str {
        &self.0
    }
}
