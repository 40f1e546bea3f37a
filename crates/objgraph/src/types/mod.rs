// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type model for handler dispatch.
//!
//! Provides `TypeTag` for naming types and `TypeHierarchy` for the explicit
//! class/contract relationships that resolution walks.

mod hierarchy;
mod tag;

pub use hierarchy::{TypeDecl, TypeHierarchy, TypeHierarchyBuilder, TypeKind};
pub use tag::{builtin, TypeTag};

#[cfg(test)]
mod tests;
