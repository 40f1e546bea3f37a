// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Explicit class/contract hierarchy used for handler resolution.
//!
//! Types are either *classes* (single parent, ending at `object`) or
//! *contracts* (capabilities a class advertises, which may extend other
//! contracts). The hierarchy is immutable once built; each type's lookup
//! order is computed up front so resolution never re-walks the graph.

use super::tag::{builtin, TypeTag};
use crate::error::HierarchyError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Whether a type is a class or a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Class,
    Contract,
}

/// Declarative form of one type, as found in configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,

    #[serde(default)]
    pub kind: TypeKind,

    /// Parent class. Classes without one extend `object`.
    #[serde(default)]
    pub parent: Option<String>,

    /// Contracts implemented (classes) or extended (contracts), in order.
    #[serde(default)]
    pub contracts: Vec<String>,
}

impl TypeDecl {
    pub fn class(name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Class,
            parent: Some(parent.into()),
            contracts: Vec::new(),
        }
    }

    pub fn contract(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Contract,
            parent: None,
            contracts: Vec::new(),
        }
    }

    pub fn with_contracts(mut self, contracts: &[&str]) -> Self {
        self.contracts
            .extend(contracts.iter().map(|c| (*c).to_string()));
        self
    }
}

#[derive(Debug, Clone)]
struct TypeDef {
    kind: TypeKind,
    parent: Option<TypeTag>,
    contracts: Vec<TypeTag>,
}

/// Fluent builder for [`TypeHierarchy`].
///
/// Starts from the built-in types; validation happens in [`build`](Self::build).
#[derive(Debug)]
pub struct TypeHierarchyBuilder {
    decls: Vec<TypeDecl>,
}

impl TypeHierarchyBuilder {
    /// Builder pre-populated with the built-in types.
    pub fn new() -> Self {
        use builtin::*;
        let decls = vec![
            TypeDecl {
                name: OBJECT.to_string(),
                kind: TypeKind::Class,
                parent: None,
                contracts: Vec::new(),
            },
            TypeDecl::contract(COMPARABLE),
            TypeDecl::contract(COLLECTION),
            TypeDecl::contract(SEQUENCE).with_contracts(&[COLLECTION]),
            TypeDecl::class(SCALAR, OBJECT),
            TypeDecl::class(BOOL, SCALAR),
            TypeDecl::class(NUMBER, SCALAR).with_contracts(&[COMPARABLE]),
            TypeDecl::class(INT, NUMBER),
            TypeDecl::class(FLOAT, NUMBER),
            TypeDecl::class(STRING, SCALAR).with_contracts(&[COMPARABLE]),
            TypeDecl::class(CHAR, SCALAR).with_contracts(&[COMPARABLE]),
            TypeDecl::class(RECORD, OBJECT),
            TypeDecl::class(LIST, OBJECT).with_contracts(&[SEQUENCE]),
            TypeDecl::class(MAP, OBJECT).with_contracts(&[COLLECTION]),
        ];
        Self { decls }
    }

    /// Declare a class extending `parent`.
    pub fn class(self, name: &str, parent: &str) -> Self {
        self.declare(TypeDecl::class(name, parent))
    }

    /// Declare a class extending `parent` and implementing `contracts` in order.
    pub fn class_implementing(self, name: &str, parent: &str, contracts: &[&str]) -> Self {
        self.declare(TypeDecl::class(name, parent).with_contracts(contracts))
    }

    /// Declare a contract extending `extends` in order.
    pub fn contract(self, name: &str, extends: &[&str]) -> Self {
        self.declare(TypeDecl::contract(name).with_contracts(extends))
    }

    pub fn declare(mut self, decl: TypeDecl) -> Self {
        self.decls.push(decl);
        self
    }

    pub fn declare_all(mut self, decls: impl IntoIterator<Item = TypeDecl>) -> Self {
        self.decls.extend(decls);
        self
    }

    /// Validate every declaration and precompute lookup orders.
    pub fn build(self) -> Result<TypeHierarchy, HierarchyError> {
        let mut defs: HashMap<TypeTag, TypeDef> = HashMap::with_capacity(self.decls.len());
        let mut order: Vec<TypeTag> = Vec::with_capacity(self.decls.len());

        for decl in self.decls {
            if decl.name.is_empty() {
                return Err(HierarchyError::EmptyName);
            }
            let tag = TypeTag::from(decl.name);
            let parent = match (decl.kind, decl.parent) {
                (TypeKind::Contract, Some(_)) => {
                    return Err(HierarchyError::ContractWithParent(tag));
                }
                (TypeKind::Contract, None) => None,
                (TypeKind::Class, Some(p)) => Some(TypeTag::from(p)),
                (TypeKind::Class, None) if tag.as_str() == builtin::OBJECT => None,
                (TypeKind::Class, None) => Some(TypeTag::object()),
            };
            let def = TypeDef {
                kind: decl.kind,
                parent,
                contracts: decl.contracts.into_iter().map(TypeTag::from).collect(),
            };
            if defs.insert(tag.clone(), def).is_some() {
                return Err(HierarchyError::Duplicate(tag));
            }
            order.push(tag);
        }

        for tag in &order {
            let def = &defs[tag];
            if let Some(parent) = &def.parent {
                match defs.get(parent) {
                    None => {
                        return Err(HierarchyError::UnknownType {
                            ty: tag.clone(),
                            missing: parent.clone(),
                        })
                    }
                    Some(p) if p.kind == TypeKind::Contract => {
                        return Err(HierarchyError::ParentIsContract {
                            ty: tag.clone(),
                            parent: parent.clone(),
                        })
                    }
                    Some(_) => {}
                }
            }
            for contract in &def.contracts {
                match defs.get(contract) {
                    None => {
                        return Err(HierarchyError::UnknownType {
                            ty: tag.clone(),
                            missing: contract.clone(),
                        })
                    }
                    Some(c) if c.kind == TypeKind::Class => {
                        return Err(HierarchyError::NotAContract {
                            ty: tag.clone(),
                            other: contract.clone(),
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        check_acyclic(&defs, &order)?;

        let lineages = order
            .iter()
            .map(|tag| (tag.clone(), compute_lineage(&defs, tag)))
            .collect();

        log::debug!("[hierarchy] built {} types", order.len());
        Ok(TypeHierarchy {
            defs,
            order,
            lineages,
        })
    }
}

impl Default for TypeHierarchyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn check_acyclic(defs: &HashMap<TypeTag, TypeDef>, order: &[TypeTag]) -> Result<(), HierarchyError> {
    // Class chains: every walk must reach a root within |defs| steps.
    for tag in order {
        let mut cur = tag;
        let mut steps = 0usize;
        while let Some(parent) = defs[cur].parent.as_ref() {
            steps += 1;
            if steps > defs.len() {
                return Err(HierarchyError::Cycle(tag.clone()));
            }
            cur = parent;
        }
    }

    // Contract inheritance: colouring DFS.
    let mut done: HashSet<&TypeTag> = HashSet::new();
    let mut on_stack: HashSet<&TypeTag> = HashSet::new();

    fn visit<'a>(
        tag: &'a TypeTag,
        defs: &'a HashMap<TypeTag, TypeDef>,
        done: &mut HashSet<&'a TypeTag>,
        on_stack: &mut HashSet<&'a TypeTag>,
    ) -> Result<(), HierarchyError> {
        if done.contains(tag) {
            return Ok(());
        }
        if !on_stack.insert(tag) {
            return Err(HierarchyError::Cycle(tag.clone()));
        }
        for next in &defs[tag].contracts {
            visit(next, defs, done, on_stack)?;
        }
        on_stack.remove(tag);
        done.insert(tag);
        Ok(())
    }

    for tag in order {
        if defs[tag].kind == TypeKind::Contract {
            visit(tag, defs, &mut done, &mut on_stack)?;
        }
    }
    Ok(())
}

/// The type itself, its class chain up to `object`, then every contract
/// reachable from that chain: per class (most specific first), each declared
/// contract followed depth-first by the contracts it extends.
fn compute_lineage(defs: &HashMap<TypeTag, TypeDef>, tag: &TypeTag) -> Arc<[TypeTag]> {
    let mut out = vec![tag.clone()];
    let mut seen: HashSet<TypeTag> = HashSet::from([tag.clone()]);

    let mut chain = vec![tag];
    let mut cur = tag;
    while let Some(parent) = defs[cur].parent.as_ref() {
        chain.push(parent);
        if seen.insert(parent.clone()) {
            out.push(parent.clone());
        }
        cur = parent;
    }

    fn push_contract(
        contract: &TypeTag,
        defs: &HashMap<TypeTag, TypeDef>,
        out: &mut Vec<TypeTag>,
        seen: &mut HashSet<TypeTag>,
    ) {
        if !seen.insert(contract.clone()) {
            return;
        }
        out.push(contract.clone());
        for extended in &defs[contract].contracts {
            push_contract(extended, defs, out, seen);
        }
    }

    for class in chain {
        for contract in &defs[class].contracts {
            push_contract(contract, defs, &mut out, &mut seen);
        }
    }
    out.into()
}

/// Immutable, validated type hierarchy.
#[derive(Debug, Clone)]
pub struct TypeHierarchy {
    defs: HashMap<TypeTag, TypeDef>,
    order: Vec<TypeTag>,
    lineages: HashMap<TypeTag, Arc<[TypeTag]>>,
}

impl TypeHierarchy {
    /// Hierarchy with only the built-in types.
    pub fn builtin() -> Self {
        #[allow(clippy::expect_used)] // static table, validated by tests
        TypeHierarchyBuilder::new()
            .build()
            .expect("built-in hierarchy is valid")
    }

    pub fn builder() -> TypeHierarchyBuilder {
        TypeHierarchyBuilder::new()
    }

    pub fn contains(&self, tag: &TypeTag) -> bool {
        self.defs.contains_key(tag)
    }

    pub fn kind(&self, tag: &TypeTag) -> Option<TypeKind> {
        self.defs.get(tag).map(|d| d.kind)
    }

    pub fn parent(&self, tag: &TypeTag) -> Option<&TypeTag> {
        self.defs.get(tag)?.parent.as_ref()
    }

    /// Contracts declared directly on `tag`, in declaration order.
    pub fn contracts(&self, tag: &TypeTag) -> &[TypeTag] {
        self.defs
            .get(tag)
            .map(|d| d.contracts.as_slice())
            .unwrap_or(&[])
    }

    /// Resolution order for `tag`, most specific first. `None` if undeclared.
    pub fn lineage(&self, tag: &TypeTag) -> Option<&[TypeTag]> {
        self.lineages.get(tag).map(|l| &l[..])
    }

    /// True if `sub` is `sup` or reaches it through parents or contracts.
    pub fn is_subtype(&self, sub: &TypeTag, sup: &TypeTag) -> bool {
        self.lineage(sub)
            .is_some_and(|lineage| lineage.iter().any(|t| t == sup))
    }

    /// Declared types in declaration order.
    pub fn types(&self) -> impl Iterator<Item = &TypeTag> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for TypeHierarchy {
    fn default() -> Self {
        Self::builtin()
    }
}
