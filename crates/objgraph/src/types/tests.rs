// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//! Tests for TypeHierarchy.

use super::*;
use crate::error::HierarchyError;

fn tags(names: &[&str]) -> Vec<TypeTag> {
    names.iter().map(|n| TypeTag::new(n)).collect()
}

#[test]
fn test_builtin_lineages() {
    let h = TypeHierarchy::builtin();

    assert_eq!(
        h.lineage(&"int".into()).unwrap(),
        tags(&["int", "number", "scalar", "object", "comparable"]).as_slice()
    );
    assert_eq!(
        h.lineage(&"list".into()).unwrap(),
        tags(&["list", "object", "sequence", "collection"]).as_slice()
    );
    assert_eq!(h.lineage(&TypeTag::object()).unwrap(), tags(&["object"]).as_slice());
    assert!(h.lineage(&"ghost".into()).is_none());
}

#[test]
fn test_lineage_orders_classes_before_contracts() {
    let h = TypeHierarchy::builder()
        .contract("Named", &[])
        .contract("Aged", &[])
        .contract("Payable", &["Named"])
        .class_implementing("Person", "record", &["Named", "Aged"])
        .class_implementing("Employee", "Person", &["Payable"])
        .build()
        .expect("valid hierarchy");

    assert_eq!(
        h.lineage(&"Employee".into()).unwrap(),
        tags(&["Employee", "Person", "record", "object", "Payable", "Named", "Aged"]).as_slice()
    );
    assert!(h.is_subtype(&"Employee".into(), &"Named".into()));
    assert!(!h.is_subtype(&"Person".into(), &"Payable".into()));
}

#[test]
fn test_contract_declaration_order_is_kept() {
    let h = TypeHierarchy::builder()
        .contract("Zeta", &[])
        .contract("Alpha", &[])
        .class_implementing("Thing", "object", &["Zeta", "Alpha"])
        .build()
        .expect("valid hierarchy");

    let lineage = h.lineage(&"Thing".into()).unwrap();
    assert_eq!(&lineage[2..], tags(&["Zeta", "Alpha"]).as_slice());
}

#[test]
fn test_class_without_parent_extends_object() {
    let h = TypeHierarchy::builder()
        .declare(TypeDecl {
            name: "Loose".into(),
            kind: TypeKind::Class,
            parent: None,
            contracts: Vec::new(),
        })
        .build()
        .expect("valid hierarchy");

    assert_eq!(h.parent(&"Loose".into()), Some(&TypeTag::object()));
}

#[test]
fn test_build_rejects_invalid_declarations() {
    let dup = TypeHierarchy::builder().class("int", "number").build();
    assert_eq!(dup.unwrap_err(), HierarchyError::Duplicate("int".into()));

    let unknown = TypeHierarchy::builder().class("A", "Missing").build();
    assert!(matches!(unknown, Err(HierarchyError::UnknownType { .. })));

    let parent_contract = TypeHierarchy::builder().class("A", "comparable").build();
    assert!(matches!(
        parent_contract,
        Err(HierarchyError::ParentIsContract { .. })
    ));

    let not_contract = TypeHierarchy::builder()
        .class_implementing("A", "object", &["int"])
        .build();
    assert!(matches!(not_contract, Err(HierarchyError::NotAContract { .. })));

    let empty = TypeHierarchy::builder().class("", "object").build();
    assert_eq!(empty.unwrap_err(), HierarchyError::EmptyName);
}

#[test]
fn test_build_rejects_cycles() {
    let classes = TypeHierarchy::builder()
        .class("A", "B")
        .class("B", "A")
        .build();
    assert!(matches!(classes, Err(HierarchyError::Cycle(_))));

    let contracts = TypeHierarchy::builder()
        .contract("X", &["Y"])
        .contract("Y", &["X"])
        .build();
    assert!(matches!(contracts, Err(HierarchyError::Cycle(_))));
}

#[test]
fn test_declared_types_are_queryable() {
    let h = TypeHierarchy::builder()
        .contract("Named", &[])
        .contract("Tagged", &[])
        .class_implementing("Person", "record", &["Tagged", "Named"])
        .build()
        .unwrap();

    assert_eq!(h.kind(&"Person".into()), Some(TypeKind::Class));
    assert_eq!(h.kind(&"Named".into()), Some(TypeKind::Contract));
    assert_eq!(h.kind(&"comparable".into()), Some(TypeKind::Contract));
    assert_eq!(h.kind(&"Ghost".into()), None);

    assert_eq!(h.contracts(&"Person".into()), tags(&["Tagged", "Named"]).as_slice());
    assert_eq!(h.contracts(&"list".into()), tags(&["sequence"]).as_slice());
    assert!(h.contracts(&"object".into()).is_empty());
    assert!(h.contracts(&"Ghost".into()).is_empty());

    let declared: Vec<&TypeTag> = h.types().collect();
    assert_eq!(declared.len(), h.len());
    assert_eq!(declared.first().map(|t| t.as_str()), Some("object"));
    assert_eq!(
        declared[declared.len() - 3..]
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>(),
        ["Named", "Tagged", "Person"]
    );
    assert_eq!(h.len(), TypeHierarchy::builtin().len() + 3);
}
