//! Consistency validators and the recursion-safety self check
//!
//! The generated validators are diagnostic aids: they report inconsistent
//! object graphs or configurations and never throw or repair anything.

use log::debug;
use rustc_hash::FxHashSet;

use super::{GUARD_INTERFACE, GeneratedEntity, context::MemberNames};
use crate::{
    analysis::{AnalysisResults, AnalyzedEntity, DiagnosticKind, Diagnostics, Severity},
    config::Config,
    java_ast::{Expr, MethodDecl, MethodKind, Stmt, Visibility},
    java_builder::{
        and, assign, bool_literal, call, call_this, comment, declare, for_each, if_then,
        instance_of, is_null, local, method, not, not_null, not_same, or, return_value, this,
        this_field,
    },
    model::{CascadeType, RelationType, RelationshipInfo, cascades},
    naming::{safe_identifier, simple_name, singularize},
};

const VALID: &str = "valid";

/// Validator methods of one entity
pub fn validator_methods(
    entity: &AnalyzedEntity,
    results: &AnalysisResults,
    config: &Config,
    diagnostics: &mut Diagnostics,
) -> Vec<MethodDecl> {
    let relationships: Vec<&RelationshipInfo> = results
        .relationships_of(&entity.name)
        .filter(|relationship| {
            relationship.has_target() && relationship.relation_type.is_association()
        })
        .collect();

    let mut methods = vec![validate_relationships(&relationships, results)];
    if relationships.iter().any(|relationship| relationship.is_circular) {
        methods.push(validate_circular_dependencies(&relationships, config));
    }
    methods.push(validate_cascade_type_consistency(
        &relationships,
        results,
        diagnostics,
    ));
    methods
}

/// `boolean valid = true; ... return valid;`
fn aggregate(name: &str, doc: String, checks: Vec<Stmt>) -> MethodDecl {
    let mut body = vec![declare("boolean", VALID, bool_literal(true))];
    body.extend(checks);
    body.push(return_value(local(VALID)));
    method(MethodKind::Validator, Visibility::Public, name)
        .doc(doc)
        .returns("boolean")
        .body(body)
}

fn invalidate() -> Stmt {
    assign(local(VALID), bool_literal(false))
}

/// Check `condition` against the field value, or against every element
///
/// A null element inside a collection counts as a violation.
fn per_value(relationship: &RelationshipInfo, failed: impl Fn(Expr) -> Expr) -> Stmt {
    let names = MemberNames::for_field(&relationship.field_name, true);
    let target = simple_name(&relationship.target_entity);
    if relationship.relation_type.is_collection() {
        let element = safe_identifier(&singularize(&relationship.field_name)).into_owned();
        for_each(
            target,
            &element,
            call_this(&names.getter, vec![]),
            vec![if_then(
                or(vec![is_null(local(&element)), failed(local(&element))]),
                vec![invalidate()],
            )],
        )
    } else {
        let value = this_field(&relationship.field_name);
        if_then(
            and(vec![not_null(value.clone()), failed(value)]),
            vec![invalidate()],
        )
    }
}

fn validate_relationships(
    relationships: &[&RelationshipInfo],
    results: &AnalysisResults,
) -> MethodDecl {
    let mut checks = Vec::new();
    for relationship in relationships {
        let Some(inverse) = results.find_inverse(relationship) else {
            continue;
        };
        let inverse_names =
            MemberNames::for_field(&inverse.field_name, inverse.relation_type.is_collection());
        checks.push(comment(format!(
            "{} <-> {}.{}",
            relationship.field_name,
            simple_name(&inverse.source_entity),
            inverse.field_name
        )));
        let inverse_collection = inverse.relation_type.is_collection();
        checks.push(per_value(relationship, |value| {
            let back = call(value, &inverse_names.getter, vec![]);
            if inverse_collection {
                not(call(back, "contains", vec![this()]))
            } else {
                not_same(back, this())
            }
        }));
    }
    if checks.is_empty() {
        checks.push(comment("no bidirectional relationships"));
    }

    aggregate(
        "validateRelationships",
        "Returns false when an inverse side no longer points back at this entity.".to_owned(),
        checks,
    )
}

/// The guard interface is emitted whenever this method exists, so the
/// `instanceof` check always refers to a declared type
fn validate_circular_dependencies(
    relationships: &[&RelationshipInfo],
    config: &Config,
) -> MethodDecl {
    let mut checks = Vec::new();
    for relationship in relationships.iter().filter(|r| r.is_circular) {
        checks.push(comment(format!("{} is on a reference cycle", relationship.key())));
        checks.push(per_value(relationship, |value| {
            not(instance_of(value, GUARD_INTERFACE))
        }));
    }

    let doc = if config.circular_reference_guard {
        format!("Returns false when a value on a reference cycle is not a {GUARD_INTERFACE}.")
    } else {
        format!(
            "Returns false when a value on a reference cycle is not a {GUARD_INTERFACE}.\n\
             Cycle members are not generated with the guard, so this fails until they implement it."
        )
    };
    aggregate("validateCircularDependencies", doc, checks)
}

/// Compares cascade settings of both sides while generating and records
/// the verdict as a constant
fn validate_cascade_type_consistency(
    relationships: &[&RelationshipInfo],
    results: &AnalysisResults,
    diagnostics: &mut Diagnostics,
) -> MethodDecl {
    let mut findings = Vec::new();
    for relationship in relationships {
        for finding in cascade_findings(relationship, results.find_inverse(relationship)) {
            diagnostics.report(
                Severity::Warning,
                DiagnosticKind::CascadeConflict,
                &relationship.source_entity,
                Some(relationship.field_name.as_str()),
                finding.clone(),
            );
            findings.push(finding);
        }
    }

    let mut body: Vec<Stmt> = findings.iter().map(|finding| comment(finding.clone())).collect();
    body.push(return_value(bool_literal(findings.is_empty())));

    method(
        MethodKind::Validator,
        Visibility::Public,
        "validateCascadeTypeConsistency",
    )
    .doc(
        "Verdict computed from the mapping at generation time.\n\
         Cascade settings are not re-read at runtime.",
    )
    .returns("boolean")
    .body(body)
}

/// Contradictory cascade and orphan-removal settings of one relationship
pub fn cascade_findings(
    relationship: &RelationshipInfo,
    inverse: Option<&RelationshipInfo>,
) -> Vec<String> {
    let mut findings = Vec::new();
    let removes = cascades(&relationship.cascade_types, CascadeType::Remove);

    if removes && relationship.relation_type == RelationType::ManyToOne {
        findings.push(format!(
            "{}: REMOVE cascades from the many side to a shared {}",
            relationship.field_name,
            relationship.target_simple_name()
        ));
    }
    if removes && relationship.is_circular {
        findings.push(format!(
            "{}: REMOVE cascades around a reference cycle",
            relationship.field_name
        ));
    }
    if relationship.orphan_removal && !cascades(&relationship.cascade_types, CascadeType::Persist)
    {
        findings.push(format!(
            "{}: orphanRemoval without PERSIST leaves new children transient",
            relationship.field_name
        ));
    }

    if let Some(inverse) = inverse {
        let inverse_removes = cascades(&inverse.cascade_types, CascadeType::Remove);
        if removes && inverse_removes && relationship.is_owner_side {
            findings.push(format!(
                "{}: REMOVE cascades in both directions with {}.{}",
                relationship.field_name,
                relationship.target_simple_name(),
                inverse.field_name
            ));
        }
        if relationship.orphan_removal && inverse_removes {
            findings.push(format!(
                "{}: orphanRemoval while {}.{} cascades REMOVE back",
                relationship.field_name,
                relationship.target_simple_name(),
                inverse.field_name
            ));
        }
    }
    findings
}

/// Report every public mutator that calls a public mutator on another object
pub fn check_recursion_safety(entities: &[GeneratedEntity], diagnostics: &mut Diagnostics) {
    let public_mutators: FxHashSet<&str> = entities
        .iter()
        .flat_map(|entity| &entity.methods)
        .filter(|method| method.kind.is_public_mutator())
        .map(|method| method.name.as_str())
        .collect();

    let mut checked = 0usize;
    for entity in entities {
        for method in entity
            .methods
            .iter()
            .filter(|method| method.kind.is_public_mutator())
        {
            checked += 1;
            for callee in foreign_calls(method) {
                if public_mutators.contains(callee) {
                    diagnostics.report(
                        Severity::Error,
                        DiagnosticKind::RecursionHazard,
                        &entity.entity,
                        Some(method.name.as_str()),
                        format!("public mutator calls public mutator '{callee}' on another object"),
                    );
                }
            }
        }
    }
    debug!("Recursion safety check covered {checked} public mutators");
}

/// Names of methods called on receivers other than `this`
fn foreign_calls(method: &MethodDecl) -> Vec<&str> {
    let mut callees = Vec::new();
    for stmt in &method.body {
        stmt.walk_exprs(&mut |expr| {
            if let Expr::Call {
                receiver: Some(receiver),
                method,
                ..
            } = expr
                && **receiver != Expr::This
            {
                callees.push(method.as_str());
            }
        });
    }
    callees
}
