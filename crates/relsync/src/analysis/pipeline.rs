//! Analysis pipeline runner
//!
//! Runs the stages in order on one batch of entities. Per-relationship
//! problems become diagnostics; only cancellation aborts the run.

use anyhow::{Result, bail};
use log::{debug, info};

use super::{
    AnalysisResults, AnalyzedEntity,
    cascade_advisor::{CascadeAdvisor, PolicyInput},
    classifier::RelationshipClassifier,
    diagnostics::{DiagnosticKind, Diagnostics, Severity},
    pairing::{AmbiguousInverse, PairingResolver},
    relationship_graph::{detect_circular_dependencies, mark_circular},
};
use crate::{
    cancellation::CancellationToken,
    code_model::{CodeModel, EntityKind},
    config::Config,
    model::{RelationType, RelationshipInfo},
};

/// Run the complete analysis pipeline over every entity of the model
///
/// Stages:
/// 1. Classification of fields and inheritance links
/// 2. Cycle detection and circular marking (when enabled)
/// 3. Bidirectional pairing
/// 4. Cascade re-advice for relationships without an explicit cascade
/// 5. Diagnostics for unresolved, ambiguous and attributed relationships
pub fn run_analysis_pipeline(
    model: &dyn CodeModel,
    config: &Config,
    cancel: &CancellationToken,
) -> Result<AnalysisResults> {
    info!("Starting analysis pipeline");
    let mut results = AnalysisResults::default();

    debug!("Stage 1: Classifying entities");
    let classifier = RelationshipClassifier::new(model);
    let mut relationships = Vec::new();
    for entity in model
        .entities()
        .iter()
        .filter(|entity| entity.kind == EntityKind::Entity)
    {
        let classification = classifier.classify_entity(entity);
        relationships.extend(classification.relationships);
        results.entities.push(AnalyzedEntity {
            name: entity.name.clone(),
            table: entity.table.clone(),
            fields: classification.fields,
        });
    }
    info!(
        "Classified {} entities with {} relationships",
        results.entities.len(),
        relationships.len()
    );
    check_cancelled(cancel)?;

    if config.detect_cycles {
        debug!("Stage 2: Detecting circular dependencies");
        let cycles = detect_circular_dependencies(&relationships, cancel)?;
        if cycles.is_empty() {
            debug!("No circular dependencies detected");
        } else {
            info!("Found {} circular dependencies", cycles.len());
            for cycle in &cycles {
                debug!("Cycle: {}", cycle.describe());
            }
        }
        relationships = mark_circular(relationships, &cycles);
        results.cycles = cycles;
    } else {
        debug!("Stage 2: Cycle detection disabled, skipping");
    }

    debug!("Stage 3: Pairing bidirectional relationships");
    let outcome = PairingResolver::new(config.infer_inverse_by_name).resolve(relationships);
    check_cancelled(cancel)?;

    debug!("Stage 4: Settling cascade defaults");
    results.relationships = outcome
        .relationships
        .into_iter()
        .map(readvise_cascade)
        .collect();

    debug!("Stage 5: Collecting diagnostics");
    let severity = Severity::for_mode(config.validation_mode);
    results.diagnostics =
        collect_diagnostics(&results.relationships, &outcome.ambiguities, severity);

    info!(
        "Analysis complete: {} relationships, {} cycles, {} diagnostics",
        results.relationships.len(),
        results.cycles.len(),
        results.diagnostics.len()
    );
    Ok(results)
}

fn check_cancelled(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        bail!("Analysis cancelled");
    }
    Ok(())
}

/// Recompute a default cascade now that pairing and circularity are known
fn readvise_cascade(mut relationship: RelationshipInfo) -> RelationshipInfo {
    if !relationship.cascade_explicit {
        relationship.cascade_types = CascadeAdvisor::suggest_cascade(PolicyInput {
            relation_type: relationship.relation_type,
            owner_side: relationship.is_owner_side,
            bidirectional: relationship.is_bidirectional,
            circular: relationship.is_circular,
        });
    }
    relationship
}

fn collect_diagnostics(
    relationships: &[RelationshipInfo],
    ambiguities: &[AmbiguousInverse],
    severity: Severity,
) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();

    for relationship in relationships {
        if relationship.relation_type != RelationType::Inheritance && !relationship.has_target() {
            diagnostics.report(
                severity,
                DiagnosticKind::UnresolvedTarget,
                &relationship.source_entity,
                Some(relationship.field_name.as_str()),
                format!(
                    "{} field of type '{}' has no resolvable target entity; no code is \
                     generated for it",
                    relationship.relation_type, relationship.field_type
                ),
            );
        }

        if !relationship.additional_fields.is_empty() {
            diagnostics.report(
                Severity::Info,
                DiagnosticKind::AssociationAttributes,
                &relationship.source_entity,
                Some(relationship.field_name.as_str()),
                format!(
                    "join table carries extra attributes ({}); consider an association entity",
                    relationship.additional_fields.join(", ")
                ),
            );
        }
    }

    for ambiguity in ambiguities {
        diagnostics.report(
            severity,
            DiagnosticKind::AmbiguousInverse,
            &ambiguity.source_entity,
            Some(ambiguity.field_name.as_str()),
            format!(
                "multiple inverse candidates ({}); paired with '{}'",
                ambiguity.candidates.join(", "),
                ambiguity.candidates[0]
            ),
        );
    }

    diagnostics
}
