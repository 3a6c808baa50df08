//! Relationship analysis
//!
//! The analysis stages progressively enrich one flat list of
//! [`RelationshipInfo`]s: classification creates it, cycle detection marks
//! circular members, pairing links inverse sides and the cascade advisor
//! settles defaults once all facts are known.

pub mod cascade_advisor;
pub mod classifier;
pub mod diagnostics;
pub mod pairing;
pub mod pipeline;
pub mod relationship_graph;

pub use cascade_advisor::{CascadeAdvisor, CascadePolicy, PolicyInput};
pub use classifier::{EntityClassification, RelationshipClassifier};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use pairing::{AmbiguousInverse, PairingOutcome, PairingResolver};
pub use pipeline::run_analysis_pipeline;
pub use relationship_graph::{
    Cycle, CycleDetector, RelationshipGraph, detect_circular_dependencies, mark_circular,
};

use crate::model::{EntityField, RelationshipInfo};

/// One analyzed entity
#[derive(Debug, Clone)]
pub struct AnalyzedEntity {
    /// Qualified entity name
    pub name: String,
    pub table: Option<String>,
    pub fields: Vec<EntityField>,
}

/// Results from the analysis pipeline
#[derive(Debug, Default)]
pub struct AnalysisResults {
    /// Analyzed entities in declaration order
    pub entities: Vec<AnalyzedEntity>,

    /// Every classified relationship, paired and marked
    pub relationships: Vec<RelationshipInfo>,

    /// Distinct cycles of the relationship graph
    pub cycles: Vec<Cycle>,

    pub diagnostics: Diagnostics,
}

impl AnalysisResults {
    /// Relationships declared by one entity
    pub fn relationships_of<'a>(
        &'a self,
        entity: &'a str,
    ) -> impl Iterator<Item = &'a RelationshipInfo> + 'a {
        self.relationships
            .iter()
            .filter(move |relationship| relationship.source_entity == entity)
    }

    /// The paired inverse of a bidirectional relationship
    pub fn find_inverse(&self, relationship: &RelationshipInfo) -> Option<&RelationshipInfo> {
        let inverse_field = relationship.inverse_field_name.as_deref()?;
        self.relationships.iter().find(|other| {
            other.source_entity == relationship.target_entity
                && other.target_entity == relationship.source_entity
                && other.field_name == inverse_field
        })
    }

    pub fn entity(&self, name: &str) -> Option<&AnalyzedEntity> {
        self.entities.iter().find(|entity| entity.name == name)
    }
}
