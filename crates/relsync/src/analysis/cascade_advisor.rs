//! Cascade and fetch policy advice
//!
//! Explicit annotation values always win. Without them the advisor picks a
//! default that never cascades `REMOVE` across a circular edge or from the
//! non-owning side of a relationship, so a delete cannot walk back through
//! shared or cyclic references.

use std::collections::BTreeSet;

use log::trace;

use crate::model::{CascadeType, FetchType, RelationType};

/// Facts about a relationship that the default policy depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyInput {
    pub relation_type: RelationType,
    pub owner_side: bool,
    pub bidirectional: bool,
    pub circular: bool,
}

/// Advised cascade set and fetch type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadePolicy {
    pub cascade_types: BTreeSet<CascadeType>,
    pub fetch_type: FetchType,
    /// The cascade set came from the annotation
    pub explicit: bool,
}

#[derive(Debug)]
pub struct CascadeAdvisor;

impl CascadeAdvisor {
    /// Combine explicit annotation values with the default table
    pub fn advise(
        explicit_cascade: &[String],
        explicit_fetch: Option<&str>,
        input: PolicyInput,
    ) -> CascadePolicy {
        let fetch_type = Self::parse_fetch(explicit_fetch);
        match Self::parse_cascade(explicit_cascade) {
            Some(cascade_types) => CascadePolicy {
                cascade_types,
                fetch_type,
                explicit: true,
            },
            None => CascadePolicy {
                cascade_types: Self::suggest_cascade(input),
                fetch_type,
                explicit: false,
            },
        }
    }

    /// Default cascade set for a relationship without an explicit one
    pub fn suggest_cascade(input: PolicyInput) -> BTreeSet<CascadeType> {
        use crate::model::CascadeType::{All, Merge, Persist, Refresh};

        let suggested: &[CascadeType] = match input.relation_type {
            RelationType::None | RelationType::Inheritance => &[],
            _ if input.circular => &[Persist, Merge],
            RelationType::OneToOne if input.owner_side => &[All],
            RelationType::OneToOne => &[Persist, Merge],
            RelationType::OneToMany if input.bidirectional => &[Persist, Merge, Refresh],
            RelationType::OneToMany => &[All],
            RelationType::ManyToOne => &[Persist, Merge, Refresh],
            RelationType::ManyToMany => &[Persist, Merge],
            RelationType::Embedded | RelationType::Composition => &[All],
        };

        trace!("Suggested cascade {suggested:?} for {input:?}");
        suggested.iter().copied().collect()
    }

    /// Explicit cascade values; `None` when absent or nothing is recognised
    pub fn parse_cascade(values: &[String]) -> Option<BTreeSet<CascadeType>> {
        let parsed: BTreeSet<_> = values
            .iter()
            .filter_map(|value| CascadeType::parse(value))
            .collect();
        (!parsed.is_empty()).then_some(parsed)
    }

    /// `EAGER` only when explicitly requested
    pub fn parse_fetch(value: Option<&str>) -> FetchType {
        match value.map(|v| crate::naming::simple_name(v.trim())) {
            Some("EAGER") => FetchType::Eager,
            _ => FetchType::Lazy,
        }
    }
}
