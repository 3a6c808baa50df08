//! Per-relationship generation flags derived from the advised policy

use crate::{
    config::Config,
    model::{CascadeType, RelationType, RelationshipInfo, cascades},
};

/// What the synthesizer emits for one relationship; lives for one pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CascadeConfiguration {
    pub generate_orphan_removal: bool,
    pub cascade_persist: bool,
    pub cascade_merge: bool,
    pub cascade_remove: bool,
    pub cascade_refresh: bool,
    pub cascade_detach: bool,
    pub circular_reference_guard: bool,
}

impl CascadeConfiguration {
    pub fn for_relationship(relationship: &RelationshipInfo, config: &Config) -> Self {
        let cascade_types = &relationship.cascade_types;
        Self {
            generate_orphan_removal: relationship.orphan_removal
                && matches!(
                    relationship.relation_type,
                    RelationType::OneToOne | RelationType::OneToMany
                ),
            cascade_persist: cascades(cascade_types, CascadeType::Persist),
            cascade_merge: cascades(cascade_types, CascadeType::Merge),
            cascade_remove: cascades(cascade_types, CascadeType::Remove),
            cascade_refresh: cascades(cascade_types, CascadeType::Refresh),
            cascade_detach: cascades(cascade_types, CascadeType::Detach),
            circular_reference_guard: relationship.is_circular && config.circular_reference_guard,
        }
    }

    /// Cascaded operations in declaration order, for documentation
    pub fn cascaded_operations(self) -> Vec<&'static str> {
        [
            (self.cascade_persist, "persist"),
            (self.cascade_merge, "merge"),
            (self.cascade_remove, "remove"),
            (self.cascade_refresh, "refresh"),
            (self.cascade_detach, "detach"),
        ]
        .into_iter()
        .filter_map(|(enabled, name)| enabled.then_some(name))
        .collect()
    }
}
