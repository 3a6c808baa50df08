//! Normalized relationship model
//!
//! `RelationshipInfo` is the unit every stage works on. The classifier
//! creates it from one field (or from a superclass link); later stages
//! only enrich it through the consuming `with_*`/`marked_*` helpers, and
//! never touch the identity fields (source, target, type, field name).

use std::{collections::BTreeSet, fmt};

use crate::naming::simple_name;

/// Kind of relationship carried by a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum RelationType {
    #[default]
    None,
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
    Embedded,
    Inheritance,
    Composition,
}

impl RelationType {
    /// Entity-to-entity associations, the only types that take part in pairing
    pub fn is_association(self) -> bool {
        matches!(
            self,
            Self::OneToOne | Self::OneToMany | Self::ManyToOne | Self::ManyToMany
        )
    }

    /// Associations whose field holds a collection of targets
    pub fn is_collection(self) -> bool {
        matches!(self, Self::OneToMany | Self::ManyToMany)
    }

    /// Fields holding a collection, whether of entities or of values
    pub fn is_collection_valued(self) -> bool {
        self.is_collection() || self == Self::Composition
    }

    /// Types that may declare `mappedBy` and therefore have an inverse side
    pub fn can_be_inverse_side(self) -> bool {
        matches!(self, Self::OneToOne | Self::OneToMany | Self::ManyToMany)
    }

    /// Whether `other` is the type expected on the opposite side of `self`
    pub fn complements(self, other: Self) -> bool {
        matches!(
            (self, other),
            (Self::OneToOne, Self::OneToOne)
                | (Self::OneToMany, Self::ManyToOne)
                | (Self::ManyToOne, Self::OneToMany)
                | (Self::ManyToMany, Self::ManyToMany)
        )
    }

    /// JPA annotation simple name for association types
    pub fn annotation_name(self) -> Option<&'static str> {
        match self {
            Self::OneToOne => Some("OneToOne"),
            Self::OneToMany => Some("OneToMany"),
            Self::ManyToOne => Some("ManyToOne"),
            Self::ManyToMany => Some("ManyToMany"),
            Self::Embedded => Some("Embedded"),
            Self::Composition => Some("ElementCollection"),
            Self::None | Self::Inheritance => None,
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "NONE",
            Self::OneToOne => "ONE_TO_ONE",
            Self::OneToMany => "ONE_TO_MANY",
            Self::ManyToOne => "MANY_TO_ONE",
            Self::ManyToMany => "MANY_TO_MANY",
            Self::Embedded => "EMBEDDED",
            Self::Inheritance => "INHERITANCE",
            Self::Composition => "COMPOSITION",
        };
        f.write_str(name)
    }
}

/// JPA lifecycle operations that may cascade across a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CascadeType {
    All,
    Persist,
    Merge,
    Remove,
    Refresh,
    Detach,
}

impl CascadeType {
    /// Parse `ALL`, `CascadeType.ALL` or `jakarta.persistence.CascadeType.ALL`
    pub fn parse(text: &str) -> Option<Self> {
        match simple_name(text.trim()) {
            "ALL" => Some(Self::All),
            "PERSIST" => Some(Self::Persist),
            "MERGE" => Some(Self::Merge),
            "REMOVE" => Some(Self::Remove),
            "REFRESH" => Some(Self::Refresh),
            "DETACH" => Some(Self::Detach),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Persist => "PERSIST",
            Self::Merge => "MERGE",
            Self::Remove => "REMOVE",
            Self::Refresh => "REFRESH",
            Self::Detach => "DETACH",
        }
    }
}

impl fmt::Display for CascadeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a cascade set covers `operation`, either directly or through `ALL`
pub fn cascades(set: &BTreeSet<CascadeType>, operation: CascadeType) -> bool {
    set.contains(&operation) || set.contains(&CascadeType::All)
}

/// Association fetch strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FetchType {
    #[default]
    Lazy,
    Eager,
}

impl fmt::Display for FetchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lazy => f.write_str("LAZY"),
            Self::Eager => f.write_str("EAGER"),
        }
    }
}

/// JPA inheritance mapping strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InheritanceStrategy {
    #[default]
    SingleTable,
    Joined,
    TablePerClass,
}

impl InheritanceStrategy {
    pub fn parse(text: &str) -> Option<Self> {
        match simple_name(text.trim()) {
            "SINGLE_TABLE" => Some(Self::SingleTable),
            "JOINED" => Some(Self::Joined),
            "TABLE_PER_CLASS" => Some(Self::TablePerClass),
            _ => None,
        }
    }
}

impl fmt::Display for InheritanceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleTable => f.write_str("SINGLE_TABLE"),
            Self::Joined => f.write_str("JOINED"),
            Self::TablePerClass => f.write_str("TABLE_PER_CLASS"),
        }
    }
}

/// Strategy and discriminator details of an inheritance link
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InheritanceInfo {
    pub strategy: InheritanceStrategy,
    /// Whether the strategy was declared on this entity rather than inherited
    pub declared_here: bool,
    pub discriminator_column: Option<String>,
    pub discriminator_value: Option<String>,
}

/// One analyzed field of an entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityField {
    pub name: String,
    pub declared_type: String,
    pub nullable: bool,
    pub column_name: String,
    pub relation_type: RelationType,
    /// Qualified target entity, empty when the field is not a relationship
    /// or the target could not be resolved
    pub target_entity: String,
}

/// A normalized, classified relationship
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipInfo {
    pub source_entity: String,
    pub target_entity: String,
    pub relation_type: RelationType,
    pub field_name: String,
    /// Declared Java type of the field, e.g. `List<Employee>`
    pub field_type: String,
    pub mapped_by: Option<String>,
    pub join_table: Option<String>,
    pub join_columns: Vec<String>,
    pub inverse_join_columns: Vec<String>,
    pub cascade_types: BTreeSet<CascadeType>,
    /// Cascade set came from the annotation and must not be re-advised
    pub cascade_explicit: bool,
    pub fetch_type: FetchType,
    pub orphan_removal: bool,
    pub is_bidirectional: bool,
    pub inverse_field_name: Option<String>,
    pub is_owner_side: bool,
    pub is_circular: bool,
    pub additional_fields: Vec<String>,
    pub inheritance: Option<InheritanceInfo>,
}

/// Sentinel field name of inheritance relationships
pub const SUPERCLASS_FIELD: &str = "superclass";

impl RelationshipInfo {
    /// Create a relationship with owner side derived from `mapped_by`
    pub fn new(
        source_entity: impl Into<String>,
        target_entity: impl Into<String>,
        relation_type: RelationType,
        field_name: impl Into<String>,
        field_type: impl Into<String>,
        mapped_by: Option<String>,
    ) -> Self {
        let is_owner_side = owner_side(relation_type, mapped_by.as_deref());
        Self {
            source_entity: source_entity.into(),
            target_entity: target_entity.into(),
            relation_type,
            field_name: field_name.into(),
            field_type: field_type.into(),
            mapped_by,
            join_table: None,
            join_columns: Vec::new(),
            inverse_join_columns: Vec::new(),
            cascade_types: BTreeSet::new(),
            cascade_explicit: false,
            fetch_type: FetchType::Lazy,
            orphan_removal: false,
            is_bidirectional: false,
            inverse_field_name: None,
            is_owner_side,
            is_circular: false,
            additional_fields: Vec::new(),
            inheritance: None,
        }
    }

    /// Record the inverse side found by the pairing resolver
    pub fn paired_with(mut self, inverse_field_name: impl Into<String>) -> Self {
        self.is_bidirectional = true;
        self.inverse_field_name = Some(inverse_field_name.into());
        self
    }

    /// Flag membership in at least one detected cycle
    pub fn marked_circular(mut self) -> Self {
        self.is_circular = true;
        self
    }

    /// Whether the target entity could be resolved to a name at all
    pub fn has_target(&self) -> bool {
        !self.target_entity.trim().is_empty()
    }

    pub fn is_self_reference(&self) -> bool {
        self.source_entity == self.target_entity
    }

    pub fn source_simple_name(&self) -> &str {
        simple_name(&self.source_entity)
    }

    pub fn target_simple_name(&self) -> &str {
        simple_name(&self.target_entity)
    }

    /// Identity used for matching across stages
    pub fn key(&self) -> RelationshipKey<'_> {
        RelationshipKey {
            source_entity: &self.source_entity,
            target_entity: &self.target_entity,
            relation_type: self.relation_type,
            field_name: &self.field_name,
        }
    }
}

/// Identity of a relationship: source, target, type and field name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RelationshipKey<'a> {
    pub source_entity: &'a str,
    pub target_entity: &'a str,
    pub relation_type: RelationType,
    pub field_name: &'a str,
}

impl fmt::Display for RelationshipKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} -> {} ({})",
            simple_name(self.source_entity),
            self.field_name,
            simple_name(self.target_entity),
            self.relation_type
        )
    }
}

/// Owner side rule: `mappedBy` marks the inverse side, except for
/// many-to-one which always owns the foreign key
pub fn owner_side(relation_type: RelationType, mapped_by: Option<&str>) -> bool {
    match relation_type {
        RelationType::ManyToOne => true,
        RelationType::OneToOne | RelationType::OneToMany | RelationType::ManyToMany => {
            mapped_by.is_none()
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_side_follows_mapped_by() {
        assert!(owner_side(RelationType::OneToMany, None));
        assert!(!owner_side(RelationType::OneToMany, Some("department")));
        assert!(!owner_side(RelationType::OneToOne, Some("user")));
        assert!(owner_side(RelationType::ManyToOne, Some("ignored")));
    }

    #[test]
    fn test_enrichment_keeps_identity() {
        let original = RelationshipInfo::new(
            "com.acme.Department",
            "com.acme.Employee",
            RelationType::OneToMany,
            "employees",
            "List<Employee>",
            Some("department".to_owned()),
        );
        let enriched = original.clone().paired_with("department").marked_circular();

        assert_eq!(original.key(), enriched.key());
        assert!(enriched.is_bidirectional);
        assert!(enriched.is_circular);
        assert_eq!(enriched.inverse_field_name.as_deref(), Some("department"));
        assert!(!enriched.is_owner_side);
    }

    #[test]
    fn test_cascade_parsing_accepts_prefixes() {
        assert_eq!(CascadeType::parse("CascadeType.ALL"), Some(CascadeType::All));
        assert_eq!(
            CascadeType::parse("jakarta.persistence.CascadeType.MERGE"),
            Some(CascadeType::Merge)
        );
        assert_eq!(CascadeType::parse(" PERSIST "), Some(CascadeType::Persist));
        assert_eq!(CascadeType::parse("EVERYTHING"), None);
    }

    #[test]
    fn test_cascades_through_all() {
        let set: BTreeSet<_> = [CascadeType::All].into_iter().collect();
        assert!(cascades(&set, CascadeType::Remove));
        let set: BTreeSet<_> = [CascadeType::Persist].into_iter().collect();
        assert!(!cascades(&set, CascadeType::Remove));
    }
}
