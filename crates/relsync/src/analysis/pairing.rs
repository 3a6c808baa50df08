//! Bidirectional pairing
//!
//! Matches each association with its inverse. A pair is always recorded on
//! both sides, so `R.inverse_field_name == O.field_name` holds exactly when
//! `O.inverse_field_name == R.field_name`.

use log::{debug, warn};

use crate::{
    model::RelationshipInfo,
    naming::{decapitalize, pluralize},
};

/// A relationship with more than one qualifying inverse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousInverse {
    pub source_entity: String,
    pub field_name: String,
    /// Field names of every candidate, the chosen one first
    pub candidates: Vec<String>,
}

/// Output of the pairing stage
#[derive(Debug, Clone)]
pub struct PairingOutcome {
    pub relationships: Vec<RelationshipInfo>,
    pub ambiguities: Vec<AmbiguousInverse>,
}

/// Resolves inverse sides by `mappedBy` and, optionally, by field name
#[derive(Debug)]
pub struct PairingResolver {
    infer_by_name: bool,
}

impl PairingResolver {
    pub fn new(infer_by_name: bool) -> Self {
        Self { infer_by_name }
    }

    pub fn resolve(&self, relationships: Vec<RelationshipInfo>) -> PairingOutcome {
        let mut partners: Vec<Option<usize>> = vec![None; relationships.len()];
        let mut ambiguities = Vec::new();

        self.pair_pass(&relationships, &mut partners, &mut ambiguities, is_mapped_by_pair);
        if self.infer_by_name {
            self.pair_pass(&relationships, &mut partners, &mut ambiguities, is_name_pair);
        }

        let paired = partners.iter().filter(|p| p.is_some()).count();
        debug!("Paired {paired} of {} relationships", relationships.len());

        let inverse_names: Vec<Option<String>> = partners
            .iter()
            .map(|partner| partner.map(|index| relationships[index].field_name.clone()))
            .collect();

        let relationships = relationships
            .into_iter()
            .zip(inverse_names)
            .map(|(relationship, inverse)| match inverse {
                Some(inverse) => relationship.paired_with(inverse),
                None => relationship,
            })
            .collect();

        PairingOutcome {
            relationships,
            ambiguities,
        }
    }

    fn pair_pass(
        &self,
        relationships: &[RelationshipInfo],
        partners: &mut [Option<usize>],
        ambiguities: &mut Vec<AmbiguousInverse>,
        matches: fn(&RelationshipInfo, &RelationshipInfo) -> bool,
    ) {
        for index in 0..relationships.len() {
            let relationship = &relationships[index];
            if partners[index].is_some() || !is_pairable(relationship) {
                continue;
            }

            let candidates: Vec<usize> = relationships
                .iter()
                .enumerate()
                .filter(|&(other_index, other)| {
                    other_index != index
                        && partners[other_index].is_none()
                        && is_pairable(other)
                        && other.source_entity == relationship.target_entity
                        && other.target_entity == relationship.source_entity
                        && matches(relationship, other)
                })
                .map(|(other_index, _)| other_index)
                .collect();

            let Some(&chosen) = candidates.first() else {
                continue;
            };

            if candidates.len() > 1 {
                let names: Vec<String> = candidates
                    .iter()
                    .map(|&candidate| relationships[candidate].field_name.clone())
                    .collect();
                warn!(
                    "Ambiguous inverse for {}: candidates {}; using '{}'",
                    relationship.key(),
                    names.join(", "),
                    names[0]
                );
                ambiguities.push(AmbiguousInverse {
                    source_entity: relationship.source_entity.clone(),
                    field_name: relationship.field_name.clone(),
                    candidates: names,
                });
            }

            partners[index] = Some(chosen);
            partners[chosen] = Some(index);
        }
    }
}

fn is_pairable(relationship: &RelationshipInfo) -> bool {
    relationship.relation_type.is_association() && relationship.has_target()
}

/// One side names the other in `mappedBy`
fn is_mapped_by_pair(relationship: &RelationshipInfo, other: &RelationshipInfo) -> bool {
    other.mapped_by.as_deref() == Some(relationship.field_name.as_str())
        || relationship.mapped_by.as_deref() == Some(other.field_name.as_str())
}

/// Neither side declares `mappedBy`, the types complement each other and
/// the other field is named after this relationship's source entity
fn is_name_pair(relationship: &RelationshipInfo, other: &RelationshipInfo) -> bool {
    if relationship.mapped_by.is_some() || other.mapped_by.is_some() {
        return false;
    }
    if !relationship.relation_type.complements(other.relation_type) {
        return false;
    }
    let expected = decapitalize(relationship.source_simple_name());
    other.field_name == expected || other.field_name == pluralize(&expected)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::RelationType;

    fn department_employee() -> Vec<RelationshipInfo> {
        vec![
            RelationshipInfo::new(
                "Department",
                "Employee",
                RelationType::OneToMany,
                "employees",
                "List<Employee>",
                Some("department".to_owned()),
            ),
            RelationshipInfo::new(
                "Employee",
                "Department",
                RelationType::ManyToOne,
                "department",
                "Department",
                None,
            ),
        ]
    }

    #[test]
    fn test_mapped_by_pairs_both_sides() {
        let outcome = PairingResolver::new(false).resolve(department_employee());
        let [employees, department] = outcome.relationships.as_slice() else {
            panic!("expected two relationships");
        };

        assert!(employees.is_bidirectional && department.is_bidirectional);
        assert_eq!(employees.inverse_field_name.as_deref(), Some("department"));
        assert_eq!(department.inverse_field_name.as_deref(), Some("employees"));
        assert!(outcome.ambiguities.is_empty());
    }

    #[test]
    fn test_pairing_is_symmetric() {
        let mut relationships = department_employee();
        relationships.push(RelationshipInfo::new(
            "Employee",
            "Badge",
            RelationType::OneToOne,
            "badge",
            "Badge",
            None,
        ));
        relationships.push(RelationshipInfo::new(
            "Badge",
            "Employee",
            RelationType::OneToOne,
            "holder",
            "Employee",
            Some("badge".to_owned()),
        ));
        let outcome = PairingResolver::new(false).resolve(relationships);

        for relationship in &outcome.relationships {
            let inverse_name = relationship
                .inverse_field_name
                .as_deref()
                .expect("every relationship is paired");
            let inverse = outcome
                .relationships
                .iter()
                .find(|other| {
                    other.source_entity == relationship.target_entity
                        && other.field_name == inverse_name
                })
                .expect("inverse exists");
            assert_eq!(
                inverse.inverse_field_name.as_deref(),
                Some(relationship.field_name.as_str())
            );
        }
    }

    #[test]
    fn test_unidirectional_lookup_stays_unpaired() {
        let relationships = vec![RelationshipInfo::new(
            "Order",
            "Currency",
            RelationType::ManyToOne,
            "currency",
            "Currency",
            None,
        )];
        let outcome = PairingResolver::new(false).resolve(relationships);
        assert!(!outcome.relationships[0].is_bidirectional);
        assert_eq!(outcome.relationships[0].inverse_field_name, None);
    }

    #[test]
    fn test_ambiguous_inverse_takes_first_and_reports() {
        let mut relationships = department_employee();
        relationships.reverse();
        relationships.push(RelationshipInfo::new(
            "Department",
            "Employee",
            RelationType::OneToMany,
            "alumni",
            "List<Employee>",
            Some("department".to_owned()),
        ));
        let outcome = PairingResolver::new(false).resolve(relationships);

        assert_eq!(outcome.ambiguities.len(), 1);
        assert_eq!(
            outcome.ambiguities[0].candidates,
            vec!["employees".to_owned(), "alumni".to_owned()]
        );
        assert_eq!(
            outcome.relationships[0].inverse_field_name.as_deref(),
            Some("employees")
        );
        assert!(!outcome.relationships[2].is_bidirectional);
    }

    #[test]
    fn test_name_inference_is_opt_in() {
        let mut relationships = department_employee();
        relationships[0].mapped_by = None;

        let without = PairingResolver::new(false).resolve(relationships.clone());
        assert!(without.relationships.iter().all(|r| !r.is_bidirectional));

        let with = PairingResolver::new(true).resolve(relationships);
        assert!(with.relationships.iter().all(|r| r.is_bidirectional));
        assert_eq!(
            with.relationships[0].inverse_field_name.as_deref(),
            Some("department")
        );
    }
}
