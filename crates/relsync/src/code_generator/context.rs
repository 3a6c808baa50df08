use crate::{
    code_generator::cascade_config::CascadeConfiguration,
    config::Config,
    model::RelationshipInfo,
    naming::{capitalize, safe_identifier, singularize},
    type_ref::{CollectionKind, TypeRef},
};

/// Accessor names derived from a relationship field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberNames {
    pub getter: String,
    pub setter: String,
    pub internal_setter: String,
    pub adder: String,
    pub remover: String,
    pub internal_adder: String,
    pub internal_remover: String,
    pub clearer: String,
    pub counter: String,
    pub predicate: String,
    pub orphan_hook: String,
}

impl MemberNames {
    /// `employees` -> `getEmployees`, `addEmployee`, `internalRemoveEmployee`, ...
    pub fn for_field(field: &str, collection: bool) -> Self {
        let plural = capitalize(field);
        let singular = if collection {
            capitalize(&singularize(field))
        } else {
            plural.clone()
        };
        Self {
            getter: format!("get{plural}"),
            setter: format!("set{plural}"),
            internal_setter: format!("internalSet{plural}"),
            adder: format!("add{singular}"),
            remover: format!("remove{singular}"),
            internal_adder: format!("internalAdd{singular}"),
            internal_remover: format!("internalRemove{singular}"),
            clearer: format!("clear{plural}"),
            counter: format!("count{plural}"),
            predicate: format!("has{singular}"),
            orphan_hook: format!("on{singular}Orphaned"),
        }
    }
}

/// The paired inverse side as seen from the relationship being synthesized
#[derive(Debug, Clone)]
pub struct InverseSide {
    pub field: String,
    pub collection: bool,
    pub names: MemberNames,
}

#[derive(Debug)]
pub struct SynthesisContext<'a> {
    pub relationship: &'a RelationshipInfo,
    pub inverse: Option<InverseSide>,
    pub cascade: CascadeConfiguration,
    pub config: &'a Config,
    pub names: MemberNames,
}

impl<'a> SynthesisContext<'a> {
    pub fn new(
        relationship: &'a RelationshipInfo,
        inverse: Option<&RelationshipInfo>,
        config: &'a Config,
    ) -> Self {
        let inverse = inverse
            .filter(|_| relationship.is_bidirectional)
            .map(|inverse| InverseSide {
                field: inverse.field_name.clone(),
                collection: inverse.relation_type.is_collection(),
                names: MemberNames::for_field(
                    &inverse.field_name,
                    inverse.relation_type.is_collection(),
                ),
            });
        Self {
            relationship,
            inverse,
            cascade: CascadeConfiguration::for_relationship(relationship, config),
            config,
            names: MemberNames::for_field(
                &relationship.field_name,
                relationship.relation_type.is_collection_valued(),
            ),
        }
    }

    pub fn field(&self) -> &str {
        &self.relationship.field_name
    }

    /// Simple name of the target entity, used as the element or value type
    pub fn target_type(&self) -> &str {
        self.relationship.target_simple_name()
    }

    /// Simple name of the declaring entity
    pub fn source_type(&self) -> &str {
        self.relationship.source_simple_name()
    }

    pub fn collection_kind(&self) -> CollectionKind {
        TypeRef::parse(&self.relationship.field_type)
            .collection_kind()
            .unwrap_or(CollectionKind::List)
    }

    /// Declared interface type, e.g. `List<Employee>`
    pub fn collection_type(&self) -> String {
        format!(
            "{}<{}>",
            self.collection_kind().interface(),
            self.target_type()
        )
    }

    /// Parameter name for a single value of this relationship
    pub fn value_param(&self) -> String {
        safe_identifier(self.field()).into_owned()
    }

    /// Parameter name for one element of a collection relationship
    pub fn element_param(&self) -> String {
        safe_identifier(&singularize(self.field())).into_owned()
    }

    /// Local holding the previous value or owner, e.g. `previousDepartment`
    pub fn previous_local(&self, name: &str) -> String {
        format!("previous{}", capitalize(name))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::RelationType;

    #[test]
    fn test_collection_member_names() {
        let names = MemberNames::for_field("categories", true);
        assert_eq!(names.adder, "addCategory");
        assert_eq!(names.clearer, "clearCategories");
        assert_eq!(names.internal_remover, "internalRemoveCategory");
        assert_eq!(names.orphan_hook, "onCategoryOrphaned");
        assert_eq!(names.predicate, "hasCategory");
    }

    #[test]
    fn test_scalar_member_names() {
        let names = MemberNames::for_field("department", false);
        assert_eq!(names.getter, "getDepartment");
        assert_eq!(names.internal_setter, "internalSetDepartment");
        assert_eq!(names.predicate, "hasDepartment");
    }

    #[test]
    fn test_inverse_requires_pairing() {
        let config = Config::default();
        let employees = RelationshipInfo::new(
            "Department",
            "Employee",
            RelationType::OneToMany,
            "employees",
            "Set<Employee>",
            None,
        );
        let department = RelationshipInfo::new(
            "Employee",
            "Department",
            RelationType::ManyToOne,
            "department",
            "Department",
            None,
        );

        let unpaired = SynthesisContext::new(&employees, Some(&department), &config);
        assert!(unpaired.inverse.is_none());

        let paired = employees.clone().paired_with("department");
        let context = SynthesisContext::new(&paired, Some(&department), &config);
        let inverse = context.inverse.as_ref().expect("paired");
        assert!(!inverse.collection);
        assert_eq!(inverse.names.internal_setter, "internalSetDepartment");
        assert_eq!(context.collection_type(), "Set<Employee>");
        assert_eq!(context.element_param(), "employee");
    }
}
