//! Relationship classification
//!
//! Turns one entity's field descriptors into [`EntityField`]s and
//! [`RelationshipInfo`]s. Classification is a pure function of the field,
//! its annotations and the set of known entities, so the same input always
//! yields the same relationship.

use log::{debug, trace};

use super::cascade_advisor::{CascadeAdvisor, PolicyInput};
use crate::{
    annotations::AnnotationAttributes,
    code_model::{CodeModel, EntityDescriptor, FieldDescriptor},
    model::{
        EntityField, InheritanceInfo, InheritanceStrategy, RelationType, RelationshipInfo,
        SUPERCLASS_FIELD,
    },
    type_ref::TypeRef,
};

/// Explicit annotations in dispatch priority order
const EXPLICIT_DISPATCH: &[(&str, RelationType)] = &[
    ("OneToOne", RelationType::OneToOne),
    ("OneToMany", RelationType::OneToMany),
    ("ManyToOne", RelationType::ManyToOne),
    ("ManyToMany", RelationType::ManyToMany),
    ("Embedded", RelationType::Embedded),
    ("EmbeddedId", RelationType::Embedded),
    ("ElementCollection", RelationType::Composition),
];

/// Fields with these annotations are never relationships
const EXCLUDED_MARKERS: &[&str] = &["Transient"];

/// Result of classifying one entity
#[derive(Debug, Clone, Default)]
pub struct EntityClassification {
    pub fields: Vec<EntityField>,
    pub relationships: Vec<RelationshipInfo>,
}

/// Classifier for entity fields and inheritance links
#[derive(Debug)]
pub struct RelationshipClassifier<'a> {
    model: &'a dyn CodeModel,
}

impl<'a> RelationshipClassifier<'a> {
    pub fn new(model: &'a dyn CodeModel) -> Self {
        Self { model }
    }

    /// Classify every field of an entity plus its inheritance link
    pub fn classify_entity(&self, entity: &EntityDescriptor) -> EntityClassification {
        let mut classification = EntityClassification::default();

        if let Some(inheritance) = self.classify_inheritance(entity) {
            classification.relationships.push(inheritance);
        }

        for field in &entity.fields {
            let (entity_field, relationship) = self.classify_field(entity, field);
            classification.fields.push(entity_field);
            classification.relationships.extend(relationship);
        }

        debug!(
            "Classified {}: {} fields, {} relationships",
            entity.name,
            classification.fields.len(),
            classification.relationships.len()
        );
        classification
    }

    /// Classify a single field
    pub fn classify_field(
        &self,
        entity: &EntityDescriptor,
        field: &FieldDescriptor,
    ) -> (EntityField, Option<RelationshipInfo>) {
        let relationship = self.relationship_for(entity, field);
        let entity_field = EntityField {
            name: field.name.clone(),
            declared_type: field.declared_type.clone(),
            nullable: field.nullable,
            column_name: field
                .column
                .clone()
                .unwrap_or_else(|| default_column_name(&field.name)),
            relation_type: relationship
                .as_ref()
                .map_or(RelationType::None, |r| r.relation_type),
            target_entity: relationship
                .as_ref()
                .map(|r| r.target_entity.clone())
                .unwrap_or_default(),
        };
        (entity_field, relationship)
    }

    fn relationship_for(
        &self,
        entity: &EntityDescriptor,
        field: &FieldDescriptor,
    ) -> Option<RelationshipInfo> {
        if field.is_static
            || EXCLUDED_MARKERS
                .iter()
                .any(|marker| field.has_annotation(marker))
        {
            trace!("Skipping non-persistent field {}.{}", entity.name, field.name);
            return None;
        }

        let declared = TypeRef::parse(&field.declared_type);

        for &(annotation_name, relation_type) in EXPLICIT_DISPATCH {
            if let Some(annotation) = field.annotation(annotation_name) {
                let attributes = annotation.attributes();
                let target = self.explicit_target(relation_type, &declared, &attributes);
                return Some(self.build(entity, field, relation_type, target, &attributes));
            }
        }

        self.implicit_relationship(entity, field, &declared)
    }

    /// Target of an explicitly annotated field
    ///
    /// Empty for an association whose target is not a known entity. Value
    /// types are not entities and keep the written name.
    fn explicit_target(
        &self,
        relation_type: RelationType,
        declared: &TypeRef,
        attributes: &AnnotationAttributes,
    ) -> String {
        let raw = if let Some(target) = attributes.class_literal("targetEntity") {
            target
        } else if relation_type.is_collection_valued() {
            declared.first_argument().to_owned()
        } else {
            declared.raw.clone()
        };
        match self.model.resolve_entity(&raw) {
            Some(qualified) => qualified.to_owned(),
            None if relation_type.is_association() => {
                debug!("'{}' is not a known entity", raw.trim());
                String::new()
            }
            None => raw.trim().to_owned(),
        }
    }

    /// Fallback: a reference or collection whose type is a known entity
    fn implicit_relationship(
        &self,
        entity: &EntityDescriptor,
        field: &FieldDescriptor,
        declared: &TypeRef,
    ) -> Option<RelationshipInfo> {
        let (relation_type, candidate) = match declared.collection_kind() {
            Some(_) => (RelationType::OneToMany, declared.first_argument()),
            None => (RelationType::ManyToOne, declared.raw.as_str()),
        };
        let target = self.model.resolve_entity(candidate)?.to_owned();
        debug!(
            "Inferred implicit {relation_type} for {}.{} -> {target}",
            entity.name, field.name
        );
        Some(self.build(
            entity,
            field,
            relation_type,
            target,
            &AnnotationAttributes::default(),
        ))
    }

    fn build(
        &self,
        entity: &EntityDescriptor,
        field: &FieldDescriptor,
        relation_type: RelationType,
        target: String,
        attributes: &AnnotationAttributes,
    ) -> RelationshipInfo {
        let mapped_by = if relation_type.can_be_inverse_side() {
            attributes.string("mappedBy")
        } else {
            None
        };

        let mut relationship = RelationshipInfo::new(
            entity.name.clone(),
            target,
            relation_type,
            field.name.clone(),
            field.declared_type.clone(),
            mapped_by,
        );

        let policy = CascadeAdvisor::advise(
            &attributes.list("cascade"),
            attributes.raw("fetch"),
            PolicyInput {
                relation_type,
                owner_side: relationship.is_owner_side,
                bidirectional: relationship.mapped_by.is_some(),
                circular: false,
            },
        );
        relationship.cascade_types = policy.cascade_types;
        relationship.cascade_explicit = policy.explicit;
        relationship.fetch_type = policy.fetch_type;
        relationship.orphan_removal = matches!(
            relation_type,
            RelationType::OneToOne | RelationType::OneToMany
        ) && attributes.boolean("orphanRemoval").unwrap_or(false);

        Self::apply_join_metadata(&mut relationship, field);

        if relation_type == RelationType::ManyToMany {
            relationship.additional_fields = field.join_attributes.clone();
        }

        relationship
    }

    fn apply_join_metadata(relationship: &mut RelationshipInfo, field: &FieldDescriptor) {
        if let Some(join_table) = field.annotation("JoinTable") {
            let attributes = join_table.attributes();
            relationship.join_table = attributes.string("name");
            relationship.join_columns = column_names(&attributes, "joinColumns");
            relationship.inverse_join_columns = column_names(&attributes, "inverseJoinColumns");
        }

        if let Some(join_column) = field.annotation("JoinColumn") {
            relationship
                .join_columns
                .extend(join_column.attributes().string("name"));
        }

        if let Some(join_columns) = field.annotation("JoinColumns") {
            relationship
                .join_columns
                .extend(column_names(&join_columns.attributes(), "value"));
        }
    }

    /// One INHERITANCE relationship per entity that declares `@Inheritance`
    /// or extends another entity
    pub fn classify_inheritance(&self, entity: &EntityDescriptor) -> Option<RelationshipInfo> {
        let declared = entity.annotation("Inheritance");
        let superclass = entity
            .superclass
            .as_deref()
            .and_then(|name| self.model.resolve_entity(name));

        if declared.is_none() && superclass.is_none() {
            return None;
        }

        let strategy = self.inheritance_strategy(entity).unwrap_or_default();
        let discriminator_column = entity
            .annotation("DiscriminatorColumn")
            .and_then(|a| a.attributes().string("name"));
        let discriminator_value = entity
            .annotation("DiscriminatorValue")
            .and_then(|a| a.attributes().string("value"));

        let mut relationship = RelationshipInfo::new(
            entity.name.clone(),
            superclass.unwrap_or_default(),
            RelationType::Inheritance,
            SUPERCLASS_FIELD,
            entity.superclass.clone().unwrap_or_default(),
            None,
        );
        relationship.inheritance = Some(InheritanceInfo {
            strategy,
            declared_here: declared.is_some(),
            discriminator_column,
            discriminator_value,
        });
        Some(relationship)
    }

    /// Strategy declared on the entity or the nearest entity ancestor
    fn inheritance_strategy(&self, entity: &EntityDescriptor) -> Option<InheritanceStrategy> {
        let mut current = Some(entity);
        let mut visited = Vec::new();

        while let Some(descriptor) = current {
            if visited.contains(&descriptor.name.as_str()) {
                break;
            }
            visited.push(descriptor.name.as_str());

            if let Some(annotation) = descriptor.annotation("Inheritance") {
                return annotation
                    .attributes()
                    .raw("strategy")
                    .and_then(InheritanceStrategy::parse);
            }

            current = descriptor
                .superclass
                .as_deref()
                .and_then(|name| self.model.resolve_entity(name))
                .and_then(|name| self.model.entity(name));
        }
        None
    }
}

fn column_names(attributes: &AnnotationAttributes, key: &str) -> Vec<String> {
    attributes
        .annotations(key)
        .iter()
        .filter_map(|annotation| annotation.attributes().string("name"))
        .collect()
}

/// `orderLines` -> `order_lines`
fn default_column_name(field_name: &str) -> String {
    let mut column = String::with_capacity(field_name.len() + 4);
    for (index, ch) in field_name.char_indices() {
        if ch.is_ascii_uppercase() {
            if index > 0 {
                column.push('_');
            }
            column.push(ch.to_ascii_lowercase());
        } else {
            column.push(ch);
        }
    }
    column
}
