//! JPA field declarations and class-level inheritance annotations

use super::context::SynthesisContext;
use crate::{
    config::PersistenceNamespace,
    java_ast::{Annotation, FieldDecl},
    java_builder::{annotation, marker, private_field, string_value},
    model::{FetchType, InheritanceStrategy, RelationType, RelationshipInfo},
    types::FxIndexSet,
};

/// Imports required by generated members, kept in first-use order
#[derive(Debug, Default)]
pub struct ImportSet {
    imports: FxIndexSet<String>,
}

impl ImportSet {
    pub fn persistence(&mut self, namespace: PersistenceNamespace, name: &str) {
        self.imports.insert(format!("{}.{name}", namespace.package()));
    }

    pub fn java_util(&mut self, name: &str) {
        self.imports.insert(format!("java.util.{name}"));
    }

    pub fn insert(&mut self, qualified: String) {
        self.imports.insert(qualified);
    }

    /// Sorted import list
    pub fn into_sorted(self) -> Vec<String> {
        let mut imports: Vec<_> = self.imports.into_iter().collect();
        imports.sort();
        imports
    }
}

/// Field declaration carrying the advised mapping annotations
pub fn relationship_field(ctx: &SynthesisContext<'_>, imports: &mut ImportSet) -> FieldDecl {
    let relationship = ctx.relationship;
    let namespace = ctx.config.persistence_namespace;

    let ty = if relationship.relation_type.is_collection_valued() {
        let kind = ctx.collection_kind();
        imports.java_util(kind.interface());
        imports.java_util(kind.implementation());
        imports.java_util("List");
        imports.java_util("ArrayList");
        ctx.collection_type()
    } else {
        ctx.target_type().to_owned()
    };

    let annotations = match relationship.relation_type {
        RelationType::Embedded => {
            imports.persistence(namespace, "Embedded");
            vec![marker("Embedded")]
        }
        RelationType::Composition => {
            imports.persistence(namespace, "ElementCollection");
            imports.persistence(namespace, "FetchType");
            vec![annotation(
                "ElementCollection",
                vec![("fetch".to_owned(), fetch_value(relationship.fetch_type))],
            )]
        }
        _ => association_annotations(relationship, namespace, imports),
    };

    let mut field = private_field(&ty, ctx.field(), annotations);
    field.doc = field_doc(ctx);
    field
}

fn association_annotations(
    relationship: &RelationshipInfo,
    namespace: PersistenceNamespace,
    imports: &mut ImportSet,
) -> Vec<Annotation> {
    let Some(name) = relationship.relation_type.annotation_name() else {
        return Vec::new();
    };
    imports.persistence(namespace, name);
    imports.persistence(namespace, "FetchType");

    let mut arguments = Vec::new();
    if let Some(mapped_by) = &relationship.mapped_by {
        arguments.push(("mappedBy".to_owned(), string_value(mapped_by)));
    }
    if !relationship.cascade_types.is_empty() {
        imports.persistence(namespace, "CascadeType");
        let values: Vec<String> = relationship
            .cascade_types
            .iter()
            .map(|cascade| format!("CascadeType.{cascade}"))
            .collect();
        let rendered = match values.as_slice() {
            [single] => single.clone(),
            _ => format!("{{{}}}", values.join(", ")),
        };
        arguments.push(("cascade".to_owned(), rendered));
    }
    arguments.push(("fetch".to_owned(), fetch_value(relationship.fetch_type)));
    if relationship.orphan_removal {
        arguments.push(("orphanRemoval".to_owned(), "true".to_owned()));
    }

    let mut annotations = vec![annotation(name, arguments)];
    if relationship.is_owner_side {
        annotations.extend(join_annotations(relationship, namespace, imports));
    }
    annotations
}

/// `@JoinTable` or `@JoinColumn` mapping of the owning side
fn join_annotations(
    relationship: &RelationshipInfo,
    namespace: PersistenceNamespace,
    imports: &mut ImportSet,
) -> Vec<Annotation> {
    if let Some(table) = &relationship.join_table {
        imports.persistence(namespace, "JoinTable");
        let mut arguments = vec![("name".to_owned(), string_value(table))];
        if !relationship.join_columns.is_empty() {
            imports.persistence(namespace, "JoinColumn");
            arguments.push((
                "joinColumns".to_owned(),
                join_column_list(&relationship.join_columns),
            ));
        }
        if !relationship.inverse_join_columns.is_empty() {
            imports.persistence(namespace, "JoinColumn");
            arguments.push((
                "inverseJoinColumns".to_owned(),
                join_column_list(&relationship.inverse_join_columns),
            ));
        }
        return vec![annotation("JoinTable", arguments)];
    }

    if !relationship.join_columns.is_empty() {
        imports.persistence(namespace, "JoinColumn");
    }
    relationship
        .join_columns
        .iter()
        .map(|column| join_column(column))
        .collect()
}

fn join_column(name: &str) -> Annotation {
    annotation("JoinColumn", vec![("name".to_owned(), string_value(name))])
}

fn join_column_list(columns: &[String]) -> String {
    let rendered: Vec<String> = columns
        .iter()
        .map(|column| join_column(column).to_string())
        .collect();
    match rendered.as_slice() {
        [single] => single.clone(),
        _ => format!("{{{}}}", rendered.join(", ")),
    }
}

fn fetch_value(fetch_type: FetchType) -> String {
    match fetch_type {
        FetchType::Lazy => "FetchType.LAZY".to_owned(),
        FetchType::Eager => "FetchType.EAGER".to_owned(),
    }
}

fn field_doc(ctx: &SynthesisContext<'_>) -> Option<String> {
    let relationship = ctx.relationship;
    let mut parts = Vec::new();
    if let Some(inverse) = &ctx.inverse {
        parts.push(format!(
            "Bidirectional with {}.{}",
            ctx.target_type(),
            inverse.field
        ));
    }
    if relationship.is_circular {
        parts.push("part of a reference cycle".to_owned());
    }
    let cascaded = ctx.cascade.cascaded_operations();
    if !relationship.cascade_explicit && !cascaded.is_empty() {
        parts.push(format!("advised cascade: {}", cascaded.join(", ")));
    }
    (!parts.is_empty()).then(|| format!("{}.", parts.join("; ")))
}

/// `@Inheritance` and discriminator annotations of the declaring entity
pub fn inheritance_annotations(
    relationship: &RelationshipInfo,
    namespace: PersistenceNamespace,
    imports: &mut ImportSet,
) -> Vec<Annotation> {
    let Some(info) = &relationship.inheritance else {
        return Vec::new();
    };
    let mut annotations = Vec::new();

    if info.declared_here {
        imports.persistence(namespace, "Inheritance");
        imports.persistence(namespace, "InheritanceType");
        annotations.push(annotation(
            "Inheritance",
            vec![(
                "strategy".to_owned(),
                format!("InheritanceType.{}", strategy_name(info.strategy)),
            )],
        ));
    }
    if let Some(column) = &info.discriminator_column {
        imports.persistence(namespace, "DiscriminatorColumn");
        annotations.push(annotation(
            "DiscriminatorColumn",
            vec![("name".to_owned(), string_value(column))],
        ));
    }
    if let Some(value) = &info.discriminator_value {
        imports.persistence(namespace, "DiscriminatorValue");
        annotations.push(annotation(
            "DiscriminatorValue",
            vec![("value".to_owned(), string_value(value))],
        ));
    }
    annotations
}

fn strategy_name(strategy: InheritanceStrategy) -> &'static str {
    match strategy {
        InheritanceStrategy::SingleTable => "SINGLE_TABLE",
        InheritanceStrategy::Joined => "JOINED",
        InheritanceStrategy::TablePerClass => "TABLE_PER_CLASS",
    }
}
