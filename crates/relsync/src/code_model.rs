//! Code-model collaborator
//!
//! The analysis never looks at source files itself. It consumes entity and
//! field facts through [`CodeModel`], which an IDE integration implements on
//! top of its own class model. [`ManifestCodeModel`] is the batch
//! implementation backed by a TOML entity manifest.

use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, warn};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;

use crate::{annotations::AnnotationSource, naming::simple_name, types::FxIndexMap};

/// What kind of persistent type a descriptor describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    #[default]
    Entity,
    MappedSuperclass,
    Embeddable,
}

/// One persistent class as seen by the code model
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityDescriptor {
    /// Fully qualified class name
    pub name: String,
    #[serde(default)]
    pub kind: EntityKind,
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub superclass: Option<String>,
    #[serde(default)]
    pub annotations: Vec<AnnotationSource>,
    #[serde(default, rename = "field")]
    pub fields: Vec<FieldDescriptor>,
}

impl EntityDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntityKind::Entity,
            table: None,
            superclass: None,
            annotations: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn with_superclass(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    /// Add a class-level annotation given as source text
    ///
    /// # Panics
    /// Panics if `annotation` is not annotation syntax; intended for
    /// programmatic construction with literal text.
    pub fn with_annotation(mut self, annotation: &str) -> Self {
        self.annotations
            .push(AnnotationSource::parse(annotation).expect("valid annotation text"));
        self
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }

    pub fn annotation(&self, name: &str) -> Option<&AnnotationSource> {
        self.annotations.iter().find(|annotation| annotation.is(name))
    }
}

/// One declared field of an entity
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub declared_type: String,
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub annotations: Vec<AnnotationSource>,
    /// Extra columns of a many-to-many join table
    #[serde(default)]
    pub join_attributes: Vec<String>,
}

fn default_nullable() -> bool {
    true
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            column: None,
            nullable: true,
            is_static: false,
            annotations: Vec::new(),
            join_attributes: Vec::new(),
        }
    }

    /// Add a field annotation given as source text
    ///
    /// # Panics
    /// Panics if `annotation` is not annotation syntax; intended for
    /// programmatic construction with literal text.
    pub fn with_annotation(mut self, annotation: &str) -> Self {
        self.annotations
            .push(AnnotationSource::parse(annotation).expect("valid annotation text"));
        self
    }

    pub fn with_join_attributes(mut self, attributes: &[&str]) -> Self {
        self.join_attributes = attributes.iter().map(|&a| a.to_owned()).collect();
        self
    }

    pub fn annotation(&self, name: &str) -> Option<&AnnotationSource> {
        self.annotations.iter().find(|annotation| annotation.is(name))
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotation(name).is_some()
    }
}

/// Source of entity facts for one analysis pass
pub trait CodeModel: std::fmt::Debug {
    /// Every persistent type known to the project, in declaration order
    fn entities(&self) -> &[EntityDescriptor];

    /// Resolve a simple or qualified type name to the qualified name of a
    /// known entity (not a mapped superclass or embeddable)
    fn resolve_entity(&self, type_name: &str) -> Option<&str>;

    fn entity(&self, qualified_name: &str) -> Option<&EntityDescriptor> {
        self.entities()
            .iter()
            .find(|entity| entity.name == qualified_name)
    }
}

/// Entity manifest file layout
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    #[serde(default, rename = "entity")]
    entities: Vec<EntityDescriptor>,
}

/// In-memory code model, usually loaded from a TOML manifest
#[derive(Debug, Clone, Default)]
pub struct ManifestCodeModel {
    entities: Vec<EntityDescriptor>,
    by_qualified: FxHashMap<String, usize>,
    /// Simple names that map to exactly one entity
    by_simple: FxHashMap<String, usize>,
}

impl ManifestCodeModel {
    /// A repeated qualified name replaces the earlier declaration in place
    pub fn from_entities(entities: Vec<EntityDescriptor>) -> Self {
        let mut unique: FxIndexMap<String, EntityDescriptor> = FxIndexMap::default();
        for entity in entities {
            let name = entity.name.clone();
            if unique.insert(name.clone(), entity).is_some() {
                warn!("Entity '{name}' is declared more than once; using the last declaration");
            }
        }
        let entities: Vec<EntityDescriptor> = unique.into_values().collect();

        let mut by_qualified = FxHashMap::default();
        let mut by_simple = FxHashMap::default();
        let mut ambiguous_simple = FxHashSet::default();

        for (index, entity) in entities.iter().enumerate() {
            by_qualified.insert(entity.name.clone(), index);
            let simple = entity.simple_name().to_owned();
            if by_simple.insert(simple.clone(), index).is_some() {
                ambiguous_simple.insert(simple);
            }
        }

        for simple in &ambiguous_simple {
            debug!("Simple name '{simple}' is shared by several entities; only qualified lookups resolve it");
            by_simple.remove(simple);
        }

        Self {
            entities,
            by_qualified,
            by_simple,
        }
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let manifest: Manifest = toml::from_str(source).context("Failed to parse entity manifest")?;
        debug!("Loaded {} entity descriptors from manifest", manifest.entities.len());
        Ok(Self::from_entities(manifest.entities))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read entity manifest {}", path.display()))?;
        Self::from_toml_str(&source)
            .with_context(|| format!("Invalid entity manifest {}", path.display()))
    }

    fn lookup(&self, type_name: &str) -> Option<&EntityDescriptor> {
        let index = self
            .by_qualified
            .get(type_name)
            .or_else(|| self.by_simple.get(type_name))?;
        self.entities.get(*index)
    }
}

impl CodeModel for ManifestCodeModel {
    fn entities(&self) -> &[EntityDescriptor] {
        &self.entities
    }

    fn resolve_entity(&self, type_name: &str) -> Option<&str> {
        self.lookup(type_name.trim())
            .filter(|entity| entity.kind == EntityKind::Entity)
            .map(|entity| entity.name.as_str())
    }

    fn entity(&self, qualified_name: &str) -> Option<&EntityDescriptor> {
        self.by_qualified
            .get(qualified_name)
            .and_then(|&index| self.entities.get(index))
    }
}
