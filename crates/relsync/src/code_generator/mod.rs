//! Relationship synchronization code synthesis
//!
//! Turns analyzed relationships into Java members per entity:
//! - mapping field declarations with the advised cascade and fetch policy
//! - getters and synchronizing mutators backed by internal, non-synchronizing
//!   counterparts that the inverse side calls
//! - optional `count*`/`has*` helpers and consistency validators
//!
//! A public synchronizing mutator never calls another object's public
//! mutator. [`validation::check_recursion_safety`] verifies this on the
//! generated output.

pub mod cascade_config;
pub mod collection;
pub mod context;
pub mod field_decl;
pub mod helpers;
pub mod scalar;
pub mod strategy;
pub mod validation;
pub mod value;

use log::{debug, info, warn};

pub use cascade_config::CascadeConfiguration;
pub use context::{MemberNames, SynthesisContext};
use field_decl::ImportSet;
pub use strategy::{SynthesisStrategy, strategy_for};

use crate::{
    analysis::{AnalysisResults, AnalyzedEntity, DiagnosticKind, Diagnostics, Severity},
    config::Config,
    java_ast::{Annotation, FieldDecl, MethodDecl},
    model::RelationType,
    naming::simple_name,
    types::FxIndexSet,
};

/// Marker interface implemented by entities on a reference cycle
pub const GUARD_INTERFACE: &str = "CircularReferenceGuard";

/// Generated members of one entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedEntity {
    /// Qualified entity name
    pub entity: String,
    pub imports: Vec<String>,
    pub interfaces: Vec<String>,
    pub class_annotations: Vec<Annotation>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
}

impl GeneratedEntity {
    pub fn simple_name(&self) -> &str {
        simple_name(&self.entity)
    }

    pub fn package(&self) -> Option<&str> {
        self.entity.rsplit_once('.').map(|(package, _)| package)
    }

    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        self.methods.iter().find(|method| method.name == name)
    }

    pub fn implements_guard(&self) -> bool {
        self.interfaces.iter().any(|interface| interface == GUARD_INTERFACE)
    }

    /// Implements the guard or checks cycle members against it
    pub fn references_guard(&self) -> bool {
        self.implements_guard() || self.method("validateCircularDependencies").is_some()
    }

    fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.methods.is_empty() && self.class_annotations.is_empty()
    }
}

/// Declaration site of the guard interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardInterface {
    /// Package of the first guarded entity; `None` for the default package
    pub package: Option<String>,
}

impl GuardInterface {
    pub fn qualified_name(&self) -> String {
        match &self.package {
            Some(package) => format!("{package}.{GUARD_INTERFACE}"),
            None => GUARD_INTERFACE.to_owned(),
        }
    }
}

/// Everything one synthesis pass produced
#[derive(Debug, Default)]
pub struct GenerationOutput {
    pub entities: Vec<GeneratedEntity>,
    /// Set when at least one entity implements or checks the guard interface
    pub guard_interface: Option<GuardInterface>,
    pub diagnostics: Diagnostics,
}

impl GenerationOutput {
    pub fn entity(&self, name: &str) -> Option<&GeneratedEntity> {
        self.entities
            .iter()
            .find(|entity| entity.entity == name || entity.simple_name() == name)
    }
}

/// Synthesizes members for every analyzed entity
#[derive(Debug)]
pub struct RelationshipSynthesizer<'a> {
    results: &'a AnalysisResults,
    config: &'a Config,
}

impl<'a> RelationshipSynthesizer<'a> {
    pub fn new(results: &'a AnalysisResults, config: &'a Config) -> Self {
        Self { results, config }
    }

    pub fn synthesize(&self) -> GenerationOutput {
        info!("Synthesizing relationship members");
        let mut output = GenerationOutput::default();

        for entity in &self.results.entities {
            let generated = self.synthesize_entity(entity, &mut output.diagnostics);
            if generated.is_empty() {
                debug!("Nothing to generate for {}", entity.name);
            } else {
                output.entities.push(generated);
            }
        }

        self.resolve_guard_interface(&mut output);
        validation::check_recursion_safety(&output.entities, &mut output.diagnostics);

        info!(
            "Generated members for {} entities ({} diagnostics)",
            output.entities.len(),
            output.diagnostics.len()
        );
        output
    }

    fn synthesize_entity(
        &self,
        entity: &AnalyzedEntity,
        diagnostics: &mut Diagnostics,
    ) -> GeneratedEntity {
        let namespace = self.config.persistence_namespace;
        let mut imports = ImportSet::default();
        let mut interfaces = FxIndexSet::default();
        let mut generated = GeneratedEntity {
            entity: entity.name.clone(),
            imports: Vec::new(),
            interfaces: Vec::new(),
            class_annotations: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        };

        for relationship in self.results.relationships_of(&entity.name) {
            if relationship.relation_type == RelationType::Inheritance {
                generated
                    .class_annotations
                    .extend(field_decl::inheritance_annotations(
                        relationship,
                        namespace,
                        &mut imports,
                    ));
                continue;
            }
            if !relationship.has_target() {
                warn!(
                    "Skipping {}: target entity is unresolved",
                    relationship.key()
                );
                continue;
            }
            let Some(strategy) = strategy_for(relationship.relation_type) else {
                continue;
            };

            let ctx = SynthesisContext::new(
                relationship,
                self.results.find_inverse(relationship),
                self.config,
            );
            generated
                .fields
                .push(field_decl::relationship_field(&ctx, &mut imports));
            generated.methods.extend(strategy.accessors(&ctx));
            if self.config.generate_helpers {
                generated.methods.extend(helpers::helper_methods(&ctx));
            }
            if ctx.cascade.circular_reference_guard {
                interfaces.insert(GUARD_INTERFACE.to_owned());
            }
        }

        if self.config.generate_validation && !generated.fields.is_empty() {
            generated.methods.extend(validation::validator_methods(
                entity,
                self.results,
                self.config,
                diagnostics,
            ));
        }

        generated.imports = imports.into_sorted();
        generated.interfaces = interfaces.into_iter().collect();
        generated
    }

    /// Place the guard interface and report cycle members that lack it
    fn resolve_guard_interface(&self, output: &mut GenerationOutput) {
        let guarded: FxIndexSet<&str> = output
            .entities
            .iter()
            .filter(|entity| entity.implements_guard())
            .map(|entity| entity.entity.as_str())
            .collect();

        for relationship in self.results.relationships.iter().filter(|r| r.is_circular) {
            if !guarded.contains(relationship.target_entity.as_str()) {
                output.diagnostics.report(
                    Severity::Warning,
                    DiagnosticKind::CircularWithoutGuard,
                    &relationship.source_entity,
                    Some(relationship.field_name.as_str()),
                    format!(
                        "{} is part of a reference cycle but {} does not implement {GUARD_INTERFACE}",
                        relationship.key(),
                        relationship.target_simple_name()
                    ),
                );
            }
        }

        let Some(first) = output
            .entities
            .iter()
            .find(|entity| entity.implements_guard())
            .or_else(|| output.entities.iter().find(|entity| entity.references_guard()))
        else {
            return;
        };
        let package = first.package().map(str::to_owned);
        for entity in &mut output.entities {
            if entity.references_guard()
                && let Some(package) = &package
                && entity.package() != Some(package.as_str())
            {
                entity
                    .imports
                    .push(format!("{package}.{GUARD_INTERFACE}"));
                entity.imports.sort();
            }
        }
        output.guard_interface = Some(GuardInterface { package });
    }
}
