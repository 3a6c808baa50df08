use super::{
    collection::CollectionStrategy, context::SynthesisContext, scalar::ScalarStrategy,
    value::ValueStrategy,
};
use crate::{java_ast::MethodDecl, model::RelationType};

/// Produces the accessor and mutator methods of one relationship kind
pub trait SynthesisStrategy: std::fmt::Debug {
    fn accessors(&self, ctx: &SynthesisContext<'_>) -> Vec<MethodDecl>;
}

const STRATEGIES: &[(RelationType, &dyn SynthesisStrategy)] = &[
    (RelationType::OneToOne, &ScalarStrategy),
    (RelationType::ManyToOne, &ScalarStrategy),
    (RelationType::OneToMany, &CollectionStrategy),
    (RelationType::ManyToMany, &CollectionStrategy),
    (RelationType::Embedded, &ValueStrategy),
    (RelationType::Composition, &ValueStrategy),
];

/// Strategy for a relation type; `None` for types without members
pub fn strategy_for(relation_type: RelationType) -> Option<&'static dyn SynthesisStrategy> {
    STRATEGIES
        .iter()
        .find(|(candidate, _)| *candidate == relation_type)
        .map(|&(_, strategy)| strategy)
}
