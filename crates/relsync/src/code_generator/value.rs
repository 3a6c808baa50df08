//! Value-typed members: EMBEDDED and COMPOSITION
//!
//! Values have no identity of their own and are never paired, so they get
//! plain accessors without inverse bookkeeping.

use super::{collection, context::SynthesisContext, scalar, strategy::SynthesisStrategy};
use crate::{java_ast::MethodDecl, model::RelationType};

#[derive(Debug)]
pub struct ValueStrategy;

impl SynthesisStrategy for ValueStrategy {
    fn accessors(&self, ctx: &SynthesisContext<'_>) -> Vec<MethodDecl> {
        match ctx.relationship.relation_type {
            RelationType::Composition => vec![
                collection::getter(ctx),
                collection::setter(ctx),
                collection::adder(ctx),
                collection::remover(ctx),
                collection::clearer(ctx),
            ],
            _ => vec![scalar::getter(ctx), scalar::plain_setter(ctx)],
        }
    }
}
