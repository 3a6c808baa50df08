//! `count*` and `has*` convenience methods

use super::context::SynthesisContext;
use crate::{
    java_ast::{MethodDecl, MethodKind, Visibility},
    java_builder::{and, call, call_this, local, method, not_null, return_value, this_field},
};

/// Helper methods for one relationship
pub fn helper_methods(ctx: &SynthesisContext<'_>) -> Vec<MethodDecl> {
    if ctx.relationship.relation_type.is_collection_valued() {
        vec![counter(ctx), element_predicate(ctx)]
    } else {
        vec![presence_predicate(ctx)]
    }
}

fn counter(ctx: &SynthesisContext<'_>) -> MethodDecl {
    method(MethodKind::Counter, Visibility::Public, &ctx.names.counter)
        .returns("int")
        .body(vec![return_value(call(
            call_this(&ctx.names.getter, vec![]),
            "size",
            vec![],
        ))])
}

/// `hasEmployee(employee)`
fn element_predicate(ctx: &SynthesisContext<'_>) -> MethodDecl {
    let element = ctx.element_param();
    method(MethodKind::Predicate, Visibility::Public, &ctx.names.predicate)
        .returns("boolean")
        .param(ctx.target_type(), &element)
        .body(vec![return_value(and(vec![
            not_null(local(&element)),
            call(
                call_this(&ctx.names.getter, vec![]),
                "contains",
                vec![local(&element)],
            ),
        ]))])
}

/// `hasDepartment()`
fn presence_predicate(ctx: &SynthesisContext<'_>) -> MethodDecl {
    method(MethodKind::Predicate, Visibility::Public, &ctx.names.predicate)
        .returns("boolean")
        .body(vec![return_value(not_null(this_field(ctx.field())))])
}
