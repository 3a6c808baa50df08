//! Single-valued associations: ONE_TO_ONE and MANY_TO_ONE
//!
//! The public setter synchronizes the inverse side only through the other
//! entity's internal mutators.

use super::{
    context::{InverseSide, SynthesisContext},
    strategy::SynthesisStrategy,
};
use crate::{
    java_ast::{Expr, MethodDecl, MethodKind, Stmt, Visibility},
    java_builder::{
        and, assign, call, call_this, comment, declare, expr, guard_return, if_then, local,
        method, not, not_null, not_same, null, return_value, same, this, this_field,
    },
    model::RelationType,
};

#[derive(Debug)]
pub struct ScalarStrategy;

impl SynthesisStrategy for ScalarStrategy {
    fn accessors(&self, ctx: &SynthesisContext<'_>) -> Vec<MethodDecl> {
        let mut methods = vec![getter(ctx), synchronizing_setter(ctx)];
        if ctx.inverse.is_some() {
            methods.push(internal_setter(ctx));
        }
        if ctx.cascade.generate_orphan_removal {
            methods.push(orphan_hook(ctx, &ctx.value_param()));
        }
        methods
    }
}

pub(super) fn getter(ctx: &SynthesisContext<'_>) -> MethodDecl {
    method(MethodKind::Getter, Visibility::Public, &ctx.names.getter)
        .returns(ctx.target_type())
        .body(vec![return_value(this_field(ctx.field()))])
}

/// Setter without inverse bookkeeping, used for embedded values
pub(super) fn plain_setter(ctx: &SynthesisContext<'_>) -> MethodDecl {
    let value = ctx.value_param();
    method(MethodKind::Setter, Visibility::Public, &ctx.names.setter)
        .param(ctx.target_type(), &value)
        .body(vec![assign(this_field(ctx.field()), local(&value))])
}

fn synchronizing_setter(ctx: &SynthesisContext<'_>) -> MethodDecl {
    let value = ctx.value_param();
    let previous = ctx.previous_local(ctx.field());
    let orphan_hook = ctx.cascade.generate_orphan_removal;

    let mut body = vec![guard_return(
        same(this_field(ctx.field()), local(&value)),
        None,
    )];

    if ctx.inverse.is_some() || orphan_hook {
        body.push(declare(ctx.target_type(), &previous, this_field(ctx.field())));
    }

    if let Some(inverse) = &ctx.inverse {
        body.push(if_then(
            not_null(local(&previous)),
            vec![expr(detach(inverse, local(&previous)))],
        ));
        if ctx.relationship.relation_type == RelationType::OneToOne && !inverse.collection {
            body.push(release_displaced(ctx, inverse, &value));
        }
    }

    body.push(assign(this_field(ctx.field()), local(&value)));

    if let Some(inverse) = &ctx.inverse {
        let (unlinked, attach) = if inverse.collection {
            (
                not(call(
                    call(local(&value), &inverse.names.getter, vec![]),
                    "contains",
                    vec![this()],
                )),
                call(local(&value), &inverse.names.internal_adder, vec![this()]),
            )
        } else {
            (
                not_same(call(local(&value), &inverse.names.getter, vec![]), this()),
                call(local(&value), &inverse.names.internal_setter, vec![this()]),
            )
        };
        body.push(if_then(
            and(vec![not_null(local(&value)), unlinked]),
            vec![expr(attach)],
        ));
    }

    if orphan_hook {
        body.push(if_then(
            not_null(local(&previous)),
            vec![expr(call_this(&ctx.names.orphan_hook, vec![local(&previous)]))],
        ));
    }

    let doc = match &ctx.inverse {
        Some(inverse) => format!(
            "Sets {} and keeps {}.{} in sync.",
            ctx.field(),
            ctx.target_type(),
            inverse.field
        ),
        None => format!("Sets {}.", ctx.field()),
    };

    method(MethodKind::Setter, Visibility::Public, &ctx.names.setter)
        .doc(doc)
        .param(ctx.target_type(), &value)
        .body(body)
}

/// Break the inverse link held by `owner` without re-entering this side
fn detach(inverse: &InverseSide, owner: Expr) -> Expr {
    if inverse.collection {
        call(owner, &inverse.names.internal_remover, vec![this()])
    } else {
        call(owner, &inverse.names.internal_setter, vec![null()])
    }
}

/// One-to-one: the new value may still be linked to another instance of
/// this entity, which must let go of it first
fn release_displaced(
    ctx: &SynthesisContext<'_>,
    inverse: &InverseSide,
    value: &str,
) -> Stmt {
    let displaced = format!("displaced{}", ctx.source_type());
    if_then(
        not_null(local(value)),
        vec![
            declare(
                ctx.source_type(),
                &displaced,
                call(local(value), &inverse.names.getter, vec![]),
            ),
            if_then(
                and(vec![
                    not_null(local(&displaced)),
                    not_same(local(&displaced), this()),
                ]),
                vec![expr(call(
                    local(&displaced),
                    &ctx.names.internal_setter,
                    vec![null()],
                ))],
            ),
        ],
    )
}

pub(super) fn internal_setter(ctx: &SynthesisContext<'_>) -> MethodDecl {
    let value = ctx.value_param();
    method(
        MethodKind::InternalSetter,
        Visibility::PackagePrivate,
        &ctx.names.internal_setter,
    )
    .doc("Assigns the field only; called by the inverse side.")
    .param(ctx.target_type(), &value)
    .body(vec![assign(this_field(ctx.field()), local(&value))])
}

pub(super) fn orphan_hook(ctx: &SynthesisContext<'_>, param: &str) -> MethodDecl {
    method(
        MethodKind::OrphanHook,
        Visibility::Protected,
        &ctx.names.orphan_hook,
    )
    .doc(format!(
        "Called after {} no longer references the value; orphan removal deletes it on flush.",
        ctx.field()
    ))
    .param(ctx.target_type(), param)
    .body(vec![comment("override to release resources held by the orphan")])
}
