//! Collection-valued associations: ONE_TO_MANY and MANY_TO_MANY
//!
//! Public mutators update the local collection, then reach the inverse
//! side through its internal mutators. The internal mutators defined here
//! are the entry points the other side uses in turn.

use super::{
    context::{InverseSide, SynthesisContext},
    scalar::orphan_hook,
    strategy::SynthesisStrategy,
};
use crate::{
    java_ast::{Expr, MethodDecl, MethodKind, Stmt, Visibility},
    java_builder::{
        and, assign, bool_literal, call, call_this, declare, expr, for_each, guard_return,
        if_then, is_null, local, method, new_diamond, not, not_null, not_same, null, or,
        return_value, same, this, this_field,
    },
    naming::capitalize,
};

#[derive(Debug)]
pub struct CollectionStrategy;

impl SynthesisStrategy for CollectionStrategy {
    fn accessors(&self, ctx: &SynthesisContext<'_>) -> Vec<MethodDecl> {
        let mut methods = vec![
            getter(ctx),
            setter(ctx),
            adder(ctx),
            remover(ctx),
            clearer(ctx),
        ];
        if ctx.inverse.is_some() {
            methods.extend([internal_adder(ctx), internal_remover(ctx), internal_setter(ctx)]);
        }
        if ctx.cascade.generate_orphan_removal {
            methods.push(orphan_hook(ctx, &ctx.element_param()));
        }
        methods
    }
}

/// `this.getEmployees()`
fn live_collection(ctx: &SynthesisContext<'_>) -> Expr {
    call_this(&ctx.names.getter, vec![])
}

/// Lazily initializing getter; never returns null
pub(super) fn getter(ctx: &SynthesisContext<'_>) -> MethodDecl {
    let implementation = ctx.collection_kind().implementation();
    method(MethodKind::Getter, Visibility::Public, &ctx.names.getter)
        .returns(&ctx.collection_type())
        .body(vec![
            if_then(
                is_null(this_field(ctx.field())),
                vec![assign(
                    this_field(ctx.field()),
                    new_diamond(implementation, vec![]),
                )],
            ),
            return_value(this_field(ctx.field())),
        ])
}

/// Replace the contents through the synchronizing clear and add
pub(super) fn setter(ctx: &SynthesisContext<'_>) -> MethodDecl {
    let values = ctx.value_param();
    let element = ctx.element_param();
    method(MethodKind::Setter, Visibility::Public, &ctx.names.setter)
        .param(&ctx.collection_type(), &values)
        .body(vec![
            guard_return(same(local(&values), this_field(ctx.field())), None),
            expr(call_this(&ctx.names.clearer, vec![])),
            if_then(
                not_null(local(&values)),
                vec![for_each(
                    ctx.target_type(),
                    &element,
                    new_diamond("ArrayList", vec![local(&values)]),
                    vec![expr(call_this(&ctx.names.adder, vec![local(&element)]))],
                )],
            ),
        ])
}

pub(super) fn adder(ctx: &SynthesisContext<'_>) -> MethodDecl {
    let element = ctx.element_param();
    let mut body = vec![
        guard_return(
            or(vec![
                is_null(local(&element)),
                call(live_collection(ctx), "contains", vec![local(&element)]),
            ]),
            Some(bool_literal(false)),
        ),
        expr(call(live_collection(ctx), "add", vec![local(&element)])),
    ];
    if let Some(inverse) = &ctx.inverse {
        body.extend(link(ctx, inverse, &element));
    }
    body.push(return_value(bool_literal(true)));

    let doc = match &ctx.inverse {
        Some(inverse) => format!(
            "Adds {element} and sets its {} to this {}.\nReturns false when {element} is null or already present.",
            inverse.field,
            ctx.source_type()
        ),
        None => format!("Adds {element}; returns false when it is null or already present."),
    };

    method(MethodKind::Adder, Visibility::Public, &ctx.names.adder)
        .doc(doc)
        .returns("boolean")
        .param(ctx.target_type(), &element)
        .body(body)
}

/// Point the element back at `this` through the inverse internal path
fn link(ctx: &SynthesisContext<'_>, inverse: &InverseSide, element: &str) -> Vec<Stmt> {
    if inverse.collection {
        return vec![expr(call(
            local(element),
            &inverse.names.internal_adder,
            vec![this()],
        ))];
    }

    let previous = ctx.previous_local(&inverse.field);
    vec![
        declare(
            ctx.source_type(),
            &previous,
            call(local(element), &inverse.names.getter, vec![]),
        ),
        if_then(
            and(vec![
                not_null(local(&previous)),
                not_same(local(&previous), this()),
            ]),
            vec![expr(call(
                local(&previous),
                &ctx.names.internal_remover,
                vec![local(element)],
            ))],
        ),
        expr(call(
            local(element),
            &inverse.names.internal_setter,
            vec![this()],
        )),
    ]
}

/// Detach the element's back-reference when it still points here
fn unlink(inverse: &InverseSide, element: &str) -> Stmt {
    if inverse.collection {
        expr(call(
            local(element),
            &inverse.names.internal_remover,
            vec![this()],
        ))
    } else {
        if_then(
            same(call(local(element), &inverse.names.getter, vec![]), this()),
            vec![expr(call(
                local(element),
                &inverse.names.internal_setter,
                vec![null()],
            ))],
        )
    }
}

/// Statements run for every element that left the collection
fn after_removal(ctx: &SynthesisContext<'_>, element: &str) -> Vec<Stmt> {
    let mut body = Vec::new();
    if let Some(inverse) = &ctx.inverse {
        body.push(unlink(inverse, element));
    }
    if ctx.cascade.generate_orphan_removal {
        body.push(expr(call_this(&ctx.names.orphan_hook, vec![local(element)])));
    }
    body
}

pub(super) fn remover(ctx: &SynthesisContext<'_>) -> MethodDecl {
    let element = ctx.element_param();
    let mut body = vec![
        guard_return(
            or(vec![
                is_null(local(&element)),
                not(call(live_collection(ctx), "contains", vec![local(&element)])),
            ]),
            Some(bool_literal(false)),
        ),
        expr(call(live_collection(ctx), "remove", vec![local(&element)])),
    ];
    body.extend(after_removal(ctx, &element));
    body.push(return_value(bool_literal(true)));

    method(MethodKind::Remover, Visibility::Public, &ctx.names.remover)
        .returns("boolean")
        .param(ctx.target_type(), &element)
        .body(body)
}

/// Snapshot, clear, then unlink each former element
pub(super) fn clearer(ctx: &SynthesisContext<'_>) -> MethodDecl {
    let element = ctx.element_param();
    let snapshot = format!("removed{}", capitalize(ctx.field()));
    let per_element = after_removal(ctx, &element);
    let body = if per_element.is_empty() {
        vec![expr(call(live_collection(ctx), "clear", vec![]))]
    } else {
        vec![
            declare(
                &format!("List<{}>", ctx.target_type()),
                &snapshot,
                new_diamond("ArrayList", vec![live_collection(ctx)]),
            ),
            expr(call(live_collection(ctx), "clear", vec![])),
            for_each(ctx.target_type(), &element, local(&snapshot), per_element),
        ]
    };

    method(MethodKind::Clearer, Visibility::Public, &ctx.names.clearer)
        .doc(format!("Removes every element of {}.", ctx.field()))
        .body(body)
}

fn internal_adder(ctx: &SynthesisContext<'_>) -> MethodDecl {
    let element = ctx.element_param();
    method(
        MethodKind::InternalAdder,
        Visibility::PackagePrivate,
        &ctx.names.internal_adder,
    )
    .param(ctx.target_type(), &element)
    .body(vec![if_then(
        and(vec![
            not_null(local(&element)),
            not(call(live_collection(ctx), "contains", vec![local(&element)])),
        ]),
        vec![expr(call(live_collection(ctx), "add", vec![local(&element)]))],
    )])
}

fn internal_remover(ctx: &SynthesisContext<'_>) -> MethodDecl {
    let element = ctx.element_param();
    method(
        MethodKind::InternalRemover,
        Visibility::PackagePrivate,
        &ctx.names.internal_remover,
    )
    .param(ctx.target_type(), &element)
    .body(vec![if_then(
        not_null(this_field(ctx.field())),
        vec![expr(call(
            this_field(ctx.field()),
            "remove",
            vec![local(&element)],
        ))],
    )])
}

fn internal_setter(ctx: &SynthesisContext<'_>) -> MethodDecl {
    let values = ctx.value_param();
    method(
        MethodKind::InternalSetter,
        Visibility::PackagePrivate,
        &ctx.names.internal_setter,
    )
    .doc("Replaces the collection reference without touching the inverse side.")
    .param(&ctx.collection_type(), &values)
    .body(vec![assign(this_field(ctx.field()), local(&values))])
}
