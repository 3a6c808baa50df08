//! Factory functions for Java IR nodes
//!
//! Synthesis code composes members from these helpers instead of spelling
//! out enum variants, so bodies read close to the Java they produce.

use crate::java_ast::{
    Annotation, Expr, FieldDecl, MethodDecl, MethodKind, Param, Stmt, Visibility,
};

/// `this`
pub fn this() -> Expr {
    Expr::This
}

/// `null`
pub fn null() -> Expr {
    Expr::Null
}

pub fn bool_literal(value: bool) -> Expr {
    Expr::Bool(value)
}

/// A parameter or local variable reference
pub fn local(name: &str) -> Expr {
    Expr::Local(name.to_owned())
}

/// `this.name`
pub fn this_field(name: &str) -> Expr {
    Expr::Field(Box::new(Expr::This), name.to_owned())
}

/// `receiver.method(args)`
pub fn call(receiver: Expr, method: &str, args: Vec<Expr>) -> Expr {
    Expr::Call {
        receiver: Some(Box::new(receiver)),
        method: method.to_owned(),
        args,
    }
}

/// `this.method(args)`
pub fn call_this(method: &str, args: Vec<Expr>) -> Expr {
    call(this(), method, args)
}

/// `new Class<>(args)`
pub fn new_diamond(class: &str, args: Vec<Expr>) -> Expr {
    Expr::New {
        class: format!("{class}<>"),
        args,
    }
}

pub fn same(left: Expr, right: Expr) -> Expr {
    Expr::Same(Box::new(left), Box::new(right))
}

pub fn not_same(left: Expr, right: Expr) -> Expr {
    Expr::NotSame(Box::new(left), Box::new(right))
}

/// `expr == null`
pub fn is_null(expr: Expr) -> Expr {
    same(expr, null())
}

/// `expr != null`
pub fn not_null(expr: Expr) -> Expr {
    not_same(expr, null())
}

pub fn not(expr: Expr) -> Expr {
    Expr::Not(Box::new(expr))
}

pub fn and(operands: Vec<Expr>) -> Expr {
    Expr::And(operands)
}

pub fn or(operands: Vec<Expr>) -> Expr {
    Expr::Or(operands)
}

pub fn instance_of(expr: Expr, class: &str) -> Expr {
    Expr::InstanceOf(Box::new(expr), class.to_owned())
}

/// `if (condition) { then }`
pub fn if_then(condition: Expr, then: Vec<Stmt>) -> Stmt {
    Stmt::If {
        condition,
        then,
        otherwise: Vec::new(),
    }
}

/// `if (condition) { return value; }`
pub fn guard_return(condition: Expr, value: Option<Expr>) -> Stmt {
    if_then(condition, vec![Stmt::Return(value)])
}

pub fn return_value(value: Expr) -> Stmt {
    Stmt::Return(Some(value))
}

pub fn return_void() -> Stmt {
    Stmt::Return(None)
}

pub fn assign(target: Expr, value: Expr) -> Stmt {
    Stmt::Assign { target, value }
}

/// `Type name = value;`
pub fn declare(ty: &str, name: &str, value: Expr) -> Stmt {
    Stmt::Local {
        ty: ty.to_owned(),
        name: name.to_owned(),
        value,
    }
}

/// Expression statement
pub fn expr(expr: Expr) -> Stmt {
    Stmt::Expr(expr)
}

pub fn for_each(ty: &str, name: &str, iterable: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::ForEach {
        ty: ty.to_owned(),
        name: name.to_owned(),
        iterable,
        body,
    }
}

pub fn comment(text: impl Into<String>) -> Stmt {
    Stmt::Comment(text.into())
}

pub fn param(ty: &str, name: &str) -> Param {
    Param {
        ty: ty.to_owned(),
        name: name.to_owned(),
    }
}

/// Annotation without arguments
pub fn marker(name: &str) -> Annotation {
    Annotation {
        name: name.to_owned(),
        arguments: Vec::new(),
    }
}

pub fn annotation(name: &str, arguments: Vec<(String, String)>) -> Annotation {
    Annotation {
        name: name.to_owned(),
        arguments,
    }
}

/// Quote a string for use as an annotation value
pub fn string_value(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Start a method declaration; finish it with the `MethodBuilder` setters
pub fn method(kind: MethodKind, visibility: Visibility, name: &str) -> MethodBuilder {
    MethodBuilder {
        decl: MethodDecl {
            doc: None,
            annotations: Vec::new(),
            visibility,
            return_type: None,
            name: name.to_owned(),
            params: Vec::new(),
            body: Vec::new(),
            kind,
        },
    }
}

/// Incremental construction of a [`MethodDecl`]
#[derive(Debug, Clone)]
pub struct MethodBuilder {
    decl: MethodDecl,
}

impl MethodBuilder {
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.decl.doc = Some(doc.into());
        self
    }

    pub fn returns(mut self, ty: &str) -> Self {
        self.decl.return_type = Some(ty.to_owned());
        self
    }

    pub fn param(mut self, ty: &str, name: &str) -> Self {
        self.decl.params.push(param(ty, name));
        self
    }

    pub fn body(mut self, body: Vec<Stmt>) -> MethodDecl {
        self.decl.body = body;
        self.decl
    }
}

/// `private Type name;`
pub fn private_field(ty: &str, name: &str, annotations: Vec<Annotation>) -> FieldDecl {
    FieldDecl {
        doc: None,
        annotations,
        visibility: Visibility::Private,
        ty: ty.to_owned(),
        name: name.to_owned(),
        initializer: None,
    }
}
