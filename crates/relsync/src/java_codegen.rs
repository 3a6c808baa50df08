//! Rendering of the Java IR to source text
//!
//! Parentheses are inserted from operator precedence only, so rendered
//! conditions stay minimal and stable for snapshots.

use std::fmt::Write;

use crate::{
    code_generator::{GUARD_INTERFACE, GeneratedEntity, GuardInterface},
    java_ast::{Expr, FieldDecl, MethodDecl, Stmt, Visibility},
    naming::simple_name,
};

/// Java operator precedence levels, higher binds tighter
mod precedence {
    pub(super) const OR: u8 = 3;
    pub(super) const AND: u8 = 4;
    pub(super) const EQUALITY: u8 = 9;
    pub(super) const RELATIONAL: u8 = 10;
    pub(super) const UNARY: u8 = 14;
    pub(super) const PRIMARY: u8 = 16;
}

fn precedence_of(expr: &Expr) -> u8 {
    match expr {
        Expr::Or(_) => precedence::OR,
        Expr::And(_) => precedence::AND,
        Expr::Same(..) | Expr::NotSame(..) => precedence::EQUALITY,
        Expr::InstanceOf(..) => precedence::RELATIONAL,
        Expr::Not(_) => precedence::UNARY,
        _ => precedence::PRIMARY,
    }
}

/// Renders IR nodes with a fixed indentation unit
#[derive(Debug, Clone)]
pub struct JavaRenderer {
    indent: String,
}

impl JavaRenderer {
    pub fn new(indent_width: usize) -> Self {
        Self {
            indent: " ".repeat(indent_width),
        }
    }

    pub fn render_expr(&self, expr: &Expr) -> String {
        match expr {
            Expr::This => "this".to_owned(),
            Expr::Null => "null".to_owned(),
            Expr::Bool(value) => value.to_string(),
            Expr::Local(name) => name.clone(),
            Expr::Field(receiver, name) => {
                format!("{}.{name}", self.operand(receiver, precedence::PRIMARY))
            }
            Expr::Call {
                receiver,
                method,
                args,
            } => {
                let args = self.render_args(args);
                match receiver {
                    Some(receiver) => format!(
                        "{}.{method}({args})",
                        self.operand(receiver, precedence::PRIMARY)
                    ),
                    None => format!("{method}({args})"),
                }
            }
            Expr::New { class, args } => format!("new {class}({})", self.render_args(args)),
            Expr::Same(left, right) => self.binary(left, "==", right, precedence::EQUALITY),
            Expr::NotSame(left, right) => self.binary(left, "!=", right, precedence::EQUALITY),
            Expr::Not(operand) => format!("!{}", self.operand(operand, precedence::UNARY)),
            Expr::And(operands) => self.chain(operands, " && ", precedence::AND),
            Expr::Or(operands) => self.chain(operands, " || ", precedence::OR),
            Expr::InstanceOf(operand, class) => format!(
                "{} instanceof {class}",
                self.operand(operand, precedence::RELATIONAL + 1)
            ),
        }
    }

    /// Render `expr`, parenthesized when it binds looser than `minimum`
    fn operand(&self, expr: &Expr, minimum: u8) -> String {
        let rendered = self.render_expr(expr);
        if precedence_of(expr) < minimum {
            format!("({rendered})")
        } else {
            rendered
        }
    }

    fn binary(&self, left: &Expr, operator: &str, right: &Expr, level: u8) -> String {
        format!(
            "{} {operator} {}",
            self.operand(left, level + 1),
            self.operand(right, level + 1)
        )
    }

    fn chain(&self, operands: &[Expr], separator: &str, level: u8) -> String {
        operands
            .iter()
            .map(|operand| self.operand(operand, level + 1))
            .collect::<Vec<_>>()
            .join(separator)
    }

    fn render_args(&self, args: &[Expr]) -> String {
        args.iter()
            .map(|arg| self.render_expr(arg))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn pad(&self, depth: usize) -> String {
        self.indent.repeat(depth)
    }

    pub fn render_stmt(&self, stmt: &Stmt, depth: usize, out: &mut String) {
        let pad = self.pad(depth);
        match stmt {
            Stmt::If {
                condition,
                then,
                otherwise,
            } => {
                let _ = writeln!(out, "{pad}if ({}) {{", self.render_expr(condition));
                self.render_block(then, depth + 1, out);
                if otherwise.is_empty() {
                    let _ = writeln!(out, "{pad}}}");
                } else {
                    let _ = writeln!(out, "{pad}}} else {{");
                    self.render_block(otherwise, depth + 1, out);
                    let _ = writeln!(out, "{pad}}}");
                }
            }
            Stmt::Return(None) => {
                let _ = writeln!(out, "{pad}return;");
            }
            Stmt::Return(Some(value)) => {
                let _ = writeln!(out, "{pad}return {};", self.render_expr(value));
            }
            Stmt::Assign { target, value } => {
                let _ = writeln!(
                    out,
                    "{pad}{} = {};",
                    self.render_expr(target),
                    self.render_expr(value)
                );
            }
            Stmt::Local { ty, name, value } => {
                let _ = writeln!(out, "{pad}{ty} {name} = {};", self.render_expr(value));
            }
            Stmt::Expr(expr) => {
                let _ = writeln!(out, "{pad}{};", self.render_expr(expr));
            }
            Stmt::ForEach {
                ty,
                name,
                iterable,
                body,
            } => {
                let _ = writeln!(
                    out,
                    "{pad}for ({ty} {name} : {}) {{",
                    self.render_expr(iterable)
                );
                self.render_block(body, depth + 1, out);
                let _ = writeln!(out, "{pad}}}");
            }
            Stmt::Comment(text) => {
                let _ = writeln!(out, "{pad}// {text}");
            }
        }
    }

    fn render_block(&self, body: &[Stmt], depth: usize, out: &mut String) {
        for stmt in body {
            self.render_stmt(stmt, depth, out);
        }
    }

    fn render_doc(&self, doc: Option<&str>, depth: usize, out: &mut String) {
        let Some(doc) = doc else {
            return;
        };
        let pad = self.pad(depth);
        if doc.contains('\n') {
            let _ = writeln!(out, "{pad}/**");
            for line in doc.lines() {
                let _ = writeln!(out, "{pad} * {line}");
            }
            let _ = writeln!(out, "{pad} */");
        } else {
            let _ = writeln!(out, "{pad}/** {doc} */");
        }
    }

    pub fn render_method(&self, method: &MethodDecl, depth: usize) -> String {
        let mut out = String::new();
        let pad = self.pad(depth);
        self.render_doc(method.doc.as_deref(), depth, &mut out);
        for annotation in &method.annotations {
            let _ = writeln!(out, "{pad}{annotation}");
        }

        let params = method
            .params
            .iter()
            .map(|param| format!("{} {}", param.ty, param.name))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            out,
            "{pad}{}{} {}({params}) {{",
            modifier(method.visibility),
            method.return_type.as_deref().unwrap_or("void"),
            method.name
        );
        self.render_block(&method.body, depth + 1, &mut out);
        let _ = writeln!(out, "{pad}}}");
        out
    }

    pub fn render_field(&self, field: &FieldDecl, depth: usize) -> String {
        let mut out = String::new();
        let pad = self.pad(depth);
        self.render_doc(field.doc.as_deref(), depth, &mut out);
        for annotation in &field.annotations {
            let _ = writeln!(out, "{pad}{annotation}");
        }
        match &field.initializer {
            Some(initializer) => {
                let _ = writeln!(
                    out,
                    "{pad}{}{} {} = {};",
                    modifier(field.visibility),
                    field.ty,
                    field.name,
                    self.render_expr(initializer)
                );
            }
            None => {
                let _ = writeln!(
                    out,
                    "{pad}{}{} {};",
                    modifier(field.visibility),
                    field.ty,
                    field.name
                );
            }
        }
        out
    }

    /// Render a partial class holding the entity's relationship members
    pub fn render_entity(&self, entity: &GeneratedEntity) -> String {
        let mut out = String::new();
        let simple = simple_name(&entity.entity);
        if let Some((package, _)) = entity.entity.rsplit_once('.') {
            let _ = writeln!(out, "package {package};\n");
        }
        for import in &entity.imports {
            let _ = writeln!(out, "import {import};");
        }
        if !entity.imports.is_empty() {
            out.push('\n');
        }
        for annotation in &entity.class_annotations {
            let _ = writeln!(out, "{annotation}");
        }
        if entity.interfaces.is_empty() {
            let _ = writeln!(out, "public class {simple} {{");
        } else {
            let _ = writeln!(
                out,
                "public class {simple} implements {} {{",
                entity.interfaces.join(", ")
            );
        }

        let members = entity
            .fields
            .iter()
            .map(|field| self.render_field(field, 1))
            .chain(entity.methods.iter().map(|method| self.render_method(method, 1)));
        for member in members {
            out.push('\n');
            out.push_str(&member);
        }
        out.push_str("}\n");
        out
    }
}

/// Source of the marker interface implemented by guarded entities
pub fn render_guard_interface(guard: &GuardInterface) -> String {
    let mut out = String::new();
    if let Some(package) = &guard.package {
        let _ = writeln!(out, "package {package};\n");
    }
    let _ = writeln!(
        out,
        "/** Marks entities that take part in a reference cycle. */\npublic interface {GUARD_INTERFACE} {{\n}}"
    );
    out
}

/// Modifier keyword followed by a space, empty for package-private
fn modifier(visibility: Visibility) -> String {
    match visibility {
        Visibility::PackagePrivate => String::new(),
        other => format!("{} ", other.keyword()),
    }
}
