//! Structured Java intermediate representation
//!
//! Synthesized members are kept as data until they reach the output
//! boundary, where [`crate::java_codegen`] renders them. Only the subset of
//! Java needed for accessor and synchronization bodies is modelled.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Protected,
    /// No modifier; used for internal mutators
    PackagePrivate,
    Private,
}

impl Visibility {
    /// Modifier keyword, empty for package-private
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::PackagePrivate => "",
            Self::Private => "private",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    This,
    Null,
    Bool(bool),
    Local(String),
    /// `receiver.name`
    Field(Box<Expr>, String),
    /// `receiver.method(args)`, or an unqualified call without receiver
    Call {
        receiver: Option<Box<Expr>>,
        method: String,
        args: Vec<Expr>,
    },
    /// `new Class<>(args)`; `class` includes the diamond when wanted
    New { class: String, args: Vec<Expr> },
    /// Reference equality `a == b`
    Same(Box<Expr>, Box<Expr>),
    /// Reference inequality `a != b`
    NotSame(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    InstanceOf(Box<Expr>, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    If {
        condition: Expr,
        then: Vec<Stmt>,
        otherwise: Vec<Stmt>,
    },
    Return(Option<Expr>),
    Assign {
        target: Expr,
        value: Expr,
    },
    /// Local variable declaration with initializer
    Local {
        ty: String,
        name: String,
        value: Expr,
    },
    Expr(Expr),
    ForEach {
        ty: String,
        name: String,
        iterable: Expr,
        body: Vec<Stmt>,
    },
    /// A line comment
    Comment(String),
}

/// Annotation with pre-rendered argument values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub name: String,
    /// `(key, rendered value)`; a single `value` key renders bare
    pub arguments: Vec<(String, String)>,
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)?;
        match self.arguments.as_slice() {
            [] => Ok(()),
            [(key, value)] if key == "value" => write!(f, "({value})"),
            arguments => {
                f.write_str("(")?;
                for (index, (key, value)) in arguments.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key} = {value}")?;
                }
                f.write_str(")")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub ty: String,
    pub name: String,
}

/// Role of a synthesized method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    Getter,
    Setter,
    InternalSetter,
    Adder,
    InternalAdder,
    Remover,
    InternalRemover,
    Clearer,
    Counter,
    Predicate,
    OrphanHook,
    Validator,
}

impl MethodKind {
    /// Public mutators that synchronize the inverse side
    pub fn is_public_mutator(self) -> bool {
        matches!(
            self,
            Self::Setter | Self::Adder | Self::Remover | Self::Clearer
        )
    }

    /// Mutators that only touch the local field
    pub fn is_internal(self) -> bool {
        matches!(
            self,
            Self::InternalSetter | Self::InternalAdder | Self::InternalRemover
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub doc: Option<String>,
    pub annotations: Vec<Annotation>,
    pub visibility: Visibility,
    /// `None` for `void`
    pub return_type: Option<String>,
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub kind: MethodKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub doc: Option<String>,
    pub annotations: Vec<Annotation>,
    pub visibility: Visibility,
    pub ty: String,
    pub name: String,
    pub initializer: Option<Expr>,
}

impl Expr {
    /// Visit this expression and every nested subexpression, parents first
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Self)) {
        visit(self);
        match self {
            Self::This | Self::Null | Self::Bool(_) | Self::Local(_) => {}
            Self::Field(receiver, _) | Self::Not(receiver) | Self::InstanceOf(receiver, _) => {
                receiver.walk(visit);
            }
            Self::Call { receiver, args, .. } => {
                if let Some(receiver) = receiver {
                    receiver.walk(visit);
                }
                for arg in args {
                    arg.walk(visit);
                }
            }
            Self::New { args, .. } | Self::And(args) | Self::Or(args) => {
                for arg in args {
                    arg.walk(visit);
                }
            }
            Self::Same(left, right) | Self::NotSame(left, right) => {
                left.walk(visit);
                right.walk(visit);
            }
        }
    }
}

impl Stmt {
    /// Visit every expression in this statement, including nested blocks
    pub fn walk_exprs<'a>(&'a self, visit: &mut impl FnMut(&'a Expr)) {
        match self {
            Self::If {
                condition,
                then,
                otherwise,
            } => {
                condition.walk(visit);
                for stmt in then.iter().chain(otherwise) {
                    stmt.walk_exprs(visit);
                }
            }
            Self::Return(value) => {
                if let Some(value) = value {
                    value.walk(visit);
                }
            }
            Self::Assign { target, value } => {
                target.walk(visit);
                value.walk(visit);
            }
            Self::Local { value, .. } | Self::Expr(value) => value.walk(visit),
            Self::ForEach { iterable, body, .. } => {
                iterable.walk(visit);
                for stmt in body {
                    stmt.walk_exprs(visit);
                }
            }
            Self::Comment(_) => {}
        }
    }
}
