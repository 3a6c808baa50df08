//! Reference harness that executes generated members over an object heap
//!
//! Entities are plain field maps; collections follow `java.util` semantics
//! closely enough to observe synchronization: set implementations reject
//! duplicates, iteration fails on concurrent modification, and calls on
//! `null` panic like a `NullPointerException`.

#![allow(dead_code)]

use relsync::{
    code_generator::{GeneratedEntity, GenerationOutput},
    code_model::ManifestCodeModel,
    config::Config,
    java_ast::{Expr, MethodDecl, MethodKind, Stmt},
    orchestrator::{GenerationReport, RelsyncOrchestrator},
};
use rustc_hash::FxHashMap;

/// Deepest call chain a synchronizing mutator may produce
const MAX_DEPTH: usize = 16;

pub const COMPANY: &str = r#"
[[entity]]
name = "com.acme.Department"

[[entity.field]]
name = "employees"
type = "List<Employee>"
annotations = ["@OneToMany(cascade = CascadeType.ALL, orphanRemoval = true)"]

[[entity]]
name = "com.acme.Employee"

[[entity.field]]
name = "department"
type = "Department"
annotations = ["@ManyToOne"]

[[entity.field]]
name = "badge"
type = "Badge"
annotations = ["@OneToOne"]

[[entity.field]]
name = "manager"
type = "Employee"
annotations = ["@ManyToOne"]

[[entity.field]]
name = "reports"
type = "Set<Employee>"
annotations = ['@OneToMany(mappedBy = "manager")']

[[entity.field]]
name = "projects"
type = "Set<Project>"
annotations = ["@ManyToMany"]

[[entity]]
name = "com.acme.Badge"

[[entity.field]]
name = "holder"
type = "Employee"
annotations = ['@OneToOne(mappedBy = "badge")']

[[entity]]
name = "com.acme.Project"

[[entity.field]]
name = "members"
type = "Set<Employee>"
annotations = ['@ManyToMany(mappedBy = "projects")']
"#;

/// Analyze and synthesize a manifest with the given configuration
pub fn generate(manifest: &str, config: Config) -> GenerationReport {
    let model = ManifestCodeModel::from_toml_str(manifest).expect("valid manifest");
    RelsyncOrchestrator::new(config)
        .generate(&model)
        .expect("generation succeeds")
}

/// `Department.employees` has no `mappedBy` and pairs by field name
pub fn company() -> GenerationReport {
    generate(COMPANY, Config::default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Obj(usize),
}

impl Value {
    pub fn as_bool(self) -> bool {
        match self {
            Self::Bool(value) => value,
            other => panic!("expected boolean, found {other:?}"),
        }
    }

    pub fn as_int(self) -> i64 {
        match self {
            Self::Int(value) => value,
            other => panic!("expected int, found {other:?}"),
        }
    }
}

#[derive(Debug)]
enum Object {
    Entity {
        class: String,
        fields: FxHashMap<String, Value>,
    },
    Collection {
        items: Vec<Value>,
        unique: bool,
        modifications: u64,
    },
}

/// One executed method invocation on an entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub receiver: Value,
    pub method: String,
    pub kind: MethodKind,
    pub depth: usize,
}

enum Flow {
    Next,
    Return(Value),
}

struct Frame {
    this: Value,
    locals: FxHashMap<String, Value>,
}

pub struct Heap {
    objects: Vec<Object>,
    classes: FxHashMap<String, GeneratedEntity>,
    pub calls: Vec<CallRecord>,
    depth: usize,
}

impl Heap {
    pub fn new(output: &GenerationOutput) -> Self {
        let classes = output
            .entities
            .iter()
            .map(|entity| (entity.simple_name().to_owned(), entity.clone()))
            .collect();
        Self {
            objects: Vec::new(),
            classes,
            calls: Vec::new(),
            depth: 0,
        }
    }

    pub fn new_entity(&mut self, class: &str) -> Value {
        assert!(self.classes.contains_key(class), "unknown class {class}");
        self.objects.push(Object::Entity {
            class: class.to_owned(),
            fields: FxHashMap::default(),
        });
        Value::Obj(self.objects.len() - 1)
    }

    /// Create a detached `ArrayList` holding `items`
    pub fn new_list(&mut self, items: &[Value]) -> Value {
        self.objects.push(Object::Collection {
            items: items.to_vec(),
            unique: false,
            modifications: 0,
        });
        Value::Obj(self.objects.len() - 1)
    }

    /// Invoke a generated method from outside the object graph
    pub fn call(&mut self, receiver: Value, method: &str, args: &[Value]) -> Value {
        self.invoke(receiver, method, args.to_vec())
    }

    /// Raw field value; `Null` when never assigned
    pub fn field(&self, object: Value, name: &str) -> Value {
        match self.object(object) {
            Object::Entity { fields, .. } => fields.get(name).copied().unwrap_or(Value::Null),
            Object::Collection { .. } => panic!("collections have no fields"),
        }
    }

    pub fn items(&self, collection: Value) -> Vec<Value> {
        match self.object(collection) {
            Object::Collection { items, .. } => items.clone(),
            Object::Entity { .. } => panic!("not a collection"),
        }
    }

    /// Elements of a collection-valued field; empty when uninitialized
    pub fn field_items(&self, object: Value, name: &str) -> Vec<Value> {
        match self.field(object, name) {
            Value::Null => Vec::new(),
            collection => self.items(collection),
        }
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Calls made on `receiver` below the top-level invocation
    pub fn nested_calls_on(&self, receiver: Value) -> Vec<&CallRecord> {
        self.calls
            .iter()
            .filter(|call| call.receiver == receiver && call.depth > 1)
            .collect()
    }

    fn object(&self, value: Value) -> &Object {
        match value {
            Value::Obj(index) => &self.objects[index],
            other => panic!("NullPointerException: dereferenced {other:?}"),
        }
    }

    fn object_mut(&mut self, value: Value) -> &mut Object {
        match value {
            Value::Obj(index) => &mut self.objects[index],
            other => panic!("NullPointerException: dereferenced {other:?}"),
        }
    }

    fn invoke(&mut self, receiver: Value, name: &str, args: Vec<Value>) -> Value {
        if let Object::Collection { .. } = self.object(receiver) {
            return self.collection_call(receiver, name, &args);
        }
        let Object::Entity { class, .. } = self.object(receiver) else {
            unreachable!();
        };
        let class = class.clone();
        let method: MethodDecl = self.classes[&class]
            .method(name)
            .unwrap_or_else(|| panic!("{class} has no method {name}"))
            .clone();
        assert_eq!(method.params.len(), args.len(), "arity of {name}");

        self.depth += 1;
        assert!(
            self.depth <= MAX_DEPTH,
            "unbounded recursion through {class}.{name}"
        );
        self.calls.push(CallRecord {
            receiver,
            method: name.to_owned(),
            kind: method.kind,
            depth: self.depth,
        });

        let mut frame = Frame {
            this: receiver,
            locals: method
                .params
                .iter()
                .map(|param| param.name.clone())
                .zip(args)
                .collect(),
        };
        let result = match self.exec_block(&method.body, &mut frame) {
            Flow::Return(value) => value,
            Flow::Next => Value::Null,
        };
        self.depth -= 1;
        result
    }

    fn collection_call(&mut self, receiver: Value, name: &str, args: &[Value]) -> Value {
        let Object::Collection {
            items,
            unique,
            modifications,
        } = self.object_mut(receiver)
        else {
            unreachable!();
        };
        match (name, args) {
            ("add", [value]) => {
                if *unique && items.contains(value) {
                    Value::Bool(false)
                } else {
                    items.push(*value);
                    *modifications += 1;
                    Value::Bool(true)
                }
            }
            ("remove", [value]) => match items.iter().position(|item| item == value) {
                Some(position) => {
                    items.remove(position);
                    *modifications += 1;
                    Value::Bool(true)
                }
                None => Value::Bool(false),
            },
            ("contains", [value]) => Value::Bool(items.contains(value)),
            ("clear", []) => {
                items.clear();
                *modifications += 1;
                Value::Null
            }
            ("size", []) => Value::Int(items.len() as i64),
            ("isEmpty", []) => Value::Bool(items.is_empty()),
            _ => panic!("unsupported collection call {name}/{}", args.len()),
        }
    }

    fn exec_block(&mut self, body: &[Stmt], frame: &mut Frame) -> Flow {
        for stmt in body {
            if let Flow::Return(value) = self.exec(stmt, frame) {
                return Flow::Return(value);
            }
        }
        Flow::Next
    }

    fn exec(&mut self, stmt: &Stmt, frame: &mut Frame) -> Flow {
        match stmt {
            Stmt::If {
                condition,
                then,
                otherwise,
            } => {
                if self.eval(condition, frame).as_bool() {
                    self.exec_block(then, frame)
                } else {
                    self.exec_block(otherwise, frame)
                }
            }
            Stmt::Return(value) => Flow::Return(
                value
                    .as_ref()
                    .map_or(Value::Null, |value| self.eval(value, frame)),
            ),
            Stmt::Assign { target, value } => {
                let value = self.eval(value, frame);
                match target {
                    Expr::Local(name) => {
                        frame.locals.insert(name.clone(), value);
                    }
                    Expr::Field(receiver, name) => {
                        let receiver = self.eval(receiver, frame);
                        match self.object_mut(receiver) {
                            Object::Entity { fields, .. } => {
                                fields.insert(name.clone(), value);
                            }
                            Object::Collection { .. } => panic!("assignment to collection"),
                        }
                    }
                    other => panic!("invalid assignment target {other:?}"),
                }
                Flow::Next
            }
            Stmt::Local { name, value, .. } => {
                let value = self.eval(value, frame);
                frame.locals.insert(name.clone(), value);
                Flow::Next
            }
            Stmt::Expr(expr) => {
                self.eval(expr, frame);
                Flow::Next
            }
            Stmt::ForEach {
                name,
                iterable,
                body,
                ..
            } => self.exec_for_each(name, iterable, body, frame),
            Stmt::Comment(_) => Flow::Next,
        }
    }

    fn exec_for_each(
        &mut self,
        name: &str,
        iterable: &Expr,
        body: &[Stmt],
        frame: &mut Frame,
    ) -> Flow {
        let collection = self.eval(iterable, frame);
        let mut index = 0;
        loop {
            let (item, expected) = match self.object(collection) {
                Object::Collection {
                    items,
                    modifications,
                    ..
                } => (items.get(index).copied(), *modifications),
                Object::Entity { .. } => panic!("iteration over an entity"),
            };
            let Some(item) = item else {
                return Flow::Next;
            };
            frame.locals.insert(name.to_owned(), item);
            if let Flow::Return(value) = self.exec_block(body, frame) {
                return Flow::Return(value);
            }
            if let Object::Collection { modifications, .. } = self.object(collection) {
                assert_eq!(
                    *modifications, expected,
                    "ConcurrentModificationException while iterating"
                );
            }
            index += 1;
        }
    }

    fn eval(&mut self, expr: &Expr, frame: &mut Frame) -> Value {
        match expr {
            Expr::This => frame.this,
            Expr::Null => Value::Null,
            Expr::Bool(value) => Value::Bool(*value),
            Expr::Local(name) => *frame
                .locals
                .get(name)
                .unwrap_or_else(|| panic!("unbound local {name}")),
            Expr::Field(receiver, name) => {
                let receiver = self.eval(receiver, frame);
                self.field(receiver, name)
            }
            Expr::Call {
                receiver,
                method,
                args,
            } => {
                let receiver = receiver
                    .as_ref()
                    .map_or(frame.this, |receiver| self.eval(receiver, frame));
                let args = args.iter().map(|arg| self.eval(arg, frame)).collect();
                self.invoke(receiver, method, args)
            }
            Expr::New { class, args } => {
                let items = match args.as_slice() {
                    [] => Vec::new(),
                    [source] => {
                        let source = self.eval(source, frame);
                        self.items(source)
                    }
                    _ => panic!("unsupported constructor arity"),
                };
                self.objects.push(Object::Collection {
                    items,
                    unique: class.contains("Set"),
                    modifications: 0,
                });
                Value::Obj(self.objects.len() - 1)
            }
            Expr::Same(left, right) => {
                let left = self.eval(left, frame);
                Value::Bool(left == self.eval(right, frame))
            }
            Expr::NotSame(left, right) => {
                let left = self.eval(left, frame);
                Value::Bool(left != self.eval(right, frame))
            }
            Expr::Not(operand) => Value::Bool(!self.eval(operand, frame).as_bool()),
            Expr::And(operands) => Value::Bool(
                operands
                    .iter()
                    .all(|operand| self.eval(operand, frame).as_bool()),
            ),
            Expr::Or(operands) => Value::Bool(
                operands
                    .iter()
                    .any(|operand| self.eval(operand, frame).as_bool()),
            ),
            Expr::InstanceOf(operand, interface) => match self.eval(operand, frame) {
                Value::Null => Value::Bool(false),
                value => match self.object(value) {
                    Object::Entity { class, .. } => Value::Bool(
                        self.classes[class]
                            .interfaces
                            .iter()
                            .any(|candidate| candidate == interface),
                    ),
                    Object::Collection { .. } => Value::Bool(false),
                },
            },
        }
    }
}
