//! Non-fatal findings of a generation pass
//!
//! Nothing in the analysis aborts a batch because of one relationship.
//! Problems are recorded here, logged at their severity, and handed to the
//! caller alongside whatever could still be generated.

use std::fmt;

use log::{error, info, warn};

use crate::config::ValidationMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Severity of a recoverable problem under the given validation mode
    pub fn for_mode(mode: ValidationMode) -> Self {
        match mode {
            ValidationMode::Lenient => Self::Warning,
            ValidationMode::Strict => Self::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => f.write_str("info"),
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// The relationship's target entity is blank; no code is generated for it
    UnresolvedTarget,
    /// Several relationships qualify as the inverse; the first one was used
    AmbiguousInverse,
    /// A many-to-many carries extra join attributes
    AssociationAttributes,
    /// A circular relationship reaches an entity without the guard capability
    CircularWithoutGuard,
    /// Cascade or orphan-removal settings of a bidirectional pair disagree
    CascadeConflict,
    /// A public mutator calls another object's public mutator
    RecursionHazard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    /// Qualified entity name the finding is about
    pub entity: String,
    pub field: Option<String>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(
                f,
                "{}: {}.{}: {}",
                self.severity, self.entity, field, self.message
            ),
            None => write!(f, "{}: {}: {}", self.severity, self.entity, self.message),
        }
    }
}

/// Ordered collection of diagnostics that logs on insertion
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(
        &mut self,
        severity: Severity,
        kind: DiagnosticKind,
        entity: &str,
        field: Option<&str>,
        message: impl Into<String>,
    ) {
        let diagnostic = Diagnostic {
            severity,
            kind,
            entity: entity.to_owned(),
            field: field.map(str::to_owned),
            message: message.into(),
        };
        match severity {
            Severity::Info => info!("{diagnostic}"),
            Severity::Warning => warn!("{diagnostic}"),
            Severity::Error => error!("{diagnostic}"),
        }
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, other: Self) {
        self.items.extend(other.items);
    }

    pub fn has_errors(&self) -> bool {
        self.items
            .iter()
            .any(|diagnostic| diagnostic.severity == Severity::Error)
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(move |diagnostic| diagnostic.kind == kind)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
