//! Annotation source text parsing
//!
//! The code model hands annotations over as source text
//! (`@OneToMany(mappedBy = "department", cascade = CascadeType.ALL)`).
//! Attribute values are kept as raw text and interpreted on access, so a
//! malformed value only degrades the one attribute that is asked for.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::{naming::simple_name, types::FxIndexMap};

static ANNOTATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*@\s*([A-Za-z_][\w.]*)\s*(?:\((.*)\))?\s*$")
        .expect("annotation pattern is valid")
});

static CLASS_LITERAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_][\w.]*)\s*\.\s*class$").expect("class literal pattern is valid")
});

/// One annotation as written in source
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct AnnotationSource {
    /// Annotation name as written, possibly qualified
    pub name: String,
    /// Raw text between the parentheses, empty for marker annotations
    pub arguments: String,
}

impl AnnotationSource {
    /// Parse `@Name` or `@Name(arguments)`
    pub fn parse(text: &str) -> Option<Self> {
        let captures = ANNOTATION_RE.captures(text)?;
        Some(Self {
            name: captures[1].to_owned(),
            arguments: captures
                .get(2)
                .map(|m| m.as_str().trim().to_owned())
                .unwrap_or_default(),
        })
    }

    /// Name without package qualifier
    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }

    pub fn is(&self, name: &str) -> bool {
        self.simple_name() == name
    }

    pub fn attributes(&self) -> AnnotationAttributes {
        AnnotationAttributes::parse(&self.arguments)
    }
}

impl TryFrom<String> for AnnotationSource {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("not an annotation: {value}"))
    }
}

impl fmt::Display for AnnotationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.arguments.is_empty() {
            write!(f, "@{}", self.name)
        } else {
            write!(f, "@{}({})", self.name, self.arguments)
        }
    }
}

/// Parsed `name = value` pairs of one annotation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationAttributes {
    values: FxIndexMap<String, String>,
}

impl AnnotationAttributes {
    /// Split the argument text into attributes; a lone unnamed argument is
    /// stored under `value`
    pub fn parse(arguments: &str) -> Self {
        let mut values = FxIndexMap::default();
        for part in split_top_level(arguments) {
            match split_assignment(part) {
                Some((name, value)) => {
                    values.insert(name.to_owned(), value.to_owned());
                }
                None => {
                    values.insert("value".to_owned(), part.to_owned());
                }
            }
        }
        Self { values }
    }

    pub fn raw(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// String attribute with quotes removed; blank values count as absent
    pub fn string(&self, name: &str) -> Option<String> {
        let value = unquote(self.raw(name)?);
        (!value.trim().is_empty()).then(|| value.trim().to_owned())
    }

    /// Boolean attribute; anything but `true`/`false` counts as absent
    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.raw(name)?.trim() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    /// Elements of an array attribute (`{a, b}`) or the single value
    pub fn list(&self, name: &str) -> Vec<String> {
        let Some(raw) = self.raw(name) else {
            return Vec::new();
        };
        let raw = raw.trim();
        let inner = raw
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .unwrap_or(raw);
        split_top_level(inner)
            .into_iter()
            .map(|element| unquote(element).trim().to_owned())
            .filter(|element| !element.is_empty())
            .collect()
    }

    /// Type named by a class literal attribute: `Employee.class` -> `Employee`
    pub fn class_literal(&self, name: &str) -> Option<String> {
        let raw = self.raw(name)?.trim();
        CLASS_LITERAL_RE
            .captures(raw)
            .map(|captures| captures[1].to_owned())
    }

    /// Nested annotations of an attribute such as `joinColumns`
    pub fn annotations(&self, name: &str) -> Vec<AnnotationSource> {
        self.list(name)
            .iter()
            .filter_map(|element| AnnotationSource::parse(element))
            .collect()
    }
}

/// Split on commas that are not nested in braces, parentheses or quotes
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 0;

    for (index, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '(' | '{' => depth += 1,
            ')' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(text[start..index].trim());
                start = index + 1;
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim());
    parts.retain(|part| !part.is_empty());
    parts
}

/// Split `name = value` at the first top-level `=`
fn split_assignment(part: &str) -> Option<(&str, &str)> {
    let (name, value) = part.split_once('=')?;
    let name = name.trim();
    let is_identifier = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());
    is_identifier.then(|| (name, value.trim()))
}

fn unquote(value: &str) -> &str {
    let value = value.trim();
    value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_marker_and_qualified_annotations() {
        let marker = AnnotationSource::parse("@Entity").expect("marker parses");
        assert_eq!(marker.name, "Entity");
        assert!(marker.arguments.is_empty());

        let qualified =
            AnnotationSource::parse("@jakarta.persistence.ManyToOne(fetch = FetchType.EAGER)")
                .expect("qualified parses");
        assert!(qualified.is("ManyToOne"));
        assert_eq!(qualified.attributes().raw("fetch"), Some("FetchType.EAGER"));
    }

    #[test]
    fn test_attribute_accessors() {
        let annotation = AnnotationSource::parse(
            r#"@OneToMany(mappedBy = "department", cascade = {CascadeType.PERSIST, CascadeType.MERGE}, orphanRemoval = true, targetEntity = Employee.class)"#,
        )
        .expect("annotation parses");
        let attributes = annotation.attributes();

        assert_eq!(attributes.string("mappedBy").as_deref(), Some("department"));
        assert_eq!(
            attributes.list("cascade"),
            vec!["CascadeType.PERSIST".to_owned(), "CascadeType.MERGE".to_owned()]
        );
        assert_eq!(attributes.boolean("orphanRemoval"), Some(true));
        assert_eq!(attributes.class_literal("targetEntity").as_deref(), Some("Employee"));
    }

    #[test]
    fn test_nested_annotations_and_unnamed_value() {
        let join_table = AnnotationSource::parse(
            r#"@JoinTable(name = "employee_project", joinColumns = @JoinColumn(name = "employee_id"), inverseJoinColumns = {@JoinColumn(name = "project_id")})"#,
        )
        .expect("join table parses");
        let attributes = join_table.attributes();
        let inverse = attributes.annotations("inverseJoinColumns");

        assert_eq!(attributes.string("name").as_deref(), Some("employee_project"));
        assert_eq!(attributes.annotations("joinColumns").len(), 1);
        assert_eq!(
            inverse[0].attributes().string("name").as_deref(),
            Some("project_id")
        );

        let value = AnnotationSource::parse(r#"@DiscriminatorValue("MANAGER")"#)
            .expect("value parses")
            .attributes();
        assert_eq!(value.string("value").as_deref(), Some("MANAGER"));
    }

    #[test]
    fn test_malformed_values_are_absent() {
        let attributes =
            AnnotationSource::parse(r#"@OneToOne(mappedBy = "", orphanRemoval = yes)"#)
                .expect("annotation parses")
                .attributes();
        assert_eq!(attributes.string("mappedBy"), None);
        assert_eq!(attributes.boolean("orphanRemoval"), None);
        assert!(AnnotationSource::parse("OneToOne").is_none());
    }
}
