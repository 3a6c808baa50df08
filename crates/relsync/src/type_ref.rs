//! Declared Java type parsing
//!
//! Only as much of the Java type grammar as relationship fields need:
//! a raw type with optional generic arguments, e.g. `List<Employee>` or
//! `java.util.Map<String, Address>`.

use std::fmt;

use cow_utils::CowUtils;

use crate::naming::simple_name;

/// Collection interfaces a relationship field may be declared as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    List,
    Set,
    SortedSet,
    Collection,
}

impl CollectionKind {
    fn from_raw(raw: &str) -> Option<Self> {
        match simple_name(raw) {
            "List" | "ArrayList" | "LinkedList" => Some(Self::List),
            "Set" | "HashSet" | "LinkedHashSet" => Some(Self::Set),
            "SortedSet" | "NavigableSet" | "TreeSet" => Some(Self::SortedSet),
            "Collection" | "Iterable" => Some(Self::Collection),
            _ => None,
        }
    }

    /// Interface name used in generated declarations
    pub fn interface(self) -> &'static str {
        match self {
            Self::List => "List",
            Self::Set => "Set",
            Self::SortedSet => "SortedSet",
            Self::Collection => "Collection",
        }
    }

    /// Concrete class used for lazy initialization and snapshots
    pub fn implementation(self) -> &'static str {
        match self {
            Self::List | Self::Collection => "ArrayList",
            Self::Set => "LinkedHashSet",
            Self::SortedSet => "TreeSet",
        }
    }
}

/// A parsed declared type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub raw: String,
    pub arguments: Vec<TypeRef>,
}

impl TypeRef {
    /// Parse declared type text; whitespace is insignificant
    pub fn parse(text: &str) -> Self {
        let compact = text.cow_replace(' ', "");
        let compact = compact.cow_replace('\t', "");
        Self::parse_compact(&compact)
    }

    fn parse_compact(text: &str) -> Self {
        let Some(open) = text.find('<') else {
            return Self {
                raw: text.to_owned(),
                arguments: Vec::new(),
            };
        };
        let raw = text[..open].to_owned();
        let inner = text[open + 1..].strip_suffix('>').unwrap_or(&text[open + 1..]);

        let mut arguments = Vec::new();
        let mut depth = 0usize;
        let mut start = 0;
        for (index, ch) in inner.char_indices() {
            match ch {
                '<' => depth += 1,
                '>' => depth = depth.saturating_sub(1),
                ',' if depth == 0 => {
                    arguments.push(Self::parse_compact(&inner[start..index]));
                    start = index + 1;
                }
                _ => {}
            }
        }
        if !inner[start..].is_empty() {
            arguments.push(Self::parse_compact(&inner[start..]));
        }

        Self { raw, arguments }
    }

    pub fn collection_kind(&self) -> Option<CollectionKind> {
        CollectionKind::from_raw(&self.raw)
    }

    /// First generic argument's raw name, empty when there is none
    pub fn first_argument(&self) -> &str {
        self.arguments
            .first()
            .map_or("", |argument| argument.raw.as_str())
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)?;
        if !self.arguments.is_empty() {
            f.write_str("<")?;
            for (index, argument) in self.arguments.iter().enumerate() {
                if index > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{argument}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}
