//! Identifier helpers for generated Java members
//!
//! Method names are derived from field names (`employees` -> `addEmployee`,
//! `clearEmployees`), so the singular/plural rules here decide the public
//! surface of every generated entity.

use std::borrow::Cow;

use cow_utils::CowUtils;

/// Java keywords that cannot be used as parameter or local names
const JAVA_KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally", "float",
    "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "package", "private", "protected", "public", "return", "short", "static",
    "strictfp", "super", "switch", "synchronized", "this", "throw", "throws", "transient", "try",
    "void", "volatile", "while",
];

/// Plurals that do not follow a suffix rule
const IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("children", "child"),
    ("people", "person"),
    ("men", "man"),
    ("women", "woman"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("teeth", "tooth"),
    ("feet", "foot"),
    ("data", "datum"),
    ("criteria", "criterion"),
];

/// Words whose singular and plural forms coincide
const UNCOUNTABLE: &[&str] = &["staff", "equipment", "information", "series", "species", "news"];

/// Plurals in `-ies` whose singular ends in `-ie`
const IE_PLURALS: &[&str] = &[
    "movies", "cookies", "zombies", "calories", "rookies", "selfies", "goalies", "brownies",
    "neckties", "prairies", "pies", "ties", "lies",
];

/// Last segment of a dotted name: `com.acme.Employee` -> `Employee`
pub fn simple_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

/// Upper-case the first character: `employee` -> `Employee`
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lower-case the first character: `Employee` -> `employee`
pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Singular form of a collection field name
///
/// Preserves the original casing of everything but the changed suffix, so
/// `orderLines` becomes `orderLine` and `categories` becomes `category`.
/// Irregular and uncountable nouns match the last camel-case word only.
pub fn singularize(name: &str) -> Cow<'_, str> {
    let lower = name.cow_to_ascii_lowercase();
    let (head, word) = split_last_word(name);
    let word_lower = word.cow_to_ascii_lowercase();

    if UNCOUNTABLE.contains(&&*word_lower) {
        return Cow::Borrowed(name);
    }

    if let Some((_, singular)) = IRREGULAR_PLURALS
        .iter()
        .find(|(plural, _)| *plural == word_lower)
    {
        return Cow::Owned(format!("{head}{}", match_case(word, singular)));
    }

    if let Some(stem) = name.strip_suffix("ies")
        && !stem.is_empty()
    {
        if IE_PLURALS.contains(&&*word_lower) {
            return Cow::Borrowed(&name[..name.len() - 1]);
        }
        return Cow::Owned(format!("{stem}y"));
    }

    // `statuses` -> `status`, but `houses` -> `house`
    if let Some(stem) = lower.strip_suffix("uses") {
        let keeps_es = stem.chars().last().is_some_and(|c| !is_vowel(c));
        let cut = if keeps_es { 2 } else { 1 };
        return Cow::Borrowed(&name[..name.len() - cut]);
    }

    for suffix in ["sses", "shes", "ches", "xes", "zes"] {
        if lower.ends_with(suffix) {
            return Cow::Borrowed(&name[..name.len() - 2]);
        }
    }

    if lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is") {
        return Cow::Borrowed(name);
    }

    match name.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => Cow::Borrowed(stem),
        _ => Cow::Borrowed(name),
    }
}

/// Plural form of a singular noun, used when matching inverse field names
pub fn pluralize(name: &str) -> String {
    let lower = name.cow_to_ascii_lowercase();
    let (head, word) = split_last_word(name);
    let word_lower = word.cow_to_ascii_lowercase();

    if UNCOUNTABLE.contains(&&*word_lower) {
        return name.to_owned();
    }

    if let Some((plural, _)) = IRREGULAR_PLURALS
        .iter()
        .find(|(_, singular)| *singular == word_lower)
    {
        return format!("{head}{}", match_case(word, plural));
    }

    if let Some(stem) = name.strip_suffix('y')
        && !stem.ends_with(['a', 'e', 'i', 'o', 'u'])
    {
        return format!("{stem}ies");
    }

    if ["s", "x", "z", "ch", "sh"]
        .iter()
        .any(|suffix| lower.ends_with(suffix))
    {
        return format!("{name}es");
    }

    format!("{name}s")
}

/// Split off the last camel-case word: `salesPeople` -> (`sales`, `People`)
fn split_last_word(name: &str) -> (&str, &str) {
    let start = name
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_ascii_uppercase())
        .map_or(0, |(index, _)| index);
    name.split_at(start)
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Make a name usable as a Java parameter or local variable
pub fn safe_identifier(name: &str) -> Cow<'_, str> {
    if JAVA_KEYWORDS.contains(&name) {
        Cow::Owned(format!("{name}Value"))
    } else {
        Cow::Borrowed(name)
    }
}

fn match_case(original: &str, replacement: &str) -> String {
    if original.starts_with(|c: char| c.is_ascii_uppercase()) {
        capitalize(replacement)
    } else {
        replacement.to_owned()
    }
}
