//! Component naming

use std::collections::HashSet;

/// Prefix of default component names
pub const DEFAULT_PREFIX: &str = "Styled";

/// PascalCase form of `s`.
///
/// Splits on every character that cannot appear in an identifier and
/// capitalizes the first character of each word; the rest of each word is
/// kept as typed. Applying it twice gives the same result.
pub fn to_pascal_case(s: &str) -> String {
    s.split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
        .flat_map(|part| part.split('_'))
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect()
}

/// Is `name` already in normalized form?
pub fn is_pascal_case(name: &str) -> bool {
    !name.is_empty() && to_pascal_case(name) == name
}

/// Default component name for a tag: `Styled` + PascalCase(tag)
pub fn default_name(tag_name: &str) -> String {
    default_name_with_prefix(DEFAULT_PREFIX, tag_name)
}

/// Default component name with a custom prefix
pub fn default_name_with_prefix(prefix: &str, tag_name: &str) -> String {
    format!("{}{}", prefix, to_pascal_case(tag_name))
}

/// Default name that does not shadow any of `taken`, suffixed `2`, `3`, ...
/// when needed
pub fn unique_name(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{}{}", base, n))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Final component name for what the user typed.
///
/// Blank input, or input with no usable identifier in it, yields `default`.
pub fn normalize_name(input: Option<&str>, default: &str) -> String {
    let Some(input) = input.map(str::trim).filter(|s| !s.is_empty()) else {
        return default.to_string();
    };

    let name = to_pascal_case(input);
    if is_valid_identifier(&name) {
        name
    } else {
        default.to_string()
    }
}

/// Is `name` a plain JavaScript identifier?
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$') && !is_reserved(name)
}

/// Is `name` a dotted path of identifiers (`Foo`, `motion.div`)?
pub fn is_identifier_path(name: &str) -> bool {
    name.split('.').all(is_valid_identifier)
}

fn is_reserved(name: &str) -> bool {
    matches!(
        name,
        "break" | "case" | "catch" | "class" | "const" | "continue" | "debugger"
            | "default" | "delete" | "do" | "else" | "enum" | "export" | "extends"
            | "false" | "finally" | "for" | "function" | "if" | "import" | "in"
            | "instanceof" | "new" | "null" | "return" | "super" | "switch"
            | "this" | "throw" | "true" | "try" | "typeof" | "var" | "void"
            | "while" | "with" | "yield" | "let" | "static" | "await"
    )
}
