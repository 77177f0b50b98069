//! Identifier and variable name normalization.

use serde::{Deserialize, Serialize};

/// What an identifier names.
///
/// Callers tag identifiers with their role so role-specific casing or quoting
/// can be layered on later. [`normalize_identifier_as`] currently applies the
/// same rule to every role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierRole {
    /// A table or view name.
    Table,
    /// A column name.
    Column,
    /// A data type name.
    DataType,
}

/// Schema prefixes removed by [`normalize_identifier`], already lower-case.
const DBO_PREFIXES: [&str; 3] = ["dbo.", "[dbo].", "\"dbo\"."];

/// Removes surrounding `[ ]`, `'` and `"` delimiters, then an `N'` prefix
/// left over from a Unicode literal.
#[must_use]
pub fn trim_quotes(text: &str) -> String {
    let is_quote = |c: char| matches!(c, '[' | ']' | '\'' | '"');
    let trimmed = text.trim().trim_matches(is_quote);
    let trimmed = trimmed
        .strip_prefix("N'")
        .or_else(|| trimmed.strip_prefix("n'"))
        .unwrap_or(trimmed);
    trimmed.trim_matches(is_quote).to_string()
}

/// Lower-cases an identifier, drops the `dbo.` schema qualifier and removes
/// quoting delimiters.
///
/// Only the literal `dbo` schema is removed; other qualifiers are kept. The
/// result is a fixed point: normalizing it again returns it unchanged.
#[must_use]
pub fn normalize_identifier(text: &str) -> String {
    let mut current = text.trim().to_lowercase();
    loop {
        let mut next = current.as_str();
        while let Some(rest) = DBO_PREFIXES.iter().find_map(|p| next.strip_prefix(p)) {
            next = rest;
        }
        let next = trim_quotes(next);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Normalizes an identifier that plays `role`.
#[must_use]
pub fn normalize_identifier_as(_role: IdentifierRole, text: &str) -> String {
    normalize_identifier(text)
}

/// Turns a T-SQL variable (`@Name`, `@@ROWCOUNT`) into a plain lower-case
/// name.
#[must_use]
pub fn variable_name(text: &str) -> String {
    text.trim().trim_start_matches('@').to_lowercase()
}
