//! Variable declarations.

use serde::{Deserialize, Serialize};

use crate::dialect::TargetDialect;
use crate::lexer::{next_significant, Keyword, Token, TokenKind};
use crate::matcher::scan_data_type;
use crate::rewrite::{rewrite_expression, variable_name};

/// A declared variable: name without `@`, target type text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclareItem {
    /// Lower-cased variable name.
    pub name: String,
    /// Target type, e.g. `varchar(200)`.
    pub type_text: String,
}

impl DeclareItem {
    /// Creates a declare item.
    #[must_use]
    pub fn new(name: impl Into<String>, type_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_text: type_text.into(),
        }
    }
}

/// One variable of a `DECLARE` statement and its rewritten initializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Declaration {
    pub(crate) item: DeclareItem,
    pub(crate) value: Option<String>,
}

/// End of an initializer: a top-level comma or `;`, or the next statement.
fn initializer_end(tokens: &[Token], from: usize) -> usize {
    let mut depth = 0usize;
    let mut case_depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(from) {
        match token.kind {
            TokenKind::LeftParen => depth += 1,
            TokenKind::RightParen => depth = depth.saturating_sub(1),
            TokenKind::Comma | TokenKind::Semicolon if depth == 0 => return i,
            TokenKind::Keyword(Keyword::Case) if depth == 0 => case_depth += 1,
            TokenKind::Keyword(Keyword::End) if depth == 0 && case_depth > 0 => case_depth -= 1,
            TokenKind::Keyword(kw) if depth == 0 && case_depth == 0 && kw.starts_statement() => {
                return i;
            }
            _ => {}
        }
    }
    tokens.len()
}

/// Parses the variables of the `DECLARE` at `declare_idx`. Returns them
/// with the index after the statement's last consumed token.
///
/// Cursors and table variables are skipped.
pub(crate) fn declarations_at(
    tokens: &[Token],
    declare_idx: usize,
    dialect: &dyn TargetDialect,
) -> (Vec<Declaration>, usize) {
    let mut declarations = Vec::new();
    let mut i = next_significant(tokens, declare_idx + 1);
    let mut end = declare_idx + 1;

    while tokens.get(i).is_some_and(|t| t.kind == TokenKind::Variable) {
        let name = variable_name(&tokens[i].text);
        let mut type_idx = next_significant(tokens, i + 1);
        if tokens.get(type_idx).is_some_and(|t| t.is(Keyword::As)) {
            type_idx = next_significant(tokens, type_idx + 1);
        }
        if !tokens.get(type_idx).is_some_and(|t| t.kind.is_identifier()) {
            break;
        }
        let (type_text, after_type) = scan_data_type(tokens, type_idx, dialect);
        end = after_type;

        let mut value = None;
        let eq = next_significant(tokens, after_type);
        if tokens.get(eq).is_some_and(|t| t.kind == TokenKind::Eq) {
            let value_end = initializer_end(tokens, eq + 1);
            value = Some(rewrite_expression(&tokens[eq + 1..value_end]).trim().to_string());
            end = value_end;
        }
        declarations.push(Declaration {
            item: DeclareItem::new(name, type_text),
            value,
        });

        let comma = next_significant(tokens, end);
        if !tokens.get(comma).is_some_and(|t| t.kind == TokenKind::Comma) {
            break;
        }
        i = next_significant(tokens, comma + 1);
    }
    (declarations, end)
}

/// Collects every variable declared in `tokens`, types mapped through
/// `dialect`.
///
/// `DECLARE @x varchar(200)` yields `DeclareItem { name: "x", type_text:
/// "varchar(200)" }`.
#[must_use]
pub fn extract_declares(tokens: &[Token], dialect: &dyn TargetDialect) -> Vec<DeclareItem> {
    let mut items = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i].is(Keyword::Declare) {
            let (declarations, end) = declarations_at(tokens, i, dialect);
            items.extend(declarations.into_iter().map(|d| d.item));
            i = end.max(i + 1);
        } else {
            i += 1;
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::POSTGRES;
    use crate::lexer::tokenize;

    #[test]
    fn test_extract_declares() {
        let tokens = tokenize("DECLARE @Name varchar(200)\nDECLARE @n AS int, @when datetime");
        assert_eq!(
            extract_declares(&tokens, &POSTGRES),
            vec![
                DeclareItem::new("name", "varchar(200)"),
                DeclareItem::new("n", "integer"),
                DeclareItem::new("when", "timestamp"),
            ]
        );
    }

    #[test]
    fn test_declarations_with_values() {
        let tokens = tokenize("DECLARE @a int = 1, @b bit = CASE WHEN @a = 1 THEN 1 ELSE 0 END\nSET @a = 2");
        let (declarations, end) = declarations_at(&tokens, 0, &POSTGRES);
        assert_eq!(declarations.len(), 2);
        assert_eq!(declarations[0].value.as_deref(), Some("1"));
        assert_eq!(
            declarations[1].value.as_deref(),
            Some("CASE WHEN a = 1 THEN 1 ELSE 0 END")
        );
        assert!(tokens[next_significant(&tokens, end)].is(Keyword::Set));
    }

    #[test]
    fn test_cursor_and_table_variables_skipped() {
        let tokens = tokenize("DECLARE c CURSOR FOR SELECT 1 DECLARE @t TABLE (id int)");
        assert!(extract_declares(&tokens, &POSTGRES).is_empty());
    }

    #[test]
    fn test_declare_item_serializes() {
        let item = DeclareItem::new("x", "text");
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"name":"x","type_text":"text"}"#);
    }
}
