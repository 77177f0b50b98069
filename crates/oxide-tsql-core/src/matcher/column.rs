//! Column definitions captured from `ADD` / `ALTER COLUMN` clauses.

use serde::{Deserialize, Serialize};

use crate::dialect::TargetDialect;
use crate::lexer::{next_significant, Keyword, Token, TokenKind};
use crate::rewrite::{normalize_identifier, strip_outer_parens, trim_quotes};

/// Type and constraints of a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDataTypeDefine {
    /// Target type text, e.g. `varchar(10)`.
    pub data_type: String,
    /// False when `NOT NULL` was given.
    pub nullable: bool,
    /// True when `PRIMARY KEY` was given.
    pub primary_key: bool,
    /// True when `IDENTITY` was given.
    pub identity: bool,
    /// Target spelling of the `DEFAULT` expression.
    pub default_value: Option<String>,
}

impl ColumnDataTypeDefine {
    /// Creates a nullable, unconstrained column type.
    #[must_use]
    pub fn new(data_type: impl Into<String>) -> Self {
        Self {
            data_type: data_type.into(),
            nullable: true,
            primary_key: false,
            identity: false,
            default_value: None,
        }
    }
}

/// A named column with its type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefine {
    /// Normalized column name.
    pub name: String,
    /// Type and constraints.
    pub data_type: ColumnDataTypeDefine,
}

/// Index of the token closing the parenthesis group opened at `open`, or the
/// last token if the group is unterminated.
pub(crate) fn group_end(tokens: &[Token], open: usize) -> usize {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        match token.kind {
            TokenKind::LeftParen => depth += 1,
            TokenKind::RightParen => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i;
                }
            }
            _ => {}
        }
    }
    tokens.len().saturating_sub(1)
}

/// Significant text of `tokens[from..=to]`, joined without white space
/// except after commas.
fn compact_text(tokens: &[Token], from: usize, to: usize) -> String {
    let mut out = String::new();
    for token in tokens.iter().take(to + 1).skip(from) {
        if token.is_trivia() {
            continue;
        }
        out.push_str(&token.text);
        if token.kind == TokenKind::Comma {
            out.push(' ');
        }
    }
    out
}

/// Reads the type token at `idx` and an optional argument list.
/// Returns the mapped type and the index after the consumed tokens.
pub(crate) fn scan_data_type(
    tokens: &[Token],
    idx: usize,
    dialect: &dyn TargetDialect,
) -> (String, usize) {
    let name = trim_quotes(&tokens[idx].text);
    let open = next_significant(tokens, idx + 1);
    if tokens.get(open).is_some_and(|t| t.kind == TokenKind::LeftParen) {
        let close = group_end(tokens, open);
        let args: Vec<String> = compact_text(tokens, open + 1, close.saturating_sub(1))
            .split(',')
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        (dialect.map_type(&name, &args), close + 1)
    } else {
        (dialect.map_type(&name, &[]), idx + 1)
    }
}

/// Reads a default value starting at `idx`: a parenthesized expression, a
/// function call, or a possibly signed single token.
fn scan_default(tokens: &[Token], idx: usize) -> (String, usize) {
    let Some(token) = tokens.get(idx) else {
        return (String::new(), idx);
    };
    if token.kind == TokenKind::LeftParen {
        let close = group_end(tokens, idx);
        let text = compact_text(tokens, idx, close);
        return (strip_outer_parens(&text).to_string(), close + 1);
    }
    let next = next_significant(tokens, idx + 1);
    let next_token = tokens.get(next);
    if token.kind.is_identifier() && next_token.is_some_and(|t| t.kind == TokenKind::LeftParen) {
        let close = group_end(tokens, next);
        return (compact_text(tokens, idx, close), close + 1);
    }
    if token.kind == TokenKind::Minus && next_token.is_some_and(|t| t.kind.is_number()) {
        return (format!("-{}", tokens[next].text), next + 1);
    }
    (token.text.clone(), idx + 1)
}

/// Scans a column definition whose name token is at `name_idx`.
///
/// After the name come the type (with an optional argument list) and any
/// of `NOT NULL`, `NULL`, `IDENTITY[(seed, step)]`, `PRIMARY KEY` and
/// `[CONSTRAINT name] DEFAULT value`. Unknown words are skipped. The scan
/// stops before a top-level comma, `;` or `)`, or before a keyword that
/// starts a new statement, and returns the index of that token.
pub(crate) fn scan_column_definition(
    tokens: &[Token],
    name_idx: usize,
    dialect: &dyn TargetDialect,
) -> (ColumnDefine, usize) {
    let name = normalize_identifier(&tokens[name_idx].text);
    let mut define = ColumnDataTypeDefine::new(String::new());

    let mut pos = name_idx + 1;
    let type_idx = next_significant(tokens, pos);
    if tokens.get(type_idx).is_some_and(|t| t.kind.is_identifier()) {
        let (data_type, next) = scan_data_type(tokens, type_idx, dialect);
        define.data_type = data_type;
        pos = next;
    }

    loop {
        let idx = next_significant(tokens, pos);
        let Some(token) = tokens.get(idx) else {
            break;
        };
        match token.kind {
            TokenKind::Comma | TokenKind::Semicolon | TokenKind::RightParen => {
                pos = idx;
                break;
            }
            TokenKind::LeftParen => pos = group_end(tokens, idx) + 1,
            TokenKind::Keyword(Keyword::Not) => {
                let next = next_significant(tokens, idx + 1);
                if tokens.get(next).is_some_and(|t| t.is(Keyword::Null)) {
                    define.nullable = false;
                    pos = next + 1;
                } else {
                    pos = idx + 1;
                }
            }
            TokenKind::Keyword(Keyword::Null) => {
                define.nullable = true;
                pos = idx + 1;
            }
            TokenKind::Keyword(Keyword::Identity) => {
                define.identity = true;
                let next = next_significant(tokens, idx + 1);
                pos = if tokens.get(next).is_some_and(|t| t.kind == TokenKind::LeftParen) {
                    group_end(tokens, next) + 1
                } else {
                    idx + 1
                };
            }
            TokenKind::Keyword(Keyword::Primary) => {
                let next = next_significant(tokens, idx + 1);
                if tokens.get(next).is_some_and(|t| t.is(Keyword::Key)) {
                    define.primary_key = true;
                    pos = next + 1;
                } else {
                    pos = idx + 1;
                }
            }
            TokenKind::Keyword(Keyword::Constraint) => {
                pos = next_significant(tokens, idx + 1) + 1;
            }
            TokenKind::Keyword(Keyword::Default) => {
                let (value, next) = scan_default(tokens, next_significant(tokens, idx + 1));
                define.default_value = Some(dialect.map_default(&value));
                pos = next;
            }
            TokenKind::Keyword(kw) if kw.starts_statement() => {
                pos = idx;
                break;
            }
            _ => pos = idx + 1,
        }
    }

    (
        ColumnDefine {
            name,
            data_type: define,
        },
        pos,
    )
}
