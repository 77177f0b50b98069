//! Expression and identifier rewriters.
//!
//! Pure functions over token slices that produce PostgreSQL text:
//! `CONVERT` to `CAST`, `DATEADD` to interval arithmetic, identifier and
//! variable normalization, string concatenation and whole-query rewrites
//! (`TOP`, lock hints, `SELECT ... INTO`).

mod concat;
mod convert;
mod dateadd;
mod identifier;
mod query;

pub use concat::concat_strings;
pub use convert::convert_to_cast;
pub use dateadd::dateadd_to_interval;
pub use identifier::{
    normalize_identifier, normalize_identifier_as, trim_quotes, variable_name, IdentifierRole,
};
pub use query::rewrite_query;

use crate::lexer::{next_significant, Keyword, Token, TokenKind};

/// Removes one layer of parentheses if they wrap the whole of `text`.
#[must_use]
pub fn strip_outer_parens(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    else {
        return trimmed;
    };

    // The opening paren must close at the very end, not earlier.
    let mut depth = 0usize;
    let mut in_string = false;
    for c in inner.chars() {
        match c {
            '\'' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => {
                if depth == 0 {
                    return trimmed;
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    if depth == 0 {
        inner.trim()
    } else {
        trimmed
    }
}

/// Returns true if `tokens[i]` is a `dbo` qualifier directly followed by a dot.
#[must_use]
pub fn is_dbo_qualifier(tokens: &[Token], i: usize) -> bool {
    tokens.get(i).is_some_and(|t| t.is_word("dbo"))
        && tokens.get(i + 1).is_some_and(|t| t.kind == TokenKind::Dot)
}

/// Renders a bracket-quoted identifier for PostgreSQL: normalized, and
/// double-quoted only when it is not a plain name.
#[must_use]
pub fn render_identifier(text: &str) -> String {
    let name = normalize_identifier(text);
    let plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_');
    if plain {
        name
    } else {
        format!("\"{name}\"")
    }
}

/// Appends the rewrite of the token at `*i` to `out`.
///
/// `CONVERT` and `DATEADD` calls are rewritten as a whole and leave `*i` on
/// their closing parenthesis; a `dbo.` qualifier is dropped and leaves `*i`
/// on the dot. Temporary table names lose their `#`.
pub(crate) fn rewrite_token_at(tokens: &[Token], i: &mut usize, out: &mut String) {
    let token = &tokens[*i];
    if token.is(Keyword::Convert) {
        out.push_str(&convert_to_cast(tokens, i));
    } else if token.is_word("dateadd") {
        out.push_str(&dateadd_to_interval(tokens, i));
    } else if is_dbo_qualifier(tokens, *i) {
        *i += 1;
    } else {
        match token.kind {
            TokenKind::Variable => out.push_str(&variable_name(&token.text)),
            TokenKind::Identifier if token.text.starts_with('#') => {
                out.push_str(&render_identifier(token.text.trim_start_matches('#')));
            }
            TokenKind::QuotedIdentifier => out.push_str(&render_identifier(&token.text)),
            _ => out.push_str(&token.text),
        }
    }
}

/// Rewrites an expression or statement fragment token by token: calls to
/// `CONVERT` and `DATEADD`, `dbo.` qualifiers, variables, temporary table
/// names and bracketed identifiers. Everything else is copied verbatim.
#[must_use]
pub fn rewrite_expression(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut i = 0;
    while i < tokens.len() {
        rewrite_token_at(tokens, &mut i, &mut out);
        i += 1;
    }
    out
}

/// Splits the arguments of the call whose name is at `name_idx`.
///
/// Returns the rewritten text of each top-level argument and the index of
/// the closing parenthesis (the last token if the list is unterminated), or
/// `None` when no `(` follows the name.
pub(crate) fn split_call(tokens: &[Token], name_idx: usize) -> Option<(Vec<String>, usize)> {
    let open = next_significant(tokens, name_idx + 1);
    if tokens.get(open)?.kind != TokenKind::LeftParen {
        return None;
    }

    let mut args = vec![String::new()];
    let mut depth = 0usize;
    let mut i = open + 1;
    while i < tokens.len() {
        let kind = tokens[i].kind;
        match kind {
            TokenKind::RightParen if depth == 0 => return Some((args, i)),
            TokenKind::Comma if depth == 0 => args.push(String::new()),
            _ => {
                if kind == TokenKind::LeftParen {
                    depth += 1;
                } else if kind == TokenKind::RightParen {
                    depth -= 1;
                }
                if let Some(current) = args.last_mut() {
                    rewrite_token_at(tokens, &mut i, current);
                }
            }
        }
        i += 1;
    }
    Some((args, tokens.len() - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    #[test]
    fn test_strip_outer_parens() {
        assert_eq!(strip_outer_parens("(a + b)"), "a + b");
        assert_eq!(strip_outer_parens("((a))"), "(a)");
        assert_eq!(strip_outer_parens("(a) + (b)"), "(a) + (b)");
        assert_eq!(strip_outer_parens("('(')"), "'('");
        assert_eq!(strip_outer_parens(" x "), "x");
    }

    #[test]
    fn test_render_identifier() {
        assert_eq!(render_identifier("[OrderId]"), "orderid");
        assert_eq!(render_identifier("[Order Details]"), "\"order details\"");
    }

    #[test]
    fn test_rewrite_expression() {
        let tokens = tokenize("@Total + CONVERT(int, [dbo].[T].[Qty]) > dbo.fn(@X)");
        assert_eq!(
            rewrite_expression(&tokens),
            "total + CAST(t.qty AS int) > fn(x)"
        );
    }

    #[test]
    fn test_temp_table_names() {
        let tokens = tokenize("DROP TABLE #Temp_Hotel; SELECT * FROM ##shared");
        assert_eq!(
            rewrite_expression(&tokens),
            "DROP TABLE temp_hotel; SELECT * FROM shared"
        );
    }

    #[test]
    fn test_split_call_nested() {
        let tokens = tokenize("f(a, g(b, c), CONVERT(int, d))");
        let (args, close) = split_call(&tokens, 0).unwrap_or_default();
        assert_eq!(args, vec!["a", " g(b, c)", " CAST(d AS int)"]);
        assert_eq!(close, tokens.len() - 1);
    }

    #[test]
    fn test_split_call_without_parens() {
        let tokens = tokenize("f + 1");
        assert!(split_call(&tokens, 0).is_none());
    }
}
