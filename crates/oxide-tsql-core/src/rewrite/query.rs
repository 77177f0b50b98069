//! Query rewrites that need the whole statement: `TOP` to `LIMIT`, lock
//! hints and `SELECT ... INTO`.

use std::ops::Range;

use crate::boundary::find_top_level;
use crate::lexer::{next_significant, Keyword, Token, TokenKind};

use super::{is_dbo_qualifier, render_identifier, rewrite_expression};

/// Index of the `)` closing the `(` at `open`.
fn closing_paren(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        match token.kind {
            TokenKind::LeftParen => depth += 1,
            TokenKind::RightParen => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Finds `TOP n` or `TOP (expr)` right after the first top-level `SELECT`.
///
/// Returns the tokens to remove, white space after the clause included, and
/// the `LIMIT` value. `PERCENT` and `WITH TIES` have no `LIMIT` form and are
/// left alone.
fn find_top(tokens: &[Token]) -> Option<(Range<usize>, String)> {
    let select = find_top_level(tokens, 0, tokens.len(), |t| t.is(Keyword::Select))?;
    let mut top = next_significant(tokens, select + 1);
    if tokens
        .get(top)
        .is_some_and(|t| t.is(Keyword::Distinct) || t.is(Keyword::All))
    {
        top = next_significant(tokens, top + 1);
    }
    if !tokens.get(top)?.is(Keyword::Top) {
        return None;
    }

    let value = next_significant(tokens, top + 1);
    let token = tokens.get(value)?;
    let (limit, last) = if token.kind.is_number() {
        (token.text.clone(), value)
    } else if token.kind == TokenKind::LeftParen {
        let close = closing_paren(tokens, value)?;
        let inner = rewrite_expression(&tokens[value + 1..close]);
        (format!("({})", inner.trim()), close)
    } else {
        return None;
    };

    let after = next_significant(tokens, last + 1);
    let percent = tokens.get(after).is_some_and(|t| t.is_word("percent"));
    let ties = tokens.get(after).is_some_and(|t| t.is(Keyword::With))
        && tokens
            .get(next_significant(tokens, after + 1))
            .is_some_and(|t| t.is_word("ties"));
    if percent || ties {
        return None;
    }

    let mut end = last + 1;
    while tokens.get(end).is_some_and(|t| t.kind == TokenKind::Whitespace) {
        end += 1;
    }
    Some((top..end, limit))
}

/// End of the `WITH (NOLOCK)` or `(NOLOCK)` hint starting at `i`.
fn nolock_hint_end(tokens: &[Token], i: usize) -> Option<usize> {
    let open = if tokens.get(i)?.is(Keyword::With) {
        next_significant(tokens, i + 1)
    } else {
        i
    };
    if tokens.get(open)?.kind != TokenKind::LeftParen {
        return None;
    }
    let hint = next_significant(tokens, open + 1);
    if !tokens.get(hint)?.is_word("nolock") {
        return None;
    }
    let close = next_significant(tokens, hint + 1);
    (tokens.get(close)?.kind == TokenKind::RightParen).then_some(close + 1)
}

/// `INTO` and table-name indices of a `SELECT ... INTO t` statement.
fn select_into(tokens: &[Token]) -> Option<(usize, usize)> {
    if !tokens.get(next_significant(tokens, 0))?.is(Keyword::Select) {
        return None;
    }
    let into = find_top_level(tokens, 0, tokens.len(), |t| t.is(Keyword::Into))?;
    let mut name = next_significant(tokens, into + 1);
    if is_dbo_qualifier(tokens, name) {
        name = next_significant(tokens, name + 2);
    }
    tokens
        .get(name)
        .is_some_and(|t| t.kind.is_identifier())
        .then_some((into, name))
}

/// Inserts ` LIMIT <limit>` before the final `;`, or at the end, keeping
/// trailing white space last.
fn append_limit(sql: &str, limit: &str) -> String {
    let body = sql.trim_end();
    let trailing = &sql[body.len()..];
    let (body, semicolon) = body
        .strip_suffix(';')
        .map_or((body, ""), |rest| (rest.trim_end(), ";"));
    format!("{body} LIMIT {limit}{semicolon}{trailing}")
}

/// Rewrites a DML statement for PostgreSQL.
///
/// On top of [`rewrite_expression`]:
/// - `SELECT TOP n` becomes a trailing `LIMIT n`;
/// - `WITH (NOLOCK)` and `(NOLOCK)` table hints are removed;
/// - `SELECT ... INTO t` becomes `DROP TABLE IF EXISTS t;` followed by
///   `CREATE TEMP TABLE t AS SELECT ...`.
#[must_use]
pub fn rewrite_query(tokens: &[Token]) -> String {
    let mut kept = vec![true; tokens.len()];
    let top = find_top(tokens);
    if let Some((range, _)) = &top {
        kept[range.clone()].fill(false);
    }

    let mut i = 0;
    while i < tokens.len() {
        match nolock_hint_end(tokens, i) {
            Some(end) => {
                let mut start = i;
                while start > 0 && tokens[start - 1].kind == TokenKind::Whitespace {
                    start -= 1;
                }
                kept[start..end].fill(false);
                i = end;
            }
            None => i += 1,
        }
    }

    let tokens: Vec<Token> = tokens
        .iter()
        .zip(&kept)
        .filter(|(_, keep)| **keep)
        .map(|(t, _)| t.clone())
        .collect();

    let out = match select_into(&tokens) {
        Some((into, name)) => {
            let table = render_identifier(tokens[name].text.trim_start_matches('#'));
            format!(
                "DROP TABLE IF EXISTS {table};\nCREATE TEMP TABLE {table} AS {}{}",
                rewrite_expression(&tokens[..into]).trim_end(),
                rewrite_expression(&tokens[name + 1..])
            )
        }
        None => rewrite_expression(&tokens),
    };
    match top {
        Some((_, limit)) => append_limit(&out, &limit),
        None => out,
    }
}
