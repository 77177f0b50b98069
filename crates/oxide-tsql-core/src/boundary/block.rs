//! Scanners for headers, blocks and conditionals.

use tracing::debug;

use super::find_top_level;
use crate::lexer::{next_significant, Keyword, Token, TokenKind};

/// How many significant tokens after `CREATE` are inspected to find the
/// object kind.
const CREATE_PEEK: usize = 10;

fn remainder<'a>(tokens: &'a [Token], idx: &mut usize) -> &'a [Token] {
    let start = (*idx).min(tokens.len());
    *idx = tokens.len();
    &tokens[start..]
}

fn header_through_as<'a>(tokens: &'a [Token], idx: &mut usize) -> &'a [Token] {
    let start = (*idx).min(tokens.len());
    let end = find_top_level(tokens, start, tokens.len(), |t| t.is(Keyword::As))
        .map_or(tokens.len(), |i| i + 1);
    *idx = end;
    &tokens[start..end]
}

/// Returns `CREATE VIEW ... AS`, through the first top-level `AS`.
///
/// Without an `AS` the rest of the stream is returned.
pub fn create_view_header<'a>(tokens: &'a [Token], idx: &mut usize) -> &'a [Token] {
    header_through_as(tokens, idx)
}

/// Returns `CREATE PROCEDURE ... AS`, through the first top-level `AS`.
///
/// Parameter defaults in parentheses do not end the header.
pub fn create_procedure_header<'a>(tokens: &'a [Token], idx: &mut usize) -> &'a [Token] {
    header_through_as(tokens, idx)
}

/// Classifies the `CREATE` statement at `idx` and scans its header.
///
/// Views go through [`create_view_header`]. Tables, procedures, functions
/// and indexes are left to their own scanners: the result is empty and the
/// cursor does not move. When no object keyword shows up in the first few
/// tokens, the rest of the stream is returned.
pub fn create_statement<'a>(tokens: &'a [Token], idx: &mut usize) -> &'a [Token] {
    let mut i = next_significant(tokens, *idx);
    for _ in 0..CREATE_PEEK {
        i = next_significant(tokens, i + 1);
        let Some(token) = tokens.get(i) else {
            break;
        };
        match token.as_keyword() {
            Some(Keyword::View) => return create_view_header(tokens, idx),
            Some(
                kw @ (Keyword::Table
                | Keyword::Procedure
                | Keyword::Proc
                | Keyword::Function
                | Keyword::Index),
            ) => {
                debug!(object = kw.as_str(), "create statement not handled here");
                return &[];
            }
            _ => {}
        }
    }
    remainder(tokens, idx)
}

/// Returns the inside of the `BEGIN ... END` or `( ... )` block starting at
/// `idx` and moves the cursor past its terminator.
///
/// The terminator is the last `END` or `)` of the stream, so the stream must
/// hold exactly one such block. When no block is recognized the rest of the
/// stream is returned.
pub fn block_inner<'a>(tokens: &'a [Token], idx: &mut usize) -> &'a [Token] {
    match find_block(tokens, idx) {
        Some(inner) => inner,
        None => remainder(tokens, idx),
    }
}

/// Like [`block_inner`], but returns `None` and leaves the cursor alone when
/// `idx` is not on a `BEGIN` or `(`, or the block has no terminator.
pub fn find_block<'a>(tokens: &'a [Token], idx: &mut usize) -> Option<&'a [Token]> {
    let start = next_significant(tokens, *idx);
    let terminator = match tokens.get(start)?.kind {
        TokenKind::Keyword(Keyword::Begin) => TokenKind::Keyword(Keyword::End),
        TokenKind::LeftParen => TokenKind::RightParen,
        _ => return None,
    };
    let Some(end) = tokens
        .iter()
        .rposition(|t| t.kind == terminator)
        .filter(|&end| end > start)
    else {
        debug!(start, "unterminated block");
        return None;
    };
    *idx = end + 1;
    Some(&tokens[start + 1..end])
}

/// Index of the first token after the condition of the `IF`/`WHILE` at
/// `start`: a top-level `;` or statement keyword (`BEGIN` included).
fn condition_end(tokens: &[Token], start: usize) -> usize {
    let mut depth = 0usize;
    let head = next_significant(tokens, start);
    for (i, token) in tokens.iter().enumerate().skip(head + 1) {
        match token.kind {
            TokenKind::LeftParen => depth += 1,
            TokenKind::RightParen => depth = depth.saturating_sub(1),
            TokenKind::Semicolon if depth == 0 => return i,
            TokenKind::Keyword(kw) if depth == 0 && kw.starts_statement() => return i,
            _ => {}
        }
    }
    tokens.len()
}

fn is_transaction(tokens: &[Token], begin: usize) -> bool {
    tokens
        .get(next_significant(tokens, begin + 1))
        .and_then(Token::as_keyword)
        .is_some_and(|kw| matches!(kw, Keyword::Transaction | Keyword::Tran))
}

/// Index after the `END` matching the `BEGIN` at `begin`.
fn matching_end(tokens: &[Token], begin: usize) -> usize {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(begin) {
        match token.as_keyword() {
            Some(Keyword::Begin) if !is_transaction(tokens, i) => depth += 1,
            Some(Keyword::Case) => depth += 1,
            Some(Keyword::End) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
    }
    tokens.len()
}

/// Index after a single-statement body: through a top-level `;`, or up to
/// the last significant token before a top-level `ELSE`.
fn single_statement_end(tokens: &[Token], body: usize) -> usize {
    let mut depth = 0usize;
    let mut case_depth = 0usize;
    let mut last = body;
    for (i, token) in tokens.iter().enumerate().skip(body) {
        if token.is_trivia() {
            continue;
        }
        match token.kind {
            TokenKind::LeftParen => depth += 1,
            TokenKind::RightParen => depth = depth.saturating_sub(1),
            TokenKind::Semicolon if depth == 0 => return i + 1,
            TokenKind::Keyword(Keyword::Case) if depth == 0 => case_depth += 1,
            TokenKind::Keyword(Keyword::End) if depth == 0 => {
                case_depth = case_depth.saturating_sub(1);
            }
            TokenKind::Keyword(Keyword::Else) if depth == 0 && case_depth == 0 => {
                return last + 1;
            }
            _ => {}
        }
        last = i;
    }
    last + 1
}

/// Returns the `IF` (or `WHILE`) statement at `idx`: the condition and its
/// body, without any `ELSE` branch.
///
/// A `BEGIN ... END` body is depth counted, so nested blocks stay inside.
/// Any other body runs through its `;`, or stops before `ELSE`.
pub fn if_statement<'a>(tokens: &'a [Token], idx: &mut usize) -> &'a [Token] {
    let start = (*idx).min(tokens.len());
    if start == tokens.len() {
        return &[];
    }
    let body = condition_end(tokens, start);
    let end = match tokens.get(body) {
        Some(t) if t.is(Keyword::Begin) => matching_end(tokens, body),
        Some(t) if t.kind == TokenKind::Semicolon => body + 1,
        Some(_) => single_statement_end(tokens, body),
        None => tokens.len(),
    };
    *idx = end;
    &tokens[start..end]
}

/// Returns only the condition of the `IF` (or `WHILE`) at `idx`, keyword
/// included. The cursor stops on the `BEGIN`, `;` or statement keyword that
/// follows, without consuming it.
pub fn if_condition<'a>(tokens: &'a [Token], idx: &mut usize) -> &'a [Token] {
    let start = (*idx).min(tokens.len());
    if start == tokens.len() {
        return &[];
    }
    let end = condition_end(tokens, start);
    *idx = end;
    &tokens[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{join_text, tokenize};

    fn scan(
        input: &str,
        start: usize,
        scanner: for<'a> fn(&'a [Token], &mut usize) -> &'a [Token],
    ) -> (String, String) {
        let tokens = tokenize(input);
        let mut idx = start;
        let slice = join_text(scanner(&tokens, &mut idx));
        (slice, join_text(&tokens[idx.min(tokens.len())..]))
    }

    #[test]
    fn test_view_header() {
        let (header, rest) = scan("CREATE VIEW [dbo].[V] AS SELECT 1", 0, create_view_header);
        assert_eq!(header, "CREATE VIEW [dbo].[V] AS");
        assert_eq!(rest, " SELECT 1");
    }

    #[test]
    fn test_procedure_header_skips_nested_as() {
        let (header, rest) = scan(
            "CREATE PROC p @d int = (CAST(1 AS int)) AS SELECT @d",
            0,
            create_procedure_header,
        );
        assert_eq!(header, "CREATE PROC p @d int = (CAST(1 AS int)) AS");
        assert_eq!(rest, " SELECT @d");
    }

    #[test]
    fn test_create_dispatch() {
        let (header, _) = scan("CREATE VIEW v AS SELECT 1", 0, create_statement);
        assert_eq!(header, "CREATE VIEW v AS");

        let tokens = tokenize("CREATE TABLE t (a int)");
        let mut idx = 0;
        assert!(create_statement(&tokens, &mut idx).is_empty());
        assert_eq!(idx, 0);

        let tokens = tokenize("CREATE UNIQUE NONCLUSTERED INDEX ix ON t (a)");
        let mut idx = 0;
        assert!(create_statement(&tokens, &mut idx).is_empty());

        let (all, rest) = scan("CREATE SCHEMA s", 0, create_statement);
        assert_eq!(all, "CREATE SCHEMA s");
        assert!(rest.is_empty());
    }

    #[test]
    fn test_block_inner() {
        let (inner, rest) = scan("BEGIN\n  SELECT 1\nEND;", 0, block_inner);
        assert_eq!(inner, "\n  SELECT 1\n");
        assert_eq!(rest, ";");

        let (inner, rest) = scan(" (SELECT (1) AS a)", 0, block_inner);
        assert_eq!(inner, "SELECT (1) AS a");
        assert!(rest.is_empty());
    }

    #[test]
    fn test_block_inner_fallback() {
        let (all, rest) = scan("SELECT 1", 0, block_inner);
        assert_eq!(all, "SELECT 1");
        assert!(rest.is_empty());

        let (all, _) = scan("BEGIN SELECT 1", 0, block_inner);
        assert_eq!(all, "BEGIN SELECT 1");
    }

    #[test]
    fn test_find_block_reports_unterminated() {
        let tokens = tokenize("(SELECT 1");
        let mut idx = 0;
        assert!(find_block(&tokens, &mut idx).is_none());
        assert_eq!(idx, 0);

        let tokens = tokenize("SELECT 1)");
        assert!(find_block(&tokens, &mut idx).is_none());

        let tokens = tokenize("  BEGIN SELECT 1 END;");
        let inner = find_block(&tokens, &mut idx).unwrap();
        assert_eq!(join_text(inner), " SELECT 1 ");
        assert_eq!(join_text(&tokens[idx..]), ";");
    }

    #[test]
    fn test_if_with_nested_blocks() {
        let (stmt, rest) = scan(
            "IF @a = 1 BEGIN IF @b = 2 BEGIN SELECT 1 END SELECT 2 END ELSE SELECT 3",
            0,
            if_statement,
        );
        assert_eq!(
            stmt,
            "IF @a = 1 BEGIN IF @b = 2 BEGIN SELECT 1 END SELECT 2 END"
        );
        assert_eq!(rest, " ELSE SELECT 3");
    }

    #[test]
    fn test_if_single_statement_body() {
        let (stmt, rest) = scan("IF @a = 1 SET @b = 2; SELECT 3", 0, if_statement);
        assert_eq!(stmt, "IF @a = 1 SET @b = 2;");
        assert_eq!(rest, " SELECT 3");

        let (stmt, rest) = scan(
            "IF @a = 1 SELECT CASE WHEN 1 = 1 THEN 1 ELSE 0 END ELSE SELECT 2",
            0,
            if_statement,
        );
        assert_eq!(stmt, "IF @a = 1 SELECT CASE WHEN 1 = 1 THEN 1 ELSE 0 END");
        assert_eq!(rest, " ELSE SELECT 2");
    }

    #[test]
    fn test_if_condition_only() {
        let (cond, rest) = scan(
            "IF EXISTS (SELECT 1 FROM t) BEGIN DELETE FROM t END",
            0,
            if_condition,
        );
        assert_eq!(cond, "IF EXISTS (SELECT 1 FROM t) ");
        assert_eq!(rest, "BEGIN DELETE FROM t END");

        let (cond, rest) = scan("IF @a = 1;", 0, if_condition);
        assert_eq!(cond, "IF @a = 1");
        assert_eq!(rest, ";");
    }
}
