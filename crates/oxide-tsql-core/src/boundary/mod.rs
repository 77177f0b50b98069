//! Statement boundary scanning.
//!
//! Every scanner takes a token stream and a cursor, returns the slice making
//! up one statement, clause or block, and moves the cursor past it. Scanners
//! never fail: input they cannot classify comes back as a best-effort slice,
//! so repeatedly scanning until the cursor reaches the end partitions the
//! stream without losing any text.

mod block;

pub use block::{
    block_inner, create_procedure_header, create_statement, create_view_header, find_block,
    if_condition, if_statement,
};

use tracing::debug;

use crate::lexer::{
    join_text, next_significant, Keyword, StatementBounds, StatementLexer, Token, TokenKind,
};
use crate::matcher::{MatchStep, SequenceMatcher};

/// Returns the first complete statement of `tokens[*idx..]` and advances
/// `idx` past it.
///
/// In order of priority:
/// 1. comments leading the remainder come back alone, through the last one;
/// 2. `UNION` or `UNION ALL` comes back alone;
/// 3. a `CREATE ... AS` statement is cut after `AS`, so header and body are
///    separate statements;
/// 4. `SELECT ... UNION SELECT ...` is cut before `UNION`, keeping the first
///    line break in between;
/// 5. otherwise the statement the lexer reports first.
///
/// Steps 3 to 5 re-lex the remaining text with `lexer`. Leading white space
/// stays with the statement that follows it. An empty or out-of-range
/// cursor yields an empty slice.
pub fn first_complete_statement<'a, L>(
    lexer: &L,
    tokens: &'a [Token],
    idx: &mut usize,
) -> &'a [Token]
where
    L: StatementLexer + ?Sized,
{
    let start = *idx;
    if start >= tokens.len() {
        *idx = tokens.len();
        return &[];
    }
    let end = statement_end(lexer, tokens, start).clamp(start + 1, tokens.len());
    *idx = end;
    &tokens[start..end]
}

fn statement_end<L>(lexer: &L, tokens: &[Token], start: usize) -> usize
where
    L: StatementLexer + ?Sized,
{
    if let Some(end) = leading_comments_end(tokens, start) {
        return end;
    }
    if let Some(end) = union_end(tokens, start) {
        return end;
    }

    let rest = &tokens[start..];
    let relexed = match lexer.lex(&join_text(rest)) {
        Ok(relexed) => relexed,
        Err(err) => {
            debug!(%err, "re-lexing failed, scanning to the next semicolon");
            return start + semicolon_end(rest);
        }
    };
    let Some(bounds) = lexer.statement_bounds(&relexed).into_iter().next() else {
        return tokens.len();
    };
    let (s, e) = map_bounds(rest, &relexed, bounds);
    let (s, e) = (start + s, start + e);

    if s > next_significant(tokens, start) {
        // Tokens the lexer did not count as part of the statement.
        return s;
    }
    match tokens.get(s).and_then(Token::as_keyword) {
        Some(Keyword::Create) => {
            if let Some(as_idx) = find_top_level(tokens, s, e, |t| t.is(Keyword::As)) {
                return as_idx + 1;
            }
        }
        Some(Keyword::Select) => {
            if let Some(union) = find_top_level(tokens, s, e, |t| t.is(Keyword::Union)) {
                return arm_end(tokens, s, union);
            }
        }
        _ => {}
    }
    e
}

/// End of the last comment in the trivia run at `start`, if it has one.
fn leading_comments_end(tokens: &[Token], start: usize) -> Option<usize> {
    let run = tokens[start..]
        .iter()
        .take_while(|t| t.is_trivia())
        .count();
    tokens[start..start + run]
        .iter()
        .rposition(|t| t.kind.is_comment())
        .map(|i| start + i + 1)
}

fn union_end(tokens: &[Token], start: usize) -> Option<usize> {
    let steps = [
        MatchStep::keyword(Keyword::Union),
        MatchStep::keyword(Keyword::All),
    ];
    let union_all = SequenceMatcher::new(&steps).keep_comments().run(tokens, start);
    if union_all.matched {
        return Some(union_all.stop_index);
    }
    let union = SequenceMatcher::new(&steps[..1])
        .keep_comments()
        .run(tokens, start);
    union.matched.then_some(union.stop_index)
}

/// Index after the first `;` at parenthesis depth 0, or the length.
fn semicolon_end(tokens: &[Token]) -> usize {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::LeftParen => depth += 1,
            TokenKind::RightParen => depth = depth.saturating_sub(1),
            TokenKind::Semicolon if depth == 0 => return i + 1,
            _ => {}
        }
    }
    tokens.len()
}

fn byte_offsets(tokens: &[Token]) -> Vec<usize> {
    let mut offset = 0;
    tokens
        .iter()
        .map(|t| {
            let start = offset;
            offset += t.text.len();
            start
        })
        .collect()
}

/// Translates bounds over `relexed` into indices of `ours`, which covers
/// the same text but may be tokenized differently. The start rounds down
/// and the end rounds up to token boundaries of `ours`.
fn map_bounds(ours: &[Token], relexed: &[Token], bounds: StatementBounds) -> (usize, usize) {
    let our_offsets = byte_offsets(ours);
    let their_offsets = byte_offsets(relexed);
    let total: usize = relexed.iter().map(|t| t.text.len()).sum();
    let byte_at = |i: usize| their_offsets.get(i).copied().unwrap_or(total);

    let start_byte = byte_at(bounds.start);
    let end_byte = byte_at(bounds.end);
    let start = our_offsets
        .partition_point(|&o| o <= start_byte)
        .saturating_sub(1);
    let end = our_offsets.partition_point(|&o| o < end_byte);
    (start, end)
}

/// First token in `from..to` at parenthesis depth 0 satisfying `pred`.
pub(crate) fn find_top_level(
    tokens: &[Token],
    from: usize,
    to: usize,
    pred: impl Fn(&Token) -> bool,
) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().take(to).skip(from) {
        match token.kind {
            TokenKind::LeftParen => depth += 1,
            TokenKind::RightParen => depth = depth.saturating_sub(1),
            _ if depth == 0 && pred(token) => return Some(i),
            _ => {}
        }
    }
    None
}

/// End of the union arm starting at `start` whose `UNION` is at `union`:
/// through the first line break of the trivia before `UNION`, or right
/// after the last significant token if there is none.
fn arm_end(tokens: &[Token], start: usize, union: usize) -> usize {
    let mut run = union;
    while run > start && tokens[run - 1].is_trivia() {
        run -= 1;
    }
    (run..union)
        .find(|&i| tokens[i].is_newline())
        .map_or(run, |i| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{tokenize, TsqlLexer};

    fn pieces(input: &str) -> Vec<String> {
        let tokens = tokenize(input);
        let lexer = TsqlLexer::new();
        let mut idx = 0;
        let mut out = Vec::new();
        while idx < tokens.len() {
            out.push(join_text(first_complete_statement(&lexer, &tokens, &mut idx)));
        }
        out
    }

    #[test]
    fn test_view_script_pieces() {
        let input = "CREATE VIEW dbo.v AS\nSELECT a, b AS x FROM t\nUNION ALL\nSELECT c, d FROM t2\nGO\n";
        assert_eq!(
            pieces(input),
            vec![
                "CREATE VIEW dbo.v AS",
                "\nSELECT a, b AS x FROM t\n",
                "UNION ALL",
                "\nSELECT c, d FROM t2",
                "\nGO",
                "\n",
            ]
        );
    }

    #[test]
    fn test_leading_comment_alone() {
        assert_eq!(
            pieces("-- header\n/* more */\nSELECT 1;"),
            vec!["-- header\n/* more */", "\nSELECT 1;"]
        );
    }

    #[test]
    fn test_leading_comment_after_white_space() {
        assert_eq!(
            pieces("  -- a\n  SELECT 1 -- b\n"),
            vec!["  -- a", "\n  SELECT 1", " -- b", "\n"]
        );
        assert_eq!(pieces("  SELECT 1"), vec!["  SELECT 1"]);
    }

    #[test]
    fn test_comment_before_union() {
        assert_eq!(
            pieces("SELECT a FROM t\n-- second\nUNION SELECT b FROM u"),
            vec![
                "SELECT a FROM t\n",
                "-- second",
                "\nUNION",
                " SELECT b FROM u",
            ]
        );
    }

    #[test]
    fn test_arm_without_line_break() {
        assert_eq!(
            pieces("SELECT a FROM t UNION SELECT b FROM u"),
            vec!["SELECT a FROM t", " UNION", " SELECT b FROM u"]
        );
    }

    #[test]
    fn test_procedure_header_split() {
        let input = "CREATE PROCEDURE p @a int AS\nBEGIN\n  SELECT @a\nEND";
        assert_eq!(
            pieces(input),
            vec!["CREATE PROCEDURE p @a int AS", "\nBEGIN\n  SELECT @a\nEND"]
        );
    }

    #[test]
    fn test_lex_error_falls_back_to_semicolon() {
        assert_eq!(
            pieces("SELECT 'x'; SELECT 'open"),
            vec!["SELECT 'x';", " SELECT 'open"]
        );
    }

    #[test]
    fn test_empty_and_out_of_range() {
        let lexer = TsqlLexer::new();
        let mut idx = 0;
        assert!(first_complete_statement(&lexer, &[], &mut idx).is_empty());
        assert_eq!(idx, 0);

        let tokens = tokenize("SELECT 1");
        let mut idx = 7;
        assert!(first_complete_statement(&lexer, &tokens, &mut idx).is_empty());
        assert_eq!(idx, tokens.len());
    }

    #[test]
    fn test_trailing_trivia_is_kept() {
        assert_eq!(pieces("SELECT 1  \n"), vec!["SELECT 1", "  \n"]);
        assert_eq!(pieces("   "), vec!["   "]);
    }

    #[test]
    fn test_map_bounds_rounds_outward() {
        let ours = tokenize("SELECT  1");
        // Same text, but the white space split in two.
        let relexed = vec![
            ours[0].clone(),
            Token::new(TokenKind::Whitespace, " ", ours[1].span),
            Token::new(TokenKind::Whitespace, " ", ours[1].span),
            ours[2].clone(),
        ];
        assert_eq!(map_bounds(&ours, &relexed, StatementBounds::new(2, 3)), (1, 2));
        assert_eq!(map_bounds(&ours, &relexed, StatementBounds::new(0, 4)), (0, 3));
    }
}
