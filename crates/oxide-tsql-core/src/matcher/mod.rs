//! Token-sequence pattern matching.
//!
//! A [`SequenceMatcher`] holds an ordered list of [`MatchStep`]s and an
//! optional repeating tail. Running it against a token stream either yields
//! the captured values or reports that the stream does not have that shape.
//!
//! ```rust
//! use oxide_tsql_core::lexer::{tokenize, Keyword};
//! use oxide_tsql_core::matcher::{MatchStep, SequenceMatcher};
//!
//! let tokens = tokenize("ALTER TABLE [dbo].[Foo] DROP CONSTRAINT [PK_Foo]");
//! let steps = [
//!     MatchStep::keyword(Keyword::Alter),
//!     MatchStep::keyword(Keyword::Table),
//!     MatchStep::identifier(),
//!     MatchStep::keyword(Keyword::Drop),
//!     MatchStep::keyword(Keyword::Constraint),
//!     MatchStep::identifier(),
//! ];
//! let result = SequenceMatcher::new(&steps).run(&tokens, 0);
//!
//! assert!(result.matched);
//! assert_eq!(result.values, vec!["foo", "pk_foo"]);
//! ```

mod column;

pub use column::{ColumnDataTypeDefine, ColumnDefine};
pub(crate) use column::{group_end, scan_data_type};

use crate::dialect::{TargetDialect, POSTGRES};
use crate::lexer::{Keyword, Token, TokenKind, IDENTIFIER_KINDS};
use crate::rewrite::{is_dbo_qualifier, normalize_identifier};

/// What a matched step records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Capture {
    /// Nothing.
    #[default]
    None,
    /// The token text as written.
    RawValue,
    /// The normalized identifier, `dbo.` qualifier and delimiters removed.
    Identifier,
    /// A column definition: the identifier followed by a type and
    /// constraints, scanned up to the end of the clause.
    ColumnDefinition,
}

/// One step of a sequence: the token kinds it accepts and what it captures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchStep {
    kinds: Vec<TokenKind>,
    capture: Capture,
}

impl MatchStep {
    /// Creates a step accepting any of `kinds`.
    #[must_use]
    pub fn new(kinds: impl Into<Vec<TokenKind>>, capture: Capture) -> Self {
        Self {
            kinds: kinds.into(),
            capture,
        }
    }

    /// A step accepting exactly one token kind, capturing nothing.
    #[must_use]
    pub fn kind(kind: TokenKind) -> Self {
        Self::new(vec![kind], Capture::None)
    }

    /// A step accepting one keyword, capturing nothing.
    #[must_use]
    pub fn keyword(keyword: Keyword) -> Self {
        Self::kind(TokenKind::Keyword(keyword))
    }

    /// A step accepting any of `keywords`, capturing nothing.
    #[must_use]
    pub fn any_keyword(keywords: &[Keyword]) -> Self {
        Self::new(
            keywords.iter().map(|kw| TokenKind::Keyword(*kw)).collect::<Vec<_>>(),
            Capture::None,
        )
    }

    /// A step accepting a bare or quoted identifier and capturing its
    /// normalized name.
    #[must_use]
    pub fn identifier() -> Self {
        Self::new(IDENTIFIER_KINDS, Capture::Identifier)
    }

    /// A step accepting a column name and capturing the whole column
    /// definition that follows it.
    #[must_use]
    pub fn column_definition() -> Self {
        Self::new(IDENTIFIER_KINDS, Capture::ColumnDefinition)
    }

    /// Returns this step capturing the raw token text instead.
    #[must_use]
    pub fn raw(mut self) -> Self {
        self.capture = Capture::RawValue;
        self
    }

    /// Returns true if the step accepts tokens of `kind`.
    #[must_use]
    pub fn accepts(&self, kind: TokenKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Returns what this step captures.
    #[must_use]
    pub const fn capture(&self) -> Capture {
        self.capture
    }
}

/// Outcome of running a [`SequenceMatcher`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SequenceMatchResult {
    /// True when every mandatory step matched.
    pub matched: bool,
    /// Raw values and identifiers, in step order.
    pub values: Vec<String>,
    /// Column definitions, in step order.
    pub columns: Vec<ColumnDefine>,
    /// On success, the index after the last consumed token; on failure, the
    /// index of the token that did not fit.
    pub stop_index: usize,
}

impl SequenceMatchResult {
    fn failed(stop_index: usize) -> Self {
        Self {
            stop_index,
            ..Self::default()
        }
    }
}

#[derive(Default)]
struct Captures {
    values: Vec<String>,
    columns: Vec<ColumnDefine>,
}

impl Captures {
    fn append(&mut self, other: Self) {
        self.values.extend(other.values);
        self.columns.extend(other.columns);
    }
}

/// Greedy, non-backtracking matcher over token streams.
///
/// White space between steps is skipped, and so are comments unless
/// [`keep_comments`](Self::keep_comments) was called. A step never spans
/// trivia: it looks at exactly one significant token (a column definition
/// then scans on from there).
#[derive(Clone, Copy)]
pub struct SequenceMatcher<'s, 'd> {
    steps: &'s [MatchStep],
    tail: &'s [MatchStep],
    skip_comments: bool,
    dialect: &'d dyn TargetDialect,
}

impl<'s> SequenceMatcher<'s, 'static> {
    /// Creates a matcher for `steps`, mapping column types to PostgreSQL.
    #[must_use]
    pub fn new(steps: &'s [MatchStep]) -> Self {
        Self {
            steps,
            tail: &[],
            skip_comments: true,
            dialect: &POSTGRES,
        }
    }
}

impl<'s, 'd> SequenceMatcher<'s, 'd> {
    /// Allows `tail` to repeat, zero or more times, after the mandatory steps.
    #[must_use]
    pub const fn repeating(mut self, tail: &'s [MatchStep]) -> Self {
        self.tail = tail;
        self
    }

    /// Makes comments significant, so a comment between steps fails the
    /// match.
    #[must_use]
    pub const fn keep_comments(mut self) -> Self {
        self.skip_comments = false;
        self
    }

    /// Uses `dialect` to map captured column types and defaults.
    #[must_use]
    pub const fn with_dialect<'e>(self, dialect: &'e dyn TargetDialect) -> SequenceMatcher<'s, 'e> {
        SequenceMatcher {
            steps: self.steps,
            tail: self.tail,
            skip_comments: self.skip_comments,
            dialect,
        }
    }

    /// Matches the steps against `tokens` starting at `start`.
    ///
    /// An out-of-range `start` never matches.
    #[must_use]
    pub fn run(&self, tokens: &[Token], start: usize) -> SequenceMatchResult {
        if start >= tokens.len() {
            return SequenceMatchResult::failed(start);
        }

        let mut captures = Captures::default();
        let mut pos = start;
        for step in self.steps {
            match self.match_step(tokens, pos, step, &mut captures) {
                Ok(next) => pos = next,
                Err(at) => return SequenceMatchResult::failed(at),
            }
        }

        if !self.tail.is_empty() {
            'repeat: loop {
                let mut repetition = Captures::default();
                let mut next = pos;
                for step in self.tail {
                    match self.match_step(tokens, next, step, &mut repetition) {
                        Ok(n) => next = n,
                        Err(_) => break 'repeat,
                    }
                }
                if next == pos {
                    break;
                }
                captures.append(repetition);
                pos = next;
            }
        }

        SequenceMatchResult {
            matched: true,
            values: captures.values,
            columns: captures.columns,
            stop_index: pos,
        }
    }

    fn skip_trivia(&self, tokens: &[Token], from: usize) -> usize {
        let mut i = from;
        while i < tokens.len() {
            let kind = tokens[i].kind;
            let skippable =
                kind == TokenKind::Whitespace || (self.skip_comments && kind.is_comment());
            if !skippable {
                break;
            }
            i += 1;
        }
        i
    }

    /// Matches one step at the next significant token after `pos`. Returns
    /// the index after the consumed tokens, or the index of the mismatch.
    fn match_step(
        &self,
        tokens: &[Token],
        pos: usize,
        step: &MatchStep,
        captures: &mut Captures,
    ) -> Result<usize, usize> {
        let idx = self.skip_trivia(tokens, pos);
        let token = tokens.get(idx).ok_or(idx)?;
        if !step.accepts(token.kind) {
            return Err(idx);
        }
        match step.capture {
            Capture::None => Ok(idx + 1),
            Capture::RawValue => {
                captures.values.push(token.text.clone());
                Ok(idx + 1)
            }
            Capture::Identifier => {
                let (name, next) = identifier_at(tokens, idx);
                captures.values.push(name);
                Ok(next)
            }
            Capture::ColumnDefinition => {
                let (column, next) = column::scan_column_definition(tokens, idx, self.dialect);
                captures.columns.push(column);
                Ok(next)
            }
        }
    }
}

/// Reads the identifier at `idx`, collapsing a directly attached
/// `dbo.name` into `name`.
fn identifier_at(tokens: &[Token], idx: usize) -> (String, usize) {
    if is_dbo_qualifier(tokens, idx)
        && tokens
            .get(idx + 2)
            .is_some_and(|t| t.kind.is_identifier())
    {
        return (normalize_identifier(&tokens[idx + 2].text), idx + 3);
    }
    (normalize_identifier(&tokens[idx].text), idx + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn alter_table_prefix() -> Vec<MatchStep> {
        vec![
            MatchStep::keyword(Keyword::Alter),
            MatchStep::keyword(Keyword::Table),
            MatchStep::identifier(),
        ]
    }

    #[test]
    fn test_simple_sequence() {
        let tokens = tokenize("ALTER  TABLE\n  Foo");
        let steps = alter_table_prefix();
        let result = SequenceMatcher::new(&steps).run(&tokens, 0);
        assert!(result.matched);
        assert_eq!(result.values, vec!["foo"]);
        assert_eq!(result.stop_index, tokens.len());
    }

    #[test]
    fn test_mismatch_reports_offending_token() {
        let tokens = tokenize("ALTER VIEW Foo");
        let steps = alter_table_prefix();
        let result = SequenceMatcher::new(&steps).run(&tokens, 0);
        assert!(!result.matched);
        assert_eq!(result.stop_index, 2);
        assert!(result.values.is_empty());
    }

    #[test]
    fn test_no_skipping_of_unexpected_tokens() {
        let tokens = tokenize("ALTER x TABLE Foo");
        let steps = alter_table_prefix();
        assert!(!SequenceMatcher::new(&steps).run(&tokens, 0).matched);
    }

    #[test]
    fn test_out_of_range_start() {
        let tokens = tokenize("ALTER TABLE Foo");
        let steps = alter_table_prefix();
        let result = SequenceMatcher::new(&steps).run(&tokens, tokens.len());
        assert!(!result.matched);
    }

    #[test]
    fn test_dbo_qualified_identifier() {
        let tokens = tokenize("ALTER TABLE dbo.helpFiles");
        let steps = alter_table_prefix();
        let result = SequenceMatcher::new(&steps).run(&tokens, 0);
        assert_eq!(result.values, vec!["helpfiles"]);
        assert_eq!(result.stop_index, tokens.len());
    }

    #[test]
    fn test_comments_skipped_by_default() {
        let tokens = tokenize("ALTER /* why */ TABLE -- note\n Foo");
        let steps = alter_table_prefix();
        assert!(SequenceMatcher::new(&steps).run(&tokens, 0).matched);
        assert!(!SequenceMatcher::new(&steps)
            .keep_comments()
            .run(&tokens, 0)
            .matched);
    }

    #[test]
    fn test_raw_capture() {
        let tokens = tokenize("EXEC(@sql)");
        let steps = vec![
            MatchStep::any_keyword(&[Keyword::Exec, Keyword::Execute]),
            MatchStep::kind(TokenKind::LeftParen),
            MatchStep::kind(TokenKind::Variable).raw(),
            MatchStep::kind(TokenKind::RightParen),
        ];
        let result = SequenceMatcher::new(&steps).run(&tokens, 0);
        assert_eq!(result.values, vec!["@sql"]);
    }

    #[test]
    fn test_repeating_tail() {
        let tokens = tokenize("ADD a int, b bit NOT NULL, c varchar(5)");
        let steps = vec![
            MatchStep::keyword(Keyword::Add),
            MatchStep::column_definition(),
        ];
        let tail = vec![MatchStep::kind(TokenKind::Comma), MatchStep::column_definition()];
        let result = SequenceMatcher::new(&steps).repeating(&tail).run(&tokens, 0);
        assert!(result.matched);
        let names: Vec<&str> = result.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(!result.columns[1].data_type.nullable);
        assert_eq!(result.stop_index, tokens.len());
    }

    #[test]
    fn test_partial_repetition_not_consumed() {
        let tokens = tokenize("ADD a int, ;");
        let steps = vec![
            MatchStep::keyword(Keyword::Add),
            MatchStep::column_definition(),
        ];
        let tail = vec![MatchStep::kind(TokenKind::Comma), MatchStep::column_definition()];
        let result = SequenceMatcher::new(&steps).repeating(&tail).run(&tokens, 0);
        assert!(result.matched);
        assert_eq!(result.columns.len(), 1);
        assert_eq!(tokens[result.stop_index].kind, TokenKind::Comma);
    }

    #[test]
    fn test_rerun_at_stop_index_does_not_overlap() {
        let tokens = tokenize("GO GO");
        let steps = vec![MatchStep::keyword(Keyword::Go)];
        let matcher = SequenceMatcher::new(&steps);
        let first = matcher.run(&tokens, 0);
        assert_eq!(first.stop_index, 1);
        let second = matcher.run(&tokens, first.stop_index);
        assert!(second.matched);
        assert_eq!(second.stop_index, 3);
        assert!(!matcher.run(&tokens, second.stop_index).matched);
    }

    #[test]
    fn test_custom_dialect() {
        struct Upper;
        impl TargetDialect for Upper {
            fn name(&self) -> &'static str {
                "upper"
            }
            fn map_type(&self, name: &str, _args: &[String]) -> String {
                name.to_ascii_uppercase()
            }
        }

        let tokens = tokenize("ADD a int");
        let steps = vec![
            MatchStep::keyword(Keyword::Add),
            MatchStep::column_definition(),
        ];
        let result = SequenceMatcher::new(&steps)
            .with_dialect(&Upper)
            .run(&tokens, 0);
        assert_eq!(result.columns[0].data_type.data_type, "INT");
    }
}
