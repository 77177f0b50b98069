//! Statement boundaries inside a token stream.
//!
//! The boundary scanner re-lexes the remainder of a script and asks where the
//! first statement starts and ends. That question goes through
//! [`StatementLexer`] so tests can substitute a scripted fake for the real
//! splitter.

use super::{next_significant, Keyword, LexError, Lexer, Token, TokenKind};

/// Token range of one statement: `start` is the first significant token,
/// `end` is one past the last token belonging to the statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementBounds {
    /// Index of the first token of the statement.
    pub start: usize,
    /// Index one past the last token of the statement.
    pub end: usize,
}

impl StatementBounds {
    /// Creates new statement bounds.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Lexes arbitrary T-SQL text and reports where its statements lie.
///
/// Implementations must be re-entrant: the boundary scanner calls them on
/// fragments of the stream it is scanning.
pub trait StatementLexer {
    /// Tokenizes `text` into the shared token model.
    ///
    /// # Errors
    ///
    /// Returns a [`LexError`] if `text` is not lexically valid T-SQL.
    fn lex(&self, text: &str) -> Result<Vec<Token>, LexError>;

    /// Returns the bounds of the statements in `tokens`, in order.
    fn statement_bounds(&self, tokens: &[Token]) -> Vec<StatementBounds>;
}

/// The default [`StatementLexer`]: the lossless [`Lexer`] plus a heuristic
/// statement splitter.
#[derive(Debug, Clone, Copy, Default)]
pub struct TsqlLexer;

impl TsqlLexer {
    /// Creates a new T-SQL lexer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl StatementLexer for TsqlLexer {
    fn lex(&self, text: &str) -> Result<Vec<Token>, LexError> {
        let tokens = Lexer::new(text).tokenize();
        match LexError::first_in(&tokens) {
            Some(err) => Err(err),
            None => Ok(tokens),
        }
    }

    fn statement_bounds(&self, tokens: &[Token]) -> Vec<StatementBounds> {
        split_statements(tokens)
    }
}

/// Splits a token stream into statements.
///
/// Rules, applied at parenthesis depth 0:
/// - `CREATE`/`ALTER` of a view, procedure, function or trigger runs to `GO`
///   or the end of input.
/// - `BEGIN ... END` is depth counted (`CASE ... END` included); `BEGIN TRAN`
///   is an ordinary statement.
/// - `IF`/`WHILE` take a condition, one body statement and an optional
///   `ELSE` statement.
/// - Any other statement ends after `;`, before `END`/`ELSE`, or before the
///   next keyword that starts a statement, except where that keyword
///   continues the current one (`UNION SELECT`, `INSERT ... SELECT`,
///   `UPDATE ... SET`, `THEN DELETE`, a CTE body).
#[must_use]
pub fn split_statements(tokens: &[Token]) -> Vec<StatementBounds> {
    let mut bounds = Vec::new();
    let mut i = next_significant(tokens, 0);
    while i < tokens.len() {
        let end = statement_end(tokens, i).max(i + 1);
        bounds.push(StatementBounds::new(i, end));
        i = next_significant(tokens, end);
    }
    bounds
}

fn keyword_at(tokens: &[Token], i: usize) -> Option<Keyword> {
    tokens.get(i).and_then(Token::as_keyword)
}

/// Extends `end` over a directly following `;`.
fn absorb_semicolon(tokens: &[Token], end: usize) -> usize {
    let next = next_significant(tokens, end);
    if tokens.get(next).is_some_and(|t| t.kind == TokenKind::Semicolon) {
        next + 1
    } else {
        end
    }
}

fn statement_end(tokens: &[Token], start: usize) -> usize {
    match keyword_at(tokens, start) {
        Some(Keyword::Create | Keyword::Alter) if is_module(tokens, start) => {
            module_end(tokens, start)
        }
        Some(Keyword::Begin) if !is_transaction(tokens, start) => block_end(tokens, start),
        Some(Keyword::If | Keyword::While) => conditional_end(tokens, start),
        Some(Keyword::Go) => start + 1,
        first => simple_end(tokens, start, first),
    }
}

fn is_module(tokens: &[Token], start: usize) -> bool {
    matches!(
        keyword_at(tokens, next_significant(tokens, start + 1)),
        Some(
            Keyword::View
                | Keyword::Procedure
                | Keyword::Proc
                | Keyword::Function
                | Keyword::Trigger
        )
    )
}

fn is_transaction(tokens: &[Token], begin: usize) -> bool {
    matches!(
        keyword_at(tokens, next_significant(tokens, begin + 1)),
        Some(Keyword::Transaction | Keyword::Tran)
    )
}

/// A module definition runs until the batch separator.
fn module_end(tokens: &[Token], start: usize) -> usize {
    let mut last = start;
    for (i, token) in tokens.iter().enumerate().skip(start + 1) {
        if token.is(Keyword::Go) {
            break;
        }
        if !token.is_trivia() {
            last = i;
        }
    }
    last + 1
}

/// Depth-counted `BEGIN ... END`, plus `END TRY`/`END CATCH` and a `;`.
fn block_end(tokens: &[Token], start: usize) -> usize {
    let mut depth = 0usize;
    let mut i = start;
    while i < tokens.len() {
        match tokens[i].as_keyword() {
            Some(Keyword::Begin) if !is_transaction(tokens, i) => depth += 1,
            Some(Keyword::Case) => depth += 1,
            Some(Keyword::End) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let mut end = i + 1;
                    let next = next_significant(tokens, end);
                    if tokens
                        .get(next)
                        .is_some_and(|t| t.is_word("try") || t.is_word("catch"))
                    {
                        end = next + 1;
                    }
                    return absorb_semicolon(tokens, end);
                }
            }
            _ => {}
        }
        i += 1;
    }
    last_significant_end(tokens, start)
}

/// `IF`/`WHILE`: condition, body statement, optional `ELSE` statement.
fn conditional_end(tokens: &[Token], start: usize) -> usize {
    let mut depth = 0usize;
    let mut body = None;
    for (i, token) in tokens.iter().enumerate().skip(start + 1) {
        match token.kind {
            TokenKind::LeftParen => depth += 1,
            TokenKind::RightParen => depth = depth.saturating_sub(1),
            TokenKind::Keyword(kw) if depth == 0 && kw.starts_statement() => {
                body = Some(i);
                break;
            }
            _ => {}
        }
    }
    let Some(body) = body else {
        return last_significant_end(tokens, start);
    };

    let end = statement_end(tokens, body).max(body + 1);
    let next = next_significant(tokens, end);
    if keyword_at(tokens, next) == Some(Keyword::Else) {
        let else_body = next_significant(tokens, next + 1);
        if else_body < tokens.len() {
            return statement_end(tokens, else_body).max(else_body + 1);
        }
        return next + 1;
    }
    end
}

fn last_significant_end(tokens: &[Token], start: usize) -> usize {
    tokens
        .iter()
        .enumerate()
        .skip(start)
        .rev()
        .find(|(_, t)| !t.is_trivia())
        .map_or(start + 1, |(i, _)| i + 1)
}

/// Continuation state of a plain statement.
#[derive(Default)]
struct Pending {
    /// `INSERT` seen, its `SELECT`/`VALUES`/`EXEC` source not yet.
    insert_source: bool,
    /// `UPDATE` seen, its `SET` not yet.
    update_set: bool,
    /// Leading `WITH`, its statement not yet.
    cte_body: bool,
}

impl Pending {
    fn continues(&mut self, kw: Keyword, prev: Option<Keyword>) -> bool {
        if matches!(
            prev,
            Some(Keyword::Union | Keyword::All | Keyword::Except | Keyword::Intersect)
        ) && kw == Keyword::Select
        {
            return true;
        }
        if prev == Some(Keyword::For) && kw == Keyword::Select {
            return true;
        }
        if prev == Some(Keyword::Then)
            && matches!(kw, Keyword::Update | Keyword::Delete | Keyword::Insert)
        {
            self.note(kw);
            return true;
        }
        if self.insert_source
            && matches!(kw, Keyword::Select | Keyword::Exec | Keyword::Execute)
        {
            self.insert_source = false;
            return true;
        }
        if self.update_set && kw == Keyword::Set {
            self.update_set = false;
            return true;
        }
        if self.cte_body
            && matches!(
                kw,
                Keyword::Select
                    | Keyword::Insert
                    | Keyword::Update
                    | Keyword::Delete
                    | Keyword::Merge
            )
        {
            self.cte_body = false;
            self.note(kw);
            return true;
        }
        false
    }

    fn note(&mut self, kw: Keyword) {
        match kw {
            Keyword::Insert => self.insert_source = true,
            Keyword::Update => self.update_set = true,
            Keyword::With => self.cte_body = true,
            _ => {}
        }
    }
}

/// `DROP CONSTRAINT`, `DROP COLUMN` and `ALTER COLUMN` inside an
/// `ALTER TABLE` statement.
fn alter_table_clause(tokens: &[Token], i: usize, first: Option<Keyword>) -> bool {
    first == Some(Keyword::Alter)
        && matches!(keyword_at(tokens, i), Some(Keyword::Drop | Keyword::Alter))
        && matches!(
            keyword_at(tokens, next_significant(tokens, i + 1)),
            Some(Keyword::Column | Keyword::Constraint)
        )
}

fn simple_end(tokens: &[Token], start: usize, first: Option<Keyword>) -> usize {
    let mut pending = Pending::default();
    if let Some(kw) = first {
        pending.note(kw);
    }
    let mut depth = 0usize;
    let mut case_depth = 0usize;
    let mut last = start;
    let mut prev = first;

    for (i, token) in tokens.iter().enumerate().skip(start) {
        if token.is_trivia() {
            continue;
        }
        match token.kind {
            TokenKind::LeftParen => depth += 1,
            TokenKind::RightParen => depth = depth.saturating_sub(1),
            TokenKind::Semicolon if depth == 0 => return i + 1,
            TokenKind::Keyword(kw) if depth == 0 && i > start => match kw {
                Keyword::Case => case_depth += 1,
                Keyword::End if case_depth > 0 => case_depth -= 1,
                Keyword::End | Keyword::Go => return last + 1,
                Keyword::Else if case_depth == 0 => return last + 1,
                Keyword::Values if pending.insert_source => pending.insert_source = false,
                kw if kw.starts_statement()
                    && !pending.continues(kw, prev)
                    && !alter_table_clause(tokens, i, first) =>
                {
                    return last + 1;
                }
                _ => {}
            },
            _ => {}
        }
        last = i;
        prev = token.as_keyword();
    }
    last + 1
}
