//! Column aliasing for the SELECT arms of a view body.
//!
//! PostgreSQL names the columns of a `UNION` after its first arm. Later arms
//! of a migrated view often carry unnamed expressions that only line up with
//! the first arm by position. The generator remembers the column names of
//! the first arm and aliases the unnamed positions of every later arm with
//! them.

use crate::lexer::{next_significant, Keyword, Token, TokenKind};
use crate::matcher::group_end;
use crate::rewrite::{
    is_dbo_qualifier, normalize_identifier, render_identifier, rewrite_token_at, variable_name,
};

/// State of the select-list position being scanned.
#[derive(Debug, Clone, Default)]
struct Position {
    /// Output length after the last significant token of the position.
    content_end: Option<usize>,
    /// Normalized last identifier at depth 0; cleared by `*`.
    last_identifier: Option<String>,
    /// Alias from `AS name`, `AS 'name'` or a bare trailing alias.
    alias: Option<String>,
    /// Alias from `name = value`, emitted after the value.
    assigned: Option<String>,
    /// Kind of the previous significant token, for bare alias detection.
    previous: Option<TokenKind>,
}

impl Position {
    fn mark(&mut self, out: &str, kind: TokenKind) {
        self.content_end = Some(out.len());
        self.previous = Some(kind);
    }

    /// A bare identifier directly after a complete value is an alias.
    fn takes_bare_alias(&self) -> bool {
        match self.previous {
            Some(kind) => {
                kind.is_identifier()
                    || kind.is_string()
                    || kind.is_number()
                    || kind == TokenKind::RightParen
                    || kind == TokenKind::Keyword(Keyword::End)
            }
            None => false,
        }
    }
}

/// Rewrites the SELECT arms of one view body.
///
/// Call [`generate`](Self::generate) once per arm, in order; the first arm
/// records the column names and the others are aliased with them. Call
/// [`reset`](Self::reset) before the next view.
///
/// In later arms only an explicit alias (`AS x`, `x = v`) names a column;
/// a bare column reference is aliased too, so `SELECT c, d` after
/// `SELECT a, b AS x` becomes `SELECT c AS a, d AS x`.
#[derive(Debug, Clone)]
pub struct ViewSelectGenerator {
    column_names: Vec<Option<String>>,
    is_first_select: bool,
    other_select_column: usize,
    current_column_named: bool,
    position: Position,
}

impl Default for ViewSelectGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewSelectGenerator {
    /// Creates a generator expecting the first arm of a view.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            column_names: Vec::new(),
            is_first_select: true,
            other_select_column: 0,
            current_column_named: false,
            position: Position {
                content_end: None,
                last_identifier: None,
                alias: None,
                assigned: None,
                previous: None,
            },
        }
    }

    /// Forgets the column names so the next arm counts as the first one.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Column names recorded from the first arm. `None` marks a position
    /// without a derivable name, such as `*`.
    #[must_use]
    pub fn column_names(&self) -> &[Option<String>] {
        &self.column_names
    }

    /// Returns true until a select list has been processed.
    #[must_use]
    pub const fn is_first_select(&self) -> bool {
        self.is_first_select
    }

    /// Rewrites one SELECT arm.
    pub fn generate(&mut self, tokens: &[Token]) -> String {
        let mut out = String::new();
        let mut depth = 0usize;
        let mut in_list = false;
        let mut i = 0;

        while i < tokens.len() {
            let token = &tokens[i];
            if token.is_trivia() {
                out.push_str(&token.text);
                i += 1;
                continue;
            }

            if depth == 0 && token.is(Keyword::Select) {
                if in_list {
                    self.finish_list(&mut out);
                }
                in_list = true;
                self.start_list();
                out.push_str(&token.text);
                i += 1;
                continue;
            }

            if in_list && depth == 0 {
                let ends_list = match token.kind {
                    TokenKind::Semicolon => true,
                    TokenKind::Keyword(kw) => kw.ends_select_list(),
                    _ => false,
                };
                if ends_list {
                    self.finish_list(&mut out);
                    in_list = false;
                } else if token.kind == TokenKind::Comma {
                    self.finish_position(&mut out);
                    out.push_str(&token.text);
                    i += 1;
                    continue;
                } else if !matches!(token.kind, TokenKind::LeftParen | TokenKind::RightParen) {
                    i = self.list_token(tokens, i, &mut out);
                    continue;
                }
            }

            match token.kind {
                TokenKind::LeftParen => depth += 1,
                TokenKind::RightParen => depth = depth.saturating_sub(1),
                _ => {}
            }
            if token.kind.is_identifier() && !is_dbo_qualifier(tokens, i) {
                out.push_str(&render_identifier(&token.text));
            } else {
                rewrite_token_at(tokens, &mut i, &mut out);
            }
            if in_list {
                let kind = tokens[i].kind;
                self.position.mark(&out, kind);
            }
            i += 1;
        }

        if in_list {
            self.finish_list(&mut out);
        }
        out
    }

    fn start_list(&mut self) {
        self.other_select_column = 0;
        self.current_column_named = false;
        self.position = Position::default();
    }

    /// Handles a significant depth-0 token of the select list and returns
    /// the index of the next token to look at.
    fn list_token(&mut self, tokens: &[Token], i: usize, out: &mut String) -> usize {
        let token = &tokens[i];
        let next = next_significant(tokens, i + 1);

        match token.kind {
            TokenKind::Keyword(Keyword::Top) if self.position.content_end.is_none() => {
                out.push_str(&token.text);
                let count = next;
                let Some(count_token) = tokens.get(count) else {
                    return count;
                };
                let end = if count_token.kind == TokenKind::LeftParen {
                    group_end(tokens, count)
                } else {
                    count
                };
                for t in &tokens[i + 1..=end] {
                    out.push_str(&t.text);
                }
                end + 1
            }
            TokenKind::Keyword(Keyword::Distinct | Keyword::All)
                if self.position.content_end.is_none() =>
            {
                out.push_str(&token.text);
                i + 1
            }
            TokenKind::Keyword(Keyword::As) => {
                out.push_str(&token.text);
                self.position.mark(out, token.kind);
                let Some(alias) = tokens
                    .get(next)
                    .filter(|t| t.kind.is_identifier() || t.kind.is_string())
                    .map(Token::promoted_to_identifier)
                else {
                    return i + 1;
                };
                for t in &tokens[i + 1..next] {
                    out.push_str(&t.text);
                }
                let name = normalize_identifier(&alias.text);
                out.push_str(&render_identifier(&name));
                self.position.mark(out, alias.kind);
                self.position.last_identifier = Some(name.clone());
                self.position.alias = Some(name);
                self.current_column_named = true;
                next + 1
            }
            _ if token.is(Keyword::Convert) || token.is_word("dateadd") => {
                let mut end = i;
                rewrite_token_at(tokens, &mut end, out);
                self.position.mark(out, TokenKind::RightParen);
                end + 1
            }
            _ if is_dbo_qualifier(tokens, i) => i + 2,
            kind if kind.is_identifier() => {
                let name = normalize_identifier(&token.text);
                let assigns = self.position.content_end.is_none()
                    && tokens.get(next).is_some_and(|t| t.kind == TokenKind::Eq);
                if assigns {
                    self.position.assigned = Some(name);
                    self.current_column_named = true;
                    return next_significant(tokens, next + 1);
                }
                if self.position.takes_bare_alias() {
                    self.position.alias = Some(name.clone());
                    self.current_column_named = true;
                }
                out.push_str(&render_identifier(&token.text));
                self.position.mark(out, kind);
                self.position.last_identifier = Some(name);
                i + 1
            }
            TokenKind::Star => {
                out.push_str(&token.text);
                self.position.mark(out, TokenKind::Star);
                self.position.last_identifier = None;
                i + 1
            }
            TokenKind::Variable => {
                out.push_str(&variable_name(&token.text));
                self.position.mark(out, TokenKind::Variable);
                i + 1
            }
            kind => {
                out.push_str(&token.text);
                self.position.mark(out, kind);
                i + 1
            }
        }
    }

    /// Closes the current position: records its name in the first arm, or
    /// inserts the recorded name as an alias in later arms.
    fn finish_position(&mut self, out: &mut String) {
        let position = std::mem::take(&mut self.position);
        let Some(content_end) = position.content_end else {
            self.current_column_named = false;
            return;
        };

        let mut alias = None;
        if let Some(assigned) = &position.assigned {
            alias = Some(assigned.clone());
        } else if !self.is_first_select && !self.current_column_named {
            alias = self
                .column_names
                .get(self.other_select_column)
                .cloned()
                .flatten();
        }
        if let Some(name) = &alias {
            out.insert_str(content_end, &format!(" AS {}", render_identifier(name)));
        }

        if self.is_first_select {
            let name = position
                .assigned
                .or(position.alias)
                .or(position.last_identifier);
            self.column_names.push(name);
        } else {
            self.other_select_column += 1;
        }
        self.current_column_named = false;
    }

    fn finish_list(&mut self, out: &mut String) {
        self.finish_position(out);
        self.is_first_select = false;
    }
}
