//! T-SQL lexer.
//!
//! A hand-written, lossless lexer producing the token model every other
//! module works on, plus the statement splitter the boundary scanner uses
//! when it re-lexes a fragment of a script.

mod error;
mod span;
mod statement;
mod token;
mod tokenizer;

pub use error::LexError;
pub use span::Span;
pub use statement::{split_statements, StatementBounds, StatementLexer, TsqlLexer};
pub use token::{join_text, Keyword, Token, TokenKind, IDENTIFIER_KINDS};
pub use tokenizer::Lexer;

/// Tokenizes `input` with the default lexer.
#[must_use]
pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).tokenize()
}

/// Returns the index of the first non-trivia token at or after `from`, or
/// `tokens.len()` if there is none.
#[must_use]
pub fn next_significant(tokens: &[Token], from: usize) -> usize {
    let mut i = from;
    while i < tokens.len() && tokens[i].is_trivia() {
        i += 1;
    }
    i
}

/// Returns the first non-trivia token at or after `from`.
#[must_use]
pub fn peek_significant(tokens: &[Token], from: usize) -> Option<&Token> {
    tokens.get(next_significant(tokens, from))
}
