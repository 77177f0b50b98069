//! Errors reported when a script cannot be lexed cleanly.

use super::{Span, Token, TokenKind};

/// A lexing failure, located by its byte span in the lexed text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    /// A string literal is missing its closing quote.
    #[error("Unterminated string literal at {}..{}", .0.start, .0.end)]
    UnterminatedString(Span),

    /// A bracket or double-quoted identifier is missing its closing delimiter.
    #[error("Unterminated quoted identifier at {}..{}", .0.start, .0.end)]
    UnterminatedIdentifier(Span),

    /// A block comment is missing its closing `*/`.
    #[error("Unterminated block comment at {}..{}", .0.start, .0.end)]
    UnterminatedComment(Span),

    /// A character that starts no T-SQL token.
    #[error("Unexpected character '{found}' at {}..{}", .span.start, .span.end)]
    UnexpectedCharacter {
        /// The offending character.
        found: char,
        /// Where it was found.
        span: Span,
    },
}

impl LexError {
    /// Classifies an error token produced by the tokenizer.
    #[must_use]
    pub fn from_token(token: &Token) -> Self {
        let span = token.span;
        let text = token.text.as_str();
        if text.starts_with('\'') || text.starts_with("N'") || text.starts_with("n'") {
            Self::UnterminatedString(span)
        } else if text.starts_with('[') || text.starts_with('"') {
            Self::UnterminatedIdentifier(span)
        } else if text.starts_with("/*") {
            Self::UnterminatedComment(span)
        } else {
            Self::UnexpectedCharacter {
                found: text.chars().next().unwrap_or_default(),
                span,
            }
        }
    }

    /// Returns the first error among `tokens`, if any.
    #[must_use]
    pub fn first_in(tokens: &[Token]) -> Option<Self> {
        tokens
            .iter()
            .find(|t| t.kind == TokenKind::Error)
            .map(Self::from_token)
    }

    /// Returns the location of the error.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::UnterminatedString(span)
            | Self::UnterminatedIdentifier(span)
            | Self::UnterminatedComment(span)
            | Self::UnexpectedCharacter { span, .. } => *span,
        }
    }
}
