//! T-SQL tokenizer implementation.

use super::{Keyword, Span, Token, TokenKind};

/// A lossless lexer for T-SQL scripts.
///
/// Every byte of the input ends up in exactly one token, white space and
/// comments included, so concatenating the text of all tokens reproduces the
/// input. Malformed input produces [`TokenKind::Error`] tokens instead of
/// aborting.
pub struct Lexer<'a> {
    /// The input source code.
    input: &'a str,
    /// The current byte position.
    pos: usize,
    /// The byte position of the start of the current token.
    start: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
        }
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Returns the next character without advancing.
    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Advances to the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Advances while `pred` holds for the current character.
    fn advance_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.advance();
        }
    }

    /// Creates a token spanning from the token start to the current position.
    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(
            kind,
            &self.input[self.start..self.pos],
            Span::new(self.start, self.pos),
        )
    }

    /// Scans a line break (`\n`, `\r\n` or a lone `\r`).
    fn scan_newline(&mut self, first: char) -> Token {
        if first == '\r' && self.peek() == Some('\n') {
            self.advance();
        }
        self.make_token(TokenKind::Whitespace)
    }

    /// Scans a run of horizontal white space.
    fn scan_blank(&mut self) -> Token {
        self.advance_while(|c| c.is_whitespace() && c != '\n' && c != '\r');
        self.make_token(TokenKind::Whitespace)
    }

    /// Scans a `--` comment up to, not including, the line break.
    fn scan_line_comment(&mut self) -> Token {
        self.advance_while(|c| c != '\n' && c != '\r');
        self.make_token(TokenKind::SingleLineComment)
    }

    /// Scans a `/* */` comment. T-SQL block comments nest.
    fn scan_block_comment(&mut self) -> Token {
        self.advance(); // *
        let mut depth = 1usize;
        while depth > 0 {
            match self.advance() {
                Some('/') if self.peek() == Some('*') => {
                    self.advance();
                    depth += 1;
                }
                Some('*') if self.peek() == Some('/') => {
                    self.advance();
                    depth -= 1;
                }
                Some(_) => {}
                None => return self.make_token(TokenKind::Error),
            }
        }
        self.make_token(TokenKind::MultilineComment)
    }

    /// Scans text delimited by `close`, where a doubled `close` is an escape.
    /// The opening delimiter has already been consumed.
    fn scan_delimited(&mut self, close: char, kind: TokenKind) -> Token {
        loop {
            match self.advance() {
                Some(c) if c == close => {
                    if self.peek() == Some(close) {
                        self.advance();
                    } else {
                        return self.make_token(kind);
                    }
                }
                Some(_) => {}
                None => return self.make_token(TokenKind::Error),
            }
        }
    }

    /// Returns true for characters allowed after the first one of an
    /// identifier or variable name.
    fn is_name_char(c: char) -> bool {
        c.is_alphanumeric() || matches!(c, '_' | '@' | '#' | '$')
    }

    /// Scans an identifier or keyword.
    fn scan_identifier(&mut self) -> Token {
        self.advance_while(Self::is_name_char);
        let text = &self.input[self.start..self.pos];
        match Keyword::from_str(text) {
            Some(keyword) => self.make_token(TokenKind::Keyword(keyword)),
            None => self.make_token(TokenKind::Identifier),
        }
    }

    /// Scans a number. The first digit (or the leading dot) is consumed.
    fn scan_number(&mut self, first: char) -> Token {
        if first == '0' && matches!(self.peek(), Some('x' | 'X')) {
            self.advance();
            self.advance_while(|c| c.is_ascii_hexdigit());
            return self.make_token(TokenKind::Binary);
        }

        let mut kind = if first == '.' {
            TokenKind::Numeric
        } else {
            TokenKind::Integer
        };
        self.advance_while(|c| c.is_ascii_digit());

        if kind == TokenKind::Integer && self.peek() == Some('.') {
            kind = TokenKind::Numeric;
            self.advance();
            self.advance_while(|c| c.is_ascii_digit());
        }

        if matches!(self.peek(), Some('e' | 'E'))
            && self
                .peek_next()
                .is_some_and(|c| c.is_ascii_digit() || c == '+' || c == '-')
        {
            kind = TokenKind::Numeric;
            self.advance();
            if matches!(self.peek(), Some('+' | '-')) {
                self.advance();
            }
            self.advance_while(|c| c.is_ascii_digit());
        }

        self.make_token(kind)
    }

    /// Scans the next token, or returns `None` at the end of input.
    pub fn next_token(&mut self) -> Option<Token> {
        self.start = self.pos;
        let c = self.advance()?;

        let token = match c {
            '\n' | '\r' => self.scan_newline(c),
            c if c.is_whitespace() => self.scan_blank(),

            '-' if self.peek() == Some('-') => self.scan_line_comment(),
            '/' if self.peek() == Some('*') => self.scan_block_comment(),

            '(' => self.make_token(TokenKind::LeftParen),
            ')' => self.make_token(TokenKind::RightParen),
            ',' => self.make_token(TokenKind::Comma),
            ';' => self.make_token(TokenKind::Semicolon),
            '+' => self.make_token(TokenKind::Plus),
            '-' => self.make_token(TokenKind::Minus),
            '*' => self.make_token(TokenKind::Star),
            '/' => self.make_token(TokenKind::Slash),
            '%' => self.make_token(TokenKind::Percent),
            '&' => self.make_token(TokenKind::BitAnd),
            '|' => self.make_token(TokenKind::BitOr),
            '^' => self.make_token(TokenKind::BitXor),
            '~' => self.make_token(TokenKind::BitNot),
            '=' => self.make_token(TokenKind::Eq),
            ':' => {
                if self.peek() == Some(':') {
                    self.advance();
                    self.make_token(TokenKind::DoubleColon)
                } else {
                    self.make_token(TokenKind::Colon)
                }
            }
            '<' => match self.peek() {
                Some('=') => {
                    self.advance();
                    self.make_token(TokenKind::LtEq)
                }
                Some('>') => {
                    self.advance();
                    self.make_token(TokenKind::NotEq)
                }
                _ => self.make_token(TokenKind::Lt),
            },
            '>' => {
                if self.peek() == Some('=') {
                    self.advance();
                    self.make_token(TokenKind::GtEq)
                } else {
                    self.make_token(TokenKind::Gt)
                }
            }
            '!' => match self.peek() {
                Some('=') => {
                    self.advance();
                    self.make_token(TokenKind::NotEq)
                }
                Some('<' | '>') => {
                    self.advance();
                    self.make_token(TokenKind::NotCompare)
                }
                _ => self.make_token(TokenKind::Error),
            },

            '\'' => self.scan_delimited('\'', TokenKind::StringLiteral),
            'N' | 'n' if self.peek() == Some('\'') => {
                self.advance();
                self.scan_delimited('\'', TokenKind::UnicodeStringLiteral)
            }
            '[' => self.scan_delimited(']', TokenKind::QuotedIdentifier),
            '"' => self.scan_delimited('"', TokenKind::AsciiStringOrQuotedIdentifier),

            '@' => {
                self.advance_while(Self::is_name_char);
                self.make_token(TokenKind::Variable)
            }
            '$' if self.peek().is_some_and(|c| c.is_ascii_digit()) => {
                self.advance_while(|c| c.is_ascii_digit() || c == '.');
                self.make_token(TokenKind::Money)
            }
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => self.scan_number('.'),
            '.' => self.make_token(TokenKind::Dot),

            c if c.is_ascii_digit() => self.scan_number(c),
            c if c.is_alphabetic() || c == '_' || c == '#' => self.scan_identifier(),

            _ => self.make_token(TokenKind::Error),
        };
        Some(token)
    }

    /// Tokenizes the entire input and returns all tokens.
    #[must_use]
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }
}
