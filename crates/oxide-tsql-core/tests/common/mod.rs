#![allow(dead_code)]

use oxide_tsql_core::boundary::first_complete_statement;
use oxide_tsql_core::lexer::{
    join_text, next_significant, tokenize, LexError, Lexer, Span, StatementBounds,
    StatementLexer, Token,
};

/// Scripts mixing the statement shapes seen in real SQL Server exports.
pub const SCRIPTS: &[&str] = &[
    "",
    "   \n\t",
    "SELECT 1",
    "-- header comment\n/* block */\nCREATE VIEW [dbo].[V_All] AS\nSELECT a, b AS x FROM t\nUNION ALL\nSELECT c, d FROM t2\nGO\n",
    "CREATE PROCEDURE dbo.p_Test @id int AS\nBEGIN\n  SET NOCOUNT ON;\n  DECLARE @n int = 0\n  IF @id > 0\n  BEGIN\n    SET @n = @n + 1\n  END\n  ELSE SET @n = 2;\n  SELECT CONVERT(varchar(10), @n)\nEND\nGO",
    "ALTER TABLE Foo ADD Bar int NOT NULL, Baz varchar(10) NULL;\nALTER TABLE [Foo] DROP CONSTRAINT [PK_Foo]\n",
    "SELECT 'unterminated",
    "select (select max(x) from t) as m, 'it''s' from [a b] union select 1, N'x' -- tail",
    "BEGIN TRAN\nUPDATE t SET a = 1 WHERE b IN (1, 2);\nCOMMIT TRAN\n\n",
];

pub fn tokens(sql: &str) -> Vec<Token> {
    tokenize(sql)
}

/// Lower-cased words of `text`, with `@` and brackets dropped.
pub fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Asserts that every word of `input` shows up in `output`, in order.
pub fn assert_keeps_words(input: &str, output: &str) {
    let produced = words(output);
    let mut remaining = produced.iter();
    for word in words(input) {
        assert!(
            remaining.any(|w| *w == word),
            "{word:?} of {input:?} is missing from {output:?}"
        );
    }
}

/// Texts of every slice the boundary scanner returns for `sql`.
pub fn pieces_with<L: StatementLexer + ?Sized>(lexer: &L, sql: &str) -> Vec<String> {
    let tokens = tokenize(sql);
    let mut idx = 0;
    let mut pieces = Vec::new();
    while idx < tokens.len() {
        let before = idx;
        let piece = first_complete_statement(lexer, &tokens, &mut idx);
        assert!(idx > before, "scanner did not advance on {sql:?}");
        pieces.push(join_text(piece));
    }
    pieces
}

/// Lexes with the real tokenizer but reports a fixed-size first statement,
/// starting at the first significant token.
#[derive(Debug, Clone, Copy)]
pub struct FakeLexer {
    pub statement_tokens: usize,
}

impl StatementLexer for FakeLexer {
    fn lex(&self, text: &str) -> Result<Vec<Token>, LexError> {
        Ok(Lexer::new(text).tokenize())
    }

    fn statement_bounds(&self, tokens: &[Token]) -> Vec<StatementBounds> {
        let start = next_significant(tokens, 0);
        if start >= tokens.len() {
            return Vec::new();
        }
        let end = (start + self.statement_tokens).min(tokens.len());
        vec![StatementBounds::new(start, end)]
    }
}

/// A lexer that rejects every input.
#[derive(Debug, Clone, Copy)]
pub struct FailingLexer;

impl StatementLexer for FailingLexer {
    fn lex(&self, text: &str) -> Result<Vec<Token>, LexError> {
        Err(LexError::UnterminatedComment(Span::new(0, text.len())))
    }

    fn statement_bounds(&self, _tokens: &[Token]) -> Vec<StatementBounds> {
        Vec::new()
    }
}
