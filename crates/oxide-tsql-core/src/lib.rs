//! # oxide-tsql-core
//!
//! Token-level rewrite engine for migrating T-SQL scripts to PostgreSQL.
//!
//! This crate provides:
//! - A lossless T-SQL lexer and a heuristic statement splitter
//! - A token-sequence matcher with typed captures and repeating tails
//! - Statement boundary scanners that carve one statement at a time out of
//!   a script without ever dropping text
//! - Rewriters for `CONVERT`, `DATEADD`, identifiers and variables, plus
//!   query rewrites for `TOP`, lock hints, `SELECT ... INTO` and string
//!   concatenation
//! - Generators for view bodies, `ALTER TABLE`, `EXEC` and procedure batches
//!
//! ## Converting a view
//!
//! ```rust
//! use oxide_tsql_core::generator::ViewScriptGenerator;
//!
//! let sql = "CREATE VIEW dbo.v AS\nSELECT a, b AS x FROM t\nUNION\nSELECT c, d FROM t2";
//! let converted = ViewScriptGenerator::new().generate_sql(sql).unwrap();
//! assert_eq!(
//!     converted,
//!     "CREATE OR REPLACE VIEW v AS\nSELECT a, b AS x FROM t\nUNION\nSELECT c AS a, d AS x FROM t2"
//! );
//! ```
//!
//! ## Walking statements
//!
//! ```rust
//! use oxide_tsql_core::boundary::first_complete_statement;
//! use oxide_tsql_core::lexer::{join_text, tokenize, TsqlLexer};
//!
//! let tokens = tokenize("DECLARE @a int\nSET @a = 1");
//! let lexer = TsqlLexer::new();
//! let mut idx = 0;
//! let first = first_complete_statement(&lexer, &tokens, &mut idx);
//! assert_eq!(join_text(first), "DECLARE @a int");
//! let second = first_complete_statement(&lexer, &tokens, &mut idx);
//! assert_eq!(join_text(second), "\nSET @a = 1");
//! ```

pub mod boundary;
pub mod dialect;
pub mod generator;
pub mod lexer;
pub mod matcher;
pub mod rewrite;

pub use boundary::first_complete_statement;
pub use dialect::{PostgresDialect, TargetDialect};
pub use generator::{BatchScriptGenerator, ViewScriptGenerator, ViewSelectGenerator};
pub use lexer::{LexError, Lexer, StatementLexer, Token, TokenKind, TsqlLexer};
pub use matcher::{SequenceMatchResult, SequenceMatcher};
pub use rewrite::{convert_to_cast, normalize_identifier, rewrite_query};
