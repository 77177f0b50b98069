//! Statement generators.
//!
//! Generators consume the slices produced by the boundary scanner and emit
//! PostgreSQL text or structured extractions:
//!
//! - [`ViewSelectGenerator`] aliases the SELECT arms of a view body.
//! - [`ViewScriptGenerator`] drives a whole `CREATE VIEW` script.
//! - [`AlterTable`] and the `match_*` functions extract `ALTER TABLE`
//!   clauses; the `*_sql` functions emit them.
//! - [`exec_string_literal`] and [`exec_variable`] read `EXEC(...)`.
//! - [`extract_declares`] lists declared variables.
//! - [`BatchScriptGenerator`] drives procedure-style batches.

mod alter;
mod batch;
mod declare;
mod exec;
mod view;
mod view_script;

pub use alter::{
    add_columns_sql, add_primary_key_sql, alter_column_sql, drop_constraint_sql,
    match_add_columns, match_add_primary_key, match_alter_column, match_drop_constraint,
    AddColumns, AddPrimaryKey, AlterColumn, AlterTable, DropConstraint,
};
pub use batch::BatchScriptGenerator;
pub use declare::{extract_declares, DeclareItem};
pub use exec::{exec_string_literal, exec_variable};
pub use view::ViewSelectGenerator;
pub use view_script::ViewScriptGenerator;

use crate::lexer::{Token, TokenKind};

/// True when `tokens` holds nothing but trivia and semicolons.
pub(crate) fn is_terminator(tokens: &[Token]) -> bool {
    tokens
        .iter()
        .all(|t| t.is_trivia() || t.kind == TokenKind::Semicolon)
}
