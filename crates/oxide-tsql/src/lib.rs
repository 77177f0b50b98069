//! File and stdin plumbing for the `oxide-tsql` command.
//!
//! Each subcommand is a function from script text to output text so it can
//! be tested without spawning the binary:
//!
//! - [`convert_view`] rewrites a `CREATE VIEW` script.
//! - [`convert_batch`] rewrites a procedure body or plain batch and prefixes
//!   the `DECLARE` section for the variables it found.
//! - [`split_script`] shows how the boundary scanner cuts a script.
//! - [`extract_alters`] lists the `ALTER TABLE` statements it recognizes as
//!   JSON.

use std::io::Read;
use std::path::{Path, PathBuf};

use oxide_tsql_core::boundary::first_complete_statement;
use oxide_tsql_core::dialect::POSTGRES;
use oxide_tsql_core::generator::{AlterTable, BatchScriptGenerator, ViewScriptGenerator};
use oxide_tsql_core::lexer::{
    join_text, next_significant, Keyword, LexError, StatementLexer, TsqlLexer,
};
use tracing::{debug, info};

/// Errors reported by the command-line front end.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Reading the input script failed.
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// The file being read, `-` for stdin.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The input script is not lexically valid T-SQL.
    #[error("Input is not valid T-SQL: {0}")]
    Lex(#[from] LexError),

    /// Extractions could not be written as JSON.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for the command-line front end.
pub type Result<T> = std::result::Result<T, CliError>;

/// Line printed before every slice by [`split_script`].
pub const SPLIT_MARKER: &str = "-- ---- statement";

/// Reads the script at `path`, or stdin when `path` is `None`.
///
/// # Errors
///
/// Returns [`CliError::Io`] if the input cannot be read.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|source| CliError::Io {
                    path: PathBuf::from("-"),
                    source,
                })?;
            Ok(buffer)
        }
    }
}

/// Converts a `CREATE VIEW` script.
///
/// # Errors
///
/// Returns [`CliError::Lex`] if the script does not lex.
pub fn convert_view(sql: &str) -> Result<String> {
    let converted = ViewScriptGenerator::new().generate_sql(sql)?;
    info!("Converted view script");
    Ok(converted)
}

/// Converts a procedure-style batch. The `DECLARE` section for the
/// variables found comes first.
///
/// # Errors
///
/// Returns [`CliError::Lex`] if the script does not lex.
pub fn convert_batch(sql: &str) -> Result<String> {
    let mut generator = BatchScriptGenerator::new();
    let body = generator.generate_sql(sql)?;
    info!(variables = generator.declares().len(), "Converted batch");
    let mut out = generator.declare_section();
    out.push_str(&body);
    Ok(out)
}

/// Prints every slice of the boundary scanner, each after a marker line
/// carrying its number.
///
/// # Errors
///
/// Returns [`CliError::Lex`] if the script does not lex.
pub fn split_script(sql: &str) -> Result<String> {
    let lexer = TsqlLexer::new();
    let tokens = lexer.lex(sql)?;
    let mut out = String::new();
    let mut idx = 0;
    let mut number = 0;
    while idx < tokens.len() {
        let piece = first_complete_statement(&lexer, &tokens, &mut idx);
        number += 1;
        out.push_str(&format!("{SPLIT_MARKER} {number} ----\n"));
        out.push_str(&join_text(piece));
        out.push('\n');
    }
    info!(statements = number, "Split script");
    Ok(out)
}

/// Extracts every recognized `ALTER TABLE` statement as a JSON array.
/// Statements of other shapes are skipped.
///
/// # Errors
///
/// Returns [`CliError::Lex`] if the script does not lex, or
/// [`CliError::Json`] if serialization fails.
pub fn extract_alters(sql: &str) -> Result<String> {
    let lexer = TsqlLexer::new();
    let tokens = lexer.lex(sql)?;
    let mut extracted = Vec::new();
    let mut idx = 0;
    while idx < tokens.len() {
        let piece = first_complete_statement(&lexer, &tokens, &mut idx);
        let head = next_significant(piece, 0);
        if !piece.get(head).is_some_and(|t| t.is(Keyword::Alter)) {
            continue;
        }
        match AlterTable::extract_statement(&piece[head..], &POSTGRES) {
            Some(alter) => extracted.push(alter),
            None => debug!(statement = %join_text(&piece[head..]), "Unrecognized ALTER"),
        }
    }
    info!(count = extracted.len(), "Extracted ALTER TABLE statements");
    Ok(serde_json::to_string_pretty(&extracted)?)
}
