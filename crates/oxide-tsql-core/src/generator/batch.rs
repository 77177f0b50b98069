//! Procedure-style batches: the statements between `AS` and the end of a
//! procedure body, or a plain script.

use tracing::{debug, trace};

use crate::boundary::{find_block, first_complete_statement, if_condition, if_statement};
use crate::dialect::{TargetDialect, POSTGRES};
use crate::lexer::{
    join_text, next_significant, peek_significant, Keyword, LexError, StatementLexer, Token,
    TokenKind, TsqlLexer,
};
use crate::matcher::{MatchStep, SequenceMatcher};
use crate::rewrite::{concat_strings, rewrite_expression, rewrite_query, variable_name};

use super::alter::AlterTable;
use super::is_terminator;
use super::declare::{declarations_at, DeclareItem};
use super::exec::{exec_string_literal, exec_variable};

/// Keywords opening and closing the PL/pgSQL form of a conditional.
struct Conditional {
    keyword: &'static str,
    open: &'static str,
    close: &'static str,
}

const IF: Conditional = Conditional {
    keyword: "IF",
    open: "THEN",
    close: "END IF;",
};

const WHILE: Conditional = Conditional {
    keyword: "WHILE",
    open: "LOOP",
    close: "END LOOP;",
};

/// Converts T-SQL batches to PL/pgSQL statement text.
///
/// Variables declared along the way are collected; render them with
/// [`declare_section`](Self::declare_section).
pub struct BatchScriptGenerator<'d, L = TsqlLexer> {
    lexer: L,
    dialect: &'d dyn TargetDialect,
    declares: Vec<DeclareItem>,
}

impl BatchScriptGenerator<'static, TsqlLexer> {
    /// Creates a generator targeting PostgreSQL with the default lexer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_parts(TsqlLexer::new(), &POSTGRES)
    }
}

impl Default for BatchScriptGenerator<'static, TsqlLexer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'d, L: StatementLexer> BatchScriptGenerator<'d, L> {
    /// Creates a generator from a lexer and a target dialect.
    #[must_use]
    pub fn with_parts(lexer: L, dialect: &'d dyn TargetDialect) -> Self {
        Self {
            lexer,
            dialect,
            declares: Vec::new(),
        }
    }

    /// Variables declared by the batches converted so far.
    #[must_use]
    pub fn declares(&self) -> &[DeclareItem] {
        &self.declares
    }

    /// `DECLARE` section listing the collected variables, or an empty
    /// string when there are none.
    #[must_use]
    pub fn declare_section(&self) -> String {
        if self.declares.is_empty() {
            return String::new();
        }
        let mut out = String::from("DECLARE\n");
        for item in &self.declares {
            out.push_str("    ");
            out.push_str(&item.name);
            out.push(' ');
            out.push_str(&item.type_text);
            out.push_str(";\n");
        }
        out
    }

    /// Lexes and converts `sql`.
    ///
    /// # Errors
    ///
    /// Returns the lexer's error if `sql` is not lexically valid.
    pub fn generate_sql(&mut self, sql: &str) -> Result<String, LexError> {
        let tokens = self.lexer.lex(sql)?;
        Ok(self.generate(&tokens))
    }

    /// Converts every statement of `tokens`.
    pub fn generate(&mut self, tokens: &[Token]) -> String {
        let mut out = String::new();
        let mut idx = 0;
        while idx < tokens.len() {
            let statement = first_complete_statement(&self.lexer, tokens, &mut idx);
            let head = next_significant(statement, 0);
            out.push_str(&join_text(&statement[..head]));
            let body = &statement[head..];
            let Some(first) = body.first() else {
                continue;
            };
            trace!(kind = ?first.kind, "batch statement");

            let converted = match first.as_keyword() {
                Some(Keyword::Alter) => self.alter(body),
                Some(Keyword::Exec | Keyword::Execute) => self.exec(body),
                Some(Keyword::Declare) => self.declare(body),
                Some(Keyword::Set) => Self::set(body),
                Some(Keyword::If) => self.conditional(body, &IF),
                Some(Keyword::While) => self.conditional(body, &WHILE),
                Some(Keyword::Begin) if !is_transaction(body) => self.block(body),
                Some(Keyword::Go) => String::new(),
                _ => rewrite_query(body),
            };
            out.push_str(&converted);
        }
        out
    }

    /// A recognized `ALTER TABLE` is emitted from its extraction. Anything
    /// the extractor did not consume keeps the whole statement as written.
    fn alter(&self, body: &[Token]) -> String {
        if let Some(alter) = AlterTable::extract_statement(body, self.dialect) {
            return alter.to_sql();
        }
        debug!(statement = %join_text(body), "ALTER not fully recognized, copying it");
        rewrite_expression(body)
    }

    /// `EXEC(@v)` runs the variable, `EXEC('...')` runs the converted SQL in
    /// a dollar-quoted string.
    fn exec(&mut self, body: &[Token]) -> String {
        if let Some(variable) = exec_variable(body) {
            return format!("EXECUTE {};", variable_name(&variable));
        }
        let Some(sql) = exec_string_literal(body) else {
            return rewrite_expression(body);
        };
        let converted = match self.lexer.lex(&sql) {
            Ok(tokens) => self.generate(&tokens),
            Err(err) => {
                debug!(%err, "EXEC string does not lex, keeping it as is");
                sql
            }
        };
        let mut statement = format!("EXECUTE $exec${}$exec$", converted.trim());
        statement.push(';');
        statement
    }

    /// Records the declared variables and turns initializers into
    /// assignments.
    fn declare(&mut self, body: &[Token]) -> String {
        let (declarations, end) = declarations_at(body, 0, self.dialect);
        if declarations.is_empty() {
            return join_text(body);
        }
        let assignments: Vec<String> = declarations
            .iter()
            .filter_map(|d| {
                d.value
                    .as_ref()
                    .map(|value| format!("{} := {};", d.item.name, value))
            })
            .collect();
        self.declares
            .extend(declarations.into_iter().map(|d| d.item));

        let rest = &body[end.min(body.len())..];
        let mut out = assignments.join("\n");
        if !is_terminator(rest) {
            out.push_str(&rewrite_expression(rest));
        }
        out
    }

    /// `SET @x = e` becomes `x := e;`, with string `+` turned into
    /// `CONCAT`. Other `SET` options are copied.
    fn set(body: &[Token]) -> String {
        let steps = [
            MatchStep::keyword(Keyword::Set),
            MatchStep::kind(TokenKind::Variable).raw(),
            MatchStep::kind(TokenKind::Eq),
        ];
        let result = SequenceMatcher::new(&steps).run(body, 0);
        let Some(variable) = result.values.first().filter(|_| result.matched) else {
            return rewrite_expression(body);
        };
        let mut value = &body[result.stop_index..];
        while let Some((last, rest)) = value.split_last() {
            if last.kind != TokenKind::Whitespace && last.kind != TokenKind::Semicolon {
                break;
            }
            value = rest;
        }
        let value = concat_strings(value).unwrap_or_else(|| rewrite_expression(value));
        format!("{} := {};", variable_name(variable), value.trim())
    }

    fn conditional(&mut self, body: &[Token], form: &Conditional) -> String {
        let mut end = 0;
        let statement = if_statement(body, &mut end);
        let mut body_start = 0;
        let condition = if_condition(statement, &mut body_start);
        let condition = rewrite_expression(condition.get(1..).unwrap_or_default());

        let mut out = format!(
            "{} {} {}\n{}",
            form.keyword,
            condition.trim(),
            form.open,
            self.branch(&statement[body_start..])
        );

        let rest = &body[end..];
        let else_at = next_significant(rest, 0);
        if rest.get(else_at).is_some_and(|t| t.is(Keyword::Else)) {
            out.push_str("\nELSE\n");
            out.push_str(&self.branch(&rest[else_at + 1..]));
        } else if !is_terminator(rest) {
            out.push_str(&self.generate(rest));
        }
        out.push('\n');
        out.push_str(form.close);
        out
    }

    /// Converts the body of a branch, unwrapping a `BEGIN ... END` block.
    fn branch(&mut self, tokens: &[Token]) -> String {
        let head = next_significant(tokens, 0);
        let converted = if tokens.get(head).is_some_and(|t| t.is(Keyword::Begin)) {
            let mut end = head;
            match find_block(tokens, &mut end) {
                Some(inner) => self.generate(inner),
                None => unterminated(tokens),
            }
        } else {
            self.generate(tokens)
        };
        converted.trim().to_string()
    }

    fn block(&mut self, body: &[Token]) -> String {
        let mut end = 0;
        let Some(inner) = find_block(body, &mut end) else {
            return unterminated(body);
        };
        let mut out = String::from("BEGIN");
        out.push_str(self.generate(inner).trim_end());
        out.push_str("\nEND;");
        let rest = &body[end.min(body.len())..];
        if !is_terminator(rest) {
            out.push_str(&self.generate(rest));
        }
        out
    }
}

/// A `BEGIN` without its `END` is copied with expression rewrites only.
fn unterminated(tokens: &[Token]) -> String {
    debug!("BEGIN without END, copying the block");
    rewrite_expression(tokens)
}

fn is_transaction(body: &[Token]) -> bool {
    peek_significant(body, 1)
        .and_then(Token::as_keyword)
        .is_some_and(|kw| matches!(kw, Keyword::Transaction | Keyword::Tran))
}
