//! Whole `CREATE VIEW` scripts.

use tracing::{debug, trace};

use crate::boundary::{create_statement, find_block, first_complete_statement};
use crate::lexer::{
    join_text, next_significant, Keyword, LexError, StatementLexer, Token, TokenKind, TsqlLexer,
};
use crate::rewrite::{is_dbo_qualifier, render_identifier, rewrite_expression};

use super::ViewSelectGenerator;

/// Removes a `;` that ends `out`, ignoring trailing white space.
pub(crate) fn remove_trailing_semicolon(out: &mut String) {
    let kept = out.trim_end().len();
    if out[..kept].ends_with(';') {
        out.remove(kept - 1);
    }
}

/// `CREATE OR REPLACE` header with normalized identifiers.
fn create_or_replace(header: &[Token]) -> String {
    let mut out = String::from("CREATE OR REPLACE");
    let mut i = next_significant(header, 0) + 1;
    while i < header.len() {
        let token = &header[i];
        if is_dbo_qualifier(header, i) {
            i += 2;
            continue;
        }
        if token.kind.is_identifier() {
            out.push_str(&render_identifier(&token.text));
        } else {
            out.push_str(&token.text);
        }
        i += 1;
    }
    out
}

/// Converts a view script statement by statement.
///
/// The header becomes `CREATE OR REPLACE VIEW`, the SELECT arms go through
/// [`ViewSelectGenerator`] and everything else is copied.
#[derive(Debug, Default)]
pub struct ViewScriptGenerator<L = TsqlLexer> {
    lexer: L,
    select: ViewSelectGenerator,
}

impl ViewScriptGenerator<TsqlLexer> {
    /// Creates a generator using the default lexer.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_lexer(TsqlLexer::new())
    }
}

impl<L: StatementLexer> ViewScriptGenerator<L> {
    /// Creates a generator re-lexing statements with `lexer`.
    #[must_use]
    pub const fn with_lexer(lexer: L) -> Self {
        Self {
            lexer,
            select: ViewSelectGenerator::new(),
        }
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

    /// Converts one view script.
    pub fn generate(&mut self, tokens: &[Token]) -> String {
        self.select.reset();
        self.generate_statements(tokens)
    }

    fn generate_statements(&mut self, tokens: &[Token]) -> String {
        let mut out = String::new();
        let mut idx = 0;
        while idx < tokens.len() {
            let statement = first_complete_statement(&self.lexer, tokens, &mut idx);
            let head = next_significant(statement, 0);
            let Some(first) = statement.get(head) else {
                out.push_str(&join_text(statement));
                continue;
            };
            trace!(kind = ?first.kind, "view statement");

            match first.kind {
                TokenKind::Keyword(Keyword::Create) => {
                    let mut end = head;
                    let header = create_statement(statement, &mut end);
                    out.push_str(&join_text(&statement[..head]));
                    if header.is_empty() {
                        out.push_str(&join_text(&statement[head..]));
                    } else {
                        self.select.reset();
                        out.push_str(&create_or_replace(header));
                        out.push_str(&join_text(&statement[end..]));
                    }
                }
                TokenKind::Keyword(Keyword::Union) => {
                    remove_trailing_semicolon(&mut out);
                    out.push_str(&join_text(statement));
                }
                TokenKind::Keyword(Keyword::Select) => {
                    out.push_str(&self.select.generate(statement));
                }
                TokenKind::LeftParen => {
                    let mut end = head;
                    out.push_str(&join_text(&statement[..head]));
                    if let Some(inner) = find_block(statement, &mut end) {
                        out.push('(');
                        out.push_str(&self.generate_statements(inner));
                        out.push(')');
                        out.push_str(&join_text(&statement[end..]));
                    } else {
                        debug!("unbalanced parentheses, copying the statement");
                        out.push_str(&rewrite_expression(&statement[head..]));
                    }
                }
                _ => {
                    out.push_str(&join_text(&statement[..head]));
                    out.push_str(&rewrite_expression(&statement[head..]));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_trailing_semicolon() {
        let mut out = String::from("SELECT 1;  \n");
        remove_trailing_semicolon(&mut out);
        assert_eq!(out, "SELECT 1  \n");

        let mut out = String::from("SELECT 1\n");
        remove_trailing_semicolon(&mut out);
        assert_eq!(out, "SELECT 1\n");
    }

    #[test]
    fn test_union_view() {
        let sql = "CREATE VIEW [dbo].[V_All] AS\nSELECT a, b AS x FROM t;\nUNION ALL\nSELECT c, d FROM t2\n";
        let out = ViewScriptGenerator::new().generate_sql(sql).unwrap();
        assert_eq!(
            out,
            "CREATE OR REPLACE VIEW v_all AS\nSELECT a, b AS x FROM t\nUNION ALL\nSELECT c AS a, d AS x FROM t2\n"
        );
    }

    #[test]
    fn test_parenthesized_body() {
        let sql = "CREATE view v_status\nas\n(\n select 'a' as [status]\n UNION SELECT 'b'\n)";
        let out = ViewScriptGenerator::new().generate_sql(sql).unwrap();
        assert_eq!(
            out,
            "CREATE OR REPLACE view v_status\nas\n(\n select 'a' as status\n UNION SELECT 'b' AS status\n)"
        );
    }

    #[test]
    fn test_assignment_columns() {
        let sql = "CREATE   view [dbo].[v_hotel]  as\nselect a.grpid ,servername = b.name ,createDate\nfrom  hotel a left join serverList b on a.serverid = b.id";
        let out = ViewScriptGenerator::new().generate_sql(sql).unwrap();
        assert_eq!(
            out,
            "CREATE OR REPLACE   view v_hotel  as\nselect a.grpid ,b.name AS servername ,createdate\nfrom  hotel a left join serverlist b on a.serverid = b.id"
        );
    }

    #[test]
    fn test_each_view_starts_fresh() {
        let mut generator = ViewScriptGenerator::new();
        generator
            .generate_sql("CREATE VIEW v1 AS SELECT a FROM t")
            .unwrap();
        let out = generator
            .generate_sql("CREATE VIEW v2 AS SELECT b FROM t UNION SELECT c FROM u")
            .unwrap();
        assert_eq!(
            out,
            "CREATE OR REPLACE VIEW v2 AS SELECT b FROM t UNION SELECT c AS b FROM u"
        );
    }

    #[test]
    fn test_unterminated_parenthesis_is_copied() {
        let out = ViewScriptGenerator::new()
            .generate_sql("CREATE VIEW v AS\n(\nSELECT a FROM [dbo].[T]")
            .unwrap();
        assert_eq!(out, "CREATE OR REPLACE VIEW v AS\n(\nSELECT a FROM t");
    }

    #[test]
    fn test_lex_error_is_reported() {
        assert!(ViewScriptGenerator::new()
            .generate_sql("CREATE VIEW v AS SELECT 'x")
            .is_err());
    }
}
