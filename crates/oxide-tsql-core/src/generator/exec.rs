//! `EXEC(...)` extraction.

use crate::lexer::{Keyword, Token, TokenKind};
use crate::matcher::{Capture, MatchStep, SequenceMatcher};

fn exec_argument(tokens: &[Token], argument: MatchStep) -> Option<String> {
    let steps = [
        MatchStep::any_keyword(&[Keyword::Exec, Keyword::Execute]),
        MatchStep::kind(TokenKind::LeftParen),
        argument,
        MatchStep::kind(TokenKind::RightParen),
    ];
    let result = SequenceMatcher::new(&steps).run(tokens, 0);
    if result.matched {
        result.values.into_iter().next()
    } else {
        None
    }
}

/// Returns the SQL held by `EXEC('...')`: the `N` prefix and outer quotes
/// are removed, then doubled quotes are unescaped.
#[must_use]
pub fn exec_string_literal(tokens: &[Token]) -> Option<String> {
    let literal = exec_argument(
        tokens,
        MatchStep::new(
            [TokenKind::StringLiteral, TokenKind::UnicodeStringLiteral],
            Capture::RawValue,
        ),
    )?;
    let body = literal
        .strip_prefix(|c| c == 'N' || c == 'n')
        .unwrap_or(&literal)
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))?;
    Some(body.replace("''", "'"))
}

/// Returns the variable of `EXEC(@sql)` as written, `@` included.
#[must_use]
pub fn exec_variable(tokens: &[Token]) -> Option<String> {
    exec_argument(tokens, MatchStep::kind(TokenKind::Variable).raw())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    #[test]
    fn test_exec_string() {
        let tokens = tokenize("EXEC('update FaceDevices set DeviceType = ''人脸''')");
        assert_eq!(
            exec_string_literal(&tokens).as_deref(),
            Some("update FaceDevices set DeviceType = '人脸'")
        );
        assert_eq!(exec_variable(&tokens), None);
    }

    #[test]
    fn test_exec_unicode_string() {
        let tokens = tokenize("execute (N'SELECT ''a''')");
        assert_eq!(exec_string_literal(&tokens).as_deref(), Some("SELECT 'a'"));
    }

    #[test]
    fn test_exec_empty_string() {
        let tokens = tokenize("EXEC('')");
        assert_eq!(exec_string_literal(&tokens).as_deref(), Some(""));
    }

    #[test]
    fn test_exec_variable() {
        let tokens = tokenize("EXEC (@Sql)");
        assert_eq!(exec_variable(&tokens).as_deref(), Some("@Sql"));
        assert_eq!(exec_string_literal(&tokens), None);
    }

    #[test]
    fn test_exec_procedure_call_is_not_extracted() {
        let tokens = tokenize("EXEC sp_help 't'");
        assert_eq!(exec_variable(&tokens), None);
        assert_eq!(exec_string_literal(&tokens), None);
    }
}
