//! String `+` concatenation to `CONCAT(...)`.

use crate::lexer::{Token, TokenKind};

use super::rewrite_expression;

/// Rewrites `'a' + @b + 'c'` as `CONCAT('a', b, 'c')`.
///
/// Only applies when a string literal is one of the top-level operands, so
/// numeric sums and strings nested in calls keep their `+`. Returns `None`
/// when the expression is left as it is.
#[must_use]
pub fn concat_strings(tokens: &[Token]) -> Option<String> {
    let mut operands = Vec::new();
    let mut has_string = false;
    let mut depth = 0usize;
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::LeftParen => depth += 1,
            TokenKind::RightParen => depth = depth.saturating_sub(1),
            TokenKind::Plus if depth == 0 => {
                operands.push(&tokens[start..i]);
                start = i + 1;
            }
            kind if depth == 0 && kind.is_string() => has_string = true,
            _ => {}
        }
    }
    operands.push(&tokens[start..]);

    let parts: Vec<String> = operands
        .into_iter()
        .map(|operand| rewrite_expression(operand).trim().to_string())
        .filter(|part| !part.is_empty())
        .collect();
    (has_string && parts.len() > 1).then(|| format!("CONCAT({})", parts.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    #[test]
    fn test_concat_strings() {
        let tokens = tokenize("'http://host/Audit?hid=' +  @hid + '&type=' + @Type");
        assert_eq!(
            concat_strings(&tokens).as_deref(),
            Some("CONCAT('http://host/Audit?hid=', hid, '&type=', type)")
        );
    }

    #[test]
    fn test_non_string_sums_are_left_alone() {
        assert!(concat_strings(&tokenize("@a + 1")).is_none());
        assert!(concat_strings(&tokenize("@a + LEN('x')")).is_none());
        assert!(concat_strings(&tokenize("'only'")).is_none());
    }

    #[test]
    fn test_operands_are_rewritten() {
        let tokens = tokenize("N'n=' + CONVERT(varchar(10), @n)");
        assert_eq!(
            concat_strings(&tokens).as_deref(),
            Some("CONCAT(N'n=', CAST(n AS varchar(10)))")
        );
    }
}
