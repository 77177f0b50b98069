//! `CONVERT(type, expr[, style])` to `CAST(expr AS type)`.

use super::{split_call, strip_outer_parens};
use crate::lexer::Token;

/// Rewrites the `CONVERT` call whose name token is at `*idx`.
///
/// On success `*idx` is left on the call's closing parenthesis, so the
/// caller continues with the token after it. The style argument has no
/// PostgreSQL equivalent and is dropped. One redundant layer of parentheses
/// around the converted expression is removed. Missing arguments leave
/// their slot empty rather than failing.
///
/// If no parenthesized argument list follows, the token text is returned
/// and `*idx` is not moved. An out-of-range index yields an empty string.
#[must_use]
pub fn convert_to_cast(tokens: &[Token], idx: &mut usize) -> String {
    let Some(token) = tokens.get(*idx) else {
        return String::new();
    };
    let Some((args, close)) = split_call(tokens, *idx) else {
        return token.text.clone();
    };
    *idx = close;

    let data_type = args.first().map_or("", |s| s.trim());
    let expr = args.get(1).map_or("", |s| strip_outer_parens(s.trim()));
    format!("CAST({expr} AS {data_type})")
}
