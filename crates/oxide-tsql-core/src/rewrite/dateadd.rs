//! `DATEADD(part, amount, date)` to PostgreSQL interval arithmetic.

use super::{split_call, strip_outer_parens};
use crate::lexer::Token;

/// Maps a T-SQL date part to an interval unit and a multiplier.
fn interval_unit(part: &str) -> (String, u32) {
    let part = part
        .trim()
        .trim_matches(|c| matches!(c, '\'' | '"'))
        .to_ascii_lowercase();
    let unit = match part.as_str() {
        "year" | "yy" | "yyyy" => "year",
        "quarter" | "qq" | "q" => return ("month".to_string(), 3),
        "month" | "mm" | "m" => "month",
        "week" | "wk" | "ww" => "week",
        "day" | "dd" | "d" | "dayofyear" | "dy" | "y" | "weekday" | "dw" | "w" => "day",
        "hour" | "hh" => "hour",
        "minute" | "mi" | "n" => "minute",
        "second" | "ss" | "s" => "second",
        "millisecond" | "ms" => "millisecond",
        "microsecond" | "mcs" => "microsecond",
        _ => return (part, 1),
    };
    (unit.to_string(), 1)
}

/// Maps the date argument, turning the current-time functions into their
/// PostgreSQL forms.
fn date_expression(date: &str) -> String {
    let date = date.trim();
    let compact: String = date
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    match compact.as_str() {
        "" | "getdate()" | "getdate" | "current_timestamp" => "NOW()".to_string(),
        "getutcdate()" | "getutcdate" => "TIMEZONE('UTC', NOW())".to_string(),
        _ => date.to_string(),
    }
}

/// Rewrites the `DATEADD` call whose name token is at `*idx`.
///
/// Literal amounts become `INTERVAL 'n unit'` (subtracted when negative),
/// other amounts `((expr)::text || ' unit')::interval`. Quarters are turned
/// into three months.
///
/// Like [`convert_to_cast`](super::convert_to_cast), `*idx` ends on the
/// closing parenthesis, and a name without an argument list is returned
/// unchanged.
#[must_use]
pub fn dateadd_to_interval(tokens: &[Token], idx: &mut usize) -> String {
    let Some(token) = tokens.get(*idx) else {
        return String::new();
    };
    let Some((args, close)) = split_call(tokens, *idx) else {
        return token.text.clone();
    };
    *idx = close;

    let (unit, factor) = interval_unit(args.first().map_or("", String::as_str));
    let amount = strip_outer_parens(args.get(1).map_or("", |s| s.trim()));
    let date = date_expression(args.get(2).map_or("", String::as_str));

    let (negative, magnitude) = amount
        .strip_prefix('-')
        .map_or((false, amount), |rest| (true, rest.trim()));

    let interval = match magnitude.parse::<f64>() {
        Ok(value) => format!("INTERVAL '{} {unit}'", value * f64::from(factor)),
        Err(_) if factor == 1 => format!("(({magnitude})::text || ' {unit}')::interval"),
        Err(_) => format!("((({magnitude}) * {factor})::text || ' {unit}')::interval"),
    };
    let op = if negative { '-' } else { '+' };
    format!("{date} {op} {interval}")
}
