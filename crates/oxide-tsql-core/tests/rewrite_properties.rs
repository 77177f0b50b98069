//! Expression and identifier rewriting.

mod common;
use common::*;

use oxide_tsql_core::rewrite::{
    convert_to_cast, normalize_identifier, rewrite_expression, variable_name,
};

fn cast(sql: &str) -> String {
    let tokens = tokens(sql);
    let mut idx = 0;
    convert_to_cast(&tokens, &mut idx)
}

#[test]
fn convert_becomes_cast() {
    assert_eq!(cast("CONVERT(varchar(30), 'gs')"), "CAST('gs' AS varchar(30))");
    assert_eq!(cast("CONVERT(int, col, 101)"), "CAST(col AS int)");
}

#[test]
fn convert_inside_expression() {
    assert_eq!(
        rewrite_expression(&tokens("SELECT CONVERT(int, [Qty]) FROM dbo.T")),
        "SELECT CAST(qty AS int) FROM T"
    );
}

#[test]
fn normalization_is_idempotent() {
    for name in [
        "[dbo].[Foo]",
        "dbo.Bar",
        "\"dbo\".\"Baz\"",
        "[Order Details]",
        "N'Label'",
        "sales.Orders",
        "plain",
    ] {
        let once = normalize_identifier(name);
        assert_eq!(normalize_identifier(&once), once, "input {name}");
    }
    assert_eq!(normalize_identifier("[dbo].[Foo]"), "foo");
    assert_eq!(normalize_identifier("sales.Orders"), "sales.orders");
}

#[test]
fn variables_lose_their_sigil() {
    assert_eq!(variable_name("@UserId"), "userid");
    assert_eq!(variable_name("@@ROWCOUNT"), "rowcount");
}
