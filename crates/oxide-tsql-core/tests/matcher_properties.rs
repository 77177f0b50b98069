//! Sequence matcher behaviour on realistic statements.

mod common;
use common::*;

use oxide_tsql_core::lexer::{Keyword, TokenKind};
use oxide_tsql_core::matcher::{MatchStep, SequenceMatcher};

fn drop_constraint_steps() -> Vec<MatchStep> {
    vec![
        MatchStep::keyword(Keyword::Alter),
        MatchStep::keyword(Keyword::Table),
        MatchStep::identifier(),
        MatchStep::keyword(Keyword::Drop),
        MatchStep::keyword(Keyword::Constraint),
        MatchStep::identifier(),
    ]
}

#[test]
fn stop_index_follows_last_consumed_token() {
    let tokens = tokens("ALTER TABLE Foo DROP CONSTRAINT PK_Foo ALTER TABLE Bar DROP CONSTRAINT PK_Bar");
    let steps = drop_constraint_steps();
    let matcher = SequenceMatcher::new(&steps);

    let first = matcher.run(&tokens, 0);
    assert!(first.matched);
    assert_eq!(first.values, vec!["foo", "pk_foo"]);
    assert_eq!(tokens[first.stop_index - 1].text, "PK_Foo");

    let second = matcher.run(&tokens, first.stop_index);
    assert!(second.matched);
    assert_eq!(second.values, vec!["bar", "pk_bar"]);
    assert_eq!(second.stop_index, tokens.len());

    assert!(!matcher.run(&tokens, second.stop_index).matched);
}

#[test]
fn rerun_does_not_rematch_consumed_tokens() {
    let tokens = tokens("ALTER TABLE Foo DROP CONSTRAINT PK_Foo SELECT 1");
    let steps = drop_constraint_steps();
    let matcher = SequenceMatcher::new(&steps);
    let first = matcher.run(&tokens, 0);
    assert!(first.matched);
    assert!(!matcher.run(&tokens, first.stop_index).matched);
}

#[test]
fn repeating_tail_collects_every_column() {
    let tokens = tokens("ALTER TABLE t ADD a int, b bit NULL, c varchar(10) NOT NULL;");
    let steps = [
        MatchStep::keyword(Keyword::Alter),
        MatchStep::keyword(Keyword::Table),
        MatchStep::identifier(),
        MatchStep::keyword(Keyword::Add),
        MatchStep::column_definition(),
    ];
    let tail = [
        MatchStep::kind(TokenKind::Comma),
        MatchStep::column_definition(),
    ];
    let result = SequenceMatcher::new(&steps).repeating(&tail).run(&tokens, 0);
    assert!(result.matched);
    let names: Vec<&str> = result.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert_eq!(tokens[result.stop_index].kind, TokenKind::Semicolon);
}
