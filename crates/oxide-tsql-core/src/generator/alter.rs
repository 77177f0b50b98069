//! `ALTER TABLE` extraction and PostgreSQL emission.
//!
//! Each extractor recognizes one clause shape and returns `None` for
//! anything else, so callers try them in turn:
//!
//! ```rust
//! use oxide_tsql_core::generator::{drop_constraint_sql, match_drop_constraint};
//! use oxide_tsql_core::lexer::tokenize;
//!
//! let tokens = tokenize("ALTER TABLE [Foo] DROP CONSTRAINT [PK_Foo]");
//! let drop = match_drop_constraint(&tokens).unwrap();
//! assert_eq!(drop_constraint_sql(&drop), "ALTER TABLE foo DROP CONSTRAINT pk_foo;");
//! ```

use serde::{Deserialize, Serialize};

use crate::dialect::TargetDialect;
use crate::lexer::{next_significant, Keyword, Token, TokenKind};
use crate::matcher::{ColumnDefine, MatchStep, SequenceMatcher};
use crate::rewrite::{normalize_identifier_as, render_identifier, IdentifierRole};

use super::is_terminator;

/// `ALTER TABLE t ADD c1 ..., c2 ...`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddColumns {
    /// Normalized table name.
    pub table: String,
    /// Added columns, in order.
    pub columns: Vec<ColumnDefine>,
}

/// `ALTER TABLE t ALTER COLUMN c ...`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlterColumn {
    /// Normalized table name.
    pub table: String,
    /// New definition of the column.
    pub column: ColumnDefine,
}

/// `ALTER TABLE t DROP CONSTRAINT k`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropConstraint {
    /// Normalized table name.
    pub table: String,
    /// Normalized constraint name.
    pub constraint: String,
}

/// `ALTER TABLE t ADD CONSTRAINT k PRIMARY KEY (a, b)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddPrimaryKey {
    /// Normalized table name.
    pub table: String,
    /// Normalized constraint name.
    pub constraint: String,
    /// Normalized key columns, in order.
    pub columns: Vec<String>,
}

impl AddPrimaryKey {
    /// Key columns joined with commas, e.g. `a,b`.
    #[must_use]
    pub fn column_list(&self) -> String {
        self.columns.join(",")
    }
}

/// Any recognized `ALTER TABLE` statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlterTable {
    /// Primary key constraint added.
    AddPrimaryKey(AddPrimaryKey),
    /// Constraint dropped.
    DropConstraint(DropConstraint),
    /// Columns added.
    AddColumns(AddColumns),
    /// Column redefined.
    AlterColumn(AlterColumn),
}

impl AlterTable {
    /// Tries every extractor on `tokens`. The statement may go on after the
    /// recognized clause.
    #[must_use]
    pub fn extract(tokens: &[Token], dialect: &dyn TargetDialect) -> Option<Self> {
        Self::extract_prefix(tokens, dialect).map(|(alter, _)| alter)
    }

    /// Like [`extract`](Self::extract), but also returns the index of the
    /// first token the extractor did not consume.
    #[must_use]
    pub fn extract_prefix(tokens: &[Token], dialect: &dyn TargetDialect) -> Option<(Self, usize)> {
        if let Some((pk, end)) = add_primary_key_at(tokens) {
            return Some((Self::AddPrimaryKey(pk), end));
        }
        if let Some((drop, end)) = drop_constraint_at(tokens) {
            return Some((Self::DropConstraint(drop), end));
        }
        if let Some((add, end)) = add_columns_at(tokens, dialect) {
            return Some((Self::AddColumns(add), end));
        }
        alter_column_at(tokens, dialect).map(|(alter, end)| (Self::AlterColumn(alter), end))
    }

    /// Extracts `tokens` only when the extractor consumes the whole
    /// statement, up to an optional `;`.
    #[must_use]
    pub fn extract_statement(tokens: &[Token], dialect: &dyn TargetDialect) -> Option<Self> {
        let (alter, end) = Self::extract_prefix(tokens, dialect)?;
        is_terminator(&tokens[end.min(tokens.len())..]).then_some(alter)
    }

    /// PostgreSQL statement for this extraction.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::AddPrimaryKey(pk) => add_primary_key_sql(pk),
            Self::DropConstraint(drop) => drop_constraint_sql(drop),
            Self::AddColumns(add) => add_columns_sql(add),
            Self::AlterColumn(alter) => alter_column_sql(alter),
        }
    }
}

fn alter_table_steps() -> Vec<MatchStep> {
    vec![
        MatchStep::keyword(Keyword::Alter),
        MatchStep::keyword(Keyword::Table),
        MatchStep::identifier(),
    ]
}

/// Matches `ALTER TABLE <t> ADD <column> [, <column>]*`.
#[must_use]
pub fn match_add_columns(tokens: &[Token], dialect: &dyn TargetDialect) -> Option<AddColumns> {
    add_columns_at(tokens, dialect).map(|(add, _)| add)
}

fn add_columns_at(tokens: &[Token], dialect: &dyn TargetDialect) -> Option<(AddColumns, usize)> {
    let mut steps = alter_table_steps();
    steps.extend([
        MatchStep::keyword(Keyword::Add),
        MatchStep::column_definition(),
    ]);
    let tail = [
        MatchStep::kind(TokenKind::Comma),
        MatchStep::column_definition(),
    ];
    let result = SequenceMatcher::new(&steps)
        .with_dialect(dialect)
        .repeating(&tail)
        .run(tokens, 0);
    if !result.matched {
        return None;
    }
    let table = result.values.into_iter().next()?;
    let add = AddColumns {
        table,
        columns: result.columns,
    };
    Some((add, result.stop_index))
}

/// Matches `ALTER TABLE <t> ALTER COLUMN <column>`.
#[must_use]
pub fn match_alter_column(tokens: &[Token], dialect: &dyn TargetDialect) -> Option<AlterColumn> {
    alter_column_at(tokens, dialect).map(|(alter, _)| alter)
}

fn alter_column_at(tokens: &[Token], dialect: &dyn TargetDialect) -> Option<(AlterColumn, usize)> {
    let mut steps = alter_table_steps();
    steps.extend([
        MatchStep::keyword(Keyword::Alter),
        MatchStep::keyword(Keyword::Column),
        MatchStep::column_definition(),
    ]);
    let result = SequenceMatcher::new(&steps)
        .with_dialect(dialect)
        .run(tokens, 0);
    if !result.matched {
        return None;
    }
    let alter = AlterColumn {
        table: result.values.into_iter().next()?,
        column: result.columns.into_iter().next()?,
    };
    Some((alter, result.stop_index))
}

/// Matches `ALTER TABLE <t> DROP CONSTRAINT <k>`.
#[must_use]
pub fn match_drop_constraint(tokens: &[Token]) -> Option<DropConstraint> {
    drop_constraint_at(tokens).map(|(drop, _)| drop)
}

fn drop_constraint_at(tokens: &[Token]) -> Option<(DropConstraint, usize)> {
    let mut steps = alter_table_steps();
    steps.extend([
        MatchStep::keyword(Keyword::Drop),
        MatchStep::keyword(Keyword::Constraint),
        MatchStep::identifier(),
    ]);
    let result = SequenceMatcher::new(&steps).run(tokens, 0);
    if !result.matched {
        return None;
    }
    let mut values = result.values.into_iter();
    let drop = DropConstraint {
        table: values.next()?,
        constraint: values.next()?,
    };
    Some((drop, result.stop_index))
}

/// Matches `ALTER TABLE <t> ADD CONSTRAINT <k> PRIMARY KEY [CLUSTERED] (<a>, ...)`.
///
/// The key column list is scanned directly: names are normalized, sort
/// directions dropped.
#[must_use]
pub fn match_add_primary_key(tokens: &[Token]) -> Option<AddPrimaryKey> {
    add_primary_key_at(tokens).map(|(pk, _)| pk)
}

fn add_primary_key_at(tokens: &[Token]) -> Option<(AddPrimaryKey, usize)> {
    let mut steps = alter_table_steps();
    steps.extend([
        MatchStep::keyword(Keyword::Add),
        MatchStep::keyword(Keyword::Constraint),
        MatchStep::identifier(),
        MatchStep::keyword(Keyword::Primary),
        MatchStep::keyword(Keyword::Key),
    ]);
    let result = SequenceMatcher::new(&steps).run(tokens, 0);
    if !result.matched {
        return None;
    }

    let mut open = next_significant(tokens, result.stop_index);
    while tokens
        .get(open)
        .is_some_and(|t| t.is_word("clustered") || t.is_word("nonclustered"))
    {
        open = next_significant(tokens, open + 1);
    }
    if tokens.get(open)?.kind != TokenKind::LeftParen {
        return None;
    }

    let mut columns = Vec::new();
    let mut end = tokens.len();
    for (i, token) in tokens.iter().enumerate().skip(open + 1) {
        match token.kind {
            TokenKind::RightParen => {
                end = i + 1;
                break;
            }
            kind if kind.is_identifier() => {
                if !(token.is_word("asc") || token.is_word("desc")) {
                    columns.push(normalize_identifier_as(IdentifierRole::Column, &token.text));
                }
            }
            _ => {}
        }
    }

    let mut values = result.values.into_iter();
    let pk = AddPrimaryKey {
        table: values.next()?,
        constraint: values.next()?,
        columns,
    };
    Some((pk, end))
}

fn column_clause(column: &ColumnDefine) -> String {
    let define = &column.data_type;
    let mut clause = format!(
        "{} {}",
        render_identifier(&column.name),
        define.data_type
    );
    if define.identity {
        clause.push_str(" generated by default as identity");
    }
    if !define.nullable {
        clause.push_str(" not null");
    }
    if let Some(default) = define.default_value.as_deref().filter(|d| !d.is_empty()) {
        clause.push_str(" DEFAULT ");
        clause.push_str(default);
    }
    if define.primary_key {
        clause.push_str(" primary key");
    }
    clause
}

/// `ALTER TABLE t ADD a type[ not null][ DEFAULT v], ADD b ...;`
#[must_use]
pub fn add_columns_sql(add: &AddColumns) -> String {
    let columns: Vec<String> = add
        .columns
        .iter()
        .map(|c| format!(" ADD {}", column_clause(c)))
        .collect();
    format!(
        "ALTER TABLE {}{};",
        render_identifier(&add.table),
        columns.join(",")
    )
}

/// `ALTER TABLE t alter column c type T, alter column c set|drop not null;`
#[must_use]
pub fn alter_column_sql(alter: &AlterColumn) -> String {
    let column = render_identifier(&alter.column.name);
    let nullability = if alter.column.data_type.nullable {
        "drop"
    } else {
        "set"
    };
    format!(
        "ALTER TABLE {} alter column {column} type {}, alter column {column} {nullability} not null;",
        render_identifier(&alter.table),
        alter.column.data_type.data_type,
    )
}

/// `ALTER TABLE t DROP CONSTRAINT k;`
#[must_use]
pub fn drop_constraint_sql(drop: &DropConstraint) -> String {
    format!(
        "ALTER TABLE {} DROP CONSTRAINT {};",
        render_identifier(&drop.table),
        render_identifier(&drop.constraint)
    )
}

/// `ALTER TABLE t ADD CONSTRAINT k PRIMARY KEY (a,b);`
#[must_use]
pub fn add_primary_key_sql(pk: &AddPrimaryKey) -> String {
    format!(
        "ALTER TABLE {} ADD CONSTRAINT {} PRIMARY KEY ({});",
        render_identifier(&pk.table),
        render_identifier(&pk.constraint),
        pk.column_list()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::POSTGRES;
    use crate::lexer::tokenize;

    #[test]
    fn test_add_single_column() {
        let tokens = tokenize("alter table dbo.helpFiles add showStatus bit null");
        let add = match_add_columns(&tokens, &POSTGRES).unwrap();
        assert_eq!(add.table, "helpfiles");
        assert_eq!(add.columns.len(), 1);
        assert_eq!(add.columns[0].name, "showstatus");
        assert_eq!(add.columns[0].data_type.data_type, "boolean");
        assert!(add.columns[0].data_type.nullable);
        assert!(!add.columns[0].data_type.primary_key);
        assert_eq!(add.columns[0].data_type.default_value, None);
    }

    #[test]
    fn test_add_columns_with_default() {
        let tokens = tokenize("alter table hotelpos add isQtyControl bit not null default 0, qty int null");
        let add = match_add_columns(&tokens, &POSTGRES).unwrap();
        assert_eq!(add.columns.len(), 2);
        assert!(!add.columns[0].data_type.nullable);
        assert_eq!(add.columns[0].data_type.default_value.as_deref(), Some("0"));
        assert_eq!(add.columns[1].data_type.data_type, "integer");
        assert_eq!(
            add_columns_sql(&add),
            "ALTER TABLE hotelpos ADD isqtycontrol boolean not null DEFAULT 0, ADD qty integer;"
        );
    }

    #[test]
    fn test_add_uuid_column_maps_default() {
        let tokens = tokenize("ALTER TABLE HotelPos ADD ID UNIQUEIDENTIFIER NOT NULL DEFAULT NEWID()");
        let add = match_add_columns(&tokens, &POSTGRES).unwrap();
        assert_eq!(add.columns[0].data_type.data_type, "uuid");
        assert_eq!(
            add_columns_sql(&add),
            "ALTER TABLE hotelpos ADD id uuid not null DEFAULT gen_random_uuid();"
        );
    }

    #[test]
    fn test_alter_column() {
        let tokens = tokenize("alter table dbo.helpFiles alter column showStatus bit not null");
        let alter = match_alter_column(&tokens, &POSTGRES).unwrap();
        assert_eq!(alter.table, "helpfiles");
        assert!(!alter.column.data_type.nullable);
        assert_eq!(
            alter_column_sql(&alter),
            "ALTER TABLE helpfiles alter column showstatus type boolean, alter column showstatus set not null;"
        );
        assert!(match_add_columns(&tokens, &POSTGRES).is_none());
    }

    #[test]
    fn test_drop_constraint() {
        let tokens = tokenize("ALTER TABLE HotelPos DROP CONSTRAINT pk_hotelPos");
        let drop = match_drop_constraint(&tokens).unwrap();
        assert_eq!(drop.table, "hotelpos");
        assert_eq!(drop.constraint, "pk_hotelpos");
    }

    #[test]
    fn test_add_primary_key() {
        let tokens = tokenize("ALTER TABLE hotelPos ADD CONSTRAINT pk_hotelPos PRIMARY KEY(ID)");
        let pk = match_add_primary_key(&tokens).unwrap();
        assert_eq!(pk.table, "hotelpos");
        assert_eq!(pk.constraint, "pk_hotelpos");
        assert_eq!(pk.column_list(), "id");

        let tokens = tokenize(
            "ALTER TABLE [T] ADD CONSTRAINT [PK_T] PRIMARY KEY CLUSTERED ([A] ASC, [B] DESC)",
        );
        let pk = match_add_primary_key(&tokens).unwrap();
        assert_eq!(pk.columns, vec!["a", "b"]);
        assert_eq!(
            add_primary_key_sql(&pk),
            "ALTER TABLE t ADD CONSTRAINT pk_t PRIMARY KEY (a,b);"
        );
        assert!(match_add_columns(&tokens, &POSTGRES).is_none());
    }

    #[test]
    fn test_extract_dispatch() {
        let tokens = tokenize("ALTER TABLE dbo.sysPara \nADD IsHide BIT");
        let extracted = AlterTable::extract(&tokens, &POSTGRES).unwrap();
        assert!(matches!(extracted, AlterTable::AddColumns(_)));
        assert_eq!(extracted.to_sql(), "ALTER TABLE syspara ADD ishide boolean;");

        let tokens = tokenize("ALTER TABLE t ENABLE TRIGGER ALL");
        assert!(AlterTable::extract(&tokens, &POSTGRES).is_none());
    }

    #[test]
    fn test_extract_reports_unconsumed_tail() {
        let tokens = tokenize("ALTER TABLE t ADD a int NOT NULL, CONSTRAINT pk_t PRIMARY KEY (a)");
        let (extracted, end) = AlterTable::extract_prefix(&tokens, &POSTGRES).unwrap();
        assert!(matches!(extracted, AlterTable::AddColumns(_)));
        assert_eq!(tokens[end].kind, TokenKind::Comma);
        assert!(AlterTable::extract_statement(&tokens, &POSTGRES).is_none());

        let tokens = tokenize("ALTER TABLE t ADD CONSTRAINT pk_t PRIMARY KEY (a) ;\n");
        let (_, end) = AlterTable::extract_prefix(&tokens, &POSTGRES).unwrap();
        assert_eq!(tokens[end].kind, TokenKind::Whitespace);
        assert!(AlterTable::extract_statement(&tokens, &POSTGRES).is_some());
    }

    #[test]
    fn test_extraction_serializes_with_kind_tag() {
        let tokens = tokenize("ALTER TABLE [Foo] DROP CONSTRAINT [PK_Foo]");
        let extracted = AlterTable::extract(&tokens, &POSTGRES).unwrap();
        let json = serde_json::to_value(&extracted).unwrap();
        assert_eq!(json["kind"], "drop_constraint");
        assert_eq!(json["table"], "foo");
        assert_eq!(json["constraint"], "pk_foo");
    }
}
