//! PostgreSQL target dialect.

use super::TargetDialect;

/// PostgreSQL dialect for column type and default value mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// `(n)` when a length was given, nothing otherwise.
fn length_suffix(args: &[String]) -> String {
    args.first()
        .map_or_else(String::new, |n| format!("({})", n.trim()))
}

impl TargetDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn map_type(&self, name: &str, args: &[String]) -> String {
        let name = name
            .trim()
            .trim_matches(|c| matches!(c, '[' | ']' | '"'))
            .to_ascii_lowercase();
        match name.as_str() {
            "bigint" => "bigint".to_string(),
            "int" | "integer" => "integer".to_string(),
            "smallint" | "tinyint" => "smallint".to_string(),
            "bit" => "boolean".to_string(),
            "real" => "real".to_string(),
            "float" => "double precision".to_string(),
            "money" | "smallmoney" => "money".to_string(),
            "decimal" | "numeric" => match args {
                [p, s, ..] => format!("numeric({}, {})", p.trim(), s.trim()),
                [p] => format!("numeric({})", p.trim()),
                [] => "numeric".to_string(),
            },
            "char" | "nchar" => format!("char{}", length_suffix(args)),
            "varchar" | "nvarchar" => match args.first().map(|n| n.trim()) {
                Some(n) if n.eq_ignore_ascii_case("max") || n == "-1" => "text".to_string(),
                _ => format!("varchar{}", length_suffix(args)),
            },
            "text" | "ntext" | "xml" | "sql_variant" => "text".to_string(),
            "binary" | "varbinary" | "image" | "timestamp" | "rowversion" => "bytea".to_string(),
            "date" => "date".to_string(),
            "time" => "time".to_string(),
            "datetime" | "datetime2" | "smalldatetime" => "timestamp".to_string(),
            "datetimeoffset" => "timestamptz".to_string(),
            "uniqueidentifier" => "uuid".to_string(),
            _ => "text".to_string(),
        }
    }

    fn map_default(&self, value: &str) -> String {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "getdate()" | "sysdatetime()" | "current_timestamp" => "now()".to_string(),
            "getutcdate()" | "sysutcdatetime()" => "(now() at time zone 'utc')".to_string(),
            "newid()" | "newsequentialid()" => "gen_random_uuid()".to_string(),
            _ => trimmed.to_string(),
        }
    }
}
