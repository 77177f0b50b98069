//! Target dialect support.
//!
//! Column types and default values taken from T-SQL column definitions are
//! spelled differently by each target database. This module provides a trait
//! for that mapping and the PostgreSQL implementation.

mod postgres;

pub use postgres::PostgresDialect;

/// Shared PostgreSQL dialect, the default target of matchers and generators.
pub static POSTGRES: PostgresDialect = PostgresDialect::new();

/// Trait for target-specific spelling of types and defaults.
pub trait TargetDialect {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Maps a T-SQL type name and its parenthesized arguments (`varchar`,
    /// `["50"]`) to the target type text.
    fn map_type(&self, name: &str, args: &[String]) -> String;

    /// Maps a T-SQL default value expression to the target spelling.
    ///
    /// The default implementation keeps the expression unchanged.
    fn map_default(&self, value: &str) -> String {
        value.to_string()
    }
}
