//! Token types produced by the T-SQL lexer.

use super::Span;

/// T-SQL reserved words the rewrite engine reacts to.
///
/// Data type names (`int`, `varchar`, `bit`, ...) are deliberately not
/// keywords; they lex as identifiers like in SQL Server itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    // Query clauses
    Select,
    From,
    Where,
    Group,
    Order,
    By,
    Having,
    Option,
    Distinct,
    Top,
    All,

    // Joins
    Join,
    Inner,
    Left,
    Right,
    Full,
    Outer,
    Cross,
    On,

    // Set operations
    Union,
    Intersect,
    Except,

    // Data manipulation
    Insert,
    Into,
    Values,
    Update,
    Set,
    Delete,
    Merge,

    // Data definition
    Create,
    Alter,
    Drop,
    Truncate,
    Table,
    View,
    Procedure,
    Proc,
    Function,
    Index,
    Trigger,
    Column,
    Add,

    // Constraints
    Constraint,
    Primary,
    Key,
    Foreign,
    References,
    Unique,
    Default,
    Identity,
    Check,

    // Predicates
    Null,
    Not,
    And,
    Or,
    Is,
    In,
    Exists,
    Like,
    Between,

    // Expressions
    As,
    Case,
    When,
    Then,
    Else,
    End,
    Convert,

    // Control flow
    If,
    While,
    Begin,
    Return,

    // Variables and cursors
    Declare,
    Cursor,
    For,
    Open,
    Fetch,
    Close,
    Deallocate,

    // Dynamic SQL and diagnostics
    Exec,
    Execute,
    Print,

    // Transactions
    Transaction,
    Tran,
    Commit,
    Rollback,

    // Batches
    With,
    Go,
    Use,
}

impl Keyword {
    /// Attempts to parse a keyword from a string (case-insensitive).
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SELECT" => Some(Self::Select),
            "FROM" => Some(Self::From),
            "WHERE" => Some(Self::Where),
            "GROUP" => Some(Self::Group),
            "ORDER" => Some(Self::Order),
            "BY" => Some(Self::By),
            "HAVING" => Some(Self::Having),
            "OPTION" => Some(Self::Option),
            "DISTINCT" => Some(Self::Distinct),
            "TOP" => Some(Self::Top),
            "ALL" => Some(Self::All),
            "JOIN" => Some(Self::Join),
            "INNER" => Some(Self::Inner),
            "LEFT" => Some(Self::Left),
            "RIGHT" => Some(Self::Right),
            "FULL" => Some(Self::Full),
            "OUTER" => Some(Self::Outer),
            "CROSS" => Some(Self::Cross),
            "ON" => Some(Self::On),
            "UNION" => Some(Self::Union),
            "INTERSECT" => Some(Self::Intersect),
            "EXCEPT" => Some(Self::Except),
            "INSERT" => Some(Self::Insert),
            "INTO" => Some(Self::Into),
            "VALUES" => Some(Self::Values),
            "UPDATE" => Some(Self::Update),
            "SET" => Some(Self::Set),
            "DELETE" => Some(Self::Delete),
            "MERGE" => Some(Self::Merge),
            "CREATE" => Some(Self::Create),
            "ALTER" => Some(Self::Alter),
            "DROP" => Some(Self::Drop),
            "TRUNCATE" => Some(Self::Truncate),
            "TABLE" => Some(Self::Table),
            "VIEW" => Some(Self::View),
            "PROCEDURE" => Some(Self::Procedure),
            "PROC" => Some(Self::Proc),
            "FUNCTION" => Some(Self::Function),
            "INDEX" => Some(Self::Index),
            "TRIGGER" => Some(Self::Trigger),
            "COLUMN" => Some(Self::Column),
            "ADD" => Some(Self::Add),
            "CONSTRAINT" => Some(Self::Constraint),
            "PRIMARY" => Some(Self::Primary),
            "KEY" => Some(Self::Key),
            "FOREIGN" => Some(Self::Foreign),
            "REFERENCES" => Some(Self::References),
            "UNIQUE" => Some(Self::Unique),
            "DEFAULT" => Some(Self::Default),
            "IDENTITY" => Some(Self::Identity),
            "CHECK" => Some(Self::Check),
            "NULL" => Some(Self::Null),
            "NOT" => Some(Self::Not),
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            "IS" => Some(Self::Is),
            "IN" => Some(Self::In),
            "EXISTS" => Some(Self::Exists),
            "LIKE" => Some(Self::Like),
            "BETWEEN" => Some(Self::Between),
            "AS" => Some(Self::As),
            "CASE" => Some(Self::Case),
            "WHEN" => Some(Self::When),
            "THEN" => Some(Self::Then),
            "ELSE" => Some(Self::Else),
            "END" => Some(Self::End),
            "CONVERT" => Some(Self::Convert),
            "IF" => Some(Self::If),
            "WHILE" => Some(Self::While),
            "BEGIN" => Some(Self::Begin),
            "RETURN" => Some(Self::Return),
            "DECLARE" => Some(Self::Declare),
            "CURSOR" => Some(Self::Cursor),
            "FOR" => Some(Self::For),
            "OPEN" => Some(Self::Open),
            "FETCH" => Some(Self::Fetch),
            "CLOSE" => Some(Self::Close),
            "DEALLOCATE" => Some(Self::Deallocate),
            "EXEC" => Some(Self::Exec),
            "EXECUTE" => Some(Self::Execute),
            "PRINT" => Some(Self::Print),
            "TRANSACTION" => Some(Self::Transaction),
            "TRAN" => Some(Self::Tran),
            "COMMIT" => Some(Self::Commit),
            "ROLLBACK" => Some(Self::Rollback),
            "WITH" => Some(Self::With),
            "GO" => Some(Self::Go),
            "USE" => Some(Self::Use),            _ => None,
        }
    }

    /// Returns the keyword as an upper-case string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::From => "FROM",
            Self::Where => "WHERE",
            Self::Group => "GROUP",
            Self::Order => "ORDER",
            Self::By => "BY",
            Self::Having => "HAVING",
            Self::Option => "OPTION",
            Self::Distinct => "DISTINCT",
            Self::Top => "TOP",
            Self::All => "ALL",
            Self::Join => "JOIN",
            Self::Inner => "INNER",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Full => "FULL",
            Self::Outer => "OUTER",
            Self::Cross => "CROSS",
            Self::On => "ON",
            Self::Union => "UNION",
            Self::Intersect => "INTERSECT",
            Self::Except => "EXCEPT",
            Self::Insert => "INSERT",
            Self::Into => "INTO",
            Self::Values => "VALUES",
            Self::Update => "UPDATE",
            Self::Set => "SET",
            Self::Delete => "DELETE",
            Self::Merge => "MERGE",
            Self::Create => "CREATE",
            Self::Alter => "ALTER",
            Self::Drop => "DROP",
            Self::Truncate => "TRUNCATE",
            Self::Table => "TABLE",
            Self::View => "VIEW",
            Self::Procedure => "PROCEDURE",
            Self::Proc => "PROC",
            Self::Function => "FUNCTION",
            Self::Index => "INDEX",
            Self::Trigger => "TRIGGER",
            Self::Column => "COLUMN",
            Self::Add => "ADD",
            Self::Constraint => "CONSTRAINT",
            Self::Primary => "PRIMARY",
            Self::Key => "KEY",
            Self::Foreign => "FOREIGN",
            Self::References => "REFERENCES",
            Self::Unique => "UNIQUE",
            Self::Default => "DEFAULT",
            Self::Identity => "IDENTITY",
            Self::Check => "CHECK",
            Self::Null => "NULL",
            Self::Not => "NOT",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Is => "IS",
            Self::In => "IN",
            Self::Exists => "EXISTS",
            Self::Like => "LIKE",
            Self::Between => "BETWEEN",
            Self::As => "AS",
            Self::Case => "CASE",
            Self::When => "WHEN",
            Self::Then => "THEN",
            Self::Else => "ELSE",
            Self::End => "END",
            Self::Convert => "CONVERT",
            Self::If => "IF",
            Self::While => "WHILE",
            Self::Begin => "BEGIN",
            Self::Return => "RETURN",
            Self::Declare => "DECLARE",
            Self::Cursor => "CURSOR",
            Self::For => "FOR",
            Self::Open => "OPEN",
            Self::Fetch => "FETCH",
            Self::Close => "CLOSE",
            Self::Deallocate => "DEALLOCATE",
            Self::Exec => "EXEC",
            Self::Execute => "EXECUTE",
            Self::Print => "PRINT",
            Self::Transaction => "TRANSACTION",
            Self::Tran => "TRAN",
            Self::Commit => "COMMIT",
            Self::Rollback => "ROLLBACK",
            Self::With => "WITH",
            Self::Go => "GO",
            Self::Use => "USE",        }
    }

    /// Returns true if the keyword can open a new statement at the top level
    /// of a batch.
    #[must_use]
    pub const fn starts_statement(self) -> bool {
        matches!(
            self,
            Self::Select
                | Self::Insert
                | Self::Update
                | Self::Delete
                | Self::Merge
                | Self::Create
                | Self::Alter
                | Self::Drop
                | Self::Truncate
                | Self::Declare
                | Self::Set
                | Self::If
                | Self::While
                | Self::Begin
                | Self::Return
                | Self::Exec
                | Self::Execute
                | Self::Print
                | Self::Commit
                | Self::Rollback
                | Self::Open
                | Self::Fetch
                | Self::Close
                | Self::Deallocate
                | Self::Go
                | Self::Use
        )
    }

    /// Returns true if the keyword ends the select list of a `SELECT`.
    #[must_use]
    pub const fn ends_select_list(self) -> bool {
        matches!(
            self,
            Self::From
                | Self::Where
                | Self::Group
                | Self::Order
                | Self::Option
                | Self::Into
                | Self::Union
                | Self::Except
                | Self::Intersect
        )
    }
}

/// The kind of a token.
///
/// Kinds carry no payload: the exact source text lives on [`Token`] so that
/// untouched regions of a script can be reproduced byte for byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    /// Integer literal (e.g., 42)
    Integer,
    /// Decimal or float literal (e.g., 3.14, 1e5)
    Numeric,
    /// Money literal (e.g., $12.50)
    Money,
    /// Binary literal (e.g., 0x1F)
    Binary,
    /// String literal (e.g., 'hello')
    StringLiteral,
    /// Unicode string literal (e.g., N'hello')
    UnicodeStringLiteral,

    // Identifiers and keywords
    /// Bare identifier (e.g., column_name, #temp)
    Identifier,
    /// Bracket-quoted identifier (e.g., [column name])
    QuotedIdentifier,
    /// Double-quoted text, an identifier or a string depending on QUOTED_IDENTIFIER
    AsciiStringOrQuotedIdentifier,
    /// Local or global variable (e.g., @name, @@ROWCOUNT)
    Variable,
    /// Reserved word
    Keyword(Keyword),

    // Operators
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// %
    Percent,
    /// =
    Eq,
    /// != or <>
    NotEq,
    /// <
    Lt,
    /// <=
    LtEq,
    /// >
    Gt,
    /// >=
    GtEq,
    /// !< or !>
    NotCompare,
    /// &
    BitAnd,
    /// |
    BitOr,
    /// ^
    BitXor,
    /// ~
    BitNot,

    // Delimiters
    /// (
    LeftParen,
    /// )
    RightParen,
    /// ,
    Comma,
    /// ;
    Semicolon,
    /// .
    Dot,
    /// :
    Colon,
    /// ::
    DoubleColon,

    // Trivia
    /// A single line break, or a run of horizontal white space
    Whitespace,
    /// -- comment (without the line break)
    SingleLineComment,
    /// /* comment */, possibly nested
    MultilineComment,

    /// Text the lexer could not classify
    Error,
}

/// Kinds that name a table, column, or type.
pub const IDENTIFIER_KINDS: [TokenKind; 3] = [
    TokenKind::Identifier,
    TokenKind::QuotedIdentifier,
    TokenKind::AsciiStringOrQuotedIdentifier,
];

impl TokenKind {
    /// Returns true for white space and comments.
    #[must_use]
    pub const fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::Whitespace | Self::SingleLineComment | Self::MultilineComment
        )
    }

    /// Returns true for comments.
    #[must_use]
    pub const fn is_comment(self) -> bool {
        matches!(self, Self::SingleLineComment | Self::MultilineComment)
    }

    /// Returns true for bare or quoted identifiers.
    #[must_use]
    pub const fn is_identifier(self) -> bool {
        matches!(
            self,
            Self::Identifier | Self::QuotedIdentifier | Self::AsciiStringOrQuotedIdentifier
        )
    }

    /// Returns true for string literals.
    #[must_use]
    pub const fn is_string(self) -> bool {
        matches!(self, Self::StringLiteral | Self::UnicodeStringLiteral)
    }

    /// Returns true for numeric literals.
    #[must_use]
    pub const fn is_number(self) -> bool {
        matches!(self, Self::Integer | Self::Numeric | Self::Money)
    }
}

/// A token with its exact source text and location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The exact source text, delimiters included.
    pub text: String,
    /// The location in the source text.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    /// Returns true if this is a keyword.
    #[must_use]
    pub const fn is_keyword(&self) -> bool {
        matches!(self.kind, TokenKind::Keyword(_))
    }

    /// Returns the keyword if this is a keyword token.
    #[must_use]
    pub const fn as_keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Keyword(kw) => Some(kw),
            _ => None,
        }
    }

    /// Returns true if this token is the given keyword.
    #[must_use]
    pub fn is(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }

    /// Returns true for white space and comments.
    #[must_use]
    pub const fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }

    /// Returns true for a white space token holding a line break.
    #[must_use]
    pub fn is_newline(&self) -> bool {
        self.kind == TokenKind::Whitespace && self.text.contains('\n')
    }

    /// Returns true for a bare or quoted identifier whose text, without
    /// delimiters, equals `word` ignoring case.
    #[must_use]
    pub fn is_word(&self, word: &str) -> bool {
        self.kind.is_identifier()
            && self
                .text
                .trim_matches(|c| matches!(c, '[' | ']' | '"'))
                .eq_ignore_ascii_case(word)
    }

    /// Returns a copy of a string literal reclassified as a quoted
    /// identifier, so alias handling can treat `AS 'name'` like `AS name`.
    ///
    /// Tokens of any other kind are returned unchanged.
    #[must_use]
    pub fn promoted_to_identifier(&self) -> Self {
        if self.kind.is_string() {
            Self::new(
                TokenKind::QuotedIdentifier,
                self.text.clone(),
                self.span,
            )
        } else {
            self.clone()
        }
    }
}

/// Concatenates the source text of `tokens`.
#[must_use]
pub fn join_text(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_from_str() {
        assert_eq!(Keyword::from_str("SELECT"), Some(Keyword::Select));
        assert_eq!(Keyword::from_str("select"), Some(Keyword::Select));
        assert_eq!(Keyword::from_str("ExEc"), Some(Keyword::Exec));
        assert_eq!(Keyword::from_str("varchar"), None);
    }

    #[test]
    fn test_keyword_round_trips_through_as_str() {
        for kw in [Keyword::Convert, Keyword::Proc, Keyword::Tran, Keyword::Go] {
            assert_eq!(Keyword::from_str(kw.as_str()), Some(kw));
        }
    }

    #[test]
    fn test_statement_starters() {
        assert!(Keyword::Select.starts_statement());
        assert!(Keyword::Declare.starts_statement());
        assert!(!Keyword::From.starts_statement());
        assert!(!Keyword::With.starts_statement());
    }

    #[test]
    fn test_token_as_keyword() {
        let select = Token::new(TokenKind::Keyword(Keyword::Select), "select", Span::new(0, 6));
        let plus = Token::new(TokenKind::Plus, "+", Span::new(0, 1));
        assert_eq!(select.as_keyword(), Some(Keyword::Select));
        assert!(select.is(Keyword::Select));
        assert_eq!(plus.as_keyword(), None);
    }

    #[test]
    fn test_promoted_to_identifier() {
        let literal = Token::new(TokenKind::StringLiteral, "'code'", Span::new(3, 9));
        let promoted = literal.promoted_to_identifier();
        assert_eq!(promoted.kind, TokenKind::QuotedIdentifier);
        assert_eq!(promoted.text, "'code'");
        assert_eq!(literal.kind, TokenKind::StringLiteral);

        let ident = Token::new(TokenKind::Identifier, "a", Span::new(0, 1));
        assert_eq!(ident.promoted_to_identifier(), ident);
    }

    #[test]
    fn test_is_word() {
        let token = Token::new(TokenKind::QuotedIdentifier, "[DBO]", Span::new(0, 5));
        assert!(token.is_word("dbo"));
        let literal = Token::new(TokenKind::StringLiteral, "'dbo'", Span::new(0, 5));
        assert!(!literal.is_word("dbo"));
    }
}
