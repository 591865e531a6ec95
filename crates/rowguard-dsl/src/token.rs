use logos::Logos;

/// Tokens produced by the condition lexer.
///
/// Whitespace is skipped automatically by logos. The unsupported comparison
/// operators (`==`, `!=`, `<>`, `<`, `<=`, `>`, `>=`) are lexed as distinct
/// tokens on purpose: the parser rejects them with an error naming the
/// operator, instead of a generic invalid-token failure.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    // -- Boolean keywords --
    #[token("AND")]
    And,

    #[token("OR")]
    Or,

    // -- Boolean literals --
    #[token("true")]
    True,

    #[token("false")]
    False,

    // -- Comparison operators --
    /// The only supported comparator.
    #[token("=")]
    Eq,

    /// `==` is not part of the grammar; lexed so the parser can reject it
    /// by name.
    #[token("==")]
    DoubleEq,

    #[token("!=")]
    #[token("<>")]
    NotEq,

    #[token("<=")]
    Lte,

    #[token(">=")]
    Gte,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    // -- Session placeholders --
    /// `{userId}` -- the current principal's id.
    #[token("{userId}", priority = 10)]
    UserIdPlaceholder,

    /// `{user.<property>}` -- a named session property.
    #[regex(r"\{user\.[a-zA-Z_][a-zA-Z0-9_]*\}", priority = 9)]
    UserPropertyPlaceholder,

    /// Any other brace-delimited sequence. Always rejected by the parser
    /// as a malformed placeholder.
    #[regex(r"\{[^}]*\}", priority = 2)]
    BadPlaceholder,

    // -- Literals --
    /// A quoted string literal; single and double quotes are both accepted.
    #[regex(r"'([^'\\]|\\.)*'")]
    #[regex(r#""([^"\\]|\\.)*""#)]
    StringLiteral,

    /// An integer literal, optionally negative, e.g. `42` or `-10`.
    #[regex(r"-?[0-9]+", priority = 3)]
    IntegerLiteral,

    /// A float literal with a decimal point, e.g. `3.14` or `-2.5`.
    #[regex(r"-?[0-9]+\.[0-9]+", priority = 4)]
    FloatLiteral,

    // -- Identifiers --
    /// A field reference. Must come after keywords so logos prefers
    /// keyword tokens.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
}

impl Token {
    /// Returns a human-readable description of this token kind.
    pub fn description(&self) -> &'static str {
        match self {
            Self::And => "'AND'",
            Self::Or => "'OR'",
            Self::True => "'true'",
            Self::False => "'false'",
            Self::Eq => "'='",
            Self::DoubleEq => "'=='",
            Self::NotEq => "'!='",
            Self::Lte => "'<='",
            Self::Gte => "'>='",
            Self::Lt => "'<'",
            Self::Gt => "'>'",
            Self::UserIdPlaceholder => "'{userId}'",
            Self::UserPropertyPlaceholder => "user property placeholder",
            Self::BadPlaceholder => "placeholder",
            Self::StringLiteral => "string literal",
            Self::IntegerLiteral => "integer literal",
            Self::FloatLiteral => "float literal",
            Self::Ident => "field name",
        }
    }

    /// Returns true for the operator tokens the grammar does not support.
    pub fn is_unsupported_operator(&self) -> bool {
        matches!(
            self,
            Self::DoubleEq | Self::NotEq | Self::Lte | Self::Gte | Self::Lt | Self::Gt
        )
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}
