use std::fmt;

/// A byte-offset span in the condition source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Inclusive start byte offset.
    pub start: usize,
    /// Exclusive end byte offset.
    pub end: usize,
}

impl Span {
    /// Creates a new span from start (inclusive) to end (exclusive).
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Errors that occur while parsing a condition string.
///
/// Every variant carries the offending substring or a description of it.
/// All of these are schema-load-time failures; the parser is never invoked
/// per request.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConditionError {
    /// The lexer encountered a character sequence that matches no token rule.
    UnexpectedCharacter { text: String, span: Span },

    /// The condition uses a comparison operator outside the grammar
    /// (only `=` is supported; `==` in particular is rejected, not accepted).
    UnsupportedOperator { op: String, span: Span },

    /// A brace-delimited placeholder that is neither `{userId}` nor
    /// `{user.<property>}`.
    MalformedPlaceholder { text: String, span: Span },

    /// A field reference failed snake_case validation.
    InvalidFieldName { name: String, span: Span },

    /// The parser encountered an unexpected token.
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    /// The parser reached the end of input when more tokens were expected.
    UnexpectedEndOfInput { expected: String },

    /// A complete expression was parsed but input remains.
    TrailingInput { found: String, span: Span },

    /// A numeric literal could not be parsed.
    InvalidNumber { text: String, span: Span },
}

impl fmt::Display for ConditionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedCharacter { text, span } => {
                write!(f, "unexpected character '{text}' at {span}")
            }
            Self::UnsupportedOperator { op, span } => {
                write!(
                    f,
                    "unsupported operator '{op}' at {span}: only '=' is supported"
                )
            }
            Self::MalformedPlaceholder { text, span } => {
                write!(
                    f,
                    "malformed placeholder '{text}' at {span}: expected {{userId}} or {{user.<property>}}"
                )
            }
            Self::InvalidFieldName { name, span } => {
                write!(
                    f,
                    "invalid field reference '{name}' at {span}: must be snake_case [a-z][a-z0-9_]*"
                )
            }
            Self::UnexpectedToken {
                expected,
                found,
                span,
            } => {
                write!(
                    f,
                    "unexpected token at {span}: expected {expected}, found {found}"
                )
            }
            Self::UnexpectedEndOfInput { expected } => {
                write!(f, "unexpected end of input: expected {expected}")
            }
            Self::TrailingInput { found, span } => {
                write!(f, "trailing input at {span}: {found}")
            }
            Self::InvalidNumber { text, span } => {
                write!(f, "invalid numeric literal '{text}' at {span}")
            }
        }
    }
}

impl std::error::Error for ConditionError {}
