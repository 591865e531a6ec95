use logos::Logos;

use crate::error::{ConditionError, Span};
use crate::token::Token;

/// A token paired with its source span and text.
#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
    pub text: String,
}

/// Tokenizes a condition string into a sequence of spanned tokens.
///
/// Condition strings are single expressions, so lexing fails fast on the
/// first byte sequence that matches no token rule.
///
/// # Errors
///
/// Returns `ConditionError::UnexpectedCharacter` carrying the offending
/// substring.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, ConditionError> {
    let mut tokens = Vec::new();

    let lexer = Token::lexer(source);
    for (result, range) in lexer.spanned() {
        let span = Span::new(range.start, range.end);
        match result {
            Ok(token) => {
                tokens.push(SpannedToken {
                    token,
                    span,
                    text: source[range].to_string(),
                });
            }
            Err(()) => {
                return Err(ConditionError::UnexpectedCharacter {
                    text: source[range].to_string(),
                    span,
                });
            }
        }
    }

    Ok(tokens)
}
