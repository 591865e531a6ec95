use rowguard_core::{FieldName, ScalarValue};
use tracing::trace;

use crate::ast::{BoolOp, CompareOp, ConditionExpr, ContextBinding, Operand};
use crate::error::ConditionError;
use crate::lexer::{tokenize, SpannedToken};
use crate::token::Token;

/// Recursive descent parser for the condition grammar:
///
/// ```text
/// expr       := comparison (("AND" | "OR") comparison)*
/// comparison := operand "=" operand
/// operand    := placeholder | fieldName | stringLiteral | numberLiteral | boolLiteral
/// ```
///
/// There is no operator precedence and no grouping: an AND/OR chain folds
/// strictly left to right, so `a AND b OR c` parses as `(a AND b) OR c`.
struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<SpannedToken>) -> Self {
        Self { tokens, pos: 0 }
    }

    // -- Cursor helpers --

    fn peek(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.pos)
    }

    fn peek_token(&self) -> Option<&Token> {
        self.peek().map(|st| &st.token)
    }

    fn advance(&mut self) -> Option<SpannedToken> {
        if self.pos < self.tokens.len() {
            let tok = self.tokens[self.pos].clone();
            self.pos += 1;
            Some(tok)
        } else {
            None
        }
    }

    // -- Grammar productions --

    /// expr = comparison (("AND" | "OR") comparison)*
    fn parse_expr(&mut self) -> Result<ConditionExpr, ConditionError> {
        let mut expr = self.parse_comparison()?;

        while let Some(token) = self.peek_token() {
            let op = match token {
                Token::And => BoolOp::And,
                Token::Or => BoolOp::Or,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            expr = ConditionExpr::Combine {
                op,
                left: Box::new(expr),
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    /// comparison = operand "=" operand
    fn parse_comparison(&mut self) -> Result<ConditionExpr, ConditionError> {
        let left = self.parse_operand()?;

        let op_tok = self.advance().ok_or(ConditionError::UnexpectedEndOfInput {
            expected: "'='".to_string(),
        })?;
        let op = match &op_tok.token {
            Token::Eq => CompareOp::Eq,
            t if t.is_unsupported_operator() => {
                return Err(ConditionError::UnsupportedOperator {
                    op: op_tok.text,
                    span: op_tok.span,
                });
            }
            t => {
                return Err(ConditionError::UnexpectedToken {
                    expected: "'='".to_string(),
                    found: format!("{} ('{}')", t.description(), op_tok.text),
                    span: op_tok.span,
                });
            }
        };

        let right = self.parse_operand()?;
        Ok(ConditionExpr::Compare { left, op, right })
    }

    /// operand = placeholder | fieldName | stringLiteral | numberLiteral | boolLiteral
    fn parse_operand(&mut self) -> Result<Operand, ConditionError> {
        let tok = self.advance().ok_or(ConditionError::UnexpectedEndOfInput {
            expected: "operand".to_string(),
        })?;

        match tok.token {
            Token::UserIdPlaceholder => Ok(Operand::Context(ContextBinding::UserId)),
            Token::UserPropertyPlaceholder => {
                // Token shape is "{user.<property>}"; the lexer guarantees
                // the property is a valid identifier.
                let property = tok.text["{user.".len()..tok.text.len() - 1].to_string();
                Ok(Operand::Context(ContextBinding::UserProperty(property)))
            }
            Token::BadPlaceholder => Err(ConditionError::MalformedPlaceholder {
                text: tok.text,
                span: tok.span,
            }),
            Token::Ident => {
                let name = FieldName::new(&tok.text).map_err(|_| {
                    ConditionError::InvalidFieldName {
                        name: tok.text.clone(),
                        span: tok.span.clone(),
                    }
                })?;
                Ok(Operand::Field(name))
            }
            Token::StringLiteral => Ok(Operand::Literal(ScalarValue::Text(unquote(&tok.text)))),
            Token::IntegerLiteral => {
                let value = tok.text.parse::<i64>().map_err(|_| {
                    ConditionError::InvalidNumber {
                        text: tok.text.clone(),
                        span: tok.span.clone(),
                    }
                })?;
                Ok(Operand::Literal(ScalarValue::Integer(value)))
            }
            Token::FloatLiteral => {
                let value = tok.text.parse::<f64>().map_err(|_| {
                    ConditionError::InvalidNumber {
                        text: tok.text.clone(),
                        span: tok.span.clone(),
                    }
                })?;
                Ok(Operand::Literal(ScalarValue::Float(value)))
            }
            Token::True => Ok(Operand::Literal(ScalarValue::Boolean(true))),
            Token::False => Ok(Operand::Literal(ScalarValue::Boolean(false))),
            t => Err(ConditionError::UnexpectedToken {
                expected: "operand (placeholder, field name, or literal)".to_string(),
                found: format!("{} ('{}')", t.description(), tok.text),
                span: tok.span,
            }),
        }
    }
}

/// Strips the surrounding quotes from a string literal and resolves
/// backslash escapes.
fn unquote(text: &str) -> String {
    let inner = &text[1..text.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Parses a condition string into a [`ConditionExpr`] tree.
///
/// Whole-string and single-pass: trailing input after a complete expression
/// is an error. Mixed AND/OR without grouping is accepted and folds left to
/// right (the grammar has no parentheses, so there is no way to override
/// the fold).
///
/// # Errors
///
/// Returns a [`ConditionError`] carrying the offending substring for any
/// unparseable input, including the unsupported `==` operator and malformed
/// placeholders. All failures occur at schema-load time.
pub fn parse(raw: &str) -> Result<ConditionExpr, ConditionError> {
    let tokens = tokenize(raw)?;
    let mut parser = Parser::new(tokens);
    let expr = parser.parse_expr()?;

    if let Some(extra) = parser.peek() {
        return Err(ConditionError::TrailingInput {
            found: format!("{} ('{}')", extra.token.description(), extra.text),
            span: extra.span.clone(),
        });
    }

    trace!(condition = raw, "condition parsed");
    Ok(expr)
}
