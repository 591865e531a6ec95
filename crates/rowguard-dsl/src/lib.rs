//! # rowguard-dsl
//!
//! The rowguard condition mini-language: the string form in which
//! permission rules express row predicates, e.g.
//! `"{userId} = owner_id"` or
//! `"{user.department} = department AND status = 'active'"`.
//!
//! This crate provides:
//! - A lexer that tokenizes condition source strings
//! - A recursive descent parser that produces a typed [`ConditionExpr`] tree
//! - A printer that renders the canonical text form of a tree
//! - Round-trip fidelity: `parse(print(expr))` reproduces a parser-built tree
//!
//! Parsing is a pure function and every failure is a load-time failure;
//! nothing in here runs per request.
//!
//! # Example
//!
//! ```
//! use rowguard_dsl::{parse, print, ConditionExpr, BoolOp};
//!
//! let expr = parse("{user.department} = department AND status = 'active'").unwrap();
//! assert!(matches!(&expr, ConditionExpr::Combine { op: BoolOp::And, .. }));
//! assert_eq!(
//!     print(&expr),
//!     "{user.department} = department AND status = 'active'"
//! );
//! ```

pub mod ast;
pub mod error;
mod lexer;
pub mod parser;
pub mod printer;
pub mod token;

pub use ast::{BoolOp, CompareOp, ConditionExpr, ContextBinding, Operand};
pub use error::{ConditionError, Span};
pub use parser::parse;
pub use printer::print;
