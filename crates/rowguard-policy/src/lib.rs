//! # rowguard-policy
//!
//! The policy compiler: lowers validated table schemas and parsed
//! permission conditions into storage-level predicates and a compiled,
//! immutable policy set.
//!
//! Compilation is a one-shot, fail-fast pass executed at schema load time.
//! Any syntax error, dangling field reference, or conflicting rule aborts
//! the whole load; no partial policy set is ever installed. The compiled
//! set is read-only afterwards, and [`PolicyStore`] swaps whole sets
//! atomically on reload.

pub mod compile;
pub mod error;
pub mod expr;
pub mod set;
pub mod sql;
pub mod store;

pub use compile::compile_application;
pub use error::{FieldAccess, LoadError};
pub use expr::{PolicyExpr, PolicyOperand, RuleCheck};
pub use set::{CompiledFieldRule, CompiledPolicy, PolicySet, TablePolicies};
pub use sql::{BindValue, SqlPredicate};
pub use store::PolicyStore;
