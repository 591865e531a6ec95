//! # rowguard-core
//!
//! Validated schema and permission model for the rowguard policy compiler.
//!
//! This crate defines the declarative input side of the system: tables,
//! fields, and the permission rules attached to them. Everything here is
//! constructor-validated and immutable once built; the policy compiler in
//! `rowguard-policy` consumes these types and never mutates them.

pub mod error;
pub mod types;

pub use error::SchemaError;
pub use types::{
    Action, ApplicationSchema, Field, FieldName, FieldPermission, FieldType, PermissionRule,
    RecordId, RecordRule, ScalarValue, TableName, TablePermissions, TableSchema,
    WorkspaceDefaults,
};
