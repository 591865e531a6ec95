use std::fmt;

use rowguard_core::SchemaError;
use rowguard_dsl::ConditionError;

/// Which side of a field permission a rule governs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAccess {
    Read,
    Write,
}

impl FieldAccess {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl fmt::Display for FieldAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that abort a schema load.
///
/// All of these are load-time failures: they identify the offending table,
/// field, and condition string so the schema author can fix the source.
/// None of them is ever surfaced to an API caller.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum LoadError {
    /// Aggregate-level schema invariant violated (duplicate table, empty
    /// field list, ...).
    Schema(SchemaError),

    /// A condition string failed to parse.
    Condition {
        table: String,
        condition: String,
        source: ConditionError,
    },

    /// A condition references a field the table does not declare.
    UnknownFieldInCondition {
        table: String,
        field: String,
        condition: String,
    },

    /// A field permission entry names a column the table does not declare.
    UnknownFieldTarget { table: String, field: String },

    /// An owner rule names a column the table does not declare.
    UnknownOwnerField { table: String, field: String },

    /// Two field permission entries govern the same (field, access) pair.
    ConflictingRule {
        table: String,
        field: String,
        access: FieldAccess,
    },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema(source) => write!(f, "schema validation failed: {source}"),
            Self::Condition {
                table,
                condition,
                source,
            } => {
                write!(
                    f,
                    "invalid condition on table '{table}': {source} (in \"{condition}\")"
                )
            }
            Self::UnknownFieldInCondition {
                table,
                field,
                condition,
            } => {
                write!(
                    f,
                    "condition on table '{table}' references undefined field '{field}' (in \"{condition}\")"
                )
            }
            Self::UnknownFieldTarget { table, field } => {
                write!(
                    f,
                    "field permission on table '{table}' targets undefined field '{field}'"
                )
            }
            Self::UnknownOwnerField { table, field } => {
                write!(
                    f,
                    "owner rule on table '{table}' names undefined field '{field}'"
                )
            }
            Self::ConflictingRule {
                table,
                field,
                access,
            } => {
                write!(
                    f,
                    "conflicting {access} rules for field '{field}' on table '{table}'"
                )
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Schema(source) => Some(source),
            Self::Condition { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<SchemaError> for LoadError {
    fn from(e: SchemaError) -> Self {
        Self::Schema(e)
    }
}
