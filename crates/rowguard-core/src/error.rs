use std::fmt;

/// Errors that occur when constructing or validating schema types.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchemaError {
    /// Table name failed snake_case validation.
    InvalidTableName(String),
    /// Field name failed snake_case validation.
    InvalidFieldName(String),
    /// Table definition has no fields.
    EmptyFields { table: String },
    /// Duplicate field name within a table.
    DuplicateField { table: String, field: String },
    /// Duplicate table name within an application schema.
    DuplicateTable(String),
    /// A field default does not match the field's declared type.
    DefaultTypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },
    /// Application schema JSON could not be deserialized.
    InvalidJson(String),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTableName(s) => {
                write!(
                    f,
                    "invalid table name '{s}': must be snake_case [a-z][a-z0-9_]*"
                )
            }
            Self::InvalidFieldName(s) => {
                write!(
                    f,
                    "invalid field name '{s}': must be snake_case [a-z][a-z0-9_]*"
                )
            }
            Self::EmptyFields { table } => {
                write!(f, "table '{table}' must declare at least one field")
            }
            Self::DuplicateField { table, field } => {
                write!(f, "duplicate field '{field}' in table '{table}'")
            }
            Self::DuplicateTable(name) => {
                write!(f, "duplicate table '{name}' in application schema")
            }
            Self::DefaultTypeMismatch {
                field,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "default for field '{field}' has type {actual}, expected {expected}"
                )
            }
            Self::InvalidJson(msg) => {
                write!(f, "invalid application schema JSON: {msg}")
            }
        }
    }
}

impl std::error::Error for SchemaError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let cases = vec![
            (
                SchemaError::InvalidTableName("Docs".into()),
                "invalid table name 'Docs'",
            ),
            (
                SchemaError::InvalidFieldName("OwnerId".into()),
                "invalid field name 'OwnerId'",
            ),
            (
                SchemaError::EmptyFields {
                    table: "documents".into(),
                },
                "table 'documents' must declare at least one field",
            ),
            (
                SchemaError::DuplicateField {
                    table: "documents".into(),
                    field: "title".into(),
                },
                "duplicate field 'title' in table 'documents'",
            ),
            (
                SchemaError::DuplicateTable("documents".into()),
                "duplicate table 'documents'",
            ),
            (
                SchemaError::DefaultTypeMismatch {
                    field: "count".into(),
                    expected: "Integer".into(),
                    actual: "Text".into(),
                },
                "default for field 'count'",
            ),
        ];

        for (error, expected_prefix) in cases {
            let msg = error.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error display for {error:?} = '{msg}', expected to start with '{expected_prefix}'"
            );
        }
    }

    #[test]
    fn error_is_std_error() {
        let err: Box<dyn std::error::Error> =
            Box::new(SchemaError::DuplicateTable("tasks".into()));
        assert!(err.to_string().contains("tasks"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SchemaError>();
    }
}
