use serde::{Deserialize, Serialize};

/// The storage type of a table column.
///
/// DDL generation for these types lives outside this crate; the policy
/// compiler only needs the type for default validation and for rejecting
/// coerced comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum FieldType {
    Text,
    Integer,
    Float,
    Boolean,
    DateTime,
    Json,
}

impl FieldType {
    /// Returns the type name as used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Integer => "Integer",
            Self::Float => "Float",
            Self::Boolean => "Boolean",
            Self::DateTime => "DateTime",
            Self::Json => "Json",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
