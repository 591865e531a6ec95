use serde::{Deserialize, Serialize};

use super::field_type::FieldType;

/// Runtime scalar value for a field or a condition literal.
///
/// Comparison semantics are exact: values of different variants never
/// compare equal, and no coercion is performed across types (a `Text`
/// `'draft'` never matches an `Integer` column).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
#[non_exhaustive]
pub enum ScalarValue {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(chrono::DateTime<chrono::Utc>),
}

impl ScalarValue {
    /// Returns the type name of this value, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Text(_) => "Text",
            Self::Integer(_) => "Integer",
            Self::Float(_) => "Float",
            Self::Boolean(_) => "Boolean",
            Self::DateTime(_) => "DateTime",
        }
    }

    /// Returns true if this value is a legal instance of the given field type.
    ///
    /// `Null` matches every type. `Json` fields accept no scalar value other
    /// than `Null`.
    pub fn matches_type(&self, field_type: &FieldType) -> bool {
        matches!(
            (self, field_type),
            (Self::Null, _)
                | (Self::Text(_), FieldType::Text)
                | (Self::Integer(_), FieldType::Integer)
                | (Self::Float(_), FieldType::Float)
                | (Self::Boolean(_), FieldType::Boolean)
                | (Self::DateTime(_), FieldType::DateTime)
        )
    }
}

impl std::fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Text(s) => write!(f, "'{s}'"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
        }
    }
}
