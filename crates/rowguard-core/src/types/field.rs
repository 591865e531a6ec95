use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

use super::field_name::FieldName;
use super::field_type::FieldType;
use super::scalar_value::ScalarValue;

/// A column declaration: name, type, and storage hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: FieldName,
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub indexed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ScalarValue>,
}

impl Field {
    /// Creates a plain optional field with no default.
    pub fn new(name: FieldName, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            required: false,
            indexed: false,
            default: None,
        }
    }

    /// Marks the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks the field as indexed.
    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    /// Attaches a default value, validating it against the field type.
    pub fn with_default(mut self, default: ScalarValue) -> Result<Self, SchemaError> {
        if !default.matches_type(&self.field_type) {
            return Err(SchemaError::DefaultTypeMismatch {
                field: self.name.to_string(),
                expected: self.field_type.name().to_string(),
                actual: default.type_name().to_string(),
            });
        }
        self.default = Some(default);
        Ok(self)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.field_type)?;
        if self.required {
            write!(f, " required")?;
        }
        if self.indexed {
            write!(f, " indexed")?;
        }
        if let Some(default) = &self.default {
            write!(f, " default({default})")?;
        }
        Ok(())
    }
}
