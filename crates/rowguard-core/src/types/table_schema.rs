use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

use super::field::Field;
use super::permission::TablePermissions;
use super::table_name::TableName;

/// A complete table declaration: name, columns, and permission surface.
///
/// Immutable once compiled; identified by name within an application schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: TableName,
    pub fields: Vec<Field>,
    #[serde(default)]
    pub permissions: TablePermissions,
}

impl TableSchema {
    /// Creates a new `TableSchema`, validating:
    /// - fields is non-empty
    /// - no duplicate field names
    pub fn new(
        name: TableName,
        fields: Vec<Field>,
        permissions: TablePermissions,
    ) -> Result<Self, SchemaError> {
        let schema = Self {
            name,
            fields,
            permissions,
        };
        schema.check_invariants()?;
        Ok(schema)
    }

    /// Re-checks the construction invariants.
    ///
    /// Deserialization bypasses [`TableSchema::new`], so loaders call this
    /// before handing the schema to the compiler.
    pub fn check_invariants(&self) -> Result<(), SchemaError> {
        if self.fields.is_empty() {
            return Err(SchemaError::EmptyFields {
                table: self.name.to_string(),
            });
        }
        let mut seen = HashSet::with_capacity(self.fields.len());
        for f in &self.fields {
            if !seen.insert(f.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    table: self.name.to_string(),
                    field: f.name.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name.as_str() == name)
    }

    /// Returns true if the table declares a field with this name.
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}
