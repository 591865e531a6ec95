use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SchemaError;

use super::permission::{Action, PermissionRule};
use super::table_name::TableName;
use super::table_schema::TableSchema;

/// Workspace-level fallback rules, one optional rule per action.
///
/// A table whose permission surface omits a table-level rule for an action
/// inherits the default here; if both are absent the action is
/// unrestricted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkspaceDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<PermissionRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<PermissionRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<PermissionRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<PermissionRule>,
}

impl WorkspaceDefaults {
    /// Returns the default rule for an action, if one was declared.
    pub fn rule_for(&self, action: Action) -> Option<&PermissionRule> {
        match action {
            Action::Read => self.read.as_ref(),
            Action::Create => self.create.as_ref(),
            Action::Update => self.update.as_ref(),
            Action::Delete => self.delete.as_ref(),
        }
    }
}

/// The whole declarative schema for one application: tables plus workspace
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationSchema {
    pub tables: Vec<TableSchema>,
    #[serde(default)]
    pub defaults: WorkspaceDefaults,
}

impl ApplicationSchema {
    /// Creates a new `ApplicationSchema`, validating table uniqueness and
    /// per-table invariants.
    pub fn new(
        tables: Vec<TableSchema>,
        defaults: WorkspaceDefaults,
    ) -> Result<Self, SchemaError> {
        let schema = Self { tables, defaults };
        schema.validate()?;
        Ok(schema)
    }

    /// Parses an application schema from JSON and validates it.
    pub fn from_json(source: &str) -> Result<Self, SchemaError> {
        let schema: Self =
            serde_json::from_str(source).map_err(|e| SchemaError::InvalidJson(e.to_string()))?;
        schema.validate()?;
        debug!(tables = schema.tables.len(), "application schema parsed");
        Ok(schema)
    }

    /// Re-checks construction invariants across the whole application.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut seen = HashSet::with_capacity(self.tables.len());
        for table in &self.tables {
            if !seen.insert(table.name.as_str()) {
                return Err(SchemaError::DuplicateTable(table.name.to_string()));
            }
            table.check_invariants()?;
        }
        Ok(())
    }

    /// Looks up a table by name.
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name.as_str() == name)
    }

    /// The effective table-level rule for (table, action): the table's own
    /// rule if declared, else the workspace default, else `None`
    /// (unrestricted).
    pub fn effective_rule<'a>(
        &'a self,
        table: &'a TableSchema,
        action: Action,
    ) -> Option<&'a PermissionRule> {
        table
            .permissions
            .rule_for(action)
            .or_else(|| self.defaults.rule_for(action))
    }
}
