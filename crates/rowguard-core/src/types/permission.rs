use serde::{Deserialize, Serialize};

use super::field_name::FieldName;

/// The four operations a permission rule can govern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    /// All actions, in a fixed order the compiler iterates over.
    pub const ALL: [Action; 4] = [Self::Read, Self::Create, Self::Update, Self::Delete];

    /// Returns the action name as used in schema JSON and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single permission rule. Exactly one variant is active per instance.
///
/// `Custom` carries the raw condition source; it is parsed and validated by
/// the condition language at schema-load time, never at request time.
/// The compiler matches this union exhaustively, so a new variant fails to
/// compile until every lowering site handles it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PermissionRule {
    /// Anyone, authenticated or not.
    Public,
    /// Any caller with a session.
    Authenticated,
    /// Callers holding at least one of the listed roles.
    Roles { roles: Vec<String> },
    /// Shorthand for "the named column equals the caller's user id".
    Owner { field: FieldName },
    /// A condition string in the rowguard condition language.
    Custom { condition: String },
}

impl PermissionRule {
    /// Returns the rule kind as a string, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Authenticated => "authenticated",
            Self::Roles { .. } => "roles",
            Self::Owner { .. } => "owner",
            Self::Custom { .. } => "custom",
        }
    }
}

/// Per-column read/write restriction.
///
/// `field` must name a declared column; a dangling reference fails the
/// whole schema load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldPermission {
    pub field: FieldName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<PermissionRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write: Option<PermissionRule>,
}

/// A row-predicate condition attached to one action.
///
/// Multiple entries for the same action compose with logical AND; OR across
/// alternatives must be written inside a single condition string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordRule {
    pub action: Action,
    pub condition: String,
}

/// The full permission surface of one table.
///
/// Any part may be absent: an absent table-level rule inherits the
/// workspace default (or "unrestricted" if no default exists), and empty
/// `fields`/`records` lists simply add no further narrowing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TablePermissions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<PermissionRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<PermissionRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<PermissionRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<PermissionRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldPermission>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<RecordRule>,
}

impl TablePermissions {
    /// Returns the table-level rule for an action, if one was declared.
    pub fn rule_for(&self, action: Action) -> Option<&PermissionRule> {
        match action {
            Action::Read => self.read.as_ref(),
            Action::Create => self.create.as_ref(),
            Action::Update => self.update.as_ref(),
            Action::Delete => self.delete.as_ref(),
        }
    }

    /// Returns the record rules declared for an action, in declaration order.
    pub fn records_for(&self, action: Action) -> impl Iterator<Item = &RecordRule> {
        self.records.iter().filter(move |r| r.action == action)
    }
}
