use std::fmt;

use rowguard_core::Action;

/// Why the capability gate (or a create-time row check) denied a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DenyCause {
    /// The rule requires an identity and the caller has none.
    NotAuthenticated,
    /// The caller holds none of the required roles.
    MissingRole,
    /// A create-time row condition rejected the new record.
    RowCondition,
}

impl DenyCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "not_authenticated",
            Self::MissingRole => "missing_role",
            Self::RowCondition => "row_condition",
        }
    }
}

impl fmt::Display for DenyCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a denial is surfaced to the caller for a given table.
///
/// `NotFound` masks cross-tenant existence: a denied request gets the
/// not-found shape instead of access-denied, preventing enumeration.
/// Configurable per table, default `Forbidden`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DenyMasking {
    #[default]
    Forbidden,
    NotFound,
}

/// Request-time enforcement failures.
///
/// These are terminal decisions returned to the embedding request layer,
/// which maps `error_kind()` to its own status/shape convention. They are
/// never thrown into business logic, and none of them is retryable.
///
/// Silent row exclusion on update/delete is deliberately *not* here: a
/// row failing its predicate surfaces as zero rows affected (see
/// [`crate::filter::WriteOutcome`]), not as an error.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum EnforceError {
    /// The gate denied the request before any storage access.
    AuthorizationDenied {
        table: String,
        action: Action,
        cause: DenyCause,
        masking: DenyMasking,
    },
    /// The payload sets a column the caller's write rule forbids. The
    /// whole write is rejected; nothing is partially applied.
    FieldWriteForbidden { table: String, field: String },
    /// The named table is not in the compiled policy set.
    UnknownTable { table: String },
    /// The payload names a column the table does not declare.
    UnknownColumn { table: String, field: String },
    /// A required field with no default is absent from a create payload.
    MissingRequiredField { table: String, field: String },
}

impl EnforceError {
    /// Returns the error kind string the embedding layer keys its
    /// response shapes on. Denials masked as `NotFound` report
    /// `"not_found"` here.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::AuthorizationDenied { masking, .. } => match masking {
                DenyMasking::Forbidden => "access_denied",
                DenyMasking::NotFound => "not_found",
            },
            Self::FieldWriteForbidden { .. } => "field_write_forbidden",
            Self::UnknownTable { .. } => "unknown_table",
            Self::UnknownColumn { .. } => "unknown_column",
            Self::MissingRequiredField { .. } => "missing_required_field",
        }
    }
}

impl fmt::Display for EnforceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AuthorizationDenied {
                table,
                action,
                cause,
                ..
            } => {
                write!(f, "access denied: {action} on table '{table}' ({cause})")
            }
            Self::FieldWriteForbidden { table, field } => {
                write!(
                    f,
                    "write to field '{field}' on table '{table}' is not permitted"
                )
            }
            Self::UnknownTable { table } => {
                write!(f, "table '{table}' is not in the compiled policy set")
            }
            Self::UnknownColumn { table, field } => {
                write!(f, "table '{table}' has no column '{field}'")
            }
            Self::MissingRequiredField { table, field } => {
                write!(
                    f,
                    "required field '{field}' on table '{table}' is missing"
                )
            }
        }
    }
}

impl std::error::Error for EnforceError {}
