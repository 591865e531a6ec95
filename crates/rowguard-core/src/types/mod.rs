mod application;
mod field;
mod field_name;
mod field_type;
mod permission;
mod record_id;
mod scalar_value;
mod table_name;
mod table_schema;

pub use application::{ApplicationSchema, WorkspaceDefaults};
pub use field::Field;
pub use field_name::FieldName;
pub use field_type::FieldType;
pub use permission::{
    Action, FieldPermission, PermissionRule, RecordRule, TablePermissions,
};
pub use record_id::RecordId;
pub use scalar_value::ScalarValue;
pub use table_name::TableName;
pub use table_schema::TableSchema;
