//! HTTP endpoint implementations for entity CRUD and queries.

pub mod crud_handlers;
pub mod query_handlers;
pub mod request_utils;
pub mod response;

pub use crud_handlers::{
    create_record, delete_record, patch_record, read_record, replace_record,
};
pub use query_handlers::{count_records, list_records};
pub use response::{error_response, ApiError, ErrorResponse};
