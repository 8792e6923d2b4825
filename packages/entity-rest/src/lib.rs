//! REST API server for the in-memory entity store.
//!
//! Exposes each registered entity type as a `/api/{resource}` collection
//! with CRUD, criteria filtering, pagination, and count endpoints.

pub mod handlers;
pub mod router;
pub mod server;
