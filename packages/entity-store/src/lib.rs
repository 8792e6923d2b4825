//! In-memory entity store with criteria filtering.
//!
//! Stores typed entity records per entity type, maps them to and from flat
//! wire DTOs, and evaluates `field.operator=value` criteria filters as a
//! typed predicate AST.

pub mod config;
pub mod criteria;
pub mod dto;
pub mod entity;
pub mod error;
pub mod registry;

pub use config::StoreConfig;
pub use entity::{EntityRecord, EntityStore, NewRecord, Page, RecordPatch, SortKey};
pub use error::StoreError;
pub use registry::{ListOptions, Registry};
