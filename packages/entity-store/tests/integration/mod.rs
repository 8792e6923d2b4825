//! Integration test suite for the entity store.
//!
//! Exercises the registry façade end to end with wire DTOs:
//! 1. Record lifecycle (create/read/update/delete, counts)
//! 2. Criteria filtering
//! 3. DTO mapping and model validation

pub mod criteria_tests;
pub mod dto_tests;
pub mod helpers;
pub mod lifecycle_tests;
