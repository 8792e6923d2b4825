//! Entity records and the per-type row store.

mod record;
mod store;
mod validation;

pub use record::{EntityRecord, NewRecord, RecordPatch};
pub use store::{EntityStore, Page, SortKey, SortTarget, parse_sort_keys};
