//! Per-entity-type row store.
//!
//! Each store has:
//! - A fixed schema shared with the DTO mapper and criteria engine
//! - Interior-mutable row storage (request-scoped lock, last-writer-wins)
//! - An atomic sequence generator for sequence-keyed entity types

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::RwLock;

use entity_model::{EntityId, EntitySchema, IdKind, Value};

use crate::criteria::Criteria;
use crate::error::StoreError;

use super::record::{EntityRecord, NewRecord, RecordPatch};
use super::validation::validate_required;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Sort target: the identifier or a scalar field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortTarget {
    Id,
    Field(String),
}

/// One `sort=field,dir` key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub target: SortTarget,
    pub descending: bool,
}

/// Page request applied after filtering and sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Zero-based page number
    pub number: usize,
    /// Page size in records
    pub size: usize,
}

/// Parses raw `sort=field,dir` parameters against the schema.
///
/// Direction defaults to ascending; unknown fields are rejected.
pub fn parse_sort_keys(schema: &EntitySchema, raw: &[String]) -> Result<Vec<SortKey>, StoreError> {
    let mut keys = Vec::with_capacity(raw.len());
    for entry in raw {
        let (field, dir) = match entry.split_once(',') {
            Some((field, dir)) => (field, dir),
            None => (entry.as_str(), "asc"),
        };
        let descending = match dir {
            "asc" => false,
            "desc" => true,
            other => {
                return Err(StoreError::InvalidSort {
                    key: entry.clone(),
                    detail: format!("unknown direction '{}'", other),
                });
            }
        };
        let target = if field == "id" {
            SortTarget::Id
        } else if schema.field(field).is_some() {
            SortTarget::Field(field.to_string())
        } else {
            return Err(StoreError::InvalidSort {
                key: entry.clone(),
                detail: format!("unknown field '{}'", field),
            });
        };
        keys.push(SortKey { target, descending });
    }
    Ok(keys)
}

/// Row store for one entity type.
#[derive(Debug)]
pub struct EntityStore {
    /// Entity schema
    schema: EntitySchema,
    /// Rows in insertion order
    rows: RwLock<Vec<EntityRecord>>,
    /// Next sequence identifier to assign
    next_seq: AtomicU64,
}

impl EntityStore {
    /// Creates an empty store for the given schema.
    pub fn new(schema: EntitySchema, initial_capacity: usize) -> Self {
        Self {
            schema,
            rows: RwLock::new(Vec::with_capacity(initial_capacity)),
            next_seq: AtomicU64::new(1), // Start IDs at 1
        }
    }

    /// Returns the schema of this store.
    pub fn schema(&self) -> &EntitySchema {
        &self.schema
    }

    /// Returns the number of persisted rows.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read_rows()?.len())
    }

    /// Returns `true` if the store holds no rows.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Inserts a new record, assigning a fresh identifier.
    ///
    /// # Arguments
    /// * `new` - Full record state; any caller-supplied id is rejected
    ///
    /// # Returns
    /// `Result<EntityRecord, StoreError>` containing the persisted record.
    pub fn insert(&self, new: NewRecord) -> Result<EntityRecord, StoreError> {
        if new.id.is_some() {
            return Err(StoreError::IdentityConflict {
                entity: self.schema.name.clone(),
                detail: "a new record must not carry an id".to_string(),
            });
        }
        validate_required(&self.schema, &new.fields, &new.refs)?;

        let record = EntityRecord {
            id: self.next_id(),
            fields: self.normalize_fields(new.fields),
            refs: self.normalize_refs(new.refs),
        };

        let mut rows = self.write_rows()?;
        rows.push(record.clone());
        Ok(record)
    }

    /// Point lookup by identifier.
    pub fn find(&self, id: EntityId) -> Result<EntityRecord, StoreError> {
        let rows = self.read_rows()?;
        rows.iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| self.not_found(id))
    }

    /// Returns `true` if a row with the given identifier exists.
    pub fn exists(&self, id: EntityId) -> Result<bool, StoreError> {
        Ok(self.read_rows()?.iter().any(|r| r.id == id))
    }

    /// Replaces all mutable fields of an existing record.
    pub fn replace(&self, id: EntityId, new: NewRecord) -> Result<EntityRecord, StoreError> {
        validate_required(&self.schema, &new.fields, &new.refs)?;

        let mut rows = self.write_rows()?;
        let index = rows
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| self.not_found(id))?;

        let record = EntityRecord {
            id,
            fields: self.normalize_fields(new.fields),
            refs: self.normalize_refs(new.refs),
        };
        rows[index] = record.clone();
        Ok(record)
    }

    /// Applies a merge-patch: only keys present in the patch change.
    ///
    /// An explicit null in the patch clears the field; clearing a required
    /// field fails validation and leaves the record untouched.
    pub fn merge_patch(&self, id: EntityId, patch: RecordPatch) -> Result<EntityRecord, StoreError> {
        let mut rows = self.write_rows()?;
        let index = rows
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| self.not_found(id))?;

        let mut merged = rows[index].clone();
        for (name, value) in patch.fields {
            merged.fields.insert(name, value);
        }
        for (name, value) in patch.refs {
            merged.refs.insert(name, value);
        }
        validate_required(&self.schema, &merged.fields, &merged.refs)?;

        rows[index] = merged.clone();
        Ok(merged)
    }

    /// Deletes a record. Deleting an absent id is an error.
    pub fn delete(&self, id: EntityId) -> Result<(), StoreError> {
        let mut rows = self.write_rows()?;
        let index = rows
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| self.not_found(id))?;
        rows.remove(index);
        Ok(())
    }

    /// Counts rows matching the criteria.
    pub fn count(&self, criteria: &Criteria) -> Result<u64, StoreError> {
        let rows = self.read_rows()?;
        Ok(Self::matched(&rows, criteria).len() as u64)
    }

    /// Selects rows matching the criteria, sorted and paged.
    ///
    /// # Returns
    /// The selected page of rows and the total match count before paging.
    pub fn select(
        &self,
        criteria: &Criteria,
        sort: &[SortKey],
        page: Option<Page>,
    ) -> Result<(Vec<EntityRecord>, u64), StoreError> {
        let rows = self.read_rows()?;
        let mut matched = Self::matched(&rows, criteria);
        let total = matched.len() as u64;

        if !sort.is_empty() {
            matched.sort_by(|a, b| compare_records(a, b, sort));
        }

        if let Some(page) = page {
            let start = page.number.saturating_mul(page.size).min(matched.len());
            let end = start.saturating_add(page.size).min(matched.len());
            matched = matched[start..end].to_vec();
        }

        Ok((matched, total))
    }

    #[cfg(not(feature = "parallel"))]
    fn matched(rows: &[EntityRecord], criteria: &Criteria) -> Vec<EntityRecord> {
        rows.iter().filter(|r| criteria.matches(r)).cloned().collect()
    }

    /// Parallel criteria evaluation; collection preserves row order.
    #[cfg(feature = "parallel")]
    fn matched(rows: &[EntityRecord], criteria: &Criteria) -> Vec<EntityRecord> {
        rows.par_iter()
            .filter(|r| criteria.matches(r))
            .cloned()
            .collect()
    }

    /// Assigns the next identifier for this store's id kind.
    fn next_id(&self) -> EntityId {
        match self.schema.id_kind {
            IdKind::Uuid => EntityId::random_uuid(),
            IdKind::Sequence => EntityId::Seq(self.next_seq.fetch_add(1, AtomicOrdering::SeqCst)),
        }
    }

    /// Fills entries for every schema field so each row is fully keyed.
    fn normalize_fields(
        &self,
        mut fields: BTreeMap<String, Option<Value>>,
    ) -> BTreeMap<String, Option<Value>> {
        for field in &self.schema.fields {
            fields.entry(field.name.clone()).or_insert(None);
        }
        fields
    }

    fn normalize_refs(
        &self,
        mut refs: BTreeMap<String, Option<EntityId>>,
    ) -> BTreeMap<String, Option<EntityId>> {
        for reference in &self.schema.references {
            refs.entry(reference.name.clone()).or_insert(None);
        }
        refs
    }

    fn not_found(&self, id: EntityId) -> StoreError {
        StoreError::RecordNotFound {
            entity: self.schema.name.clone(),
            id: id.to_string(),
        }
    }

    fn read_rows(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<EntityRecord>>, StoreError> {
        self.rows.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write_rows(&self) -> Result<std::sync::RwLockWriteGuard<'_, Vec<EntityRecord>>, StoreError> {
        self.rows.write().map_err(|_| StoreError::LockPoisoned)
    }
}

/// Compares two records by the given sort keys.
///
/// Null field values order after non-null values regardless of direction.
fn compare_records(a: &EntityRecord, b: &EntityRecord, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let ordering = match &key.target {
            SortTarget::Id => apply_direction(a.id.cmp(&b.id), key.descending),
            SortTarget::Field(name) => match (a.field(name), b.field(name)) {
                (Some(av), Some(bv)) => {
                    apply_direction(av.compare(bv).unwrap_or(Ordering::Equal), key.descending)
                }
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn apply_direction(ordering: Ordering, descending: bool) -> Ordering {
    if descending {
        ordering.reverse()
    } else {
        ordering
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entity_model::{EntitySchema, FieldKind};

    fn schema() -> EntitySchema {
        EntitySchema::builder("Widget", "widgets", IdKind::Sequence)
            .required_field("name", FieldKind::String)
            .field("weight", FieldKind::Integer)
            .build()
    }

    fn new_record(name: &str, weight: Option<i64>) -> NewRecord {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), Some(Value::String(name.to_string())));
        fields.insert("weight".to_string(), weight.map(Value::Integer));
        NewRecord {
            id: None,
            fields,
            refs: BTreeMap::new(),
        }
    }

    #[test]
    fn test_insert_assigns_sequence_ids() {
        let store = EntityStore::new(schema(), 16);
        let a = store.insert(new_record("a", None)).unwrap();
        let b = store.insert(new_record("b", None)).unwrap();
        assert_eq!(a.id, EntityId::Seq(1));
        assert_eq!(b.id, EntityId::Seq(2));
        assert_eq!(store.len().unwrap(), 2);
    }

    #[test]
    fn test_insert_rejects_preassigned_id() {
        let store = EntityStore::new(schema(), 16);
        let mut new = new_record("a", None);
        new.id = Some(EntityId::Seq(7));
        let err = store.insert(new).unwrap_err();
        assert!(matches!(err, StoreError::IdentityConflict { .. }));
        assert_eq!(store.len().unwrap(), 0);
    }

    #[test]
    fn test_insert_rejects_missing_required_field() {
        let store = EntityStore::new(schema(), 16);
        let new = NewRecord::default();
        let err = store.insert(new).unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }));
    }

    #[test]
    fn test_merge_patch_keeps_absent_fields() {
        let store = EntityStore::new(schema(), 16);
        let record = store.insert(new_record("a", Some(10))).unwrap();

        let mut patch = RecordPatch::default();
        patch
            .fields
            .insert("name".to_string(), Some(Value::String("b".to_string())));
        let merged = store.merge_patch(record.id, patch).unwrap();

        assert_eq!(merged.field("name"), Some(&Value::String("b".to_string())));
        assert_eq!(merged.field("weight"), Some(&Value::Integer(10)));
    }

    #[test]
    fn test_merge_patch_null_clears_optional_field() {
        let store = EntityStore::new(schema(), 16);
        let record = store.insert(new_record("a", Some(10))).unwrap();

        let mut patch = RecordPatch::default();
        patch.fields.insert("weight".to_string(), None);
        let merged = store.merge_patch(record.id, patch).unwrap();
        assert_eq!(merged.field("weight"), None);
    }

    #[test]
    fn test_merge_patch_cannot_clear_required_field() {
        let store = EntityStore::new(schema(), 16);
        let record = store.insert(new_record("a", None)).unwrap();

        let mut patch = RecordPatch::default();
        patch.fields.insert("name".to_string(), None);
        let err = store.merge_patch(record.id, patch).unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }));

        // record unchanged
        let unchanged = store.find(record.id).unwrap();
        assert_eq!(unchanged.field("name"), Some(&Value::String("a".to_string())));
    }

    #[test]
    fn test_delete_removes_exactly_once() {
        let store = EntityStore::new(schema(), 16);
        let record = store.insert(new_record("a", None)).unwrap();
        assert_eq!(store.len().unwrap(), 1);

        store.delete(record.id).unwrap();
        assert_eq!(store.len().unwrap(), 0);

        let err = store.delete(record.id).unwrap_err();
        assert!(matches!(err, StoreError::RecordNotFound { .. }));
    }

    #[test]
    fn test_select_sorts_and_pages() {
        let store = EntityStore::new(schema(), 16);
        for (name, weight) in [("c", 3), ("a", 1), ("b", 2)] {
            store.insert(new_record(name, Some(weight))).unwrap();
        }

        let sort = parse_sort_keys(store.schema(), &["name,asc".to_string()]).unwrap();
        let (rows, total) = store
            .select(&Criteria::empty(), &sort, Some(Page { number: 0, size: 2 }))
            .unwrap();
        assert_eq!(total, 3);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].field("name"), Some(&Value::String("a".to_string())));
        assert_eq!(rows[1].field("name"), Some(&Value::String("b".to_string())));
    }

    #[test]
    fn test_sort_nulls_order_last() {
        let store = EntityStore::new(schema(), 16);
        store.insert(new_record("a", None)).unwrap();
        store.insert(new_record("b", Some(5))).unwrap();

        let sort = parse_sort_keys(store.schema(), &["weight,desc".to_string()]).unwrap();
        let (rows, _) = store.select(&Criteria::empty(), &sort, None).unwrap();
        assert_eq!(rows[0].field("name"), Some(&Value::String("b".to_string())));
        assert_eq!(rows[1].field("name"), Some(&Value::String("a".to_string())));
    }

    #[test]
    fn test_parse_sort_keys_rejects_unknown_field() {
        let err = parse_sort_keys(&schema(), &["bogus,asc".to_string()]).unwrap_err();
        assert!(matches!(err, StoreError::InvalidSort { .. }));
    }
}
