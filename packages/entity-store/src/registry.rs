//! Entity type registry and operation façade.
//!
//! Owns one [`EntityStore`] per entity type, validated and frozen at
//! construction. All REST-facing operations go through this façade, which
//! speaks wire DTOs (`serde_json::Value`) and raw query parameters.

use std::collections::{HashMap, HashSet};

use entity_model::{reference_key, EntityId, EntityModel, EntitySchema};
use serde_json::Value as Json;
use tracing::debug;

use crate::config::StoreConfig;
use crate::criteria::Criteria;
use crate::dto;
use crate::entity::{parse_sort_keys, EntityStore, Page, RecordPatch};
use crate::error::StoreError;

/// List request options, split out of the query string by the caller.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Remaining `field.operator=value` criteria pairs
    pub filters: Vec<(String, String)>,
    /// Raw `sort` parameter values, in order
    pub sort: Vec<String>,
    /// Zero-based page number
    pub page: Option<usize>,
    /// Requested page size
    pub size: Option<usize>,
}

/// Immutable set of entity stores for one server instance.
#[derive(Debug)]
pub struct Registry {
    config: StoreConfig,
    /// Stores by entity type name
    stores: HashMap<String, EntityStore>,
    /// Resource path segment to entity type name
    resources: HashMap<String, String>,
}

impl Registry {
    /// Builds a registry from an entity model.
    ///
    /// Rejects duplicate entity types and resources, wire key collisions,
    /// references to unknown entity types, and cycles in the
    /// required-reference graph (which would make create unsatisfiable).
    pub fn from_model(model: EntityModel, config: StoreConfig) -> Result<Self, StoreError> {
        let mut stores = HashMap::with_capacity(model.entities.len());
        let mut resources = HashMap::with_capacity(model.entities.len());

        for schema in &model.entities {
            if stores.contains_key(&schema.name) {
                return Err(StoreError::DuplicateEntityType(schema.name.clone()));
            }
            if resources.contains_key(&schema.resource) {
                return Err(StoreError::DuplicateResource(schema.resource.clone()));
            }
            check_wire_keys(schema)?;
            resources.insert(schema.resource.clone(), schema.name.clone());
            stores.insert(
                schema.name.clone(),
                EntityStore::new(schema.clone(), config.initial_capacity),
            );
        }

        for schema in &model.entities {
            for reference in &schema.references {
                if !stores.contains_key(&reference.target) {
                    return Err(StoreError::UnknownReferenceTarget {
                        entity: schema.name.clone(),
                        reference: reference.name.clone(),
                        target: reference.target.clone(),
                    });
                }
            }
        }

        check_required_reference_cycles(&model)?;

        debug!(entity_types = model.entities.len(), "registry built");
        Ok(Self {
            config,
            stores,
            resources,
        })
    }

    /// Returns the store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns the registered entity schemas, in no particular order.
    pub fn schemas(&self) -> impl Iterator<Item = &EntitySchema> {
        self.stores.values().map(EntityStore::schema)
    }

    /// Creates a record from a DTO body. The body must not carry an id.
    pub fn insert(&self, resource: &str, body: &Json) -> Result<Json, StoreError> {
        let store = self.store(resource)?;
        let new = dto::from_dto(store.schema(), body)?;
        self.check_references(store.schema(), &new.refs)?;
        let record = store.insert(new)?;
        debug!(entity = %store.schema().name, id = %record.id, "record created");
        Ok(dto::to_dto(
            store.schema(),
            record.id,
            &record.fields,
            &record.refs,
        ))
    }

    /// Point lookup by raw path identifier.
    pub fn find(&self, resource: &str, raw_id: &str) -> Result<Json, StoreError> {
        let store = self.store(resource)?;
        let id = self.parse_path_id(store.schema(), raw_id)?;
        let record = store.find(id)?;
        Ok(dto::to_dto(
            store.schema(),
            record.id,
            &record.fields,
            &record.refs,
        ))
    }

    /// Full replacement of an existing record.
    ///
    /// The body id is required and must equal the path id.
    pub fn replace(&self, resource: &str, raw_id: &str, body: &Json) -> Result<Json, StoreError> {
        let store = self.store(resource)?;
        let id = self.parse_path_id(store.schema(), raw_id)?;
        let new = dto::from_dto(store.schema(), body)?;
        match new.id {
            Some(body_id) if body_id == id => {}
            Some(body_id) => {
                return Err(self.id_mismatch(store.schema(), id, body_id));
            }
            None => {
                return Err(StoreError::IdentityConflict {
                    entity: store.schema().name.clone(),
                    detail: "full update body must carry the record id".to_string(),
                });
            }
        }
        self.check_references(store.schema(), &new.refs)?;
        let record = store.replace(id, new)?;
        debug!(entity = %store.schema().name, id = %record.id, "record replaced");
        Ok(dto::to_dto(
            store.schema(),
            record.id,
            &record.fields,
            &record.refs,
        ))
    }

    /// Merge-patch of an existing record.
    ///
    /// A body id is optional but must equal the path id when present.
    pub fn merge_patch(
        &self,
        resource: &str,
        raw_id: &str,
        body: &Json,
    ) -> Result<Json, StoreError> {
        let store = self.store(resource)?;
        let id = self.parse_path_id(store.schema(), raw_id)?;
        let patch = dto::patch_from_dto(store.schema(), body)?;
        if let Some(body_id) = patch.id {
            if body_id != id {
                return Err(self.id_mismatch(store.schema(), id, body_id));
            }
        }
        self.check_patched_references(store.schema(), &patch)?;
        let record = store.merge_patch(id, patch)?;
        debug!(entity = %store.schema().name, id = %record.id, "record patched");
        Ok(dto::to_dto(
            store.schema(),
            record.id,
            &record.fields,
            &record.refs,
        ))
    }

    /// Deletes a record by raw path identifier.
    pub fn delete(&self, resource: &str, raw_id: &str) -> Result<(), StoreError> {
        let store = self.store(resource)?;
        let id = self.parse_path_id(store.schema(), raw_id)?;
        store.delete(id)?;
        debug!(entity = %store.schema().name, %id, "record deleted");
        Ok(())
    }

    /// Counts records matching the criteria pairs.
    pub fn count(&self, resource: &str, filters: &[(String, String)]) -> Result<u64, StoreError> {
        let store = self.store(resource)?;
        let criteria = Criteria::parse(store.schema(), filters)?;
        store.count(&criteria)
    }

    /// Lists records matching the options, paged and sorted.
    ///
    /// # Returns
    /// The selected page of DTOs and the total match count before paging.
    pub fn list(&self, resource: &str, options: &ListOptions) -> Result<(Vec<Json>, u64), StoreError> {
        let store = self.store(resource)?;
        let criteria = Criteria::parse(store.schema(), &options.filters)?;
        let sort = parse_sort_keys(store.schema(), &options.sort)?;

        let size = options
            .size
            .unwrap_or(self.config.default_page_size)
            .min(self.config.max_page_size);
        let page = Page {
            number: options.page.unwrap_or(0),
            size,
        };

        let (records, total) = store.select(&criteria, &sort, Some(page))?;
        let dtos = records
            .iter()
            .map(|r| dto::to_dto(store.schema(), r.id, &r.fields, &r.refs))
            .collect();
        Ok((dtos, total))
    }

    fn store(&self, resource: &str) -> Result<&EntityStore, StoreError> {
        let name = self
            .resources
            .get(resource)
            .ok_or_else(|| StoreError::ResourceNotFound {
                resource: resource.to_string(),
            })?;
        // Both maps are built from the same model and never change.
        self.stores
            .get(name)
            .ok_or(StoreError::LockPoisoned)
    }

    fn parse_path_id(&self, schema: &EntitySchema, raw: &str) -> Result<EntityId, StoreError> {
        EntityId::parse(schema.id_kind, raw).map_err(|_| StoreError::InvalidId {
            entity: schema.name.clone(),
            id: raw.to_string(),
        })
    }

    fn id_mismatch(&self, schema: &EntitySchema, path: EntityId, body: EntityId) -> StoreError {
        StoreError::IdentityConflict {
            entity: schema.name.clone(),
            detail: format!("body id '{}' does not match path id '{}'", body, path),
        }
    }

    /// Verifies that every set reference points at an existing record.
    ///
    /// Referential integrity is checked at write time only. No lock spans
    /// both stores, so a delete of the target row after this check leaves
    /// a dangling reference id. Requests are independent and
    /// last-writer-wins; deletes do not cascade.
    fn check_references(
        &self,
        schema: &EntitySchema,
        refs: &std::collections::BTreeMap<String, Option<EntityId>>,
    ) -> Result<(), StoreError> {
        for reference in &schema.references {
            let Some(Some(target_id)) = refs.get(&reference.name) else {
                continue;
            };
            let target = self
                .stores
                .get(&reference.target)
                .ok_or(StoreError::LockPoisoned)?;
            if !target.exists(*target_id)? {
                return Err(StoreError::Validation {
                    entity: schema.name.clone(),
                    detail: format!(
                        "referenced {} with id '{}' does not exist",
                        reference.target, target_id
                    ),
                });
            }
        }
        Ok(())
    }

    fn check_patched_references(
        &self,
        schema: &EntitySchema,
        patch: &RecordPatch,
    ) -> Result<(), StoreError> {
        self.check_references(schema, &patch.refs)
    }
}

/// Rejects field and reference wire keys that collide within one entity.
fn check_wire_keys(schema: &EntitySchema) -> Result<(), StoreError> {
    let mut seen = HashSet::with_capacity(1 + schema.fields.len() + schema.references.len());
    seen.insert("id".to_string());
    for field in &schema.fields {
        if !seen.insert(field.name.clone()) {
            return Err(StoreError::DuplicateKey {
                entity: schema.name.clone(),
                key: field.name.clone(),
            });
        }
    }
    for reference in &schema.references {
        if !seen.insert(reference_key(&reference.name)) {
            return Err(StoreError::DuplicateKey {
                entity: schema.name.clone(),
                key: reference_key(&reference.name),
            });
        }
    }
    Ok(())
}

/// Rejects cycles in the required-reference graph.
///
/// A record cannot be created before its required reference targets exist,
/// so a required-reference cycle would make every entity type on the cycle
/// impossible to populate.
fn check_required_reference_cycles(model: &EntityModel) -> Result<(), StoreError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        InProgress,
        Done,
    }

    fn visit(
        entity: &str,
        edges: &HashMap<&str, Vec<&str>>,
        marks: &mut HashMap<String, Mark>,
        path: &mut Vec<String>,
    ) -> Result<(), StoreError> {
        match marks.get(entity) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => {
                let start = path.iter().position(|p| p == entity).unwrap_or(0);
                let mut cycle: Vec<&str> = path[start..].iter().map(String::as_str).collect();
                cycle.push(entity);
                return Err(StoreError::RequiredReferenceCycle {
                    cycle: cycle.join(" -> "),
                });
            }
            None => {}
        }

        marks.insert(entity.to_string(), Mark::InProgress);
        path.push(entity.to_string());
        for target in edges.get(entity).into_iter().flatten() {
            visit(target, edges, marks, path)?;
        }
        path.pop();
        marks.insert(entity.to_string(), Mark::Done);
        Ok(())
    }

    let mut edges: HashMap<&str, Vec<&str>> = HashMap::new();
    for schema in &model.entities {
        let targets = schema
            .references
            .iter()
            .filter(|r| r.required)
            .map(|r| r.target.as_str())
            .collect();
        edges.insert(schema.name.as_str(), targets);
    }

    let mut marks = HashMap::new();
    let mut path = Vec::new();
    for schema in &model.entities {
        visit(&schema.name, &edges, &mut marks, &mut path)?;
    }
    Ok(())
}
