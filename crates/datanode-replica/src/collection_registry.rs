//! Set of collections owned by a datanode.
//!
//! Collections are few and change rarely, so they live in an insertion-ordered
//! `Vec` and every lookup is a linear scan. Name lookups resolve to the first
//! collection registered under that name.

use datanode_core::{
    Collection, CollectionId, CollectionSchema, CoreError, CoreResult, DuplicatePolicy,
};
use tracing::{info, warn};

#[derive(Debug)]
pub struct CollectionRegistry {
    collections: Vec<Collection>,
    duplicate_policy: DuplicatePolicy,
}

impl CollectionRegistry {
    /// Creates an empty registry rejecting duplicate ids.
    pub fn new() -> Self {
        Self::with_capacity(0, DuplicatePolicy::Reject)
    }

    pub fn with_capacity(capacity: usize, duplicate_policy: DuplicatePolicy) -> Self {
        Self {
            collections: Vec::with_capacity(capacity),
            duplicate_policy,
        }
    }

    /// Number of live collections, duplicates included.
    pub fn count(&self) -> usize {
        self.collections.len()
    }

    /// Registers a collection built from `schema`.
    ///
    /// Under [`DuplicatePolicy::Reject`] an id that is already registered
    /// fails with `AlreadyExists` and leaves the set untouched.
    pub fn add(&mut self, id: CollectionId, schema: CollectionSchema) -> CoreResult<()> {
        if self.has_collection(id) {
            match self.duplicate_policy {
                DuplicatePolicy::Reject => {
                    warn!("Rejecting duplicate collection {}", id);
                    return Err(CoreError::already_exists("collection", id));
                }
                DuplicatePolicy::Tolerate => {
                    warn!("Collection {} registered twice, lookups keep the first", id);
                }
            }
        }

        let collection = Collection::new(id, schema);
        info!("Create collection {} ({})", collection.name(), id);
        self.collections.push(collection);
        Ok(())
    }

    /// Drops every collection registered under `id`. A missing id is a no-op.
    pub fn remove(&mut self, id: CollectionId) -> CoreResult<()> {
        self.collections.retain(|collection| {
            if collection.id() == id {
                info!("Drop collection {} ({})", collection.name(), id);
                false
            } else {
                true
            }
        });
        Ok(())
    }

    pub fn get_by_id(&self, id: CollectionId) -> CoreResult<&Collection> {
        self.collections
            .iter()
            .find(|collection| collection.id() == id)
            .ok_or_else(|| CoreError::not_found("collection", id))
    }

    pub fn get_by_name(&self, name: &str) -> CoreResult<&Collection> {
        self.collections
            .iter()
            .find(|collection| collection.name() == name)
            .ok_or_else(|| CoreError::not_found("collection name", name))
    }

    pub fn get_id_by_name(&self, name: &str) -> CoreResult<CollectionId> {
        self.get_by_name(name).map(Collection::id)
    }

    pub fn has_collection(&self, id: CollectionId) -> bool {
        self.collections.iter().any(|collection| collection.id() == id)
    }

    /// Registered ids in insertion order.
    pub fn ids(&self) -> Vec<CollectionId> {
        self.collections.iter().map(Collection::id).collect()
    }
}

impl Default for CollectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
