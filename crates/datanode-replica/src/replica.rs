//! Collection and segment registries behind one reader/writer lock.

use datanode_core::metrics::{self, REPLICA_COLLECTIONS, REPLICA_SEGMENTS, ROWS_INGESTED};
use datanode_core::{
    Collection, CollectionId, CollectionReplica, CollectionSchema, CoreResult, MsgPosition,
    PartitionId, ReplicaConfig, Segment, SegmentId, SegmentStatisticsUpdates, Timestamp,
};
use parking_lot::RwLock;

use crate::collection_registry::CollectionRegistry;
use crate::segment_registry::SegmentRegistry;

struct ReplicaInner {
    collections: CollectionRegistry,
    segments: SegmentRegistry,
}

/// In-memory metadata registry of a datanode.
///
/// Readers share the lock. Mutations and statistics snapshots (which
/// acknowledge the new flag) take it exclusively. No method calls another
/// locking method while holding the guard.
pub struct Replica {
    inner: RwLock<ReplicaInner>,
}

impl Replica {
    /// Creates an empty replica with the default configuration.
    pub fn new() -> Self {
        Self::with_config(&ReplicaConfig::default())
    }

    pub fn with_config(config: &ReplicaConfig) -> Self {
        Self {
            inner: RwLock::new(ReplicaInner {
                collections: CollectionRegistry::with_capacity(
                    config.collection_capacity,
                    config.duplicate_policy,
                ),
                segments: SegmentRegistry::with_capacity(
                    config.segment_capacity,
                    config.duplicate_policy,
                ),
            }),
        }
    }

    /// Registered collection ids in insertion order.
    pub fn collection_ids(&self) -> Vec<CollectionId> {
        self.inner.read().collections.ids()
    }
}

impl Default for Replica {
    fn default() -> Self {
        Self::new()
    }
}

// The gauges sum over every live replica in the process.
impl Drop for Replica {
    fn drop(&mut self) {
        let inner = self.inner.get_mut();
        REPLICA_COLLECTIONS.sub(gauge_delta(inner.collections.count()));
        REPLICA_SEGMENTS.sub(gauge_delta(inner.segments.count()));
    }
}

fn gauge_delta(count: usize) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

fn observe<T>(operation: &str, result: CoreResult<T>) -> CoreResult<T> {
    metrics::record_operation(operation, result.is_ok());
    result
}

impl CollectionReplica for Replica {
    fn get_collection_num(&self) -> usize {
        self.inner.read().collections.count()
    }

    fn add_collection(
        &self,
        collection_id: CollectionId,
        schema: CollectionSchema,
    ) -> CoreResult<()> {
        let mut inner = self.inner.write();
        let result = inner.collections.add(collection_id, schema);
        if result.is_ok() {
            REPLICA_COLLECTIONS.inc();
        }
        observe("add_collection", result)
    }

    fn remove_collection(&self, collection_id: CollectionId) -> CoreResult<()> {
        let mut inner = self.inner.write();
        let before = inner.collections.count();
        let result = inner.collections.remove(collection_id);
        REPLICA_COLLECTIONS.sub(gauge_delta(before - inner.collections.count()));
        observe("remove_collection", result)
    }

    fn get_collection_by_id(&self, collection_id: CollectionId) -> CoreResult<Collection> {
        self.inner
            .read()
            .collections
            .get_by_id(collection_id)
            .cloned()
    }

    fn get_collection_by_name(&self, collection_name: &str) -> CoreResult<Collection> {
        self.inner
            .read()
            .collections
            .get_by_name(collection_name)
            .cloned()
    }

    fn get_collection_id_by_name(&self, collection_name: &str) -> CoreResult<CollectionId> {
        self.inner
            .read()
            .collections
            .get_id_by_name(collection_name)
    }

    fn has_collection(&self, collection_id: CollectionId) -> bool {
        self.inner.read().collections.has_collection(collection_id)
    }

    fn add_segment(
        &self,
        segment_id: SegmentId,
        collection_id: CollectionId,
        partition_id: PartitionId,
        create_time: Timestamp,
        start_positions: Vec<MsgPosition>,
    ) -> CoreResult<()> {
        let mut inner = self.inner.write();
        let result = inner.segments.add(
            segment_id,
            collection_id,
            partition_id,
            create_time,
            start_positions,
        );
        if result.is_ok() {
            REPLICA_SEGMENTS.inc();
        }
        observe("add_segment", result)
    }

    fn remove_segment(&self, segment_id: SegmentId) -> CoreResult<()> {
        let result = self.inner.write().segments.remove(segment_id);
        if result.is_ok() {
            REPLICA_SEGMENTS.dec();
        }
        observe("remove_segment", result)
    }

    fn has_segment(&self, segment_id: SegmentId) -> bool {
        self.inner.read().segments.has_segment(segment_id)
    }

    fn update_statistics(
        &self,
        segment_id: SegmentId,
        delta_rows: u64,
        end_time: Timestamp,
        end_positions: Vec<MsgPosition>,
    ) -> CoreResult<()> {
        let result = self.inner.write().segments.update_statistics(
            segment_id,
            delta_rows,
            end_time,
            end_positions,
        );
        if result.is_ok() {
            ROWS_INGESTED.inc_by(delta_rows);
        }
        observe("update_statistics", result)
    }

    fn get_segment_statistics_updates(
        &self,
        segment_id: SegmentId,
    ) -> CoreResult<SegmentStatisticsUpdates> {
        let result = self.inner.write().segments.statistics_snapshot(segment_id);
        observe("get_segment_statistics_updates", result)
    }

    fn get_segment_by_id(&self, segment_id: SegmentId) -> CoreResult<Segment> {
        self.inner.read().segments.get_by_id(segment_id).cloned()
    }

    fn get_segment_num(&self) -> usize {
        self.inner.read().segments.count()
    }

    fn segment_ids(&self) -> Vec<SegmentId> {
        self.inner.read().segments.ids()
    }

    fn segment_ids_by_collection(&self, collection_id: CollectionId) -> Vec<SegmentId> {
        self.inner.read().segments.ids_by_collection(collection_id)
    }
}
