use crate::collection::{Collection, CollectionSchema};
use crate::error::CoreResult;
use crate::ids::{CollectionId, PartitionId, SegmentId, Timestamp};
use crate::segment::{MsgPosition, Segment, SegmentStatisticsUpdates};

/// Registry of the collections and segments owned by one datanode.
///
/// Implementations are shared between the ingestion pipeline and the flush
/// loop, so every method takes `&self` and synchronizes internally. Lookups
/// return owned copies.
pub trait CollectionReplica: Send + Sync {
    /// Returns the number of registered collections.
    fn get_collection_num(&self) -> usize;

    /// Registers a collection under `collection_id`.
    fn add_collection(
        &self,
        collection_id: CollectionId,
        schema: CollectionSchema,
    ) -> CoreResult<()>;

    /// Drops every collection registered under `collection_id`.
    ///
    /// Succeeds when nothing matches.
    fn remove_collection(&self, collection_id: CollectionId) -> CoreResult<()>;

    fn get_collection_by_id(&self, collection_id: CollectionId) -> CoreResult<Collection>;

    fn get_collection_by_name(&self, collection_name: &str) -> CoreResult<Collection>;

    fn get_collection_id_by_name(&self, collection_name: &str) -> CoreResult<CollectionId>;

    fn has_collection(&self, collection_id: CollectionId) -> bool;

    /// Registers a new segment with its starting channel positions.
    fn add_segment(
        &self,
        segment_id: SegmentId,
        collection_id: CollectionId,
        partition_id: PartitionId,
        create_time: Timestamp,
        start_positions: Vec<MsgPosition>,
    ) -> CoreResult<()>;

    /// Drops a segment. Fails with `NotFound` when it is not registered.
    fn remove_segment(&self, segment_id: SegmentId) -> CoreResult<()>;

    fn has_segment(&self, segment_id: SegmentId) -> bool;

    /// Accounts `delta_rows` newly ingested rows against a segment.
    fn update_statistics(
        &self,
        segment_id: SegmentId,
        delta_rows: u64,
        end_time: Timestamp,
        end_positions: Vec<MsgPosition>,
    ) -> CoreResult<()>;

    /// Snapshots a segment's statistics and acknowledges its new flag.
    ///
    /// Not a pure read: the first call after `add_segment` reports
    /// `is_new_segment == true`, every later call reports `false`.
    fn get_segment_statistics_updates(
        &self,
        segment_id: SegmentId,
    ) -> CoreResult<SegmentStatisticsUpdates>;

    fn get_segment_by_id(&self, segment_id: SegmentId) -> CoreResult<Segment>;

    /// Returns the number of registered segments.
    fn get_segment_num(&self) -> usize;

    /// Returns every registered segment id in ascending order.
    fn segment_ids(&self) -> Vec<SegmentId>;

    /// Returns the ids of the segments that belong to `collection_id`, in
    /// ascending order.
    fn segment_ids_by_collection(&self, collection_id: CollectionId) -> Vec<SegmentId>;
}
