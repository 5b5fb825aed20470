//! Set of growing segments owned by a datanode.
//!
//! Segments are keyed by id, so removal never reorders the remaining entries.
//! Under [`DuplicatePolicy::Tolerate`] an id may map to several segments kept
//! in registration order; every operation acts on the first one.

use std::collections::{HashMap, VecDeque};

use datanode_core::{
    CollectionId, CoreError, CoreResult, DuplicatePolicy, MsgPosition, PartitionId, Segment,
    SegmentId, SegmentStatisticsUpdates, Timestamp,
};
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct SegmentRegistry {
    segments: HashMap<SegmentId, VecDeque<Segment>>,
    duplicate_policy: DuplicatePolicy,
}

impl SegmentRegistry {
    /// Creates an empty registry rejecting duplicate ids.
    pub fn new() -> Self {
        Self::with_capacity(0, DuplicatePolicy::Reject)
    }

    pub fn with_capacity(capacity: usize, duplicate_policy: DuplicatePolicy) -> Self {
        Self {
            segments: HashMap::with_capacity(capacity),
            duplicate_policy,
        }
    }

    /// Number of live segments, duplicates included.
    pub fn count(&self) -> usize {
        self.segments.values().map(VecDeque::len).sum()
    }

    /// Registers a new segment with the new flag raised.
    ///
    /// A duplicate id fails with `AlreadyExists` under
    /// [`DuplicatePolicy::Reject`]. Under [`DuplicatePolicy::Tolerate`] the
    /// duplicate is stored behind the segment registered first.
    pub fn add(
        &mut self,
        segment_id: SegmentId,
        collection_id: CollectionId,
        partition_id: PartitionId,
        create_time: Timestamp,
        start_positions: Vec<MsgPosition>,
    ) -> CoreResult<()> {
        if self.has_segment(segment_id) {
            match self.duplicate_policy {
                DuplicatePolicy::Reject => {
                    warn!("Rejecting duplicate segment {}", segment_id);
                    return Err(CoreError::already_exists("segment", segment_id));
                }
                DuplicatePolicy::Tolerate => {
                    warn!("Segment {} registered twice, lookups keep the first", segment_id);
                }
            }
        }

        info!(
            "Add segment {} (collection {}, partition {})",
            segment_id, collection_id, partition_id
        );
        let segment = Segment::new(
            segment_id,
            collection_id,
            partition_id,
            create_time,
            start_positions,
        );
        self.segments.entry(segment_id).or_default().push_back(segment);
        Ok(())
    }

    /// Drops the first segment registered under `segment_id`. Unlike
    /// collection removal, a missing id is an error.
    pub fn remove(&mut self, segment_id: SegmentId) -> CoreResult<()> {
        let entries = self
            .segments
            .get_mut(&segment_id)
            .ok_or_else(|| CoreError::not_found("segment", segment_id))?;
        entries.pop_front();
        if entries.is_empty() {
            self.segments.remove(&segment_id);
        }
        info!("Removing segment {}", segment_id);
        Ok(())
    }

    pub fn has_segment(&self, segment_id: SegmentId) -> bool {
        self.segments.contains_key(&segment_id)
    }

    pub fn get_by_id(&self, segment_id: SegmentId) -> CoreResult<&Segment> {
        self.segments
            .get(&segment_id)
            .and_then(VecDeque::front)
            .ok_or_else(|| CoreError::not_found("segment", segment_id))
    }

    fn get_mut(&mut self, segment_id: SegmentId) -> CoreResult<&mut Segment> {
        self.segments
            .get_mut(&segment_id)
            .and_then(VecDeque::front_mut)
            .ok_or_else(|| CoreError::not_found("segment", segment_id))
    }

    pub fn update_statistics(
        &mut self,
        segment_id: SegmentId,
        delta_rows: u64,
        end_time: Timestamp,
        end_positions: Vec<MsgPosition>,
    ) -> CoreResult<()> {
        let segment = self.get_mut(segment_id)?;
        debug!("Updating segment {} row nums by {}", segment_id, delta_rows);
        segment.apply_statistics(delta_rows, end_time, end_positions);
        Ok(())
    }

    /// Snapshots a segment and clears its new flag.
    pub fn statistics_snapshot(
        &mut self,
        segment_id: SegmentId,
    ) -> CoreResult<SegmentStatisticsUpdates> {
        let updates = self.get_mut(segment_id)?.acknowledge_statistics();
        debug!(
            "Statistics for segment {}: {} rows, new = {}",
            segment_id, updates.num_rows, updates.is_new_segment
        );
        Ok(updates)
    }

    /// All registered ids, ascending. Each id appears once.
    pub fn ids(&self) -> Vec<SegmentId> {
        let mut ids: Vec<SegmentId> = self.segments.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Ids whose first registered segment is owned by `collection_id`,
    /// ascending.
    pub fn ids_by_collection(&self, collection_id: CollectionId) -> Vec<SegmentId> {
        let mut ids: Vec<SegmentId> = self
            .segments
            .values()
            .filter_map(VecDeque::front)
            .filter(|segment| segment.collection_id() == collection_id)
            .map(Segment::segment_id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for SegmentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
