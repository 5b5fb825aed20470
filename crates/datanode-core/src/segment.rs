use serde::{Deserialize, Serialize};

use crate::ids::{CollectionId, PartitionId, SegmentId, Timestamp};

/// Checkpoint of how far a segment has consumed from one upstream channel.
///
/// Produced by the message-queue client; the replica stores and forwards it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MsgPosition {
    pub channel_name: String,
    pub msg_id: String,
    pub timestamp: Timestamp,
}

impl MsgPosition {
    #[must_use]
    pub fn new(
        channel_name: impl Into<String>,
        msg_id: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            channel_name: channel_name.into(),
            msg_id: msg_id.into(),
            timestamp,
        }
    }
}

/// Point-in-time copy of a segment's statistics, reported to the flush
/// decision logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentStatisticsUpdates {
    pub segment_id: SegmentId,
    pub memory_size: u64,
    pub num_rows: u64,
    /// `true` only on the first report after the segment was registered.
    pub is_new_segment: bool,
    pub create_time: Timestamp,
    pub end_time: Timestamp,
    pub start_positions: Vec<MsgPosition>,
    pub end_positions: Vec<MsgPosition>,
}

/// A growing segment owned by this datanode together with its accumulated
/// write statistics.
///
/// Owner ids and start positions are fixed at construction. The row count
/// only grows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    segment_id: SegmentId,
    collection_id: CollectionId,
    partition_id: PartitionId,
    num_rows: u64,
    memory_size: u64,
    is_new: bool,
    create_time: Timestamp,
    end_time: Timestamp,
    start_positions: Vec<MsgPosition>,
    end_positions: Vec<MsgPosition>,
}

impl Segment {
    /// Creates a freshly registered segment: no rows, no end positions, and
    /// the new flag raised.
    #[must_use]
    pub fn new(
        segment_id: SegmentId,
        collection_id: CollectionId,
        partition_id: PartitionId,
        create_time: Timestamp,
        start_positions: Vec<MsgPosition>,
    ) -> Self {
        Self {
            segment_id,
            collection_id,
            partition_id,
            num_rows: 0,
            memory_size: 0,
            is_new: true,
            create_time,
            end_time: Timestamp::ZERO,
            start_positions,
            end_positions: Vec::new(),
        }
    }

    pub const fn segment_id(&self) -> SegmentId {
        self.segment_id
    }

    pub const fn collection_id(&self) -> CollectionId {
        self.collection_id
    }

    pub const fn partition_id(&self) -> PartitionId {
        self.partition_id
    }

    pub const fn num_rows(&self) -> u64 {
        self.num_rows
    }

    pub const fn memory_size(&self) -> u64 {
        self.memory_size
    }

    /// Whether the segment has not yet appeared in a statistics report.
    pub const fn is_new(&self) -> bool {
        self.is_new
    }

    pub const fn create_time(&self) -> Timestamp {
        self.create_time
    }

    /// Time of the latest statistics update, `Timestamp::ZERO` before the
    /// first one.
    pub const fn end_time(&self) -> Timestamp {
        self.end_time
    }

    pub fn start_positions(&self) -> &[MsgPosition] {
        &self.start_positions
    }

    pub fn end_positions(&self) -> &[MsgPosition] {
        &self.end_positions
    }

    /// Folds one batch of ingested rows into the statistics.
    ///
    /// Adds `delta_rows`, overwrites the end time, replaces the end positions
    /// wholesale and resets the memory estimate to zero.
    pub fn apply_statistics(
        &mut self,
        delta_rows: u64,
        end_time: Timestamp,
        end_positions: Vec<MsgPosition>,
    ) {
        self.memory_size = 0;
        self.num_rows = self.num_rows.saturating_add(delta_rows);
        self.end_time = end_time;
        self.end_positions = end_positions;
    }

    /// Copies the current statistics and lowers the new flag.
    ///
    /// The returned value carries the flag as it was before the call, so
    /// exactly one report per segment has `is_new_segment == true`.
    pub fn acknowledge_statistics(&mut self) -> SegmentStatisticsUpdates {
        let updates = SegmentStatisticsUpdates {
            segment_id: self.segment_id,
            memory_size: self.memory_size,
            num_rows: self.num_rows,
            is_new_segment: self.is_new,
            create_time: self.create_time,
            end_time: self.end_time,
            start_positions: self.start_positions.clone(),
            end_positions: self.end_positions.clone(),
        };
        self.is_new = false;
        updates
    }
}
