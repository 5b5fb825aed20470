//! End-to-end tests for the replica contract as seen by ingestion and the
//! flush loop.

use datanode_core::{
    CollectionId, CollectionReplica, CollectionSchema, CoreError, DataType, FieldSchema,
    MsgPosition, PartitionId, SegmentId, Timestamp,
};
use datanode_replica::Replica;

/// Initialize tracing for tests (call once)
fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("datanode_replica=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

fn schema(name: &str) -> CollectionSchema {
    CollectionSchema::new(name).with_field(FieldSchema {
        field_id: 100,
        name: "row_id".to_string(),
        data_type: DataType::Int64,
        is_primary_key: true,
    })
}

fn position(channel: &str, msg_id: &str, ts: u64) -> MsgPosition {
    MsgPosition::new(channel, msg_id, Timestamp::new(ts))
}

#[test]
fn test_new_segment_starts_empty() {
    init_tracing();
    let replica = Replica::new();

    replica
        .add_segment(
            SegmentId::new(5),
            CollectionId::new(1),
            PartitionId::new(0),
            Timestamp::new(1000),
            Vec::new(),
        )
        .unwrap();

    let segment = replica.get_segment_by_id(SegmentId::new(5)).unwrap();
    assert_eq!(segment.num_rows(), 0);
    assert_eq!(segment.memory_size(), 0);
    assert!(segment.is_new());
    assert_eq!(segment.create_time(), Timestamp::new(1000));
}

#[test]
fn test_new_flag_reported_exactly_once() {
    init_tracing();
    let replica = Replica::new();
    let id = SegmentId::new(5);
    replica
        .add_segment(
            id,
            CollectionId::new(1),
            PartitionId::new(0),
            Timestamp::new(1),
            vec![position("insert-0", "s0", 1)],
        )
        .unwrap();

    let first = replica.get_segment_statistics_updates(id).unwrap();
    assert!(first.is_new_segment);

    let second = replica.get_segment_statistics_updates(id).unwrap();
    assert!(!second.is_new_segment);

    // Later updates never raise the flag again.
    replica
        .update_statistics(id, 3, Timestamp::new(2), Vec::new())
        .unwrap();
    assert!(!replica.get_segment_statistics_updates(id).unwrap().is_new_segment);
}

#[test]
fn test_update_statistics_accumulates_rows() {
    init_tracing();
    let replica = Replica::new();
    let id = SegmentId::new(5);
    replica
        .add_segment(
            id,
            CollectionId::new(1),
            PartitionId::new(0),
            Timestamp::new(1),
            Vec::new(),
        )
        .unwrap();

    let p = position("insert-0", "p", 10);
    let q = position("insert-0", "q", 20);
    replica
        .update_statistics(id, 10, Timestamp::new(10), vec![p])
        .unwrap();
    replica
        .update_statistics(id, 7, Timestamp::new(20), vec![q.clone()])
        .unwrap();

    let segment = replica.get_segment_by_id(id).unwrap();
    assert_eq!(segment.num_rows(), 17);
    assert_eq!(segment.end_time(), Timestamp::new(20));
    assert_eq!(segment.end_positions(), &[q]);
    assert_eq!(segment.memory_size(), 0);
}

#[test]
fn test_missing_entities() {
    init_tracing();
    let replica = Replica::new();

    let err = replica.remove_segment(SegmentId::new(404)).unwrap_err();
    assert!(matches!(err, CoreError::NotFound { entity: "segment", .. }));

    assert!(replica
        .update_statistics(SegmentId::new(404), 1, Timestamp::new(1), Vec::new())
        .unwrap_err()
        .is_not_found());
    assert!(replica
        .get_segment_statistics_updates(SegmentId::new(404))
        .unwrap_err()
        .is_not_found());
    assert!(replica
        .get_collection_by_id(CollectionId::new(404))
        .unwrap_err()
        .is_not_found());
    assert!(replica
        .get_collection_by_name("nope")
        .unwrap_err()
        .is_not_found());

    // Removing an unknown collection is a silent no-op.
    replica
        .add_collection(CollectionId::new(1), schema("kept"))
        .unwrap();
    replica.remove_collection(CollectionId::new(404)).unwrap();
    assert_eq!(replica.get_collection_num(), 1);
}

#[test]
fn test_collection_add_remove() {
    init_tracing();
    let replica = Replica::new();

    replica
        .add_collection(CollectionId::new(1), schema("a"))
        .unwrap();
    replica
        .add_collection(CollectionId::new(2), schema("b"))
        .unwrap();
    assert_eq!(replica.get_collection_num(), 2);

    replica.remove_collection(CollectionId::new(1)).unwrap();
    assert_eq!(replica.get_collection_num(), 1);
    assert!(!replica.has_collection(CollectionId::new(1)));
    assert!(replica.has_collection(CollectionId::new(2)));

    let collection = replica.get_collection_by_name("b").unwrap();
    assert_eq!(collection.id(), CollectionId::new(2));
    assert_eq!(collection.schema().primary_key().unwrap().name, "row_id");
    assert_eq!(
        replica.get_collection_id_by_name("b").unwrap(),
        CollectionId::new(2)
    );
}

#[test]
fn test_segments_outlive_their_collection() {
    init_tracing();
    let replica = Replica::new();

    replica
        .add_collection(CollectionId::new(1), schema("a"))
        .unwrap();
    replica
        .add_segment(
            SegmentId::new(10),
            CollectionId::new(1),
            PartitionId::new(0),
            Timestamp::new(1),
            Vec::new(),
        )
        .unwrap();
    // A segment may also arrive before its collection.
    replica
        .add_segment(
            SegmentId::new(11),
            CollectionId::new(2),
            PartitionId::new(0),
            Timestamp::new(1),
            Vec::new(),
        )
        .unwrap();

    replica.remove_collection(CollectionId::new(1)).unwrap();

    assert!(replica.has_segment(SegmentId::new(10)));
    assert_eq!(
        replica.segment_ids_by_collection(CollectionId::new(1)),
        vec![SegmentId::new(10)]
    );
    assert_eq!(
        replica.segment_ids_by_collection(CollectionId::new(2)),
        vec![SegmentId::new(11)]
    );
}

#[test]
fn test_flush_loop_reports_every_segment() {
    init_tracing();
    let replica = Replica::new();

    for raw in 0..5 {
        replica
            .add_segment(
                SegmentId::new(raw),
                CollectionId::new(1),
                PartitionId::new(raw % 2),
                Timestamp::new(1),
                vec![position("insert-0", "start", 1)],
            )
            .unwrap();
        replica
            .update_statistics(
                SegmentId::new(raw),
                raw as u64,
                Timestamp::new(2),
                vec![position("insert-0", "end", 2)],
            )
            .unwrap();
    }

    let reports: Vec<_> = replica
        .segment_ids()
        .into_iter()
        .map(|id| replica.get_segment_statistics_updates(id).unwrap())
        .collect();

    assert_eq!(reports.len(), 5);
    assert!(reports.iter().all(|updates| updates.is_new_segment));
    assert_eq!(reports.iter().map(|u| u.num_rows).sum::<u64>(), 10);

    // Second pass sees only acknowledged segments.
    for id in replica.segment_ids() {
        assert!(!replica.get_segment_statistics_updates(id).unwrap().is_new_segment);
    }
}

#[test]
fn test_metrics_exported() {
    init_tracing();
    let replica = Replica::new();
    replica
        .add_segment(
            SegmentId::new(1),
            CollectionId::new(1),
            PartitionId::new(0),
            Timestamp::new(1),
            Vec::new(),
        )
        .unwrap();
    replica
        .update_statistics(SegmentId::new(1), 5, Timestamp::new(2), Vec::new())
        .unwrap();

    let text = datanode_core::metrics::gather_metrics();
    assert!(text.contains("datanode_replica_rows_ingested_total"));
    assert!(text.contains("datanode_replica_segments"));
    assert!(text.contains("operation=\"update_statistics\""));
}
