//! Core domain types and traits for the datanode replica.

pub mod collection;
pub mod config;
pub mod error;
pub mod ids;
pub mod metrics;
pub mod segment;
pub mod traits;

pub use collection::{Collection, CollectionSchema, DataType, FieldSchema};
pub use config::{DatanodeConfig, DuplicatePolicy, ReplicaConfig};
pub use error::{CoreError, CoreResult};
pub use ids::{CollectionId, PartitionId, SegmentId, Timestamp};
pub use segment::{MsgPosition, Segment, SegmentStatisticsUpdates};
pub use traits::CollectionReplica;
