//! In-memory registry of the collections and growing segments owned by a
//! datanode, with the per-segment write statistics the flush loop reports.

pub mod collection_registry;
pub mod replica;
pub mod segment_registry;

pub use collection_registry::CollectionRegistry;
pub use replica::Replica;
pub use segment_registry::SegmentRegistry;
