//! Vector index infrastructure: snapshot stores, active pointer, builder

mod active;
mod builder;
mod file_store;
mod in_memory_store;

pub use active::{ActiveIndex, IndexStatus};
pub use builder::{BuildReport, IndexBuilder, IndexBuilderConfig};
pub use file_store::FileSnapshotStore;
pub use in_memory_store::InMemorySnapshotStore;
