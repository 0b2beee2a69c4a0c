//! Chunking domain: splitting knowledge rows into retrieval units

mod chunk;
mod config;
mod strategy;

pub use chunk::{chunk_id, Chunk};
pub use config::ChunkingConfig;
pub use strategy::{ChunkStream, ChunkingStrategy};
