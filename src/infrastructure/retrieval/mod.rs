//! Retrieval implementation

mod retriever;

pub use retriever::Retriever;
