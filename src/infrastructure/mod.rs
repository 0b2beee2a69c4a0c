//! Infrastructure layer - Capability implementations, storage and services

pub mod answer;
pub mod cache;
pub mod chunking;
pub mod embedding;
pub mod index;
pub mod knowledge;
pub mod llm;
pub mod logging;
pub mod observability;
pub mod retrieval;
pub mod services;
