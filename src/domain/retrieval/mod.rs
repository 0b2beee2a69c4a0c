//! Retrieval domain: query parameters and outcomes

mod config;
mod outcome;

pub use config::RetrievalConfig;
pub use outcome::Retrieval;
