//! Infrastructure services

mod answer_service;
mod index_service;

pub use answer_service::{AnswerService, AnswerServiceConfig};
pub use index_service::{IndexOverview, IndexService};
