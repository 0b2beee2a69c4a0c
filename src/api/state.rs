//! Application state for shared services

use std::sync::Arc;

use crate::domain::answer::AnswerResponse;
use crate::domain::DomainError;
use crate::infrastructure::index::BuildReport;
use crate::infrastructure::observability::PrometheusMetrics;
use crate::infrastructure::services::{AnswerService, IndexOverview, IndexService};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub answer_service: Arc<dyn AnswerServiceTrait>,
    pub index_service: Arc<dyn IndexServiceTrait>,
    pub metrics: Option<PrometheusMetrics>,
}

impl AppState {
    pub fn new(
        answer_service: Arc<dyn AnswerServiceTrait>,
        index_service: Arc<dyn IndexServiceTrait>,
    ) -> Self {
        Self {
            answer_service,
            index_service,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Option<PrometheusMetrics>) -> Self {
        self.metrics = metrics;
        self
    }
}

/// Trait for the question answering path
#[async_trait::async_trait]
pub trait AnswerServiceTrait: Send + Sync {
    /// Never fails; failures surface as the apology text
    async fn answer(&self, question: &str) -> AnswerResponse;
}

/// Trait for index administration
#[async_trait::async_trait]
pub trait IndexServiceTrait: Send + Sync {
    fn overview(&self) -> IndexOverview;
    async fn rebuild(&self) -> Result<BuildReport, DomainError>;
}

#[async_trait::async_trait]
impl AnswerServiceTrait for AnswerService {
    async fn answer(&self, question: &str) -> AnswerResponse {
        AnswerService::answer_question(self, question).await
    }
}

#[async_trait::async_trait]
impl IndexServiceTrait for IndexService {
    fn overview(&self) -> IndexOverview {
        IndexService::overview(self)
    }

    async fn rebuild(&self) -> Result<BuildReport, DomainError> {
        IndexService::rebuild(self).await
    }
}
