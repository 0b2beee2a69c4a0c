//! Question answering endpoint

use axum::extract::State;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::answer::{AnswerOutcome, AnswerRequest, AnswerResponse};

/// Answer returned to the chat front end
#[derive(Debug, Clone, Serialize)]
pub struct AnswerApiResponse {
    pub id: String,
    pub answer: String,
    pub outcome: AnswerOutcome,
    pub source_chunk_ids: Vec<String>,
    pub source_row_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_version: Option<u64>,
}

impl AnswerApiResponse {
    fn new(request_id: &str, response: AnswerResponse) -> Self {
        let source_row_ids = response.source_row_ids();

        Self {
            id: format!("ans-{}", request_id),
            answer: response.text,
            outcome: response.outcome,
            source_chunk_ids: response.source_chunk_ids,
            source_row_ids,
            snapshot_version: response.snapshot_version,
        }
    }
}

/// POST /v1/answer
///
/// Only malformed requests are errors; every well-formed question gets a
/// 200 with either an answer, the fallback or the apology.
pub async fn answer_question(
    State(state): State<AppState>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<AnswerApiResponse>, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::from(e).with_param("question"))?;

    let request_id = Uuid::new_v4().to_string();
    let response = state.answer_service.answer(&request.question).await;

    debug!(
        request_id = %request_id,
        outcome = response.outcome.as_str(),
        sources = response.source_chunk_ids.len(),
        "Answered question"
    );

    Ok(Json(AnswerApiResponse::new(&request_id, response)))
}
