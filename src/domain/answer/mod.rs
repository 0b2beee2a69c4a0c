//! Answer request and response

mod request;
mod response;

pub use request::{AnswerRequest, MAX_QUESTION_LENGTH};
pub use response::{AnswerOutcome, AnswerResponse};
