use rdl_db::models::{Fact, Riddle};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::validation::not_blank;

/// Body of `POST /get-riddle`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GetRiddleRequest {
    pub user_id: Uuid,
}

/// Body of `POST /submit-answer`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    pub user_id: Uuid,
    pub riddle_id: Uuid,
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "must be at most 200 characters")
    )]
    pub answer: String,
}

/// Today's riddle and whether it has been answered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayRiddleResponse {
    /// `None` when there is no active riddle to assign
    pub riddle: Option<Riddle>,
    pub answered: bool,
    pub is_correct: Option<bool>,
    /// Reward fact, only once today's riddle was answered correctly
    pub fact: Option<Fact>,
}

impl TodayRiddleResponse {
    pub const fn empty() -> Self {
        Self {
            riddle: None,
            answered: false,
            is_correct: None,
            fact: None,
        }
    }
}

/// Outcome of an answer submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerResponse {
    pub is_correct: bool,
    pub fact: Option<Fact>,
}
