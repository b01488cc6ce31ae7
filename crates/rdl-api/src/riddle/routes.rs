use axum::{Json, Router, extract::State, routing::post};
use chrono::Utc;

use super::{
    model::{GetRiddleRequest, SubmitAnswerRequest, SubmitAnswerResponse, TodayRiddleResponse},
    service,
};
use crate::{ApiState, auth::Caller, error::ApiError, validation::ValidatedJson};

/// Create the daily riddle routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/get-riddle", post(get_riddle))
        .route("/submit-answer", post(submit_answer))
}

/// Today's riddle for a user, assigned on first request of the day
async fn get_riddle(
    caller: Caller,
    State(state): State<ApiState>,
    payload: Result<ValidatedJson<GetRiddleRequest>, ApiError>,
) -> Result<Json<TodayRiddleResponse>, ApiError> {
    let ValidatedJson(payload) = payload.map_err(ApiError::into_server_error)?;
    caller.authorize(payload.user_id)?;

    let today = Utc::now().date_naive();
    let response =
        service::fetch_or_assign(state.store.as_ref(), state.daily, payload.user_id, today)
            .await
            .map_err(ApiError::into_server_error)?;

    Ok(Json(response))
}

/// Answer today's riddle
async fn submit_answer(
    caller: Caller,
    State(state): State<ApiState>,
    payload: Result<ValidatedJson<SubmitAnswerRequest>, ApiError>,
) -> Result<Json<SubmitAnswerResponse>, ApiError> {
    let ValidatedJson(payload) = payload.map_err(ApiError::into_server_error)?;
    caller.authorize(payload.user_id)?;

    let response = service::submit_answer(
        state.store.as_ref(),
        state.daily,
        payload.user_id,
        payload.riddle_id,
        &payload.answer,
        Utc::now(),
    )
    .await
    .map_err(ApiError::into_server_error)?;

    Ok(Json(response))
}
