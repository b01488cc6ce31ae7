use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    routing::get,
};
use rdl_db::models::{Achievement, FollowEdge, LeaderboardEntry, Profile};
use uuid::Uuid;

use super::model::{LeaderboardQuery, ProfileView, UpdateSettingsRequest};
use crate::{ApiState, auth::Caller, error::ApiError, validation::ValidatedJson};

/// Create the profile, leaderboard and social routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/leaderboard", get(leaderboard))
        .route("/profiles/{user_id}", get(get_profile).patch(update_settings))
        .route("/profiles/{user_id}/followers", get(followers))
        .route("/profiles/{user_id}/following", get(following))
        .route("/profiles/{user_id}/achievements", get(achievements))
}

/// Top streaks
async fn leaderboard(
    _caller: Caller,
    State(state): State<ApiState>,
    query: Result<Query<LeaderboardQuery>, QueryRejection>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let Query(query) = query?;

    let entries = state.store.leaderboard(query.limit()).await?;

    Ok(Json(entries))
}

async fn get_profile(
    caller: Caller,
    State(state): State<ApiState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ProfileView>, ApiError> {
    let Path(user_id) = path?;
    let profile = existing_profile(&state, user_id).await?;

    let view = match caller.authorize(user_id) {
        Ok(()) => ProfileView::Own(profile),
        Err(_) => ProfileView::Public(profile.into()),
    };

    Ok(Json(view))
}

/// Change name, language, reminder time or push preference
async fn update_settings(
    caller: Caller,
    State(state): State<ApiState>,
    path: Result<Path<Uuid>, PathRejection>,
    ValidatedJson(payload): ValidatedJson<UpdateSettingsRequest>,
) -> Result<Json<Profile>, ApiError> {
    let Path(user_id) = path?;
    caller.authorize(user_id)?;

    let update = payload.into_update()?;
    let profile = state
        .store
        .update_profile_settings(user_id, &update)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(%user_id, "profile settings updated");

    Ok(Json(profile))
}

async fn followers(
    _caller: Caller,
    State(state): State<ApiState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<FollowEdge>>, ApiError> {
    let Path(user_id) = path?;
    existing_profile(&state, user_id).await?;

    Ok(Json(state.store.followers(user_id).await?))
}

async fn following(
    _caller: Caller,
    State(state): State<ApiState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<FollowEdge>>, ApiError> {
    let Path(user_id) = path?;
    existing_profile(&state, user_id).await?;

    Ok(Json(state.store.following(user_id).await?))
}

async fn achievements(
    _caller: Caller,
    State(state): State<ApiState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<Achievement>>, ApiError> {
    let Path(user_id) = path?;
    existing_profile(&state, user_id).await?;

    Ok(Json(state.store.achievements(user_id).await?))
}

async fn existing_profile(state: &ApiState, user_id: Uuid) -> Result<Profile, ApiError> {
    state
        .store
        .find_profile(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}
