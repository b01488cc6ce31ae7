//! The daily riddle workflow: assign-or-fetch today's riddle and record the
//! first answer with its streak update.

use chrono::{DateTime, NaiveDate, Utc};
use rdl_daily::{Streak, fact_seed, is_correct_answer, riddle_seed};
use rdl_db::{
    RiddleStore, StoreError,
    models::{AnswerOutcome, Fact, NewAnswer, StreakCounters, TodayAssignment},
};
use uuid::Uuid;

use super::model::{SubmitAnswerResponse, TodayRiddleResponse};
use crate::{error::ApiError, metrics, state::DailySettings};

/// Return the riddle assigned to `user_id` on `today`, assigning one first if needed.
pub async fn fetch_or_assign(
    store: &dyn RiddleStore,
    settings: DailySettings,
    user_id: Uuid,
    today: NaiveDate,
) -> Result<TodayRiddleResponse, ApiError> {
    if store.find_profile(user_id).await?.is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    if let Some(existing) = store.find_assignment(user_id, today).await? {
        metrics::record_riddle_assigned(false);
        return today_response(store, settings, existing).await;
    }

    let seed = riddle_seed(settings.selection_scope, user_id, today);
    let Some(riddle) = store.select_active_riddle(seed).await? else {
        tracing::warn!(%user_id, %today, "no active riddle to assign");
        return Ok(TodayRiddleResponse::empty());
    };

    let inserted = store.insert_assignment(user_id, riddle.id, today).await?;
    if !inserted {
        tracing::debug!(%user_id, %today, "assignment created concurrently");
    }

    // Re-read so a concurrent winner's riddle is returned
    let Some(assigned) = store.find_assignment(user_id, today).await? else {
        tracing::error!(%user_id, %today, "assignment missing after insert");
        let missing = format!("assignment for {user_id} on {today} missing after insert");
        return Err(StoreError::Constraint(missing).into());
    };

    metrics::record_riddle_assigned(inserted);
    tracing::info!(
        %user_id,
        %today,
        riddle_id = %assigned.riddle.id,
        newly_assigned = inserted,
        "riddle assigned"
    );

    today_response(store, settings, assigned).await
}

/// Check `answer` against the riddle and record it as today's answer.
pub async fn submit_answer(
    store: &dyn RiddleStore,
    settings: DailySettings,
    user_id: Uuid,
    riddle_id: Uuid,
    answer: &str,
    now: DateTime<Utc>,
) -> Result<SubmitAnswerResponse, ApiError> {
    let riddle = store
        .find_riddle(riddle_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Riddle not found".to_string()))?;

    let is_correct = is_correct_answer(answer, &riddle.answer);
    let today = now.date_naive();
    let policy = settings.streak_policy;

    let new_answer = NewAnswer {
        user_id,
        riddle_id,
        assigned_date: today,
        answered_at: now,
        is_correct,
    };
    let on_correct = move |counters: StreakCounters| {
        let next = Streak::from(counters).after_correct_answer(today, policy);
        StreakCounters::from(next)
    };

    match store.record_answer(&new_answer, &on_correct).await? {
        AnswerOutcome::Recorded { streak, .. } => {
            metrics::record_answer_submitted(is_correct);
            tracing::info!(
                %user_id,
                %riddle_id,
                is_correct,
                current_streak = ?streak.map(|s| s.current_streak),
                "answer recorded"
            );
        }
        AnswerOutcome::AlreadyAnswered(_) => {
            metrics::record_answer_rejected("already_answered");
            return Err(ApiError::Conflict(
                "Today's riddle has already been answered".to_string(),
            ));
        }
        AnswerOutcome::RiddleMismatch { assigned_riddle_id } => {
            metrics::record_answer_rejected("riddle_mismatch");
            tracing::debug!(%user_id, %riddle_id, %assigned_riddle_id, "answer for another riddle");
            return Err(ApiError::Validation(
                "Riddle is not today's riddle for this user".to_string(),
            ));
        }
        AnswerOutcome::NotAssigned => {
            metrics::record_answer_rejected("not_assigned");
            return Err(ApiError::NotFound("No riddle assigned today".to_string()));
        }
    }

    let fact = if is_correct {
        reward_fact(store, settings, user_id, today).await?
    } else {
        None
    };

    Ok(SubmitAnswerResponse { is_correct, fact })
}

async fn today_response(
    store: &dyn RiddleStore,
    settings: DailySettings,
    today: TodayAssignment,
) -> Result<TodayRiddleResponse, ApiError> {
    let TodayAssignment { assignment, riddle } = today;

    let fact = if assignment.is_correct == Some(true) {
        reward_fact(store, settings, assignment.user_id, assignment.assigned_date).await?
    } else {
        None
    };

    Ok(TodayRiddleResponse {
        riddle: Some(riddle),
        answered: assignment.is_answered(),
        is_correct: assignment.is_correct,
        fact,
    })
}

/// Same fact for the same user and day, whichever endpoint asks.
async fn reward_fact(
    store: &dyn RiddleStore,
    settings: DailySettings,
    user_id: Uuid,
    date: NaiveDate,
) -> Result<Option<Fact>, ApiError> {
    let seed = fact_seed(settings.selection_scope, user_id, date);
    Ok(store.select_active_fact(seed).await?)
}
