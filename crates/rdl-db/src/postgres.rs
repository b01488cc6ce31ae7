use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    models::{
        Achievement, AnswerOutcome, Fact, FollowEdge, LeaderboardEntry, NewAnswer, Profile,
        ProfileSettingsUpdate, Riddle, TodayAssignment,
    },
    repositories::{assignment, fact, profile, riddle, social},
    store::{RiddleStore, StoreError, StreakUpdate, seed_to_i64},
};

/// PostgreSQL-backed store
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RiddleStore for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
        Ok(profile::find_by_id(&self.pool, user_id).await?)
    }

    async fn find_assignment(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<TodayAssignment>, StoreError> {
        Ok(assignment::find_with_riddle(&self.pool, user_id, date).await?)
    }

    async fn select_active_riddle(&self, seed: u64) -> Result<Option<Riddle>, StoreError> {
        Ok(riddle::select_active(&self.pool, seed_to_i64(seed)).await?)
    }

    async fn insert_assignment(
        &self,
        user_id: Uuid,
        riddle_id: Uuid,
        date: NaiveDate,
    ) -> Result<bool, StoreError> {
        Ok(assignment::insert_if_absent(&self.pool, user_id, riddle_id, date).await?)
    }

    async fn find_riddle(&self, riddle_id: Uuid) -> Result<Option<Riddle>, StoreError> {
        Ok(riddle::find_by_id(&self.pool, riddle_id).await?)
    }

    async fn record_answer(
        &self,
        answer: &NewAnswer,
        on_correct: &StreakUpdate,
    ) -> Result<AnswerOutcome, StoreError> {
        // Single transaction for atomicity
        let mut tx = self.pool.begin().await?;

        let Some(recorded) = assignment::mark_answered(&mut *tx, answer).await? else {
            let existing =
                assignment::find_by_user_and_date(&mut *tx, answer.user_id, answer.assigned_date)
                    .await?;
            tx.rollback().await?;

            return Ok(match existing {
                None => AnswerOutcome::NotAssigned,
                Some(existing) if existing.riddle_id != answer.riddle_id => {
                    AnswerOutcome::RiddleMismatch {
                        assigned_riddle_id: existing.riddle_id,
                    }
                }
                Some(existing) => AnswerOutcome::AlreadyAnswered(existing),
            });
        };

        let streak = if answer.is_correct {
            let current = profile::lock_streak(&mut *tx, answer.user_id)
                .await?
                .ok_or_else(|| {
                    StoreError::Constraint(format!("profile {} does not exist", answer.user_id))
                })?;
            let next = on_correct(current);
            profile::update_streak(&mut *tx, answer.user_id, &next, answer.riddle_id).await?;
            Some(next)
        } else {
            None
        };

        tx.commit().await?;

        Ok(AnswerOutcome::Recorded {
            assignment: recorded,
            streak,
        })
    }

    async fn select_active_fact(&self, seed: u64) -> Result<Option<Fact>, StoreError> {
        Ok(fact::select_active(&self.pool, seed_to_i64(seed)).await?)
    }

    async fn leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardEntry>, StoreError> {
        Ok(profile::leaderboard(&self.pool, limit).await?)
    }

    async fn update_profile_settings(
        &self,
        user_id: Uuid,
        settings: &ProfileSettingsUpdate,
    ) -> Result<Option<Profile>, StoreError> {
        Ok(profile::update_settings(&self.pool, user_id, settings).await?)
    }

    async fn followers(&self, user_id: Uuid) -> Result<Vec<FollowEdge>, StoreError> {
        Ok(social::followers(&self.pool, user_id).await?)
    }

    async fn following(&self, user_id: Uuid) -> Result<Vec<FollowEdge>, StoreError> {
        Ok(social::following(&self.pool, user_id).await?)
    }

    async fn achievements(&self, user_id: Uuid) -> Result<Vec<Achievement>, StoreError> {
        Ok(social::achievements(&self.pool, user_id).await?)
    }
}
