//! The store handle the request handlers work against.
//!
//! [`RiddleStore`] is implemented by [`crate::postgres::PgStore`] for the
//! running service and by [`crate::memory::MemoryStore`] for tests.

use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Achievement, AnswerOutcome, Fact, FollowEdge, LeaderboardEntry, NewAnswer, Profile,
    ProfileSettingsUpdate, Riddle, StreakCounters, TodayAssignment,
};

/// Maps the streak counters read under lock to the counters to write back.
pub type StreakUpdate = dyn Fn(StreakCounters) -> StreakCounters + Send + Sync;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("constraint violation: {0}")]
    Constraint(String),
}

#[async_trait]
pub trait RiddleStore: Send + Sync + fmt::Debug {
    /// Round-trip to the store, used by the readiness check.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError>;

    /// Assignment of `user_id` for `date`, joined with its riddle.
    async fn find_assignment(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<TodayAssignment>, StoreError>;

    /// Active riddle at position `seed % count` in `(created_at, id)` order.
    async fn select_active_riddle(&self, seed: u64) -> Result<Option<Riddle>, StoreError>;

    /// Insert an assignment unless one already exists for `(user_id, date)`.
    ///
    /// Returns `false` when another assignment won the race.
    async fn insert_assignment(
        &self,
        user_id: Uuid,
        riddle_id: Uuid,
        date: NaiveDate,
    ) -> Result<bool, StoreError>;

    async fn find_riddle(&self, riddle_id: Uuid) -> Result<Option<Riddle>, StoreError>;

    /// Record the first answer for today's assignment.
    ///
    /// The assignment only moves from unanswered to answered once. For a
    /// correct answer `on_correct` computes the new streak counters from the
    /// current ones, and both writes become visible together.
    async fn record_answer(
        &self,
        answer: &NewAnswer,
        on_correct: &StreakUpdate,
    ) -> Result<AnswerOutcome, StoreError>;

    /// Active fact at position `seed % count` in `(created_at, id)` order.
    async fn select_active_fact(&self, seed: u64) -> Result<Option<Fact>, StoreError>;

    /// Profiles ordered by current streak then total correct answers.
    async fn leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardEntry>, StoreError>;

    async fn update_profile_settings(
        &self,
        user_id: Uuid,
        settings: &ProfileSettingsUpdate,
    ) -> Result<Option<Profile>, StoreError>;

    /// Users following `user_id`, newest first.
    async fn followers(&self, user_id: Uuid) -> Result<Vec<FollowEdge>, StoreError>;

    /// Users `user_id` follows, newest first.
    async fn following(&self, user_id: Uuid) -> Result<Vec<FollowEdge>, StoreError>;

    async fn achievements(&self, user_id: Uuid) -> Result<Vec<Achievement>, StoreError>;
}

/// Seeds are hashed to 64 bits; Postgres only has signed integers.
///
/// This is the position both stores pass to `select_active`.
pub const fn seed_to_i64(seed: u64) -> i64 {
    (seed >> 1) as i64
}
