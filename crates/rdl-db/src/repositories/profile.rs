use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{LeaderboardEntry, Profile, ProfileSettingsUpdate, StreakCounters};

pub async fn find_by_id<'e, E>(executor: E, user_id: Uuid) -> Result<Option<Profile>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT
                id, name, email, language, preferred_time, push_enabled,
                current_streak, longest_streak, total_correct,
                last_answered_date, last_riddle_id, created_at, updated_at
            FROM profiles
            WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

/// Read the streak counters and hold the row lock until the transaction ends.
pub async fn lock_streak<'e, E>(
    executor: E,
    user_id: Uuid,
) -> Result<Option<StreakCounters>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT current_streak, longest_streak, total_correct, last_answered_date
            FROM profiles
            WHERE id = $1
            FOR UPDATE
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

pub async fn update_streak<'e, E>(
    executor: E,
    user_id: Uuid,
    counters: &StreakCounters,
    riddle_id: Uuid,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE profiles
            SET current_streak = $2,
                longest_streak = $3,
                total_correct = $4,
                last_answered_date = $5,
                last_riddle_id = $6,
                updated_at = NOW()
            WHERE id = $1
        "#,
    )
    .bind(user_id)
    .bind(counters.current_streak)
    .bind(counters.longest_streak)
    .bind(counters.total_correct)
    .bind(counters.last_answered_date)
    .bind(riddle_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn update_settings<'e, E>(
    executor: E,
    user_id: Uuid,
    settings: &ProfileSettingsUpdate,
) -> Result<Option<Profile>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE profiles
            SET name = COALESCE($2, name),
                language = COALESCE($3, language),
                preferred_time = COALESCE($4, preferred_time),
                push_enabled = COALESCE($5, push_enabled),
                updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, name, email, language, preferred_time, push_enabled,
                current_streak, longest_streak, total_correct,
                last_answered_date, last_riddle_id, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(settings.name.as_deref())
    .bind(settings.language)
    .bind(settings.preferred_time)
    .bind(settings.push_enabled)
    .fetch_optional(executor)
    .await
}

pub async fn leaderboard<'e, E>(executor: E, limit: i64) -> Result<Vec<LeaderboardEntry>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, name, current_streak, total_correct
            FROM profiles
            ORDER BY current_streak DESC, total_correct DESC, name ASC
            LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(executor)
    .await
}
