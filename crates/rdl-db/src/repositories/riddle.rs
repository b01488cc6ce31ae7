use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::Riddle;

pub async fn find_by_id<'e, E>(executor: E, riddle_id: Uuid) -> Result<Option<Riddle>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, text_en, text_ta, text_ta_en, answer, category, active, created_at
            FROM riddles
            WHERE id = $1
        "#,
    )
    .bind(riddle_id)
    .fetch_optional(executor)
    .await
}

/// Pick the active riddle at `position % count`, walking the active set in
/// `(created_at, id)` order. Counting and picking happen in one statement so a
/// concurrent deactivation cannot push the position past the end.
pub async fn select_active<'e, E>(executor: E, position: i64) -> Result<Option<Riddle>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            WITH active_riddles AS (
                SELECT
                    id, text_en, text_ta, text_ta_en, answer, category, active, created_at,
                    ROW_NUMBER() OVER (ORDER BY created_at, id) - 1 AS position,
                    COUNT(*) OVER () AS total
                FROM riddles
                WHERE active
            )
            SELECT id, text_en, text_ta, text_ta_en, answer, category, active, created_at
            FROM active_riddles
            WHERE position = $1 % total
        "#,
    )
    .bind(position)
    .fetch_optional(executor)
    .await
}
