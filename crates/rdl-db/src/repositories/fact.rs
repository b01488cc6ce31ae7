use sqlx::{Executor, Postgres};

use crate::models::Fact;

/// Same walk as [`crate::repositories::riddle::select_active`], over facts.
pub async fn select_active<'e, E>(executor: E, position: i64) -> Result<Option<Fact>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            WITH active_facts AS (
                SELECT
                    id, category, fact_text, source, active,
                    ROW_NUMBER() OVER (ORDER BY created_at, id) - 1 AS position,
                    COUNT(*) OVER () AS total
                FROM facts
                WHERE active
            )
            SELECT id, category, fact_text, source, active
            FROM active_facts
            WHERE position = $1 % total
        "#,
    )
    .bind(position)
    .fetch_optional(executor)
    .await
}
