use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{Achievement, FollowEdge};

pub async fn followers<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<FollowEdge>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT p.id, p.name, f.follow_date
            FROM followers f
            JOIN profiles p ON p.id = f.follower_id
            WHERE f.following_id = $1
            ORDER BY f.follow_date DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}

pub async fn following<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<FollowEdge>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT p.id, p.name, f.follow_date
            FROM followers f
            JOIN profiles p ON p.id = f.following_id
            WHERE f.follower_id = $1
            ORDER BY f.follow_date DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}

pub async fn achievements<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<Achievement>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, user_id, badge_name, badge_icon, earned_date
            FROM achievements
            WHERE user_id = $1
            ORDER BY earned_date DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}
