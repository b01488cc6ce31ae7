use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{Assignment, NewAnswer, Riddle, TodayAssignment};

/// Flat row of `user_riddles` joined with `riddles`
#[derive(sqlx::FromRow)]
struct AssignmentRiddleRow {
    assignment_id: Uuid,
    user_id: Uuid,
    riddle_id: Uuid,
    assigned_date: NaiveDate,
    answered_at: Option<DateTime<Utc>>,
    is_correct: Option<bool>,
    assignment_created_at: DateTime<Utc>,
    text_en: String,
    text_ta: String,
    text_ta_en: String,
    answer: String,
    category: String,
    active: bool,
    riddle_created_at: DateTime<Utc>,
}

impl From<AssignmentRiddleRow> for TodayAssignment {
    fn from(row: AssignmentRiddleRow) -> Self {
        Self {
            assignment: Assignment {
                id: row.assignment_id,
                user_id: row.user_id,
                riddle_id: row.riddle_id,
                assigned_date: row.assigned_date,
                answered_at: row.answered_at,
                is_correct: row.is_correct,
                created_at: row.assignment_created_at,
            },
            riddle: Riddle {
                id: row.riddle_id,
                text_en: row.text_en,
                text_ta: row.text_ta,
                text_ta_en: row.text_ta_en,
                answer: row.answer,
                category: row.category,
                active: row.active,
                created_at: row.riddle_created_at,
            },
        }
    }
}

pub async fn find_with_riddle<'e, E>(
    executor: E,
    user_id: Uuid,
    assigned_date: NaiveDate,
) -> Result<Option<TodayAssignment>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let row: Option<AssignmentRiddleRow> = sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT
                ur.id AS assignment_id,
                ur.user_id,
                ur.riddle_id,
                ur.assigned_date,
                ur.answered_at,
                ur.is_correct,
                ur.created_at AS assignment_created_at,
                r.text_en,
                r.text_ta,
                r.text_ta_en,
                r.answer,
                r.category,
                r.active,
                r.created_at AS riddle_created_at
            FROM user_riddles ur
            JOIN riddles r ON r.id = ur.riddle_id
            WHERE ur.user_id = $1 AND ur.assigned_date = $2
        "#,
    )
    .bind(user_id)
    .bind(assigned_date)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(TodayAssignment::from))
}

pub async fn find_by_user_and_date<'e, E>(
    executor: E,
    user_id: Uuid,
    assigned_date: NaiveDate,
) -> Result<Option<Assignment>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, user_id, riddle_id, assigned_date, answered_at, is_correct, created_at
            FROM user_riddles
            WHERE user_id = $1 AND assigned_date = $2
        "#,
    )
    .bind(user_id)
    .bind(assigned_date)
    .fetch_optional(executor)
    .await
}

/// Insert the day's assignment. The unique `(user_id, assigned_date)`
/// constraint turns a losing concurrent insert into a no-op.
pub async fn insert_if_absent<'e, E>(
    executor: E,
    user_id: Uuid,
    riddle_id: Uuid,
    assigned_date: NaiveDate,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO user_riddles (user_id, riddle_id, assigned_date)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, assigned_date) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(riddle_id)
    .bind(assigned_date)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Store the answer only if the assignment has not been answered yet.
///
/// Returns `None` when no unanswered assignment for that riddle exists.
pub async fn mark_answered<'e, E>(
    executor: E,
    answer: &NewAnswer,
) -> Result<Option<Assignment>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE user_riddles
            SET answered_at = $4, is_correct = $5
            WHERE user_id = $1
                AND assigned_date = $2
                AND riddle_id = $3
                AND answered_at IS NULL
            RETURNING id, user_id, riddle_id, assigned_date, answered_at, is_correct, created_at
        "#,
    )
    .bind(answer.user_id)
    .bind(answer.assigned_date)
    .bind(answer.riddle_id)
    .bind(answer.answered_at)
    .bind(answer.is_correct)
    .fetch_optional(executor)
    .await
}
