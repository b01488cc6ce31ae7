#![allow(dead_code)]

use std::time::Duration;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rdl_db::{
    PgStore,
    models::{Fact, Riddle, StreakCounters},
};
use sqlx::{Executor, PgPool, Postgres};
use tokio::sync::OnceCell;
use uuid::Uuid;

static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// Store on the database named by `TEST_DATABASE_URL`, `None` when unset
pub async fn test_store() -> Option<PgStore> {
    let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL is not set, skipping PostgreSQL test");
        return None;
    };

    MIGRATED
        .get_or_init(|| async {
            let pool = rdl_db::create_pool(&database_url, 1, Duration::from_secs(5))
                .await
                .expect("Failed to connect to test database");
            rdl_db::ensure_db_and_migrate(&database_url, &pool)
                .await
                .expect("Failed to migrate test database");
            pool.close().await;
        })
        .await;

    let pool = rdl_db::create_pool(&database_url, 5, Duration::from_secs(5))
        .await
        .expect("Failed to connect to test database");
    Some(PgStore::new(pool))
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 6, 0, 0).unwrap()
}

/// Insert a profile with the given counters and return its id
pub async fn insert_profile(pool: &PgPool, current_streak: i32, total_correct: i32) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
            INSERT INTO profiles (id, name, email, current_streak, longest_streak, total_correct)
            VALUES ($1, $2, $3, $4, $4, $5)
        "#,
    )
    .bind(id)
    .bind(format!("Player {}", &id.to_string()[..8]))
    .bind(format!("{id}@example.com"))
    .bind(current_streak)
    .bind(total_correct)
    .execute(pool)
    .await
    .expect("Failed to insert profile");
    id
}

pub fn riddle(answer: &str, created_at: DateTime<Utc>) -> Riddle {
    Riddle {
        id: Uuid::new_v4(),
        text_en: format!("Riddle whose answer is {answer}"),
        text_ta: "புதிர்".to_string(),
        text_ta_en: "Puthir".to_string(),
        answer: answer.to_string(),
        category: "logic".to_string(),
        active: true,
        created_at,
    }
}

pub async fn insert_riddle<'e, E>(executor: E, riddle: &Riddle)
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r#"
            INSERT INTO riddles (id, text_en, text_ta, text_ta_en, answer, category, active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(riddle.id)
    .bind(&riddle.text_en)
    .bind(&riddle.text_ta)
    .bind(&riddle.text_ta_en)
    .bind(&riddle.answer)
    .bind(&riddle.category)
    .bind(riddle.active)
    .bind(riddle.created_at)
    .execute(executor)
    .await
    .expect("Failed to insert riddle");
}

pub fn fact(text: &str) -> Fact {
    Fact {
        id: Uuid::new_v4(),
        category: "nature".to_string(),
        fact_text: text.to_string(),
        source: None,
        active: true,
    }
}

pub async fn insert_fact<'e, E>(executor: E, fact: &Fact, created_at: DateTime<Utc>)
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r#"
            INSERT INTO facts (id, category, fact_text, source, active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(fact.id)
    .bind(&fact.category)
    .bind(&fact.fact_text)
    .bind(&fact.source)
    .bind(fact.active)
    .bind(created_at)
    .execute(executor)
    .await
    .expect("Failed to insert fact");
}

/// Plain streak bump used as the correct-answer update
pub fn bump(counters: StreakCounters) -> StreakCounters {
    let current_streak = counters.current_streak + 1;
    StreakCounters {
        current_streak,
        longest_streak: counters.longest_streak.max(current_streak),
        total_correct: counters.total_correct + 1,
        last_answered_date: Some(today()),
    }
}
