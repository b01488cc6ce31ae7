use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rdl_daily::Streak;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Language a profile reads riddles in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "language_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Language {
    /// English
    #[default]
    En,
    /// Tamil
    Ta,
    /// Tamil written in Latin script
    TaEn,
}

/// User profile, created by the auth backend at sign-up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub language: Language,
    /// Time of day the user wants to be reminded
    pub preferred_time: NaiveTime,
    pub push_enabled: bool,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub total_correct: i32,
    pub last_answered_date: Option<NaiveDate>,
    /// Riddle of the last correct answer
    pub last_riddle_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Streak columns of a profile, read and written together
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StreakCounters {
    pub current_streak: i32,
    pub longest_streak: i32,
    pub total_correct: i32,
    pub last_answered_date: Option<NaiveDate>,
}

impl From<&Profile> for StreakCounters {
    fn from(profile: &Profile) -> Self {
        Self {
            current_streak: profile.current_streak,
            longest_streak: profile.longest_streak,
            total_correct: profile.total_correct,
            last_answered_date: profile.last_answered_date,
        }
    }
}

impl From<StreakCounters> for Streak {
    fn from(counters: StreakCounters) -> Self {
        Self {
            current: counters.current_streak,
            longest: counters.longest_streak,
            total_correct: counters.total_correct,
            last_answered_date: counters.last_answered_date,
        }
    }
}

impl From<Streak> for StreakCounters {
    fn from(streak: Streak) -> Self {
        Self {
            current_streak: streak.current,
            longest_streak: streak.longest,
            total_correct: streak.total_correct,
            last_answered_date: streak.last_answered_date,
        }
    }
}

/// Riddle content. The canonical answer never leaves the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Riddle {
    pub id: Uuid,
    pub text_en: String,
    pub text_ta: String,
    pub text_ta_en: String,
    #[serde(skip_serializing)]
    pub answer: String,
    pub category: String,
    #[serde(skip_serializing)]
    pub active: bool,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
}

/// A riddle assigned to a user for one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Assignment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub riddle_id: Uuid,
    pub assigned_date: NaiveDate,
    /// Set together with `is_correct` when the first answer is recorded
    pub answered_at: Option<DateTime<Utc>>,
    pub is_correct: Option<bool>,
    pub created_at: DateTime<Utc>,
}

impl Assignment {
    pub const fn is_answered(&self) -> bool {
        self.answered_at.is_some()
    }
}

/// Today's assignment joined with its riddle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodayAssignment {
    pub assignment: Assignment,
    pub riddle: Riddle,
}

/// Reward fact shown after a correct answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Fact {
    pub id: Uuid,
    pub category: String,
    pub fact_text: String,
    pub source: Option<String>,
    #[serde(skip_serializing, default)]
    pub active: bool,
}

/// Badge earned by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Achievement {
    pub id: Uuid,
    pub user_id: Uuid,
    pub badge_name: String,
    pub badge_icon: String,
    pub earned_date: DateTime<Utc>,
}

/// One row of the leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LeaderboardEntry {
    pub id: Uuid,
    pub name: String,
    pub current_streak: i32,
    pub total_correct: i32,
}

/// The other end of a follow edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FollowEdge {
    pub id: Uuid,
    pub name: String,
    pub follow_date: DateTime<Utc>,
}

/// Settings a user may change on their own profile. `None` keeps the value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSettingsUpdate {
    pub name: Option<String>,
    pub language: Option<Language>,
    pub preferred_time: Option<NaiveTime>,
    pub push_enabled: Option<bool>,
}

/// First answer for today's assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnswer {
    pub user_id: Uuid,
    pub riddle_id: Uuid,
    pub assigned_date: NaiveDate,
    pub answered_at: DateTime<Utc>,
    pub is_correct: bool,
}

/// Result of trying to record an answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// The answer was stored. `streak` holds the new counters for a correct answer.
    Recorded {
        assignment: Assignment,
        streak: Option<StreakCounters>,
    },
    /// The assignment already carries an answer, nothing was changed
    AlreadyAnswered(Assignment),
    /// Today's assignment is for another riddle
    RiddleMismatch { assigned_riddle_id: Uuid },
    /// No riddle was assigned to the user today
    NotAssigned,
}
