use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rdl_db::models::{Language, Profile, ProfileSettingsUpdate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;

/// Most rows the leaderboard returns
pub const LEADERBOARD_MAX: i64 = 50;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<i64>,
}

impl LeaderboardQuery {
    /// Requested limit clamped to `1..=50`, 50 when absent.
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(LEADERBOARD_MAX)
            .clamp(1, LEADERBOARD_MAX)
    }
}

/// `GET /profiles/{user_id}` body: everything for the owner, the public part for others.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ProfileView {
    Own(Profile),
    Public(PublicProfile),
}

/// Profile as other users see it, without contact details or settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub name: String,
    pub language: Language,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub total_correct: i32,
    pub last_answered_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl From<Profile> for PublicProfile {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            language: profile.language,
            current_streak: profile.current_streak,
            longest_streak: profile.longest_streak,
            total_correct: profile.total_correct,
            last_answered_date: profile.last_answered_date,
            created_at: profile.created_at,
        }
    }
}

/// Body of `PATCH /profiles/{user_id}`. Absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateSettingsRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    pub name: Option<String>,
    pub language: Option<Language>,
    pub preferred_time: Option<NaiveTime>,
    pub push_enabled: Option<bool>,
}

impl UpdateSettingsRequest {
    /// Trim the name and reject an update that changes nothing.
    pub fn into_update(self) -> Result<ProfileSettingsUpdate, ApiError> {
        let name = match self.name {
            Some(name) if name.trim().is_empty() => {
                return Err(ApiError::Validation("name: must not be empty".to_string()));
            }
            Some(name) => Some(name.trim().to_string()),
            None => None,
        };

        let update = ProfileSettingsUpdate {
            name,
            language: self.language,
            preferred_time: self.preferred_time,
            push_enabled: self.push_enabled,
        };

        if update == ProfileSettingsUpdate::default() {
            return Err(ApiError::Validation("No settings to update".to_string()));
        }

        Ok(update)
    }
}
