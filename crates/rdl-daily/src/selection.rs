//! Deterministic riddle-of-the-day and fact-of-the-day selection.
//!
//! The store orders its active rows by `(created_at, id)` and picks the row at
//! `seed % count`. The seed is the first eight bytes of a SHA-256 digest over
//! the day (and the user, for [`SelectionScope::PerUser`]), so the same inputs
//! always land on the same row while the active set is unchanged.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Whether every user gets their own riddle and fact or everybody shares one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum SelectionScope {
    /// Seed depends on the user and the day
    #[default]
    PerUser,
    /// Seed depends on the day only
    Global,
}

impl SelectionScope {
    /// Name used in configuration values and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PerUser => "per_user",
            Self::Global => "global",
        }
    }
}

impl fmt::Display for SelectionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per_user" => Ok(Self::PerUser),
            "global" => Ok(Self::Global),
            other => Err(format!(
                "Invalid selection scope: '{other}'. Expected 'per_user' or 'global'"
            )),
        }
    }
}

impl TryFrom<String> for SelectionScope {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Seed used to pick the riddle assigned on `date`.
pub fn riddle_seed(scope: SelectionScope, user_id: Uuid, date: NaiveDate) -> u64 {
    seed("riddle", scope, user_id, date)
}

/// Seed used to pick the reward fact shown on `date`.
pub fn fact_seed(scope: SelectionScope, user_id: Uuid, date: NaiveDate) -> u64 {
    seed("fact", scope, user_id, date)
}

fn seed(domain: &str, scope: SelectionScope, user_id: Uuid, date: NaiveDate) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(domain.as_bytes());
    hasher.update(b":");
    hasher.update(date.format("%Y-%m-%d").to_string().as_bytes());
    if scope == SelectionScope::PerUser {
        hasher.update(b":");
        hasher.update(user_id.as_bytes());
    }
    let digest = hasher.finalize();

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}
