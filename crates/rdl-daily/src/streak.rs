//! Streak bookkeeping after a correct answer.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How the current streak moves forward when a riddle is answered correctly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum StreakPolicy {
    /// Every correct answer adds one to the streak, even after skipped days.
    #[default]
    Unconditional,
    /// The streak only grows when the previous correct answer was yesterday,
    /// otherwise it restarts at one.
    Consecutive,
}

impl StreakPolicy {
    /// Name used in configuration values and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unconditional => "unconditional",
            Self::Consecutive => "consecutive",
        }
    }
}

impl fmt::Display for StreakPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreakPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unconditional" => Ok(Self::Unconditional),
            "consecutive" => Ok(Self::Consecutive),
            other => Err(format!(
                "Invalid streak policy: '{other}'. Expected 'unconditional' or 'consecutive'"
            )),
        }
    }
}

impl TryFrom<String> for StreakPolicy {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Streak counters stored on a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    /// Number of correct answers in the running streak
    pub current: i32,
    /// Best streak ever reached, never below `current` after an update
    pub longest: i32,
    /// Total number of correct answers
    pub total_correct: i32,
    /// Day of the last correct answer
    pub last_answered_date: Option<NaiveDate>,
}

impl Streak {
    /// Compute the counters after a correct answer given on `today`.
    ///
    /// `total_correct` always grows by one and `last_answered_date` becomes
    /// `today`. The new current streak follows `policy`; the longest streak is
    /// the maximum of the new current streak and the previous longest one.
    #[must_use]
    pub fn after_correct_answer(self, today: NaiveDate, policy: StreakPolicy) -> Self {
        let current = match policy {
            StreakPolicy::Unconditional => self.current.max(0).saturating_add(1),
            StreakPolicy::Consecutive => {
                let yesterday = today.pred_opt();
                if self.last_answered_date.is_some() && self.last_answered_date == yesterday {
                    self.current.max(0).saturating_add(1)
                } else {
                    1
                }
            }
        };

        Self {
            current,
            longest: current.max(self.longest),
            total_correct: self.total_correct.max(0).saturating_add(1),
            last_answered_date: Some(today),
        }
    }
}
