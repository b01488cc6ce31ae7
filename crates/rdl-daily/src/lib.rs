//! Daily riddle rules.
//!
//! This crate holds the pure parts of the daily riddle workflow: how a
//! submitted answer is compared with the canonical one, how a streak moves
//! forward after a correct answer, and how the riddle and fact of the day are
//! picked from the active set. Nothing here touches the database.

pub mod answer;
pub mod selection;
pub mod streak;

pub use answer::{is_correct_answer, normalize_answer};
pub use selection::{SelectionScope, fact_seed, riddle_seed};
pub use streak::{Streak, StreakPolicy};
