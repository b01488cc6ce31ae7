//! In-memory [`RiddleStore`] used as a test double.
//!
//! It keeps the same guarantees the PostgreSQL schema gives: one assignment
//! per user and day, the first answer wins, and a correct answer updates the
//! assignment and the streak together. Every operation runs under one lock.
//!
//! [`MemoryStore::interleave`] makes every call yield to the runtime before it
//! touches the state, so requests joined on one task really overlap.

use std::{
    collections::HashMap,
    sync::{
        Mutex, MutexGuard,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    models::{
        Achievement, AnswerOutcome, Assignment, Fact, FollowEdge, LeaderboardEntry, NewAnswer,
        Profile, ProfileSettingsUpdate, Riddle, StreakCounters, TodayAssignment,
    },
    store::{RiddleStore, StoreError, StreakUpdate, seed_to_i64},
};

#[derive(Debug, Default)]
struct MemoryState {
    profiles: HashMap<Uuid, Profile>,
    riddles: Vec<Riddle>,
    facts: Vec<(DateTime<Utc>, Fact)>,
    assignments: HashMap<(Uuid, NaiveDate), Assignment>,
    achievements: Vec<Achievement>,
    follows: Vec<(Uuid, Uuid, DateTime<Utc>)>,
    unavailable: bool,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    interleave: AtomicBool,
    lost_inserts: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Yield before every store call from now on.
    pub fn interleave(&self, enabled: bool) {
        self.interleave.store(enabled, Ordering::Relaxed);
    }

    /// Number of assignment inserts that found the day already taken.
    pub fn lost_inserts(&self) -> usize {
        self.lost_inserts.load(Ordering::Relaxed)
    }

    async fn pause(&self) {
        if self.interleave.load(Ordering::Relaxed) {
            tokio::task::yield_now().await;
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A poisoned lock only means a test panicked while holding it
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn available(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        let state = self.lock();
        if state.unavailable {
            return Err(StoreError::Unavailable(
                "memory store switched off".to_string(),
            ));
        }
        Ok(state)
    }

    /// Make every following call fail, to exercise error paths.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    pub fn insert_profile(&self, profile: Profile) {
        self.lock().profiles.insert(profile.id, profile);
    }

    pub fn insert_riddle(&self, riddle: Riddle) {
        let mut state = self.lock();
        state.riddles.push(riddle);
        state
            .riddles
            .sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
    }

    pub fn insert_fact(&self, fact: Fact, created_at: DateTime<Utc>) {
        let mut state = self.lock();
        state.facts.push((created_at, fact));
        state
            .facts
            .sort_by(|a, b| (a.0, a.1.id).cmp(&(b.0, b.1.id)));
    }

    pub fn insert_achievement(&self, achievement: Achievement) {
        self.lock().achievements.push(achievement);
    }

    pub fn insert_follow(&self, follower_id: Uuid, following_id: Uuid, follow_date: DateTime<Utc>) {
        let mut state = self.lock();
        if follower_id != following_id
            && !state
                .follows
                .iter()
                .any(|(from, to, _)| *from == follower_id && *to == following_id)
        {
            state.follows.push((follower_id, following_id, follow_date));
        }
    }

    /// Every assignment stored for `user_id`, oldest day first.
    pub fn assignments_for(&self, user_id: Uuid) -> Vec<Assignment> {
        let mut assignments: Vec<Assignment> = self
            .lock()
            .assignments
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        assignments.sort_by_key(|a| a.assigned_date);
        assignments
    }

    fn edges(state: &MemoryState, user_id: Uuid, incoming: bool) -> Vec<FollowEdge> {
        let mut edges: Vec<FollowEdge> = state
            .follows
            .iter()
            .filter_map(|(from, to, date)| {
                let other = match incoming {
                    true if *to == user_id => *from,
                    false if *from == user_id => *to,
                    _ => return None,
                };
                state.profiles.get(&other).map(|p| FollowEdge {
                    id: p.id,
                    name: p.name.clone(),
                    follow_date: *date,
                })
            })
            .collect();
        edges.sort_by(|a, b| b.follow_date.cmp(&a.follow_date));
        edges
    }
}

fn pick<T>(items: &[T], seed: u64) -> Option<&T> {
    if items.is_empty() {
        return None;
    }
    let position = seed_to_i64(seed) % items.len() as i64;
    items.get(position as usize)
}

#[async_trait]
impl RiddleStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.available().map(|_| ())
    }

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
        self.pause().await;
        Ok(self.available()?.profiles.get(&user_id).cloned())
    }

    async fn find_assignment(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<TodayAssignment>, StoreError> {
        self.pause().await;
        let state = self.available()?;
        let Some(assignment) = state.assignments.get(&(user_id, date)) else {
            return Ok(None);
        };
        let riddle = state
            .riddles
            .iter()
            .find(|r| r.id == assignment.riddle_id)
            .cloned()
            .ok_or_else(|| {
                StoreError::Constraint(format!("riddle {} does not exist", assignment.riddle_id))
            })?;

        Ok(Some(TodayAssignment {
            assignment: assignment.clone(),
            riddle,
        }))
    }

    async fn select_active_riddle(&self, seed: u64) -> Result<Option<Riddle>, StoreError> {
        self.pause().await;
        let state = self.available()?;
        let active: Vec<&Riddle> = state.riddles.iter().filter(|r| r.active).collect();
        Ok(pick(&active, seed).map(|r| (*r).clone()))
    }

    async fn insert_assignment(
        &self,
        user_id: Uuid,
        riddle_id: Uuid,
        date: NaiveDate,
    ) -> Result<bool, StoreError> {
        self.pause().await;
        let mut state = self.available()?;
        if !state.profiles.contains_key(&user_id) {
            return Err(StoreError::Constraint(format!(
                "profile {user_id} does not exist"
            )));
        }
        if !state.riddles.iter().any(|r| r.id == riddle_id) {
            return Err(StoreError::Constraint(format!(
                "riddle {riddle_id} does not exist"
            )));
        }
        if state.assignments.contains_key(&(user_id, date)) {
            self.lost_inserts.fetch_add(1, Ordering::Relaxed);
            return Ok(false);
        }

        state.assignments.insert(
            (user_id, date),
            Assignment {
                id: Uuid::new_v4(),
                user_id,
                riddle_id,
                assigned_date: date,
                answered_at: None,
                is_correct: None,
                created_at: Utc::now(),
            },
        );
        Ok(true)
    }

    async fn find_riddle(&self, riddle_id: Uuid) -> Result<Option<Riddle>, StoreError> {
        self.pause().await;
        Ok(self
            .available()?
            .riddles
            .iter()
            .find(|r| r.id == riddle_id)
            .cloned())
    }

    async fn record_answer(
        &self,
        answer: &NewAnswer,
        on_correct: &StreakUpdate,
    ) -> Result<AnswerOutcome, StoreError> {
        self.pause().await;
        let mut state = self.available()?;
        let key = (answer.user_id, answer.assigned_date);

        let Some(existing) = state.assignments.get(&key).cloned() else {
            return Ok(AnswerOutcome::NotAssigned);
        };
        if existing.riddle_id != answer.riddle_id {
            return Ok(AnswerOutcome::RiddleMismatch {
                assigned_riddle_id: existing.riddle_id,
            });
        }
        if existing.is_answered() {
            return Ok(AnswerOutcome::AlreadyAnswered(existing));
        }

        let streak = if answer.is_correct {
            let profile = state.profiles.get_mut(&answer.user_id).ok_or_else(|| {
                StoreError::Constraint(format!("profile {} does not exist", answer.user_id))
            })?;
            let next = on_correct(StreakCounters::from(&*profile));
            profile.current_streak = next.current_streak;
            profile.longest_streak = next.longest_streak;
            profile.total_correct = next.total_correct;
            profile.last_answered_date = next.last_answered_date;
            profile.last_riddle_id = Some(answer.riddle_id);
            profile.updated_at = Utc::now();
            Some(next)
        } else {
            None
        };

        let recorded = Assignment {
            answered_at: Some(answer.answered_at),
            is_correct: Some(answer.is_correct),
            ..existing
        };
        state.assignments.insert(key, recorded.clone());

        Ok(AnswerOutcome::Recorded {
            assignment: recorded,
            streak,
        })
    }

    async fn select_active_fact(&self, seed: u64) -> Result<Option<Fact>, StoreError> {
        self.pause().await;
        let state = self.available()?;
        let active: Vec<&Fact> = state
            .facts
            .iter()
            .map(|(_, fact)| fact)
            .filter(|f| f.active)
            .collect();
        Ok(pick(&active, seed).map(|f| (*f).clone()))
    }

    async fn leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let state = self.available()?;
        let mut entries: Vec<LeaderboardEntry> = state
            .profiles
            .values()
            .map(|p| LeaderboardEntry {
                id: p.id,
                name: p.name.clone(),
                current_streak: p.current_streak,
                total_correct: p.total_correct,
            })
            .collect();
        entries.sort_by(|a, b| {
            b.current_streak
                .cmp(&a.current_streak)
                .then(b.total_correct.cmp(&a.total_correct))
                .then_with(|| a.name.cmp(&b.name))
        });
        entries.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        Ok(entries)
    }

    async fn update_profile_settings(
        &self,
        user_id: Uuid,
        settings: &ProfileSettingsUpdate,
    ) -> Result<Option<Profile>, StoreError> {
        let mut state = self.available()?;
        let Some(profile) = state.profiles.get_mut(&user_id) else {
            return Ok(None);
        };

        if let Some(name) = &settings.name {
            profile.name.clone_from(name);
        }
        if let Some(language) = settings.language {
            profile.language = language;
        }
        if let Some(preferred_time) = settings.preferred_time {
            profile.preferred_time = preferred_time;
        }
        if let Some(push_enabled) = settings.push_enabled {
            profile.push_enabled = push_enabled;
        }
        profile.updated_at = Utc::now();

        Ok(Some(profile.clone()))
    }

    async fn followers(&self, user_id: Uuid) -> Result<Vec<FollowEdge>, StoreError> {
        let state = self.available()?;
        Ok(Self::edges(&state, user_id, true))
    }

    async fn following(&self, user_id: Uuid) -> Result<Vec<FollowEdge>, StoreError> {
        let state = self.available()?;
        Ok(Self::edges(&state, user_id, false))
    }

    async fn achievements(&self, user_id: Uuid) -> Result<Vec<Achievement>, StoreError> {
        let state = self.available()?;
        let mut achievements: Vec<Achievement> = state
            .achievements
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        achievements.sort_by(|a, b| b.earned_date.cmp(&a.earned_date));
        Ok(achievements)
    }
}
