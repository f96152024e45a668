// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory store with typed operations.
//!
//! Provides high-level operations for:
//! - Users (account, plan tier, freeze tokens)
//! - Quests (per-day task definitions)
//! - Completions (the ledger; unique per (user, quest, day))
//! - Streaks (one row per user)
//! - DayStats (one rollup row per (user, day))
//!
//! Atomic read-modify-write is exposed narrowly through per-key locks:
//! `streak_lock` serializes streak + freeze-token mutation per user, and
//! `rollup_lock` serializes DayStats upserts per (user, day). Callers hold
//! the lock across the whole read-compute-write sequence.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::models::{Completion, DayStats, Quest, Streak, User};

/// Shared store handle. Cloning is cheap; all clones see the same data.
#[derive(Clone, Default)]
pub struct Db {
    inner: Arc<DbInner>,
}

#[derive(Default)]
struct DbInner {
    users: DashMap<u64, User>,
    quests: DashMap<u64, Quest>,
    completions: DashMap<(u64, u64, NaiveDate), Completion>,
    streaks: DashMap<u64, Streak>,
    day_stats: DashMap<(u64, NaiveDate), DayStats>,
    /// Per-user locks serializing streak + freeze mutation
    streak_locks: DashMap<u64, Arc<Mutex<()>>>,
    /// Per-(user, day) locks serializing rollup upserts
    rollup_locks: DashMap<(u64, NaiveDate), Arc<Mutex<()>>>,
    next_quest_id: AtomicU64,
}

impl Db {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by ID.
    pub fn get_user(&self, user_id: u64) -> Result<Option<User>, AppError> {
        Ok(self.inner.users.get(&user_id).map(|u| u.clone()))
    }

    /// Create or update a user.
    pub fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        self.inner.users.insert(user.id, user.clone());
        Ok(())
    }

    /// All user IDs, for sweep endpoints.
    pub fn all_user_ids(&self) -> Result<Vec<u64>, AppError> {
        Ok(self.inner.users.iter().map(|u| *u.key()).collect())
    }

    // ─── Quest Operations ────────────────────────────────────────

    /// Insert a quest, assigning it a fresh ID.
    pub fn create_quest(&self, mut quest: Quest) -> Result<Quest, AppError> {
        quest.id = self.inner.next_quest_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.inner.quests.insert(quest.id, quest.clone());
        Ok(quest)
    }

    /// Get a quest by ID.
    pub fn get_quest(&self, quest_id: u64) -> Result<Option<Quest>, AppError> {
        Ok(self.inner.quests.get(&quest_id).map(|q| q.clone()))
    }

    /// Quests assigned to a user for a calendar day, in board order.
    pub fn quests_for_day(&self, user_id: u64, day: NaiveDate) -> Result<Vec<Quest>, AppError> {
        let mut quests: Vec<Quest> = self
            .inner
            .quests
            .iter()
            .filter(|q| q.user_id == user_id && q.date == day)
            .map(|q| q.clone())
            .collect();
        quests.sort_by_key(|q| (q.quest_type, q.order, q.id));
        Ok(quests)
    }

    /// Find the quest linked to an Asana task, if any.
    pub fn find_quest_by_asana_gid(&self, gid: &str) -> Result<Option<Quest>, AppError> {
        Ok(self
            .inner
            .quests
            .iter()
            .find(|q| q.asana_task_gid.as_deref() == Some(gid))
            .map(|q| q.clone()))
    }

    // ─── Completion Operations ───────────────────────────────────

    /// Insert a completion. Returns `false` (without mutation) if one
    /// already exists for the (user, quest, day) triple.
    pub fn insert_completion(&self, completion: &Completion) -> Result<bool, AppError> {
        use dashmap::mapref::entry::Entry;

        let key = (completion.user_id, completion.quest_id, completion.date);
        match self.inner.completions.entry(key) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(completion.clone());
                Ok(true)
            }
        }
    }

    /// Hard-delete a completion. Returns `false` if none existed.
    pub fn delete_completion(
        &self,
        user_id: u64,
        quest_id: u64,
        day: NaiveDate,
    ) -> Result<bool, AppError> {
        Ok(self
            .inner
            .completions
            .remove(&(user_id, quest_id, day))
            .is_some())
    }

    /// Completion record for a (user, quest, day) triple.
    pub fn get_completion(
        &self,
        user_id: u64,
        quest_id: u64,
        day: NaiveDate,
    ) -> Result<Option<Completion>, AppError> {
        Ok(self
            .inner
            .completions
            .get(&(user_id, quest_id, day))
            .map(|c| c.clone()))
    }

    /// All completions for a (user, day).
    pub fn completions_for_day(
        &self,
        user_id: u64,
        day: NaiveDate,
    ) -> Result<Vec<Completion>, AppError> {
        Ok(self
            .inner
            .completions
            .iter()
            .filter(|c| c.user_id == user_id && c.date == day)
            .map(|c| c.clone())
            .collect())
    }

    // ─── Streak Operations ───────────────────────────────────────

    /// Per-user lock for streak + freeze-token read-modify-write.
    ///
    /// Callers must hold the guard across the entire sequence; this is the
    /// sole serialization mechanism for streak state.
    pub fn streak_lock(&self, user_id: u64) -> Arc<Mutex<()>> {
        self.inner
            .streak_locks
            .entry(user_id)
            .or_default()
            .clone()
    }

    /// Get the streak row for a user.
    pub fn get_streak(&self, user_id: u64) -> Result<Option<Streak>, AppError> {
        Ok(self.inner.streaks.get(&user_id).map(|s| s.clone()))
    }

    /// Create or update a streak row.
    pub fn upsert_streak(&self, streak: &Streak) -> Result<(), AppError> {
        self.inner.streaks.insert(streak.user_id, streak.clone());
        Ok(())
    }

    // ─── DayStats Operations ─────────────────────────────────────

    /// Per-(user, day) lock for rollup upserts.
    pub fn rollup_lock(&self, user_id: u64, day: NaiveDate) -> Arc<Mutex<()>> {
        self.inner
            .rollup_locks
            .entry((user_id, day))
            .or_default()
            .clone()
    }

    /// Get the rollup row for a (user, day).
    pub fn get_day_stats(&self, user_id: u64, day: NaiveDate) -> Result<Option<DayStats>, AppError> {
        Ok(self
            .inner
            .day_stats
            .get(&(user_id, day))
            .map(|s| s.clone()))
    }

    /// Create or update a rollup row.
    pub fn upsert_day_stats(&self, stats: &DayStats) -> Result<(), AppError> {
        self.inner
            .day_stats
            .insert((stats.user_id, stats.date), stats.clone());
        Ok(())
    }

    /// Rollup rows for a user in `[start, end]`, sorted by date ascending.
    pub fn day_stats_range(
        &self,
        user_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DayStats>, AppError> {
        let mut rows: Vec<DayStats> = self
            .inner
            .day_stats
            .iter()
            .filter(|s| s.user_id == user_id && s.date >= start && s.date <= end)
            .map(|s| s.clone())
            .collect();
        rows.sort_by_key(|s| s.date);
        Ok(rows)
    }

    /// All rollup rows for a user, sorted by date ascending.
    pub fn all_day_stats(&self, user_id: u64) -> Result<Vec<DayStats>, AppError> {
        let mut rows: Vec<DayStats> = self
            .inner
            .day_stats
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.clone())
            .collect();
        rows.sort_by_key(|s| s.date);
        Ok(rows)
    }
}
