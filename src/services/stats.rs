// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Points/stats aggregator.
//!
//! Maintains the per-(user, day) DayStats rollup and the read-side
//! aggregations built on it. The rollup is a cache over the completion
//! ledger, never a source of truth: `recompute_day` is idempotent and safe
//! to call any number of times.

use std::collections::HashSet;

use chrono::{Days, NaiveDate};

use crate::db::Db;
use crate::error::Result;
use crate::models::DayStats;
use crate::time_utils::gap_days;

/// How far back the display-streak walk looks before giving up.
const STREAK_WALK_LIMIT_DAYS: u64 = 365;

#[derive(Clone)]
pub struct StatsService {
    db: Db,
}

impl StatsService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Recompute the rollup for a (user, day) from the quest list and the
    /// completion ledger, and upsert it. Serialized per (user, day) so
    /// concurrent toggles cannot interleave lost updates.
    pub async fn recompute_day(&self, user_id: u64, day: NaiveDate) -> Result<DayStats> {
        let lock = self.db.rollup_lock(user_id, day);
        let _guard = lock.lock().await;

        let quests = self.db.quests_for_day(user_id, day)?;
        let completed: HashSet<u64> = self
            .db
            .completions_for_day(user_id, day)?
            .into_iter()
            .map(|c| c.quest_id)
            .collect();

        let stats = DayStats::compute(user_id, day, &quests, &completed);
        self.db.upsert_day_stats(&stats)?;

        tracing::debug!(
            user_id,
            day = %day,
            points = stats.total_points,
            completed = stats.quests_completed,
            total = stats.quests_total,
            "Day rollup recomputed"
        );

        Ok(stats)
    }

    /// Sum of rollup points over `[week_start, week_end]`.
    pub async fn weekly_total(
        &self,
        user_id: u64,
        week_start: NaiveDate,
        week_end: NaiveDate,
    ) -> Result<u32> {
        let rows = self.db.day_stats_range(user_id, week_start, week_end)?;
        Ok(rows.iter().map(|s| s.total_points).sum())
    }

    /// All-time point total. Recomputes today's rollup first so the
    /// in-progress day is counted exactly once, never from a stale row.
    pub async fn all_time_total(&self, user_id: u64, today: NaiveDate) -> Result<u32> {
        self.recompute_day(user_id, today).await?;
        let rows = self.db.all_day_stats(user_id)?;
        Ok(rows.iter().map(|s| s.total_points).sum())
    }

    /// Display streak: walk DayStats backward from `today` while days have
    /// at least one completed quest.
    ///
    /// A secondary, derivable view for UI/recovery; the Streak row stays
    /// authoritative (it knows about frozen days, this walk does not).
    /// Missing rows are treated as inactive days, never as errors.
    pub async fn current_streak_display(&self, user_id: u64, today: NaiveDate) -> Result<u32> {
        let mut streak = 0;
        let mut day = today;

        for _ in 0..=STREAK_WALK_LIMIT_DAYS {
            match self.db.get_day_stats(user_id, day)? {
                Some(stats) if stats.quests_completed > 0 => streak += 1,
                _ if day == today => {
                    // An idle "today" doesn't break yesterday's chain
                }
                _ => break,
            }
            let Some(previous) = day.checked_sub_days(Days::new(1)) else {
                break;
            };
            day = previous;
        }

        Ok(streak)
    }

    /// Longest run of consecutive active days reconstructed from the
    /// rollup history. Used for the "best streak" display; tolerates gaps
    /// and days with zero completions.
    pub async fn best_streak_display(&self, user_id: u64) -> Result<u32> {
        let rows = self.db.all_day_stats(user_id)?;

        let mut best: u32 = 0;
        let mut run: u32 = 0;
        let mut last_active: Option<NaiveDate> = None;

        for stats in rows {
            if stats.quests_completed > 0 {
                run = match last_active {
                    Some(prev) if gap_days(prev, stats.date) == 1 => run + 1,
                    _ => 1,
                };
                best = best.max(run);
                last_active = Some(stats.date);
            } else {
                run = 0;
                last_active = None;
            }
        }

        Ok(best)
    }

    /// Rollup rows for the last `n` days ending at `today`, oldest first.
    /// Days without a stored row are returned as zero rows so charts get a
    /// dense series.
    pub async fn last_n_days(
        &self,
        user_id: u64,
        today: NaiveDate,
        n: u64,
    ) -> Result<Vec<DayStats>> {
        let start = today
            .checked_sub_days(Days::new(n.saturating_sub(1)))
            .unwrap_or(today);
        let stored = self.db.day_stats_range(user_id, start, today)?;

        let mut series = Vec::with_capacity(n as usize);
        let mut day = start;
        let mut iter = stored.into_iter().peekable();
        while day <= today {
            let row = match iter.peek() {
                Some(s) if s.date == day => iter.next().unwrap(),
                _ => DayStats {
                    user_id,
                    date: day,
                    total_points: 0,
                    quests_completed: 0,
                    quests_total: 0,
                },
            };
            series.push(row);
            let Some(next) = day.checked_add_days(Days::new(1)) else {
                break;
            };
            day = next;
        }

        Ok(series)
    }

    /// All-time completion ratio in percent, rounded.
    pub async fn completion_rate(&self, user_id: u64) -> Result<u32> {
        let rows = self.db.all_day_stats(user_id)?;
        let total: u32 = rows.iter().map(|s| s.quests_total).sum();
        let completed: u32 = rows.iter().map(|s| s.quests_completed).sum();

        if total == 0 {
            return Ok(0);
        }
        Ok(((completed as f64 / total as f64) * 100.0).round() as u32)
    }
}
