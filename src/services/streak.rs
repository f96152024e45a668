// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Streak engine.
//!
//! Owns the current/longest streak counters and the streak-freeze resource
//! per user. Handles the core transition:
//! 1. First-ever completion creates the streak row at 1
//! 2. Repeat activity on the same day is a no-op (idempotent)
//! 3. A consecutive day increments the streak
//! 4. A gap of exactly one missed day can be covered by a freeze token
//!    (paid plans only); anything longer breaks the streak
//! 5. Milestone crossings are detected and returned, never acted on here
//!
//! "Today" is always the caller-supplied `activity_day`; the engine never
//! reads the ambient clock, so tests can drive arbitrary day sequences.

use chrono::NaiveDate;
use serde::Serialize;

use crate::db::Db;
use crate::error::{AppError, Result};
use crate::models::Streak;
use crate::time_utils::gap_days;

/// Ascending streak-length thresholds that report a milestone when first
/// reached. Product-configurable via `StreakEngine::with_milestones`.
pub const DEFAULT_MILESTONES: [u32; 5] = [3, 7, 14, 30, 100];

/// A freeze covers exactly this many calendar days of gap: the consecutive
/// day (1) plus one missed day. Longer gaps always break the streak.
const FREEZE_COVERED_GAP: i64 = 2;

/// Result of recording activity, for the caller to drive notifications,
/// sounds, and achievement checks. The engine performs no side effects
/// beyond its own rows.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StreakUpdate {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub multiplier: u32,
    /// Smallest milestone threshold newly crossed by this update, if any
    pub crossed_milestone: Option<u32>,
}

/// Outcome of a successful manual freeze.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FreezeOutcome {
    pub frozen_today: bool,
    pub freezes_remaining: u32,
}

/// XP multiplier for a streak length. Pure and total.
pub fn multiplier_for(current_streak: u32) -> u32 {
    if current_streak >= 30 {
        3
    } else if current_streak >= 7 {
        2
    } else {
        1
    }
}

/// Maintains per-user streak state as a function of daily activity.
#[derive(Clone)]
pub struct StreakEngine {
    db: Db,
    milestones: Vec<u32>,
}

impl StreakEngine {
    pub fn new(db: Db) -> Self {
        Self::with_milestones(db, DEFAULT_MILESTONES.to_vec())
    }

    /// Engine with a custom ascending milestone list.
    pub fn with_milestones(db: Db, milestones: Vec<u32>) -> Self {
        Self { db, milestones }
    }

    /// Record that a user did *something* on `activity_day`.
    ///
    /// Called once per user on the transition from zero completions on a
    /// day to at least one; per-quest granularity is meaningless here.
    /// Serialized per user via the store's streak lock, so concurrent
    /// completions cannot double-increment the streak or double-spend a
    /// freeze token.
    pub async fn record_activity(&self, user_id: u64, activity_day: NaiveDate) -> Result<StreakUpdate> {
        let lock = self.db.streak_lock(user_id);
        let _guard = lock.lock().await;

        let mut user = self
            .db
            .get_user(user_id)?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        let Some(streak) = self.db.get_streak(user_id)? else {
            // First-ever completion
            let streak = Streak::first_activity(user_id, activity_day);
            self.db.upsert_streak(&streak)?;
            tracing::info!(user_id, day = %activity_day, "Streak created");
            return Ok(StreakUpdate {
                current_streak: 1,
                longest_streak: 1,
                multiplier: multiplier_for(1),
                crossed_milestone: None,
            });
        };

        // Already counted today: idempotent no-op
        if streak.last_active_date == activity_day {
            return Ok(StreakUpdate {
                current_streak: streak.current_streak,
                longest_streak: streak.longest_streak,
                multiplier: multiplier_for(streak.current_streak),
                crossed_milestone: None,
            });
        }

        let gap = gap_days(streak.last_active_date, activity_day);

        // Out-of-order/backfilled event: ignore without mutating state,
        // so webhook replays of old events stay harmless.
        if gap < 0 {
            tracing::warn!(
                user_id,
                day = %activity_day,
                last_active = %streak.last_active_date,
                "Ignoring out-of-order activity"
            );
            return Ok(StreakUpdate {
                current_streak: streak.current_streak,
                longest_streak: streak.longest_streak,
                multiplier: multiplier_for(streak.current_streak),
                crossed_milestone: None,
            });
        }

        let previous = streak.current_streak;
        let mut freeze_spent = false;

        let continued = if gap == 1 {
            true
        } else if gap == FREEZE_COVERED_GAP {
            if streak.freeze_consumed_today {
                // Manual reservation already paid for this gap
                true
            } else if user.plan.allows_streak_freezes() && user.streak_freezes > 0 {
                freeze_spent = true;
                true
            } else {
                false
            }
        } else {
            false
        };

        if freeze_spent {
            user.streak_freezes -= 1;
            self.db.upsert_user(&user)?;
            tracing::info!(
                user_id,
                remaining = user.streak_freezes,
                "Streak freeze consumed"
            );
        }

        let current_streak = if continued { previous + 1 } else { 1 };
        let longest_streak = streak.longest_streak.max(current_streak);
        let crossed_milestone = crossed_milestone(&self.milestones, previous, current_streak);

        self.db.upsert_streak(&Streak {
            user_id,
            current_streak,
            longest_streak,
            last_active_date: activity_day,
            freeze_consumed_today: false,
        })?;

        tracing::debug!(
            user_id,
            day = %activity_day,
            current_streak,
            longest_streak,
            continued,
            "Streak updated"
        );

        Ok(StreakUpdate {
            current_streak,
            longest_streak,
            multiplier: multiplier_for(current_streak),
            crossed_milestone,
        })
    }

    /// Pre-emptively reserve a freeze for today ("I know I'll miss
    /// tomorrow"). The reservation is consumed by the next gap-day branch
    /// of `record_activity`, or forfeited if the user stays active.
    pub async fn consume_freeze_manually(&self, user_id: u64) -> Result<FreezeOutcome> {
        let lock = self.db.streak_lock(user_id);
        let _guard = lock.lock().await;

        let mut user = self
            .db
            .get_user(user_id)?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        if !user.plan.allows_streak_freezes() {
            return Err(AppError::BadRequest(
                "Streak freezes require a paid plan".to_string(),
            ));
        }
        if user.streak_freezes == 0 {
            return Err(AppError::BadRequest(
                "No streak freezes available".to_string(),
            ));
        }

        let mut streak = self
            .db
            .get_streak(user_id)?
            .ok_or_else(|| AppError::BadRequest("No active streak to freeze".to_string()))?;

        if streak.freeze_consumed_today {
            return Err(AppError::BadRequest(
                "Streak already frozen today".to_string(),
            ));
        }

        user.streak_freezes -= 1;
        streak.freeze_consumed_today = true;
        self.db.upsert_user(&user)?;
        self.db.upsert_streak(&streak)?;

        tracing::info!(
            user_id,
            remaining = user.streak_freezes,
            "Manual streak freeze applied"
        );

        Ok(FreezeOutcome {
            frozen_today: true,
            freezes_remaining: user.streak_freezes,
        })
    }
}

/// Smallest milestone threshold in `milestones` (ascending) that `new`
/// meets or exceeds but `previous` did not.
fn crossed_milestone(milestones: &[u32], previous: u32, new: u32) -> Option<u32> {
    milestones
        .iter()
        .copied()
        .find(|&m| previous < m && new >= m)
}
