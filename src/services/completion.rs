// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Completion toggle workflow.
//!
//! Handles the core flow behind "quest marked complete/incomplete",
//! whether triggered by direct user action or the Asana webhook relay:
//! 1. Validate the user/quest pair
//! 2. Write or remove the completion ledger record
//! 3. Invoke the streak engine on the first completion of the day
//! 4. Recompute the day rollup
//! 5. Mirror the new state to Asana (fire and forget, when linked)
//!
//! The streak write and the rollup write are independent; if one fails the
//! other is allowed to diverge (a recoverable inconsistency, repaired by
//! the next toggle or sweep).

use chrono::{DateTime, NaiveDate, Utc};

use crate::db::Db;
use crate::error::{AppError, Result};
use crate::models::{Completion, DayStats};
use crate::services::{AsanaClient, StatsService, StreakEngine, StreakUpdate};

/// Orchestrates completion toggles against the ledger, streak engine, and
/// stats aggregator.
#[derive(Clone)]
pub struct CompletionProcessor {
    db: Db,
    streak: StreakEngine,
    stats: StatsService,
    asana: Option<AsanaClient>,
}

/// Result of a toggle, for the caller to render and notify from.
#[derive(Debug)]
pub struct ToggleResult {
    /// Ledger state after the toggle
    pub completed: bool,
    /// Fresh rollup for the affected day
    pub day_stats: DayStats,
    /// Present when the streak engine ran (first completion of the day)
    pub streak: Option<StreakUpdate>,
}

impl CompletionProcessor {
    pub fn new(
        db: Db,
        streak: StreakEngine,
        stats: StatsService,
        asana: Option<AsanaClient>,
    ) -> Self {
        Self {
            db,
            streak,
            stats,
            asana,
        }
    }

    /// Toggle a quest completion for a (user, quest, day).
    ///
    /// Idempotent in both directions: completing an already-complete quest
    /// or un-completing an absent record is a no-op success. `now` is the
    /// wall-clock timestamp recorded on new ledger entries.
    pub async fn toggle(
        &self,
        user_id: u64,
        quest_id: u64,
        day: NaiveDate,
        completed: bool,
        now: DateTime<Utc>,
    ) -> Result<ToggleResult> {
        if self.db.get_user(user_id)?.is_none() {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }

        let quest = self
            .db
            .get_quest(quest_id)?
            .filter(|q| q.user_id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("Quest {} not found", quest_id)))?;

        if quest.date != day {
            return Err(AppError::BadRequest(format!(
                "Quest {} is not assigned to {}",
                quest_id, day
            )));
        }

        let streak = if completed {
            // First-completion check happens before the insert; the streak
            // engine's same-day no-op makes any race here harmless.
            let first_today = self.db.completions_for_day(user_id, day)?.is_empty();

            let inserted = self.db.insert_completion(&Completion {
                user_id,
                quest_id,
                date: day,
                created_at: now,
            })?;

            if inserted {
                tracing::info!(user_id, quest_id, day = %day, "Quest completed");
                self.push_to_asana(&quest, true);
            }

            if inserted && first_today {
                Some(self.streak.record_activity(user_id, day).await?)
            } else {
                None
            }
        } else {
            let removed = self.db.delete_completion(user_id, quest_id, day)?;
            if removed {
                tracing::info!(user_id, quest_id, day = %day, "Quest un-completed");
                self.push_to_asana(&quest, false);
            }
            None
        };

        let day_stats = self.stats.recompute_day(user_id, day).await?;

        Ok(ToggleResult {
            completed,
            day_stats,
            streak,
        })
    }

    /// Mirror completion state to the linked Asana task, fire and forget.
    fn push_to_asana(&self, quest: &crate::models::Quest, completed: bool) {
        let (Some(asana), Some(gid)) = (self.asana.clone(), quest.asana_task_gid.clone()) else {
            return;
        };

        let quest_id = quest.id;
        tokio::spawn(async move {
            if let Err(e) = asana.set_task_completed(&gid, completed).await {
                tracing::error!(
                    error = %e,
                    quest_id,
                    task_gid = %gid,
                    "Asana completion sync failed"
                );
            }
        });
    }
}
