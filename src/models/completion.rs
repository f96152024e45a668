// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Completion ledger model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A record that a quest was satisfied on a calendar day.
///
/// At most one completion exists per (user, quest, day); toggling a quest
/// off hard-deletes the record rather than soft-deleting it. The ledger is
/// the source of truth for "what happened"; Streak and DayStats are caches
/// derived from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    pub user_id: u64,
    pub quest_id: u64,
    /// The calendar day the quest belongs to (not the wall-clock day the
    /// toggle happened)
    pub date: NaiveDate,
    /// Wall-clock creation time. Used only for time-of-day bucketing
    /// (e.g. achievement checks downstream), never for streak date math.
    pub created_at: DateTime<Utc>,
}
