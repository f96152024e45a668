// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Streak state model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-user streak state, created lazily on the first completion.
///
/// Invariant: `longest_streak >= current_streak`. `last_active_date` is the
/// most recent calendar day with recorded activity after freeze/break logic
/// resolved it.
///
/// This row is not fully re-derivable from the completion ledger: spending
/// a freeze token is a side effect, and replaying history without knowing
/// which days were frozen would reconstruct a different chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Streak {
    pub user_id: u64,
    /// Current streak length in days
    pub current_streak: u32,
    /// Longest streak ever observed (monotonically non-decreasing)
    pub longest_streak: u32,
    /// Most recent calendar day with activity
    pub last_active_date: NaiveDate,
    /// Set by a manual freeze; cleared on every new-day transition
    pub freeze_consumed_today: bool,
}

impl Streak {
    /// Initial streak row for a user's first-ever completion.
    pub fn first_activity(user_id: u64, day: NaiveDate) -> Self {
        Self {
            user_id,
            current_streak: 1,
            longest_streak: 1,
            last_active_date: day,
            freeze_consumed_today: false,
        }
    }
}
