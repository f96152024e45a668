// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Quest model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Quest category, in board display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestType {
    Main,
    Side,
    Daily,
}

/// A quest assigned to a user for a specific calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quest {
    /// Quest ID (assigned by the store)
    pub id: u64,
    /// Owning user
    pub user_id: u64,
    /// The calendar day this quest belongs to
    pub date: NaiveDate,
    pub quest_type: QuestType,
    pub title: String,
    pub subtitle: Option<String>,
    /// Emoji shown on the board
    pub icon: Option<String>,
    /// Points awarded on completion
    pub points: u32,
    /// Sort order within its category
    pub order: u32,
    /// Linked Asana task GID, if this quest is synced from Asana
    pub asana_task_gid: Option<String>,
}
