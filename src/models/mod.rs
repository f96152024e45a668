// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for storage and API responses.

pub mod completion;
pub mod quest;
pub mod stats;
pub mod streak;
pub mod user;

pub use completion::Completion;
pub use quest::{Quest, QuestType};
pub use stats::DayStats;
pub use streak::Streak;
pub use user::{Plan, User};
