// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Business logic services.

pub mod asana;
pub mod completion;
pub mod stats;
pub mod streak;

pub use asana::AsanaClient;
pub use completion::{CompletionProcessor, ToggleResult};
pub use stats::StatsService;
pub use streak::{multiplier_for, FreezeOutcome, StreakEngine, StreakUpdate};
