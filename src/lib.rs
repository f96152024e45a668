// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Quest Board: a gamified personal task tracker backend.
//!
//! Quests are tasks scoped to a calendar day; completions earn points,
//! consecutive daily activity builds a streak with an XP multiplier, and
//! linked Asana tasks drive completion toggles through a webhook relay.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Db;
use services::{AsanaClient, CompletionProcessor, StatsService, StreakEngine};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub streak_engine: StreakEngine,
    pub stats_service: StatsService,
    pub completion_processor: CompletionProcessor,
    pub asana_client: Option<AsanaClient>,
}
