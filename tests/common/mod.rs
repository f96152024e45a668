// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::NaiveDate;
use quest_board::config::Config;
use quest_board::db::Db;
use quest_board::models::{Plan, Quest, QuestType, User};
use quest_board::routes::create_router;
use quest_board::services::{CompletionProcessor, StatsService, StreakEngine};
use quest_board::AppState;
use std::sync::Arc;

/// Parse a `YYYY-MM-DD` day for test fixtures.
#[allow(dead_code)]
pub fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
}

/// Build shared state over a fresh in-memory store. Asana sync disabled.
#[allow(dead_code)]
pub fn test_state() -> Arc<AppState> {
    let config = Config::test_default();
    let db = Db::new();
    let streak_engine = StreakEngine::new(db.clone());
    let stats_service = StatsService::new(db.clone());
    let completion_processor = CompletionProcessor::new(
        db.clone(),
        streak_engine.clone(),
        stats_service.clone(),
        None,
    );

    Arc::new(AppState {
        config,
        db,
        streak_engine,
        stats_service,
        completion_processor,
        asana_client: None,
    })
}

/// Create a test app over a fresh state.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = test_state();
    (create_router(state.clone()), state)
}

/// Seed a user with the given plan and freeze-token count.
#[allow(dead_code)]
pub fn seed_user(db: &Db, id: u64, plan: Plan, streak_freezes: u32) -> User {
    let user = User {
        id,
        email: Some(format!("user{}@example.com", id)),
        display_name: format!("User {}", id),
        plan,
        streak_freezes,
        created_at: chrono::Utc::now().to_rfc3339(),
    };
    db.upsert_user(&user).expect("seed user");
    user
}

/// Seed a quest for a (user, day) worth `points`.
#[allow(dead_code)]
pub fn seed_quest(db: &Db, user_id: u64, date: NaiveDate, points: u32) -> Quest {
    db.create_quest(Quest {
        id: 0,
        user_id,
        date,
        quest_type: QuestType::Side,
        title: format!("Quest for {}", date),
        subtitle: None,
        icon: None,
        points,
        order: 0,
        asana_task_gid: None,
    })
    .expect("seed quest")
}
