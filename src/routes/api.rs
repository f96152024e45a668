// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use std::collections::HashSet;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{DayStats, Quest, QuestType};
use crate::services::multiplier_for;
use crate::time_utils::week_bounds;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/quests", get(get_quests).post(create_quest))
        .route("/api/completions", post(toggle_completion))
        .route("/api/streak", get(get_streak))
        .route("/api/streak/freeze", post(freeze_streak))
        .route("/api/stats", get(get_stats))
}

// ─── Quests ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct QuestsQuery {
    /// Calendar day to list quests for (YYYY-MM-DD)
    date: NaiveDate,
}

/// Quest with its completion flag for the requested day.
#[derive(Serialize)]
pub struct QuestResponse {
    pub id: u64,
    pub date: NaiveDate,
    pub quest_type: QuestType,
    pub title: String,
    pub subtitle: Option<String>,
    pub icon: Option<String>,
    pub points: u32,
    pub order: u32,
    pub completed: bool,
    pub asana_linked: bool,
}

impl QuestResponse {
    fn from_quest(quest: Quest, completed: bool) -> Self {
        Self {
            id: quest.id,
            date: quest.date,
            quest_type: quest.quest_type,
            title: quest.title,
            subtitle: quest.subtitle,
            icon: quest.icon,
            points: quest.points,
            order: quest.order,
            completed,
            asana_linked: quest.asana_task_gid.is_some(),
        }
    }
}

/// Get the user's quests for a day, with completion flags.
async fn get_quests(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<QuestsQuery>,
) -> Result<Json<Vec<QuestResponse>>> {
    let quests = state.db.quests_for_day(user.user_id, params.date)?;
    let completed: HashSet<u64> = state
        .db
        .completions_for_day(user.user_id, params.date)?
        .into_iter()
        .map(|c| c.quest_id)
        .collect();

    let response = quests
        .into_iter()
        .map(|q| {
            let done = completed.contains(&q.id);
            QuestResponse::from_quest(q, done)
        })
        .collect();

    Ok(Json(response))
}

#[derive(Deserialize, Validate)]
struct CreateQuestRequest {
    date: NaiveDate,
    quest_type: QuestType,
    #[validate(length(min = 1, max = 200))]
    title: String,
    #[validate(length(max = 500))]
    subtitle: Option<String>,
    icon: Option<String>,
    #[validate(range(max = 1000))]
    points: u32,
    #[serde(default)]
    order: u32,
    asana_task_gid: Option<String>,
}

/// Create a quest for the current user.
async fn create_quest(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<CreateQuestRequest>,
) -> Result<Json<QuestResponse>> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let quest = state.db.create_quest(Quest {
        id: 0, // assigned by the store
        user_id: user.user_id,
        date: body.date,
        quest_type: body.quest_type,
        title: body.title,
        subtitle: body.subtitle,
        icon: body.icon,
        points: body.points,
        order: body.order,
        asana_task_gid: body.asana_task_gid,
    })?;

    tracing::info!(
        user_id = user.user_id,
        quest_id = quest.id,
        day = %quest.date,
        "Quest created"
    );

    Ok(Json(QuestResponse::from_quest(quest, false)))
}

// ─── Completions ─────────────────────────────────────────────

#[derive(Deserialize)]
struct ToggleCompletionRequest {
    quest_id: u64,
    date: NaiveDate,
    completed: bool,
}

/// Streak engine output included in toggle responses.
#[derive(Serialize)]
pub struct StreakUpdateResponse {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub multiplier: u32,
    pub crossed_milestone: Option<u32>,
}

#[derive(Serialize)]
pub struct ToggleCompletionResponse {
    pub completed: bool,
    pub day_stats: DayStats,
    /// Present when this toggle was the user's first completion of the day
    pub streak: Option<StreakUpdateResponse>,
}

/// Toggle a quest completion.
async fn toggle_completion(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<ToggleCompletionRequest>,
) -> Result<Json<ToggleCompletionResponse>> {
    let result = state
        .completion_processor
        .toggle(
            user.user_id,
            body.quest_id,
            body.date,
            body.completed,
            chrono::Utc::now(),
        )
        .await?;

    Ok(Json(ToggleCompletionResponse {
        completed: result.completed,
        day_stats: result.day_stats,
        streak: result.streak.map(|s| StreakUpdateResponse {
            current_streak: s.current_streak,
            longest_streak: s.longest_streak,
            multiplier: s.multiplier,
            crossed_milestone: s.crossed_milestone,
        }),
    }))
}

// ─── Streak ──────────────────────────────────────────────────

#[derive(Serialize)]
pub struct StreakResponse {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_active_date: Option<NaiveDate>,
    pub multiplier: u32,
    pub frozen_today: bool,
    pub freezes_available: u32,
    pub can_freeze: bool,
}

/// Get the current user's streak state.
async fn get_streak(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StreakResponse>> {
    let profile = state
        .db
        .get_user(user.user_id)?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.user_id)))?;

    let streak = state.db.get_streak(user.user_id)?;
    let current = streak.as_ref().map(|s| s.current_streak).unwrap_or(0);

    Ok(Json(StreakResponse {
        current_streak: current,
        longest_streak: streak.as_ref().map(|s| s.longest_streak).unwrap_or(0),
        last_active_date: streak.as_ref().map(|s| s.last_active_date),
        multiplier: multiplier_for(current),
        frozen_today: streak
            .as_ref()
            .map(|s| s.freeze_consumed_today)
            .unwrap_or(false),
        freezes_available: profile.streak_freezes,
        can_freeze: profile.plan.allows_streak_freezes() && profile.streak_freezes > 0,
    }))
}

#[derive(Serialize)]
pub struct FreezeResponse {
    pub frozen_today: bool,
    pub freezes_remaining: u32,
}

/// Pre-emptively freeze the streak for today (paid plans).
async fn freeze_streak(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<FreezeResponse>> {
    let outcome = state
        .streak_engine
        .consume_freeze_manually(user.user_id)
        .await?;

    Ok(Json(FreezeResponse {
        frozen_today: outcome.frozen_today,
        freezes_remaining: outcome.freezes_remaining,
    }))
}

// ─── Stats ───────────────────────────────────────────────────

#[derive(Deserialize)]
struct StatsQuery {
    /// Reference "today" (defaults to the current UTC day). Explicit so
    /// clients in other timezones and tests can pin the day.
    today: Option<NaiveDate>,
}

#[derive(Serialize)]
pub struct DaySeriesEntry {
    pub date: NaiveDate,
    pub points: u32,
    pub completed: u32,
    pub total: u32,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub today_points: u32,
    pub week_points: u32,
    pub total_points: u32,
    /// Display streak walked from the rollup history (the authoritative
    /// chain lives at /api/streak)
    pub streak: u32,
    pub best_streak: u32,
    pub completion_rate: u32,
    pub last_30_days: Vec<DaySeriesEntry>,
}

/// Dashboard stats: today/week/all-time points, display streaks, and the
/// last-30-day series.
async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<StatsQuery>,
) -> Result<Json<StatsResponse>> {
    let today = params.today.unwrap_or_else(|| chrono::Utc::now().date_naive());
    let stats = &state.stats_service;

    // Refresh today's rollup first so every aggregate below sees it and
    // the in-progress day is never double counted.
    let today_stats = stats.recompute_day(user.user_id, today).await?;

    let (week_start, week_end) = week_bounds(today);
    let week_points = stats
        .weekly_total(user.user_id, week_start, week_end)
        .await?;
    let total_points = stats.all_time_total(user.user_id, today).await?;
    let streak = stats.current_streak_display(user.user_id, today).await?;
    let best_streak = stats.best_streak_display(user.user_id).await?.max(streak);
    let completion_rate = stats.completion_rate(user.user_id).await?;

    let last_30_days = stats
        .last_n_days(user.user_id, today, 30)
        .await?
        .into_iter()
        .map(|s| DaySeriesEntry {
            date: s.date,
            points: s.total_points,
            completed: s.quests_completed,
            total: s.quests_total,
        })
        .collect();

    Ok(Json(StatsResponse {
        today_points: today_stats.total_points,
        week_points,
        total_points,
        streak,
        best_streak,
        completion_rate,
        last_30_days,
    }))
}
