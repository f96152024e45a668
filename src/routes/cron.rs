// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cron sweep routes, called by an external scheduler.
//!
//! Both sweeps are idempotent by construction: the rollup upsert always
//! produces the same row for the same ledger state, and the reminder sweep
//! only reads. Running them zero or more times is safe.

use crate::error::Result;
use crate::time_utils::gap_days;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::post,
    Json, Router,
};
use chrono::NaiveDate;
use futures_util::{stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const MAX_CONCURRENT_SWEEP_OPS: usize = 16;

/// Cron routes (require the cron bearer secret).
/// The cron auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cron/daily-rollup", post(daily_rollup))
        .route("/cron/streak-reminder", post(streak_reminder))
}

#[derive(Deserialize)]
struct SweepQuery {
    /// Day to sweep (defaults to the current UTC day)
    day: Option<NaiveDate>,
}

#[derive(Serialize)]
pub struct RollupSweepResponse {
    pub day: NaiveDate,
    pub users_swept: u32,
    pub failures: u32,
}

/// Recompute the day rollup for every user.
///
/// Repairs any rollup that diverged from the ledger (e.g. a toggle whose
/// stats write failed after the ledger write succeeded).
async fn daily_rollup(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SweepQuery>,
) -> Result<Json<RollupSweepResponse>> {
    let day = params.day.unwrap_or_else(|| chrono::Utc::now().date_naive());
    let user_ids = state.db.all_user_ids()?;
    let total = user_ids.len();

    let failures = stream::iter(user_ids)
        .map(|user_id| {
            let stats = state.stats_service.clone();
            async move {
                if let Err(e) = stats.recompute_day(user_id, day).await {
                    tracing::error!(error = %e, user_id, day = %day, "Rollup sweep failed for user");
                    1u32
                } else {
                    0u32
                }
            }
        })
        .buffer_unordered(MAX_CONCURRENT_SWEEP_OPS)
        .fold(0u32, |acc, failed| async move { acc + failed })
        .await;

    tracing::info!(day = %day, users = total, failures, "Daily rollup sweep complete");

    Ok(Json(RollupSweepResponse {
        day,
        users_swept: total as u32 - failures,
        failures,
    }))
}

#[derive(Serialize)]
pub struct ReminderSweepResponse {
    pub day: NaiveDate,
    pub at_risk: u32,
}

/// Count users whose streak is at risk today: active yesterday with a live
/// streak, nothing recorded yet today. The notification sink is external;
/// this endpoint identifies the candidates and logs them.
async fn streak_reminder(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SweepQuery>,
) -> Result<Json<ReminderSweepResponse>> {
    let day = params.day.unwrap_or_else(|| chrono::Utc::now().date_naive());

    let mut at_risk = 0;
    for user_id in state.db.all_user_ids()? {
        let Some(streak) = state.db.get_streak(user_id)? else {
            continue;
        };
        if streak.current_streak == 0 {
            continue;
        }
        // Active yesterday, not yet today
        if gap_days(streak.last_active_date, day) == 1 {
            tracing::info!(
                user_id,
                current_streak = streak.current_streak,
                day = %day,
                "Streak at risk; reminder candidate"
            );
            at_risk += 1;
        }
    }

    Ok(Json(ReminderSweepResponse { day, at_risk }))
}
