// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Quest Board API Server
//!
//! Gamified personal task tracker: quests, points, daily streaks with an
//! XP multiplier, and Asana-linked completion sync.

use quest_board::{
    config::Config,
    db::Db,
    services::{AsanaClient, CompletionProcessor, StatsService, StreakEngine},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Quest Board API");

    // Initialize the store
    let db = Db::new();

    // Asana sync is optional; without a token the webhook relay and the
    // outbound completion mirror are disabled.
    let asana_client = config.asana_token.clone().map(AsanaClient::new);
    if asana_client.is_some() {
        tracing::info!("Asana sync enabled");
    } else {
        tracing::info!("Asana sync disabled (no ASANA_TOKEN)");
    }

    let streak_engine = StreakEngine::new(db.clone());
    let stats_service = StatsService::new(db.clone());
    let completion_processor = CompletionProcessor::new(
        db.clone(),
        streak_engine.clone(),
        stats_service.clone(),
        asana_client.clone(),
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        streak_engine,
        stats_service,
        completion_processor,
        asana_client,
    });

    // Build router
    let app = quest_board::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quest_board=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
