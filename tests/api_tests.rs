// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Router-level API tests.
//!
//! These verify that:
//! 1. Protected routes reject requests without valid tokens
//! 2. The quest/completion/streak/stats endpoints work end to end

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use quest_board::middleware::auth::create_jwt;
use quest_board::models::Plan;
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;
use common::{day, seed_quest, seed_user};

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn bearer(state: &quest_board::AppState, user_id: u64) -> String {
    let token = create_jwt(user_id, &state.config.jwt_signing_key).unwrap();
    format!("Bearer {}", token)
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_protected_route_without_token() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/streak")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_garbage_token() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/streak")
                .header(header::AUTHORIZATION, "Bearer not.a.jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_streak_endpoint_empty_state() {
    let (app, state) = common::create_test_app();
    seed_user(&state.db, 1, Plan::Pro, 2);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/streak")
                .header(header::AUTHORIZATION, bearer(&state, 1))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["current_streak"], 0);
    assert_eq!(body["multiplier"], 1);
    assert_eq!(body["freezes_available"], 2);
    assert_eq!(body["can_freeze"], true);
    assert_eq!(body["last_active_date"], Value::Null);
}

#[tokio::test]
async fn test_create_quest_and_list() {
    let (app, state) = common::create_test_app();
    seed_user(&state.db, 1, Plan::Free, 0);

    let create = Request::builder()
        .method("POST")
        .uri("/api/quests")
        .header(header::AUTHORIZATION, bearer(&state, 1))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "date": "2024-01-15",
                "quest_type": "main",
                "title": "Ship the release",
                "points": 20
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.clone().oneshot(create).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    assert_eq!(created["title"], "Ship the release");
    assert_eq!(created["completed"], false);

    let list = Request::builder()
        .uri("/api/quests?date=2024-01-15")
        .header(header::AUTHORIZATION, bearer(&state, 1))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(list).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_quest_rejects_empty_title() {
    let (app, state) = common::create_test_app();
    seed_user(&state.db, 1, Plan::Free, 0);

    let create = Request::builder()
        .method("POST")
        .uri("/api/quests")
        .header(header::AUTHORIZATION, bearer(&state, 1))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "date": "2024-01-15",
                "quest_type": "side",
                "title": "",
                "points": 5
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(create).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_toggle_completion_returns_streak_result() {
    let (app, state) = common::create_test_app();
    seed_user(&state.db, 1, Plan::Free, 0);
    let quest = seed_quest(&state.db, 1, day("2024-01-15"), 20);

    let toggle = Request::builder()
        .method("POST")
        .uri("/api/completions")
        .header(header::AUTHORIZATION, bearer(&state, 1))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "quest_id": quest.id,
                "date": "2024-01-15",
                "completed": true
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(toggle).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["completed"], true);
    assert_eq!(body["day_stats"]["total_points"], 20);
    assert_eq!(body["streak"]["current_streak"], 1);
    assert_eq!(body["streak"]["multiplier"], 1);
}

#[tokio::test]
async fn test_toggle_unknown_quest_is_404() {
    let (app, state) = common::create_test_app();
    seed_user(&state.db, 1, Plan::Free, 0);

    let toggle = Request::builder()
        .method("POST")
        .uri("/api/completions")
        .header(header::AUTHORIZATION, bearer(&state, 1))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "quest_id": 42,
                "date": "2024-01-15",
                "completed": true
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(toggle).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_freeze_endpoint_free_plan_rejected() {
    let (app, state) = common::create_test_app();
    seed_user(&state.db, 1, Plan::Free, 3);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/streak/freeze")
                .header(header::AUTHORIZATION, bearer(&state, 1))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stats_endpoint_end_to_end() {
    let (app, state) = common::create_test_app();
    seed_user(&state.db, 1, Plan::Free, 0);
    let quest = seed_quest(&state.db, 1, day("2024-01-15"), 20);

    state
        .completion_processor
        .toggle(1, quest.id, day("2024-01-15"), true, chrono::Utc::now())
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/stats?today=2024-01-15")
                .header(header::AUTHORIZATION, bearer(&state, 1))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["today_points"], 20);
    assert_eq!(body["week_points"], 20);
    assert_eq!(body["total_points"], 20);
    assert_eq!(body["streak"], 1);
    assert_eq!(body["best_streak"], 1);
    assert_eq!(body["completion_rate"], 100);
    assert_eq!(body["last_30_days"].as_array().unwrap().len(), 30);
}
