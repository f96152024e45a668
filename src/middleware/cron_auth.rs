// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cron sweep authentication middleware.

use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Require a valid `Authorization: Bearer <CRON_SECRET>` for `/cron/*`
/// routes, compared in constant time.
pub async fn require_cron_auth(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let is_valid = presented
        .map(|token| {
            token
                .as_bytes()
                .ct_eq(state.config.cron_secret.as_bytes())
                .into()
        })
        .unwrap_or(false);

    if !is_valid {
        tracing::warn!("Blocked cron request with missing or invalid secret");
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(request).await)
}
