// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Webhook routes for Asana events.
//!
//! Asana delivers a handshake request carrying `X-Hook-Secret` when the
//! webhook is created; every later delivery is signed with HMAC-SHA256
//! over the raw body in `X-Hook-Signature`.

use crate::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Webhook routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/webhook/asana", get(status).post(handle_event))
}

#[derive(Serialize)]
struct WebhookStatus {
    status: String,
}

/// Readiness probe for the webhook URL (GET).
async fn status() -> Json<WebhookStatus> {
    Json(WebhookStatus {
        status: "Asana webhook endpoint ready".to_string(),
    })
}

/// Asana webhook event batch.
#[derive(Deserialize, Debug)]
struct WebhookPayload {
    #[serde(default)]
    events: Vec<WebhookEvent>,
}

#[derive(Deserialize, Debug)]
struct WebhookEvent {
    /// "changed", "added", "removed", ...
    #[serde(default)]
    action: String,
    resource: Option<WebhookResource>,
}

#[derive(Deserialize, Debug)]
struct WebhookResource {
    gid: String,
    #[serde(default)]
    resource_type: String,
}

/// Verify the HMAC-SHA256 hex signature over the raw body.
fn verify_signature(secret: &str, body: &str, signature: &str) -> bool {
    let mut mac = match Hmac::<Sha256>::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(body.as_bytes());
    let expected = hex::encode(mac.finalize().into_bytes());

    expected.as_bytes().ct_eq(signature.as_bytes()).into()
}

/// Handle incoming webhook deliveries (POST).
async fn handle_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    // Handshake: echo the secret back. Asana sends this once when the
    // webhook is established; the secret must be saved for verification.
    if let Some(hook_secret) = headers.get("x-hook-secret").and_then(|h| h.to_str().ok()) {
        tracing::info!(
            "Asana webhook handshake received; set ASANA_WEBHOOK_SECRET to the delivered secret"
        );
        return (
            StatusCode::OK,
            AppendHeaders([("x-hook-secret", hook_secret.to_string())]),
        )
            .into_response();
    }

    // Signature verification, when a secret is configured
    if let Some(secret) = &state.config.asana_webhook_secret {
        let signature = headers
            .get("x-hook-signature")
            .and_then(|h| h.to_str().ok());

        let valid = signature.is_some_and(|sig| verify_signature(secret, &body, sig));
        if !valid {
            tracing::warn!("Security Alert: Asana webhook signature mismatch");
            return StatusCode::UNAUTHORIZED.into_response();
        }
    } else {
        tracing::warn!("Asana webhook secret not configured; skipping signature verification");
    }

    let payload: WebhookPayload = match serde_json::from_str(&body) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = %e, "Failed to parse Asana webhook payload");
            // Still return 200 to Asana to avoid retries
            return StatusCode::OK.into_response();
        }
    };

    tracing::info!(events = payload.events.len(), "Asana webhook batch received");

    for event in payload.events {
        let Some(resource) = event.resource else {
            continue;
        };
        if resource.resource_type != "task" || event.action != "changed" {
            tracing::debug!(
                action = %event.action,
                resource_type = %resource.resource_type,
                "Ignoring unhandled Asana event"
            );
            continue;
        }

        if let Err(e) = relay_task_change(&state, &resource.gid).await {
            tracing::error!(error = %e, task_gid = %resource.gid, "Failed to relay Asana task change");
        }
    }

    // Always return 200 OK quickly (Asana requirement)
    StatusCode::OK.into_response()
}

/// Resolve a changed Asana task to its linked quest and relay the
/// completion state through the normal toggle path.
async fn relay_task_change(state: &AppState, task_gid: &str) -> crate::error::Result<()> {
    let Some(quest) = state.db.find_quest_by_asana_gid(task_gid)? else {
        tracing::debug!(task_gid, "Asana task not linked to a quest");
        return Ok(());
    };

    let Some(asana) = &state.asana_client else {
        tracing::debug!("Asana client not configured; ignoring webhook event");
        return Ok(());
    };

    let completed = asana.get_task_completed(task_gid).await?;

    let result = state
        .completion_processor
        .toggle(
            quest.user_id,
            quest.id,
            quest.date,
            completed,
            chrono::Utc::now(),
        )
        .await?;

    tracing::info!(
        quest_id = quest.id,
        task_gid,
        completed = result.completed,
        "Quest toggled via Asana webhook"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_signature_accepts_valid() {
        let secret = "shhh";
        let body = r#"{"events":[]}"#;

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        assert!(verify_signature(secret, body, &signature));
    }

    #[test]
    fn test_verify_signature_rejects_tampered_body() {
        let secret = "shhh";
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(br#"{"events":[]}"#);
        let signature = hex::encode(mac.finalize().into_bytes());

        assert!(!verify_signature(secret, r#"{"events":[{}]}"#, &signature));
        assert!(!verify_signature(secret, r#"{"events":[]}"#, "deadbeef"));
    }

    #[test]
    fn test_payload_parsing_tolerates_missing_fields() {
        let payload: WebhookPayload = serde_json::from_str(r#"{}"#).unwrap();
        assert!(payload.events.is_empty());

        let payload: WebhookPayload =
            serde_json::from_str(r#"{"events":[{"action":"changed"}]}"#).unwrap();
        assert_eq!(payload.events.len(), 1);
        assert!(payload.events[0].resource.is_none());
    }
}
