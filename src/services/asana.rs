// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Asana API client for syncing quest completion state.
//!
//! Handles:
//! - Fetching a task's completion flag (webhook event resolution)
//! - Marking a task complete/incomplete (mirror of local toggles)

use crate::error::AppError;
use serde::{Deserialize, Serialize};

const ASANA_BASE_URL: &str = "https://app.asana.com/api/1.0";

/// Asana API client.
#[derive(Clone)]
pub struct AsanaClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl AsanaClient {
    /// Create a new client with a personal access token.
    pub fn new(token: String) -> Self {
        Self::with_base_url(token, ASANA_BASE_URL.to_string())
    }

    /// Client pointed at a custom base URL (for tests).
    pub fn with_base_url(token: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            token,
        }
    }

    /// Fetch a task's completion flag.
    pub async fn get_task_completed(&self, task_gid: &str) -> Result<bool, AppError> {
        let url = format!(
            "{}/tasks/{}?opt_fields=completed",
            self.base_url, task_gid
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| AppError::AsanaApi(e.to_string()))?;

        let envelope: TaskEnvelope = Self::check_response_json(response).await?;
        Ok(envelope.data.completed)
    }

    /// Set a task's completion flag.
    pub async fn set_task_completed(
        &self,
        task_gid: &str,
        completed: bool,
    ) -> Result<(), AppError> {
        let url = format!("{}/tasks/{}", self.base_url, task_gid);

        let body = serde_json::json!({
            "data": { "completed": completed }
        });

        let response = self
            .http
            .put(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::AsanaApi(e.to_string()))?;

        Self::check_response(response).await?;
        Ok(())
    }

    /// Check a response status, mapping failures to `AsanaApi` errors.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(AppError::AsanaApi(format!(
            "Asana returned {}: {}",
            status, body
        )))
    }

    /// Check a response and deserialize its JSON body.
    async fn check_response_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| AppError::AsanaApi(format!("Invalid Asana response: {}", e)))
    }
}

/// Asana wraps every resource in a `data` envelope.
#[derive(Debug, Serialize, Deserialize)]
struct TaskEnvelope {
    data: TaskFields,
}

#[derive(Debug, Serialize, Deserialize)]
struct TaskFields {
    #[serde(default)]
    completed: bool,
}
