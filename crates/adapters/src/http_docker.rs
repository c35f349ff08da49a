// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP-backed `DockerClient` against a container-runtime sidecar.
//!
//! One base URL, one bearer token, five endpoints. Every call carries a
//! [`CallTrace`] forwarded as request headers so the sidecar's own logs
//! can be correlated back to the run that triggered them.

use std::time::Duration;

use reqwest::Client;
use rp_core::ports::executor::{CallTrace, DockerClient, ExecutorError, ExecutorResult};
use serde::Deserialize;
use serde_json::json;

pub struct HttpDockerClient {
    base_url: String,
    auth_token: Option<String>,
    client: Client,
}

impl HttpDockerClient {
    pub fn new(base_url: impl Into<String>, auth_token: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self { base_url: base_url.into(), auth_token, client }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    fn apply_trace(&self, req: reqwest::RequestBuilder, trace: &CallTrace) -> reqwest::RequestBuilder {
        req.header("x-trace-id", trace.trace_id.to_string())
            .header("x-session-id", &trace.session_id)
            .header("x-executor-id", &trace.executor_id)
    }

    async fn send_json(
        &self,
        req: reqwest::RequestBuilder,
        trace: &CallTrace,
    ) -> ExecutorResult<reqwest::Response> {
        let req = self.apply_auth(self.apply_trace(req, trace));
        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() {
                ExecutorError::Timeout(30_000)
            } else {
                ExecutorError::Transport(e.to_string())
            }
        })?;
        resp.error_for_status().map_err(|e| ExecutorError::Transport(e.to_string()))
    }
}

#[derive(Deserialize)]
struct CreateWorkerResponse {
    container_id: String,
}

#[derive(Deserialize)]
struct ExistsResponse {
    exists: bool,
}

#[async_trait::async_trait]
impl DockerClient for HttpDockerClient {
    async fn create_worker(&self, session_id: &str, trace: &CallTrace) -> ExecutorResult<String> {
        let req = self.client.post(self.url("/containers")).json(&json!({ "session_id": session_id }));
        let resp = self.send_json(req, trace).await?;
        let body: CreateWorkerResponse =
            resp.json().await.map_err(|e| ExecutorError::Transport(e.to_string()))?;
        Ok(body.container_id)
    }

    async fn start(&self, container_id: &str, trace: &CallTrace) -> ExecutorResult<()> {
        let req = self.client.post(self.url(&format!("/containers/{container_id}/start")));
        self.send_json(req, trace).await?;
        Ok(())
    }

    async fn stop(&self, container_id: &str, trace: &CallTrace) -> ExecutorResult<()> {
        let req = self.client.post(self.url(&format!("/containers/{container_id}/stop")));
        self.send_json(req, trace).await?;
        Ok(())
    }

    async fn remove(&self, container_id: &str, trace: &CallTrace) -> ExecutorResult<()> {
        let req = self.client.delete(self.url(&format!("/containers/{container_id}")));
        self.send_json(req, trace).await?;
        Ok(())
    }

    async fn exists(&self, container_id: &str, trace: &CallTrace) -> ExecutorResult<bool> {
        let req = self.client.get(self.url(&format!("/containers/{container_id}")));
        let resp = self.apply_auth(self.apply_trace(req, trace));
        let resp = resp.send().await.map_err(|e| ExecutorError::Transport(e.to_string()))?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }
        let resp = resp.error_for_status().map_err(|e| ExecutorError::Transport(e.to_string()))?;
        let body: ExistsResponse = resp.json().await.map_err(|e| ExecutorError::Transport(e.to_string()))?;
        Ok(body.exists)
    }
}

#[cfg(test)]
#[path = "http_docker_tests.rs"]
mod tests;
