// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP-backed `WorkspaceSyncClient` and `ExecutorClient` against the
//! in-container executor sidecar reachable over the session's published
//! port.

use std::time::Duration;

use reqwest::Client;
use rp_core::ports::executor::{
    CallTrace, ExecutorClient, ExecutorError, ExecutorResult, RestorePlan, SyncRequest, WorkspaceSyncClient,
};
use serde::Deserialize;
use serde_json::json;

pub struct HttpExecutorClient {
    base_url: String,
    auth_token: Option<String>,
    client: Client,
}

impl HttpExecutorClient {
    pub fn new(base_url: impl Into<String>, auth_token: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
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

    async fn post(&self, path: &str, body: serde_json::Value, trace: &CallTrace) -> ExecutorResult<reqwest::Response> {
        let req = self.client.post(self.url(path)).json(&body);
        let req = self.apply_auth(self.apply_trace(req, trace));
        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() {
                ExecutorError::Timeout(60_000)
            } else {
                ExecutorError::Transport(e.to_string())
            }
        })?;
        resp.error_for_status().map_err(|e| ExecutorError::Transport(e.to_string()))
    }
}

#[async_trait::async_trait]
impl WorkspaceSyncClient for HttpExecutorClient {
    async fn sync_workspace(&self, req: SyncRequest<'_>) -> ExecutorResult<()> {
        self.post(
            &format!("/containers/{}/sync", req.container_id),
            json!({
                "workspace_s3_prefix": req.workspace_s3_prefix,
                "include": req.include,
                "exclude": req.exclude,
                "reason": req.reason,
            }),
            &req.trace,
        )
        .await?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct ExecResponse {
    output: String,
}

#[async_trait::async_trait]
impl ExecutorClient for HttpExecutorClient {
    async fn restore_workspace(&self, container_id: &str, plan: &RestorePlan, trace: &CallTrace) -> ExecutorResult<()> {
        self.post(&format!("/containers/{container_id}/restore"), json!({ "manifest": plan.manifest }), trace)
            .await?;
        Ok(())
    }

    async fn link_agent_data(&self, container_id: &str, trace: &CallTrace) -> ExecutorResult<()> {
        self.post(&format!("/containers/{container_id}/link-agent-data"), json!({}), trace).await?;
        Ok(())
    }

    async fn validate_workspace(
        &self,
        container_id: &str,
        required_paths: &[String],
        trace: &CallTrace,
    ) -> ExecutorResult<()> {
        let resp =
            self.post(&format!("/containers/{container_id}/validate"), json!({ "required_paths": required_paths }), trace)
                .await?;
        let body: ValidateResponse = resp.json().await.map_err(|e| ExecutorError::Transport(e.to_string()))?;
        if !body.missing.is_empty() {
            return Err(ExecutorError::MissingPaths(body.missing));
        }
        Ok(())
    }

    async fn execute_workspace_command(&self, container_id: &str, command: &str, trace: &CallTrace) -> ExecutorResult<String> {
        let resp = self.post(&format!("/containers/{container_id}/exec"), json!({ "command": command }), trace).await?;
        let body: ExecResponse = resp.json().await.map_err(|e| ExecutorError::Transport(e.to_string()))?;
        Ok(body.output)
    }
}

#[derive(Deserialize, Default)]
struct ValidateResponse {
    #[serde(default)]
    missing: Vec<String>,
}

#[cfg(test)]
#[path = "http_executor_tests.rs"]
mod tests;
