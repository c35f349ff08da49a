// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP error mapping for every route, per spec.md §7's error-kind
//! taxonomy: each domain error enum carries enough information to pick a
//! status code, following the same accessor-method shape as
//! `rp_core::ports::rbac::GatewayError::status_code`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use rp_core::ports::bus::BusError;
use rp_core::ports::callback::CallbackError;
use rp_core::ports::queue::QueueError;
use rp_core::ports::rbac::GatewayError;
use rp_engine::{IngestError, LifecycleError, OrchestratorError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error(transparent)]
    Bus(#[from] BusError),
    #[error(transparent)]
    Callback(#[from] CallbackError),
    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl ApiError {
    /// HTTP status this error maps to, per spec.md §7.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Queue(QueueError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Queue(QueueError::AlreadyTerminal(_)) => StatusCode::CONFLICT,
            Self::Queue(QueueError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Bus(BusError::NoSuchRun(_)) => StatusCode::NOT_FOUND,
            Self::Bus(BusError::SubscriberLagged) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Callback(CallbackError::QuestionNotFound(_)) => StatusCode::NOT_FOUND,
            Self::Callback(CallbackError::RunMismatch(_)) => StatusCode::CONFLICT,
            Self::Callback(CallbackError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Orchestrator(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Ingest(IngestError::QuestionNotFound(_)) => StatusCode::NOT_FOUND,
            Self::Ingest(IngestError::Callback(CallbackError::RunMismatch(_))) => StatusCode::CONFLICT,
            Self::Ingest(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Lifecycle(LifecycleError::InvalidTransition(_)) => StatusCode::CONFLICT,
            Self::Lifecycle(LifecycleError::ValidationFailed(_)) => StatusCode::BAD_REQUEST,
            Self::Lifecycle(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Gateway(e) => StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
