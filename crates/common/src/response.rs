//! Success envelope shared by every JSON endpoint

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::version::ApiVersion;

/// Envelope metadata
#[derive(Debug, Clone, Serialize)]
pub struct ResponseMeta {
    pub timestamp: DateTime<Utc>,
    pub version: ApiVersion,
}

/// `{ success, message?, data, meta }`
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
    pub meta: ResponseMeta,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T, version: ApiVersion) -> Self {
        Self {
            success: true,
            message: None,
            data,
            meta: ResponseMeta {
                timestamp: Utc::now(),
                version,
            },
            status: StatusCode::OK,
        }
    }

    /// 201 Created
    pub fn created(data: T, version: ApiVersion) -> Self {
        Self::ok(data, version).with_status(StatusCode::CREATED)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
