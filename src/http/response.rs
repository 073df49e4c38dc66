//! Error responses.
//!
//! | Cause                          | Status |
//! |--------------------------------|--------|
//! | pool rejected / pool shut down | 503 + `Retry-After` |
//! | backend 404 / 422              | same   |
//! | other backend or call failure  | 502    |
//! | invalid product id             | 422    |

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::integration::IntegrationError;

#[derive(Debug)]
pub enum ApiError {
    InvalidInput(String),
    NotFound(String),
    Integration(IntegrationError),
}

impl From<IntegrationError> for ApiError {
    fn from(err: IntegrationError) -> Self {
        ApiError::Integration(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Integration(err) => match err {
                IntegrationError::Overloaded(_) | IntegrationError::PoolClosed(_) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                IntegrationError::Backend { status: 404, .. } => StatusCode::NOT_FOUND,
                IntegrationError::Backend { status: 422, .. } => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::BAD_GATEWAY,
            },
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::InvalidInput(msg) | ApiError::NotFound(msg) => msg.clone(),
            ApiError::Integration(err) => err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::Integration(err) = &self {
            tracing::warn!(status = status.as_u16(), error = %err, "Backend call failed");
        }

        let body = Json(json!({
            "status": status.as_u16(),
            "error": self.message(),
        }));

        let mut response = (status, body).into_response();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from_static("1"));
        }
        response
    }
}
