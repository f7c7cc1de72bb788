//! HTTP error mapping (spec §6 "Error responses", §7).
//!
//! Every handler returns `Result<T, ApiError>`; `ApiError` is the single
//! place that turns a [`FirmanteError`] into the `{message}` JSON body and
//! status code the spec mandates.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use firmante_types::FirmanteError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

pub struct ApiError(pub FirmanteError);

impl From<FirmanteError> for ApiError {
    fn from(e: FirmanteError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            FirmanteError::NotFound(_) => StatusCode::NOT_FOUND,
            FirmanteError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            FirmanteError::Forbidden(_) => StatusCode::FORBIDDEN,
            FirmanteError::Validation(_) => StatusCode::BAD_REQUEST,
            FirmanteError::Conflict(_) => StatusCode::CONFLICT,
            FirmanteError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            FirmanteError::Expired(_) => StatusCode::FORBIDDEN,
            FirmanteError::LinkClosed(_) => StatusCode::FORBIDDEN,
            FirmanteError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "internal error");
        }

        (status, Json(ErrorBody { message: self.0.to_string() })).into_response()
    }
}
