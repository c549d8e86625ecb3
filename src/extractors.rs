//! Custom extractors for API handlers.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::{ApiError, FieldErrors};

/// JSON body extractor whose rejections use the API error envelope.
///
/// Syntax errors become `INVALID_JSON`; well-formed bodies of the wrong shape
/// (missing, unknown or mistyped fields) become `VALIDATION_ERROR`. Bodies over
/// the `DefaultBodyLimit` become `PAYLOAD_TOO_LARGE`.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidJson(value)),
            Err(rejection) => Err(rejection_to_error(rejection)),
        }
    }
}

fn rejection_to_error(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(e) => {
            ApiError::validation_error(e.body_text(), FieldErrors::new())
        }
        JsonRejection::JsonSyntaxError(e) => ApiError::invalid_json(e.body_text()),
        JsonRejection::BytesRejection(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            ApiError::payload_too_large("Request body exceeds the configured size limit")
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::bad_request("Expected request with `Content-Type: application/json`")
        }
        other => ApiError::bad_request(other.body_text()),
    }
}
