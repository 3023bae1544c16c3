//! Request body extraction with JSON error bodies

use axum::extract::{FromRequest, rejection::JsonRejection};

use crate::error::AppError;

/// `axum::Json` whose rejections render as `AppError::Validation`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "Rejected request body");
        let message = match &rejection {
            JsonRejection::MissingJsonContentType(_) => {
                "Expected a JSON request body with Content-Type: application/json.".to_string()
            }
            JsonRejection::JsonSyntaxError(_) => "JSON parse error.".to_string(),
            JsonRejection::JsonDataError(_) => {
                "Invalid data. Expected a JSON object with the documented fields.".to_string()
            }
            _ => "Could not read the request body.".to_string(),
        };
        AppError::validation(NON_FIELD_ERRORS, message)
    }
}

/// Field name for errors not tied to a single request field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";
