use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use hackboard_domain::{ServiceError, app::AppState, session::FlashCategory};

/// Plain JSON error responses, used by the read-only view routes where a
/// flash redirect would loop.
pub struct ApiError(pub ServiceError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = serde_json::json!({ "error": self.0.message() });
        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        ApiError(value)
    }
}

fn flash_category(err: &ServiceError) -> FlashCategory {
    match err {
        ServiceError::NotFound(_) | ServiceError::BadRequest(_) => FlashCategory::Warning,
        ServiceError::Unauthorized(_) | ServiceError::Conflict(_) | ServiceError::Internal(_) => {
            FlashCategory::Danger
        }
    }
}

/// Form-route error recovery: flash the categorized message and bounce back
/// to a sensible prior page.
pub fn flash_error_redirect(
    app: &AppState,
    token: &str,
    err: &ServiceError,
    to: &str,
) -> Redirect {
    log::debug!("Request failed: {}", err);
    app.session_service
        .push_flash(token, flash_category(err), err.message().to_string());
    Redirect::to(to)
}
