use api_types::FieldError;
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;
use reports::ReportError;

use serde::Serialize;
pub use server::{ServerConfig, ServerState, router, run_with_listener};

mod auth;
mod budgets;
mod dentists;
mod exports;
mod extract;
mod health;
mod patients;
mod server;
mod views;

pub mod types {
    pub mod auth {
        pub use api_types::auth::{AuthResponse, LoginRequest, RegisterRequest, Role, UserView};
    }

    pub mod patient {
        pub use api_types::patient::{PatientNew, PatientUpdate, PatientView};
    }

    pub mod dentist {
        pub use api_types::dentist::{DentistNew, DentistUpdate, DentistView};
    }

    pub mod budget {
        pub use api_types::budget::{
            BudgetItemNew, BudgetItemView, BudgetNew, BudgetStatus, BudgetStatusUpdate,
            BudgetUpdate, BudgetView,
        };
    }
}

/// Every failure a handler can answer with.
#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    /// Malformed body or parameter.
    BadRequest(String),
    /// Every failing field of a body.
    Validation(Vec<FieldError>),
    /// Missing credentials.
    Unauthorized(String),
    /// Bad token or role.
    Forbidden(String),
    /// No route matched the path.
    RouteNotFound(String),
    Internal(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
}

impl Error {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            errors: Vec::new(),
            path: None,
        }
    }
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::InvalidInput(_) | EngineError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
        EngineError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        EngineError::Forbidden(_) | EngineError::Token(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) | EngineError::InUse(_) => StatusCode::CONFLICT,
        EngineError::Internal(_) | EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Internal(msg) => {
            tracing::error!("engine error: {msg}");
            "internal server error".to_string()
        }
        EngineError::InvalidCredentials => "invalid email or password".to_string(),
        EngineError::Token(_) => "invalid or expired token".to_string(),
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => (
                status_for_engine_error(&err),
                Error::new(message_for_engine_error(err)),
            ),
            ServerError::BadRequest(err) => (StatusCode::BAD_REQUEST, Error::new(err)),
            ServerError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Error {
                    errors,
                    ..Error::new("validation failed")
                },
            ),
            ServerError::Unauthorized(err) => (StatusCode::UNAUTHORIZED, Error::new(err)),
            ServerError::Forbidden(err) => (StatusCode::FORBIDDEN, Error::new(err)),
            ServerError::RouteNotFound(path) => (
                StatusCode::NOT_FOUND,
                Error {
                    path: Some(path),
                    ..Error::new("route not found")
                },
            ),
            ServerError::Internal(err) => {
                tracing::error!("internal error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Error::new("internal server error"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<ReportError> for ServerError {
    fn from(value: ReportError) -> Self {
        Self::Internal(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_forbidden_maps_to_403() {
        let res = ServerError::from(EngineError::Forbidden("forbidden".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        let res = ServerError::from(EngineError::Token("expired".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let res = ServerError::from(EngineError::InUse("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_400() {
        let res = ServerError::from(EngineError::InvalidAmount("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn credentials_map_to_401() {
        let res = ServerError::from(EngineError::InvalidCredentials).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let res = ServerError::Unauthorized("token not provided".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn internal_details_are_hidden() {
        assert_eq!(
            message_for_engine_error(EngineError::Internal("secret detail".to_string())),
            "internal server error"
        );
        let res = ServerError::Internal("boom".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn bad_request_maps_to_400() {
        let res = ServerError::BadRequest("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let res = ServerError::Validation(vec![FieldError {
            field: "items".to_string(),
            message: "required".to_string(),
        }])
        .into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
