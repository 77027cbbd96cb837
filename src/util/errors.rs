use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

/// Shape of the JSON body produced for any failed route.
#[derive(Debug, Serialize, ToSchema)]
pub struct SimpleRouteErrorOutput {
    pub error: String,
}

/// Error type returned by every route handler.
///
/// Carries an HTTP status and an optional message safe to show to the
/// caller. The underlying cause is logged where the error is constructed,
/// never serialized into the response.
#[derive(Debug, thiserror::Error)]
#[error("route error {status}: {public_error_message:?}")]
pub struct RouteError {
    status: StatusCode,
    public_error_message: Option<String>,
}

impl RouteError {
    #[must_use]
    pub const fn new(status: StatusCode) -> Self {
        Self {
            status,
            public_error_message: None,
        }
    }

    #[must_use]
    pub const fn new_internal_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR)
    }

    #[must_use]
    pub const fn new_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND)
    }

    #[must_use]
    pub const fn new_bad_request() -> Self {
        Self::new(StatusCode::BAD_REQUEST)
    }

    #[must_use]
    pub const fn new_unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED)
    }

    #[must_use]
    pub const fn new_conflict() -> Self {
        Self::new(StatusCode::CONFLICT)
    }

    /// Sets the message included in the response body.
    #[must_use]
    pub fn set_public_error_message(mut self, message: &str) -> Self {
        self.public_error_message = Some(message.to_owned());
        self
    }

    fn message(&self) -> String {
        self.public_error_message.clone().unwrap_or_else(|| {
            self.status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_owned()
        })
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        let body = Json(SimpleRouteErrorOutput {
            error: self.message(),
        });

        (self.status, body).into_response()
    }
}

impl From<diesel::result::Error> for RouteError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Self::new_not_found(),
            _ => {
                error!("Database error: {err:?}");
                Self::new_internal_error()
            }
        }
    }
}

impl From<diesel_async::pooled_connection::deadpool::PoolError> for RouteError {
    fn from(err: diesel_async::pooled_connection::deadpool::PoolError) -> Self {
        error!("Failed to get DB connection from pool: {err:?}");
        Self::new_internal_error()
    }
}

impl From<anyhow::Error> for RouteError {
    fn from(err: anyhow::Error) -> Self {
        error!("Error in route: {err:?}");
        Self::new_internal_error()
    }
}

/// Helper for turning any `Result` into one carrying a `RouteError`,
/// logging the original error in the process.
pub trait IntoRouteError<T> {
    fn http_error(self, message: &str, status: StatusCode) -> Result<T, RouteError>;

    fn http_status_error(self, status: StatusCode) -> Result<T, RouteError>;
}

impl<T, E: std::fmt::Debug> IntoRouteError<T> for Result<T, E> {
    fn http_error(self, message: &str, status: StatusCode) -> Result<T, RouteError> {
        self.map_err(|err| {
            error!("http_error: {err:?}");
            RouteError::new(status).set_public_error_message(message)
        })
    }

    fn http_status_error(self, status: StatusCode) -> Result<T, RouteError> {
        self.map_err(|err| {
            error!("http_error: {err:?}");
            RouteError::new(status)
        })
    }
}
