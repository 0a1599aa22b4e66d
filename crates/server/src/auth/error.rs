use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE};
use serde::Serialize;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,
    #[error("Internal server error")]
    Internal,
    #[error("Invalid token: {0}")]
    InvalidToken(&'static str),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_description: Option<&'static str>,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                [(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"))],
                Json(ErrorResponse {
                    error: "unauthorized",
                    error_description: None,
                }),
            )
                .into_response(),
            AuthError::InvalidToken(description) => {
                // RFC 6750 section 3: the description must not contain quotes, ours are static.
                let challenge = format!(r#"Bearer error="invalid_token", error_description="{description}""#);

                let challenge =
                    HeaderValue::from_str(&challenge).unwrap_or_else(|_| HeaderValue::from_static("Bearer"));

                (
                    StatusCode::UNAUTHORIZED,
                    [(WWW_AUTHENTICATE, challenge)],
                    Json(ErrorResponse {
                        error: "invalid_token",
                        error_description: Some(description),
                    }),
                )
                    .into_response()
            }
            AuthError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "internal_server_error",
                    error_description: Some("An internal error occurred"),
                }),
            )
                .into_response(),
        }
    }
}
