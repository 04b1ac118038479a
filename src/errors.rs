use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application-specific error types.
///
/// Every variant resolves at the handler boundary into a structured JSON
/// response; no error escapes unhandled. The relay only ever produces
/// 200, 405 and 500.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Required configuration absent (e.g. the Conversions API token).
    MissingConfig(String),
    /// Upstream accepted the connection but rejected the event. Carries the
    /// upstream JSON body so the caller can see what the Graph API said.
    UpstreamRejected(serde_json::Value),
    /// Error interacting with the upstream API (transport, bad response body).
    ExternalApiError(String),
    /// Request used a method other than GET/POST.
    MethodNotAllowed,
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::MissingConfig(msg) => write!(f, "{}", msg),
            AppError::UpstreamRejected(body) => write!(f, "Upstream rejected event: {}", body),
            AppError::ExternalApiError(msg) => write!(f, "External API error: {}", msg),
            AppError::MethodNotAllowed => write!(f, "Method Not Allowed"),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::WithContext { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Every body carries `ok: false`; an upstream rejection relays the
    /// upstream JSON under `meta`, everything else reports `error`.
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::MissingConfig(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "ok": false, "error": msg }),
                )
            }
            AppError::UpstreamRejected(meta) => {
                tracing::error!("CAPI Error: {}", meta);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "ok": false, "meta": meta }),
                )
            }
            AppError::ExternalApiError(msg) => {
                tracing::error!("External API error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "ok": false, "error": msg }),
                )
            }
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                json!({ "ok": false, "error": "Method Not Allowed" }),
            ),
            AppError::WithContext { source, context } => {
                // Log full context chain for debugging
                tracing::error!("Error with context: {} -> {}", context, source);
                // Delegate to underlying error's response
                return source.clone().into_response();
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::ExternalApiError(err.to_string())
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;

    /// Add context lazily (only evaluated on error).
    #[allow(dead_code)]
    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: f(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_message_is_verbatim() {
        let err = AppError::MissingConfig("META_ACCESS_TOKEN is missing".to_string());
        assert_eq!(err.to_string(), "META_ACCESS_TOKEN is missing");
    }

    #[test]
    fn app_error_propagates_through_anyhow() {
        // main() pipes AppError through `?` into anyhow::Result, which
        // requires the std::error::Error impl
        fn startup() -> anyhow::Result<()> {
            Err(AppError::ExternalApiError("boot failure".to_string()))?;
            Ok(())
        }
        let err = startup().unwrap_err();
        assert_eq!(err.to_string(), "External API error: boot failure");
    }

    #[test]
    fn context_chain_exposes_source() {
        let err = AppError::WithContext {
            source: Box::new(AppError::MethodNotAllowed),
            context: "dispatch".to_string(),
        };
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "Method Not Allowed");
    }

    #[test]
    fn context_wraps_and_displays_chain() {
        let result: Result<(), AppError> =
            Err(AppError::ExternalApiError("connection refused".to_string()));
        let err = result.context("sending lead event").unwrap_err();
        assert_eq!(
            err.to_string(),
            "sending lead event: External API error: connection refused"
        );
    }
}
