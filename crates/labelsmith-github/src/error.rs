//! Maps GitHub responses onto the [`ApiError`] taxonomy.

use labelsmith_core::ApiError;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct RestErrorBody {
    message: Option<String>,
    #[serde(default)]
    errors: Vec<RestErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct RestErrorDetail {
    code: Option<String>,
    message: Option<String>,
}

/// A single entry of a GraphQL `errors` array.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlError {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub message: String,
}

/// Classifies a non-success REST (or GraphQL transport) response.
///
/// `rate_limit_remaining` is the `x-ratelimit-remaining` header, used to tell
/// rate limiting apart from permission problems on 403s.
pub fn classify_status(
    status: u16,
    body: &str,
    rate_limit_remaining: Option<&str>,
    resource: &str,
) -> ApiError {
    let parsed: RestErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .message
        .clone()
        .unwrap_or_else(|| body.trim().to_string());
    let lowered = message.to_ascii_lowercase();

    match status {
        401 => ApiError::Unauthorized,
        403 if rate_limit_remaining == Some("0") || lowered.contains("rate limit") => {
            ApiError::RateLimited
        }
        403 if lowered.contains("scope") => ApiError::InsufficientScope,
        403 => ApiError::Forbidden,
        404 | 410 => ApiError::not_found(resource),
        422 if parsed
            .errors
            .iter()
            .any(|detail| detail.code.as_deref() == Some("already_exists")) =>
        {
            ApiError::already_exists(resource)
        }
        429 => ApiError::RateLimited,
        _ => {
            let details: Vec<&str> = parsed
                .errors
                .iter()
                .filter_map(|detail| detail.message.as_deref().or(detail.code.as_deref()))
                .collect();
            if details.is_empty() {
                ApiError::Unclassified(format!("HTTP {status}: {message}"))
            } else {
                ApiError::Unclassified(format!("HTTP {status}: {message} ({})", details.join(", ")))
            }
        }
    }
}

/// Classifies the first entry of a GraphQL `errors` array.
pub fn classify_graphql(errors: &[GraphqlError], resource: &str) -> ApiError {
    let Some(error) = errors.first() else {
        return ApiError::Unclassified("empty GraphQL error list".to_string());
    };
    let lowered = error.message.to_ascii_lowercase();

    match error.kind.as_deref() {
        Some("NOT_FOUND") => ApiError::not_found(resource),
        Some("FORBIDDEN") => ApiError::Forbidden,
        Some("INSUFFICIENT_SCOPES") => ApiError::InsufficientScope,
        Some("RATE_LIMITED") => ApiError::RateLimited,
        Some("UNAUTHORIZED" | "UNAUTHENTICATED") => ApiError::Unauthorized,
        _ if lowered.contains("already been taken") || lowered.contains("already exists") => {
            ApiError::already_exists(resource)
        }
        _ if lowered.contains("could not resolve to") => ApiError::not_found(resource),
        _ => ApiError::Unclassified(error.message.clone()),
    }
}

/// Wraps a transport-level failure (DNS, TLS, timeout, malformed body).
pub fn transport_error(err: ureq::Error) -> ApiError {
    ApiError::Unclassified(format!("request failed: {err}"))
}
