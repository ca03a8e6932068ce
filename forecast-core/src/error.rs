//! Error taxonomy for the request/response pipeline.

use thiserror::Error;

/// Every failure a single fetch attempt can end in.
///
/// All variants are terminal for the attempt that produced them; nothing in
/// this crate retries. Retrying means building and fetching again from scratch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForecastError {
    /// The query was rejected before any network call was made.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Transport failure or non-2xx status from upstream.
    #[error("network error: {cause}")]
    Network { status: Option<u16>, cause: String },

    /// The response body did not match the timelines schema.
    #[error("failed to decode field `{field}`: {reason}")]
    Decode { field: String, reason: String },

    /// The fetch was superseded and its cancellation token fired.
    #[error("request cancelled")]
    Cancelled,
}

impl ForecastError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub(crate) fn network(status: Option<u16>, cause: impl Into<String>) -> Self {
        Self::Network {
            status,
            cause: cause.into(),
        }
    }

    pub(crate) fn decode(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether presenting a retry affordance makes sense for this failure.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Short message suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidRequest(msg) => format!("Unable to build request: {msg}"),
            Self::Network {
                status: Some(code),
                ..
            } => {
                format!("Weather service responded with status {code}. Pull to retry.")
            }
            Self::Network { status: None, .. } => {
                "Network error. Check your connection and retry.".to_string()
            }
            Self::Decode { field, .. } => {
                format!("Unable to load page: unexpected data for `{field}`.")
            }
            Self::Cancelled => "Request cancelled".to_string(),
        }
    }
}
