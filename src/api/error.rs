use thiserror::Error;

/// Typed API error: the backend answered, but not with a usable payload.
///
/// Raised for every non-2xx status and for 2xx bodies that fail to decode or
/// validate. `message` is what a page shows to the user.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: u16,
    pub message: String,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// Everything an API call can fail with.
///
/// The two variants are deliberately distinct: callers render the API error's
/// message verbatim and fall back to a generic text for transport failures.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// No usable response: connection refused, DNS failure, broken body
    /// stream, or a request that could not be encoded.
    #[error("transport failure: {0}")]
    Transport(String),
}

impl ClientError {
    /// The typed API error, if the server produced one.
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            Self::Transport(_) => None,
        }
    }

    /// Message to show on a page: the API error's own message, or `fallback`
    /// for transport failures.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Api(err) => err.message.clone(),
            Self::Transport(_) => fallback.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_displays_message_only() {
        let err = ClientError::from(ApiError::new(404, "no data"));
        assert_eq!(err.to_string(), "no data");
        assert_eq!(err.api().map(|e| e.status), Some(404));
    }

    #[test]
    fn user_message_prefers_api_message() {
        let api = ClientError::from(ApiError::new(400, "Need at least 3 sessions"));
        assert_eq!(
            api.user_message("Failed to load analytics"),
            "Need at least 3 sessions"
        );

        let transport = ClientError::Transport("connection refused".to_string());
        assert_eq!(
            transport.user_message("Failed to load analytics"),
            "Failed to load analytics"
        );
        assert!(transport.api().is_none());
    }
}
