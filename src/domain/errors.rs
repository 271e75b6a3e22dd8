use thiserror::Error;

/// Failure talking to the remote data gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status { status: u16, message: Option<String> },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("request timed out")]
    Timeout,
}

impl GatewayError {
    /// Message supplied by the server, suitable for showing to the user.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            GatewayError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Server message when there is one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display_with_message() {
        let err = GatewayError::Status {
            status: 400,
            message: Some("Request not found".to_string()),
        };
        assert_eq!(err.to_string(), "server returned 400: Request not found");
        assert_eq!(err.user_message("fallback"), "Request not found");
    }

    #[test]
    fn test_user_message_falls_back() {
        let err = GatewayError::Status { status: 502, message: None };
        assert_eq!(err.to_string(), "server returned 502");
        assert_eq!(err.user_message("Could not load requests."), "Could not load requests.");
        assert_eq!(GatewayError::Timeout.user_message("x"), "x");
    }
}
