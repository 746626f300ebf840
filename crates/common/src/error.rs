use thiserror::Error;

#[derive(Debug, Error)]
pub enum SprintdeckError {
    #[error("configuration error: {0}")]
    Config(String),

    /// Upstream API answered with a non-success status.
    #[error("upstream HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Upstream could not be reached (connect/timeout/retries exhausted).
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for SprintdeckError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization failed: {err}"))
    }
}

pub type SprintdeckResult<T> = Result<T, SprintdeckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_error_displays_status_and_body() {
        let err = SprintdeckError::Upstream {
            status: 404,
            body: "board not found".to_string(),
        };
        assert_eq!(err.to_string(), "upstream HTTP 404: board not found");
    }

    #[test]
    fn serde_error_maps_to_internal() {
        let bad = serde_json::from_str::<serde_json::Value>("{not json");
        let err: SprintdeckError = bad.unwrap_err().into();
        assert!(matches!(err, SprintdeckError::Internal(_)));
    }
}
