use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("model backend error: {0}")]
    Backend(String),

    #[error("state value for {key:?} is not numeric: {value:?}")]
    NonNumericValue { key: String, value: String },

    #[error("sequential flow {0:?} has no sub-agents")]
    EmptyFlow(String),
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = OrchestratorError::NonNumericValue {
            key: "current_number".to_string(),
            value: "banana".to_string(),
        };
        assert!(error.to_string().contains("current_number"));
        assert!(error.to_string().contains("banana"));
    }
}
