use thiserror::Error;

/// Errors that can occur during receita core operations.
#[derive(Debug, Error)]
pub enum ReceitaError {
    /// The corpus is not valid JSON or does not have the expected shape.
    #[error("malformed corpus at `{field}`: {reason}")]
    DataFormat {
        /// Path of the missing or malformed field (e.g. `annotations[3].text`).
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The prediction backend failed for a single text.
    #[error("prediction failed: {0}")]
    Prediction(String),

    /// A persisted model could not be decoded or rebuilt.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// A regex pattern failed to compile (should not happen with static patterns).
    #[error("regex compilation error: {0}")]
    RegexError(#[from] regex::Error),

    /// Reading or writing a corpus or model file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReceitaError {
    pub(crate) fn data_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for receita operations.
pub type Result<T> = std::result::Result<T, ReceitaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = ReceitaError::data_format("annotations", "missing field");
        assert_eq!(
            err.to_string(),
            "malformed corpus at `annotations`: missing field"
        );

        let err = ReceitaError::Prediction("backend offline".into());
        assert!(err.to_string().contains("backend offline"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReceitaError>();
    }
}
