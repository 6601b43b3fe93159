//! Error types for the template crate (thiserror-based).

use thiserror::Error;

/// Errors that can occur while reading, writing, or storing templates.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// File I/O error (read, write, path resolution).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Template file comes from a newer format than this build understands.
    #[error("Unsupported template version: {version}")]
    UnsupportedVersion { version: String },

    /// Template violates a structural rule.
    #[error("Invalid template: {reason}")]
    InvalidTemplate { reason: String },

    /// Migration from an older format failed.
    #[error("Migration failed from version {from} to {to}: {reason}")]
    MigrationFailed {
        from: String,
        to: String,
        reason: String,
    },

    /// No template stored under this id or path.
    #[error("Template not found: {id}")]
    NotFound { id: String },
}

impl TemplateError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        TemplateError::InvalidTemplate {
            reason: reason.into(),
        }
    }
}

/// Convenience Result type for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = TemplateError::UnsupportedVersion {
            version: "7".into(),
        };
        assert!(err.to_string().contains('7'));

        let err = TemplateError::invalid("no sections");
        assert!(err.to_string().contains("no sections"));

        let err = TemplateError::MigrationFailed {
            from: "0".into(),
            to: "1".into(),
            reason: "elements must be an array".into(),
        };
        assert!(err.to_string().contains("elements must be an array"));

        let err = TemplateError::NotFound {
            id: "launch-promo".into(),
        };
        assert!(err.to_string().contains("launch-promo"));
    }

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: TemplateError = io_err.into();
        assert!(matches!(err, TemplateError::Io(_)));
    }
}
