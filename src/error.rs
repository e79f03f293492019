//! Error types for whisker.

/// Result type alias for whisker operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for whisker.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration.
    #[error("failed to serialize config")]
    ConfigSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// Model file does not exist.
    #[error("model file does not exist: {path}")]
    ModelFileNotFound {
        /// Path to the missing model file.
        path: std::path::PathBuf,
    },

    /// Failed to load a model.
    #[error("failed to load model '{path}': {reason}")]
    ModelLoad {
        /// Path to the model file.
        path: std::path::PathBuf,
        /// Description of the load failure.
        reason: String,
    },

    /// Identity table file does not exist.
    #[error("identity table does not exist: {path}")]
    IdentityTableNotFound {
        /// Path to the missing identity table.
        path: std::path::PathBuf,
    },

    /// Failed to read identity table.
    #[error("failed to read identity table '{path}'")]
    IdentityTableRead {
        /// Path to the identity table.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse identity table.
    #[error("failed to parse identity table '{path}'")]
    IdentityTableParse {
        /// Path to the identity table.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Identity table is empty.
    #[error("identity table '{path}' contains no identities")]
    IdentityTableEmpty {
        /// Path to the identity table.
        path: std::path::PathBuf,
    },

    /// Failed to read detector labels file.
    #[error("failed to read labels file '{path}'")]
    LabelsRead {
        /// Path to the labels file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to bind the HTTP listener.
    #[error("failed to bind {addr}")]
    ServerBind {
        /// Address that could not be bound.
        addr: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// HTTP server terminated with an error.
    #[error("server error: {0}")]
    Server(#[source] std::io::Error),

    /// Request signature or timestamp rejected.
    #[error("authentication failed: {reason}")]
    AuthenticationFailure {
        /// Which check rejected the request.
        reason: String,
    },

    /// Request was missing data or carried undecodable data.
    #[error("malformed input: {reason}")]
    MalformedInput {
        /// Description of what was wrong with the input.
        reason: String,
    },

    /// The subject detector failed.
    #[error("detection failed: {reason}")]
    DetectionFailure {
        /// Detector error text.
        reason: String,
    },

    /// An identity classifier failed.
    #[error("classification failed: {reason}")]
    ClassificationFailure {
        /// Classifier error text.
        reason: String,
    },

    /// Internal error (for unexpected failures).
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl Error {
    /// Build a [`Error::MalformedInput`] from any displayable reason.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            reason: reason.into(),
        }
    }

    /// Whether the client caused this error (bad signature or malformed
    /// upload) rather than the service or its models.
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailure { .. } | Self::MalformedInput { .. }
        )
    }

    /// Message placed in the `{ok: false}` response envelope.
    ///
    /// Authentication failures never reveal which check failed.
    pub fn envelope_message(&self) -> String {
        match self {
            Self::AuthenticationFailure { .. } => "authentication failed".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_message_hides_reason() {
        let err = Error::AuthenticationFailure {
            reason: "timestamp outside tolerance".to_string(),
        };
        assert_eq!(err.envelope_message(), "authentication failed");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_collaborator_message_keeps_reason() {
        let err = Error::DetectionFailure {
            reason: "session poisoned".to_string(),
        };
        assert!(err.envelope_message().contains("session poisoned"));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_malformed_is_client_error() {
        let err = Error::malformed("empty photo");
        assert!(err.is_client_error());
    }
}
