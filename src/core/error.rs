//! Error types for the logging pipeline

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Flush requested while the dispatcher is parked. Honoring it would
    /// deadlock the calling thread, so it fails fast instead.
    #[error("Can't flush while the logger is suspended; call resume() first")]
    FlushWhileSuspended,

    /// Handler sink not open (never initialized, cleaned up, or inside a
    /// retry window after an IO failure)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a writer error
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::config("ServiceFileHandler", "reserved space too small");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerError::writer("not initialized");
        assert!(matches!(err, LoggerError::WriterError(..)));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::config("ServiceFileHandler", "reserved space too small");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for ServiceFileHandler: reserved space too small"
        );

        let err = LoggerError::FlushWhileSuspended;
        assert!(err.to_string().contains("suspended"));
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("opening log file", "cannot open file", io_err);

        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("opening log file"));
        assert!(err.to_string().contains("cannot open file"));
    }
}
