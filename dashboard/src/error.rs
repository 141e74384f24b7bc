use std::time::Duration;

/// Result type returned by [MonitoringBackend](crate::backend::MonitoringBackend) implementations.
pub type BackendResult<T> = Result<T, BackendError>;

/// A failure reported by a monitoring backend
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    /// The backend rejected the credentials
    #[error("{0}")]
    Auth(String),
    /// The query could not be executed
    #[error("{0}")]
    Query(String),
    /// The backend answered with data that could not be understood
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Why a dashboard could not be built
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// Surfaced verbatim from the backend
    #[error("{message}")]
    BackendAuth { message: String },

    #[error("Backend query for {operation} failed: {source}")]
    BackendQuery {
        operation: &'static str,
        #[source]
        source: BackendError,
    },

    #[error("Backend query for {operation} timed out after {timeout:?}")]
    BackendTimeout {
        operation: &'static str,
        timeout: Duration,
    },
}

impl DashboardError {
    pub(crate) fn invalid_request(reason: impl Into<String>) -> Self {
        DashboardError::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Attach the failing operation to a backend error
    pub(crate) fn from_backend(operation: &'static str, error: BackendError) -> Self {
        match error {
            BackendError::Auth(message) => DashboardError::BackendAuth { message },
            source => DashboardError::BackendQuery { operation, source },
        }
    }

    /// Whether a backend query failed, including by timing out.
    pub fn is_query_failure(&self) -> bool {
        matches!(
            self,
            DashboardError::BackendQuery { .. } | DashboardError::BackendTimeout { .. }
        )
    }
}
