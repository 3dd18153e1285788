use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Upstream fetch failed: {0}")]
    Upstream(#[from] feed::FeedError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0} not found in upstream payload")]
    NotFound(String),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl DashboardError {
    /// Short machine-readable code used in JSON error bodies
    pub fn code(&self) -> &'static str {
        match self {
            DashboardError::Upstream(_) => "fetch_failed",
            DashboardError::Storage(_) => "storage_failed",
            DashboardError::InvalidRequest(_) => "invalid_request",
            DashboardError::NotFound(_) => "not_found",
            DashboardError::Task(_) => "internal",
        }
    }
}
