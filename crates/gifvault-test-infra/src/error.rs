use thiserror::Error;

pub type Result<T> = std::result::Result<T, TestInfraError>;

/// Failure to bring up or reach a fixture container.
#[derive(Debug, Error)]
pub enum TestInfraError {
    /// Docker refused to start the container or expose its port.
    #[error("fixture container unavailable: {0}")]
    Container(#[from] testcontainers::TestcontainersError),

    #[error("fixture redis url rejected: {0}")]
    RedisUrl(#[from] redis::RedisError),
}
