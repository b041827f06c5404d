use seeds::SeedError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Failed to read or write stream")]
    Io(#[from] std::io::Error),
    #[error("Failed to build seed URLs")]
    Seed(#[from] SeedError),
    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Pipeline task failed")]
    TaskFailed(#[from] tokio::task::JoinError),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
