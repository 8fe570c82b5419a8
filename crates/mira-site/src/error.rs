use mira_github::FetchError;
use mira_platform::AppPathsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Paths(#[from] AppPathsError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}
