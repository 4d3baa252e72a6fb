use thiserror::Error;

#[derive(Error, Debug)]
pub enum PressroomError {
    #[error("Draft store error: {0}")]
    DraftStore(String),

    #[error("Analytics error: {0}")]
    Analytics(String),

    #[error("Model backend error: {0}")]
    Model(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Publish error: {0}")]
    Publish(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
