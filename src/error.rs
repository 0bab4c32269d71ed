use thiserror::Error;

#[derive(Error, Debug)]
pub enum BilsError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("Invalid numeric input: {0:?}")]
    InvalidNumericInput(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Main queue is closed")]
    QueueClosed,
    #[error("Notification error: {0}")]
    Notification(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl BilsError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, BilsError>;
