use thiserror::Error;

pub type SheetcastResult<T> = Result<T, SheetcastError>;

#[derive(Error, Debug)]
pub enum SheetcastError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Delivery error: {0}")]
    Delivery(String),
}
