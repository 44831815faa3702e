pub mod db;
pub mod part;
pub mod seed_data;

use seqforge_core::SeqError;
use thiserror::Error;

pub use part::StoredPart;

#[derive(Debug, Error)]
pub enum PartsError {
    #[error("Database error: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error(transparent)]
    Sequence(#[from] SeqError),
    #[error("Invalid part: {0}")]
    InvalidPart(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PartsError>;
