use thiserror::Error;

use crate::core::ItemId;

pub type GanttResult<T> = Result<T, GanttError>;

#[derive(Debug, Error)]
pub enum GanttError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: f64, height: f64 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown item: {0}")]
    UnknownItem(ItemId),

    #[error("unknown item key `{0}`")]
    UnknownItemKey(String),

    #[error("unknown column `{0}`")]
    UnknownColumn(String),

    #[error("unknown commit ticket {0}")]
    UnknownCommit(u64),

    #[error("malformed json input: {0}")]
    Json(#[from] serde_json::Error),
}
