use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{}", .0)]
    Custom(String),

    #[error("IO::{:?}: {}", .0, .0)]
    Io(#[from] std::io::Error),

    #[error("Fmt::{:?}: {}", .0, .0)]
    Fmt(#[from] std::fmt::Error),

    #[error("FlexiLogger::{:?}: {}", .0, .0)]
    FlexiLogger(#[from] flexi_logger::FlexiLoggerError),

    #[error("{}", .0)]
    Api(#[from] roster_client::ApiError),

    #[error("Storage: {}", .0)]
    Storage(#[from] roster_core::storage::StorageError),

    #[error("{}", .0)]
    Parse(#[from] roster_core::ParseError),

    #[error("Json: {}", .0)]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {}", .0)]
    Url(#[from] url::ParseError),
}
