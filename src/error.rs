use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommitLensError {
    #[error("API request failed with status {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
}

pub type Result<T> = std::result::Result<T, CommitLensError>;
