use pdf_xref::XrefError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("Failed to build xref table: {0}")]
    Xref(#[from] XrefError),

    #[error("I/O error while saving PDF: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid save configuration: {0}")]
    InvalidConfig(String),
}
