//! PDF save pipeline
//!
//! Writes object bodies, the cross-reference section built by `pdf-xref`,
//! the trailer and the file footer, for full saves and incremental updates.

pub mod config;
pub mod document;
pub mod error;
pub mod trailer;

pub use config::{PdfVersion, SaveConfig, XrefConfig, XrefFormatKind};
pub use document::{DocumentWriter, ObjectBody, PreviousRevision, SaveReport};
pub use error::SaveError;
pub use trailer::{write_startxref, FileIdentifier, Trailer};
