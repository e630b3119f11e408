//! PDF cross-reference tables
//!
//! This crate builds the index that maps every indirect object of a PDF file
//! to its byte offset, or to its place in the free-object chain, and writes
//! it in the exact layout readers expect.
//!
//! ```text
//! add_in_use / add_free  ->  blocks  ->  merge  ->  free chain  ->  sink
//! ```
//!
//! Two encodings are available through [`XrefFormat`]: the classic
//! plain-text `xref` table and the compressed xref stream.

pub mod block;
pub mod error;
pub mod free_chain;
pub mod merge;
pub mod reference;
pub mod stream;
pub mod table;
pub mod writer;

pub use block::XrefBlock;
pub use error::XrefError;
pub use free_chain::{FreeChain, FreeLink};
pub use merge::merge_blocks;
pub use reference::{
    FreeEntry, InUseEntry, ObjectRef, RecordKind, XrefRecord, MAX_GENERATION,
};
pub use stream::XrefStreamWriter;
pub use table::XrefTable;
pub use writer::{
    ClassicTableWriter, LineEnding, XrefFormat, XrefSink, MAX_RECORD_OFFSET, RECORD_WIDTH,
};
