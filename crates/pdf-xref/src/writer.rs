//! Table serialization strategies
//!
//! [`XrefTable::write`](crate::XrefTable::write) walks the merged, linked
//! table and drives an [`XrefSink`]: one `begin`, then a `subsection` call per
//! block followed by that block's records, then `finish`. The classic
//! plain-text table and the compressed xref stream are the two sinks.
//!
//! Classic table layout:
//! ```text
//! xref
//! 0 4
//! 0000000001 65535 f
//! 0000000003 00000 f
//! 0000000100 00000 n
//! 0000000000 00000 f
//! ```
//! Every record is exactly 20 bytes including its two-byte line ending;
//! readers locate entries by `index * 20`.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::XrefError;
use crate::reference::XrefRecord;
use crate::stream::XrefStreamWriter;

/// Width of a single classic xref record in bytes
pub const RECORD_WIDTH: usize = 20;

/// Largest offset that fits in the 10-digit record field
pub const MAX_RECORD_OFFSET: u64 = 9_999_999_999;

/// Receives the table contents in write order
pub trait XrefSink {
    /// Called once before any subsection; `size` is the table's declared size
    fn begin(&mut self, out: &mut dyn Write, size: u32) -> Result<(), XrefError>;

    fn subsection(&mut self, out: &mut dyn Write, first: u32, count: u32)
        -> Result<(), XrefError>;

    fn record(&mut self, out: &mut dyn Write, record: &XrefRecord) -> Result<(), XrefError>;

    fn finish(&mut self, out: &mut dyn Write) -> Result<(), XrefError>;
}

/// Two-byte terminator of a classic record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineEnding {
    /// `" \n"`
    #[default]
    SpaceLf,
    /// `"\r\n"`
    CrLf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::SpaceLf => " \n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// Plain-text `xref` table
#[derive(Debug, Clone, Default)]
pub struct ClassicTableWriter {
    line_ending: LineEnding,
}

impl ClassicTableWriter {
    pub fn new(line_ending: LineEnding) -> Self {
        Self { line_ending }
    }

    /// Format one record; the result is always `RECORD_WIDTH` bytes long
    pub fn format_record(&self, record: &XrefRecord) -> Result<String, XrefError> {
        let value = record.value();
        if value > MAX_RECORD_OFFSET {
            return Err(XrefError::OffsetOutOfRange {
                number: record.number,
                offset: value,
            });
        }

        let line = format!(
            "{:010} {:05} {}{}",
            value,
            record.generation,
            record.tag(),
            self.line_ending.as_str()
        );
        debug_assert_eq!(line.len(), RECORD_WIDTH);
        Ok(line)
    }
}

impl XrefSink for ClassicTableWriter {
    fn begin(&mut self, out: &mut dyn Write, _size: u32) -> Result<(), XrefError> {
        out.write_all(b"xref\n")?;
        Ok(())
    }

    fn subsection(
        &mut self,
        out: &mut dyn Write,
        first: u32,
        count: u32,
    ) -> Result<(), XrefError> {
        out.write_all(format!("{} {}\n", first, count).as_bytes())?;
        Ok(())
    }

    fn record(&mut self, out: &mut dyn Write, record: &XrefRecord) -> Result<(), XrefError> {
        let line = self.format_record(record)?;
        out.write_all(line.as_bytes())?;
        Ok(())
    }

    fn finish(&mut self, _out: &mut dyn Write) -> Result<(), XrefError> {
        Ok(())
    }
}

/// Caller's choice of on-disk encoding
#[derive(Debug)]
pub enum XrefFormat {
    Classic(ClassicTableWriter),
    Stream(XrefStreamWriter),
}

impl XrefFormat {
    pub fn as_sink(&mut self) -> &mut dyn XrefSink {
        match self {
            XrefFormat::Classic(writer) => writer,
            XrefFormat::Stream(writer) => writer,
        }
    }

    /// Whether the trailer dictionary is carried inside the table itself
    pub fn embeds_trailer(&self) -> bool {
        matches!(self, XrefFormat::Stream(_))
    }
}

impl Default for XrefFormat {
    fn default() -> Self {
        XrefFormat::Classic(ClassicTableWriter::default())
    }
}
