//! Compressed cross-reference stream (PDF 1.5+)
//!
//! The same logical table as the classic writer, encoded as binary rows
//! inside a Flate-compressed stream object. Each row is
//! `type | field 2 | generation` with widths given by `/W [1 w 2]`:
//! type 0 rows are free entries whose field 2 is the next free number,
//! type 1 rows are in-use entries whose field 2 is the byte offset.
//!
//! The stream is itself an indirect object. Its own reference must be added
//! to the table as in use, at the offset where the table starts, before the
//! table is written.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use tracing::trace;

use crate::error::XrefError;
use crate::reference::{ObjectRef, XrefRecord};
use crate::writer::XrefSink;

/// Width in bytes of the generation column
const GENERATION_WIDTH: usize = 2;

#[derive(Debug)]
pub struct XrefStreamWriter {
    reference: ObjectRef,
    compression: Compression,
    /// Extra dictionary entries, e.g. `/Root 1 0 R /Prev 1234`
    trailer_entries: String,
    size: u32,
    index: Vec<(u32, u32)>,
    records: Vec<XrefRecord>,
}

impl XrefStreamWriter {
    /// `level` is a zlib compression level from 0 to 9
    pub fn new(reference: ObjectRef, level: u32) -> Self {
        Self {
            reference,
            compression: Compression::new(level.min(9)),
            trailer_entries: String::new(),
            size: 0,
            index: Vec::new(),
            records: Vec::new(),
        }
    }

    /// Entries appended verbatim to the stream dictionary
    pub fn with_trailer_entries(mut self, entries: impl Into<String>) -> Self {
        self.trailer_entries = entries.into();
        self
    }

    pub fn reference(&self) -> ObjectRef {
        self.reference
    }

    /// Rows encoded with the given offset column width, uncompressed
    fn encode_rows(&self, width: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.records.len() * (1 + width + GENERATION_WIDTH));
        for record in &self.records {
            data.push(if record.is_free() { 0 } else { 1 });
            data.extend_from_slice(&record.value().to_be_bytes()[8 - width..]);
            data.extend_from_slice(&record.generation.to_be_bytes());
        }
        data
    }

    fn index_array(&self) -> String {
        self.index
            .iter()
            .map(|(first, count)| format!("{} {}", first, count))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Smallest number of bytes able to hold `value`, at least one
pub fn field_width(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(8).max(1)
}

impl XrefSink for XrefStreamWriter {
    fn begin(&mut self, _out: &mut dyn Write, size: u32) -> Result<(), XrefError> {
        self.size = size;
        self.index.clear();
        self.records.clear();
        Ok(())
    }

    fn subsection(
        &mut self,
        _out: &mut dyn Write,
        first: u32,
        count: u32,
    ) -> Result<(), XrefError> {
        self.index.push((first, count));
        Ok(())
    }

    fn record(&mut self, _out: &mut dyn Write, record: &XrefRecord) -> Result<(), XrefError> {
        self.records.push(*record);
        Ok(())
    }

    fn finish(&mut self, out: &mut dyn Write) -> Result<(), XrefError> {
        let max_value = self.records.iter().map(XrefRecord::value).max().unwrap_or(0);
        let width = field_width(max_value);
        let rows = self.encode_rows(width);

        let mut encoder = ZlibEncoder::new(Vec::new(), self.compression);
        encoder.write_all(&rows)?;
        let compressed = encoder.finish()?;
        trace!(
            rows = self.records.len(),
            raw = rows.len(),
            compressed = compressed.len(),
            "encoded xref stream"
        );

        let mut extra = String::new();
        if !self.trailer_entries.is_empty() {
            extra.push(' ');
            extra.push_str(&self.trailer_entries);
        }

        let header = format!(
            "{} {} obj\n<< /Type /XRef /Size {} /Index [{}] /W [1 {} {}] /Filter /FlateDecode /Length {}{} >>\nstream\n",
            self.reference.number,
            self.reference.generation,
            self.size,
            self.index_array(),
            width,
            GENERATION_WIDTH,
            compressed.len(),
            extra
        );
        out.write_all(header.as_bytes())?;
        out.write_all(&compressed)?;
        out.write_all(b"\nendstream\nendobj\n")?;
        Ok(())
    }
}
