//! Document save orchestration
//!
//! Writes a complete file, or an incremental update appended to one:
//!
//! 1. header (full saves only)
//! 2. object bodies, each recorded in the xref table at its offset
//! 3. free object numbers; a full save also frees every unassigned number
//! 4. cross-reference section in the configured format
//! 5. trailer (classic tables only; xref streams embed it)
//! 6. `startxref` and `%%EOF`

use std::io::{Seek, Write};

use pdf_xref::{ClassicTableWriter, ObjectRef, XrefFormat, XrefStreamWriter, XrefTable};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use crate::config::{SaveConfig, XrefFormatKind};
use crate::error::SaveError;
use crate::trailer::{write_startxref, FileIdentifier, Trailer};

/// Binary marker line following the header, so transfer tools treat the file as binary
const BINARY_MARKER: &[u8] = b"%\xE2\xE3\xCF\xD3\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectBody {
    /// Serialized object content, written between `N G obj` and `endobj`
    Bytes(Vec<u8>),
    /// Unchanged object from a previous revision, with its offset there if known
    Retained(Option<u64>),
}

/// What an incremental update needs to know about the file it extends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviousRevision {
    /// Start of the last cross-reference section, written as `/Prev`
    pub xref_offset: u64,
    /// The `/Size` of that section; numbers below it are taken
    pub size: u32,
    /// The `/ID` of that revision, whose first half is kept
    pub id: Option<FileIdentifier>,
}

impl PreviousRevision {
    pub fn new(xref_offset: u64, size: u32) -> Self {
        Self {
            xref_offset,
            size,
            id: None,
        }
    }

    pub fn with_id(mut self, id: FileIdentifier) -> Self {
        self.id = Some(id);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveReport {
    /// Where the cross-reference section starts
    pub xref_offset: u64,
    /// Value written as the trailer's `/Size`
    pub size: u32,
    pub objects_written: usize,
    /// The `/ID` written to the trailer
    pub id: FileIdentifier,
}

impl SaveReport {
    /// Starting point for the next incremental update of the saved file
    pub fn revision(&self) -> PreviousRevision {
        PreviousRevision::new(self.xref_offset, self.size).with_id(self.id)
    }
}

#[derive(Debug, Default)]
pub struct DocumentWriter {
    config: SaveConfig,
    objects: Vec<(ObjectRef, ObjectBody)>,
    free: Vec<ObjectRef>,
    trailer: Trailer,
    previous: Option<PreviousRevision>,
}

impl DocumentWriter {
    pub fn new(config: SaveConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn add_object(&mut self, reference: ObjectRef, body: ObjectBody) {
        self.objects.push((reference, body));
    }

    pub fn add_free(&mut self, reference: ObjectRef) {
        self.free.push(reference);
    }

    pub fn set_root(&mut self, root: ObjectRef) {
        self.trailer.root = Some(root);
    }

    pub fn set_info(&mut self, info: ObjectRef) {
        self.trailer.info = Some(info);
    }

    pub fn set_encrypt(&mut self, encrypt: ObjectRef) {
        self.trailer.encrypt = Some(encrypt);
    }

    /// Write `id` as is instead of deriving one from the saved content
    pub fn set_identifier(&mut self, id: FileIdentifier) {
        self.trailer.id = Some(id);
    }

    /// Append to an existing file instead of writing a new one
    ///
    /// The header is not written again, the trailer links back with `/Prev`
    /// and `/Size` never shrinks below the previous revision's.
    pub fn incremental(&mut self, previous: PreviousRevision) {
        self.previous = Some(previous);
    }

    pub fn is_incremental(&self) -> bool {
        self.previous.is_some()
    }

    #[instrument(skip_all, fields(objects = self.objects.len(), incremental = self.is_incremental()))]
    pub fn save<W: Write + Seek>(&self, out: &mut W) -> Result<SaveReport, SaveError> {
        self.config.validate()?;

        if !self.is_incremental() {
            writeln!(out, "%PDF-{}", self.config.version.as_str())?;
            out.write_all(BINARY_MARKER)?;
        }

        let mut table = XrefTable::new();
        let mut content = Sha256::new_with_prefix(self.config.version.as_str());
        let mut objects_written = 0;
        for (reference, body) in &self.objects {
            match body {
                ObjectBody::Bytes(bytes) => {
                    let offset = out.stream_position()?;
                    table.add_in_use(*reference, Some(offset))?;
                    writeln!(out, "{} {} obj", reference.number, reference.generation)?;
                    out.write_all(bytes)?;
                    out.write_all(b"\nendobj\n")?;
                    content.update(reference.to_string());
                    content.update(bytes);
                    objects_written += 1;
                }
                ObjectBody::Retained(offset) => table.add_in_use(*reference, *offset)?,
            }
        }
        for reference in &self.free {
            table.add_free(*reference)?;
        }
        if !self.is_incremental() {
            table.fill_free_gaps()?;
        }
        table.mark_first_block_empty();

        let floor = self.previous.map_or(0, |previous| previous.size);
        let mut trailer = self.trailer.clone();
        trailer.prev = self.previous.map(|previous| previous.xref_offset);
        let id = self.identifier(content);
        trailer.id = Some(id);

        let mut format = self.table_format(&mut table, &trailer, floor, out)?;
        let xref_offset = table.write(format.as_sink(), out)?;
        debug!(xref_offset, "cross-reference section written");

        trailer.size = table.size().max(floor).max(1);
        if !format.embeds_trailer() {
            trailer.write(out)?;
        }
        write_startxref(out, xref_offset)?;

        info!(
            xref_offset,
            size = trailer.size,
            objects_written,
            "PDF saved"
        );
        Ok(SaveReport {
            xref_offset,
            size: trailer.size,
            objects_written,
            id,
        })
    }

    /// Explicit identifier, else one derived from this revision's content
    fn identifier(&self, content: Sha256) -> FileIdentifier {
        if let Some(id) = self.trailer.id {
            return id;
        }
        match self.previous.and_then(|previous| previous.id) {
            Some(previous) => previous.updated_from_digest(content),
            None => FileIdentifier::from_digest(content),
        }
    }

    /// Pick the table encoding; an xref stream registers its own object first
    ///
    /// The stream takes the first number not used by this or any earlier
    /// revision.
    fn table_format<W: Write + Seek>(
        &self,
        table: &mut XrefTable,
        trailer: &Trailer,
        floor: u32,
        out: &mut W,
    ) -> Result<XrefFormat, SaveError> {
        let xref = &self.config.xref;
        match xref.format {
            XrefFormatKind::Classic => Ok(XrefFormat::Classic(ClassicTableWriter::new(
                xref.line_ending,
            ))),
            XrefFormatKind::Stream => {
                let reference = ObjectRef::new(table.size().max(floor).max(1), 0);
                table.add_in_use(reference, Some(out.stream_position()?))?;
                let writer = XrefStreamWriter::new(reference, xref.compression)
                    .with_trailer_entries(trailer.entries());
                Ok(XrefFormat::Stream(writer))
            }
        }
    }
}
