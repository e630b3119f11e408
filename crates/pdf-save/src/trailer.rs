//! Trailer dictionary and file footer
//!
//! ```text
//! trailer
//! << /Size 4 /Root 1 0 R /ID [<..> <..>] /Prev 1187 >>
//! startxref
//! 1402
//! %%EOF
//! ```

use std::io::{self, Write};

use pdf_xref::ObjectRef;
use sha2::{Digest, Sha256};

/// The two halves of the trailer's `/ID` array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileIdentifier {
    /// Fixed when the file is first created
    pub original: [u8; 16],
    /// Changes with every revision
    pub current: [u8; 16],
}

impl FileIdentifier {
    /// Identifier for a new file; both halves are equal
    pub fn generate(seed: &[u8]) -> Self {
        Self::from_digest(Sha256::new_with_prefix(seed))
    }

    /// Same as [`generate`](Self::generate), for content hashed incrementally
    pub(crate) fn from_digest(content: Sha256) -> Self {
        let id = digest16(content);
        Self {
            original: id,
            current: id,
        }
    }

    /// Identifier for a new revision of an existing file
    pub fn updated(&self, seed: &[u8]) -> Self {
        self.updated_from_digest(Sha256::new_with_prefix(seed))
    }

    pub(crate) fn updated_from_digest(&self, content: Sha256) -> Self {
        Self {
            original: self.original,
            current: digest16(content),
        }
    }

    fn to_pdf(self) -> String {
        format!(
            "[<{}> <{}>]",
            hex::encode_upper(self.original),
            hex::encode_upper(self.current)
        )
    }
}

fn digest16(content: Sha256) -> [u8; 16] {
    let hash = content.finalize();

    let mut id = [0u8; 16];
    id.copy_from_slice(&hash[..16]);
    id
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trailer {
    pub size: u32,
    pub root: Option<ObjectRef>,
    pub info: Option<ObjectRef>,
    pub encrypt: Option<ObjectRef>,
    pub id: Option<FileIdentifier>,
    /// Offset of the previous cross-reference section, for incremental updates
    pub prev: Option<u64>,
}

impl Trailer {
    /// Dictionary entries except `/Size`, space separated
    ///
    /// Xref streams carry their own `/Size` and take the rest of the
    /// trailer verbatim.
    pub fn entries(&self) -> String {
        let mut entries = Vec::new();
        if let Some(root) = self.root {
            entries.push(format!("/Root {}", root));
        }
        if let Some(info) = self.info {
            entries.push(format!("/Info {}", info));
        }
        if let Some(encrypt) = self.encrypt {
            entries.push(format!("/Encrypt {}", encrypt));
        }
        if let Some(id) = self.id {
            entries.push(format!("/ID {}", id.to_pdf()));
        }
        if let Some(prev) = self.prev {
            entries.push(format!("/Prev {}", prev));
        }
        entries.join(" ")
    }

    pub fn write<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        let entries = self.entries();
        if entries.is_empty() {
            write!(out, "trailer\n<< /Size {} >>\n", self.size)
        } else {
            write!(out, "trailer\n<< /Size {} {} >>\n", self.size, entries)
        }
    }
}

/// Pointer to the last cross-reference section and end-of-file marker
pub fn write_startxref<W: Write + ?Sized>(out: &mut W, offset: u64) -> io::Result<()> {
    write!(out, "startxref\n{}\n%%EOF\n", offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write_to_string(trailer: &Trailer) -> String {
        let mut out = Vec::new();
        trailer.write(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_minimal_trailer() {
        let trailer = Trailer {
            size: 4,
            root: Some(ObjectRef::new(1, 0)),
            ..Default::default()
        };
        assert_eq!(
            write_to_string(&trailer),
            "trailer\n<< /Size 4 /Root 1 0 R >>\n"
        );
    }

    #[test]
    fn test_size_only() {
        let trailer = Trailer {
            size: 1,
            ..Default::default()
        };
        assert_eq!(write_to_string(&trailer), "trailer\n<< /Size 1 >>\n");
    }

    #[test]
    fn test_all_entries_in_order() {
        let trailer = Trailer {
            size: 9,
            root: Some(ObjectRef::new(1, 0)),
            info: Some(ObjectRef::new(5, 0)),
            encrypt: Some(ObjectRef::new(8, 0)),
            id: Some(FileIdentifier {
                original: [0xAB; 16],
                current: [0x01; 16],
            }),
            prev: Some(1187),
        };
        assert_eq!(
            trailer.entries(),
            format!(
                "/Root 1 0 R /Info 5 0 R /Encrypt 8 0 R /ID [<{}> <{}>] /Prev 1187",
                "AB".repeat(16),
                "01".repeat(16)
            )
        );
    }

    #[test]
    fn test_identifier_generation() {
        let first = FileIdentifier::generate(b"report.pdf");
        assert_eq!(first.original, first.current);
        assert_eq!(first, FileIdentifier::generate(b"report.pdf"));

        let next = first.updated(b"report.pdf revision 2");
        assert_eq!(next.original, first.original);
        assert_ne!(next.current, first.current);
    }

    #[test]
    fn test_incremental_digest_matches_seed() {
        let mut content = Sha256::new();
        content.update(b"report");
        content.update(b".pdf");
        assert_eq!(
            FileIdentifier::from_digest(content),
            FileIdentifier::generate(b"report.pdf")
        );
    }

    #[test]
    fn test_startxref_footer() {
        let mut out = Vec::new();
        write_startxref(&mut out, 1402).unwrap();
        assert_eq!(out, b"startxref\n1402\n%%EOF\n");
    }
}
