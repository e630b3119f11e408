use thiserror::Error;

use crate::reference::ObjectRef;

#[derive(Error, Debug)]
pub enum XrefError {
    #[error("Object {0} was already added to the xref table")]
    DuplicateReference(ObjectRef),

    #[error("Object {0} is reserved as the head of the free list and cannot be in use")]
    ReservedObject(ObjectRef),

    #[error("No xref entry for object number {number} inside its subsection")]
    MissingEntry { number: u32 },

    #[error("Offset {offset} of object {number} does not fit in a 10-digit xref record")]
    OffsetOutOfRange { number: u32, offset: u64 },

    #[error("I/O error while writing xref table: {0}")]
    Io(#[from] std::io::Error),
}
