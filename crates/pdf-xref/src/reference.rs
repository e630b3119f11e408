//! Indirect object references and xref entries

use std::fmt;

/// Generation written for object 0 and for entries that must never be reused
pub const MAX_GENERATION: u16 = 65535;

/// Object reference (object number, generation number)
///
/// Ordered by object number first, then by generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectRef {
    pub number: u32,
    pub generation: u16,
}

impl ObjectRef {
    /// Object 0, the head of every free-object chain
    pub const FREE_HEAD: ObjectRef = ObjectRef {
        number: 0,
        generation: MAX_GENERATION,
    };

    pub const fn new(number: u32, generation: u16) -> Self {
        Self { number, generation }
    }
}

impl From<(u32, u16)> for ObjectRef {
    fn from((number, generation): (u32, u16)) -> Self {
        Self::new(number, generation)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.number, self.generation)
    }
}

/// An object that was written to the output at a known offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InUseEntry {
    pub reference: ObjectRef,
    pub offset: u64,
}

/// An unused object number
///
/// The generation is the one the number gets the next time it is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeEntry {
    pub reference: ObjectRef,
}

impl InUseEntry {
    pub fn number(&self) -> u32 {
        self.reference.number
    }
}

impl FreeEntry {
    pub fn number(&self) -> u32 {
        self.reference.number
    }
}

/// Entry routed into a block by the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockEntry {
    InUse(InUseEntry),
    Free(FreeEntry),
}

impl BlockEntry {
    pub(crate) fn number(&self) -> u32 {
        match self {
            BlockEntry::InUse(entry) => entry.number(),
            BlockEntry::Free(entry) => entry.number(),
        }
    }
}

/// One serialized row of the table, after the free chain has been linked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XrefRecord {
    pub number: u32,
    pub generation: u16,
    pub kind: RecordKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Byte offset of the object
    InUse { offset: u64 },
    /// Object number of the next free entry in the chain
    Free { next: u32 },
}

impl XrefRecord {
    /// The value stored in the first field of the record
    pub fn value(&self) -> u64 {
        match self.kind {
            RecordKind::InUse { offset } => offset,
            RecordKind::Free { next } => u64::from(next),
        }
    }

    pub fn is_free(&self) -> bool {
        matches!(self.kind, RecordKind::Free { .. })
    }

    /// Type keyword of a classic table row
    pub fn tag(&self) -> char {
        if self.is_free() {
            'f'
        } else {
            'n'
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_ordering_by_number_then_generation() {
        let mut refs = vec![
            ObjectRef::new(3, 0),
            ObjectRef::new(1, 2),
            ObjectRef::new(1, 0),
            ObjectRef::new(2, 7),
        ];
        refs.sort();
        assert_eq!(
            refs,
            vec![
                ObjectRef::new(1, 0),
                ObjectRef::new(1, 2),
                ObjectRef::new(2, 7),
                ObjectRef::new(3, 0),
            ]
        );
    }

    #[test]
    fn test_reference_equality_needs_both_fields() {
        assert_eq!(ObjectRef::new(4, 1), ObjectRef::from((4, 1)));
        assert_ne!(ObjectRef::new(4, 1), ObjectRef::new(4, 0));
    }

    #[test]
    fn test_reference_display() {
        assert_eq!(ObjectRef::new(12, 0).to_string(), "12 0 R");
    }

    #[test]
    fn test_record_value_and_tag() {
        let used = XrefRecord {
            number: 2,
            generation: 0,
            kind: RecordKind::InUse { offset: 100 },
        };
        let free = XrefRecord {
            number: 1,
            generation: 3,
            kind: RecordKind::Free { next: 5 },
        };
        assert_eq!((used.value(), used.tag()), (100, 'n'));
        assert_eq!((free.value(), free.tag()), (5, 'f'));
    }
}
