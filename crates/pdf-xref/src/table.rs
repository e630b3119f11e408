//! Reference index and table writer
//!
//! The table is filled while a document is being saved: every object
//! written to the output is reported with its offset, every unused number
//! is reported as free, in whatever order the writer produces them.
//! Entries are grouped into blocks of contiguous object numbers as they
//! arrive. On [`XrefTable::write`] the blocks are merged, the free chain is
//! linked across all of them, and the result is handed to an [`XrefSink`].

use std::collections::BTreeSet;
use std::io::{Seek, Write};

use tracing::{debug, trace, warn};

use crate::block::XrefBlock;
use crate::error::XrefError;
use crate::free_chain::FreeChain;
use crate::merge::merge_blocks;
use crate::reference::{
    BlockEntry, FreeEntry, InUseEntry, ObjectRef, RecordKind, XrefRecord, MAX_GENERATION,
};
use crate::writer::XrefSink;

#[derive(Debug, Default)]
pub struct XrefTable {
    blocks: Vec<XrefBlock>,
    /// In-use objects without an offset: counted in `size()`, never written
    counted_only: BTreeSet<u32>,
    max_number: Option<u32>,
    first_block_empty: bool,
    offset: Option<u64>,
}

impl XrefTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object that is in use
    ///
    /// `offset` is where the object was written. With `None` the object is
    /// accounted for in [`size`](Self::size) but gets no record, e.g. when
    /// its bytes already exist in a previous revision of the file.
    pub fn add_in_use(&mut self, reference: ObjectRef, offset: Option<u64>) -> Result<(), XrefError> {
        if reference.number == 0 {
            warn!(reference = %reference, "object 0 cannot be in use");
            return Err(XrefError::ReservedObject(reference));
        }
        self.check_unique(reference)?;

        match offset {
            Some(offset) => self.place(BlockEntry::InUse(InUseEntry { reference, offset })),
            None => {
                self.counted_only.insert(reference.number);
            }
        }
        self.track_max(reference.number);
        Ok(())
    }

    /// Add a free object number
    ///
    /// Object 0 is always free; adding it explicitly only confirms it.
    pub fn add_free(&mut self, reference: ObjectRef) -> Result<(), XrefError> {
        self.check_unique(reference)?;
        self.place(BlockEntry::Free(FreeEntry { reference }));
        self.track_max(reference.number);
        Ok(())
    }

    /// Highest object number seen plus one, or 0 when nothing was added
    pub fn size(&self) -> u32 {
        self.max_number.map_or(0, |max| max.saturating_add(1))
    }

    /// Make the first subsection start at object 0 even if nothing was added there
    pub fn mark_first_block_empty(&mut self) {
        self.first_block_empty = true;
    }

    /// Offset at which the table started, once written
    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    pub fn blocks(&self) -> &[XrefBlock] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.max_number.is_none()
    }

    /// Whether `number` was added, in use or free
    pub fn contains(&self, number: u32) -> bool {
        self.counted_only.contains(&number)
            || self
                .block_before(number)
                .is_some_and(|index| self.blocks[index].contains(number))
    }

    /// Mark every number below [`size`](Self::size) that was never added as free
    ///
    /// The first table of a file has to account for all object numbers from
    /// 0 upwards. Returns how many entries were added.
    pub fn fill_free_gaps(&mut self) -> Result<usize, XrefError> {
        let mut filled = 0;
        for number in 1..self.size() {
            if !self.contains(number) {
                self.add_free(ObjectRef::new(number, 0))?;
                filled += 1;
            }
        }
        if filled > 0 {
            debug!(filled, "unused object numbers marked free");
        }
        Ok(filled)
    }

    /// Merge adjacent blocks and link the free chain
    ///
    /// Called by [`write`](Self::write); exposed so callers can inspect the
    /// final layout.
    pub fn prepare(&mut self) -> FreeChain {
        self.ensure_free_head();
        merge_blocks(&mut self.blocks);
        FreeChain::link(&self.blocks)
    }

    /// Serialize the table and return the offset it starts at
    pub fn write<W: Write + Seek>(
        &mut self,
        sink: &mut dyn XrefSink,
        out: &mut W,
    ) -> Result<u64, XrefError> {
        let chain = self.prepare();
        let offset = out.stream_position()?;
        let size = self.declared_size();

        debug!(
            offset,
            size,
            blocks = self.blocks.len(),
            free = chain.len(),
            "writing xref table"
        );

        sink.begin(&mut *out, size)?;
        for block in &self.blocks {
            trace!(first = block.first(), count = block.count(), "xref subsection");
            sink.subsection(&mut *out, block.first(), block.count())?;
            for record in block_records(block, &chain)? {
                sink.record(&mut *out, &record)?;
            }
        }
        sink.finish(&mut *out)?;

        self.offset = Some(offset);
        Ok(offset)
    }

    fn check_unique(&self, reference: ObjectRef) -> Result<(), XrefError> {
        if self.contains(reference.number) {
            warn!(reference = %reference, "duplicate xref entry");
            return Err(XrefError::DuplicateReference(reference));
        }
        Ok(())
    }

    /// Index of the last block whose `first` is not above `number`
    fn block_before(&self, number: u32) -> Option<usize> {
        self.blocks
            .partition_point(|block| block.first() <= number)
            .checked_sub(1)
    }

    fn place(&mut self, entry: BlockEntry) {
        let number = entry.number();
        let after = self.blocks.partition_point(|block| block.first() <= number);

        if after > 0 && self.blocks[after - 1].try_insert(entry) {
            return;
        }
        if after < self.blocks.len() && self.blocks[after].try_insert(entry) {
            return;
        }
        self.blocks.insert(after, XrefBlock::singleton(entry));
    }

    fn track_max(&mut self, number: u32) {
        self.max_number = Some(self.max_number.map_or(number, |max| max.max(number)));
    }

    /// Put object 0 in front when the table opens the file or starts at 1
    fn ensure_free_head(&mut self) {
        let first = self.blocks.first().map(XrefBlock::first);
        let needs_head = match first {
            Some(0) => false,
            Some(1) => true,
            Some(_) => self.first_block_empty,
            None => true,
        };
        if needs_head {
            self.blocks.insert(0, XrefBlock::free_head());
        }
    }

    /// Size reported to the sink; never smaller than what is emitted
    fn declared_size(&self) -> u32 {
        let emitted = self
            .blocks
            .last()
            .map_or(0, |block| u32::try_from(block.end()).unwrap_or(u32::MAX));
        self.size().max(emitted)
    }
}

/// Records of one block in ascending object-number order
pub(crate) fn block_records(
    block: &XrefBlock,
    chain: &FreeChain,
) -> Result<Vec<XrefRecord>, XrefError> {
    let mut records = Vec::with_capacity(block.count() as usize);
    let mut items = block.items().iter().peekable();
    let mut free = block.free_items().iter().peekable();

    for number in (u64::from(block.first())..block.end()).map(|n| n as u32) {
        if let Some(item) = items.next_if(|item| item.number() == number) {
            records.push(XrefRecord {
                number,
                generation: item.reference.generation,
                kind: RecordKind::InUse {
                    offset: item.offset,
                },
            });
            continue;
        }

        let explicit = free.next_if(|entry| entry.number() == number).is_some();
        if explicit || number == 0 {
            let link = chain
                .get(number)
                .ok_or(XrefError::MissingEntry { number })?;
            let generation = if number == 0 {
                MAX_GENERATION
            } else {
                link.generation
            };
            records.push(XrefRecord {
                number,
                generation,
                kind: RecordKind::Free { next: link.next },
            });
            continue;
        }

        return Err(XrefError::MissingEntry { number });
    }

    Ok(records)
}
