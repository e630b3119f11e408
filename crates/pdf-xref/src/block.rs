//! Contiguous runs of object numbers
//!
//! A block covers `[first, first + count)` and holds exactly one entry per
//! number in that range, split into an in-use list and a free list. Both
//! lists stay sorted by object number. The only number allowed to be
//! missing is object 0 in a block starting at 0, which the free chain
//! supplies implicitly.

use crate::reference::{BlockEntry, FreeEntry, InUseEntry};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XrefBlock {
    pub(crate) first: u32,
    pub(crate) count: u32,
    pub(crate) items: Vec<InUseEntry>,
    pub(crate) free_items: Vec<FreeEntry>,
}

impl XrefBlock {
    /// Block holding only the implicit object 0
    pub(crate) fn free_head() -> Self {
        Self {
            first: 0,
            count: 1,
            ..Default::default()
        }
    }

    pub(crate) fn singleton(entry: BlockEntry) -> Self {
        let mut block = Self {
            first: entry.number(),
            count: 1,
            ..Default::default()
        };
        match entry {
            BlockEntry::InUse(item) => block.items.push(item),
            BlockEntry::Free(item) => block.free_items.push(item),
        }
        block
    }

    pub fn first(&self) -> u32 {
        self.first
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// One past the last object number covered; widened so `u32::MAX` fits
    pub fn end(&self) -> u64 {
        u64::from(self.first) + u64::from(self.count)
    }

    pub fn contains(&self, number: u32) -> bool {
        number >= self.first && u64::from(number) < self.end()
    }

    pub fn items(&self) -> &[InUseEntry] {
        &self.items
    }

    pub fn free_items(&self) -> &[FreeEntry] {
        &self.free_items
    }

    /// Extend the block by one number at either edge
    ///
    /// Returns false when the entry is not adjacent to the range; the block
    /// is left untouched in that case.
    pub(crate) fn try_insert(&mut self, entry: BlockEntry) -> bool {
        let number = entry.number();

        if u64::from(number) == self.end() {
            self.count += 1;
            match entry {
                BlockEntry::InUse(item) => self.items.push(item),
                BlockEntry::Free(item) => self.free_items.push(item),
            }
            return true;
        }

        if self.first > 0 && number == self.first - 1 {
            self.first = number;
            self.count += 1;
            match entry {
                BlockEntry::InUse(item) => self.items.insert(0, item),
                BlockEntry::Free(item) => self.free_items.insert(0, item),
            }
            return true;
        }

        false
    }

    /// Append a block that starts exactly where this one ends
    pub(crate) fn absorb(&mut self, next: XrefBlock) {
        debug_assert_eq!(self.end(), u64::from(next.first));
        self.count += next.count;
        self.items.extend(next.items);
        self.free_items.extend(next.free_items);
    }
}
