//! Free-object chain
//!
//! Every free entry of the table, plus object 0, forms one circular list in
//! ascending object-number order: object 0 links to the lowest free number,
//! each entry links to the next one, and the last links back to 0. The chain
//! is computed over the whole merged table, never per block.

use crate::block::XrefBlock;
use crate::reference::MAX_GENERATION;

/// One node of the free chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeLink {
    pub number: u32,
    /// Generation serialized for this entry
    pub generation: u16,
    /// Object number of the next free entry
    pub next: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeChain {
    /// Sorted by number; `links[0]` is always object 0
    links: Vec<FreeLink>,
}

impl FreeChain {
    /// Link the free entries of an already merged block list
    pub fn link(blocks: &[XrefBlock]) -> Self {
        let free = blocks
            .iter()
            .flat_map(|block| block.free_items().iter())
            .filter(|entry| entry.number() != 0);

        let mut links = vec![FreeLink {
            number: 0,
            generation: MAX_GENERATION,
            next: 0,
        }];
        links.extend(free.map(|entry| FreeLink {
            number: entry.number(),
            generation: entry.reference.generation,
            next: 0,
        }));
        debug_assert!(links.windows(2).all(|pair| pair[0].number < pair[1].number));

        for i in 0..links.len() {
            links[i].next = links.get(i + 1).map_or(0, |link| link.number);
        }

        Self { links }
    }

    /// The node for object 0
    pub fn head(&self) -> &FreeLink {
        &self.links[0]
    }

    pub fn get(&self, number: u32) -> Option<&FreeLink> {
        self.links
            .binary_search_by_key(&number, |link| link.number)
            .ok()
            .map(|index| &self.links[index])
    }

    /// Number of nodes, object 0 included
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Always false: object 0 is part of every chain
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FreeLink> {
        self.links.iter()
    }

    /// Follow the links from object 0 until the chain returns to it
    ///
    /// The walk stops after `len()` steps, so a malformed chain cannot
    /// loop forever.
    pub fn walk(&self) -> Vec<u32> {
        let mut visited = vec![0];
        let mut current = self.head().next;
        while current != 0 && visited.len() <= self.links.len() {
            visited.push(current);
            current = match self.get(current) {
                Some(link) => link.next,
                None => break,
            };
        }
        visited
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{BlockEntry, FreeEntry, InUseEntry, ObjectRef};
    use pretty_assertions::assert_eq;

    fn free(number: u32, generation: u16) -> BlockEntry {
        BlockEntry::Free(FreeEntry {
            reference: ObjectRef::new(number, generation),
        })
    }

    fn used(number: u32) -> BlockEntry {
        BlockEntry::InUse(InUseEntry {
            reference: ObjectRef::new(number, 0),
            offset: 100,
        })
    }

    fn blocks_of(groups: Vec<Vec<BlockEntry>>) -> Vec<XrefBlock> {
        groups
            .into_iter()
            .map(|entries| {
                let mut iter = entries.into_iter();
                let mut block = XrefBlock::singleton(iter.next().unwrap());
                for entry in iter {
                    assert!(block.try_insert(entry));
                }
                block
            })
            .collect()
    }

    #[test]
    fn test_lone_head_links_to_itself() {
        let chain = FreeChain::link(&[XrefBlock::free_head()]);
        assert_eq!(
            *chain.head(),
            FreeLink {
                number: 0,
                generation: MAX_GENERATION,
                next: 0
            }
        );
        assert_eq!(chain.walk(), vec![0]);
    }

    #[test]
    fn test_chain_spans_blocks_in_ascending_order() {
        let blocks = blocks_of(vec![
            vec![free(1, 0), used(2), free(3, 0)],
            vec![free(10, 4), used(11)],
        ]);
        let chain = FreeChain::link(&blocks);

        assert_eq!(chain.walk(), vec![0, 1, 3, 10]);
        assert_eq!(chain.get(3).map(|l| l.next), Some(10));
        assert_eq!(chain.get(10).map(|l| (l.next, l.generation)), Some((0, 4)));
        assert_eq!(chain.get(2), None);
    }

    #[test]
    fn test_explicit_object_zero_is_not_duplicated() {
        let blocks = blocks_of(vec![vec![free(0, 0), used(1), free(2, 1)]]);
        let chain = FreeChain::link(&blocks);

        assert_eq!(chain.len(), 2);
        assert_eq!(chain.head().generation, MAX_GENERATION);
        assert_eq!(chain.head().next, 2);
        assert_eq!(chain.walk(), vec![0, 2]);
    }

    #[test]
    fn test_entries_keep_stored_generation() {
        let blocks = blocks_of(vec![vec![free(5, 7), free(6, 0)]]);
        let chain = FreeChain::link(&blocks);
        let generations: Vec<u16> = chain.iter().map(|l| l.generation).collect();
        assert_eq!(generations, vec![MAX_GENERATION, 7, 0]);
    }
}
