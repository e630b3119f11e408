//! Coalescing of adjacent blocks
//!
//! Every pair of neighbouring blocks whose ranges touch becomes one
//! subsection, which keeps the written table as small as possible. Blocks
//! arrive sorted by `first` and never overlap, so a single left-to-right
//! pass reaches the fixed point.

use crate::block::XrefBlock;

/// Merge all blocks that follow immediately after each other
pub fn merge_blocks(blocks: &mut Vec<XrefBlock>) {
    if blocks.len() < 2 {
        return;
    }

    let mut merged: Vec<XrefBlock> = Vec::with_capacity(blocks.len());
    for block in blocks.drain(..) {
        match merged.last_mut() {
            Some(previous) if previous.end() == u64::from(block.first) => previous.absorb(block),
            _ => merged.push(block),
        }
    }

    *blocks = merged;
}

/// True when no two consecutive blocks touch or overlap
pub fn is_fully_merged(blocks: &[XrefBlock]) -> bool {
    blocks
        .windows(2)
        .all(|pair| pair[0].end() < u64::from(pair[1].first))
}
