//! # Chunk Iteration Module
//!
//! This module provides an iterator for traversing all non-air blocks in a
//! chunk together with their local positions.
//!
//! The iterator walks the packed block array in cell-index order and decodes
//! each entry through the palette, skipping air. Because air is always palette
//! slot 0, the skip is a single comparison against the default state.

use cgmath::Point3;

use crate::engine_state::voxels::block::BlockState;
use crate::engine_state::voxels::storage::PalettedBlockArray;

use super::Chunk;

/// An iterator over all non-air blocks in a chunk.
pub struct ChunkBlockIterator<'a> {
    blocks: &'a PalettedBlockArray<BlockState>,
    /// Next cell index to inspect
    current_index: usize,
}

impl<'a> ChunkBlockIterator<'a> {
    /// Creates a new `ChunkBlockIterator` positioned before the first cell.
    pub fn new(blocks: &'a PalettedBlockArray<BlockState>) -> Self {
        ChunkBlockIterator {
            blocks,
            current_index: 0,
        }
    }
}

impl Iterator for ChunkBlockIterator<'_> {
    type Item = (Point3<i32>, BlockState);

    fn next(&mut self) -> Option<Self::Item> {
        while self.current_index < self.blocks.len() {
            let index = self.current_index;
            self.current_index += 1;

            match self.blocks.get(index) {
                Ok(state) if !state.is_air() => {
                    return Some((Chunk::local_from_index(index), state));
                }
                _ => continue,
            }
        }
        None
    }
}
