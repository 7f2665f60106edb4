//! # Compact Block Storage
//!
//! Palette-compressed storage for per-cell block state.
//!
//! * [`BitPackedArray`] - fixed-width unsigned integers packed into `u64` words
//! * [`Palette`] - reference-counted value table with a reserved default slot
//! * [`PalettedBlockArray`] - the two combined, growing its width on demand
//!
//! Storing a block state directly would cost several bytes per cell. With a
//! palette the cost is `bits_per_value / 8` bytes per cell, which is what lets
//! many chunks stay loaded at once.

pub mod bit_packed_array;
pub mod palette;
pub mod paletted_block_array;

pub use bit_packed_array::BitPackedArray;
pub use palette::Palette;
pub use paletted_block_array::PalettedBlockArray;
