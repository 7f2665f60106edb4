//! # Paletted Block Array
//!
//! Combines a [`Palette`] with a [`BitPackedArray`] so that each cell only costs
//! `bits_per_value` bits instead of a full value. A chunk with at most 15
//! distinct non-default block states fits in 4 bits per cell (2 KiB for 4096
//! cells).

use crate::error::Result;

use super::{bit_packed_array::BitPackedArray, palette::Palette};

/// Fixed-length array of `T` stored as palette indices.
#[derive(Debug, Clone)]
pub struct PalettedBlockArray<T> {
    palette: Palette<T>,
    data: BitPackedArray,
}

impl<T: Copy + Eq + Default> PalettedBlockArray<T> {
    /// Creates an array of `len` default values, starting at `min_bits` per cell.
    pub fn new(len: usize, min_bits: u8) -> Result<Self> {
        Ok(PalettedBlockArray {
            palette: Palette::new(min_bits),
            data: BitPackedArray::new(min_bits, len)?,
        })
    }

    /// Stores `value` at `index` and returns the value it replaced.
    ///
    /// Grows the backing width first whenever the palette needs more bits than
    /// the array currently has.
    pub fn replace(&mut self, index: usize, value: T) -> Result<T> {
        let old_index = self.data.get(index)? as usize;
        let old_value = self.palette.get(old_index)?;

        if old_index != 0 {
            self.palette.remove(old_index)?;
        }

        let palette_index = self.palette.add(value);

        let required_bits = self.palette.bits_required_for_palette_indices();
        if required_bits > self.data.bits_per_value() {
            self.data.set_bits_per_value(required_bits)?;
        }

        self.data.set(index, palette_index as u32)?;

        Ok(old_value)
    }

    /// Decodes the value stored at `index`.
    pub fn get(&self, index: usize) -> Result<T> {
        let palette_index = self.data.get(index)? as usize;
        self.palette.get(palette_index)
    }

    /// Compaction hook. Currently keeps the existing layout as is.
    pub fn optimize(&mut self) {}

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current width of the backing packed array.
    pub fn bits_per_value(&self) -> u8 {
        self.data.bits_per_value()
    }

    pub fn palette(&self) -> &Palette<T> {
        &self.palette
    }

    /// Approximate heap footprint of the packed cell data in bytes.
    pub fn packed_bytes(&self) -> usize {
        self.data.backing_words() * std::mem::size_of::<u64>()
    }

    /// Iterates over every decoded value in index order.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.data
            .iter()
            .map(move |i| self.palette.get(i as usize).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_returns_previous_value() {
        let mut array = PalettedBlockArray::<u16>::new(64, 4).unwrap();
        assert_eq!(array.replace(3, 9).unwrap(), 0);
        assert_eq!(array.replace(3, 12).unwrap(), 9);
        assert_eq!(array.get(3).unwrap(), 12);
        assert_eq!(array.replace(3, 0).unwrap(), 12);
        assert_eq!(array.get(3).unwrap(), 0);
        assert_eq!(array.palette().used_slots(), 0);
    }

    #[test]
    fn width_grows_with_distinct_values() {
        let mut array = PalettedBlockArray::<u16>::new(4096, 4).unwrap();
        assert_eq!(array.bits_per_value(), 4);
        assert_eq!(array.packed_bytes(), 2048);

        for i in 0..100usize {
            array.replace(i, i as u16 + 1).unwrap();
            assert!(
                array.bits_per_value() >= array.palette().bits_required_for_palette_indices()
            );
        }

        assert_eq!(array.bits_per_value(), 7);
        for i in 0..100usize {
            assert_eq!(array.get(i).unwrap(), i as u16 + 1);
        }
        assert!(array.iter().skip(100).all(|v| v == 0));
    }

    #[test]
    fn width_never_shrinks() {
        let mut array = PalettedBlockArray::<u16>::new(64, 1).unwrap();
        for i in 0..8usize {
            array.replace(i, i as u16 + 1).unwrap();
        }
        let bits = array.bits_per_value();
        for i in 0..8usize {
            array.replace(i, 0).unwrap();
        }
        array.optimize();
        assert_eq!(array.bits_per_value(), bits);
    }

    #[test]
    fn randomized_against_plain_vec() {
        let mut rng = fastrand::Rng::with_seed(7);
        let mut array = PalettedBlockArray::<u16>::new(512, 2).unwrap();
        let mut expected = vec![0u16; 512];

        for _ in 0..5000 {
            let index = rng.usize(..512);
            let value = if rng.u8(..4) == 0 { 0 } else { rng.u16(1..40) };
            let old = array.replace(index, value).unwrap();
            assert_eq!(old, expected[index]);
            expected[index] = value;
        }

        assert_eq!(array.iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn out_of_range_is_an_error() {
        let mut array = PalettedBlockArray::<u16>::new(16, 4).unwrap();
        assert!(array.get(16).is_err());
        assert!(array.replace(16, 1).is_err());
    }
}
