//! # Bit Packed Array
//!
//! A fixed-length array of small unsigned integers packed into 64-bit words.
//!
//! Element `i` starts at bit `i * bits_per_value` of the backing buffer. When an
//! element does not fit in the remainder of a word it is split across two
//! adjacent words, low bits first.
//!
//! ```text
//! bits_per_value = 5
//! word 0: | e0 | e1 | ... | e11 | e12 (low 4 bits) |
//! word 1: | e12 (high 1 bit) | e13 | ...           |
//! ```

use crate::error::{Result, VoxelError};

/// Smallest supported element width.
pub const MIN_BITS_PER_VALUE: u8 = 1;
/// Largest supported element width.
pub const MAX_BITS_PER_VALUE: u8 = 32;

const WORD_BITS: usize = u64::BITS as usize;

/// Fixed-length array of `bits_per_value`-wide unsigned integers.
///
/// The logical length never changes. The element width can only grow, through
/// [`BitPackedArray::set_bits_per_value`], which repacks every element into a
/// freshly sized buffer.
#[derive(Debug, Clone)]
pub struct BitPackedArray {
    data: Box<[u64]>,
    bits_per_value: u8,
    mask: u64,
    len: usize,
}

impl BitPackedArray {
    /// Creates a zero-filled array of `len` elements, each `bits_per_value` wide.
    ///
    /// # Errors
    /// `VoxelError::InvalidBitWidth` if `bits_per_value` is outside `[1, 32]`.
    pub fn new(bits_per_value: u8, len: usize) -> Result<Self> {
        Self::validate_bits(bits_per_value)?;

        Ok(BitPackedArray {
            data: vec![0u64; Self::backing_len(len, bits_per_value)].into_boxed_slice(),
            bits_per_value,
            mask: Self::mask_for(bits_per_value),
            len,
        })
    }

    /// Number of logical elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the array holds no elements at all.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current element width in bits.
    pub fn bits_per_value(&self) -> u8 {
        self.bits_per_value
    }

    /// Largest value storable at the current width.
    pub fn max_value(&self) -> u32 {
        self.mask as u32
    }

    /// Number of 64-bit words in the backing buffer.
    pub fn backing_words(&self) -> usize {
        self.data.len()
    }

    /// Reads the element at `index`.
    pub fn get(&self, index: usize) -> Result<u32> {
        self.check_index(index)?;
        Ok(Self::read(&self.data, self.bits_per_value, self.mask, index))
    }

    /// Writes `value` at `index`.
    ///
    /// # Errors
    /// - `IndexOutOfBounds` if `index >= len`
    /// - `ValueTooLarge` if `value` needs more than `bits_per_value` bits
    pub fn set(&mut self, index: usize, value: u32) -> Result<()> {
        self.check_index(index)?;

        if value as u64 > self.mask {
            return Err(VoxelError::ValueTooLarge {
                value,
                bits: self.bits_per_value,
            });
        }

        Self::write(&mut self.data, self.bits_per_value, self.mask, index, value);
        Ok(())
    }

    /// Grows the element width, repacking every element.
    ///
    /// Setting the current width again is a no-op. Shrinking is rejected since
    /// it could silently truncate stored values.
    pub fn set_bits_per_value(&mut self, bits_per_value: u8) -> Result<()> {
        Self::validate_bits(bits_per_value)?;

        if bits_per_value < self.bits_per_value {
            return Err(VoxelError::InvalidBitWidth(bits_per_value));
        }
        if bits_per_value == self.bits_per_value {
            return Ok(());
        }

        // The old buffer is released when it is swapped out below.
        self.data = self.repacked(bits_per_value);
        self.bits_per_value = bits_per_value;
        self.mask = Self::mask_for(bits_per_value);

        Ok(())
    }

    /// Iterates over every element in index order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len).map(move |i| Self::read(&self.data, self.bits_per_value, self.mask, i))
    }

    /// Builds a new backing buffer holding every element at `bits_per_value` width.
    fn repacked(&self, bits_per_value: u8) -> Box<[u64]> {
        let mask = Self::mask_for(bits_per_value);
        let mut data = vec![0u64; Self::backing_len(self.len, bits_per_value)].into_boxed_slice();

        for (i, value) in self.iter().enumerate() {
            Self::write(&mut data, bits_per_value, mask, i, value);
        }

        data
    }

    fn read(data: &[u64], bits_per_value: u8, mask: u64, index: usize) -> u32 {
        let bit_start = bits_per_value as usize * index;
        let word = bit_start / WORD_BITS;
        let offset = bit_start % WORD_BITS;
        let available = WORD_BITS - offset;

        let mut value = data[word] >> offset;

        if available < bits_per_value as usize {
            value |= data[word + 1] << available;
        }

        (value & mask) as u32
    }

    fn write(data: &mut [u64], bits_per_value: u8, mask: u64, index: usize, value: u32) {
        let value = value as u64;
        let bit_start = bits_per_value as usize * index;
        let word = bit_start / WORD_BITS;
        let offset = bit_start % WORD_BITS;
        let available = WORD_BITS - offset;

        data[word] = (data[word] & !(mask << offset)) | (value << offset);

        if available < bits_per_value as usize {
            data[word + 1] = (data[word + 1] & !(mask >> available)) | (value >> available);
        }
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.len {
            return Err(VoxelError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        Ok(())
    }

    fn validate_bits(bits_per_value: u8) -> Result<()> {
        if !(MIN_BITS_PER_VALUE..=MAX_BITS_PER_VALUE).contains(&bits_per_value) {
            return Err(VoxelError::InvalidBitWidth(bits_per_value));
        }
        Ok(())
    }

    fn mask_for(bits_per_value: u8) -> u64 {
        (1u64 << bits_per_value) - 1
    }

    fn backing_len(len: usize, bits_per_value: u8) -> usize {
        (len * bits_per_value as usize).div_ceil(WORD_BITS)
    }
}
