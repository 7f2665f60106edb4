//! # Palette
//!
//! Reference-counted deduplication table mapping small integers to values.
//!
//! Index 0 is reserved for `T::default()` and is never allocated or freed.
//! Every other live value owns exactly one slot; slot `n` is reported as palette
//! index `n + 1`. Freed slots keep their position so indices already written
//! into a packed array stay valid.

use std::cell::Cell;

use crate::error::{Result, VoxelError};

#[derive(Debug, Clone)]
struct Slot<T> {
    value: T,
    count: u32,
}

/// A palette of values of type `T`.
#[derive(Debug, Clone)]
pub struct Palette<T> {
    min_bits: u8,
    slots: Vec<Slot<T>>,
    used_slots: usize,
    bit_cache: Cell<Option<u8>>,
}

impl<T: Copy + Eq + Default> Palette<T> {
    /// Creates an empty palette that never reports fewer than `min_bits` bits.
    pub fn new(min_bits: u8) -> Self {
        Palette {
            min_bits,
            slots: Vec::new(),
            used_slots: 0,
            bit_cache: Cell::new(None),
        }
    }

    /// Adds one reference to `value` and returns its palette index.
    ///
    /// The default value always maps to index 0 without touching any state.
    pub fn add(&mut self, value: T) -> usize {
        if value == T::default() {
            return 0;
        }

        let mut first_empty = None;

        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.count > 0 && slot.value == value {
                slot.count += 1;
                return i + 1;
            }
            if slot.count == 0 && first_empty.is_none() {
                first_empty = Some(i);
            }
        }

        if let Some(i) = first_empty {
            self.slots[i] = Slot { value, count: 1 };
            self.used_slots += 1;
            return i + 1;
        }

        self.slots.push(Slot { value, count: 1 });
        self.used_slots += 1;
        self.bit_cache.set(None);

        self.slots.len()
    }

    /// Returns the value stored at `index`.
    ///
    /// Index 0 and freed slots decode to `T::default()`.
    pub fn get(&self, index: usize) -> Result<T> {
        if index == 0 {
            return Ok(T::default());
        }

        let slot = self.slot(index)?;
        Ok(if slot.count == 0 {
            T::default()
        } else {
            slot.value
        })
    }

    /// Drops one reference from `index`, freeing the slot when it reaches zero.
    ///
    /// Removing index 0 or an already free slot does nothing.
    pub fn remove(&mut self, index: usize) -> Result<()> {
        if index == 0 {
            return Ok(());
        }

        self.slot(index)?;
        let slot = &mut self.slots[index - 1];

        if slot.count == 0 {
            return Ok(());
        }

        slot.count -= 1;
        if slot.count == 0 {
            self.used_slots -= 1;
        }

        Ok(())
    }

    /// Reference count held by `index`. Index 0 is never counted.
    pub fn ref_count(&self, index: usize) -> Result<u32> {
        if index == 0 {
            return Ok(0);
        }
        Ok(self.slot(index)?.count)
    }

    /// Number of slots with a live reference.
    pub fn used_slots(&self) -> usize {
        self.used_slots
    }

    /// Number of allocated slots, live or free. Excludes the reserved index 0.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Minimum number of bits needed to store any index handed out so far.
    ///
    /// Cached until the next time a brand new slot is appended.
    pub fn bits_required_for_palette_indices(&self) -> u8 {
        if let Some(bits) = self.bit_cache.get() {
            return bits;
        }

        let bits = self.calc_bits();
        self.bit_cache.set(Some(bits));
        bits
    }

    fn calc_bits(&self) -> u8 {
        // ceil(log2(used + 1)) is the bit length of `used`.
        let bits = (usize::BITS - self.used_slots.leading_zeros()) as u8;
        bits.max(self.min_bits)
    }

    fn slot(&self, index: usize) -> Result<&Slot<T>> {
        self.slots
            .get(index.wrapping_sub(1))
            .ok_or(VoxelError::IndexOutOfBounds {
                index,
                len: self.slots.len() + 1,
            })
    }
}
