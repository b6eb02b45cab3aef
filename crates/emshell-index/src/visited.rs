//! Dense buffers and visited-slot tracking.
//!
//! All large buffers are reserved fallibly so that an oversized lattice surfaces
//! as [`Error::OutOfMemory`] instead of aborting the process.

use crate::error::{Error, Result};

/// Allocate a buffer of `len` copies of `fill`.
pub(crate) fn dense_buffer<T: Clone>(len: u64, fill: T) -> Result<Vec<T>> {
    let out_of_memory = || Error::OutOfMemory { requested: len };

    let len = usize::try_from(len).map_err(|_| out_of_memory())?;
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(len).map_err(|_| out_of_memory())?;
    buffer.resize(len, fill);
    Ok(buffer)
}

/// A set of slots in `[0, len)` that can be emptied in O(1).
///
/// Each slot holds the epoch in which it was last inserted; clearing the set
/// starts a new epoch.
#[derive(Debug)]
pub struct VisitedSet {
    stamps: Vec<u32>,
    epoch: u32,
}

impl VisitedSet {
    /// Allocate an empty set over `len` slots.
    pub fn with_len(len: u64) -> Result<Self> {
        Ok(Self {
            stamps: dense_buffer(len, 0)?,
            epoch: 1,
        })
    }

    /// Remove every slot from the set.
    pub fn clear(&mut self) {
        if self.epoch == u32::MAX {
            self.stamps.fill(0);
            self.epoch = 1;
        } else {
            self.epoch += 1;
        }
    }

    /// Mark `slot` as visited. Returns `false` if it already was.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is not below the length given to
    /// [`with_len`](Self::with_len).
    #[inline]
    pub fn insert(&mut self, slot: usize) -> bool {
        let stamp = &mut self.stamps[slot];
        if *stamp == self.epoch {
            false
        } else {
            *stamp = self.epoch;
            true
        }
    }
}
