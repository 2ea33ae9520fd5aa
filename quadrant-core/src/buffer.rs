//! Double draw-buffer ownership tracking
//!
//! The engine renders partial frames into one of two fixed buffers
//! while the other may still be on its way to the panel. The pool
//! models this as an arena of two slots with an explicit owner per
//! slot: the engine owns a slot while filling it, the flush path owns
//! it from submission until release. Misuse surfaces as a [`PoolError`]
//! instead of aliased pixel data.
//!
//! Allocation happens once at bring-up; nothing here allocates.

/// Which of the two draw buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotIndex {
    A,
    B,
}

impl SlotIndex {
    /// The other slot
    pub const fn other(self) -> Self {
        match self {
            SlotIndex::A => SlotIndex::B,
            SlotIndex::B => SlotIndex::A,
        }
    }

    const fn idx(self) -> usize {
        match self {
            SlotIndex::A => 0,
            SlotIndex::B => 1,
        }
    }
}

/// Current owner of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotOwner {
    /// Engine may fill the slot
    Engine,
    /// Slot is submitted for flushing; engine must not touch it
    Flush,
}

/// Pool misuse errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PoolError {
    /// The two buffers differ in size or are empty
    BadBuffers,
    /// Slot is owned by the flush path
    SlotFlushing,
    /// Slot was not submitted for flushing
    NotSubmitted,
}

/// Fixed pair of partial draw buffers
pub struct DrawBufferPool<'b> {
    bufs: [&'b mut [u8]; 2],
    owners: [SlotOwner; 2],
}

impl<'b> DrawBufferPool<'b> {
    /// Wrap two equally sized, non-empty buffers
    pub fn new(a: &'b mut [u8], b: &'b mut [u8]) -> Result<Self, PoolError> {
        if a.is_empty() || a.len() != b.len() {
            return Err(PoolError::BadBuffers);
        }
        Ok(Self {
            bufs: [a, b],
            owners: [SlotOwner::Engine, SlotOwner::Engine],
        })
    }

    /// Size of each slot in bytes
    pub fn slot_len(&self) -> usize {
        self.bufs[0].len()
    }

    /// Current owner of a slot
    pub fn owner(&self, slot: SlotIndex) -> SlotOwner {
        self.owners[slot.idx()]
    }

    /// Hand the slot to the engine for filling
    ///
    /// Fails while a flush on the same slot is outstanding.
    pub fn grant_fill(&mut self, slot: SlotIndex) -> Result<&mut [u8], PoolError> {
        match self.owners[slot.idx()] {
            SlotOwner::Engine => Ok(&mut self.bufs[slot.idx()][..]),
            SlotOwner::Flush => Err(PoolError::SlotFlushing),
        }
    }

    /// Mark the slot as submitted for flushing
    pub fn submit(&mut self, slot: SlotIndex) -> Result<(), PoolError> {
        match self.owners[slot.idx()] {
            SlotOwner::Engine => {
                self.owners[slot.idx()] = SlotOwner::Flush;
                Ok(())
            }
            SlotOwner::Flush => Err(PoolError::SlotFlushing),
        }
    }

    /// Read access for the flush path
    pub fn flushable(&self, slot: SlotIndex) -> Result<&[u8], PoolError> {
        match self.owners[slot.idx()] {
            SlotOwner::Flush => Ok(&self.bufs[slot.idx()][..]),
            SlotOwner::Engine => Err(PoolError::NotSubmitted),
        }
    }

    /// Return the slot to the engine after the flush completion signal
    pub fn release(&mut self, slot: SlotIndex) -> Result<(), PoolError> {
        match self.owners[slot.idx()] {
            SlotOwner::Flush => {
                self.owners[slot.idx()] = SlotOwner::Engine;
                Ok(())
            }
            SlotOwner::Engine => Err(PoolError::NotSubmitted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_mismatched_buffers() {
        let mut a = [0u8; 8];
        let mut b = [0u8; 4];
        assert!(matches!(
            DrawBufferPool::new(&mut a, &mut b),
            Err(PoolError::BadBuffers)
        ));

        let mut e1: [u8; 0] = [];
        let mut e2: [u8; 0] = [];
        assert!(matches!(
            DrawBufferPool::new(&mut e1, &mut e2),
            Err(PoolError::BadBuffers)
        ));
    }

    #[test]
    fn test_fill_submit_release_cycle() {
        let mut a = [0u8; 8];
        let mut b = [0u8; 8];
        let mut pool = DrawBufferPool::new(&mut a, &mut b).unwrap();

        let buf = pool.grant_fill(SlotIndex::A).unwrap();
        buf.fill(0xAA);
        pool.submit(SlotIndex::A).unwrap();
        assert_eq!(pool.flushable(SlotIndex::A).unwrap(), &[0xAA; 8]);
        pool.release(SlotIndex::A).unwrap();
        assert_eq!(pool.owner(SlotIndex::A), SlotOwner::Engine);
    }

    #[test]
    fn test_no_fill_while_flushing() {
        let mut a = [0u8; 8];
        let mut b = [0u8; 8];
        let mut pool = DrawBufferPool::new(&mut a, &mut b).unwrap();

        pool.submit(SlotIndex::A).unwrap();
        assert!(matches!(
            pool.grant_fill(SlotIndex::A),
            Err(PoolError::SlotFlushing)
        ));

        // The other slot remains fillable (double buffering)
        assert!(pool.grant_fill(SlotIndex::B).is_ok());
    }

    #[test]
    fn test_release_requires_submit() {
        let mut a = [0u8; 8];
        let mut b = [0u8; 8];
        let mut pool = DrawBufferPool::new(&mut a, &mut b).unwrap();
        assert!(matches!(
            pool.release(SlotIndex::B),
            Err(PoolError::NotSubmitted)
        ));
        assert!(matches!(
            pool.flushable(SlotIndex::B),
            Err(PoolError::NotSubmitted)
        ));
    }

    #[test]
    fn test_other_slot() {
        assert_eq!(SlotIndex::A.other(), SlotIndex::B);
        assert_eq!(SlotIndex::B.other(), SlotIndex::A);
    }
}
