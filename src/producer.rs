use crate::buffer::{Core, WriteSpan};
use std::slice;
use thiserror::Error;

/// Error returned by [`Reservation::try_commit`] when the count exceeds the
/// reserved span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot commit {attempted} elements, only {reserved} reserved")]
pub struct CommitError {
    /// Number of elements the caller attempted to commit.
    pub attempted: usize,
    /// Number of elements actually reserved.
    pub reserved: usize,
}

/// The producer half of a [`BipBuffer`](crate::BipBuffer).
///
/// Obtained from [`BipBuffer::split`](crate::BipBuffer::split). May be moved
/// to another thread. All writing goes through a [`Reservation`]: reserve a
/// contiguous span, fill it, commit the filled prefix.
pub struct Producer<'b, T> {
    core: &'b Core<T>,
}

impl<'b, T> Producer<'b, T> {
    pub(crate) fn new(core: &'b Core<T>) -> Self {
        Self { core }
    }

    /// Length of the backing array, sentinel slot included.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.core.capacity()
    }

    /// Reserve the largest contiguous writable span of at most `requested`
    /// elements.
    ///
    /// Never fails: when space is short the reservation is shorter than
    /// `requested`, down to zero length. Check [`Reservation::len`] before
    /// filling. The reservation mutably borrows this producer, so a second
    /// one cannot be taken until the first is committed or dropped; dropping
    /// it uncommitted leaves the buffer untouched.
    pub fn reserve_largest(&mut self, requested: usize) -> Reservation<'_, T> {
        let span = self.core.plan_write(requested);
        Reservation {
            core: self.core,
            span,
        }
    }

    /// Reserve a contiguous span of exactly `requested` elements, or `None`
    /// if that much contiguous space is not available right now.
    ///
    /// Failure has no observable effect; callers may retry after the
    /// consumer frees space.
    pub fn reserve_exact(&mut self, requested: usize) -> Option<Reservation<'_, T>> {
        let span = self.core.plan_write(requested);
        if span.len == requested {
            Some(Reservation {
                core: self.core,
                span,
            })
        } else {
            None
        }
    }

    /// Copy as much of `items` as fits contiguously and commit it in one
    /// call. Returns the number of elements written, possibly zero.
    pub fn push_slice(&mut self, items: &[T]) -> usize
    where
        T: Copy,
    {
        let mut reservation = self.reserve_largest(items.len());
        let n = reservation.len();
        reservation.as_mut_slice().copy_from_slice(&items[..n]);
        reservation.commit(n);
        n
    }
}

/// A pending write: exclusive access to a contiguous span of the backing
/// array until committed or dropped.
///
/// The span may be shorter than requested (see
/// [`Producer::reserve_largest`]). Nothing becomes visible to the consumer
/// until [`commit`](Self::commit); committing a prefix is legal and common,
/// and dropping the reservation without committing abandons it without
/// side effects.
pub struct Reservation<'p, T> {
    core: &'p Core<T>,
    span: WriteSpan,
}

impl<T> Reservation<'_, T> {
    /// The writable span.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // Safety: the plan granted [start, start + len) exclusively to this
        // reservation; the consumer cannot touch it until commit publishes
        // it, and the mutable borrow of the producer excludes a second
        // reservation.
        unsafe { slice::from_raw_parts_mut(self.core.storage().add(self.span.start), self.span.len) }
    }

    /// Number of reserved elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.span.len
    }

    /// Returns true if nothing was reserved.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.span.len == 0
    }

    /// Publish the first `count` reserved elements to the consumer.
    ///
    /// `count == 0` retires the reservation without touching the indices.
    /// `count` beyond the reserved length is a contract violation and aborts
    /// in checked builds.
    pub fn commit(self, count: usize) {
        self.core.commit_write(&self.span, count);
    }

    /// Like [`commit`](Self::commit), but returns an error instead of
    /// aborting when `count` exceeds the reservation.
    pub fn try_commit(self, count: usize) -> Result<(), CommitError> {
        if count > self.span.len {
            return Err(CommitError {
                attempted: count,
                reserved: self.span.len,
            });
        }
        self.core.commit_write(&self.span, count);
        Ok(())
    }
}
