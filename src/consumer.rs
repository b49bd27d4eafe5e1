use crate::buffer::{Core, ReadSpan};
use std::slice;
use thiserror::Error;

/// Error returned by [`PeekView::try_consume`] when the count exceeds the
/// peeked view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot consume {attempted} elements, only {available} peeked")]
pub struct ConsumeError {
    /// Number of elements the caller attempted to consume.
    pub attempted: usize,
    /// Number of elements in the view.
    pub available: usize,
}

/// The consumer half of a [`BipBuffer`](crate::BipBuffer).
///
/// Obtained from [`BipBuffer::split`](crate::BipBuffer::split). May be moved
/// to another thread. All reading goes through a [`PeekView`]: peek the
/// committed contiguous span, process some prefix of it, consume that prefix.
pub struct Consumer<'b, T> {
    core: &'b Core<T>,
}

impl<'b, T> Consumer<'b, T> {
    pub(crate) fn new(core: &'b Core<T>) -> Self {
        Self { core }
    }

    /// Length of the backing array, sentinel slot included.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.core.capacity()
    }

    /// Number of committed, unconsumed elements. Concurrent commits can only
    /// make this grow, so it is a reliable lower bound.
    #[inline]
    pub fn len(&self) -> usize {
        self.core.committed()
    }

    /// Returns true if no committed data is currently readable.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot the contiguous committed span currently readable.
    ///
    /// The view may be empty. Repeated peeks without an intervening consume
    /// return the same data, except that a concurrent commit can lengthen
    /// it. The view mutably borrows this consumer, so at most one is
    /// outstanding; dropping it without consuming reads nothing.
    pub fn peek(&mut self) -> PeekView<'_, T> {
        let span = self.core.plan_read();
        PeekView {
            core: self.core,
            span,
        }
    }

    /// Copy up to `out.len()` elements out of the buffer and consume them.
    /// Returns the number copied, possibly zero.
    ///
    /// Only one contiguous span is drained per call; directly after a wrap a
    /// second call may be needed to reach the data at the bottom of the
    /// array.
    pub fn pop_slice(&mut self, out: &mut [T]) -> usize
    where
        T: Copy,
    {
        let view = self.peek();
        let n = view.len().min(out.len());
        out[..n].copy_from_slice(&view.as_slice()[..n]);
        view.consume(n);
        n
    }
}

/// A snapshot of the readable span, held between peek and consume.
///
/// Consuming releases a prefix of the view back to the producer; when the
/// view covers the tail end of a wrapped buffer and is consumed in full, the
/// read position jumps past the watermark back to the bottom of the array.
pub struct PeekView<'c, T> {
    core: &'c Core<T>,
    span: ReadSpan,
}

impl<T> PeekView<'_, T> {
    /// The readable span.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // Safety: the plan granted [start, start + len) to this view; the
        // producer cannot reserve into committed data, and the mutable
        // borrow of the consumer excludes a second view.
        unsafe { slice::from_raw_parts(self.core.storage().add(self.span.start), self.span.len) }
    }

    /// Number of readable elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.span.len
    }

    /// Returns true if nothing is readable.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.span.len == 0
    }

    /// Release the first `count` elements of the view back to the producer.
    ///
    /// `count == 0` retires the view without touching the indices. `count`
    /// beyond the view length is a contract violation and aborts in checked
    /// builds.
    pub fn consume(self, count: usize) {
        self.core.commit_read(&self.span, count);
    }

    /// Release the whole view. Returns the number of elements released.
    pub fn consume_all(self) -> usize {
        let n = self.span.len;
        self.core.commit_read(&self.span, n);
        n
    }

    /// Like [`consume`](Self::consume), but returns an error instead of
    /// aborting when `count` exceeds the view.
    pub fn try_consume(self, count: usize) -> Result<(), ConsumeError> {
        if count > self.span.len {
            return Err(ConsumeError {
                attempted: count,
                available: self.span.len,
            });
        }
        self.core.commit_read(&self.span, count);
        Ok(())
    }
}
