use crate::index::Index;
use crate::invariants::{
    check_commit_within_reservation, check_consume_within_view, check_index_in_bounds,
    check_watermark_in_bounds, check_wrapped_watermark,
};
use crate::{Consumer, Producer};
use std::marker::PhantomData;

// # Memory ordering
//
// Three indices coordinate the two sides:
//
// - `head`: next write position, in `[0, capacity)`. Written only by the
//   producer. The producer reads it relaxed; the consumer reads it with
//   Acquire against the producer's Release store, which is what makes the
//   committed elements visible.
// - `tail`: next read position, in `[0, capacity)`. Written only by the
//   consumer. The consumer reads it relaxed; the producer reads it with
//   Acquire against the consumer's Release store, which is what makes the
//   freed slots safe to overwrite.
// - `mark`: the watermark, in `[0, capacity]`. Written only by the producer,
//   always immediately before a Release store of `head`. The consumer reads
//   it relaxed, and only after observing `head < tail` through its Acquire
//   load of `head`. While that observation holds the producer cannot store
//   `mark` with a new value (re-arming the watermark requires the state to
//   re-linearize first, which requires a `tail` advance the producer has yet
//   to acquire), so the relaxed read is stable.
//
// No fences beyond the two Release/Acquire pairs are needed.

/// Plan for a pending write: a contiguous span plus the watermark update the
/// commit must apply.
pub(crate) struct WriteSpan {
    pub(crate) start: usize,
    pub(crate) len: usize,
    mark_base: usize,
    mark_shift: bool,
}

/// Plan for a pending read: the contiguous committed span and whether fully
/// draining it must jump `tail` back to zero.
pub(crate) struct ReadSpan {
    pub(crate) start: usize,
    pub(crate) len: usize,
    wrap: bool,
}

/// The producer-written indices. Commit stores `mark` and `head` back to
/// back, so they belong on one line; the 128-byte alignment keeps that line
/// (and its prefetched neighbour) clear of anything the consumer writes.
#[repr(align(128))]
struct WriteIndices {
    /// Next write position; published by the producer on commit.
    head: Index,
    /// Exclusive end of the high committed region while the buffer is
    /// wrapped; meaningless otherwise.
    mark: Index,
}

/// The consumer-written index, alone on its own 128-byte-aligned line so
/// consume stores never contend with the producer's commit stores.
#[repr(align(128))]
struct ReadIndices {
    /// Next read position; published by the consumer on consume.
    tail: Index,
}

#[repr(C)]
pub(crate) struct Core<T> {
    write: WriteIndices,
    read: ReadIndices,
    storage: *mut T,
    capacity: usize,
}

// Safety: the protocol hands each side disjoint ranges of `storage`, and the
// index stores above carry the element writes across threads. `T: Send` is
// all that element transfer requires.
unsafe impl<T: Send> Send for Core<T> {}
#[cfg(not(feature = "unsync"))]
unsafe impl<T: Send> Sync for Core<T> {}

impl<T> Core<T> {
    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub(crate) fn storage(&self) -> *mut T {
        self.storage
    }

    /// Number of committed, unconsumed elements.
    ///
    /// Exact from the consumer side and at quiescence; a lower bound while
    /// the producer is concurrently committing.
    pub(crate) fn committed(&self) -> usize {
        let tail = self.read.tail.load_relaxed();
        let head = self.write.head.load_acquire();
        if head >= tail {
            head - tail
        } else {
            let mark = self.write.mark.load_relaxed();
            mark.saturating_sub(tail) + head
        }
    }

    /// Compute the largest contiguous writable span of at most `requested`
    /// elements, plus the watermark bookkeeping its commit will need.
    ///
    /// One slot always stays unused so that a full buffer remains
    /// distinguishable from an empty one; it is taken from the end gap while
    /// `tail == 0` and from the front gap otherwise.
    pub(crate) fn plan_write(&self, requested: usize) -> WriteSpan {
        let head = self.write.head.load_relaxed();
        let tail = self.read.tail.load_acquire();

        if head >= tail {
            // Linear: committed data is [tail, head). Two candidate regions:
            // the end gap [head, capacity) and the front gap [0, tail - 1).
            let end_gap = if tail > 0 {
                self.capacity - head
            } else {
                self.capacity - 1 - head
            };
            let front_gap = tail.saturating_sub(1);

            // When the request fits neither region whole, this deliberately
            // hands out the larger region instead of wrapping whenever the
            // end gap falls short. Wrapping unconditionally would yield
            // min(requested, tail - 1) even when the end gap is bigger, and
            // nothing at all on a fresh buffer where tail is still 0, while
            // the contract here is the largest contiguous span available.
            // Ties favor the end gap, which fences off no slack. An exact
            // reservation is unaffected: if the request fits the front gap
            // but not the end gap, the front gap is necessarily the larger
            // region and the wrap is taken.
            if end_gap >= requested {
                WriteSpan {
                    start: head,
                    len: requested,
                    mark_base: head,
                    mark_shift: true,
                }
            } else if front_gap > end_gap {
                // Wrap: freeze the watermark at `head` and start over at
                // zero. The end gap is fenced off until the consumer drains
                // past the mark.
                WriteSpan {
                    start: 0,
                    len: requested.min(front_gap),
                    mark_base: head,
                    mark_shift: false,
                }
            } else {
                // The end gap is the best on offer; hand it out short.
                WriteSpan {
                    start: head,
                    len: end_gap,
                    mark_base: head,
                    mark_shift: true,
                }
            }
        } else {
            // Wrapped: only [head, tail - 1) is writable, and the watermark
            // must stay frozen until the high region drains.
            WriteSpan {
                start: head,
                len: requested.min(tail - head - 1),
                mark_base: self.write.mark.load_relaxed(),
                mark_shift: false,
            }
        }
    }

    /// Publish the first `count` elements of a planned write.
    pub(crate) fn commit_write(&self, span: &WriteSpan, count: usize) {
        check_commit_within_reservation!(count, span.len);
        if count == 0 {
            return;
        }

        let mut next_head = span.start + count;
        if next_head == self.capacity {
            next_head = 0;
        }
        let next_mark = if span.mark_shift {
            span.mark_base + count
        } else {
            span.mark_base
        };
        check_index_in_bounds!("head", next_head, self.capacity);
        check_watermark_in_bounds!(next_mark, self.capacity);

        // The watermark goes first: the consumer reads it unordered after its
        // Acquire load of `head`, so it must already hold the value this
        // `head` implies.
        self.write.mark.store_relaxed(next_mark);
        self.write.head.store_release(next_head);
    }

    /// Compute the contiguous committed span currently readable.
    pub(crate) fn plan_read(&self) -> ReadSpan {
        let tail = self.read.tail.load_relaxed();
        let head = self.write.head.load_acquire();

        if head >= tail {
            ReadSpan {
                start: tail,
                len: head - tail,
                wrap: false,
            }
        } else {
            // Wrapped; `mark` is stable while this side observes head < tail.
            let mark = self.write.mark.load_relaxed();
            check_wrapped_watermark!(head, tail, mark);
            check_watermark_in_bounds!(mark, self.capacity);
            if tail == mark {
                // The high region is empty; the readable data sits at the
                // bottom and `tail` is logically already zero.
                ReadSpan {
                    start: 0,
                    len: head,
                    wrap: false,
                }
            } else {
                ReadSpan {
                    start: tail,
                    len: mark - tail,
                    wrap: true,
                }
            }
        }
    }

    /// Release the first `count` elements of a planned read.
    pub(crate) fn commit_read(&self, span: &ReadSpan, count: usize) {
        check_consume_within_view!(count, span.len);
        if count == 0 {
            return;
        }

        let next_tail = if span.wrap && count == span.len {
            // The high region is fully drained; jump past the slack the
            // watermark fenced off.
            0
        } else {
            span.start + count
        };
        check_index_in_bounds!("tail", next_tail, self.capacity);

        self.read.tail.store_release(next_tail);
    }
}

/// SPSC bipartite buffer over caller-supplied storage.
///
/// A bip buffer is a circular byte (or element) queue that always hands out
/// *contiguous* spans: the producer reserves one writable slice, the consumer
/// peeks one readable slice, and neither ever straddles the physical end of
/// the array. When a write would straddle it, the producer instead leaves a
/// watermark at the high end and wraps to offset zero; the consumer drains
/// the high region first and then jumps past the fenced-off slack.
///
/// One slot is sacrificed to distinguish full from empty, so usable capacity
/// is `storage.len() - 1`.
///
/// The buffer itself only carries the index state; [`split`](Self::split)
/// yields the [`Producer`] and [`Consumer`] handles that perform the actual
/// I/O, and those may be moved to two different threads.
///
/// ```
/// use bipbuf::BipBuffer;
///
/// let mut storage = [0u8; 17];
/// let mut buf = BipBuffer::new(&mut storage);
/// let (mut producer, mut consumer) = buf.split();
///
/// let mut grant = producer.reserve_largest(5);
/// grant.as_mut_slice().copy_from_slice(b"hello");
/// grant.commit(5);
///
/// let view = consumer.peek();
/// assert_eq!(view.as_slice(), b"hello");
/// view.consume(5);
/// ```
pub struct BipBuffer<'a, T> {
    core: Core<T>,
    _storage: PhantomData<&'a mut [T]>,
}

impl<'a, T> BipBuffer<'a, T> {
    /// Create a buffer over `storage`.
    ///
    /// # Panics
    ///
    /// Panics if `storage` is empty.
    pub fn new(storage: &'a mut [T]) -> Self {
        assert!(
            !storage.is_empty(),
            "bip buffer requires a non-empty backing slice"
        );
        Self {
            core: Core {
                write: WriteIndices {
                    head: Index::new(0),
                    mark: Index::new(0),
                },
                read: ReadIndices {
                    tail: Index::new(0),
                },
                storage: storage.as_mut_ptr(),
                capacity: storage.len(),
            },
            _storage: PhantomData,
        }
    }

    /// Length of the backing array, sentinel slot included.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.core.capacity()
    }

    /// Number of committed, unconsumed elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.core.committed()
    }

    /// Returns true if no committed data is pending.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bind the producer and consumer roles.
    ///
    /// The exclusive borrow guarantees at most one of each at a time; once
    /// both handles are dropped the buffer can be split again or
    /// [`reset`](Self::reset).
    pub fn split(&mut self) -> (Producer<'_, T>, Consumer<'_, T>) {
        (Producer::new(&self.core), Consumer::new(&self.core))
    }

    /// Return the buffer to its freshly constructed state.
    ///
    /// Requires exclusive access, so no reservation, peek, or handle can be
    /// outstanding. Previously committed elements stay in the storage but are
    /// no longer reachable through the buffer.
    pub fn reset(&mut self) {
        self.core.write.head.store_relaxed(0);
        self.core.write.mark.store_relaxed(0);
        self.core.read.tail.store_relaxed(0);
    }

    #[cfg(test)]
    pub(crate) fn indices(&self) -> (usize, usize, usize) {
        (
            self.core.write.head.load_relaxed(),
            self.core.read.tail.load_relaxed(),
            self.core.write.mark.load_relaxed(),
        )
    }
}
