//! Index cells with a compile-time switch between atomic and plain storage.
//!
//! The default build uses `AtomicUsize` with the exact orderings the
//! producer/consumer protocol needs. The `unsync` feature swaps in a
//! `Cell<usize>` so every load and store degrades to an ordinary memory
//! access; the buffer then stops being `Sync`, which is what makes the
//! substitution sound.

#[cfg(not(feature = "unsync"))]
mod imp {
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(crate) struct Index(AtomicUsize);

    impl Index {
        pub(crate) const fn new(value: usize) -> Self {
            Self(AtomicUsize::new(value))
        }

        /// Load with no ordering; legal only for the index the caller owns.
        #[inline]
        pub(crate) fn load_relaxed(&self) -> usize {
            self.0.load(Ordering::Relaxed)
        }

        /// Load the opposite side's published index.
        #[inline]
        pub(crate) fn load_acquire(&self) -> usize {
            self.0.load(Ordering::Acquire)
        }

        /// Store with no ordering; the following release store carries it.
        #[inline]
        pub(crate) fn store_relaxed(&self, value: usize) {
            self.0.store(value, Ordering::Relaxed);
        }

        /// Publish an index to the opposite side.
        #[inline]
        pub(crate) fn store_release(&self, value: usize) {
            self.0.store(value, Ordering::Release);
        }
    }
}

#[cfg(feature = "unsync")]
mod imp {
    use std::cell::Cell;

    pub(crate) struct Index(Cell<usize>);

    impl Index {
        pub(crate) const fn new(value: usize) -> Self {
            Self(Cell::new(value))
        }

        #[inline]
        pub(crate) fn load_relaxed(&self) -> usize {
            self.0.get()
        }

        #[inline]
        pub(crate) fn load_acquire(&self) -> usize {
            self.0.get()
        }

        #[inline]
        pub(crate) fn store_relaxed(&self, value: usize) {
            self.0.set(value);
        }

        #[inline]
        pub(crate) fn store_release(&self, value: usize) {
            self.0.set(value);
        }
    }
}

pub(crate) use imp::Index;
