//! bipbuf - Lock-Free SPSC Bipartite Buffer
//!
//! A fixed-capacity single-producer single-consumer queue over
//! caller-supplied storage, where both sides always work with *contiguous*
//! spans. Instead of handing out two fragments around the wrap point the
//! way a plain ring buffer does, the producer leaves a watermark at the
//! high end and restarts at offset zero; the consumer drains up to the
//! watermark and then jumps back. That contiguity guarantee is what makes
//! zero-copy handoff to vectored I/O, parsers, and DMA descriptors work.
//!
//! # Key properties
//!
//! - Wait-free reserve/commit and peek/consume with three atomic indices
//! - Always-contiguous writable and readable slices (zero-copy both ways)
//! - External storage: any `&mut [T]`, no allocation, usable capacity
//!   `len - 1`
//! - Tokens borrow their handle, so a second outstanding reservation or
//!   peek is a compile error
//! - `unsync` feature swaps the atomics for plain cells on single-threaded
//!   builds; `checked` keeps the contract checks in release builds
//!
//! # Example
//!
//! ```
//! use bipbuf::BipBuffer;
//!
//! let mut storage = [0u8; 64];
//! let mut buf = BipBuffer::new(&mut storage);
//! let (mut producer, mut consumer) = buf.split();
//!
//! // Zero-copy write: reserve, fill, commit the filled prefix.
//! let mut grant = producer.reserve_largest(16);
//! grant.as_mut_slice()[..5].copy_from_slice(b"hello");
//! grant.commit(5);
//!
//! // Zero-copy read: peek, process, consume what was processed.
//! let view = consumer.peek();
//! assert_eq!(view.as_slice(), b"hello");
//! view.consume(5);
//! ```
//!
//! Handles may live on two threads:
//!
//! ```
//! use bipbuf::BipBuffer;
//!
//! let mut storage = [0u8; 1024];
//! let mut buf = BipBuffer::new(&mut storage);
//! let (mut producer, mut consumer) = buf.split();
//!
//! std::thread::scope(|scope| {
//!     scope.spawn(move || {
//!         producer.push_slice(b"ping");
//!     });
//!     scope.spawn(move || {
//!         let mut out = [0u8; 4];
//!         let mut got = 0;
//!         while got < 4 {
//!             got += consumer.pop_slice(&mut out[got..]);
//!         }
//!         assert_eq!(&out, b"ping");
//!     });
//! });
//! ```

mod backoff;
mod buffer;
mod consumer;
mod index;
mod invariants;
mod producer;

pub use backoff::Backoff;
pub use buffer::BipBuffer;
pub use consumer::{ConsumeError, Consumer, PeekView};
pub use producer::{CommitError, Producer, Reservation};
