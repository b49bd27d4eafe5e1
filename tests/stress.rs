//! Two-thread stress: one producer, one consumer, randomized chunk sizes
//! and partial commits, with every byte carrying its logical position
//! modulo 256 so the consumer can verify ordering and integrity end to end.

#![cfg(not(feature = "unsync"))]

use bipbuf::{Backoff, BipBuffer};
use std::thread;

const TOTAL_BYTES: usize = 8 * 1024 * 1024;

#[inline]
fn xorshift(state: &mut u64) -> u64 {
    *state ^= *state << 13;
    *state ^= *state >> 7;
    *state ^= *state << 17;
    *state
}

#[test]
fn spsc_byte_stream_integrity() {
    // Deliberately not a power of two; the protocol does not need one.
    let mut storage = vec![0u8; 4097];
    let mut buf = BipBuffer::new(&mut storage);
    let (mut producer, mut consumer) = buf.split();

    thread::scope(|scope| {
        scope.spawn(move || {
            let mut rng = 0x9e37_79b9_7f4a_7c15u64;
            let mut backoff = Backoff::new();
            let mut sent = 0usize;
            while sent < TOTAL_BYTES {
                let want = 1 + (xorshift(&mut rng) as usize % 777).min(TOTAL_BYTES - sent - 1);
                let mut grant = producer.reserve_largest(want);
                if grant.is_empty() {
                    drop(grant);
                    backoff.wait();
                    if backoff.is_exhausted() {
                        backoff.reset();
                    }
                    continue;
                }
                backoff.reset();

                // Commit a random prefix; committing less than reserved is
                // the common case in real producers.
                let reserved = grant.len();
                let fill = 1 + xorshift(&mut rng) as usize % reserved;
                for (i, slot) in grant.as_mut_slice()[..fill].iter_mut().enumerate() {
                    *slot = ((sent + i) % 256) as u8;
                }
                grant.commit(fill);
                sent += fill;
            }
        });

        scope.spawn(move || {
            let mut rng = 0xdead_beef_cafe_f00du64;
            let mut backoff = Backoff::new();
            let mut seen = 0usize;
            while seen < TOTAL_BYTES {
                let view = consumer.peek();
                if view.is_empty() {
                    drop(view);
                    backoff.wait();
                    if backoff.is_exhausted() {
                        backoff.reset();
                    }
                    continue;
                }
                backoff.reset();

                let take = 1 + xorshift(&mut rng) as usize % view.len();
                for (i, &byte) in view.as_slice()[..take].iter().enumerate() {
                    let expected = ((seen + i) % 256) as u8;
                    assert_eq!(
                        byte,
                        expected,
                        "byte {} corrupted: got {byte}, expected {expected}",
                        seen + i
                    );
                }
                view.consume(take);
                seen += take;
            }
        });
    });
}

#[test]
fn spsc_alternating_full_cycles() {
    // Fill-to-capacity / drain-to-empty handoff between two threads; each
    // side confirms the other's totals at the end.
    let mut storage = vec![0u8; 257];
    let mut buf = BipBuffer::new(&mut storage);
    let (mut producer, mut consumer) = buf.split();

    const ROUNDS: usize = 10_000;

    thread::scope(|scope| {
        scope.spawn(move || {
            let mut backoff = Backoff::new();
            let mut logical = 0usize;
            for _ in 0..ROUNDS {
                let mut remaining = 256;
                while remaining > 0 {
                    let mut grant = producer.reserve_largest(remaining);
                    let n = grant.len();
                    if n == 0 {
                        drop(grant);
                        backoff.wait();
                        if backoff.is_exhausted() {
                            backoff.reset();
                        }
                        continue;
                    }
                    backoff.reset();
                    for slot in grant.as_mut_slice().iter_mut() {
                        *slot = (logical % 256) as u8;
                        logical += 1;
                    }
                    grant.commit(n);
                    remaining -= n;
                }
            }
        });

        scope.spawn(move || {
            let mut backoff = Backoff::new();
            let mut logical = 0usize;
            while logical < ROUNDS * 256 {
                let view = consumer.peek();
                if view.is_empty() {
                    drop(view);
                    backoff.wait();
                    if backoff.is_exhausted() {
                        backoff.reset();
                    }
                    continue;
                }
                backoff.reset();
                for &byte in view.as_slice() {
                    assert_eq!(byte, (logical % 256) as u8);
                    logical += 1;
                }
                view.consume_all();
            }
        });
    });
}
