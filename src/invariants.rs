//! Contract-check macros for the index protocol.
//!
//! A failed check means the one-producer/one-consumer discipline itself is
//! broken, so the checks abort rather than return an error. They are active
//! under `debug_assertions` or the `checked` feature and compile to nothing
//! otherwise.

/// Assert that a write or read position stays inside the backing array.
macro_rules! check_index_in_bounds {
    ($name:literal, $index:expr, $capacity:expr) => {
        if cfg!(any(debug_assertions, feature = "checked")) {
            assert!(
                $index < $capacity,
                "{} index {} out of range for capacity {}",
                $name,
                $index,
                $capacity
            );
        }
    };
}

/// Assert that the watermark stays within `[0, capacity]`.
///
/// Unlike `head` and `tail`, the watermark may legally equal the capacity:
/// a commit that fills the array exactly to its physical end freezes it
/// there.
macro_rules! check_watermark_in_bounds {
    ($mark:expr, $capacity:expr) => {
        if cfg!(any(debug_assertions, feature = "checked")) {
            assert!(
                $mark <= $capacity,
                "watermark {} out of range for capacity {}",
                $mark,
                $capacity
            );
        }
    };
}

/// Assert the wrapped-configuration ordering `head ≤ mark` and `tail ≤ mark`.
macro_rules! check_wrapped_watermark {
    ($head:expr, $tail:expr, $mark:expr) => {
        if cfg!(any(debug_assertions, feature = "checked")) {
            assert!(
                $head <= $mark && $tail <= $mark,
                "watermark {} behind head {} or tail {} in wrapped state",
                $mark,
                $head,
                $tail
            );
        }
    };
}

/// Assert that a commit does not exceed its reservation.
macro_rules! check_commit_within_reservation {
    ($count:expr, $reserved:expr) => {
        if cfg!(any(debug_assertions, feature = "checked")) {
            assert!(
                $count <= $reserved,
                "commit of {} elements exceeds reservation of {}",
                $count,
                $reserved
            );
        }
    };
}

/// Assert that a consume does not exceed its peeked view.
macro_rules! check_consume_within_view {
    ($count:expr, $available:expr) => {
        if cfg!(any(debug_assertions, feature = "checked")) {
            assert!(
                $count <= $available,
                "consume of {} elements exceeds view of {}",
                $count,
                $available
            );
        }
    };
}

pub(crate) use check_commit_within_reservation;
pub(crate) use check_consume_within_view;
pub(crate) use check_index_in_bounds;
pub(crate) use check_watermark_in_bounds;
pub(crate) use check_wrapped_watermark;
