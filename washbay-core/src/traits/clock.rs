//! Time source
//!
//! Sequencers are driven purely by elapsed time. The host supplies the
//! timestamps; nothing in the core sleeps or waits.

/// Monotonic millisecond clock
///
/// The counter may wrap. Elapsed time is always computed with
/// [`elapsed_ms`], so a wrap in the middle of a stage is harmless as long
/// as no single stage lasts longer than [`MAX_ELAPSED_MS`].
pub trait MonotonicClock {
    /// Milliseconds since an arbitrary fixed origin
    fn now_ms(&self) -> u32;
}

/// Longest span [`elapsed_ms`] can measure (half the counter range)
pub const MAX_ELAPSED_MS: u32 = i32::MAX as u32;

/// Milliseconds between `since_ms` and `now_ms`, tolerating counter wrap
///
/// A `now_ms` that is behind `since_ms` is a stale reading and counts as
/// no time at all.
pub fn elapsed_ms(now_ms: u32, since_ms: u32) -> u32 {
    let elapsed = now_ms.wrapping_sub(since_ms);
    if elapsed > MAX_ELAPSED_MS {
        0
    } else {
        elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct ManualClock(Cell<u32>);

    impl MonotonicClock for ManualClock {
        fn now_ms(&self) -> u32 {
            self.0.get()
        }
    }

    #[test]
    fn test_elapsed_plain() {
        assert_eq!(elapsed_ms(1500, 500), 1000);
        assert_eq!(elapsed_ms(500, 500), 0);
    }

    #[test]
    fn test_elapsed_across_wrap() {
        let start = u32::MAX - 99;
        assert_eq!(elapsed_ms(100, start), 200);
    }

    #[test]
    fn test_elapsed_stale_reading() {
        assert_eq!(elapsed_ms(100, 105), 0);
        assert_eq!(elapsed_ms(u32::MAX - 4, 3), 0);
        assert_eq!(elapsed_ms(MAX_ELAPSED_MS, 0), MAX_ELAPSED_MS);
    }

    #[test]
    fn test_clock_trait_object() {
        let clock = ManualClock(Cell::new(42));
        let dyn_clock: &dyn MonotonicClock = &clock;
        assert_eq!(dyn_clock.now_ms(), 42);
        clock.0.set(50);
        assert_eq!(elapsed_ms(dyn_clock.now_ms(), 42), 8);
    }
}
