//! Frame pacing for animation loops
//!
//! The driver sends a frame as soon as [`present`](crate::DisplayDriver::present)
//! is called. Animations that want a steady rate measure how long a frame took
//! to render and send, then let a [`FramePacer`] sleep away the rest of the
//! frame budget.
//!
//! ```
//! use spi_led_matrix::FramePacer;
//!
//! let pacer = FramePacer::new(50);
//! assert_eq!(pacer.frame_us(), 20_000);
//! assert_eq!(pacer.remaining_us(15_000), 5_000);
//! assert_eq!(pacer.remaining_us(25_000), 0);
//! ```

use embedded_hal::delay::DelayNs;
use log::trace;

const MICROS_PER_SECOND: u32 = 1_000_000;

/// Fixed frame-rate pacer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FramePacer {
    frame_us: u32,
}

impl FramePacer {
    /// Pacer for `target_fps` frames per second
    ///
    /// A rate of 0 disables pacing.
    pub const fn new(target_fps: u32) -> Self {
        let frame_us = if target_fps == 0 {
            0
        } else {
            MICROS_PER_SECOND / target_fps
        };
        Self { frame_us }
    }

    /// Frame budget in microseconds
    pub const fn frame_us(&self) -> u32 {
        self.frame_us
    }

    /// Microseconds left in the frame after `elapsed_us` of work
    pub const fn remaining_us(&self, elapsed_us: u32) -> u32 {
        self.frame_us.saturating_sub(elapsed_us)
    }

    /// Sleep out the rest of the frame
    ///
    /// Returns immediately when the frame already overran its budget.
    pub fn wait<D: DelayNs>(&self, delay: &mut D, elapsed_us: u32) {
        let remaining = self.remaining_us(elapsed_us);
        if remaining == 0 {
            if self.frame_us > 0 {
                trace!(
                    "frame overran budget: {} us of {} us",
                    elapsed_us, self.frame_us
                );
            }
            return;
        }
        delay.delay_us(remaining);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RecordingDelay {
        slept_us: u32,
    }

    impl DelayNs for RecordingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.slept_us += ns / 1_000;
        }

        fn delay_us(&mut self, us: u32) {
            self.slept_us += us;
        }
    }

    #[test]
    fn test_frame_budget() {
        assert_eq!(FramePacer::new(1).frame_us(), 1_000_000);
        assert_eq!(FramePacer::new(60).frame_us(), 16_666);
        assert_eq!(FramePacer::new(0).frame_us(), 0);
    }

    #[test]
    fn test_wait_sleeps_the_remainder() {
        let pacer = FramePacer::new(50);
        let mut delay = RecordingDelay { slept_us: 0 };
        pacer.wait(&mut delay, 4_000);
        assert_eq!(delay.slept_us, 16_000);
    }

    #[test]
    fn test_wait_skips_when_overrun() {
        let pacer = FramePacer::new(50);
        let mut delay = RecordingDelay { slept_us: 0 };
        pacer.wait(&mut delay, 30_000);
        assert_eq!(delay.slept_us, 0);

        FramePacer::new(0).wait(&mut delay, 0);
        assert_eq!(delay.slept_us, 0);
    }
}
