//! Cancellable timed primitives.
//!
//! A [`Painter`] bundles the sink, the timings and the token of one effect
//! execution. Every wait is sliced into sleeps of at most
//! [`Timings::poll_interval`] with a token check before each slice, and every
//! primitive writes "off" before reporting [`Canceled`].

use std::thread;

use embassy_time::{Duration, Instant};
use log::{trace, warn};

use crate::channel::{Channel, ChannelSink};
use crate::color::{OFF, Rgb, lerp_colors};
use crate::config::Timings;
use crate::token::{Canceled, CancellationToken, Step};

/// Repeat count meaning "until canceled"
pub const FOREVER: u32 = 0;

/// Rewrite period of [`Painter::hold_until_canceled`]
pub const HOLD_REFRESH: Duration = Duration::from_millis(250);

/// Drawing context handed to effect bodies
#[derive(Debug, Clone, Copy)]
pub struct Painter<'a> {
    sink: &'a ChannelSink,
    timings: &'a Timings,
    token: &'a CancellationToken,
}

impl<'a> Painter<'a> {
    pub const fn new(
        sink: &'a ChannelSink,
        timings: &'a Timings,
        token: &'a CancellationToken,
    ) -> Self {
        Self {
            sink,
            timings,
            token,
        }
    }

    pub const fn token(&self) -> &'a CancellationToken {
        self.token
    }

    pub const fn timings(&self) -> &'a Timings {
        self.timings
    }

    pub fn is_canceled(&self) -> bool {
        self.token.is_canceled()
    }

    /// Write "off" and return `Err(Canceled)` if the token was canceled
    pub fn check(&self) -> Step {
        if self.token.is_canceled() {
            self.off();
            return Err(Canceled);
        }
        Ok(())
    }

    /// Write a color, logging rather than propagating hardware failures
    pub fn show(&self, color: Rgb) {
        if let Err(err) = self.sink.set_color(color) {
            warn!("failed to show {:?}: {}", color, err);
        }
    }

    pub fn write_channel(&self, channel: Channel, value: u8) {
        if let Err(err) = self.sink.write(channel, i32::from(value)) {
            warn!("failed to set {} to {}: {}", channel, value, err);
        }
    }

    pub fn off(&self) {
        self.show(OFF);
    }

    /// Sleep for `duration`, observing the token at least every poll interval
    pub fn wait(&self, duration: Duration) -> Step {
        self.wait_until(Instant::now() + duration)
    }

    fn wait_until(&self, deadline: Instant) -> Step {
        loop {
            self.check()?;
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            let slice = deadline.duration_since(now).min(self.timings.poll_interval);
            thread::sleep(core::time::Duration::from_micros(slice.as_micros()));
        }
    }

    /// Show `color` for `duration`
    pub fn hold(&self, color: Rgb, duration: Duration) -> Step {
        self.check()?;
        self.show(color);
        self.wait(duration)
    }

    /// Show `color` until the token is canceled.
    ///
    /// The color is rewritten every [`HOLD_REFRESH`] so the light comes back
    /// after a mute.
    pub fn hold_until_canceled(&self, color: Rgb) -> Step {
        loop {
            self.hold(color, HOLD_REFRESH)?;
        }
    }

    /// Linear fade from `from` to `to` over `duration`.
    ///
    /// Steps are scheduled against the start time, so slow writes shorten
    /// the following wait instead of stretching the fade.
    pub fn fade(&self, from: Rgb, to: Rgb, duration: Duration) -> Step {
        let steps = self.timings.fade_steps(duration);
        trace!(
            "fade {:?} -> {:?} over {}ms in {} steps",
            from,
            to,
            duration.as_millis(),
            steps
        );

        let start = Instant::now();
        let total = duration.as_micros();
        for step in 0..=steps {
            self.check()?;
            self.show(lerp_colors(from, to, step, steps));
            if step < steps {
                let offset = total * u64::from(step + 1) / u64::from(steps);
                self.wait_until(start + Duration::from_micros(offset))?;
            }
        }
        Ok(())
    }

    /// Breathe `color` up from and back down to off.
    ///
    /// `cycles == FOREVER` repeats until canceled.
    pub fn pulse(&self, color: Rgb, cycles: u32, cycle: Duration) -> Step {
        trace!(
            "pulse {:?} x{} every {}ms",
            color,
            cycles,
            cycle.as_millis()
        );
        let half = Duration::from_micros(cycle.as_micros() / 2);
        let mut done = 0;
        while cycles == FOREVER || done < cycles {
            self.check()?;
            self.fade(OFF, color, half)?;
            self.check()?;
            self.fade(color, OFF, half)?;
            done += 1;
        }
        Ok(())
    }

    /// Alternate `color` and off.
    ///
    /// `count == FOREVER` repeats until canceled.
    pub fn blink(&self, color: Rgb, count: u32, on: Duration, off: Duration) -> Step {
        trace!(
            "blink {:?} x{} ({}ms on, {}ms off)",
            color,
            count,
            on.as_millis(),
            off.as_millis()
        );
        let mut done = 0;
        while count == FOREVER || done < count {
            self.hold(color, on)?;
            self.off();
            self.wait(off)?;
            done += 1;
        }
        Ok(())
    }
}
