//! Per-channel brightness sink.
//!
//! Every hardware write in the crate goes through [`ChannelSink`], which owns
//! the master-enable gate. Writes are serialized by a short lock so that the
//! forced "off" issued when the gate closes can never be overtaken by a write
//! that checked the gate just before it closed.

use core::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::OutputDriver;
use crate::color::{OFF, Rgb, clamp_channel};
use crate::error::LedError;

const CHANNEL_NAME_RED: &str = "red";
const CHANNEL_NAME_GREEN: &str = "green";
const CHANNEL_NAME_BLUE: &str = "blue";

/// One brightness control of the indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    /// Channels in hardware write order
    pub const ALL: [Self; 3] = [Self::Red, Self::Green, Self::Blue];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Red => CHANNEL_NAME_RED,
            Self::Green => CHANNEL_NAME_GREEN,
            Self::Blue => CHANNEL_NAME_BLUE,
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        match s {
            CHANNEL_NAME_RED => Some(Self::Red),
            CHANNEL_NAME_GREEN => Some(Self::Green),
            CHANNEL_NAME_BLUE => Some(Self::Blue),
            _ => None,
        }
    }

    /// Component of `color` driven by this channel
    pub const fn of(self, color: Rgb) -> u8 {
        match self {
            Self::Red => color.r,
            Self::Green => color.g,
            Self::Blue => color.b,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How out-of-range brightness values are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValuePolicy {
    /// Saturate into 0..=255
    #[default]
    Clamp,
    /// Reject with [`LedError::InvalidColorValue`]
    Reject,
}

impl ValuePolicy {
    pub fn apply(self, channel: Channel, value: i32) -> Result<u8, LedError> {
        match self {
            Self::Clamp => Ok(clamp_channel(value)),
            Self::Reject => u8::try_from(value)
                .map_err(|_| LedError::InvalidColorValue { channel, value }),
        }
    }
}

/// Gated writer for the three hardware channels
pub struct ChannelSink {
    driver: Arc<dyn OutputDriver>,
    policy: ValuePolicy,
    enabled: AtomicBool,
    write_lock: Mutex<()>,
}

impl ChannelSink {
    pub fn new(driver: Arc<dyn OutputDriver>, policy: ValuePolicy, enabled: bool) -> Self {
        Self {
            driver,
            policy,
            enabled: AtomicBool::new(enabled),
            write_lock: Mutex::new(()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn policy(&self) -> ValuePolicy {
        self.policy
    }

    /// Flip the master-enable gate, returning the previous state.
    ///
    /// Does not touch the hardware; see [`ChannelSink::force_off`].
    pub(crate) fn set_enabled(&self, enabled: bool) -> bool {
        self.enabled.swap(enabled, Ordering::AcqRel)
    }

    /// Write a single channel.
    ///
    /// Silently does nothing while the gate is closed.
    pub fn write(&self, channel: Channel, value: i32) -> Result<(), LedError> {
        let value = self.policy.apply(channel, value)?;
        let _guard = self.lock();
        if !self.is_enabled() {
            return Ok(());
        }
        self.write_raw(channel, value)
    }

    /// Write a color as red, green, blue in that order.
    pub fn set_color(&self, color: Rgb) -> Result<(), LedError> {
        self.set_rgb(i32::from(color.r), i32::from(color.g), i32::from(color.b))
    }

    /// Write unchecked components as red, green, blue in that order.
    ///
    /// Stops at the first rejected or failed channel, so earlier channels may
    /// already hold their new value when this returns an error.
    pub fn set_rgb(&self, r: i32, g: i32, b: i32) -> Result<(), LedError> {
        let _guard = self.lock();
        for (channel, value) in [(Channel::Red, r), (Channel::Green, g), (Channel::Blue, b)] {
            let value = self.policy.apply(channel, value)?;
            if !self.is_enabled() {
                return Ok(());
            }
            self.write_raw(channel, value)?;
        }
        Ok(())
    }

    /// Turn every channel off, bypassing the gate.
    ///
    /// All three channels are attempted; the first failure is returned.
    pub fn force_off(&self) -> Result<(), LedError> {
        let _guard = self.lock();
        let mut result = Ok(());
        for channel in Channel::ALL {
            if let Err(err) = self.write_raw(channel, channel.of(OFF)) {
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }
        result
    }

    fn write_raw(&self, channel: Channel, value: u8) -> Result<(), LedError> {
        self.driver
            .write(channel, value)
            .map_err(|source| LedError::HardwareWrite { channel, source })
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ChannelSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelSink")
            .field("policy", &self.policy)
            .field("enabled", &self.is_enabled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::MemoryDriver;

    fn sink(policy: ValuePolicy) -> (Arc<MemoryDriver>, ChannelSink) {
        let driver = Arc::new(MemoryDriver::new());
        let sink = ChannelSink::new(driver.clone(), policy, true);
        (driver, sink)
    }

    #[test]
    fn test_write_clamps() {
        let (driver, sink) = sink(ValuePolicy::Clamp);
        sink.set_rgb(-5, 300, 128).unwrap();
        assert_eq!(driver.current(), Rgb::new(0, 255, 128));
    }

    #[test]
    fn test_write_order_is_red_green_blue() {
        let (driver, sink) = sink(ValuePolicy::Clamp);
        sink.set_color(Rgb::new(1, 2, 3)).unwrap();
        let channels: Vec<_> = driver.writes().iter().map(|w| w.channel).collect();
        assert_eq!(channels, Channel::ALL);
    }

    #[test]
    fn test_reject_stops_at_first_invalid_channel() {
        let (driver, sink) = sink(ValuePolicy::Reject);
        let err = sink.set_rgb(10, 256, 20).unwrap_err();
        assert!(matches!(
            err,
            LedError::InvalidColorValue { channel: Channel::Green, value: 256 }
        ));
        assert_eq!(driver.write_count(), 1);
        assert_eq!(driver.current(), Rgb::new(10, 0, 0));
    }

    #[test]
    fn test_closed_gate_suppresses_writes() {
        let (driver, sink) = sink(ValuePolicy::Clamp);
        sink.set_enabled(false);
        sink.write(Channel::Red, 200).unwrap();
        sink.set_color(Rgb::new(9, 9, 9)).unwrap();
        assert_eq!(driver.write_count(), 0);

        sink.force_off().unwrap();
        assert_eq!(driver.write_count(), 3);
    }

    #[test]
    fn test_hardware_failure_is_reported() {
        let (driver, sink) = sink(ValuePolicy::Clamp);
        driver.fail_channel(Channel::Blue, true);
        let err = sink.write(Channel::Blue, 10).unwrap_err();
        assert!(matches!(err, LedError::HardwareWrite { channel: Channel::Blue, .. }));
        sink.write(Channel::Red, 10).unwrap();
        assert_eq!(driver.current().r, 10);
    }

    #[test]
    fn test_channel_names() {
        for channel in Channel::ALL {
            assert_eq!(Channel::parse_from_str(channel.as_str()), Some(channel));
        }
        assert_eq!(Channel::parse_from_str("violet"), None);
    }
}
