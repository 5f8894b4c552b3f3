//! Effect scheduler for a three-channel RGB indicator light.
//!
//! One [`EffectScheduler`] owns the light. Effects are named sequences of
//! fades, pulses and blinks that run on their own thread and stop
//! cooperatively through a [`CancellationToken`].

pub mod channel;
pub mod color;
pub mod config;
pub mod driver;
pub mod effect;
pub mod error;
pub mod primitive;
pub mod scheduler;
pub mod token;

use std::io;

pub use channel::{Channel, ChannelSink, ValuePolicy};
pub use color::Rgb;
pub use config::{LedConfig, Timings};
pub use driver::{ChannelPaths, MemoryDriver, SysfsDriver};
pub use effect::{EffectBody, EffectCatalog, EffectId};
pub use error::LedError;
pub use primitive::{FOREVER, Painter};
pub use scheduler::{EffectHandle, EffectScheduler};
pub use token::{CancellationToken, Canceled, Step};
pub use embassy_time::{Duration, Instant};

/// Abstract brightness output
///
/// Implement this trait to support different hardware back ends.
/// Values are already validated to 0..=255 by the caller.
pub trait OutputDriver: Send + Sync {
    /// Write one channel's brightness
    fn write(&self, channel: Channel, value: u8) -> io::Result<()>;
}
