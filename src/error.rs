use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::channel::Channel;
use crate::effect::EffectId;

/// Errors reported by the LED subsystem.
///
/// None of these are fatal: the worst outcome is a dark or stale light.
#[derive(Debug, Error)]
pub enum LedError {
    #[error("{channel} brightness {value} is outside 0..=255")]
    InvalidColorValue { channel: Channel, value: i32 },

    #[error("failed to write {channel} brightness")]
    HardwareWrite {
        channel: Channel,
        #[source]
        source: io::Error,
    },

    #[error("failed to read config {}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("effect catalog is full, cannot register {0}")]
    CatalogFull(EffectId),
}
