//! Runtime configuration.
//!
//! [`LedConfig`] is deserialized from TOML; every field has a default so an
//! empty file describes the stock `sc27xx` device.

use std::fs;
use std::path::Path;

use embassy_time::Duration;
use serde::{Deserialize, Serialize};

use crate::channel::ValuePolicy;
use crate::driver::ChannelPaths;
use crate::error::LedError;

/// Longest wall time a single fade step may take
pub const DEFAULT_STEP_BUDGET: Duration = Duration::from_millis(20);
/// Longest uninterrupted sleep inside any wait
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);
/// Fewest steps a fade is split into, however short
pub const DEFAULT_MIN_FADE_STEPS: u32 = 10;
/// How long a preempting start waits for the old effect to exit
pub const DEFAULT_GRACE_WINDOW: Duration = Duration::from_millis(50);

pub const DEFAULT_TIMINGS: Timings = Timings {
    step_budget: DEFAULT_STEP_BUDGET,
    poll_interval: DEFAULT_POLL_INTERVAL,
    min_fade_steps: DEFAULT_MIN_FADE_STEPS,
    grace_window: DEFAULT_GRACE_WINDOW,
};

/// Timing parameters of primitives and the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub step_budget: Duration,
    pub poll_interval: Duration,
    pub min_fade_steps: u32,
    pub grace_window: Duration,
}

impl Timings {
    /// Number of interpolation steps for a fade of `duration`
    pub fn fade_steps(&self, duration: Duration) -> u32 {
        let budget = self.step_budget.as_micros().max(1);
        let steps = duration.as_micros().div_ceil(budget);
        let steps = u32::try_from(steps).unwrap_or(u32::MAX);
        steps.max(self.min_fade_steps).max(1)
    }
}

impl Default for Timings {
    fn default() -> Self {
        DEFAULT_TIMINGS
    }
}

/// Serialized form of [`Timings`], in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub step_budget_ms: u64,
    pub poll_interval_ms: u64,
    pub min_fade_steps: u32,
    pub grace_window_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            step_budget_ms: DEFAULT_STEP_BUDGET.as_millis(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis(),
            min_fade_steps: DEFAULT_MIN_FADE_STEPS,
            grace_window_ms: DEFAULT_GRACE_WINDOW.as_millis(),
        }
    }
}

impl From<TimingConfig> for Timings {
    fn from(config: TimingConfig) -> Self {
        Self {
            step_budget: Duration::from_millis(config.step_budget_ms.max(1)),
            poll_interval: Duration::from_millis(config.poll_interval_ms.max(1)),
            min_fade_steps: config.min_fade_steps.max(1),
            grace_window: Duration::from_millis(config.grace_window_ms),
        }
    }
}

/// Configuration for the LED controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedConfig {
    pub paths: ChannelPaths,
    pub timings: TimingConfig,
    pub value_policy: ValuePolicy,
    /// Initial state of the master enable
    pub enabled: bool,
}

impl Default for LedConfig {
    fn default() -> Self {
        Self {
            paths: ChannelPaths::default(),
            timings: TimingConfig::default(),
            value_policy: ValuePolicy::default(),
            enabled: true,
        }
    }
}

impl LedConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, LedError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LedError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| LedError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn timings(&self) -> Timings {
        self.timings.into()
    }
}
