//! In-memory recording driver.
//!
//! Stands in for the hardware in tests and dry runs: every write is logged
//! with a timestamp and channels can be made to fail on demand.

use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};

use embassy_time::Instant;

use crate::OutputDriver;
use crate::channel::Channel;
use crate::color::Rgb;

/// A write observed by [`MemoryDriver`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedWrite {
    pub channel: Channel,
    pub value: u8,
    pub at: Instant,
}

#[derive(Debug, Default)]
struct Recording {
    writes: Vec<RecordedWrite>,
    levels: Rgb,
    failing: [bool; 3],
}

#[derive(Debug, Default)]
pub struct MemoryDriver {
    recording: Mutex<Recording>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value written to each channel
    pub fn current(&self) -> Rgb {
        self.lock().levels
    }

    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.lock().writes.clone()
    }

    /// Writes recorded at or after `since`
    pub fn writes_since(&self, since: Instant) -> Vec<RecordedWrite> {
        self.lock()
            .writes
            .iter()
            .filter(|write| write.at >= since)
            .copied()
            .collect()
    }

    pub fn last_write(&self) -> Option<RecordedWrite> {
        self.lock().writes.last().copied()
    }

    pub fn write_count(&self) -> usize {
        self.lock().writes.len()
    }

    /// Forget the write log, keeping current levels
    pub fn clear(&self) {
        self.lock().writes.clear();
    }

    /// Make writes to `channel` fail until switched back
    pub fn fail_channel(&self, channel: Channel, failing: bool) {
        self.lock().failing[index(channel)] = failing;
    }

    fn lock(&self) -> MutexGuard<'_, Recording> {
        self.recording.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl OutputDriver for MemoryDriver {
    fn write(&self, channel: Channel, value: u8) -> io::Result<()> {
        let mut recording = self.lock();
        if recording.failing[index(channel)] {
            return Err(io::Error::other(format!("{channel} endpoint unavailable")));
        }
        match channel {
            Channel::Red => recording.levels.r = value,
            Channel::Green => recording.levels.g = value,
            Channel::Blue => recording.levels.b = value,
        }
        recording.writes.push(RecordedWrite {
            channel,
            value,
            at: Instant::now(),
        });
        Ok(())
    }
}

const fn index(channel: Channel) -> usize {
    match channel {
        Channel::Red => 0,
        Channel::Green => 1,
        Channel::Blue => 2,
    }
}
