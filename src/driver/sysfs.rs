//! Linux LED class driver.
//!
//! Each channel is a `brightness` attribute that accepts the decimal value
//! and overwrites the previous one.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::OutputDriver;
use crate::channel::Channel;

const DEFAULT_LED_CLASS_DIR: &str = "/sys/class/leds";
const DEFAULT_LED_DEVICE: &str = "sc27xx";

/// Brightness endpoints of the three channels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPaths {
    pub red: PathBuf,
    pub green: PathBuf,
    pub blue: PathBuf,
}

impl ChannelPaths {
    /// Paths of the form `{dir}/{device}:{color}/brightness`
    pub fn under(dir: impl AsRef<Path>, device: &str) -> Self {
        let dir = dir.as_ref();
        let endpoint = |channel: Channel| {
            dir.join(format!("{device}:{}", channel.as_str()))
                .join("brightness")
        };
        Self {
            red: endpoint(Channel::Red),
            green: endpoint(Channel::Green),
            blue: endpoint(Channel::Blue),
        }
    }

    pub fn get(&self, channel: Channel) -> &Path {
        match channel {
            Channel::Red => &self.red,
            Channel::Green => &self.green,
            Channel::Blue => &self.blue,
        }
    }
}

impl Default for ChannelPaths {
    fn default() -> Self {
        Self::under(DEFAULT_LED_CLASS_DIR, DEFAULT_LED_DEVICE)
    }
}

/// Writes brightness values to LED class attribute files
#[derive(Debug, Clone)]
pub struct SysfsDriver {
    paths: ChannelPaths,
}

impl SysfsDriver {
    pub fn new(paths: ChannelPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &ChannelPaths {
        &self.paths
    }
}

impl OutputDriver for SysfsDriver {
    fn write(&self, channel: Channel, value: u8) -> io::Result<()> {
        fs::write(self.paths.get(channel), value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let paths = ChannelPaths::default();
        assert_eq!(
            paths.red,
            PathBuf::from("/sys/class/leds/sc27xx:red/brightness")
        );
        assert_eq!(
            paths.get(Channel::Blue),
            Path::new("/sys/class/leds/sc27xx:blue/brightness")
        );
    }

    #[test]
    fn test_write_overwrites_decimal_value() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ChannelPaths::under(dir.path(), "test");
        for channel in Channel::ALL {
            fs::create_dir_all(paths.get(channel).parent().unwrap()).unwrap();
        }
        let driver = SysfsDriver::new(paths.clone());

        driver.write(Channel::Green, 255).unwrap();
        driver.write(Channel::Green, 7).unwrap();
        assert_eq!(fs::read_to_string(&paths.green).unwrap(), "7");
    }

    #[test]
    fn test_missing_endpoint_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let driver = SysfsDriver::new(ChannelPaths::under(dir.path(), "absent"));
        assert!(driver.write(Channel::Red, 1).is_err());
    }
}
