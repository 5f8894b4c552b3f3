//! Hardware back ends for [`OutputDriver`](crate::OutputDriver).

mod memory;
mod sysfs;

pub use memory::{MemoryDriver, RecordedWrite};
pub use sysfs::{ChannelPaths, SysfsDriver};
