mod utils;

use smart_leds::RGB8;

pub use utils::{clamp_channel, lerp_colors, rgb_clamped, rgb_from_u32};

pub type Rgb = RGB8;

/// All channels dark
pub const OFF: Rgb = rgb_from_u32(0x00_0000);
pub const RED: Rgb = rgb_from_u32(0xFF_0000);
pub const GREEN: Rgb = rgb_from_u32(0x00_FF00);
pub const BLUE: Rgb = rgb_from_u32(0x00_00FF);
pub const WHITE: Rgb = rgb_from_u32(0xFF_FFFF);
pub const CYAN: Rgb = rgb_from_u32(0x00_FFFF);
pub const MAGENTA: Rgb = rgb_from_u32(0xFF_00FF);
pub const YELLOW: Rgb = rgb_from_u32(0xFF_FF00);
/// Camera focus orange
pub const ORANGE: Rgb = rgb_from_u32(0xFF_8000);
