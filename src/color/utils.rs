use crate::color::Rgb;

/// Clamp an arbitrary integer into the 0-255 brightness range
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub const fn clamp_channel(value: i32) -> u8 {
    if value < 0 {
        0
    } else if value > 255 {
        255
    } else {
        value as u8
    }
}

/// Build a color from unchecked integers, clamping every channel
pub const fn rgb_clamped(r: i32, g: i32, b: i32) -> Rgb {
    Rgb {
        r: clamp_channel(r),
        g: clamp_channel(g),
        b: clamp_channel(b),
    }
}

/// Linear interpolation between two colors
///
/// # Arguments
/// * `from` - Color at `step == 0`
/// * `to` - Color at `step == steps`
/// * `step` - Current step, saturated to `steps`
/// * `steps` - Total number of steps (0 yields `to`)
#[allow(clippy::cast_possible_wrap)]
pub fn lerp_colors(from: Rgb, to: Rgb, step: u32, steps: u32) -> Rgb {
    if steps == 0 || step >= steps {
        return to;
    }
    let lerp = |a: u8, b: u8| {
        let delta = i64::from(b) - i64::from(a);
        let value = i64::from(a) + delta * i64::from(step) / i64::from(steps);
        clamp_channel(value as i32)
    };
    Rgb {
        r: lerp(from.r, to.r),
        g: lerp(from.g, to.g),
        b: lerp(from.b, to.b),
    }
}

/// Create an RGB color from a u32 value (0xRRGGBB format)
pub const fn rgb_from_u32(color: u32) -> Rgb {
    Rgb {
        r: ((color >> 16) & 0xFF) as u8,
        g: ((color >> 8) & 0xFF) as u8,
        b: (color & 0xFF) as u8,
    }
}
