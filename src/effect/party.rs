//! Party mode: a nine second show driving the channels independently.

use embassy_time::{Duration, Instant};

use crate::channel::Channel;
use crate::color::{Rgb, clamp_channel};
use crate::primitive::Painter;
use crate::token::Step;

const SHOW_LENGTH: Duration = Duration::from_secs(9);
const RED_ACCENT_PERIOD: Duration = Duration::from_secs(3);
const SWEEP_LENGTH: Duration = Duration::from_millis(500);
const FRAME: Duration = Duration::from_millis(10);

/// Color of the blue -> purple -> green -> yellow sweep at `permille` of its length
#[allow(clippy::cast_possible_wrap)]
pub fn sweep_color(permille: u32) -> Rgb {
    let permille = permille.min(1000) as i32;
    let (r, g, b) = if permille < 330 {
        (255 * permille / 330, 0, 255)
    } else if permille < 660 {
        let sub = permille - 330;
        let fading = 255 * (330 - sub) / 330;
        (fading, 255 * sub / 330, fading)
    } else {
        (255 * (permille - 660) / 340, 255, 0)
    };
    Rgb::new(clamp_channel(r), clamp_channel(g), clamp_channel(b))
}

/// Cheap brightness jitter; quality is irrelevant, only variation matters
struct Flicker(u32);

impl Flicker {
    #[allow(clippy::cast_possible_truncation)]
    fn seeded(now: Instant) -> Self {
        Self((now.as_ticks() as u32) | 1)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn between(&mut self, low: u8, high: u8) -> u8 {
        // xorshift32
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 17;
        self.0 ^= self.0 << 5;
        let span = u32::from(high.saturating_sub(low)) + 1;
        low + (self.0 % span) as u8
    }
}

/// Light one channel, then dark it for a moment
fn flash(painter: &Painter<'_>, channel: Channel, level: u8, on_ms: u64, off_ms: u64) -> Step {
    painter.check()?;
    painter.write_channel(channel, level);
    painter.wait(Duration::from_millis(on_ms))?;
    painter.write_channel(channel, 0);
    painter.wait(Duration::from_millis(off_ms))
}

#[allow(clippy::cast_possible_truncation)]
fn sweep(painter: &Painter<'_>) -> Step {
    let start = Instant::now();
    while start.elapsed() < SWEEP_LENGTH {
        let permille = start.elapsed().as_millis() * 1000 / SWEEP_LENGTH.as_millis();
        painter.check()?;
        painter.show(sweep_color(permille as u32));
        painter.wait(FRAME)?;
    }
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
pub(super) fn party(painter: &Painter<'_>) -> Step {
    let start = Instant::now();
    let mut flicker = Flicker::seeded(start);
    let mut next_accent = start + RED_ACCENT_PERIOD;

    while start.elapsed() < SHOW_LENGTH {
        painter.check()?;
        let elapsed = start.elapsed();
        match elapsed.as_secs() {
            // Opening: flickering blue and green, red accent every few seconds
            second @ 0..=3 => {
                if Instant::now() >= next_accent {
                    flash(painter, Channel::Red, 255, 300, 0)?;
                    next_accent = Instant::now() + RED_ACCENT_PERIOD;
                }
                flash(painter, Channel::Blue, flicker.between(150, 200), 200, 50)?;
                let green = if second == 0 {
                    // Green brightens across the first second
                    100 + (155 * (elapsed.as_millis() % 1000) / 1000) as u8
                } else {
                    flicker.between(150, 200)
                };
                flash(painter, Channel::Green, green, 200, 100)?;
            }
            // Color sweep, then steady flashes with a single red accent
            4 => {
                sweep(painter)?;
                for round in 0..3 {
                    flash(painter, Channel::Blue, 200, 200, 50)?;
                    flash(painter, Channel::Green, 200, 200, 100)?;
                    if round == 1 {
                        flash(painter, Channel::Red, 255, 100, 0)?;
                    }
                }
            }
            5..=7 => {
                flash(painter, Channel::Blue, 200, 200, 50)?;
                flash(painter, Channel::Green, 200, 200, 100)?;
            }
            // Finale: fast blue/green alternation
            _ => {
                for _ in 0..5 {
                    flash(painter, Channel::Blue, flicker.between(150, 250), 100, 0)?;
                    flash(painter, Channel::Green, flicker.between(150, 250), 150, 0)?;
                }
            }
        }
        painter.wait(FRAME)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_color_waypoints() {
        assert_eq!(sweep_color(0), Rgb::new(0, 0, 255));
        assert_eq!(sweep_color(330), Rgb::new(255, 0, 255));
        assert_eq!(sweep_color(660), Rgb::new(0, 255, 0));
        assert_eq!(sweep_color(1000), Rgb::new(255, 255, 0));
        assert_eq!(sweep_color(5000), Rgb::new(255, 255, 0));
    }

    #[test]
    fn test_flicker_stays_in_range() {
        let mut flicker = Flicker(0x1234_5678);
        for _ in 0..1000 {
            let value = flicker.between(150, 200);
            assert!((150..=200).contains(&value));
        }
    }
}
