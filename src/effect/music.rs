//! Music visualizer: a fixed ten second light-show loop.

use embassy_time::Duration;

use crate::color::{BLUE, CYAN, GREEN, MAGENTA, OFF, RED, Rgb, YELLOW, rgb_from_u32};
use crate::primitive::Painter;
use crate::token::Step;

/// One segment of a timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Show a color for a number of milliseconds
    Hold(Rgb, u64),
    /// Fade between two colors over a number of milliseconds
    Ramp(Rgb, Rgb, u64),
}

impl Cue {
    pub const fn duration_ms(self) -> u64 {
        match self {
            Self::Hold(_, ms) | Self::Ramp(_, _, ms) => ms,
        }
    }

    fn play(self, painter: &Painter<'_>) -> Step {
        match self {
            Self::Hold(color, ms) => painter.hold(color, Duration::from_millis(ms)),
            Self::Ramp(from, to, ms) => painter.fade(from, to, Duration::from_millis(ms)),
        }
    }
}

const DIM_BLUE: Rgb = rgb_from_u32(0x00_0050);
const DIM_GREEN: Rgb = rgb_from_u32(0x00_5000);
const DIM_RED: Rgb = rgb_from_u32(0x50_0000);

/// One pass of the visualizer, one line per second of show time
pub const MUSIC_TIMELINE: [Cue; 34] = [
    // 0s: blue beats over a green bar
    Cue::Hold(CYAN, 200),
    Cue::Hold(GREEN, 200),
    Cue::Hold(CYAN, 100),
    Cue::Hold(BLUE, 100),
    Cue::Hold(OFF, 200),
    Cue::Hold(BLUE, 200),
    // 1s: red swells in under blue, then blue drains away
    Cue::Ramp(BLUE, MAGENTA, 500),
    Cue::Ramp(MAGENTA, RED, 500),
    // 2s: triple blue beat
    Cue::Hold(BLUE, 200),
    Cue::Hold(OFF, 200),
    Cue::Hold(BLUE, 200),
    Cue::Hold(OFF, 200),
    Cue::Hold(BLUE, 200),
    // 3s: red and green rise together, red falls back
    Cue::Ramp(OFF, YELLOW, 500),
    Cue::Ramp(YELLOW, GREEN, 500),
    // 4s
    Cue::Hold(RED, 300),
    Cue::Hold(OFF, 100),
    Cue::Hold(BLUE, 200),
    Cue::Hold(OFF, 200),
    Cue::Hold(BLUE, 100),
    Cue::Hold(OFF, 100),
    // 5s: blue and green trade places
    Cue::Hold(BLUE, 200),
    Cue::Hold(GREEN, 200),
    Cue::Hold(BLUE, 200),
    Cue::Hold(GREEN, 200),
    Cue::Hold(BLUE, 200),
    // 6s-7s: blue then green breathe between dim and full
    Cue::Ramp(BLUE, DIM_BLUE, 500),
    Cue::Ramp(DIM_BLUE, BLUE, 500),
    Cue::Ramp(DIM_GREEN, GREEN, 500),
    Cue::Ramp(GREEN, DIM_GREEN, 500),
    // 8s
    Cue::Ramp(DIM_RED, RED, 700),
    Cue::Hold(RED, 300),
    // 9s
    Cue::Hold(GREEN, 500),
    Cue::Hold(BLUE, 500),
];

/// Loops [`MUSIC_TIMELINE`] until canceled
pub(super) fn music(painter: &Painter<'_>) -> Step {
    loop {
        play(painter, &MUSIC_TIMELINE)?;
    }
}

fn play(painter: &Painter<'_>, cues: &[Cue]) -> Step {
    for cue in cues {
        cue.play(painter)?;
    }
    Ok(())
}
