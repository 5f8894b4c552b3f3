//! Device status effects: connectivity, charging, camera and boot.

use embassy_time::Duration;

use crate::color::{BLUE, GREEN, OFF, ORANGE, RED, WHITE};
use crate::primitive::{FOREVER, Painter};
use crate::token::Step;

const BREATH_CYCLE: Duration = Duration::from_millis(2000);
const WIFI_BREATH_CYCLE: Duration = Duration::from_millis(2500);
const CONNECTED_HOLD: Duration = Duration::from_secs(3);

/// Red, green, blue for a second each, separated by short gaps
pub(super) fn boot(painter: &Painter<'_>) -> Step {
    for color in [RED, GREEN, BLUE] {
        painter.hold(color, Duration::from_secs(1))?;
        painter.hold(OFF, Duration::from_millis(200))?;
    }
    Ok(())
}

/// Alternating red and blue flashes until answered
pub(super) fn call_notification(painter: &Painter<'_>) -> Step {
    let flash = Duration::from_millis(200);
    for color in [RED, BLUE].into_iter().cycle() {
        painter.hold(color, flash)?;
        painter.hold(OFF, flash)?;
    }
    Ok(())
}

pub(super) fn notification(painter: &Painter<'_>) -> Step {
    painter.pulse(GREEN, FOREVER, BREATH_CYCLE)
}

pub(super) fn bluetooth_connecting(painter: &Painter<'_>) -> Step {
    painter.blink(
        BLUE,
        FOREVER,
        Duration::from_millis(300),
        Duration::from_millis(500),
    )
}

pub(super) fn bluetooth_connected(painter: &Painter<'_>) -> Step {
    painter.hold(BLUE, CONNECTED_HOLD)
}

pub(super) fn bluetooth_failed(painter: &Painter<'_>) -> Step {
    painter.blink(
        RED,
        3,
        Duration::from_millis(200),
        Duration::from_millis(400),
    )
}

pub(super) fn wifi_connecting(painter: &Painter<'_>) -> Step {
    painter.pulse(GREEN, FOREVER, WIFI_BREATH_CYCLE)
}

pub(super) fn wifi_connected(painter: &Painter<'_>) -> Step {
    painter.hold(GREEN, CONNECTED_HOLD)
}

pub(super) fn wifi_failed(painter: &Painter<'_>) -> Step {
    painter.blink(
        RED,
        3,
        Duration::from_millis(300),
        Duration::from_millis(300),
    )
}

pub(super) fn charging_low_battery(painter: &Painter<'_>) -> Step {
    painter.pulse(RED, FOREVER, BREATH_CYCLE)
}

pub(super) fn charging_high_battery(painter: &Painter<'_>) -> Step {
    painter.pulse(GREEN, FOREVER, BREATH_CYCLE)
}

/// Solid blue that stays on until another effect or a stop replaces it
pub(super) fn charging_complete(painter: &Painter<'_>) -> Step {
    painter.hold_until_canceled(BLUE)
}

pub(super) fn camera_focus(painter: &Painter<'_>) -> Step {
    painter.hold(ORANGE, Duration::from_secs(2))
}

/// Long flash, gap, short flash
pub(super) fn camera_capture(painter: &Painter<'_>) -> Step {
    painter.hold(WHITE, Duration::from_secs(1))?;
    painter.hold(OFF, Duration::from_millis(500))?;
    painter.hold(WHITE, Duration::from_millis(200))
}

pub(super) fn camera_save_photo(painter: &Painter<'_>) -> Step {
    painter.hold(GREEN, Duration::from_secs(1))
}
