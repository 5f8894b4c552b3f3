mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::thread;

    use handheld_led::color::{BLUE, GREEN, OFF, RED, Rgb};
    use handheld_led::primitive::HOLD_REFRESH;
    use handheld_led::{
        Channel, Duration, EffectCatalog, EffectId, EffectScheduler, Instant, LedConfig, LedError,
        MemoryDriver, ValuePolicy,
    };

    /// Cancellation latency budget plus scheduler slack for loaded CI hosts
    const LATENCY: Duration = Duration::from_millis(100);

    fn sleep_ms(ms: u64) {
        thread::sleep(core::time::Duration::from_millis(ms));
    }

    /// Poll `condition` until it holds or `timeout` passes
    fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if condition() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            sleep_ms(2);
        }
    }

    fn builtin() -> (Arc<MemoryDriver>, EffectScheduler) {
        with_catalog(EffectCatalog::builtin(), &LedConfig::default())
    }

    fn with_catalog(
        catalog: EffectCatalog,
        config: &LedConfig,
    ) -> (Arc<MemoryDriver>, EffectScheduler) {
        let driver = Arc::new(MemoryDriver::new());
        let scheduler = EffectScheduler::new(driver.clone(), catalog, config);
        (driver, scheduler)
    }

    /// Catalog whose effects hold one color until canceled
    fn steady_catalog() -> EffectCatalog {
        let mut catalog = EffectCatalog::new();
        catalog
            .register(EffectId::BluetoothConnected, |p| p.hold_until_canceled(BLUE))
            .unwrap();
        catalog
            .register(EffectId::WifiConnected, |p| p.hold_until_canceled(GREEN))
            .unwrap();
        catalog
            .register(EffectId::ChargingLowBattery, |p| p.hold_until_canceled(RED))
            .unwrap();
        catalog
    }

    #[test]
    fn test_start_from_idle() {
        let (driver, scheduler) = builtin();
        assert!(!scheduler.is_effect_active());

        assert!(scheduler.start_effect(EffectId::BluetoothConnected));
        assert!(scheduler.is_effect_active());
        assert_eq!(scheduler.current_effect_kind(), Some(EffectId::BluetoothConnected));
        assert!(wait_until(LATENCY, || driver.current() == BLUE));
    }

    #[test]
    fn test_stop_when_idle_is_noop() {
        let (driver, scheduler) = builtin();
        scheduler.stop_current_effect();
        assert!(!scheduler.is_effect_active());
        assert_eq!(driver.write_count(), 0);
    }

    #[test]
    fn test_stop_converges_to_idle_and_dark() {
        let (driver, scheduler) = builtin();
        assert!(scheduler.start_effect(EffectId::ChargingComplete));
        assert!(wait_until(LATENCY, || driver.current() == BLUE));

        scheduler.stop_current_effect();
        assert!(wait_until(LATENCY, || !scheduler.is_effect_active()));
        assert_eq!(driver.current(), OFF);
    }

    #[test]
    fn test_unknown_names_are_rejected() {
        let (driver, scheduler) = builtin();
        assert!(!scheduler.start_effect_named("disco"));
        assert!(!scheduler.is_effect_active());
        assert_eq!(driver.write_count(), 0);

        assert!(scheduler.start_effect_named("camera_focus"));
        assert_eq!(scheduler.current_effect_kind(), Some(EffectId::CameraFocus));
    }

    #[test]
    fn test_unregistered_effect_keeps_current() {
        let (_driver, scheduler) = with_catalog(steady_catalog(), &LedConfig::default());
        assert!(scheduler.start_effect(EffectId::WifiConnected));
        let before = scheduler.current_handle().unwrap();

        assert!(!scheduler.start_effect(EffectId::Party));
        let after = scheduler.current_handle().unwrap();
        assert_eq!(after.kind(), EffectId::WifiConnected);
        assert_eq!(after.generation(), before.generation());
        assert!(after.is_live());
    }

    #[test]
    fn test_start_while_disabled_is_rejected() {
        let config = LedConfig {
            enabled: false,
            ..LedConfig::default()
        };
        let (driver, scheduler) = with_catalog(EffectCatalog::builtin(), &config);
        assert!(!scheduler.is_enabled());
        assert!(!scheduler.start_effect(EffectId::Boot));
        assert!(!scheduler.is_effect_active());
        assert_eq!(driver.write_count(), 0);
    }

    #[test]
    fn test_preemption_silences_previous_effect() {
        let (driver, scheduler) = builtin();
        assert!(scheduler.start_effect(EffectId::Notification));
        assert!(wait_until(LATENCY, || driver.current().g > 0));
        let first = scheduler.current_handle().unwrap();

        sleep_ms(300);
        let switched_at = Instant::now();
        assert!(scheduler.start_effect(EffectId::BluetoothConnecting));
        let second = scheduler.current_handle().unwrap();
        assert_eq!(second.kind(), EffectId::BluetoothConnecting);
        assert!(second.generation() > first.generation());
        assert!(!first.is_live());

        sleep_ms(400);
        // Blue blinks never light green, so any lit green write is the old pulse
        let stray = driver
            .writes_since(switched_at + LATENCY)
            .into_iter()
            .filter(|w| w.channel == Channel::Green && w.value > 0)
            .count();
        assert_eq!(stray, 0);
        assert!(
            driver
                .writes_since(switched_at)
                .iter()
                .any(|w| w.channel == Channel::Blue && w.value == 255)
        );
    }

    #[test]
    fn test_stale_completion_keeps_newer_effect() {
        let (driver, scheduler) = with_catalog(steady_catalog(), &LedConfig::default());
        assert!(scheduler.start_effect(EffectId::ChargingLowBattery));
        assert!(scheduler.start_effect(EffectId::WifiConnected));

        sleep_ms(150);
        assert!(scheduler.is_effect_active());
        assert_eq!(scheduler.current_effect_kind(), Some(EffectId::WifiConnected));
        assert_eq!(driver.current(), GREEN);
    }

    #[test]
    fn test_rapid_restarts_leave_one_effect() {
        let (driver, scheduler) = with_catalog(steady_catalog(), &LedConfig::default());
        let kinds = [
            EffectId::ChargingLowBattery,
            EffectId::BluetoothConnected,
            EffectId::WifiConnected,
        ];
        for round in 0..9 {
            assert!(scheduler.start_effect(kinds[round % kinds.len()]));
        }
        sleep_ms(150);
        assert_eq!(scheduler.current_effect_kind(), Some(EffectId::WifiConnected));
        assert_eq!(driver.current(), GREEN);
    }

    #[test]
    fn test_finite_blink_completes_dark() {
        let (driver, scheduler) = builtin();
        assert!(scheduler.start_effect(EffectId::BluetoothFailed));

        // Three 200ms on / 400ms off blinks
        assert!(wait_until(Duration::from_millis(1800) + LATENCY * 2, || {
            !scheduler.is_effect_active()
        }));
        assert_eq!(driver.current(), OFF);
        let flashes = driver
            .writes()
            .iter()
            .filter(|w| w.channel == Channel::Red && w.value == 255)
            .count();
        assert_eq!(flashes, 3);
    }

    #[test]
    fn test_endless_pulse_stops_dark() {
        let (driver, scheduler) = builtin();
        assert!(scheduler.start_effect(EffectId::Notification));
        sleep_ms(3200);
        assert!(scheduler.is_effect_active());

        scheduler.stop_current_effect();
        assert!(wait_until(LATENCY, || !scheduler.is_effect_active()));
        assert_eq!(driver.current(), OFF);
    }

    #[test]
    fn test_natural_completion_clears_slot() {
        let mut catalog = EffectCatalog::new();
        catalog
            .register(EffectId::CameraSavePhoto, |p| {
                p.hold(GREEN, Duration::from_millis(50))
            })
            .unwrap();
        let (driver, scheduler) = with_catalog(catalog, &LedConfig::default());

        assert!(scheduler.start_effect(EffectId::CameraSavePhoto));
        assert!(wait_until(Duration::from_millis(50) + LATENCY, || {
            !scheduler.is_effect_active()
        }));
        assert_eq!(driver.current(), OFF);
    }

    #[test]
    fn test_panicking_effect_clears_slot() {
        let mut catalog = EffectCatalog::new();
        catalog
            .register(EffectId::Party, |p| {
                p.hold(RED, Duration::from_millis(20))?;
                panic!("effect body blew up");
            })
            .unwrap();
        let (driver, scheduler) = with_catalog(catalog, &LedConfig::default());

        assert!(scheduler.start_effect(EffectId::Party));
        assert!(wait_until(LATENCY * 2, || !scheduler.is_effect_active()));
        assert_eq!(driver.current(), OFF);
        assert!(scheduler.start_effect(EffectId::Party));
    }

    #[test]
    fn test_steady_hold_relights_after_mute() {
        let (driver, scheduler) = builtin();
        assert!(scheduler.start_effect(EffectId::ChargingComplete));
        assert!(wait_until(LATENCY, || driver.current() == BLUE));

        scheduler.set_enabled(false);
        assert_eq!(driver.current(), OFF);
        sleep_ms(100);

        scheduler.set_enabled(true);
        assert!(wait_until(HOLD_REFRESH + LATENCY, || driver.current() == BLUE));
        assert_eq!(scheduler.current_effect_kind(), Some(EffectId::ChargingComplete));
    }

    #[test]
    fn test_mute_is_transparent_to_the_effect() {
        let (driver, scheduler) = builtin();
        assert!(scheduler.start_effect(EffectId::WifiConnecting));
        assert!(wait_until(LATENCY, || driver.current().g > 0));
        let generation = scheduler.current_handle().unwrap().generation();

        scheduler.set_enabled(false);
        assert!(!scheduler.is_enabled());
        assert_eq!(driver.current(), OFF);
        assert!(scheduler.is_effect_active());

        let muted = driver.write_count();
        sleep_ms(200);
        assert_eq!(driver.write_count(), muted);
        assert_eq!(driver.current(), OFF);

        scheduler.set_enabled(true);
        assert!(wait_until(LATENCY, || driver.write_count() > muted));
        let handle = scheduler.current_handle().unwrap();
        assert_eq!(handle.kind(), EffectId::WifiConnecting);
        assert_eq!(handle.generation(), generation);
    }

    #[test]
    fn test_set_enabled_is_idempotent() {
        let (driver, scheduler) = builtin();
        scheduler.set_enabled(true);
        assert_eq!(driver.write_count(), 0);

        scheduler.set_enabled(false);
        let dark = driver.write_count();
        scheduler.set_enabled(false);
        assert_eq!(driver.write_count(), dark);
    }

    #[test]
    fn test_set_color_stops_effect_and_clamps() {
        let (driver, scheduler) = builtin();
        assert!(scheduler.start_effect(EffectId::Notification));
        sleep_ms(200);

        scheduler.set_color(-5, 300, 128).unwrap();
        assert!(!scheduler.is_effect_active());
        assert_eq!(driver.current(), Rgb::new(0, 255, 128));

        sleep_ms(100);
        assert_eq!(driver.current(), Rgb::new(0, 255, 128));
    }

    #[test]
    fn test_set_channel_overrides_one_channel() {
        let (driver, scheduler) = builtin();
        scheduler.set_color(10, 20, 30).unwrap();
        scheduler.set_channel(Channel::Blue, 999).unwrap();
        assert_eq!(driver.current(), Rgb::new(10, 20, 255));

        scheduler.turn_off().unwrap();
        assert_eq!(driver.current(), OFF);
    }

    #[test]
    fn test_manual_writes_respect_the_gate() {
        let (driver, scheduler) = builtin();
        scheduler.set_enabled(false);
        let dark = driver.write_count();

        scheduler.set_color(255, 255, 255).unwrap();
        assert_eq!(driver.write_count(), dark);
        assert_eq!(driver.current(), OFF);
    }

    #[test]
    fn test_reject_policy_blanks_partial_color() {
        let config = LedConfig {
            value_policy: ValuePolicy::Reject,
            ..LedConfig::default()
        };
        let (driver, scheduler) = with_catalog(EffectCatalog::builtin(), &config);

        let err = scheduler.set_color(200, 256, 0).unwrap_err();
        assert!(matches!(
            err,
            LedError::InvalidColorValue {
                channel: Channel::Green,
                value: 256
            }
        ));
        assert_eq!(driver.current(), OFF);
    }

    #[test]
    fn test_hardware_failure_is_reported() {
        let (driver, scheduler) = builtin();
        driver.fail_channel(Channel::Red, true);
        let err = scheduler.set_channel(Channel::Red, 40).unwrap_err();
        assert!(matches!(err, LedError::HardwareWrite { channel: Channel::Red, .. }));

        driver.fail_channel(Channel::Red, false);
        scheduler.set_channel(Channel::Red, 40).unwrap();
        assert_eq!(driver.current().r, 40);
    }

    #[test]
    fn test_effect_survives_hardware_failure() {
        let runs = Arc::new(AtomicU32::new(0));
        let counter = runs.clone();
        let mut catalog = EffectCatalog::new();
        catalog
            .register(EffectId::Music, move |p| {
                counter.fetch_add(1, Ordering::SeqCst);
                p.fade(OFF, RED, Duration::from_millis(100))
            })
            .unwrap();
        let (driver, scheduler) = with_catalog(catalog, &LedConfig::default());
        driver.fail_channel(Channel::Green, true);

        assert!(scheduler.start_effect(EffectId::Music));
        assert!(wait_until(Duration::from_millis(100) + LATENCY, || {
            !scheduler.is_effect_active()
        }));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(driver.writes().iter().any(|w| w.channel == Channel::Red && w.value == 255));
    }

    #[test]
    fn test_drop_cancels_running_effect() {
        let (driver, scheduler) = builtin();
        assert!(scheduler.start_effect(EffectId::ChargingComplete));
        assert!(wait_until(LATENCY, || driver.current() == BLUE));

        drop(scheduler);
        assert!(wait_until(LATENCY, || driver.current() == OFF));
    }
}
