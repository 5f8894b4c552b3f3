//! Single-slot effect scheduler.
//!
//! The scheduler owns the one "current effect" slot. Starting an effect
//! cancels the previous one, gives it a short grace window to exit, records
//! the new handle and only then launches the new body on its own thread.
//!
//! State transitions run inside a critical section that never spans I/O or
//! sleeps. Each execution is tagged with a generation, and a finishing task
//! only clears the slot while its own generation is still on record.

use core::cell::RefCell;
use std::sync::Arc;
use std::thread;

use critical_section::Mutex;
use embassy_time::{Duration, Instant};
use log::{debug, error, info, trace, warn};

use crate::OutputDriver;
use crate::channel::{Channel, ChannelSink};
use crate::color::OFF;
use crate::config::{LedConfig, Timings};
use crate::driver::SysfsDriver;
use crate::effect::{EffectBody, EffectCatalog, EffectId};
use crate::error::LedError;
use crate::primitive::Painter;
use crate::token::CancellationToken;

/// How often the grace wait looks at the slot
const TEARDOWN_POLL: Duration = Duration::from_millis(2);

/// The running effect and the token that stops it
#[derive(Debug, Clone)]
pub struct EffectHandle {
    kind: EffectId,
    token: CancellationToken,
}

impl EffectHandle {
    pub fn kind(&self) -> EffectId {
        self.kind
    }

    pub fn generation(&self) -> u64 {
        self.token.generation()
    }

    /// `false` once the handle's token has been canceled
    pub fn is_live(&self) -> bool {
        !self.token.is_canceled()
    }
}

#[derive(Debug, Default)]
struct SchedulerState {
    current: Option<EffectHandle>,
    generation: u64,
}

struct Shared {
    sink: ChannelSink,
    timings: Timings,
    catalog: EffectCatalog,
    state: Mutex<RefCell<SchedulerState>>,
}

impl Shared {
    fn with_state<R>(&self, f: impl FnOnce(&mut SchedulerState) -> R) -> R {
        critical_section::with(|cs| f(&mut self.state.borrow(cs).borrow_mut()))
    }

    /// Cancel the current token, returning the canceled generation
    fn cancel_current(&self) -> Option<(EffectId, u64)> {
        self.with_state(|state| {
            state.current.as_ref().map(|handle| {
                handle.token.cancel();
                (handle.kind, handle.generation())
            })
        })
    }

    fn current_generation(&self) -> Option<u64> {
        self.with_state(|state| state.current.as_ref().map(EffectHandle::generation))
    }

    /// Wait up to the grace window for `generation` to leave the slot
    fn await_teardown(&self, generation: u64) {
        let deadline = Instant::now() + self.timings.grace_window;
        while self.current_generation() == Some(generation) {
            let now = Instant::now();
            if now >= deadline {
                debug!("generation {} still running after grace window", generation);
                return;
            }
            let slice = deadline.duration_since(now).min(TEARDOWN_POLL);
            thread::sleep(core::time::Duration::from_micros(slice.as_micros()));
        }
    }

    /// Clear the slot if `generation` still owns it
    fn finish(&self, generation: u64) {
        let cleared = self.with_state(|state| {
            let owns_slot = state
                .current
                .as_ref()
                .is_some_and(|handle| handle.generation() == generation);
            if owns_slot {
                state.current = None;
            }
            owns_slot
        });
        if !cleared {
            trace!("discarding stale completion of generation {}", generation);
        }
    }

    fn run(&self, kind: EffectId, body: &EffectBody, token: &CancellationToken) {
        let _completion = Completion {
            shared: self,
            generation: token.generation(),
        };
        let painter = Painter::new(&self.sink, &self.timings, token);
        debug!("effect {} (generation {}) running", kind, token.generation());
        match body(&painter) {
            Ok(()) => {
                painter.off();
                debug!("effect {} finished", kind);
            }
            Err(_) => debug!("effect {} canceled", kind),
        }
    }
}

/// Reports completion to the scheduler however the effect thread exits
struct Completion<'a> {
    shared: &'a Shared,
    generation: u64,
}

impl Drop for Completion<'_> {
    fn drop(&mut self) {
        // Darken before releasing the slot so a successor never gets blanked.
        if thread::panicking() && self.shared.current_generation() == Some(self.generation) {
            error!("effect generation {} panicked", self.generation);
            if let Err(err) = self.shared.sink.set_color(OFF) {
                warn!("failed to darken light after panic: {}", err);
            }
        }
        self.shared.finish(self.generation);
    }
}

/// Runs at most one effect at a time against a [`ChannelSink`]
pub struct EffectScheduler {
    shared: Arc<Shared>,
}

impl EffectScheduler {
    pub fn new(driver: Arc<dyn OutputDriver>, catalog: EffectCatalog, config: &LedConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                sink: ChannelSink::new(driver, config.value_policy, config.enabled),
                timings: config.timings(),
                catalog,
                state: Mutex::new(RefCell::new(SchedulerState::default())),
            }),
        }
    }

    /// Scheduler driving the sysfs endpoints named in `config`, with every
    /// built-in effect available
    pub fn sysfs(config: &LedConfig) -> Self {
        let driver = Arc::new(SysfsDriver::new(config.paths.clone()));
        Self::new(driver, EffectCatalog::builtin(), config)
    }

    pub fn sink(&self) -> &ChannelSink {
        &self.shared.sink
    }

    pub fn timings(&self) -> &Timings {
        &self.shared.timings
    }

    pub fn catalog(&self) -> &EffectCatalog {
        &self.shared.catalog
    }

    /// Start `kind`, preempting whatever is running.
    ///
    /// Returns `false` without touching the current effect when the light is
    /// disabled or `kind` has no registered body.
    pub fn start_effect(&self, kind: EffectId) -> bool {
        let Some(body) = self.shared.catalog.get(kind) else {
            warn!("effect {} is not in the catalog", kind);
            return false;
        };
        if !self.is_enabled() {
            info!("light disabled, not starting {}", kind);
            return false;
        }

        if let Some((old, generation)) = self.shared.cancel_current() {
            debug!("preempting {} (generation {}) for {}", old, generation, kind);
            self.shared.await_teardown(generation);
        }

        let token = self.shared.with_state(|state| {
            if !self.shared.sink.is_enabled() {
                return None;
            }
            // A concurrent start may have claimed the slot during the grace wait.
            if let Some(handle) = state.current.take() {
                handle.token.cancel();
            }
            state.generation += 1;
            let token = CancellationToken::with_generation(state.generation);
            state.current = Some(EffectHandle {
                kind,
                token: token.clone(),
            });
            Some(token)
        });
        let Some(token) = token else {
            info!("light disabled while starting {}", kind);
            return false;
        };

        let generation = token.generation();
        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name(format!("led-{}", kind))
            .spawn(move || shared.run(kind, &body, &token));
        match spawned {
            Ok(_) => true,
            Err(err) => {
                error!("failed to spawn thread for {}: {}", kind, err);
                self.shared.finish(generation);
                false
            }
        }
    }

    /// Start an effect by its catalog name
    pub fn start_effect_named(&self, name: &str) -> bool {
        match EffectId::parse_from_str(name) {
            Some(kind) => self.start_effect(kind),
            None => {
                warn!("unknown effect {:?}", name);
                false
            }
        }
    }

    /// Cancel the running effect, if any.
    ///
    /// Waits at most the grace window for it to write its final "off"; the
    /// slot returns to idle asynchronously.
    pub fn stop_current_effect(&self) {
        if let Some((kind, generation)) = self.shared.cancel_current() {
            debug!("stopping {} (generation {})", kind, generation);
            self.shared.await_teardown(generation);
        }
    }

    /// Stop any effect, then show a solid color
    pub fn set_color(&self, r: i32, g: i32, b: i32) -> Result<(), LedError> {
        self.stop_current_effect();
        self.shared
            .sink
            .set_rgb(r, g, b)
            .inspect_err(|_| self.blank())
    }

    /// Stop any effect, then set a single channel
    pub fn set_channel(&self, channel: Channel, value: i32) -> Result<(), LedError> {
        self.stop_current_effect();
        self.shared
            .sink
            .write(channel, value)
            .inspect_err(|_| self.blank())
    }

    /// Stop any effect and darken the light
    pub fn turn_off(&self) -> Result<(), LedError> {
        self.stop_current_effect();
        self.shared.sink.set_color(OFF)
    }

    /// Follow-up "off" after a partially applied manual write
    fn blank(&self) {
        if let Err(err) = self.shared.sink.set_color(OFF) {
            warn!("failed to blank after write error: {}", err);
        }
    }

    /// Open or close the master-enable gate.
    ///
    /// Closing it darkens the hardware at once but leaves the running effect
    /// alive; its writes stay suppressed until the gate reopens.
    pub fn set_enabled(&self, enabled: bool) {
        let was_enabled = self
            .shared
            .with_state(|_| self.shared.sink.set_enabled(enabled));
        if was_enabled == enabled {
            return;
        }
        info!("light {}", if enabled { "enabled" } else { "disabled" });
        if !enabled {
            if let Err(err) = self.shared.sink.force_off() {
                warn!("failed to darken light on disable: {}", err);
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.sink.is_enabled()
    }

    pub fn is_effect_active(&self) -> bool {
        self.shared.with_state(|state| state.current.is_some())
    }

    pub fn current_effect_kind(&self) -> Option<EffectId> {
        self.shared
            .with_state(|state| state.current.as_ref().map(EffectHandle::kind))
    }

    /// Snapshot of the current handle
    pub fn current_handle(&self) -> Option<EffectHandle> {
        self.shared.with_state(|state| state.current.clone())
    }
}

impl Drop for EffectScheduler {
    fn drop(&mut self) {
        self.shared.cancel_current();
    }
}

impl core::fmt::Debug for EffectScheduler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EffectScheduler")
            .field("sink", &self.shared.sink)
            .field("timings", &self.shared.timings)
            .field("current", &self.current_effect_kind())
            .finish()
    }
}
