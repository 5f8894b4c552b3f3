//! Named effects and the catalog that maps them to bodies.
//!
//! Effects are plain compositions of [`Painter`] primitives; the scheduler
//! only ever sees an [`EffectBody`] to run with a fresh token.

mod music;
mod party;
mod status;

use std::sync::Arc;

use heapless::FnvIndexMap;

use crate::error::LedError;
use crate::primitive::Painter;
use crate::token::Step;

pub use music::{Cue, MUSIC_TIMELINE};
pub use party::sweep_color;

const EFFECT_NAME_BOOT: &str = "boot";
const EFFECT_NAME_CALL_NOTIFICATION: &str = "call_notification";
const EFFECT_NAME_NOTIFICATION: &str = "notification";
const EFFECT_NAME_MUSIC: &str = "music";
const EFFECT_NAME_BLUETOOTH_CONNECTING: &str = "bluetooth_connecting";
const EFFECT_NAME_BLUETOOTH_CONNECTED: &str = "bluetooth_connected";
const EFFECT_NAME_BLUETOOTH_FAILED: &str = "bluetooth_failed";
const EFFECT_NAME_WIFI_CONNECTING: &str = "wifi_connecting";
const EFFECT_NAME_WIFI_CONNECTED: &str = "wifi_connected";
const EFFECT_NAME_WIFI_FAILED: &str = "wifi_failed";
const EFFECT_NAME_PARTY: &str = "party";
const EFFECT_NAME_CHARGING_LOW_BATTERY: &str = "charging_low_battery";
const EFFECT_NAME_CHARGING_HIGH_BATTERY: &str = "charging_high_battery";
const EFFECT_NAME_CHARGING_COMPLETE: &str = "charging_complete";
const EFFECT_NAME_CAMERA_FOCUS: &str = "camera_focus";
const EFFECT_NAME_CAMERA_CAPTURE: &str = "camera_capture";
const EFFECT_NAME_CAMERA_SAVE_PHOTO: &str = "camera_save_photo";

const EFFECT_ID_BOOT: u8 = 0;
const EFFECT_ID_CALL_NOTIFICATION: u8 = 1;
const EFFECT_ID_NOTIFICATION: u8 = 2;
const EFFECT_ID_MUSIC: u8 = 3;
const EFFECT_ID_BLUETOOTH_CONNECTING: u8 = 4;
const EFFECT_ID_BLUETOOTH_CONNECTED: u8 = 5;
const EFFECT_ID_BLUETOOTH_FAILED: u8 = 6;
const EFFECT_ID_WIFI_CONNECTING: u8 = 7;
const EFFECT_ID_WIFI_CONNECTED: u8 = 8;
const EFFECT_ID_WIFI_FAILED: u8 = 9;
const EFFECT_ID_PARTY: u8 = 10;
const EFFECT_ID_CHARGING_LOW_BATTERY: u8 = 11;
const EFFECT_ID_CHARGING_HIGH_BATTERY: u8 = 12;
const EFFECT_ID_CHARGING_COMPLETE: u8 = 13;
const EFFECT_ID_CAMERA_FOCUS: u8 = 14;
const EFFECT_ID_CAMERA_CAPTURE: u8 = 15;
const EFFECT_ID_CAMERA_SAVE_PHOTO: u8 = 16;

/// Capacity of an [`EffectCatalog`]
pub const CATALOG_CAPACITY: usize = 32;

/// Known effect ids that can be requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EffectId {
    Boot = EFFECT_ID_BOOT,
    CallNotification = EFFECT_ID_CALL_NOTIFICATION,
    Notification = EFFECT_ID_NOTIFICATION,
    Music = EFFECT_ID_MUSIC,
    BluetoothConnecting = EFFECT_ID_BLUETOOTH_CONNECTING,
    BluetoothConnected = EFFECT_ID_BLUETOOTH_CONNECTED,
    BluetoothFailed = EFFECT_ID_BLUETOOTH_FAILED,
    WifiConnecting = EFFECT_ID_WIFI_CONNECTING,
    WifiConnected = EFFECT_ID_WIFI_CONNECTED,
    WifiFailed = EFFECT_ID_WIFI_FAILED,
    Party = EFFECT_ID_PARTY,
    ChargingLowBattery = EFFECT_ID_CHARGING_LOW_BATTERY,
    ChargingHighBattery = EFFECT_ID_CHARGING_HIGH_BATTERY,
    ChargingComplete = EFFECT_ID_CHARGING_COMPLETE,
    CameraFocus = EFFECT_ID_CAMERA_FOCUS,
    CameraCapture = EFFECT_ID_CAMERA_CAPTURE,
    CameraSavePhoto = EFFECT_ID_CAMERA_SAVE_PHOTO,
}

impl EffectId {
    /// Every effect, in raw id order
    pub const ALL: [Self; 17] = [
        Self::Boot,
        Self::CallNotification,
        Self::Notification,
        Self::Music,
        Self::BluetoothConnecting,
        Self::BluetoothConnected,
        Self::BluetoothFailed,
        Self::WifiConnecting,
        Self::WifiConnected,
        Self::WifiFailed,
        Self::Party,
        Self::ChargingLowBattery,
        Self::ChargingHighBattery,
        Self::ChargingComplete,
        Self::CameraFocus,
        Self::CameraCapture,
        Self::CameraSavePhoto,
    ];

    pub fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            EFFECT_ID_BOOT => Self::Boot,
            EFFECT_ID_CALL_NOTIFICATION => Self::CallNotification,
            EFFECT_ID_NOTIFICATION => Self::Notification,
            EFFECT_ID_MUSIC => Self::Music,
            EFFECT_ID_BLUETOOTH_CONNECTING => Self::BluetoothConnecting,
            EFFECT_ID_BLUETOOTH_CONNECTED => Self::BluetoothConnected,
            EFFECT_ID_BLUETOOTH_FAILED => Self::BluetoothFailed,
            EFFECT_ID_WIFI_CONNECTING => Self::WifiConnecting,
            EFFECT_ID_WIFI_CONNECTED => Self::WifiConnected,
            EFFECT_ID_WIFI_FAILED => Self::WifiFailed,
            EFFECT_ID_PARTY => Self::Party,
            EFFECT_ID_CHARGING_LOW_BATTERY => Self::ChargingLowBattery,
            EFFECT_ID_CHARGING_HIGH_BATTERY => Self::ChargingHighBattery,
            EFFECT_ID_CHARGING_COMPLETE => Self::ChargingComplete,
            EFFECT_ID_CAMERA_FOCUS => Self::CameraFocus,
            EFFECT_ID_CAMERA_CAPTURE => Self::CameraCapture,
            EFFECT_ID_CAMERA_SAVE_PHOTO => Self::CameraSavePhoto,
            _ => return None,
        })
    }

    pub const fn raw(self) -> u8 {
        self as u8
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boot => EFFECT_NAME_BOOT,
            Self::CallNotification => EFFECT_NAME_CALL_NOTIFICATION,
            Self::Notification => EFFECT_NAME_NOTIFICATION,
            Self::Music => EFFECT_NAME_MUSIC,
            Self::BluetoothConnecting => EFFECT_NAME_BLUETOOTH_CONNECTING,
            Self::BluetoothConnected => EFFECT_NAME_BLUETOOTH_CONNECTED,
            Self::BluetoothFailed => EFFECT_NAME_BLUETOOTH_FAILED,
            Self::WifiConnecting => EFFECT_NAME_WIFI_CONNECTING,
            Self::WifiConnected => EFFECT_NAME_WIFI_CONNECTED,
            Self::WifiFailed => EFFECT_NAME_WIFI_FAILED,
            Self::Party => EFFECT_NAME_PARTY,
            Self::ChargingLowBattery => EFFECT_NAME_CHARGING_LOW_BATTERY,
            Self::ChargingHighBattery => EFFECT_NAME_CHARGING_HIGH_BATTERY,
            Self::ChargingComplete => EFFECT_NAME_CHARGING_COMPLETE,
            Self::CameraFocus => EFFECT_NAME_CAMERA_FOCUS,
            Self::CameraCapture => EFFECT_NAME_CAMERA_CAPTURE,
            Self::CameraSavePhoto => EFFECT_NAME_CAMERA_SAVE_PHOTO,
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == s)
    }
}

impl core::fmt::Display for EffectId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of an effect: runs to completion or until its painter is canceled
pub type EffectBody = Arc<dyn Fn(&Painter<'_>) -> Step + Send + Sync>;

/// Registry of effect bodies keyed by [`EffectId`]
#[derive(Clone, Default)]
pub struct EffectCatalog {
    bodies: FnvIndexMap<EffectId, EffectBody, CATALOG_CAPACITY>,
}

impl EffectCatalog {
    /// An empty catalog; every start will be rejected until bodies are added
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with every built-in effect registered
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for id in EffectId::ALL {
            let inserted = catalog.insert(id, builtin_body(id));
            debug_assert!(inserted.is_ok(), "catalog capacity below built-in count");
        }
        catalog
    }

    /// Register `body` for `id`, replacing any previous body
    pub fn register<F>(&mut self, id: EffectId, body: F) -> Result<(), LedError>
    where
        F: Fn(&Painter<'_>) -> Step + Send + Sync + 'static,
    {
        self.insert(id, Arc::new(body))
    }

    fn insert(&mut self, id: EffectId, body: EffectBody) -> Result<(), LedError> {
        self.bodies
            .insert(id, body)
            .map(|_| ())
            .map_err(|_| LedError::CatalogFull(id))
    }

    pub fn get(&self, id: EffectId) -> Option<EffectBody> {
        self.bodies.get(&id).cloned()
    }

    pub fn contains(&self, id: EffectId) -> bool {
        self.bodies.contains_key(&id)
    }

    /// Registered ids, in registration order
    pub fn ids(&self) -> impl Iterator<Item = EffectId> + '_ {
        self.bodies.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

impl core::fmt::Debug for EffectCatalog {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}

fn builtin_body(id: EffectId) -> EffectBody {
    match id {
        EffectId::Boot => Arc::new(status::boot),
        EffectId::CallNotification => Arc::new(status::call_notification),
        EffectId::Notification => Arc::new(status::notification),
        EffectId::Music => Arc::new(music::music),
        EffectId::BluetoothConnecting => Arc::new(status::bluetooth_connecting),
        EffectId::BluetoothConnected => Arc::new(status::bluetooth_connected),
        EffectId::BluetoothFailed => Arc::new(status::bluetooth_failed),
        EffectId::WifiConnecting => Arc::new(status::wifi_connecting),
        EffectId::WifiConnected => Arc::new(status::wifi_connected),
        EffectId::WifiFailed => Arc::new(status::wifi_failed),
        EffectId::Party => Arc::new(party::party),
        EffectId::ChargingLowBattery => Arc::new(status::charging_low_battery),
        EffectId::ChargingHighBattery => Arc::new(status::charging_high_battery),
        EffectId::ChargingComplete => Arc::new(status::charging_complete),
        EffectId::CameraFocus => Arc::new(status::camera_focus),
        EffectId::CameraCapture => Arc::new(status::camera_capture),
        EffectId::CameraSavePhoto => Arc::new(status::camera_save_photo),
    }
}
