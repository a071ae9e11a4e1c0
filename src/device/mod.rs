//! Device-control capabilities the command handlers drive.
//!
//! Each trait is a narrow seam over one platform service. Handlers receive
//! them injected through [`Capabilities`]; nothing here owns platform state.

pub mod sim;

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::registry::validation::Amount;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("{0} is unavailable on this device")]
    Unavailable(String),
    #[error("{0}")]
    Rejected(String),
    #[error("platform error: {0}")]
    Platform(String),
}

// ── Domain enums ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettingKind {
    Wifi,
    MobileData,
    Bluetooth,
    Torch,
}

impl SettingKind {
    pub fn all() -> &'static [SettingKind] {
        &[Self::Wifi, Self::MobileData, Self::Bluetooth, Self::Torch]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Wifi => "Wi-Fi",
            Self::MobileData => "Mobile data",
            Self::Bluetooth => "Bluetooth",
            Self::Torch => "Torch",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentApp {
    Gpay,
    Phonepe,
    Paytm,
}

impl PaymentApp {
    pub fn all() -> &'static [PaymentApp] {
        &[Self::Gpay, Self::Phonepe, Self::Paytm]
    }

    pub fn package(self) -> &'static str {
        match self {
            Self::Gpay => "com.google.android.apps.nbu.paisa.user",
            Self::Phonepe => "com.phonepe.app",
            Self::Paytm => "net.one97.paytm",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Gpay => "Google Pay",
            Self::Phonepe => "PhonePe",
            Self::Paytm => "Paytm",
        }
    }

    pub fn from_package(package: &str) -> Option<PaymentApp> {
        Self::all().iter().copied().find(|app| app.package() == package)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CabApp {
    Uber,
    Ola,
}

impl CabApp {
    pub fn all() -> &'static [CabApp] {
        &[Self::Uber, Self::Ola]
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Uber => "Uber",
            Self::Ola => "Ola",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    pub uri: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackStatus {
    Idle,
    Playing,
    Paused,
}

// ── Capability traits ───────────────────────────────────────────

pub trait Connectivity: Send + Sync {
    fn is_enabled(&self, setting: SettingKind) -> Result<bool, DeviceError>;
    fn set_torch(&self, on: bool) -> Result<(), DeviceError>;
    fn set_bluetooth(&self, on: bool) -> Result<(), DeviceError>;
    /// Open the system panel for a setting apps cannot toggle directly.
    fn open_panel(&self, setting: SettingKind) -> Result<(), DeviceError>;
}

pub trait Payments: Send + Sync {
    /// Installed and signed in, able to take a payment intent.
    fn is_ready(&self, app: PaymentApp) -> bool;
    fn open_link(&self, app: PaymentApp, uri: &str) -> Result<(), DeviceError>;
    /// Open the app's scanner with `amount` prefilled for the scanned payee.
    fn open_scanner(&self, app: PaymentApp, amount: Amount) -> Result<(), DeviceError>;
}

pub trait Audio: Send + Sync {
    /// Highest step of the media stream.
    fn max_volume(&self) -> u32;
    fn set_volume(&self, level: u32) -> Result<(), DeviceError>;
}

pub trait Telephony: Send + Sync {
    /// Exact name first, then a unique prefix. `Ok(None)` when nothing matches.
    fn find_contact(&self, name: &str) -> Result<Option<Contact>, DeviceError>;
    fn dial(&self, number: &str) -> Result<(), DeviceError>;
    fn is_ringing(&self) -> bool;
    fn answer(&self) -> Result<(), DeviceError>;
    fn decline(&self) -> Result<(), DeviceError>;
}

pub trait AlarmClock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
    fn schedule(&self, at: NaiveDateTime, label: &str) -> Result<(), DeviceError>;
}

pub trait MediaLibrary: Send + Sync {
    fn tracks(&self) -> Vec<Track>;
}

pub trait MusicPlayer: Send + Sync {
    fn status(&self) -> PlaybackStatus;
    fn play(&self, track: &Track) -> Result<(), DeviceError>;
    /// Flip between playing and paused; returns the new status.
    fn toggle(&self) -> Result<PlaybackStatus, DeviceError>;
    fn stop(&self) -> Result<(), DeviceError>;
}

pub trait RideHailing: Send + Sync {
    fn is_installed(&self, app: CabApp) -> bool;
    fn request_ride(&self, app: CabApp, destination: &str) -> Result<(), DeviceError>;
}

/// Every capability a command may need, injected into the registry.
#[derive(Clone)]
pub struct Capabilities {
    pub connectivity: Arc<dyn Connectivity>,
    pub payments: Arc<dyn Payments>,
    pub audio: Arc<dyn Audio>,
    pub telephony: Arc<dyn Telephony>,
    pub alarms: Arc<dyn AlarmClock>,
    pub media: Arc<dyn MediaLibrary>,
    pub player: Arc<dyn MusicPlayer>,
    pub rides: Arc<dyn RideHailing>,
}

impl Capabilities {
    /// Use one object for every capability.
    pub fn from_device<D>(device: &Arc<D>) -> Self
    where
        D: Connectivity
            + Payments
            + Audio
            + Telephony
            + AlarmClock
            + MediaLibrary
            + MusicPlayer
            + RideHailing
            + 'static,
    {
        Self {
            connectivity: Arc::clone(device) as Arc<dyn Connectivity>,
            payments: Arc::clone(device) as Arc<dyn Payments>,
            audio: Arc::clone(device) as Arc<dyn Audio>,
            telephony: Arc::clone(device) as Arc<dyn Telephony>,
            alarms: Arc::clone(device) as Arc<dyn AlarmClock>,
            media: Arc::clone(device) as Arc<dyn MediaLibrary>,
            player: Arc::clone(device) as Arc<dyn MusicPlayer>,
            rides: Arc::clone(device) as Arc<dyn RideHailing>,
        }
    }
}
