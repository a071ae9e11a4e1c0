//! In-memory device used by the CLI and tests.
//!
//! When an observer event sender is attached, the simulation emits the UI
//! events a phone would produce as panels, payment apps and scanners open, so
//! routine flows run end to end without hardware.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{
    AlarmClock, Audio, CabApp, Connectivity, Contact, DeviceError, MediaLibrary, MusicPlayer,
    PaymentApp, Payments, PlaybackStatus, RideHailing, SettingKind, Telephony, Track,
};
use crate::observer::{AutomationObserver, GlobalAction, GlobalActions, UiEvent, SETTINGS_PACKAGE};
use crate::registry::validation::Amount;
use crate::state::AssistState;

/// Delay between the scanner closing and the payment app reporting success.
const PAYMENT_CONFIRMATION_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Clone)]
pub struct SimState {
    pub wifi: bool,
    pub mobile_data: bool,
    pub bluetooth: bool,
    pub torch: bool,
    pub volume: u32,
    pub max_volume: u32,
    pub contacts: Vec<Contact>,
    /// Contacts provider permission granted.
    pub contacts_readable: bool,
    pub dialed: Vec<String>,
    pub ringing: bool,
    pub answered_calls: u32,
    pub declined_calls: u32,
    pub now: NaiveDateTime,
    pub alarms: Vec<(NaiveDateTime, String)>,
    pub tracks: Vec<Track>,
    pub playback: PlaybackStatus,
    pub now_playing: Option<Track>,
    pub ready_apps: Vec<PaymentApp>,
    pub opened_links: Vec<(PaymentApp, String)>,
    pub scanners_opened: Vec<(PaymentApp, Amount)>,
    pub payments_confirmed: u32,
    pub installed_cabs: Vec<CabApp>,
    pub rides: Vec<(CabApp, String)>,
    pub panels_opened: Vec<SettingKind>,
    pub clicks: Vec<String>,
    pub back_presses: u32,
    /// Let payment apps finish QR payments on their own.
    pub auto_confirm_payments: bool,
    /// Scanner screens open but never show up as UI events.
    pub unresponsive_scanners: bool,
    /// Settings panels open but never show up as UI events.
    pub unresponsive_panels: bool,
}

impl Default for SimState {
    fn default() -> Self {
        let now = NaiveDate::from_ymd_opt(2025, 3, 1)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .unwrap_or_default();
        let contact = |name: &str, number: &str| Contact {
            name: name.to_string(),
            number: number.to_string(),
        };
        let track = |title: &str, uri: &str| Track {
            title: title.to_string(),
            uri: uri.to_string(),
        };
        Self {
            wifi: false,
            mobile_data: true,
            bluetooth: false,
            torch: false,
            volume: 5,
            max_volume: 15,
            contacts: vec![
                contact("Mom", "+919876500001"),
                contact("Dad", "+919876500002"),
                contact("John Smith", "+14155550123"),
            ],
            contacts_readable: true,
            dialed: Vec::new(),
            ringing: false,
            answered_calls: 0,
            declined_calls: 0,
            now,
            alarms: Vec::new(),
            tracks: vec![
                track("Bohemian Rhapsody", "media://tracks/1"),
                track("Hotel California", "media://tracks/2"),
                track("Shape of You", "media://tracks/3"),
                track("Blinding Lights", "media://tracks/4"),
            ],
            playback: PlaybackStatus::Idle,
            now_playing: None,
            ready_apps: vec![PaymentApp::Gpay, PaymentApp::Phonepe],
            opened_links: Vec::new(),
            scanners_opened: Vec::new(),
            payments_confirmed: 0,
            installed_cabs: vec![CabApp::Uber],
            rides: Vec::new(),
            panels_opened: Vec::new(),
            clicks: Vec::new(),
            back_presses: 0,
            auto_confirm_payments: true,
            unresponsive_scanners: false,
            unresponsive_panels: false,
        }
    }
}

#[derive(Default)]
pub struct SimulatedDevice {
    state: Mutex<SimState>,
    events: Mutex<Option<mpsc::UnboundedSender<UiEvent>>>,
}

impl SimulatedDevice {
    pub fn new(state: SimState) -> Self {
        Self {
            state: Mutex::new(state),
            events: Mutex::new(None),
        }
    }

    /// Route emitted UI events to an observer.
    pub fn attach_observer(&self, events: mpsc::UnboundedSender<UiEvent>) {
        *self.events.lock() = Some(events);
    }

    /// Attach a reference observer driving `state`'s routine channels, so
    /// routine-backed commands complete against this device.
    pub fn start_observer(self: &Arc<Self>, state: &AssistState) -> JoinHandle<()> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.attach_observer(tx);
        AutomationObserver::new(
            state.routines.clone(),
            Arc::clone(self) as Arc<dyn GlobalActions>,
            state.settings.back_navigation_delay(),
        )
        .spawn(rx)
    }

    /// Snapshot of the simulated device.
    pub fn snapshot(&self) -> SimState {
        self.state.lock().clone()
    }

    pub fn with_state_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut SimState) -> R,
    {
        let mut guard = self.state.lock();
        f(&mut guard)
    }

    fn emit(&self, event: UiEvent) {
        if let Some(tx) = self.events.lock().as_ref() {
            let _ = tx.send(event);
        }
    }

    fn emit_later(&self, event: UiEvent, delay: Duration) {
        let Some(tx) = self.events.lock().clone() else {
            return;
        };
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = tx.send(event);
            });
        } else {
            let _ = tx.send(event);
        }
    }
}

impl Connectivity for SimulatedDevice {
    fn is_enabled(&self, setting: SettingKind) -> Result<bool, DeviceError> {
        let s = self.state.lock();
        Ok(match setting {
            SettingKind::Wifi => s.wifi,
            SettingKind::MobileData => s.mobile_data,
            SettingKind::Bluetooth => s.bluetooth,
            SettingKind::Torch => s.torch,
        })
    }

    fn set_torch(&self, on: bool) -> Result<(), DeviceError> {
        self.state.lock().torch = on;
        Ok(())
    }

    fn set_bluetooth(&self, on: bool) -> Result<(), DeviceError> {
        self.state.lock().bluetooth = on;
        Ok(())
    }

    fn open_panel(&self, setting: SettingKind) -> Result<(), DeviceError> {
        let class_name = match setting {
            SettingKind::Wifi => "com.android.settings.panel.WifiPanel",
            SettingKind::MobileData => "com.android.settings.panel.InternetPanel",
            SettingKind::Bluetooth | SettingKind::Torch => {
                return Err(DeviceError::Unavailable(format!("{} panel", setting.label())));
            }
        };
        let unresponsive = {
            let mut s = self.state.lock();
            s.panels_opened.push(setting);
            s.unresponsive_panels
        };
        if !unresponsive {
            self.emit(UiEvent::new(SETTINGS_PACKAGE, class_name, &[setting.label()]));
        }
        Ok(())
    }
}

impl GlobalActions for SimulatedDevice {
    fn click(&self, text: &str) -> bool {
        let mut s = self.state.lock();
        s.clicks.push(text.to_string());
        match text {
            "Wi-Fi" => s.wifi = !s.wifi,
            "Mobile data" => s.mobile_data = !s.mobile_data,
            "Proceed to pay" | "Proceed" | "Pay" => s.payments_confirmed += 1,
            _ => return false,
        }
        true
    }

    fn perform(&self, action: GlobalAction) -> bool {
        if action == GlobalAction::Back {
            self.state.lock().back_presses += 1;
        }
        true
    }
}

impl Payments for SimulatedDevice {
    fn is_ready(&self, app: PaymentApp) -> bool {
        self.state.lock().ready_apps.contains(&app)
    }

    fn open_link(&self, app: PaymentApp, uri: &str) -> Result<(), DeviceError> {
        if !self.is_ready(app) {
            return Err(DeviceError::Unavailable(app.display_name().to_string()));
        }
        self.state.lock().opened_links.push((app, uri.to_string()));
        let activity = format!("{}.PaymentActivity", app.package());
        self.emit(UiEvent::new(app.package(), activity, &["Proceed to pay"]));
        Ok(())
    }

    fn open_scanner(&self, app: PaymentApp, amount: Amount) -> Result<(), DeviceError> {
        if !self.is_ready(app) {
            return Err(DeviceError::Unavailable(app.display_name().to_string()));
        }
        let (auto_confirm, unresponsive) = {
            let mut s = self.state.lock();
            s.scanners_opened.push((app, amount));
            (s.auto_confirm_payments, s.unresponsive_scanners)
        };
        let package = app.package();
        if !unresponsive {
            let prefilled = format!("₹{amount}");
            self.emit(UiEvent::new(package, format!("{package}.ScanActivity"), &["Scan any QR code"]));
            self.emit(UiEvent::new(
                package,
                format!("{package}.AmountActivity"),
                &["Enter amount", prefilled.as_str()],
            ));
        }
        if auto_confirm {
            self.emit_later(
                UiEvent::new(package, format!("{package}.SuccessActivity"), &["Payment successful"]),
                PAYMENT_CONFIRMATION_DELAY,
            );
        }
        Ok(())
    }
}

impl Audio for SimulatedDevice {
    fn max_volume(&self) -> u32 {
        self.state.lock().max_volume
    }

    fn set_volume(&self, level: u32) -> Result<(), DeviceError> {
        let mut s = self.state.lock();
        if level > s.max_volume {
            return Err(DeviceError::Rejected(format!(
                "volume step {level} exceeds maximum {}",
                s.max_volume
            )));
        }
        s.volume = level;
        Ok(())
    }
}

impl Telephony for SimulatedDevice {
    fn find_contact(&self, name: &str) -> Result<Option<Contact>, DeviceError> {
        let s = self.state.lock();
        if !s.contacts_readable {
            return Err(DeviceError::Unavailable("Contacts access".to_string()));
        }
        if let Some(c) = s.contacts.iter().find(|c| c.name.eq_ignore_ascii_case(name)) {
            return Ok(Some(c.clone()));
        }
        let needle = name.to_lowercase();
        let mut prefixed = s
            .contacts
            .iter()
            .filter(|c| c.name.to_lowercase().starts_with(&needle));
        match (prefixed.next(), prefixed.next()) {
            (Some(only), None) => Ok(Some(only.clone())),
            _ => Ok(None),
        }
    }

    fn dial(&self, number: &str) -> Result<(), DeviceError> {
        self.state.lock().dialed.push(number.to_string());
        Ok(())
    }

    fn is_ringing(&self) -> bool {
        self.state.lock().ringing
    }

    fn answer(&self) -> Result<(), DeviceError> {
        let mut s = self.state.lock();
        if !s.ringing {
            return Err(DeviceError::Rejected("no ringing call".into()));
        }
        s.ringing = false;
        s.answered_calls += 1;
        Ok(())
    }

    fn decline(&self) -> Result<(), DeviceError> {
        let mut s = self.state.lock();
        if !s.ringing {
            return Err(DeviceError::Rejected("no ringing call".into()));
        }
        s.ringing = false;
        s.declined_calls += 1;
        Ok(())
    }
}

impl AlarmClock for SimulatedDevice {
    fn now(&self) -> NaiveDateTime {
        self.state.lock().now
    }

    fn schedule(&self, at: NaiveDateTime, label: &str) -> Result<(), DeviceError> {
        self.state.lock().alarms.push((at, label.to_string()));
        Ok(())
    }
}

impl MediaLibrary for SimulatedDevice {
    fn tracks(&self) -> Vec<Track> {
        self.state.lock().tracks.clone()
    }
}

impl MusicPlayer for SimulatedDevice {
    fn status(&self) -> PlaybackStatus {
        self.state.lock().playback
    }

    fn play(&self, track: &Track) -> Result<(), DeviceError> {
        let mut s = self.state.lock();
        s.now_playing = Some(track.clone());
        s.playback = PlaybackStatus::Playing;
        Ok(())
    }

    fn toggle(&self) -> Result<PlaybackStatus, DeviceError> {
        let mut s = self.state.lock();
        s.playback = match s.playback {
            PlaybackStatus::Idle => return Err(DeviceError::Rejected("nothing is loaded".into())),
            PlaybackStatus::Playing => PlaybackStatus::Paused,
            PlaybackStatus::Paused => PlaybackStatus::Playing,
        };
        Ok(s.playback)
    }

    fn stop(&self) -> Result<(), DeviceError> {
        let mut s = self.state.lock();
        s.playback = PlaybackStatus::Idle;
        s.now_playing = None;
        Ok(())
    }
}

impl RideHailing for SimulatedDevice {
    fn is_installed(&self, app: CabApp) -> bool {
        self.state.lock().installed_cabs.contains(&app)
    }

    fn request_ride(&self, app: CabApp, destination: &str) -> Result<(), DeviceError> {
        if !self.is_installed(app) {
            return Err(DeviceError::Unavailable(app.display_name().to_string()));
        }
        self.state.lock().rides.push((app, destination.to_string()));
        Ok(())
    }
}
