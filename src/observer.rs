//! Reference observer: the event-driven side of the routine rendezvous.
//!
//! It consumes UI events in order on its own task and reports progress of
//! launched flows back into the routine channels. Platform glue supplies the
//! events and the [`GlobalActions`] used to click and navigate.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::device::PaymentApp;
use crate::routine::RoutineHub;

pub const SETTINGS_PACKAGE: &str = "com.android.settings";

const PROCEED_LABELS: &[&str] = &["Proceed to pay", "Proceed", "Pay"];
const SUCCESS_TEXTS: &[&str] = &["payment successful", "paid successfully"];
const SCAN_TEXT: &str = "scan";

/// A window-state or content change reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiEvent {
    pub package: String,
    pub class_name: String,
    pub texts: Vec<String>,
}

impl UiEvent {
    pub fn new(package: impl Into<String>, class_name: impl Into<String>, texts: &[&str]) -> Self {
        Self {
            package: package.into(),
            class_name: class_name.into(),
            texts: texts.iter().map(ToString::to_string).collect(),
        }
    }

    /// A node whose text is exactly `label` (case-insensitive).
    fn has_label(&self, label: &str) -> bool {
        self.texts.iter().any(|t| t.trim().eq_ignore_ascii_case(label))
    }

    /// Any node whose text contains `needle` (case-insensitive).
    fn mentions(&self, needle: &str) -> bool {
        self.texts
            .iter()
            .any(|t| t.to_lowercase().contains(&needle.to_lowercase()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlobalAction {
    Back,
}

/// Platform primitives the observer uses to drive the foreground app.
pub trait GlobalActions: Send + Sync {
    /// Click the first clickable node labelled `text`. False if none was found.
    fn click(&self, text: &str) -> bool;
    fn perform(&self, action: GlobalAction) -> bool;
}

pub struct AutomationObserver {
    routines: RoutineHub,
    actions: Arc<dyn GlobalActions>,
    back_delay: Duration,
}

impl AutomationObserver {
    pub fn new(routines: RoutineHub, actions: Arc<dyn GlobalActions>, back_delay: Duration) -> Self {
        Self {
            routines,
            actions,
            back_delay,
        }
    }

    /// Process events until the sender side closes.
    pub fn spawn(self, mut events: mpsc::UnboundedReceiver<UiEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                self.handle(&event);
            }
            tracing::debug!("observer event stream closed");
        })
    }

    pub fn handle(&self, event: &UiEvent) {
        self.handle_quick_settings(event);
        self.handle_payment(event);
        self.handle_qr_scan(event);
        self.handle_upi_confirmation(event);
    }

    fn handle_quick_settings(&self, event: &UiEvent) {
        let routine = self.routines.quick_settings();
        if event.package != SETTINGS_PACKAGE || !event.class_name.ends_with("Panel") {
            return;
        }
        let Some(arming) = routine.observe() else {
            return;
        };
        if let Some(sub) = arming.sub {
            if !self.actions.click(sub.toggle_label()) {
                tracing::warn!(sub = sub.name(), "toggle not found on settings panel");
                return;
            }
        }
        routine.resolve();
        self.navigate_back_later();
    }

    fn handle_payment(&self, event: &UiEvent) {
        let routine = self.routines.payment();
        let Some(arming) = routine.armed() else {
            return;
        };
        if arming.package != Some(event.package.as_str()) {
            return;
        }
        routine.observe();
        if let Some(label) = PROCEED_LABELS.iter().find(|l| event.has_label(l)) {
            if self.actions.click(label) {
                routine.resolve();
            }
        }
    }

    fn handle_qr_scan(&self, event: &UiEvent) {
        let routine = self.routines.qr_scan();
        let Some(arming) = routine.armed() else {
            return;
        };
        if arming.package != Some(event.package.as_str()) {
            return;
        }
        if event.mentions(SCAN_TEXT) {
            routine.observe();
        } else if routine.phase() == crate::routine::RoutinePhase::Observed(arming) {
            routine.resolve();
        }
    }

    fn handle_upi_confirmation(&self, event: &UiEvent) {
        let routine = self.routines.upi_confirmation();
        let Some(arming) = routine.armed() else {
            return;
        };
        let expected = arming.package.or_else(|| {
            PaymentApp::from_package(&event.package).map(PaymentApp::package)
        });
        if expected != Some(event.package.as_str()) {
            return;
        }
        if SUCCESS_TEXTS.iter().any(|t| event.mentions(t)) {
            routine.observe();
            routine.resolve();
        }
    }

    fn navigate_back_later(&self) {
        let actions = Arc::clone(&self.actions);
        let delay = self.back_delay;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    actions.perform(GlobalAction::Back);
                });
            }
            Err(_) => {
                actions.perform(GlobalAction::Back);
            }
        }
    }
}
