use std::sync::Arc;

use crate::settings::RoutineSettings;

use super::{Routine, PAYMENT, QR_SCAN, QUICK_SETTINGS, UPI_CONFIRMATION};

/// The well-known automation channels, created once per process and shared
/// between command handlers and the observer.
#[derive(Debug, Clone)]
pub struct RoutineHub {
    quick_settings: Arc<Routine>,
    payment: Arc<Routine>,
    qr_scan: Arc<Routine>,
    upi_confirmation: Arc<Routine>,
}

impl RoutineHub {
    pub fn new(settings: &RoutineSettings) -> Self {
        Self {
            quick_settings: Arc::new(Routine::new(QUICK_SETTINGS, settings.quick_settings)),
            payment: Arc::new(Routine::new(PAYMENT, settings.payment)),
            qr_scan: Arc::new(Routine::new(QR_SCAN, settings.qr_scan)),
            upi_confirmation: Arc::new(Routine::new(UPI_CONFIRMATION, settings.upi_confirmation)),
        }
    }

    /// Parent channel for settings that must be flipped on the system panel.
    pub fn quick_settings(&self) -> &Arc<Routine> {
        &self.quick_settings
    }

    pub fn payment(&self) -> &Arc<Routine> {
        &self.payment
    }

    pub fn qr_scan(&self) -> &Arc<Routine> {
        &self.qr_scan
    }

    pub fn upi_confirmation(&self) -> &Arc<Routine> {
        &self.upi_confirmation
    }
}

impl Default for RoutineHub {
    fn default() -> Self {
        Self::new(&RoutineSettings::default())
    }
}
