#![allow(clippy::needless_pass_by_value)]

use std::sync::Arc;

use crate::error::CommandError;
use crate::registry::params::BookCabParams;
use crate::response::CommandResponse;
use crate::state::AssistState;

pub fn book_cab(state: &Arc<AssistState>, p: BookCabParams) -> Result<CommandResponse, CommandError> {
    let rides = &state.capabilities.rides;
    let app = p.app.display_name();
    if !rides.is_installed(p.app) {
        return Ok(CommandResponse::failure(format!(
            "{app} is not installed on this device"
        )));
    }
    rides.request_ride(p.app, &p.destination)?;
    Ok(CommandResponse::success(format!(
        "Opened {app} to book a ride to {}",
        p.destination
    )))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::device::sim::{SimState, SimulatedDevice};
    use crate::device::{CabApp, Capabilities};
    use crate::settings::EngineSettings;

    fn setup(sim: SimState) -> (Arc<AssistState>, Arc<SimulatedDevice>) {
        let device = Arc::new(SimulatedDevice::new(sim));
        let state = AssistState::new(
            Capabilities::from_device(&device),
            EngineSettings::default(),
            None,
        );
        (state, device)
    }

    fn ride(app: CabApp) -> BookCabParams {
        BookCabParams {
            app,
            destination: "Airport Terminal 2".into(),
        }
    }

    #[test]
    fn test_book_cab_with_installed_app() {
        let (state, device) = setup(SimState::default());
        let r = book_cab(&state, ride(CabApp::Uber)).unwrap();
        assert!(r.is_success, "{}", r.message);
        assert_eq!(r.message, "Opened Uber to book a ride to Airport Terminal 2");
        assert_eq!(
            device.snapshot().rides,
            vec![(CabApp::Uber, "Airport Terminal 2".to_string())]
        );
    }

    #[test]
    fn test_book_cab_app_not_installed() {
        let (state, device) = setup(SimState::default());
        let r = book_cab(&state, ride(CabApp::Ola)).unwrap();
        assert!(!r.is_success);
        assert!(r.get_response);
        assert_eq!(r.message, "Ola is not installed on this device");
        assert!(device.snapshot().rides.is_empty());
    }
}
