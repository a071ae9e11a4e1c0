#![allow(clippy::needless_pass_by_value)]

use std::sync::Arc;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::CommandError;
use crate::registry::params::{PayQrParams, PayUpiParams};
use crate::response::CommandResponse;
use crate::routine::Arming;
use crate::state::AssistState;

/// Characters left as-is in UPI link query values.
const UPI_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'@')
    .remove(b'.')
    .remove(b'-')
    .remove(b'_');

fn encode(value: &str) -> String {
    utf8_percent_encode(value, UPI_VALUE).to_string()
}

/// `upi://pay` deep link for a payment to a UPI id.
pub fn upi_link(p: &PayUpiParams) -> String {
    format!(
        "upi://pay?pa={}&pn={}&am={}&cu=INR",
        encode(&p.upi_id),
        encode(&p.payee),
        p.amount
    )
}

fn not_ready(app: crate::device::PaymentApp) -> CommandResponse {
    CommandResponse::failure(format!(
        "{} is not ready to make payments on this device",
        app.display_name()
    ))
}

pub async fn pay_upi(
    state: &Arc<AssistState>,
    p: PayUpiParams,
) -> Result<CommandResponse, CommandError> {
    let payments = &state.capabilities.payments;
    if !payments.is_ready(p.app) {
        return Ok(not_ready(p.app));
    }

    let link = upi_link(&p);
    let app = p.app;
    let launcher = Arc::clone(payments);
    let response = state
        .routines
        .payment()
        .run(Arming::package(app.package()), move || {
            if let Err(e) = launcher.open_link(app, &link) {
                tracing::warn!(app = app.display_name(), error = %e, "failed to open payment link");
            }
        })
        .await;

    if !response.is_success {
        return Ok(response);
    }
    Ok(CommandResponse::success(format!(
        "Payment of ₹{} to {} submitted in {}",
        p.amount,
        p.payee,
        app.display_name()
    )))
}

/// Scan-and-pay: the QR-scan routine runs in the background while the
/// UPI-confirmation routine is awaited here.
pub async fn pay_qr(
    state: &Arc<AssistState>,
    p: PayQrParams,
) -> Result<CommandResponse, CommandError> {
    let payments = &state.capabilities.payments;
    if !payments.is_ready(p.app) {
        return Ok(not_ready(p.app));
    }

    let app = p.app;
    let amount = p.amount;
    let qr_routine = Arc::clone(state.routines.qr_scan());
    let scanner = Arc::clone(payments);
    let qr_task = tokio::spawn(async move {
        qr_routine
            .run(Arming::package(app.package()), move || {
                if let Err(e) = scanner.open_scanner(app, amount) {
                    tracing::warn!(app = app.display_name(), error = %e, "failed to open QR scanner");
                }
            })
            .await
    });

    let confirmation = state
        .routines
        .upi_confirmation()
        .run(Arming::package(app.package()), || {})
        .await;

    if !confirmation.is_success {
        qr_task.abort();
        return Ok(confirmation);
    }

    match qr_task.await {
        Ok(scan) => {
            tracing::debug!(scan_success = scan.is_success, "QR scan routine finished");
            Ok(CommandResponse::success(format!(
                "Payment of ₹{} completed with {}",
                p.amount,
                app.display_name()
            )))
        }
        Err(e) => Err(CommandError::Operational(format!(
            "QR scan did not produce a result: {e}"
        ))),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::device::sim::{SimState, SimulatedDevice};
    use crate::device::{Capabilities, DeviceError, PaymentApp, Payments};
    use crate::registry::execute::CommandHandler;
    use crate::registry::validation::Amount;
    use crate::registry::CommandKind;
    use crate::settings::EngineSettings;
    use tokio::time::{Duration, Instant};

    /// Hands the scan to the simulated app, then dies before reporting back.
    struct CrashingScanner(Arc<SimulatedDevice>);

    impl Payments for CrashingScanner {
        fn is_ready(&self, app: PaymentApp) -> bool {
            self.0.is_ready(app)
        }

        fn open_link(&self, app: PaymentApp, uri: &str) -> Result<(), DeviceError> {
            self.0.open_link(app, uri)
        }

        fn open_scanner(&self, app: PaymentApp, amount: Amount) -> Result<(), DeviceError> {
            self.0.open_scanner(app, amount)?;
            panic!("scanner service crashed");
        }
    }

    fn setup(sim: SimState) -> (Arc<AssistState>, Arc<SimulatedDevice>) {
        let device = Arc::new(SimulatedDevice::new(sim));
        let state = AssistState::new(
            Capabilities::from_device(&device),
            EngineSettings::default(),
            None,
        );
        device.start_observer(&state);
        (state, device)
    }

    fn upi_params(app: PaymentApp) -> PayUpiParams {
        PayUpiParams {
            app,
            upi_id: "corner.store@okaxis".into(),
            payee: "Corner Store & Co".into(),
            amount: Amount::from_paise(25_050),
        }
    }

    #[test]
    fn test_upi_link_is_encoded() {
        assert_eq!(
            upi_link(&upi_params(PaymentApp::Gpay)),
            "upi://pay?pa=corner.store@okaxis&pn=Corner%20Store%20%26%20Co&am=250.50&cu=INR"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_pay_upi_clicks_proceed() {
        let (state, device) = setup(SimState::default());
        let r = pay_upi(&state, upi_params(PaymentApp::Gpay)).await.unwrap();
        assert!(r.is_success, "{}", r.message);
        let snap = device.snapshot();
        assert_eq!(snap.payments_confirmed, 1);
        assert_eq!(snap.opened_links.len(), 1);
        assert!(!state.routines.payment().is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pay_upi_app_not_ready() {
        let (state, device) = setup(SimState::default());
        let r = pay_upi(&state, upi_params(PaymentApp::Paytm)).await.unwrap();
        assert!(!r.is_success);
        assert!(r.message.contains("Paytm is not ready"));
        assert!(device.snapshot().opened_links.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pay_qr_waits_for_confirmation() {
        let (state, device) = setup(SimState::default());
        let p = PayQrParams {
            app: PaymentApp::Phonepe,
            amount: Amount::from_paise(10_000),
        };
        let r = pay_qr(&state, p).await.unwrap();
        assert!(r.is_success, "{}", r.message);
        assert_eq!(
            device.snapshot().scanners_opened,
            vec![(PaymentApp::Phonepe, Amount::from_paise(10_000))]
        );
        assert!(!state.routines.qr_scan().is_active());
        assert!(!state.routines.upi_confirmation().is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pay_qr_without_confirmation_times_out() {
        let (state, _device) = setup(SimState {
            auto_confirm_payments: false,
            ..SimState::default()
        });
        let p = PayQrParams {
            app: PaymentApp::Gpay,
            amount: Amount::from_paise(10_000),
        };
        let r = pay_qr(&state, p).await.unwrap();
        assert!(!r.is_success);
        assert_eq!(r.message, "upi-confirmation could not be launched");
        tokio::task::yield_now().await;
        assert!(!state.routines.qr_scan().is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pay_qr_passes_amount_to_scanner() {
        let (state, device) = setup(SimState::default());
        let p = PayQrParams {
            app: PaymentApp::Gpay,
            amount: Amount::from_paise(4_999),
        };
        let r = pay_qr(&state, p).await.unwrap();
        assert_eq!(r.message, "Payment of ₹49.99 completed with Google Pay");
        assert_eq!(
            device.snapshot().scanners_opened,
            vec![(PaymentApp::Gpay, Amount::from_paise(4_999))]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_pay_qr_confirmed_without_scanner_screen() {
        let (state, _device) = setup(SimState {
            unresponsive_scanners: true,
            ..SimState::default()
        });
        let p = PayQrParams {
            app: PaymentApp::Phonepe,
            amount: Amount::from_paise(10_000),
        };
        let start = Instant::now();
        let r = pay_qr(&state, p).await.unwrap();

        // The scan routine times out on its own; the confirmed payment stands.
        assert!(r.is_success, "{}", r.message);
        assert!(start.elapsed() >= Duration::from_secs(10));
        assert!(!state.routines.qr_scan().is_active());
        assert!(!state.routines.upi_confirmation().is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pay_qr_scan_task_failure_is_silent() {
        let device = Arc::new(SimulatedDevice::default());
        let mut capabilities = Capabilities::from_device(&device);
        capabilities.payments = Arc::new(CrashingScanner(Arc::clone(&device)));
        let state = AssistState::new(capabilities, EngineSettings::default(), None);
        device.start_observer(&state);

        let p = PayQrParams {
            app: PaymentApp::Gpay,
            amount: Amount::from_paise(10_000),
        };
        let err = pay_qr(&state, p).await.unwrap_err();
        assert!(matches!(err, CommandError::Operational(_)));
        assert!(!state.routines.qr_scan().is_active());

        let handler = CommandHandler::new(
            CommandKind::PayQr,
            vec!["GPAY".to_string(), "100".to_string()],
            Arc::clone(&state),
        );
        let r = handler.validate_and_execute().await;
        assert!(!r.is_success);
        assert!(!r.send_response);
        assert!(!r.get_response);
        assert!(r.message.starts_with("QR scan did not produce a result"));
    }
}
