#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::sync::Arc;
use std::time::Duration;

use pocket_assist::device::sim::{SimState, SimulatedDevice};
use pocket_assist::device::Capabilities;
use pocket_assist::registry::CommandKind;
use pocket_assist::response::REMEDIATION_SUFFIX;
use pocket_assist::settings::{EngineSettings, RoutineTimeouts};
use pocket_assist::state::AssistState;
use pocket_assist::{Assistant, Engine};

struct Harness {
    engine: Engine,
    device: Arc<SimulatedDevice>,
    state: Arc<AssistState>,
}

fn harness_with(sim: SimState, settings: EngineSettings, observe: bool) -> Harness {
    let device = Arc::new(SimulatedDevice::new(sim));
    let state = AssistState::new(Capabilities::from_device(&device), settings, None);
    if observe {
        device.start_observer(&state);
    }
    Harness {
        engine: Engine::new(Arc::clone(&state)),
        device,
        state,
    }
}

fn harness() -> Harness {
    harness_with(SimState::default(), EngineSettings::default(), true)
}

#[tokio::test(start_paused = true)]
async fn well_formed_directives_succeed() {
    let cases = [
        "[setting(torch, on)]",
        "[setting(WIFI, ON)]",
        "[pay_upi(GPAY, 'grocer@okicici', 'Sharma Stores', 120.50)]",
        "[pay_qr(phonepe, 75)]",
        "[volume(35)]",
        "[call(Dad)]",
        "[call('+91 98765 43210')]",
        "[alarm('2025-03-02 06:30', \"Morning run\")]",
        "[play_music(hotel california)]",
        "[book_cab(uber, 'Terminal 2, Airport')]",
    ];
    for text in cases {
        let h = harness();
        let responses = h.engine.run(text).await;
        assert_eq!(responses.len(), 1, "{text}");
        let r = &responses[0];
        assert!(r.is_success, "{text}: {}", r.message);
        assert!(!r.message.is_empty());
    }
}

#[tokio::test]
async fn text_without_block_yields_no_responses() {
    let h = harness();
    for text in ["", "Sure thing!", "Use (parentheses) freely", "an unclosed [volume(4)"] {
        assert!(h.engine.run(text).await.is_empty(), "{text}");
    }
}

#[tokio::test]
async fn arity_mismatch_reports_counts() {
    let h = harness();
    let responses = h.engine.run("[volume(10,20)]").await;
    assert_eq!(responses.len(), 1);
    assert!(!responses[0].is_success);
    assert!(responses[0]
        .message
        .contains("Invalid number of arguments, required: 1, found: 2"));
    assert!(responses[0].message.ends_with(REMEDIATION_SUFFIX));
}

#[tokio::test]
async fn enumerated_rejection_lists_allowed_set() {
    let h = harness();
    let responses = h.engine.run("[setting(wifi,maybe)]").await;
    assert!(!responses[0].is_success);
    assert!(responses[0].message.contains("{ON, OFF}"));
    assert!(!h.state.routines.quick_settings().is_active());
}

#[tokio::test]
async fn chain_does_not_short_circuit_on_runtime_failure() {
    let h = harness();
    let responses = h.engine.run("[volume(50)->setting(bogus,on)]").await;
    assert_eq!(responses.len(), 2);
    assert!(responses[0].is_success);
    assert!(!responses[1].is_success);
    assert!(responses[1]
        .message
        .contains("{WIFI, MOBILE_DATA, BLUETOOTH, TORCH}"));
    assert_eq!(h.device.snapshot().volume, 8);
}

#[tokio::test]
async fn unknown_command_aborts_before_anything_runs() {
    let h = harness();
    let responses = h.engine.run("[volume(50) -> launch_rocket(now)]").await;
    assert_eq!(responses.len(), 1);
    assert!(responses[0].message.contains("launch_rocket"));
    assert_eq!(h.device.snapshot().volume, 5);
}

#[tokio::test]
async fn command_names_match_case_insensitively() {
    let h = harness();
    let responses = h.engine.run("[VOLUME(20) -> Setting(Torch, On)]").await;
    assert!(responses.iter().all(|r| r.is_success));
    assert!(h.device.snapshot().torch);
}

#[tokio::test(start_paused = true)]
async fn undetected_routine_reports_launch_failure() {
    let h = harness_with(SimState::default(), EngineSettings::default(), false);
    let started = tokio::time::Instant::now();
    let responses = h.engine.run("[setting(wifi, on)]").await;
    assert_eq!(responses[0].message.split('.').next(), Some("wifi could not be launched"));
    assert!(responses[0].get_response);
    assert!(started.elapsed() >= Duration::from_secs(5));
    assert!(started.elapsed() < Duration::from_secs(6));
    assert!(!h.state.routines.quick_settings().is_active());
}

#[tokio::test(start_paused = true)]
async fn unresolved_routine_reports_slow_completion() {
    // The payment screen is seen right away but never shows a proceed button.
    let h = harness_with(SimState::default(), EngineSettings::default(), false);
    let routine = Arc::clone(h.state.routines.payment());
    let watcher = tokio::spawn(async move {
        let mut rx = routine.subscribe();
        rx.wait_for(|p| !matches!(p, pocket_assist::routine::RoutinePhase::Idle))
            .await
            .unwrap();
        routine.observe();
    });

    let started = tokio::time::Instant::now();
    let responses = h
        .engine
        .run("[pay_upi(gpay, shop@okaxis, Shop, 10)]")
        .await;
    watcher.await.unwrap();
    assert!(responses[0]
        .message
        .starts_with("payment command took longer than expected, halting execution"));
    assert!(started.elapsed() >= Duration::from_secs(5));
    assert!(started.elapsed() < Duration::from_secs(6));
    assert!(!h.state.routines.payment().is_active());
}

#[tokio::test]
async fn matching_setting_state_never_arms_routine() {
    let h = harness_with(
        SimState {
            mobile_data: true,
            ..SimState::default()
        },
        EngineSettings::default(),
        false,
    );
    let responses = h.engine.run("[setting(mobile data, on)]").await;
    assert!(responses[0].is_success);
    assert!(!h.state.routines.quick_settings().is_active());
    assert!(h.device.snapshot().panels_opened.is_empty());
}

#[tokio::test(start_paused = true)]
async fn concurrent_issuers_on_one_channel_are_rejected() {
    let mut settings = EngineSettings::default();
    settings.routines.quick_settings = RoutineTimeouts::new(1_000, 1_000);
    let h = harness_with(SimState::default(), settings, false);

    let first = {
        let engine = h.engine.clone();
        tokio::spawn(async move { engine.run("[setting(wifi, on)]").await })
    };
    tokio::task::yield_now().await;
    let second = h.engine.run("[setting(mobile_data, off)]").await;
    assert_eq!(
        second[0].message.split('.').next(),
        Some("mobile-data is busy with another command")
    );
    let first = first.await.unwrap();
    assert!(first[0].message.starts_with("wifi could not be launched"));
}

#[test]
fn usage_strings_cover_every_kind() {
    let h = harness_with(SimState::default(), EngineSettings::default(), false);
    let usages = h.engine.registry().all_usage_strings();
    assert_eq!(usages.len(), CommandKind::all().len());
    let expected_sets = [
        "WIFI|MOBILE_DATA|BLUETOOTH|TORCH",
        "ON|OFF",
        "GPAY|PHONEPE|PAYTM",
        "ACCEPT|DECLINE",
        "TOGGLE|STOP",
        "UBER|OLA",
    ];
    for set in expected_sets {
        assert!(usages.iter().any(|u| u.contains(set)), "{set} missing");
    }
}

#[tokio::test(start_paused = true)]
async fn assistant_turn_forwards_and_requests_follow_up() {
    let h = harness();
    let assistant = Assistant::new(h.engine.clone());
    let outcome = assistant
        .handle_reply("Paying now. [pay_upi(paytm, a@b, A, 5) -> volume(10)] Done!")
        .await;
    assert_eq!(outcome.display_text, "Paying now. Done!");
    assert_eq!(outcome.responses.len(), 2);
    assert!(!outcome.responses[0].is_success);
    assert!(outcome.responses[1].is_success);
    assert_eq!(outcome.forwarded.len(), 2);
    assert!(outcome.request_new_turn);
}
