//! Routine channels: a timeout-bounded rendezvous between a directive that
//! launches an external screen and the observer that watches it.
//!
//! Each channel is a small state machine held in a `watch` cell:
//!
//! ```text
//! Idle ──arm──▶ Armed ──observe──▶ Observed ──resolve──▶ Resolved
//!   ▲             │                   │                     │
//!   └─────────────┴──── issuer resets on every exit ────────┘
//! ```
//!
//! The issuer only arms and resets; the observer only moves forward from an
//! armed state, so it can never re-activate an idle channel.

pub mod hub;

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tokio::time::timeout;

use crate::response::CommandResponse;
use crate::settings::RoutineTimeouts;

pub use hub::RoutineHub;

pub const QUICK_SETTINGS: &str = "quick-settings";
pub const PAYMENT: &str = "payment";
pub const QR_SCAN: &str = "qr-scan";
pub const UPI_CONFIRMATION: &str = "upi-confirmation";

// ── Sub-routines ────────────────────────────────────────────────

/// Action gated under the quick-settings channel. Exactly one can be armed
/// at a time because it lives inside the channel's phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubRoutine {
    Wifi,
    MobileData,
}

impl SubRoutine {
    pub fn name(self) -> &'static str {
        match self {
            Self::Wifi => "wifi",
            Self::MobileData => "mobile-data",
        }
    }

    /// Label of the toggle the observer clicks on the settings panel.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Self::Wifi => "Wi-Fi",
            Self::MobileData => "Mobile data",
        }
    }
}

// ── Phase ───────────────────────────────────────────────────────

/// What the issuer armed the channel for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Arming {
    pub sub: Option<SubRoutine>,
    /// Package of the application the observer should watch, if any.
    pub package: Option<&'static str>,
}

impl Arming {
    pub fn sub(sub: SubRoutine) -> Self {
        Self {
            sub: Some(sub),
            package: None,
        }
    }

    pub fn package(package: &'static str) -> Self {
        Self {
            sub: None,
            package: Some(package),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoutinePhase {
    #[default]
    Idle,
    Armed(Arming),
    Observed(Arming),
    Resolved,
}

impl RoutinePhase {
    fn is_detected(self) -> bool {
        matches!(self, Self::Observed(_) | Self::Resolved)
    }
}

// ── Routine ─────────────────────────────────────────────────────

/// A named, process-wide automation channel.
pub struct Routine {
    name: &'static str,
    timeouts: RoutineTimeouts,
    state: watch::Sender<RoutinePhase>,
    session: Arc<tokio::sync::Mutex<()>>,
}

impl std::fmt::Debug for Routine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Routine")
            .field("name", &self.name)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

/// Returns the channel to `Idle` when the issuing side exits, however it exits.
struct ResetOnDrop<'a>(&'a watch::Sender<RoutinePhase>);

impl Drop for ResetOnDrop<'_> {
    fn drop(&mut self) {
        self.0.send_replace(RoutinePhase::Idle);
    }
}

impl Routine {
    pub fn new(name: &'static str, timeouts: RoutineTimeouts) -> Self {
        let (state, _) = watch::channel(RoutinePhase::Idle);
        Self {
            name,
            timeouts,
            state,
            session: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn timeouts(&self) -> RoutineTimeouts {
        self.timeouts
    }

    pub fn phase(&self) -> RoutinePhase {
        *self.state.borrow()
    }

    /// True from arming until the issuer resets the channel.
    pub fn is_active(&self) -> bool {
        self.phase() != RoutinePhase::Idle
    }

    pub fn subscribe(&self) -> watch::Receiver<RoutinePhase> {
        self.state.subscribe()
    }

    /// The arming of an in-flight invocation, if the channel is waiting on
    /// the observer.
    pub fn armed(&self) -> Option<Arming> {
        match self.phase() {
            RoutinePhase::Armed(a) | RoutinePhase::Observed(a) => Some(a),
            RoutinePhase::Idle | RoutinePhase::Resolved => None,
        }
    }

    // ── Observer side ──

    /// Report that the launched screen appeared. Only moves `Armed → Observed`;
    /// returns what the channel was armed for.
    pub fn observe(&self) -> Option<Arming> {
        let mut seen = None;
        self.state.send_if_modified(|phase| match *phase {
            RoutinePhase::Armed(arming) => {
                *phase = RoutinePhase::Observed(arming);
                seen = Some(arming);
                true
            }
            _ => false,
        });
        if seen.is_some() {
            tracing::debug!(routine = self.name, "routine observed");
        }
        seen
    }

    /// Report that the external flow finished. Only moves an armed or
    /// observed channel to `Resolved`.
    pub fn resolve(&self) -> bool {
        let resolved = self.state.send_if_modified(|phase| match *phase {
            RoutinePhase::Armed(_) | RoutinePhase::Observed(_) => {
                *phase = RoutinePhase::Resolved;
                true
            }
            _ => false,
        });
        if resolved {
            tracing::debug!(routine = self.name, "routine resolved");
        }
        resolved
    }

    // ── Issuer side ──

    /// Arm the channel, run `trigger`, and wait for the observer.
    ///
    /// Waits up to the detection window for the screen to be observed, then up
    /// to the completion window for the flow to resolve. Only one issuer may
    /// drive a channel at a time; a concurrent caller is turned away.
    pub async fn run<F>(&self, arming: Arming, trigger: F) -> CommandResponse
    where
        F: FnOnce(),
    {
        let label = arming.sub.map_or(self.name, SubRoutine::name);

        let Ok(_session) = Arc::clone(&self.session).try_lock_owned() else {
            tracing::warn!(routine = self.name, "routine busy, rejecting concurrent invocation");
            return CommandResponse::failure(format!("{label} is busy with another command"));
        };

        let mut rx = self.state.subscribe();
        let _reset = ResetOnDrop(&self.state);
        self.state.send_replace(RoutinePhase::Armed(arming));
        tracing::debug!(routine = self.name, ?arming, "routine armed");
        trigger();

        let detected = timeout(self.timeouts.detection(), async {
            rx.wait_for(|p| p.is_detected()).await.map(|p| *p)
        })
        .await;
        let phase = match detected {
            Ok(Ok(phase)) => phase,
            Ok(Err(_)) | Err(_) => {
                tracing::warn!(routine = self.name, "routine not detected within window");
                return CommandResponse::failure(format!("{label} could not be launched"));
            }
        };

        if phase != RoutinePhase::Resolved {
            let completed = timeout(self.timeouts.completion(), async {
                rx.wait_for(|p| *p == RoutinePhase::Resolved).await.map(|_| ())
            })
            .await;
            if !matches!(completed, Ok(Ok(()))) {
                tracing::warn!(routine = self.name, "routine did not complete within window");
                return CommandResponse::failure(format!(
                    "{label} command took longer than expected, halting execution"
                ));
            }
        }

        tracing::info!(routine = self.name, "routine completed");
        CommandResponse::success(format!("{label} command executed successfully"))
    }
}
