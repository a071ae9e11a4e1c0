use std::sync::Arc;

use crate::error::CommandError;
use crate::response::CommandResponse;
use crate::state::AssistState;

use super::params::arity_error;
use super::{CommandKind, ParsedCommand};

/// One directive bound to its raw arguments and the shared state.
///
/// Single use: [`validate_and_execute`](Self::validate_and_execute) consumes
/// the handler and always yields exactly one response.
pub struct CommandHandler {
    kind: CommandKind,
    raw_args: Vec<String>,
    state: Arc<AssistState>,
}

impl std::fmt::Debug for CommandHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHandler")
            .field("kind", &self.kind)
            .field("raw_args", &self.raw_args)
            .finish_non_exhaustive()
    }
}

impl CommandHandler {
    pub(crate) fn new(kind: CommandKind, raw_args: Vec<String>, state: Arc<AssistState>) -> Self {
        Self {
            kind,
            raw_args,
            state,
        }
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn raw_args(&self) -> &[String] {
        &self.raw_args
    }

    pub fn usage(&self) -> String {
        self.kind.usage()
    }

    /// Usage text as an always-delivered success.
    pub fn get_help(&self) -> CommandResponse {
        CommandResponse::success(format!("{} {}", self.usage(), self.kind.info().description))
    }

    /// Arity check, then argument parsing.
    pub fn prepare(&self) -> Result<ParsedCommand, CommandError> {
        let required = self.kind.arity();
        if self.raw_args.len() != required {
            return Err(arity_error(required, self.raw_args.len()));
        }
        ParsedCommand::parse(self.kind, &self.raw_args, &self.state)
    }

    pub async fn validate_and_execute(self) -> CommandResponse {
        let name = self.kind.name();
        let parsed = match self.prepare() {
            Ok(parsed) => parsed,
            Err(e) => return error_response(name, &e),
        };
        tracing::debug!(command = name, params = ?parsed, "arguments parsed");

        match parsed.execute(&self.state).await {
            Ok(response) => response,
            Err(e) => error_response(name, &e),
        }
    }
}

/// Map a handler error onto the response shape the conversation loop expects.
pub fn error_response(command: &str, err: &CommandError) -> CommandResponse {
    if err.is_user_correctable() {
        tracing::info!(command, error = %err, "rejected directive arguments");
        CommandResponse::user_correctable(err.to_string())
    } else {
        tracing::warn!(command, error = %err, "directive failed");
        CommandResponse::silent_failure(err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::device::sim::{SimState, SimulatedDevice};
    use crate::device::{Capabilities, DeviceError};
    use crate::response::REMEDIATION_SUFFIX;
    use crate::settings::EngineSettings;

    fn handler(kind: CommandKind, args: &[&str]) -> (CommandHandler, Arc<SimulatedDevice>) {
        handler_on(SimState::default(), kind, args)
    }

    fn handler_on(
        sim: SimState,
        kind: CommandKind,
        args: &[&str],
    ) -> (CommandHandler, Arc<SimulatedDevice>) {
        let device = Arc::new(SimulatedDevice::new(sim));
        let state = AssistState::new(
            Capabilities::from_device(&device),
            EngineSettings::default(),
            None,
        );
        let args = args.iter().map(ToString::to_string).collect();
        (CommandHandler::new(kind, args, state), device)
    }

    #[tokio::test]
    async fn test_arity_mismatch_is_user_correctable() {
        let (h, _) = handler(CommandKind::Volume, &["10", "20"]);
        let r = h.validate_and_execute().await;
        assert!(!r.is_success);
        assert!(r.get_response && r.send_response);
        assert!(r.message.contains("Invalid number of arguments, required: 1, found: 2"));
        assert!(r.message.ends_with(REMEDIATION_SUFFIX));
    }

    #[tokio::test]
    async fn test_parse_failure_names_allowed_set() {
        let (h, _) = handler(CommandKind::Setting, &["wifi", "maybe"]);
        let r = h.validate_and_execute().await;
        assert!(!r.is_success);
        assert!(r.message.contains("'maybe'"));
        assert!(r.message.contains("{ON, OFF}"));
    }

    #[tokio::test]
    async fn test_volume_executes() {
        let (h, device) = handler(CommandKind::Volume, &["'40'"]);
        let r = h.validate_and_execute().await;
        assert!(r.is_success, "{}", r.message);
        assert!(!r.message.is_empty());
        assert_eq!(device.snapshot().volume, 6);
    }

    #[test]
    fn test_operational_errors_are_silent() {
        let err = CommandError::from(DeviceError::Platform("binder died".into()));
        let r = error_response("volume", &err);
        assert!(!r.is_success);
        assert!(!r.get_response);
        assert!(!r.send_response);
        assert_eq!(r.message, "platform error: binder died");
    }

    #[tokio::test]
    async fn test_parse_time_device_error_is_silent() {
        let sim = SimState {
            contacts_readable: false,
            ..SimState::default()
        };
        let (h, device) = handler_on(sim, CommandKind::Call, &["Mom"]);
        let r = h.validate_and_execute().await;
        assert!(!r.is_success);
        assert!(!r.send_response);
        assert!(!r.get_response);
        assert_eq!(r.message, "Contacts access is unavailable on this device");
        assert!(device.snapshot().dialed.is_empty());
    }

    #[tokio::test]
    async fn test_number_needs_no_contact_lookup() {
        let sim = SimState {
            contacts_readable: false,
            ..SimState::default()
        };
        let (h, device) = handler_on(sim, CommandKind::Call, &["+91 98765 43210"]);
        let r = h.validate_and_execute().await;
        assert!(r.is_success, "{}", r.message);
        assert_eq!(device.snapshot().dialed, vec!["+919876543210".to_string()]);
    }

    #[test]
    fn test_get_help_wraps_usage() {
        let (h, _) = handler(CommandKind::BookCab, &[]);
        let help = h.get_help();
        assert!(help.is_success && help.send_response);
        assert!(help.message.starts_with("[book_cab(<UBER|OLA>, destination)]"));
    }
}
