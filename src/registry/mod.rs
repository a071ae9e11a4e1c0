pub mod catalog;
pub mod execute;
pub mod handlers;
pub mod params;
pub mod validation;

use std::sync::Arc;

use serde::Serialize;

use crate::dsl::ast::Directive;
use crate::dsl::error::ParseError;
use crate::error::CommandError;
use crate::response::CommandResponse;
use crate::state::AssistState;

pub use execute::CommandHandler;

// ── Param types (used in ParsedCommand enum) ────────────────────
use params::{
    AlarmParams, BookCabParams, CallParams, CommandArgs, IncomingCallParams, MusicControlParams,
    PayQrParams, PayUpiParams, PlayMusicParams, SettingParams, VolumeParams,
};

// ── Handler modules (dispatch targets) ──────────────────────────
use handlers::{alarm, audio, cab, call, music, payment, setting};

// ── Command metadata ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommandInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub arity: usize,
    /// Execution suspends on a routine channel.
    pub is_async: bool,
}

// ── define_commands! macro ──────────────────────────────────────

/// Single source of truth for all commands. Generates:
/// 1. `CommandKind` enum with `all()`, `info()`, `usage()`
/// 2. `ParsedCommand` enum (serde-tagged) holding typed arguments
/// 3. `ParsedCommand::parse()` from raw arguments
/// 4. `ParsedCommand::execute()`; `awaits` variants are awaited, the rest run inline
macro_rules! define_commands {
    (
        $(
            [ $($flag:ident)* ]
            $variant:ident ( $params:ty ) => $handler:path, $name:literal : $desc:literal ;
        )*
    ) => {
        // ── 1. CommandKind ──
        /// Every directive the engine understands.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        #[serde(rename_all = "snake_case")]
        pub enum CommandKind {
            $( $variant, )*
        }

        impl CommandKind {
            pub fn all() -> &'static [CommandKind] {
                &[ $( CommandKind::$variant, )* ]
            }

            pub fn info(self) -> CommandInfo {
                match self {
                    $( CommandKind::$variant => CommandInfo {
                        name: $name,
                        description: $desc,
                        arity: <$params as CommandArgs>::ARITY,
                        is_async: define_commands!(@has_flag awaits; $($flag)*),
                    }, )*
                }
            }

            pub fn usage(self) -> String {
                match self {
                    $( CommandKind::$variant => <$params as CommandArgs>::usage(), )*
                }
            }
        }

        // ── 2. ParsedCommand ──
        /// A directive whose arguments passed validation.
        #[derive(Debug, Clone, Serialize)]
        #[serde(tag = "command", content = "params", rename_all = "snake_case")]
        pub enum ParsedCommand {
            $( $variant($params), )*
        }

        // ── 3. ParsedCommand::parse() ──
        impl ParsedCommand {
            pub(crate) fn parse(
                kind: CommandKind,
                args: &[String],
                state: &AssistState,
            ) -> Result<ParsedCommand, CommandError> {
                match kind {
                    $( CommandKind::$variant => {
                        <$params as CommandArgs>::parse(args, state).map(ParsedCommand::$variant)
                    } )*
                }
            }
        }

        // ── 4. ParsedCommand::execute() ──
        impl ParsedCommand {
            pub(crate) async fn execute(
                self,
                state: &Arc<AssistState>,
            ) -> Result<CommandResponse, CommandError> {
                match self {
                    $( ParsedCommand::$variant(p) => {
                        define_commands!(@dispatch [$($flag)*] $handler, state, p)
                    } )*
                }
            }
        }
    };

    (@dispatch [awaits] $handler:path, $state:expr, $p:expr) => { $handler($state, $p).await };
    (@dispatch [] $handler:path, $state:expr, $p:expr) => { $handler($state, $p) };

    (@has_flag awaits; awaits $($rest:ident)*) => { true };
    (@has_flag awaits; $_other:ident $($rest:ident)*) => { define_commands!(@has_flag awaits; $($rest)*) };
    (@has_flag awaits;) => { false };
}

// ── Command definitions ─────────────────────────────────────────

define_commands! {
    [awaits]
    Setting(SettingParams)
    => setting::apply, "setting": "Turn a device setting on or off";

    [awaits]
    PayUpi(PayUpiParams)
    => payment::pay_upi, "pay_upi": "Pay a UPI id through a payment app";

    [awaits]
    PayQr(PayQrParams)
    => payment::pay_qr, "pay_qr": "Scan a QR code and pay the amount through a payment app";

    []
    Volume(VolumeParams)
    => audio::set_volume, "volume": "Set the media volume as a percentage";

    []
    IncomingCall(IncomingCallParams)
    => call::incoming_call, "incoming_call": "Accept or decline the ringing call";

    []
    Call(CallParams)
    => call::place_call, "call": "Call a saved contact or dial a phone number";

    []
    Alarm(AlarmParams)
    => alarm::set_alarm, "alarm": "Set an alarm for the next HH:MM or a specific date and time";

    []
    PlayMusic(PlayMusicParams)
    => music::play_music, "play_music": "Play a song from the device library";

    []
    MusicControl(MusicControlParams)
    => music::music_control, "music_control": "Pause, resume or stop the current song";

    []
    BookCab(BookCabParams)
    => cab::book_cab, "book_cab": "Open a ride app to book a cab to a destination";
}

impl CommandKind {
    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn arity(self) -> usize {
        self.info().arity
    }

    /// Case-insensitive lookup by directive name.
    pub fn from_name(name: &str) -> Option<CommandKind> {
        let name = name.trim();
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }
}

// ── Registry ────────────────────────────────────────────────────

/// Builds handlers bound to the shared device capabilities.
#[derive(Debug, Clone)]
pub struct Registry {
    state: Arc<AssistState>,
}

impl Registry {
    pub fn new(state: Arc<AssistState>) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &Arc<AssistState> {
        &self.state
    }

    /// A handler for `name`, or `None` if no command has that name.
    pub fn build(&self, name: &str, args: Vec<String>) -> Option<CommandHandler> {
        CommandKind::from_name(name)
            .map(|kind| CommandHandler::new(kind, args, Arc::clone(&self.state)))
    }

    /// Resolve a parsed chain. One unknown name rejects the whole chain.
    pub fn build_chain(&self, directives: Vec<Directive>) -> Result<Vec<CommandHandler>, ParseError> {
        directives
            .into_iter()
            .map(|d| {
                let span = d.span;
                let name = d.name.clone();
                self.build(&d.name, d.args).ok_or_else(|| {
                    ParseError::unknown_command(
                        format!(
                            "Unknown command '{name}', expected one of {}",
                            catalog::known_commands()
                        ),
                        span,
                    )
                })
            })
            .collect()
    }

    /// One usage line per command kind, taken from handlers built with no
    /// arguments.
    pub fn all_usage_strings(&self) -> Vec<String> {
        CommandKind::all()
            .iter()
            .filter_map(|kind| self.build(kind.name(), Vec::new()))
            .map(|handler| handler.usage())
            .collect()
    }

    pub fn help(&self, name: &str) -> CommandResponse {
        match self.build(name, Vec::new()) {
            Some(handler) => handler.get_help(),
            None => CommandResponse::failure(format!(
                "Unknown command '{}', expected one of {}",
                name.trim(),
                catalog::known_commands()
            )),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::device::sim::SimulatedDevice;
    use crate::device::Capabilities;
    use crate::dsl::parse_directives;
    use crate::dsl::error::ErrorKind;
    use crate::settings::EngineSettings;

    fn registry() -> Registry {
        let device = Arc::new(SimulatedDevice::default());
        let state = AssistState::new(
            Capabilities::from_device(&device),
            EngineSettings::default(),
            None,
        );
        Registry::new(state)
    }

    #[test]
    fn test_command_names_are_unique() {
        let mut names: Vec<&str> = CommandKind::all().iter().map(|k| k.name()).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
        assert_eq!(total, 10);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(CommandKind::from_name("SETTING"), Some(CommandKind::Setting));
        assert_eq!(CommandKind::from_name(" Pay_Upi "), Some(CommandKind::PayUpi));
        assert_eq!(CommandKind::from_name("teleport"), None);
    }

    #[test]
    fn test_arity_matches_params() {
        assert_eq!(CommandKind::Setting.arity(), 2);
        assert_eq!(CommandKind::PayUpi.arity(), 4);
        assert_eq!(CommandKind::Volume.arity(), 1);
        assert!(CommandKind::PayQr.info().is_async);
        assert!(!CommandKind::Alarm.info().is_async);
    }

    #[test]
    fn test_unknown_name_rejects_whole_chain() {
        let registry = registry();
        let chain = parse_directives("[volume(10) -> teleport(mars)]").unwrap();
        let err = registry.build_chain(chain).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownCommand);
        assert!(err.message.contains("'teleport'"));
    }

    #[test]
    fn test_usage_strings_one_per_kind() {
        let usages = registry().all_usage_strings();
        assert_eq!(usages.len(), CommandKind::all().len());
        for (usage, kind) in usages.iter().zip(CommandKind::all()) {
            assert!(usage.starts_with(&format!("[{}(", kind.name())), "{usage}");
        }
    }

    #[test]
    fn test_help_for_unknown_command_lists_known() {
        let response = registry().help("fly");
        assert!(!response.is_success);
        assert!(response.message.contains("book_cab"));
        assert!(registry().help("volume").is_success);
    }
}
