use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::device::{CabApp, PaymentApp, SettingKind};
use crate::error::CommandError;
use crate::state::AssistState;
use crate::util::strip_quotes;

use super::validation::{
    parse_alarm_time, parse_amount, parse_choice, parse_upi_id, parse_volume, required_text,
    usage_choices, Amount,
};

/// Typed arguments for one command kind.
///
/// `parse` runs after the arity check, so implementations may rely on
/// exactly `ARITY` raw arguments.
pub trait CommandArgs: Sized {
    const ARITY: usize;

    /// One-line grammar advertisement, e.g. `[volume(<0-100>)]`.
    fn usage() -> String;

    fn parse(args: &[String], state: &AssistState) -> Result<Self, CommandError>;
}

pub fn arity_error(required: usize, found: usize) -> CommandError {
    CommandError::invalid(format!(
        "Invalid number of arguments, required: {required}, found: {found}"
    ))
}

/// View the raw arguments as a fixed-size array.
fn take<const N: usize>(args: &[String]) -> Result<&[String; N], CommandError> {
    <&[String; N]>::try_from(args).map_err(|_| arity_error(N, args.len()))
}

// ── Enumerated choices ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn all() -> &'static [Switch] {
        &[Self::On, Self::Off]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncomingCallAction {
    Accept,
    Decline,
}

impl IncomingCallAction {
    pub fn all() -> &'static [IncomingCallAction] {
        &[Self::Accept, Self::Decline]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MusicAction {
    Toggle,
    Stop,
}

impl MusicAction {
    pub fn all() -> &'static [MusicAction] {
        &[Self::Toggle, Self::Stop]
    }
}

// ── Settings ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct SettingParams {
    pub setting: SettingKind,
    pub enable: bool,
}

impl CommandArgs for SettingParams {
    const ARITY: usize = 2;

    fn usage() -> String {
        format!(
            "[setting(<{}>, <{}>)]",
            usage_choices(SettingKind::all()),
            usage_choices(Switch::all())
        )
    }

    fn parse(args: &[String], _state: &AssistState) -> Result<Self, CommandError> {
        let [setting, switch] = take::<2>(args)?;
        Ok(Self {
            setting: parse_choice(setting, SettingKind::all(), "setting")?,
            enable: parse_choice(switch, Switch::all(), "state")? == Switch::On,
        })
    }
}

// ── Payments ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct PayUpiParams {
    pub app: PaymentApp,
    pub upi_id: String,
    pub payee: String,
    pub amount: Amount,
}

impl CommandArgs for PayUpiParams {
    const ARITY: usize = 4;

    fn usage() -> String {
        format!(
            "[pay_upi(<{}>, upi id, payee name, amount)]",
            usage_choices(PaymentApp::all())
        )
    }

    fn parse(args: &[String], _state: &AssistState) -> Result<Self, CommandError> {
        let [app, upi_id, payee, amount] = take::<4>(args)?;
        Ok(Self {
            app: parse_choice(app, PaymentApp::all(), "payment app")?,
            upi_id: parse_upi_id(upi_id)?,
            payee: required_text(payee, "payee name")?,
            amount: parse_amount(amount)?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PayQrParams {
    pub app: PaymentApp,
    pub amount: Amount,
}

impl CommandArgs for PayQrParams {
    const ARITY: usize = 2;

    fn usage() -> String {
        format!("[pay_qr(<{}>, amount)]", usage_choices(PaymentApp::all()))
    }

    fn parse(args: &[String], _state: &AssistState) -> Result<Self, CommandError> {
        let [app, amount] = take::<2>(args)?;
        Ok(Self {
            app: parse_choice(app, PaymentApp::all(), "payment app")?,
            amount: parse_amount(amount)?,
        })
    }
}

// ── Audio ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct VolumeParams {
    pub percent: u8,
}

impl CommandArgs for VolumeParams {
    const ARITY: usize = 1;

    fn usage() -> String {
        "[volume(<0-100>)]".to_string()
    }

    fn parse(args: &[String], _state: &AssistState) -> Result<Self, CommandError> {
        let [level] = take::<1>(args)?;
        Ok(Self {
            percent: parse_volume(level)?,
        })
    }
}

// ── Calls ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct IncomingCallParams {
    pub action: IncomingCallAction,
}

impl CommandArgs for IncomingCallParams {
    const ARITY: usize = 1;

    fn usage() -> String {
        format!("[incoming_call(<{}>)]", usage_choices(IncomingCallAction::all()))
    }

    fn parse(args: &[String], _state: &AssistState) -> Result<Self, CommandError> {
        let [action] = take::<1>(args)?;
        Ok(Self {
            action: parse_choice(action, IncomingCallAction::all(), "call action")?,
        })
    }
}

/// A call target, resolved to a dialable number while parsing.
#[derive(Debug, Clone, Serialize)]
pub struct CallParams {
    /// Contact name, or the number itself when dialed directly.
    pub label: String,
    pub number: String,
}

fn looks_like_number(token: &str) -> bool {
    let digits = token.chars().filter(char::is_ascii_digit).count();
    digits >= 3
        && token
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'))
}

impl CommandArgs for CallParams {
    const ARITY: usize = 1;

    fn usage() -> String {
        "[call(contact name or phone number)]".to_string()
    }

    fn parse(args: &[String], state: &AssistState) -> Result<Self, CommandError> {
        let [target] = take::<1>(args)?;
        let target = required_text(target, "contact name or phone number")?;
        if looks_like_number(&target) {
            let number: String = target
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '+')
                .collect();
            return Ok(Self {
                label: target,
                number,
            });
        }
        let contact = state
            .capabilities
            .telephony
            .find_contact(&target)?
            .ok_or_else(|| CommandError::invalid(format!("No contact named '{target}' was found")))?;
        Ok(Self {
            label: contact.name,
            number: contact.number,
        })
    }
}

// ── Alarm ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct AlarmParams {
    pub at: NaiveDateTime,
    pub label: String,
}

impl CommandArgs for AlarmParams {
    const ARITY: usize = 2;

    fn usage() -> String {
        "[alarm(<HH:MM|YYYY-MM-DD HH:MM>, label)]".to_string()
    }

    fn parse(args: &[String], state: &AssistState) -> Result<Self, CommandError> {
        let [time, label] = take::<2>(args)?;
        let now = state.capabilities.alarms.now();
        Ok(Self {
            at: parse_alarm_time(time, now)?,
            label: strip_quotes(label).to_string(),
        })
    }
}

// ── Music ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct PlayMusicParams {
    pub title: String,
}

impl CommandArgs for PlayMusicParams {
    const ARITY: usize = 1;

    fn usage() -> String {
        "[play_music(song title)]".to_string()
    }

    fn parse(args: &[String], _state: &AssistState) -> Result<Self, CommandError> {
        let [title] = take::<1>(args)?;
        Ok(Self {
            title: required_text(title, "song title")?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MusicControlParams {
    pub action: MusicAction,
}

impl CommandArgs for MusicControlParams {
    const ARITY: usize = 1;

    fn usage() -> String {
        format!("[music_control(<{}>)]", usage_choices(MusicAction::all()))
    }

    fn parse(args: &[String], _state: &AssistState) -> Result<Self, CommandError> {
        let [action] = take::<1>(args)?;
        Ok(Self {
            action: parse_choice(action, MusicAction::all(), "music action")?,
        })
    }
}

// ── Rides ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct BookCabParams {
    pub app: CabApp,
    pub destination: String,
}

impl CommandArgs for BookCabParams {
    const ARITY: usize = 2;

    fn usage() -> String {
        format!("[book_cab(<{}>, destination)]", usage_choices(CabApp::all()))
    }

    fn parse(args: &[String], _state: &AssistState) -> Result<Self, CommandError> {
        let [app, destination] = take::<2>(args)?;
        Ok(Self {
            app: parse_choice(app, CabApp::all(), "cab app")?,
            destination: required_text(destination, "destination")?,
        })
    }
}
