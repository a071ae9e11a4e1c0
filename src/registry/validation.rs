//! Shared argument validation for registry command handlers.
//!
//! Every helper strips quoting first and reports the offending token, so all
//! handlers produce consistent user-correctable messages.

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CommandError;
use crate::util::{format_choices, from_serde_str, normalize_choice, serde_variant_names, strip_quotes};

pub const MAX_AMOUNT_PAISE: u64 = 100_000 * 100;

/// Parse an enumerated token against `all`, using each variant's serde name.
pub fn parse_choice<T>(raw: &str, all: &[T], what: &str) -> Result<T, CommandError>
where
    T: Serialize + DeserializeOwned + Copy,
{
    let normalized = normalize_choice(raw);
    from_serde_str::<T>(&normalized)
        .filter(|_| !normalized.is_empty())
        .ok_or_else(|| {
            CommandError::invalid(format!(
                "Invalid {what} '{}', expected one of {}",
                strip_quotes(raw),
                choices(all)
            ))
        })
}

/// `{A, B, C}` for a set of serde-named variants.
pub fn choices<T: Serialize>(all: &[T]) -> String {
    format_choices(&serde_variant_names(all))
}

/// `A|B|C`, the form usage strings use.
pub fn usage_choices<T: Serialize>(all: &[T]) -> String {
    serde_variant_names(all).join("|")
}

/// A free-form argument that must not be blank.
pub fn required_text(raw: &str, what: &str) -> Result<String, CommandError> {
    let text = strip_quotes(raw);
    if text.is_empty() {
        return Err(CommandError::invalid(format!("The {what} must not be empty")));
    }
    Ok(text.to_string())
}

/// Validate a volume percentage: a whole number from 0 to 100.
pub fn parse_volume(raw: &str) -> Result<u8, CommandError> {
    let token = strip_quotes(raw);
    let token = token.strip_suffix('%').unwrap_or(token).trim();
    token
        .parse::<u8>()
        .ok()
        .filter(|v| *v <= 100)
        .ok_or_else(|| {
            CommandError::invalid(format!(
                "Invalid volume level '{}', expected a whole number from 0 to 100",
                strip_quotes(raw)
            ))
        })
}

/// Map a 0–100 percentage onto `0..=max`, rounding to the nearest step.
pub fn scale_volume(percent: u8, max: u32) -> u32 {
    let scaled = (u64::from(percent.min(100)) * u64::from(max) + 50) / 100;
    u32::try_from(scaled).unwrap_or(max)
}

// ── Amounts ─────────────────────────────────────────────────────

/// A payment amount in paise (1/100 rupee).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Amount(u64);

impl Amount {
    pub fn from_paise(paise: u64) -> Self {
        Self(paise)
    }

    pub fn paise(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Parse a rupee amount: positive, at most two decimals, up to 1,00,000.
pub fn parse_amount(raw: &str) -> Result<Amount, CommandError> {
    let token = strip_quotes(raw);
    let invalid = || {
        CommandError::invalid(format!(
            "Invalid amount '{token}', expected a positive number with at most two decimals, up to 100000"
        ))
    };
    let digits = token
        .strip_prefix('₹')
        .or_else(|| token.strip_prefix("Rs."))
        .or_else(|| token.strip_prefix("Rs"))
        .unwrap_or(token)
        .trim();

    let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
    if whole.is_empty()
        || frac.len() > 2
        || !whole.bytes().all(|b| b.is_ascii_digit())
        || !frac.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }
    let whole: u64 = whole.parse().map_err(|_| invalid())?;
    let frac: u64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<u64>().map_err(|_| invalid())? * 10,
        _ => frac.parse().map_err(|_| invalid())?,
    };
    let paise = whole
        .checked_mul(100)
        .and_then(|p| p.checked_add(frac))
        .ok_or_else(invalid)?;
    if paise == 0 || paise > MAX_AMOUNT_PAISE {
        return Err(invalid());
    }
    Ok(Amount(paise))
}

/// A UPI virtual payment address: `handle@bank`.
pub fn parse_upi_id(raw: &str) -> Result<String, CommandError> {
    let token = strip_quotes(raw);
    let valid_part = |s: &str| {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
    };
    match token.split_once('@') {
        Some((handle, bank)) if valid_part(handle) && valid_part(bank) => Ok(token.to_string()),
        _ => Err(CommandError::invalid(format!(
            "Invalid UPI id '{token}', expected the form name@bank"
        ))),
    }
}

// ── Date-times ──────────────────────────────────────────────────

/// Parse an alarm time relative to `now`.
///
/// `HH:MM` means the next occurrence of that time; `YYYY-MM-DD HH:MM` must be
/// in the future.
pub fn parse_alarm_time(raw: &str, now: NaiveDateTime) -> Result<NaiveDateTime, CommandError> {
    let token = strip_quotes(raw);
    if let Ok(time) = NaiveTime::parse_from_str(token, "%H:%M") {
        let today = now.date().and_time(time);
        return Ok(if today > now {
            today
        } else {
            today + Duration::days(1)
        });
    }

    let (date, time) = token.split_once(|c: char| c == ' ' || c == 'T').ok_or_else(|| {
        CommandError::invalid(format!(
            "Invalid alarm time '{token}', expected HH:MM or YYYY-MM-DD HH:MM"
        ))
    })?;
    let at = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .ok()
        .zip(NaiveTime::parse_from_str(time.trim(), "%H:%M").ok())
        .map(|(d, t)| d.and_time(t))
        .ok_or_else(|| {
            CommandError::invalid(format!(
                "Invalid alarm time '{token}', expected HH:MM or YYYY-MM-DD HH:MM"
            ))
        })?;
    if at <= now {
        return Err(CommandError::invalid(format!(
            "Alarm time '{token}' is in the past"
        )));
    }
    Ok(at)
}
