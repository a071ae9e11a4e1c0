use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Guidance appended to user-correctable failures so the remote model checks
/// back with the user instead of retrying blindly.
pub const REMEDIATION_SUFFIX: &str =
    " Inform the user about this and wait for their confirmation before retrying.";

/// `message` as a sentence, followed by the remediation suffix.
fn append_suffix(message: &str) -> String {
    let message = message.trim_end();
    if message.is_empty() || message.ends_with(['.', '!', '?']) {
        format!("{message}{REMEDIATION_SUFFIX}")
    } else {
        format!("{message}.{REMEDIATION_SUFFIX}")
    }
}

/// Outcome of one directive. Exactly one is produced per directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CommandResponse {
    pub is_success: bool,
    /// Human-readable outcome.
    pub message: String,
    /// Ask the conversation loop for a fresh assistant turn after this.
    pub get_response: bool,
    /// Forward this outcome into the conversation at all.
    pub send_response: bool,
}

impl CommandResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            is_success: true,
            message: message.into(),
            get_response: false,
            send_response: true,
        }
    }

    /// A failure the assistant should hear about and re-plan around.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            is_success: false,
            message: message.into(),
            get_response: true,
            send_response: true,
        }
    }

    /// A failure recorded for diagnostics only; never shown or fed back.
    pub fn silent_failure(message: impl Into<String>) -> Self {
        Self {
            is_success: false,
            message: message.into(),
            get_response: false,
            send_response: false,
        }
    }

    /// Failure for a user-correctable problem: carries the remediation suffix,
    /// and is delivered only when there is something to say.
    pub fn user_correctable(message: impl Into<String>) -> Self {
        let message = message.into();
        let deliver = !message.trim().is_empty();
        Self {
            is_success: false,
            message: append_suffix(&message),
            get_response: deliver,
            send_response: deliver,
        }
    }

    /// Append the remediation suffix to a failure that requests a new turn.
    /// Idempotent: a message that already carries the suffix is left alone.
    pub fn with_remediation(mut self) -> Self {
        if !self.is_success && self.get_response && !self.message.ends_with(REMEDIATION_SUFFIX) {
            self.message = append_suffix(&self.message);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_correctable_sets_delivery_flags() {
        let r = CommandResponse::user_correctable("Invalid volume level '150'");
        assert!(!r.is_success);
        assert!(r.get_response && r.send_response);
        assert!(r.message.starts_with("Invalid volume level '150'"));
        assert!(r.message.ends_with(REMEDIATION_SUFFIX));
    }

    #[test]
    fn test_user_correctable_blank_message_is_not_delivered() {
        let r = CommandResponse::user_correctable("   ");
        assert!(!r.get_response);
        assert!(!r.send_response);
    }

    #[test]
    fn test_with_remediation_is_idempotent() {
        let once = CommandResponse::failure("wifi could not be launched").with_remediation();
        let twice = once.clone().with_remediation();
        assert_eq!(once, twice);
        assert_eq!(once.message.matches(REMEDIATION_SUFFIX).count(), 1);
        assert!(once.message.starts_with("wifi could not be launched. Inform"));
    }

    #[test]
    fn test_with_remediation_skips_success_and_silent() {
        let ok = CommandResponse::success("done").with_remediation();
        assert_eq!(ok.message, "done");
        let silent = CommandResponse::silent_failure("platform error").with_remediation();
        assert_eq!(silent.message, "platform error");
    }
}
