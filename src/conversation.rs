//! The contract between the engine and the conversation loop that calls it.

use serde::Serialize;

use crate::dsl;
use crate::engine::Engine;
use crate::response::CommandResponse;

const PROMPT_INTRO: &str = "\
You are a helpful assistant running on the user's phone. You can act on the \
device by adding a directive block to your reply. A block is written as \
[command(arg, ...)] and several commands run in order when chained with ->, \
for example [setting(WIFI, ON) -> volume(40)]. Put at most one block in a \
reply. Quote arguments that contain commas.";

const PROMPT_OUTRO: &str = "\
After a block runs you may receive the results. When a command fails, tell \
the user what went wrong and wait for them to confirm before trying again.";

/// What the conversation loop should do with one assistant reply.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    /// The reply with its directive block removed.
    pub display_text: String,
    /// One response per directive, in chain order.
    pub responses: Vec<CommandResponse>,
    /// Responses to record and feed back into the conversation.
    pub forwarded: Vec<CommandResponse>,
    /// Ask the model for another turn after forwarding.
    pub request_new_turn: bool,
}

#[derive(Debug, Clone)]
pub struct Assistant {
    engine: Engine,
}

impl Assistant {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub async fn handle_reply(&self, text: &str) -> TurnOutcome {
        let responses = self.engine.run(text).await;
        let forwarded: Vec<CommandResponse> = responses
            .iter()
            .filter(|r| r.send_response)
            .cloned()
            .collect();
        let request_new_turn = responses.iter().any(|r| r.get_response);
        TurnOutcome {
            display_text: dsl::strip_directives(text),
            responses,
            forwarded,
            request_new_turn,
        }
    }

    /// The grammar advertisement sent to the remote model.
    pub fn system_prompt(&self) -> String {
        let usages = self.engine.registry().all_usage_strings();
        let mut prompt = String::from(PROMPT_INTRO);
        prompt.push_str("\n\nAvailable commands:\n");
        for usage in usages {
            prompt.push_str("- ");
            prompt.push_str(&usage);
            prompt.push('\n');
        }
        prompt.push('\n');
        prompt.push_str(PROMPT_OUTRO);
        prompt
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::device::sim::{SimState, SimulatedDevice};
    use crate::device::Capabilities;
    use crate::registry::CommandKind;
    use crate::settings::EngineSettings;
    use crate::state::AssistState;

    fn assistant(sim: SimState) -> Assistant {
        let device = Arc::new(SimulatedDevice::new(sim));
        let state = AssistState::new(
            Capabilities::from_device(&device),
            EngineSettings::default(),
            None,
        );
        Assistant::new(Engine::new(state))
    }

    #[tokio::test]
    async fn test_success_does_not_request_new_turn() {
        let outcome = assistant(SimState::default())
            .handle_reply("Setting an alarm. [alarm(07:30, Gym)]")
            .await;
        assert_eq!(outcome.display_text, "Setting an alarm.");
        assert_eq!(outcome.responses.len(), 1);
        assert_eq!(outcome.forwarded.len(), 1);
        assert!(!outcome.request_new_turn);
    }

    #[tokio::test]
    async fn test_failure_requests_new_turn() {
        let outcome = assistant(SimState::default())
            .handle_reply("[incoming_call(ACCEPT)]")
            .await;
        assert!(outcome.display_text.is_empty());
        assert!(outcome.request_new_turn);
        assert!(!outcome.forwarded[0].is_success);
    }

    #[test]
    fn test_system_prompt_lists_every_command() {
        let prompt = assistant(SimState::default()).system_prompt();
        for kind in CommandKind::all() {
            assert!(prompt.contains(&kind.usage()), "missing {}", kind.name());
        }
        assert!(prompt.contains("->"));
    }
}
