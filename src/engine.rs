//! Response aggregation: parse a reply, run its directives in order, and
//! collect one response per directive.

use std::sync::Arc;
use std::time::Instant;

use crate::audit;
use crate::dsl;
use crate::dsl::error::ParseError;
use crate::registry::{CommandHandler, Registry};
use crate::response::CommandResponse;
use crate::state::AssistState;

#[derive(Debug, Clone)]
pub struct Engine {
    registry: Registry,
}

impl Engine {
    pub fn new(state: Arc<AssistState>) -> Self {
        Self {
            registry: Registry::new(state),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn state(&self) -> &Arc<AssistState> {
        self.registry.state()
    }

    /// Parse `text` into bound handlers. Any grammar error or unknown name
    /// rejects the whole chain.
    pub fn parse(&self, text: &str) -> Result<Vec<CommandHandler>, ParseError> {
        let directives = dsl::parse_directives(text)?;
        self.registry.build_chain(directives)
    }

    /// Run every directive in `text`, strictly in chain order.
    ///
    /// Text without a directive block yields no responses. A grammar error
    /// yields exactly one synthetic failure and nothing runs.
    pub async fn run(&self, text: &str) -> Vec<CommandResponse> {
        let handlers = match self.parse(text) {
            Ok(handlers) => handlers,
            Err(e) => {
                tracing::warn!(error = %e.format_with_source(text), "rejected directive chain");
                return vec![grammar_failure(&e)];
            }
        };
        if !handlers.is_empty() {
            tracing::debug!(count = handlers.len(), "running directive chain");
        }

        let mut responses = Vec::with_capacity(handlers.len());
        for handler in handlers {
            responses.push(self.execute(handler).await);
        }
        responses
    }

    async fn execute(&self, handler: CommandHandler) -> CommandResponse {
        let command = handler.kind().name();
        let args = handler.raw_args().to_vec();
        let started = Instant::now();

        let response = handler.validate_and_execute().await.with_remediation();
        let elapsed = started.elapsed();
        tracing::info!(
            command,
            success = response.is_success,
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "directive executed"
        );

        if let Some(dir) = self.state().audit_dir() {
            audit::record(dir, command, args, response.clone(), elapsed).await;
        }
        response
    }
}

/// The single response reported for a chain that failed to parse.
pub fn grammar_failure(err: &ParseError) -> CommandResponse {
    CommandResponse::failure(format!("Could not understand the command: {err}")).with_remediation()
}
