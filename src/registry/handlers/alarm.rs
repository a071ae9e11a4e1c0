#![allow(clippy::needless_pass_by_value)]

use std::sync::Arc;

use crate::error::CommandError;
use crate::registry::params::AlarmParams;
use crate::response::CommandResponse;
use crate::state::AssistState;

pub fn set_alarm(state: &Arc<AssistState>, p: AlarmParams) -> Result<CommandResponse, CommandError> {
    state.capabilities.alarms.schedule(p.at, &p.label)?;
    let when = p.at.format("%Y-%m-%d %H:%M");
    let message = if p.label.is_empty() {
        format!("Alarm set for {when}")
    } else {
        format!("Alarm '{}' set for {when}", p.label)
    };
    Ok(CommandResponse::success(message))
}
