#![allow(clippy::needless_pass_by_value)]

use std::sync::Arc;

use crate::error::CommandError;
use crate::registry::params::{CallParams, IncomingCallAction, IncomingCallParams};
use crate::response::CommandResponse;
use crate::state::AssistState;

pub fn place_call(state: &Arc<AssistState>, p: CallParams) -> Result<CommandResponse, CommandError> {
    state.capabilities.telephony.dial(&p.number)?;
    let message = if p.label == p.number {
        format!("Calling {}", p.number)
    } else {
        format!("Calling {} ({})", p.label, p.number)
    };
    Ok(CommandResponse::success(message))
}

pub fn incoming_call(
    state: &Arc<AssistState>,
    p: IncomingCallParams,
) -> Result<CommandResponse, CommandError> {
    let telephony = &state.capabilities.telephony;
    if !telephony.is_ringing() {
        return Ok(CommandResponse::failure(
            "There is no incoming call to answer or decline",
        ));
    }
    match p.action {
        IncomingCallAction::Accept => {
            telephony.answer()?;
            Ok(CommandResponse::success("Call accepted"))
        }
        IncomingCallAction::Decline => {
            telephony.decline()?;
            Ok(CommandResponse::success("Call declined"))
        }
    }
}
