#![allow(clippy::needless_pass_by_value)]

use std::sync::Arc;

use crate::error::CommandError;
use crate::registry::params::VolumeParams;
use crate::registry::validation::scale_volume;
use crate::response::CommandResponse;
use crate::state::AssistState;

pub fn set_volume(
    state: &Arc<AssistState>,
    p: VolumeParams,
) -> Result<CommandResponse, CommandError> {
    let audio = &state.capabilities.audio;
    let level = scale_volume(p.percent, audio.max_volume());
    audio.set_volume(level)?;
    Ok(CommandResponse::success(format!("Volume set to {}%", p.percent)))
}
