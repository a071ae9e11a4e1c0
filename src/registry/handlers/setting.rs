#![allow(clippy::needless_pass_by_value)]

use std::sync::Arc;

use crate::device::SettingKind;
use crate::error::CommandError;
use crate::registry::params::SettingParams;
use crate::response::CommandResponse;
use crate::routine::{Arming, SubRoutine};
use crate::state::AssistState;

fn on_off(enable: bool) -> &'static str {
    if enable {
        "on"
    } else {
        "off"
    }
}

/// Apply a setting. Wi-Fi and mobile data cannot be flipped by apps, so they
/// go through the quick-settings panel and its routine channel.
pub async fn apply(
    state: &Arc<AssistState>,
    p: SettingParams,
) -> Result<CommandResponse, CommandError> {
    let connectivity = &state.capabilities.connectivity;
    let label = p.setting.label();

    if connectivity.is_enabled(p.setting)? == p.enable {
        return Ok(CommandResponse::success(format!(
            "{label} is already {}",
            on_off(p.enable)
        )));
    }

    let sub = match p.setting {
        SettingKind::Torch => {
            connectivity.set_torch(p.enable)?;
            return Ok(CommandResponse::success(format!("Torch turned {}", on_off(p.enable))));
        }
        SettingKind::Bluetooth => {
            connectivity.set_bluetooth(p.enable)?;
            return Ok(CommandResponse::success(format!(
                "Bluetooth turned {}",
                on_off(p.enable)
            )));
        }
        SettingKind::Wifi => SubRoutine::Wifi,
        SettingKind::MobileData => SubRoutine::MobileData,
    };

    let panel = Arc::clone(connectivity);
    let setting = p.setting;
    let response = state
        .routines
        .quick_settings()
        .run(Arming::sub(sub), move || {
            if let Err(e) = panel.open_panel(setting) {
                tracing::warn!(setting = ?setting, error = %e, "failed to open settings panel");
            }
        })
        .await;
    Ok(response)
}
