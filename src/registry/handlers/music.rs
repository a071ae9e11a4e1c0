#![allow(clippy::needless_pass_by_value)]

use std::sync::Arc;

use crate::device::{PlaybackStatus, Track};
use crate::error::CommandError;
use crate::registry::params::{MusicAction, MusicControlParams, PlayMusicParams};
use crate::response::CommandResponse;
use crate::state::AssistState;

/// Lowercase alphanumerics with single spaces, so punctuation and spacing
/// don't count against a match.
fn normalize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// The closest local track to `query` and its similarity score.
pub fn best_match<'a>(query: &str, tracks: &'a [Track]) -> Option<(&'a Track, f64)> {
    let query = normalize_title(query);
    tracks
        .iter()
        .map(|t| (t, strsim::normalized_levenshtein(&query, &normalize_title(&t.title))))
        .max_by(|a, b| a.1.total_cmp(&b.1))
}

pub fn play_music(
    state: &Arc<AssistState>,
    p: PlayMusicParams,
) -> Result<CommandResponse, CommandError> {
    let tracks = state.capabilities.media.tracks();
    let threshold = state.settings.music_match_threshold;

    match best_match(&p.title, &tracks) {
        Some((track, score)) if score >= threshold => {
            tracing::debug!(query = %p.title, title = %track.title, score, "matched local track");
            state.capabilities.player.play(track)?;
            Ok(CommandResponse::success(format!("Playing '{}'", track.title)))
        }
        best => {
            tracing::debug!(query = %p.title, best = ?best.map(|(t, s)| (&t.title, s)), "no confident match");
            Ok(CommandResponse::failure(format!(
                "'{}' was not found on this device with sufficient confidence",
                p.title
            )))
        }
    }
}

pub fn music_control(
    state: &Arc<AssistState>,
    p: MusicControlParams,
) -> Result<CommandResponse, CommandError> {
    let player = &state.capabilities.player;
    if player.status() == PlaybackStatus::Idle {
        return Ok(CommandResponse::failure("No music is currently playing"));
    }
    match p.action {
        MusicAction::Toggle => {
            let message = match player.toggle()? {
                PlaybackStatus::Playing => "Music resumed",
                PlaybackStatus::Paused => "Music paused",
                PlaybackStatus::Idle => "Music stopped",
            };
            Ok(CommandResponse::success(message))
        }
        MusicAction::Stop => {
            player.stop()?;
            Ok(CommandResponse::success("Music stopped"))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::device::sim::{SimState, SimulatedDevice};
    use crate::device::Capabilities;
    use crate::settings::EngineSettings;

    fn setup() -> (Arc<AssistState>, Arc<SimulatedDevice>) {
        let device = Arc::new(SimulatedDevice::new(SimState::default()));
        let state = AssistState::new(
            Capabilities::from_device(&device),
            EngineSettings::default(),
            None,
        );
        (state, device)
    }

    #[test]
    fn test_best_match_tolerates_typos() {
        let (_, device) = setup();
        let tracks = device.snapshot().tracks;
        let (track, score) = best_match("bohemian rapsody", &tracks).unwrap();
        assert_eq!(track.title, "Bohemian Rhapsody");
        assert!(score > 0.9);
    }

    #[test]
    fn test_play_music_rejects_weak_match() {
        let (state, device) = setup();
        let r = play_music(&state, PlayMusicParams { title: "Thunderstruck".into() }).unwrap();
        assert!(!r.is_success);
        assert!(r.message.contains("sufficient confidence"));
        assert!(device.snapshot().now_playing.is_none());
    }

    #[test]
    fn test_play_then_toggle_then_stop() {
        let (state, device) = setup();
        let r = play_music(&state, PlayMusicParams { title: "shape of you".into() }).unwrap();
        assert!(r.is_success, "{}", r.message);
        assert_eq!(device.snapshot().playback, PlaybackStatus::Playing);

        let r = music_control(&state, MusicControlParams { action: MusicAction::Toggle }).unwrap();
        assert_eq!(r.message, "Music paused");

        let r = music_control(&state, MusicControlParams { action: MusicAction::Stop }).unwrap();
        assert!(r.is_success);
        assert_eq!(device.snapshot().playback, PlaybackStatus::Idle);

        let r = music_control(&state, MusicControlParams { action: MusicAction::Stop }).unwrap();
        assert!(!r.is_success);
    }
}
