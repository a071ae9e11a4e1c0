use std::path::PathBuf;
use std::sync::Arc;

use crate::device::Capabilities;
use crate::routine::RoutineHub;
use crate::settings::EngineSettings;

// ── Assistant State ─────────────────────────────────────────────

/// State shared by the registry, every handler and the observer.
pub struct AssistState {
    pub capabilities: Capabilities,
    pub routines: RoutineHub,
    pub settings: EngineSettings,
    /// Where settings and command logs live. `None` disables file output.
    pub config_dir: Option<PathBuf>,
}

impl AssistState {
    /// Build shared state; routine channels take their timeouts from `settings`.
    pub fn new(
        capabilities: Capabilities,
        settings: EngineSettings,
        config_dir: Option<PathBuf>,
    ) -> Arc<Self> {
        let routines = RoutineHub::new(&settings.routines);
        Arc::new(Self {
            capabilities,
            routines,
            settings,
            config_dir,
        })
    }

    /// Command log directory, when auditing is on and a config dir is known.
    pub fn audit_dir(&self) -> Option<PathBuf> {
        if !self.settings.audit_enabled {
            return None;
        }
        self.config_dir
            .as_deref()
            .map(crate::paths::command_logs_dir)
    }
}

impl std::fmt::Debug for AssistState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistState")
            .field("routines", &self.routines)
            .field("settings", &self.settings)
            .field("config_dir", &self.config_dir)
            .finish_non_exhaustive()
    }
}
