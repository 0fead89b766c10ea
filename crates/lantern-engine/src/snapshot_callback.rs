//! Tick callback that logs progress and publishes the terminal snapshot.
//!
//! Front ends poll the snapshot file. It is written to a sibling temporary
//! file first and renamed into place so readers never see a partial file.

use std::path::{Path, PathBuf};

use lantern_core::TerminalState;
use lantern_core::runner::{SummaryLogger, TickCallback};
use lantern_core::tick::TickSummary;
use lantern_types::TerminalSnapshot;
use tracing::{debug, warn};

use crate::error::EngineError;

/// Callback that bridges the tick cycle to log output and the snapshot file.
pub struct SnapshotCallback {
    summary: SummaryLogger,
    path: Option<PathBuf>,
    every: u64,
}

impl SnapshotCallback {
    /// Log every `summary_every` ticks and write the snapshot to `path`
    /// every `snapshot_every` ticks.
    pub const fn new(summary_every: u64, path: Option<PathBuf>, snapshot_every: u64) -> Self {
        Self {
            summary: SummaryLogger::new(summary_every),
            path,
            every: snapshot_every,
        }
    }
}

impl TickCallback for SnapshotCallback {
    fn on_tick(&mut self, summary: &TickSummary, state: &TerminalState) {
        self.summary.on_tick(summary, state);

        let Some(path) = &self.path else {
            return;
        };
        if summary.tick.checked_rem(self.every) != Some(0) {
            return;
        }
        match write_snapshot(path, &state.snapshot()) {
            Ok(bytes) => debug!(tick = summary.tick, bytes, "Snapshot written"),
            Err(e) => warn!(tick = summary.tick, error = %e, "Snapshot write failed"),
        }
    }
}

/// Serialize `snapshot` as JSON and replace the file at `path`.
///
/// Returns the number of bytes written.
pub fn write_snapshot(path: &Path, snapshot: &TerminalSnapshot) -> Result<usize, EngineError> {
    let json = serde_json::to_vec(snapshot).map_err(|e| EngineError::Snapshot {
        message: format!("failed to serialize snapshot: {e}"),
    })?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| EngineError::Snapshot {
        message: format!("failed to write {}: {e}", tmp.display()),
    })?;
    std::fs::rename(&tmp, path).map_err(|e| EngineError::Snapshot {
        message: format!("failed to replace {}: {e}", path.display()),
    })?;
    Ok(json.len())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use lantern_core::{TerminalConfig, TerminalLayout};

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("lantern-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn snapshot_file_round_trips() {
        let mut config = TerminalConfig::default();
        config.yard.seed_on_start = false;
        let state = TerminalState::new(&config, TerminalLayout::builtin()).unwrap();
        let path = temp_path("snapshot");

        let bytes = write_snapshot(&path, &state.snapshot()).unwrap();
        let contents = std::fs::read(&path).unwrap();
        assert_eq!(contents.len(), bytes);

        let parsed: TerminalSnapshot = serde_json::from_slice(&contents).unwrap();
        assert_eq!(parsed.tick, 0);
        assert_eq!(parsed.zones.len(), state.zones.len());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_directory_is_reported() {
        let state =
            TerminalState::new(&TerminalConfig::default(), TerminalLayout::builtin()).unwrap();
        let path = Path::new("/nonexistent-lantern-dir/snapshot.json");
        let result = write_snapshot(path, &state.snapshot());
        assert!(matches!(result, Err(EngineError::Snapshot { .. })));
    }
}
