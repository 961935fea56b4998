use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::models::{HistoryEntry, HistoryWindow, Scope};

/// Persistence boundary for per-scope delivery history. Loaded once at the
/// start of a scope's run and saved once at the end.
pub trait HistoryStore: Send + Sync {
    fn load(&self, scope: &Scope) -> Result<HistoryWindow>;
    fn save(&self, scope: &Scope, window: &HistoryWindow) -> Result<()>;
}

/// JSON file-per-scope history store
pub struct JsonHistoryStore {
    base_path: PathBuf,
    cap: usize,
}

impl JsonHistoryStore {
    pub fn new(base_path: impl AsRef<Path>, cap: usize) -> Result<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).with_context(|| {
            format!(
                "Failed to create history directory: {}",
                base_path.display()
            )
        })?;

        info!(path = %base_path.display(), "Initialized JSON history store");

        Ok(Self { base_path, cap })
    }

    fn scope_path(&self, scope: &Scope) -> PathBuf {
        self.base_path.join(format!("{}_history.json", scope.key()))
    }
}

impl HistoryStore for JsonHistoryStore {
    fn load(&self, scope: &Scope) -> Result<HistoryWindow> {
        let path = self.scope_path(scope);
        if !path.exists() {
            debug!(scope = %scope, "No history yet for scope");
            return Ok(HistoryWindow::new(self.cap));
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read history: {}", path.display()))?;

        let entries: Vec<HistoryEntry> =
            serde_json::from_str(&content).context("Failed to parse history")?;

        debug!(scope = %scope, entries = entries.len(), "Loaded history");

        Ok(HistoryWindow::from_entries(entries, self.cap))
    }

    fn save(&self, scope: &Scope, window: &HistoryWindow) -> Result<()> {
        let path = self.scope_path(scope);
        let content = serde_json::to_string_pretty(window.entries())?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write history: {}", path.display()))?;

        debug!(scope = %scope, entries = window.len(), "Saved history");

        Ok(())
    }
}
