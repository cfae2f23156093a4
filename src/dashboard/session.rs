use crate::dashboard::persistence::{ImportReport, Persistence};
use crate::dashboard::reducer::{reduce, Intent};
use crate::dashboard::store::DashboardStore;
use crate::dashboard::widgets::WidgetRegistry;
use crate::error::Result;
use anyhow::Context;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Owns the current dashboard version for one user session.
///
/// All writes go through `dispatch`, which takes `&mut self`, so transitions
/// are applied one at a time. Readers hold `Arc` versions that never change.
pub struct DashboardSession {
    current: Arc<DashboardStore>,
    persistence: Persistence,
    registry: WidgetRegistry,
    loaded: bool,
    notices: Vec<String>,
}

impl DashboardSession {
    /// An empty session that does not autosave until `hydrate` has run.
    pub fn new(persistence: Persistence, registry: WidgetRegistry) -> Self {
        Self {
            current: Arc::new(DashboardStore::new()),
            persistence,
            registry,
            loaded: false,
            notices: Vec::new(),
        }
    }

    /// Create a session and restore the saved dashboard.
    pub fn open(persistence: Persistence, registry: WidgetRegistry) -> Self {
        let mut session = Self::new(persistence, registry);
        session.hydrate();
        session
    }

    /// Restore the saved dashboard. Autosave starts afterwards unless the
    /// saved slot could not be preserved.
    pub fn hydrate(&mut self) {
        let hydrated = self.persistence.hydrate();
        self.notices.extend(hydrated.warnings);
        if let Some(snapshot) = hydrated.snapshot {
            let count = snapshot.widgets().len();
            match reduce(&self.current, Intent::LoadSnapshot(snapshot), &self.registry) {
                Ok(next) => {
                    tracing::info!(widgets = count, "dashboard restored");
                    self.current = Arc::new(next);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to restore dashboard");
                    self.notices.push(e.to_string());
                }
            }
        }
        self.loaded = hydrated.autosave;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn store(&self) -> Arc<DashboardStore> {
        Arc::clone(&self.current)
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    /// Apply `intent`. A rejected intent leaves the current version in place.
    /// Storage failures during autosave are reported through `take_notices`
    /// and do not fail the dispatch.
    pub fn dispatch(&mut self, intent: Intent) -> Result<Arc<DashboardStore>> {
        let name = intent.name();
        tracing::debug!(intent = name, "dispatch");
        let next = match reduce(&self.current, intent, &self.registry) {
            Ok(next) => next,
            Err(e) => {
                tracing::warn!(intent = name, error = %e, "intent rejected");
                return Err(e);
            }
        };
        self.current = Arc::new(next);
        if self.loaded {
            self.autosave();
        }
        Ok(self.store())
    }

    fn autosave(&mut self) {
        if let Err(e) = self.persistence.save(&self.current) {
            tracing::warn!(error = %e, "autosave failed");
            self.notices.push(e.to_string());
        }
    }

    /// Validate `bytes` and load them, replacing the dashboard.
    pub fn import(&mut self, bytes: &[u8]) -> Result<ImportReport> {
        let report = match self.persistence.import(bytes) {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(error = %e, "import rejected");
                return Err(e);
            }
        };
        self.dispatch(Intent::LoadSnapshot(report.snapshot.clone()))?;
        tracing::info!(
            widgets = report.snapshot.widgets().len(),
            dropped = report.warnings.len(),
            "dashboard imported"
        );
        Ok(report)
    }

    pub fn import_file(&mut self, path: &Path) -> anyhow::Result<ImportReport> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read import file {}", path.display()))?;
        Ok(self.import(&bytes)?)
    }

    pub fn export(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        self.persistence.export(&self.current, dir)
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::persistence::STATE_KEY;
    use crate::dashboard::widgets::WidgetVariant;
    use crate::storage::{KeyValueStore, MemoryStore};

    fn session(storage: &MemoryStore) -> DashboardSession {
        DashboardSession::open(
            Persistence::new(Arc::new(storage.clone())),
            WidgetRegistry::with_defaults(),
        )
    }

    #[test]
    fn readers_keep_their_version() {
        let storage = MemoryStore::new();
        let mut session = session(&storage);
        let before = session.store();
        session
            .dispatch(Intent::AddWidget(WidgetVariant::Notes))
            .unwrap();
        assert!(before.is_empty());
        assert_eq!(session.store().len(), 1);
    }

    #[test]
    fn no_autosave_before_hydrate() {
        let storage = MemoryStore::new();
        let mut session = DashboardSession::new(
            Persistence::new(Arc::new(storage.clone())),
            WidgetRegistry::with_defaults(),
        );
        session.dispatch(Intent::OpenAddModal).unwrap();
        assert!(storage.is_empty());
        session.hydrate();
        session.dispatch(Intent::CloseAddModal).unwrap();
        assert!(storage.get(STATE_KEY).unwrap().is_some());
    }

    #[test]
    fn rejected_import_keeps_store() {
        let storage = MemoryStore::new();
        let mut session = session(&storage);
        session.dispatch(Intent::AddWidget(WidgetVariant::Chart)).unwrap();
        let before = session.store();
        assert!(session.import(br#"{"foo": 1}"#).is_err());
        assert_eq!(*session.store(), *before);
    }
}
