use crate::dashboard::store::DashboardStore;
use crate::dashboard::widgets::Widget;
use crate::error::{DashboardError, Result};
use crate::storage::KeyValueStore;
use anyhow::Context;
use chrono::NaiveDateTime;
use serde_json::Value;
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Fixed slot name of the autosaved dashboard.
pub const STATE_KEY: &str = "dashboardState";

/// A validated set of widgets ready to be loaded into the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    widgets: Vec<Widget>,
}

impl Snapshot {
    /// Wrap already typed widgets, rejecting duplicate ids.
    pub fn from_widgets(widgets: Vec<Widget>) -> Result<Self> {
        let mut seen = HashSet::new();
        for widget in &widgets {
            if !seen.insert(widget.id().clone()) {
                return Err(DashboardError::InvalidSnapshot(format!(
                    "duplicate widget id '{}'",
                    widget.id()
                )));
            }
        }
        Ok(Self { widgets })
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    pub fn into_widgets(self) -> Vec<Widget> {
        self.widgets
    }
}

/// How to treat individual bad widgets in an otherwise valid document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Any malformed widget or duplicate id rejects the whole document.
    Strict,
    /// Malformed widgets and later duplicates are dropped with a warning.
    Lenient,
}

impl Default for ImportMode {
    fn default() -> Self {
        Self::Strict
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub snapshot: Snapshot,
    pub warnings: Vec<String>,
}

/// Validate an externally supplied document.
///
/// The top level must be an object whose `widgets` field is an array. Other
/// top-level fields (modal flags, selection) are ignored since loading always
/// resets them.
pub fn parse_snapshot(bytes: &[u8], mode: ImportMode) -> Result<ImportReport> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| DashboardError::InvalidSnapshot(format!("not valid JSON: {e}")))?;
    let Value::Object(mut root) = value else {
        return Err(DashboardError::InvalidSnapshot(
            "top-level value must be an object".into(),
        ));
    };
    let items = match root.remove("widgets") {
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(DashboardError::InvalidSnapshot(
                "`widgets` must be an array".into(),
            ))
        }
        None => {
            return Err(DashboardError::InvalidSnapshot(
                "missing `widgets` field".into(),
            ))
        }
    };

    let mut widgets = Vec::with_capacity(items.len());
    let mut seen = HashSet::new();
    let mut warnings = Vec::new();
    for (idx, item) in items.into_iter().enumerate() {
        let problem = match serde_json::from_value::<Widget>(item) {
            Ok(widget) if seen.contains(widget.id()) => {
                format!("widget #{idx} reuses id '{}'", widget.id())
            }
            Ok(widget) => {
                seen.insert(widget.id().clone());
                widgets.push(widget);
                continue;
            }
            Err(e) => format!("widget #{idx} is malformed: {e}"),
        };
        match mode {
            ImportMode::Strict => return Err(DashboardError::InvalidSnapshot(problem)),
            ImportMode::Lenient => {
                tracing::warn!(index = idx, "{problem}; dropped");
                warnings.push(format!("{problem}; dropped"));
            }
        }
    }

    Ok(ImportReport {
        snapshot: Snapshot { widgets },
        warnings,
    })
}

/// Serialize the full store. Autosave and export share this format.
pub fn serialize_store(store: &DashboardStore) -> Result<String> {
    serde_json::to_string_pretty(store).map_err(DashboardError::storage)
}

pub fn export_file_name(now: NaiveDateTime) -> String {
    format!("dashboard-{}.json", now.format("%Y%m%d-%H%M%S"))
}

/// Outcome of reading the saved slot at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hydrated {
    pub snapshot: Option<Snapshot>,
    pub warnings: Vec<String>,
    /// False when the slot could not be preserved, in which case writing
    /// over it would lose data.
    pub autosave: bool,
}

impl Hydrated {
    fn empty(warnings: Vec<String>) -> Self {
        Self {
            snapshot: None,
            warnings,
            autosave: true,
        }
    }
}

/// Mirrors the store into a durable slot and handles import/export files.
#[derive(Clone)]
pub struct Persistence {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    mode: ImportMode,
}

impl Persistence {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            key: STATE_KEY.to_string(),
            mode: ImportMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: ImportMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> ImportMode {
        self.mode
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the saved slot. A missing slot yields no snapshot. An unreadable
    /// or invalid slot is moved aside before the session starts empty, and a
    /// slot that lost widgets during salvage keeps its original copy aside
    /// too.
    pub fn hydrate(&self) -> Hydrated {
        let content = match self.storage.get(&self.key) {
            Ok(Some(content)) => content,
            Ok(None) => return Hydrated::empty(Vec::new()),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read saved dashboard");
                return self.set_aside(vec![e.to_string()]);
            }
        };
        if content.trim().is_empty() {
            return Hydrated::empty(Vec::new());
        }
        // Salvage what we can from our own slot rather than losing everything.
        match parse_snapshot(content.as_bytes(), ImportMode::Lenient) {
            Ok(report) if report.warnings.is_empty() => Hydrated {
                snapshot: Some(report.snapshot),
                warnings: Vec::new(),
                autosave: true,
            },
            Ok(report) => {
                let mut hydrated = self.set_aside(report.warnings);
                if hydrated.autosave {
                    let salvaged = DashboardStore {
                        widgets: report.snapshot.widgets().to_vec(),
                        ..DashboardStore::default()
                    };
                    if let Err(e) = self.save(&salvaged) {
                        tracing::warn!(error = %e, "failed to rewrite salvaged dashboard");
                        hydrated.warnings.push(e.to_string());
                    }
                }
                hydrated.snapshot = Some(report.snapshot);
                hydrated
            }
            Err(e) => {
                tracing::warn!(error = %e, "saved dashboard is unusable; starting empty");
                self.set_aside(vec![e.to_string()])
            }
        }
    }

    /// Move the slot out of autosave's way. When that fails autosave stays
    /// off for the session.
    fn set_aside(&self, mut warnings: Vec<String>) -> Hydrated {
        match self.storage.quarantine(&self.key) {
            Ok(Some(kept)) => {
                tracing::warn!(kept = %kept, "saved dashboard kept aside");
                warnings.push(format!("previous dashboard kept as {kept}"));
                Hydrated::empty(warnings)
            }
            Ok(None) => Hydrated::empty(warnings),
            Err(e) => {
                tracing::warn!(error = %e, "could not keep saved dashboard aside; autosave off");
                warnings.push(format!("{e}; autosave is off for this session"));
                Hydrated {
                    snapshot: None,
                    warnings,
                    autosave: false,
                }
            }
        }
    }

    pub fn save(&self, store: &DashboardStore) -> Result<()> {
        let json = serialize_store(store)?;
        self.storage.set(&self.key, &json)
    }

    pub fn import(&self, bytes: &[u8]) -> Result<ImportReport> {
        parse_snapshot(bytes, self.mode)
    }

    /// Write an export file into `dir`, named after `now`. An existing file of
    /// the same name is never overwritten.
    pub fn export_to(
        &self,
        store: &DashboardStore,
        dir: &Path,
        now: NaiveDateTime,
    ) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create export folder {}", dir.display()))?;
        let json = serialize_store(store)?;
        let base = export_file_name(now);
        let stem = base.trim_end_matches(".json");
        let mut suffix = 0;
        loop {
            let path = if suffix == 0 {
                dir.join(&base)
            } else {
                dir.join(format!("{stem}-{suffix}.json"))
            };
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(json.as_bytes())
                        .with_context(|| format!("write export file {}", path.display()))?;
                    tracing::info!(path = %path.display(), "dashboard exported");
                    return Ok(path);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => suffix += 1,
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("create export file {}", path.display()))
                }
            }
        }
    }

    pub fn export(&self, store: &DashboardStore, dir: &Path) -> anyhow::Result<PathBuf> {
        self.export_to(store, dir, chrono::Local::now().naive_local())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::NaiveDate;
    use serde_json::json;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 7)
            .unwrap()
    }

    #[test]
    fn empty_widget_list_is_valid() {
        let report = parse_snapshot(br#"{"widgets": []}"#, ImportMode::Strict).unwrap();
        assert!(report.snapshot.widgets().is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn rejects_bad_top_level_shapes() {
        let docs: [&[u8]; 4] = [
            br#"{"foo": 1}"#,
            br#"{"widgets": {}}"#,
            br#"[1, 2]"#,
            b"not json",
        ];
        for doc in docs {
            let err = parse_snapshot(doc, ImportMode::Lenient).unwrap_err();
            assert!(matches!(err, DashboardError::InvalidSnapshot(_)), "{err}");
        }
    }

    #[test]
    fn strict_mode_rejects_mismatched_config() {
        let doc = json!({"widgets": [
            {"id": "a", "type": "TODO", "title": "t", "config": {"content": "x"}}
        ]});
        let bytes = serde_json::to_vec(&doc).unwrap();
        let err = parse_snapshot(&bytes, ImportMode::Strict).unwrap_err();
        assert!(err.to_string().contains("widget #0"));
    }

    #[test]
    fn lenient_mode_drops_bad_widgets_and_duplicates() {
        let doc = json!({"widgets": [
            {"id": "a", "type": "NOTES", "title": "n", "config": {"content": "x"}},
            {"id": "b", "type": "GAUGE", "title": "g", "config": {}},
            {"id": "a", "type": "NOTES", "title": "dup", "config": {"content": "y"}}
        ]});
        let bytes = serde_json::to_vec(&doc).unwrap();
        let report = parse_snapshot(&bytes, ImportMode::Lenient).unwrap();
        assert_eq!(report.snapshot.widgets().len(), 1);
        assert_eq!(report.snapshot.widgets()[0].title, "n");
        assert_eq!(report.warnings.len(), 2);

        let err = parse_snapshot(&bytes, ImportMode::Strict).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidSnapshot(_)));
    }

    #[test]
    fn hydrate_handles_missing_and_corrupt_slots() {
        let storage = MemoryStore::new();
        let persistence = Persistence::new(Arc::new(storage.clone()));
        assert_eq!(persistence.hydrate(), Hydrated::empty(Vec::new()));

        storage.set(STATE_KEY, "{{{").unwrap();
        let hydrated = persistence.hydrate();
        assert!(hydrated.snapshot.is_none());
        assert!(hydrated.autosave);
        assert_eq!(hydrated.warnings.len(), 2);
        assert_eq!(storage.get(STATE_KEY).unwrap(), None);
        assert_eq!(
            storage.get("dashboardState.corrupt").unwrap().as_deref(),
            Some("{{{")
        );
    }

    #[test]
    fn salvaged_slot_keeps_original_aside() {
        let storage = MemoryStore::new();
        let persistence = Persistence::new(Arc::new(storage.clone()));
        let original = json!({"widgets": [
            {"id": "a", "type": "NOTES", "title": "n", "config": {"content": "x"}},
            {"id": "b", "type": "TABLE", "title": "t", "config": {"rowCount": 99, "colCount": 3}}
        ]})
        .to_string();
        storage.set(STATE_KEY, &original).unwrap();

        let hydrated = persistence.hydrate();
        assert_eq!(hydrated.snapshot.unwrap().widgets().len(), 1);
        assert_eq!(
            storage.get("dashboardState.corrupt").unwrap(),
            Some(original)
        );
        let rewritten = storage.get(STATE_KEY).unwrap().unwrap();
        let report = parse_snapshot(rewritten.as_bytes(), ImportMode::Strict).unwrap();
        assert_eq!(report.snapshot.widgets().len(), 1);
    }

    #[test]
    fn unpreservable_slot_turns_autosave_off() {
        let storage = MemoryStore::new();
        storage.set(STATE_KEY, "{{{").unwrap();
        storage.set_fail_writes(true);
        let hydrated = Persistence::new(Arc::new(storage.clone())).hydrate();
        assert!(!hydrated.autosave);
        assert_eq!(storage.get(STATE_KEY).unwrap().as_deref(), Some("{{{"));
    }

    #[test]
    fn oversized_table_fails_strict_import() {
        let doc = json!({"widgets": [
            {"id": "t", "type": "TABLE", "title": "t", "config": {"rowCount": 100000, "colCount": 100000}}
        ]});
        let bytes = serde_json::to_vec(&doc).unwrap();
        let err = parse_snapshot(&bytes, ImportMode::Strict).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidSnapshot(_)));
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn export_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let persistence = Persistence::new(Arc::new(MemoryStore::new()));
        let store = DashboardStore::new();
        let first = persistence.export_to(&store, dir.path(), ts()).unwrap();
        let second = persistence.export_to(&store, dir.path(), ts()).unwrap();
        assert_eq!(
            first.file_name().unwrap().to_str().unwrap(),
            "dashboard-20240309-140507.json"
        );
        assert_eq!(
            second.file_name().unwrap().to_str().unwrap(),
            "dashboard-20240309-140507-1.json"
        );
        let text = std::fs::read_to_string(first).unwrap();
        assert_eq!(text, serialize_store(&store).unwrap());
    }

    #[test]
    fn export_never_overwrites_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let taken = dir.path().join("dashboard-20240309-140507-1.json");
        std::fs::write(dir.path().join("dashboard-20240309-140507.json"), "mine").unwrap();
        std::fs::write(&taken, "also mine").unwrap();
        let persistence = Persistence::new(Arc::new(MemoryStore::new()));
        let path = persistence
            .export_to(&DashboardStore::new(), dir.path(), ts())
            .unwrap();
        assert!(path.ends_with("dashboard-20240309-140507-2.json"));
        assert_eq!(std::fs::read_to_string(taken).unwrap(), "also mine");
    }
}
