use std::sync::Arc;

use dashboard_editor::auth::AuthSession;
use dashboard_editor::cli::{parse_args, run, Command, ParseArgsResult};
use dashboard_editor::dashboard::widgets::WidgetConfig;
use dashboard_editor::dashboard::{DashboardSession, Persistence, WidgetRegistry};
use dashboard_editor::storage::{KeyValueStore, MemoryStore};
use tempfile::tempdir;

struct Host {
    session: DashboardSession,
    auth: AuthSession,
    export_dir: tempfile::TempDir,
}

impl Host {
    fn new() -> Self {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        Self {
            session: DashboardSession::open(
                Persistence::new(Arc::clone(&storage)),
                WidgetRegistry::with_defaults(),
            ),
            auth: AuthSession::restore(storage),
            export_dir: tempdir().unwrap(),
        }
    }

    fn exec(&mut self, args: &[&str]) -> anyhow::Result<String> {
        let command = match parse_args(args) {
            ParseArgsResult::Parsed(command) => command,
            ParseArgsResult::Usage(usage) => panic!("{args:?} did not parse:\n{usage}"),
        };
        run(
            command,
            &mut self.session,
            &mut self.auth,
            self.export_dir.path(),
        )
    }
}

#[test]
fn editing_requires_login() {
    let mut host = Host::new();
    assert!(host.exec(&["add", "notes"]).is_err());
    assert!(host.session.store().is_empty());
    assert!(host.exec(&["list"]).unwrap().contains("empty"));

    assert_eq!(host.exec(&["login"]).unwrap(), "signed in as Tom Gordon");
    assert!(host.exec(&["add", "notes"]).is_ok());
    host.exec(&["logout"]).unwrap();
    assert!(host.exec(&["delete", "1"]).is_err());
    assert_eq!(host.session.store().len(), 1);
}

#[test]
fn full_editing_session() {
    let mut host = Host::new();
    host.exec(&["login"]).unwrap();
    host.exec(&["add", "todo"]).unwrap();
    host.exec(&["add", "TABLE"]).unwrap();
    host.exec(&["add", "notes"]).unwrap();
    assert!(host.exec(&["add", "gauge"]).is_err());

    host.exec(&["todo-add", "1", "buy", "milk"]).unwrap();
    host.exec(&["todo-add", "1", "call", "mum"]).unwrap();
    host.exec(&["todo-toggle", "1", "1"]).unwrap();
    host.exec(&["table", "2", "50", "4"]).unwrap();
    host.exec(&["note", "3", "remember", "the", "milk"]).unwrap();
    assert_eq!(
        host.exec(&["note", "3", "remember", "the", "milk"]).unwrap(),
        "note unchanged"
    );
    host.exec(&["rename", "2", "Budget"]).unwrap();

    let store = host.session.store();
    assert!(store.is_consistent());
    assert!(!store.is_add_modal_open && !store.is_edit_modal_open);
    match &store.widgets[0].config {
        WidgetConfig::Todo(todo) => {
            assert_eq!(todo.items.len(), 2);
            // Completed tasks sink below open ones.
            assert_eq!(todo.items[0].text, "call mum");
            assert!(todo.items[1].completed);
            assert_eq!(todo.pending(), 1);
        }
        other => panic!("unexpected config {other:?}"),
    }
    match &store.widgets[1].config {
        WidgetConfig::Table(table) => assert_eq!((table.row_count, table.col_count), (20, 4)),
        other => panic!("unexpected config {other:?}"),
    }
    assert_eq!(store.widgets[1].title, "Budget");

    let listing = host.exec(&["move", "3", "1"]).unwrap();
    assert!(listing.starts_with("1. [NOTES]"));

    host.exec(&["delete", "2"]).unwrap();
    let store = host.session.store();
    assert_eq!(store.len(), 2);
    assert!(!store.is_delete_modal_open);
    assert_eq!(store.selected_widget, None);
}

#[test]
fn type_mismatch_is_refused() {
    let mut host = Host::new();
    host.exec(&["login"]).unwrap();
    host.exec(&["add", "chart"]).unwrap();
    assert!(host.exec(&["note", "1", "hello"]).is_err());
    assert!(host.exec(&["table", "1", "2", "2"]).is_err());
    assert!(host.exec(&["move", "1", "5"]).is_err());
}

#[test]
fn export_import_round_trip() {
    let mut host = Host::new();
    host.exec(&["login"]).unwrap();
    host.exec(&["add", "list"]).unwrap();
    host.exec(&["team", "1", "tor"]).unwrap();
    let out = host.exec(&["export"]).unwrap();
    let path = out.trim_start_matches("exported to ").to_string();

    let mut other = Host::new();
    other.exec(&["login"]).unwrap();
    other.exec(&["add", "notes"]).unwrap();
    assert_eq!(
        other.exec(&["import", path.as_str()]).unwrap(),
        "imported 1 widgets"
    );
    assert!(other.exec(&["list"]).unwrap().contains("team TOR"));
}

#[test]
fn registry_lists_every_variant() {
    let mut host = Host::new();
    let out = host.exec(&["registry"]).unwrap();
    for name in ["CHART", "TABLE", "LIST", "TODO", "NOTES"] {
        assert!(out.contains(name), "{name} missing from {out}");
    }
    assert!(matches!(
        parse_args(&["registry"]),
        ParseArgsResult::Parsed(Command::Registry)
    ));
}
