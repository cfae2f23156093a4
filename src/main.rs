use dashboard_editor::auth::AuthSession;
use dashboard_editor::cli::{self, ParseArgsResult};
use dashboard_editor::dashboard::{DashboardSession, Persistence, WidgetRegistry};
use dashboard_editor::settings::{Settings, SETTINGS_FILE};
use dashboard_editor::storage::{FileStore, KeyValueStore};
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    let settings = Settings::load(SETTINGS_FILE)?;
    dashboard_editor::logging::init(settings.debug_logging, settings.log_file());

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let command = match cli::parse_args(&args) {
        ParseArgsResult::Parsed(command) => command,
        ParseArgsResult::Usage(usage) => {
            eprintln!("{usage}");
            std::process::exit(2);
        }
    };

    let data_dir = settings.data_dir();
    tracing::debug!(dir = %data_dir.display(), "using data folder");
    let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&data_dir));
    let mut auth = AuthSession::restore(Arc::clone(&storage));
    let persistence = Persistence::new(storage).with_mode(settings.import_mode());
    let mut session = DashboardSession::open(persistence, WidgetRegistry::with_defaults());

    let result = cli::run(command, &mut session, &mut auth, &settings.export_dir());
    for notice in session.take_notices() {
        eprintln!("notice: {notice}");
    }
    match result {
        Ok(output) => {
            println!("{output}");
            Ok(())
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}
