use once_cell::sync::OnceCell;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Keeps the background file writer alive for the rest of the process.
static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/// Initialise logging. With `debug` the default level is `debug` and can be
/// overridden via the `RUST_LOG` environment variable; otherwise the level is
/// fixed at `info`. When `log_file` is given, output is also appended to that
/// file.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    // Without debug logging a stray `RUST_LOG` in the environment is ignored.
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let file_writer = log_file.and_then(|path| {
        let dir = path.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
        let name = path.file_name()?.to_owned();
        if let Err(e) = std::fs::create_dir_all(&dir) {
            eprintln!("could not create log folder {}: {e}", dir.display());
            return None;
        }
        let appender = tracing_appender::rolling::never(dir, name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        Some(writer)
    });

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let _ = match file_writer {
        Some(writer) => builder
            .with_ansi(false)
            .with_writer(std::io::stderr.and(writer))
            .try_init(),
        None => builder.with_writer(std::io::stderr).try_init(),
    };
}
