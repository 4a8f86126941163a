//! Single two-mode executable (spec §6): given a path, instrument it;
//! given no argument, run the debug server.

use std::path::PathBuf;

use clap::Parser;
use tracewright_debugger::session;

/// `tracewright` — instrument a `.step` source or package, or serve a
/// debugging session for one.
#[derive(Debug, Parser)]
#[command(name = "tracewright", version, author)]
struct Cli {
    /// A `.step` file or package directory to instrument. Omit to run the
    /// debug server instead (spec §6).
    path: Option<PathBuf>,

    /// Render with plain bolded lines on stdout instead of the ratatui
    /// screen (SPEC_FULL §4, useful in CI or piped output).
    #[arg(long)]
    no_tui: bool,
}

fn main() {
    let cli = Cli::parse();

    match cli.path {
        Some(path) => {
            init_instrumentor_logging();
            run_instrument(&path);
        }
        None => {
            init_server_logging();
            run_server(!cli.no_tui);
        }
    }
}

/// Instrumentor logs to standard error (spec §6).
fn init_instrumentor_logging() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .init();
}

/// Debug server writes to `./jeb.log`, append mode, plain text (spec §6).
fn init_server_logging() {
    let appender = tracing_appender::rolling::never(".", "jeb.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    // Leaked deliberately: the guard must outlive the process for the
    // non-blocking writer to flush on exit, and the server has no
    // natural owner to hold it past `main`.
    Box::leak(Box::new(guard));
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

fn run_instrument(path: &std::path::Path) {
    let loaded = match tracewright::loader::load(path) {
        Ok(loaded) => loaded,
        Err(err) => {
            tracing::error!(%err, path = %path.display(), "failed to load source");
            std::process::exit(1);
        }
    };

    let transformed = tracewright::transform::transform_unit(&loaded.unit);
    let scratch_root = scratch_root();

    match tracewright::emitter::emit(&transformed.unit, &scratch_root) {
        Ok(out_path) => {
            tracing::info!(out = %out_path.display(), "instrumented unit written");
        }
        Err(err) => {
            tracing::error!(%err, "failed to emit instrumented unit");
            std::process::exit(1);
        }
    }
}

fn scratch_root() -> std::path::PathBuf {
    std::env::var_os("TMPDIR")
        .or_else(|| std::env::var_os("TEMP"))
        .map(std::path::PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
        .join("tracewright")
}

fn run_server(tui: bool) {
    let socket_path = tracewright::socket_path();
    match session::run(&socket_path, tui) {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            tracing::error!(%err, "server failed");
            std::process::exit(1);
        }
    }
}
