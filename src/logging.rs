//! Per-client log files.
//!
//! Each [Client](crate::Client) owns a [Dispatch] that appends to its own
//! file. Client operations run with that dispatch as the thread's default,
//! so two clients never write into each other's log, and nothing is
//! installed globally.

use std::{
    fs::{self, OpenOptions},
    io,
    path::Path,
    sync::Mutex,
};

use tracing::{Dispatch, level_filters::LevelFilter};
use tracing_subscriber::fmt::time::ChronoLocal;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Open (or create) the log file in append mode and build a dispatch that
/// writes one line per event to it.
pub(crate) fn file_dispatch(path: &Path, debug: bool) -> io::Result<Dispatch> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let level = if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    // The mutex serializes writes when a client is shared between threads.
    let subscriber = tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_owned()))
        .with_max_level(level)
        .finish();

    Ok(Dispatch::new(subscriber))
}
