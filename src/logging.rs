//! Log facility: stderr at DEBUG plus an optional JSON file sink.
//!
//! The sink spec comes from the config's `lumberjacklogger` block.  The
//! file is rotated when opened if it exceeds the configured size; rotated
//! files get numeric suffixes (`<file>.1` is the newest backup) and are
//! pruned by count and age.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LogSink;
use crate::error::{Error, Result};

/// Initializes the global tracing dispatcher.
///
/// Installs a human-readable stderr writer at DEBUG (overridable via
/// `RUST_LOG`) and, if `sink` is given, a line-delimited JSON writer
/// appending to the sink's file.
pub fn init(sink: Option<&LogSink>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("debug"));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false);

    let file_layer = match sink {
        Some(sink) => {
            let file = open_sink(sink)?;
            Some(tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(Arc::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}

/// Logs panics before handing them to the default hook, so they land in
/// the file sink too.
pub fn log_on_panic() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!(panic = %info, "panic");
        default_hook(info);
    }));
}

/// Opens the sink file for appending, rotating and pruning first.
/// Missing parent directories are created, like lumberjack does.
fn open_sink(sink: &LogSink) -> Result<File> {
    let path = Path::new(&sink.filename);
    let context = || format!("can't open log file {}", sink.filename);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::io(context(), e))?;
        }
    }

    let over_limit = sink.maxsize > 0
        && fs::metadata(path)
            .map(|m| m.len() >= sink.maxsize * 1024 * 1024)
            .unwrap_or(false);
    if over_limit {
        rotate(path, sink.maxbackups).map_err(|e| Error::io(context(), e))?;
    }
    prune_by_age(path, sink.maxage).map_err(|e| Error::io(context(), e))?;

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::io(context(), e))
}

fn backup_path(path: &Path, index: u32) -> std::path::PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{}", index));
    name.into()
}

/// Shifts `<file>.N` to `<file>.N+1` and moves the live file to
/// `<file>.1`, deleting whatever falls off the end.
fn rotate(path: &Path, maxbackups: u32) -> io::Result<()> {
    // With no backup budget the oversized file is simply truncated by
    // removing it.
    if maxbackups == 0 {
        return fs::remove_file(path);
    }

    let _ = fs::remove_file(backup_path(path, maxbackups));
    for index in (1..maxbackups).rev() {
        let from = backup_path(path, index);
        if from.exists() {
            fs::rename(&from, backup_path(path, index + 1))?;
        }
    }
    fs::rename(path, backup_path(path, 1))
}

fn prune_by_age(path: &Path, maxage_days: u64) -> io::Result<()> {
    if maxage_days == 0 {
        return Ok(());
    }
    let cutoff = SystemTime::now()
        - Duration::from_secs(maxage_days * 24 * 60 * 60);

    let mut index = 1;
    loop {
        let backup = backup_path(path, index);
        if !backup.exists() {
            return Ok(());
        }
        let modified = fs::metadata(&backup)?.modified()?;
        if modified < cutoff {
            fs::remove_file(&backup)?;
        }
        index += 1;
    }
}
