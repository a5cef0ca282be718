//! Logging backend for the binary.
//!
//! The core logs through the `log` facade; `tracing-subscriber` bridges those
//! records (its `tracing-log` feature) and writes them to stderr and to the
//! configured log file.
//!
//! The backend is installed before the configuration is read, so the log
//! file is not known yet. Records emitted until [`LogHandle::configure`] runs
//! are kept in memory and written out once the file is open.
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use consolar_core::{LogLevel, LogSettings};
use tracing::{Level, Metadata};
use tracing_subscriber::filter::{LevelFilter, filter_fn};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Upper bound on startup output held back for the log file
const STARTUP_BUFFER_LIMIT: usize = 64 * 1024;

fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warning => LevelFilter::WARN,
        LogLevel::Error | LogLevel::Critical => LevelFilter::ERROR,
    }
}

/// Outside debug mode the console only shows warnings and errors so it does
/// not bury the menu.
fn console_filter(level: LogLevel) -> LevelFilter {
    if level == LogLevel::Debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    }
}

fn level_rank(level: Level) -> u8 {
    match level {
        Level::ERROR => 1,
        Level::WARN => 2,
        Level::INFO => 3,
        Level::DEBUG => 4,
        _ => 5,
    }
}

fn filter_rank(filter: LevelFilter) -> u8 {
    filter.into_level().map_or(0, level_rank)
}

/// Level threshold that can change after the subscriber is installed
#[derive(Clone)]
struct SharedLevel(Arc<AtomicU8>);

impl SharedLevel {
    fn new(filter: LevelFilter) -> Self {
        Self(Arc::new(AtomicU8::new(filter_rank(filter))))
    }

    fn set(&self, filter: LevelFilter) {
        self.0.store(filter_rank(filter), Ordering::Relaxed);
    }

    fn enables(&self, metadata: &Metadata<'_>) -> bool {
        level_rank(*metadata.level()) <= self.0.load(Ordering::Relaxed)
    }
}

enum FileState {
    Buffering(Vec<u8>),
    Open(File),
    Closed,
}

/// Log file writer that buffers until the file is attached
#[derive(Clone)]
struct DeferredFile(Arc<Mutex<FileState>>);

impl DeferredFile {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(FileState::Buffering(Vec::new()))))
    }

    fn state(&self) -> MutexGuard<'_, FileState> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Writes the buffered output to `file` and sends everything after it there
    fn attach(&self, mut file: File) -> io::Result<()> {
        let mut state = self.state();
        let flushed = match &*state {
            FileState::Buffering(buffer) => file.write_all(buffer),
            _ => Ok(()),
        };
        *state = FileState::Open(file);
        flushed
    }

    /// Drops the buffer; later output is discarded
    fn close(&self) {
        *self.state() = FileState::Closed;
    }
}

impl Write for DeferredFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut *self.state() {
            FileState::Buffering(buffer) => {
                if buffer.len() + buf.len() <= STARTUP_BUFFER_LIMIT {
                    buffer.extend_from_slice(buf);
                }
                Ok(buf.len())
            }
            FileState::Open(file) => file.write(buf),
            FileState::Closed => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut *self.state() {
            FileState::Open(file) => file.flush(),
            _ => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for DeferredFile {
    type Writer = DeferredFile;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Adjusts the installed backend once the configuration is known
pub struct LogHandle {
    console: SharedLevel,
    file: SharedLevel,
    file_writer: DeferredFile,
}

impl LogHandle {
    /// Applies the configured levels and opens the log file. On failure the
    /// held back records are dropped and logging continues on stderr alone.
    pub fn configure(&self, settings: &LogSettings) -> io::Result<()> {
        self.console.set(console_filter(settings.level));
        self.file.set(level_filter(settings.level));

        let opened = fs::create_dir_all(&settings.log_dir).and_then(|_| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(settings.log_path())
        });
        match opened {
            Ok(file) => self.file_writer.attach(file),
            Err(e) => {
                self.file_writer.close();
                Err(e)
            }
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` narrows what reaches either
/// output.
pub fn init_logging(debug: bool) -> io::Result<LogHandle> {
    let initial = if debug { LogLevel::Debug } else { LogLevel::Info };
    let handle = LogHandle {
        console: SharedLevel::new(console_filter(initial)),
        file: SharedLevel::new(level_filter(initial)),
        file_writer: DeferredFile::new(),
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let console_level = handle.console.clone();
    let console_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(filter_fn(move |metadata| console_level.enables(metadata)));

    let file_level = handle.file.clone();
    let file_layer = fmt::layer()
        .with_writer(handle.file_writer.clone())
        .with_ansi(false)
        .with_filter(filter_fn(move |metadata| file_level.enables(metadata)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(io::Error::other)?;
    Ok(handle)
}
