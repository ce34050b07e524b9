//! Tracing subscriber setup for the simulator binary.
//!
//! Two layers share one reloadable level filter: stderr (colored on a
//! terminal) and an optional log file that can be attached at any time.

use std::{
    fs::File,
    io::{self, IsTerminal, Write},
    path::Path,
    sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError},
};

use anyhow::{Context, Result, anyhow, bail};
use chrono::Local;
use tracing::{Event, Level, Subscriber, error};
use tracing_subscriber::{
    EnvFilter,
    fmt::{
        FmtContext, MakeWriter,
        format::{FormatEvent, FormatFields, Writer},
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    reload,
    util::SubscriberInitExt,
};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,sim_ui=debug";

struct EventFormat;

impl EventFormat {
    fn level_color(level: &Level) -> &'static str {
        match *level {
            Level::ERROR => "\x1b[1;31m",
            Level::WARN => "\x1b[1;33m",
            Level::INFO => "\x1b[1;32m",
            Level::DEBUG => "\x1b[1;34m",
            Level::TRACE => "\x1b[1;35m",
        }
    }
}

impl<S, N> FormatEvent<S, N> for EventFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");

        if writer.has_ansi_escapes() {
            write!(
                writer,
                "\x1b[2m{stamp}\x1b[0m {}{:>5}\x1b[0m \x1b[36m{}\x1b[0m ",
                Self::level_color(meta.level()),
                meta.level(),
                meta.target()
            )?;
        } else {
            write!(writer, "{stamp} {:>5} {} ", meta.level(), meta.target())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

type SharedFile = Arc<Mutex<Option<File>>>;

/// Writer target whose file can be swapped after the subscriber is built.
/// Records are dropped while no file is attached.
#[derive(Clone)]
struct LateFile(SharedFile);

struct LateFileWriter<'a>(MutexGuard<'a, Option<File>>);

impl Write for LateFileWriter<'_> {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        match self.0.as_mut() {
            Some(file) => file.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.as_mut().map_or(Ok(()), Write::flush)
    }
}

impl<'a> MakeWriter<'a> for LateFile {
    type Writer = LateFileWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LateFileWriter(self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

type ReloadFn = Box<dyn Fn(EnvFilter) -> Result<()> + Send + Sync>;

static RELOAD_LEVEL: OnceLock<ReloadFn> = OnceLock::new();
static LOG_FILE: OnceLock<SharedFile> = OnceLock::new();

fn initial_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber. Later calls are ignored.
pub fn init_logging() {
    let slot: SharedFile = Arc::new(Mutex::new(None));
    if LOG_FILE.set(slot.clone()).is_err() {
        return;
    }

    let (level, handle) = reload::Layer::new(initial_filter());

    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(EventFormat)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr);

    let file_layer = tracing_subscriber::fmt::layer()
        .event_format(EventFormat)
        .with_ansi(false)
        .with_writer(LateFile(slot));

    if tracing_subscriber::registry()
        .with(level)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .is_ok()
    {
        let _ = RELOAD_LEVEL.set(Box::new(move |filter| {
            handle
                .reload(filter)
                .map_err(|e| anyhow!("filter reload failed: {e}"))
        }));
    }
}

/// Replaces the active filter. Accepts a bare level such as `debug` or any
/// `EnvFilter` directive list.
pub fn set_log_level(directives: &str) -> Result<()> {
    let filter = EnvFilter::try_new(directives)
        .map_err(|e| anyhow!("invalid log filter '{directives}': {e}"))?;
    match RELOAD_LEVEL.get() {
        Some(reload) => reload(filter),
        None => bail!("logging not yet initialized"),
    }
}

/// Appends log records to `path` from now on, replacing any open file.
pub fn enable_file_logging(path: &Path) -> Result<()> {
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file '{}'", path.display()))?;

    let Some(slot) = LOG_FILE.get() else {
        bail!("logging not yet initialized");
    };
    *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(file);
    Ok(())
}

/// Logs the failure of a detached task that has nobody to report to.
pub fn log_task_error(
    task: &'static str,
    result: Result<()>,
) {
    if let Err(error) = result {
        error!(task, ?error, "background task failed");
    }
}
