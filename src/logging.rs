//! Per-invocation logger
//!
//! Each invocation gets its own [`Logger`], a dedicated `env_logger` instance
//! writing plain text lines to the console and to the execution log file at
//! the same time. Nothing here touches the global `log` facade, so concurrent
//! invocations never share a log file handle.

use std::fmt::{self, Display, Write as _};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use env_logger::{Target, WriteStyle};
use log::{Level, LevelFilter, Log, Record};

use crate::config::{self, Config};
use crate::sink::{Console, Tee};

/// Log target used for every line emitted through a [`Logger`]
pub const TARGET: &str = "preflight";

/// Key/value pairs attached to a single log line
pub type Fields<'a> = &'a [(&'a str, &'a dyn Display)];

/// Logger bound to one invocation
///
/// Cloning is cheap; clones share the underlying sink. The log file handle is
/// closed when the last clone is dropped.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<env_logger::Logger>,
    values: Vec<(&'static str, String)>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level())
            .field("values", &self.values)
            .finish()
    }
}

impl Logger {
    /// Create a logger writing lines at or above `level` to `sink`
    #[must_use]
    pub fn new(level: LevelFilter, sink: Box<dyn Write + Send>) -> Self {
        let inner = env_logger::Builder::new()
            .filter_level(level)
            .write_style(WriteStyle::Never)
            .target(Target::Pipe(sink))
            .build();
        Self {
            inner: Arc::new(inner),
            values: Vec::new(),
        }
    }

    /// Build the invocation logger from `logfile` and `loglevel`
    ///
    /// Lines go to `console` and to the log file, which is truncated. When the
    /// file cannot be opened the logger falls back to `console` alone and says
    /// so at info level, whatever level was configured. An unparseable level
    /// keeps the default `info`.
    #[must_use]
    pub fn from_config(config: &Config, console: &Console) -> Self {
        let level = parse_level(&config.get_string(config::LOG_LEVEL)).unwrap_or(LevelFilter::Info);
        let log_path = config.get_string(config::LOG_FILE);

        match open_log_file(Path::new(&log_path)) {
            Ok(file) => Self::new(level, Box::new(Tee::new(console.writer(), file))),
            Err(err) => {
                log::debug!("unable to open log file {log_path}: {err}");
                Self::new(LevelFilter::Info, console.writer())
                    .info("Failed to log to file, using default stderr", &[]);
                Self::new(level, console.writer())
            },
        }
    }

    /// Derive a logger tagging every line with `key=value`
    #[must_use]
    pub fn with_value(&self, key: &'static str, value: impl Display) -> Self {
        let mut values = self.values.clone();
        values.push((key, value.to_string()));
        Self {
            inner: Arc::clone(&self.inner),
            values,
        }
    }

    /// Maximum level this logger emits
    #[must_use]
    pub fn level(&self) -> LevelFilter {
        self.inner.filter()
    }

    /// Whether a line at `level` would be emitted
    #[must_use]
    pub fn enabled(&self, level: Level) -> bool {
        level <= self.level()
    }

    /// Emit `message` followed by the static tags and `fields`
    pub fn log(&self, level: Level, message: &str, fields: Fields<'_>) {
        if !self.enabled(level) {
            return;
        }
        let mut line = String::from(message);
        for (key, value) in &self.values {
            let _ = write!(line, " {key}={value}");
        }
        for (key, value) in fields {
            let _ = write!(line, " {key}={value}");
        }
        self.inner.log(
            &Record::builder()
                .args(format_args!("{line}"))
                .level(level)
                .target(TARGET)
                .build(),
        );
        self.inner.flush();
    }

    /// Emit at debug level
    pub fn debug(&self, message: &str, fields: Fields<'_>) {
        self.log(Level::Debug, message, fields);
    }

    /// Emit at info level
    pub fn info(&self, message: &str, fields: Fields<'_>) {
        self.log(Level::Info, message, fields);
    }

    /// Emit at warn level
    pub fn warn(&self, message: &str, fields: Fields<'_>) {
        self.log(Level::Warn, message, fields);
    }

    /// Emit an error line carrying `err` as the `error` field
    pub fn error(&self, err: &dyn Display, message: &str, fields: Fields<'_>) {
        let mut all: Vec<(&str, &dyn Display)> = fields.to_vec();
        all.push(("error", err));
        self.log(Level::Error, message, &all);
    }
}

/// Parse a verbosity name such as `warn` or `DEBUG`
#[must_use]
pub fn parse_level(value: &str) -> Option<LevelFilter> {
    value.trim().parse().ok()
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true).write(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}
