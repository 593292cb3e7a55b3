#[cfg(feature = "color")]
use colored::Colorize;
use log::{Level, Log, Metadata, Record, SetLoggerError, warn};
use serde::de::Error as SerdeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use time::{OffsetDateTime, format_description::FormatItem, macros::format_description};
use tokio::sync::broadcast::{Receiver, Sender};

const TIMESTAMP_FORMAT_LOCAL: &[FormatItem] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]");
const TIMESTAMP_FORMAT_OFFSET: &[FormatItem] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3][offset_hour sign:mandatory]:[offset_minute]"
);
const TIMESTAMP_FORMAT_UTC: &[FormatItem] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]Z");

/// Targets that are noisy at debug level while the wallet talks to a full node.
pub const TRANSPORT_TARGETS: [&str; 4] = ["hyper", "reqwest", "rustls", "tokio_util"];
pub const EVENT_CHANNEL_SIZE: usize = 1024;

pub enum TimestampFormat {
    Local,
    Offset,
    UTC,
    Relative,
}

pub struct DruidGardenLogger {
    pub use_colors: bool,
    pub show_thread: bool,
    pub show_timestamp: bool,
    pub show_target: bool,
    pub current_level: Level,
    pub timestamp_format: TimestampFormat,
    pub target_levels: Vec<(String, Level)>,
    pub start_instant: Instant,
    pub printed_error: AtomicBool,
    pub channel: Sender<LogEvent>,
}

pub struct DruidGardenLoggerBuilder {
    use_colors: bool,
    show_thread: bool,
    show_timestamp: bool,
    show_target: bool,
    current_level: Level,
    timestamp_format: TimestampFormat,
    target_levels: Vec<(String, Level)>,
}

impl Default for DruidGardenLoggerBuilder {
    fn default() -> Self {
        Self {
            use_colors: cfg!(feature = "color"),
            show_thread: false,
            show_timestamp: true,
            show_target: true,
            timestamp_format: TimestampFormat::Local,
            current_level: Level::Info,
            target_levels: vec![],
        }
    }
}

impl DruidGardenLoggerBuilder {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn use_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }
    pub fn show_thread(mut self, show_thread: bool) -> Self {
        self.show_thread = show_thread;
        self
    }
    pub fn show_timestamp(mut self, show_timestamp: bool) -> Self {
        self.show_timestamp = show_timestamp;
        self
    }
    pub fn show_target(mut self, show_target: bool) -> Self {
        self.show_target = show_target;
        self
    }
    pub fn timestamp_format(mut self, timestamp_format: TimestampFormat) -> Self {
        self.timestamp_format = timestamp_format;
        self
    }
    pub fn current_level(mut self, current_level: Level) -> Self {
        self.current_level = current_level;
        self
    }
    pub fn with_target_level(mut self, target: &str, current_level: Level) -> Self {
        self.target_levels.push((target.to_string(), current_level));
        self
    }
    /// Caps the HTTP and TLS stacks at `warn` so wallet sync output stays readable.
    pub fn quiet_transport(self) -> Self {
        TRANSPORT_TARGETS
            .iter()
            .fold(self, |builder, target| builder.with_target_level(target, Level::Warn))
    }
    pub fn build(mut self) -> DruidGardenLogger {
        // longest prefix first so the most specific target wins
        self.target_levels
            .sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        DruidGardenLogger {
            use_colors: self.use_colors,
            show_thread: self.show_thread,
            show_timestamp: self.show_timestamp,
            show_target: self.show_target,
            current_level: self.current_level,
            timestamp_format: self.timestamp_format,
            target_levels: self.target_levels,
            start_instant: Instant::now(),
            printed_error: AtomicBool::new(false),
            channel: Sender::new(EVENT_CHANNEL_SIZE),
        }
    }
    pub fn init(self) -> Result<Arc<DruidGardenLogger>, SetLoggerError> {
        self.build().init()
    }
}

impl DruidGardenLogger {
    pub fn build() -> DruidGardenLoggerBuilder {
        DruidGardenLoggerBuilder::new()
    }
    pub fn init(self) -> Result<Arc<Self>, SetLoggerError> {
        let logger = Arc::new(self);
        // SAFETY: the cloned Arc is leaked, so the pointee lives for the rest of the program and the
        // &'static reference handed to `log::set_logger` never dangles.
        let static_logger: &'static Self = unsafe { &*Arc::into_raw(logger.clone()) };
        log::set_logger(static_logger).map(|_| {
            log::set_max_level(logger.max_level().to_level_filter());
            logger
        })
    }
    pub fn subscribe(&self) -> Receiver<LogEvent> {
        self.channel.subscribe()
    }
    fn level_for(&self, target: &str) -> Level {
        self.target_levels
            .iter()
            .find(|(pattern, _)| target.starts_with(pattern.as_str()))
            .map_or(self.current_level, |(_, level)| *level)
    }
    /// Most verbose level any target may log at.
    fn max_level(&self) -> Level {
        self.target_levels
            .iter()
            .map(|(_, level)| *level)
            .fold(self.current_level, Ord::max)
    }
    fn now(&self) -> OffsetDateTime {
        match self.timestamp_format {
            TimestampFormat::Local | TimestampFormat::Offset => match OffsetDateTime::now_local() {
                Ok(local) => local,
                Err(_) => {
                    if !self.printed_error.swap(true, Ordering::SeqCst) {
                        warn!("Failed to detect Local Offset, Defaulting to UTC")
                    }
                    OffsetDateTime::now_utc()
                }
            },
            _ => OffsetDateTime::now_utc(),
        }
    }
    fn format_timestamp(&self, timestamp: &OffsetDateTime) -> String {
        let format = match self.timestamp_format {
            TimestampFormat::Offset => TIMESTAMP_FORMAT_OFFSET,
            TimestampFormat::Local => TIMESTAMP_FORMAT_LOCAL,
            TimestampFormat::UTC => TIMESTAMP_FORMAT_UTC,
            TimestampFormat::Relative => {
                let duration = Instant::now().duration_since(self.start_instant);
                let total_seconds = duration.as_secs();
                return format!(
                    "{:02}:{:02}:{:02}.{:03}",
                    total_seconds / 3600,
                    (total_seconds % 3600) / 60,
                    total_seconds % 60,
                    duration.subsec_millis()
                );
            }
        };
        timestamp
            .format(format)
            .unwrap_or_else(|_| timestamp.unix_timestamp().to_string())
    }
    fn format_level(&self, level: Level) -> String {
        let level_str = format!("{:<5}", level.to_string());
        if self.use_colors {
            colorize(level, level_str)
        } else {
            level_str
        }
    }
    /// Renders one console line for `event`.
    pub fn format_event(&self, event: &LogEvent) -> String {
        let mut line = String::new();
        if self.show_timestamp {
            line.push_str(&self.format_timestamp(&event.timestamp));
            line.push(' ');
        }
        line.push_str(&self.format_level(event.level));
        if self.show_thread {
            let cur = std::thread::current();
            match cur.name() {
                Some(name) => line.push_str(&format!("({name}) ")),
                None => line.push_str(&format!("({:?}) ", cur.id())),
            }
        }
        if self.show_target {
            line.push_str(&format!("[{}] ", event.target));
        } else {
            line.push(' ');
        }
        line.push_str(&event.message);
        line
    }
}

#[cfg(feature = "color")]
fn colorize(level: Level, level_str: String) -> String {
    match level {
        Level::Error => level_str.red().to_string(),
        Level::Warn => level_str.yellow().to_string(),
        Level::Info => level_str.cyan().to_string(),
        Level::Debug => level_str.purple().to_string(),
        Level::Trace => level_str.magenta().to_string(),
    }
}

#[cfg(not(feature = "color"))]
fn colorize(_level: Level, level_str: String) -> String {
    level_str
}

fn serialize_level<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&level.to_string().to_lowercase())
}

fn deserialize_level<'de, D>(deserializer: D) -> Result<Level, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    match s.to_lowercase().as_str() {
        "error" => Ok(Level::Error),
        "warn" | "warning" => Ok(Level::Warn),
        "info" => Ok(Level::Info),
        "debug" => Ok(Level::Debug),
        "trace" => Ok(Level::Trace),
        _ => Err(D::Error::custom(format!("Unknown log level: {s}"))),
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogEvent {
    #[serde(
        serialize_with = "serialize_level",
        deserialize_with = "deserialize_level"
    )]
    pub level: Level,
    pub target: String,
    pub message: String,
    pub timestamp: OffsetDateTime,
}

impl Log for DruidGardenLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level_for(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let log_event = LogEvent {
            level: record.level(),
            target: if record.target().is_empty() {
                record.module_path().unwrap_or_default()
            } else {
                record.target()
            }
            .to_string(),
            message: record.args().to_string(),
            timestamp: self.now(),
        };
        println!("{}", self.format_event(&log_event));
        let _ = self.channel.send(log_event);
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(level: Level, target: &str, message: &str) -> LogEvent {
        LogEvent {
            level,
            target: target.to_string(),
            message: message.to_string(),
            timestamp: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_target_levels() {
        let logger = DruidGardenLogger::build()
            .current_level(Level::Debug)
            .with_target_level("dg_wallet", Level::Info)
            .with_target_level("dg_wallet::sync", Level::Trace)
            .quiet_transport()
            .build();
        assert_eq!(logger.level_for("reqwest::connect"), Level::Warn);
        assert_eq!(logger.level_for("dg_wallet::wallet"), Level::Info);
        assert_eq!(logger.level_for("dg_wallet::sync"), Level::Trace);
        assert_eq!(logger.level_for("dg_wallet_keys"), Level::Info);
        assert_eq!(logger.level_for("other"), Level::Debug);
        assert_eq!(logger.max_level(), Level::Trace);
    }

    #[test]
    fn test_format_event() {
        let logger = DruidGardenLogger::build()
            .use_colors(false)
            .timestamp_format(TimestampFormat::UTC)
            .build();
        let line = logger.format_event(&event(Level::Info, "dg_wallet", "Synced 60 addresses"));
        assert_eq!(
            line,
            "1970-01-01 00:00:00.000Z INFO [dg_wallet] Synced 60 addresses"
        );
        let bare = DruidGardenLogger::build()
            .use_colors(false)
            .show_timestamp(false)
            .show_target(false)
            .build();
        assert_eq!(bare.format_event(&event(Level::Warn, "x", "low")), "WARN  low");
    }

    #[tokio::test]
    async fn test_subscribe_receives_events() {
        let logger = DruidGardenLogger::build().use_colors(false).build();
        let mut receiver = logger.subscribe();
        logger.log(
            &Record::builder()
                .args(format_args!("pushed bundle"))
                .level(Level::Info)
                .target("dg_wallet")
                .build(),
        );
        logger.log(
            &Record::builder()
                .args(format_args!("hidden"))
                .level(Level::Trace)
                .target("dg_wallet")
                .build(),
        );
        let received = receiver.recv().await.unwrap();
        assert_eq!(received.message, "pushed bundle");
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_event_json() {
        let json = serde_json::to_string(&event(Level::Error, "t", "m")).unwrap();
        assert!(json.contains("\"level\":\"error\""));
        let parsed: LogEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.level, Level::Error);
    }
}
