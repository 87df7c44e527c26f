use std::{env, io::Write};

use chrono::{SecondsFormat, Utc};
use env_logger::fmt::{Color, Formatter};
use log::{kv, Level, Record, SetLoggerError};
use serde::Serialize;
use serde_json::{Map, Value};

/// Env var picking the output format, `json` or `pretty`.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub trait SerdeLogging {
    fn as_json_str(&self) -> String;
}

impl<T: Serialize> SerdeLogging for T {
    #[cfg(debug_assertions)]
    fn as_json_str(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_owned())
    }

    #[cfg(not(debug_assertions))]
    fn as_json_str(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_owned())
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LogFormat {
    /// Coloured single line for local runs.
    Pretty,
    /// One JSON object per line for log shippers.
    Json,
}

impl LogFormat {
    pub fn from_env() -> Self {
        Self::parse(env::var(LOG_FORMAT_ENV).ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("json") => LogFormat::Json,
            Some("pretty") => LogFormat::Pretty,
            _ => Self::build_default(),
        }
    }

    #[cfg(debug_assertions)]
    fn build_default() -> Self {
        LogFormat::Pretty
    }

    #[cfg(not(debug_assertions))]
    fn build_default() -> Self {
        LogFormat::Json
    }
}

fn level_to_str(level: Level) -> &'static str {
    match level {
        Level::Error => "Error",
        Level::Debug => "Debug",
        Level::Info => "Info",
        Level::Warn => "Warn",
        Level::Trace => "Trace",
    }
}

struct RecordParams<'a> {
    severity: &'static str,
    date: String,
    module_path: &'a str,
    file: &'a str,
    line: u32,
}

impl<'a> RecordParams<'a> {
    fn of(record: &'a Record) -> Self {
        Self {
            severity: level_to_str(record.metadata().level()),
            date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            module_path: record.module_path().unwrap_or_default(),
            file: record.file().unwrap_or_default(),
            line: record.line().unwrap_or_default(),
        }
    }
}

/// Collects the structured key/values of a record, in order.
struct KeyValues(Vec<(String, String)>);

impl<'kvs> kv::Visitor<'kvs> for KeyValues {
    fn visit_pair(&mut self, key: kv::Key<'kvs>, val: kv::Value<'kvs>) -> Result<(), kv::Error> {
        self.0.push((key.to_string(), val.to_string()));
        Ok(())
    }
}

fn key_values(record: &Record) -> Vec<(String, String)> {
    let mut visitor = KeyValues(Vec::new());
    // The visitor itself never fails.
    let _ = record.key_values().visit(&mut visitor);
    visitor.0
}

fn write_pretty(f: &mut Formatter, record: &Record) -> std::io::Result<()> {
    let params = RecordParams::of(record);

    let mut level_style = f.default_level_style(record.level());
    level_style.set_bold(true);

    let mut general_style = f.style();
    general_style.set_color(Color::Rgb(33, 33, 33));

    let mut module_style = f.style();
    module_style.set_color(Color::Yellow);

    write!(
        f,
        "{}  {:5}  {} ({}:{})  {}",
        general_style.value(params.date),
        level_style.value(params.severity),
        module_style.value(params.module_path),
        general_style.value(params.file),
        general_style.value(params.line),
        record.args()
    )?;
    for (key, value) in key_values(record) {
        write!(f, "\n{} {}", key, value)?;
    }
    writeln!(f)
}

fn json_line(record: &Record) -> Value {
    let params = RecordParams::of(record);

    let mut line = Map::new();
    line.insert("date".into(), Value::String(params.date));
    line.insert("severity".into(), Value::String(params.severity.into()));
    line.insert("message".into(), Value::String(record.args().to_string()));
    line.insert("className".into(), Value::String(params.module_path.into()));
    line.insert("file".into(), Value::String(params.file.into()));
    line.insert("line".into(), Value::from(params.line));

    // Values holding JSON are embedded as JSON, anything else as a string.
    for (key, value) in key_values(record) {
        let value = serde_json::from_str::<Value>(&value).unwrap_or(Value::String(value));
        line.insert(key, value);
    }

    Value::Object(line)
}

fn write_json<F: Write>(f: &mut F, record: &Record) -> std::io::Result<()> {
    serde_json::to_writer(&mut *f, &json_line(record))?;
    writeln!(f)
}

fn builder(format: LogFormat) -> env_logger::Builder {
    let mut builder = env_logger::builder();
    match format {
        LogFormat::Pretty => builder.format(write_pretty),
        LogFormat::Json => builder.format(|f, record| write_json(f, record)),
    };
    builder
}

/// Installs the global logger. Level filtering follows `RUST_LOG`, the format follows `LOG_FORMAT`.
///
/// Panics if a logger is already installed, see [`try_init`].
pub fn init() {
    builder(LogFormat::from_env()).init();
}

pub fn try_init() -> Result<(), SetLoggerError> {
    builder(LogFormat::from_env()).try_init()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;
    use std::env;

    #[test]
    fn test_write_json() {
        let kvs = vec![("key1", "val1"), ("key2", "{\"foo\":12}")];
        let record = log::Record::builder()
            .args(format_args!("hello"))
            .level(log::Level::Info)
            .module_path(Some("foo::bar"))
            .file(Some("src/file1.rs"))
            .line(Some(12))
            .key_values(&kvs)
            .build();
        let mut buf = Vec::new();
        write_json(&mut buf, &record).unwrap();
        let output = std::str::from_utf8(&buf).unwrap();
        assert!(output.ends_with('\n'));
        let json: serde_json::Value = serde_json::from_str(output).unwrap();
        assert_eq!(json["severity"], "Info");
        assert_eq!(json["message"], "hello");
        assert_eq!(json["className"], "foo::bar");
        assert_eq!(json["file"], "src/file1.rs");
        assert_eq!(json["line"], json!(12));
        assert_eq!(json["key1"], "val1");
        assert_eq!(json["key2"], json!({"foo":12}));
    }

    #[test]
    fn test_write_json_escapes_message() {
        let record = log::Record::builder()
            .args(format_args!("config loaded: DbConfig {{ host: Some(\"mysql-db\") }}"))
            .level(log::Level::Debug)
            .build();
        let mut buf = Vec::new();
        write_json(&mut buf, &record).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(json["message"], "config loaded: DbConfig { host: Some(\"mysql-db\") }");
        assert_eq!(json["severity"], "Debug");
        assert_eq!(json["line"], json!(0));
    }

    #[test]
    fn test_parse_log_format() {
        assert_eq!(LogFormat::parse(Some("json")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some(" JSON ")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some("pretty")), LogFormat::Pretty);
        assert_eq!(LogFormat::parse(Some("xml")), LogFormat::build_default());
        assert_eq!(LogFormat::parse(None), LogFormat::build_default());
    }

    #[test]
    #[serial]
    fn test_log_format_from_env() {
        env::set_var(LOG_FORMAT_ENV, "json");
        assert_eq!(LogFormat::from_env(), LogFormat::Json);

        env::set_var(LOG_FORMAT_ENV, "pretty");
        assert_eq!(LogFormat::from_env(), LogFormat::Pretty);

        env::remove_var(LOG_FORMAT_ENV);
        assert_eq!(LogFormat::from_env(), LogFormat::build_default());
    }

    #[test]
    fn test_as_json_str() {
        let value = json!({"host": "mysql-db", "password": null});
        let parsed: serde_json::Value = serde_json::from_str(&value.as_json_str()).unwrap();
        assert_eq!(parsed, value);
    }
}
