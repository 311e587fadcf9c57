//! Unified JSON logging with custom format.
//!
//! Log format:
//! ```json
//! {"ts":"2024-12-28T15:04:05.123456Z","level":"debug","type":"app","msg":"worker spawned","ctx":{"service":"render_autoscale","pool":"render","worker":3},"data":{"active":3}}
//! ```
//!
//! The `pool` and `worker` fields recorded by the worker pool are lifted into
//! `ctx`; every other field lands in `data`.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Log entry with unified structure.
#[derive(Serialize)]
pub struct LogEntry<'a> {
    /// RFC 3339 timestamp, UTC
    pub ts: &'a str,
    /// Log level: debug, info, warn, error
    pub level: &'a str,
    /// Log type: app, error
    #[serde(rename = "type")]
    pub log_type: &'a str,
    /// Short human-readable message
    pub msg: &'a str,
    /// Context: service, pool, worker
    pub ctx: LogContext<'a>,
    /// Event-specific data
    pub data: &'a HashMap<String, serde_json::Value>,
}

/// Log context.
#[derive(Serialize, Default)]
pub struct LogContext<'a> {
    /// Service name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<&'a str>,
    /// Pool name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool: Option<&'a str>,
    /// Worker ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker: Option<u64>,
}

/// Custom JSON formatter for tracing.
pub struct JsonFormatter {
    service_name: String,
}

impl JsonFormatter {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }
}

impl<S, N> FormatEvent<S, N> for JsonFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let level = level_name(meta.level());
        let log_type = if *meta.level() == Level::ERROR {
            "error"
        } else {
            "app"
        };

        // Collect fields
        let mut visitor = FieldVisitor::new();
        event.record(&mut visitor);

        // Generate timestamp
        let mut ts = String::new();
        SystemTime.format_time(&mut Writer::new(&mut ts))?;

        let pool = visitor.fields.remove("pool");
        let worker = visitor.fields.remove("worker");

        let entry = LogEntry {
            ts: &ts,
            level,
            log_type,
            msg: visitor.message.as_deref().unwrap_or_default(),
            ctx: LogContext {
                service: Some(&self.service_name),
                pool: pool.as_ref().and_then(|v| v.as_str()),
                worker: worker.as_ref().and_then(|v| v.as_u64()),
            },
            data: &visitor.fields,
        };

        writeln!(
            writer,
            "{}",
            serde_json::to_string(&entry).unwrap_or_default()
        )
    }
}

fn level_name(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "debug",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warn",
        Level::ERROR => "error",
    }
}

/// Field visitor for collecting tracing fields.
struct FieldVisitor {
    message: Option<String>,
    fields: HashMap<String, serde_json::Value>,
}

impl FieldVisitor {
    fn new() -> Self {
        Self {
            message: None,
            fields: HashMap::new(),
        }
    }
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value).trim_matches('"').to_string());
        } else {
            self.fields.insert(
                field.name().to_string(),
                serde_json::Value::String(format!("{:?}", value).trim_matches('"').to_string()),
            );
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.insert(
                field.name().to_string(),
                serde_json::Value::String(value.to_string()),
            );
        }
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.fields
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.fields
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.fields
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.fields
            .insert(field.name().to_string(), serde_json::json!(value));
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays free
/// for results.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|e| {
        eprintln!(
            "Warning: Invalid log filter '{}': {}, using info",
            config.filter, e
        );
        EnvFilter::new("render_autoscale=info")
    });

    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .event_format(JsonFormatter::new(config.service_name.clone()))
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}
