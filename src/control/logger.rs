use crate::control::hook::Channel;
use crate::control::protocol::event;
use log::{LevelFilter, Log};
use serde_json::json;
use std::fmt::Write as _;
use std::sync::Arc;

/// Forwards log records to the control client as `output` events.
/// Records are written to stderr while no client is attached.
pub struct ChannelLogger {
    inner: env_logger::Logger,
    channel: Arc<Channel>,
}

impl ChannelLogger {
    pub fn new(channel: Arc<Channel>) -> Self {
        Self {
            inner: env_logger::Logger::from_default_env(),
            channel,
        }
    }

    pub fn filter(&self) -> LevelFilter {
        self.inner.filter()
    }
}

impl Log for ChannelLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if !self.inner.matches(record) {
            return;
        }

        let mut output = String::new();
        _ = write!(output, "[{}] ", record.level());
        if let Some(module) = record.module_path() {
            _ = write!(output, "{module} ");
        }
        _ = writeln!(output, "{}", record.args());

        let sent = self
            .channel
            .send_event_body(event::OUTPUT, json!({"category": "console", "output": output}));
        if !matches!(sent, Ok(true)) {
            self.inner.log(record);
        }
    }

    fn flush(&self) {
        self.inner.flush()
    }
}
