use crate::control::io::FrameWriter;
use crate::control::protocol::{event, EventEnvelope, ResponseEnvelope};
use crate::debugger::{BreakpointReport, ClockSnapshot, EventHook};
use serde::Serialize;
use serde_json::{json, Value};
use std::io::Write;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard};

type Writer = FrameWriter<Box<dyn Write + Send>>;

/// Outbound half of the control connection.
///
/// Responses and events share one sequence counter and one writer lock, so messages
/// appear on the wire in sequence order. Nothing is logged while the writer lock is held,
/// log records may be forwarded through this same channel.
#[derive(Default)]
pub struct Channel {
    writer: Mutex<Option<Writer>>,
    seq: AtomicI64,
}

impl Channel {
    pub fn new() -> Self {
        Self::default()
    }

    fn writer(&self) -> MutexGuard<'_, Option<Writer>> {
        self.writer.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn attach(&self, writer: impl Write + Send + 'static) {
        *self.writer() = Some(FrameWriter::new(Box::new(writer)));
    }

    pub fn detach(&self) {
        *self.writer() = None;
    }

    pub fn is_attached(&self) -> bool {
        self.writer().is_some()
    }

    fn next_seq(&self) -> i64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Send an event. Return false if there is no client.
    pub fn send_event(&self, name: &'static str, body: Option<Value>) -> anyhow::Result<bool> {
        let mut writer = self.writer();
        let Some(writer) = writer.as_mut() else {
            return Ok(false);
        };
        let mut ev = EventEnvelope::new(name, body);
        ev.seq = self.next_seq();
        writer.write_message(&ev)?;
        Ok(true)
    }

    pub fn send_event_body<T: Serialize>(&self, name: &'static str, body: T) -> anyhow::Result<bool> {
        let body = serde_json::to_value(body)?;
        self.send_event(name, Some(body))
    }

    /// Send a response. Return false if there is no client.
    pub fn send_response(&self, mut response: ResponseEnvelope) -> anyhow::Result<bool> {
        let mut writer = self.writer();
        let Some(writer) = writer.as_mut() else {
            return Ok(false);
        };
        response.seq = self.next_seq();
        writer.write_message(&response)?;
        Ok(true)
    }
}

/// Pushes session events to the control client.
pub struct ChannelHook {
    channel: std::sync::Arc<Channel>,
}

impl ChannelHook {
    pub fn new(channel: std::sync::Arc<Channel>) -> Self {
        Self { channel }
    }
}

impl EventHook for ChannelHook {
    fn on_breakpoint(&self, report: &BreakpointReport) -> anyhow::Result<()> {
        self.channel.send_event_body(event::BREAKPOINT, report)?;
        Ok(())
    }

    fn on_step(&self, report: &BreakpointReport) -> anyhow::Result<()> {
        self.channel.send_event_body(event::STEP, report)?;
        Ok(())
    }

    fn on_exception(&self, report: &BreakpointReport) -> anyhow::Result<()> {
        self.channel.send_event_body(event::EXCEPTION, report)?;
        Ok(())
    }

    fn on_clock(&self, snapshot: &ClockSnapshot) -> anyhow::Result<()> {
        self.channel.send_event_body(event::CLOCK, snapshot)?;
        Ok(())
    }

    fn on_synch(&self, time: u64) -> anyhow::Result<()> {
        self.channel.send_event_body(event::SYNCH, json!({ "time": time }))?;
        Ok(())
    }

    fn on_value_change(&self, name: &str, value: i64) -> anyhow::Result<()> {
        self.channel
            .send_event_body(event::VALUE, json!({ "name": name, "value": value }))?;
        Ok(())
    }

    fn on_stop(&self) -> anyhow::Result<()> {
        self.channel.send_event(event::STOP, None)?;
        Ok(())
    }

    fn is_attached(&self) -> bool {
        self.channel.is_attached()
    }
}
