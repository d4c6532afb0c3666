use anyhow::{anyhow, Context};
use serde_json::{json, Value};
use simstalker::control::io::{FrameReader, FrameWriter};
use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::net::{SocketAddr, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

const READ_TIMEOUT: Duration = Duration::from_secs(5);
const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(50);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Control channel client for tests.
pub struct ControlClient {
    stream: TcpStream,
    reader: FrameReader<TcpStream>,
    writer: FrameWriter<TcpStream>,
    next_seq: i64,
    pending_events: VecDeque<Value>,
    pending_responses: HashMap<i64, Value>,
}

impl ControlClient {
    pub fn connect(addr: SocketAddr) -> anyhow::Result<Self> {
        let start = Instant::now();
        let stream = loop {
            match TcpStream::connect(addr) {
                Ok(stream) => break stream,
                Err(err) => {
                    if start.elapsed() > CONNECT_TIMEOUT {
                        return Err(anyhow!("failed to connect to {addr}: {err}"));
                    }
                    thread::sleep(CONNECT_RETRY_DELAY);
                }
            }
        };
        stream
            .set_read_timeout(Some(READ_TIMEOUT))
            .context("set read timeout")?;
        let reader = FrameReader::new(stream.try_clone()?);
        let writer = FrameWriter::new(stream.try_clone()?);
        Ok(Self {
            stream,
            reader,
            writer,
            next_seq: 1,
            pending_events: VecDeque::new(),
            pending_responses: HashMap::new(),
        })
    }

    pub fn send_request(&mut self, command: &str, arguments: Value) -> anyhow::Result<i64> {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.writer.write_message(&json!({
            "seq": seq,
            "type": "request",
            "command": command,
            "arguments": arguments,
        }))?;
        Ok(seq)
    }

    /// Send raw bytes as a framed message body.
    pub fn send_raw(&mut self, body: &str) -> anyhow::Result<()> {
        write!(self.stream, "Content-Length: {}\r\n\r\n{}", body.len(), body)?;
        self.stream.flush()?;
        Ok(())
    }

    pub fn request(&mut self, command: &str, arguments: Value) -> anyhow::Result<Value> {
        let seq = self.send_request(command, arguments)?;
        self.read_response(seq)
    }

    /// Read a response to request `request_seq`, responses to other requests are kept.
    pub fn read_response(&mut self, request_seq: i64) -> anyhow::Result<Value> {
        if let Some(response) = self.pending_responses.remove(&request_seq) {
            return Ok(response);
        }
        loop {
            let msg = self.read_message()?;
            match msg.get("type").and_then(Value::as_str) {
                Some("event") => self.pending_events.push_back(msg),
                Some("response") => match msg.get("request_seq").and_then(Value::as_i64) {
                    Some(seq) if seq == request_seq => return Ok(msg),
                    Some(seq) => {
                        self.pending_responses.insert(seq, msg);
                    }
                    None => {}
                },
                _ => {}
            }
        }
    }

    pub fn wait_for_event(&mut self, name: &str) -> anyhow::Result<Value> {
        loop {
            let event = match self.pending_events.pop_front() {
                Some(event) => event,
                None => self.read_message()?,
            };
            if event.get("type").and_then(Value::as_str) == Some("event")
                && event.get("event").and_then(Value::as_str) == Some(name)
            {
                return Ok(event);
            }
        }
    }

    fn read_message(&mut self) -> anyhow::Result<Value> {
        let frame = self
            .reader
            .read_frame()?
            .ok_or_else(|| anyhow!("control connection closed"))?;
        Ok(serde_json::from_slice(&frame)?)
    }
}

/// Successful response body.
pub fn body(response: &Value) -> &Value {
    assert_eq!(
        response.get("success").and_then(Value::as_bool),
        Some(true),
        "response: {response}"
    );
    &response["body"]
}
