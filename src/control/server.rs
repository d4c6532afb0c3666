use crate::control::hook::Channel;
use crate::control::io::{split, FrameError, FrameReader};
use crate::control::logger::ChannelLogger;
use crate::control::protocol::{RequestEnvelope, ResponseEnvelope};
use crate::control::{CommandResult, Handler, Request};
use crate::debugger::DebugSession;
use crate::log::LOGGER_SWITCHER;
use crate::weak_error;
use anyhow::Context;
use log::{debug, info, warn};
use std::io;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Stops a running [`ControlServer`] from another thread.
#[derive(Clone)]
pub struct ServerHandle {
    shutdown: Arc<AtomicBool>,
    active: Arc<Mutex<Option<TcpStream>>>,
    local_addr: SocketAddr,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting clients and close the active connection.
    pub fn close(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        let active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(stream) = active.as_ref() {
            _ = stream.shutdown(Shutdown::Both);
        }
    }
}

/// Control channel server. Serves one client at a time, next client is accepted once the
/// current one disconnects.
pub struct ControlServer {
    listener: TcpListener,
    handler: Handler,
    session: Arc<DebugSession>,
    channel: Arc<Channel>,
    trace: bool,
    forward_logs: bool,
    handle: ServerHandle,
}

impl ControlServer {
    pub fn bind(
        addr: SocketAddr,
        session: Arc<DebugSession>,
        channel: Arc<Channel>,
    ) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).with_context(|| format!("bind {addr}"))?;
        listener.set_nonblocking(true)?;
        let local_addr = listener.local_addr()?;
        info!(target: "control", "listening on {local_addr}");

        Ok(Self {
            listener,
            handler: Handler::new(session.clone()),
            session,
            channel,
            trace: false,
            forward_logs: false,
            handle: ServerHandle {
                shutdown: Arc::new(AtomicBool::new(false)),
                active: Arc::new(Mutex::new(None)),
                local_addr,
            },
        })
    }

    /// Log every incoming and outgoing message.
    pub fn with_trace(self, trace: bool) -> Self {
        Self { trace, ..self }
    }

    /// Forward log records to the client.
    pub fn with_forward_logs(self, forward_logs: bool) -> Self {
        Self {
            forward_logs,
            ..self
        }
    }

    pub fn handle(&self) -> ServerHandle {
        self.handle.clone()
    }

    fn is_shutdown(&self) -> bool {
        self.handle.shutdown.load(Ordering::SeqCst)
    }

    /// Accept and serve clients until [`ServerHandle::close`] is called.
    pub fn run(self) -> anyhow::Result<()> {
        if self.forward_logs {
            let logger = ChannelLogger::new(self.channel.clone());
            let filter = logger.filter();
            LOGGER_SWITCHER.switch(logger, filter);
        }

        while !self.is_shutdown() {
            let (stream, peer) = match self.listener.accept() {
                Ok(v) => v,
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                    continue;
                }
                Err(err) => {
                    warn!(target: "control", "accept failed: {err:#}");
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                    continue;
                }
            };
            info!(target: "control", "client connected: {peer}");

            if let Err(err) = self.serve(stream) {
                warn!(target: "control", "client session ended with error: {err:#}");
            }
            self.channel.detach();
            *self.handle.active.lock().unwrap_or_else(|e| e.into_inner()) = None;
            info!(target: "control", "client disconnected: {peer}");
            self.session.client_detached();
        }
        info!(target: "control", "server stopped");
        Ok(())
    }

    fn serve(&self, stream: TcpStream) -> anyhow::Result<()> {
        stream.set_nonblocking(false)?;
        *self.handle.active.lock().unwrap_or_else(|e| e.into_inner()) =
            Some(stream.try_clone()?);
        let (mut reader, writer) = split(stream)?;
        self.channel.attach(writer.into_inner());

        if self.is_shutdown() {
            return Ok(());
        }
        let open = Arc::new(AtomicBool::new(true));
        let result = self.serve_requests(&mut reader, &open);
        open.store(false, Ordering::SeqCst);
        result
    }

    /// Serve requests of one client. `open` is cleared once the client is gone.
    fn serve_requests(
        &self,
        reader: &mut FrameReader<TcpStream>,
        open: &Arc<AtomicBool>,
    ) -> anyhow::Result<()> {
        loop {
            let frame = match reader.read_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => return Ok(()),
                Err(err) if err.is_recoverable() => {
                    self.respond(ResponseEnvelope::error(0, "", &err));
                    continue;
                }
                Err(FrameError::IO(err)) if self.is_shutdown() => {
                    debug!(target: "control", "connection closed on shutdown: {err}");
                    return Ok(());
                }
                Err(err) => return Err(err.into()),
            };

            if self.trace {
                debug!(target: "control", "<- {}", String::from_utf8_lossy(&frame));
            }

            let envelope: RequestEnvelope = match serde_json::from_slice(&frame) {
                Ok(envelope) => envelope,
                Err(err) => {
                    self.respond(ResponseEnvelope::error(0, "", format!("bad request: {err}")));
                    continue;
                }
            };

            let seq = envelope.seq;
            let command = envelope.command.clone();
            match Request::from_envelope(envelope) {
                Ok(request) if request.waits_for_store() && !self.session.is_connected() => {
                    self.defer(seq, command, request, open.clone())?;
                }
                request => {
                    let response = execute(&self.handler, seq, &command, request);
                    self.respond(response);
                }
            }
        }
    }

    /// Handle a request on a worker thread, so the client may still `connect` or `stop`
    /// while the request waits for a debug-info store.
    fn defer(
        &self,
        seq: i64,
        command: String,
        request: Request,
        open: Arc<AtomicBool>,
    ) -> anyhow::Result<()> {
        debug!(target: "control", "request `{command}` waits for debug info");
        let handler = self.handler.clone();
        let channel = self.channel.clone();
        let trace = self.trace;
        thread::Builder::new()
            .name(format!("control-{command}"))
            .spawn(move || {
                let response = execute(&handler, seq, &command, Ok(request));
                if open.load(Ordering::SeqCst) {
                    respond(&channel, trace, response);
                } else {
                    debug!(target: "control", "client gone, response to `{command}` dropped");
                }
            })
            .context("spawn request worker")?;
        Ok(())
    }

    fn respond(&self, response: ResponseEnvelope) {
        respond(&self.channel, self.trace, response);
    }
}

fn execute(
    handler: &Handler,
    seq: i64,
    command: &str,
    request: CommandResult<Request>,
) -> ResponseEnvelope {
    match request.and_then(|request| handler.handle(request)) {
        Ok(body) => ResponseEnvelope::success(seq, command, body),
        Err(err) => {
            warn!(target: "control", "request `{command}` failed: {err:#}");
            ResponseEnvelope::error(seq, command, err)
        }
    }
}

fn respond(channel: &Channel, trace: bool, response: ResponseEnvelope) {
    if trace {
        if let Ok(text) = serde_json::to_string(&response) {
            debug!(target: "control", "-> {text}");
        }
    }
    weak_error!(channel.send_response(response), "send response:");
}
