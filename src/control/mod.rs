//! Control channel: requests of a remote debugger client and their handling.

pub mod hook;
pub mod io;
pub mod location;
pub mod logger;
pub mod protocol;
pub mod server;

pub use hook::{Channel, ChannelHook};
pub use location::{parse_location, Location};
pub use server::{ControlServer, ServerHandle};

use crate::control::protocol::RequestEnvelope;
use crate::debugger::{self, ClockMode, DebugSession};
use serde::Deserialize;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;
use strum_macros::EnumString;

#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("missing argument `{0}`")]
    MissingArgument(&'static str),
    #[error("invalid location `{0}`")]
    InvalidLocation(String),
    #[error("expected a request, got `{0}`")]
    NotRequest(String),
    #[error(transparent)]
    Session(#[from] debugger::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "camelCase")]
enum CommandKind {
    Connect,
    Status,
    SimulationStatus,
    SetBreakpoint,
    GetBreakpoints,
    RemoveBreakpoint,
    RemoveFileBreakpoints,
    Monitor,
    Unmonitor,
    UnmonitorAll,
    Continue,
    StepOver,
    Stop,
    SetTopName,
    Clock,
    SetPathMap,
    Value,
    Values,
    Time,
    Hierarchy,
    ConnectionsTo,
    ConnectionsFrom,
    Context,
    Files,
}

/// Arguments of every command, each command picks the fields it needs.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Arguments {
    id: Option<u32>,
    filename: Option<String>,
    line: Option<u32>,
    column: Option<u32>,
    location: Option<String>,
    condition: Option<String>,
    name: Option<String>,
    names: Option<Vec<String>>,
    scope: Option<String>,
    handle: Option<String>,
    mode: Option<String>,
    database: Option<String>,
    src_path: Option<String>,
    dst_path: Option<String>,
}

impl Arguments {
    fn from_value(value: Value) -> CommandResult<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value).map_err(|e| CommandError::InvalidArguments(e.to_string()))
    }

    fn required<T>(field: Option<T>, name: &'static str) -> CommandResult<T> {
        field.ok_or(CommandError::MissingArgument(name))
    }

    fn name(&mut self) -> CommandResult<String> {
        Self::required(self.name.take(), "name")
    }

    fn handle(&mut self) -> CommandResult<String> {
        Self::required(self.handle.take(), "handle")
    }

    /// Location from `location` string or from `filename`, `line` and `column` fields.
    fn location(&mut self) -> CommandResult<Location> {
        if let Some(location) = self.location.take() {
            return parse_location(&location);
        }
        Ok(Location {
            file: Self::required(self.filename.take(), "filename")?,
            line: Self::required(self.line, "line")?,
            column: self.column,
        })
    }

    fn target(&mut self) -> CommandResult<BreakpointTarget> {
        match self.id {
            Some(id) => Ok(BreakpointTarget::Id(id)),
            None => self.location().map(BreakpointTarget::Location),
        }
    }

    fn path_map(&mut self) -> Option<(String, String)> {
        self.src_path.take().zip(self.dst_path.take())
    }
}

/// Breakpoint given by id or by source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakpointTarget {
    Id(u32),
    Location(Location),
}

/// Parsed control request.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Connect {
        database: String,
        path_map: Option<(String, String)>,
    },
    Status,
    SimulationStatus,
    SetBreakpoint {
        target: BreakpointTarget,
        condition: Option<String>,
    },
    GetBreakpoints(Location),
    RemoveBreakpoint(BreakpointTarget),
    RemoveFileBreakpoints(String),
    Monitor(String),
    Unmonitor(String),
    UnmonitorAll,
    Continue,
    StepOver,
    Stop,
    SetTopName(String),
    Clock(ClockMode),
    SetPathMap {
        src_path: String,
        dst_path: String,
    },
    Value(String),
    Values(Vec<String>),
    Time,
    Hierarchy(String),
    ConnectionsTo(String),
    ConnectionsFrom(String),
    Context(Location),
    Files,
}

impl Request {
    /// Parse a request. No session state is touched, so a malformed request changes nothing.
    pub fn parse(command: &str, arguments: Value) -> CommandResult<Self> {
        let kind = CommandKind::from_str(command)
            .map_err(|_| CommandError::UnknownCommand(command.to_string()))?;
        let mut args = Arguments::from_value(arguments)?;

        let request = match kind {
            CommandKind::Connect => Request::Connect {
                database: Arguments::required(args.database.take(), "database")?,
                path_map: args.path_map(),
            },
            CommandKind::Status => Request::Status,
            CommandKind::SimulationStatus => Request::SimulationStatus,
            CommandKind::SetBreakpoint => Request::SetBreakpoint {
                target: args.target()?,
                condition: args.condition.take(),
            },
            CommandKind::GetBreakpoints => Request::GetBreakpoints(args.location()?),
            CommandKind::RemoveBreakpoint => Request::RemoveBreakpoint(args.target()?),
            CommandKind::RemoveFileBreakpoints => Request::RemoveFileBreakpoints(
                Arguments::required(args.filename.take(), "filename")?,
            ),
            CommandKind::Monitor => Request::Monitor(args.name()?),
            CommandKind::Unmonitor => Request::Unmonitor(args.name()?),
            CommandKind::UnmonitorAll => Request::UnmonitorAll,
            CommandKind::Continue => Request::Continue,
            CommandKind::StepOver => Request::StepOver,
            CommandKind::Stop => Request::Stop,
            CommandKind::SetTopName => Request::SetTopName(args.name()?),
            CommandKind::Clock => {
                let mode = Arguments::required(args.mode.take(), "mode")?;
                let mode = ClockMode::from_str(&mode)
                    .map_err(|_| CommandError::InvalidArguments(format!("clock mode `{mode}`")))?;
                Request::Clock(mode)
            }
            CommandKind::SetPathMap => Request::SetPathMap {
                src_path: Arguments::required(args.src_path.take(), "src_path")?,
                dst_path: Arguments::required(args.dst_path.take(), "dst_path")?,
            },
            CommandKind::Value => Request::Value(args.name()?),
            CommandKind::Values => {
                Request::Values(Arguments::required(args.names.take(), "names")?)
            }
            CommandKind::Time => Request::Time,
            CommandKind::Hierarchy => Request::Hierarchy(args.scope.take().unwrap_or_default()),
            CommandKind::ConnectionsTo => Request::ConnectionsTo(args.handle()?),
            CommandKind::ConnectionsFrom => Request::ConnectionsFrom(args.handle()?),
            CommandKind::Context => Request::Context(args.location()?),
            CommandKind::Files => Request::Files,
        };
        Ok(request)
    }

    /// Request reads the debug-info store and blocks until one is attached.
    pub fn waits_for_store(&self) -> bool {
        match self {
            Request::SetBreakpoint { target, condition } => {
                matches!(target, BreakpointTarget::Location(_))
                    || condition.as_deref().is_some_and(|c| !c.trim().is_empty())
            }
            Request::RemoveBreakpoint(target) => matches!(target, BreakpointTarget::Location(_)),
            Request::GetBreakpoints(_)
            | Request::RemoveFileBreakpoints(_)
            | Request::Hierarchy(_)
            | Request::ConnectionsTo(_)
            | Request::ConnectionsFrom(_)
            | Request::Context(_)
            | Request::Files => true,
            _ => false,
        }
    }

    pub fn from_envelope(envelope: RequestEnvelope) -> CommandResult<Self> {
        if envelope.r#type != "request" {
            return Err(CommandError::NotRequest(envelope.r#type));
        }
        Self::parse(&envelope.command, envelope.arguments)
    }
}

/// Applies requests to a debug session.
#[derive(Clone)]
pub struct Handler {
    session: Arc<DebugSession>,
}

impl Handler {
    pub fn new(session: Arc<DebugSession>) -> Self {
        Self { session }
    }

    /// Execute a request, return a response body.
    pub fn handle(&self, request: Request) -> CommandResult<Option<Value>> {
        let session = &self.session;
        let body = match request {
            Request::Connect { database, path_map } => {
                let path_map = path_map.as_ref().map(|(s, d)| (s.as_str(), d.as_str()));
                session.connect(&database, path_map)?;
                Some(json!({ "connected": true }))
            }
            Request::Status => Some(json!({ "connected": session.is_connected() })),
            Request::SimulationStatus => {
                let status = if session.is_paused() {
                    "Paused"
                } else {
                    "Running"
                };
                Some(json!({ "status": status }))
            }
            Request::SetBreakpoint { target, condition } => {
                let condition = condition.as_deref();
                let breakpoints = match target {
                    BreakpointTarget::Id(id) => {
                        session.arm(id);
                        let condition = match condition {
                            Some(text) if !text.trim().is_empty() => {
                                session.attach_predicate(id, text)
                            }
                            _ => false,
                        };
                        json!([{ "id": id, "condition": condition }])
                    }
                    BreakpointTarget::Location(loc) => {
                        let armed = session.arm_at(&loc.file, loc.line, loc.column, condition)?;
                        serde_json::to_value(armed)?
                    }
                };
                Some(json!({ "breakpoints": breakpoints }))
            }
            Request::GetBreakpoints(loc) => {
                let breakpoints: Vec<Value> = session
                    .breakpoints_at(&loc.file, loc.line, loc.column)?
                    .into_iter()
                    .map(|bp| {
                        json!({
                            "id": bp.breakpoint_id,
                            "instance_id": bp.instance_id,
                            "column": bp.column,
                            "armed": session.is_armed(bp.breakpoint_id),
                        })
                    })
                    .collect();
                Some(json!({ "breakpoints": breakpoints }))
            }
            Request::RemoveBreakpoint(target) => {
                let removed = match target {
                    BreakpointTarget::Id(id) => {
                        if session.disarm(id) {
                            vec![id]
                        } else {
                            vec![]
                        }
                    }
                    BreakpointTarget::Location(loc) => {
                        session.disarm_at(&loc.file, loc.line, loc.column)?
                    }
                };
                Some(json!({ "removed": removed }))
            }
            Request::RemoveFileBreakpoints(file) => {
                Some(json!({ "removed": session.disarm_file(&file)? }))
            }
            Request::Monitor(name) => {
                session.watch(&name)?;
                None
            }
            Request::Unmonitor(name) => {
                session.unwatch(&name)?;
                None
            }
            Request::UnmonitorAll => Some(json!({ "removed": session.unwatch_all() })),
            Request::Continue => {
                session.continue_();
                None
            }
            Request::StepOver => {
                session.step_over();
                None
            }
            Request::Stop => {
                session.stop();
                None
            }
            Request::SetTopName(name) => {
                session.set_root_prefix(&name);
                None
            }
            Request::Clock(mode) => {
                session.set_clock_mode(mode)?;
                None
            }
            Request::SetPathMap { src_path, dst_path } => {
                session.set_path_map(&src_path, &dst_path);
                None
            }
            Request::Value(name) => {
                let value = session.value(&name)?;
                Some(json!({ "name": name, "value": value }))
            }
            Request::Values(names) => Some(json!({ "values": session.values(&names) })),
            Request::Time => Some(json!({ "time": session.time() })),
            Request::Hierarchy(scope) => Some(serde_json::to_value(session.hierarchy(&scope)?)?),
            Request::ConnectionsTo(handle) => {
                Some(json!({ "connections": session.connections_to(&handle)? }))
            }
            Request::ConnectionsFrom(handle) => {
                Some(json!({ "connections": session.connections_from(&handle)? }))
            }
            Request::Context(loc) => {
                Some(json!({ "breakpoints": session.context(&loc.file, loc.line)? }))
            }
            Request::Files => Some(json!({ "files": session.files()? })),
        };
        Ok(body)
    }
}
