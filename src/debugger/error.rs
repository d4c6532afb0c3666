use crate::debugger::expression::CompileError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // --------------------------------- debugger entity not found----------------------------------
    #[error("signal `{0}` not found")]
    HandleNotFound(String),
    #[error("no breakpoint at {0}:{1}")]
    NoBreakpointAt(String, u32),
    #[error("no breakpoints in file {0}")]
    NoBreakpointsInFile(String),
    #[error("instance of breakpoint {0} not found")]
    InstanceNotFound(u32),
    #[error("signal `{0}` is not monitored")]
    NotMonitored(String),

    // --------------------------------- predicate errors ------------------------------------------
    #[error("predicate compilation: {0}")]
    Compile(#[from] CompileError),
    #[error("constant `{name}` has non-integer value `{value}`")]
    NonIntegerConstant { name: String, value: String },

    // --------------------------------- debug information errors ----------------------------------
    #[error("debug information store is not attached")]
    StoreNotAttached,
    #[error("load debug information: {0}")]
    StoreLoad(anyhow::Error),

    // --------------------------------- simulator errors ------------------------------------------
    #[error("simulator rejects value change watch for `{0}`")]
    WatchRejected(String),
    #[error("simulator rejects synch callback")]
    SynchRejected,

    // --------------------------------- third party errors ----------------------------------------
    #[error("hook: {0}")]
    Hook(anyhow::Error),
}

#[macro_export]
macro_rules! _error {
    ($log_fn: path, $res: expr) => {
        match $res {
            Ok(value) => Some(value),
            Err(e) => {
                $log_fn!(target: "simstalker", "{:#}", e);
                None
            }
        }
    };
    ($log_fn: path, $res: expr, $msg: tt) => {
        match $res {
            Ok(value) => Some(value),
            Err(e) => {
                $log_fn!(target: "simstalker", concat!($msg, " {:#}"), e);
                None
            }
        }
    };
}

/// Transforms `Result` into `Option` and logs an error if it occurs.
#[macro_export]
macro_rules! weak_error {
    ($res: expr) => {
        $crate::_error!(log::warn, $res)
    };
    ($res: expr, $msg: tt) => {
        $crate::_error!(log::warn, $res, $msg)
    };
}

/// Transforms `Result` into `Option` and put error into debug logs if it occurs.
#[macro_export]
macro_rules! muted_error {
    ($res: expr) => {
        $crate::_error!(log::debug, $res)
    };
    ($res: expr, $msg: tt) => {
        $crate::_error!(log::debug, $res, $msg)
    };
}
