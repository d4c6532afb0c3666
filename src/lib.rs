pub mod config;
pub mod control;
pub mod debugger;
pub mod log;
pub mod provider;
pub mod replay;
pub mod runtime;
pub mod store;
