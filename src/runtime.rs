//! Bootstrap and teardown of the debugger runtime inside a simulation process.

use crate::config::RuntimeConfig;
use crate::control::{Channel, ChannelHook, ControlServer, ServerHandle};
use crate::debugger::{DebugSession, SessionBuilder};
use crate::provider::SignalProvider;
use anyhow::{anyhow, Context};
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Running debugger: a debug session and the control thread serving it.
pub struct Runtime {
    session: Arc<DebugSession>,
    server: ServerHandle,
    control_thread: Option<JoinHandle<anyhow::Result<()>>>,
}

impl Runtime {
    /// Build a session, attach a configured symbol table and start the control thread.
    /// Return without waiting for a client.
    pub fn launch(config: &RuntimeConfig, provider: Arc<dyn SignalProvider>) -> anyhow::Result<Self> {
        let channel = Arc::new(Channel::new());
        let session = Arc::new(
            SessionBuilder::new()
                .with_hooks(Arc::new(ChannelHook::new(channel.clone())))
                .with_root_prefix(config.root_prefix.as_str())
                .with_store_poll_interval(config.store_poll_interval())
                .start_paused(config.start_paused)
                .build(provider),
        );

        match &config.database {
            Some(database) => session
                .connect(&database.to_string_lossy(), config.path_map())
                .with_context(|| format!("attach symbol table {}", database.display()))?,
            None => {
                if let Some((src, dst)) = config.path_map() {
                    session.set_path_map(src, dst);
                }
            }
        }

        let server = ControlServer::bind(config.listen_addr()?, session.clone(), channel)?
            .with_trace(config.trace)
            .with_forward_logs(config.forward_logs);
        let handle = server.handle();
        let control_thread = thread::Builder::new()
            .name("control".to_string())
            .spawn(move || server.run())?;

        Ok(Self {
            session,
            server: handle,
            control_thread: Some(control_thread),
        })
    }

    /// Same as [`Runtime::launch`], then park the calling (simulation) thread until a client
    /// releases it if the runtime starts paused.
    pub fn start(config: &RuntimeConfig, provider: Arc<dyn SignalProvider>) -> anyhow::Result<Self> {
        let runtime = Self::launch(config, provider)?;
        if config.start_paused {
            runtime.session.wait_for_client();
        }
        Ok(runtime)
    }

    pub fn session(&self) -> &Arc<DebugSession> {
        &self.session
    }

    /// Address of the control listener.
    pub fn local_addr(&self) -> SocketAddr {
        self.server.local_addr()
    }

    /// Push `stop` to the client, release the simulation for good, close the connection
    /// and join the control thread.
    pub fn teardown(mut self) -> anyhow::Result<()> {
        log::info!(target: "simstalker", "runtime teardown");
        self.session.shutdown();
        self.server.close();
        if let Some(control_thread) = self.control_thread.take() {
            control_thread
                .join()
                .map_err(|_| anyhow!("control thread panicked"))??;
        }
        Ok(())
    }
}
