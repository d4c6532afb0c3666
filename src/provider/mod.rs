//! Access to the running simulator.
//!
//! A [`SignalProvider`] is the only way the runtime reads simulation state or asks the
//! simulator for callbacks. Real simulators expose these primitives through their native
//! interfaces, [`memory::MemorySimulator`] implements them in memory.

pub mod memory;

pub use memory::MemorySimulator;

/// Opaque reference to a live signal inside the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(u64);

impl Handle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Token returned by the simulator for a registered value change callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchToken(u64);

impl WatchToken {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Called by the simulator with the new signal value.
pub type ValueChangeCallback = Box<dyn Fn(i64) + Send + Sync>;

/// Called once by the simulator at the next quiescent point.
pub type SynchCallback = Box<dyn FnOnce() + Send>;

pub trait SignalProvider: Send + Sync {
    /// Find a signal by its fully qualified name.
    fn resolve_handle(&self, name: &str) -> Option<Handle>;

    /// Read current signal value as an integer.
    fn read_value(&self, handle: Handle) -> i64;

    /// Current simulation time.
    fn read_time(&self) -> u64;

    /// Register a callback fired on every value change of the signal.
    /// Return `None` if simulator rejects the registration.
    fn register_value_change(
        &self,
        handle: Handle,
        callback: ValueChangeCallback,
    ) -> Option<WatchToken>;

    /// Remove previously registered value change callback.
    fn unregister(&self, token: WatchToken) -> bool;

    /// Register a one-shot callback fired when the simulation reaches next quiescent point.
    fn register_synch(&self, callback: SynchCallback) -> bool;

    /// Ask the simulator to finish simulation.
    fn terminate_simulation(&self);
}
