use std::sync::{Condvar, Mutex, MutexGuard};

#[derive(Debug)]
struct GateState {
    paused: bool,
    permit: bool,
    stopped: bool,
}

/// Suspend/resume gate between the simulation thread and the control thread.
///
/// Simulation thread calls [`SuspendGate::pause`] before it reports a stop outward and
/// [`SuspendGate::wait`] after that. Control thread calls [`SuspendGate::release`].
/// A release that arrives between `pause` and `wait` is kept as a permit, a release while
/// running is ignored.
#[derive(Debug)]
pub struct SuspendGate {
    state: Mutex<GateState>,
    cond: Condvar,
}

impl SuspendGate {
    /// Create a gate. With `paused` set the first [`SuspendGate::wait`] blocks until
    /// a release without a preceding `pause` call.
    pub fn new(paused: bool) -> Self {
        Self {
            state: Mutex::new(GateState {
                paused,
                permit: false,
                stopped: false,
            }),
            cond: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Mark simulation as paused. Return false if gate is stopped and a pause never happens.
    pub fn pause(&self) -> bool {
        let mut state = self.lock();
        if state.stopped {
            return false;
        }
        state.paused = true;
        true
    }

    /// Block until released (or stopped), then mark simulation as running.
    pub fn wait(&self) {
        let mut state = self.lock();
        while state.paused && !state.permit && !state.stopped {
            state = self.cond.wait(state).unwrap_or_else(|e| e.into_inner());
        }
        state.permit = false;
        state.paused = false;
    }

    /// Release a paused simulation. Return false if simulation isn't paused.
    pub fn release(&self) -> bool {
        let mut state = self.lock();
        if !state.paused || state.permit {
            return false;
        }
        state.permit = true;
        self.cond.notify_one();
        true
    }

    /// Open the gate for good.
    pub fn stop(&self) {
        let mut state = self.lock();
        state.stopped = true;
        state.permit = false;
        self.cond.notify_all();
    }

    pub fn is_paused(&self) -> bool {
        self.lock().paused
    }

    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }
}
