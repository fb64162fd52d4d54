//! Guarded Dispatch Gate
//!
//! Every binding owns one gate. The gate decides whether an action handed to
//! a [`Dispatcher`](super::Dispatcher) may reach the store.
//!
//! # States
//!
//! ```text
//!            notify (arm)                    deferred unlock(cycle)
//!   ┌────────┐ ──────────────► ┌────────┐ ─────────────────────────► ┌──────────┐
//!   │ Locked │                 │ Locked │                            │ Unlocked │
//!   └────────┘ ◄────────────── └────────┘ ◄───────────────────────── └──────────┘
//!                                            notify (arm)
//! ```
//!
//! The gate starts `Locked`. Each notification sweep re-arms it: it locks,
//! bumps the cycle counter and defers an unlock tagged with that cycle. An
//! unlock only takes effect if no newer sweep has re-armed the gate in the
//! meantime, so a continuation left over from cycle *n* can never open the
//! gate during cycle *n + 1*.
//!
//! The gate also counts the sweeps currently running on its binding. While
//! one is running the gate refuses dispatch, and an unlock that arrives
//! early (from another worker thread, or from a scheduler that runs tasks
//! inline) is parked and applied when the last running sweep returns.

use std::sync::Arc;

use parking_lot::Mutex;

use super::scheduler::Scheduler;
use crate::error::{Error, Result};

/// Observable state of a dispatch gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Dispatch is refused. The sweep that armed the gate may still be running.
    Locked,

    /// The last sweep has fully unwound; dispatch goes through.
    Unlocked,
}

#[derive(Debug)]
struct GateInner {
    state: GateState,
    cycle: u64,

    /// Sweeps on this binding that have not returned yet.
    running: usize,

    /// Unlock that arrived while a sweep was running.
    parked: Option<u64>,
}

/// The per-binding lock/unlock state machine.
#[derive(Debug)]
pub struct DispatchGate {
    inner: Mutex<GateInner>,
}

impl DispatchGate {
    /// Create a locked gate that has not seen any sweep.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(GateInner {
                state: GateState::Locked,
                cycle: 0,
                running: 0,
                parked: None,
            }),
        }
    }

    /// Current state.
    pub fn state(&self) -> GateState {
        self.inner.lock().state
    }

    /// Number of sweeps that armed this gate.
    pub fn cycle(&self) -> u64 {
        self.inner.lock().cycle
    }

    /// Number of sweeps on this binding that are still running.
    pub fn running_sweeps(&self) -> usize {
        self.inner.lock().running
    }

    /// Whether a dispatch right now would go through.
    pub fn is_open(&self) -> bool {
        let inner = self.inner.lock();
        inner.state == GateState::Unlocked && inner.running == 0
    }

    /// Fail unless the gate is open.
    pub fn check(&self) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(Error::SynchronousDispatchForbidden)
        }
    }

    /// Mark a sweep as running until the returned guard drops.
    pub(crate) fn enter(self: &Arc<Self>) -> SweepGuard {
        self.inner.lock().running += 1;
        SweepGuard {
            gate: Arc::clone(self),
        }
    }

    fn leave(&self) {
        let mut inner = self.inner.lock();
        inner.running = inner.running.saturating_sub(1);
        if inner.running > 0 {
            return;
        }
        if let Some(cycle) = inner.parked.take() {
            if cycle == inner.cycle {
                inner.state = GateState::Unlocked;
                tracing::trace!(cycle, "dispatch gate unlocked after sweep returned");
            }
        }
    }

    /// Lock for a new sweep and defer the matching unlock.
    ///
    /// Returns the cycle number of the new sweep.
    pub(crate) fn arm(self: &Arc<Self>, scheduler: &dyn Scheduler) -> u64 {
        let cycle = self.lock();
        let gate = Arc::clone(self);
        scheduler.defer(Box::new(move || {
            gate.unlock(cycle);
        }));
        cycle
    }

    fn lock(&self) -> u64 {
        let mut inner = self.inner.lock();
        inner.state = GateState::Locked;
        inner.cycle += 1;
        inner.parked = None;
        tracing::trace!(cycle = inner.cycle, "dispatch gate locked");
        inner.cycle
    }

    /// Open the gate if `cycle` is still the latest sweep.
    fn unlock(&self, cycle: u64) -> bool {
        let mut inner = self.inner.lock();
        if inner.cycle != cycle {
            tracing::trace!(cycle, current = inner.cycle, "stale gate unlock ignored");
            return false;
        }
        if inner.running > 0 {
            inner.parked = Some(cycle);
            tracing::trace!(cycle, "gate unlock parked until the sweep returns");
            return false;
        }
        inner.state = GateState::Unlocked;
        tracing::trace!(cycle, "dispatch gate unlocked");
        true
    }
}

/// Keeps a sweep marked as running on its gate.
///
/// Dropping the guard, including while unwinding from a panicking
/// subscriber, ends the sweep and applies a parked unlock.
#[must_use = "the sweep ends when the guard drops"]
pub(crate) struct SweepGuard {
    gate: Arc<DispatchGate>,
}

impl Drop for SweepGuard {
    fn drop(&mut self) {
        self.gate.leave();
    }
}

impl Default for DispatchGate {
    fn default() -> Self {
        Self::new()
    }
}
