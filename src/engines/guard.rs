/// Per-engine cycle guard
///
/// At most one refresh cycle runs per engine. A tick that arrives while a
/// cycle is in flight is skipped, not queued.
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Phase of the current refresh cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Fetching,
    Normalizing,
    ScoringAndPublishing,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EngineState::Idle => "idle",
            EngineState::Fetching => "fetching",
            EngineState::Normalizing => "normalizing",
            EngineState::ScoringAndPublishing => "scoring_and_publishing",
        };
        f.write_str(label)
    }
}

pub struct CycleGuard {
    in_progress: AtomicBool,
    state: Mutex<EngineState>,
}

impl Default for CycleGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleGuard {
    pub fn new() -> Self {
        Self {
            in_progress: AtomicBool::new(false),
            state: Mutex::new(EngineState::Idle),
        }
    }

    /// Enter a cycle, or `None` when one is already running
    pub fn try_enter(&self) -> Option<CyclePermit<'_>> {
        if self.in_progress.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(CyclePermit { guard: self })
    }

    pub fn is_running(&self) -> bool {
        self.in_progress.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> EngineState {
        *self.state.lock()
    }
}

/// Held for the duration of a cycle; dropping it returns the engine to idle,
/// including on early return.
pub struct CyclePermit<'a> {
    guard: &'a CycleGuard,
}

impl CyclePermit<'_> {
    pub fn set_state(&self, state: EngineState) {
        *self.guard.state.lock() = state;
    }
}

impl Drop for CyclePermit<'_> {
    fn drop(&mut self) {
        *self.guard.state.lock() = EngineState::Idle;
        self.guard.in_progress.store(false, Ordering::SeqCst);
    }
}
