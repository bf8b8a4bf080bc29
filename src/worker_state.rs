use std::fmt;

/// Lifecycle state of the delivery worker.
///
/// `Idle → WaitingOnQueue → Dispatching → Idle`, until a stop request moves
/// the worker to the terminal `Stopped` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum WorkerState {
    /// Not waiting on the queue; the initial state before `start`.
    #[default]
    Idle = 0,
    /// Blocked until an envelope arrives or a stop is requested.
    WaitingOnQueue = 1,
    /// Invoking subscribers for one envelope.
    Dispatching = 2,
    Stopped = 3,
}

impl WorkerState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => WorkerState::WaitingOnQueue,
            2 => WorkerState::Dispatching,
            3 => WorkerState::Stopped,
            _ => WorkerState::Idle,
        }
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, WorkerState::Stopped)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerState::Idle => write!(f, "Idle"),
            WorkerState::WaitingOnQueue => write!(f, "WaitingOnQueue"),
            WorkerState::Dispatching => write!(f, "Dispatching"),
            WorkerState::Stopped => write!(f, "Stopped"),
        }
    }
}
