//! Stream lifecycle states and the transition table.

use core::fmt;

/// The state of a read stream.
///
/// ```text
/// Idle → Opening → Open → Reading ⇄ Paused
///                            │
///                            ▼
///                         Ending → Closed
///
/// any non-terminal state → Errored | Destroyed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StreamState {
    /// Configured, no I/O yet.
    #[default]
    Idle,
    /// Waiting for the descriptor.
    Opening,
    /// Descriptor available, `open` emitted.
    Open,
    /// Reads are being issued.
    Reading,
    /// The consumer paused delivery.
    Paused,
    /// Range exhausted; `end` is being emitted and the descriptor disposed.
    Ending,
    /// Finished normally.
    Closed,
    /// Failed; the descriptor was left to its owner.
    Errored,
    /// Failed or torn down; the descriptor was released (or never existed).
    Destroyed,
}

impl StreamState {
    /// Whether no further events can be emitted.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Errored | Self::Destroyed)
    }

    /// Whether `next` is a legal successor of `self`.
    pub const fn can_transition_to(&self, next: StreamState) -> bool {
        use StreamState::*;

        match (*self, next) {
            (Idle, Opening)
            | (Opening, Open)
            | (Open, Reading)
            | (Reading, Paused)
            | (Paused, Reading)
            | (Reading, Ending)
            | (Ending, Closed) => true,
            (from, Errored | Destroyed) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Opening => "opening",
            Self::Open => "open",
            Self::Reading => "reading",
            Self::Paused => "paused",
            Self::Ending => "ending",
            Self::Closed => "closed",
            Self::Errored => "errored",
            Self::Destroyed => "destroyed",
        };
        f.write_str(name)
    }
}

/// Holder for the current [`StreamState`]; the only way to change it is
/// [`transition`](Self::transition).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Lifecycle {
    state: StreamState,
}

impl Lifecycle {
    /// A lifecycle in [`StreamState::Idle`].
    pub const fn new() -> Self {
        Self {
            state: StreamState::Idle,
        }
    }

    /// Current state.
    #[inline]
    pub const fn state(&self) -> StreamState {
        self.state
    }

    /// Whether the lifecycle has finished.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Move to `next` if the table allows it.
    ///
    /// Returns `false` and leaves the state unchanged otherwise.
    pub fn transition(&mut self, next: StreamState) -> bool {
        if !self.state.can_transition_to(next) {
            log::warn!("rejected stream transition {} -> {}", self.state, next);
            return false;
        }
        log::debug!("stream {} -> {}", self.state, next);
        self.state = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut lifecycle = Lifecycle::new();
        for next in [
            StreamState::Opening,
            StreamState::Open,
            StreamState::Reading,
            StreamState::Paused,
            StreamState::Reading,
            StreamState::Ending,
            StreamState::Closed,
        ] {
            assert!(lifecycle.transition(next), "-> {next}");
        }
        assert!(lifecycle.is_terminal());
    }

    #[test]
    fn test_terminal_states_are_final() {
        for terminal in [StreamState::Closed, StreamState::Errored, StreamState::Destroyed] {
            assert!(terminal.is_terminal());
            assert!(!terminal.can_transition_to(StreamState::Reading));
            assert!(!terminal.can_transition_to(StreamState::Destroyed));
            assert!(!terminal.can_transition_to(StreamState::Errored));
        }
    }

    #[test]
    fn test_failure_reachable_from_any_live_state() {
        for live in [
            StreamState::Idle,
            StreamState::Opening,
            StreamState::Open,
            StreamState::Reading,
            StreamState::Paused,
            StreamState::Ending,
        ] {
            assert!(live.can_transition_to(StreamState::Errored));
            assert!(live.can_transition_to(StreamState::Destroyed));
        }
    }

    #[test]
    fn test_rejected_transition_keeps_state() {
        let mut lifecycle = Lifecycle::new();
        assert!(!lifecycle.transition(StreamState::Reading));
        assert_eq!(lifecycle.state(), StreamState::Idle);
    }
}
