//! Flow control: pause / resume / destroy signalling between a consumer and
//! the read loop.
//!
//! The consumer side is [`StreamControl`], a cheap cloneable handle that can
//! be used from listener callbacks or from any other task. The loop side is
//! [`FlowController`], which owns the held chunk and decides, after each read
//! completes, whether the chunk is delivered now or kept until `resume`.

use crate::domain::Chunk;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Signals {
    paused: bool,
    destroy_requested: bool,
    finished: bool,
}

/// What the read loop should do after waiting for the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Keep reading.
    Flow,
    /// Tear the stream down.
    Destroy,
}

/// Consumer-facing handle for pausing, resuming and destroying a stream.
///
/// Every operation is a no-op once the stream has finished.
#[derive(Debug, Clone)]
pub struct StreamControl {
    signals: Arc<watch::Sender<Signals>>,
}

impl StreamControl {
    /// Stop issuing reads. A read already in flight still completes; its
    /// chunk is held until [`resume`](Self::resume).
    pub fn pause(&self) {
        self.signals.send_if_modified(|s| {
            if s.finished || s.paused {
                return false;
            }
            s.paused = true;
            true
        });
    }

    /// Deliver any held chunk, then continue reading.
    pub fn resume(&self) {
        self.signals.send_if_modified(|s| {
            if s.finished || !s.paused {
                return false;
            }
            s.paused = false;
            true
        });
    }

    /// Ask the stream to stop and release its descriptor, even an adopted
    /// one. Takes effect once any in-flight read has completed.
    pub fn destroy(&self) {
        self.signals.send_if_modified(|s| {
            if s.finished || s.destroy_requested {
                return false;
            }
            s.destroy_requested = true;
            true
        });
    }

    /// Whether delivery is paused.
    pub fn is_paused(&self) -> bool {
        self.signals.borrow().paused
    }

    /// Whether the stream has reached a terminal state.
    pub fn is_finished(&self) -> bool {
        self.signals.borrow().finished
    }
}

/// Loop-side flow state: the pause gate plus at most one held chunk.
#[derive(Debug)]
pub struct FlowController {
    control: StreamControl,
    receiver: watch::Receiver<Signals>,
    pending: Option<Chunk>,
}

impl FlowController {
    /// A flowing (unpaused) controller.
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(Signals::default());
        Self {
            control: StreamControl {
                signals: Arc::new(sender),
            },
            receiver,
            pending: None,
        }
    }

    /// A handle for the consumer.
    pub fn control(&self) -> StreamControl {
        self.control.clone()
    }

    /// Whether delivery is paused.
    pub fn is_paused(&self) -> bool {
        self.receiver.borrow().paused
    }

    /// Whether a destroy has been requested.
    pub fn destroy_requested(&self) -> bool {
        self.receiver.borrow().destroy_requested
    }

    /// Hand over a completed read.
    ///
    /// Returns the chunk back for immediate delivery while flowing; while
    /// paused the chunk is held and `None` is returned.
    pub fn admit(&mut self, chunk: Chunk) -> Option<Chunk> {
        if !self.is_paused() {
            return Some(chunk);
        }
        debug_assert!(self.pending.is_none(), "second chunk held while paused");
        log::trace!("holding chunk at offset {} while paused", chunk.offset());
        self.pending = Some(chunk);
        None
    }

    /// Take the held chunk, if any.
    pub fn take_pending(&mut self) -> Option<Chunk> {
        self.pending.take()
    }

    /// Whether a chunk is held.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Wait until the consumer resumes or requests destruction.
    ///
    /// Returns immediately when already flowing.
    pub async fn wait_until_flowing(&mut self) -> Gate {
        let signals = self
            .receiver
            .wait_for(|s| !s.paused || s.destroy_requested)
            .await
            .map(|s| *s)
            // The sender lives in `self.control`, so the channel cannot close
            .unwrap_or_default();

        if signals.destroy_requested {
            Gate::Destroy
        } else {
            Gate::Flow
        }
    }

    /// Mark the stream finished: later control calls become no-ops and any
    /// held chunk is dropped.
    pub fn finish(&mut self) {
        self.pending = None;
        self.control.signals.send_modify(|s| {
            s.finished = true;
            s.paused = false;
        });
    }
}

impl Default for FlowController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(offset: u64) -> Chunk {
        Chunk::new(offset, vec![b'x'])
    }

    #[test]
    fn test_flowing_chunk_passes_through() {
        let mut flow = FlowController::new();
        assert_eq!(flow.admit(chunk(0)), Some(chunk(0)));
        assert!(!flow.has_pending());
    }

    #[test]
    fn test_paused_chunk_is_held_once() {
        let mut flow = FlowController::new();
        let control = flow.control();

        control.pause();
        assert_eq!(flow.admit(chunk(5)), None);
        assert!(flow.has_pending());

        control.resume();
        assert_eq!(flow.take_pending(), Some(chunk(5)));
        assert_eq!(flow.take_pending(), None);
    }

    #[test]
    fn test_pause_resume_pairs_leave_no_trace() {
        let flow = FlowController::new();
        let control = flow.control();
        let before = *flow.receiver.borrow();

        control.pause();
        control.resume();
        control.pause();
        control.resume();

        assert_eq!(*flow.receiver.borrow(), before);
        assert!(!flow.is_paused());
    }

    #[tokio::test]
    async fn test_wait_returns_immediately_when_flowing() {
        let mut flow = FlowController::new();
        assert_eq!(flow.wait_until_flowing().await, Gate::Flow);
    }

    #[tokio::test]
    async fn test_wait_until_resumed_from_other_task() {
        let mut flow = FlowController::new();
        let control = flow.control();
        control.pause();

        let resumer = tokio::spawn(async move {
            tokio::task::yield_now().await;
            control.resume();
        });

        assert_eq!(flow.wait_until_flowing().await, Gate::Flow);
        resumer.await.unwrap();
    }

    #[tokio::test]
    async fn test_destroy_releases_a_paused_wait() {
        let mut flow = FlowController::new();
        let control = flow.control();
        control.pause();
        control.destroy();

        assert_eq!(flow.wait_until_flowing().await, Gate::Destroy);
        assert!(flow.destroy_requested());
    }

    #[test]
    fn test_controls_are_noops_after_finish() {
        let mut flow = FlowController::new();
        let control = flow.control();
        control.pause();
        assert_eq!(flow.admit(chunk(0)), None);

        flow.finish();
        assert!(!flow.has_pending());
        assert!(control.is_finished());

        control.pause();
        control.destroy();
        assert!(!control.is_paused());
        assert!(!flow.destroy_requested());
    }
}
