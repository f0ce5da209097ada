//! Pipeline run observers.
//!
//! The executor reports state transitions, per-filter progress and
//! diagnostics through [`PipelineObserver`]. [`ChannelObserver`] moves them
//! across a thread boundary on a bounded crossbeam channel.

use crate::pipeline::context::Phase;
use crate::pipeline::diagnostic::{Diagnostic, Severity};
use crate::pipeline::executor::PipelineState;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tracing::{debug, error, info, warn};

/// Receives run events. Every method defaults to a no-op.
pub trait PipelineObserver {
    fn state_changed(&mut self, _state: PipelineState) {}

    fn filter_started(&mut self, _index: usize, _phase: Phase, _name: &str) {}

    fn filter_finished(&mut self, _index: usize, _phase: Phase) {}

    /// `percent` is local to the filter at `index`.
    fn progress(&mut self, _index: usize, _percent: u8, _status: &str) {}

    fn diagnostic(&mut self, _diagnostic: &Diagnostic) {}
}

/// Ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl PipelineObserver for NullObserver {}

/// Forwards run events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl PipelineObserver for LogObserver {
    fn state_changed(&mut self, state: PipelineState) {
        info!(state = %state, "Pipeline state changed");
    }

    fn filter_started(&mut self, index: usize, phase: Phase, name: &str) {
        debug!(index, phase = phase.display_name(), filter = name, "Filter started");
    }

    fn progress(&mut self, index: usize, percent: u8, status: &str) {
        debug!(index, percent, "{}", status);
    }

    fn diagnostic(&mut self, diagnostic: &Diagnostic) {
        match diagnostic.severity {
            Severity::Error => error!(
                index = diagnostic.filter_index,
                filter = %diagnostic.filter_name,
                code = diagnostic.code,
                "{}",
                diagnostic.message
            ),
            Severity::Warning => warn!(
                index = diagnostic.filter_index,
                filter = %diagnostic.filter_name,
                code = diagnostic.code,
                "{}",
                diagnostic.message
            ),
        }
    }
}

/// Messages emitted by [`ChannelObserver`].
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineMessage {
    State(PipelineState),
    FilterStarted {
        index: usize,
        phase: Phase,
        name: String,
    },
    FilterFinished {
        index: usize,
        phase: Phase,
    },
    Progress {
        index: usize,
        percent: u8,
        status: String,
    },
    Diagnostic(Diagnostic),
}

/// Sends run events over a bounded channel.
///
/// Sending never blocks the pipeline: when the channel is full the message is
/// dropped and counted.
pub struct ChannelObserver {
    tx: Sender<PipelineMessage>,
    dropped: usize,
}

impl ChannelObserver {
    /// Create an observer and the receiving end of its channel.
    pub fn bounded(capacity: usize) -> (Self, Receiver<PipelineMessage>) {
        let (tx, rx) = bounded(capacity.max(1));
        (Self { tx, dropped: 0 }, rx)
    }

    /// Messages dropped because the channel was full.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    fn send(&mut self, msg: PipelineMessage) {
        match self.tx.try_send(msg) {
            Ok(()) | Err(TrySendError::Disconnected(_)) => {}
            Err(TrySendError::Full(_)) => self.dropped += 1,
        }
    }
}

impl PipelineObserver for ChannelObserver {
    fn state_changed(&mut self, state: PipelineState) {
        self.send(PipelineMessage::State(state));
    }

    fn filter_started(&mut self, index: usize, phase: Phase, name: &str) {
        self.send(PipelineMessage::FilterStarted {
            index,
            phase,
            name: name.to_string(),
        });
    }

    fn filter_finished(&mut self, index: usize, phase: Phase) {
        self.send(PipelineMessage::FilterFinished { index, phase });
    }

    fn progress(&mut self, index: usize, percent: u8, status: &str) {
        self.send(PipelineMessage::Progress {
            index,
            percent,
            status: status.to_string(),
        });
    }

    fn diagnostic(&mut self, diagnostic: &Diagnostic) {
        self.send(PipelineMessage::Diagnostic(diagnostic.clone()));
    }
}

/// Drain all pending messages without blocking.
pub fn drain(rx: &Receiver<PipelineMessage>) -> Vec<PipelineMessage> {
    let mut msgs = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        msgs.push(msg);
    }
    msgs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_observer_forwards_events() {
        let (mut observer, rx) = ChannelObserver::bounded(16);
        observer.state_changed(PipelineState::Preflighting);
        observer.filter_started(0, Phase::Preflight, "create_data_array");
        observer.progress(0, 50, "halfway");
        observer.filter_finished(0, Phase::Preflight);

        let msgs = drain(&rx);
        assert_eq!(msgs.len(), 4);
        assert_eq!(msgs[0], PipelineMessage::State(PipelineState::Preflighting));
        assert!(matches!(
            &msgs[2],
            PipelineMessage::Progress { index: 0, percent: 50, .. }
        ));
    }

    #[test]
    fn test_full_channel_drops_instead_of_blocking() {
        let (mut observer, rx) = ChannelObserver::bounded(2);
        for i in 0..5 {
            observer.progress(0, i, "tick");
        }
        assert_eq!(observer.dropped(), 3);
        assert_eq!(drain(&rx).len(), 2);
    }

    #[test]
    fn test_disconnected_receiver_is_ignored() {
        let (mut observer, rx) = ChannelObserver::bounded(2);
        drop(rx);
        observer.state_changed(PipelineState::Completed);
        assert_eq!(observer.dropped(), 0);
    }
}
