//! Run events emitted by the scan orchestrator and the batch runner
//!
//! Runners never print. They hand every classified step to a [`Reporter`],
//! which the binaries implement as console status lines.

use std::cell::RefCell;
use std::time::Duration;

use notelink_bridge::Device;
use notelink_core::{AttemptOutcome, BatchReport, DeepLink, ScanReport};

/// Why a batch stopped before its last item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The operator answered `q`
    Quit,
    /// Ctrl-C while waiting for the operator
    Interrupted,
}

/// Something worth telling the operator about
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    DevicesFound {
        devices: Vec<Device>,
    },
    ScanStarted {
        max_attempts: u32,
        retry_delay: Duration,
    },
    AttemptStarted {
        attempt: u32,
        max_attempts: u32,
    },
    PayloadFound {
        payload: String,
    },
    Dispatching {
        link: DeepLink,
    },
    Outcome {
        outcome: AttemptOutcome,
    },
    Retrying {
        delay: Duration,
    },
    BatchStarted {
        total: usize,
    },
    ItemStarted {
        index: usize,
        total: usize,
        input: String,
    },
    BatchStopped {
        reason: StopReason,
    },
    ScanFinished {
        report: ScanReport,
    },
    BatchFinished {
        report: BatchReport,
    },
}

/// Receives run events
pub trait Reporter {
    fn report(&self, event: RunEvent);
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: RefCell<Vec<RunEvent>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RunEvent> {
        self.events.borrow().clone()
    }

    /// All attempt outcomes, in order
    pub fn outcomes(&self) -> Vec<AttemptOutcome> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                RunEvent::Outcome { outcome } => Some(outcome.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&RunEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| predicate(e)).count()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, event: RunEvent) {
        self.events.borrow_mut().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_reporter_collects_outcomes() {
        let reporter = RecordingReporter::new();
        reporter.report(RunEvent::AttemptStarted {
            attempt: 1,
            max_attempts: 3,
        });
        reporter.report(RunEvent::Outcome {
            outcome: AttemptOutcome::NoPayload,
        });
        reporter.report(RunEvent::Retrying {
            delay: Duration::from_secs(3),
        });

        assert_eq!(reporter.events().len(), 3);
        assert_eq!(reporter.outcomes(), vec![AttemptOutcome::NoPayload]);
        assert_eq!(
            reporter.count(|e| matches!(e, RunEvent::Retrying { .. })),
            1
        );
    }
}
