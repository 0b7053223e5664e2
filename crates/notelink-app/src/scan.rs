//! Scan mode: poll the screen for a QR code until one opens in the app
//!
//! Connectivity is checked once per run. Each attempt acquires one payload
//! and hands it to the [`AttemptPipeline`]. Soft failures are retried after
//! the configured delay, up to `max_attempts`. A dispatch failure ends the run
//! since scanning again cannot fix an app launch problem.

use std::collections::VecDeque;
use std::time::Duration;

use notelink_bridge::CommandRunner;
use notelink_core::prelude::*;
use notelink_core::{AttemptOutcome, RawPayload, ScanReport, ScanResult};

use crate::attempt::{check_connectivity, AttemptPipeline};
use crate::capture::PayloadSource;
use crate::events::{Reporter, RunEvent};

/// Default attempt ceiling
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Default wait between attempts
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Retry policy of a scan run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

pub struct ScanOrchestrator<'a, R: CommandRunner, S> {
    pipeline: AttemptPipeline<'a, R>,
    source: S,
    options: ScanOptions,
    reporter: &'a dyn Reporter,
}

impl<'a, R: CommandRunner, S: PayloadSource> ScanOrchestrator<'a, R, S> {
    pub fn new(
        pipeline: AttemptPipeline<'a, R>,
        source: S,
        options: ScanOptions,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            pipeline,
            source,
            options,
            reporter,
        }
    }

    /// Run until a link opens, dispatch fails, or attempts run out.
    ///
    /// Errors are fatal conditions only: no device, missing adb, or a
    /// capture backend that cannot work at all.
    pub async fn run(&mut self) -> Result<ScanReport> {
        check_connectivity(self.pipeline.bridge(), self.reporter).await?;

        let max_attempts = self.options.max_attempts;
        self.reporter.report(RunEvent::ScanStarted {
            max_attempts,
            retry_delay: self.options.retry_delay,
        });
        info!(
            "Scanning for up to {} attempts, {:?} apart",
            max_attempts, self.options.retry_delay
        );

        let mut attempts_used = 0;
        let mut result = ScanResult::Exhausted;

        for attempt in 1..=max_attempts {
            attempts_used = attempt;
            self.reporter.report(RunEvent::AttemptStarted {
                attempt,
                max_attempts,
            });

            let outcome = self.attempt().await?;
            debug!("Attempt {}/{}: {:?}", attempt, max_attempts, outcome);
            self.reporter.report(RunEvent::Outcome {
                outcome: outcome.clone(),
            });

            match outcome {
                AttemptOutcome::Succeeded { link } => {
                    result = ScanResult::Opened {
                        link,
                        tapped: self.pipeline.plan().tap.is_some(),
                    };
                    break;
                }
                AttemptOutcome::TapFailed { link, .. } => {
                    result = ScanResult::Opened {
                        link,
                        tapped: false,
                    };
                    break;
                }
                AttemptOutcome::DispatchFailed { link, reason } => {
                    result = ScanResult::DispatchFailed { link, reason };
                    break;
                }
                AttemptOutcome::NoPayload
                | AttemptOutcome::AcquireFailed { .. }
                | AttemptOutcome::PayloadInvalid { .. } => {
                    if attempt < max_attempts {
                        self.reporter.report(RunEvent::Retrying {
                            delay: self.options.retry_delay,
                        });
                        tokio::time::sleep(self.options.retry_delay).await;
                    }
                }
            }
        }

        let report = ScanReport {
            attempts_used,
            max_attempts,
            result,
        };
        info!("Scan finished: {:?}", report);
        self.reporter.report(RunEvent::ScanFinished {
            report: report.clone(),
        });
        Ok(report)
    }

    async fn attempt(&mut self) -> Result<AttemptOutcome> {
        match self.source.acquire().await {
            Ok(Some(payload)) => self.pipeline.process(payload).await,
            Ok(None) => Ok(AttemptOutcome::NoPayload),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!("Payload acquisition failed: {}", e);
                Ok(AttemptOutcome::AcquireFailed {
                    reason: e.to_string(),
                })
            }
        }
    }
}

/// Replays a fixed list of acquisition results, then reports nothing found
#[derive(Debug, Default)]
pub struct QueuedPayloads {
    queue: VecDeque<Result<Option<RawPayload>>>,
}

impl QueuedPayloads {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn found(mut self, text: &str) -> Self {
        self.queue.push_back(Ok(Some(RawPayload::decoded(text))));
        self
    }

    pub fn nothing(mut self) -> Self {
        self.queue.push_back(Ok(None));
        self
    }

    pub fn failing(mut self, error: Error) -> Self {
        self.queue.push_back(Err(error));
        self
    }
}

impl PayloadSource for QueuedPayloads {
    async fn acquire(&mut self) -> Result<Option<RawPayload>> {
        self.queue.pop_front().unwrap_or(Ok(None))
    }
}
