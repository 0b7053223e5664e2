//! Human-readable status lines for the operator
//!
//! stdout belongs to these lines. Diagnostics go to the log file.

use notelink_core::{AttemptOutcome, BatchReport, ScanReport, ScanResult};

use crate::events::{Reporter, RunEvent, StopReason};

/// Prints one line per event to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&self, event: RunEvent) {
        println!("{}", render(&event));
    }
}

/// Status line for `event`
pub fn render(event: &RunEvent) -> String {
    match event {
        RunEvent::DevicesFound { devices } => {
            let serials: Vec<&str> = devices.iter().map(|d| d.serial.as_str()).collect();
            format!("📱 Connected: {}", serials.join(", "))
        }
        RunEvent::ScanStarted {
            max_attempts,
            retry_delay,
        } => format!(
            "🔍 Scanning screen centre for a QR code ({} attempts, {}s apart)",
            max_attempts,
            retry_delay.as_secs()
        ),
        RunEvent::AttemptStarted {
            attempt,
            max_attempts,
        } => format!("── Attempt {}/{}", attempt, max_attempts),
        RunEvent::PayloadFound { payload } => format!("   Found: {}", payload),
        RunEvent::Dispatching { link } => format!("   Opening: {}", link),
        RunEvent::Outcome { outcome } => render_outcome(outcome),
        RunEvent::Retrying { delay } => format!("   Retrying in {}s...", delay.as_secs()),
        RunEvent::BatchStarted { total } => format!("📋 {} link(s) to open", total),
        RunEvent::ItemStarted {
            index,
            total,
            input,
        } => format!("── [{}/{}] {}", index, total, input),
        RunEvent::BatchStopped { reason } => match reason {
            StopReason::Quit => "⏹  Stopped by operator".to_string(),
            StopReason::Interrupted => "⏹  Interrupted".to_string(),
        },
        RunEvent::ScanFinished { report } => render_scan_summary(report),
        RunEvent::BatchFinished { report } => render_batch_summary(report),
    }
}

fn render_outcome(outcome: &AttemptOutcome) -> String {
    match outcome {
        AttemptOutcome::NoPayload => "   No QR code found".to_string(),
        AttemptOutcome::AcquireFailed { reason } => format!("   ⚠️  Capture failed: {}", reason),
        AttemptOutcome::PayloadInvalid { reason, .. } => format!("   ⚠️  Skipped: {}", reason),
        AttemptOutcome::DispatchFailed { reason, .. } => format!("   ❌ {}", reason),
        AttemptOutcome::TapFailed { reason, .. } => {
            format!("   ✅ Opened (tap failed: {})", reason)
        }
        AttemptOutcome::Succeeded { .. } => "   ✅ Opened".to_string(),
    }
}

fn render_scan_summary(report: &ScanReport) -> String {
    match &report.result {
        ScanResult::Opened { link, .. } => format!(
            "✅ Opened {} after {}/{} attempt(s)",
            link, report.attempts_used, report.max_attempts
        ),
        ScanResult::DispatchFailed { reason, .. } => format!(
            "❌ Found a link but could not open it after {}/{} attempt(s): {}",
            report.attempts_used, report.max_attempts, reason
        ),
        ScanResult::Exhausted => format!(
            "❌ No usable QR code after {}/{} attempt(s)",
            report.attempts_used, report.max_attempts
        ),
    }
}

fn render_batch_summary(report: &BatchReport) -> String {
    let mut line = format!(
        "📊 Done: {}/{} opened, {} failed",
        report.succeeded,
        report.total,
        report.failed()
    );
    if report.aborted {
        line.push_str(&format!(
            " ({} not attempted)",
            report.total - report.processed
        ));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use notelink_bridge::test_utils::test_device;
    use notelink_core::{DeepLink, RawPayload};
    use std::time::Duration;

    fn link() -> DeepLink {
        DeepLink::passthrough(&RawPayload::line("xhsdiscover://item/abc"))
    }

    #[test]
    fn test_render_devices() {
        let line = render(&RunEvent::DevicesFound {
            devices: vec![test_device("emulator-5554"), test_device("R58M")],
        });
        assert!(line.contains("emulator-5554, R58M"));
    }

    #[test]
    fn test_render_every_outcome_has_a_line() {
        let outcomes = [
            AttemptOutcome::NoPayload,
            AttemptOutcome::AcquireFailed {
                reason: "busy".to_string(),
            },
            AttemptOutcome::PayloadInvalid {
                payload: "x".to_string(),
                reason: "Not a recognized Xiaohongshu link: x".to_string(),
            },
            AttemptOutcome::DispatchFailed {
                link: link(),
                reason: "exit code Some(1)".to_string(),
            },
            AttemptOutcome::TapFailed {
                link: link(),
                reason: "timeout".to_string(),
            },
            AttemptOutcome::Succeeded { link: link() },
        ];
        for outcome in outcomes {
            let line = render(&RunEvent::Outcome { outcome });
            assert!(!line.trim().is_empty());
        }
    }

    #[test]
    fn test_tap_failure_reads_as_opened() {
        let line = render_outcome(&AttemptOutcome::TapFailed {
            link: link(),
            reason: "timeout".to_string(),
        });
        assert!(line.contains("Opened"));
        assert!(line.contains("timeout"));
    }

    #[test]
    fn test_scan_summary_counts_attempts() {
        let report = ScanReport {
            attempts_used: 10,
            max_attempts: 10,
            result: ScanResult::Exhausted,
        };
        assert!(render_scan_summary(&report).contains("10/10"));
    }

    #[test]
    fn test_batch_summary_aborted() {
        let mut report = BatchReport::new(5);
        report.record(&AttemptOutcome::Succeeded { link: link() });
        report.record(&AttemptOutcome::NoPayload);
        report.aborted = true;

        let line = render_batch_summary(&report);
        assert!(line.contains("1/5 opened"));
        assert!(line.contains("1 failed"));
        assert!(line.contains("3 not attempted"));
    }

    #[test]
    fn test_retry_line_in_seconds() {
        let line = render(&RunEvent::Retrying {
            delay: Duration::from_secs(3),
        });
        assert!(line.contains("3s"));
    }
}
