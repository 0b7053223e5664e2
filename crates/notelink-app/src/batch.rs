//! Batch mode: one attempt per input line
//!
//! Lines come from the operator (interactive) or from a file. Each line is
//! tried exactly once. Between items the [`Pacer`] decides what happens:
//! file batches sleep a fixed delay, interactive batches ask whether to go on.

use std::future::Future;
use std::io::{BufRead, Write};
use std::path::Path;
use std::time::Duration;

use notelink_bridge::{CommandRunner, Device};
use notelink_core::prelude::*;
use notelink_core::{BatchReport, RawPayload};
use tokio::sync::mpsc;

use crate::attempt::{check_connectivity, AttemptPipeline};
use crate::events::{Reporter, RunEvent, StopReason};

/// Default pause between items of a file batch
pub const DEFAULT_ITEM_DELAY: Duration = Duration::from_secs(1);

/// Decision taken between two items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proceed {
    Continue,
    Quit,
    Interrupted,
}

/// Runs between items; never before the first one or after the last
pub trait Pacer {
    fn before_next(&mut self, next: usize, total: usize) -> impl Future<Output = Proceed>;
}

/// File batches: wait a fixed delay so the device is not flooded
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl Default for FixedDelay {
    fn default() -> Self {
        Self(DEFAULT_ITEM_DELAY)
    }
}

impl Pacer for FixedDelay {
    async fn before_next(&mut self, _next: usize, _total: usize) -> Proceed {
        tokio::time::sleep(self.0).await;
        Proceed::Continue
    }
}

/// Line input from the operator, used both for collecting links and for the
/// continue prompt.
///
/// Lines and Ctrl-C presses arrive over channels. A Ctrl-C pressed while an
/// item is being processed stays queued and interrupts the next prompt.
pub struct InteractiveInput {
    lines: mpsc::Receiver<String>,
    interrupts: mpsc::UnboundedReceiver<()>,
}

impl InteractiveInput {
    pub fn new(lines: mpsc::Receiver<String>, interrupts: mpsc::UnboundedReceiver<()>) -> Self {
        Self { lines, interrupts }
    }

    /// Read stdin on a dedicated thread and listen for Ctrl-C.
    ///
    /// The reader thread is never joined, so a pending read does not keep the
    /// runtime alive at shutdown. Must be called inside a tokio runtime.
    pub fn stdin() -> Self {
        let (line_tx, line_rx) = mpsc::channel(16);
        std::thread::spawn(move || read_stdin_lines(line_tx));

        let (interrupt_tx, interrupt_rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                debug!("Ctrl-C received");
                if interrupt_tx.send(()).is_err() {
                    break;
                }
            }
        });

        Self::new(line_rx, interrupt_rx)
    }

    /// Next line, `None` on EOF, `Error::Cancelled` on Ctrl-C
    async fn next_line(&mut self) -> Result<Option<String>> {
        tokio::select! {
            biased;
            Some(()) = self.interrupts.recv() => Err(Error::Cancelled),
            line = self.lines.recv() => Ok(line),
        }
    }

    /// Read trimmed links until a blank line or EOF
    pub async fn collect_links(&mut self) -> Result<Vec<String>> {
        let mut links = Vec::new();
        while let Some(line) = self.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                break;
            }
            links.push(line.to_string());
        }
        debug!("Collected {} link(s) from input", links.len());
        Ok(links)
    }
}

/// Blocking stdin loop; dropping `tx` signals EOF to the receiver
fn read_stdin_lines(tx: mpsc::Sender<String>) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        match line {
            Ok(line) => {
                if tx.blocking_send(line).is_err() {
                    break;
                }
            }
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                break;
            }
        }
    }
}

impl Pacer for InteractiveInput {
    async fn before_next(&mut self, next: usize, total: usize) -> Proceed {
        print!("Press Enter for link {}/{}, or q to quit: ", next, total);
        if let Err(e) = std::io::stdout().flush() {
            debug!("Failed to flush prompt: {}", e);
        }

        match self.next_line().await {
            Ok(Some(answer)) => parse_answer(&answer),
            // EOF: nothing left to ask, keep going
            Ok(None) => Proceed::Continue,
            Err(Error::Cancelled) => Proceed::Interrupted,
            Err(e) => {
                warn!("Failed to read answer: {}", e);
                Proceed::Continue
            }
        }
    }
}

fn parse_answer(answer: &str) -> Proceed {
    if answer.trim().eq_ignore_ascii_case("q") {
        Proceed::Quit
    } else {
        Proceed::Continue
    }
}

/// Non-blank trimmed lines of a batch file
pub async fn read_batch_file(path: &Path) -> Result<Vec<String>> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::batch_file_not_found(path));
        }
        Err(e) => return Err(e.into()),
    };

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Feeds each input through the attempt pipeline and counts the results
pub struct BatchRunner<'a, R: CommandRunner> {
    pipeline: AttemptPipeline<'a, R>,
    reporter: &'a dyn Reporter,
}

impl<'a, R: CommandRunner> BatchRunner<'a, R> {
    pub fn new(pipeline: AttemptPipeline<'a, R>, reporter: &'a dyn Reporter) -> Self {
        Self { pipeline, reporter }
    }

    pub async fn check_connectivity(&self) -> Result<Vec<Device>> {
        check_connectivity(self.pipeline.bridge(), self.reporter).await
    }

    /// Connectivity check, then every link in order
    pub async fn run<P: Pacer>(&self, links: &[String], pacer: &mut P) -> Result<BatchReport> {
        if links.is_empty() {
            return Err(Error::EmptyBatch);
        }
        self.check_connectivity().await?;
        self.process_items(links, pacer).await
    }

    /// Process `links` without checking connectivity.
    ///
    /// Per-item failures are recorded and the batch moves on. A missing adb
    /// executable stops it with an error.
    pub async fn process_items<P: Pacer>(
        &self,
        links: &[String],
        pacer: &mut P,
    ) -> Result<BatchReport> {
        if links.is_empty() {
            return Err(Error::EmptyBatch);
        }

        let total = links.len();
        let mut report = BatchReport::new(total);
        self.reporter.report(RunEvent::BatchStarted { total });
        info!("Processing batch of {} link(s)", total);

        for (i, input) in links.iter().enumerate() {
            let index = i + 1;
            self.reporter.report(RunEvent::ItemStarted {
                index,
                total,
                input: input.clone(),
            });

            let outcome = self.pipeline.process(RawPayload::line(input.as_str())).await?;
            debug!("Item {}/{}: {:?}", index, total, outcome);
            report.record(&outcome);
            self.reporter.report(RunEvent::Outcome { outcome });

            if index == total {
                break;
            }

            let reason = match pacer.before_next(index + 1, total).await {
                Proceed::Continue => continue,
                Proceed::Quit => StopReason::Quit,
                Proceed::Interrupted => StopReason::Interrupted,
            };
            info!("Batch stopped after {}/{}: {:?}", index, total, reason);
            report.aborted = true;
            self.reporter.report(RunEvent::BatchStopped { reason });
            break;
        }

        self.reporter.report(RunEvent::BatchFinished {
            report: report.clone(),
        });
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attempt::AttemptPlan;
    use crate::events::RecordingReporter;
    use notelink_bridge::test_utils::{FakeResponse, FakeRunner, Verb, NO_DEVICES};
    use notelink_bridge::{BridgeSettings, DeviceBridge};
    use notelink_core::{AttemptOutcome, LinkFlavor};
    use std::collections::VecDeque;
    use tempfile::tempdir;

    const GOOD: &str = "https://www.xiaohongshu.com/explore/652b91f0000000001f03b570";
    const OTHER: &str = "https://www.xiaohongshu.com/explore/64f0c0de000000001e00aa11?xsec_source=pc";

    struct ScriptedPacer {
        answers: VecDeque<Proceed>,
        asked: Vec<(usize, usize)>,
    }

    impl ScriptedPacer {
        fn new(answers: &[Proceed]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                asked: Vec::new(),
            }
        }
    }

    impl Pacer for ScriptedPacer {
        async fn before_next(&mut self, next: usize, total: usize) -> Proceed {
            self.asked.push((next, total));
            self.answers.pop_front().unwrap_or(Proceed::Continue)
        }
    }

    fn bridge(runner: FakeRunner) -> DeviceBridge<FakeRunner> {
        DeviceBridge::new(runner, BridgeSettings::default())
    }

    fn links(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn plan() -> AttemptPlan {
        AttemptPlan::new(LinkFlavor::UrlBatch).without_tap()
    }

    #[tokio::test]
    async fn test_every_line_tried_once() {
        let bridge = bridge(FakeRunner::new());
        let reporter = RecordingReporter::new();
        let runner = BatchRunner::new(AttemptPipeline::new(&bridge, &reporter, plan()), &reporter);
        let mut pacer = ScriptedPacer::new(&[]);

        let report = runner
            .run(&links(&[GOOD, "not a link", OTHER]), &mut pacer)
            .await
            .unwrap();

        assert_eq!(report.total, 3);
        assert_eq!(report.processed, 3);
        assert_eq!(report.succeeded, 2);
        assert!(!report.aborted);
        assert_eq!(bridge.runner().count(Verb::StartActivity), 2);
        assert_eq!(pacer.asked, vec![(2, 3), (3, 3)]);
    }

    #[tokio::test]
    async fn test_quit_stops_remaining_items() {
        let bridge = bridge(FakeRunner::new());
        let reporter = RecordingReporter::new();
        let runner = BatchRunner::new(AttemptPipeline::new(&bridge, &reporter, plan()), &reporter);
        let mut pacer = ScriptedPacer::new(&[Proceed::Quit]);

        let report = runner
            .run(&links(&[GOOD, OTHER, GOOD]), &mut pacer)
            .await
            .unwrap();

        assert_eq!(report.processed, 1);
        assert!(report.aborted);
        assert_eq!(bridge.runner().count(Verb::StartActivity), 1);
        assert!(reporter.events().contains(&RunEvent::BatchStopped {
            reason: StopReason::Quit
        }));
    }

    #[tokio::test]
    async fn test_interrupt_stops_batch() {
        let bridge = bridge(FakeRunner::new());
        let reporter = RecordingReporter::new();
        let runner = BatchRunner::new(AttemptPipeline::new(&bridge, &reporter, plan()), &reporter);
        let mut pacer = ScriptedPacer::new(&[Proceed::Continue, Proceed::Interrupted]);

        let report = runner
            .run(&links(&[GOOD, OTHER, GOOD]), &mut pacer)
            .await
            .unwrap();

        assert_eq!(report.processed, 2);
        assert!(report.aborted);
    }

    #[tokio::test]
    async fn test_dispatch_failure_does_not_stop_batch() {
        let fake = FakeRunner::new();
        fake.push(Verb::StartActivity, FakeResponse::exit(1, "error: closed"));
        let bridge = bridge(fake);
        let reporter = RecordingReporter::new();
        let runner = BatchRunner::new(AttemptPipeline::new(&bridge, &reporter, plan()), &reporter);

        let report = runner
            .run(&links(&[GOOD, OTHER]), &mut ScriptedPacer::new(&[]))
            .await
            .unwrap();

        assert_eq!(report.processed, 2);
        assert_eq!(report.succeeded, 1);
        assert!(matches!(
            reporter.outcomes()[0],
            AttemptOutcome::DispatchFailed { .. }
        ));
    }

    #[tokio::test]
    async fn test_missing_adb_aborts_batch() {
        let fake = FakeRunner::new();
        fake.set_default(Verb::StartActivity, FakeResponse::NotFound);
        let bridge = bridge(fake);
        let reporter = RecordingReporter::new();
        let runner = BatchRunner::new(AttemptPipeline::new(&bridge, &reporter, plan()), &reporter);

        let err = runner
            .run(&links(&[GOOD, OTHER]), &mut ScriptedPacer::new(&[]))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::BridgeNotFound { .. }));
        assert_eq!(bridge.runner().count(Verb::StartActivity), 1);
    }

    #[tokio::test]
    async fn test_no_device_processes_nothing() {
        let bridge = bridge(FakeRunner::new().with_devices(NO_DEVICES));
        let reporter = RecordingReporter::new();
        let runner = BatchRunner::new(AttemptPipeline::new(&bridge, &reporter, plan()), &reporter);

        let err = runner
            .run(&links(&[GOOD]), &mut ScriptedPacer::new(&[]))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NoDeviceConnected));
        assert_eq!(bridge.runner().count(Verb::StartActivity), 0);
    }

    #[tokio::test]
    async fn test_empty_batch_is_error() {
        let bridge = bridge(FakeRunner::new());
        let reporter = RecordingReporter::new();
        let runner = BatchRunner::new(AttemptPipeline::new(&bridge, &reporter, plan()), &reporter);

        let err = runner
            .run(&[], &mut ScriptedPacer::new(&[]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptyBatch));
        assert_eq!(bridge.runner().count(Verb::Devices), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_between_items_only() {
        let bridge = bridge(FakeRunner::new());
        let reporter = RecordingReporter::new();
        let runner = BatchRunner::new(AttemptPipeline::new(&bridge, &reporter, plan()), &reporter);
        let start = tokio::time::Instant::now();

        runner
            .run(&links(&[GOOD, OTHER, GOOD]), &mut FixedDelay::default())
            .await
            .unwrap();

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(3));
    }

    /// Input with `lines` queued and the sender dropped (EOF after them)
    fn scripted_input(lines: &[&str]) -> (InteractiveInput, mpsc::UnboundedSender<()>) {
        let (line_tx, line_rx) = mpsc::channel(lines.len().max(1));
        for line in lines {
            line_tx.try_send(line.to_string()).unwrap();
        }
        let (interrupt_tx, interrupt_rx) = mpsc::unbounded_channel();
        (InteractiveInput::new(line_rx, interrupt_rx), interrupt_tx)
    }

    #[tokio::test]
    async fn test_collect_links_stops_at_blank_line() {
        let (mut input, _interrupts) = scripted_input(&[
            "  https://a.example/1  ",
            "https://a.example/2",
            "",
            "ignored",
        ]);

        let links = input.collect_links().await.unwrap();
        assert_eq!(links, vec!["https://a.example/1", "https://a.example/2"]);
    }

    #[tokio::test]
    async fn test_collect_links_until_eof() {
        let (mut input, _interrupts) = scripted_input(&["https://a.example/1"]);
        let links = input.collect_links().await.unwrap();
        assert_eq!(links, vec!["https://a.example/1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ctrl_c_cancels_pending_read() {
        // Sender kept alive: the read would wait forever without the interrupt
        let (_line_tx, line_rx) = mpsc::channel::<String>(1);
        let (interrupt_tx, interrupt_rx) = mpsc::unbounded_channel();
        let mut input = InteractiveInput::new(line_rx, interrupt_rx);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            interrupt_tx.send(()).unwrap();
        });

        let err = tokio::time::timeout(Duration::from_secs(5), input.collect_links())
            .await
            .expect("read was not cancelled")
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[tokio::test]
    async fn test_prompt_answers() {
        let (mut input, _interrupts) = scripted_input(&["", "Q"]);

        assert_eq!(input.before_next(2, 3).await, Proceed::Continue);
        assert_eq!(input.before_next(3, 3).await, Proceed::Quit);
        // EOF
        assert_eq!(input.before_next(4, 5).await, Proceed::Continue);
    }

    #[tokio::test]
    async fn test_ctrl_c_during_item_interrupts_next_prompt() {
        let (mut input, interrupts) = scripted_input(&[""]);
        interrupts.send(()).unwrap();

        assert_eq!(input.before_next(2, 3).await, Proceed::Interrupted);
        // The queued answer is still there for a later prompt
        assert_eq!(input.before_next(3, 3).await, Proceed::Continue);
    }

    #[tokio::test]
    async fn test_interactive_batch_interrupted_at_prompt() {
        let bridge = bridge(FakeRunner::new());
        let reporter = RecordingReporter::new();
        let runner = BatchRunner::new(AttemptPipeline::new(&bridge, &reporter, plan()), &reporter);
        let (mut input, interrupts) = scripted_input(&[GOOD, OTHER, ""]);

        let links = input.collect_links().await.unwrap();
        interrupts.send(()).unwrap();
        let report = runner.process_items(&links, &mut input).await.unwrap();

        assert_eq!(report.processed, 1);
        assert!(report.aborted);
        assert!(reporter.events().contains(&RunEvent::BatchStopped {
            reason: StopReason::Interrupted
        }));
    }

    #[tokio::test]
    async fn test_read_batch_file_skips_blank_lines() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("links.txt");
        std::fs::write(&path, format!("{}\n\n   \n  {}  \n", GOOD, OTHER)).unwrap();

        let lines = read_batch_file(&path).await.unwrap();
        assert_eq!(lines, vec![GOOD, OTHER]);
    }

    #[tokio::test]
    async fn test_read_batch_file_missing() {
        let temp = tempdir().unwrap();
        let err = read_batch_file(&temp.path().join("missing.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BatchFileNotFound { .. }));
        assert!(err.is_fatal());
    }
}
