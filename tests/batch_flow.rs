//! End-to-end batch runs against a scripted adb

use std::time::Duration;

use notelink_app::{AttemptPipeline, BatchRunner, FixedDelay, RecordingReporter, RunEvent, Settings};
use notelink_bridge::test_utils::{FakeResponse, FakeRunner, Verb, NO_DEVICES};
use notelink_bridge::{AdbSource, DeviceBridge, ToolAvailability};
use notelink_core::{AttemptOutcome, Error};

const LINKS: &[&str] = &[
    "https://www.xiaohongshu.com/explore/652b91f0000000001f03b570?xsec_token=abc=&xsec_source=pc_search",
    "https://www.xiaohongshu.com/discovery/item/652b91f0000000001f03b570",
    "xhsdiscover://item/abc123?source=x",
];

fn bridge(settings: &Settings, runner: FakeRunner) -> DeviceBridge<FakeRunner> {
    let tools = ToolAvailability {
        adb_path: "adb".to_string(),
        source: AdbSource::Path,
    };
    DeviceBridge::new(runner, settings.bridge_settings(&tools))
}

fn links() -> Vec<String> {
    LINKS.iter().map(|s| s.to_string()).collect()
}

#[tokio::test(start_paused = true)]
async fn test_file_batch_opens_each_valid_link() {
    let settings = Settings::default();
    let bridge = bridge(&settings, FakeRunner::new());
    let reporter = RecordingReporter::new();
    let pipeline = AttemptPipeline::new(&bridge, &reporter, settings.batch_plan(true));
    let runner = BatchRunner::new(pipeline, &reporter);

    let report = runner
        .run(&links(), &mut FixedDelay(settings.batch.item_delay()))
        .await
        .unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(
        bridge.runner().dispatched_uris(),
        vec![
            "xhsdiscover://item/652b91f0000000001f03b570?source=pcweb_access_limit",
            "xhsdiscover://item/abc123?source=x",
        ]
    );

    // One tap per opened note, at the URL-flow coordinates
    let taps: Vec<_> = bridge
        .runner()
        .calls()
        .into_iter()
        .filter(|c| Verb::of(c) == Verb::Tap)
        .collect();
    assert_eq!(taps.len(), 2);
    assert_eq!(taps[0].args, vec!["shell", "input", "tap", "865", "2690"]);
    assert_eq!(taps[0].timeout, Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_tap_failures_do_not_count_against_batch() {
    let settings = Settings::default();
    let fake = FakeRunner::new();
    fake.set_default(Verb::Tap, FakeResponse::Timeout);
    let bridge = bridge(&settings, fake);
    let reporter = RecordingReporter::new();
    let pipeline = AttemptPipeline::new(&bridge, &reporter, settings.batch_plan(true));
    let runner = BatchRunner::new(pipeline, &reporter);

    let report = runner
        .run(&links(), &mut FixedDelay(Duration::ZERO))
        .await
        .unwrap();

    assert_eq!(report.succeeded, 2);
    assert_eq!(
        reporter
            .outcomes()
            .iter()
            .filter(|o| matches!(o, AttemptOutcome::TapFailed { .. }))
            .count(),
        2
    );
}

#[tokio::test]
async fn test_no_device_aborts_before_any_dispatch() {
    let settings = Settings::default();
    let bridge = bridge(&settings, FakeRunner::new().with_devices(NO_DEVICES));
    let reporter = RecordingReporter::new();
    let pipeline = AttemptPipeline::new(&bridge, &reporter, settings.batch_plan(true));
    let runner = BatchRunner::new(pipeline, &reporter);

    let err = runner
        .run(&links(), &mut FixedDelay(Duration::ZERO))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NoDeviceConnected));
    assert!(err.is_fatal());
    assert_eq!(bridge.runner().count(Verb::Devices), 1);
    assert_eq!(bridge.runner().count(Verb::StartActivity), 0);
    assert!(reporter.events().is_empty());
}

#[tokio::test]
async fn test_batch_summary_event_is_last() {
    let settings = Settings::default();
    let bridge = bridge(&settings, FakeRunner::new());
    let reporter = RecordingReporter::new();
    let pipeline = AttemptPipeline::new(&bridge, &reporter, settings.batch_plan(false));
    let runner = BatchRunner::new(pipeline, &reporter);

    runner
        .run(&links(), &mut FixedDelay(Duration::ZERO))
        .await
        .unwrap();

    let events = reporter.events();
    assert!(matches!(events.first(), Some(RunEvent::DevicesFound { .. })));
    match events.last() {
        Some(RunEvent::BatchFinished { report }) => {
            assert_eq!(report.processed, 3);
            assert!(!report.aborted);
        }
        other => panic!("unexpected last event: {:?}", other),
    }
    assert_eq!(bridge.runner().count(Verb::Tap), 0);
}
