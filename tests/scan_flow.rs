//! End-to-end scan runs with queued payloads and a scripted adb

use std::time::Duration;

use notelink_app::{
    AttemptPipeline, QueuedPayloads, RecordingReporter, RunEvent, ScanOptions, ScanOrchestrator,
    Settings,
};
use notelink_bridge::test_utils::{FakeResponse, FakeRunner, Verb, NO_DEVICES};
use notelink_bridge::{BridgeSettings, DeviceBridge};
use notelink_core::{AttemptOutcome, Error, ScanResult};

const QR_URL: &str =
    "https://www.xiaohongshu.com/explore/652b91f0000000001f03b570?xsec_token=abc";

fn options(settings: &Settings) -> ScanOptions {
    ScanOptions {
        max_attempts: settings.scan.max_attempts,
        retry_delay: settings.scan.retry_delay(),
    }
}

#[tokio::test(start_paused = true)]
async fn test_qr_link_opened_and_favorited() {
    let settings = Settings::default();
    let bridge = DeviceBridge::new(FakeRunner::new(), BridgeSettings::default());
    let reporter = RecordingReporter::new();
    let pipeline = AttemptPipeline::new(&bridge, &reporter, settings.scan_plan(true));
    let source = QueuedPayloads::new().nothing().found(QR_URL);

    let report = ScanOrchestrator::new(pipeline, source, options(&settings), &reporter)
        .run()
        .await
        .unwrap();

    assert!(report.is_success());
    assert_eq!(report.attempts_used, 2);
    assert_eq!(
        bridge.runner().dispatched_uris(),
        vec!["xhsdiscover://item/652b91f0000000001f03b570?source=pcweb_access_limit"]
    );
    let calls = bridge.runner().calls();
    let tap = calls.last().unwrap();
    assert_eq!(tap.args, vec!["shell", "input", "tap", "800", "2210"]);
}

#[tokio::test(start_paused = true)]
async fn test_exhausts_default_ceiling_of_ten() {
    let settings = Settings::default();
    let bridge = DeviceBridge::new(FakeRunner::new(), BridgeSettings::default());
    let reporter = RecordingReporter::new();
    let pipeline = AttemptPipeline::new(&bridge, &reporter, settings.scan_plan(true));
    let start = tokio::time::Instant::now();

    let report = ScanOrchestrator::new(
        pipeline,
        QueuedPayloads::new().found("https://example.com/other"),
        options(&settings),
        &reporter,
    )
    .run()
    .await
    .unwrap();

    assert_eq!(report.result, ScanResult::Exhausted);
    assert_eq!(report.attempts_used, 10);
    assert_eq!(
        reporter.count(|e| matches!(e, RunEvent::AttemptStarted { .. })),
        10
    );
    assert!(matches!(
        reporter.outcomes()[0],
        AttemptOutcome::PayloadInvalid { .. }
    ));
    // Nine waits between ten attempts
    assert!(start.elapsed() >= Duration::from_secs(27));
    assert!(start.elapsed() < Duration::from_secs(30));
    assert_eq!(bridge.runner().count(Verb::StartActivity), 0);
}

#[tokio::test(start_paused = true)]
async fn test_zero_devices_zero_attempts() {
    let settings = Settings::default();
    let bridge = DeviceBridge::new(
        FakeRunner::new().with_devices(NO_DEVICES),
        BridgeSettings::default(),
    );
    let reporter = RecordingReporter::new();
    let pipeline = AttemptPipeline::new(&bridge, &reporter, settings.scan_plan(true));

    let err = ScanOrchestrator::new(
        pipeline,
        QueuedPayloads::new().found(QR_URL),
        options(&settings),
        &reporter,
    )
    .run()
    .await
    .unwrap_err();

    assert!(matches!(err, Error::NoDeviceConnected));
    assert_eq!(bridge.runner().count(Verb::StartActivity), 0);
    assert_eq!(reporter.outcomes().len(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_app_uri_from_qr_dispatched_verbatim() {
    let settings = Settings::default();
    let fake = FakeRunner::new();
    fake.push(Verb::Tap, FakeResponse::exit(1, "error: device offline"));
    let bridge = DeviceBridge::new(fake, BridgeSettings::default());
    let reporter = RecordingReporter::new();
    let pipeline = AttemptPipeline::new(&bridge, &reporter, settings.scan_plan(true));

    let report = ScanOrchestrator::new(
        pipeline,
        QueuedPayloads::new().found("XHSDISCOVER://item/abc123?source=x"),
        options(&settings),
        &reporter,
    )
    .run()
    .await
    .unwrap();

    assert!(report.is_success());
    assert!(matches!(report.result, ScanResult::Opened { tapped: false, .. }));
    assert_eq!(
        bridge.runner().dispatched_uris(),
        vec!["XHSDISCOVER://item/abc123?source=x"]
    );
}
