//! One attempt: payload in, classified outcome out
//!
//! The pipeline walks an explicit step machine. Each step either advances
//! or finishes the attempt with an [`AttemptOutcome`]:
//!
//! ```text
//! Validating -> Extracting -> BuildingLink -> Dispatching -> Tapping -> Done
//!      \              \                           \             \
//!       PayloadInvalid  PayloadInvalid             DispatchFailed TapFailed
//! ```
//!
//! App URIs skip extraction and are dispatched as-is.

use notelink_bridge::{CommandRunner, Device, DeviceBridge};
use notelink_core::prelude::*;
use notelink_core::{
    build_deep_link, classify, extract_content_id, AttemptOutcome, ContentId, DeepLink,
    LinkFlavor, LinkShape, PayloadKind, RawPayload, TapTarget,
};

use crate::events::{Reporter, RunEvent};

/// Everything an attempt needs besides the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptPlan {
    /// Android package that receives the VIEW intent
    pub package: String,
    pub flavor: LinkFlavor,
    /// How deep links are built for web URLs
    pub shape: LinkShape,
    /// `None` disables the follow-up tap
    pub tap: Option<TapTarget>,
}

impl AttemptPlan {
    pub fn new(flavor: LinkFlavor) -> Self {
        Self {
            package: notelink_core::APP_PACKAGE.to_string(),
            flavor,
            shape: flavor.default_shape(),
            tap: Some(flavor.default_tap_target()),
        }
    }

    pub fn without_tap(mut self) -> Self {
        self.tap = None;
        self
    }
}

#[derive(Debug)]
enum Step {
    Validating(RawPayload),
    Extracting(RawPayload),
    BuildingLink(ContentId),
    Dispatching(DeepLink),
    Tapping(DeepLink, TapTarget),
    Done(AttemptOutcome),
}

/// Runs payloads through classification, dispatch and the optional tap
pub struct AttemptPipeline<'a, R: CommandRunner> {
    bridge: &'a DeviceBridge<R>,
    reporter: &'a dyn Reporter,
    plan: AttemptPlan,
}

impl<'a, R: CommandRunner> AttemptPipeline<'a, R> {
    pub fn new(bridge: &'a DeviceBridge<R>, reporter: &'a dyn Reporter, plan: AttemptPlan) -> Self {
        Self {
            bridge,
            reporter,
            plan,
        }
    }

    pub fn bridge(&self) -> &DeviceBridge<R> {
        self.bridge
    }

    pub fn plan(&self) -> &AttemptPlan {
        &self.plan
    }

    /// Process one payload.
    ///
    /// Every per-item failure becomes an outcome. Only a missing adb
    /// executable is returned as an error, since no later attempt can
    /// succeed without it.
    pub async fn process(&self, payload: RawPayload) -> Result<AttemptOutcome> {
        self.reporter.report(RunEvent::PayloadFound {
            payload: payload.text().to_string(),
        });

        let mut step = Step::Validating(payload);
        loop {
            trace!("Attempt step: {:?}", step);
            step = match step {
                Step::Validating(payload) => self.validate(payload),
                Step::Extracting(payload) => match extract_content_id(&payload) {
                    Ok(id) => Step::BuildingLink(id),
                    Err(e) => Step::Done(invalid(&payload, &e)),
                },
                Step::BuildingLink(id) => Step::Dispatching(build_deep_link(&id, &self.plan.shape)),
                Step::Dispatching(link) => self.dispatch(link).await?,
                Step::Tapping(link, target) => self.tap(link, target).await,
                Step::Done(outcome) => return Ok(outcome),
            };
        }
    }

    fn validate(&self, payload: RawPayload) -> Step {
        match classify(&payload) {
            PayloadKind::AppUri => {
                debug!("Payload is already an app link");
                Step::Dispatching(DeepLink::passthrough(&payload))
            }
            PayloadKind::WebUrl => Step::Extracting(payload),
            PayloadKind::Unrecognized => {
                Step::Done(invalid(&payload, &Error::unrecognized(payload.text())))
            }
        }
    }

    async fn dispatch(&self, link: DeepLink) -> Result<Step> {
        self.reporter.report(RunEvent::Dispatching { link: link.clone() });

        match self
            .bridge
            .start_activity(link.as_str(), &self.plan.package)
            .await
        {
            Ok(()) => Ok(match self.plan.tap {
                Some(target) => Step::Tapping(link, target),
                None => Step::Done(AttemptOutcome::Succeeded { link }),
            }),
            Err(e @ Error::BridgeNotFound { .. }) => Err(e),
            Err(e) => {
                warn!("Dispatch of {} failed: {}", link, e);
                Ok(Step::Done(AttemptOutcome::DispatchFailed {
                    link,
                    reason: e.to_string(),
                }))
            }
        }
    }

    async fn tap(&self, link: DeepLink, target: TapTarget) -> Step {
        match self.bridge.tap(target).await {
            Ok(()) => Step::Done(AttemptOutcome::Succeeded { link }),
            Err(e) => {
                warn!("Tap at {} failed: {}", target, e);
                Step::Done(AttemptOutcome::TapFailed {
                    link,
                    reason: e.to_string(),
                })
            }
        }
    }
}

fn invalid(payload: &RawPayload, error: &Error) -> AttemptOutcome {
    debug!("Rejected payload {:?}: {}", payload.text(), error);
    AttemptOutcome::PayloadInvalid {
        payload: payload.text().to_string(),
        reason: error.to_string(),
    }
}

/// Require at least one ready device before any work starts
pub async fn check_connectivity<R: CommandRunner>(
    bridge: &DeviceBridge<R>,
    reporter: &dyn Reporter,
) -> Result<Vec<Device>> {
    let devices = bridge.list_connected_devices().await?;
    if devices.is_empty() {
        return Err(Error::NoDeviceConnected);
    }
    reporter.report(RunEvent::DevicesFound {
        devices: devices.clone(),
    });
    Ok(devices)
}
