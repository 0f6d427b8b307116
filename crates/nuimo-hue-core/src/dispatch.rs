//! Gesture dispatch.
//!
//! [`GestureDispatcher::on_gesture`] is called once per transport message.
//! It looks the gesture up in a single table, spawns the resulting
//! lighting call without awaiting it, and sends feedback to the device
//! right away. Gestures without an entry are dropped at trace level.

use std::io;
use std::sync::Arc;

use serde::Serialize;
use strum::IntoStaticStr;
use tokio::runtime::Handle;
use tokio_util::task::TaskTracker;
use tracing::{debug, trace, warn};

use nuimo_hue_api::GroupId;

use crate::gesture::{Gesture, GestureEvent};
use crate::intent::{LightingIntent, LightingOperation};
use crate::lighting::LightingController;

/// Fill ratio shown for every brightness change. The bridge is not
/// read back, so the bar does not track the real level.
pub const PROGRESS_FILL: f64 = 0.5;

/// LED brightness of every feedback icon.
pub const FEEDBACK_BRIGHTNESS: f64 = 0.5;

/// Icon shown after an all-off.
pub const POWER_OFF_ICON: &str = "powerOff";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, IntoStaticStr)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ProgressBarStyle {
    VolumeBar,
}

/// Outbound half of the device transport.
///
/// Feedback is best-effort: a returned error is logged and dropped.
pub trait FeedbackSink: Send + Sync {
    fn send_progress_bar(
        &self,
        device_id: &str,
        value: f64,
        style: ProgressBarStyle,
        brightness: f64,
    ) -> io::Result<()>;

    fn send_named_icon(&self, device_id: &str, name: &str, brightness: f64) -> io::Result<()>;
}

/// Routes gesture events to lighting calls and device feedback.
pub struct GestureDispatcher {
    controller: Arc<LightingController>,
    feedback: Arc<dyn FeedbackSink>,
    group: GroupId,
    tasks: TaskTracker,
    runtime: Handle,
}

impl GestureDispatcher {
    pub fn new(
        controller: Arc<LightingController>,
        feedback: Arc<dyn FeedbackSink>,
        runtime: Handle,
    ) -> Self {
        Self {
            controller,
            feedback,
            group: GroupId::ALL_LIGHTS,
            tasks: TaskTracker::new(),
            runtime,
        }
    }

    /// Target a single bridge group instead of all lights.
    pub fn with_group(mut self, group: GroupId) -> Self {
        self.group = group;
        self
    }

    /// The dispatch table.
    pub fn intent_for(event: &GestureEvent, group: GroupId) -> Option<LightingIntent> {
        let intent = match event.gesture {
            Gesture::RotateLeft | Gesture::RotateRight => {
                LightingIntent::increase_brightness(event.value)
            }
            Gesture::ButtonPress => LightingIntent::all_off(),
            _ => return None,
        };
        Some(intent.with_group(group))
    }

    /// Handle one gesture. Returns without waiting for the bridge.
    pub fn on_gesture(&self, event: &GestureEvent) {
        let Some(intent) = Self::intent_for(event, self.group) else {
            trace!(device = %event.device_id, gesture = %event.gesture, "gesture ignored");
            return;
        };

        debug!(device = %event.device_id, gesture = %event.gesture, value = event.value, "dispatching gesture");

        let controller = Arc::clone(&self.controller);
        self.tasks.spawn_on(
            async move {
                controller.execute(intent).await;
            },
            &self.runtime,
        );

        self.send_feedback(&event.device_id, &intent);
    }

    fn send_feedback(&self, device_id: &str, intent: &LightingIntent) {
        let sent = match intent.operation {
            LightingOperation::IncreaseBrightness(_) => self.feedback.send_progress_bar(
                device_id,
                PROGRESS_FILL,
                ProgressBarStyle::VolumeBar,
                FEEDBACK_BRIGHTNESS,
            ),
            LightingOperation::AllOff => {
                self.feedback
                    .send_named_icon(device_id, POWER_OFF_ICON, FEEDBACK_BRIGHTNESS)
            }
        };
        if let Err(e) = sent {
            warn!(device = device_id, error = %e, "feedback not delivered");
        }
    }

    /// Lighting calls that have been spawned and not yet finished.
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for every spawned lighting call to finish.
    pub async fn shutdown(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        debug!("gesture dispatcher drained");
    }
}
