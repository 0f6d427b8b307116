//! Line-delimited JSON device transport.
//!
//! Gesture events come in one JSON object per line; feedback goes out the
//! same way. Any broker client that can pipe lines (e.g. `mosquitto_sub`
//! into stdin, stdout into `mosquitto_pub -l`) completes the link.

use std::io::{self, Write};
use std::sync::Mutex;

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use nuimo_hue_core::{FeedbackSink, GestureDispatcher, GestureEvent, ProgressBarStyle};

/// One outbound feedback message.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FeedbackMessage<'a> {
    #[serde(rename_all = "camelCase")]
    ProgressBar {
        device_id: &'a str,
        value: f64,
        style: ProgressBarStyle,
        brightness: f64,
    },
    #[serde(rename_all = "camelCase")]
    NamedIcon {
        device_id: &'a str,
        name: &'a str,
        brightness: f64,
    },
}

/// Writes feedback messages as JSON lines.
pub struct JsonLinesFeedback<W> {
    out: Mutex<W>,
}

impl<W: Write> JsonLinesFeedback<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    fn emit(&self, message: &FeedbackMessage<'_>) -> io::Result<()> {
        let line = serde_json::to_string(message)?;
        let mut out = self
            .out
            .lock()
            .map_err(|_| io::Error::other("feedback writer poisoned"))?;
        writeln!(out, "{line}")?;
        out.flush()
    }
}

impl<W: Write + Send> FeedbackSink for JsonLinesFeedback<W> {
    fn send_progress_bar(
        &self,
        device_id: &str,
        value: f64,
        style: ProgressBarStyle,
        brightness: f64,
    ) -> io::Result<()> {
        self.emit(&FeedbackMessage::ProgressBar {
            device_id,
            value,
            style,
            brightness,
        })
    }

    fn send_named_icon(&self, device_id: &str, name: &str, brightness: f64) -> io::Result<()> {
        self.emit(&FeedbackMessage::NamedIcon {
            device_id,
            name,
            brightness,
        })
    }
}

/// Feed every gesture line from `input` to `dispatcher` until EOF or
/// cancellation. Returns the number of events dispatched.
///
/// Blank lines are skipped; lines that do not decode are logged and
/// skipped.
pub async fn pump_gestures<R>(
    input: R,
    dispatcher: &GestureDispatcher,
    cancel: &CancellationToken,
) -> io::Result<u64>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut dispatched = 0;

    loop {
        let line = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("gesture input cancelled");
                break;
            }
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            debug!("gesture input closed");
            break;
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<GestureEvent>(line) {
            Ok(event) => {
                dispatcher.on_gesture(&event);
                dispatched += 1;
            }
            Err(e) => warn!(error = %e, "skipping undecodable gesture message"),
        }
    }

    Ok(dispatched)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn lines(buf: &[u8]) -> Vec<Value> {
        String::from_utf8_lossy(buf)
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn progress_bar_message_shape() {
        let sink = JsonLinesFeedback::new(Vec::new());
        sink.send_progress_bar("dev", 0.5, ProgressBarStyle::VolumeBar, 0.5)
            .unwrap();

        let out = sink.out.into_inner().unwrap();
        assert_eq!(
            lines(&out),
            vec![json!({
                "type": "progressBar",
                "deviceId": "dev",
                "value": 0.5,
                "style": "volumeBar",
                "brightness": 0.5
            })]
        );
    }

    #[test]
    fn named_icon_message_shape() {
        let sink = JsonLinesFeedback::new(Vec::new());
        sink.send_named_icon("dev", "powerOff", 0.5).unwrap();

        let out = sink.out.into_inner().unwrap();
        assert_eq!(
            lines(&out),
            vec![json!({
                "type": "namedIcon",
                "deviceId": "dev",
                "name": "powerOff",
                "brightness": 0.5
            })]
        );
    }
}
