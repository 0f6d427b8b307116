// ── Input gestures ──
//
// Gesture names arrive as strings from the device transport. Names this
// build does not know parse into `Gesture::Unknown` instead of failing,
// so newer devices keep working and their extra gestures are ignored.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};

/// A discrete input reported by the remote.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString, IntoStaticStr, Serialize, Deserialize)]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
#[serde(from = "String", into = "String")]
pub enum Gesture {
    ButtonPress,
    ButtonRelease,
    RotateLeft,
    RotateRight,
    SwipeLeft,
    SwipeRight,
    SwipeUp,
    SwipeDown,
    TouchLeft,
    TouchRight,
    TouchTop,
    TouchBottom,
    LongTouchLeft,
    LongTouchRight,
    LongTouchTop,
    LongTouchBottom,
    FlyLeft,
    FlyRight,
    FlyTowards,
    FlyBackwards,
    FlyUpDown,
    /// A gesture this build has no name for.
    #[strum(default)]
    Unknown(String),
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(name) => f.write_str(name),
            known => f.write_str(known.into()),
        }
    }
}

impl From<String> for Gesture {
    fn from(name: String) -> Self {
        Self::from_str(&name).unwrap_or(Self::Unknown(name))
    }
}

impl From<Gesture> for String {
    fn from(gesture: Gesture) -> Self {
        gesture.to_string()
    }
}

/// One decoded message from the device transport.
///
/// `value` carries the rotation delta for rotate gestures and is zero
/// for gestures without a magnitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GestureEvent {
    #[serde(alias = "nuimoUuid", alias = "uuid")]
    pub device_id: String,
    pub gesture: Gesture,
    #[serde(default)]
    pub value: f64,
}

impl GestureEvent {
    pub fn new(device_id: impl Into<String>, gesture: Gesture, value: f64) -> Self {
        Self {
            device_id: device_id.into(),
            gesture,
            value,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_camel_case_names() {
        assert_eq!(Gesture::from("rotateRight".to_owned()), Gesture::RotateRight);
        assert_eq!(Gesture::from("buttonPress".to_owned()), Gesture::ButtonPress);
    }

    #[test]
    fn parsing_ignores_case() {
        assert_eq!(Gesture::from("ROTATELEFT".to_owned()), Gesture::RotateLeft);
    }

    #[test]
    fn unknown_names_are_kept() {
        let gesture = Gesture::from("doubleTap".to_owned());
        assert_eq!(gesture, Gesture::Unknown("doubleTap".into()));
        assert_eq!(gesture.to_string(), "doubleTap");
    }

    #[test]
    fn display_uses_wire_name() {
        assert_eq!(Gesture::LongTouchBottom.to_string(), "longTouchBottom");
    }

    #[test]
    fn event_deserializes_from_transport_json() {
        let event: GestureEvent = serde_json::from_value(json!({
            "deviceId": "c2:1f:9b:aa:10:01",
            "gesture": "rotateRight",
            "value": 20
        }))
        .unwrap();

        assert_eq!(
            event,
            GestureEvent::new("c2:1f:9b:aa:10:01", Gesture::RotateRight, 20.0)
        );
    }

    #[test]
    fn event_accepts_nuimo_uuid_and_missing_value() {
        let event: GestureEvent = serde_json::from_value(json!({
            "nuimoUuid": "abc",
            "gesture": "buttonPress"
        }))
        .unwrap();

        assert_eq!(event, GestureEvent::new("abc", Gesture::ButtonPress, 0.0));
    }

    #[test]
    fn event_with_unknown_gesture_still_parses() {
        let event: GestureEvent = serde_json::from_value(json!({
            "deviceId": "abc",
            "gesture": "heartbeat",
            "value": 1
        }))
        .unwrap();

        assert_eq!(event.gesture, Gesture::Unknown("heartbeat".into()));
    }
}
