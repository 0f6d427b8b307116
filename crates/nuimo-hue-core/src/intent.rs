// ── Lighting intents ──
//
// What a gesture asks the lights to do, independent of how the bridge is
// reached. Built and consumed within a single dispatch.

use nuimo_hue_api::{GroupId, LightState};

/// Rotation units per bridge brightness step.
pub const BRIGHTNESS_SCALE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightingOperation {
    /// Relative brightness change. Positive and negative deltas are both
    /// passed through; the sign decides the direction.
    IncreaseBrightness(f64),
    AllOff,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingIntent {
    pub operation: LightingOperation,
    pub target_group: GroupId,
}

impl LightingIntent {
    pub fn increase_brightness(delta: f64) -> Self {
        Self {
            operation: LightingOperation::IncreaseBrightness(delta),
            target_group: GroupId::ALL_LIGHTS,
        }
    }

    pub fn all_off() -> Self {
        Self {
            operation: LightingOperation::AllOff,
            target_group: GroupId::ALL_LIGHTS,
        }
    }

    pub fn with_group(mut self, group: GroupId) -> Self {
        self.target_group = group;
        self
    }

    /// The bridge state that carries out this intent.
    pub fn light_state(&self) -> LightState {
        match self.operation {
            LightingOperation::IncreaseBrightness(delta) => {
                LightState::new().on().bri_inc(brightness_increment(delta))
            }
            LightingOperation::AllOff => LightState::new().off(),
        }
    }
}

/// Scale a rotation delta into a `bri_inc` step.
#[allow(clippy::cast_possible_truncation)]
pub fn brightness_increment(delta: f64) -> i16 {
    if !delta.is_finite() {
        return 0;
    }
    let limit = f64::from(nuimo_hue_api::models::BRI_INC_LIMIT);
    (delta / BRIGHTNESS_SCALE).round().clamp(-limit, limit) as i16
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn delta_is_scaled_by_ten() {
        assert_eq!(brightness_increment(20.0), 2);
        assert_eq!(brightness_increment(-35.0), -4);
    }

    #[test]
    fn delta_is_clamped_to_bridge_range() {
        assert_eq!(brightness_increment(10_000.0), 254);
        assert_eq!(brightness_increment(-10_000.0), -254);
    }

    #[test]
    fn non_finite_delta_is_no_change() {
        assert_eq!(brightness_increment(f64::NAN), 0);
        assert_eq!(brightness_increment(f64::INFINITY), 0);
    }

    #[test]
    fn brightness_intent_turns_lights_on() {
        let state = LightingIntent::increase_brightness(20.0).light_state();
        assert_eq!(state, LightState::new().on().bri_inc(2));
    }

    #[test]
    fn all_off_intent_targets_all_lights() {
        let intent = LightingIntent::all_off();
        assert_eq!(intent.target_group, GroupId::ALL_LIGHTS);
        assert_eq!(intent.light_state(), LightState::new().off());
    }
}
