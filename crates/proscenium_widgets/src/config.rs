//! Feel-tuning constants, loadable from TOML once at startup.

use proscenium_scene::{SceneError, SceneResult};
use serde::Deserialize;

/// Scroll pane feel constants.
///
/// Every field must be positive; [`ScrollTuning::from_toml_str`] rejects a
/// config that would make the state machine misbehave.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScrollTuning {
    /// Seconds a fling decays after release.
    pub fling_time: f32,
    /// Minimum release speed (units/sec) that starts a fling.
    pub fling_velocity_min: f32,
    /// How far an axis may overscroll past its bounds.
    pub overscroll_distance: f32,
    /// Spring-back speed at the overscroll boundary.
    pub overscroll_speed_min: f32,
    /// Spring-back speed at full overscroll distance.
    pub overscroll_speed_max: f32,
    /// Smooth-scroll catch-up floor (units/sec).
    pub visual_speed_floor: f32,
    /// Smooth-scroll proportional catch-up (fraction of the gap per second).
    pub smooth_catchup_factor: f32,
    /// Units scrolled per wheel step.
    pub wheel_step: f32,
    /// Seconds of inactivity before scrollbars start fading.
    pub fade_delay_seconds: f32,
    /// Seconds for scrollbar alpha to ramp to zero.
    pub fade_alpha_seconds: f32,
}

impl Default for ScrollTuning {
    fn default() -> Self {
        Self {
            fling_time: 1.0,
            fling_velocity_min: 150.0,
            overscroll_distance: 50.0,
            overscroll_speed_min: 30.0,
            overscroll_speed_max: 200.0,
            visual_speed_floor: 200.0,
            smooth_catchup_factor: 7.0,
            wheel_step: 50.0,
            fade_delay_seconds: 1.0,
            fade_alpha_seconds: 1.0,
        }
    }
}

impl ScrollTuning {
    /// Parses tuning from TOML; unset fields keep their defaults.
    pub fn from_toml_str(raw: &str) -> SceneResult<Self> {
        let tuning: Self =
            toml::from_str(raw).map_err(|e| SceneError::InvalidConfig(e.to_string()))?;
        tuning.validated()
    }

    /// Rejects non-positive fields.
    pub fn validated(self) -> SceneResult<Self> {
        let fields = [
            ("fling_time", self.fling_time),
            ("fling_velocity_min", self.fling_velocity_min),
            ("overscroll_distance", self.overscroll_distance),
            ("overscroll_speed_min", self.overscroll_speed_min),
            ("overscroll_speed_max", self.overscroll_speed_max),
            ("visual_speed_floor", self.visual_speed_floor),
            ("smooth_catchup_factor", self.smooth_catchup_factor),
            ("wheel_step", self.wheel_step),
            ("fade_delay_seconds", self.fade_delay_seconds),
            ("fade_alpha_seconds", self.fade_alpha_seconds),
        ];
        for (name, value) in fields {
            if value <= 0.0 || !value.is_finite() {
                return Err(SceneError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        ScrollTuning::default().validated().unwrap();
    }

    #[test]
    fn test_partial_toml_overrides() {
        let tuning = ScrollTuning::from_toml_str("fling_time = 0.5\nwheel_step = 80.0\n").unwrap();
        assert!((tuning.fling_time - 0.5).abs() < 1e-6);
        assert!((tuning.wheel_step - 80.0).abs() < 1e-6);
        assert!((tuning.overscroll_distance - 50.0).abs() < 1e-6, "default kept");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = ScrollTuning::from_toml_str("turbo_mode = true\n").unwrap_err();
        assert!(matches!(err, SceneError::InvalidConfig(_)));
    }

    #[test]
    fn test_non_positive_rejected() {
        let err = ScrollTuning::from_toml_str("fling_time = 0.0\n").unwrap_err();
        assert!(matches!(err, SceneError::InvalidConfig(_)));
    }
}
