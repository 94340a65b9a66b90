use serde::{Deserialize, Serialize};

use crate::errors::RimlightError;
use crate::types::FrameGeometry;

/// Capture + sampling configuration.
///
/// `depth` is the edge length of the square averaging box; the border is
/// bisected into `depth`-wide stripes, so a smaller depth yields more
/// (and finer) samples around the perimeter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureProfile {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    #[serde(alias = "targetFPS")]
    pub target_fps: u32,
}

impl Default for CaptureProfile {
    fn default() -> Self {
        Self {
            width: 256,
            height: 144,
            depth: 2,
            target_fps: 24,
        }
    }
}

impl CaptureProfile {
    pub fn geometry(&self) -> FrameGeometry {
        FrameGeometry::new(self.width, self.height)
    }

    /// Interval between frames in microseconds at the requested cadence.
    pub fn frame_interval_us(&self) -> u64 {
        1_000_000 / self.target_fps.max(1) as u64
    }

    /// Reject profiles the sampler cannot trace a perimeter for.
    pub fn validate(&self) -> Result<(), RimlightError> {
        if self.width == 0 || self.height == 0 {
            return Err(RimlightError::ConfigurationInvalid {
                reason: format!("frame geometry {}×{} is empty", self.width, self.height),
            });
        }
        if self.depth == 0 {
            return Err(RimlightError::ConfigurationInvalid {
                reason: "depth must be at least 1".to_owned(),
            });
        }
        if self.depth > self.width.min(self.height) {
            return Err(RimlightError::ConfigurationInvalid {
                reason: format!(
                    "depth {} exceeds the smaller frame dimension of {}×{}",
                    self.depth, self.width, self.height
                ),
            });
        }
        if self.target_fps == 0 {
            return Err(RimlightError::ConfigurationInvalid {
                reason: "target_fps must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::CaptureProfile;

    #[test]
    fn defaults_match_capture_constants() {
        let p = CaptureProfile::default();
        assert_eq!((p.width, p.height, p.depth, p.target_fps), (256, 144, 2, 24));
        assert!(p.validate().is_ok());
        assert_eq!(p.geometry().byte_len(), 256 * 144 * 3);
    }

    #[test]
    fn deserializes_camel_case_fields() {
        let json = r#"{
            "width": 256,
            "height": 144,
            "depth": 4,
            "targetFPS": 30
        }"#;

        let p: CaptureProfile = serde_json::from_str(json).expect("valid camelCase profile");
        assert_eq!(p.depth, 4);
        assert_eq!(p.target_fps, 30);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let p: CaptureProfile = serde_json::from_str(r#"{"depth": 8}"#).expect("partial profile");
        assert_eq!(p.depth, 8);
        assert_eq!(p.width, 256);
        assert_eq!(p.target_fps, 24);
    }

    #[test]
    fn rejects_zero_depth_and_oversized_depth() {
        let zero = CaptureProfile { depth: 0, ..Default::default() };
        assert!(zero.validate().is_err());

        let oversized = CaptureProfile { depth: 145, ..Default::default() };
        assert!(oversized.validate().is_err());

        let exact = CaptureProfile { depth: 144, ..Default::default() };
        assert!(exact.validate().is_ok());
    }

    #[test]
    fn frame_interval_matches_cadence() {
        let p = CaptureProfile::default();
        assert_eq!(p.frame_interval_us(), 1_000_000 / 24);
    }
}
