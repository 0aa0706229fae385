//! Camera framing: pose record, orbit limits and persistence

pub mod storage;

pub use storage::{FileStore, KeyValueStore, MemoryStore, PosePersistence, StorageError};

use glam::Vec3;
use serde::{Deserialize, Serialize};

pub const DEFAULT_POSITION: Vec3 = Vec3::new(0.0, 0.0, 2.2);
pub const DEFAULT_TARGET: Vec3 = Vec3::ZERO;
pub const DEFAULT_FOV: f32 = 40.0;

fn default_position() -> Vec3 {
    DEFAULT_POSITION
}

fn default_fov() -> f32 {
    DEFAULT_FOV
}

/// Where the camera sits, what it looks at, and its vertical field of view in degrees.
///
/// Serializes as `{"position":[x,y,z],"target":[x,y,z],"fov":n}`. Missing fields
/// fall back to the defaults individually.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    #[serde(default = "default_position")]
    pub position: Vec3,
    #[serde(default)]
    pub target: Vec3,
    #[serde(default = "default_fov")]
    pub fov: f32,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: DEFAULT_POSITION,
            target: DEFAULT_TARGET,
            fov: DEFAULT_FOV,
        }
    }
}

impl CameraPose {
    pub fn new(position: Vec3, target: Vec3, fov: f32) -> Self {
        Self {
            position,
            target,
            fov,
        }
    }

    /// Replace non-finite vectors and non-positive or non-finite fov with defaults
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        Self {
            position: if self.position.is_finite() {
                self.position
            } else {
                defaults.position
            },
            target: if self.target.is_finite() {
                self.target
            } else {
                defaults.target
            },
            fov: if self.fov.is_finite() && self.fov > 0.0 {
                self.fov
            } else {
                defaults.fov
            },
        }
    }

    /// Distance between camera and target
    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }
}

/// Orbit control settings for the viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitLimits {
    pub min_distance: f32,
    pub max_distance: f32,
    pub zoom_speed: f32,
    pub damping_factor: f32,
    pub enable_pan: bool,
    pub enable_zoom: bool,
    pub enable_rotate: bool,
}

impl Default for OrbitLimits {
    fn default() -> Self {
        Self {
            min_distance: 1.4,
            max_distance: 5.0,
            zoom_speed: 0.85,
            damping_factor: 0.08,
            enable_pan: true,
            enable_zoom: true,
            enable_rotate: true,
        }
    }
}

impl OrbitLimits {
    /// Whether the distance band is finite, positive and ordered
    pub fn is_valid(&self) -> bool {
        self.min_distance.is_finite()
            && self.max_distance.is_finite()
            && self.min_distance > 0.0
            && self.min_distance <= self.max_distance
    }

    /// Pull the camera along its view ray so its distance to the target is within limits.
    ///
    /// Swapped bounds are reordered; a NaN bound leaves that side open.
    pub fn clamp(&self, pose: CameraPose) -> CameraPose {
        let offset = pose.position - pose.target;
        let distance = offset.length();
        let min = if self.min_distance.is_nan() {
            0.0
        } else {
            self.min_distance
        };
        let max = if self.max_distance.is_nan() {
            f32::INFINITY
        } else {
            self.max_distance
        };
        let (lower, upper) = (min.min(max), min.max(max));
        let clamped = distance.max(lower).min(upper);

        if (clamped - distance).abs() <= f32::EPSILON {
            return pose;
        }

        // Degenerate pose: back off along the default viewing axis
        let direction = offset.try_normalize().unwrap_or(Vec3::Z);
        CameraPose {
            position: pose.target + direction * clamped,
            ..pose
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pose() {
        let pose = CameraPose::default();
        assert_eq!(pose.position, Vec3::new(0.0, 0.0, 2.2));
        assert_eq!(pose.target, Vec3::ZERO);
        assert_eq!(pose.fov, 40.0);
    }

    #[test]
    fn test_pose_json_shape() {
        let pose = CameraPose::new(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO, 40.0);
        let json = serde_json::to_string(&pose).unwrap();
        assert_eq!(
            json,
            r#"{"position":[1.0,2.0,3.0],"target":[0.0,0.0,0.0],"fov":40.0}"#
        );
    }

    #[test]
    fn test_partial_record_uses_defaults() {
        let pose: CameraPose = serde_json::from_str(r#"{"position":[1,1,1]}"#).unwrap();
        assert_eq!(pose.position, Vec3::ONE);
        assert_eq!(pose.target, DEFAULT_TARGET);
        assert_eq!(pose.fov, DEFAULT_FOV);
    }

    #[test]
    fn test_sanitized_replaces_bad_fov() {
        let pose = CameraPose::new(Vec3::ONE, Vec3::ZERO, 0.0).sanitized();
        assert_eq!(pose.fov, DEFAULT_FOV);
        assert_eq!(pose.position, Vec3::ONE);

        let pose = CameraPose::new(Vec3::new(f32::NAN, 0.0, 0.0), Vec3::ZERO, 55.0).sanitized();
        assert_eq!(pose.position, DEFAULT_POSITION);
        assert_eq!(pose.fov, 55.0);
    }

    #[test]
    fn test_clamp_pulls_camera_in_and_out() {
        let limits = OrbitLimits::default();

        let far = CameraPose::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, 40.0);
        assert!((limits.clamp(far).distance() - 5.0).abs() < 1e-5);

        let near = CameraPose::new(Vec3::new(0.0, 0.5, 0.0), Vec3::ZERO, 40.0);
        let clamped = limits.clamp(near);
        assert!((clamped.distance() - 1.4).abs() < 1e-5);
        assert!(clamped.position.y > 0.0);

        let fine = CameraPose::default();
        assert_eq!(limits.clamp(fine), fine);
    }

    #[test]
    fn test_clamp_with_swapped_bounds() {
        let limits = OrbitLimits {
            min_distance: 6.0,
            max_distance: 5.0,
            ..OrbitLimits::default()
        };
        assert!(!limits.is_valid());

        let clamped = limits.clamp(CameraPose::default());
        assert!((clamped.distance() - 5.0).abs() < 1e-5);

        let nan = OrbitLimits {
            min_distance: f32::NAN,
            ..OrbitLimits::default()
        };
        assert!((nan.clamp(CameraPose::default()).distance() - 2.2).abs() < 1e-5);
    }

    #[test]
    fn test_clamp_degenerate_pose() {
        let limits = OrbitLimits::default();
        let stacked = CameraPose::new(Vec3::ZERO, Vec3::ZERO, 40.0);
        let clamped = limits.clamp(stacked);
        assert!((clamped.position - Vec3::new(0.0, 0.0, 1.4)).length() < 1e-5);
    }
}
