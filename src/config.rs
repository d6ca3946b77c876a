//! Scenario configuration
//!
//! A scenario file is plain JSON deserialized into [`ScenarioConfig`].
//! Missing fields fall back to the defaults in [`crate::consts`], so an
//! empty object `{}` is a valid scenario. Validation happens once up front;
//! a config that passes cannot fail construction later.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts;
use crate::error::SimError;
use crate::render::Camera;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    /// Initial yaw in radians.
    pub phi: f32,
    /// Initial pitch in radians, clamped by the camera on construction.
    pub theta: f32,
    pub focal_length: f32,
    pub zoom: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -20.0),
            phi: 0.0,
            theta: 0.0,
            focal_length: 500.0,
            zoom: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub width: u32,
    pub height: u32,
    pub gravity: Vec3,
    pub friction_per_second: f32,
    pub restitution: f32,
    pub render_fps: f32,
    pub seed: u64,
    pub camera: CameraConfig,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            gravity: consts::GRAVITY,
            friction_per_second: consts::FRICTION_PER_SECOND,
            restitution: consts::RESTITUTION,
            render_fps: consts::RENDER_FPS,
            seed: 42,
            camera: CameraConfig::default(),
        }
    }
}

impl ScenarioConfig {
    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SimError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.width == 0 || self.height == 0 {
            return Err(SimError::InvalidConfig(format!(
                "raster size {}x{} must be non-zero",
                self.width, self.height
            )));
        }
        if !self.gravity.is_finite() {
            return Err(SimError::InvalidConfig("gravity must be finite".into()));
        }
        if !(self.friction_per_second >= 0.0) || !self.friction_per_second.is_finite() {
            return Err(SimError::InvalidConfig(format!(
                "friction {} must be finite and non-negative",
                self.friction_per_second
            )));
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(SimError::InvalidConfig(format!(
                "restitution {} must be in [0, 1]",
                self.restitution
            )));
        }
        if !(self.render_fps > 0.0) || !self.render_fps.is_finite() {
            return Err(SimError::InvalidConfig(format!(
                "render fps {} must be positive",
                self.render_fps
            )));
        }
        if !(self.camera.focal_length > 0.0) {
            return Err(SimError::NonPositiveFocalLength(self.camera.focal_length));
        }
        if !(self.camera.zoom > 0.0) {
            return Err(SimError::NonPositiveZoom(self.camera.zoom));
        }
        Ok(())
    }

    /// Camera at the configured pose.
    pub fn build_camera(&self) -> Result<Camera, SimError> {
        let mut camera = Camera::new(
            self.camera.position,
            self.camera.focal_length,
            self.camera.zoom,
            self.width,
            self.height,
        )?;
        camera.set_phi(self.camera.phi);
        camera.set_theta(self.camera.theta);
        Ok(camera)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ScenarioConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.build_camera().is_ok());
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = ScenarioConfig::from_json_str("{}").unwrap();
        assert_eq!(config.width, 800);
        assert_eq!(config.seed, 42);
        assert_eq!(config.gravity, consts::GRAVITY);
    }

    #[test]
    fn test_partial_json_overrides() {
        let config =
            ScenarioConfig::from_json_str(r#"{"width": 320, "height": 240, "seed": 7}"#).unwrap();
        assert_eq!(config.width, 320);
        assert_eq!(config.height, 240);
        assert_eq!(config.seed, 7);
        assert_eq!(config.render_fps, consts::RENDER_FPS);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(ScenarioConfig::from_json_str(r#"{"width": 0}"#).is_err());
        assert!(ScenarioConfig::from_json_str(r#"{"restitution": 1.5}"#).is_err());
        assert!(ScenarioConfig::from_json_str(r#"{"friction_per_second": -0.1}"#).is_err());
        assert!(ScenarioConfig::from_json_str(r#"{"render_fps": 0.0}"#).is_err());
        assert!(ScenarioConfig::from_json_str(r#"{"camera": {"zoom": 0.0}}"#).is_err());
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            ScenarioConfig::from_json_str("not json"),
            Err(SimError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_camera_pose_applied() {
        let config = ScenarioConfig::from_json_str(r#"{"camera": {"phi": 0.5, "theta": 0.2}}"#)
            .unwrap();
        let camera = config.build_camera().unwrap();
        assert!((camera.phi() - 0.5).abs() < 1e-6);
        assert!((camera.theta() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_round_trips_through_json() {
        let config = ScenarioConfig {
            seed: 1234,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back = ScenarioConfig::from_json_str(&json).unwrap();
        assert_eq!(back.seed, 1234);
        assert_eq!(back.camera.position, config.camera.position);
    }
}
