//! TOML configuration.
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! stock scene: the default heart color, a camera at `z = 100` with a 50°
//! field of view, a hot pink background and two directional lights.

use crate::color::{ColorStore, Rgb};
use crate::error::ConfigError;
use crate::mesh::{HEART_RADIUS, U_STEPS, V_STEPS};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub color: ColorConfig,
    pub animation: AnimationConfig,
    pub camera: CameraConfig,
    pub lighting: LightingConfig,
    pub scene: SceneConfig,
    pub mesh: MeshConfig,
}

/// Initial slider positions. Values outside `0..=255` are clamped on load.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub red: i64,
    pub green: i64,
    pub blue: i64,
}

impl Default for ColorConfig {
    fn default() -> Self {
        let color = ColorStore::DEFAULT_COLOR;
        ColorConfig {
            red: color.r as i64,
            green: color.g as i64,
            blue: color.b as i64,
        }
    }
}

impl ColorConfig {
    pub fn to_rgb(&self) -> Rgb {
        let clamp = |v: i64| v.clamp(0, 255) as u8;
        Rgb::new(clamp(self.red), clamp(self.green), clamp(self.blue))
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationConfig {
    /// Radians per second; the heart turns clockwise seen from above
    pub rotation_speed: f64,
    pub fps: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        AnimationConfig {
            rotation_speed: 1.0,
            fps: 60,
        }
    }
}

/// Closest depth in front of the camera that is still drawn
pub const NEAR_PLANE: f64 = 1.0;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    /// Distance from the origin along +Z
    pub distance: f64,
    /// Vertical field of view in degrees
    pub fov_degrees: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        CameraConfig {
            distance: 100.0,
            fov_degrees: 50.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LightingConfig {
    pub ambient: f64,
    /// `0.0` is fully diffuse, `1.0` removes the diffuse response
    pub metalness: f64,
    pub directional: Vec<DirectionalLight>,
}

impl Default for LightingConfig {
    fn default() -> Self {
        LightingConfig {
            ambient: 0.3,
            metalness: 0.5,
            directional: vec![
                DirectionalLight {
                    position: [10.0, 10.0, 10.0],
                    intensity: 1.0,
                },
                DirectionalLight {
                    position: [-10.0, -10.0, -10.0],
                    intensity: 0.5,
                },
            ],
        }
    }
}

/// Light shining from `position` toward the origin
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirectionalLight {
    pub position: [f64; 3],
    pub intensity: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneConfig {
    pub background: [u8; 3],
}

impl Default for SceneConfig {
    fn default() -> Self {
        let pink = Rgb::HOT_PINK;
        SceneConfig {
            background: [pink.r, pink.g, pink.b],
        }
    }
}

impl SceneConfig {
    pub fn background(&self) -> Rgb {
        let [r, g, b] = self.background;
        Rgb::new(r, g, b)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MeshConfig {
    pub u_steps: u32,
    pub v_steps: u32,
}

impl Default for MeshConfig {
    fn default() -> Self {
        MeshConfig {
            u_steps: U_STEPS,
            v_steps: V_STEPS,
        }
    }
}

impl Config {
    /// Parses a TOML document and validates it
    pub fn from_toml(content: &str) -> Result<Config, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a config file
    pub fn load_from_path(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Config::from_toml(&content)?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let animation = &self.animation;
        if !animation.rotation_speed.is_finite() {
            return Err(ConfigError::Validation(
                "animation.rotation_speed must be finite".into(),
            ));
        }
        if !(1..=240).contains(&animation.fps) {
            return Err(ConfigError::Validation(format!(
                "animation.fps must be between 1 and 240, got {}",
                animation.fps
            )));
        }

        let camera = &self.camera;
        let min_distance = HEART_RADIUS + NEAR_PLANE;
        if !(camera.distance.is_finite() && camera.distance > min_distance) {
            return Err(ConfigError::Validation(format!(
                "camera.distance must be greater than {min_distance}, got {}",
                camera.distance
            )));
        }
        if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
            return Err(ConfigError::Validation(format!(
                "camera.fov_degrees must be in (0, 180), got {}",
                camera.fov_degrees
            )));
        }

        let lighting = &self.lighting;
        if !(lighting.ambient.is_finite() && lighting.ambient >= 0.0) {
            return Err(ConfigError::Validation(
                "lighting.ambient must be non-negative".into(),
            ));
        }
        if !(0.0..=1.0).contains(&lighting.metalness) {
            return Err(ConfigError::Validation(
                "lighting.metalness must be between 0 and 1".into(),
            ));
        }
        for (i, light) in lighting.directional.iter().enumerate() {
            if light.position == [0.0; 3] {
                return Err(ConfigError::Validation(format!(
                    "lighting.directional[{i}] must not sit at the origin"
                )));
            }
            if !(light.intensity.is_finite() && light.intensity >= 0.0) {
                return Err(ConfigError::Validation(format!(
                    "lighting.directional[{i}].intensity must be non-negative"
                )));
            }
        }

        let mesh = &self.mesh;
        if !(3..=512).contains(&mesh.u_steps) || !(2..=512).contains(&mesh.v_steps) {
            return Err(ConfigError::Validation(format!(
                "mesh resolution {}x{} out of range (u: 3..=512, v: 2..=512)",
                mesh.u_steps, mesh.v_steps
            )));
        }

        Ok(())
    }
}
