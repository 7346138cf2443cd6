use crate::color::{Channel, ColorStore};
use std::f64::consts::TAU;

/// Application state
#[derive(Debug)]
pub struct AppState {
    /// Material color driven by the sliders
    pub color: ColorStore,
    /// Current rotation angle around the Y-axis, kept in `[0, 2π)`
    pub yaw: f64,
    /// Radians per second
    pub rotation_speed: f64,
    /// Slider that receives keyboard input
    pub selected: Channel,
    /// Enable debug mode
    pub debug: bool,
    /// Simulation paused
    pub paused: bool,
    /// Wireframe mode enabled
    pub wireframe: bool,
    /// Zoom level
    pub zoom: f64,
}

impl AppState {
    pub const MIN_ZOOM: f64 = 0.1;
    pub const MAX_ZOOM: f64 = 10.0;

    pub fn new(color: ColorStore, rotation_speed: f64) -> Self {
        AppState {
            color,
            yaw: 0.0,
            rotation_speed,
            selected: Channel::Red,
            debug: false,
            paused: false,
            wireframe: false,
            zoom: 1.0,
        }
    }

    /// Per-frame update step: turns the heart by `-elapsed × rotation_speed`
    pub fn advance(&mut self, elapsed_seconds: f64) {
        if self.paused {
            return;
        }
        self.yaw = (self.yaw - elapsed_seconds * self.rotation_speed).rem_euclid(TAU);
    }

    pub fn zoom_by(&mut self, factor: f64) {
        self.zoom = (self.zoom * factor).clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
    }

    /// Reset the view to its initial orientation; the color is kept
    pub fn reset_view(&mut self) {
        self.yaw = 0.0;
        self.zoom = 1.0;
        self.wireframe = false;
    }
}
