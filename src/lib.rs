//! A rotating, software-rasterised 3D heart for the terminal.
//!
//! The heart mesh is generated once from a parametric surface, rotated a
//! little every frame and drawn with half-block glyphs. Three sliders drive
//! the material color through an observable [`color::ColorStore`].

pub mod color;
pub mod config;
pub mod error;
pub mod graphics;
pub mod math;
pub mod mesh;
pub mod state;
pub mod terminal;
pub mod vertex;
pub mod widget;
