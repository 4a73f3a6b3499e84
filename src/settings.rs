use crate::color::Rgb;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Host-side bounds for the particle sliders
pub const MIN_PARTICLES: usize = 10;
pub const MAX_PARTICLES: usize = 300;
pub const MAX_SPEED: f32 = 5.0;
pub const MIN_SIZE: f32 = 1.0;
pub const MAX_SIZE: f32 = 5.0;

/// Snapshot of everything the renderer reads each tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldConfiguration {
    /// Number of particles in the field
    pub particle_count: usize,
    /// Velocity scalar; each axis is seeded from [-0.5, 0.5) * speed
    pub particle_speed: f32,
    /// Radius scalar; each radius is seeded from [0, size)
    pub particle_size: f32,
    /// Hex RGB colour, e.g. `#ffffff`
    pub particle_color: String,
    /// Draw proximity links between nearby particles
    pub particle_links: bool,
    /// Run and draw the field at all
    pub show_particles: bool,
    /// Push particles away from the pointer
    pub pointer_repulsion: bool,
}

impl Default for FieldConfiguration {
    fn default() -> Self {
        Self {
            particle_count: 80,
            particle_speed: 1.0,
            particle_size: 2.0,
            particle_color: "#ffffff".to_string(),
            particle_links: true,
            show_particles: true,
            pointer_repulsion: true,
        }
    }
}

impl FieldConfiguration {
    /// True when switching to `other` requires reseeding the field
    pub fn population_differs(&self, other: &FieldConfiguration) -> bool {
        self.particle_count != other.particle_count
            || self.particle_speed != other.particle_speed
            || self.particle_size != other.particle_size
    }

    /// Parse the configured colour
    pub fn color(&self) -> Result<Rgb, ConfigError> {
        Rgb::parse_hex(&self.particle_color)
    }

    /// Adjust particle count within bounds
    pub fn adjust_count(&mut self, delta: i32) {
        let new_val = (self.particle_count as i32 + delta).clamp(MIN_PARTICLES as i32, MAX_PARTICLES as i32);
        self.particle_count = new_val as usize;
    }

    /// Adjust speed within bounds, snapped to one decimal
    pub fn adjust_speed(&mut self, delta: f32) {
        let raw = (self.particle_speed + delta).clamp(0.0, MAX_SPEED);
        self.particle_speed = (raw * 10.0).round() / 10.0;
    }

    /// Adjust size within bounds, snapped to halves
    pub fn adjust_size(&mut self, delta: f32) {
        let raw = (self.particle_size + delta).clamp(MIN_SIZE, MAX_SIZE);
        self.particle_size = (raw * 2.0).round() / 2.0;
    }

    pub fn toggle_links(&mut self) {
        self.particle_links = !self.particle_links;
    }

    pub fn toggle_visible(&mut self) {
        self.show_particles = !self.show_particles;
    }

    pub fn toggle_repulsion(&mut self) {
        self.pointer_repulsion = !self.pointer_repulsion;
    }

    /// Clamp every numeric field into the host's slider ranges
    pub fn clamped(mut self) -> Self {
        self.particle_count = self.particle_count.clamp(MIN_PARTICLES, MAX_PARTICLES);
        self.particle_speed = self.particle_speed.clamp(0.0, MAX_SPEED);
        self.particle_size = self.particle_size.clamp(MIN_SIZE, MAX_SIZE);
        self
    }
}
