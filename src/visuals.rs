//! Visual configuration for the backdrop.
//!
//! Controls how the field is drawn, separate from how it moves.
//!
//! ```ignore
//! Backdrop::new()
//!     .with_visuals(|v| {
//!         v.particle_color(Vec3::new(1.0, 0.4, 0.1));
//!         v.background(Vec3::new(0.0, 0.0, 0.0));
//!     })
//!     .run()?;
//! ```

use glam::Vec3;

/// Colors for the three drawn layers: background clear, connection lines,
/// particle glows. Linear RGB, 0.0 to 1.0 per channel.
#[derive(Debug, Clone, Copy)]
pub struct VisualConfig {
    pub(crate) particle_color: Vec3,
    pub(crate) link_color: Vec3,
    pub(crate) background: Vec3,
}

impl VisualConfig {
    /// Color of the particle glows.
    pub fn particle_color(&mut self, color: Vec3) -> &mut Self {
        self.particle_color = color;
        self
    }

    /// Color of the connection lines between nearby particles.
    pub fn link_color(&mut self, color: Vec3) -> &mut Self {
        self.link_color = color;
        self
    }

    /// Clear color behind the field.
    pub fn background(&mut self, color: Vec3) -> &mut Self {
        self.background = color;
        self
    }
}

impl Default for VisualConfig {
    fn default() -> Self {
        // The reference backdrop: spring-green glow on near-black navy.
        let green = Vec3::new(0.0, 1.0, 0.533);
        Self {
            particle_color: green,
            link_color: green,
            background: Vec3::new(0.02, 0.02, 0.05),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_links_match_particles() {
        let v = VisualConfig::default();
        assert_eq!(v.particle_color, v.link_color);
    }

    #[test]
    fn test_setters_chain() {
        let mut v = VisualConfig::default();
        v.particle_color(Vec3::ONE).link_color(Vec3::ZERO);
        assert_eq!(v.particle_color, Vec3::ONE);
        assert_eq!(v.link_color, Vec3::ZERO);
    }
}
