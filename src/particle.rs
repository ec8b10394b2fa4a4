//! The particle value type and its GPU instance representation.
//!
//! Particles are plain data: position, velocity, radius, opacity. They hold
//! no references to each other; connections between nearby particles are
//! computed transiently each frame by the field.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// A single drift particle.
///
/// Radius and opacity are fixed at spawn time; position and velocity evolve
/// every tick. The whole set is discarded and respawned on resize, so
/// particles carry no identity across a regeneration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Position in surface pixels, origin at the top-left corner.
    pub position: Vec2,
    /// Per-frame displacement, unitless.
    pub velocity: Vec2,
    /// Draw radius in pixels; the glow extends to twice this.
    pub radius: f32,
    /// Rendering alpha at the glow center, in `(0, 1)`.
    pub opacity: f32,
}

impl Particle {
    /// Pack this particle into its vertex-buffer instance form.
    pub fn instance(&self) -> ParticleInstance {
        ParticleInstance {
            data: [self.position.x, self.position.y, self.radius, self.opacity],
        }
    }
}

/// GPU-side particle instance: `xy` = position, `z` = radius, `w` = opacity.
///
/// Matches the `vec4<f32>` instance attribute in the particle render shader.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ParticleInstance {
    data: [f32; 4],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_packs_fields_in_order() {
        let p = Particle {
            position: Vec2::new(12.0, 34.0),
            velocity: Vec2::new(0.1, -0.2),
            radius: 2.5,
            opacity: 0.4,
        };
        let inst = p.instance();
        assert_eq!(inst.data, [12.0, 34.0, 2.5, 0.4]);
    }

    #[test]
    fn test_instance_is_16_bytes() {
        assert_eq!(std::mem::size_of::<ParticleInstance>(), 16);
    }
}
