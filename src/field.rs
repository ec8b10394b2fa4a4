//! The particle field: simulation core of the backdrop.
//!
//! [`ParticleField`] owns the particle set, the surface dimensions, and the
//! last-known pointer position. Once per frame the host calls [`step`], which
//! advances every particle under its drift velocity, snap-wraps it at the
//! surface edges, applies the pointer attraction impulse, and bleeds speed
//! off through damping. Rendering reads the particle set directly and pulls
//! the transient connection segments from [`connections`].
//!
//! Everything here is plain CPU math over `Vec<Particle>`, deterministic
//! under a fixed seed and testable without a window or GPU.
//!
//! [`step`]: ParticleField::step
//! [`connections`]: ParticleField::connections

use glam::Vec2;

use crate::particle::Particle;
use crate::spawn::SpawnContext;

/// Surface area, in square pixels, that yields one particle.
pub const PARTICLE_DENSITY: f32 = 15_000.0;

/// Sizing factor for the connection draw buffer: segments are capped at
/// this many per particle.
pub const LINKS_PER_PARTICLE: usize = 8;

/// Tuning parameters for the field. Defaults reproduce the reference
/// backdrop exactly.
#[derive(Debug, Clone, Copy)]
pub struct FieldConfig {
    /// Square pixels of surface area per particle.
    pub density: f32,
    /// Spawn-time velocity components are uniform in `[-drift_limit, drift_limit)`.
    pub drift_limit: f32,
    /// Spawn-time radius range in pixels, `[min, max)`.
    pub radius_range: (f32, f32),
    /// Spawn-time opacity range, `[min, max)`.
    pub opacity_range: (f32, f32),
    /// Pointer attraction reaches particles closer than this, in pixels.
    pub attract_radius: f32,
    /// Scale applied to the attraction impulse.
    pub attract_strength: f32,
    /// Multiplicative velocity damping applied every tick.
    pub damping: f32,
    /// Particles closer than this are linked by a line, in pixels.
    pub link_radius: f32,
    /// Line alpha at zero distance; falls off linearly to zero at `link_radius`.
    pub link_alpha: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            density: PARTICLE_DENSITY,
            drift_limit: 0.25,
            radius_range: (1.0, 3.0),
            opacity_range: (0.2, 0.7),
            attract_radius: 100.0,
            attract_strength: 0.01,
            damping: 0.99,
            link_radius: 120.0,
            link_alpha: 0.1,
        }
    }
}

/// Spawner function: builds one particle from its spawn context.
pub type Spawner = Box<dyn Fn(&mut SpawnContext) -> Particle + Send + Sync>;

/// A transient line segment between two nearby particles.
///
/// Computed fresh every frame; never stored across frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    /// First endpoint, in surface pixels.
    pub a: Vec2,
    /// Second endpoint, in surface pixels.
    pub b: Vec2,
    /// Draw alpha, stronger for closer pairs.
    pub alpha: f32,
}

/// The simulation state of the backdrop.
pub struct ParticleField {
    width: f32,
    height: f32,
    pointer: Vec2,
    particles: Vec<Particle>,
    config: FieldConfig,
    seed: u64,
    spawner: Spawner,
}

impl ParticleField {
    /// Create a field sized to the surface, seeded from the clock.
    pub fn new(width: f32, height: f32, config: FieldConfig) -> Self {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42);
        Self::with_seed(width, height, config, seed)
    }

    /// Create a field with an explicit seed. Identical seed and dimensions
    /// always produce an identical particle set.
    pub fn with_seed(width: f32, height: f32, config: FieldConfig, seed: u64) -> Self {
        let mut field = Self {
            width,
            height,
            pointer: Vec2::ZERO,
            particles: Vec::new(),
            config,
            seed,
            spawner: drifting_spawner(&config),
        };
        field.regenerate();
        field
    }

    /// Replace the spawner and respawn the particle set through it.
    pub fn set_spawner(&mut self, spawner: Spawner) {
        self.spawner = spawner;
        self.regenerate();
    }

    /// Surface width in pixels.
    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Surface height in pixels.
    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Last-known pointer position.
    #[inline]
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    /// The live particle set.
    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of particles currently alive. Always
    /// `floor(width * height / density)`.
    #[inline]
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Capacity of the connection draw buffer for the current count.
    #[inline]
    pub fn link_capacity(&self) -> usize {
        self.particles.len() * LINKS_PER_PARTICLE
    }

    /// Adopt new surface dimensions and regenerate the whole particle set.
    ///
    /// Deliberately discards simulation continuity instead of rescaling
    /// particles in place.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.regenerate();
    }

    /// Overwrite the stored pointer position. No smoothing; the next tick
    /// sees the new position in full.
    pub fn set_pointer(&mut self, x: f32, y: f32) {
        self.pointer = Vec2::new(x, y);
    }

    fn regenerate(&mut self) {
        let count = (self.width * self.height / self.config.density).floor() as u32;
        self.particles = (0..count)
            .map(|i| {
                let mut ctx = SpawnContext::new(i, count, self.width, self.height, self.seed);
                (self.spawner)(&mut ctx)
            })
            .collect();
        log::info!(
            "spawned {} particles for a {:.0}x{:.0} surface",
            self.particles.len(),
            self.width,
            self.height,
        );
    }

    /// Advance the simulation one tick.
    ///
    /// Per particle, in order: integrate velocity into position, snap-wrap
    /// at the edges, apply the pointer attraction impulse, damp velocity.
    pub fn step(&mut self) {
        let cfg = self.config;
        let (width, height) = (self.width, self.height);
        let pointer = self.pointer;

        for p in &mut self.particles {
            p.position += p.velocity;

            // Snap wrap: a coordinate leaving one edge reappears at the
            // opposite edge, not at the remainder-wrapped position.
            if p.position.x < 0.0 {
                p.position.x = width;
            } else if p.position.x >= width {
                p.position.x = 0.0;
            }
            if p.position.y < 0.0 {
                p.position.y = height;
            } else if p.position.y >= height {
                p.position.y = 0.0;
            }

            let delta = pointer - p.position;
            let dist = delta.length();
            if dist < cfg.attract_radius {
                let force = (cfg.attract_radius - dist) / cfg.attract_radius;
                p.velocity += delta * (force * cfg.attract_strength);
            }

            p.velocity *= cfg.damping;
        }
    }

    /// Line alpha for a pair at the given distance. Zero at and beyond the
    /// link radius.
    pub fn connection_alpha(&self, distance: f32) -> f32 {
        if distance < self.config.link_radius {
            (self.config.link_radius - distance) / self.config.link_radius * self.config.link_alpha
        } else {
            0.0
        }
    }

    /// Collect the connection segments for this frame: every unordered pair
    /// of particles closer than the link radius, up to `cap` segments.
    ///
    /// O(n²) over the particle set. The density formula keeps n small enough
    /// on any practical surface that no spatial index is needed; scaling the
    /// count up materially is the one place a uniform grid would have to be
    /// substituted.
    pub fn connections(&self, cap: usize) -> Vec<Connection> {
        let mut links = Vec::new();
        'outer: for (i, a) in self.particles.iter().enumerate() {
            for b in &self.particles[i + 1..] {
                let dist = a.position.distance(b.position);
                let alpha = self.connection_alpha(dist);
                if alpha > 0.0 {
                    if links.len() >= cap {
                        break 'outer;
                    }
                    links.push(Connection {
                        a: a.position,
                        b: b.position,
                        alpha,
                    });
                }
            }
        }
        links
    }
}

/// The default spawner: uniform scatter over the surface, uniform drift
/// velocity, radius, and opacity per the field config.
fn drifting_spawner(config: &FieldConfig) -> Spawner {
    let drift = config.drift_limit;
    let (radius_min, radius_max) = config.radius_range;
    let (opacity_min, opacity_max) = config.opacity_range;
    Box::new(move |ctx| Particle {
        position: ctx.scatter_position(),
        velocity: ctx.drift_velocity(drift),
        radius: ctx.random_range(radius_min, radius_max),
        opacity: ctx.random_range(opacity_min, opacity_max),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(width: f32, height: f32) -> ParticleField {
        ParticleField::with_seed(width, height, FieldConfig::default(), 1234)
    }

    #[test]
    fn test_count_follows_density_formula() {
        let f = field(1500.0, 1000.0);
        assert_eq!(f.particle_count(), 100);
    }

    #[test]
    fn test_positions_stay_in_bounds() {
        let mut f = field(640.0, 480.0);
        f.set_pointer(320.0, 240.0);
        for _ in 0..1000 {
            f.step();
            for p in f.particles() {
                assert!(
                    (0.0..=640.0).contains(&p.position.x),
                    "x out of bounds: {}",
                    p.position.x
                );
                assert!(
                    (0.0..=480.0).contains(&p.position.y),
                    "y out of bounds: {}",
                    p.position.y
                );
            }
        }
    }

    #[test]
    fn test_wrap_is_boundary_exact() {
        // 200x100 yields exactly one particle.
        let mut f = field(200.0, 100.0);
        f.particles[0].position = Vec2::new(199.9, 50.0);
        f.particles[0].velocity = Vec2::new(0.5, 0.0);
        f.step();
        // 200.4 meets-or-exceeds the width: snapped to 0, not 0.4.
        assert_eq!(f.particles[0].position.x, 0.0);
        assert_eq!(f.particles[0].position.y, 50.0);
    }

    #[test]
    fn test_underflow_snaps_to_far_edge() {
        let mut f = field(200.0, 100.0);
        f.particles[0].position = Vec2::new(0.05, 50.0);
        f.particles[0].velocity = Vec2::new(-0.25, 0.0);
        f.step();
        assert_eq!(f.particles[0].position.x, 200.0);
    }

    #[test]
    fn test_attraction_inside_radius_pulls_toward_pointer() {
        let mut f = field(1500.0, 1000.0);
        f.set_pointer(500.0, 500.0);
        f.particles.truncate(1);
        f.particles[0].position = Vec2::new(550.0, 500.0);
        f.particles[0].velocity = Vec2::ZERO;
        f.step();
        // Distance 50: force (100-50)/100 = 0.5, impulse -50 * 0.5 * 0.01,
        // then damped by 0.99.
        let expected = -50.0 * 0.5 * 0.01 * 0.99;
        let v = f.particles[0].velocity;
        assert!(v.x < 0.0, "velocity must point toward the pointer");
        assert!((v.x - expected).abs() < 1e-6);
        assert_eq!(v.y, 0.0);
    }

    #[test]
    fn test_outside_radius_only_damping_applies() {
        let mut f = field(1500.0, 1000.0);
        f.set_pointer(500.0, 500.0);
        f.particles.truncate(1);
        f.particles[0].position = Vec2::new(800.0, 500.0);
        f.particles[0].velocity = Vec2::new(0.1, -0.1);
        f.step();
        let v = f.particles[0].velocity;
        assert!((v.x - 0.1 * 0.99).abs() < 1e-6);
        assert!((v.y - -0.1 * 0.99).abs() < 1e-6);
    }

    #[test]
    fn test_connection_alpha_boundary_excluded() {
        let f = field(640.0, 480.0);
        assert_eq!(f.connection_alpha(120.0), 0.0);
        assert_eq!(f.connection_alpha(200.0), 0.0);
    }

    #[test]
    fn test_connection_alpha_at_half_radius() {
        let f = field(640.0, 480.0);
        assert!((f.connection_alpha(60.0) - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_connections_link_near_pairs_only() {
        let mut f = field(1500.0, 1000.0);
        f.particles.truncate(3);
        f.particles[0].position = Vec2::new(100.0, 100.0);
        f.particles[1].position = Vec2::new(160.0, 100.0); // 60 away from [0]
        f.particles[2].position = Vec2::new(900.0, 900.0); // far from both
        let links = f.connections(f.link_capacity());
        assert_eq!(links.len(), 1);
        assert!((links[0].alpha - 0.05).abs() < 1e-6);
        assert_eq!(links[0].a, f.particles[0].position);
        assert_eq!(links[0].b, f.particles[1].position);
    }

    #[test]
    fn test_connections_respect_cap() {
        let mut f = field(1500.0, 1000.0);
        // Pile everything onto one spot: every pair links.
        for p in &mut f.particles {
            p.position = Vec2::new(400.0, 400.0);
        }
        let links = f.connections(10);
        assert_eq!(links.len(), 10);
    }

    #[test]
    fn test_identical_seeds_spawn_identical_sets() {
        let a = ParticleField::with_seed(1280.0, 720.0, FieldConfig::default(), 99);
        let b = ParticleField::with_seed(1280.0, 720.0, FieldConfig::default(), 99);
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn test_different_seeds_spawn_different_sets() {
        let a = ParticleField::with_seed(1280.0, 720.0, FieldConfig::default(), 99);
        let b = ParticleField::with_seed(1280.0, 720.0, FieldConfig::default(), 100);
        assert_ne!(a.particles(), b.particles());
    }

    #[test]
    fn test_resize_regenerates_to_new_count() {
        let mut f = field(300.0, 250.0);
        assert_eq!(f.particle_count(), 5);
        f.step();
        f.resize(600.0, 500.0);
        assert_eq!(f.particle_count(), 20);
        for p in f.particles() {
            assert!(p.position.x < 600.0 && p.position.y < 500.0);
        }
    }

    #[test]
    fn test_pointer_defaults_to_origin() {
        let f = field(640.0, 480.0);
        assert_eq!(f.pointer(), Vec2::ZERO);
    }

    #[test]
    fn test_custom_spawner_is_used_on_regeneration() {
        let mut f = field(300.0, 250.0);
        f.set_spawner(Box::new(|ctx| Particle {
            position: Vec2::new(ctx.index as f32, 0.0),
            velocity: Vec2::ZERO,
            radius: 1.0,
            opacity: 0.5,
        }));
        assert_eq!(f.particle_count(), 5);
        assert_eq!(f.particles()[3].position, Vec2::new(3.0, 0.0));
        f.resize(600.0, 500.0);
        assert_eq!(f.particles()[19].position, Vec2::new(19.0, 0.0));
    }
}
