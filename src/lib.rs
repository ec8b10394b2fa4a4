//! # Driftfield
//!
//! Pointer-reactive ambient particle backdrop: a bounded set of point-mass
//! particles drifting across the window, pulled gently toward the mouse,
//! linked by proximity lines and drawn as soft glows.
//!
//! ## Quick Start
//!
//! ```ignore
//! use driftfield::Backdrop;
//!
//! fn main() -> Result<(), driftfield::BackdropError> {
//!     Backdrop::new()
//!         .with_title("portfolio")
//!         .run()
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### The field
//!
//! [`ParticleField`] is the simulation: particle count derives from surface
//! area (one particle per 15 000 px²), positions snap-wrap at the edges, the
//! pointer attracts particles within 100 px, and damping bleeds speed off
//! every tick. The field is plain CPU state: deterministic under
//! [`Backdrop::with_seed`] and usable headless in tests.
//!
//! ### Connections
//!
//! Particles closer than 120 px are linked by a line whose alpha falls off
//! linearly with distance. Links are recomputed from scratch every frame and
//! never stored.
//!
//! ### The host loop
//!
//! [`Backdrop::run`] owns the window: resize regenerates the field at the
//! new dimensions, pointer motion updates the attraction target, and every
//! `RedrawRequested` steps the field once and draws it. Closing the window
//! flips the cancellation flag and the loop stops re-requesting frames.
//!
//! ## Configuration
//!
//! ```ignore
//! use driftfield::{Backdrop, Vec3};
//!
//! Backdrop::new()
//!     .with_seed(7)
//!     .with_field(|f| f.attract_radius = 150.0)
//!     .with_visuals(|v| { v.particle_color(Vec3::new(1.0, 0.5, 0.1)); })
//!     .run()?;
//! ```

mod backdrop;
pub mod error;
pub mod field;
mod gpu;
pub mod particle;
pub mod spawn;
pub mod time;
pub mod visuals;

pub use backdrop::Backdrop;
pub use error::{BackdropError, GpuError};
pub use field::{Connection, FieldConfig, ParticleField, Spawner, LINKS_PER_PARTICLE, PARTICLE_DENSITY};
pub use glam::{Vec2, Vec3};
pub use particle::Particle;
pub use spawn::SpawnContext;
pub use visuals::VisualConfig;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use driftfield::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backdrop::Backdrop;
    pub use crate::error::BackdropError;
    pub use crate::field::{Connection, FieldConfig, ParticleField};
    pub use crate::particle::Particle;
    pub use crate::spawn::SpawnContext;
    pub use crate::time::Time;
    pub use crate::visuals::VisualConfig;
    pub use crate::{Vec2, Vec3};
}
