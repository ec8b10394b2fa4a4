//! Integration tests driving the field through its public API, the way the
//! window loop does: spawn, step, pointer moves, resize, connection pass.

use driftfield::prelude::*;

#[test]
fn test_headless_frame_loop() {
    let mut field = ParticleField::with_seed(1500.0, 1000.0, FieldConfig::default(), 7);
    assert_eq!(field.particle_count(), 100);

    // Simulate a few seconds of frames with a wandering pointer.
    for frame in 0..600u32 {
        let t = frame as f32 * 0.05;
        field.set_pointer(750.0 + 400.0 * t.cos(), 500.0 + 300.0 * t.sin());
        field.step();
    }

    for p in field.particles() {
        assert!((0.0..=1500.0).contains(&p.position.x));
        assert!((0.0..=1000.0).contains(&p.position.y));
        assert!(p.radius >= 1.0 && p.radius < 3.0);
        assert!(p.opacity >= 0.2 && p.opacity < 0.7);
    }

    let links = field.connections(field.link_capacity());
    for link in &links {
        assert!(link.alpha > 0.0 && link.alpha <= 0.1);
        assert!(link.a.distance(link.b) < 120.0);
    }
}

#[test]
fn test_resize_mid_flight_regenerates() {
    let mut field = ParticleField::with_seed(1280.0, 720.0, FieldConfig::default(), 7);
    assert_eq!(field.particle_count(), 61); // floor(1280 * 720 / 15000)

    for _ in 0..120 {
        field.step();
    }

    field.resize(2560.0, 1440.0);
    assert_eq!(field.particle_count(), 245); // floor(2560 * 1440 / 15000)
    for p in field.particles() {
        assert!(p.position.x < 2560.0 && p.position.y < 1440.0);
    }
}

#[test]
fn test_seeded_fields_replay_identically() {
    let mut a = ParticleField::with_seed(1280.0, 720.0, FieldConfig::default(), 99);
    let mut b = ParticleField::with_seed(1280.0, 720.0, FieldConfig::default(), 99);

    for _ in 0..240 {
        a.set_pointer(100.0, 100.0);
        b.set_pointer(100.0, 100.0);
        a.step();
        b.step();
    }

    assert_eq!(a.particles(), b.particles());
    assert_eq!(
        a.connections(a.link_capacity()),
        b.connections(b.link_capacity()),
    );
}
