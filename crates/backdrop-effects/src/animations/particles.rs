//! Particle field with a proximity graph (stateful).

use backdrop_core::{
    CapabilitySnapshot, Extent, Glow, Rgb, Surface, Vec2,
    color::{AMBER, TEAL},
};
use rand::{Rng, rngs::StdRng};

use crate::host::Effect;

/// Number of particles in an active field.
pub const PARTICLE_COUNT: usize = 50;
/// Largest velocity component, in surface units per frame.
pub const MAX_SPEED: f32 = 0.25;
/// Pairs closer than this are joined by a line.
pub const LINK_DISTANCE: f32 = 100.0;
/// Alpha of a line between two coincident particles.
pub const LINK_ALPHA: f32 = 0.2;
/// Glow blur around each particle.
const GLOW_BLUR: f32 = 10.0;

/// A single particle.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    /// Displacement per frame.
    pub velocity: Vec2,
    pub radius: f32,
    pub base_opacity: f32,
    pub opacity: f32,
    pub color: Rgb,
}

impl Particle {
    /// A particle placed uniformly at random on a surface of `extent`.
    pub fn random(extent: Extent, rng: &mut impl Rng) -> Self {
        let base_opacity = rng.random_range(0.2..0.7);
        Self {
            position: Vec2::new(
                rng.random::<f32>() * extent.width,
                rng.random::<f32>() * extent.height,
            ),
            velocity: Vec2::new(
                (rng.random::<f32>() - 0.5) * 2.0 * MAX_SPEED,
                (rng.random::<f32>() - 0.5) * 2.0 * MAX_SPEED,
            ),
            radius: rng.random_range(1.0..3.0),
            base_opacity,
            opacity: base_opacity,
            color: if rng.random_bool(0.5) { TEAL } else { AMBER },
        }
    }

    /// Move by one velocity step, bouncing off the surface edges.
    ///
    /// The velocity flips once the position leaves `[0, extent]`, so a
    /// particle overshoots an edge by at most one step.
    pub fn step(&mut self, extent: Extent) {
        self.position.x += self.velocity.x;
        self.position.y += self.velocity.y;

        if self.position.x < 0.0 || self.position.x > extent.width {
            self.velocity.x = -self.velocity.x;
        }
        if self.position.y < 0.0 || self.position.y > extent.height {
            self.velocity.y = -self.velocity.y;
        }
    }
}

/// Pulsing opacity keyed on the clock and the particle's x position.
///
/// May dip below zero; surfaces clamp alpha.
pub fn pulse_opacity(elapsed_ms: u64, x: f32) -> f32 {
    let phase = elapsed_ms as f64 * 0.001 + f64::from(x) * 0.01;
    (0.2 + phase.sin() * 0.3) as f32
}

/// Line alpha for a pair `distance` apart, or `None` if they are not linked.
pub fn link_alpha(distance: f32) -> Option<f32> {
    (distance < LINK_DISTANCE)
        .then(|| (LINK_DISTANCE - distance) / LINK_DISTANCE * LINK_ALPHA)
}

/// The particle layer.
///
/// Declines to mount when the capability snapshot reports a low
/// performance device, in which case it never allocates particles.
#[derive(Debug)]
pub struct ParticleField {
    capability: CapabilitySnapshot,
    extent: Extent,
    particles: Vec<Particle>,
    rng: StdRng,
}

impl ParticleField {
    pub fn new(capability: CapabilitySnapshot, rng: StdRng) -> Self {
        Self {
            capability,
            extent: Extent::default(),
            particles: Vec::new(),
            rng,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    fn low_performance(&self) -> bool {
        self.capability.low_performance
    }

    /// Discard the population and scatter a new one over `extent`.
    pub fn populate(&mut self, extent: Extent) {
        self.extent = extent;
        self.particles.clear();
        if self.low_performance() {
            return;
        }
        let rng = &mut self.rng;
        self.particles
            .extend((0..PARTICLE_COUNT).map(|_| Particle::random(extent, rng)));
    }

    /// Integrate every particle by one frame.
    pub fn advance(&mut self, elapsed_ms: u64) {
        let pulse = !self.low_performance();
        for particle in &mut self.particles {
            particle.step(self.extent);
            if pulse {
                particle.opacity = pulse_opacity(elapsed_ms, particle.position.x);
            }
        }
    }

    /// Every unordered pair closer than [`LINK_DISTANCE`], with its alpha.
    pub fn links(&self) -> impl Iterator<Item = (usize, usize, f32)> + '_ {
        let ps = &self.particles;
        (0..ps.len()).flat_map(move |i| {
            (i + 1..ps.len()).filter_map(move |j| {
                let distance = ps[i].position.distance(ps[j].position);
                link_alpha(distance).map(|alpha| (i, j, alpha))
            })
        })
    }

    /// Draw the current state. The surface is cleared first; nothing trails.
    pub fn render(&self, surface: &mut dyn Surface) {
        surface.clear();

        let glow = !self.low_performance();
        for p in &self.particles {
            surface.set_glow(glow.then_some(Glow {
                color: p.color,
                blur: GLOW_BLUR,
            }));
            surface.fill_circle(p.position, p.radius, p.color, p.opacity);
        }
        surface.set_glow(None);

        if self.low_performance() {
            return;
        }
        for (i, j, alpha) in self.links() {
            surface.draw_line(
                self.particles[i].position,
                self.particles[j].position,
                TEAL,
                alpha,
            );
        }
    }
}

impl Effect for ParticleField {
    fn name(&self) -> &'static str {
        "particles"
    }

    fn should_mount(&self) -> bool {
        !self.low_performance()
    }

    fn mount(&mut self, extent: Extent) {
        self.populate(extent);
    }

    fn frame(&mut self, elapsed_ms: u64, surface: &mut dyn Surface) {
        self.advance(elapsed_ms);
        self.render(surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::AnimationHost;
    use crate::recording::{DrawCall, RecordingSurface};
    use backdrop_core::{
        Broadcast, CapabilityProbe, CapabilitySignals, FrameScheduler, Hint, StaticCapabilities,
        Viewport,
    };
    use rand::SeedableRng;

    fn capable() -> CapabilitySnapshot {
        CapabilitySnapshot::default()
    }

    fn low() -> CapabilitySnapshot {
        CapabilitySnapshot {
            low_performance: true,
            reduced_motion: false,
        }
    }

    fn field(capability: CapabilitySnapshot, seed: u64) -> ParticleField {
        ParticleField::new(capability, StdRng::seed_from_u64(seed))
    }

    fn particle_at(x: f32, y: f32) -> Particle {
        Particle {
            position: Vec2::new(x, y),
            velocity: Vec2::default(),
            radius: 2.0,
            base_opacity: 0.5,
            opacity: 0.5,
            color: TEAL,
        }
    }

    #[test]
    fn test_population_is_fixed_regardless_of_extent() {
        let sizes = [
            (1.0, 1.0),
            (320.0, 200.0),
            (1920.0, 1080.0),
            (10_000.0, 40.0),
        ];
        for (w, h) in sizes {
            let mut f = field(capable(), 7);
            f.populate(Extent::new(w, h));
            assert_eq!(f.particles().len(), PARTICLE_COUNT);
        }
    }

    #[test]
    fn test_particle_ranges() {
        let extent = Extent::new(800.0, 600.0);
        let mut f = field(capable(), 11);
        f.populate(extent);
        for p in f.particles() {
            assert!((0.0..=extent.width).contains(&p.position.x));
            assert!((0.0..=extent.height).contains(&p.position.y));
            assert!(p.velocity.x.abs() <= MAX_SPEED);
            assert!(p.velocity.y.abs() <= MAX_SPEED);
            assert!((1.0..3.0).contains(&p.radius));
            assert!((0.2..0.7).contains(&p.base_opacity));
            assert!(p.color == TEAL || p.color == AMBER);
        }
    }

    #[test]
    fn test_positions_stay_within_one_step_of_bounds() {
        let extent = Extent::new(120.0, 48.0);
        let mut f = field(capable(), 3);
        f.populate(extent);
        for frame in 0..5_000 {
            f.advance(frame * 16);
            for p in f.particles() {
                let x_range = -MAX_SPEED..=extent.width + MAX_SPEED;
                let y_range = -MAX_SPEED..=extent.height + MAX_SPEED;
                assert!(x_range.contains(&p.position.x));
                assert!(y_range.contains(&p.position.y));
            }
        }
    }

    #[test]
    fn test_reflection_flips_velocity_without_clamping() {
        let extent = Extent::new(100.0, 100.0);
        let mut p = particle_at(0.1, 50.0);
        p.velocity = Vec2::new(-0.25, 0.0);
        p.step(extent);
        assert!((p.position.x - -0.15).abs() < 1e-6);
        assert_eq!(p.velocity.x, 0.25);
        p.step(extent);
        assert!(p.position.x > 0.0);
    }

    #[test]
    fn test_pulse_opacity() {
        assert!((pulse_opacity(0, 0.0) - 0.2).abs() < 1e-6);
        let peak = pulse_opacity(0, 50.0 * std::f32::consts::PI);
        assert!((peak - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_pulse_keeps_moving_after_hours() {
        let twenty_hours = 72_000_000;
        let expected = (0.2 + 72_000.0_f64.sin() * 0.3) as f32;
        assert!((pulse_opacity(twenty_hours, 0.0) - expected).abs() < 1e-6);
        assert_ne!(
            pulse_opacity(twenty_hours, 0.0),
            pulse_opacity(twenty_hours + 1, 0.0)
        );
    }

    #[test]
    fn test_close_pair_draws_one_line() {
        let mut f = field(capable(), 1);
        f.extent = Extent::new(200.0, 200.0);
        f.particles = vec![particle_at(10.0, 10.0), particle_at(15.0, 10.0)];

        let mut surface = RecordingSurface::new(f.extent);
        f.render(&mut surface);

        let lines = surface.lines();
        assert_eq!(lines.len(), 1);
        let DrawCall::Line { alpha, .. } = lines[0] else {
            unreachable!()
        };
        assert!((alpha - 0.19).abs() < 1e-6);
        assert_eq!(surface.circles().len(), 2);
        assert_eq!(surface.calls[0], DrawCall::Clear);
    }

    #[test]
    fn test_distant_pair_is_not_linked() {
        let mut f = field(capable(), 1);
        f.particles = vec![particle_at(0.0, 0.0), particle_at(100.0, 0.0)];
        assert_eq!(f.links().count(), 0);
        assert!(link_alpha(99.0).is_some_and(|a| (a - 0.002).abs() < 1e-6));
        assert_eq!(link_alpha(100.0), None);
    }

    #[test]
    fn test_particles_glow_when_capable() {
        let mut f = field(capable(), 5);
        f.populate(Extent::new(400.0, 400.0));
        let mut surface = RecordingSurface::new(f.extent());
        f.frame(0, &mut surface);
        assert!(
            surface
                .circles()
                .iter()
                .all(|c| matches!(c, DrawCall::FillCircle { glow: true, .. }))
        );
    }

    #[test]
    fn test_low_performance_field_is_inert() {
        let scheduler = FrameScheduler::new();
        let resizes = Broadcast::new();

        for _ in 0..3 {
            let mut acquired = false;
            let mut host = AnimationHost::mount(
                field(low(), 9),
                &scheduler,
                &resizes,
                Viewport::new(120, 40),
                |v| {
                    acquired = true;
                    Some(RecordingSurface::new(v.extent()))
                },
            );
            assert!(!acquired);
            assert!(!host.is_mounted());
            assert_eq!(scheduler.pending(), 0);
            assert!(!host.on_tick(&scheduler.tick(), 16));
            assert!(host.effect().particles().is_empty());
            assert!(host.surface().is_none());
        }
        assert_eq!(resizes.listeners(), 0);
    }

    #[test]
    fn test_two_cores_disable_the_field() {
        let source = StaticCapabilities(CapabilitySignals {
            logical_cores: Hint::Available(2),
            ..CapabilitySignals::default()
        });
        let motion = Broadcast::new();
        let probe = CapabilityProbe::evaluate(&source, &motion);
        assert!(probe.snapshot().low_performance);

        let scheduler = FrameScheduler::new();
        let resizes = Broadcast::new();
        let host: AnimationHost<_, RecordingSurface> = AnimationHost::mount(
            field(probe.snapshot(), 2),
            &scheduler,
            &resizes,
            Viewport::new(80, 24),
            |_| panic!("no surface should be acquired"),
        );
        assert!(!host.is_mounted());
        assert_eq!(host.effect().particles.capacity(), 0);
    }

    #[test]
    fn test_mounted_field_runs_and_tears_down() {
        let scheduler = FrameScheduler::new();
        let resizes = Broadcast::new();
        let mut host = AnimationHost::mount(
            field(capable(), 4),
            &scheduler,
            &resizes,
            Viewport::new(100, 30),
            |v| Some(RecordingSurface::new(v.extent())),
        );
        assert_eq!(host.effect().particles().len(), PARTICLE_COUNT);
        assert!(host.on_tick(&scheduler.tick(), 16));
        assert_eq!(host.surface().unwrap().circles().len(), PARTICLE_COUNT);

        resizes.emit(Viewport::new(50, 10));
        host.on_tick(&scheduler.tick(), 32);
        assert_eq!(host.effect().extent(), Extent::new(400.0, 160.0));
        assert_eq!(host.effect().particles().len(), PARTICLE_COUNT);

        drop(host);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(resizes.listeners(), 0);
    }
}
