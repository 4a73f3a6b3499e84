use rand::Rng;

/// Pointer repulsion reaches this far (viewport units)
pub const REPULSION_RADIUS: f32 = 200.0;

/// Displacement applied per tick to a particle sitting right next to the pointer
pub const REPULSION_STRENGTH: f32 = 0.5;

/// Per-particle opacity baseline is drawn from [ALPHA_MIN, ALPHA_MIN + ALPHA_SPAN)
const ALPHA_MIN: f32 = 0.1;
const ALPHA_SPAN: f32 = 0.5;

/// A single drifting point in the field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Drawn radius, fixed for the particle's lifetime
    pub radius: f32,
    /// Opacity baseline in [0.1, 0.6), fixed at creation
    pub alpha: f32,
}

impl Particle {
    fn random<R: Rng + ?Sized>(rng: &mut R, width: f32, height: f32, speed: f32, size: f32) -> Self {
        Self {
            x: rng.gen::<f32>() * width,
            y: rng.gen::<f32>() * height,
            vx: (rng.gen::<f32>() - 0.5) * speed,
            vy: (rng.gen::<f32>() - 0.5) * speed,
            radius: rng.gen::<f32>() * size,
            alpha: ALPHA_MIN + rng.gen::<f32>() * ALPHA_SPAN,
        }
    }

    /// Euclidean distance to another particle
    pub fn distance_to(&self, other: &Particle) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// The simulated set of particles plus the viewport bounds they bounce in
#[derive(Debug, Clone)]
pub struct ParticleField {
    width: f32,
    height: f32,
    particles: Vec<Particle>,
}

impl ParticleField {
    /// Seed a field from the thread RNG
    pub fn create(width: f32, height: f32, count: usize, speed: f32, size: f32) -> Self {
        Self::create_with_rng(&mut rand::thread_rng(), width, height, count, speed, size)
    }

    /// Seed a field from the given RNG.
    ///
    /// Negative scalars are treated as zero, which yields stationary or
    /// zero-size particles rather than an error.
    pub fn create_with_rng<R: Rng + ?Sized>(
        rng: &mut R,
        width: f32,
        height: f32,
        count: usize,
        speed: f32,
        size: f32,
    ) -> Self {
        let speed = speed.max(0.0);
        let size = size.max(0.0);

        let particles = (0..count)
            .map(|_| Particle::random(rng, width, height, speed, size))
            .collect();

        Self {
            width,
            height,
            particles,
        }
    }

    /// Build a field from explicit particle states
    pub fn from_particles(width: f32, height: f32, particles: Vec<Particle>) -> Self {
        Self {
            width,
            height,
            particles,
        }
    }

    /// Advance every particle by one tick.
    ///
    /// Bounce only flips the velocity sign; the position is not clamped, so a
    /// particle can sit just outside the edge for one frame.
    pub fn step(&mut self, pointer: Option<(f32, f32)>) {
        let (width, height) = (self.width, self.height);

        for p in &mut self.particles {
            p.x += p.vx;
            p.y += p.vy;

            if p.x < 0.0 || p.x > width {
                p.vx = -p.vx;
            }
            if p.y < 0.0 || p.y > height {
                p.vy = -p.vy;
            }

            if let Some((px, py)) = pointer {
                let dx = px - p.x;
                let dy = py - p.y;
                let distance = (dx * dx + dy * dy).sqrt();

                // A particle exactly under the pointer has no direction to flee in
                if distance > 0.0 && distance < REPULSION_RADIUS {
                    let force = (REPULSION_RADIUS - distance) / REPULSION_RADIUS;
                    p.x -= dx / distance * force * REPULSION_STRENGTH;
                    p.y -= dy / distance * force * REPULSION_STRENGTH;
                }
            }
        }
    }

    /// Update the bounce bounds. Particles are left where they are.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }
}
