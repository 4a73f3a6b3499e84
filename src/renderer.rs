use crate::color::{opacity_byte, Rgb};
use crate::error::RenderError;
use crate::field::ParticleField;
use crate::settings::FieldConfiguration;
use crate::surface::Surface;

/// Particles closer than this are joined by a link
pub const LINK_DISTANCE: f32 = 150.0;

/// Opacity byte of a link between two coincident particles
pub const LINK_MAX_OPACITY: f32 = 50.0;

/// Stroke width used for links
pub const LINK_WIDTH: f32 = 0.5;

/// Render loop state. There is no paused state: hiding the field stops it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderState {
    #[default]
    Stopped,
    Running,
}

/// Viewport signal sources the host can deliver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signals {
    pub resize: bool,
    pub pointer: bool,
}

impl Signals {
    pub const ALL: Signals = Signals {
        resize: true,
        pointer: true,
    };

    pub const NONE: Signals = Signals {
        resize: false,
        pointer: false,
    };
}

/// Opacity byte for a link of the given length, or None if the pair is too far apart
pub fn link_opacity(distance: f32) -> Option<u8> {
    if distance < LINK_DISTANCE {
        Some(((1.0 - distance / LINK_DISTANCE) * LINK_MAX_OPACITY).floor().max(0.0) as u8)
    } else {
        None
    }
}

/// Draw one frame of the field onto a cleared surface
pub fn draw_field<S: Surface + ?Sized>(surface: &mut S, field: &ParticleField, color: Rgb, links: bool) {
    let particles = field.particles();

    for (i, p) in particles.iter().enumerate() {
        surface.fill_circle(p.x, p.y, p.radius, color.with_opacity(opacity_byte(p.alpha)));

        if !links {
            continue;
        }

        for q in &particles[i + 1..] {
            if let Some(opacity) = link_opacity(p.distance_to(q)) {
                surface.stroke_line((p.x, p.y), (q.x, q.y), color.with_opacity(opacity), LINK_WIDTH);
            }
        }
    }
}

/// Owns the field, the surface it is drawn on, and the render loop lifecycle
pub struct FieldRenderer<S: Surface> {
    surface: S,
    config: FieldConfiguration,
    /// Parsed `config.particle_color`, white if it failed to parse
    color: Rgb,
    field: Option<ParticleField>,
    state: RenderState,
    /// Host called `start` and has not called `stop` since
    started: bool,
    subscriptions: Signals,
    pointer: Option<(f32, f32)>,
    frames: u64,
}

impl<S: Surface> FieldRenderer<S> {
    /// Bind a renderer to its drawing surface
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            config: FieldConfiguration::default(),
            color: Rgb::WHITE,
            field: None,
            state: RenderState::Stopped,
            started: false,
            subscriptions: Signals::NONE,
            pointer: None,
            frames: 0,
        }
    }

    /// Begin rendering. Calling start while already started is a no-op.
    ///
    /// Fails if the surface has no drawable area. Unavailable signal sources
    /// are not an error: the renderer simply runs without that adaptation.
    pub fn start(&mut self, config: FieldConfiguration, signals: Signals) -> Result<(), RenderError> {
        if self.started {
            return Ok(());
        }

        if !self.surface.is_drawable() {
            return Err(RenderError::InvalidSurface {
                width: self.surface.width(),
                height: self.surface.height(),
            });
        }

        if !signals.resize {
            log::warn!("Resize signal unavailable; field will not adapt to viewport changes");
        }
        if !signals.pointer {
            log::warn!("Pointer signal unavailable; repulsion disabled");
        }

        self.set_config(config);
        self.subscriptions = signals;
        self.started = true;

        if self.config.show_particles {
            self.begin();
        } else {
            self.surface.clear();
            log::info!("Renderer started hidden");
        }
        Ok(())
    }

    /// Stop rendering, drop the field and clear the surface. Idempotent.
    pub fn stop(&mut self) {
        if !self.started {
            return;
        }
        self.started = false;
        self.subscriptions = Signals::NONE;
        self.halt();
        log::info!("Renderer stopped after {} frames", self.frames);
    }

    /// Apply a new configuration snapshot.
    ///
    /// Count, speed or size changes reseed the field; everything else takes
    /// effect on the next tick.
    pub fn reconfigure(&mut self, config: FieldConfiguration) {
        let reseed = self.config.population_differs(&config);
        self.set_config(config);

        if !self.started {
            return;
        }

        match (self.state, self.config.show_particles) {
            (RenderState::Running, false) => {
                self.halt();
                log::info!("Field hidden");
            }
            (RenderState::Stopped, true) => self.begin(),
            (RenderState::Running, true) if reseed => {
                self.begin();
                if self.is_running() {
                    log::info!(
                        "Field rebuilt: {} particles, speed {:.1}, size {:.1}",
                        self.config.particle_count,
                        self.config.particle_speed,
                        self.config.particle_size
                    );
                }
            }
            _ => {}
        }
    }

    /// Run one frame: clear, step, draw.
    ///
    /// Returns whether the host should schedule another tick.
    pub fn tick(&mut self) -> bool {
        if self.state != RenderState::Running {
            return false;
        }

        let pointer = if self.config.pointer_repulsion {
            self.pointer
        } else {
            None
        };

        self.surface.clear();
        if let Some(field) = self.field.as_mut() {
            field.step(pointer);
            draw_field(&mut self.surface, field, self.color, self.config.particle_links);
        }
        self.frames += 1;

        self.state == RenderState::Running
    }

    /// Viewport resized: resize the surface and the field bounds, keep particles.
    ///
    /// A visible renderer that was parked on an empty viewport resumes once the
    /// viewport has area again.
    pub fn handle_resize(&mut self, width: f32, height: f32) {
        if !self.subscriptions.resize {
            return;
        }
        self.surface.set_size(width, height);
        if let Some(field) = self.field.as_mut() {
            field.resize(width, height);
        }
        log::debug!("Viewport resized to {}x{}", width, height);

        if self.started
            && self.config.show_particles
            && self.state == RenderState::Stopped
            && self.surface.is_drawable()
        {
            self.begin();
        }
    }

    /// Record the latest pointer position in viewport coordinates
    pub fn handle_pointer_move(&mut self, x: f32, y: f32) {
        if self.subscriptions.pointer {
            self.pointer = Some((x, y));
        }
    }

    /// Pointer left the tracked area; repulsion stops
    pub fn handle_pointer_leave(&mut self) {
        self.pointer = None;
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RenderState::Running
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn config(&self) -> &FieldConfiguration {
        &self.config
    }

    pub fn field(&self) -> Option<&ParticleField> {
        self.field.as_ref()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn pointer(&self) -> Option<(f32, f32)> {
        self.pointer
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn set_config(&mut self, config: FieldConfiguration) {
        self.color = match config.color() {
            Ok(color) => color,
            Err(e) => {
                log::warn!("{}; drawing in white", e);
                Rgb::WHITE
            }
        };
        self.config = config;
    }

    fn seed_field(&self) -> ParticleField {
        ParticleField::create(
            self.surface.width(),
            self.surface.height(),
            self.config.particle_count,
            self.config.particle_speed,
            self.config.particle_size,
        )
    }

    /// Seed a fresh field and enter the running state.
    ///
    /// An empty viewport leaves the renderer stopped with no field.
    fn begin(&mut self) {
        if !self.surface.is_drawable() {
            log::warn!(
                "Viewport {}x{} has no drawable area; waiting for a resize",
                self.surface.width(),
                self.surface.height()
            );
            self.halt();
            return;
        }
        self.field = Some(self.seed_field());
        self.state = RenderState::Running;
        log::info!(
            "Renderer running: {} particles on {}x{}",
            self.config.particle_count,
            self.surface.width(),
            self.surface.height()
        );
    }

    /// Leave the running state, dropping the field and clearing the surface
    fn halt(&mut self) {
        self.state = RenderState::Stopped;
        self.field = None;
        self.pointer = None;
        self.surface.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Particle;
    use crate::surface::recording::{DrawCall, RecordingSurface};
    use proptest::prelude::*;

    fn renderer() -> FieldRenderer<RecordingSurface> {
        FieldRenderer::new(RecordingSurface::new(800.0, 600.0))
    }

    fn still(x: f32, y: f32) -> Particle {
        Particle {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            radius: 1.0,
            alpha: 0.5,
        }
    }

    #[test]
    fn test_start_rejects_empty_surface() {
        let mut r = FieldRenderer::new(RecordingSurface::new(0.0, 600.0));
        let err = r.start(FieldConfiguration::default(), Signals::ALL).unwrap_err();
        assert_eq!(err, RenderError::InvalidSurface { width: 0.0, height: 600.0 });
        assert_eq!(r.state(), RenderState::Stopped);
        assert!(!r.tick());

        let mut r = FieldRenderer::new(RecordingSurface::new(f32::NAN, 600.0));
        assert!(r.start(FieldConfiguration::default(), Signals::ALL).is_err());
    }

    #[test]
    fn test_start_seeds_field_from_surface() {
        let mut r = renderer();
        r.start(FieldConfiguration::default(), Signals::ALL).unwrap();
        assert!(r.is_running());

        let field = r.field().unwrap();
        assert_eq!(field.len(), 80);
        assert_eq!((field.width(), field.height()), (800.0, 600.0));
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut r = renderer();
        r.start(FieldConfiguration::default(), Signals::ALL).unwrap();
        let before = r.field().unwrap().particles().to_vec();

        let other = FieldConfiguration {
            particle_count: 10,
            ..Default::default()
        };
        r.start(other, Signals::ALL).unwrap();
        assert_eq!(r.field().unwrap().particles(), before.as_slice());
        assert_eq!(r.config().particle_count, 80);
    }

    #[test]
    fn test_stop_clears_and_halts() {
        let mut r = renderer();
        r.start(FieldConfiguration::default(), Signals::ALL).unwrap();
        assert!(r.tick());
        r.handle_pointer_move(10.0, 10.0);

        r.stop();
        assert_eq!(r.state(), RenderState::Stopped);
        assert!(r.field().is_none());
        assert!(r.pointer().is_none());
        assert_eq!(r.surface().calls.last(), Some(&DrawCall::Clear(0.0, 0.0, 800.0, 600.0)));

        let calls = r.surface().calls.len();
        assert!(!r.tick());
        r.stop();
        assert_eq!(r.surface().calls.len(), calls, "no drawing after stop");
    }

    #[test]
    fn test_stop_then_start_reseeds() {
        let mut r = renderer();
        r.start(FieldConfiguration::default(), Signals::ALL).unwrap();
        let first = r.field().unwrap().particles().to_vec();

        r.stop();
        r.start(FieldConfiguration::default(), Signals::ALL).unwrap();
        let second = r.field().unwrap().particles().to_vec();

        assert_eq!(first.len(), second.len());
        assert_ne!(first, second);
    }

    #[test]
    fn test_empty_field_draws_cleared_frame() {
        let mut r = renderer();
        let config = FieldConfiguration {
            particle_count: 0,
            particle_speed: 1.0,
            particle_size: 2.0,
            ..Default::default()
        };
        r.start(config, Signals::ALL).unwrap();
        assert!(r.tick());

        assert_eq!(r.surface().calls, vec![DrawCall::Clear(0.0, 0.0, 800.0, 600.0)]);
        assert!(r.surface().last_frame().is_empty());
    }

    #[test]
    fn test_close_pair_gets_bright_link() {
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let field = ParticleField::from_particles(800.0, 600.0, vec![still(10.0, 10.0), still(20.0, 20.0)]);

        draw_field(&mut surface, &field, Rgb::WHITE, true);

        let lines = surface.lines();
        assert_eq!(lines.len(), 1);
        match lines[0] {
            DrawCall::Line { from, to, color, width } => {
                assert_eq!(*from, (10.0, 10.0));
                assert_eq!(*to, (20.0, 20.0));
                assert_eq!(color.a, 45, "distance 14.1 keeps ~90% of max opacity");
                assert_eq!(*width, LINK_WIDTH);
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[test]
    fn test_links_disabled_draws_points_only() {
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let field = ParticleField::from_particles(800.0, 600.0, vec![still(10.0, 10.0), still(20.0, 20.0)]);

        draw_field(&mut surface, &field, Rgb::WHITE, false);
        assert_eq!(surface.circles().len(), 2);
        assert!(surface.lines().is_empty());
    }

    #[test]
    fn test_pairs_drawn_once() {
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let field = ParticleField::from_particles(
            800.0,
            600.0,
            vec![still(100.0, 100.0), still(110.0, 100.0), still(120.0, 100.0), still(700.0, 500.0)],
        );

        draw_field(&mut surface, &field, Rgb::WHITE, true);

        // Three close particles form three pairs; the far one has none
        let lines = surface.lines();
        assert_eq!(lines.len(), 3);
        for (a, b) in [((100.0, 100.0), (110.0, 100.0)), ((100.0, 100.0), (120.0, 100.0)), ((110.0, 100.0), (120.0, 100.0))] {
            let forward = lines
                .iter()
                .filter(|c| matches!(c, DrawCall::Line { from, to, .. } if *from == a && *to == b))
                .count();
            let backward = lines
                .iter()
                .filter(|c| matches!(c, DrawCall::Line { from, to, .. } if *from == b && *to == a))
                .count();
            assert_eq!((forward, backward), (1, 0));
        }
    }

    #[test]
    fn test_particle_color_carries_alpha_suffix() {
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let mut p = still(50.0, 50.0);
        p.alpha = 0.6;
        let field = ParticleField::from_particles(800.0, 600.0, vec![p]);

        draw_field(&mut surface, &field, Rgb::parse_hex("#7dd3fc").unwrap(), true);
        match surface.circles()[0] {
            DrawCall::Circle { color, radius, .. } => {
                assert_eq!(color.to_string(), "#7dd3fc99");
                assert_eq!(*radius, 1.0);
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[test]
    fn test_link_opacity_edges() {
        assert_eq!(link_opacity(0.0), Some(50));
        assert_eq!(link_opacity(149.99), Some(0));
        assert_eq!(link_opacity(LINK_DISTANCE), None);
        assert_eq!(link_opacity(500.0), None);
    }

    #[test]
    fn test_reconfigure_cosmetic_keeps_particles() {
        let mut r = renderer();
        r.start(FieldConfiguration::default(), Signals::ALL).unwrap();
        let before = r.field().unwrap().particles().to_vec();

        let config = FieldConfiguration {
            particle_color: "#fb7185".to_string(),
            particle_links: false,
            pointer_repulsion: false,
            ..Default::default()
        };
        r.reconfigure(config);

        assert!(r.is_running());
        assert_eq!(r.field().unwrap().particles(), before.as_slice());
        assert!(!r.config().particle_links);
    }

    #[test]
    fn test_reconfigure_count_rebuilds() {
        let mut r = renderer();
        r.start(FieldConfiguration::default(), Signals::ALL).unwrap();

        let config = FieldConfiguration {
            particle_count: 120,
            ..Default::default()
        };
        r.reconfigure(config);
        assert_eq!(r.field().unwrap().len(), 120);
        assert!(r.is_running());
    }

    #[test]
    fn test_reconfigure_speed_rebuilds_with_current_surface_size() {
        let mut r = renderer();
        r.start(FieldConfiguration::default(), Signals::ALL).unwrap();
        r.handle_resize(400.0, 200.0);

        let config = FieldConfiguration {
            particle_speed: 0.0,
            ..Default::default()
        };
        r.reconfigure(config);

        let field = r.field().unwrap();
        assert_eq!((field.width(), field.height()), (400.0, 200.0));
        assert!(field.particles().iter().all(|p| p.vx == 0.0 && p.vy == 0.0));
        assert!(field.particles().iter().all(|p| p.x <= 400.0 && p.y <= 200.0));
    }

    #[test]
    fn test_hide_stops_and_show_restarts_fresh() {
        let mut r = renderer();
        r.start(FieldConfiguration::default(), Signals::ALL).unwrap();
        let before = r.field().unwrap().particles().to_vec();

        r.reconfigure(FieldConfiguration {
            show_particles: false,
            ..Default::default()
        });
        assert_eq!(r.state(), RenderState::Stopped);
        assert!(r.field().is_none());
        assert!(!r.tick());
        assert!(matches!(r.surface().calls.last(), Some(DrawCall::Clear(..))));

        r.reconfigure(FieldConfiguration::default());
        assert!(r.is_running());
        assert_ne!(r.field().unwrap().particles(), before.as_slice());
    }

    #[test]
    fn test_start_hidden_then_show() {
        let mut r = renderer();
        r.start(
            FieldConfiguration {
                show_particles: false,
                ..Default::default()
            },
            Signals::ALL,
        )
        .unwrap();
        assert!(r.is_started());
        assert!(!r.is_running());

        r.reconfigure(FieldConfiguration::default());
        assert!(r.is_running());
    }

    #[test]
    fn test_reconfigure_before_start_only_stores() {
        let mut r = renderer();
        r.reconfigure(FieldConfiguration {
            particle_count: 30,
            ..Default::default()
        });
        assert!(!r.is_running());
        assert!(r.field().is_none());
        assert_eq!(r.config().particle_count, 30);
    }

    #[test]
    fn test_invalid_color_falls_back_to_white() {
        let mut r = renderer();
        r.start(
            FieldConfiguration {
                particle_count: 1,
                particle_color: "chartreuse".to_string(),
                ..Default::default()
            },
            Signals::ALL,
        )
        .unwrap();
        assert!(r.tick());

        match r.surface().circles()[0] {
            DrawCall::Circle { color, .. } => assert_eq!((color.r, color.g, color.b), (255, 255, 255)),
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[test]
    fn test_resize_updates_surface_and_bounds_without_reseed() {
        let mut r = renderer();
        r.start(FieldConfiguration::default(), Signals::ALL).unwrap();
        let before = r.field().unwrap().particles().to_vec();

        r.handle_resize(1024.0, 768.0);
        assert_eq!((r.surface().width, r.surface().height), (1024.0, 768.0));
        let field = r.field().unwrap();
        assert_eq!((field.width(), field.height()), (1024.0, 768.0));
        assert_eq!(field.particles(), before.as_slice());
    }

    #[test]
    fn test_signals_ignored_when_unavailable() {
        let mut r = renderer();
        r.start(FieldConfiguration::default(), Signals::NONE).unwrap();

        r.handle_resize(100.0, 100.0);
        r.handle_pointer_move(5.0, 5.0);
        assert_eq!(r.surface().width, 800.0);
        assert!(r.pointer().is_none());
        assert!(r.tick(), "degraded mode still renders");
    }

    #[test]
    fn test_signals_ignored_after_stop() {
        let mut r = renderer();
        r.start(FieldConfiguration::default(), Signals::ALL).unwrap();
        r.stop();
        r.handle_pointer_move(5.0, 5.0);
        r.handle_resize(100.0, 100.0);
        assert!(r.pointer().is_none());
        assert_eq!(r.surface().width, 800.0);
    }

    #[test]
    fn test_pointer_repels_on_next_tick() {
        let mut r = renderer();
        r.start(FieldConfiguration::default(), Signals::ALL).unwrap();
        // Replace the random field with a still particle so the push is the only motion
        r.field = Some(ParticleField::from_particles(800.0, 600.0, vec![still(400.0, 300.0)]));

        r.handle_pointer_move(300.0, 300.0);
        r.handle_pointer_move(350.0, 300.0);
        assert_eq!(r.pointer(), Some((350.0, 300.0)), "last value wins");
        r.tick();
        assert!(r.field().unwrap().particles()[0].x > 400.0);

        r.handle_pointer_leave();
        let x = r.field().unwrap().particles()[0].x;
        r.tick();
        assert_eq!(r.field().unwrap().particles()[0].x, x);
    }

    #[test]
    fn test_repulsion_flag_disables_push() {
        let mut r = renderer();
        r.start(
            FieldConfiguration {
                pointer_repulsion: false,
                ..Default::default()
            },
            Signals::ALL,
        )
        .unwrap();
        r.field = Some(ParticleField::from_particles(800.0, 600.0, vec![still(400.0, 300.0)]));

        r.handle_pointer_move(390.0, 300.0);
        r.tick();
        assert_eq!(r.field().unwrap().particles()[0].x, 400.0);
    }

    #[test]
    fn test_tick_counts_frames() {
        let mut r = renderer();
        r.start(FieldConfiguration::default(), Signals::ALL).unwrap();
        for _ in 0..5 {
            assert!(r.tick());
        }
        assert_eq!(r.frames(), 5);
    }

    #[test]
    fn test_show_on_empty_viewport_waits_for_resize() {
        let mut r = renderer();
        r.start(FieldConfiguration::default(), Signals::ALL).unwrap();
        r.handle_resize(800.0, 0.0);

        r.reconfigure(FieldConfiguration {
            show_particles: false,
            ..Default::default()
        });
        r.reconfigure(FieldConfiguration::default());
        assert_eq!(r.state(), RenderState::Stopped);
        assert!(r.field().is_none());
        assert!(!r.tick());

        r.handle_resize(800.0, 600.0);
        assert!(r.is_running());
        let field = r.field().unwrap();
        assert_eq!((field.width(), field.height()), (800.0, 600.0));
        assert_eq!(field.len(), 80);
    }

    #[test]
    fn test_rebuild_on_empty_viewport_stops() {
        let mut r = renderer();
        r.start(FieldConfiguration::default(), Signals::ALL).unwrap();
        r.handle_resize(0.0, 600.0);

        r.reconfigure(FieldConfiguration {
            particle_count: 40,
            ..Default::default()
        });
        assert!(!r.is_running());
        assert!(r.field().is_none());
    }

    #[test]
    fn test_resize_does_not_resume_hidden_field() {
        let mut r = renderer();
        r.start(
            FieldConfiguration {
                show_particles: false,
                ..Default::default()
            },
            Signals::ALL,
        )
        .unwrap();
        r.handle_resize(640.0, 480.0);
        assert!(!r.is_running());
    }

    proptest! {
        #[test]
        fn prop_link_opacity_non_increasing(a in 0.0f32..200.0, b in 0.0f32..200.0) {
            let (near, far) = if a <= b { (a, b) } else { (b, a) };
            let near_opacity = link_opacity(near).unwrap_or(0);
            let far_opacity = link_opacity(far).unwrap_or(0);
            prop_assert!(near_opacity >= far_opacity);
        }
    }
}
