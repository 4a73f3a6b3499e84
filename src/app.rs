use crate::braille::{self, BrailleSurface, CELL_HEIGHT_PX, CELL_WIDTH_PX};
use crate::color::ColorScheme;
use crate::config::AppConfig;
use crate::error::RenderError;
use crate::renderer::{FieldRenderer, Signals};
use crate::settings::FieldConfiguration;
use std::path::PathBuf;

/// Focus state for parameter editing in the status bar
/// Alphabetically ordered for consistent UI display
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Focus {
    #[default]
    None,
    Color,
    Count,
    Links,
    Repulsion,
    Size,
    Speed,
    Visible,
}

impl Focus {
    /// Tab cycles through parameters in alphabetical order
    pub fn next(&self) -> Focus {
        match self {
            Focus::None => Focus::Color,
            Focus::Color => Focus::Count,
            Focus::Count => Focus::Links,
            Focus::Links => Focus::Repulsion,
            Focus::Repulsion => Focus::Size,
            Focus::Size => Focus::Speed,
            Focus::Speed => Focus::Visible,
            Focus::Visible => Focus::Color, // Loop back
        }
    }

    /// Shift+Tab cycles through parameters in reverse alphabetical order
    pub fn prev(&self) -> Focus {
        match self {
            Focus::None => Focus::Visible,
            Focus::Color => Focus::Visible, // Loop back
            Focus::Count => Focus::Color,
            Focus::Links => Focus::Count,
            Focus::Repulsion => Focus::Links,
            Focus::Size => Focus::Repulsion,
            Focus::Speed => Focus::Size,
            Focus::Visible => Focus::Speed,
        }
    }

    pub fn is_param(&self) -> bool {
        !matches!(self, Focus::None)
    }
}

/// Main application state
pub struct App {
    pub renderer: FieldRenderer<BrailleSurface>,
    /// Palette entry matching the configured colour; `None` for a custom hex value
    pub color_scheme: Option<ColorScheme>,
    pub focus: Focus,
    pub status_bar: bool,
    pub show_help: bool,
    pub help_scroll: u16,
    /// One-line feedback shown in the status bar (e.g. after saving)
    pub status_message: Option<String>,
    config_path: Option<PathBuf>,
    signals: Signals,
}

impl App {
    pub fn new(canvas_width: u16, canvas_height: u16, config: &AppConfig, config_path: Option<PathBuf>) -> Self {
        let mut renderer = FieldRenderer::new(BrailleSurface::new(canvas_width, canvas_height));
        // Stored until start; lets the status bar show settings even if start fails
        renderer.reconfigure(config.field.clone());

        Self {
            renderer,
            color_scheme: ColorScheme::from_hex(&config.field.particle_color),
            focus: Focus::None,
            status_bar: config.status_bar,
            show_help: false,
            help_scroll: 0,
            status_message: None,
            config_path,
            signals: Signals::NONE,
        }
    }

    /// Start the renderer with whichever viewport signals the terminal provides
    pub fn start(&mut self, signals: Signals) -> Result<(), RenderError> {
        self.signals = signals;
        let config = self.renderer.config().clone();
        self.renderer.start(config, signals)
    }

    /// Run one frame. Returns whether the field wants another frame.
    pub fn tick(&mut self) -> bool {
        self.renderer.tick()
    }

    /// Stop and start again with a freshly seeded field
    pub fn restart(&mut self) -> Result<(), RenderError> {
        self.renderer.stop();
        let config = self.renderer.config().clone();
        self.renderer.start(config, self.signals)
    }

    pub fn config(&self) -> &FieldConfiguration {
        self.renderer.config()
    }

    /// Apply an edit to a copy of the live configuration and hand it to the renderer
    fn update_config(&mut self, edit: impl FnOnce(&mut FieldConfiguration)) {
        let mut config = self.renderer.config().clone();
        edit(&mut config);
        self.renderer.reconfigure(config);
    }

    /// Handle adjusting the currently focused parameter
    pub fn adjust_focused_up(&mut self) {
        match self.focus {
            Focus::None => {}
            Focus::Color => self.cycle_color(),
            Focus::Count => self.adjust_count(10),
            Focus::Links => self.toggle_links(),
            Focus::Repulsion => self.toggle_repulsion(),
            Focus::Size => self.adjust_size(0.5),
            Focus::Speed => self.adjust_speed(0.1),
            Focus::Visible => self.toggle_visible(),
        }
    }

    /// Handle adjusting the currently focused parameter
    pub fn adjust_focused_down(&mut self) {
        match self.focus {
            Focus::None => {}
            Focus::Color => self.cycle_color_prev(),
            Focus::Count => self.adjust_count(-10),
            Focus::Links => self.toggle_links(),
            Focus::Repulsion => self.toggle_repulsion(),
            Focus::Size => self.adjust_size(-0.5),
            Focus::Speed => self.adjust_speed(-0.1),
            Focus::Visible => self.toggle_visible(),
        }
    }

    /// Cycle to next focus
    pub fn next_focus(&mut self) {
        self.focus = self.focus.next();
    }

    /// Navigate to previous parameter (Shift+Tab)
    pub fn prev_focus(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn adjust_count(&mut self, delta: i32) {
        self.update_config(|c| c.adjust_count(delta));
    }

    pub fn adjust_speed(&mut self, delta: f32) {
        self.update_config(|c| c.adjust_speed(delta));
    }

    pub fn adjust_size(&mut self, delta: f32) {
        self.update_config(|c| c.adjust_size(delta));
    }

    pub fn toggle_links(&mut self) {
        self.update_config(FieldConfiguration::toggle_links);
    }

    pub fn toggle_repulsion(&mut self) {
        self.update_config(FieldConfiguration::toggle_repulsion);
    }

    pub fn toggle_visible(&mut self) {
        self.update_config(FieldConfiguration::toggle_visible);
    }

    /// Cycle particle colour. A custom colour moves onto the palette at its start.
    pub fn cycle_color(&mut self) {
        let scheme = self.color_scheme.map_or_else(ColorScheme::default, |s| s.next());
        self.set_color_scheme(scheme);
    }

    /// Cycle particle colour backward
    pub fn cycle_color_prev(&mut self) {
        let scheme = self.color_scheme.unwrap_or_default().prev();
        self.set_color_scheme(scheme);
    }

    fn set_color_scheme(&mut self, scheme: ColorScheme) {
        self.color_scheme = Some(scheme);
        self.update_config(|c| c.particle_color = scheme.hex().to_string());
    }

    /// Palette name, or the raw hex value for a custom colour
    pub fn color_label(&self) -> String {
        match self.color_scheme {
            Some(scheme) => scheme.name().to_string(),
            None => self.config().particle_color.clone(),
        }
    }

    /// Toggle the status bar; the canvas size changes with it
    pub fn toggle_status_bar(&mut self, term_width: u16, term_height: u16) {
        self.status_bar = !self.status_bar;
        let (w, h) = crate::ui::get_canvas_size(term_width, term_height, self.status_bar);
        self.resize(w, h);
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        if self.show_help {
            self.help_scroll = 0; // Reset scroll when opening
        }
    }

    /// Scroll help content up
    pub fn scroll_help_up(&mut self) {
        self.help_scroll = self.help_scroll.saturating_sub(1);
    }

    /// Scroll help content down
    pub fn scroll_help_down(&mut self, max_scroll: u16) {
        self.help_scroll = (self.help_scroll + 1).min(max_scroll);
    }

    /// Viewport changed: forward the new canvas size in viewport pixels
    pub fn resize(&mut self, canvas_width: u16, canvas_height: u16) {
        self.renderer.handle_resize(
            canvas_width as f32 * CELL_WIDTH_PX,
            canvas_height as f32 * CELL_HEIGHT_PX,
        );
    }

    /// Mouse moved to a terminal cell. Positions off the canvas count as leaving it.
    pub fn pointer_moved(&mut self, column: u16, row: u16) {
        let surface = self.renderer.surface();
        if column < surface.cols() && row < surface.rows() {
            let (x, y) = braille::cell_center_px(column, row);
            self.renderer.handle_pointer_move(x, y);
        } else {
            self.renderer.handle_pointer_leave();
        }
    }

    pub fn pointer_left(&mut self) {
        self.renderer.handle_pointer_leave();
    }

    /// Snapshot of the current settings as a config file
    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            field: self.renderer.config().clone(),
            status_bar: self.status_bar,
            ..Default::default()
        }
    }

    /// Write the current settings to the config path
    pub fn save_config(&mut self) {
        let message = match &self.config_path {
            Some(path) => match self.app_config().save_to_file(path) {
                Ok(()) => {
                    log::info!("Config saved to {}", path.display());
                    format!("Saved {}", path.display())
                }
                Err(e) => {
                    log::warn!("{}", e);
                    format!("Save failed: {}", e)
                }
            },
            None => "No config directory available".to_string(),
        };
        self.status_message = Some(message);
    }
}
