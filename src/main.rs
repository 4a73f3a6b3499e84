mod app;
mod braille;
mod clock;
mod color;
mod config;
mod error;
mod field;
mod renderer;
mod settings;
mod surface;
mod ui;

use app::App;
use clap::Parser;
use clock::FrameClock;
use config::AppConfig;
use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event, KeyCode,
        KeyEventKind, KeyModifiers, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use renderer::Signals;
use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(name = "starfield")]
#[command(about = "Drifting particle starfield with proximity links, rendered in the terminal")]
struct Args {
    /// Number of particles (10-300)
    #[arg(short = 'p', long)]
    particles: Option<usize>,

    /// Particle speed scalar (0.0-5.0)
    #[arg(short = 's', long)]
    speed: Option<f32>,

    /// Particle size scalar (1.0-5.0)
    #[arg(long)]
    size: Option<f32>,

    /// Particle colour as hex RGB, e.g. "#7dd3fc"
    #[arg(short = 'c', long)]
    color: Option<String>,

    /// Don't draw links between nearby particles
    #[arg(long = "no-links")]
    no_links: bool,

    /// Don't push particles away from the mouse
    #[arg(long = "no-repulsion")]
    no_repulsion: bool,

    /// Start with the field hidden
    #[arg(long)]
    hidden: bool,

    /// Config file to load and save (defaults to the user config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log file (defaults to the user cache dir)
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,
}

/// Route `log` output to a file; the terminal belongs to the UI
fn init_logging(path: Option<PathBuf>) {
    let path = path.or_else(|| dirs::cache_dir().map(|p| p.join("starfield").join("starfield.log")));
    let Some(path) = path else {
        return;
    };

    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }

    if let Ok(file) = File::create(&path) {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();
    }
}

/// Layer CLI flags over the loaded config, clamped to the slider ranges
fn apply_args(args: &Args, config: &mut AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let field = &mut config.field;

    if let Some(particles) = args.particles {
        field.particle_count = particles;
    }
    if let Some(speed) = args.speed {
        field.particle_speed = speed;
    }
    if let Some(size) = args.size {
        field.particle_size = size;
    }
    if let Some(color) = &args.color {
        // Reject a bad colour up front rather than silently drawing white
        color::Rgb::parse_hex(color)?;
        field.particle_color = color.clone();
    }
    if args.no_links {
        field.particle_links = false;
    }
    if args.no_repulsion {
        field.pointer_repulsion = false;
    }
    if args.hidden {
        field.show_particles = false;
    }

    config.field = config.field.clone().clamped();
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.log_file.clone());
    log::info!("Starfield starting");

    let config_path = args.config.clone().or_else(AppConfig::default_path);
    let mut config = AppConfig::load_or_default(config_path.as_deref())?;
    apply_args(&args, &mut config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Mouse and focus reporting are optional; without them the field runs without repulsion
    let pointer = match execute!(stdout, EnableMouseCapture, EnableFocusChange) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Mouse capture unavailable: {}", e);
            false
        }
    };

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Get initial terminal size and create app
    let size = terminal.size()?;
    let (canvas_width, canvas_height) = ui::get_canvas_size(size.width, size.height, config.status_bar);
    let mut app = App::new(canvas_width, canvas_height, &config, config_path);

    let res = app
        .start(Signals { pointer, ..Signals::ALL })
        .map_err(io::Error::other)
        .and_then(|()| run_app(&mut terminal, &mut app));

    app.renderer.stop();

    // Cleanup
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableFocusChange,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        log::error!("{}", err);
        eprintln!("Error: {}", err);
    }

    log::info!("Starfield exiting");
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    // Target ~60fps for smooth animation
    const FRAME_DURATION: Duration = Duration::from_millis(16);
    // How long to wait for input while the field is hidden
    const IDLE_POLL: Duration = Duration::from_millis(250);

    let mut clock = FrameClock::new(FRAME_DURATION, Instant::now());
    let mut animating = true;

    terminal.draw(|frame| ui::render(frame, app))?;

    loop {
        let timeout = if animating {
            clock.until_next(Instant::now())
        } else {
            IDLE_POLL
        };

        // Drain every pending event; input never advances the field by itself
        let mut had_events = false;
        if event::poll(timeout)? {
            loop {
                if handle_event(terminal, app, event::read()?)? {
                    return Ok(());
                }
                if !event::poll(Duration::ZERO)? {
                    break;
                }
            }
            had_events = true;
        }

        // At most one tick and one draw per frame while the field animates
        let frame_due = clock.frame_due(Instant::now());
        if frame_due {
            animating = app.tick();
        }

        if frame_due || (had_events && !animating) {
            terminal.draw(|frame| ui::render(frame, app))?;
        }
    }
}

/// Dispatch one terminal event. Returns true when the user asked to quit.
fn handle_event<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event: Event,
) -> io::Result<bool> {
    match event {
        // Only process Press events
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            // Handle Ctrl+C
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                return Ok(true);
            }

            app.status_message = None;

            match key.code {
                // System controls
                KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(true),
                KeyCode::Char(' ') => app.toggle_visible(),
                KeyCode::Char('r') | KeyCode::Char('R') => app.restart().map_err(io::Error::other)?,
                KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') => app.toggle_help(),
                KeyCode::Char('s') | KeyCode::Char('S') => app.save_config(),
                KeyCode::Char('b') | KeyCode::Char('B') => {
                    let size = terminal.size()?;
                    app.toggle_status_bar(size.width, size.height);
                }

                // Field parameters
                KeyCode::Char('l') | KeyCode::Char('L') => app.toggle_links(),
                KeyCode::Char('p') | KeyCode::Char('P') => app.toggle_repulsion(),
                KeyCode::Char('c') => app.cycle_color(),
                KeyCode::Char('C') => app.cycle_color_prev(),
                KeyCode::Char('+') | KeyCode::Char('=') => app.adjust_count(10),
                KeyCode::Char('-') | KeyCode::Char('_') => app.adjust_count(-10),
                KeyCode::Char(']') => app.adjust_speed(0.1),
                KeyCode::Char('[') => app.adjust_speed(-0.1),
                KeyCode::Char('.') | KeyCode::Char('>') => app.adjust_size(0.5),
                KeyCode::Char(',') | KeyCode::Char('<') => app.adjust_size(-0.5),

                // Navigation
                KeyCode::Tab => app.next_focus(),
                KeyCode::BackTab => app.prev_focus(),
                KeyCode::Up => {
                    if !app.show_help {
                        app.adjust_focused_up();
                    }
                }
                KeyCode::Down => {
                    if !app.show_help {
                        app.adjust_focused_down();
                    }
                }
                KeyCode::Char('j') | KeyCode::Char('J') => {
                    if app.show_help {
                        app.scroll_help_down(ui::HELP_CONTENT_LINES);
                    }
                }
                KeyCode::Char('k') | KeyCode::Char('K') => {
                    if app.show_help {
                        app.scroll_help_up();
                    }
                }
                KeyCode::Esc => {
                    if app.show_help {
                        app.toggle_help();
                    } else {
                        app.focus = app::Focus::None;
                    }
                }
                _ => {}
            }
        }
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => app.pointer_moved(mouse.column, mouse.row),
            _ => {}
        },
        Event::FocusLost => app.pointer_left(),
        Event::Resize(width, height) => {
            let (canvas_width, canvas_height) = ui::get_canvas_size(width, height, app.status_bar);
            app.resize(canvas_width, canvas_height);
        }
        _ => {}
    }
    Ok(false)
}
