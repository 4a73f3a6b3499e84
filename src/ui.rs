use crate::app::{App, Focus};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Height of the status bar under the field
const STATUS_BAR_HEIGHT: u16 = 1;

/// Max scroll for help content (generous to account for text wrapping on small screens)
pub const HELP_CONTENT_LINES: u16 = 30;

// UI color scheme
const BORDER_COLOR: Color = Color::Cyan;
const HIGHLIGHT_COLOR: Color = Color::Yellow;
const TEXT_COLOR: Color = Color::White;
const DIM_TEXT_COLOR: Color = Color::Gray;

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if app.status_bar {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(STATUS_BAR_HEIGHT)])
            .split(area);

        render_canvas(frame, layout[0], app);
        render_status_bar(frame, layout[1], app);
    } else {
        render_canvas(frame, area, app);
    }

    if app.show_help {
        render_help_overlay(frame, area, app);
    }
}

/// Calculate the canvas size in cells for a terminal of the given size
pub fn get_canvas_size(term_width: u16, term_height: u16, status_bar: bool) -> (u16, u16) {
    if status_bar {
        (term_width, term_height.saturating_sub(STATUS_BAR_HEIGHT))
    } else {
        (term_width, term_height)
    }
}

fn render_canvas(frame: &mut Frame, area: Rect, app: &App) {
    let buffer = frame.buffer_mut();

    for cell in app.renderer.surface().cells() {
        let x = area.x + cell.x;
        let y = area.y + cell.y;

        if x < area.x + area.width && y < area.y + area.height {
            if let Some(target) = buffer.cell_mut((x, y)) {
                target.set_char(cell.char).set_fg(cell.color);
            }
        }
    }
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let config = app.config();

    let (state_text, state_color) = if app.renderer.is_running() {
        ("● RUNNING", Color::Green)
    } else {
        ("○ HIDDEN", HIGHLIGHT_COLOR)
    };

    let on_off = |flag: bool| if flag { "on" } else { "off" };

    let param = |label: &str, value: String, focus: Focus| {
        let style = if app.focus == focus {
            Style::default().fg(HIGHLIGHT_COLOR)
        } else {
            Style::default().fg(TEXT_COLOR)
        };
        Span::styled(format!(" {}:{} ", label, value), style)
    };

    let mut spans = vec![
        Span::styled(format!(" {} ", state_text), Style::default().fg(state_color)),
        param("count", config.particle_count.to_string(), Focus::Count),
        param("speed", format!("{:.1}", config.particle_speed), Focus::Speed),
        param("size", format!("{:.1}", config.particle_size), Focus::Size),
        param("color", app.color_label(), Focus::Color),
        param("links", on_off(config.particle_links).to_string(), Focus::Links),
        param("push", on_off(config.pointer_repulsion).to_string(), Focus::Repulsion),
        param("show", on_off(config.show_particles).to_string(), Focus::Visible),
    ];

    match &app.status_message {
        Some(message) => spans.push(Span::styled(format!(" {}", message), Style::default().fg(BORDER_COLOR))),
        None => spans.push(Span::styled(" H help  Q quit", Style::default().fg(DIM_TEXT_COLOR))),
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect, app: &App) {
    // Center the help dialog
    let help_width = 52.min(area.width.saturating_sub(4));
    let help_height = area.height.saturating_sub(4).min(28);
    let x = (area.width.saturating_sub(help_width)) / 2;
    let y = (area.height.saturating_sub(help_height)) / 2;

    let help_area = Rect {
        x: area.x + x,
        y: area.y + y,
        width: help_width,
        height: help_height,
    };

    // Clear the background
    frame.render_widget(Clear, help_area);

    let key_line = |key: &str, desc: &str| {
        Line::from(vec![
            Span::styled(format!("{:>7}", key), Style::default().fg(HIGHLIGHT_COLOR)),
            Span::styled(format!("  {}", desc), Style::default().fg(DIM_TEXT_COLOR)),
        ])
    };

    let content = vec![
        Line::from(""),
        Line::from(Span::styled("STARFIELD", Style::default().fg(BORDER_COLOR))),
        Line::from(""),
        Line::from("Particles drift and bounce off the edges. Nearby pairs are linked, and the mouse pushes particles away."),
        Line::from(""),
        key_line("Space", "show / hide field"),
        key_line("L", "toggle links"),
        key_line("P", "toggle mouse push"),
        key_line("C", "cycle colour"),
        key_line("+/-", "particle count"),
        key_line("]/[", "speed"),
        key_line(">/<", "size"),
        key_line("R", "reseed field"),
        key_line("Tab", "focus parameter"),
        key_line("Up/Down", "adjust focused"),
        key_line("B", "status bar"),
        key_line("S", "save config"),
        key_line("H", "help"),
        key_line("Q", "quit"),
        Line::from(""),
    ];

    let content_height = content.len() as u16;
    let visible_height = help_height.saturating_sub(2); // minus borders
    let max_scroll = content_height.saturating_sub(visible_height);

    // Update title to show scroll hint if scrollable
    let title = if max_scroll > 0 {
        " Help (J/K scroll, H to close) "
    } else {
        " Help (H to close) "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(HIGHLIGHT_COLOR))
        .title(title);

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.help_scroll, 0));

    frame.render_widget(paragraph, help_area);
}
