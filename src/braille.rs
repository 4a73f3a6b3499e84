use crate::color::{to_terminal, Rgba};
use crate::surface::Surface;
use ratatui::style::Color;

/// Braille character rendering for high-resolution terminal graphics.
/// Each Braille character represents a 2x4 grid of dots (8 dots total).
///
/// Dot positions and their bit values:
/// ```text
/// (0,0)=0x01  (1,0)=0x08
/// (0,1)=0x02  (1,1)=0x10
/// (0,2)=0x04  (1,2)=0x20
/// (0,3)=0x40  (1,3)=0x80
/// ```
///
/// Unicode Braille patterns: U+2800 to U+28FF (256 patterns)
const BRAILLE_BASE: u32 = 0x2800;

/// Dot position to bit mapping for Braille characters
const BRAILLE_DOTS: [[u8; 4]; 2] = [
    [0x01, 0x02, 0x04, 0x40], // Left column (x=0): rows 0,1,2,3
    [0x08, 0x10, 0x20, 0x80], // Right column (x=1): rows 0,1,2,3
];

/// Virtual pixels covered by one terminal cell. Roughly a real font cell,
/// so the field's distance constants read the same as on a pixel canvas.
pub const CELL_WIDTH_PX: f32 = 8.0;
pub const CELL_HEIGHT_PX: f32 = 16.0;

/// Virtual pixels covered by one braille dot (2x4 dots per cell)
const DOT_WIDTH_PX: f32 = CELL_WIDTH_PX / 2.0;
const DOT_HEIGHT_PX: f32 = CELL_HEIGHT_PX / 4.0;

/// A single rendered Braille cell with position and color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrailleCell {
    pub x: u16,
    pub y: u16,
    pub char: char,
    pub color: Color,
}

/// One braille dot: composited colour over a black background
#[derive(Debug, Clone, Copy, Default)]
struct Dot {
    lit: bool,
    rgb: [f32; 3],
}

impl Dot {
    fn blend(&mut self, color: Rgba) {
        let a = color.alpha();
        let src = [color.r as f32, color.g as f32, color.b as f32];
        for (dst, s) in self.rgb.iter_mut().zip(src) {
            *dst = s * a + *dst * (1.0 - a);
        }
        self.lit = true;
    }
}

/// A [`Surface`] backed by a grid of braille dots, sized in terminal cells
pub struct BrailleSurface {
    cols: u16,
    rows: u16,
    dots: Vec<Dot>,
}

impl BrailleSurface {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            dots: vec![Dot::default(); Self::dot_count(cols, rows)],
        }
    }

    fn dot_count(cols: u16, rows: u16) -> usize {
        cols as usize * 2 * rows as usize * 4
    }

    fn dot_width(&self) -> usize {
        self.cols as usize * 2
    }

    fn dot_height(&self) -> usize {
        self.rows as usize * 4
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// Resize to a terminal cell grid
    pub fn resize_cells(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.dots = vec![Dot::default(); Self::dot_count(cols, rows)];
    }

    fn dot_mut(&mut self, dx: i64, dy: i64) -> Option<&mut Dot> {
        if dx < 0 || dy < 0 || dx as usize >= self.dot_width() || dy as usize >= self.dot_height() {
            return None;
        }
        let idx = dy as usize * self.dot_width() + dx as usize;
        self.dots.get_mut(idx)
    }

    fn plot(&mut self, dx: i64, dy: i64, color: Rgba) {
        if let Some(dot) = self.dot_mut(dx, dy) {
            dot.blend(color);
        }
    }

    /// Render lit dots to Braille characters, averaging the colour of lit dots per cell
    pub fn cells(&self) -> Vec<BrailleCell> {
        let dot_width = self.dot_width();
        let mut cells = Vec::new();

        for cy in 0..self.rows {
            for cx in 0..self.cols {
                let mut pattern: u8 = 0;
                let mut total = [0.0f32; 3];
                let mut dot_count: usize = 0;

                let base_dx = cx as usize * 2;
                let base_dy = cy as usize * 4;

                for (col, bits) in BRAILLE_DOTS.iter().enumerate() {
                    for (row, bit) in bits.iter().enumerate() {
                        let dot = self.dots[(base_dy + row) * dot_width + base_dx + col];
                        if dot.lit {
                            pattern |= bit;
                            dot_count += 1;
                            for (t, c) in total.iter_mut().zip(dot.rgb) {
                                *t += c;
                            }
                        }
                    }
                }

                // Only emit cells that have at least one dot
                if pattern != 0 {
                    let braille_char = char::from_u32(BRAILLE_BASE + pattern as u32).unwrap_or(' ');
                    let n = dot_count as f32;
                    cells.push(BrailleCell {
                        x: cx,
                        y: cy,
                        char: braille_char,
                        color: to_terminal([total[0] / n, total[1] / n, total[2] / n]),
                    });
                }
            }
        }

        cells
    }
}

impl Surface for BrailleSurface {
    fn width(&self) -> f32 {
        self.cols as f32 * CELL_WIDTH_PX
    }

    fn height(&self) -> f32 {
        self.rows as f32 * CELL_HEIGHT_PX
    }

    /// Round up to whole cells
    fn set_size(&mut self, width: f32, height: f32) {
        let cols = (width.max(0.0) / CELL_WIDTH_PX).ceil() as u16;
        let rows = (height.max(0.0) / CELL_HEIGHT_PX).ceil() as u16;
        self.resize_cells(cols, rows);
    }

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let x0 = (x / DOT_WIDTH_PX).floor().max(0.0) as usize;
        let y0 = (y / DOT_HEIGHT_PX).floor().max(0.0) as usize;
        let x1 = (((x + width) / DOT_WIDTH_PX).ceil().max(0.0) as usize).min(self.dot_width());
        let y1 = (((y + height) / DOT_HEIGHT_PX).ceil().max(0.0) as usize).min(self.dot_height());

        let dot_width = self.dot_width();
        for dy in y0..y1 {
            for dx in x0..x1 {
                self.dots[dy * dot_width + dx] = Dot::default();
            }
        }
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba) {
        if !cx.is_finite() || !cy.is_finite() {
            return;
        }

        // The dot under the centre is always lit so tiny particles stay visible
        let center_dx = (cx / DOT_WIDTH_PX).floor() as i64;
        let center_dy = (cy / DOT_HEIGHT_PX).floor() as i64;
        self.plot(center_dx, center_dy, color);

        let r = radius.max(0.0);
        let min_dx = ((cx - r) / DOT_WIDTH_PX).floor() as i64;
        let max_dx = ((cx + r) / DOT_WIDTH_PX).floor() as i64;
        let min_dy = ((cy - r) / DOT_HEIGHT_PX).floor() as i64;
        let max_dy = ((cy + r) / DOT_HEIGHT_PX).floor() as i64;

        for dy in min_dy..=max_dy {
            for dx in min_dx..=max_dx {
                if dx == center_dx && dy == center_dy {
                    continue;
                }
                let px = (dx as f32 + 0.5) * DOT_WIDTH_PX - cx;
                let py = (dy as f32 + 0.5) * DOT_HEIGHT_PX - cy;
                if px * px + py * py <= r * r {
                    self.plot(dx, dy, color);
                }
            }
        }
    }

    /// DDA walk in dot space. Sub-dot widths still light one dot per step.
    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgba, _line_width: f32) {
        let (x0, y0) = (from.0 / DOT_WIDTH_PX, from.1 / DOT_HEIGHT_PX);
        let (x1, y1) = (to.0 / DOT_WIDTH_PX, to.1 / DOT_HEIGHT_PX);
        if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) {
            return;
        }

        let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0) as usize;
        let step_x = (x1 - x0) / steps as f32;
        let step_y = (y1 - y0) / steps as f32;

        let mut last = None;
        for i in 0..=steps {
            let dx = (x0 + step_x * i as f32).floor() as i64;
            let dy = (y0 + step_y * i as f32).floor() as i64;
            // Don't blend the same dot twice in a row
            if last != Some((dx, dy)) {
                self.plot(dx, dy, color);
                last = Some((dx, dy));
            }
        }
    }
}

/// Convert a terminal cell position to the viewport point at its centre
pub fn cell_center_px(col: u16, row: u16) -> (f32, f32) {
    (
        (col as f32 + 0.5) * CELL_WIDTH_PX,
        (row as f32 + 0.5) * CELL_HEIGHT_PX,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    #[test]
    fn test_braille_pattern() {
        // Test that single dot patterns work correctly
        assert_eq!(BRAILLE_DOTS[0][0], 0x01); // Top-left
        assert_eq!(BRAILLE_DOTS[1][0], 0x08); // Top-right
        assert_eq!(BRAILLE_DOTS[0][3], 0x40); // Bottom-left
        assert_eq!(BRAILLE_DOTS[1][3], 0x80); // Bottom-right

        // All dots should give 0xFF
        let all_dots: u8 = BRAILLE_DOTS[0].iter().sum::<u8>() + BRAILLE_DOTS[1].iter().sum::<u8>();
        assert_eq!(all_dots, 0xFF);
    }

    #[test]
    fn test_surface_dimensions_in_pixels() {
        let mut surface = BrailleSurface::new(80, 24);
        assert_eq!(surface.width(), 640.0);
        assert_eq!(surface.height(), 384.0);

        surface.set_size(100.0, 40.0);
        assert_eq!((surface.cols(), surface.rows()), (13, 3));
    }

    #[test]
    fn test_tiny_circle_lights_one_dot() {
        let mut surface = BrailleSurface::new(4, 2);
        surface.fill_circle(1.0, 1.0, 0.0, Rgb::WHITE.with_opacity(255));

        let cells = surface.cells();
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].char, '\u{2801}');
        assert_eq!(cells[0].color, Color::Rgb(255, 255, 255));
    }

    #[test]
    fn test_alpha_dims_color() {
        let mut surface = BrailleSurface::new(1, 1);
        surface.fill_circle(1.0, 1.0, 0.0, Rgb::WHITE.with_opacity(0x80));
        let cells = surface.cells();
        assert_eq!(cells[0].color, Color::Rgb(128, 128, 128));
    }

    #[test]
    fn test_line_spans_cells() {
        let mut surface = BrailleSurface::new(10, 1);
        surface.stroke_line((2.0, 2.0), (78.0, 2.0), Rgb::WHITE.with_opacity(255), 0.5);

        let cells = surface.cells();
        assert_eq!(cells.len(), 10);
        // Top row of both columns in every cell
        assert!(cells.iter().all(|c| c.char == '\u{2809}'));
    }

    #[test]
    fn test_clear_rect_and_clear() {
        let mut surface = BrailleSurface::new(4, 1);
        surface.stroke_line((0.0, 0.0), (31.0, 0.0), Rgb::WHITE.with_opacity(255), 0.5);
        assert_eq!(surface.cells().len(), 4);

        surface.clear_rect(0.0, 0.0, 16.0, 16.0);
        assert_eq!(surface.cells().len(), 2);

        surface.clear();
        assert!(surface.cells().is_empty());
    }

    #[test]
    fn test_out_of_bounds_drawing_is_ignored() {
        let mut surface = BrailleSurface::new(2, 2);
        surface.fill_circle(-1.0, -1.0, 0.5, Rgb::WHITE.with_opacity(255));
        surface.fill_circle(1000.0, 5.0, 2.0, Rgb::WHITE.with_opacity(255));
        surface.stroke_line((-50.0, -50.0), (-10.0, -10.0), Rgb::WHITE.with_opacity(255), 0.5);
        assert!(surface.cells().is_empty());
    }

    #[test]
    fn test_cell_center_px() {
        assert_eq!(cell_center_px(0, 0), (4.0, 8.0));
        assert_eq!(cell_center_px(10, 2), (84.0, 40.0));
    }
}
