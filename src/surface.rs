use crate::color::Rgba;

/// A 2D drawing target measured in viewport units
pub trait Surface {
    fn width(&self) -> f32;

    fn height(&self) -> f32;

    /// Change the pixel dimensions. Existing content may be discarded.
    fn set_size(&mut self, width: f32, height: f32);

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32);

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba);

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgba, line_width: f32);

    /// Clear the whole surface
    fn clear(&mut self) {
        let (w, h) = (self.width(), self.height());
        self.clear_rect(0.0, 0.0, w, h);
    }

    /// True when the surface has a positive, finite area to draw on
    fn is_drawable(&self) -> bool {
        let (w, h) = (self.width(), self.height());
        w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0
    }
}

/// Surface double that records every call, for renderer tests
#[cfg(test)]
pub mod recording {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum DrawCall {
        Resize(f32, f32),
        Clear(f32, f32, f32, f32),
        Circle { x: f32, y: f32, radius: f32, color: Rgba },
        Line { from: (f32, f32), to: (f32, f32), color: Rgba, width: f32 },
    }

    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        pub width: f32,
        pub height: f32,
        pub calls: Vec<DrawCall>,
    }

    impl RecordingSurface {
        pub fn new(width: f32, height: f32) -> Self {
            Self {
                width,
                height,
                calls: Vec::new(),
            }
        }

        pub fn circles(&self) -> Vec<&DrawCall> {
            self.calls
                .iter()
                .filter(|c| matches!(c, DrawCall::Circle { .. }))
                .collect()
        }

        pub fn lines(&self) -> Vec<&DrawCall> {
            self.calls
                .iter()
                .filter(|c| matches!(c, DrawCall::Line { .. }))
                .collect()
        }

        /// Calls issued since the most recent full clear
        pub fn last_frame(&self) -> &[DrawCall] {
            let start = self
                .calls
                .iter()
                .rposition(|c| matches!(c, DrawCall::Clear(..)))
                .map(|i| i + 1)
                .unwrap_or(0);
            &self.calls[start..]
        }
    }

    impl Surface for RecordingSurface {
        fn width(&self) -> f32 {
            self.width
        }

        fn height(&self) -> f32 {
            self.height
        }

        fn set_size(&mut self, width: f32, height: f32) {
            self.width = width;
            self.height = height;
            self.calls.push(DrawCall::Resize(width, height));
        }

        fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
            self.calls.push(DrawCall::Clear(x, y, width, height));
        }

        fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba) {
            self.calls.push(DrawCall::Circle {
                x: cx,
                y: cy,
                radius,
                color,
            });
        }

        fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgba, line_width: f32) {
            self.calls.push(DrawCall::Line {
                from,
                to,
                color,
                width: line_width,
            });
        }
    }
}
