use crate::error::ConfigError;
use ratatui::style::Color;
use std::fmt;

/// An opaque RGB colour parsed from a `#rrggbb` (or `#rgb`) hex string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex colour. Accepts `#rrggbb`, `#rgb`, with or without the `#`.
    pub fn parse_hex(s: &str) -> Result<Self, ConfigError> {
        let digits = s.trim().trim_start_matches('#');
        let invalid = || ConfigError::Color(s.to_string());

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        match digits.len() {
            6 => {
                let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
                Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
            }
            3 => {
                // #abc expands to #aabbcc
                let channel = |i: usize| {
                    u8::from_str_radix(&digits[i..i + 1], 16)
                        .map(|v| v * 17)
                        .map_err(|_| invalid())
                };
                Ok(Rgb::new(channel(0)?, channel(1)?, channel(2)?))
            }
            _ => Err(invalid()),
        }
    }

    /// Append a two-hex-digit opacity suffix, e.g. `#ffffff` + 0x80 -> `#ffffff80`
    pub fn with_opacity(self, opacity: u8) -> Rgba {
        Rgba {
            r: self.r,
            g: self.g,
            b: self.b,
            a: opacity,
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// RGB plus an 8-bit opacity, displayed as `#rrggbbaa`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Opacity as a 0.0-1.0 factor
    pub fn alpha(&self) -> f32 {
        self.a as f32 / 255.0
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

/// Convert a 0.0-1.0 opacity to its suffix byte (floored, like the canvas hex strings)
pub fn opacity_byte(opacity: f32) -> u8 {
    (opacity.clamp(0.0, 1.0) * 255.0).floor() as u8
}

/// Convert a composited float colour (0.0-255.0 per channel) to a terminal colour
pub fn to_terminal(rgb: [f32; 3]) -> Color {
    let c = |v: f32| v.round().clamp(0.0, 255.0) as u8;
    Color::Rgb(c(rgb[0]), c(rgb[1]), c(rgb[2]))
}

/// Named particle colours the host can cycle through
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ColorScheme {
    #[default]
    White,
    Ice,
    Amber,
    Mint,
    Rose,
    Violet,
}

impl ColorScheme {
    pub fn name(&self) -> &str {
        match self {
            ColorScheme::White => "White",
            ColorScheme::Ice => "Ice",
            ColorScheme::Amber => "Amber",
            ColorScheme::Mint => "Mint",
            ColorScheme::Rose => "Rose",
            ColorScheme::Violet => "Violet",
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            ColorScheme::White => "#ffffff",
            ColorScheme::Ice => "#7dd3fc",
            ColorScheme::Amber => "#fbbf24",
            ColorScheme::Mint => "#6ee7b7",
            ColorScheme::Rose => "#fb7185",
            ColorScheme::Violet => "#a78bfa",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ColorScheme::White => ColorScheme::Ice,
            ColorScheme::Ice => ColorScheme::Amber,
            ColorScheme::Amber => ColorScheme::Mint,
            ColorScheme::Mint => ColorScheme::Rose,
            ColorScheme::Rose => ColorScheme::Violet,
            ColorScheme::Violet => ColorScheme::White,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            ColorScheme::White => ColorScheme::Violet,
            ColorScheme::Ice => ColorScheme::White,
            ColorScheme::Amber => ColorScheme::Ice,
            ColorScheme::Mint => ColorScheme::Amber,
            ColorScheme::Rose => ColorScheme::Mint,
            ColorScheme::Violet => ColorScheme::Rose,
        }
    }

    /// Find the scheme whose hex value matches, if any (case-insensitive)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let wanted = Rgb::parse_hex(hex).ok()?;
        [
            ColorScheme::White,
            ColorScheme::Ice,
            ColorScheme::Amber,
            ColorScheme::Mint,
            ColorScheme::Rose,
            ColorScheme::Violet,
        ]
        .into_iter()
        .find(|scheme| Rgb::parse_hex(scheme.hex()).ok() == Some(wanted))
    }
}
