//! Error types for the starfield.

use std::fmt;

/// Errors raised by the field renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// The bound drawing surface has no usable area.
    InvalidSurface { width: f32, height: f32 },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::InvalidSurface { width, height } => write!(
                f,
                "Drawing surface is unusable ({}x{}); width and height must be positive",
                width, height
            ),
        }
    }
}

impl std::error::Error for RenderError {}

/// Errors that can occur while loading or saving configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read or write the config file.
    Io(std::io::Error),
    /// The config file is not valid JSON for this version.
    Parse(serde_json::Error),
    /// A colour value is not a hex RGB string.
    Color(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to access config file: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config file: {}", e),
            ConfigError::Color(s) => write!(f, "Invalid hex colour '{}', expected #rrggbb", s),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Color(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}
