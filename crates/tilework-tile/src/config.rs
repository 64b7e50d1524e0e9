//! Tile sizing configuration.
//!
//! Every tile carries a copy of the [`TileConfig`] it was created with; child
//! tiles inherit their parent's. Values can come from serde (a host settings
//! file) and be overridden by environment variables:
//!
//! - `TILEWORK_MARGIN`: margin on every side of a tile's frame.
//! - `TILEWORK_DIVIDER`: divider thickness.
//! - `TILEWORK_MIN_REGION`: smallest region, as `WIDTHxHEIGHT`.

use std::fmt;

use serde::{Deserialize, Serialize};
use tilework_core::geometry::{Sides, Size};
use tracing::warn;

const ENV_MARGIN: &str = "TILEWORK_MARGIN";
const ENV_DIVIDER: &str = "TILEWORK_DIVIDER";
const ENV_MIN_REGION: &str = "TILEWORK_MIN_REGION";

/// Default contents margin around every tile frame.
pub const DEFAULT_MARGIN: u16 = 5;
/// Default divider thickness.
pub const DEFAULT_DIVIDER: u16 = 4;
/// Default smallest region edge.
pub const DEFAULT_MIN_REGION: u16 = 16;

/// Sizing parameters for tiles and the regions they create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TileConfig {
    /// Inset between a tile's allocated area and its frame or splitter.
    pub margin: Sides,
    /// Thickness of the draggable divider between split regions.
    pub divider: u16,
    /// Floor applied to every region's minimum size.
    pub min_region: Size,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            margin: Sides::all(DEFAULT_MARGIN),
            divider: DEFAULT_DIVIDER,
            min_region: Size::new(DEFAULT_MIN_REGION, DEFAULT_MIN_REGION),
        }
    }
}

impl TileConfig {
    /// Defaults with environment overrides applied.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a custom environment lookup (for tests).
    ///
    /// Unparseable values are logged and ignored.
    #[must_use]
    pub fn with_env<F>(mut self, get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = get_env(ENV_MARGIN) {
            match raw.trim().parse::<u16>() {
                Ok(margin) => self.margin = Sides::all(margin),
                Err(_) => ignore_override(ENV_MARGIN, &raw),
            }
        }
        if let Some(raw) = get_env(ENV_DIVIDER) {
            match raw.trim().parse::<u16>() {
                Ok(divider) => self.divider = divider,
                Err(_) => ignore_override(ENV_DIVIDER, &raw),
            }
        }
        if let Some(raw) = get_env(ENV_MIN_REGION) {
            match parse_size(&raw) {
                Some(size) => self.min_region = size,
                None => ignore_override(ENV_MIN_REGION, &raw),
            }
        }
        self
    }

    /// Reject configurations no region could satisfy.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_region.is_empty() {
            return Err(ConfigError::EmptyMinRegion {
                min_region: self.min_region,
            });
        }
        Ok(())
    }
}

fn ignore_override(key: &str, raw: &str) {
    warn!(target: "tilework.config", key, value = %raw, "ignoring invalid override");
}

fn parse_size(raw: &str) -> Option<Size> {
    let (width, height) = raw.trim().split_once(['x', 'X'])?;
    let width = width.trim().parse().ok()?;
    let height = height.trim().parse().ok()?;
    Some(Size::new(width, height))
}

/// Invalid tile configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyMinRegion { min_region: Size },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMinRegion { min_region } => write!(
                f,
                "min_region must be non-empty, got {}x{}",
                min_region.width, min_region.height
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
