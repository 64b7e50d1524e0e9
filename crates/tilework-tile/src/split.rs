//! Split orientation, tile decomposition state, and directive transitions.

use serde::{Deserialize, Serialize};
use tilework_core::geometry::{Rect, Size};

/// Orientation of a split.
///
/// `Horizontal` places the two regions side by side (divider is vertical),
/// `Vertical` stacks them top/bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitAxis {
    Horizontal,
    Vertical,
}

impl SplitAxis {
    /// Extent of `size` along this axis.
    #[inline]
    #[must_use]
    pub const fn along(self, size: Size) -> u16 {
        match self {
            Self::Horizontal => size.width,
            Self::Vertical => size.height,
        }
    }

    /// Extent of `size` across this axis.
    #[inline]
    #[must_use]
    pub const fn across(self, size: Size) -> u16 {
        match self {
            Self::Horizontal => size.height,
            Self::Vertical => size.width,
        }
    }

    /// Build a size from extents along and across this axis.
    #[inline]
    #[must_use]
    pub const fn size(self, along: u16, across: u16) -> Size {
        match self {
            Self::Horizontal => Size::new(along, across),
            Self::Vertical => Size::new(across, along),
        }
    }

    /// Sub-rectangle of `rect` starting `offset` along this axis, `len` long,
    /// spanning the full cross extent.
    #[must_use]
    pub const fn slice(self, rect: Rect, offset: u16, len: u16) -> Rect {
        match self {
            Self::Horizontal => Rect::new(rect.x.saturating_add(offset), rect.y, len, rect.height),
            Self::Vertical => Rect::new(rect.x, rect.y.saturating_add(offset), rect.width, len),
        }
    }
}

/// Decomposition mode of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitState {
    #[default]
    Unsplit,
    Horizontal,
    Vertical,
}

impl SplitState {
    /// Axis of an oriented state.
    #[must_use]
    pub const fn axis(self) -> Option<SplitAxis> {
        match self {
            Self::Unsplit => None,
            Self::Horizontal => Some(SplitAxis::Horizontal),
            Self::Vertical => Some(SplitAxis::Vertical),
        }
    }

    #[must_use]
    pub const fn is_split(self) -> bool {
        !matches!(self, Self::Unsplit)
    }

    /// State after `directive`. Pure; no geometry is involved.
    ///
    /// There is no transition back to `Unsplit`.
    #[must_use]
    pub const fn apply(self, directive: SplitDirective) -> Self {
        match directive {
            SplitDirective::None => self,
            SplitDirective::Horizontal => Self::Horizontal,
            SplitDirective::Vertical => Self::Vertical,
        }
    }
}

impl From<SplitAxis> for SplitState {
    fn from(axis: SplitAxis) -> Self {
        match axis {
            SplitAxis::Horizontal => Self::Horizontal,
            SplitAxis::Vertical => Self::Vertical,
        }
    }
}

/// Operation requested on a tile by host UI actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitDirective {
    #[default]
    None,
    Horizontal,
    Vertical,
}

impl From<SplitAxis> for SplitDirective {
    fn from(axis: SplitAxis) -> Self {
        match axis {
            SplitAxis::Horizontal => Self::Horizontal,
            SplitAxis::Vertical => Self::Vertical,
        }
    }
}
