//! Error types for tile mutation and validation.

use std::fmt;

use crate::host::{HostError, RegionId};
use crate::split::{SplitAxis, SplitState};

/// Failure of a mutating tile operation.
///
/// The tile's prior state is intact whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileError {
    /// The host could not allocate a region for the new arrangement.
    Host(HostError),
}

impl fmt::Display for TileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host(err) => write!(f, "recomposition aborted: {err}"),
        }
    }
}

impl std::error::Error for TileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Host(err) => Some(err),
        }
    }
}

impl From<HostError> for TileError {
    fn from(err: HostError) -> Self {
        Self::Host(err)
    }
}

/// Which structural invariant a tile violates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileInvariantKind {
    /// The arrangement does not match the split state (one frame for
    /// `Unsplit`, a splitter of the same axis otherwise).
    ArrangementMismatch {
        state: SplitState,
        arrangement_axis: Option<SplitAxis>,
    },
    /// A child tile is not parented to its parent's second region.
    ContainerMismatch {
        expected: RegionId,
        actual: Option<RegionId>,
    },
    /// A child tile's area differs from its parent's second region.
    ChildAreaMismatch,
    /// Split regions do not add up to the splitter extent.
    GeometryOverflow,
}

/// A malformed tile found by [`Tile::validate`](crate::Tile::validate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileInvariantError {
    /// Position in the chain, 0 for the root.
    pub depth: usize,
    pub kind: TileInvariantKind,
}

impl fmt::Display for TileInvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TileInvariantKind::ArrangementMismatch {
                state,
                arrangement_axis,
            } => write!(
                f,
                "tile at depth {} is {state:?} but its arrangement axis is {arrangement_axis:?}",
                self.depth
            ),
            TileInvariantKind::ContainerMismatch { expected, actual } => write!(
                f,
                "tile at depth {} should live in {expected}, found {actual:?}",
                self.depth
            ),
            TileInvariantKind::ChildAreaMismatch => write!(
                f,
                "tile at depth {} does not fill its parent's second region",
                self.depth
            ),
            TileInvariantKind::GeometryOverflow => write!(
                f,
                "split regions of tile at depth {} exceed the splitter",
                self.depth
            ),
        }
    }
}

impl std::error::Error for TileInvariantError {}
