//! Host toolkit capability surface.
//!
//! The tile engine never touches a concrete widget type. Everything it needs
//! from the toolkit (allocate a region, place it, move it under another
//! region, show content in it, hide and release it) goes through
//! [`RegionHost`]. A region is identified by a host-assigned [`RegionId`];
//! the engine only stores ids.

use std::fmt;

use serde::{Deserialize, Serialize};
use tilework_core::geometry::Rect;

use crate::split::SplitAxis;

/// Host-assigned identifier for a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(u64);

impl RegionId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// What a requested region is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "axis", rename_all = "snake_case")]
pub enum RegionKind {
    /// Sunken frame hosting the base surface of an unsplit tile.
    Frame,
    /// Container holding two panes and the divider between them.
    Splitter(SplitAxis),
    /// One side of a splitter. Hosts the base surface or a child subtree.
    Pane,
    /// Draggable bar between the two panes of a splitter.
    Divider(SplitAxis),
}

impl RegionKind {
    /// Whether other regions may be parented to this one.
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(self, Self::Splitter(_) | Self::Pane)
    }
}

/// Parameters for [`RegionHost::create_region`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionRequest {
    pub kind: RegionKind,
    /// Enclosing region, or `None` for the top-level window.
    pub parent: Option<RegionId>,
    pub rect: Rect,
}

/// Failure reported by the host toolkit when allocating a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The toolkit ran out of display resources.
    OutOfResources { kind: RegionKind },
    /// The toolkit refused the request for a toolkit-specific reason.
    Rejected { kind: RegionKind, reason: String },
}

impl HostError {
    #[must_use]
    pub const fn kind(&self) -> RegionKind {
        match self {
            Self::OutOfResources { kind } | Self::Rejected { kind, .. } => *kind,
        }
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfResources { kind } => {
                write!(f, "host out of resources allocating {kind:?} region")
            }
            Self::Rejected { kind, reason } => {
                write!(f, "host rejected {kind:?} region: {reason}")
            }
        }
    }
}

impl std::error::Error for HostError {}

/// The `{layoutable, resizable-region}` capability a host toolkit provides.
///
/// Only [`create_region`](Self::create_region) may fail. Every other call is
/// made with ids the engine obtained from this host and has not released.
pub trait RegionHost<S: ?Sized> {
    /// Allocate a visible region at `request.rect` under `request.parent`.
    fn create_region(&mut self, request: &RegionRequest) -> Result<RegionId, HostError>;

    /// Move/resize a region.
    fn place(&mut self, region: RegionId, rect: Rect);

    /// Move a region (and everything under it) beneath a new parent.
    fn reparent(&mut self, region: RegionId, parent: Option<RegionId>);

    /// Show `surface` inside `region`. The surface stays owned by its creator.
    fn attach(&mut self, region: RegionId, surface: &S);

    /// Take `surface` out of `region` without destroying it.
    fn detach(&mut self, region: RegionId, surface: &S);

    /// Request a repaint of `region` only.
    fn invalidate(&mut self, _region: RegionId) {}

    fn hide(&mut self, region: RegionId);

    /// Release a region. It has no attached surface and no child regions.
    fn release(&mut self, region: RegionId);
}

impl<S: ?Sized, H: RegionHost<S> + ?Sized> RegionHost<S> for &mut H {
    fn create_region(&mut self, request: &RegionRequest) -> Result<RegionId, HostError> {
        (**self).create_region(request)
    }

    fn place(&mut self, region: RegionId, rect: Rect) {
        (**self).place(region, rect);
    }

    fn reparent(&mut self, region: RegionId, parent: Option<RegionId>) {
        (**self).reparent(region, parent);
    }

    fn attach(&mut self, region: RegionId, surface: &S) {
        (**self).attach(region, surface);
    }

    fn detach(&mut self, region: RegionId, surface: &S) {
        (**self).detach(region, surface);
    }

    fn invalidate(&mut self, region: RegionId) {
        (**self).invalidate(region);
    }

    fn hide(&mut self, region: RegionId) {
        (**self).hide(region);
    }

    fn release(&mut self, region: RegionId) {
        (**self).release(region);
    }
}
