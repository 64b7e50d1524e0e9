//! Layout recomposition.
//!
//! A tile's geometry is an [`Arrangement`]: the set of host regions it
//! created during its last recomposition. An unsplit tile owns one frame;
//! an oriented tile owns a splitter holding two panes and a divider:
//!
//! ```text
//! splitter (tile area inset by margins)
//! ├── first   base surface
//! ├── divider
//! └── second  child subtree, or an empty placeholder
//! ```
//!
//! Rebuilds are never patched in place. [`stage_split`] allocates a complete new
//! arrangement while the old one is still live, so a host allocation failure
//! leaves the tile untouched. The tile then commits: it moves its content
//! across and hands the old arrangement to [`teardown`], which releases
//! regions leaves-first.

use tilework_core::geometry::Rect;
use tracing::warn;

use crate::config::TileConfig;
use crate::host::{HostError, RegionHost, RegionId, RegionKind, RegionRequest};
use crate::split::SplitAxis;

/// Placement of the split point inside a splitter.
///
/// `first_extent + divider_extent + second_extent` always equals the
/// splitter's extent along `axis`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SplitGeometry {
    pub axis: SplitAxis,
    /// Splitter rectangle.
    pub inner: Rect,
    /// Divider thickness actually used (config value, capped by `inner`).
    pub divider: u16,
    /// Extent of the base region along `axis`.
    pub first_extent: u16,
    /// Minimum extent of the second region, fixed at split time to half the
    /// tile's extent along `axis`.
    pub panel_floor: u16,
}

/// Rectangles of the three regions inside a splitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitRects {
    pub first: Rect,
    pub divider: Rect,
    pub second: Rect,
}

impl SplitGeometry {
    /// Split point for a fresh split of a tile occupying `area`.
    ///
    /// The second region gets at least half of `area` along the axis; what
    /// is left after the divider is otherwise shared evenly.
    #[must_use]
    pub fn initial(
        axis: SplitAxis,
        area: Rect,
        config: &TileConfig,
        first_min: u16,
        second_min: u16,
    ) -> Self {
        let inner = area.inner(config.margin);
        let panel_floor = axis.along(area.size()) / 2;
        let mut geometry = Self {
            axis,
            inner,
            divider: config.divider.min(axis.along(inner.size())),
            first_extent: 0,
            panel_floor,
        };
        let available = geometry.available();
        let second = available.min(panel_floor.max(available - available / 2));
        geometry.first_extent =
            geometry.clamp_first(available - second, first_min, second_min);
        geometry
    }

    /// Space along the axis shared by the two content regions.
    #[must_use]
    pub fn available(&self) -> u16 {
        self.axis.along(self.inner.size()).saturating_sub(self.divider)
    }

    #[must_use]
    pub fn second_extent(&self) -> u16 {
        self.available().saturating_sub(self.first_extent)
    }

    /// Clamp a requested first extent so the second region keeps
    /// `max(second_min, panel_floor)` and the first keeps `first_min`.
    ///
    /// When both cannot fit, the second region's minimum wins.
    #[must_use]
    pub fn clamp_first(&self, requested: u16, first_min: u16, second_min: u16) -> u16 {
        let hi = self
            .available()
            .saturating_sub(second_min.max(self.panel_floor));
        let lo = first_min.min(hi);
        requested.clamp(lo, hi)
    }

    /// Geometry after the splitter moved to `inner`.
    ///
    /// Growth or shrinkage along the axis is shared equally between the two
    /// regions, then clamped to their minimums.
    #[must_use]
    pub fn reflowed(
        &self,
        inner: Rect,
        config: &TileConfig,
        first_min: u16,
        second_min: u16,
    ) -> Self {
        let mut next = Self {
            inner,
            divider: config.divider.min(self.axis.along(inner.size())),
            ..*self
        };
        let delta = i32::from(next.available()) - i32::from(self.available());
        let shifted = i32::from(self.first_extent) + delta.div_euclid(2);
        let requested = u16::try_from(shifted.max(0)).unwrap_or(u16::MAX);
        next.first_extent = next.clamp_first(requested, first_min, second_min);
        next
    }

    #[must_use]
    pub fn rects(&self) -> SplitRects {
        let first = self.first_extent.min(self.available());
        let second = self.available() - first;
        SplitRects {
            first: self.axis.slice(self.inner, 0, first),
            divider: self.axis.slice(self.inner, first, self.divider),
            second: self
                .axis
                .slice(self.inner, first.saturating_add(self.divider), second),
        }
    }
}

/// Region handles owned by one split tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SplitRegions {
    pub(crate) splitter: RegionId,
    pub(crate) first: RegionId,
    pub(crate) divider: RegionId,
    pub(crate) second: RegionId,
    pub(crate) geometry: SplitGeometry,
}

/// Region handles owned by one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Arrangement {
    Single { frame: RegionId },
    Split(SplitRegions),
}

impl Arrangement {
    /// Region the base surface is attached to.
    pub(crate) const fn base_region(&self) -> RegionId {
        match self {
            Self::Single { frame } => *frame,
            Self::Split(split) => split.first,
        }
    }

    /// Outermost region, parented to the tile's container.
    pub(crate) const fn top_region(&self) -> RegionId {
        match self {
            Self::Single { frame } => *frame,
            Self::Split(split) => split.splitter,
        }
    }

    pub(crate) const fn axis(&self) -> Option<SplitAxis> {
        match self {
            Self::Single { .. } => None,
            Self::Split(split) => Some(split.geometry.axis),
        }
    }

    pub(crate) const fn region_count(&self) -> usize {
        match self {
            Self::Single { .. } => 1,
            Self::Split(_) => 4,
        }
    }

    /// Live regions with their rectangles, outermost first.
    pub(crate) fn regions(&self, area: Rect, config: &TileConfig) -> Vec<PlacedRegion> {
        match self {
            Self::Single { frame } => vec![PlacedRegion {
                id: *frame,
                kind: RegionKind::Frame,
                rect: area.inner(config.margin),
            }],
            Self::Split(split) => {
                let axis = split.geometry.axis;
                let rects = split.geometry.rects();
                vec![
                    PlacedRegion {
                        id: split.splitter,
                        kind: RegionKind::Splitter(axis),
                        rect: split.geometry.inner,
                    },
                    PlacedRegion {
                        id: split.first,
                        kind: RegionKind::Pane,
                        rect: rects.first,
                    },
                    PlacedRegion {
                        id: split.divider,
                        kind: RegionKind::Divider(axis),
                        rect: rects.divider,
                    },
                    PlacedRegion {
                        id: split.second,
                        kind: RegionKind::Pane,
                        rect: rects.second,
                    },
                ]
            }
        }
    }
}

/// A live region as last placed by its tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedRegion {
    pub id: RegionId,
    pub kind: RegionKind,
    pub rect: Rect,
}

/// Inputs for staging a split arrangement.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SplitPlan {
    pub(crate) axis: SplitAxis,
    pub(crate) area: Rect,
    pub(crate) container: Option<RegionId>,
    pub(crate) config: TileConfig,
    pub(crate) first_min: u16,
    pub(crate) second_min: u16,
}

/// Allocate the frame of an unsplit tile occupying `area`.
pub(crate) fn stage_frame<S, H>(
    host: &mut H,
    area: Rect,
    container: Option<RegionId>,
    config: &TileConfig,
) -> Result<RegionId, HostError>
where
    S: ?Sized,
    H: RegionHost<S> + ?Sized,
{
    with_rollback::<S, H, _>(host, |host, created| {
        alloc::<S, H>(host, created, RegionKind::Frame, container, area.inner(config.margin))
    })
}

/// Allocate a splitter, its two panes and its divider.
pub(crate) fn stage_split<S, H>(host: &mut H, plan: &SplitPlan) -> Result<SplitRegions, HostError>
where
    S: ?Sized,
    H: RegionHost<S> + ?Sized,
{
    with_rollback::<S, H, _>(host, |host, created| split_into::<S, H>(host, plan, created))
}

/// Like [`stage_split`], plus the frame of a fresh child tile filling the
/// second pane.
pub(crate) fn stage_split_with_child<S, H>(
    host: &mut H,
    plan: &SplitPlan,
) -> Result<(SplitRegions, RegionId), HostError>
where
    S: ?Sized,
    H: RegionHost<S> + ?Sized,
{
    with_rollback::<S, H, _>(host, |host, created| {
        let regions = split_into::<S, H>(host, plan, created)?;
        let child_area = regions.geometry.rects().second;
        let frame = alloc::<S, H>(
            host,
            created,
            RegionKind::Frame,
            Some(regions.second),
            child_area.inner(plan.config.margin),
        )?;
        Ok((regions, frame))
    })
}

/// Run `stage`, releasing everything it allocated if it fails.
///
/// Regions are released in reverse allocation order, so leaves go before
/// the containers they were allocated under.
fn with_rollback<S, H, T>(
    host: &mut H,
    stage: impl FnOnce(&mut H, &mut Vec<RegionId>) -> Result<T, HostError>,
) -> Result<T, HostError>
where
    S: ?Sized,
    H: RegionHost<S> + ?Sized,
{
    let mut created = Vec::with_capacity(5);
    match stage(host, &mut created) {
        Ok(staged) => Ok(staged),
        Err(err) => {
            warn!(
                target: "tilework.compositor",
                error = %err,
                kind = ?err.kind(),
                rolled_back = created.len(),
                "region allocation failed; keeping previous arrangement"
            );
            for region in created.into_iter().rev() {
                host.hide(region);
                host.release(region);
            }
            Err(err)
        }
    }
}

fn alloc<S, H>(
    host: &mut H,
    created: &mut Vec<RegionId>,
    kind: RegionKind,
    parent: Option<RegionId>,
    rect: Rect,
) -> Result<RegionId, HostError>
where
    S: ?Sized,
    H: RegionHost<S> + ?Sized,
{
    let region = host.create_region(&RegionRequest { kind, parent, rect })?;
    created.push(region);
    Ok(region)
}

fn split_into<S, H>(
    host: &mut H,
    plan: &SplitPlan,
    created: &mut Vec<RegionId>,
) -> Result<SplitRegions, HostError>
where
    S: ?Sized,
    H: RegionHost<S> + ?Sized,
{
    let axis = plan.axis;
    let geometry = SplitGeometry::initial(
        axis,
        plan.area,
        &plan.config,
        plan.first_min,
        plan.second_min,
    );
    let rects = geometry.rects();
    let splitter = alloc::<S, H>(
        host,
        created,
        RegionKind::Splitter(axis),
        plan.container,
        geometry.inner,
    )?;
    let first = alloc::<S, H>(host, created, RegionKind::Pane, Some(splitter), rects.first)?;
    let divider = alloc::<S, H>(
        host,
        created,
        RegionKind::Divider(axis),
        Some(splitter),
        rects.divider,
    )?;
    let second = alloc::<S, H>(host, created, RegionKind::Pane, Some(splitter), rects.second)?;

    Ok(SplitRegions {
        splitter,
        first,
        divider,
        second,
        geometry,
    })
}

/// Release an arrangement whose content has already been detached or moved.
///
/// Content regions are hidden and released before their splitter.
pub(crate) fn teardown<S, H>(host: &mut H, arrangement: Arrangement)
where
    S: ?Sized,
    H: RegionHost<S> + ?Sized,
{
    match arrangement {
        Arrangement::Single { frame } => {
            host.hide(frame);
            host.release(frame);
        }
        Arrangement::Split(split) => {
            let leaves = [split.first, split.divider, split.second];
            for region in leaves {
                host.hide(region);
            }
            for region in leaves {
                host.release(region);
            }
            host.hide(split.splitter);
            host.release(split.splitter);
        }
    }
}

/// Push the rectangles of a split arrangement to the host.
pub(crate) fn place_split<S, H>(host: &mut H, split: &SplitRegions)
where
    S: ?Sized,
    H: RegionHost<S> + ?Sized,
{
    let rects = split.geometry.rects();
    host.place(split.splitter, split.geometry.inner);
    host.place(split.first, rects.first);
    host.place(split.divider, rects.divider);
    host.place(split.second, rects.second);
}
