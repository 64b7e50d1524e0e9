//! Tiles: nodes of the pane layout chain.
//!
//! A [`Tile`] hosts one base surface and, once split, one child tile beside
//! or below it. Only the child slot can split further, so a window's tiles
//! form a chain rather than a general binary tree:
//!
//! ```text
//! root (Horizontal)
//! ├── base: editor
//! └── child (Vertical)
//!     ├── base: evaluator
//!     └── child (Unsplit)
//!         └── base: inspector
//! ```
//!
//! Every structural change (orientation, new child) rebuilds the tile's
//! region arrangement from scratch through the [`compositor`](crate::compositor).
//! A rebuild either completes or fails with [`TileError`] before the old
//! arrangement is touched.
//!
//! Tiles do not release their regions on drop; call [`Tile::close`].

use std::mem;

use serde::{Deserialize, Serialize};
use tilework_core::geometry::{Rect, Size};
use tracing::{debug, debug_span};

use crate::compositor::{self, Arrangement, PlacedRegion, SplitGeometry, SplitPlan, SplitRegions};
use crate::config::TileConfig;
use crate::error::{TileError, TileInvariantError, TileInvariantKind};
use crate::host::{RegionHost, RegionId};
use crate::split::{SplitAxis, SplitDirective, SplitState};
use crate::surface::ContentSurface;

/// Current [`TileSnapshot`] schema version.
pub const TILE_SNAPSHOT_SCHEMA_VERSION: u16 = 1;

/// Explicit sizing context a root tile is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowContext {
    /// Space the host window allocates to the tile tree.
    pub area: Rect,
    /// Region to parent the tree under, `None` for the window itself.
    pub container: Option<RegionId>,
    pub config: TileConfig,
}

impl WindowContext {
    #[must_use]
    pub fn new(area: Rect) -> Self {
        Self {
            area,
            container: None,
            config: TileConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: TileConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_container(mut self, container: RegionId) -> Self {
        self.container = Some(container);
        self
    }
}

/// Result of [`Tile::split`].
#[derive(Debug, PartialEq, Eq)]
pub enum SplitOutcome<S> {
    /// The tile has no orientation yet; nothing changed and the surface is
    /// handed back.
    Unoriented(S),
    /// A child tile was created for the surface. Surfaces of the subtree it
    /// replaced are handed back in chain order.
    Created { displaced: Vec<S> },
}

impl<S> SplitOutcome<S> {
    #[must_use]
    pub const fn is_created(&self) -> bool {
        matches!(self, Self::Created { .. })
    }
}

#[derive(Debug)]
enum Decomposition<S> {
    Unsplit,
    Oriented {
        axis: SplitAxis,
        /// `None` until a split supplies content; the second pane is then an
        /// empty placeholder.
        child: Option<Box<Tile<S>>>,
    },
}

/// What goes into the second pane of a rebuilt split.
enum ChildPlan<S> {
    Keep(Option<Box<Tile<S>>>),
    Fresh { surface: S, frame: RegionId },
}

/// A node in the pane layout chain.
#[derive(Debug)]
pub struct Tile<S> {
    base: S,
    decomposition: Decomposition<S>,
    arrangement: Arrangement,
    area: Rect,
    container: Option<RegionId>,
    config: TileConfig,
}

impl<S> Tile<S> {
    /// The surface in this tile's primary region.
    #[must_use]
    pub fn base(&self) -> &S {
        &self.base
    }

    #[must_use]
    pub fn split_state(&self) -> SplitState {
        match self.decomposition {
            Decomposition::Unsplit => SplitState::Unsplit,
            Decomposition::Oriented { axis, .. } => axis.into(),
        }
    }

    #[must_use]
    pub fn child(&self) -> Option<&Tile<S>> {
        match &self.decomposition {
            Decomposition::Oriented {
                child: Some(child), ..
            } => Some(child),
            _ => None,
        }
    }

    /// Mutable access to the child tile.
    ///
    /// Mutations through this reference recompose only the child; use
    /// [`Workbench`](crate::Workbench) to also reflow the enclosing tiles.
    pub fn child_mut(&mut self) -> Option<&mut Tile<S>> {
        match &mut self.decomposition {
            Decomposition::Oriented {
                child: Some(child), ..
            } => Some(child.as_mut()),
            _ => None,
        }
    }

    /// Space allocated to this tile by its parent or the window.
    #[must_use]
    pub const fn area(&self) -> Rect {
        self.area
    }

    /// Region this tile's regions are parented to.
    #[must_use]
    pub const fn container(&self) -> Option<RegionId> {
        self.container
    }

    #[must_use]
    pub const fn config(&self) -> &TileConfig {
        &self.config
    }

    /// Split point, if the tile is oriented.
    #[must_use]
    pub fn split_geometry(&self) -> Option<SplitGeometry> {
        match &self.arrangement {
            Arrangement::Single { .. } => None,
            Arrangement::Split(split) => Some(split.geometry),
        }
    }

    /// Region currently showing the base surface.
    #[must_use]
    pub fn base_region(&self) -> RegionId {
        self.arrangement.base_region()
    }

    /// Regions owned by this tile alone, outermost first.
    #[must_use]
    pub fn regions(&self) -> Vec<PlacedRegion> {
        self.arrangement.regions(self.area, &self.config)
    }

    /// Regions of every tile in the chain rooted here, root first.
    #[must_use]
    pub fn geometry(&self) -> Vec<PlacedRegion> {
        self.chain().flat_map(Tile::regions).collect()
    }

    /// Number of live regions owned by this tile and its descendants.
    #[must_use]
    pub fn region_count(&self) -> usize {
        self.chain().map(|tile| tile.arrangement.region_count()).sum()
    }

    /// This tile followed by each descendant, root to leaf.
    #[must_use]
    pub fn chain(&self) -> Chain<'_, S> {
        Chain { next: Some(self) }
    }

    /// Number of tiles in the chain rooted here.
    #[must_use]
    pub fn chain_len(&self) -> usize {
        self.chain().count()
    }

    /// The last tile of the chain.
    #[must_use]
    pub fn deepest(&self) -> &Tile<S> {
        let mut tile = self;
        while let Some(child) = tile.child() {
            tile = child;
        }
        tile
    }

    /// Tile `depth` steps down the chain; 0 is `self`.
    #[must_use]
    pub fn descendant(&self, depth: usize) -> Option<&Tile<S>> {
        self.chain().nth(depth)
    }

    pub fn descendant_mut(&mut self, depth: usize) -> Option<&mut Tile<S>> {
        let mut tile = self;
        for _ in 0..depth {
            tile = tile.child_mut()?;
        }
        Some(tile)
    }

    /// Check split state, arrangement and child placement down the chain.
    pub fn validate(&self) -> Result<(), TileInvariantError> {
        self.chain()
            .enumerate()
            .try_for_each(|(depth, tile)| tile.validate_local(depth))
    }

    fn validate_local(&self, depth: usize) -> Result<(), TileInvariantError> {
        let fail = |kind| Err(TileInvariantError { depth, kind });
        let state = self.split_state();
        if state.axis() != self.arrangement.axis() {
            return fail(TileInvariantKind::ArrangementMismatch {
                state,
                arrangement_axis: self.arrangement.axis(),
            });
        }
        let Arrangement::Split(split) = &self.arrangement else {
            return Ok(());
        };
        let geometry = split.geometry;
        let rects = geometry.rects();
        let axis = geometry.axis;
        let used = u32::from(axis.along(rects.first.size()))
            + u32::from(axis.along(rects.divider.size()))
            + u32::from(axis.along(rects.second.size()));
        if used != u32::from(axis.along(geometry.inner.size())) {
            return fail(TileInvariantKind::GeometryOverflow);
        }
        if let Some(child) = self.child() {
            if child.container != Some(split.second) {
                return Err(TileInvariantError {
                    depth: depth + 1,
                    kind: TileInvariantKind::ContainerMismatch {
                        expected: split.second,
                        actual: child.container,
                    },
                });
            }
            if child.area != rects.second {
                return Err(TileInvariantError {
                    depth: depth + 1,
                    kind: TileInvariantKind::ChildAreaMismatch,
                });
            }
        }
        Ok(())
    }

    /// Fail fast if this tile's arrangement disagrees with its state.
    fn assert_shape(&self) {
        assert_eq!(
            self.split_state().axis(),
            self.arrangement.axis(),
            "tile arrangement out of sync with split state"
        );
    }
}

impl<S: ContentSurface> Tile<S> {
    /// Mount an unsplit tile for `surface` into the window's geometry.
    pub fn new<H>(host: &mut H, window: WindowContext, surface: S) -> Result<Self, TileError>
    where
        H: RegionHost<S> + ?Sized,
    {
        let frame =
            compositor::stage_frame::<S, H>(host, window.area, window.container, &window.config)?;
        host.attach(frame, &surface);
        debug!(
            target: "tilework.tile",
            surface = surface.surface_key(),
            area = ?window.area,
            "tile mounted"
        );
        Ok(Self {
            base: surface,
            decomposition: Decomposition::Unsplit,
            arrangement: Arrangement::Single { frame },
            area: window.area,
            container: window.container,
            config: window.config,
        })
    }

    /// Orient side by side, reusing the existing child, and rebuild.
    pub fn split_horizontal<H>(&mut self, host: &mut H) -> Result<(), TileError>
    where
        H: RegionHost<S> + ?Sized,
    {
        self.orient(host, SplitAxis::Horizontal)
    }

    /// Orient top/bottom, reusing the existing child, and rebuild.
    pub fn split_vertical<H>(&mut self, host: &mut H) -> Result<(), TileError>
    where
        H: RegionHost<S> + ?Sized,
    {
        self.orient(host, SplitAxis::Vertical)
    }

    /// Apply a directive. [`SplitDirective::None`] changes nothing.
    pub fn apply<H>(&mut self, host: &mut H, directive: SplitDirective) -> Result<(), TileError>
    where
        H: RegionHost<S> + ?Sized,
    {
        if directive == SplitDirective::None {
            return Ok(());
        }
        match self.split_state().apply(directive).axis() {
            Some(axis) => self.orient(host, axis),
            None => Ok(()),
        }
    }

    /// Put `surface` in a new child tile in the second pane.
    ///
    /// Does nothing until an orientation has been chosen. Any previous child
    /// subtree is torn down and its surfaces returned.
    pub fn split<H>(&mut self, host: &mut H, surface: S) -> Result<SplitOutcome<S>, TileError>
    where
        H: RegionHost<S> + ?Sized,
    {
        self.assert_shape();
        let Decomposition::Oriented { axis, .. } = self.decomposition else {
            debug!(
                target: "tilework.tile",
                surface = surface.surface_key(),
                "split ignored: no orientation chosen"
            );
            return Ok(SplitOutcome::Unoriented(surface));
        };
        let displaced = self.split_along(host, axis, surface)?;
        Ok(SplitOutcome::Created { displaced })
    }

    /// Orient along `axis` and put `surface` in a new child tile, in one
    /// rebuild.
    ///
    /// Every region of the new arrangement is allocated before anything is
    /// committed, so on error the tile keeps its previous state, including
    /// `Unsplit`. Surfaces of a replaced child subtree are returned in chain
    /// order.
    pub fn split_along<H>(
        &mut self,
        host: &mut H,
        axis: SplitAxis,
        surface: S,
    ) -> Result<Vec<S>, TileError>
    where
        H: RegionHost<S> + ?Sized,
    {
        self.assert_shape();
        let second_min = axis.along(self.leaf_min_size(&surface));
        let (regions, frame) =
            compositor::stage_split_with_child::<S, H>(host, &self.split_plan(axis, second_min))?;

        let displaced = match self.take_child() {
            Some(evicted) => (*evicted).close(host),
            None => Vec::new(),
        };
        self.install(host, regions, ChildPlan::Fresh { surface, frame });
        Ok(displaced)
    }

    /// Swap the base surface in place, returning the previous one.
    ///
    /// Only the base region is touched; split state, child and every other
    /// region are left as they are.
    pub fn rebase<H>(&mut self, host: &mut H, surface: S) -> S
    where
        H: RegionHost<S> + ?Sized,
    {
        self.assert_shape();
        let region = self.arrangement.base_region();
        host.detach(region, &self.base);
        let previous = mem::replace(&mut self.base, surface);
        host.attach(region, &self.base);
        host.invalidate(region);
        debug!(
            target: "tilework.tile",
            from = previous.surface_key(),
            to = self.base.surface_key(),
            region = %region,
            "tile rebased"
        );
        previous
    }

    /// Reflow into a new area without rebuilding any region.
    pub fn resize<H>(&mut self, host: &mut H, area: Rect)
    where
        H: RegionHost<S> + ?Sized,
    {
        self.area = area;
        let inner = area.inner(self.config.margin);
        let mins = self.arrangement.axis().map(|axis| self.split_minimums(axis));
        let config = self.config;
        let second = match &mut self.arrangement {
            Arrangement::Single { frame } => {
                host.place(*frame, inner);
                None
            }
            Arrangement::Split(split) => {
                let (first_min, second_min) = mins.unwrap_or_default();
                split.geometry = split.geometry.reflowed(inner, &config, first_min, second_min);
                compositor::place_split::<S, H>(host, split);
                Some(split.geometry.rects().second)
            }
        };
        if let (Some(second), Some(child)) = (second, self.child_mut()) {
            child.resize(host, second);
        }
    }

    /// Drag the divider so the base region is `first_extent` long.
    ///
    /// Returns the extent actually applied after clamping to both regions'
    /// minimums, or 0 for an unsplit tile.
    pub fn move_divider<H>(&mut self, host: &mut H, first_extent: u16) -> u16
    where
        H: RegionHost<S> + ?Sized,
    {
        let Some(axis) = self.arrangement.axis() else {
            return 0;
        };
        let (first_min, second_min) = self.split_minimums(axis);
        let Arrangement::Split(split) = &mut self.arrangement else {
            return 0;
        };
        split.geometry.first_extent =
            split.geometry.clamp_first(first_extent, first_min, second_min);
        compositor::place_split::<S, H>(host, split);
        let applied = split.geometry.first_extent;
        let second = split.geometry.rects().second;
        if let Some(child) = self.child_mut() {
            child.resize(host, second);
        }
        applied
    }

    /// Smallest area this tile can be laid out in.
    ///
    /// Each split level adds a divider and the second region's minimum
    /// (never less than the panel floor fixed at split time).
    #[must_use]
    pub fn min_size(&self) -> Size {
        let base = self.base_min();
        let content = match &self.arrangement {
            Arrangement::Single { .. } => base,
            Arrangement::Split(split) => {
                let axis = split.geometry.axis;
                let child = self
                    .child()
                    .map_or(self.config.min_region, Tile::min_size);
                let along = axis
                    .along(base)
                    .saturating_add(self.config.divider)
                    .saturating_add(axis.along(child).max(split.geometry.panel_floor));
                let across = axis.across(base).max(axis.across(child));
                axis.size(along, across)
            }
        };
        content.outset(self.config.margin)
    }

    /// Tear down the chain rooted here, leaves first, and hand back every
    /// base surface in chain order.
    pub fn close<H>(self, host: &mut H) -> Vec<S>
    where
        H: RegionHost<S> + ?Sized,
    {
        let _span = debug_span!("tile.teardown", surface = self.base.surface_key()).entered();
        let Self {
            base,
            decomposition,
            arrangement,
            ..
        } = self;
        let nested = match decomposition {
            Decomposition::Oriented {
                child: Some(child), ..
            } => (*child).close(host),
            _ => Vec::new(),
        };
        host.detach(arrangement.base_region(), &base);
        compositor::teardown::<S, H>(host, arrangement);
        debug!(
            target: "tilework.tile",
            released = arrangement.region_count(),
            "tile closed"
        );

        let mut surfaces = Vec::with_capacity(nested.len() + 1);
        surfaces.push(base);
        surfaces.extend(nested);
        surfaces
    }

    /// Serializable shape of the chain rooted here.
    #[must_use]
    pub fn snapshot(&self) -> TileSnapshot {
        TileSnapshot {
            schema_version: TILE_SNAPSHOT_SCHEMA_VERSION,
            levels: self
                .chain()
                .map(|tile| TileLevel {
                    split_state: tile.split_state(),
                    area: tile.area,
                    surface_key: tile.base.surface_key().to_owned(),
                    has_child: tile.child().is_some(),
                    first_extent: tile.split_geometry().map(|g| g.first_extent),
                })
                .collect(),
        }
    }

    /// Deterministic hash of the chain's shape, independent of region ids.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        self.snapshot().state_hash()
    }

    fn orient<H>(&mut self, host: &mut H, axis: SplitAxis) -> Result<(), TileError>
    where
        H: RegionHost<S> + ?Sized,
    {
        self.assert_shape();
        let second_min = self
            .child()
            .map_or(axis.along(self.config.min_region), |child| {
                axis.along(child.min_size())
            });
        let regions = compositor::stage_split::<S, H>(host, &self.split_plan(axis, second_min))?;
        let child = self.take_child();
        self.install(host, regions, ChildPlan::Keep(child));
        Ok(())
    }

    /// Commit a staged split arrangement.
    ///
    /// Order: base surface moves to the new first pane; the child moves into
    /// (or is created in) the new second pane; only then is the old
    /// arrangement released, so no region is released while it still holds
    /// content.
    fn install<H>(&mut self, host: &mut H, regions: SplitRegions, child: ChildPlan<S>)
    where
        H: RegionHost<S> + ?Sized,
    {
        let axis = regions.geometry.axis;
        let _span = debug_span!(
            "tile.recompose",
            axis = ?axis,
            surface = self.base.surface_key(),
        )
        .entered();

        let old = mem::replace(&mut self.arrangement, Arrangement::Split(regions));
        host.detach(old.base_region(), &self.base);
        host.attach(regions.first, &self.base);

        let second = regions.geometry.rects().second;
        let fresh = matches!(child, ChildPlan::Fresh { .. });
        let child = match child {
            ChildPlan::Keep(Some(mut child)) => {
                host.reparent(child.arrangement.top_region(), Some(regions.second));
                child.container = Some(regions.second);
                child.resize(host, second);
                Some(child)
            }
            ChildPlan::Keep(None) => None,
            ChildPlan::Fresh { surface, frame } => {
                host.attach(frame, &surface);
                Some(Box::new(Tile {
                    base: surface,
                    decomposition: Decomposition::Unsplit,
                    arrangement: Arrangement::Single { frame },
                    area: second,
                    container: Some(regions.second),
                    config: self.config,
                }))
            }
        };

        compositor::teardown::<S, H>(host, old);
        self.decomposition = Decomposition::Oriented { axis, child };
        debug!(
            target: "tilework.tile",
            axis = ?axis,
            released = old.region_count(),
            created = regions_created(fresh),
            first_extent = regions.geometry.first_extent,
            "tile recomposed"
        );
    }

    fn take_child(&mut self) -> Option<Box<Tile<S>>> {
        match &mut self.decomposition {
            Decomposition::Unsplit => None,
            Decomposition::Oriented { child, .. } => child.take(),
        }
    }

    fn split_plan(&self, axis: SplitAxis, second_min: u16) -> SplitPlan {
        SplitPlan {
            axis,
            area: self.area,
            container: self.container,
            config: self.config,
            first_min: axis.along(self.base_min()),
            second_min,
        }
    }

    /// Minimum extents of the base and second regions along `axis`.
    fn split_minimums(&self, axis: SplitAxis) -> (u16, u16) {
        let second = self
            .child()
            .map_or(self.config.min_region, Tile::min_size);
        (axis.along(self.base_min()), axis.along(second))
    }

    fn base_min(&self) -> Size {
        self.base.min_size().max(self.config.min_region)
    }

    fn leaf_min_size(&self, surface: &S) -> Size {
        surface
            .min_size()
            .max(self.config.min_region)
            .outset(self.config.margin)
    }
}

/// Regions allocated by one rebuild.
const fn regions_created(fresh_child: bool) -> usize {
    if fresh_child { 5 } else { 4 }
}

/// Iterator over a tile and its descendants.
#[derive(Debug)]
pub struct Chain<'a, S> {
    next: Option<&'a Tile<S>>,
}

impl<'a, S> Iterator for Chain<'a, S> {
    type Item = &'a Tile<S>;

    fn next(&mut self) -> Option<Self::Item> {
        let tile = self.next?;
        self.next = tile.child();
        Some(tile)
    }
}

/// One level of a [`TileSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLevel {
    pub split_state: SplitState,
    pub area: Rect,
    pub surface_key: String,
    pub has_child: bool,
    /// Base region extent along the split axis, for oriented tiles.
    #[serde(default)]
    pub first_extent: Option<u16>,
}

/// Diagnostic view of a tile chain, root first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSnapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: u16,
    pub levels: Vec<TileLevel>,
}

fn default_schema_version() -> u16 {
    TILE_SNAPSHOT_SCHEMA_VERSION
}

impl TileSnapshot {
    /// FNV-1a over every level.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0000_0001_0000_01b3;

        fn mix(hash: &mut u64, byte: u8) {
            *hash ^= u64::from(byte);
            *hash = hash.wrapping_mul(PRIME);
        }

        fn mix_bytes(hash: &mut u64, bytes: &[u8]) {
            for byte in bytes {
                mix(hash, *byte);
            }
        }

        fn mix_u16(hash: &mut u64, value: u16) {
            mix_bytes(hash, &value.to_le_bytes());
        }

        fn mix_rect(hash: &mut u64, rect: Rect) {
            for value in [rect.x, rect.y, rect.width, rect.height] {
                mix_u16(hash, value);
            }
        }

        let mut hash = OFFSET_BASIS;
        mix_u16(&mut hash, self.schema_version);
        mix_bytes(&mut hash, &(self.levels.len() as u64).to_le_bytes());
        for level in &self.levels {
            let state = match level.split_state {
                SplitState::Unsplit => 0,
                SplitState::Horizontal => 1,
                SplitState::Vertical => 2,
            };
            mix(&mut hash, state);
            mix_rect(&mut hash, level.area);
            mix_bytes(&mut hash, &(level.surface_key.len() as u64).to_le_bytes());
            mix_bytes(&mut hash, level.surface_key.as_bytes());
            mix(&mut hash, u8::from(level.has_child));
            match level.first_extent {
                Some(extent) => {
                    mix(&mut hash, 1);
                    mix_u16(&mut hash, extent);
                }
                None => mix(&mut hash, 0),
            }
        }
        hash
    }
}
