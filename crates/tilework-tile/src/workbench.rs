//! Single-window owner of a tile chain and its host.
//!
//! A [`Workbench`] owns the host and exactly one root [`Tile`]. Tiles are
//! addressed by depth in the chain (0 is the root). Structural changes to a
//! nested tile change its minimum size, so the workbench reflows the whole
//! chain from the root afterwards.

use std::fmt;

use tilework_core::geometry::{Rect, Size};
use tracing::{debug, info, warn};

use crate::config::ConfigError;
use crate::error::{TileError, TileInvariantError};
use crate::host::RegionHost;
use crate::split::{SplitAxis, SplitDirective};
use crate::surface::ContentSurface;
use crate::tile::{SplitOutcome, Tile, TileSnapshot, WindowContext};

/// Failure of a [`Workbench`] operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkbenchError {
    /// `depth` is past the end of the chain.
    NoSuchTile { depth: usize, chain_len: usize },
    /// The window's [`TileConfig`](crate::TileConfig) was rejected.
    Config(ConfigError),
    Tile(TileError),
}

impl fmt::Display for WorkbenchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSuchTile { depth, chain_len } => write!(
                f,
                "no tile at depth {depth} (chain has {chain_len} tile(s))"
            ),
            Self::Config(err) => write!(f, "invalid tile config: {err}"),
            Self::Tile(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for WorkbenchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NoSuchTile { .. } => None,
            Self::Config(err) => Some(err),
            Self::Tile(err) => Some(err),
        }
    }
}

impl From<ConfigError> for WorkbenchError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<TileError> for WorkbenchError {
    fn from(err: TileError) -> Self {
        Self::Tile(err)
    }
}

/// A host window and the tile chain laid out in it.
#[derive(Debug)]
pub struct Workbench<S, H> {
    host: H,
    root: Tile<S>,
}

impl<S, H> Workbench<S, H>
where
    S: ContentSurface,
    H: RegionHost<S>,
{
    /// Mount `surface` as the root tile of a new window.
    ///
    /// The window's config is validated first; nothing is allocated for a
    /// rejected one.
    pub fn open(mut host: H, window: WindowContext, surface: S) -> Result<Self, WorkbenchError> {
        window.config.validate()?;
        let root = Tile::new(&mut host, window, surface)?;
        info!(
            target: "tilework.workbench",
            area = ?window.area,
            surface = root.base().surface_key(),
            "workbench opened"
        );
        Ok(Self { host, root })
    }

    #[must_use]
    pub fn root(&self) -> &Tile<S> {
        &self.root
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Direct host access, for host-side state only. Regions owned by tiles
    /// must not be released through it.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn tile(&self, depth: usize) -> Result<&Tile<S>, WorkbenchError> {
        self.root.descendant(depth).ok_or(WorkbenchError::NoSuchTile {
            depth,
            chain_len: self.root.chain_len(),
        })
    }

    #[must_use]
    pub fn chain_len(&self) -> usize {
        self.root.chain_len()
    }

    pub fn split_horizontal(&mut self, depth: usize) -> Result<(), WorkbenchError> {
        self.apply(depth, SplitDirective::Horizontal)
    }

    pub fn split_vertical(&mut self, depth: usize) -> Result<(), WorkbenchError> {
        self.apply(depth, SplitDirective::Vertical)
    }

    pub fn apply(&mut self, depth: usize, directive: SplitDirective) -> Result<(), WorkbenchError> {
        self.with_tile(depth, |tile, host| tile.apply(host, directive))?
            .map_err(WorkbenchError::from)
    }

    pub fn split(&mut self, depth: usize, surface: S) -> Result<SplitOutcome<S>, WorkbenchError> {
        self.with_tile(depth, |tile, host| tile.split(host, surface))?
            .map_err(WorkbenchError::from)
    }

    /// Swap the base surface of the tile at `depth`, returning the old one.
    ///
    /// The new surface may have a different minimum size, so the chain is
    /// reflowed afterwards.
    pub fn rebase(&mut self, depth: usize, surface: S) -> Result<S, WorkbenchError> {
        let previous = self.with_tile(depth, |tile, host| tile.rebase(host, surface))?;
        if depth == 0 {
            self.reflow();
        }
        Ok(previous)
    }

    pub fn move_divider(&mut self, depth: usize, first_extent: u16) -> Result<u16, WorkbenchError> {
        self.with_tile(depth, |tile, host| tile.move_divider(host, first_extent))
    }

    /// Orient the deepest tile along `axis` and put `surface` in a new tile
    /// beside it. Returns the new tile's depth.
    ///
    /// Runs as a single rebuild: on error the deepest tile keeps its
    /// previous state.
    pub fn push_pane(&mut self, axis: SplitAxis, surface: S) -> Result<usize, WorkbenchError> {
        let depth = self.chain_len() - 1;
        self.with_tile(depth, |tile, host| tile.split_along(host, axis, surface))??;
        Ok(depth + 1)
    }

    /// Host window resize notification.
    pub fn resize(&mut self, area: Rect) {
        debug!(target: "tilework.workbench", area = ?area, "window resized");
        let min = self.root.min_size();
        if !area.size().fits(min) {
            warn!(
                target: "tilework.workbench",
                area = ?area,
                min = ?min,
                "window smaller than the chain's minimum size"
            );
        }
        self.root.resize(&mut self.host, area);
    }

    /// Smallest window area the chain can be laid out in.
    #[must_use]
    pub fn min_size(&self) -> Size {
        self.root.min_size()
    }

    #[must_use]
    pub fn snapshot(&self) -> TileSnapshot {
        self.root.snapshot()
    }

    #[must_use]
    pub fn state_hash(&self) -> u64 {
        self.root.state_hash()
    }

    pub fn validate(&self) -> Result<(), TileInvariantError> {
        self.root.validate()
    }

    /// Tear the chain down and hand back the host and every surface.
    pub fn close(mut self) -> (H, Vec<S>) {
        let surfaces = self.root.close(&mut self.host);
        info!(
            target: "tilework.workbench",
            surfaces = surfaces.len(),
            "workbench closed"
        );
        (self.host, surfaces)
    }

    fn reflow(&mut self) {
        self.root.resize(&mut self.host, self.root.area());
    }

    /// Run `op` on the tile at `depth`, then reflow from the root if the
    /// tile was nested.
    fn with_tile<T>(
        &mut self,
        depth: usize,
        op: impl FnOnce(&mut Tile<S>, &mut H) -> T,
    ) -> Result<T, WorkbenchError> {
        let Self { host, root } = self;
        let chain_len = root.chain_len();
        let tile = root
            .descendant_mut(depth)
            .ok_or(WorkbenchError::NoSuchTile { depth, chain_len })?;
        let result = op(tile, &mut *host);
        if depth > 0 {
            root.resize(host, root.area());
        }
        debug!(
            target: "tilework.workbench",
            depth,
            chain_len = root.chain_len(),
            "tile updated"
        );
        Ok(result)
    }
}
