#![forbid(unsafe_code)]

//! Recursive pane splitting for workbench windows.
//!
//! A window is laid out as a chain of [`Tile`]s. Each tile shows one base
//! [`ContentSurface`] and, once split, hosts a child tile in the second half
//! of a splitter. Splitting, re-orienting and rebasing a tile rebuild its
//! regions through a [`RegionHost`], the only view the engine has of the
//! host toolkit.
//!
//! ```
//! use tilework_core::geometry::{Rect, Size};
//! use tilework_tile::{RecordingHost, SplitAxis, StaticSurface, WindowContext, Workbench};
//!
//! let window = WindowContext::new(Rect::from_size(800, 600));
//! let editor = StaticSurface::new("editor", Size::new(40, 20));
//! let mut bench = Workbench::open(RecordingHost::new(), window, editor).unwrap();
//!
//! bench
//!     .push_pane(SplitAxis::Horizontal, StaticSurface::new("eval", Size::new(40, 20)))
//!     .unwrap();
//! assert_eq!(bench.chain_len(), 2);
//! assert!(bench.validate().is_ok());
//! ```

pub mod compositor;
pub mod config;
pub mod error;
pub mod host;
pub mod recording;
pub mod split;
pub mod surface;
pub mod tile;
pub mod workbench;

pub use compositor::{PlacedRegion, SplitGeometry, SplitRects};
pub use config::{ConfigError, TileConfig};
pub use error::{TileError, TileInvariantError, TileInvariantKind};
pub use host::{HostError, RegionHost, RegionId, RegionKind, RegionRequest};
pub use recording::{HostEvent, RecordingHost, RegionRecord, StaticSurface};
pub use split::{SplitAxis, SplitDirective, SplitState};
pub use surface::ContentSurface;
pub use tile::{
    Chain, SplitOutcome, TILE_SNAPSHOT_SCHEMA_VERSION, Tile, TileLevel, TileSnapshot,
    WindowContext,
};
pub use workbench::{Workbench, WorkbenchError};
