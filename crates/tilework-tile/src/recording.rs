//! In-memory [`RegionHost`] for tests, benchmarks and headless use.
//!
//! [`RecordingHost`] keeps a region table and an event log, and enforces the
//! host contract on every call: a region is released only once it has no
//! attached surface and no child regions, and no call may name a region the
//! host does not know. Violations panic, since they mean the tile engine
//! lost track of its regions.

use rustc_hash::FxHashMap;
use tilework_core::geometry::{Rect, Size};
use tracing::trace;

use crate::host::{HostError, RegionHost, RegionId, RegionKind, RegionRequest};
use crate::surface::ContentSurface;
use crate::tile::Tile;

/// One call received by a [`RecordingHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Create {
        region: RegionId,
        kind: RegionKind,
        parent: Option<RegionId>,
    },
    Place {
        region: RegionId,
        rect: Rect,
    },
    Reparent {
        region: RegionId,
        parent: Option<RegionId>,
    },
    Attach {
        region: RegionId,
        surface: String,
    },
    Detach {
        region: RegionId,
        surface: String,
    },
    Invalidate {
        region: RegionId,
    },
    Hide {
        region: RegionId,
    },
    Release {
        region: RegionId,
    },
}

/// Host-side view of a live region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionRecord {
    pub kind: RegionKind,
    pub parent: Option<RegionId>,
    pub rect: Rect,
    pub visible: bool,
    /// Key of the attached surface, if any.
    pub surface: Option<String>,
}

/// Region table plus counters and an event log.
#[derive(Debug, Default)]
pub struct RecordingHost {
    regions: FxHashMap<RegionId, RegionRecord>,
    next_id: u64,
    created: usize,
    released: usize,
    /// Allocations left before every further one fails.
    allocations_left: Option<usize>,
    events: Vec<HostEvent>,
}

impl RecordingHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Let the next `allocations` region requests succeed, then fail every
    /// request until [`clear_failure`](Self::clear_failure).
    pub fn fail_after(&mut self, allocations: usize) {
        self.allocations_left = Some(allocations);
    }

    pub fn clear_failure(&mut self) {
        self.allocations_left = None;
    }

    /// Regions created over the host's lifetime.
    #[must_use]
    pub const fn created_count(&self) -> usize {
        self.created
    }

    /// Regions released over the host's lifetime.
    #[must_use]
    pub const fn released_count(&self) -> usize {
        self.released
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.regions.len()
    }

    #[must_use]
    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    #[must_use]
    pub fn region(&self, region: RegionId) -> Option<&RegionRecord> {
        self.regions.get(&region)
    }

    #[must_use]
    pub fn parent_of(&self, region: RegionId) -> Option<RegionId> {
        self.regions.get(&region).and_then(|record| record.parent)
    }

    #[must_use]
    pub fn rect_of(&self, region: RegionId) -> Option<Rect> {
        self.regions.get(&region).map(|record| record.rect)
    }

    /// Live regions directly under `parent`, in id order.
    #[must_use]
    pub fn children_of(&self, parent: Option<RegionId>) -> Vec<RegionId> {
        let mut children: Vec<_> = self
            .regions
            .iter()
            .filter(|(_, record)| record.parent == parent)
            .map(|(id, _)| *id)
            .collect();
        children.sort_unstable();
        children
    }

    /// Region currently showing the surface with key `key`.
    #[must_use]
    pub fn surface_region(&self, key: &str) -> Option<RegionId> {
        self.regions
            .iter()
            .find(|(_, record)| record.surface.as_deref() == Some(key))
            .map(|(id, _)| *id)
    }

    /// Assert that the live region table is exactly what `root`'s chain
    /// believes it owns: same regions, parents, rectangles and surfaces.
    ///
    /// # Panics
    ///
    /// On the first mismatch.
    pub fn assert_mirrors<S: ContentSurface>(&self, root: &Tile<S>) {
        assert_eq!(
            self.live_count(),
            root.region_count(),
            "host holds regions no tile owns"
        );
        for (depth, tile) in root.chain().enumerate() {
            let regions = tile.regions();
            let top = regions[0].id;
            assert_eq!(
                self.parent_of(top),
                tile.container(),
                "depth {depth}: top region parented elsewhere"
            );
            for placed in &regions {
                let record = self
                    .region(placed.id)
                    .unwrap_or_else(|| panic!("depth {depth}: {} not live", placed.id));
                assert_eq!(record.kind, placed.kind, "depth {depth}: {}", placed.id);
                assert_eq!(record.rect, placed.rect, "depth {depth}: {}", placed.id);
                assert!(record.visible, "depth {depth}: {} hidden", placed.id);
                if placed.id != top {
                    assert_eq!(record.parent, Some(top), "depth {depth}: {}", placed.id);
                }
            }
            let base = self.region(tile.base_region()).map(|r| r.surface.as_deref());
            assert_eq!(
                base,
                Some(Some(tile.base().surface_key())),
                "depth {depth}: base surface not shown"
            );
            if regions.len() == 4 {
                let expected: Vec<_> = tile
                    .child()
                    .map(|child| child.regions()[0].id)
                    .into_iter()
                    .collect();
                assert_eq!(
                    self.children_of(Some(regions[3].id)),
                    expected,
                    "depth {depth}: second pane content"
                );
            }
        }
    }

    fn record_mut(&mut self, region: RegionId) -> &mut RegionRecord {
        match self.regions.get_mut(&region) {
            Some(record) => record,
            None => panic!("unknown region {region}"),
        }
    }
}

impl<S: ContentSurface + ?Sized> RegionHost<S> for RecordingHost {
    fn create_region(&mut self, request: &RegionRequest) -> Result<RegionId, HostError> {
        if let Some(left) = self.allocations_left.as_mut() {
            if *left == 0 {
                return Err(HostError::OutOfResources { kind: request.kind });
            }
            *left -= 1;
        }
        if let Some(parent) = request.parent {
            let kind = self.record_mut(parent).kind;
            assert!(kind.is_container(), "{parent} ({kind:?}) cannot hold regions");
        }
        self.next_id += 1;
        let region = RegionId::new(self.next_id);
        self.regions.insert(
            region,
            RegionRecord {
                kind: request.kind,
                parent: request.parent,
                rect: request.rect,
                visible: true,
                surface: None,
            },
        );
        self.created += 1;
        trace!(target: "tilework.host", region = %region, kind = ?request.kind, "create");
        self.events.push(HostEvent::Create {
            region,
            kind: request.kind,
            parent: request.parent,
        });
        Ok(region)
    }

    fn place(&mut self, region: RegionId, rect: Rect) {
        self.record_mut(region).rect = rect;
        self.events.push(HostEvent::Place { region, rect });
    }

    fn reparent(&mut self, region: RegionId, parent: Option<RegionId>) {
        if let Some(parent) = parent {
            assert_ne!(parent, region, "{region} cannot contain itself");
            let kind = self.record_mut(parent).kind;
            assert!(kind.is_container(), "{parent} ({kind:?}) cannot hold regions");
        }
        self.record_mut(region).parent = parent;
        self.events.push(HostEvent::Reparent { region, parent });
    }

    fn attach(&mut self, region: RegionId, surface: &S) {
        let key = surface.surface_key().to_owned();
        let record = self.record_mut(region);
        assert!(
            record.surface.is_none(),
            "{region} already shows {:?}",
            record.surface
        );
        record.surface = Some(key.clone());
        self.events.push(HostEvent::Attach {
            region,
            surface: key,
        });
    }

    fn detach(&mut self, region: RegionId, surface: &S) {
        let key = surface.surface_key();
        let record = self.record_mut(region);
        assert_eq!(
            record.surface.as_deref(),
            Some(key),
            "{region} does not show {key}"
        );
        record.surface = None;
        self.events.push(HostEvent::Detach {
            region,
            surface: key.to_owned(),
        });
    }

    fn invalidate(&mut self, region: RegionId) {
        self.record_mut(region);
        self.events.push(HostEvent::Invalidate { region });
    }

    fn hide(&mut self, region: RegionId) {
        self.record_mut(region).visible = false;
        self.events.push(HostEvent::Hide { region });
    }

    fn release(&mut self, region: RegionId) {
        let record = self.record_mut(region);
        assert!(
            record.surface.is_none(),
            "releasing {region} while it shows {:?}",
            record.surface
        );
        let children = self.children_of(Some(region));
        assert!(
            children.is_empty(),
            "releasing {region} while it holds {children:?}"
        );
        self.regions.remove(&region);
        self.released += 1;
        trace!(target: "tilework.host", region = %region, "release");
        self.events.push(HostEvent::Release { region });
    }
}

/// Fixed-size surface identified by a string key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StaticSurface {
    key: String,
    min: Size,
}

impl StaticSurface {
    #[must_use]
    pub fn new(key: impl Into<String>, min: Size) -> Self {
        Self {
            key: key.into(),
            min,
        }
    }
}

impl ContentSurface for StaticSurface {
    fn surface_key(&self) -> &str {
        &self.key
    }

    fn min_size(&self) -> Size {
        self.min
    }
}
