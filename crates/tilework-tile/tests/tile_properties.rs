//! Structural properties of tile chains driven through the recording host.
//!
//! Every test checks the host's region table against what the chain believes
//! it owns after each mutation, so a leaked or prematurely released region
//! fails immediately.

use tilework_core::geometry::{Rect, Size};
use tilework_tile::{
    ContentSurface, HostEvent, RecordingHost, RegionKind, SplitAxis, SplitDirective, SplitOutcome,
    SplitState, StaticSurface, Tile, TileConfig, TileError, WindowContext,
};

fn surface(key: &str) -> StaticSurface {
    StaticSurface::new(key, Size::new(20, 10))
}

fn window() -> WindowContext {
    WindowContext::new(Rect::from_size(640, 480))
}

fn open(host: &mut RecordingHost, key: &str) -> Tile<StaticSurface> {
    Tile::new(host, window(), surface(key)).expect("mount")
}

/// Validity, child/state agreement and host bookkeeping after a mutation.
fn check(host: &RecordingHost, tile: &Tile<StaticSurface>) {
    tile.validate().expect("chain is valid");
    for level in tile.chain() {
        match level.split_state() {
            SplitState::Unsplit => assert!(level.child().is_none()),
            SplitState::Horizontal | SplitState::Vertical => {}
        }
        if level.child().is_some() {
            assert!(level.split_state().is_split());
        }
    }
    assert_eq!(
        host.released_count(),
        host.created_count() - host.live_count(),
        "released != created - live"
    );
    host.assert_mirrors(tile);
}

fn keys(surfaces: &[StaticSurface]) -> Vec<&str> {
    surfaces.iter().map(|s| s.surface_key()).collect()
}

#[test]
fn vertical_then_horizontal_keeps_child() {
    let mut host = RecordingHost::new();
    let mut root = open(&mut host, "A");
    assert_eq!(root.split_state(), SplitState::Unsplit);

    root.split_vertical(&mut host).expect("vertical");
    check(&host, &root);
    assert_eq!(root.split_state(), SplitState::Vertical);
    assert!(root.child().is_none());

    let outcome = root.split(&mut host, surface("B")).expect("split");
    assert!(outcome.is_created());
    check(&host, &root);
    let regions = root.regions();
    // Two stacked panes: same x, second below first.
    assert_eq!(regions[1].rect.x, regions[3].rect.x);
    assert!(regions[3].rect.y > regions[1].rect.bottom());
    let child: *const Tile<StaticSurface> = root.child().expect("child B");

    root.split_horizontal(&mut host).expect("horizontal");
    check(&host, &root);
    assert_eq!(root.split_state(), SplitState::Horizontal);
    let kept = root.child().expect("child kept");
    assert!(std::ptr::eq(kept, child));
    assert_eq!(kept.base().surface_key(), "B");

    let regions = root.regions();
    assert_eq!(regions[0].kind, RegionKind::Splitter(SplitAxis::Horizontal));
    // Side by side: left shows A, right holds B's subtree.
    assert_eq!(regions[1].rect.y, regions[3].rect.y);
    assert!(regions[3].rect.x > regions[1].rect.right());
    assert_eq!(host.surface_region("A"), Some(regions[1].id));
    assert_eq!(host.parent_of(kept.base_region()), Some(regions[3].id));
}

#[test]
fn repeated_orientation_rebuilds_same_shape() {
    let mut host = RecordingHost::new();
    let mut root = open(&mut host, "A");
    root.split_horizontal(&mut host).expect("orient");
    root.split(&mut host, surface("B")).expect("split");

    root.split_horizontal(&mut host).expect("first");
    let hash = root.state_hash();
    let child: *const Tile<StaticSurface> = root.child().expect("child");
    let created = host.created_count();
    let released = host.released_count();

    root.split_horizontal(&mut host).expect("second");
    check(&host, &root);
    assert_eq!(root.state_hash(), hash);
    assert!(std::ptr::eq(root.child().expect("child"), child));
    assert_eq!(root.base().surface_key(), "A");
    // A rebuild happened: a fresh splitter, panes and divider.
    assert_eq!(host.created_count(), created + 4);
    assert_eq!(host.released_count(), released + 4);
}

#[test]
fn orientation_round_trip_keeps_child() {
    let mut host = RecordingHost::new();
    let mut root = open(&mut host, "A");
    root.split_vertical(&mut host).expect("orient");
    root.split(&mut host, surface("C")).expect("split");
    let child: *const Tile<StaticSurface> = root.child().expect("child");

    root.split_horizontal(&mut host).expect("horizontal");
    check(&host, &root);
    root.split_vertical(&mut host).expect("vertical");
    check(&host, &root);
    assert!(std::ptr::eq(root.child().expect("child"), child));
    assert_eq!(root.child().expect("child").base().surface_key(), "C");
}

#[test]
fn teardown_is_bottom_up() {
    let mut host = RecordingHost::new();
    let mut root = open(&mut host, "A");
    root.split_vertical(&mut host).expect("orient");
    root.split(&mut host, surface("B")).expect("split");
    root.child_mut()
        .expect("child")
        .split_horizontal(&mut host)
        .expect("orient child");
    root.child_mut()
        .expect("child")
        .split(&mut host, surface("C"))
        .expect("split child");
    check(&host, &root);

    // Replacing the child tears its whole subtree down before the old
    // arrangement goes.
    host.clear_events();
    let outcome = root.split(&mut host, surface("D")).expect("replace");
    let SplitOutcome::Created { displaced } = outcome else {
        panic!("expected created");
    };
    assert_eq!(keys(&displaced), ["B", "C"]);
    check(&host, &root);

    let mut live: Vec<_> = Vec::new();
    for event in host.events() {
        match event {
            HostEvent::Create { region, .. } => live.push(*region),
            HostEvent::Release { region } => live.retain(|r| r != region),
            _ => {}
        }
    }
    // Only the new arrangement's regions were created and survive.
    assert_eq!(live.len(), root.region_count());

    let surfaces = root.close(&mut host);
    assert_eq!(keys(&surfaces), ["A", "D"]);
    assert_eq!(host.live_count(), 0);
    assert_eq!(host.released_count(), host.created_count());
}

#[test]
fn sequential_splits_build_a_chain() {
    const SPLITS: usize = 6;
    let mut host = RecordingHost::new();
    let mut root = Tile::new(
        &mut host,
        WindowContext::new(Rect::from_size(4000, 4000)),
        surface("s0"),
    )
    .expect("mount");

    for n in 1..=SPLITS {
        let deepest = root.descendant_mut(n - 1).expect("deepest");
        let axis = if n % 2 == 0 {
            SplitDirective::Vertical
        } else {
            SplitDirective::Horizontal
        };
        deepest.apply(&mut host, axis).expect("orient");
        deepest
            .split(&mut host, surface(&format!("s{n}")))
            .expect("split");
        check(&host, &root);
    }

    assert_eq!(root.chain_len(), SPLITS + 1);
    let surfaces: Vec<_> = root.chain().map(|t| t.base().surface_key()).collect();
    let expected: Vec<_> = (0..=SPLITS).map(|n| format!("s{n}")).collect();
    assert_eq!(surfaces, expected);
    assert_eq!(root.deepest().split_state(), SplitState::Unsplit);
    assert!(root.deepest().child().is_none());
}

#[test]
fn failed_allocation_is_atomic_at_every_step() {
    // A split that creates a child needs five regions; fail each in turn.
    for allowed in 0..5 {
        let mut host = RecordingHost::new();
        let mut root = open(&mut host, "A");
        root.split_vertical(&mut host).expect("orient");
        root.split(&mut host, surface("B")).expect("split");

        let hash = root.state_hash();
        let geometry = root.geometry();
        let live = host.live_count();

        host.fail_after(allowed);
        let err = root
            .split(&mut host, surface("C"))
            .expect_err("allocation fails");
        assert!(matches!(err, TileError::Host(_)), "allowed={allowed}");
        let err = root
            .split_horizontal(&mut host)
            .expect_err("allocation fails");
        assert!(matches!(err, TileError::Host(_)), "allowed={allowed}");

        assert_eq!(root.state_hash(), hash, "allowed={allowed}");
        assert_eq!(root.geometry(), geometry, "allowed={allowed}");
        assert_eq!(host.live_count(), live, "allowed={allowed}");
        check(&host, &root);

        host.clear_failure();
        root.split_horizontal(&mut host).expect("recovers");
        check(&host, &root);
    }
}

#[test]
fn failed_mount_leaves_no_regions() {
    let mut host = RecordingHost::new();
    host.fail_after(0);
    let err = Tile::new(&mut host, window(), surface("A")).expect_err("no frame");
    assert_eq!(
        err.to_string(),
        "recomposition aborted: host out of resources allocating Frame region"
    );
    assert_eq!(host.live_count(), 0);
}

#[test]
fn rebase_on_unsplit_and_nested_tiles() {
    let mut host = RecordingHost::new();
    let mut root = open(&mut host, "A");
    let old = root.rebase(&mut host, surface("A2"));
    assert_eq!(old.surface_key(), "A");
    check(&host, &root);

    root.split_horizontal(&mut host).expect("orient");
    root.split(&mut host, surface("B")).expect("split");
    let child = root.child_mut().expect("child");
    let old = child.rebase(&mut host, surface("B2"));
    assert_eq!(old.surface_key(), "B");
    assert_eq!(root.split_state(), SplitState::Horizontal);
    check(&host, &root);
}

#[test]
fn resize_tiles_inner_area_exactly() {
    let mut host = RecordingHost::new();
    let mut root = open(&mut host, "A");
    root.split_horizontal(&mut host).expect("orient");
    root.split(&mut host, surface("B")).expect("split");
    let child = root.child_mut().expect("child");
    child.split_vertical(&mut host).expect("orient child");
    child.split(&mut host, surface("C")).expect("split child");

    for (width, height) in [(900, 700), (640, 480), (300, 200), (2000, 90)] {
        root.resize(&mut host, Rect::from_size(width, height));
        check(&host, &root);
        for tile in root.chain() {
            let Some(geometry) = tile.split_geometry() else {
                continue;
            };
            let rects = geometry.rects();
            let axis = geometry.axis;
            assert_eq!(
                axis.along(rects.first.size())
                    + axis.along(rects.divider.size())
                    + axis.along(rects.second.size()),
                axis.along(geometry.inner.size()),
            );
        }
    }
}

#[test]
fn resize_shares_growth_between_panes() {
    let mut host = RecordingHost::new();
    let mut root = open(&mut host, "A");
    root.split_horizontal(&mut host).expect("orient");
    let before = root.split_geometry().expect("split");

    root.resize(&mut host, Rect::from_size(740, 480));
    let after = root.split_geometry().expect("split");
    assert_eq!(after.first_extent, before.first_extent + 50);
    assert_eq!(after.second_extent(), before.second_extent() + 50);
    check(&host, &root);
}

#[test]
fn divider_drag_respects_minimums() {
    let mut host = RecordingHost::new();
    let mut root = open(&mut host, "A");
    root.split_vertical(&mut host).expect("orient");
    root.split(&mut host, surface("B")).expect("split");

    let geometry = root.split_geometry().expect("split");
    let applied = root.move_divider(&mut host, u16::MAX);
    assert_eq!(applied, geometry.available() - geometry.panel_floor);
    let applied = root.move_divider(&mut host, 0);
    assert_eq!(applied, 16);
    check(&host, &root);
}

#[test]
fn min_size_grows_with_depth() {
    let mut host = RecordingHost::new();
    let mut root = Tile::new(
        &mut host,
        WindowContext::new(Rect::from_size(3000, 3000)).with_config(TileConfig::default()),
        surface("s0"),
    )
    .expect("mount");

    let unsplit = root.min_size();
    let mut previous = unsplit;
    for n in 1..=4 {
        let deepest = root.descendant_mut(n - 1).expect("deepest");
        deepest.split_vertical(&mut host).expect("orient");
        deepest
            .split(&mut host, surface(&format!("s{n}")))
            .expect("split");
        let next = root.min_size();
        assert!(next.height >= previous.height, "depth {n}");
        assert!(next.width >= previous.width, "depth {n}");
        previous = next;
    }
    // Each level needs at least a divider plus both minimums.
    let config = TileConfig::default();
    assert!(previous.height >= unsplit.height + config.divider + config.min_region.height);
}

#[test]
fn snapshot_serializes_chain_shape() {
    let mut host = RecordingHost::new();
    let mut root = open(&mut host, "A");
    root.split_vertical(&mut host).expect("orient");
    root.split(&mut host, surface("B")).expect("split");

    let json = serde_json::to_value(root.snapshot()).expect("serialize");
    assert_eq!(json["schema_version"], 1);
    assert_eq!(json["levels"][0]["split_state"], "vertical");
    assert_eq!(json["levels"][0]["surface_key"], "A");
    assert_eq!(json["levels"][0]["has_child"], true);
    assert_eq!(json["levels"][1]["split_state"], "unsplit");
    assert_eq!(json["levels"][1]["first_extent"], serde_json::Value::Null);
}
