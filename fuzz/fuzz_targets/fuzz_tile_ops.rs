#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tilework_core::geometry::{Rect, Size};
use tilework_tile::{
    RecordingHost, SplitDirective, SplitOutcome, StaticSurface, WindowContext, Workbench,
    WorkbenchError,
};

#[derive(Debug, Arbitrary)]
enum Op {
    Horizontal { depth: u8 },
    Vertical { depth: u8 },
    Split { depth: u8, min_w: u8, min_h: u8 },
    Rebase { depth: u8, min_w: u8, min_h: u8 },
    Drag { depth: u8, extent: u16 },
    Resize { width: u16, height: u16 },
    FailAfter { allowed: u8 },
}

#[derive(Debug, Arbitrary)]
struct Input {
    width: u16,
    height: u16,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let window = WindowContext::new(Rect::from_size(input.width, input.height));
    let Ok(mut bench) = Workbench::open(
        RecordingHost::new(),
        window,
        StaticSurface::new("s0", Size::new(8, 8)),
    ) else {
        return;
    };

    let mut next = 1usize;
    let mut fresh = |min_w: u8, min_h: u8| {
        let key = format!("s{next}");
        next += 1;
        StaticSurface::new(key, Size::new(u16::from(min_w), u16::from(min_h)))
    };

    // Keep chains short enough that every step stays cheap.
    for op in input.ops.iter().take(256) {
        let before = bench.state_hash();
        let result = match *op {
            Op::Horizontal { depth } => bench.apply(depth.into(), SplitDirective::Horizontal),
            Op::Vertical { depth } => bench.apply(depth.into(), SplitDirective::Vertical),
            Op::Split { depth, min_w, min_h } if bench.chain_len() < 32 => bench
                .split(depth.into(), fresh(min_w, min_h))
                .map(|outcome| {
                    if let SplitOutcome::Unoriented(surface) = outcome {
                        drop(surface);
                    }
                }),
            Op::Split { .. } => Ok(()),
            Op::Rebase { depth, min_w, min_h } => {
                bench.rebase(depth.into(), fresh(min_w, min_h)).map(drop)
            }
            Op::Drag { depth, extent } => bench.move_divider(depth.into(), extent).map(drop),
            Op::Resize { width, height } => {
                bench.resize(Rect::from_size(width, height));
                Ok(())
            }
            Op::FailAfter { allowed } => {
                bench.host_mut().fail_after(usize::from(allowed % 6));
                Ok(())
            }
        };

        match result {
            Ok(()) => {}
            Err(WorkbenchError::NoSuchTile { .. }) => assert_eq!(bench.state_hash(), before),
            Err(WorkbenchError::Tile(_)) => {
                assert_eq!(bench.state_hash(), before, "failed rebuild changed the chain");
                bench.host_mut().clear_failure();
            }
            Err(err @ WorkbenchError::Config(_)) => panic!("{op:?}: {err}"),
        }

        assert!(bench.validate().is_ok(), "invalid chain after {op:?}");
        let host = bench.host();
        assert_eq!(host.released_count(), host.created_count() - host.live_count());
        host.assert_mirrors(bench.root());
    }

    let (host, _surfaces) = bench.close();
    assert_eq!(host.live_count(), 0);
});
