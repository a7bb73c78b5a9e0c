//! Layout invariants over arbitrary stock universes and canvas sizes:
//!
//! 1. Every level tiles its content rect (area conserved, inside, disjoint).
//! 2. Sibling areas are proportional to their weights.
//! 3. Every plottable stock gets exactly one leaf, even on a zero canvas.
//! 4. Equal inputs give equal layouts.

use heatmap_core::config::HeatmapConfig;
use heatmap_core::layout::compose_layout;
use heatmap_core::model::{Rect, StockEntity, Taxonomy};
use heatmap_core::treemap::{squarify, TreemapItem};
use heatmap_core::{compress_weight, HeatmapLayout};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

const EPS: f64 = 1e-6;

// ── Strategies ──────────────────────────────────────────────────────────

fn group_id() -> impl Strategy<Value = Option<String>> {
    // Empty ids count as missing and land in "other".
    proptest::option::of("[a-e]{0,2}")
}

fn stock_strategy() -> impl Strategy<Value = StockEntity> {
    (
        "[A-Z]{1,5}",
        1.0f64..1e12,
        -20.0f64..20.0,
        group_id(),
        group_id(),
    )
        .prop_map(|(symbol, market_cap, change_percent, sector_id, industry_id)| StockEntity {
            name: format!("{symbol} Inc"),
            symbol,
            price: 10.0,
            change: change_percent / 10.0,
            change_percent,
            market_cap,
            sector_id,
            industry_id,
            value: change_percent,
        })
}

fn universe(max_len: usize) -> impl Strategy<Value = Vec<StockEntity>> {
    proptest::collection::vec(stock_strategy(), 1..=max_len)
}

fn extent() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), 0.0f64..4.0, 0.0f64..2000.0]
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn assert_tiles(parent: Rect, children: &[Rect]) -> Result<(), TestCaseError> {
    let sum: f64 = children.iter().map(Rect::area).sum();
    prop_assert!(
        (sum - parent.area()).abs() <= EPS * parent.area().max(1.0),
        "children cover {}, parent {}",
        sum,
        parent.area()
    );
    for (i, a) in children.iter().enumerate() {
        prop_assert!(a.width >= 0.0 && a.height >= 0.0);
        prop_assert!(a.x >= parent.x - EPS && a.right() <= parent.right() + EPS);
        prop_assert!(a.y >= parent.y - EPS && a.bottom() <= parent.bottom() + EPS);
        for b in &children[i + 1..] {
            prop_assert!(a.overlap(b) <= EPS, "{:?} overlaps {:?}", a, b);
        }
    }
    Ok(())
}

fn check_every_level(layout: &HeatmapLayout, cfg: &HeatmapConfig) -> Result<(), TestCaseError> {
    assert_tiles(layout.canvas, &layout.sectors.iter().map(|s| s.rect).collect::<Vec<_>>())?;
    for sector in &layout.sectors {
        assert_tiles(
            sector.content_rect(cfg),
            &sector.children.iter().map(|i| i.rect).collect::<Vec<_>>(),
        )?;
        for industry in &sector.children {
            assert_tiles(
                industry.content_rect(cfg),
                &industry.children.iter().map(|s| s.rect).collect::<Vec<_>>(),
            )?;
        }
    }
    Ok(())
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Tiling
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn every_level_tiles_its_content_rect(
        stocks in universe(60),
        w in extent(),
        h in extent(),
    ) {
        let cfg = HeatmapConfig::default();
        let layout = compose_layout(&stocks, w, h, &Taxonomy::default(), &cfg);
        check_every_level(&layout, &cfg)?;
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Proportionality
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn sibling_areas_are_proportional_to_weights(
        stocks in universe(60),
        w in 1.0f64..2000.0,
        h in 1.0f64..2000.0,
    ) {
        let cfg = HeatmapConfig::default();
        let layout = compose_layout(&stocks, w, h, &Taxonomy::default(), &cfg);

        let total: f64 = layout.sectors.iter().map(|s| s.total_weight).sum();
        let canvas = layout.canvas.area();
        for sector in &layout.sectors {
            let expected = sector.total_weight / total * canvas;
            prop_assert!((sector.rect.area() - expected).abs() <= EPS * canvas.max(1.0));

            let content = sector.content_rect(&cfg).area();
            for industry in &sector.children {
                let expected = industry.total_weight / sector.total_weight * content;
                prop_assert!((industry.rect.area() - expected).abs() <= EPS * content.max(1.0));

                let content = industry.content_rect(&cfg).area();
                for leaf in &industry.children {
                    let expected = compress_weight(leaf.stock.market_cap) / industry.total_weight * content;
                    prop_assert!((leaf.rect.area() - expected).abs() <= EPS * content.max(1.0));
                }
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Every stock is placed, whatever the canvas
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn every_stock_gets_one_leaf(
        stocks in universe(60),
        w in extent(),
        h in extent(),
    ) {
        let layout = compose_layout(&stocks, w, h, &Taxonomy::default(), &HeatmapConfig::default());
        prop_assert_eq!(layout.stocks().count(), stocks.len());
        for leaf in layout.stocks() {
            prop_assert!(leaf.rect.width >= 0.0 && leaf.rect.height >= 0.0);
            prop_assert!(leaf.rect.area() <= w * h + EPS);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Determinism
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn layout_is_deterministic_for_equal_inputs(
        stocks in universe(40),
        w in extent(),
        h in extent(),
    ) {
        let cfg = HeatmapConfig::default();
        let a = compose_layout(&stocks, w, h, &Taxonomy::default(), &cfg);
        let b = compose_layout(&stocks.clone(), w, h, &Taxonomy::default(), &cfg);
        prop_assert_eq!(a, b);
    }
}

#[test]
fn compressed_market_caps_example() {
    let caps = [100.0, 400.0, 2500.0];
    let items = caps
        .iter()
        .map(|&c| TreemapItem::new(compress_weight(c), c))
        .collect();
    let placed = squarify(items, Rect::new(0.0, 0.0, 100.0, 80.0), 80.0);
    for (cap, area) in [(100.0, 1000.0), (400.0, 2000.0), (2500.0, 5000.0)] {
        let p = placed.iter().find(|p| p.payload == cap).unwrap();
        assert!((p.rect.area() - area).abs() < 1e-9);
    }
}
