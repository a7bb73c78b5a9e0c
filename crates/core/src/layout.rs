//! Three-level heatmap layout: sectors tile the canvas, industries tile each
//! sector below its header strip, stocks tile each industry below its own.

use serde::Serialize;

use crate::compress::compress_weight;
use crate::config::HeatmapConfig;
use crate::hierarchy::build_hierarchy_with;
use crate::model::{Point, Rect, SectorGroup, StockEntity, Taxonomy};
use crate::treemap::{squarify, TreemapItem};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockNode {
    pub rect: Rect,
    pub stock: StockEntity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryNode {
    pub rect: Rect,
    pub industry_id: String,
    pub name: String,
    pub children: Vec<StockNode>,
    pub total_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorNode {
    pub rect: Rect,
    pub sector_id: String,
    pub name: String,
    pub children: Vec<IndustryNode>,
    pub total_weight: f64,
}

impl SectorNode {
    /// Area left for industries once the label strip is taken.
    pub fn content_rect(&self, cfg: &HeatmapConfig) -> Rect {
        self.rect
            .below_header(cfg.sector_header.height_for(self.rect.height))
    }
}

impl IndustryNode {
    pub fn content_rect(&self, cfg: &HeatmapConfig) -> Rect {
        self.rect
            .below_header(cfg.industry_header.height_for(self.rect.height))
    }
}

/// Borrowed view of any node in the tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutNode<'a> {
    Sector(&'a SectorNode),
    Industry(&'a IndustryNode),
    Stock(&'a StockNode),
}

impl<'a> LayoutNode<'a> {
    pub fn rect(&self) -> Rect {
        match self {
            LayoutNode::Sector(n) => n.rect,
            LayoutNode::Industry(n) => n.rect,
            LayoutNode::Stock(n) => n.rect,
        }
    }

    pub fn label(&self) -> &'a str {
        match *self {
            LayoutNode::Sector(n) => &n.name,
            LayoutNode::Industry(n) => &n.name,
            LayoutNode::Stock(n) => &n.stock.symbol,
        }
    }
}

/// A complete layout pass. Rebuilt wholesale whenever inputs change.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapLayout {
    pub canvas: Rect,
    pub sectors: Vec<SectorNode>,
}

impl HeatmapLayout {
    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    pub fn stocks(&self) -> impl Iterator<Item = &StockNode> {
        self.sectors
            .iter()
            .flat_map(|s| &s.children)
            .flat_map(|i| &i.children)
    }

    pub fn find_stock(&self, symbol: &str) -> Option<&StockNode> {
        self.stocks().find(|n| n.stock.symbol == symbol)
    }

    /// Deepest node containing `p` (data space). A point on an industry's
    /// header strip resolves to the industry, on a sector's to the sector.
    pub fn hit_test(&self, p: Point) -> Option<LayoutNode<'_>> {
        let sector = self.sectors.iter().find(|s| s.rect.contains(p))?;
        let Some(industry) = sector.children.iter().find(|i| i.rect.contains(p)) else {
            return Some(LayoutNode::Sector(sector));
        };
        match industry.children.iter().find(|n| n.rect.contains(p)) {
            Some(stock) => Some(LayoutNode::Stock(stock)),
            None => Some(LayoutNode::Industry(industry)),
        }
    }
}

/// Lays out `stocks` into a `width` x `height` canvas.
///
/// Pure and re-entrant: the same inputs always give the same tree.
pub fn compose_layout(
    stocks: &[StockEntity],
    width: f64,
    height: f64,
    taxonomy: &Taxonomy,
    cfg: &HeatmapConfig,
) -> HeatmapLayout {
    let canvas = Rect::new(0.0, 0.0, width, height);
    let groups = build_hierarchy_with(stocks, taxonomy);
    let layout = HeatmapLayout {
        canvas,
        sectors: compose_sectors(groups, canvas, cfg),
    };
    tracing::debug!(
        sectors = layout.sectors.len(),
        stocks = stocks.len(),
        width,
        height,
        "composed heatmap layout"
    );
    layout
}

/// Positions already-grouped sectors inside `canvas`.
pub fn compose_sectors(groups: Vec<SectorGroup>, canvas: Rect, cfg: &HeatmapConfig) -> Vec<SectorNode> {
    let total: f64 = groups.iter().map(|g| g.total_weight).sum();
    if groups.is_empty() || !(total > 0.0) {
        return Vec::new();
    }

    let items = groups
        .into_iter()
        .map(|g| TreemapItem::new(g.total_weight, g))
        .collect();

    squarify(items, canvas, total)
        .into_iter()
        .map(|placed| {
            let group = placed.payload;
            let content = placed
                .rect
                .below_header(cfg.sector_header.height_for(placed.rect.height));
            let industries = squarify(
                group
                    .industries
                    .into_iter()
                    .map(|i| TreemapItem::new(i.total_weight, i))
                    .collect(),
                content,
                group.total_weight,
            );
            SectorNode {
                rect: placed.rect,
                sector_id: group.sector_id,
                name: group.name,
                total_weight: group.total_weight,
                children: industries
                    .into_iter()
                    .map(|placed| {
                        let industry = placed.payload;
                        let content = placed
                            .rect
                            .below_header(cfg.industry_header.height_for(placed.rect.height));
                        let stocks = squarify(
                            industry
                                .stocks
                                .into_iter()
                                .map(|s| TreemapItem::new(compress_weight(s.market_cap), s))
                                .collect(),
                            content,
                            industry.total_weight,
                        );
                        IndustryNode {
                            rect: placed.rect,
                            industry_id: industry.industry_id,
                            name: industry.name,
                            total_weight: industry.total_weight,
                            children: stocks
                                .into_iter()
                                .map(|p| StockNode {
                                    rect: p.rect,
                                    stock: p.payload,
                                })
                                .collect(),
                        }
                    })
                    .collect(),
            }
        })
        .collect()
}

/// Memoizes the last layout on `(stocks, width, height)`.
#[derive(Debug, Default)]
pub struct LayoutCache {
    key: Option<(Vec<StockEntity>, f64, f64)>,
    layout: HeatmapLayout,
    recomputes: u64,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute(
        &mut self,
        stocks: &[StockEntity],
        width: f64,
        height: f64,
        taxonomy: &Taxonomy,
        cfg: &HeatmapConfig,
    ) -> &HeatmapLayout {
        let fresh = matches!(&self.key, Some((s, w, h)) if *w == width && *h == height && s.as_slice() == stocks);
        if !fresh {
            self.layout = compose_layout(stocks, width, height, taxonomy, cfg);
            self.key = Some((stocks.to_vec(), width, height));
            self.recomputes += 1;
        }
        &self.layout
    }

    /// Drops the cached tree, e.g. after the taxonomy or config changed.
    pub fn invalidate(&mut self) {
        self.key = None;
    }

    pub fn recomputes(&self) -> u64 {
        self.recomputes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::stock;

    fn compose(stocks: &[StockEntity], w: f64, h: f64) -> HeatmapLayout {
        compose_layout(stocks, w, h, &Taxonomy::default(), &HeatmapConfig::default())
    }

    #[test]
    fn empty_input_short_circuits() {
        let layout = compose(&[], 800.0, 600.0);
        assert!(layout.is_empty());
        assert!(layout.hit_test(Point::new(10.0, 10.0)).is_none());
    }

    #[test]
    fn single_chain_stock_fills_double_inset_content() {
        let layout = compose(&[stock("ONLY", 1e9, Some("tech"), Some("chips"))], 300.0, 200.0);
        let sector = &layout.sectors[0];
        assert_eq!(sector.rect, Rect::new(0.0, 0.0, 300.0, 200.0));

        // 200 px sector: header min(20, 24) = 20
        let industry = &sector.children[0];
        assert_eq!(industry.rect, Rect::new(0.0, 20.0, 300.0, 180.0));

        // 180 px industry: header min(14, 27) = 14
        let leaf = &industry.children[0];
        assert_eq!(leaf.rect, Rect::new(0.0, 34.0, 300.0, 166.0));
    }

    #[test]
    fn collapsed_headers_give_zero_area_children() {
        let cfg = HeatmapConfig {
            sector_header: crate::config::HeaderStrip { max_px: 50.0, fraction: 1.0 },
            ..HeatmapConfig::default()
        };
        let stocks = vec![
            stock("A", 100.0, Some("s"), Some("i")),
            stock("B", 400.0, Some("s"), Some("i")),
        ];
        let layout = compose_layout(&stocks, 120.0, 30.0, &Taxonomy::default(), &cfg);
        let industry = &layout.sectors[0].children[0];
        assert_eq!(industry.rect.area(), 0.0);
        assert_eq!(industry.children.len(), 2);
        assert!(industry.children.iter().all(|s| s.rect.area() == 0.0));
    }

    #[test]
    fn hit_test_resolves_deepest_node() {
        let stocks = vec![
            stock("BIG", 10_000.0, Some("tech"), Some("chips")),
            stock("SML", 2_500.0, Some("tech"), Some("chips")),
        ];
        let layout = compose(&stocks, 400.0, 300.0);
        let big = layout.find_stock("BIG").unwrap();
        let center = Point::new(big.rect.x + big.rect.width / 2.0, big.rect.y + big.rect.height / 2.0);
        assert!(matches!(layout.hit_test(center), Some(LayoutNode::Stock(n)) if n.stock.symbol == "BIG"));
        assert!(matches!(layout.hit_test(Point::new(5.0, 5.0)), Some(LayoutNode::Sector(_))));
        assert!(matches!(layout.hit_test(Point::new(5.0, 25.0)), Some(LayoutNode::Industry(_))));
        assert!(layout.hit_test(Point::new(500.0, 5.0)).is_none());
    }

    #[test]
    fn cache_recomputes_only_on_input_change() {
        let stocks = vec![stock("A", 100.0, Some("s"), Some("i"))];
        let (tax, cfg) = (Taxonomy::default(), HeatmapConfig::default());
        let mut cache = LayoutCache::new();
        cache.get_or_compute(&stocks, 100.0, 100.0, &tax, &cfg);
        cache.get_or_compute(&stocks, 100.0, 100.0, &tax, &cfg);
        assert_eq!(cache.recomputes(), 1);
        let resized = cache.get_or_compute(&stocks, 200.0, 100.0, &tax, &cfg);
        assert_eq!(resized.canvas.width, 200.0);
        assert_eq!(cache.recomputes(), 2);
        cache.invalidate();
        cache.get_or_compute(&stocks, 200.0, 100.0, &tax, &cfg);
        assert_eq!(cache.recomputes(), 3);
    }
}
