use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use crate::layout::{HeatmapLayout, StockNode};

/// Stocks whose symbol or name match `needle`, best first.
pub fn search_stocks<'a>(layout: &'a HeatmapLayout, needle: &str) -> Vec<&'a StockNode> {
    let needle = needle.trim();
    if needle.is_empty() {
        return Vec::new();
    }
    let m = SkimMatcherV2::default().ignore_case();
    let mut hits: Vec<(i64, &StockNode)> = layout
        .stocks()
        .filter_map(|n| {
            let by_symbol = m.fuzzy_match(&n.stock.symbol, needle).map(|s| s * 2);
            let by_name = m.fuzzy_match(&n.stock.name, needle);
            by_symbol.max(by_name).map(|score| (score, n))
        })
        .collect();
    hits.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.stock.symbol.cmp(&b.1.stock.symbol)));
    hits.into_iter().map(|(_, n)| n).collect()
}
