use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::compress::compress_weight;
use crate::model::{IndustryGroup, SectorGroup, StockEntity, Taxonomy};

/// Groups stocks by sector, then by industry, with ids as display names.
pub fn build_hierarchy(stocks: &[StockEntity]) -> Vec<SectorGroup> {
    build_hierarchy_with(stocks, &Taxonomy::default())
}

/// Groups stocks into sectors and industries and aggregates compressed weights.
///
/// Sectors and the industries inside each sector are ordered by descending
/// total weight, ties broken by ascending id. Stocks keep their input order.
pub fn build_hierarchy_with(stocks: &[StockEntity], taxonomy: &Taxonomy) -> Vec<SectorGroup> {
    let mut grouped: BTreeMap<&str, BTreeMap<&str, Vec<StockEntity>>> = BTreeMap::new();
    for stock in stocks {
        grouped
            .entry(stock.sector_key())
            .or_default()
            .entry(stock.industry_key())
            .or_default()
            .push(stock.clone());
    }

    let mut sectors: Vec<SectorGroup> = grouped
        .into_iter()
        .map(|(sector_id, industries)| {
            let mut industries: Vec<IndustryGroup> = industries
                .into_iter()
                .map(|(industry_id, stocks)| IndustryGroup {
                    industry_id: industry_id.to_string(),
                    name: taxonomy.industry_name(industry_id),
                    total_weight: stocks.iter().map(|s| compress_weight(s.market_cap)).sum(),
                    stocks,
                })
                .collect();
            industries.sort_by(|a, b| by_weight_then_id(a.total_weight, &a.industry_id, b.total_weight, &b.industry_id));
            SectorGroup {
                sector_id: sector_id.to_string(),
                name: taxonomy.sector_name(sector_id),
                total_weight: industries.iter().map(|i| i.total_weight).sum(),
                industries,
            }
        })
        .collect();
    sectors.sort_by(|a, b| by_weight_then_id(a.total_weight, &a.sector_id, b.total_weight, &b.sector_id));

    tracing::debug!(
        stocks = stocks.len(),
        sectors = sectors.len(),
        "built sector hierarchy"
    );
    sectors
}

fn by_weight_then_id(wa: f64, ida: &str, wb: f64, idb: &str) -> Ordering {
    wb.partial_cmp(&wa)
        .unwrap_or(Ordering::Equal)
        .then_with(|| ida.cmp(idb))
}
