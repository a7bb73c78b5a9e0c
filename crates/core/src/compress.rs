/// Layout weight for a market cap.
///
/// Square-root compression keeps rank order while shrinking the area gap
/// between mega caps and mid caps. Negative input is treated as zero.
pub fn compress_weight(market_cap: f64) -> f64 {
    market_cap.max(0.0).sqrt()
}
