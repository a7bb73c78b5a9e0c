use serde::Deserialize;
use std::path::Path;

use crate::error::SnapshotError;
use crate::model::StockEntity;

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonSnapshot {
    Bare(Vec<StockEntity>),
    Wrapped { stocks: Vec<StockEntity> },
}

/// Reads a `.json` or `.csv` stock snapshot and drops unplottable rows.
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Vec<StockEntity>, SnapshotError> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    let raw = std::fs::read(path).map_err(|source| SnapshotError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let stocks = match ext.as_str() {
        "json" => parse_json(&raw)?,
        "csv" => parse_csv(raw.as_slice())?,
        other => return Err(SnapshotError::UnsupportedFormat(other.to_string())),
    };
    tracing::info!(path = %path.display(), stocks = stocks.len(), "loaded snapshot");
    Ok(stocks)
}

pub fn parse_json(raw: &[u8]) -> Result<Vec<StockEntity>, SnapshotError> {
    let stocks = match serde_json::from_slice::<JsonSnapshot>(raw)? {
        JsonSnapshot::Bare(s) | JsonSnapshot::Wrapped { stocks: s } => s,
    };
    Ok(retain_plottable(stocks))
}

pub fn parse_csv(reader: impl std::io::Read) -> Result<Vec<StockEntity>, SnapshotError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let stocks = rdr
        .deserialize::<StockEntity>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(retain_plottable(stocks))
}

/// Upstream filter: only positive market cap and price reach the layout.
pub fn retain_plottable(stocks: Vec<StockEntity>) -> Vec<StockEntity> {
    let before = stocks.len();
    let kept: Vec<StockEntity> = stocks.into_iter().filter(StockEntity::is_plottable).collect();
    if kept.len() < before {
        tracing::warn!(dropped = before - kept.len(), "dropped stocks without positive price and market cap");
    }
    kept
}
