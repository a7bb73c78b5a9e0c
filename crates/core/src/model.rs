use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Group id used when a stock carries no sector or industry.
pub const OTHER_GROUP: &str = "other";

/// One listed company as delivered by the quote collaborator.
///
/// `value` is whatever metric is currently visualized; it is often the
/// same number as `change_percent` but not always.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockEntity {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub change: f64,
    #[serde(default)]
    pub change_percent: f64,
    pub market_cap: f64,
    #[serde(default)]
    pub sector_id: Option<String>,
    #[serde(default)]
    pub industry_id: Option<String>,
    #[serde(default)]
    pub value: f64,
}

impl StockEntity {
    pub fn sector_key(&self) -> &str {
        non_empty_or_other(self.sector_id.as_deref())
    }

    pub fn industry_key(&self) -> &str {
        non_empty_or_other(self.industry_id.as_deref())
    }

    /// Upstream validity filter: positive, finite cap and price.
    pub fn is_plottable(&self) -> bool {
        self.market_cap.is_finite()
            && self.market_cap > 0.0
            && self.price.is_finite()
            && self.price > 0.0
    }
}

fn non_empty_or_other(id: Option<&str>) -> &str {
    match id {
        Some(s) if !s.trim().is_empty() => s,
        _ => OTHER_GROUP,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryGroup {
    pub industry_id: String,
    pub name: String,
    pub stocks: Vec<StockEntity>,
    pub total_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorGroup {
    pub sector_id: String,
    pub name: String,
    pub industries: Vec<IndustryGroup>,
    pub total_weight: f64,
}

/// Display names for sector and industry ids. Missing entries fall back to the id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    #[serde(default)]
    pub sectors: HashMap<String, String>,
    #[serde(default)]
    pub industries: HashMap<String, String>,
}

impl Taxonomy {
    pub fn sector_name(&self, id: &str) -> String {
        self.sectors.get(id).cloned().unwrap_or_else(|| id.to_string())
    }

    pub fn industry_name(&self, id: &str) -> String {
        self.industries.get(id).cloned().unwrap_or_else(|| id.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Axis-aligned rectangle; width and height are never negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Splits off a strip of `height` from the top, returning the content below it.
    /// The content height clamps to zero when the strip covers the whole rect.
    pub fn below_header(&self, header: f64) -> Rect {
        let header = header.clamp(0.0, self.height);
        Rect::new(self.x, self.y + header, self.width, self.height - header)
    }

    /// Strictly positive overlap area with `other`.
    pub fn overlap(&self, other: &Rect) -> f64 {
        let w = self.right().min(other.right()) - self.x.max(other.x);
        let h = self.bottom().min(other.bottom()) - self.y.max(other.y);
        if w > 0.0 && h > 0.0 {
            w * h
        } else {
            0.0
        }
    }
}
