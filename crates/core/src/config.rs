use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Hard ceiling for `zoom.max_scale`.
pub const MAX_ZOOM: f64 = 5.0;

const SECTOR_HEADER: HeaderStrip = HeaderStrip { max_px: 20.0, fraction: 0.12 };
const INDUSTRY_HEADER: HeaderStrip = HeaderStrip { max_px: 14.0, fraction: 0.15 };
const SECTOR_LABEL: LabelThreshold = LabelThreshold { min_width: 60.0, min_height: 14.0 };
const INDUSTRY_LABEL: LabelThreshold = LabelThreshold { min_width: 50.0, min_height: 10.0 };
const STOCK_LABEL: LabelThreshold = LabelThreshold { min_width: 30.0, min_height: 18.0 };

/// Label strip reserved at the top of a group rectangle:
/// `min(max_px, fraction * rect height)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeaderStrip {
    pub max_px: f64,
    pub fraction: f64,
}

impl HeaderStrip {
    pub fn height_for(&self, rect_height: f64) -> f64 {
        self.max_px.min(self.fraction * rect_height).max(0.0)
    }
}

/// Minimum cell size, per level, before the renderer draws a text label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelThreshold {
    pub min_width: f64,
    pub min_height: f64,
}

impl LabelThreshold {
    pub fn admits(&self, width: f64, height: f64) -> bool {
        width >= self.min_width && height >= self.min_height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelThresholds {
    #[serde(deserialize_with = "sector_label")]
    pub sector: LabelThreshold,
    #[serde(deserialize_with = "industry_label")]
    pub industry: LabelThreshold,
    #[serde(deserialize_with = "stock_label")]
    pub stock: LabelThreshold,
}

impl Default for LabelThresholds {
    fn default() -> Self {
        Self {
            sector: SECTOR_LABEL,
            industry: INDUSTRY_LABEL,
            stock: STOCK_LABEL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Multiplicative step per wheel tick.
    pub step: f64,
    /// Clicks this soon after a zoom are treated as the gesture's tail.
    #[serde(with = "millis")]
    pub click_suppression: Duration,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min_scale: 1.0,
            max_scale: 5.0,
            step: 1.1,
            click_suppression: Duration::from_millis(200),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    #[serde(deserialize_with = "sector_header")]
    pub sector_header: HeaderStrip,
    #[serde(deserialize_with = "industry_header")]
    pub industry_header: HeaderStrip,
    pub zoom: ZoomConfig,
    pub labels: LabelThresholds,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            sector_header: SECTOR_HEADER,
            industry_header: INDUSTRY_HEADER,
            zoom: ZoomConfig::default(),
            labels: LabelThresholds::default(),
        }
    }
}

impl HeatmapConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let cfg: HeatmapConfig = serde_json::from_str(&raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let z = &self.zoom;
        if !(z.min_scale >= 1.0) {
            return Err(ConfigError::OutOfRange { field: "zoom.min_scale", reason: "must be >= 1" });
        }
        if !(z.max_scale >= z.min_scale) {
            return Err(ConfigError::OutOfRange { field: "zoom.max_scale", reason: "must be >= zoom.min_scale" });
        }
        if z.max_scale > MAX_ZOOM {
            return Err(ConfigError::OutOfRange { field: "zoom.max_scale", reason: "must be <= 5" });
        }
        if !(z.step > 1.0) {
            return Err(ConfigError::OutOfRange { field: "zoom.step", reason: "must be > 1" });
        }
        for (field, strip) in [("sector_header", self.sector_header), ("industry_header", self.industry_header)] {
            if !(strip.max_px >= 0.0) {
                return Err(ConfigError::OutOfRange { field, reason: "max_px must be >= 0" });
            }
            if !(0.0..=1.0).contains(&strip.fraction) {
                return Err(ConfigError::OutOfRange { field, reason: "fraction must be within [0, 1]" });
            }
        }
        Ok(())
    }
}

// Nested sections may name only the fields they change; the rest come from
// that level's defaults.

#[derive(Deserialize)]
struct PartialHeaderStrip {
    max_px: Option<f64>,
    fraction: Option<f64>,
}

#[derive(Deserialize)]
struct PartialLabelThreshold {
    min_width: Option<f64>,
    min_height: Option<f64>,
}

fn header_over<'de, D: Deserializer<'de>>(d: D, base: HeaderStrip) -> Result<HeaderStrip, D::Error> {
    let p = PartialHeaderStrip::deserialize(d)?;
    Ok(HeaderStrip {
        max_px: p.max_px.unwrap_or(base.max_px),
        fraction: p.fraction.unwrap_or(base.fraction),
    })
}

fn label_over<'de, D: Deserializer<'de>>(d: D, base: LabelThreshold) -> Result<LabelThreshold, D::Error> {
    let p = PartialLabelThreshold::deserialize(d)?;
    Ok(LabelThreshold {
        min_width: p.min_width.unwrap_or(base.min_width),
        min_height: p.min_height.unwrap_or(base.min_height),
    })
}

fn sector_header<'de, D: Deserializer<'de>>(d: D) -> Result<HeaderStrip, D::Error> {
    header_over(d, SECTOR_HEADER)
}

fn industry_header<'de, D: Deserializer<'de>>(d: D) -> Result<HeaderStrip, D::Error> {
    header_over(d, INDUSTRY_HEADER)
}

fn sector_label<'de, D: Deserializer<'de>>(d: D) -> Result<LabelThreshold, D::Error> {
    label_over(d, SECTOR_LABEL)
}

fn industry_label<'de, D: Deserializer<'de>>(d: D) -> Result<LabelThreshold, D::Error> {
    label_over(d, INDUSTRY_LABEL)
}

fn stock_label<'de, D: Deserializer<'de>>(d: D) -> Result<LabelThreshold, D::Error> {
    label_over(d, STOCK_LABEL)
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
