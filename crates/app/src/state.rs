use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use heatmap_core::config::HeatmapConfig;
use heatmap_core::layout::LayoutCache;
use heatmap_core::model::{Point, StockEntity, Taxonomy};
use heatmap_core::snapshot::load_snapshot;
use heatmap_core::viewport::{InputEvent, ViewportController};
use heatmap_core::MetricKind;

pub struct AppState {
    pub source: Option<PathBuf>,
    pub loaded_at: Option<chrono::DateTime<chrono::Local>>,
    pub stocks: Vec<StockEntity>,
    pub taxonomy: Taxonomy,
    pub cfg: HeatmapConfig,
    pub metric: MetricKind,
    pub light_theme: bool,
    pub search: String,
    pub selected: Option<String>,
    pub error: Option<String>,
    pub viewport: ViewportController,
    /// Active touch points by touch id, canvas-local.
    pub touches: BTreeMap<u64, Point>,
    pub cache: LayoutCache,
}

impl AppState {
    pub fn new(cfg: HeatmapConfig) -> Self {
        Self {
            source: None,
            loaded_at: None,
            stocks: Vec::new(),
            taxonomy: Taxonomy::default(),
            cfg,
            metric: MetricKind::DailyChange,
            light_theme: false,
            search: String::new(),
            selected: None,
            error: None,
            viewport: ViewportController::new(cfg.zoom),
            touches: BTreeMap::new(),
            cache: LayoutCache::new(),
        }
    }

    pub fn open(&mut self, path: PathBuf) {
        match load_snapshot(&path).with_context(|| format!("opening {}", path.display())) {
            Ok(stocks) => {
                self.stocks = stocks;
                self.source = Some(path);
                self.loaded_at = Some(chrono::Local::now());
                self.selected = None;
                self.error = None;
            }
            Err(e) => {
                tracing::warn!("{e:#}");
                self.error = Some(format!("{e:#}"));
            }
        }
    }

    pub fn feed(&mut self, event: InputEvent, at: Duration) {
        self.viewport.handle(&event, at);
    }

    pub fn touch_points(&self) -> Vec<Point> {
        self.touches.values().copied().collect()
    }

    pub fn select(&mut self, symbol: &str, at: Duration) {
        if self.viewport.is_click_allowed(at) {
            self.selected = Some(symbol.to_string());
        }
    }
}
