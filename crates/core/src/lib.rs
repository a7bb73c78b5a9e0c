pub mod color;
pub mod compress;
pub mod config;
pub mod error;
pub mod export;
pub mod hierarchy;
pub mod human;
pub mod layout;
pub mod logging;
pub mod model;
pub mod search;
pub mod snapshot;
pub mod treemap;
pub mod viewport;

pub use color::{color_for, Color, MetricKind};
pub use compress::compress_weight;
pub use config::HeatmapConfig;
pub use hierarchy::{build_hierarchy, build_hierarchy_with};
pub use layout::{compose_layout, HeatmapLayout, LayoutCache, LayoutNode};
pub use model::*;
pub use treemap::squarify;
pub use viewport::{InputEvent, ViewportController, ViewportTransform};
