use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// What the `value` field of a stock currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    #[default]
    DailyChange,
    WeeklyChange,
    MonthlyChange,
    QuarterlyChange,
    YtdChange,
    YearlyChange,
    PriceToEarnings,
    PriceToBook,
    DividendYield,
}

impl MetricKind {
    pub const ALL: [MetricKind; 9] = [
        MetricKind::DailyChange,
        MetricKind::WeeklyChange,
        MetricKind::MonthlyChange,
        MetricKind::QuarterlyChange,
        MetricKind::YtdChange,
        MetricKind::YearlyChange,
        MetricKind::PriceToEarnings,
        MetricKind::PriceToBook,
        MetricKind::DividendYield,
    ];

    /// Signed percentage change, eligible for the diverging scale.
    pub fn is_signed_percent(self) -> bool {
        matches!(
            self,
            MetricKind::DailyChange
                | MetricKind::WeeklyChange
                | MetricKind::MonthlyChange
                | MetricKind::QuarterlyChange
                | MetricKind::YtdChange
                | MetricKind::YearlyChange
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            MetricKind::DailyChange => "1D %",
            MetricKind::WeeklyChange => "1W %",
            MetricKind::MonthlyChange => "1M %",
            MetricKind::QuarterlyChange => "3M %",
            MetricKind::YtdChange => "YTD %",
            MetricKind::YearlyChange => "1Y %",
            MetricKind::PriceToEarnings => "P/E",
            MetricKind::PriceToBook => "P/B",
            MetricKind::DividendYield => "Div. yield",
        }
    }
}

/// Upper bounds (inclusive) of each magnitude tier, in percent.
const TIERS: [f64; 7] = [0.5, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0];

/// Saturated bucket for anything beyond +-6 %.
const CLAMP: f64 = 6.0;

struct Palette {
    gains: [Color; 7],
    losses: [Color; 7],
    neutral: Color,
    fallback: Color,
}

const DARK: Palette = Palette {
    gains: [
        Color::rgb(0x2f, 0x4a, 0x3a),
        Color::rgb(0x2b, 0x55, 0x3c),
        Color::rgb(0x26, 0x63, 0x3f),
        Color::rgb(0x21, 0x72, 0x42),
        Color::rgb(0x1b, 0x82, 0x45),
        Color::rgb(0x15, 0x94, 0x48),
        Color::rgb(0x0e, 0xa8, 0x4c),
    ],
    losses: [
        Color::rgb(0x4f, 0x33, 0x36),
        Color::rgb(0x5e, 0x31, 0x35),
        Color::rgb(0x70, 0x2e, 0x33),
        Color::rgb(0x83, 0x2a, 0x31),
        Color::rgb(0x98, 0x25, 0x2e),
        Color::rgb(0xae, 0x20, 0x2b),
        Color::rgb(0xc6, 0x1a, 0x28),
    ],
    neutral: Color::rgb(0x41, 0x45, 0x54),
    fallback: Color::rgb(0x3a, 0x3f, 0x4b),
};

const LIGHT: Palette = Palette {
    gains: [
        Color::rgb(0xd9, 0xf2, 0xe1),
        Color::rgb(0xb8, 0xe6, 0xc6),
        Color::rgb(0x93, 0xd8, 0xa9),
        Color::rgb(0x6b, 0xc8, 0x8a),
        Color::rgb(0x43, 0xb6, 0x6a),
        Color::rgb(0x23, 0xa0, 0x52),
        Color::rgb(0x0b, 0x86, 0x3e),
    ],
    losses: [
        Color::rgb(0xfb, 0xdd, 0xdd),
        Color::rgb(0xf6, 0xbf, 0xbf),
        Color::rgb(0xf0, 0x9c, 0x9c),
        Color::rgb(0xe8, 0x76, 0x77),
        Color::rgb(0xdc, 0x50, 0x52),
        Color::rgb(0xcc, 0x2e, 0x32),
        Color::rgb(0xb3, 0x14, 0x1a),
    ],
    neutral: Color::rgb(0xe3, 0xe5, 0xea),
    fallback: Color::rgb(0xcf, 0xd3, 0xdb),
};

/// Quantized heatmap colour for a cell.
///
/// Percentage metrics use fifteen fixed swatches: seven gain tiers, seven
/// loss tiers and an exact-zero neutral. Other metrics get one fallback swatch.
pub fn color_for(value: f64, metric: MetricKind, light_theme: bool) -> Color {
    let palette = if light_theme { &LIGHT } else { &DARK };
    if !metric.is_signed_percent() {
        return palette.fallback;
    }
    match bucket(value) {
        0 => palette.neutral,
        b if b > 0 => palette.gains[(b - 1) as usize],
        b => palette.losses[(-b - 1) as usize],
    }
}

/// Signed bucket index in `-7..=7`; `0` is the neutral bucket.
pub fn bucket(value: f64) -> i8 {
    if !value.is_finite() || value == 0.0 {
        return 0;
    }
    let magnitude = value.abs().min(CLAMP);
    let tier = TIERS
        .iter()
        .position(|&upper| magnitude <= upper)
        .unwrap_or(TIERS.len() - 1) as i8
        + 1;
    if value > 0.0 {
        tier
    } else {
        -tier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn buckets_follow_thresholds() {
        assert_eq!(bucket(0.0), 0);
        assert_eq!(bucket(0.2), 1);
        assert_eq!(bucket(0.5), 1);
        assert_eq!(bucket(0.51), 2);
        assert_eq!(bucket(1.5), 3);
        assert_eq!(bucket(5.5), 7);
        assert_eq!(bucket(-2.5), -4);
        assert_eq!(bucket(-0.01), -1);
    }

    #[test]
    fn clamps_beyond_six_percent() {
        assert_eq!(bucket(6.0), 7);
        assert_eq!(bucket(42.0), 7);
        assert_eq!(bucket(-99.0), -7);
        assert_eq!(
            color_for(12.0, MetricKind::DailyChange, false),
            color_for(6.0, MetricKind::DailyChange, false)
        );
    }

    #[test]
    fn fifteen_distinct_swatches_per_theme() {
        for light in [true, false] {
            let values = [-6.0, -5.0, -4.0, -3.0, -2.0, -1.0, -0.5, 0.0, 0.5, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
            let colors: HashSet<_> = values
                .iter()
                .map(|&v| color_for(v, MetricKind::WeeklyChange, light))
                .collect();
            assert_eq!(colors.len(), 15);
        }
    }

    #[test]
    fn themes_use_separate_palettes() {
        assert_ne!(
            color_for(2.0, MetricKind::DailyChange, true),
            color_for(2.0, MetricKind::DailyChange, false)
        );
    }

    #[test]
    fn non_percentage_metrics_use_fallback() {
        let a = color_for(35.0, MetricKind::PriceToEarnings, true);
        let b = color_for(-3.0, MetricKind::PriceToBook, true);
        assert_eq!(a, b);
        assert_eq!(a, LIGHT.fallback);
    }

    #[test]
    fn nan_is_neutral() {
        assert_eq!(color_for(f64::NAN, MetricKind::DailyChange, false), DARK.neutral);
        assert_eq!(Color::rgb(255, 0, 16).to_hex(), "#ff0010");
    }
}
