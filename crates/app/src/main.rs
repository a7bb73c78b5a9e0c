mod state;
mod ui;

use eframe::egui;
use heatmap_core::config::HeatmapConfig;
use state::AppState;

struct HeatmapApp {
    state: AppState,
}

impl HeatmapApp {
    fn new(_cc: &eframe::CreationContext<'_>, snapshot: Option<std::path::PathBuf>) -> Self {
        let mut state = AppState::new(HeatmapConfig::default());
        if let Some(path) = snapshot {
            state.open(path);
        }
        Self { state }
    }
}

impl eframe::App for HeatmapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::draw(&mut self.state, ctx);
    }
}

fn main() -> eframe::Result<()> {
    heatmap_core::logging::init("info");
    let snapshot = std::env::args_os().nth(1).map(std::path::PathBuf::from);
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Market Heatmap",
        options,
        Box::new(move |cc| Ok(Box::new(HeatmapApp::new(cc, snapshot)))),
    )
}
