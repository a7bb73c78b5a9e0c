use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use heatmap_core::config::HeatmapConfig;
use heatmap_core::human::human_market_cap;
use heatmap_core::layout::LayoutCache;
use heatmap_core::model::Taxonomy;
use heatmap_core::snapshot::load_snapshot;
use heatmap_core::viewport::ViewportTransform;

#[derive(Parser, Debug)]
#[command(name = "heatmap-cli", about = "Market heatmap layout generator")]
struct Args {
    /// Stock snapshot (.json or .csv)
    snapshot: PathBuf,
    /// Canvas width in px
    #[arg(long, default_value_t = 1200.0)]
    width: f64,
    /// Canvas height in px
    #[arg(long, default_value_t = 800.0)]
    height: f64,
    /// Config overrides (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Sector/industry display names (JSON)
    #[arg(short, long)]
    taxonomy: Option<PathBuf>,
    /// Output JSON layout path
    #[arg(short, long)]
    json: Option<PathBuf>,
    /// Output CSV layout path
    #[arg(long)]
    csv: Option<PathBuf>,
}

fn main() -> ExitCode {
    heatmap_core::logging::init("info");
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = match &args.config {
        Some(path) => HeatmapConfig::from_json_file(path)?,
        None => HeatmapConfig::default(),
    };
    let taxonomy: Taxonomy = match &args.taxonomy {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => Taxonomy::default(),
    };
    let stocks = load_snapshot(&args.snapshot)?;

    let mut cache = LayoutCache::new();
    let layout = cache.get_or_compute(&stocks, args.width, args.height, &taxonomy, &cfg);

    if let Some(path) = &args.json {
        let json = heatmap_core::export::to_json(layout, &ViewportTransform::IDENTITY);
        std::fs::write(path, serde_json::to_string_pretty(&json)?)?;
    }
    if let Some(path) = &args.csv {
        let file = std::fs::File::create(path)?;
        heatmap_core::export::to_csv(layout, std::io::BufWriter::new(file))?;
    }

    for sector in &layout.sectors {
        let cap: f64 = sector
            .children
            .iter()
            .flat_map(|i| &i.children)
            .map(|n| n.stock.market_cap)
            .sum();
        let r = sector.rect;
        println!(
            "{:<24} {:>4} industries  {:>10}  {:.0}x{:.0} @ ({:.0},{:.0})",
            sector.name,
            sector.children.len(),
            human_market_cap(cap),
            r.width,
            r.height,
            r.x,
            r.y
        );
    }
    println!(
        "Laid out {} stocks in {} sectors on a {}x{} canvas",
        layout.stocks().count(),
        layout.sectors.len(),
        args.width,
        args.height
    );
    Ok(())
}
