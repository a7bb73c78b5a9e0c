use crate::layout::HeatmapLayout;
use crate::viewport::ViewportTransform;

/// One CSV row per node, parents before children.
pub fn to_csv(layout: &HeatmapLayout, mut w: impl std::io::Write) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(&mut w);
    writer.write_record(["level", "id", "name", "x", "y", "width", "height", "value"])?;
    for sector in &layout.sectors {
        let r = sector.rect;
        writer.write_record([
            "sector".to_string(),
            sector.sector_id.clone(),
            sector.name.clone(),
            fmt(r.x),
            fmt(r.y),
            fmt(r.width),
            fmt(r.height),
            String::new(),
        ])?;
        for industry in &sector.children {
            let r = industry.rect;
            writer.write_record([
                "industry".to_string(),
                industry.industry_id.clone(),
                industry.name.clone(),
                fmt(r.x),
                fmt(r.y),
                fmt(r.width),
                fmt(r.height),
                String::new(),
            ])?;
            for leaf in &industry.children {
                let r = leaf.rect;
                writer.write_record([
                    "stock".to_string(),
                    leaf.stock.symbol.clone(),
                    leaf.stock.name.clone(),
                    fmt(r.x),
                    fmt(r.y),
                    fmt(r.width),
                    fmt(r.height),
                    leaf.stock.value.to_string(),
                ])?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

fn fmt(v: f64) -> String {
    format!("{:.3}", v)
}

/// Layout tree plus the transform the renderer should apply.
pub fn to_json(layout: &HeatmapLayout, transform: &ViewportTransform) -> serde_json::Value {
    serde_json::json!({
        "generatedAt": chrono::Utc::now().to_rfc3339(),
        "canvas": layout.canvas,
        "transform": transform,
        "sectors": layout.sectors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HeatmapConfig;
    use crate::layout::compose_layout;
    use crate::model::Taxonomy;
    use crate::test_support::stock;

    fn layout() -> HeatmapLayout {
        let stocks = vec![
            stock("A", 100.0, Some("tech"), Some("chips")),
            stock("B", 400.0, Some("energy"), Some("oil")),
        ];
        compose_layout(&stocks, 100.0, 80.0, &Taxonomy::default(), &HeatmapConfig::default())
    }

    #[test]
    fn csv_lists_every_level() {
        let mut buf = Vec::new();
        to_csv(&layout(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "level,id,name,x,y,width,height,value");
        assert_eq!(lines.len(), 1 + 2 * 3);
        assert!(lines[1].starts_with("sector,energy,energy,"));
        assert!(lines.iter().any(|l| l.starts_with("stock,A,")));
    }

    #[test]
    fn json_carries_tree_and_transform() {
        let json = to_json(&layout(), &ViewportTransform::IDENTITY);
        assert_eq!(json["transform"]["scale"], 1.0);
        assert_eq!(json["sectors"][0]["sectorId"], "energy");
        assert_eq!(json["sectors"][0]["children"][0]["children"][0]["stock"]["symbol"], "B");
        assert!(json["generatedAt"].is_string());
    }
}
