use std::collections::HashSet;
use std::time::Duration;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Stroke, Ui};
use heatmap_core::config::LabelThreshold;
use heatmap_core::human::{human_market_cap, price, signed_percent};
use heatmap_core::layout::LayoutNode;
use heatmap_core::model::{Point, Rect};
use heatmap_core::search::search_stocks;
use heatmap_core::viewport::{InputEvent, ViewportTransform, ZoomDirection};
use heatmap_core::{color_for, Color, MetricKind};

use crate::state::AppState;

pub fn draw(app: &mut AppState, ctx: &egui::Context) {
    ctx.set_visuals(if app.light_theme {
        egui::Visuals::light()
    } else {
        egui::Visuals::dark()
    });

    egui::TopBottomPanel::top("top").show(ctx, |ui| {
        top_bar(ui, app);
    });

    egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
        status_bar(ui, app);
    });

    egui::CentralPanel::default()
        .frame(egui::Frame::none())
        .show(ctx, |ui| {
            if app.stocks.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.label(app.error.as_deref().unwrap_or("Open a stock snapshot to start"));
                });
                return;
            }
            heatmap(ui, app);
        });
}

fn top_bar(ui: &mut Ui, app: &mut AppState) {
    ui.horizontal(|ui| {
        if ui.button("Open Snapshot").clicked() {
            if let Some(path) = rfd::FileDialog::new()
                .add_filter("snapshot", &["json", "csv"])
                .pick_file()
            {
                app.open(path);
            }
        }
        ui.separator();
        ui.label("Metric:");
        egui::ComboBox::from_id_source("metric")
            .selected_text(app.metric.label())
            .show_ui(ui, |ui| {
                for kind in MetricKind::ALL {
                    ui.selectable_value(&mut app.metric, kind, kind.label());
                }
            });
        ui.checkbox(&mut app.light_theme, "Light");
        ui.separator();
        ui.label("Search:");
        ui.text_edit_singleline(&mut app.search);
        ui.separator();
        if ui.button("Reset zoom").clicked() {
            app.viewport.reset();
        }
    });
}

fn status_bar(ui: &mut Ui, app: &AppState) {
    ui.horizontal(|ui| {
        if let Some(src) = &app.source {
            ui.label(src.display().to_string());
        }
        if let Some(at) = app.loaded_at {
            ui.label(format!("loaded {}", at.format("%H:%M:%S")));
        }
        ui.separator();
        ui.label(format!("{} stocks", app.stocks.len()));
        ui.label(format!("zoom {:.0}%", app.viewport.transform().scale * 100.0));
        ui.label(app.viewport.gesture().name());
        if let Some(sym) = &app.viewport.hovered {
            ui.separator();
            ui.label(format!("over {sym}"));
        }
        if let Some(sym) = &app.selected {
            ui.separator();
            ui.label(format!("selected {sym}"));
        }
    });
}

fn heatmap(ui: &mut Ui, app: &mut AppState) {
    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
    let canvas = response.rect;
    let now = Duration::from_secs_f64(ui.input(|i| i.time));

    feed_input(ui, app, &response, canvas.min, now);

    let layout = app.cache.get_or_compute(
        &app.stocks,
        canvas.width() as f64,
        canvas.height() as f64,
        &app.taxonomy,
        &app.cfg,
    );
    let t = app.viewport.transform();
    let hits: HashSet<&str> = search_stocks(layout, &app.search)
        .into_iter()
        .map(|n| n.stock.symbol.as_str())
        .collect();
    let painter = painter.with_clip_rect(canvas);
    let light = app.light_theme;
    let ink = if light { Color32::from_gray(20) } else { Color32::from_gray(235) };
    let frame = if light { Color32::from_gray(250) } else { Color32::from_gray(18) };
    let labels = app.cfg.labels;
    let to_screen = |r: Rect| screen_rect(&t, r, canvas.min);

    for sector in &layout.sectors {
        let sr = to_screen(sector.rect);
        painter.rect_filled(sr, 0.0, frame);
        if fits(&labels.sector, sr) {
            let label = LayoutNode::Sector(sector).label().to_uppercase();
            painter.text(sr.min + egui::vec2(3.0, 2.0), Align2::LEFT_TOP, label, FontId::proportional(12.0), ink);
        }
        for industry in &sector.children {
            let ir = to_screen(industry.rect);
            if fits(&labels.industry, ir) {
                let label = LayoutNode::Industry(industry).label();
                painter.text(ir.min + egui::vec2(3.0, 1.0), Align2::LEFT_TOP, label, FontId::proportional(10.0), ink);
            }
            for leaf in &industry.children {
                let lr = to_screen(leaf.rect);
                if lr.width() <= 0.0 || lr.height() <= 0.0 {
                    continue;
                }
                let fill = to_color32(color_for(leaf.stock.value, app.metric, light));
                painter.rect_filled(lr, 0.0, fill);
                painter.rect_stroke(lr, 0.0, Stroke::new(1.0, frame));
                if hits.contains(leaf.stock.symbol.as_str()) {
                    painter.rect_stroke(lr.shrink(1.0), 0.0, Stroke::new(2.0, Color32::YELLOW));
                }
                if fits(&labels.stock, lr) {
                    let size = (lr.height().min(lr.width() / 3.0) / 3.0).clamp(9.0, 28.0);
                    painter.text(lr.center(), Align2::CENTER_BOTTOM, &leaf.stock.symbol, FontId::proportional(size), ink);
                    painter.text(lr.center(), Align2::CENTER_TOP, value_text(leaf.stock.value, app.metric), FontId::proportional(size * 0.7), ink);
                }
            }
            painter.rect_stroke(ir, 0.0, Stroke::new(1.0, frame));
        }
        painter.rect_stroke(sr, 0.0, Stroke::new(2.0, frame));
    }

    if let Some(node) = app.selected.as_deref().and_then(|s| layout.find_stock(s)) {
        painter.rect_stroke(to_screen(node.rect).shrink(1.0), 0.0, Stroke::new(2.0, ink));
    }

    let mut clicked = None;
    app.viewport.hovered = None;
    if let Some(pos) = response.hover_pos() {
        let data = t.screen_to_data(local(pos, canvas.min));
        match layout.hit_test(data) {
            Some(LayoutNode::Stock(node)) => {
                app.viewport.hovered = Some(node.stock.symbol.clone());
                let metric = app.metric;
                let stock = node.stock.clone();
                response.clone().on_hover_ui_at_pointer(|ui| {
                    ui.strong(format!("{}  {}", stock.symbol, stock.name));
                    ui.label(format!("{}: {}", metric.label(), value_text(stock.value, metric)));
                    ui.label(format!("Price: {}", price(stock.price)));
                    ui.label(format!("Market cap: {}", human_market_cap(stock.market_cap)));
                });
                if response.clicked() {
                    clicked = Some(node.stock.symbol.clone());
                }
            }
            // Header strips name their group.
            Some(node) => {
                let label = node.label().to_string();
                response.clone().on_hover_text_at_pointer(label);
            }
            None => {}
        }
    }
    if let Some(symbol) = clicked {
        app.select(&symbol, now);
    }
}

/// Translates this frame's egui input into controller events.
fn feed_input(ui: &Ui, app: &mut AppState, response: &egui::Response, origin: Pos2, now: Duration) {
    let (scroll, pressed, released, latest, events) = ui.input(|i| {
        (
            i.raw_scroll_delta.y,
            i.pointer.primary_pressed(),
            i.pointer.primary_released(),
            i.pointer.latest_pos(),
            i.events.clone(),
        )
    });

    let hovered = response.hovered();
    if let Some(pos) = latest.filter(|_| hovered) {
        let p = local(pos, origin);
        if scroll != 0.0 {
            let direction = if scroll > 0.0 { ZoomDirection::In } else { ZoomDirection::Out };
            app.feed(InputEvent::Wheel { pos: p, direction }, now);
        }
        if pressed {
            app.feed(InputEvent::PointerDown { pos: p }, now);
        }
        app.feed(InputEvent::PointerMove { pos: p }, now);
    }
    if released {
        app.feed(InputEvent::PointerUp, now);
    }
    if app.viewport.pointer_inside() && !hovered {
        app.feed(InputEvent::PointerLeave, now);
    }
    // The canvas owns the wheel while the pointer is over it.
    if app.viewport.scroll_locked() {
        ui.ctx().input_mut(|i| {
            i.raw_scroll_delta = egui::Vec2::ZERO;
            i.smooth_scroll_delta = egui::Vec2::ZERO;
        });
    }

    if response.double_clicked() {
        app.feed(InputEvent::DoubleTap, now);
    }

    for event in events {
        if let egui::Event::Touch { id, phase, pos, .. } = event {
            let p = local(pos, origin);
            let ev = match phase {
                egui::TouchPhase::Start => {
                    app.touches.insert(id.0, p);
                    InputEvent::TouchStart { touches: app.touch_points() }
                }
                egui::TouchPhase::Move => {
                    app.touches.insert(id.0, p);
                    InputEvent::TouchMove { touches: app.touch_points() }
                }
                egui::TouchPhase::End | egui::TouchPhase::Cancel => {
                    app.touches.remove(&id.0);
                    InputEvent::TouchEnd { touches: app.touch_points() }
                }
            };
            app.feed(ev, now);
        }
    }
}

fn local(pos: Pos2, origin: Pos2) -> Point {
    Point::new((pos.x - origin.x) as f64, (pos.y - origin.y) as f64)
}

fn screen_rect(t: &ViewportTransform, r: Rect, origin: Pos2) -> egui::Rect {
    let min = t.data_to_screen(Point::new(r.x, r.y));
    let max = t.data_to_screen(Point::new(r.right(), r.bottom()));
    egui::Rect::from_min_max(
        Pos2::new(origin.x + min.x as f32, origin.y + min.y as f32),
        Pos2::new(origin.x + max.x as f32, origin.y + max.y as f32),
    )
}

fn fits(threshold: &LabelThreshold, r: egui::Rect) -> bool {
    threshold.admits(r.width() as f64, r.height() as f64)
}

fn value_text(value: f64, metric: MetricKind) -> String {
    if metric.is_signed_percent() {
        signed_percent(value)
    } else {
        format!("{value:.2}")
    }
}

fn to_color32(c: Color) -> Color32 {
    Color32::from_rgb(c.r, c.g, c.b)
}
