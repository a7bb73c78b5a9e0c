//! Zoom, pan and pinch handling for the heatmap canvas.
//!
//! Input is fed as [`InputEvent`]s; [`transition`] is the pure step function
//! `(state, transform, event) -> (state, transform)` and [`ViewportController`]
//! wraps it together with the session-local UI bits the renderer needs.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ZoomConfig;
use crate::model::Point;

const SCALE_EPSILON: f64 = 1e-9;

/// Screen = data * scale + translate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportTransform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewportTransform {
    pub const IDENTITY: ViewportTransform = ViewportTransform {
        scale: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };

    pub fn translate(&self) -> Point {
        Point::new(self.translate_x, self.translate_y)
    }

    pub fn data_to_screen(&self, p: Point) -> Point {
        Point::new(
            p.x * self.scale + self.translate_x,
            p.y * self.scale + self.translate_y,
        )
    }

    pub fn screen_to_data(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.translate_x) / self.scale,
            (p.y - self.translate_y) / self.scale,
        )
    }

    /// Rescales around `anchor` (screen space) so the data point under it stays put.
    /// `from` is the transform the anchor math is measured against.
    fn anchored(from: ViewportTransform, anchor: Point, origin: Point, new_scale: f64, cfg: &ZoomConfig) -> Self {
        let mut scale = new_scale.clamp(cfg.min_scale, cfg.max_scale);
        // Repeated 1.1 and 1/1.1 steps drift; land exactly on the minimum.
        if scale - cfg.min_scale < SCALE_EPSILON {
            scale = cfg.min_scale;
        }
        if scale <= cfg.min_scale {
            // Minimum zoom is pinned to the untranslated canvas.
            return ViewportTransform {
                scale,
                translate_x: 0.0,
                translate_y: 0.0,
            };
        }
        let k = scale / from.scale;
        ViewportTransform {
            scale,
            translate_x: anchor.x - (origin.x - from.translate_x) * k,
            translate_y: anchor.y - (origin.y - from.translate_y) * k,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoomDirection {
    In,
    Out,
}

/// Baseline captured when a second finger lands, or whenever the number of
/// touches changes and the measured pair becomes a different pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchBaseline {
    pub touch_count: usize,
    pub start_distance: f64,
    pub start_scale: f64,
    pub start_midpoint: Point,
    pub start_translate: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Panning {
        last: Point,
    },
    Pinching(PinchBaseline),
}

impl GestureState {
    pub fn name(&self) -> &'static str {
        match self {
            GestureState::Idle => "idle",
            GestureState::Panning { .. } => "panning",
            GestureState::Pinching(_) => "pinching",
        }
    }
}

/// Canvas-local input. Touch events carry every touch point still down.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Wheel { pos: Point, direction: ZoomDirection },
    PointerDown { pos: Point },
    PointerMove { pos: Point },
    PointerUp,
    PointerLeave,
    TouchStart { touches: Vec<Point> },
    TouchMove { touches: Vec<Point> },
    TouchEnd { touches: Vec<Point> },
    DoubleTap,
}

impl InputEvent {
    /// Events that may change the scale; clicks right after them are suppressed.
    pub fn affects_zoom(&self) -> bool {
        match self {
            InputEvent::Wheel { .. } | InputEvent::DoubleTap => true,
            InputEvent::TouchStart { touches } | InputEvent::TouchMove { touches } => touches.len() >= 2,
            _ => false,
        }
    }
}

/// Pure gesture step.
pub fn transition(
    state: GestureState,
    transform: ViewportTransform,
    event: &InputEvent,
    cfg: &ZoomConfig,
) -> (GestureState, ViewportTransform) {
    use GestureState::*;
    let zoomed = transform.scale > cfg.min_scale;

    match (state, event) {
        (Pinching(_), InputEvent::Wheel { .. }) => (state, transform),
        (_, InputEvent::Wheel { pos, direction }) => {
            let factor = match direction {
                ZoomDirection::In => cfg.step,
                ZoomDirection::Out => 1.0 / cfg.step,
            };
            let next = ViewportTransform::anchored(transform, *pos, *pos, transform.scale * factor, cfg);
            (state, next)
        }

        (_, InputEvent::DoubleTap) => {
            if transform.scale != 1.0 {
                (Idle, ViewportTransform::IDENTITY)
            } else {
                (Idle, transform)
            }
        }

        (Idle, InputEvent::PointerDown { pos }) if zoomed => (Panning { last: *pos }, transform),
        (Idle, InputEvent::PointerDown { .. }) => (Idle, transform),
        (Panning { last }, InputEvent::PointerMove { pos }) => {
            if !zoomed {
                return (Idle, transform);
            }
            let next = ViewportTransform {
                translate_x: transform.translate_x + (pos.x - last.x),
                translate_y: transform.translate_y + (pos.y - last.y),
                ..transform
            };
            (Panning { last: *pos }, next)
        }
        (Panning { .. }, InputEvent::PointerUp | InputEvent::PointerLeave) => (Idle, transform),

        (Pinching(base), InputEvent::TouchStart { touches } | InputEvent::TouchMove { touches })
            if touches.len() >= 2 && touches.len() == base.touch_count =>
        {
            (state, pinch_step(base, transform, touches, cfg))
        }
        (Pinching(_), InputEvent::TouchEnd { touches }) if touches.len() >= 2 => {
            (Pinching(capture_baseline(transform, touches)), transform)
        }
        (_, InputEvent::TouchStart { touches } | InputEvent::TouchMove { touches }) if touches.len() >= 2 => {
            let baseline = capture_baseline(transform, touches);
            (Pinching(baseline), transform)
        }
        (Idle, InputEvent::TouchStart { touches }) if touches.len() == 1 && zoomed => {
            (Panning { last: touches[0] }, transform)
        }
        (Panning { last }, InputEvent::TouchMove { touches }) if touches.len() == 1 && zoomed => {
            let pos = touches[0];
            let next = ViewportTransform {
                translate_x: transform.translate_x + (pos.x - last.x),
                translate_y: transform.translate_y + (pos.y - last.y),
                ..transform
            };
            (Panning { last: pos }, next)
        }
        (Pinching(_), InputEvent::TouchEnd { touches } | InputEvent::TouchMove { touches })
            if touches.len() == 1 =>
        {
            // Baseline is dropped; the remaining finger starts a fresh pan.
            if zoomed {
                (Panning { last: touches[0] }, transform)
            } else {
                (Idle, transform)
            }
        }
        (_, InputEvent::TouchEnd { touches }) if touches.is_empty() => (Idle, transform),
        (Idle, InputEvent::TouchEnd { touches }) if touches.len() == 1 && zoomed => {
            (Panning { last: touches[0] }, transform)
        }

        // Anything else (stray moves, ends without starts) settles back to the
        // current state, or to idle when the state no longer makes sense.
        (Panning { .. }, InputEvent::TouchStart { touches } | InputEvent::TouchEnd { touches })
            if touches.len() == 1 =>
        {
            (Panning { last: touches[0] }, transform)
        }
        (Pinching(_), _) => (state, transform),
        (Panning { .. }, InputEvent::PointerDown { pos }) => (Panning { last: *pos }, transform),
        _ => (Idle, transform),
    }
}

/// Measures the first two touches; callers pass at least two.
fn capture_baseline(transform: ViewportTransform, touches: &[Point]) -> PinchBaseline {
    let (a, b) = (touches[0], touches[1]);
    PinchBaseline {
        touch_count: touches.len(),
        start_distance: a.distance(b),
        start_scale: transform.scale,
        start_midpoint: a.midpoint(b),
        start_translate: transform.translate(),
    }
}

/// Recomputes the transform from the pinch baseline, never incrementally.
fn pinch_step(
    base: PinchBaseline,
    transform: ViewportTransform,
    touches: &[Point],
    cfg: &ZoomConfig,
) -> ViewportTransform {
    let (a, b) = (touches[0], touches[1]);
    let distance = a.distance(b);
    if base.start_distance <= f64::EPSILON || distance <= f64::EPSILON {
        return transform;
    }
    let start = ViewportTransform {
        scale: base.start_scale,
        translate_x: base.start_translate.x,
        translate_y: base.start_translate.y,
    };
    ViewportTransform::anchored(
        start,
        a.midpoint(b),
        base.start_midpoint,
        base.start_scale * distance / base.start_distance,
        cfg,
    )
}

/// Session-local viewport state handed to the renderer.
#[derive(Debug, Clone)]
pub struct ViewportController {
    cfg: ZoomConfig,
    transform: ViewportTransform,
    gesture: GestureState,
    last_zoom_at: Option<Duration>,
    /// Symbol under the pointer, if any.
    pub hovered: Option<String>,
    pointer_inside: bool,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(ZoomConfig::default())
    }
}

impl ViewportController {
    pub fn new(cfg: ZoomConfig) -> Self {
        Self {
            cfg,
            transform: ViewportTransform::IDENTITY,
            gesture: GestureState::Idle,
            last_zoom_at: None,
            hovered: None,
            pointer_inside: false,
        }
    }

    pub fn transform(&self) -> ViewportTransform {
        self.transform
    }

    pub fn gesture(&self) -> GestureState {
        self.gesture
    }

    /// Applies one event; scale and translate always change together.
    pub fn handle(&mut self, event: &InputEvent, at: Duration) -> ViewportTransform {
        let (gesture, transform) = transition(self.gesture, self.transform, event, &self.cfg);
        if gesture.name() != self.gesture.name() {
            tracing::trace!(from = self.gesture.name(), to = gesture.name(), "gesture transition");
        }
        if event.affects_zoom() {
            self.last_zoom_at = Some(at);
        }
        match event {
            InputEvent::PointerLeave => {
                self.pointer_inside = false;
                self.hovered = None;
            }
            InputEvent::PointerDown { .. } | InputEvent::PointerMove { .. } | InputEvent::Wheel { .. } => {
                self.pointer_inside = true;
            }
            _ => {}
        }
        self.gesture = gesture;
        self.transform = transform;
        transform
    }

    pub fn pointer_inside(&self) -> bool {
        self.pointer_inside
    }

    pub fn reset(&mut self) {
        self.transform = ViewportTransform::IDENTITY;
        self.gesture = GestureState::Idle;
    }

    /// False while a click could still be the tail of a zoom gesture.
    pub fn is_click_allowed(&self, at: Duration) -> bool {
        match self.last_zoom_at {
            Some(zoomed) => at.saturating_sub(zoomed) >= self.cfg.click_suppression,
            None => true,
        }
    }

    /// Whether the host page should stop scrolling so wheel/touch go to the map.
    pub fn scroll_locked(&self) -> bool {
        self.pointer_inside || !matches!(self.gesture, GestureState::Idle)
    }
}
