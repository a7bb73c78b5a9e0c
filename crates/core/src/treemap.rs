//! Squarified treemap partitioning (Bruls, Huizing, van Wijk).
//!
//! Items are sorted by descending weight and packed into rows laid along the
//! shorter side of the remaining rectangle. A row keeps growing while the
//! worst aspect ratio of its cells does not get worse; then it is committed
//! and the remaining rectangle shrinks by the row's thickness.

use crate::model::Rect;

#[derive(Clone, Debug, PartialEq)]
pub struct TreemapItem<T> {
    pub weight: f64,
    pub payload: T,
}

impl<T> TreemapItem<T> {
    pub fn new(weight: f64, payload: T) -> Self {
        Self { weight, payload }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Placed<T> {
    pub rect: Rect,
    pub payload: T,
}

/// Tiles `rect` with one rectangle per item, each sized `weight / total_weight` of the area.
///
/// Callers guarantee `total_weight > 0` and positive item weights. A zero-area
/// `rect` still places every item, with zero-area rectangles.
pub fn squarify<T>(items: Vec<TreemapItem<T>>, rect: Rect, total_weight: f64) -> Vec<Placed<T>> {
    if items.is_empty() {
        return Vec::new();
    }

    let mut items = items;
    // Stable: equal weights keep their input order.
    items.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(std::cmp::Ordering::Equal));

    if rect.width <= 0.0 || rect.height <= 0.0 {
        return collapse(items, rect, total_weight);
    }

    let scale = rect.area() / total_weight;
    let areas: Vec<f64> = items.iter().map(|i| i.weight * scale).collect();

    let mut placed = Vec::with_capacity(items.len());
    let mut payloads = items.into_iter().map(|i| i.payload);
    let mut remaining = rect;
    let mut start = 0;

    while start < areas.len() {
        let side = remaining.width.min(remaining.height);
        let end = row_end(&areas, start, side);
        let last_row = end == areas.len();
        let row = &areas[start..end];
        let row_rects = layout_row(row, &mut remaining, last_row);
        for r in row_rects {
            // `payloads` yields exactly one payload per area.
            if let Some(payload) = payloads.next() {
                placed.push(Placed { rect: r, payload });
            }
        }
        start = end;
    }

    placed
}

/// Exclusive end of the row starting at `start`: keep adding items while the
/// worst aspect ratio does not increase.
fn row_end(areas: &[f64], start: usize, side: f64) -> usize {
    let mut end = start + 1;
    let mut row_sum = areas[start];
    let mut current = worst_ratio(row_sum, areas[start], areas[start], side);
    while end < areas.len() {
        let next_sum = row_sum + areas[end];
        // Sorted descending: max is the row's first item, min the candidate.
        let next = worst_ratio(next_sum, areas[start], areas[end], side);
        if next > current {
            break;
        }
        current = next;
        row_sum = next_sum;
        end += 1;
    }
    end
}

/// Worst `max(row/item, item/row)` across a row, given its area sum and
/// extreme member areas, when laid along `side`.
fn worst_ratio(row_sum: f64, max_area: f64, min_area: f64, side: f64) -> f64 {
    if row_sum <= 0.0 || side <= 0.0 || min_area <= 0.0 {
        return f64::INFINITY;
    }
    let thickness = row_sum / side;
    let ratio = |area: f64| {
        let length = area / thickness;
        (thickness / length).max(length / thickness)
    };
    ratio(max_area).max(ratio(min_area))
}

/// Places a row along the shorter side of `remaining` and shrinks it.
fn layout_row(row: &[f64], remaining: &mut Rect, last_row: bool) -> Vec<Rect> {
    let row_sum: f64 = row.iter().sum();
    let horizontal = remaining.width <= remaining.height;
    let (side, depth) = if horizontal {
        (remaining.width, remaining.height)
    } else {
        (remaining.height, remaining.width)
    };
    let thickness = if last_row {
        depth
    } else {
        (row_sum / side).min(depth)
    };

    let mut out = Vec::with_capacity(row.len());
    let mut offset = 0.0;
    for (i, &area) in row.iter().enumerate() {
        let length = if i + 1 == row.len() {
            side - offset
        } else if row_sum > 0.0 {
            side * area / row_sum
        } else {
            0.0
        };
        let r = if horizontal {
            Rect::new(remaining.x + offset, remaining.y, length, thickness)
        } else {
            Rect::new(remaining.x, remaining.y + offset, thickness, length)
        };
        out.push(r);
        offset += length;
    }

    *remaining = if horizontal {
        Rect::new(remaining.x, remaining.y + thickness, remaining.width, remaining.height - thickness)
    } else {
        Rect::new(remaining.x + thickness, remaining.y, remaining.width - thickness, remaining.height)
    };
    out
}

/// Degenerate container: slice along the non-zero axis so every item still
/// gets a (zero-area) rectangle in weight order.
fn collapse<T>(items: Vec<TreemapItem<T>>, rect: Rect, total_weight: f64) -> Vec<Placed<T>> {
    let along_width = rect.width >= rect.height;
    let extent = rect.width.max(rect.height);
    let mut offset = 0.0;
    items
        .into_iter()
        .map(|item| {
            let length = if total_weight > 0.0 {
                extent * item.weight / total_weight
            } else {
                0.0
            };
            let r = if along_width {
                Rect::new(rect.x + offset, rect.y, length, rect.height)
            } else {
                Rect::new(rect.x, rect.y + offset, rect.width, length)
            };
            offset += length;
            Placed {
                rect: r,
                payload: item.payload,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(weights: &[f64]) -> Vec<TreemapItem<usize>> {
        weights
            .iter()
            .enumerate()
            .map(|(i, &w)| TreemapItem::new(w, i))
            .collect()
    }

    fn area_of(placed: &[Placed<usize>], idx: usize) -> f64 {
        placed.iter().find(|p| p.payload == idx).unwrap().rect.area()
    }

    #[test]
    fn empty_input_places_nothing() {
        let out = squarify(Vec::<TreemapItem<()>>::new(), Rect::new(0.0, 0.0, 10.0, 10.0), 1.0);
        assert!(out.is_empty());
    }

    #[test]
    fn single_item_fills_rect() {
        let rect = Rect::new(3.0, 4.0, 30.0, 12.0);
        let out = squarify(items(&[7.0]), rect, 7.0);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].rect, rect);
    }

    #[test]
    fn compressed_caps_example_has_exact_areas() {
        let out = squarify(items(&[10.0, 20.0, 50.0]), Rect::new(0.0, 0.0, 100.0, 80.0), 80.0);
        assert_eq!(out.len(), 3);
        assert!((area_of(&out, 0) - 1000.0).abs() < 1e-9);
        assert!((area_of(&out, 1) - 2000.0).abs() < 1e-9);
        assert!((area_of(&out, 2) - 5000.0).abs() < 1e-9);
        let total: f64 = out.iter().map(|p| p.rect.area()).sum();
        assert!((total - 8000.0).abs() < 1e-9);
    }

    #[test]
    fn rows_run_along_shorter_side() {
        // Wide container: first row is a column on the left edge.
        let out = squarify(items(&[6.0, 6.0, 4.0, 3.0, 2.0, 2.0, 1.0]), Rect::new(0.0, 0.0, 6.0, 4.0), 24.0);
        let first = &out[0].rect;
        assert_eq!(first.x, 0.0);
        assert_eq!(first.y, 0.0);
        assert!((first.width - 3.0).abs() < 1e-9);
        assert!((first.height - 2.0).abs() < 1e-9);
    }

    #[test]
    fn tiles_without_overlap() {
        let weights = [13.0, 8.0, 8.0, 5.0, 3.0, 2.0, 1.0, 1.0, 0.5];
        let total: f64 = weights.iter().sum();
        let rect = Rect::new(10.0, 20.0, 317.0, 143.0);
        let out = squarify(items(&weights), rect, total);
        assert_eq!(out.len(), weights.len());
        for (i, a) in out.iter().enumerate() {
            assert!(a.rect.x >= rect.x - 1e-9 && a.rect.right() <= rect.right() + 1e-9);
            assert!(a.rect.y >= rect.y - 1e-9 && a.rect.bottom() <= rect.bottom() + 1e-9);
            for b in &out[i + 1..] {
                assert!(a.rect.overlap(&b.rect) < 1e-9);
            }
            let expected = weights[a.payload] / total * rect.area();
            assert!((a.rect.area() - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn zero_height_container_still_places_every_item() {
        let out = squarify(items(&[3.0, 1.0]), Rect::new(0.0, 0.0, 40.0, 0.0), 4.0);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|p| p.rect.area() == 0.0));
        assert_eq!(out[0].payload, 0);
        assert!((out[0].rect.width - 30.0).abs() < 1e-9);
    }

    #[test]
    fn cells_stay_reasonably_square() {
        let weights: Vec<f64> = (1..=30).map(|i| i as f64).collect();
        let total: f64 = weights.iter().sum();
        let out = squarify(items(&weights), Rect::new(0.0, 0.0, 400.0, 300.0), total);
        let worst = out
            .iter()
            .map(|p| (p.rect.width / p.rect.height).max(p.rect.height / p.rect.width))
            .fold(0.0, f64::max);
        assert!(worst < 8.0, "worst aspect ratio {worst}");
    }
}
