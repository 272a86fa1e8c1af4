use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

// Categorical palette shared by node fills and link tints, indexed by the
// bucketed size metric.
const PALETTE: [Color32; 10] = [
    Color32::from_rgb(31, 119, 180),
    Color32::from_rgb(255, 127, 14),
    Color32::from_rgb(44, 160, 44),
    Color32::from_rgb(214, 39, 40),
    Color32::from_rgb(148, 103, 189),
    Color32::from_rgb(140, 86, 75),
    Color32::from_rgb(227, 119, 194),
    Color32::from_rgb(127, 127, 127),
    Color32::from_rgb(188, 189, 34),
    Color32::from_rgb(23, 190, 207),
];

pub(super) const MIN_NODE_RADIUS: f32 = 7.0;
pub(super) const MAX_NODE_RADIUS: f32 = 28.0;

fn normalize_linear(value: u64, min: u64, max: u64) -> f32 {
    if max <= min {
        return 0.5;
    }
    ((value.saturating_sub(min)) as f64 / (max - min) as f64).clamp(0.0, 1.0) as f32
}

pub(super) fn node_radius(metric: u64, min: u64, max: u64) -> f32 {
    MIN_NODE_RADIUS + normalize_linear(metric, min, max) * (MAX_NODE_RADIUS - MIN_NODE_RADIUS)
}

pub(super) fn palette_slot(metric: u64, min: u64, max: u64) -> usize {
    let slot = (normalize_linear(metric, min, max) * (PALETTE.len() - 1) as f32).round() as usize;
    slot.min(PALETTE.len() - 1)
}

pub(super) fn palette_color(slot: usize) -> Color32 {
    PALETTE[slot % PALETTE.len()]
}

pub(super) fn with_alpha(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.40 + (factor * 0.60))) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(17, 20, 28));

    let step = (64.0 * zoom.clamp(0.6, 1.8)).max(22.0);
    let origin = rect.center() + pan;

    let grid_stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(56, 64, 78, 60));
    let mut x = origin.x.rem_euclid(step);
    while x < rect.right() {
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
            grid_stroke,
        );
        x += step;
    }

    let mut y = origin.y.rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment(
            [Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)],
            grid_stroke,
        );
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

// Conservative bounding-box cull; good enough for a few hundred links.
pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min_x = start.x.min(end.x) - padding;
    let max_x = start.x.max(end.x) + padding;
    let min_y = start.y.min(end.y) - padding;
    let max_y = start.y.max(end.y) + padding;

    !(max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom())
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}
