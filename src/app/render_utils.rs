use eframe::egui::{Color32, Painter, Pos2, Rect, Shape, Stroke, Vec2, pos2, vec2};

use resistome_viz::LinkCategory;

pub(super) const GENE_FILL: Color32 = Color32::from_rgb(228, 26, 28);
pub(super) const ELEMENT_FILL: Color32 = Color32::from_rgb(55, 126, 184);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum NodeShape {
    Circle,
    Square,
    Diamond,
    Triangle,
    Hexagon,
}

impl NodeShape {
    /// Accepts Graphviz names and d3 symbol names (`symbolDiamond`).
    pub(super) fn parse(name: Option<&str>) -> Self {
        let Some(name) = name else {
            return Self::Circle;
        };
        let lower = name.trim().to_ascii_lowercase();
        let lower = lower.strip_prefix("symbol").unwrap_or(&lower);
        match lower {
            "square" | "box" | "rect" | "rectangle" => Self::Square,
            "diamond" => Self::Diamond,
            "triangle" | "triangle-up" => Self::Triangle,
            "hexagon" => Self::Hexagon,
            _ => Self::Circle,
        }
    }
}

/// Outline of a polygonal shape, clockwise in screen space. Empty for circles.
pub(super) fn shape_points(shape: NodeShape, center: Pos2, radius: f32) -> Vec<Pos2> {
    let regular = |sides: usize, rotation: f32, scale: f32| {
        (0..sides)
            .map(|side| {
                let angle = rotation + (side as f32 / sides as f32) * std::f32::consts::TAU;
                center + vec2(angle.cos(), angle.sin()) * radius * scale
            })
            .collect::<Vec<_>>()
    };

    match shape {
        NodeShape::Circle => Vec::new(),
        NodeShape::Square => regular(4, std::f32::consts::FRAC_PI_4, std::f32::consts::SQRT_2 * 0.9),
        NodeShape::Diamond => regular(4, -std::f32::consts::FRAC_PI_2, 1.25),
        NodeShape::Triangle => regular(3, -std::f32::consts::FRAC_PI_2, 1.35),
        NodeShape::Hexagon => regular(6, 0.0, 1.1),
    }
}

pub(super) fn draw_node(
    painter: &Painter,
    shape: NodeShape,
    center: Pos2,
    radius: f32,
    fill: Color32,
    stroke: Stroke,
) {
    if shape == NodeShape::Circle {
        painter.circle_filled(center, radius, fill);
        painter.circle_stroke(center, radius, stroke);
    } else {
        painter.add(Shape::convex_polygon(shape_points(shape, center, radius), fill, stroke));
    }
}

fn named_color(name: &str) -> Option<Color32> {
    let rgb = match name {
        "red" => (228, 26, 28),
        "blue" => (55, 126, 184),
        "green" => (77, 175, 74),
        "purple" => (152, 78, 163),
        "orange" => (255, 127, 0),
        "yellow" => (255, 255, 51),
        "brown" => (166, 86, 40),
        "pink" => (247, 129, 191),
        "gray" | "grey" => (153, 153, 153),
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "lightblue" => (173, 216, 230),
        "lightgreen" => (144, 238, 144),
        "darkgreen" => (0, 100, 0),
        "steelblue" => (70, 130, 180),
        "teal" => (0, 128, 128),
        "navy" => (0, 0, 128),
        "gold" => (255, 215, 0),
        "salmon" => (250, 128, 114),
        _ => return None,
    };
    Some(Color32::from_rgb(rgb.0, rgb.1, rgb.2))
}

/// Parses `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)` and a handful of
/// CSS color names.
pub(super) fn parse_color(text: &str) -> Option<Color32> {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix('#') {
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
        return match hex.len() {
            3 => {
                let short = |index: usize| channel(index..index + 1).map(|value| value * 17);
                Some(Color32::from_rgb(short(0)?, short(1)?, short(2)?))
            }
            6 => Some(Color32::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Some(Color32::from_rgba_unmultiplied(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => None,
        };
    }

    let lower = text.to_ascii_lowercase();
    if let Some(inner) = lower
        .strip_prefix("rgb(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let parts = inner
            .split(',')
            .map(|part| part.trim().parse::<u8>().ok())
            .collect::<Option<Vec<_>>>()?;
        return match parts.as_slice() {
            [r, g, b] => Some(Color32::from_rgb(*r, *g, *b)),
            _ => None,
        };
    }

    named_color(&lower)
}

pub(super) fn default_link_color(category: LinkCategory) -> Color32 {
    match category {
        LinkCategory::Colocalization => Color32::from_rgb(150, 150, 150),
        LinkCategory::Temporal => Color32::from_rgb(240, 160, 70),
    }
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
        (color.a() as f32 * (0.35 + (factor * 0.65))) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(24, 26, 31));
}

/// Points along a quadratic curve from `start` to `end` whose midpoint sits
/// `offset` pixels off the chord along its normal. A zero offset is a
/// straight line.
pub(super) fn arc_points(start: Pos2, end: Pos2, offset: f32, segments: usize) -> Vec<Pos2> {
    let chord = end - start;
    let length = chord.length();
    if offset.abs() <= f32::EPSILON || length <= f32::EPSILON || segments < 2 {
        return vec![start, end];
    }

    let normal = vec2(-chord.y, chord.x) / length;
    let control = start + chord * 0.5 + normal * (offset * 2.0);
    (0..=segments)
        .map(|step| {
            let t = step as f32 / segments as f32;
            let inverse = 1.0 - t;
            let x = inverse * inverse * start.x + 2.0 * inverse * t * control.x + t * t * end.x;
            let y = inverse * inverse * start.y + 2.0 * inverse * t * control.y + t * t * end.y;
            pos2(x, y)
        })
        .collect()
}

/// Triangle with its tip at `tip`, pointing along `direction`.
pub(super) fn arrowhead(tip: Pos2, direction: Vec2, size: f32) -> Vec<Pos2> {
    let direction = if direction.length_sq() > f32::EPSILON {
        direction.normalized()
    } else {
        vec2(1.0, 0.0)
    };
    let normal = vec2(-direction.y, direction.x);
    let base = tip - direction * size;
    vec![tip, base + normal * (size * 0.5), base - normal * (size * 0.5)]
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

/// Base radius from the optional `degree` attribute.
pub(super) fn node_radius(degree: Option<f64>) -> f32 {
    match degree {
        Some(degree) if degree.is_finite() && degree > 0.0 => {
            (5.0 + (degree as f32).sqrt() * 1.8).clamp(5.0, 22.0)
        }
        _ => 7.0,
    }
}
