use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, StrokeKind, Vec2};

use super::Surface;

const DASH: f32 = 5.0;

/// egui painter clipped to the canvas; viewport coordinates are offset by
/// the canvas origin.
pub struct PainterSurface<'a> {
    painter: &'a Painter,
    origin: Pos2,
}

impl<'a> PainterSurface<'a> {
    pub fn new(painter: &'a Painter, canvas: Rect) -> Self {
        Self {
            painter,
            origin: canvas.min,
        }
    }

    fn screen(&self, point: Vec2) -> Pos2 {
        self.origin + point
    }
}

impl Surface for PainterSurface<'_> {
    fn rect(&mut self, min: Vec2, size: Vec2, fill: Color32, stroke: Stroke) {
        let rect = Rect::from_min_size(self.screen(min), size);
        self.painter.rect_filled(rect, 0.0, fill);
        if stroke.width > 0.0 {
            self.painter.rect_stroke(rect, 0.0, stroke, StrokeKind::Middle);
        }
    }

    fn circle(&mut self, center: Vec2, radius: f32, fill: Color32, stroke: Stroke) {
        self.painter.circle(self.screen(center), radius, fill, stroke);
    }

    fn polygon(&mut self, points: &[Vec2], fill: Color32, stroke: Stroke) {
        let points = points.iter().map(|point| self.screen(*point)).collect();
        self.painter.add(Shape::convex_polygon(points, fill, stroke));
    }

    fn line(&mut self, from: Vec2, to: Vec2, stroke: Stroke, dashed: bool) {
        let segment = [self.screen(from), self.screen(to)];
        if dashed {
            self.painter.extend(Shape::dashed_line(&segment, stroke, DASH, DASH));
        } else {
            self.painter.line_segment(segment, stroke);
        }
    }

    fn text(&mut self, pos: Vec2, anchor: Align2, text: &str, size: f32, color: Color32) {
        self.painter.text(
            self.screen(pos),
            anchor,
            text,
            FontId::proportional(size),
            color,
        );
    }

    fn text_width(&self, text: &str, size: f32) -> f32 {
        self.painter
            .layout_no_wrap(text.to_owned(), FontId::proportional(size), Color32::WHITE)
            .size()
            .x
    }
}
