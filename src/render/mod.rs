mod painter;

use std::f32::consts::{PI, TAU};

use eframe::egui::{Align2, Color32, Stroke, Vec2, vec2};

use crate::graph::{EdgeStyle, Fade, Shape};
use crate::scene::Scene;
use crate::util::with_alpha;

pub use painter::PainterSurface;

const NAME_SIZE: f32 = 12.0;
const SUBTITLE_SIZE: f32 = 10.0;
const LABEL_SIZE: f32 = 10.0;
const LABEL_MIN_ALPHA: f32 = 0.7;
const OUTLINE_WIDTH: f32 = 2.0;

/// Primitive drawing operations in viewport coordinates.
pub trait Surface {
    fn rect(&mut self, min: Vec2, size: Vec2, fill: Color32, stroke: Stroke);
    fn circle(&mut self, center: Vec2, radius: f32, fill: Color32, stroke: Stroke);
    fn polygon(&mut self, points: &[Vec2], fill: Color32, stroke: Stroke);
    fn line(&mut self, from: Vec2, to: Vec2, stroke: Stroke, dashed: bool);
    fn text(&mut self, pos: Vec2, anchor: Align2, text: &str, size: f32, color: Color32);
    fn text_width(&self, text: &str, size: f32) -> f32;
}

#[derive(Clone, Copy, Debug)]
pub struct Palette {
    pub background: Color32,
    pub grid: Color32,
    pub edge: Color32,
    pub label_background: Color32,
    pub text: Color32,
    pub outline: Color32,
    pub halo: Color32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color32::from_rgb(19, 23, 29),
            grid: Color32::from_rgba_unmultiplied(60, 70, 80, 70),
            edge: Color32::from_rgba_unmultiplied(255, 255, 255, 102),
            label_background: Color32::from_rgb(0x33, 0x33, 0x33),
            text: Color32::from_rgb(230, 232, 236),
            outline: Color32::WHITE,
            halo: Color32::from_rgb(245, 206, 93),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Outline {
    Circle,
    Rect { min: Vec2, size: Vec2 },
    Polygon(Vec<Vec2>),
}

pub fn outline(shape: Shape, center: Vec2, radius: f32) -> Outline {
    let around = |count: usize, angle: &dyn Fn(usize) -> Vec2| {
        Outline::Polygon((0..count).map(|i| center + angle(i) * radius).collect())
    };

    match shape {
        Shape::Circle => Outline::Circle,
        Shape::Square => Outline::Rect {
            min: center - vec2(radius, radius),
            size: vec2(radius, radius) * 1.7,
        },
        Shape::Triangle => Outline::Polygon(vec![
            center + vec2(0.0, -radius),
            center + vec2(radius, radius),
            center + vec2(-radius, radius),
        ]),
        Shape::Diamond => Outline::Polygon(vec![
            center + vec2(0.0, -radius),
            center + vec2(radius, 0.0),
            center + vec2(0.0, radius),
            center + vec2(-radius, 0.0),
        ]),
        Shape::Pentagon => around(5, &|i| {
            let angle = TAU * i as f32 / 5.0 - PI / 2.0;
            vec2(angle.cos(), angle.sin())
        }),
        Shape::Hexagon => around(6, &|i| {
            let angle = PI / 3.0 * i as f32;
            vec2(angle.sin(), -angle.cos())
        }),
        Shape::Octagon => around(8, &|i| {
            let angle = TAU * i as f32 / 8.0;
            vec2(angle.cos(), angle.sin())
        }),
    }
}

pub fn edge_stroke_width(weight: u32) -> f32 {
    (weight.max(1) as f32).sqrt() * 2.0
}

/// Draws one frame: grid, edges, then entities in table order.
pub fn draw_scene(scene: &Scene, surface: &mut impl Surface, palette: &Palette) {
    let viewport = scene.viewport();
    let extent = vec2(viewport.width, viewport.height);
    surface.rect(Vec2::ZERO, extent, palette.background, Stroke::NONE);
    draw_grid(scene, surface, palette);

    let graph = scene.graph();
    for edge in &graph.edges {
        let source = graph.entity(edge.source);
        let target = graph.entity(edge.target);
        let alpha = source.fade.level.min(target.fade.level);
        if alpha <= Fade::DRAW_THRESHOLD {
            continue;
        }

        let stroke = Stroke::new(
            edge_stroke_width(edge.weight),
            with_alpha(palette.edge, alpha),
        );
        surface.line(
            source.position,
            target.position,
            stroke,
            edge.style == EdgeStyle::Dashed,
        );

        if alpha > LABEL_MIN_ALPHA
            && let Some(label) = &edge.label
        {
            let mid = (source.position + target.position) / 2.0;
            let width = surface.text_width(label, LABEL_SIZE);
            surface.rect(
                mid - vec2(width / 2.0 + 3.0, 7.0),
                vec2(width + 6.0, 14.0),
                with_alpha(palette.label_background, alpha),
                Stroke::NONE,
            );
            surface.text(
                mid,
                Align2::CENTER_CENTER,
                label,
                LABEL_SIZE,
                with_alpha(palette.text, alpha),
            );
        }
    }

    for id in graph.ids() {
        let entity = graph.entity(id);
        let alpha = entity.fade.level;
        if alpha <= Fade::DRAW_THRESHOLD {
            continue;
        }

        let hovered = scene.hovered() == Some(id);
        if hovered || scene.selected() == Some(id) {
            surface.circle(
                entity.position,
                entity.radius + 3.0,
                Color32::TRANSPARENT,
                Stroke::new(1.5, with_alpha(palette.halo, alpha)),
            );
        }

        let fill = with_alpha(entity.color, alpha);
        let stroke = Stroke::new(OUTLINE_WIDTH, with_alpha(palette.outline, alpha));
        match outline(entity.shape, entity.position, entity.radius) {
            Outline::Circle => surface.circle(entity.position, entity.radius, fill, stroke),
            Outline::Rect { min, size } => surface.rect(min, size, fill, stroke),
            Outline::Polygon(points) => surface.polygon(&points, fill, stroke),
        }

        surface.text(
            entity.position + vec2(0.0, entity.radius + 10.0),
            Align2::CENTER_TOP,
            &entity.name,
            NAME_SIZE,
            with_alpha(palette.text, alpha),
        );
        if hovered && let Some(subtitle) = &entity.subtitle {
            surface.text(
                entity.position + vec2(0.0, entity.radius + 25.0),
                Align2::CENTER_TOP,
                subtitle,
                SUBTITLE_SIZE,
                with_alpha(palette.text, alpha * 0.8),
            );
        }
    }
}

fn draw_grid(scene: &Scene, surface: &mut impl Surface, palette: &Palette) {
    let viewport = scene.viewport();
    let step = scene.config().grid_size;
    if step <= 0.0 {
        return;
    }

    let center = viewport.center();
    let stroke = Stroke::new(1.0, palette.grid);

    let mut x = center.x.rem_euclid(step);
    while x < viewport.width {
        surface.line(vec2(x, 0.0), vec2(x, viewport.height), stroke, false);
        x += step;
    }

    let mut y = center.y.rem_euclid(step);
    while y < viewport.height {
        surface.line(vec2(0.0, y), vec2(viewport.width, y), stroke, false);
        y += step;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::graph::testing::sample_data;
    use crate::scene::{SceneConfig, SceneOptions, Viewport};

    #[derive(Debug, PartialEq)]
    enum Drawn {
        Rect(Vec2, Vec2),
        Circle(Vec2, f32),
        Polygon(usize),
        Line { width: f32, dashed: bool },
        Text(String),
    }

    #[derive(Default)]
    struct Recorder {
        drawn: Vec<Drawn>,
    }

    impl Surface for Recorder {
        fn rect(&mut self, min: Vec2, size: Vec2, _fill: Color32, _stroke: Stroke) {
            self.drawn.push(Drawn::Rect(min, size));
        }

        fn circle(&mut self, center: Vec2, radius: f32, _fill: Color32, _stroke: Stroke) {
            self.drawn.push(Drawn::Circle(center, radius));
        }

        fn polygon(&mut self, points: &[Vec2], _fill: Color32, _stroke: Stroke) {
            self.drawn.push(Drawn::Polygon(points.len()));
        }

        fn line(&mut self, _from: Vec2, _to: Vec2, stroke: Stroke, dashed: bool) {
            self.drawn.push(Drawn::Line {
                width: stroke.width,
                dashed,
            });
        }

        fn text(&mut self, _pos: Vec2, _anchor: Align2, text: &str, _size: f32, _color: Color32) {
            self.drawn.push(Drawn::Text(text.to_owned()));
        }

        fn text_width(&self, text: &str, size: f32) -> f32 {
            text.len() as f32 * size * 0.5
        }
    }

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    fn scene_with_edge() -> Scene {
        let mut data = sample_data(&["f", "a", "x"], &[("f", "a")]);
        data.nodes[0].shape = Some("hexagon".to_owned());
        data.connections[0].value = Some(json!(4));
        data.connections[0].kind = Some("dotted".to_owned());
        data.connections[0].label = Some("knows".to_owned());

        let config = SceneConfig::default();
        let viewport = Viewport::new(1600.0, 900.0, &config);
        Scene::new(
            &data,
            config,
            viewport,
            SceneOptions {
                seed: Some(1),
                ..SceneOptions::default()
            },
        )
    }

    #[test]
    fn weight_four_draws_twice_as_thick_as_one() {
        assert_eq!(edge_stroke_width(4), 4.0);
        assert_eq!(edge_stroke_width(1), 2.0);
        assert_eq!(edge_stroke_width(0), 2.0);
    }

    #[test]
    fn shapes_follow_their_category() {
        let center = vec2(50.0, 50.0);
        assert_eq!(outline(Shape::Circle, center, 10.0), Outline::Circle);
        assert_eq!(
            outline(Shape::Square, center, 10.0),
            Outline::Rect {
                min: vec2(40.0, 40.0),
                size: vec2(17.0, 17.0),
            }
        );

        let Outline::Polygon(pentagon) = outline(Shape::Pentagon, center, 10.0) else {
            panic!("pentagon should be a polygon");
        };
        assert_eq!(pentagon.len(), 5);
        assert!(close(pentagon[0], vec2(50.0, 40.0)));

        let Outline::Polygon(hexagon) = outline(Shape::Hexagon, center, 10.0) else {
            panic!("hexagon should be a polygon");
        };
        assert_eq!(hexagon.len(), 6);
        assert!(close(hexagon[0], vec2(50.0, 40.0)));

        let Outline::Polygon(octagon) = outline(Shape::Octagon, center, 10.0) else {
            panic!("octagon should be a polygon");
        };
        assert!(close(octagon[0], vec2(60.0, 50.0)));
        assert!(matches!(outline(Shape::Triangle, center, 10.0), Outline::Polygon(points) if points.len() == 3));
    }

    #[test]
    fn hidden_entities_are_not_drawn() {
        let scene = scene_with_edge();
        let mut recorder = Recorder::default();
        draw_scene(&scene, &mut recorder, &Palette::default());

        assert!(!recorder.drawn.iter().any(|drawn| matches!(drawn, Drawn::Text(_))));
        assert!(
            !recorder
                .drawn
                .iter()
                .any(|drawn| matches!(drawn, Drawn::Line { dashed: true, .. }))
        );
    }

    #[test]
    fn visible_edges_carry_weight_style_and_label() {
        let mut scene = scene_with_edge();
        scene.select_focus_by_id("f");
        for _ in 0..120 {
            scene.tick(Duration::from_millis(16));
        }

        let mut recorder = Recorder::default();
        draw_scene(&scene, &mut recorder, &Palette::default());

        assert!(recorder.drawn.contains(&Drawn::Line {
            width: 4.0,
            dashed: true,
        }));
        assert!(recorder.drawn.contains(&Drawn::Text("knows".to_owned())));
        assert!(recorder.drawn.contains(&Drawn::Text("F".to_owned())));
        assert!(recorder.drawn.contains(&Drawn::Text("A".to_owned())));
        assert!(!recorder.drawn.contains(&Drawn::Text("X".to_owned())));
        assert!(recorder.drawn.contains(&Drawn::Polygon(6)));
    }
}
