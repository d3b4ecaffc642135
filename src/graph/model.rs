use std::collections::{HashMap, VecDeque};

use eframe::egui::{Color32, Vec2};
use tracing::{debug, warn};

use crate::util::parse_hex_color;

use super::distance::{DistanceIndex, DistanceMap};
use super::source::{EntityRecord, GraphData, VisualSettings};

const DEFAULT_ANCHOR_COLOR: Color32 = Color32::from_rgb(0x42, 0x99, 0xe1);
const DEFAULT_ENTITY_COLOR: Color32 = Color32::from_rgb(0xed, 0x89, 0x36);
const DEFAULT_RADIUS: f32 = 8.0;
const ANCHOR_MASS: f32 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub(crate) usize);

impl EntityId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Shape {
    #[default]
    Circle,
    Square,
    Triangle,
    Diamond,
    Pentagon,
    Hexagon,
    Octagon,
}

impl Shape {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "square" => Self::Square,
            "triangle" => Self::Triangle,
            "diamond" => Self::Diamond,
            "pentagon" => Self::Pentagon,
            "hexagon" => Self::Hexagon,
            "octagon" => Self::Octagon,
            _ => Self::Circle,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EdgeStyle {
    #[default]
    Solid,
    Dashed,
}

impl EdgeStyle {
    fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("dotted" | "dashed") => Self::Dashed,
            _ => Self::Solid,
        }
    }
}

/// Fade state: `target` is always 0 or 1, `level` eases toward it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fade {
    pub target: f32,
    pub level: f32,
}

impl Fade {
    pub const DRAW_THRESHOLD: f32 = 0.01;
    pub const VISIBLE_THRESHOLD: f32 = 0.5;

    pub fn hidden() -> Self {
        Self {
            target: 0.0,
            level: 0.0,
        }
    }

    pub fn set_shown(&mut self, shown: bool) {
        self.target = if shown { 1.0 } else { 0.0 };
    }

    pub fn is_drawn(&self) -> bool {
        self.level > Self::DRAW_THRESHOLD
    }

    pub fn is_visible(&self) -> bool {
        self.level > Self::VISIBLE_THRESHOLD
    }
}

#[derive(Clone, Debug, Default)]
pub struct SettleWindow {
    pub(crate) samples: VecDeque<f32>,
    pub(crate) counter: u32,
}

impl SettleWindow {
    #[cfg(test)]
    pub fn counter(&self) -> u32 {
        self.counter
    }
}

#[derive(Clone, Debug)]
pub struct Entity {
    pub id: String,
    pub name: String,
    pub shape: Shape,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub position: Vec2,
    pub velocity: Vec2,
    pub force: Vec2,
    pub radius: f32,
    pub color: Color32,
    pub mass: f32,
    pub fade: Fade,
    pub settle: SettleWindow,
}

impl Entity {
    fn from_record(record: &EntityRecord, radius: f32, color: Color32, mass: f32) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            shape: record
                .shape
                .as_deref()
                .map(Shape::from_tag)
                .unwrap_or_default(),
            subtitle: record.subtitle.clone(),
            description: record.description.clone(),
            url: record.url.clone(),
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
            radius,
            color,
            mass,
            fade: Fade::hidden(),
            settle: SettleWindow::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Edge {
    pub source: EntityId,
    pub target: EntityId,
    pub weight: u32,
    pub style: EdgeStyle,
    pub label: Option<String>,
}

/// Static entity/edge table built once per load. Edges refer to entities by
/// handle, so a mutation through the table is seen by every edge.
pub struct Graph {
    pub entities: Vec<Entity>,
    pub edges: Vec<Edge>,
    index_by_id: HashMap<String, EntityId>,
    anchor: EntityId,
    distances: DistanceIndex,
}

impl Graph {
    pub fn build(data: &GraphData, size_multiplier: f32) -> Self {
        let settings = data.visual_settings.clone().unwrap_or_default();

        let mut entities = Vec::with_capacity(data.nodes.len() + 1);
        let mut index_by_id = HashMap::with_capacity(data.nodes.len() + 1);

        let anchor_radius = settings
            .node_size
            .get("person")
            .copied()
            .unwrap_or(DEFAULT_RADIUS)
            * size_multiplier;
        let anchor_color = settings
            .colors
            .get("person")
            .and_then(|value| parse_hex_color(value))
            .unwrap_or(DEFAULT_ANCHOR_COLOR);
        index_by_id.insert(data.center.id.clone(), EntityId(0));
        entities.push(Entity::from_record(
            &data.center,
            anchor_radius,
            anchor_color,
            ANCHOR_MASS,
        ));

        let default_radius = settings
            .node_size
            .get("default")
            .copied()
            .unwrap_or(DEFAULT_RADIUS)
            * size_multiplier;
        for record in &data.nodes {
            if index_by_id.contains_key(&record.id) {
                warn!(id = %record.id, "dropping duplicate entity record");
                continue;
            }

            let id = EntityId(entities.len());
            index_by_id.insert(record.id.clone(), id);
            entities.push(Entity::from_record(
                record,
                default_radius,
                entity_color(&settings, record),
                1.0,
            ));
        }

        let mut edges = Vec::with_capacity(data.connections.len());
        for connection in &data.connections {
            let (Some(&source), Some(&target)) = (
                index_by_id.get(&connection.source),
                index_by_id.get(&connection.target),
            ) else {
                debug!(
                    source = %connection.source,
                    target = %connection.target,
                    "dropping connection with unknown endpoint"
                );
                continue;
            };

            edges.push(Edge {
                source,
                target,
                weight: connection.weight(),
                style: EdgeStyle::from_tag(connection.kind.as_deref()),
                label: connection.label.clone().filter(|label| !label.is_empty()),
            });
        }

        let distances = DistanceIndex::new(entities.len(), &edges);

        Self {
            entities,
            edges,
            index_by_id,
            anchor: EntityId(0),
            distances,
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn anchor(&self) -> EntityId {
        self.anchor
    }

    pub fn lookup(&self, id: &str) -> Option<EntityId> {
        self.index_by_id.get(id).copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + use<> {
        (0..self.entities.len()).map(EntityId)
    }

    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.entities[id.0]
    }

    pub fn entity_mut(&mut self, id: EntityId) -> &mut Entity {
        &mut self.entities[id.0]
    }

    pub fn distance_index(&self) -> &DistanceIndex {
        &self.distances
    }

    pub fn distances_from(&self, focus: EntityId) -> DistanceMap {
        self.distances.distances_from(focus)
    }

    #[cfg(test)]
    pub fn distances_from_id(&self, focus: &str) -> DistanceMap {
        self.lookup(focus)
            .map(|id| self.distances_from(id))
            .unwrap_or_default()
    }

    pub fn route_for(&self, id: EntityId) -> String {
        let entity = self.entity(id);
        match &entity.url {
            Some(url) => url.clone(),
            None if id == self.anchor => "/".to_owned(),
            None => format!("/nodes/{}", entity.id),
        }
    }
}

fn entity_color(settings: &VisualSettings, record: &EntityRecord) -> Color32 {
    [record.shape.as_deref(), record.kind.as_deref(), Some("default")]
        .into_iter()
        .flatten()
        .find_map(|key| settings.colors.get(key))
        .and_then(|value| parse_hex_color(value))
        .unwrap_or(DEFAULT_ENTITY_COLOR)
}

#[cfg(test)]
mod tests {
    use super::super::testing::sample_data;
    use super::*;

    #[test]
    fn drops_connections_to_unknown_entities() {
        let mut data = sample_data(&["f", "a"], &[("f", "a")]);
        data.connections.push(super::super::testing::connection("f", "ghost"));
        let graph = Graph::build(&data, 1.0);

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.edges.len(), 1);
        assert!(graph.lookup("ghost").is_none());
    }

    #[test]
    fn anchor_is_heavier_and_first() {
        let graph = Graph::build(&sample_data(&["f", "a"], &[]), 1.0);
        assert_eq!(graph.anchor(), EntityId(0));
        assert_eq!(graph.entity(graph.anchor()).mass, 3.0);
        assert_eq!(graph.entity(EntityId(1)).mass, 1.0);
    }

    #[test]
    fn duplicate_ids_keep_the_first_record() {
        let mut data = sample_data(&["f", "a"], &[]);
        let mut duplicate = data.nodes[0].clone();
        duplicate.name = "Second".into();
        data.nodes.push(duplicate);

        let graph = Graph::build(&data, 1.0);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.entity(EntityId(1)).name, "A");
    }

    #[test]
    fn visual_settings_drive_color_and_size() {
        let mut data = sample_data(&["f", "a", "b", "c"], &[]);
        data.nodes[0].shape = Some("square".into());
        data.nodes[2].kind = Some("skill".into());
        data.visual_settings = Some(VisualSettings {
            colors: HashMap::from([
                ("square".to_owned(), "#00ff00".to_owned()),
                ("skill".to_owned(), "#ff0000".to_owned()),
                ("default".to_owned(), "#0000ff".to_owned()),
            ]),
            node_size: HashMap::from([("person".to_owned(), 12.0), ("default".to_owned(), 6.0)]),
        });

        let graph = Graph::build(&data, 0.5);
        assert_eq!(graph.entity(EntityId(0)).radius, 6.0);
        assert_eq!(graph.entity(EntityId(1)).radius, 3.0);
        assert_eq!(graph.entity(EntityId(1)).shape, Shape::Square);
        assert_eq!(graph.entity(EntityId(1)).color, Color32::from_rgb(0, 255, 0));
        assert_eq!(graph.entity(EntityId(2)).color, Color32::from_rgb(0, 0, 255));
        assert_eq!(graph.entity(EntityId(3)).color, Color32::from_rgb(255, 0, 0));
        assert_eq!(graph.entity(EntityId(0)).color, DEFAULT_ANCHOR_COLOR);
    }

    #[test]
    fn routes() {
        let mut data = sample_data(&["f", "a", "b"], &[]);
        data.nodes[1].url = Some("/projects/b".into());
        let graph = Graph::build(&data, 1.0);

        assert_eq!(graph.route_for(EntityId(0)), "/");
        assert_eq!(graph.route_for(EntityId(1)), "/nodes/a");
        assert_eq!(graph.route_for(EntityId(2)), "/projects/b");
    }

    #[test]
    fn dashed_edges_come_from_connection_type() {
        let mut data = sample_data(&["f", "a"], &[("f", "a")]);
        data.connections[0].kind = Some("dotted".into());
        let graph = Graph::build(&data, 1.0);
        assert_eq!(graph.edges[0].style, EdgeStyle::Dashed);
    }
}
