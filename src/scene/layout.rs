use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use crate::graph::{DistanceMap, EntityId, Graph};
use crate::util::ease_out_cubic;

use super::config::SceneConfig;

/// Beyond this distance the focus entity's approach is eased down.
const FOCUS_EASE_DISTANCE: f32 = 100.0;

#[derive(Clone, Copy, Debug)]
pub struct LayoutTarget<'a> {
    pub focus: EntityId,
    pub distances: &'a DistanceMap,
    pub pinned: Option<EntityId>,
    pub center: Vec2,
    pub anchor_offset: Vec2,
}

/// One-shot velocity assignment that steers entities toward concentric
/// rings around the focus. Positions are never written directly.
#[derive(Clone, Copy, Debug)]
pub struct LayoutPositioner<'a> {
    config: &'a SceneConfig,
}

impl<'a> LayoutPositioner<'a> {
    pub fn new(config: &'a SceneConfig) -> Self {
        Self { config }
    }

    pub fn arrange(&self, graph: &mut Graph, target: LayoutTarget<'_>) {
        let config = self.config;
        let anchor = graph.anchor();

        let focus = graph.entity_mut(target.focus);
        let gap = target.center - focus.position;
        let distance = gap.length();
        let eased = if distance > FOCUS_EASE_DISTANCE {
            ease_out_cubic((FOCUS_EASE_DISTANCE / distance).min(1.0))
        } else {
            1.0
        };
        focus.velocity = gap * config.center_node_velocity * eased;

        let first_ring = graph
            .ids()
            .filter(|id| target.distances.get(id) == Some(&1))
            .collect::<Vec<_>>();
        let second_ring = graph
            .ids()
            .filter(|id| target.distances.get(id) == Some(&2))
            .collect::<Vec<_>>();

        steer_ring(
            graph,
            &first_ring,
            target.center,
            config.first_level_radius,
            config.first_level_velocity,
        );
        steer_ring(
            graph,
            &second_ring,
            target.center,
            config.second_level_radius,
            config.second_level_velocity,
        );

        if let Some(pinned) = target.pinned
            && pinned != target.focus
            && !target.distances.contains_key(&pinned)
        {
            let spot = target.center
                + vec2(
                    config.first_level_radius / 2.0,
                    -config.first_level_radius / 3.0,
                );
            steer_toward(graph, pinned, spot, config.center_node_velocity);
        }

        let anchor_view = target.focus == anchor;
        let outer_ring = graph
            .ids()
            .filter(|id| *id != target.focus && !target.distances.contains_key(id))
            .filter(|id| anchor_view || (*id != anchor && Some(*id) != target.pinned))
            .collect::<Vec<_>>();
        steer_ring(
            graph,
            &outer_ring,
            target.center,
            config.outer_level_radius,
            config.outer_node_velocity,
        );

        if !anchor_view && !target.distances.contains_key(&anchor) {
            steer_toward(
                graph,
                anchor,
                target.center - target.anchor_offset,
                config.center_node_velocity,
            );
        }
    }
}

pub fn ring_slot(center: Vec2, radius: f32, index: usize, count: usize) -> Vec2 {
    let angle = TAU * index as f32 / count.max(1) as f32;
    center + vec2(angle.cos(), angle.sin()) * radius
}

fn steer_ring(graph: &mut Graph, ring: &[EntityId], center: Vec2, radius: f32, velocity: f32) {
    for (index, &id) in ring.iter().enumerate() {
        steer_toward(graph, id, ring_slot(center, radius, index, ring.len()), velocity);
    }
}

fn steer_toward(graph: &mut Graph, id: EntityId, spot: Vec2, velocity: f32) {
    let entity = graph.entity_mut(id);
    entity.velocity = (spot - entity.position) * velocity;
}
