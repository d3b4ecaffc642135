use std::time::Duration;

use eframe::egui::{Vec2, vec2};

use crate::graph::{EntityId, Graph};

use super::config::SceneConfig;

#[derive(Clone, Copy, Debug)]
pub(super) struct PhysicsFrame {
    /// Tick length in 16 ms units, already clamped.
    pub(super) delta: f32,
    pub(super) elapsed_secs: f64,
    pub(super) center: Vec2,
    pub(super) bounds: Vec2,
    pub(super) selected: Option<EntityId>,
    pub(super) dragged: Option<EntityId>,
}

pub(super) fn tick_delta(elapsed: Duration, max_tick_ms: f32) -> f32 {
    (elapsed.as_micros() as f32 / 1000.0).min(max_tick_ms) / 16.0
}

pub(super) fn step_physics(graph: &mut Graph, config: &SceneConfig, frame: PhysicsFrame) {
    for entity in &mut graph.entities {
        entity.force = Vec2::ZERO;
    }

    apply_repulsion(graph, config);
    apply_springs(graph, config);
    apply_centering(graph, config, frame.center);
    apply_selected_pull(graph, config, frame);
    integrate(graph, config, frame);
}

pub(super) fn apply_repulsion(graph: &mut Graph, config: &SceneConfig) {
    let entities = &mut graph.entities;
    let count = entities.len();
    let cutoff = config.repulsion_cutoff;

    for i in 0..count {
        if !entities[i].fade.is_drawn() {
            continue;
        }
        for j in (i + 1)..count {
            if !entities[j].fade.is_drawn() {
                continue;
            }

            let delta = entities[j].position - entities[i].position;
            let distance = delta.length().max(1.0);
            if distance > cutoff {
                continue;
            }

            let push = (delta / distance) * (config.repulsion_strength / (distance * distance));
            entities[i].force -= push;
            entities[j].force += push;
        }
    }
}

pub(super) fn apply_springs(graph: &mut Graph, config: &SceneConfig) {
    for edge in &graph.edges {
        let (source, target) = (edge.source.index(), edge.target.index());
        if !graph.entities[source].fade.is_drawn() || !graph.entities[target].fade.is_drawn() {
            continue;
        }

        let delta = graph.entities[target].position - graph.entities[source].position;
        let distance = delta.length().max(1.0);
        let pull = (delta / distance) * (config.spring_strength * (distance - config.spring_length));

        graph.entities[source].force += pull;
        graph.entities[target].force -= pull;
    }
}

fn apply_centering(graph: &mut Graph, config: &SceneConfig, center: Vec2) {
    for entity in graph.entities.iter_mut().filter(|entity| entity.fade.is_drawn()) {
        entity.force += (center - entity.position) * config.centering_strength;
    }
}

fn apply_selected_pull(graph: &mut Graph, config: &SceneConfig, frame: PhysicsFrame) {
    let Some(selected) = frame.selected.filter(|id| id.index() < graph.len()) else {
        return;
    };

    let entity = graph.entity_mut(selected);
    entity.force += (frame.center - entity.position) * config.selected_pull;
}

fn integrate(graph: &mut Graph, config: &SceneConfig, frame: PhysicsFrame) {
    let slow_speed = config.settlement_threshold * 2.0;
    let jitter_clock = frame.elapsed_secs / config.jitter_period_secs.max(f32::EPSILON) as f64;

    for (index, entity) in graph.entities.iter_mut().enumerate() {
        if frame.dragged.is_some_and(|dragged| dragged.index() == index) {
            continue;
        }
        if !entity.fade.is_drawn() {
            continue;
        }

        let phase = jitter_clock + index as f64 * 0.5;
        entity.force += vec2(phase.sin() as f32, phase.cos() as f32) * config.jitter_amplitude;

        entity.velocity =
            entity.velocity * config.damping_factor + entity.force * frame.delta / entity.mass;
        if entity.velocity.length() < slow_speed {
            entity.velocity *= 0.9;
        }

        entity.position += entity.velocity;

        let margin = entity.radius + config.edge_margin;
        entity.position.x = entity.position.x.min(frame.bounds.x - margin).max(margin);
        entity.position.y = entity.position.y.min(frame.bounds.y - margin).max(margin);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::testing::sample_data;

    fn shown_graph(ids: &[&str], links: &[(&str, &str)]) -> Graph {
        let mut graph = Graph::build(&sample_data(ids, links), 1.0);
        for entity in &mut graph.entities {
            entity.fade.target = 1.0;
            entity.fade.level = 1.0;
        }
        graph
    }

    fn frame() -> PhysicsFrame {
        PhysicsFrame {
            delta: 1.0,
            elapsed_secs: 0.0,
            center: vec2(500.0, 400.0),
            bounds: vec2(1000.0, 800.0),
            selected: None,
            dragged: None,
        }
    }

    #[test]
    fn repulsion_is_inverse_square() {
        let mut graph = shown_graph(&["a", "b"], &[]);
        graph.entities[0].position = vec2(100.0, 100.0);
        graph.entities[1].position = vec2(110.0, 100.0);

        apply_repulsion(&mut graph, &SceneConfig::default());

        assert!((graph.entities[0].force.x + 130.0).abs() < 1e-3);
        assert!((graph.entities[1].force.x - 130.0).abs() < 1e-3);
        assert_eq!(graph.entities[0].force.y, 0.0);
    }

    #[test]
    fn repulsion_skips_far_and_hidden_pairs() {
        let mut graph = shown_graph(&["a", "b", "c"], &[]);
        graph.entities[0].position = vec2(0.0, 0.0);
        graph.entities[1].position = vec2(301.0, 0.0);
        graph.entities[2].position = vec2(0.0, 10.0);
        graph.entities[2].fade.level = 0.005;

        apply_repulsion(&mut graph, &SceneConfig::default());

        assert!(graph.entities.iter().all(|entity| entity.force == Vec2::ZERO));
    }

    #[test]
    fn coincident_entities_do_not_blow_up() {
        let mut graph = shown_graph(&["a", "b"], &[]);
        graph.entities[0].position = vec2(50.0, 50.0);
        graph.entities[1].position = vec2(50.0, 50.0);

        apply_repulsion(&mut graph, &SceneConfig::default());

        assert!(graph.entities.iter().all(|entity| entity.force.x.is_finite()));
    }

    #[test]
    fn springs_pull_stretched_edges_together() {
        let mut graph = shown_graph(&["a", "b"], &[("a", "b")]);
        graph.entities[0].position = vec2(0.0, 0.0);
        graph.entities[1].position = vec2(210.0, 0.0);

        apply_springs(&mut graph, &SceneConfig::default());

        assert!((graph.entities[0].force.x - 3.0).abs() < 1e-4);
        assert!((graph.entities[1].force.x + 3.0).abs() < 1e-4);
    }

    #[test]
    fn hidden_and_dragged_entities_hold_position() {
        let mut graph = shown_graph(&["a", "b", "c"], &[]);
        graph.entities[0].position = vec2(300.0, 300.0);
        graph.entities[1].position = vec2(600.0, 500.0);
        graph.entities[1].fade.level = 0.0;
        graph.entities[2].position = vec2(700.0, 200.0);

        let mut frame = frame();
        frame.dragged = Some(EntityId(2));
        step_physics(&mut graph, &SceneConfig::default(), frame);

        assert_eq!(graph.entities[1].position, vec2(600.0, 500.0));
        assert_eq!(graph.entities[2].position, vec2(700.0, 200.0));
        assert_ne!(graph.entities[0].position, vec2(300.0, 300.0));
    }

    #[test]
    fn positions_stay_inside_the_margins() {
        let mut graph = shown_graph(&["a"], &[]);
        graph.entities[0].position = vec2(-400.0, 5000.0);
        graph.entities[0].velocity = vec2(-1000.0, 1000.0);

        step_physics(&mut graph, &SceneConfig::default(), frame());

        let margin = graph.entities[0].radius + 20.0;
        assert_eq!(graph.entities[0].position.x, margin);
        assert_eq!(graph.entities[0].position.y, 800.0 - margin);
    }

    #[test]
    fn selected_entity_gets_the_stronger_pull() {
        let mut graph = shown_graph(&["a", "b"], &[]);
        graph.entities[0].position = vec2(100.0, 400.0);
        graph.entities[1].position = vec2(900.0, 400.0);

        let config = SceneConfig::default();
        let mut frame = frame();
        frame.selected = Some(EntityId(1));
        for entity in &mut graph.entities {
            entity.force = Vec2::ZERO;
        }
        apply_centering(&mut graph, &config, frame.center);
        apply_selected_pull(&mut graph, &config, frame);

        assert!((graph.entities[0].force.x - 1.2).abs() < 1e-4);
        assert!((graph.entities[1].force.x + (1.2 + 20.0)).abs() < 1e-3);
    }

    fn quiet_config() -> SceneConfig {
        SceneConfig {
            centering_strength: 0.0,
            jitter_amplitude: 0.0,
            ..SceneConfig::default()
        }
    }

    #[test]
    fn long_ticks_are_capped() {
        assert_eq!(tick_delta(Duration::from_millis(16), 32.0), 1.0);
        assert_eq!(tick_delta(Duration::from_millis(32), 32.0), 2.0);
        assert_eq!(tick_delta(Duration::from_secs(5), 32.0), 2.0);
        assert_eq!(tick_delta(Duration::ZERO, 32.0), 0.0);
    }

    #[test]
    fn slow_entities_get_the_extra_brake() {
        let mut graph = shown_graph(&["a", "slow", "fast"], &[]);
        graph.entities[0].position = vec2(500.0, 400.0);
        graph.entities[1].position = vec2(100.0, 100.0);
        graph.entities[1].velocity = vec2(0.5, 0.0);
        graph.entities[2].position = vec2(900.0, 700.0);
        graph.entities[2].velocity = vec2(10.0, 0.0);

        step_physics(&mut graph, &quiet_config(), frame());

        assert!((graph.entities[1].velocity.x - 0.045).abs() < 1e-6);
        assert!((graph.entities[1].position.x - 100.045).abs() < 1e-4);
        assert!((graph.entities[2].velocity.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn jitter_follows_the_scene_clock() {
        let mut graph = shown_graph(&["a", "b"], &[]);
        graph.entities[0].position = vec2(100.0, 100.0);
        graph.entities[1].position = vec2(900.0, 700.0);

        let config = SceneConfig {
            centering_strength: 0.0,
            ..SceneConfig::default()
        };
        let mut frame = frame();
        frame.elapsed_secs = 3.0;
        step_physics(&mut graph, &config, frame);

        for (index, entity) in graph.entities.iter().enumerate() {
            let phase = 3.0_f64 / 8.0 + 0.5 * index as f64;
            let expected = vec2(phase.sin() as f32, phase.cos() as f32) * 0.05;
            assert!((entity.force - expected).length() < 1e-6);
        }
    }

    #[test]
    fn isolated_entity_drifts_to_center() {
        let mut graph = shown_graph(&["a"], &[]);
        graph.entities[0].position = vec2(200.0, 200.0);

        let config = SceneConfig::default();
        let mut frame = frame();
        for tick in 0..20_000 {
            frame.elapsed_secs = tick as f64 * 0.016;
            step_physics(&mut graph, &config, frame);
        }

        assert!((graph.entities[0].position - frame.center).length() < 25.0);
    }
}
