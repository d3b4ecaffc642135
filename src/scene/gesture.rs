use eframe::egui::Vec2;
use tracing::debug;

use crate::graph::EntityId;

use super::Scene;
use super::schedule::Event;

/// Minimum fade level for an entity to be grabbed or hovered.
const HIT_FADE: f32 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Press {
    Entity(EntityId),
    Pan,
}

#[derive(Debug, Default)]
pub(super) struct GestureState {
    pub(super) hovered: Option<EntityId>,
    /// Held out of physics until the release timer fires.
    pub(super) dragged: Option<EntityId>,
    press: Option<Press>,
    pointer: Option<Vec2>,
    drag_distance: f32,
    release_token: u64,
}

impl Scene {
    pub fn hit_test(&self, pos: Vec2) -> Option<EntityId> {
        self.graph
            .entities
            .iter()
            .enumerate()
            .rev()
            .find(|(_, entity)| {
                entity.fade.level > HIT_FADE && (pos - entity.position).length() < entity.radius
            })
            .map(|(index, _)| EntityId(index))
    }

    pub fn pointer_move(&mut self, pos: Vec2) {
        let last = self.gesture.pointer.replace(pos);
        let delta = last.map_or(Vec2::ZERO, |last| pos - last);

        match self.gesture.press {
            Some(Press::Entity(id)) => {
                let entity = self.graph.entity_mut(id);
                entity.position += delta;
                entity.velocity = Vec2::ZERO;
                self.gesture.drag_distance += delta.length();
            }
            Some(Press::Pan) => self.drag_move(delta),
            None => self.gesture.hovered = self.hit_test(pos),
        }
    }

    pub fn pointer_down(&mut self, pos: Vec2) {
        self.gesture.pointer = Some(pos);
        match self.hit_test(pos) {
            Some(id) => {
                self.gesture.press = Some(Press::Entity(id));
                self.gesture.dragged = Some(id);
                self.gesture.drag_distance = 0.0;
                self.gesture.release_token += 1;
            }
            None => self.gesture.press = Some(Press::Pan),
        }
    }

    pub fn pointer_up(&mut self) {
        let Some(Press::Entity(id)) = self.gesture.press.take() else {
            return;
        };

        if self.gesture.drag_distance < self.config.click_tolerance {
            self.tap_select(Some(id));
        } else {
            debug!(distance = self.gesture.drag_distance, "drag released without select");
        }

        self.scheduler.after_detached(
            self.config.drag_release(),
            Event::ReleaseDrag(self.gesture.release_token),
        );
    }

    pub fn pointer_leave(&mut self) {
        self.gesture.pointer = None;
        self.gesture.hovered = None;
    }

    pub fn drag_move(&mut self, delta: Vec2) {
        for entity in &mut self.graph.entities {
            entity.position += delta;
        }
    }

    pub fn tap_select(&mut self, id: Option<EntityId>) {
        if let Some(id) = id {
            self.select_focus(id);
        }
    }

    pub(super) fn release_drag(&mut self, token: u64) {
        if token == self.gesture.release_token && self.gesture.press.is_none() {
            self.gesture.dragged = None;
        }
    }
}
