mod config;
mod disclosure;
mod gesture;
mod layout;
mod physics;
mod reveal;
mod schedule;
mod settle;
mod visibility;

use std::time::Duration;

use eframe::egui::{Vec2, vec2};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::graph::{EntityId, Fade, Graph, GraphData};

pub use config::{SceneConfig, Viewport};
pub use disclosure::DisclosureState;

use disclosure::{DisclosureController, GateInputs};
use gesture::GestureState;
use layout::{LayoutPositioner, LayoutTarget, ring_slot};
use physics::PhysicsFrame;
use reveal::RevealQueue;
use schedule::{Event, Scheduler};
use settle::SettlementDetector;
use visibility::VisibilityController;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    EnsureSection(EntityId),
    RemoveSection(EntityId),
    ExpandSection(EntityId),
    FocusChanged { id: String, url: String },
    Status(Option<String>),
}

#[derive(Clone, Debug, Default)]
pub struct SceneOptions {
    pub seed: Option<u64>,
    pub deep_link: Option<String>,
    pub show_all: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Routing {
    Notify,
    Silent,
}

/// The simulation: entity table plus everything that moves, fades and
/// reveals it. Driven by `tick` and the gesture entry points.
pub struct Scene {
    graph: Graph,
    config: SceneConfig,
    viewport: Viewport,
    scheduler: Scheduler,
    reveals: RevealQueue,
    disclosure: DisclosureController,
    visibility: VisibilityController,
    settlement: SettlementDetector,
    rng: StdRng,
    selected: Option<EntityId>,
    focus: EntityId,
    pinned: Option<EntityId>,
    show_all: bool,
    gesture: GestureState,
    sectioned: Vec<bool>,
    notices: Vec<Notice>,
}

impl Scene {
    pub fn new(
        data: &GraphData,
        config: SceneConfig,
        viewport: Viewport,
        options: SceneOptions,
    ) -> Self {
        let graph = Graph::build(data, viewport.size_multiplier(&config));
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let pinned = options.deep_link.as_deref().and_then(|id| {
            let found = graph.lookup(id);
            if found.is_none() {
                warn!(id, "deep-link target not found, falling back to anchor");
            }
            found
        });

        let anchor = graph.anchor();
        let len = graph.len();
        let mut scene = Self {
            visibility: VisibilityController::new(config.fade_speed),
            settlement: SettlementDetector::new(
                config.settlement_threshold,
                config.settlement_frames_required,
            ),
            graph,
            config,
            viewport,
            scheduler: Scheduler::default(),
            reveals: RevealQueue::default(),
            disclosure: DisclosureController::default(),
            rng,
            selected: None,
            focus: pinned.unwrap_or(anchor),
            pinned,
            show_all: options.show_all,
            gesture: GestureState::default(),
            sectioned: vec![false; len],
            notices: Vec::new(),
        };
        scene.place_initial();

        info!(
            entities = scene.graph.len(),
            edges = scene.graph.edges.len(),
            compact = viewport.compact,
            "scene ready"
        );
        scene
    }

    fn place_initial(&mut self) {
        let center = self.viewport.center();
        let anchor = self.graph.anchor();
        let others = self.graph.len().saturating_sub(1);

        let mut slot = 0;
        for id in self.graph.ids() {
            let entity = self.graph.entity_mut(id);
            if id == anchor {
                entity.position = center;
            } else {
                entity.position = ring_slot(center, self.config.initial_radius, slot, others);
                slot += 1;
            }
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn selected(&self) -> Option<EntityId> {
        self.selected
    }

    pub fn focus(&self) -> EntityId {
        self.focus
    }

    pub fn pinned(&self) -> Option<EntityId> {
        self.pinned
    }

    pub fn hovered(&self) -> Option<EntityId> {
        self.gesture.hovered
    }

    pub fn dragged(&self) -> Option<EntityId> {
        self.gesture.dragged
    }

    pub fn show_all(&self) -> bool {
        self.show_all
    }

    pub fn disclosure_state(&self) -> DisclosureState {
        self.disclosure.state()
    }

    pub fn queue_len(&self) -> usize {
        self.reveals.len()
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Starts a fresh disclosure episode from the deep-link target, or the
    /// anchor when there is none.
    pub fn begin_staged_transition(&mut self) {
        self.scheduler.invalidate();
        self.reveals.clear();

        let anchor = self.graph.anchor();
        let center = self.pinned.unwrap_or(anchor);
        self.focus = center;
        self.disclosure.begin(self.scheduler.now());

        for id in self.graph.ids() {
            let shown = id == center || id == anchor;
            self.graph.entity_mut(id).fade.set_shown(shown);
        }

        info!(center = %self.graph.entity(center).id, "disclosure episode started");
        self.notices
            .push(Notice::Status(self.disclosure.state().status_text().map(str::to_owned)));
        self.scheduler
            .after(self.config.initial_node_delay(), Event::AdvanceStage);
    }

    pub fn tick(&mut self, elapsed: Duration) {
        self.scheduler.advance(elapsed);
        while let Some(event) = self.scheduler.pop_due() {
            self.handle(event);
        }

        let frame = PhysicsFrame {
            delta: physics::tick_delta(elapsed, self.config.max_tick_ms),
            elapsed_secs: self.scheduler.now().as_secs_f64(),
            center: self.viewport.center(),
            bounds: self.bounds(),
            selected: self.selected,
            dragged: self.gesture.dragged,
        };
        physics::step_physics(&mut self.graph, &self.config, frame);

        let mut crossed = Vec::new();
        for (index, entity) in self.graph.entities.iter_mut().enumerate() {
            let was_below = entity.fade.level < Fade::VISIBLE_THRESHOLD;
            self.visibility.advance_fade(&mut entity.fade);
            if was_below && entity.fade.level >= Fade::VISIBLE_THRESHOLD {
                crossed.push(EntityId(index));
            }
        }
        for id in crossed {
            self.ensure_section(id);
        }
    }

    fn handle(&mut self, event: Event) {
        match event {
            Event::AdvanceStage => self.advance_stage(),
            Event::Enqueue(id) => {
                if self.reveals.arrive(id) {
                    self.reveal_next();
                }
            }
            Event::RevealNext => self.reveal_next(),
            Event::PollSettlement => self.poll_settlement(),
            Event::ReleaseDrag(token) => self.release_drag(token),
        }
    }

    fn advance_stage(&mut self) {
        let now = self.scheduler.now();
        let Some(stage) = self.disclosure.advance(now, self.reveals.is_drained()) else {
            return;
        };

        info!(%stage, "disclosure stage advanced");
        self.notices
            .push(Notice::Status(stage.status_text().map(str::to_owned)));

        match stage {
            DisclosureState::FirstLevel => {
                let center = self.pinned.unwrap_or(self.graph.anchor());
                let neighbors = self.graph.distance_index().neighbors(center).to_vec();
                self.queue_reveals(neighbors);
            }
            DisclosureState::SecondLevel => {
                let frontier = self.frontier();
                self.queue_reveals(frontier);
            }
            DisclosureState::Complete => self.complete_episode(),
            DisclosureState::CenterNode => {}
        }
    }

    /// Hidden entities adjacent to a visible one, by edge scan. The anchor is
    /// always included when it is not visible yet.
    fn frontier(&self) -> Vec<EntityId> {
        let visible = |id: EntityId| self.graph.entity(id).fade.is_visible();

        let mut frontier = Vec::new();
        for edge in &self.graph.edges {
            for (from, to) in [(edge.source, edge.target), (edge.target, edge.source)] {
                if visible(from) && !visible(to) && !frontier.contains(&to) {
                    frontier.push(to);
                }
            }
        }

        let anchor = self.graph.anchor();
        if !visible(anchor) && !frontier.contains(&anchor) {
            frontier.push(anchor);
        }
        frontier
    }

    fn queue_reveals(&mut self, ids: Vec<EntityId>) {
        let mut pending = Vec::with_capacity(ids.len());
        for id in ids {
            if self.graph.entity(id).fade.level < Fade::VISIBLE_THRESHOLD && !pending.contains(&id) {
                pending.push(id);
            }
        }

        let count = self.reveals.schedule(
            pending,
            self.config.reveal_stagger(),
            &mut self.rng,
            &mut self.scheduler,
        );
        debug!(count, "reveals queued");

        if count == 0 {
            self.start_polling();
        }
    }

    fn reveal_next(&mut self) {
        match self.reveals.pop() {
            Some(id) => {
                self.graph.entity_mut(id).fade.set_shown(true);
                self.disclosure.record_reveal(self.scheduler.now());
                self.ensure_section(id);
                debug!(id = %self.graph.entity(id).id, remaining = self.reveals.len(), "revealed");
                self.scheduler
                    .after(self.config.reveal_interval(), Event::RevealNext);
            }
            None => self.start_polling(),
        }
    }

    fn start_polling(&mut self) {
        if self.disclosure.is_polling() || !self.disclosure.is_running() {
            return;
        }
        self.disclosure.set_polling(true);
        self.scheduler
            .after(self.config.settlement_poll(), Event::PollSettlement);
    }

    fn poll_settlement(&mut self) {
        if !self.disclosure.is_running() {
            self.disclosure.set_polling(false);
            return;
        }

        let settlement = self.settlement;
        let mut all_settled = true;
        for entity in self
            .graph
            .entities
            .iter_mut()
            .filter(|entity| entity.fade.is_visible())
        {
            if !settlement.is_settled(&mut entity.settle, entity.velocity) {
                all_settled = false;
            }
        }

        let inputs = GateInputs {
            now: self.scheduler.now(),
            queue_drained: self.reveals.is_drained(),
            all_settled,
        };
        if self
            .disclosure
            .ready_to_advance(inputs, self.config.transition_delay())
        {
            self.disclosure.set_polling(false);
            self.advance_stage();
        } else {
            self.scheduler
                .after(self.config.settlement_poll(), Event::PollSettlement);
        }
    }

    /// A deep-linked episode ends quietly on its target; a plain one selects
    /// the anchor like a user would, so the router records it.
    fn complete_episode(&mut self) {
        let (target, routing) = match self.pinned {
            Some(pinned) => (pinned, Routing::Silent),
            None => (self.graph.anchor(), Routing::Notify),
        };
        info!(target = %self.graph.entity(target).id, "disclosure episode complete");
        self.apply_focus(target, routing);
    }

    pub fn select_focus(&mut self, id: EntityId) {
        if id.index() >= self.graph.len() {
            warn!(index = id.index(), "select ignored, no such entity");
            return;
        }
        self.pinned = Some(id);
        self.apply_focus(id, Routing::Notify);
    }

    #[cfg(test)]
    pub fn select_focus_by_id(&mut self, id: &str) {
        match self.graph.lookup(id) {
            Some(found) => self.select_focus(found),
            None => warn!(id, "select ignored, no such entity"),
        }
    }

    /// Router-driven re-center; `None` goes home to the anchor. The router is
    /// not notified back.
    pub fn restore_focus(&mut self, id: Option<&str>) {
        let target = match id {
            Some(id) => match self.graph.lookup(id) {
                Some(found) => {
                    self.pinned = Some(found);
                    found
                }
                None => {
                    warn!(id, "restore ignored, no such entity");
                    return;
                }
            },
            None => {
                self.pinned = None;
                self.graph.anchor()
            }
        };
        self.apply_focus(target, Routing::Silent);
    }

    pub fn toggle_show_all(&mut self) {
        self.show_all = !self.show_all;
        info!(show_all = self.show_all, "view mode toggled");
        let target = self.selected.unwrap_or(self.graph.anchor());
        self.apply_focus(target, Routing::Silent);
    }

    /// Reacts to a new surface size. Crossing the compact breakpoint shifts
    /// every entity with the center and re-centers on the selection.
    pub fn resize(&mut self, width: f32, height: f32) {
        let previous = self.viewport;
        let next = Viewport::new(width, height, &self.config);
        if next == previous {
            return;
        }
        self.viewport = next;

        if next.compact != previous.compact {
            let shift = vec2(next.center_offset_x() - previous.center_offset_x(), 0.0);
            for entity in &mut self.graph.entities {
                entity.position += shift;
            }
            debug!(compact = next.compact, "viewport crossed the compact breakpoint");

            if let Some(selected) = self.selected {
                self.apply_focus(selected, Routing::Silent);
            }
        }
    }

    /// The re-centering contract: cancel any running episode, recompute
    /// distances, flip fade targets, sync sections, steer the layout.
    fn apply_focus(&mut self, target: EntityId, routing: Routing) {
        if self.disclosure.is_running() {
            self.disclosure.abandon();
            info!("re-center abandoned the running disclosure episode");
            self.notices.push(Notice::Status(None));
        }
        self.scheduler.invalidate();
        self.reveals.clear();
        self.disclosure.set_polling(false);

        self.selected = Some(target);
        self.focus = target;

        let anchor = self.graph.anchor();
        let distances = self.graph.distances_from(target);
        for id in self.graph.ids() {
            let near = distances.contains_key(&id);
            let pinned = Some(id) == self.pinned;
            let shown = if self.show_all {
                true
            } else if target == anchor {
                near || pinned
            } else {
                near || pinned || id == anchor
            };

            let fade = &mut self.graph.entity_mut(id).fade;
            fade.set_shown(shown);
            let visible_now = fade.level >= Fade::VISIBLE_THRESHOLD;

            if shown {
                if id != target && visible_now {
                    self.ensure_section(id);
                }
            } else if id != anchor {
                self.remove_section(id);
            }
        }

        let target_entity = LayoutTarget {
            focus: target,
            distances: &distances,
            pinned: self.pinned,
            center: self.viewport.center(),
            anchor_offset: self.viewport.anchor_offset(&self.config),
        };
        LayoutPositioner::new(&self.config).arrange(&mut self.graph, target_entity);

        if routing == Routing::Notify {
            self.notices.push(Notice::FocusChanged {
                id: self.graph.entity(target).id.clone(),
                url: self.graph.route_for(target),
            });
        }
        self.ensure_section(target);
        self.notices.push(Notice::ExpandSection(target));

        debug!(
            focus = %self.graph.entity(target).id,
            near = distances.len(),
            show_all = self.show_all,
            "focus applied"
        );
    }

    fn ensure_section(&mut self, id: EntityId) {
        if let Some(flag) = self.sectioned.get_mut(id.index())
            && !*flag
        {
            *flag = true;
            self.notices.push(Notice::EnsureSection(id));
        }
    }

    fn remove_section(&mut self, id: EntityId) {
        if let Some(flag) = self.sectioned.get_mut(id.index())
            && *flag
        {
            *flag = false;
            self.notices.push(Notice::RemoveSection(id));
        }
    }

    fn bounds(&self) -> Vec2 {
        vec2(self.viewport.width, self.viewport.height)
    }
}
