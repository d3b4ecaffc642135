use eframe::egui::{self, Align, Context, Layout, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use tracing::info;

use crate::graph::{EntityId, Graph, GraphData};
use crate::scene::Notice;

use super::history::{History, Location};
use super::{DetailPanel, Launch, ViewModel};

const SEARCH_RESULTS: usize = 12;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

/// Best fuzzy matches on entity name or id, highest score first.
pub(in crate::app) fn search_entities(graph: &Graph, query: &str, limit: usize) -> Vec<EntityId> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut scored = graph
        .ids()
        .filter_map(|id| {
            let entity = graph.entity(id);
            let score = fuzzy_match_score(&matcher, &entity.name, query)
                .max(fuzzy_match_score(&matcher, &entity.id, query))?;
            Some((score, id))
        })
        .collect::<Vec<_>>();

    scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    scored.into_iter().take(limit).map(|(_, id)| id).collect()
}

impl ViewModel {
    pub(in crate::app) fn new(data: GraphData, launch: Launch) -> Self {
        let start = match &launch.deep_link {
            Some(id) => Location {
                id: Some(id.clone()),
                url: format!("/nodes/{id}"),
            },
            None => Location::home(),
        };

        Self {
            data,
            launch,
            scene: None,
            details: DetailPanel::default(),
            history: History::new(start),
            status: None,
            search: String::new(),
            last_frame_secs: None,
        }
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| self.draw_top_bar(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(360.0)
            .show(ctx, |ui| self.draw_side_panel(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_canvas(ui));
    }

    fn draw_top_bar(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.heading("reveal-graph");
            ui.separator();

            let Some(scene) = self.scene.as_mut() else {
                ui.spinner();
                return;
            };
            let graph = scene.graph();
            ui.label(format!("focus: {}", graph.entity(scene.focus()).name));
            ui.label(format!("entities: {}", graph.len()));
            ui.label(format!("connections: {}", graph.edges.len()));
            if let Some(status) = &self.status {
                ui.spinner();
                ui.label(status.as_str());
            }

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                let toggle_text = if scene.show_all() {
                    "Show focused view"
                } else {
                    "Show all nodes"
                };
                if ui.button(toggle_text).clicked() {
                    scene.toggle_show_all();
                }

                let forward = ui.add_enabled(self.history.can_go_forward(), egui::Button::new("▶"));
                let back = ui.add_enabled(self.history.can_go_back(), egui::Button::new("◀"));
                let location = if back.clicked() {
                    self.history.back()
                } else if forward.clicked() {
                    self.history.forward()
                } else {
                    None
                };
                if let Some(location) = location {
                    info!(url = %location.url, "history navigation");
                    scene.restore_focus(location.id.as_deref());
                }
            });
        });
    }

    fn draw_side_panel(&mut self, ui: &mut Ui) {
        let Some(scene) = self.scene.as_mut() else {
            ui.label("Waiting for the canvas...");
            return;
        };

        ui.add(egui::TextEdit::singleline(&mut self.search).hint_text("Search entities"));
        let matches = search_entities(scene.graph(), &self.search, SEARCH_RESULTS);
        if !matches.is_empty() {
            let mut picked = None;
            for id in matches {
                if ui.link(scene.graph().entity(id).name.as_str()).clicked() {
                    picked = Some(id);
                }
            }
            if let Some(id) = picked {
                self.search.clear();
                scene.select_focus(id);
            }
        }
        ui.separator();

        if let Some(opened) = self.details.show(ui, scene.graph()) {
            scene.select_focus(opened);
        }
    }

    pub(in crate::app) fn apply_notices(&mut self, notices: Vec<Notice>, anchor: EntityId) {
        for notice in notices {
            if self.details.apply(&notice, anchor) {
                continue;
            }
            match notice {
                Notice::FocusChanged { id, url } => {
                    info!(%id, %url, "focus changed");
                    self.history.push(Location { id: Some(id), url });
                }
                Notice::Status(status) => self.status = status,
                Notice::EnsureSection(_) | Notice::RemoveSection(_) | Notice::ExpandSection(_) => {}
            }
        }
    }
}
