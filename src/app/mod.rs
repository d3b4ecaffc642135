use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use eframe::egui::{self, Context};
use tracing::{error, info};

use crate::graph::{GraphData, load_graph_file};
use crate::scene::{Scene, SceneConfig};

mod canvas;
mod details;
mod history;
mod panels;

use details::DetailPanel;
use history::History;

/// Everything the command line decided before the window opened.
#[derive(Clone, Debug)]
pub struct Launch {
    pub data_path: PathBuf,
    pub config: SceneConfig,
    pub deep_link: Option<String>,
    pub show_all: bool,
    pub debug: bool,
    pub seed: Option<u64>,
}

pub struct RevealGraphApp {
    launch: Launch,
    state: AppState,
}

enum AppState {
    Loading { rx: Receiver<Result<GraphData, String>> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    data: GraphData,
    launch: Launch,
    /// Built on the first canvas frame, once the surface size is known.
    scene: Option<Scene>,
    details: DetailPanel,
    history: History,
    status: Option<String>,
    search: String,
    last_frame_secs: Option<f64>,
}

impl RevealGraphApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, launch: Launch) -> Self {
        let state = Self::start_load(&launch);
        Self { launch, state }
    }

    fn spawn_load(path: PathBuf) -> Receiver<Result<GraphData, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_graph_file(&path).map_err(|error| format!("{error:#}"));
            match &result {
                Ok(data) => info!(
                    path = %path.display(),
                    nodes = data.nodes.len() + 1,
                    connections = data.connections.len(),
                    "graph data loaded"
                ),
                Err(error) => error!(%error, "graph data failed to load"),
            }
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(launch: &Launch) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(launch.data_path.clone()),
        }
    }
}

impl eframe::App for RevealGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(data) => {
                            AppState::Ready(Box::new(ViewModel::new(data, self.launch.clone())))
                        }
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Error loading graph data");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(&self.launch));
                    }
                });
            }
            AppState::Ready(model) => model.show(ctx),
        }

        if let Some(next_state) = transition {
            self.state = next_state;
        }
    }
}
