use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::Result;
use eframe::egui::{self, Color32, Context, Pos2, Vec2};
use log::{error, info};

use resistome_viz::data::load_dataset;
use resistome_viz::{Dataset, LinkCategory, Node, Session};

mod graph;
mod physics;
mod render_utils;
mod ui;

use render_utils::NodeShape;

pub struct ResistomeApp {
    session: Session,
    state: AppState,
    switch: Option<PendingLoad>,
}

enum AppState {
    Idle,
    Loading(PendingLoad),
    Ready(Box<ViewModel>),
    Error { key: String, message: String },
}

struct PendingLoad {
    key: String,
    rx: Receiver<Result<Dataset, String>>,
}

enum ViewRequest {
    Open(String),
    Reload,
}

struct ViewModel {
    gene_query: String,
    element_query: String,
    show_labels: bool,
    live_physics: bool,
    physics_intensity: f32,
    physics_repulsion: f32,
    physics_link_length: f32,
    selected: Option<String>,
    pan: Vec2,
    zoom: f32,
    dragging: Option<usize>,
    graph_dirty: bool,
    graph_cache: Option<RenderGraph>,
    top_connected: Vec<ConnectedEntry>,
    status: Option<String>,
    visible_node_count: usize,
    visible_link_count: usize,
}

struct ConnectedEntry {
    id: String,
    name: String,
    links: usize,
}

struct RenderGraph {
    nodes: Vec<RenderNode>,
    links: Vec<RenderLink>,
    index_by_id: HashMap<String, usize>,
    physics_scratch: PhysicsScratch,
    view_scratch: ViewScratch,
}

struct PhysicsScratch {
    forces: Vec<Vec2>,
    positions: Vec<Vec2>,
    radii: Vec<f32>,
    stack: Vec<usize>,
}

struct ViewScratch {
    screen_positions: Vec<Pos2>,
    screen_radii: Vec<f32>,
    visible_indices: Vec<usize>,
}

/// Per-frame copy of a visible node plus its layout state.
struct RenderNode {
    node: Node,
    world_pos: Vec2,
    velocity: Vec2,
    base_radius: f32,
    fill: Color32,
    shape: NodeShape,
}

struct RenderLink {
    source: usize,
    target: usize,
    category: LinkCategory,
    color: Color32,
    width: f32,
    arc: ArcSlot,
}

/// Position of a link among the links joining the same two nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ArcSlot {
    index: usize,
    count: usize,
}

#[derive(Clone, Copy)]
struct PhysicsConfig {
    intensity: f32,
    repulsion_scale: f32,
    link_length_scale: f32,
    delta_seconds: f32,
}

impl ResistomeApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        mut session: Session,
        initial: Option<String>,
    ) -> Self {
        let state = match initial {
            Some(key) => Self::start_load(&mut session, &key),
            None => AppState::Idle,
        };
        Self {
            session,
            state,
            switch: None,
        }
    }

    fn spawn_load(session: &mut Session, key: &str) -> Result<PendingLoad> {
        let source = session.resolve(key)?;
        let (tx, rx) = mpsc::channel();

        info!("loading {} from {}", source.key, source.path.display());
        let path = source.path.clone();
        thread::spawn(move || {
            let result = load_dataset(&path).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        Ok(PendingLoad {
            key: source.key,
            rx,
        })
    }

    fn start_load(session: &mut Session, key: &str) -> AppState {
        match Self::spawn_load(session, key) {
            Ok(pending) => AppState::Loading(pending),
            Err(error) => {
                error!("{error:#}");
                AppState::Error {
                    key: key.to_owned(),
                    message: format!("{error:#}"),
                }
            }
        }
    }

    fn handle_request(
        session: &mut Session,
        switch: &mut Option<PendingLoad>,
        request: ViewRequest,
        model: &mut ViewModel,
    ) {
        let key = match request {
            ViewRequest::Open(key) => {
                if session.is_cached(&key) {
                    match session.open(&key) {
                        Ok(()) => model.dataset_changed(),
                        Err(error) => model.status = Some(format!("{error:#}")),
                    }
                    return;
                }
                key
            }
            ViewRequest::Reload => match session.active_key() {
                Some(key) => key.to_owned(),
                None => return,
            },
        };

        match Self::spawn_load(session, &key) {
            Ok(pending) => *switch = Some(pending),
            Err(error) => {
                error!("{error:#}");
                model.status = Some(format!("{error:#}"));
            }
        }
    }

    fn poll_switch(session: &mut Session, switch: &mut Option<PendingLoad>, model: &mut ViewModel) {
        let Some(pending) = switch.take() else {
            return;
        };

        match pending.rx.try_recv() {
            Ok(Ok(dataset)) => {
                session.adopt(&pending.key, dataset);
                model.dataset_changed();
            }
            Ok(Err(message)) => {
                error!("failed to load {}: {message}", pending.key);
                model.status = Some(message);
            }
            Err(TryRecvError::Empty) => *switch = Some(pending),
            Err(TryRecvError::Disconnected) => {
                model.status = Some("Background load worker disconnected".to_owned());
            }
        }
    }
}

impl eframe::App for ResistomeApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Idle => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("No dataset to show");
                        ui.label("Pass dataset files on the command line or a --config file.");
                    });
                });
            }
            AppState::Loading(pending) => {
                match pending.rx.try_recv() {
                    Ok(Ok(dataset)) => {
                        self.session.adopt(&pending.key, dataset);
                        transition = Some(AppState::Ready(Box::new(ViewModel::new())));
                    }
                    Ok(Err(message)) => {
                        error!("failed to load {}: {message}", pending.key);
                        transition = Some(AppState::Error {
                            key: pending.key.clone(),
                            message,
                        });
                    }
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(AppState::Error {
                            key: pending.key.clone(),
                            message: "Background load worker disconnected".to_owned(),
                        });
                    }
                }

                let key = pending.key.clone();
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading(format!("Loading {key}..."));
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error { key, message } => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading(format!("Failed to load {key}"));
                    ui.add_space(6.0);
                    ui.label(message.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(&mut self.session, key));
                    }
                });
            }
            AppState::Ready(model) => {
                let loading = self.switch.as_ref().map(|pending| pending.key.clone());
                if let Some(request) = model.show(ctx, &mut self.session, loading.as_deref()) {
                    Self::handle_request(&mut self.session, &mut self.switch, request, model);
                }
                Self::poll_switch(&mut self.session, &mut self.switch, model);
                if self.switch.is_some() {
                    ctx.request_repaint();
                }
            }
        }

        if let Some(next_state) = transition {
            self.state = next_state;
        }
    }
}
