use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Pos2, Vec2};

use crate::data::{CollabGraph, SizeMetric, load_network};

mod graph;
mod highlight;
mod physics;
mod render_utils;
mod ui;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkVisibility {
    Always,
    OnFocus,
}

#[derive(Clone, Copy, Debug)]
pub struct ViewOptions {
    pub metric: SizeMetric,
    pub link_visibility: LinkVisibility,
}

pub struct CollabGraphApp {
    data_path: String,
    options: ViewOptions,
    state: AppState,
    reload_rx: Option<Receiver<Result<CollabGraph, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<CollabGraph, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    graph: CollabGraph,
    metric: SizeMetric,
    link_visibility: LinkVisibility,
    search: String,
    interaction: Interaction,
    pan: Vec2,
    zoom: f32,
    live_physics: bool,
    physics_intensity: f32,
    physics_repulsion: f32,
    physics_spring: f32,
    physics_collision: f32,
    physics_velocity_damping: f32,
    graph_dirty: bool,
    render_graph_revision: u64,
    graph_cache: Option<RenderGraph>,
    search_match_cache: Option<SearchMatchCache>,
    top_songs: Vec<String>,
    top_collaborations: Vec<String>,
    top_unique: Vec<String>,
    ranking_rows_visible: usize,
    unique_rows_visible: usize,
    song_rows_visible: usize,
    show_fps_bar: bool,
    fps_current: f32,
    fps_samples: VecDeque<f32>,
    visible_node_count: usize,
    visible_edge_count: usize,
    last_canvas_size: Vec2,
}

// All transient pointer-driven state lives here rather than in free
// module statics: hover, selection, drag and the idle-motion toggle.
#[derive(Default)]
struct Interaction {
    hovered: Option<usize>,
    selected: Option<String>,
    drag: DragState,
    floating: bool,
    float_time: f32,
}

#[derive(Clone, Copy, Default)]
struct DragState {
    active: bool,
    index: Option<usize>,
}

struct SearchMatchCache {
    query: String,
    graph_revision: u64,
    matches: Arc<HashSet<usize>>,
}

struct RenderGraph {
    nodes: Vec<RenderNode>,
    // Parallel to CollabGraph::links; endpoints are node indices.
    edges: Vec<(usize, usize)>,
    index_by_id: HashMap<String, usize>,
    neighbors: Vec<Vec<usize>>,
    physics_scratch: PhysicsScratch,
    view_scratch: ViewScratch,
}

struct RenderNode {
    id: String,
    world_pos: Vec2,
    velocity: Vec2,
    metric_value: u64,
    base_radius: f32,
    palette_slot: usize,
    pinned: bool,
}

struct PhysicsScratch {
    forces: Vec<Vec2>,
    positions: Vec<Vec2>,
    radii: Vec<f32>,
    hits: Vec<usize>,
}

struct ViewScratch {
    screen_positions: Vec<Pos2>,
    screen_radii: Vec<f32>,
    visible_indices: Vec<usize>,
    visible_mask: Vec<bool>,
    draw_order: Vec<usize>,
    draw_order_dirty: bool,
}

#[derive(Clone, Copy)]
struct PhysicsConfig {
    intensity: f32,
    repulsion_scale: f32,
    spring_scale: f32,
    collision_scale: f32,
    velocity_damping: f32,
    delta_seconds: f32,
}

impl CollabGraphApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, data_path: String, options: ViewOptions) -> Self {
        let state = Self::start_load(data_path.clone());
        Self {
            data_path,
            options,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(data_path: String) -> Receiver<Result<CollabGraph, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_network(&data_path).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(data_path: String) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(data_path),
        }
    }
}

impl eframe::App for CollabGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(graph) => {
                            AppState::Ready(Box::new(ViewModel::new(graph, self.options)))
                        }
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading collaboration network...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load collaboration network");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Reload").clicked() {
                        transition = Some(Self::start_load(self.data_path.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.data_path, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.data_path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => {
                            transition = Some(match result {
                                Ok(graph) => {
                                    AppState::Ready(Box::new(ViewModel::new(graph, self.options)))
                                }
                                Err(error) => AppState::Error(error),
                            });
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(AppState::Error("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}

#[cfg(test)]
pub(in crate::app) mod test_fixtures {
    use std::collections::{HashMap, HashSet};

    use crate::data::{CollabGraph, Link, ProducerNode};

    fn producer(id: &str, name: &str, songs: u64, collabs: u64, unique: u64) -> ProducerNode {
        ProducerNode {
            id: id.to_string(),
            name: name.to_string(),
            url: None,
            songs: (0..songs).map(|i| format!("Song {i}")).collect(),
            song_count: songs,
            total_collaborations: collabs,
            unique_collaborators: unique,
        }
    }

    // A-B and A-C linked, D isolated.
    pub(in crate::app) fn sample_graph() -> CollabGraph {
        let nodes = vec![
            producer("A", "Teddy", 3, 5, 2),
            producer("B", "R. Tee", 1, 2, 1),
            producer("C", "24", 2, 3, 1),
            producer("D", "Kush", 0, 0, 0),
        ];
        let links = vec![
            Link {
                a: "A".into(),
                b: "B".into(),
                songs: vec!["Song 0".into()],
            },
            Link {
                a: "A".into(),
                b: "C".into(),
                songs: vec!["Song 1".into(), "Song 2".into()],
            },
        ];

        let mut adjacency: HashMap<String, HashSet<String>> = nodes
            .iter()
            .map(|node| (node.id.clone(), HashSet::from([node.id.clone()])))
            .collect();
        for link in &links {
            adjacency.get_mut(&link.a).unwrap().insert(link.b.clone());
            adjacency.get_mut(&link.b).unwrap().insert(link.a.clone());
        }

        CollabGraph {
            nodes: nodes.into_iter().map(|node| (node.id.clone(), node)).collect(),
            links,
            adjacency,
            song_count: 3,
        }
    }
}
