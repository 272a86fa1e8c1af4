use std::collections::VecDeque;

use eframe::egui::{self, Align, Context, Layout, Vec2};

use crate::data::{CollabGraph, SizeMetric};

use super::super::{Interaction, ViewModel, ViewOptions};

impl ViewModel {
    pub(in crate::app) const INITIAL_RANKING_ROWS: usize = 20;
    pub(in crate::app) const RANKING_PAGE_ROWS: usize = 20;
    pub(in crate::app) const RANKING_PREFETCH_MARGIN: usize = 4;
    pub(in crate::app) const INITIAL_SONG_ROWS: usize = 40;
    pub(in crate::app) const SONG_PAGE_ROWS: usize = 40;
    pub(in crate::app) const SONG_PREFETCH_MARGIN: usize = 6;

    pub(in crate::app) fn new(graph: CollabGraph, options: ViewOptions) -> Self {
        let ranking_limit = graph.node_count();
        let top_songs = graph.top_by_metric(SizeMetric::Songs, ranking_limit);
        let top_collaborations = graph.top_by_metric(SizeMetric::Collaborations, ranking_limit);
        let top_unique = graph.top_by_unique_collaborators(ranking_limit);

        Self {
            graph,
            metric: options.metric,
            link_visibility: options.link_visibility,
            search: String::new(),
            interaction: Interaction::default(),
            pan: Vec2::ZERO,
            zoom: 1.0,
            live_physics: true,
            physics_intensity: 1.0,
            physics_repulsion: 1.0,
            physics_spring: 1.0,
            physics_collision: 1.0,
            physics_velocity_damping: 0.88,
            graph_dirty: true,
            render_graph_revision: 0,
            graph_cache: None,
            search_match_cache: None,
            top_songs,
            top_collaborations,
            top_unique,
            ranking_rows_visible: Self::INITIAL_RANKING_ROWS,
            unique_rows_visible: Self::INITIAL_RANKING_ROWS,
            song_rows_visible: Self::INITIAL_SONG_ROWS,
            show_fps_bar: true,
            fps_current: 0.0,
            fps_samples: VecDeque::new(),
            visible_node_count: 0,
            visible_edge_count: 0,
            last_canvas_size: Vec2::ZERO,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        data_path: &str,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        self.update_fps_counter(ctx);
        if self.graph_dirty {
            self.rebuild_render_graph();
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("collab-graph");
                    ui.separator();
                    ui.label(format!("dataset: {data_path}"));
                    ui.label(format!("producers: {}", self.graph.node_count()));
                    ui.label(format!("links: {}", self.graph.link_count()));
                    ui.label(format!("songs: {}", self.graph.song_count));
                    if let Some(star) = self.graph.most_collaborative() {
                        ui.label(format!(
                            "top collaborator: {} ({})",
                            star.name, star.unique_collaborators
                        ));
                    }
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload dataset"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(visible_graph_text) = self.visible_graph_text() {
                            ui.label(visible_graph_text);
                        }
                        if let Some(fps_text) = self.fps_display_text() {
                            ui.label(fps_text);
                        }
                        if let Some(producer) = self.hovered_producer() {
                            ui.label(format!("hovering: {}", producer.name));
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui));

        let details_open = self.interaction.selected.is_some();
        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show_animated(ctx, details_open, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Reloading collaboration network...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_graph(ui);
            }
        });
    }

    fn hovered_producer(&self) -> Option<&crate::data::ProducerNode> {
        let cache = self.graph_cache.as_ref()?;
        let index = self.interaction.hovered?;
        let node = cache.nodes.get(index)?;
        self.graph.nodes.get(&node.id)
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<String>) {
        if self.interaction.selected == selected {
            return;
        }

        self.interaction.selected = selected;
        self.song_rows_visible = Self::INITIAL_SONG_ROWS;
    }
}
