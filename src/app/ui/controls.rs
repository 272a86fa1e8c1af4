use eframe::egui::{self, RichText, Ui};

use crate::data::SizeMetric;

use super::super::{LinkVisibility, ViewModel};

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Network Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search producers")
            .on_hover_text("Fuzzy-highlight matching producers without changing the graph.");
        ui.text_edit_singleline(&mut self.search)
            .on_hover_text("Type to highlight matches, then click one to select it.");

        ui.separator();

        let mut metric_changed = false;
        ui.label("Node size");
        ui.horizontal_wrapped(|ui| {
            metric_changed |= ui
                .selectable_value(&mut self.metric, SizeMetric::Songs, "Songs")
                .on_hover_text("Scale nodes and rankings by song count.")
                .changed();
            metric_changed |= ui
                .selectable_value(&mut self.metric, SizeMetric::Collaborations, "Collaborations")
                .on_hover_text("Scale nodes and rankings by total collaboration count.")
                .changed();
        });
        if metric_changed {
            self.graph_dirty = true;
        }

        ui.label("Links");
        ui.horizontal_wrapped(|ui| {
            ui.selectable_value(&mut self.link_visibility, LinkVisibility::Always, "Always")
                .on_hover_text("Draw every link; focus dims the rest of the network.");
            ui.selectable_value(&mut self.link_visibility, LinkVisibility::OnFocus, "On focus")
                .on_hover_text("Hide links until a producer is hovered or selected.");
        });

        ui.separator();

        ui.checkbox(&mut self.live_physics, "Live physics simulation")
            .on_hover_text("Step the force layout every frame until it settles.");
        ui.checkbox(&mut self.interaction.floating, "Floating idle motion")
            .on_hover_text("Gently drift nodes around their settled positions.");
        ui.checkbox(&mut self.show_fps_bar, "FPS display");

        ui.collapsing("Physics tuning", |ui| {
            ui.add(
                egui::Slider::new(&mut self.physics_intensity, 0.2..=2.5)
                    .step_by(0.05)
                    .text("Intensity")
                    .clamping(egui::SliderClamping::Always),
            );
            ui.add(
                egui::Slider::new(&mut self.physics_repulsion, 0.25..=2.6)
                    .step_by(0.05)
                    .text("Repulsion")
                    .clamping(egui::SliderClamping::Always),
            );
            ui.add(
                egui::Slider::new(&mut self.physics_spring, 0.2..=2.2)
                    .step_by(0.05)
                    .text("Link springs")
                    .clamping(egui::SliderClamping::Always),
            );
            ui.add(
                egui::Slider::new(&mut self.physics_collision, 0.2..=2.0)
                    .step_by(0.05)
                    .text("Collision push")
                    .clamping(egui::SliderClamping::Always),
            );
            ui.add(
                egui::Slider::new(&mut self.physics_velocity_damping, 0.75..=0.97)
                    .step_by(0.01)
                    .text("Velocity damping")
                    .clamping(egui::SliderClamping::Always),
            );
        });

        ui.separator();
        self.draw_metric_ranking(ui);
        ui.separator();
        self.draw_unique_ranking(ui);
    }

    fn draw_metric_ranking(&mut self, ui: &mut Ui) {
        let metric = self.metric;
        ui.label(RichText::new(format!("Top producers by {}", metric.label())).strong());

        let ids = match metric {
            SizeMetric::Songs => &self.top_songs,
            SizeMetric::Collaborations => &self.top_collaborations,
        };
        let total = ids.len();
        let row_count = total.min(self.ranking_rows_visible);
        let rows = ids[..row_count]
            .iter()
            .map(|id| {
                let label = self
                    .graph
                    .nodes
                    .get(id)
                    .map(|node| format!("{}  ({})", node.name, node.metric(metric)))
                    .unwrap_or_else(|| id.clone());
                (id.clone(), label)
            })
            .collect::<Vec<_>>();

        let mut should_load_more = false;
        egui::ScrollArea::vertical()
            .id_salt("metric_ranking_scroll")
            .max_height(220.0)
            .auto_shrink([false, false])
            .show_rows(ui, 20.0, row_count, |ui, row_range| {
                if row_range.end + Self::RANKING_PREFETCH_MARGIN >= row_count {
                    should_load_more = true;
                }

                for index in row_range {
                    let Some((id, label)) = rows.get(index) else {
                        continue;
                    };
                    if ui.link(label).on_hover_text(id.as_str()).clicked() {
                        self.set_selected(Some(id.clone()));
                    }
                }
            });

        if should_load_more && row_count < total {
            self.ranking_rows_visible = (row_count + Self::RANKING_PAGE_ROWS).min(total);
        }
    }

    fn draw_unique_ranking(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Top producers by unique collaborators").strong());

        let total = self.top_unique.len();
        let row_count = total.min(self.unique_rows_visible);
        let rows = self.top_unique[..row_count]
            .iter()
            .map(|id| {
                let label = self
                    .graph
                    .nodes
                    .get(id)
                    .map(|node| format!("{}  ({})", node.name, node.unique_collaborators))
                    .unwrap_or_else(|| id.clone());
                (id.clone(), label)
            })
            .collect::<Vec<_>>();

        let mut should_load_more = false;
        egui::ScrollArea::vertical()
            .id_salt("unique_ranking_scroll")
            .max_height(220.0)
            .auto_shrink([false, false])
            .show_rows(ui, 20.0, row_count, |ui, row_range| {
                if row_range.end + Self::RANKING_PREFETCH_MARGIN >= row_count {
                    should_load_more = true;
                }

                for index in row_range {
                    let Some((id, label)) = rows.get(index) else {
                        continue;
                    };
                    if ui.link(label).on_hover_text(id.as_str()).clicked() {
                        self.set_selected(Some(id.clone()));
                    }
                }
            });

        if should_load_more && row_count < total {
            self.unique_rows_visible = (row_count + Self::RANKING_PAGE_ROWS).min(total);
        }
    }
}
