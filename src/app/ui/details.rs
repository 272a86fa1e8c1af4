use eframe::egui::{self, Align, Layout, RichText, Ui};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.heading("Producer Details");
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if ui.button("Close").clicked() {
                    self.set_selected(None);
                }
            });
        });
        ui.add_space(6.0);

        let Some(selected_id) = self.interaction.selected.clone() else {
            ui.label("Select a producer from the graph or rankings.");
            return;
        };

        let Some(node) = self.graph.nodes.get(&selected_id) else {
            ui.label("Selected producer no longer exists in the dataset.");
            return;
        };

        let name = node.name.clone();
        let url = node.url.clone();
        let song_count = node.song_count;
        let total_collaborations = node.total_collaborations;
        let unique_collaborators = node.unique_collaborators;

        ui.label(RichText::new(name).strong());
        ui.small(format!("id {selected_id}"));
        if let Some(url) = url {
            ui.hyperlink_to(url.clone(), url);
        }
        ui.add_space(6.0);

        ui.label(format!("Songs: {song_count}"));
        ui.label(format!("Total collaborations: {total_collaborations}"));
        ui.label(format!("Unique collaborators: {unique_collaborators}"));
        let linked = self
            .graph
            .neighbors(&selected_id)
            .map(|set| set.len().saturating_sub(1))
            .unwrap_or(0);
        ui.label(format!("Linked producers: {linked}"));

        ui.separator();
        ui.label(RichText::new("Songs").strong());
        let songs = self.graph.sorted_songs(&selected_id);
        if songs.is_empty() {
            ui.label("No songs recorded for this producer.");
        } else {
            let row_count = songs.len().min(self.song_rows_visible);
            let mut should_load_more = false;

            egui::ScrollArea::vertical()
                .id_salt("songs_scroll")
                .max_height(280.0)
                .auto_shrink([false, false])
                .show_rows(ui, 18.0, row_count, |ui, row_range| {
                    if row_range.end + Self::SONG_PREFETCH_MARGIN >= row_count {
                        should_load_more = true;
                    }

                    for index in row_range {
                        if let Some(song) = songs.get(index) {
                            ui.label(song);
                        }
                    }
                });

            if should_load_more && row_count < songs.len() {
                self.song_rows_visible = (row_count + Self::SONG_PAGE_ROWS).min(songs.len());
            }
        }

        ui.separator();
        ui.label(RichText::new("Collaborators").strong());
        let collaborators = self.collaborators_for_details(&selected_id);
        if collaborators.is_empty() {
            ui.label("No linked collaborators in the network.");
        } else {
            egui::ScrollArea::vertical()
                .id_salt("collaborators_scroll")
                .max_height(240.0)
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for (id, label) in &collaborators {
                        if ui.link(label).on_hover_text(id.as_str()).clicked() {
                            self.set_selected(Some(id.clone()));
                        }
                    }
                });
        }
    }

    fn collaborators_for_details(&self, selected_id: &str) -> Vec<(String, String)> {
        let Some(neighborhood) = self.graph.neighbors(selected_id) else {
            return Vec::new();
        };

        let mut entries = neighborhood
            .iter()
            .filter(|id| id.as_str() != selected_id)
            .filter_map(|id| self.graph.nodes.get(id))
            .map(|node| (node.metric(self.metric), node.name.clone(), node.id.clone()))
            .collect::<Vec<_>>();

        entries.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        entries
            .into_iter()
            .map(|(value, name, id)| (id, format!("{name}  ({value})")))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::super::test_fixtures::sample_graph;
    use super::super::super::{LinkVisibility, ViewModel, ViewOptions};
    use crate::data::SizeMetric;

    #[test]
    fn collaborators_exclude_self_and_sort_by_metric() {
        let model = ViewModel::new(
            sample_graph(),
            ViewOptions {
                metric: SizeMetric::Collaborations,
                link_visibility: LinkVisibility::Always,
            },
        );

        let collaborators = model.collaborators_for_details("A");
        let ids = collaborators.iter().map(|(id, _)| id.as_str()).collect::<Vec<_>>();
        // C (3 collaborations) outranks B (2); A itself is excluded.
        assert_eq!(ids, vec!["C", "B"]);

        assert!(model.collaborators_for_details("D").is_empty());
    }
}
