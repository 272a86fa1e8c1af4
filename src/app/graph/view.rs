use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{
    self, Align2, Color32, FontId, Painter, PointerButton, Pos2, Rect, Sense, Stroke, Ui, Vec2,
    vec2,
};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::data::ProducerNode;
use crate::util::stable_pair;

use super::super::highlight::{hover_highlight, selection_highlight};
use super::super::physics::{kick, step_physics};
use super::super::render_utils::{
    blend_color, dim_color, draw_background, edge_visible, palette_color, with_alpha,
    world_to_screen,
};
use super::super::{DragState, LinkVisibility, PhysicsConfig, SearchMatchCache, ViewModel};

const SEARCH_ACCENT: Color32 = Color32::from_rgb(103, 196, 255);
const SELECTED_COLOR: Color32 = Color32::from_rgb(245, 206, 93);

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

fn draw_hover_card(painter: &Painter, rect: Rect, pointer: Pos2, producer: &ProducerNode) {
    let text = format!(
        "{}\nsongs {}  |  collaborations {}\nunique collaborators {}",
        producer.name,
        producer.song_count,
        producer.total_collaborations,
        producer.unique_collaborators
    );
    let galley = painter.layout_no_wrap(text, FontId::proportional(12.0), Color32::from_gray(235));

    let padding = vec2(8.0, 6.0);
    let size = galley.size() + padding * 2.0;
    let mut corner = pointer + vec2(16.0, 14.0);
    if corner.x + size.x > rect.right() {
        corner.x = pointer.x - size.x - 10.0;
    }
    if corner.y + size.y > rect.bottom() {
        corner.y = pointer.y - size.y - 10.0;
    }

    let card = Rect::from_min_size(corner, size);
    painter.rect_filled(card, 5.0, Color32::from_rgba_unmultiplied(24, 28, 38, 238));
    painter.galley(card.min + padding, galley, Color32::from_gray(235));
}

impl ViewModel {
    fn update_screen_space(
        rect: Rect,
        pan: Vec2,
        zoom: f32,
        float_time: Option<f32>,
        drag_index: Option<usize>,
        cache: &mut super::super::RenderGraph,
    ) {
        cache.view_scratch.screen_positions.clear();
        cache.view_scratch.screen_radii.clear();

        for (index, render_node) in cache.nodes.iter().enumerate() {
            let mut world = render_node.world_pos;
            if let Some(t) = float_time
                && drag_index != Some(index)
            {
                // Idle floating motion: a gentle per-node drift on top of the
                // simulated position, phase keyed off the producer id.
                let (px, py) = stable_pair(&render_node.id);
                world += vec2(
                    (t * 0.9 + px * std::f32::consts::TAU).sin(),
                    (t * 1.3 + py * std::f32::consts::TAU).cos(),
                ) * 2.6;
            }

            cache
                .view_scratch
                .screen_positions
                .push(world_to_screen(rect, pan, zoom, world));
            cache
                .view_scratch
                .screen_radii
                .push((render_node.base_radius * zoom.powf(0.40)).clamp(3.0, 52.0));
        }
    }

    fn ensure_draw_order(cache: &mut super::super::RenderGraph) {
        if !cache.view_scratch.draw_order_dirty
            && cache.view_scratch.draw_order.len() == cache.nodes.len()
        {
            return;
        }

        cache.view_scratch.draw_order.clear();
        cache.view_scratch.draw_order.extend(0..cache.nodes.len());
        cache.view_scratch.draw_order.sort_by(|a, b| {
            cache.nodes[*a]
                .metric_value
                .cmp(&cache.nodes[*b].metric_value)
        });
        cache.view_scratch.draw_order_dirty = false;
    }

    fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        if self.interaction.selected.is_some() {
            return None;
        }

        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.graph_revision == self.render_graph_revision
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let cache = self.graph_cache.as_ref()?;
        let matcher = SkimMatcherV2::default();
        let matches = cache
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                let name = self
                    .graph
                    .nodes
                    .get(&node.id)
                    .map(|producer| producer.name.as_str())
                    .unwrap_or(node.id.as_str());
                if fuzzy_match_score(&matcher, name, query).is_some() {
                    Some(index)
                } else {
                    None
                }
            })
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            graph_revision: self.render_graph_revision,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        if self.graph_dirty {
            self.rebuild_render_graph();
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);

        // A resize recenters the layout; wake the simulation at moderate
        // energy instead of recomputing positions.
        if self.last_canvas_size != rect.size() {
            if self.last_canvas_size != Vec2::ZERO
                && let Some(cache) = self.graph_cache.as_mut()
            {
                kick(cache, 1.4);
            }
            self.last_canvas_size = rect.size();
        }

        let frame_delta_seconds = ui
            .ctx()
            .input(|input| input.stable_dt)
            .clamp(1.0 / 240.0, 1.0 / 20.0);
        if self.interaction.floating {
            self.interaction.float_time += frame_delta_seconds;
        }

        let search_matches = self.cached_search_matches();
        let pan = self.pan;
        let zoom = self.zoom;
        let link_visibility = self.link_visibility;
        let selected_id = self.interaction.selected.clone();
        let float_time = self
            .interaction
            .floating
            .then_some(self.interaction.float_time);
        let mut drag = self.interaction.drag;
        let interaction_active = response.dragged();
        let physics = PhysicsConfig {
            intensity: self.physics_intensity,
            repulsion_scale: self.physics_repulsion,
            spring_scale: self.physics_spring,
            collision_scale: self.physics_collision,
            velocity_damping: self.physics_velocity_damping,
            delta_seconds: frame_delta_seconds,
        };

        let Some(cache) = self.graph_cache.as_mut() else {
            self.visible_node_count = 0;
            self.visible_edge_count = 0;
            ui.label("The dataset contains no producers.");
            return;
        };

        let mut physics_moving = false;
        if self.live_physics {
            physics_moving = step_physics(cache, physics);
        }

        Self::update_screen_space(
            rect,
            pan,
            zoom,
            float_time,
            drag.index.filter(|_| drag.active),
            cache,
        );
        Self::visible_indices_into(
            rect,
            &cache.view_scratch.screen_positions,
            &cache.view_scratch.screen_radii,
            &mut cache.view_scratch.visible_indices,
        );
        cache.view_scratch.visible_mask.clear();
        cache
            .view_scratch
            .visible_mask
            .resize(cache.nodes.len(), false);
        for &index in &cache.view_scratch.visible_indices {
            if let Some(entry) = cache.view_scratch.visible_mask.get_mut(index) {
                *entry = true;
            }
        }
        self.visible_node_count = cache.view_scratch.visible_indices.len();

        let hovered = Self::hovered_index(
            ui,
            &cache.view_scratch.visible_indices,
            &cache.view_scratch.screen_positions,
            &cache.view_scratch.screen_radii,
        );
        let hovered_index = hovered.map(|(index, _)| index);

        if hovered_index.is_some() || drag.active {
            ui.output_mut(|output| {
                output.cursor_icon = if drag.active {
                    egui::CursorIcon::Grabbing
                } else {
                    egui::CursorIcon::PointingHand
                };
            });
        }

        // Drag a node to reposition it: pinned while held, free on drop.
        let drag_delta = response.drag_delta();
        if response.drag_started_by(PointerButton::Primary)
            && let Some(index) = hovered_index
        {
            drag = DragState {
                active: true,
                index: Some(index),
            };
        }
        if drag.active {
            if let Some(index) = drag.index {
                if response.dragged_by(PointerButton::Primary)
                    && let Some(node) = cache.nodes.get_mut(index)
                {
                    node.world_pos += drag_delta / zoom;
                    node.velocity = Vec2::ZERO;
                    node.pinned = true;
                    if let Some(position) = cache.view_scratch.screen_positions.get_mut(index) {
                        *position = world_to_screen(rect, pan, zoom, node.world_pos);
                    }
                }
                if response.drag_stopped_by(PointerButton::Primary) {
                    if let Some(node) = cache.nodes.get_mut(index) {
                        node.pinned = false;
                    }
                    drag = DragState::default();
                }
            }
        } else if response.dragged_by(PointerButton::Primary) {
            self.pan += drag_delta;
        }

        // A click on a node selects it; a click on empty canvas clears the
        // selection and closes the details panel.
        let pending_selection = if response.clicked_by(PointerButton::Primary) {
            Some(hovered_index.and_then(|index| cache.nodes.get(index).map(|node| node.id.clone())))
        } else {
            None
        };

        // Selection styling persists independent of hover.
        let highlight = if let Some(id) = &selected_id {
            selection_highlight(&self.graph, cache, id)
        } else {
            hovered_index.map(|index| hover_highlight(cache, index))
        };
        let selection_active = highlight
            .as_ref()
            .is_some_and(|state| state.from_selection);
        let search_active = search_matches
            .as_ref()
            .is_some_and(|matches| !matches.is_empty());

        let zoom_sqrt = zoom.sqrt();
        let mut visible_edge_count = 0usize;
        for (edge_index, &(a, b)) in cache.edges.iter().enumerate() {
            if a >= cache.nodes.len() || b >= cache.nodes.len() {
                continue;
            }

            let emphasized = highlight
                .as_ref()
                .is_some_and(|state| state.edges.contains(&edge_index));
            if !emphasized && link_visibility == LinkVisibility::OnFocus {
                continue;
            }

            let start = cache.view_scratch.screen_positions[a];
            let end = cache.view_scratch.screen_positions[b];
            let a_visible = cache
                .view_scratch
                .visible_mask
                .get(a)
                .copied()
                .unwrap_or(false);
            let b_visible = cache
                .view_scratch
                .visible_mask
                .get(b)
                .copied()
                .unwrap_or(false);
            if !a_visible && !b_visible && !edge_visible(rect, start, end, 2.5) {
                continue;
            }

            // Links borrow the palette color of their source-side endpoint.
            let source_color = palette_color(cache.nodes[a].palette_slot);
            let (line_width, line_color) = if emphasized {
                (
                    (2.4 * zoom_sqrt).clamp(1.3, 4.6),
                    with_alpha(blend_color(source_color, Color32::WHITE, 0.2), 220),
                )
            } else if highlight.is_some() {
                ((0.8 * zoom_sqrt).clamp(0.4, 1.8), with_alpha(source_color, 36))
            } else {
                (
                    (1.2 * zoom_sqrt).clamp(0.6, 2.6),
                    with_alpha(source_color, 110),
                )
            };

            painter.line_segment([start, end], Stroke::new(line_width, line_color));
            visible_edge_count += 1;
        }
        self.visible_edge_count = visible_edge_count;

        let mut selection_animating = false;

        Self::ensure_draw_order(cache);
        for index in cache.view_scratch.draw_order.iter().copied() {
            if !cache
                .view_scratch
                .visible_mask
                .get(index)
                .copied()
                .unwrap_or(false)
            {
                continue;
            }

            let render_node = &cache.nodes[index];
            let position = cache.view_scratch.screen_positions[index];
            let radius = cache.view_scratch.screen_radii[index];

            let is_selected = selected_id.as_deref() == Some(render_node.id.as_str());
            let is_hovered = hovered_index == Some(index);
            let is_member = highlight
                .as_ref()
                .is_some_and(|state| state.members.contains(&index));
            let is_search_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&index));

            let base_color = palette_color(render_node.palette_slot);
            let unselected_color = if is_hovered {
                blend_color(base_color, Color32::WHITE, 0.28)
            } else if highlight.is_some() {
                if is_member {
                    base_color
                } else {
                    dim_color(base_color, 0.35)
                }
            } else if search_active {
                if is_search_match {
                    blend_color(base_color, SEARCH_ACCENT, 0.55)
                } else {
                    dim_color(base_color, 0.38)
                }
            } else {
                base_color
            };

            let selection_mix = ui.ctx().animate_bool(
                ui.make_persistent_id(("node-selection", render_node.id.as_str())),
                is_selected,
            );
            if selection_mix > 0.0 && selection_mix < 1.0 {
                selection_animating = true;
            }

            let color = blend_color(unselected_color, SELECTED_COLOR, selection_mix);

            painter.circle_filled(position, radius, color);
            if selection_mix > 0.0 {
                let halo_strength = (selection_mix * (1.0 - selection_mix) * 4.0).clamp(0.0, 1.0);
                let halo_alpha = (30.0 + (halo_strength * 145.0)) as u8;
                painter.circle_stroke(
                    position,
                    radius + 4.0 + ((1.0 - selection_mix) * 6.0),
                    Stroke::new(
                        1.0 + (halo_strength * 1.6),
                        with_alpha(SELECTED_COLOR, halo_alpha),
                    ),
                );
            }

            painter.circle_stroke(
                position,
                radius,
                Stroke::new(
                    1.0 + (selection_mix * 1.2),
                    Color32::from_rgba_unmultiplied(12, 12, 14, 190),
                ),
            );

            // Focus mode labels the whole neighborhood and tracks positions;
            // search matches get labels once zoomed in enough to read them.
            let labeled = (selection_active && is_member) || (is_search_match && zoom > 0.5);
            if labeled
                && let Some(producer) = self.graph.nodes.get(&render_node.id)
            {
                painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    &producer.name,
                    FontId::proportional(12.0),
                    Color32::from_gray(235),
                );
            }
        }

        if !drag.active
            && let Some(index) = hovered_index
            && let Some(producer) = cache
                .nodes
                .get(index)
                .and_then(|node| self.graph.nodes.get(&node.id))
            && let Some(pointer) = ui.input(|input| input.pointer.hover_pos())
        {
            draw_hover_card(&painter, rect, pointer, producer);
        }

        if physics_moving || interaction_active || float_time.is_some() || selection_animating {
            ui.ctx().request_repaint();
        }

        self.interaction.drag = drag;
        self.interaction.hovered = hovered_index;
        if let Some(selected) = pending_selection {
            self.apply_graph_selection(selected);
        }
    }
}
