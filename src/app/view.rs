use eframe::egui::{self, Align2, Color32, FontId, Sense, Stroke, Ui, vec2};
use radial_bubbles::{PlacedBubble, Tier, pack_with};

use super::render_utils::{
    blend_color, circle_visible, dim_color, draw_background, layout_to_world, source_color,
    world_to_screen,
};
use super::{LayoutCache, ViewModel};

impl ViewModel {
    fn ensure_layout(&mut self, side: f32) {
        let fresh = self
            .layout_cache
            .as_ref()
            .is_some_and(|cache| {
                cache.focus == self.focus.focus && (cache.side - side).abs() < 0.5
            });
        if fresh {
            return;
        }

        let bubbles = pack_with(&self.tree, self.focus.focus, side, &self.pack_config);
        self.layout_cache = Some(LayoutCache {
            focus: self.focus.focus,
            side,
            bubbles,
        });
    }

    pub(super) fn draw_canvas(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);

        self.handle_canvas_zoom(ui, rect, &response);
        self.handle_canvas_pan(&response);

        let side = rect.width().min(rect.height()).max(1.0);
        self.ensure_layout(side);
        let Some(cache) = self.layout_cache.take() else {
            return;
        };

        let hovered = self.hovered_bubble(ui, rect, side, &cache.bubbles);
        self.hovered = hovered.map(|bubble| bubble.node);
        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        let pending_click = if response.clicked_by(egui::PointerButton::Primary) {
            hovered.cloned()
        } else {
            None
        };

        let search_matches = self.cached_search_matches();
        let search_active = search_matches.as_ref().is_some_and(|matches| !matches.is_empty());
        let overlay = self.focus.overlay_node();

        let to_screen = |bubble: &PlacedBubble| {
            world_to_screen(rect, self.pan, self.zoom, layout_to_world(side, bubble.x, bubble.y))
        };
        let zoom_sqrt = self.zoom.sqrt();

        for bubble in &cache.bubbles {
            let Some(parent_id) = &bubble.parent_id else {
                continue;
            };
            let Some(parent) = cache.bubbles.iter().find(|other| &other.id == parent_id) else {
                continue;
            };

            let alpha = if bubble.tier == Tier::Child { 120 } else { 80 };
            painter.line_segment(
                [to_screen(parent), to_screen(bubble)],
                Stroke::new(
                    (1.1 * zoom_sqrt).clamp(0.6, 2.4),
                    Color32::from_rgba_unmultiplied(150, 160, 172, alpha),
                ),
            );
        }

        let highlight_color = Color32::from_rgb(245, 206, 93);
        for bubble in &cache.bubbles {
            let position = to_screen(bubble);
            let radius = bubble.radius * self.zoom;
            if !circle_visible(rect, position, radius) {
                continue;
            }

            let node = self.tree.node(bubble.node);
            let is_hovered = self.hovered == Some(bubble.node);
            let is_overlay = overlay == Some(bubble.node);
            let is_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&bubble.node));
            let drillable = bubble.tier == Tier::Child && self.tree.has_children(bubble.node);

            let base_color = source_color(node.source.as_deref(), bubble.tier);
            let color = if is_hovered {
                blend_color(base_color, Color32::from_rgb(255, 164, 101), 0.55)
            } else if is_overlay {
                blend_color(base_color, highlight_color, 0.6)
            } else if is_match {
                blend_color(base_color, Color32::from_rgb(103, 196, 255), 0.68)
            } else if search_active {
                dim_color(base_color, 0.45)
            } else {
                base_color
            };

            painter.circle_filled(position, radius, color);
            let stroke_width =
                (if drillable { 2.2 } else { 1.0 }) + (if is_overlay { 1.2 } else { 0.0 });
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(stroke_width, Color32::from_rgba_unmultiplied(15, 15, 15, 190)),
            );

            let font_size = match bubble.tier {
                Tier::Focus => 16.0,
                Tier::Child => 13.0,
                Tier::Grandchild => 11.0,
            };
            let should_draw_label =
                bubble.tier != Tier::Grandchild || is_hovered || is_match || radius > 14.0;
            if should_draw_label {
                painter.text(
                    position,
                    Align2::CENTER_CENTER,
                    node.name.as_str(),
                    FontId::proportional(font_size * zoom_sqrt.clamp(0.7, 1.6)),
                    Color32::from_gray(240),
                );
            }
        }

        if let Some(bubble) = hovered {
            let node = self.tree.node(bubble.node);
            let hint = match bubble.tier {
                Tier::Focus if self.focus.is_root_view() => "top level",
                Tier::Focus => "click to go up",
                Tier::Child if self.tree.has_children(bubble.node) => "click to drill down",
                _ => "click for details",
            };
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!("{}  |  {}  |  {hint}", node.name, bubble.id),
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        self.layout_cache = Some(cache);

        if let Some(bubble) = pending_click {
            self.apply_bubble_click(&bubble);
        }
    }
}
