use eframe::egui::{self, Rect, Ui};
use radial_bubbles::{PlacedBubble, bubble_at};

use super::ViewModel;
use super::render_utils::{screen_to_world, world_to_layout};

impl ViewModel {
    pub(super) fn handle_canvas_zoom(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.2, 6.0);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    pub(super) fn handle_canvas_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    pub(super) fn reset_camera(&mut self) {
        self.pan = egui::Vec2::ZERO;
        self.zoom = 1.0;
    }

    pub(super) fn hovered_bubble<'a>(
        &self,
        ui: &Ui,
        rect: Rect,
        side: f32,
        bubbles: &'a [PlacedBubble],
    ) -> Option<&'a PlacedBubble> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        if !rect.contains(pointer) {
            return None;
        }

        let world = screen_to_world(rect, self.pan, self.zoom, pointer);
        let (x, y) = world_to_layout(side, world);
        bubble_at(bubbles, x, y)
    }

    pub(super) fn apply_bubble_click(&mut self, bubble: &PlacedBubble) {
        let next = self.focus.on_bubble_click(&self.tree, bubble);
        if next.focus != self.focus.focus {
            self.reset_camera();
        }
        self.focus = next;
    }
}
