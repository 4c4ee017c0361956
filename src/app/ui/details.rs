use eframe::egui::{self, Context, RichText, Ui};
use radial_bubbles::NodeId;
use radial_bubbles::util::format_weight;

use super::super::ViewModel;

impl ViewModel {
    fn draw_node_summary(&self, ui: &mut Ui, id: NodeId) {
        let node = self.tree.node(id);

        ui.label(RichText::new(node.name.as_str()).strong());
        ui.small(node.lineage_id.as_str());
        ui.add_space(6.0);

        if !id.is_root() {
            ui.label(format!("Level: {}", node.level));
        }
        if let Some(source) = &node.source {
            ui.label(format!("Source: {source}"));
        }
        ui.label(format!("Weight: {}", format_weight(node.weight())));
        ui.label(format!("Children: {}", node.children.len()));
        ui.label(format!("Grandchildren: {}", self.tree.grandchild_count(id)));
        if self.tree.orphans().contains(&id) {
            ui.label("Parent could not be resolved; shown at the top level.");
        }
    }

    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Focus Details");
        ui.add_space(6.0);

        let focus = self.focus.focus;
        self.draw_node_summary(ui, focus);

        ui.separator();
        ui.label(RichText::new("Children").strong());

        let children = self.tree.children(focus).to_vec();
        if children.is_empty() {
            ui.label("This record has no children.");
            return;
        }

        let mut clicked = None;
        egui::ScrollArea::vertical()
            .id_salt("focus_children_scroll")
            .max_height(360.0)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for child in children {
                    let node = self.tree.node(child);
                    let label = if node.children.is_empty() {
                        node.name.clone()
                    } else {
                        format!("{}  ({})", node.name, node.children.len())
                    };
                    if ui.link(label).on_hover_text(node.lineage_id.as_str()).clicked() {
                        clicked = Some(child);
                    }
                }
            });

        if let Some(child) = clicked {
            let next = self.focus.drill_down(&self.tree, child);
            self.focus = if next == self.focus {
                self.focus.open_overlay(child)
            } else {
                next
            };
        }
    }

    pub(in crate::app) fn draw_overlay(&mut self, ctx: &Context) {
        let Some(target) = self.focus.overlay_node() else {
            return;
        };

        let mut open = true;
        egui::Window::new("Record")
            .id(egui::Id::new("record_overlay"))
            .open(&mut open)
            .resizable(false)
            .collapsible(false)
            .default_width(260.0)
            .show(ctx, |ui| {
                self.draw_node_summary(ui, target);
                let names = self
                    .tree
                    .children(target)
                    .iter()
                    .map(|child| self.tree.node(*child).name.as_str())
                    .collect::<Vec<_>>();
                if !names.is_empty() {
                    ui.separator();
                    ui.label(names.join(", "));
                }
            });

        if !open {
            self.focus = self.focus.close_overlay();
        }
    }
}
