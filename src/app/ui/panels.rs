use eframe::egui::{self, Align, Context, Layout, Vec2};
use radial_bubbles::{BubbleTree, FocusState, PackConfig};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn new(
        dataset_label: String,
        tree: BubbleTree,
        pack_config: PackConfig,
    ) -> Self {
        let focus = FocusState::root_view(&tree);
        Self {
            dataset_label,
            tree,
            focus,
            pack_config,
            search: String::new(),
            pan: Vec2::ZERO,
            zoom: 1.0,
            hovered: None,
            layout_cache: None,
            search_match_cache: None,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("radial-bubbles");
                    ui.separator();
                    ui.label(format!("data: {}", self.dataset_label));
                    ui.label(format!("nodes: {}", self.tree.len()));
                    if !self.tree.orphans().is_empty() {
                        ui.label(format!("re-rooted: {}", self.tree.orphans().len()))
                            .on_hover_text(
                                "Records whose parent could not be resolved sit at the top level.",
                            );
                    }
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload data"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    if ui.button("Reset view").clicked() {
                        self.reset_camera();
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(cache) = &self.layout_cache {
                            ui.label(format!("bubbles: {}", cache.bubbles.len()));
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        self.draw_overlay(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Reloading bubble records...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_canvas(ui);
            }
        });
    }
}
