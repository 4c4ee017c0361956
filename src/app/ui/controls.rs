use std::sync::Arc;

use eframe::egui::{self, RichText, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use radial_bubbles::NodeId;

use super::super::{SearchMatchCache, ViewModel};

const SEARCH_RESULT_LIMIT: usize = 40;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl ViewModel {
    /// Node ids matching the search box, best score first.
    pub(in crate::app) fn cached_search_matches(&mut self) -> Option<Arc<Vec<NodeId>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let mut scored = self
            .tree
            .nodes()
            .filter_map(|(id, node)| {
                fuzzy_match_score(&matcher, &node.name, query).map(|score| (score, id))
            })
            .collect::<Vec<_>>();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

        let matches = Arc::new(scored.into_iter().map(|(_, id)| id).collect::<Vec<_>>());
        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Navigation");
        ui.separator();
        ui.add_space(4.0);

        self.draw_breadcrumbs(ui);

        ui.separator();
        ui.label("Search by name")
            .on_hover_text("Fuzzy-highlight matching bubbles; click a result to jump to it.");
        ui.text_edit_singleline(&mut self.search);

        let Some(matches) = self.cached_search_matches() else {
            return;
        };

        ui.add_space(4.0);
        if matches.is_empty() {
            ui.label("No matching records.");
            return;
        }

        ui.small(format!("{} matches", matches.len()));
        let mut jump_to = None;
        egui::ScrollArea::vertical()
            .id_salt("search_results_scroll")
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for id in matches.iter().take(SEARCH_RESULT_LIMIT) {
                    let node = self.tree.node(*id);
                    let label = format!("{}  (level {})", node.name, node.level);
                    if ui.link(label).on_hover_text(node.lineage_id.as_str()).clicked() {
                        jump_to = Some(*id);
                    }
                }
            });

        if let Some(target) = jump_to {
            self.focus = self.focus.focus_on(&self.tree, target);
            self.reset_camera();
        }
    }

    fn draw_breadcrumbs(&mut self, ui: &mut Ui) {
        let path = self.tree.path_to(self.focus.focus);
        let mut jump_to = None;

        ui.label(RichText::new("Focus path").strong());
        ui.horizontal_wrapped(|ui| {
            for (depth, id) in path.iter().enumerate() {
                if depth > 0 {
                    ui.label("›");
                }
                let name = self.tree.node(*id).name.as_str();
                if *id == self.focus.focus {
                    ui.label(RichText::new(name).strong());
                } else if ui.link(name).clicked() {
                    jump_to = Some(*id);
                }
            }
        });

        let up = ui.add_enabled(!self.focus.is_root_view(), egui::Button::new("Up one level"));
        if up.clicked() {
            self.focus = self.focus.drill_up(&self.tree);
            self.reset_camera();
        } else if let Some(target) = jump_to {
            self.focus = self.focus.focus_on(&self.tree, target);
            self.reset_camera();
        }
    }
}
