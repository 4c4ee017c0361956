use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::{Context as _, Result};
use eframe::egui::{self, Context, Vec2};
use radial_bubbles::demo::{DEMO_LABEL, demo_records};
use radial_bubbles::{BubbleTree, FocusState, NodeId, PackConfig, PlacedBubble, build, load_records};
use tracing::{info, warn};

mod interaction;
mod render_utils;
mod ui;
mod view;

#[derive(Clone, Debug)]
pub enum DataSource {
    Demo,
    File(PathBuf),
}

impl DataSource {
    fn label(&self) -> String {
        match self {
            Self::Demo => DEMO_LABEL.to_owned(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ViewerOptions {
    pub source: DataSource,
    pub initial_focus: Option<String>,
    pub pack_config: PackConfig,
}

struct LoadedDataset {
    label: String,
    tree: BubbleTree,
}

type LoadResult = Result<LoadedDataset, String>;

pub struct BubbleApp {
    options: ViewerOptions,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    dataset_label: String,
    tree: BubbleTree,
    focus: FocusState,
    pack_config: PackConfig,
    search: String,
    pan: Vec2,
    zoom: f32,
    hovered: Option<NodeId>,
    layout_cache: Option<LayoutCache>,
    search_match_cache: Option<SearchMatchCache>,
}

struct LayoutCache {
    focus: NodeId,
    side: f32,
    bubbles: Vec<PlacedBubble>,
}

struct SearchMatchCache {
    query: String,
    matches: Arc<Vec<NodeId>>,
}

fn load_dataset(source: &DataSource) -> Result<LoadedDataset> {
    let records = match source {
        DataSource::Demo => demo_records().context("embedded demo dataset is invalid")?,
        DataSource::File(path) => load_records(path)?,
    };
    let tree = build(&records).context("failed to build hierarchy from records")?;
    info!(
        source = %source.label(),
        nodes = tree.len(),
        orphans = tree.orphans().len(),
        "loaded dataset"
    );

    Ok(LoadedDataset {
        label: source.label(),
        tree,
    })
}

impl BubbleApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, options: ViewerOptions) -> Self {
        let state = Self::start_load(options.source.clone());
        Self {
            options,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(source: DataSource) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_dataset(&source).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(source: DataSource) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(source),
        }
    }

    fn ready_state(&self, dataset: LoadedDataset) -> AppState {
        let mut model = ViewModel::new(
            dataset.label,
            dataset.tree,
            self.options.pack_config.clone(),
        );

        // Reloads keep the current place.
        if let AppState::Ready(previous) = &self.state {
            model.focus = previous.focus.carry_over(&previous.tree, &model.tree);
            model.search = previous.search.clone();
            info!(
                focus = %model.tree.node(model.focus.focus).lineage_id,
                "kept focus across reload"
            );
            return AppState::Ready(Box::new(model));
        }

        if let Some(name) = &self.options.initial_focus {
            match model.tree.find(name) {
                Some(target) => model.focus = model.focus.focus_on(&model.tree, target),
                None => warn!(name = %name, "initial focus not found; starting at root view"),
            }
        }
        AppState::Ready(Box::new(model))
    }
}

impl eframe::App for BubbleApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let mut retry = false;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => transition = Some(result),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading bubble records...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load bubble records");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        retry = true;
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.options.source.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => transition = Some(result),
                        Err(TryRecvError::Empty) => {
                            ctx.request_repaint();
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(Err("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if retry {
            self.state = Self::start_load(self.options.source.clone());
            return;
        }

        if let Some(result) = transition {
            self.reload_rx = None;
            self.state = match result {
                Ok(dataset) => self.ready_state(dataset),
                Err(error) => {
                    warn!(%error, "dataset load failed");
                    AppState::Error(error)
                }
            };
        }
    }
}
