mod app;

use std::path::PathBuf;

use clap::Parser;
use radial_bubbles::PackConfig;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, fmt};

use app::{BubbleApp, DataSource, ViewerOptions};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON record file; the built-in demo dataset is used when omitted
    #[arg(long)]
    data: Option<PathBuf>,

    /// Name of the record to focus on start
    #[arg(long)]
    focus: Option<String>,

    /// Grandchild shrink-and-recompute passes per child
    #[arg(long, default_value_t = 1)]
    relaxation_passes: usize,

    /// Verbosity: -d info, -dd debug, -ddd trace
    #[arg(short = 'd', long = "debug", action = clap::ArgAction::Count)]
    debug: u8,
}

impl Args {
    fn viewer_options(&self) -> ViewerOptions {
        ViewerOptions {
            source: self
                .data
                .clone()
                .map(DataSource::File)
                .unwrap_or(DataSource::Demo),
            initial_focus: self.focus.clone(),
            pack_config: PackConfig {
                relaxation_passes: self.relaxation_passes,
                ..PackConfig::default()
            },
        }
    }
}

fn verbosity_filter(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Windowing and GL backends log every frame at debug and trace.
const NOISY_TARGETS: [&str; 5] = ["winit", "calloop", "sctk", "egui_glow", "glutin"];

fn is_noisy(target: &str) -> bool {
    NOISY_TARGETS.iter().any(|name| target.starts_with(name))
}

fn setup_logging(verbosity: u8) {
    let filter = verbosity_filter(verbosity);
    let module_filter = filter_fn(|metadata| {
        !is_noisy(metadata.target()) || *metadata.level() <= tracing::Level::WARN
    });

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter).with_filter(module_filter))
        .init();
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();
    setup_logging(args.debug);

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1320.0, 880.0]),
        ..Default::default()
    };
    let viewer_options = args.viewer_options();

    eframe::run_native(
        "radial-bubbles",
        options,
        Box::new(move |cc| Ok(Box::new(BubbleApp::new(cc, viewer_options)))),
    )
}
