// src/main.rs
use anyhow::{Context, Result};
use tracing::error;

use gesture_control::recorder::EventRecorder;
use gesture_control::session::Session;
use gesture_control::{open_source, Config, Controller};

fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let registry = config.registry().context("Invalid mode bindings")?;
    let controller = Controller::new(config.thresholds(), registry);
    let recorder = config
        .record_events
        .then(|| EventRecorder::new(&config.output_directory, None));

    let mut source = open_source(&config)?;
    Session::new(controller, recorder).run(source.as_mut())
}
