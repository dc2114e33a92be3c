//! # Garment Studio
//!
//! Replays a scripted design session and prints the design document.

use clap::Parser;
use studio_cli::{replay, CliArgs, Script, StudioConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("garment_studio=info,studio_core=debug"));

    // Logs go to stderr so stdout carries only the document
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    // Use JSON format in production (RUST_LOG_FORMAT=json)
    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let config = StudioConfig::from(args);

    tracing::info!(
        script = %config.script.display(),
        width = config.canvas_width,
        height = config.canvas_height,
        zoom = config.zoom,
        "Starting Garment Studio"
    );

    let script = Script::from_path(&config.script)?;
    let composition = replay(&config, &script)?;

    let document = composition.to_document();
    let json = if config.pretty {
        document.to_json_pretty()?
    } else {
        document.to_json()?
    };
    println!("{json}");

    tracing::info!(
        elements = document.elements.len(),
        strokes = document.strokes.len(),
        vector_paths = document.vector_paths.len(),
        "Design document written"
    );
    Ok(())
}
