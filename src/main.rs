use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use screw_counter::{HttpDetectionClient, config, headless, telemetry};

#[derive(Parser)]
#[command(name = "screw-counter")]
#[command(about = "Count objects in images with a remote detection service")]
struct Cli {
    /// Detection endpoint URL (overrides configuration)
    #[arg(long, global = true, value_name = "URL")]
    endpoint: Option<String>,

    /// Minimum log level: debug, info, warn or error
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Open the upload window (default)
    Gui,
    /// Submit one image and print the per-class counts
    Detect {
        /// Path to input image file
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,

        /// Write the annotated JPEG returned by the service to this path
        #[arg(long, value_name = "PATH")]
        annotated_out: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let mut config = config::get_configuration().context("failed to load configuration")?;
    config
        .apply_overrides(args.endpoint, args.log_level)
        .map_err(anyhow::Error::msg)?;

    telemetry::init_subscriber(config.log_level, args.json_logs);

    let client = HttpDetectionClient::from_config(&config.detection_service)?;
    tracing::info!(endpoint = client.endpoint(), "detection service configured");

    match args.command.unwrap_or(Command::Gui) {
        Command::Gui => run_gui(client),
        Command::Detect {
            image_path,
            annotated_out,
        } => {
            let runtime = tokio::runtime::Runtime::new()?;
            let lines = runtime.block_on(headless::detect_once(
                &client,
                &image_path,
                annotated_out.as_deref(),
            ))?;
            for line in lines {
                println!("{line}");
            }
            Ok(())
        }
    }
}

#[cfg(feature = "gui")]
fn run_gui(client: HttpDetectionClient) -> anyhow::Result<()> {
    screw_counter::gui::run(client)?;
    Ok(())
}

#[cfg(not(feature = "gui"))]
fn run_gui(_client: HttpDetectionClient) -> anyhow::Result<()> {
    anyhow::bail!("built without the `gui` feature; use `screw-counter detect <IMAGE>` instead")
}
