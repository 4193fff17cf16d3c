mod cli;
mod commands;
mod config;
mod load;
mod report;

use clap::Parser;
use config::{CliOverrides, ResolvedRunConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("canvas_compare=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Init { force } => {
            commands::init(force)?;
        }
        cli::Command::Compare {
            base,
            target,
            output,
            json,
            engine,
            params,
        } => {
            let overrides = CliOverrides {
                params,
                engine,
                ..Default::default()
            };
            let config = ResolvedRunConfig::new(overrides)?;
            commands::compare(config, &base, &target, output.as_deref(), json).await?;
        }
        cli::Command::Watch {
            frame,
            interval_ms,
            movement_gate,
            max_frames,
            engine,
            params,
        } => {
            let overrides = CliOverrides {
                params,
                engine,
                interval_ms,
                movement_gate,
            };
            let config = ResolvedRunConfig::new(overrides)?;
            commands::watch(config, &frame, max_frames).await?;
        }
    }

    Ok(())
}
