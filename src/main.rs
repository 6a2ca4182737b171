use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use wheel_gallery::config::Configuration;
use wheel_gallery::events::{GalleryCommand, GalleryEvent, WheelGesture};
use wheel_gallery::input::Input;
use wheel_gallery::sources::ImageSource;
use wheel_gallery::tasks;
use wheel_gallery::thumbnails::ThumbnailStrip;

#[derive(Debug, Parser)]
#[command(
    name = "wheel-gallery",
    version,
    about = "Pick images from a gallery by turning a wheel"
)]
struct Args {
    /// Path to YAML config (defaults apply when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,
    /// Write background.png and strip.png into this directory
    #[arg(long = "output-dir", value_name = "DIR")]
    output_dir: Option<PathBuf>,
    /// Override `random-seed` from the configuration
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,
    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) {
    // RUST_LOG wins; otherwise map -v to a level
    let default = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let Args {
        config,
        output_dir,
        seed,
        verbose,
    } = Args::parse();
    init_tracing(verbose);

    let cfg = match &config {
        Some(path) => Configuration::from_yaml_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Configuration::default(),
    }
    .validated()
    .context("invalid configuration values")?;
    tracing::debug!("configuration:\n{:#?}", cfg);

    let seed = seed.or(cfg.random_seed);
    let source = ImageSource::from_config(&cfg)?;
    tracing::info!(source = ?source.kind(), "image source ready");

    // Channels (small/bounded)
    let (gesture_tx, gesture_rx) = mpsc::channel::<WheelGesture>(16); // Input -> Wheel
    let (command_tx, command_rx) = mpsc::channel::<GalleryCommand>(32); // Input/Wheel -> Gallery
    let (event_tx, event_rx) = mpsc::channel::<GalleryEvent>(32); // Gallery -> Presenter

    let cancel = CancellationToken::new();

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!("ctrl-c handler failed: {err}");
                return;
            }
            tracing::info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    // Stdin reader: one command per line. EOF lets outstanding work drain,
    // `quit` cancels. Not a blocking-pool task: a pending read would stall
    // runtime shutdown.
    {
        let cancel = cancel.clone();
        let gestures = gesture_tx;
        let commands = command_tx.clone();
        std::thread::Builder::new()
            .name("stdin-input".into())
            .spawn(move || {
                for line in io::stdin().lock().lines() {
                    let line = match line {
                        Ok(line) => line,
                        Err(err) => {
                            tracing::warn!("stdin read failed: {err}");
                            break;
                        }
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    let delivered = match line.parse::<Input>() {
                        Ok(Input::Gesture(gesture)) => gestures.blocking_send(gesture).is_ok(),
                        Ok(Input::Load) => {
                            commands.blocking_send(GalleryCommand::LoadImages).is_ok()
                        }
                        Ok(Input::Quit) => {
                            cancel.cancel();
                            break;
                        }
                        Err(err) => {
                            tracing::warn!("{err}");
                            true
                        }
                    };
                    if !delivered || cancel.is_cancelled() {
                        break;
                    }
                }
                tracing::info!("input closed; finishing outstanding work");
            })
            .context("failed to spawn stdin reader")?;
    }

    let mut tasks = JoinSet::new();

    // Wheel
    tasks.spawn({
        let to_gallery = command_tx.clone();
        let options = cfg.wheel.clone();
        let cancel = cancel.clone();
        async move {
            tasks::wheel::run(gesture_rx, to_gallery, options, seed, cancel)
                .await
                .context("wheel task failed")
        }
    });

    // Gallery
    tasks.spawn({
        let options = cfg.gallery.clone();
        let cancel = cancel.clone();
        async move {
            tasks::gallery::run(source, options, seed, command_rx, event_tx, cancel)
                .await
                .context("gallery task failed")
        }
    });
    drop(command_tx);

    // Presenter
    tasks.spawn({
        let strip = ThumbnailStrip::from_options(&cfg.thumbnails);
        let cancel = cancel.clone();
        async move {
            tasks::presenter::run(event_rx, strip, output_dir, cancel)
                .await
                .context("presenter task failed")
        }
    });

    // Drain JoinSet; a failing task stops the rest
    while let Some(res) = tasks.join_next().await {
        match res {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::error!("task error: {e:?}");
                cancel.cancel();
            }
            Err(e) => {
                tracing::error!("join error: {e}");
                cancel.cancel();
            }
        }
    }

    Ok(())
}
