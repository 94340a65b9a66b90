//! Rimlight daemon — ambient border colors from a live screen capture.
//!
//! ```text
//! XDG portal ► PipeWire ► GStreamer (RGB24 256×144@24)
//!                              │
//!                              ▼
//!                     PerimeterSampler
//!                              │
//!                    SampleFeed (1-slot mailbox)
//!                         ┌────┴────┐
//!                         ▼         ▼
//!                  terminal    LED strip driver
//!                  preview     (downstream consumer)
//! ```
//!
//! Usage: `rimlight [profile.json]` — the optional JSON file overrides the
//! default 256×144, depth-2, 24 fps capture profile. Set `RIMLIGHT_PREVIEW=1`
//! to repaint the sample ring in the terminal.

mod feed;
mod pipeline;
mod preview;

use anyhow::{Context, Result};
use rimlight_core::CaptureProfile;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::feed::sample_feed;
use crate::pipeline::SamplerPipeline;

fn load_profile() -> Result<CaptureProfile> {
    let profile = match std::env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading profile {path}"))?;
            serde_json::from_str(&raw).with_context(|| format!("parsing profile {path}"))?
        }
        None => CaptureProfile::default(),
    };
    profile.validate()?;
    Ok(profile)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Rimlight v{}", env!("CARGO_PKG_VERSION"));

    let profile = load_profile()?;
    let (feed, reader) = sample_feed();

    let preview_enabled = std::env::var("RIMLIGHT_PREVIEW").is_ok_and(|v| v == "1");
    if preview_enabled {
        tokio::spawn(preview::run_preview(reader));
    }
    // Additional consumers (an LED strip driver) take `feed.subscribe()`
    // readers here, before the pipeline takes ownership of the feed.

    let pipeline = SamplerPipeline::spawn(profile, feed);

    tokio::signal::ctrl_c().await.context("waiting for ctrl-c")?;
    info!("shutting down");
    pipeline.stop();
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    info!("processed {} frames", pipeline.frames_processed());

    Ok(())
}
