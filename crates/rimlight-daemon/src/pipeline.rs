//! `SamplerPipeline` — the capture → sample → publish loop.
//!
//! ```text
//! PipeWire portal → MonitorCapturer → PerimeterSampler → SampleFeed (1-slot)
//! ```
//!
//! One pipeline per capture session. The task owns the reused
//! [`SampleSequence`] and overwrites it in place each frame; consumers only
//! ever see complete sequences through the feed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rimlight_capture::MonitorCapturer;
use rimlight_core::CaptureProfile;
use rimlight_sampler::{PerimeterSampler, SampleSequence};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::feed::SampleFeed;

// ── SamplerPipeline ───────────────────────────────────────────────────────────

/// Handle to a running sampler pipeline task.
pub struct SamplerPipeline {
    /// Send a `()` to request graceful shutdown.
    pub stop_tx: mpsc::Sender<()>,
    /// Frames sampled so far (shared with the pipeline task).
    pub frames_processed: Arc<AtomicU64>,
}

impl SamplerPipeline {
    /// Spawn the capture → sample → publish task.
    ///
    /// Runs until the capture session ends or `stop()` is called; the portal
    /// permission dialog appears during startup.
    pub fn spawn(profile: CaptureProfile, feed: SampleFeed) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel::<()>(1);
        let frames_processed = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&frames_processed);

        tokio::spawn(run_pipeline(profile, stop_rx, feed, counter));

        Self { stop_tx, frames_processed }
    }

    /// Request graceful stop (non-blocking).
    pub fn stop(&self) {
        let _ = self.stop_tx.try_send(());
    }

    /// Total frames sampled so far.
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed.load(Ordering::Relaxed)
    }
}

// ── Pipeline task ─────────────────────────────────────────────────────────────

async fn run_pipeline(
    profile: CaptureProfile,
    mut stop_rx: mpsc::Receiver<()>,
    feed: SampleFeed,
    frames_processed: Arc<AtomicU64>,
) {
    let sampler = match PerimeterSampler::new(profile.geometry(), profile.depth) {
        Ok(s) => s,
        Err(e) => {
            warn!("invalid sampler profile: {:#}", e);
            return;
        }
    };
    info!(
        "sampling {} at depth {} → {} border samples @ {} fps",
        profile.geometry(),
        profile.depth,
        sampler.sample_count(),
        profile.target_fps
    );

    let mut capturer = match MonitorCapturer::open(profile.clone()).await {
        Ok(c) => c,
        Err(e) => {
            warn!("capture open failed: {:#}", e);
            return;
        }
    };

    let mut sequence = SampleSequence::new(sampler.sample_count());
    let mut status_ticker = tokio::time::interval(Duration::from_secs(1));
    let mut fps_counter = FpsCounter::new();

    loop {
        tokio::select! {
            // Stop requested
            _ = stop_rx.recv() => {
                info!("pipeline stop requested");
                break;
            }

            // Sample the next frame and publish the ring
            maybe_frame = capturer.next_frame() => {
                let Some(frame) = maybe_frame else {
                    info!("capture session ended");
                    break;
                };
                match sampler.sample_into(&frame.data, &mut sequence) {
                    Ok(()) => {
                        feed.publish(&sequence);
                        frames_processed.fetch_add(1, Ordering::Relaxed);
                        fps_counter.tick();
                    }
                    // Capture validates frame length, so this only fires on a
                    // frame-source contract breach; skip the frame.
                    Err(e) => warn!("frame rejected: {}", e),
                }
            }

            // 1 Hz status
            _ = status_ticker.tick() => {
                let fps = fps_counter.fps();
                if fps > 0.0 {
                    tracing::debug!(
                        "sampling at {:.1} fps ({} frames total)",
                        fps,
                        frames_processed.load(Ordering::Relaxed)
                    );
                }
            }
        }
    }

    info!(
        "pipeline stopped after {} frames",
        frames_processed.load(Ordering::Relaxed)
    );
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Rolling ~1 second FPS counter.
struct FpsCounter {
    count:        u32,
    window_start: std::time::Instant,
    last_fps:     f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self { count: 0, window_start: std::time::Instant::now(), last_fps: 0.0 }
    }

    fn tick(&mut self) {
        self.count += 1;
    }

    /// FPS over the last ~1 second window; resets the counter.
    fn fps(&mut self) -> f32 {
        let elapsed = self.window_start.elapsed().as_secs_f32();
        if elapsed >= 0.5 {
            self.last_fps = self.count as f32 / elapsed;
            self.count = 0;
            self.window_start = std::time::Instant::now();
        }
        self.last_fps
    }
}
