//! rimlight-capture — live monitor frames for the Rimlight sampler.
//!
//! # Architecture
//!
//! ```text
//! ashpd portal ──► PipeWire node_id + remote_fd
//!                          │
//!                          ▼
//!            pipewiresrc(fd=X, path=Y)
//!                          │
//!        videoconvert → videoscale → videorate
//!                          │
//!        video/x-raw,format=RGB,W×H@fps
//!                          │
//!                       appsink ─────► tokio channel ──► next_frame()
//! ```
//!
//! The portal shows the desktop's screen-share permission dialog; the
//! pipeline then downscales the chosen monitor to the profile geometry and
//! retimes it to the requested cadence, so the sampler always sees RGB24
//! buffers of exactly `geometry.byte_len()` bytes.
//!
//! # Usage
//!
//! ```rust,no_run
//! # async fn example() -> anyhow::Result<()> {
//! use rimlight_capture::MonitorCapturer;
//! use rimlight_core::CaptureProfile;
//!
//! let mut capturer = MonitorCapturer::open(CaptureProfile::default()).await?;
//! while let Some(frame) = capturer.next_frame().await {
//!     // frame.data: RGB24 bytes, row-major, top-left origin
//! }
//! # Ok(())
//! # }
//! ```

use anyhow::Result;
use bytes::Bytes;
use rimlight_core::{CaptureProfile, FrameGeometry};
#[cfg(not(target_os = "linux"))]
use tracing::warn;

// ── Public types ──────────────────────────────────────────────────────────────

/// One decoded RGB24 frame, scaled to the profile geometry.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    /// Pixel data — RGB24 (3 bytes per pixel), row-major, top-left origin.
    /// Always exactly `geometry.byte_len()` bytes; shorter or longer buffers
    /// are dropped at the capture boundary.
    pub data: Bytes,
    /// Presentation timestamp in milliseconds.
    pub pts_ms: u64,
    /// Frame dimensions (matches the capture profile).
    pub geometry: FrameGeometry,
}

// ── MonitorCapturer ───────────────────────────────────────────────────────────

/// Screen capturer handle. Open with [`MonitorCapturer::open`].
pub struct MonitorCapturer {
    profile: CaptureProfile,
    #[cfg(target_os = "linux")]
    inner: linux::LinuxCapturer,
}

impl MonitorCapturer {
    /// Open a PipeWire screen-capture session for one monitor.
    ///
    /// On Wayland this shows an XDG portal permission dialog.
    /// Requires `xdg-desktop-portal` + a backend (`-wlr`, `-gnome`, `-kde`)
    /// running.
    pub async fn open(profile: CaptureProfile) -> Result<Self> {
        profile.validate()?;
        #[cfg(target_os = "linux")]
        {
            let inner = linux::LinuxCapturer::open(profile.clone()).await?;
            Ok(Self { profile, inner })
        }
        #[cfg(not(target_os = "linux"))]
        {
            warn!("MonitorCapturer::open — non-Linux platform, stub capturer");
            Ok(Self { profile })
        }
    }

    /// Await the next captured frame. Returns `None` when the session ends.
    pub async fn next_frame(&mut self) -> Option<CapturedFrame> {
        #[cfg(target_os = "linux")]
        return self.inner.next_frame().await;
        #[cfg(not(target_os = "linux"))]
        {
            warn!("MonitorCapturer::next_frame — stub, no frames produced");
            None
        }
    }

    /// Active capture profile.
    pub fn profile(&self) -> &CaptureProfile {
        &self.profile
    }
}

// ── Linux implementation (PipeWire portal + GStreamer) ────────────────────────

#[cfg(target_os = "linux")]
mod linux {
    use super::CapturedFrame;

    use std::os::unix::io::IntoRawFd;

    use anyhow::Context;
    use ashpd::desktop::screencast::{CursorMode, Screencast, SourceType};
    use ashpd::desktop::PersistMode;
    use ashpd::WindowIdentifier;
    use bytes::Bytes;
    use gstreamer::prelude::*;
    use gstreamer_app::{AppSink, AppSinkCallbacks};
    use gstreamer_video::VideoInfo;
    use rimlight_core::CaptureProfile;
    use tokio::sync::mpsc;
    use tracing::{debug, error, info, warn};

    // ── Public handle ─────────────────────────────────────────────────────────

    pub(super) struct LinuxCapturer {
        frame_rx:     mpsc::Receiver<CapturedFrame>,
        _pipeline:    gstreamer::Pipeline,
        _bus_watcher: tokio::task::JoinHandle<()>,
    }

    impl LinuxCapturer {
        pub(super) async fn open(profile: CaptureProfile) -> anyhow::Result<Self> {
            gstreamer::init().context("GStreamer init")?;

            let (node_id, fd_raw) = negotiate_portal().await?;
            info!("PipeWire portal ok: node_id={} fd={}", node_id, fd_raw);

            let (pipeline, frame_rx) = build_pipeline(&profile, fd_raw, node_id)?;
            pipeline
                .set_state(gstreamer::State::Playing)
                .context("GStreamer set Playing")?;

            // Watch the bus for errors / EOS in a background task.
            let pipeline_weak = pipeline.downgrade();
            let bus_watcher = tokio::spawn(async move {
                let Some(pl) = pipeline_weak.upgrade() else { return };
                let Some(bus) = pl.bus() else { return };
                loop {
                    match bus.timed_pop(gstreamer::ClockTime::from_seconds(1)) {
                        Some(msg) => match msg.view() {
                            gstreamer::MessageView::Eos(_) => {
                                info!("capture pipeline EOS");
                                break;
                            }
                            gstreamer::MessageView::Error(e) => {
                                error!("capture pipeline error: {}", e.error());
                                break;
                            }
                            _ => {}
                        },
                        None => {} // poll timeout — keep looping
                    }
                }
                let _ = pl.set_state(gstreamer::State::Null);
            });

            Ok(Self { frame_rx, _pipeline: pipeline, _bus_watcher: bus_watcher })
        }

        pub(super) async fn next_frame(&mut self) -> Option<CapturedFrame> {
            self.frame_rx.recv().await
        }
    }

    // ── Portal negotiation ────────────────────────────────────────────────────

    /// Ask the XDG desktop portal for a PipeWire monitor stream.
    /// Returns `(node_id, raw_fd)`.
    async fn negotiate_portal() -> anyhow::Result<(u32, i32)> {
        let proxy = Screencast::new().await.context("ScreenCast portal")?;

        let session = proxy
            .create_session()
            .await
            .context("create_session")?;

        proxy
            .select_sources(
                &session,
                CursorMode::Embedded, // cursor baked into the frame
                SourceType::Monitor.into(),
                false, // multiple
                None,  // restore_token
                PersistMode::DoNot,
            )
            .await
            .context("select_sources")?;

        let response = proxy
            .start(&session, &WindowIdentifier::default())
            .await
            .context("portal start")?
            .response()
            .context("portal denied")?;

        let streams: Vec<_> = response.streams().to_vec();
        if streams.is_empty() {
            anyhow::bail!("No PipeWire streams returned by portal");
        }
        let node_id = streams[0].pipe_wire_node_id();

        let fd = proxy
            .open_pipe_wire_remote(&session)
            .await
            .context("open_pipe_wire_remote")?;
        let fd_raw = fd.into_raw_fd();

        Ok((node_id, fd_raw))
    }

    // ── GStreamer pipeline ────────────────────────────────────────────────────

    fn build_pipeline(
        profile: &CaptureProfile,
        fd: i32,
        node_id: u32,
    ) -> anyhow::Result<(gstreamer::Pipeline, mpsc::Receiver<CapturedFrame>)> {
        let geometry = profile.geometry();
        let w   = geometry.width;
        let h   = geometry.height;
        let fps = profile.target_fps;

        // videoscale + videorate bring any monitor resolution/refresh down to
        // the fixed sampler geometry and cadence; the caps filter pins RGB24.
        let desc = format!(
            "pipewiresrc fd={fd} path={node_id} do-timestamp=true \
             ! videoconvert \
             ! videoscale \
             ! videorate \
             ! video/x-raw,format=RGB,width={w},height={h},framerate={fps}/1 \
             ! appsink name=sink max-buffers=1 drop=true sync=false emit-signals=false"
        );
        debug!("capture pipeline: {}", desc);

        let pipeline = gstreamer::parse::launch(&desc)
            .context("Parsing capture pipeline")?
            .downcast::<gstreamer::Pipeline>()
            .map_err(|_| anyhow::anyhow!("Expected Pipeline element"))?;

        let appsink: AppSink = pipeline
            .by_name("sink")
            .context("Finding appsink 'sink'")?
            .downcast::<AppSink>()
            .map_err(|_| anyhow::anyhow!("Expected AppSink"))?;

        let (frame_tx, frame_rx) = mpsc::channel::<CapturedFrame>(4);
        let expected_len = geometry.byte_len();

        appsink.set_callbacks(
            AppSinkCallbacks::builder()
                .new_sample(move |sink| {
                    let sample = sink.pull_sample().map_err(|_| gstreamer::FlowError::Eos)?;

                    // Double-check the negotiated caps really are our RGB24
                    // geometry before trusting the buffer length.
                    if let Some(caps) = sample.caps() {
                        match VideoInfo::from_caps(caps) {
                            Ok(info)
                                if info.format() == gstreamer_video::VideoFormat::Rgb
                                    && info.width() == w
                                    && info.height() == h => {}
                            Ok(info) => {
                                warn!(
                                    "dropping frame with unexpected caps: {:?} {}×{}",
                                    info.format(),
                                    info.width(),
                                    info.height()
                                );
                                return Ok(gstreamer::FlowSuccess::Ok);
                            }
                            Err(_) => return Err(gstreamer::FlowError::NotNegotiated),
                        }
                    }

                    let buffer = sample.buffer().ok_or(gstreamer::FlowError::Error)?;
                    let pts_ms = buffer.pts().map(|t| t.mseconds()).unwrap_or(0);
                    let map    = buffer.map_readable().map_err(|_| gstreamer::FlowError::Error)?;

                    // Contract with the sampler: exactly W×H×3 bytes.
                    if map.len() != expected_len {
                        warn!(
                            "dropping frame of {} bytes, expected {}",
                            map.len(),
                            expected_len
                        );
                        return Ok(gstreamer::FlowSuccess::Ok);
                    }

                    let frame = CapturedFrame {
                        data: Bytes::copy_from_slice(map.as_slice()),
                        pts_ms,
                        geometry,
                    };

                    if frame_tx.blocking_send(frame).is_err() {
                        return Err(gstreamer::FlowError::Flushing);
                    }
                    Ok(gstreamer::FlowSuccess::Ok)
                })
                .build(),
        );

        Ok((pipeline, frame_rx))
    }
}
