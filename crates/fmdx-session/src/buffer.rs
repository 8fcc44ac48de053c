//! Buffer profiles and live pipeline reconfiguration.
//!
//! A pipeline's buffering parameters are fixed at construction, so applying
//! new settings means building a replacement and moving playback over to it:
//!
//! ```text
//!   lock ─ compute profile ─ same? ── unlock
//!                │
//!                └─ capture old (queue, index, position, play intent)
//!                   build new(profile) ─ seed ─ prepare ─ set intent
//!                   substitute ─ release old ─ play if it was playing ─ unlock
//! ```
//!
//! The reconfiguration lock also guards every read-then-write on the active
//! pipeline made on behalf of the session (toggle, restart, stop).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use fmdx_proto::settings::Settings;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::collab::{AudioPipeline, PipelineFactory, PlaybackReporter};
use crate::error::{Result, SessionError};

/// Upper bound for network-side buffering, in chunks.
pub const MAX_NETWORK_CHUNKS: u32 = 16;
/// Floor applied to the player buffer setting.
pub const MIN_PLAYER_BUFFER_MS: u32 = 500;
/// Ceiling applied to the player buffer setting.
pub const MAX_PLAYER_BUFFER_MS: u32 = 60_000;
/// Lowest start threshold a profile will ever carry.
pub const MIN_PLAYBACK_START_MS: u32 = 250;

/// Timing parameters for a streaming pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferProfile {
    pub network_chunks: u32,
    pub min_buffer_ms: u32,
    pub max_buffer_ms: u32,
    pub playback_start_ms: u32,
    pub playback_after_rebuffer_ms: u32,
}

impl BufferProfile {
    /// Pure and deterministic.  `max_buffer_ms > min_buffer_ms` and
    /// `playback_start_ms >= 250` hold for every input.
    pub fn compute(network_chunks: u32, player_buffer_ms: u32) -> Self {
        let network_chunks = network_chunks.clamp(1, MAX_NETWORK_CHUNKS);
        let base = player_buffer_ms.clamp(MIN_PLAYER_BUFFER_MS, MAX_PLAYER_BUFFER_MS);
        Self {
            network_chunks,
            min_buffer_ms: base,
            max_buffer_ms: (base * 2).max(base + 300),
            playback_start_ms: (base / 2).max(MIN_PLAYBACK_START_MS),
            playback_after_rebuffer_ms: base,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::compute(settings.network_buffer_chunks, settings.player_buffer_ms)
    }
}

struct ActivePipeline {
    pipeline: Box<dyn AudioPipeline>,
    profile: BufferProfile,
}

/// Owns the active audio pipeline and swaps it when buffer settings change.
pub struct BufferReconfigurator {
    factory: Arc<dyn PipelineFactory>,
    /// The reconfiguration lock.  Held across capture, build, substitute and
    /// release so two swaps never race on the same pipeline.
    active: Mutex<ActivePipeline>,
    reporter: PlaybackReporter,
    swaps: AtomicU64,
}

impl BufferReconfigurator {
    /// Build the initial pipeline from `settings`.
    pub fn new(factory: Arc<dyn PipelineFactory>, settings: &Settings) -> anyhow::Result<Self> {
        let (reporter, _) = PlaybackReporter::new();
        let profile = BufferProfile::from_settings(settings);
        let pipeline = factory.build(&profile, reporter.clone())?;
        info!("audio: initial profile {:?}", profile);
        Ok(Self {
            factory,
            active: Mutex::new(ActivePipeline { pipeline, profile }),
            reporter,
            swaps: AtomicU64::new(0),
        })
    }

    /// Play-state reports from whichever pipeline is active.
    pub fn subscribe_playing(&self) -> watch::Receiver<bool> {
        self.reporter.subscribe()
    }

    pub async fn profile(&self) -> BufferProfile {
        self.active.lock().await.profile
    }

    /// Number of pipeline substitutions performed so far.
    pub fn swap_count(&self) -> u64 {
        self.swaps.load(Ordering::Relaxed)
    }

    /// Apply new buffer settings.  Returns `true` when a new pipeline was
    /// swapped in, `false` when the profile did not change.
    ///
    /// On failure the previous pipeline stays active and untouched.
    pub async fn apply_settings(&self, settings: &Settings) -> Result<bool> {
        let mut active = self.active.lock().await;
        let profile = BufferProfile::from_settings(settings);
        if profile == active.profile {
            debug!("audio: profile unchanged, no swap");
            return Ok(false);
        }

        let snapshot = active.pipeline.snapshot();
        let mut fresh = self
            .factory
            .build(&profile, self.reporter.clone())
            .map_err(|e| SessionError::ReconfigFailure(e.to_string()))?;

        if let Err(e) = fresh.seed(&snapshot).await {
            fresh.release();
            return Err(SessionError::ReconfigFailure(e.to_string()));
        }
        if let Err(e) = fresh.prepare().await {
            fresh.release();
            return Err(SessionError::ReconfigFailure(e.to_string()));
        }
        fresh.set_play_when_ready(snapshot.playing);

        let mut old = std::mem::replace(&mut active.pipeline, fresh);
        active.profile = profile;
        old.release();
        self.swaps.fetch_add(1, Ordering::Relaxed);

        if snapshot.playing {
            if let Err(e) = active.pipeline.play().await {
                warn!("audio: swapped pipeline refused to start: {}", e);
            }
        }
        info!(
            "audio: swapped pipeline to {:?} (position {}ms, playing {})",
            profile, snapshot.position_ms, snapshot.playing
        );
        Ok(true)
    }

    /// Point the pipeline at `uri` again and re-prepare it.  Playback resumes
    /// if it was playing before or `force_play` is set.
    pub async fn restart_stream(&self, uri: &str, force_play: bool) -> anyhow::Result<()> {
        let mut active = self.active.lock().await;
        Self::restart_locked(&mut active, uri, force_play).await
    }

    /// Pause if playing, otherwise (re)prepare `uri` and play.  Decided on the
    /// pipeline's own reported state, never on a cached flag.
    pub async fn toggle(&self, uri: &str) -> anyhow::Result<()> {
        let mut active = self.active.lock().await;
        if active.pipeline.is_playing() {
            debug!("audio: pausing");
            active.pipeline.pause().await
        } else {
            debug!("audio: starting {}", uri);
            Self::restart_locked(&mut active, uri, true).await
        }
    }

    pub async fn is_playing(&self) -> bool {
        self.active.lock().await.pipeline.is_playing()
    }

    /// Stop playback and drop the queued sources.
    pub async fn stop_and_clear(&self) {
        let mut active = self.active.lock().await;
        active.pipeline.stop().await;
        active.pipeline.clear_sources();
    }

    async fn restart_locked(
        active: &mut ActivePipeline,
        uri: &str,
        force_play: bool,
    ) -> anyhow::Result<()> {
        let was_playing = active.pipeline.is_playing();
        active.pipeline.set_source(uri).await?;
        active.pipeline.prepare().await?;
        if was_playing || force_play {
            active.pipeline.play().await?;
        }
        Ok(())
    }
}
