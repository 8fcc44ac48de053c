//! Seams to the outside world.
//!
//! The session layer never speaks a wire protocol itself.  Everything it
//! needs from the tuner server or the audio stack goes through the traits
//! below, which hand back already-decoded data.

use std::sync::Arc;

use async_trait::async_trait;
use fmdx_proto::model::{SpectrumPoint, TunerInfo, TunerState};
use tokio::sync::{mpsc, watch};

use crate::buffer::BufferProfile;

// ── tuner endpoints ───────────────────────────────────────────────────────────

/// Unsolicited traffic from the control connection.
#[derive(Debug, Clone)]
pub enum ControlEvent {
    State(TunerState),
    Closed,
    Error(String),
}

#[async_trait]
pub trait InfoFetcher: Send + Sync {
    async fn fetch_info(&self, endpoint: &str, identity: &str) -> anyhow::Result<TunerInfo>;
}

/// Open side of the control connection.
#[async_trait]
pub trait ControlHandle: Send + Sync {
    async fn send(&self, command: &str) -> anyhow::Result<()>;
    /// Must be idempotent; closing a closed handle is a no-op.
    fn close(&self);
}

#[async_trait]
pub trait ControlConnector: Send + Sync {
    /// Open the control connection.  Decoded pushes, closure and errors are
    /// delivered on `events` in receipt order.
    async fn open(
        &self,
        endpoint: &str,
        identity: &str,
        events: mpsc::Sender<ControlEvent>,
    ) -> anyhow::Result<Arc<dyn ControlHandle>>;
}

/// Side channel used to kick off a server-side spectrum sweep.
#[async_trait]
pub trait ScanChannel: Send + Sync {
    async fn trigger_scan(&self) -> anyhow::Result<()>;
    fn close(&self);
}

#[async_trait]
pub trait ScanConnector: Send + Sync {
    /// Errors seen on the open channel are reported as plain messages.
    async fn open(
        &self,
        endpoint: &str,
        identity: &str,
        errors: mpsc::Sender<String>,
    ) -> anyhow::Result<Arc<dyn ScanChannel>>;
}

#[async_trait]
pub trait SpectrumFetcher: Send + Sync {
    /// An empty result means the server has nothing (yet).
    async fn fetch_spectrum(
        &self,
        endpoint: &str,
        identity: &str,
    ) -> anyhow::Result<Vec<SpectrumPoint>>;
}

// ── audio pipeline ────────────────────────────────────────────────────────────

/// Everything needed to carry playback across a pipeline swap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackSnapshot {
    pub sources: Vec<String>,
    pub index: usize,
    pub position_ms: u64,
    /// Play intent (not necessarily audible yet, e.g. while buffering).
    pub playing: bool,
}

/// A streaming player.  The buffer profile is fixed when the instance is
/// built; changing it means building a new one.
#[async_trait]
pub trait AudioPipeline: Send {
    /// Replace the queue with a single source.
    async fn set_source(&mut self, uri: &str) -> anyhow::Result<()>;
    /// Load a captured queue and seek to the captured position.
    async fn seed(&mut self, snapshot: &PlaybackSnapshot) -> anyhow::Result<()>;
    async fn prepare(&mut self) -> anyhow::Result<()>;
    fn set_play_when_ready(&mut self, play: bool);
    async fn play(&mut self) -> anyhow::Result<()>;
    async fn pause(&mut self) -> anyhow::Result<()>;
    async fn stop(&mut self);
    fn clear_sources(&mut self);
    fn is_playing(&self) -> bool;
    fn snapshot(&self) -> PlaybackSnapshot;
    /// Free the underlying resources.  A released pipeline reports nothing.
    fn release(&mut self);
}

pub trait PipelineFactory: Send + Sync {
    fn build(
        &self,
        profile: &BufferProfile,
        reporter: PlaybackReporter,
    ) -> anyhow::Result<Box<dyn AudioPipeline>>;
}

/// Given to each pipeline so it can report play/pause transitions,
/// including ones it was not asked for (audio focus loss, stalls).
#[derive(Clone)]
pub struct PlaybackReporter {
    tx: Arc<watch::Sender<bool>>,
}

impl PlaybackReporter {
    pub fn new() -> (Self, watch::Receiver<bool>) {
        let (tx, rx) = watch::channel(false);
        (Self { tx: Arc::new(tx) }, rx)
    }

    pub fn report(&self, playing: bool) {
        self.tx.send_if_modified(|current| {
            let changed = *current != playing;
            *current = playing;
            changed
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}
