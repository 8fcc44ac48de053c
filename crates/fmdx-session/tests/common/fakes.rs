use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fmdx_proto::model::{SpectrumPoint, TunerInfo};
use fmdx_session::collab::{
    AudioPipeline, ControlConnector, ControlEvent, ControlHandle, InfoFetcher, PipelineFactory,
    PlaybackReporter, PlaybackSnapshot, ScanChannel, ScanConnector, SpectrumFetcher,
};
use fmdx_session::BufferProfile;
use tokio::sync::{mpsc, Semaphore};

// ── info ──────────────────────────────────────────────────────────────────────

pub struct FakeInfo {
    info: Mutex<Result<TunerInfo, String>>,
    calls: AtomicUsize,
    /// When set, each fetch waits for a permit.
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl FakeInfo {
    pub fn new(info: TunerInfo) -> Self {
        Self {
            info: Mutex::new(Ok(info)),
            calls: AtomicUsize::new(0),
            gate: Mutex::new(None),
        }
    }

    pub fn set_info(&self, info: TunerInfo) {
        *self.info.lock().unwrap() = Ok(info);
    }

    pub fn fail_with(&self, message: &str) {
        *self.info.lock().unwrap() = Err(message.to_string());
    }

    /// Hold every fetch until [`FakeInfo::release`] is called.
    pub fn hold(&self) {
        *self.gate.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn release(&self) {
        if let Some(gate) = self.gate.lock().unwrap().as_ref() {
            gate.add_permits(1);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InfoFetcher for FakeInfo {
    async fn fetch_info(&self, _endpoint: &str, _identity: &str) -> anyhow::Result<TunerInfo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await?.forget();
        }
        self.info.lock().unwrap().clone().map_err(anyhow::Error::msg)
    }
}

// ── control ───────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeControl {
    sent: Arc<Mutex<Vec<String>>>,
    events: Mutex<Option<mpsc::Sender<ControlEvent>>>,
    opens: AtomicUsize,
    closes: Arc<AtomicUsize>,
    fail_open: AtomicBool,
}

impl FakeControl {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn fail_open(&self) {
        self.fail_open.store(true, Ordering::SeqCst);
    }

    /// Deliver a server push on the most recently opened connection.
    pub async fn push(&self, event: ControlEvent) -> bool {
        let tx = self.events.lock().unwrap().clone();
        match tx {
            Some(tx) => tx.send(event).await.is_ok(),
            None => false,
        }
    }
}

struct FakeControlHandle {
    sent: Arc<Mutex<Vec<String>>>,
    closes: Arc<AtomicUsize>,
    closed: AtomicBool,
}

#[async_trait]
impl ControlHandle for FakeControlHandle {
    async fn send(&self, command: &str) -> anyhow::Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            anyhow::bail!("connection closed");
        }
        self.sent.lock().unwrap().push(command.to_string());
        Ok(())
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl ControlConnector for FakeControl {
    async fn open(
        &self,
        _endpoint: &str,
        _identity: &str,
        events: mpsc::Sender<ControlEvent>,
    ) -> anyhow::Result<Arc<dyn ControlHandle>> {
        if self.fail_open.load(Ordering::SeqCst) {
            anyhow::bail!("control endpoint refused");
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        *self.events.lock().unwrap() = Some(events);
        Ok(Arc::new(FakeControlHandle {
            sent: self.sent.clone(),
            closes: self.closes.clone(),
            closed: AtomicBool::new(false),
        }))
    }
}

// ── scan ──────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeScan {
    triggers: Arc<AtomicUsize>,
    opens: AtomicUsize,
    closes: Arc<AtomicUsize>,
    fail_open: AtomicBool,
}

impl FakeScan {
    pub fn triggers(&self) -> usize {
        self.triggers.load(Ordering::SeqCst)
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn fail_open(&self) {
        self.fail_open.store(true, Ordering::SeqCst);
    }
}

struct FakeScanChannel {
    triggers: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl ScanChannel for FakeScanChannel {
    async fn trigger_scan(&self) -> anyhow::Result<()> {
        self.triggers.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ScanConnector for FakeScan {
    async fn open(
        &self,
        _endpoint: &str,
        _identity: &str,
        _errors: mpsc::Sender<String>,
    ) -> anyhow::Result<Arc<dyn ScanChannel>> {
        if self.fail_open.load(Ordering::SeqCst) {
            anyhow::bail!("scanner plugin not installed");
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(FakeScanChannel {
            triggers: self.triggers.clone(),
            closes: self.closes.clone(),
        }))
    }
}

// ── spectrum ──────────────────────────────────────────────────────────────────

/// Returns scripted results in order, then empty spectra forever.
#[derive(Default)]
pub struct FakeSpectrum {
    script: Mutex<VecDeque<Result<Vec<SpectrumPoint>, String>>>,
    fetches: AtomicUsize,
}

impl FakeSpectrum {
    pub fn then_points(&self, points: Vec<SpectrumPoint>) {
        self.script.lock().unwrap().push_back(Ok(points));
    }

    pub fn then_empty(&self) {
        self.then_points(Vec::new());
    }

    pub fn then_error(&self, message: &str) {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpectrumFetcher for FakeSpectrum {
    async fn fetch_spectrum(
        &self,
        _endpoint: &str,
        _identity: &str,
    ) -> anyhow::Result<Vec<SpectrumPoint>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(result) => result.map_err(anyhow::Error::msg),
            None => Ok(Vec::new()),
        }
    }
}

// ── audio ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MockState {
    pub profile: BufferProfile,
    pub sources: Vec<String>,
    pub index: usize,
    pub position_ms: u64,
    pub playing: bool,
    pub play_when_ready: bool,
    pub prepared: usize,
    pub released: bool,
    fail_prepare: bool,
}

pub struct MockPipeline {
    state: Arc<Mutex<MockState>>,
    reporter: PlaybackReporter,
}

#[async_trait]
impl AudioPipeline for MockPipeline {
    async fn set_source(&mut self, uri: &str) -> anyhow::Result<()> {
        let mut s = self.state.lock().unwrap();
        s.sources = vec![uri.to_string()];
        s.index = 0;
        s.position_ms = 0;
        Ok(())
    }

    async fn seed(&mut self, snapshot: &PlaybackSnapshot) -> anyhow::Result<()> {
        let mut s = self.state.lock().unwrap();
        s.sources = snapshot.sources.clone();
        s.index = snapshot.index;
        s.position_ms = snapshot.position_ms;
        Ok(())
    }

    async fn prepare(&mut self) -> anyhow::Result<()> {
        let mut s = self.state.lock().unwrap();
        if s.fail_prepare {
            anyhow::bail!("decoder init failed");
        }
        s.prepared += 1;
        Ok(())
    }

    fn set_play_when_ready(&mut self, play: bool) {
        self.state.lock().unwrap().play_when_ready = play;
    }

    async fn play(&mut self) -> anyhow::Result<()> {
        self.state.lock().unwrap().playing = true;
        self.reporter.report(true);
        Ok(())
    }

    async fn pause(&mut self) -> anyhow::Result<()> {
        self.state.lock().unwrap().playing = false;
        self.reporter.report(false);
        Ok(())
    }

    async fn stop(&mut self) {
        {
            let mut s = self.state.lock().unwrap();
            s.playing = false;
            s.position_ms = 0;
        }
        self.reporter.report(false);
    }

    fn clear_sources(&mut self) {
        self.state.lock().unwrap().sources.clear();
    }

    fn is_playing(&self) -> bool {
        self.state.lock().unwrap().playing
    }

    fn snapshot(&self) -> PlaybackSnapshot {
        let s = self.state.lock().unwrap();
        PlaybackSnapshot {
            sources: s.sources.clone(),
            index: s.index,
            position_ms: s.position_ms,
            playing: s.playing,
        }
    }

    fn release(&mut self) {
        let mut s = self.state.lock().unwrap();
        s.released = true;
        s.playing = false;
    }
}

/// Records every pipeline it builds so tests can inspect them.
#[derive(Default)]
pub struct MockFactory {
    built: Mutex<Vec<Arc<Mutex<MockState>>>>,
    attempts: AtomicUsize,
    fail_build: AtomicBool,
    fail_prepare: AtomicBool,
}

impl MockFactory {
    pub fn fail_next_build(&self) {
        self.fail_build.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_prepare(&self) {
        self.fail_prepare.store(true, Ordering::SeqCst);
    }

    /// Build calls, including failed ones.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn built(&self) -> usize {
        self.built.lock().unwrap().len()
    }

    pub fn pipeline(&self, index: usize) -> MockState {
        self.built.lock().unwrap()[index].lock().unwrap().clone()
    }

    pub fn latest(&self) -> MockState {
        let built = self.built.lock().unwrap();
        let last = built.last().expect("no pipeline built");
        let state = last.lock().unwrap().clone();
        state
    }

    /// Mutate the most recently built pipeline, e.g. to move its position.
    pub fn with_latest<F: FnOnce(&mut MockState)>(&self, f: F) {
        let built = self.built.lock().unwrap();
        let last = built.last().expect("no pipeline built");
        f(&mut last.lock().unwrap());
    }

    /// Pipelines that have not been released.
    pub fn live(&self) -> usize {
        self.built
            .lock()
            .unwrap()
            .iter()
            .filter(|p| !p.lock().unwrap().released)
            .count()
    }
}

impl PipelineFactory for MockFactory {
    fn build(
        &self,
        profile: &BufferProfile,
        reporter: PlaybackReporter,
    ) -> anyhow::Result<Box<dyn AudioPipeline>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_build.swap(false, Ordering::SeqCst) {
            anyhow::bail!("no audio device");
        }
        let state = Arc::new(Mutex::new(MockState {
            profile: *profile,
            sources: Vec::new(),
            index: 0,
            position_ms: 0,
            playing: false,
            play_when_ready: false,
            prepared: 0,
            released: false,
            fail_prepare: self.fail_prepare.swap(false, Ordering::SeqCst),
        }));
        self.built.lock().unwrap().push(state.clone());
        Ok(Box::new(MockPipeline { state, reporter }))
    }
}
