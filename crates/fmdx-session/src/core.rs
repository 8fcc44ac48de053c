//! SessionCore: single-owner event loop for the tuner session.
//!
//! Every input that could change `SessionState` arrives as a `SessionEvent`:
//! user intents (with a reply channel), the outcome of the connect-time info
//! fetch, control-connection pushes, scan results, audio play-state reports
//! and reconfiguration failures.  SessionCore owns the state exclusively and
//! publishes a fresh snapshot on a `watch` channel after every mutation.
//!
//! Async work spawned on behalf of a session is tagged with the session
//! generation and runs under a cancellation token.  Connect and disconnect
//! both start a new generation, so results from a previous session are
//! recognised and dropped instead of overwriting the current one.

use std::sync::Arc;
use std::time::Duration;

use fmdx_proto::command::{mhz_to_khz, TunerCommand};
use fmdx_proto::config::Config;
use fmdx_proto::model::{self, SpectrumPoint, TunerInfo};
use fmdx_proto::settings::Settings;
use fmdx_proto::store::SettingsStore;
use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::address;
use crate::buffer::BufferReconfigurator;
use crate::collab::{
    ControlConnector, ControlEvent, ControlHandle, InfoFetcher, ScanChannel, ScanConnector,
    SpectrumFetcher,
};
use crate::error::{Result, SessionError};
use crate::queue::{self, CommandQueue, COMMAND_QUEUE_CAPACITY};
use crate::scan::ScanJob;
use crate::state::{ConnectionPhase, SessionState};

const EVENT_CHANNEL_CAPACITY: usize = 1024;
const CONTROL_CHANNEL_CAPACITY: usize = 256;

// ── wiring ────────────────────────────────────────────────────────────────────

/// The external endpoints a session talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub info: Arc<dyn InfoFetcher>,
    pub control: Arc<dyn ControlConnector>,
    pub scan: Arc<dyn ScanConnector>,
    pub spectrum: Arc<dyn SpectrumFetcher>,
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub identity: String,
    pub poll_interval: Duration,
    pub scan_deadline: Duration,
    pub queue_capacity: usize,
}

impl SessionOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            identity: config.client.identity.clone(),
            poll_interval: config.scan.poll_interval(),
            scan_deadline: config.scan.deadline(),
            queue_capacity: COMMAND_QUEUE_CAPACITY,
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

// ── SessionEvent ──────────────────────────────────────────────────────────────

/// Things a user can ask the session to do.
#[derive(Debug, Clone)]
pub enum Intent {
    Connect(String),
    Disconnect,
    UpdateServerAddress(String),
    UpdateSettings(Settings),
    Tune(f64),
    TuneStep(i32),
    ToggleEq,
    ToggleIms,
    CycleAntenna,
    ToggleAudio,
    RequestScan,
    RefreshSpectrum,
}

/// All inputs into the SessionCore loop.
#[derive(Debug)]
pub enum SessionEvent {
    Intent {
        intent: Intent,
        reply: oneshot::Sender<Result<()>>,
    },
    InfoFetched {
        generation: u64,
        result: std::result::Result<TunerInfo, String>,
    },
    Control {
        generation: u64,
        event: ControlEvent,
    },
    ScanChannelError {
        generation: u64,
        message: String,
    },
    SpectrumFetched {
        generation: u64,
        points: Vec<SpectrumPoint>,
    },
    SpectrumError {
        generation: u64,
        message: String,
    },
    ScanFinished {
        generation: u64,
    },
    /// The active audio pipeline started or stopped playing.
    AudioPlaying(bool),
    ReconfigFailed(String),
    Shutdown,
}

// ── SessionCore ───────────────────────────────────────────────────────────────

/// Open resources of a connected session.
struct ActiveSession {
    control: Arc<dyn ControlHandle>,
    scan: Option<Arc<dyn ScanChannel>>,
    queue: Arc<CommandQueue>,
}

pub struct SessionCore {
    state: SessionState,
    state_tx: watch::Sender<SessionState>,
    collab: Collaborators,
    options: SessionOptions,
    store: Arc<SettingsStore>,
    audio: Arc<BufferReconfigurator>,
    /// Handed to spawned work so results come back through the loop.
    event_tx: mpsc::Sender<SessionEvent>,
    generation: u64,
    /// Cancels everything spawned for the current generation.
    cancel: CancellationToken,
    /// Cancels the background relays when the loop exits.
    shutdown: CancellationToken,
    session: Option<ActiveSession>,
}

impl SessionCore {
    /// Build the core, restoring the server address and settings from `store`.
    pub async fn new(
        collab: Collaborators,
        options: SessionOptions,
        store: Arc<SettingsStore>,
        audio: Arc<BufferReconfigurator>,
        event_tx: mpsc::Sender<SessionEvent>,
    ) -> Self {
        let settings = store.settings().await;
        let server_address = match store.server_address().await {
            Some(raw) => address::normalize(&raw).unwrap_or(raw),
            None => String::new(),
        };
        let state = SessionState::new(server_address, settings);
        let (state_tx, _) = watch::channel(state.clone());

        Self {
            state,
            state_tx,
            collab,
            options,
            store,
            audio,
            event_tx,
            generation: 0,
            cancel: CancellationToken::new(),
            shutdown: CancellationToken::new(),
            session: None,
        }
    }

    /// Build the core, start its loop and background relays, and return a
    /// handle to it.
    pub async fn spawn(
        collab: Collaborators,
        options: SessionOptions,
        store: Arc<SettingsStore>,
        audio: Arc<BufferReconfigurator>,
    ) -> SessionHandle {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let core = Self::new(
            collab,
            options,
            store.clone(),
            audio.clone(),
            event_tx.clone(),
        )
        .await;
        let handle = SessionHandle::new(event_tx.clone(), core.subscribe());

        spawn_audio_relay(&audio, event_tx.clone(), core.shutdown.clone());
        spawn_settings_watcher(&store, audio, event_tx, core.shutdown.clone());
        tokio::spawn(core.run(event_rx));
        handle
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Run the event loop until `Shutdown` arrives or every sender is gone.
    pub async fn run(mut self, mut event_rx: mpsc::Receiver<SessionEvent>) {
        info!("SessionCore: starting event loop");

        while let Some(evt) = event_rx.recv().await {
            match evt {
                SessionEvent::Shutdown => {
                    info!("SessionCore: shutdown requested");
                    break;
                }

                SessionEvent::Intent { intent, reply } => {
                    debug!("SessionCore: intent {:?}", intent);
                    let result = self.handle_intent(intent).await;
                    if let Err(e) = &result {
                        debug!("SessionCore: intent rejected: {}", e);
                    }
                    let _ = reply.send(result);
                }

                SessionEvent::InfoFetched { generation, result } => {
                    self.handle_info(generation, result).await;
                }

                SessionEvent::Control { generation, event } => {
                    self.handle_control(generation, event).await;
                }

                SessionEvent::ScanChannelError {
                    generation,
                    message,
                } => {
                    if self.is_current(generation) {
                        warn!("SessionCore: scan channel error: {}", message);
                        self.set_error(message);
                    }
                }

                SessionEvent::SpectrumFetched { generation, points } => {
                    if self.is_current(generation) {
                        self.state.spectrum = model::ensure_spectrum(points);
                        self.publish();
                    }
                }

                SessionEvent::SpectrumError {
                    generation,
                    message,
                } => {
                    if self.is_current(generation) {
                        self.set_error(message);
                    }
                }

                SessionEvent::ScanFinished { generation } => {
                    if self.is_current(generation) {
                        // A timed-out scan keeps whatever spectrum we had.
                        if self.state.spectrum.is_empty() {
                            self.state.spectrum = model::baseline_spectrum();
                        }
                        self.state.is_scanning = false;
                        self.publish();
                    }
                }

                SessionEvent::AudioPlaying(playing) => {
                    if self.state.audio_playing != playing {
                        self.state.audio_playing = playing;
                        self.publish();
                    }
                }

                SessionEvent::ReconfigFailed(message) => {
                    warn!("SessionCore: {}", message);
                    self.set_error(message);
                }
            }
        }

        self.disconnect("Disconnected").await;
        self.shutdown.cancel();
        info!("SessionCore: event loop stopped");
    }

    // ── intents ───────────────────────────────────────────────────────────────

    async fn handle_intent(&mut self, intent: Intent) -> Result<()> {
        match intent {
            Intent::Connect(raw) => self.connect(raw).await?,
            Intent::Disconnect => self.disconnect("Disconnected").await,
            Intent::UpdateServerAddress(raw) => {
                self.state.server_address = raw;
                self.publish();
            }
            Intent::UpdateSettings(settings) => self.update_settings(settings).await,
            Intent::Tune(mhz) => self.tune(mhz).await?,
            Intent::TuneStep(step_khz) => self.tune_step(step_khz).await?,
            Intent::ToggleEq => self.toggle_filters(true, false),
            Intent::ToggleIms => self.toggle_filters(false, true),
            Intent::CycleAntenna => self.cycle_antenna(),
            Intent::ToggleAudio => self.toggle_audio().await,
            Intent::RequestScan => self.request_scan(),
            Intent::RefreshSpectrum => {
                if !self.state.server_address.trim().is_empty() {
                    self.spawn_spectrum_refresh();
                }
            }
        }
        Ok(())
    }

    async fn connect(&mut self, raw: String) -> Result<()> {
        if self.state.is_connecting() {
            debug!("SessionCore: connect ignored, already connecting");
            return Ok(());
        }

        let endpoint = match address::normalize(&raw) {
            Ok(endpoint) => endpoint,
            Err(e) => {
                self.set_error(e.to_string());
                return Err(e);
            }
        };
        info!("SessionCore: connecting to {}", endpoint);

        if self.session.is_some() || self.state.phase != ConnectionPhase::Disconnected {
            self.disconnect("Disconnected").await;
        }
        if let Err(e) = self.store.set_server_address(&endpoint).await {
            warn!("SessionCore: failed to persist server address: {}", e);
        }

        self.begin_generation();
        self.state.server_address = endpoint.clone();
        self.state.phase = ConnectionPhase::Connecting;
        self.state.tuner_state = None;
        self.state.last_error = None;
        self.state.status_message = Some(format!("Connecting to {}…", endpoint));
        self.publish();

        let generation = self.generation;
        let info = self.collab.info.clone();
        let identity = self.options.identity.clone();
        let tx = self.event_tx.clone();
        let cancel = self.cancel.child_token();
        tokio::spawn(async move {
            let fetched = tokio::select! {
                _ = cancel.cancelled() => return,
                r = info.fetch_info(&endpoint, &identity) => r,
            };
            let result = fetched.map_err(|e| e.to_string());
            let _ = tx.send(SessionEvent::InfoFetched { generation, result }).await;
        });
        Ok(())
    }

    /// Close everything and reset to persisted fields.  Idempotent.
    async fn disconnect(&mut self, status: &str) {
        self.begin_generation();
        self.close_session();
        self.audio.stop_and_clear().await;
        self.state.reset_for_disconnect(status);
        self.publish();
    }

    async fn update_settings(&mut self, settings: Settings) {
        self.state.settings = settings.clone();
        self.publish();
        // The store notifies the reconfigurator.
        if let Err(e) = self.store.set_settings(settings).await {
            warn!("SessionCore: failed to persist settings: {}", e);
            self.set_error(e.to_string());
        }
    }

    async fn tune(&mut self, mhz: f64) -> Result<()> {
        if !mhz.is_finite() || mhz <= 0.0 {
            return Err(SessionError::InvalidInput(format!(
                "invalid frequency {}",
                mhz
            )));
        }
        let khz = mhz_to_khz(mhz);
        if self.state.tuner_state.as_ref().map(|s| s.freq_khz) == Some(khz) {
            debug!("SessionCore: already on {} kHz", khz);
            return Ok(());
        }

        self.submit(TunerCommand::Tune { khz });
        if let Some(tuner) = self.state.tuner_state.as_mut() {
            tuner.clear_rds();
        }
        self.publish();

        if self.state.settings.restart_audio_on_tune {
            self.restart_audio().await;
        }
        Ok(())
    }

    async fn tune_step(&mut self, step_khz: i32) -> Result<()> {
        let Some(current) = self.state.tuner_state.as_ref().map(|s| s.freq_khz) else {
            return Ok(());
        };
        let target = i64::from(current) + i64::from(step_khz);
        if target <= 0 {
            return Err(SessionError::InvalidInput(format!(
                "cannot step {} kHz from {} kHz",
                step_khz, current
            )));
        }
        self.tune(target as f64 / 1000.0).await
    }

    /// EQ and IMS share one command, so the untouched flag is sent as-is.
    fn toggle_filters(&mut self, flip_eq: bool, flip_ims: bool) {
        let Some(tuner) = self.state.tuner_state.as_ref() else {
            return;
        };
        let cmd = TunerCommand::Filters {
            eq: tuner.eq ^ flip_eq,
            ims: tuner.ims ^ flip_ims,
        };
        self.submit(cmd);
    }

    fn cycle_antenna(&mut self) {
        let Some(tuner) = self.state.tuner_state.as_mut() else {
            return;
        };
        let count = self.state.antennas.len().max(1);
        let next = (tuner.antenna_index.unwrap_or(0) + 1) % count;
        // Applied locally right away; the server echo carries nothing new.
        tuner.antenna_index = Some(next);
        self.submit(TunerCommand::Antenna { index: next });
        self.publish();
    }

    async fn toggle_audio(&mut self) {
        if !self.state.is_connected() {
            return;
        }
        if let Err(e) = self.audio.toggle(&self.state.server_address).await {
            warn!("SessionCore: audio toggle failed: {}", e);
            self.set_error(e.to_string());
        }
    }

    async fn restart_audio(&mut self) {
        if let Err(e) = self
            .audio
            .restart_stream(&self.state.server_address, false)
            .await
        {
            warn!("SessionCore: audio restart failed: {}", e);
            self.set_error(e.to_string());
        }
    }

    fn request_scan(&mut self) {
        if self.state.is_scanning {
            return;
        }
        let Some(channel) = self.session.as_ref().and_then(|s| s.scan.clone()) else {
            debug!("SessionCore: no scan channel, ignoring scan request");
            return;
        };

        self.state.is_scanning = true;
        self.publish();

        let job = ScanJob {
            generation: self.generation,
            channel,
            fetcher: self.collab.spectrum.clone(),
            endpoint: self.state.server_address.clone(),
            identity: self.options.identity.clone(),
            poll_interval: self.options.poll_interval,
            deadline: self.options.scan_deadline,
            events: self.event_tx.clone(),
            cancel: self.cancel.child_token(),
        };
        tokio::spawn(job.run());
    }

    // ── connection ────────────────────────────────────────────────────────────

    async fn handle_info(
        &mut self,
        generation: u64,
        result: std::result::Result<TunerInfo, String>,
    ) {
        if !self.is_current(generation) || !self.state.is_connecting() {
            debug!("SessionCore: dropping stale info for generation {}", generation);
            return;
        }

        let info = match result {
            Ok(info) => info,
            Err(message) => {
                warn!("SessionCore: connect failed: {}", message);
                let failure = SessionError::ConnectFailure(message).to_string();
                self.disconnect(&failure).await;
                self.state.last_error = Some(failure);
                self.publish();
                return;
            }
        };

        info!(
            "SessionCore: tuner info name={} antennas={}",
            info.tuner_name,
            info.antenna_names.len()
        );
        let name = if info.tuner_name.trim().is_empty() {
            self.state.server_address.clone()
        } else {
            info.tuner_name.clone()
        };
        self.state.antennas = info.antenna_names.clone();
        self.state.tuner_info = Some(info);
        self.state.phase = ConnectionPhase::Connected;
        self.state.last_error = None;
        self.state.status_message = Some(format!("Connected to {}", name));
        self.publish();

        if let Err(e) = self.open_session().await {
            warn!("SessionCore: control connection failed: {}", e);
            let failure = SessionError::ConnectFailure(e.to_string()).to_string();
            self.disconnect(&failure).await;
            self.state.last_error = Some(failure);
            self.publish();
        }
    }

    /// Open the control connection and scan channel and start the relays and
    /// the command forwarder for the current generation.
    async fn open_session(&mut self) -> anyhow::Result<()> {
        let endpoint = self.state.server_address.clone();
        let identity = self.options.identity.clone();
        let generation = self.generation;

        let (control_tx, mut control_rx) = mpsc::channel(CONTROL_CHANNEL_CAPACITY);
        let control = self
            .collab
            .control
            .open(&endpoint, &identity, control_tx)
            .await?;
        info!("SessionCore: control connection open");

        let tx = self.event_tx.clone();
        let cancel = self.cancel.child_token();
        tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    _ = cancel.cancelled() => break,
                    e = control_rx.recv() => match e {
                        Some(e) => e,
                        None => break,
                    },
                };
                if tx.send(SessionEvent::Control { generation, event }).await.is_err() {
                    break;
                }
            }
        });

        let (scan_err_tx, mut scan_err_rx) = mpsc::channel::<String>(16);
        let scan = match self
            .collab
            .scan
            .open(&endpoint, &identity, scan_err_tx)
            .await
        {
            Ok(channel) => Some(channel),
            Err(e) => {
                // Scanning is optional; the session carries on without it.
                warn!("SessionCore: scan channel unavailable: {}", e);
                self.state.last_error = Some(e.to_string());
                None
            }
        };
        if scan.is_some() {
            let tx = self.event_tx.clone();
            let cancel = self.cancel.child_token();
            tokio::spawn(async move {
                loop {
                    let message = tokio::select! {
                        _ = cancel.cancelled() => break,
                        m = scan_err_rx.recv() => match m {
                            Some(m) => m,
                            None => break,
                        },
                    };
                    let event = SessionEvent::ScanChannelError {
                        generation,
                        message,
                    };
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
            });
        }

        let queue = Arc::new(CommandQueue::new(self.options.queue_capacity));
        tokio::spawn(queue::forward(
            queue.clone(),
            control.clone(),
            self.cancel.child_token(),
        ));

        self.session = Some(ActiveSession {
            control,
            scan,
            queue,
        });
        self.publish();
        self.spawn_spectrum_refresh();
        Ok(())
    }

    async fn handle_control(&mut self, generation: u64, event: ControlEvent) {
        if !self.is_current(generation) {
            debug!("SessionCore: dropping stale control event");
            return;
        }
        match event {
            ControlEvent::State(tuner) => {
                if !self.state.is_connected() {
                    return;
                }
                debug!(
                    "control: state update freq={} users={}",
                    tuner.freq_khz, tuner.users
                );
                self.state.tuner_state = Some(tuner);
                if self.state.antennas.is_empty() {
                    if let Some(info) = self.state.tuner_info.as_ref() {
                        self.state.antennas = info.antenna_names.clone();
                    }
                }
                self.publish();
            }
            ControlEvent::Closed => {
                info!("control: closed by server");
                let lost = SessionError::SessionLost.to_string();
                self.disconnect(&lost).await;
                self.state.last_error = Some(lost);
                self.publish();
            }
            ControlEvent::Error(message) => {
                warn!("control: error: {}", message);
                self.state.status_message = Some(message.clone());
                self.set_error(message);
            }
        }
    }

    // ── helpers ───────────────────────────────────────────────────────────────

    fn submit(&self, cmd: TunerCommand) {
        match self.session.as_ref() {
            Some(session) => {
                if let Some(evicted) = session.queue.push(cmd) {
                    debug!(
                        "SessionCore: {} ({}) under backpressure",
                        SessionError::CommandDropped,
                        evicted
                    );
                }
            }
            None => debug!("SessionCore: no control connection, dropping {}", cmd),
        }
    }

    fn spawn_spectrum_refresh(&self) {
        let fetcher = self.collab.spectrum.clone();
        let endpoint = self.state.server_address.clone();
        let identity = self.options.identity.clone();
        let generation = self.generation;
        let tx = self.event_tx.clone();
        let cancel = self.cancel.child_token();
        tokio::spawn(async move {
            let fetched = tokio::select! {
                _ = cancel.cancelled() => return,
                r = fetcher.fetch_spectrum(&endpoint, &identity) => r,
            };
            let event = match fetched {
                Ok(points) => SessionEvent::SpectrumFetched { generation, points },
                Err(e) => SessionEvent::SpectrumError {
                    generation,
                    message: e.to_string(),
                },
            };
            let _ = tx.send(event).await;
        });
    }

    fn close_session(&mut self) {
        if let Some(session) = self.session.take() {
            session.queue.close();
            session.control.close();
            if let Some(scan) = session.scan {
                scan.close();
            }
            info!("SessionCore: session resources closed");
        }
    }

    /// Invalidate all in-flight work and start a new generation.
    fn begin_generation(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.generation += 1;
        // A cancelled scan never reports back.
        self.state.is_scanning = false;
    }

    fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    fn set_error(&mut self, message: String) {
        self.state.last_error = Some(message);
        self.publish();
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.state.clone());
    }
}

// ── background relays ─────────────────────────────────────────────────────────

/// Forward play-state reports from the audio pipeline into the loop.
fn spawn_audio_relay(
    audio: &BufferReconfigurator,
    tx: mpsc::Sender<SessionEvent>,
    shutdown: CancellationToken,
) {
    let mut playing = audio.subscribe_playing();
    tokio::spawn(async move {
        loop {
            let changed = tokio::select! {
                _ = shutdown.cancelled() => break,
                r = playing.changed() => r,
            };
            if changed.is_err() {
                break;
            }
            let now = *playing.borrow_and_update();
            if tx.send(SessionEvent::AudioPlaying(now)).await.is_err() {
                break;
            }
        }
    });
}

/// Re-apply buffer settings whenever the store reports a change.
fn spawn_settings_watcher(
    store: &SettingsStore,
    audio: Arc<BufferReconfigurator>,
    tx: mpsc::Sender<SessionEvent>,
    shutdown: CancellationToken,
) {
    let mut settings = store.subscribe();
    tokio::spawn(async move {
        loop {
            let changed = tokio::select! {
                _ = shutdown.cancelled() => break,
                r = settings.changed() => r,
            };
            if changed.is_err() {
                break;
            }
            let latest = settings.borrow_and_update().clone();
            match audio.apply_settings(&latest).await {
                Ok(true) => info!("audio: buffer settings applied"),
                Ok(false) => {}
                Err(e) => {
                    warn!("audio: {}", e);
                    let _ = tx.send(SessionEvent::ReconfigFailed(e.to_string())).await;
                }
            }
        }
    });
}

// ── SessionHandle ─────────────────────────────────────────────────────────────

/// Cloneable front end to a running SessionCore.  Each call resolves once
/// the loop has applied the intent (not once any network work finished).
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionEvent>,
    state_rx: watch::Receiver<SessionState>,
}

impl SessionHandle {
    pub fn new(tx: mpsc::Sender<SessionEvent>, state_rx: watch::Receiver<SessionState>) -> Self {
        Self { tx, state_rx }
    }

    async fn request(&self, intent: Intent) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(SessionEvent::Intent { intent, reply })
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)?
    }

    pub async fn connect(&self, raw_address: &str) -> Result<()> {
        self.request(Intent::Connect(raw_address.to_string())).await
    }

    pub async fn disconnect(&self) -> Result<()> {
        self.request(Intent::Disconnect).await
    }

    pub async fn update_server_address(&self, raw_address: &str) -> Result<()> {
        self.request(Intent::UpdateServerAddress(raw_address.to_string()))
            .await
    }

    pub async fn update_settings(&self, settings: Settings) -> Result<()> {
        self.request(Intent::UpdateSettings(settings)).await
    }

    pub async fn tune(&self, mhz: f64) -> Result<()> {
        self.request(Intent::Tune(mhz)).await
    }

    pub async fn tune_step(&self, step_khz: i32) -> Result<()> {
        self.request(Intent::TuneStep(step_khz)).await
    }

    pub async fn toggle_eq(&self) -> Result<()> {
        self.request(Intent::ToggleEq).await
    }

    pub async fn toggle_ims(&self) -> Result<()> {
        self.request(Intent::ToggleIms).await
    }

    pub async fn cycle_antenna(&self) -> Result<()> {
        self.request(Intent::CycleAntenna).await
    }

    pub async fn toggle_audio(&self) -> Result<()> {
        self.request(Intent::ToggleAudio).await
    }

    pub async fn request_scan(&self) -> Result<()> {
        self.request(Intent::RequestScan).await
    }

    pub async fn refresh_spectrum(&self) -> Result<()> {
        self.request(Intent::RefreshSpectrum).await
    }

    /// Snapshot stream for presentation.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_rx.clone()
    }

    pub fn snapshot(&self) -> SessionState {
        self.state_rx.borrow().clone()
    }

    pub async fn shutdown(&self) {
        let _ = self.tx.send(SessionEvent::Shutdown).await;
    }
}
