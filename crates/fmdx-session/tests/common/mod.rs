#![allow(dead_code)]

pub mod fakes;

use std::sync::Arc;
use std::time::Duration;

use fmdx_proto::model::{TunerInfo, TunerState};
use fmdx_proto::store::{PersistentState, SettingsStore};
use fmdx_session::collab::ControlEvent;
use fmdx_session::core::{Collaborators, SessionOptions};
use fmdx_session::{BufferReconfigurator, SessionCore, SessionHandle, SessionState};

use fakes::{FakeControl, FakeInfo, FakeScan, FakeSpectrum, MockFactory};

pub const ADDRESS: &str = "http://tuner.local:8080";
const WAIT: Duration = Duration::from_secs(60);

pub fn options() -> SessionOptions {
    SessionOptions {
        identity: "fmdx-test/0.1".to_string(),
        poll_interval: Duration::from_millis(500),
        scan_deadline: Duration::from_secs(10),
        queue_capacity: 64,
    }
}

pub fn tuner_info() -> TunerInfo {
    TunerInfo {
        tuner_name: "Test Tuner".to_string(),
        tuner_description: "TEF6686 on a stick".to_string(),
        antenna_names: vec!["Dipole".into(), "Loop".into(), "Yagi".into()],
        can_switch_antenna: true,
    }
}

pub fn tuner_state(freq_khz: u32) -> TunerState {
    TunerState {
        freq_khz,
        signal_dbf: Some(42.0),
        ps: "RADIO 1".to_string(),
        ps_errors: vec![0; 7],
        rt0: "Now playing".to_string(),
        pi: Some("D3C3".to_string()),
        pty: 10,
        eq: true,
        ims: false,
        antenna_index: Some(0),
        users: 1,
        ..Default::default()
    }
}

/// All fakes behind one session.
#[derive(Clone)]
pub struct Fakes {
    pub info: Arc<FakeInfo>,
    pub control: Arc<FakeControl>,
    pub scan: Arc<FakeScan>,
    pub spectrum: Arc<FakeSpectrum>,
    pub factory: Arc<MockFactory>,
}

impl Fakes {
    pub fn new() -> Self {
        Self {
            info: Arc::new(FakeInfo::new(tuner_info())),
            control: Arc::new(FakeControl::default()),
            scan: Arc::new(FakeScan::default()),
            spectrum: Arc::new(FakeSpectrum::default()),
            factory: Arc::new(MockFactory::default()),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            info: self.info.clone(),
            control: self.control.clone(),
            scan: self.scan.clone(),
            spectrum: self.spectrum.clone(),
        }
    }
}

pub struct Harness {
    pub fakes: Fakes,
    pub handle: SessionHandle,
    pub store: Arc<SettingsStore>,
    pub audio: Arc<BufferReconfigurator>,
}

impl Harness {
    pub async fn start() -> Self {
        Self::start_with(Fakes::new(), PersistentState::default()).await
    }

    pub async fn start_with(fakes: Fakes, initial: PersistentState) -> Self {
        let store = Arc::new(SettingsStore::ephemeral(initial));
        let settings = store.settings().await;
        let audio = Arc::new(BufferReconfigurator::new(fakes.factory.clone(), &settings).unwrap());
        let handle = SessionCore::spawn(
            fakes.collaborators(),
            options(),
            store.clone(),
            audio.clone(),
        )
        .await;
        Self {
            fakes,
            handle,
            store,
            audio,
        }
    }

    /// Connect and wait until the session is fully open and the initial
    /// spectrum refresh has gone out.
    pub async fn connected() -> Self {
        let h = Self::start().await;
        h.connect().await;
        h
    }

    pub async fn connect(&self) {
        let opens = self.fakes.control.opens();
        let fetches = self.fakes.spectrum.fetches();
        self.handle.connect(ADDRESS).await.unwrap();
        self.wait_for(|s| s.is_connected()).await;
        eventually(|| {
            self.fakes.control.opens() == opens + 1
                && self.fakes.spectrum.fetches() == fetches + 1
        })
        .await;
    }

    /// Connected, with `freq_khz` pushed as the current tuner state.
    pub async fn tuned(freq_khz: u32) -> Self {
        let h = Self::connected().await;
        h.push_state(tuner_state(freq_khz)).await;
        h
    }

    pub async fn push_state(&self, state: TunerState) {
        let expected = state.clone();
        assert!(self.fakes.control.push(ControlEvent::State(state)).await);
        self.wait_for(|s| s.tuner_state.as_ref() == Some(&expected))
            .await;
    }

    pub fn snapshot(&self) -> SessionState {
        self.handle.snapshot()
    }

    pub async fn wait_for<F>(&self, pred: F) -> SessionState
    where
        F: Fn(&SessionState) -> bool,
    {
        wait_for_state(&self.handle, pred).await
    }
}

pub async fn wait_for_state<F>(handle: &SessionHandle, pred: F) -> SessionState
where
    F: Fn(&SessionState) -> bool,
{
    let mut rx = handle.subscribe();
    tokio::time::timeout(WAIT, async {
        loop {
            let snapshot = rx.borrow_and_update().clone();
            if pred(&snapshot) {
                return snapshot;
            }
            rx.changed().await.expect("session core stopped");
        }
    })
    .await
    .expect("timed out waiting for session state")
}

/// Poll `cond` until it holds.
pub async fn eventually<F>(cond: F)
where
    F: Fn() -> bool,
{
    tokio::time::timeout(WAIT, async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition never became true")
}

/// Give spawned tasks a chance to run.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
