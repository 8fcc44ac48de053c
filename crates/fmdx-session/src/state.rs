use fmdx_proto::model::{self, SpectrumPoint, TunerInfo, TunerState};
use fmdx_proto::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionPhase {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Everything presentation needs to render a session.
///
/// Only the session core writes this; everybody else gets snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    /// Last normalized endpoint (or whatever the user is typing).  Persisted.
    pub server_address: String,
    pub phase: ConnectionPhase,
    pub tuner_info: Option<TunerInfo>,
    /// `None` until the first push of the current session.
    pub tuner_state: Option<TunerState>,
    pub antennas: Vec<String>,
    /// Sorted ascending by frequency and never empty.
    pub spectrum: Vec<SpectrumPoint>,
    pub is_scanning: bool,
    pub audio_playing: bool,
    pub settings: Settings,
    pub last_error: Option<String>,
    pub status_message: Option<String>,
}

impl SessionState {
    pub fn new(server_address: String, settings: Settings) -> Self {
        Self {
            server_address,
            phase: ConnectionPhase::Disconnected,
            tuner_info: None,
            tuner_state: None,
            antennas: Vec::new(),
            spectrum: model::baseline_spectrum(),
            is_scanning: false,
            audio_playing: false,
            settings,
            last_error: None,
            status_message: None,
        }
    }

    /// Back to defaults, keeping only the persisted fields.
    pub fn reset_for_disconnect(&mut self, status: &str) {
        let server_address = std::mem::take(&mut self.server_address);
        let settings = self.settings.clone();
        *self = Self::new(server_address, settings);
        self.status_message = Some(status.to_string());
    }

    pub fn is_connected(&self) -> bool {
        self.phase == ConnectionPhase::Connected
    }

    pub fn is_connecting(&self) -> bool {
        self.phase == ConnectionPhase::Connecting
    }

    /// Name of the selected antenna, `"Default"` when unknown.
    pub fn antenna_label(&self) -> &str {
        let index = self
            .tuner_state
            .as_ref()
            .and_then(|s| s.antenna_index)
            .unwrap_or(0);
        self.antennas
            .get(index)
            .map(String::as_str)
            .unwrap_or("Default")
    }

    /// Signal level in the user's chosen unit.
    pub fn signal_text(&self) -> String {
        model::format_signal(self.tuner_state.as_ref(), self.settings.signal_unit)
    }

    pub fn pty_text(&self) -> String {
        self.tuner_state
            .as_ref()
            .map(TunerState::pty_label)
            .unwrap_or_else(|| "0/None".to_string())
    }
}
