use serde::{Deserialize, Serialize};

/// Lower edge of the synthetic baseline spectrum (MHz).
pub const BASELINE_START_MHZ: f64 = 83.0;
/// Upper edge of the synthetic baseline spectrum (MHz).
pub const BASELINE_END_MHZ: f64 = 108.0;
/// Spacing between baseline points (MHz).
pub const BASELINE_STEP_MHZ: f64 = 0.05;

/// European RDS programme type names, indexed by PTY code.
pub const EUROPE_PROGRAMMES: [&str; 31] = [
    "No PTY",
    "News",
    "Current Affairs",
    "Info",
    "Sport",
    "Education",
    "Drama",
    "Culture",
    "Science",
    "Varied",
    "Pop M",
    "Rock M",
    "Easy Listening",
    "Light Classical",
    "Serious Classical",
    "Other Music",
    "Weather",
    "Finance",
    "Children's Programmes",
    "Social Affairs",
    "Religion",
    "Phone-in",
    "Travel",
    "Leisure",
    "Jazz Music",
    "Country Music",
    "National Music",
    "Oldies Music",
    "Folk Music",
    "Documentary",
    "Alarm Test",
];

/// Static tuner capabilities, fetched once per connect.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TunerInfo {
    pub tuner_name: String,
    #[serde(default)]
    pub tuner_description: String,
    #[serde(default)]
    pub antenna_names: Vec<String>,
    #[serde(default)]
    pub can_switch_antenna: bool,
}

/// Dynamic tuner state as pushed over the control connection.
///
/// The `*_errors` vectors run parallel to their text field: one confidence
/// flag per character (0 = clean, higher = less certain).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TunerState {
    pub freq_khz: u32,
    pub step_khz: Option<u32>,
    pub min_khz: Option<u32>,
    pub max_khz: Option<u32>,
    pub signal_dbf: Option<f64>,
    pub ps: String,
    pub ps_errors: Vec<u8>,
    pub rt0: String,
    pub rt0_errors: Vec<u8>,
    pub rt1: String,
    pub rt1_errors: Vec<u8>,
    pub pi: Option<String>,
    pub pty: u8,
    pub eq: bool,
    pub ims: bool,
    pub antenna_index: Option<usize>,
    pub users: u32,
}

impl TunerState {
    /// Blank the RDS text fields.  The server never clears them after a
    /// retune, so stale text would otherwise stick to the new station.
    pub fn clear_rds(&mut self) {
        self.ps.clear();
        self.rt0.clear();
        self.rt1.clear();
    }

    /// `"<code>/<name>"` for the current programme type.
    pub fn pty_label(&self) -> String {
        let name = EUROPE_PROGRAMMES
            .get(self.pty as usize)
            .copied()
            .unwrap_or("None");
        format!("{}/{}", self.pty, name)
    }

    /// Current frequency in MHz.
    pub fn freq_mhz(&self) -> f64 {
        f64::from(self.freq_khz) / 1000.0
    }
}

/// One sample of a spectrum scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpectrumPoint {
    pub frequency_mhz: f64,
    pub signal_level: f64,
}

impl SpectrumPoint {
    pub fn new(frequency_mhz: f64, signal_level: f64) -> Self {
        Self {
            frequency_mhz,
            signal_level,
        }
    }
}

/// Flat spectrum covering the default tunable band.
pub fn baseline_spectrum() -> Vec<SpectrumPoint> {
    let steps = ((BASELINE_END_MHZ - BASELINE_START_MHZ) / BASELINE_STEP_MHZ).round() as usize;
    (0..=steps)
        .map(|i| SpectrumPoint::new(BASELINE_START_MHZ + i as f64 * BASELINE_STEP_MHZ, 0.0))
        .collect()
}

/// Sort by frequency, falling back to the baseline when there is nothing to show.
pub fn ensure_spectrum(mut points: Vec<SpectrumPoint>) -> Vec<SpectrumPoint> {
    if points.is_empty() {
        return baseline_spectrum();
    }
    points.sort_by(|a, b| a.frequency_mhz.total_cmp(&b.frequency_mhz));
    points
}

/// Unit used when presenting signal levels.  The tuner reports dBf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SignalUnit {
    #[default]
    Dbf,
    Dbuv,
    Dbm,
}

impl SignalUnit {
    pub fn display_name(self) -> &'static str {
        match self {
            SignalUnit::Dbf => "dBf",
            SignalUnit::Dbuv => "dBµV",
            SignalUnit::Dbm => "dBm",
        }
    }

    pub fn from_display_name(name: &str) -> Self {
        [SignalUnit::Dbf, SignalUnit::Dbuv, SignalUnit::Dbm]
            .into_iter()
            .find(|u| u.display_name() == name)
            .unwrap_or_default()
    }

    /// Convert a dBf reading into this unit.
    pub fn convert(self, dbf: f64) -> f64 {
        match self {
            SignalUnit::Dbf => dbf,
            SignalUnit::Dbuv => dbf - 11.25,
            SignalUnit::Dbm => dbf - 120.0,
        }
    }
}

/// `"--"` when no reading is known, otherwise one decimal plus unit.
pub fn format_signal(state: Option<&TunerState>, unit: SignalUnit) -> String {
    match state.and_then(|s| s.signal_dbf) {
        Some(dbf) => format!("{:.1} {}", unit.convert(dbf), unit.display_name()),
        None => "--".to_string(),
    }
}
