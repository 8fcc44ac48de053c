use std::fmt;

/// Commands spoken to the tuner over the control connection.
///
/// The wire form is the `Display` output and must match the tuner server
/// byte for byte:
///
/// ```text
///   Tune     T<kHz>
///   EQ/IMS   G<eq:0|1><ims:0|1>
///   Antenna  Z<index>
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TunerCommand {
    Tune { khz: u32 },
    /// EQ and IMS always travel together; sending one needs the other's value.
    Filters { eq: bool, ims: bool },
    Antenna { index: usize },
}

impl TunerCommand {
    /// Convert a frequency in MHz to the integer kHz the tuner works in.
    pub fn tune_mhz(mhz: f64) -> Self {
        TunerCommand::Tune {
            khz: mhz_to_khz(mhz),
        }
    }
}

/// Rounds to the nearest kHz; `87.6 * 1000.0` is 87599.99999999999 in f64.
pub fn mhz_to_khz(mhz: f64) -> u32 {
    (mhz * 1000.0).round().max(0.0) as u32
}

impl fmt::Display for TunerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TunerCommand::Tune { khz } => write!(f, "T{}", khz),
            TunerCommand::Filters { eq, ims } => write!(f, "G{}{}", u8::from(*eq), u8::from(*ims)),
            TunerCommand::Antenna { index } => write!(f, "Z{}", index),
        }
    }
}
