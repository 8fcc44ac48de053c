use serde::{Deserialize, Serialize};

use crate::model::SignalUnit;

/// User-configurable session settings.  Persisted in the settings store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub signal_unit: SignalUnit,
    #[serde(default = "default_network_buffer_chunks")]
    pub network_buffer_chunks: u32,
    #[serde(default = "default_player_buffer_ms")]
    pub player_buffer_ms: u32,
    #[serde(default = "default_restart_audio_on_tune")]
    pub restart_audio_on_tune: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            signal_unit: SignalUnit::default(),
            network_buffer_chunks: default_network_buffer_chunks(),
            player_buffer_ms: default_player_buffer_ms(),
            restart_audio_on_tune: default_restart_audio_on_tune(),
        }
    }
}

fn default_network_buffer_chunks() -> u32 {
    2
}

fn default_player_buffer_ms() -> u32 {
    2000
}

fn default_restart_audio_on_tune() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"player_buffer_ms": 800}"#).unwrap();
        assert_eq!(settings.player_buffer_ms, 800);
        assert_eq!(settings.network_buffer_chunks, 2);
        assert!(settings.restart_audio_on_tune);
        assert_eq!(settings.signal_unit, SignalUnit::Dbf);
    }
}
