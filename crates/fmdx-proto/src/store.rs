use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::{watch, RwLock};
use tracing::{debug, warn};

use crate::settings::Settings;

/// What survives between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistentState {
    #[serde(default)]
    pub last_server_url: Option<String>,
    #[serde(default)]
    pub settings: Settings,
}

/// JSON-file backed store for the server address and user settings.
///
/// Settings changes are published on a `watch` channel so that interested
/// parties (the buffer reconfigurator) can react without polling.
pub struct SettingsStore {
    state: RwLock<PersistentState>,
    state_file: Option<PathBuf>,
    settings_tx: watch::Sender<Settings>,
}

impl SettingsStore {
    /// Open the store at `state_file`, falling back to defaults if the file is
    /// missing or unreadable.
    pub fn open(state_file: PathBuf) -> Self {
        let persistent = Self::load_persistent(&state_file);
        Self::with_state(persistent, Some(state_file))
    }

    /// A store that never touches disk.
    pub fn ephemeral(initial: PersistentState) -> Self {
        Self::with_state(initial, None)
    }

    fn with_state(state: PersistentState, state_file: Option<PathBuf>) -> Self {
        let (settings_tx, _) = watch::channel(state.settings.clone());
        Self {
            state: RwLock::new(state),
            state_file,
            settings_tx,
        }
    }

    pub async fn server_address(&self) -> Option<String> {
        self.state.read().await.last_server_url.clone()
    }

    pub async fn set_server_address(&self, url: &str) -> anyhow::Result<()> {
        {
            let mut state = self.state.write().await;
            if state.last_server_url.as_deref() == Some(url) {
                return Ok(());
            }
            state.last_server_url = Some(url.to_string());
        }
        self.save().await
    }

    pub async fn settings(&self) -> Settings {
        self.state.read().await.settings.clone()
    }

    /// Persist `settings` and notify subscribers if anything changed.
    pub async fn set_settings(&self, settings: Settings) -> anyhow::Result<()> {
        {
            let mut state = self.state.write().await;
            if state.settings == settings {
                return Ok(());
            }
            state.settings = settings.clone();
        }
        self.settings_tx.send_replace(settings);
        self.save().await
    }

    /// Change notifications for settings.  The current value is marked seen.
    pub fn subscribe(&self) -> watch::Receiver<Settings> {
        self.settings_tx.subscribe()
    }

    async fn save(&self) -> anyhow::Result<()> {
        let Some(path) = self.state_file.as_ref() else {
            return Ok(());
        };
        let json = {
            let state = self.state.read().await;
            serde_json::to_string_pretty(&*state)?
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, json).await?;
        debug!("store: saved {}", path.display());
        Ok(())
    }

    fn load_persistent(state_file: &Path) -> PersistentState {
        let content = match std::fs::read_to_string(state_file) {
            Ok(c) => c,
            Err(_) => return PersistentState::default(),
        };
        match serde_json::from_str::<PersistentState>(&content) {
            Ok(persistent) => persistent,
            Err(e) => {
                warn!("store: ignoring unreadable {}: {}", state_file.display(), e);
                PersistentState::default()
            }
        }
    }
}
