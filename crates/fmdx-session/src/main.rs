//! fmdx-probe: check that a tuner server is reachable and show what it
//! reports, without opening a control session.
//!
//!   fmdx-probe [server-address]
//!
//! With no argument the last address from the settings store is used.

use fmdx_proto::config::Config;
use fmdx_proto::model;
use fmdx_proto::platform;
use fmdx_proto::store::SettingsStore;
use fmdx_session::address;
use fmdx_session::collab::{InfoFetcher, SpectrumFetcher};
use fmdx_session::http::HttpCollaborator;
use fmdx_session::logging;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_path = platform::log_path();
    logging::init(&log_path)?;
    eprintln!("fmdx log: {}", log_path.display());

    // ── Load config ──────────────────────────────────────────────────────────

    let config = Config::load()?;
    info!("Config loaded from: {:?}", Config::config_path());
    let store = SettingsStore::open(config.store.state_file.clone());

    let raw = match std::env::args().nth(1) {
        Some(arg) => arg,
        None => store.server_address().await.unwrap_or_default(),
    };
    let endpoint = address::normalize(&raw)?;
    let identity = config.client.identity.as_str();

    // ── Probe ────────────────────────────────────────────────────────────────

    let http = HttpCollaborator::new(&config.http)?;
    let tuner = http.fetch_info(&endpoint, identity).await?;
    info!("probe: {} answered as {:?}", endpoint, tuner.tuner_name);
    store.set_server_address(&endpoint).await?;

    println!("server:   {}", endpoint);
    println!("tuner:    {}", tuner.tuner_name);
    if !tuner.tuner_description.is_empty() {
        println!("about:    {}", tuner.tuner_description);
    }
    let antennas = if tuner.antenna_names.is_empty() {
        "Default".to_string()
    } else {
        tuner.antenna_names.join(", ")
    };
    println!(
        "antennas: {}{}",
        antennas,
        if tuner.can_switch_antenna { "" } else { " (fixed)" }
    );

    match http.fetch_spectrum(&endpoint, identity).await {
        Ok(points) if points.is_empty() => println!("spectrum: none yet"),
        Ok(points) => {
            let spectrum = model::ensure_spectrum(points);
            let peak = spectrum
                .iter()
                .max_by(|a, b| a.signal_level.total_cmp(&b.signal_level));
            if let (Some(first), Some(last), Some(peak)) =
                (spectrum.first(), spectrum.last(), peak)
            {
                println!(
                    "spectrum: {} points {:.2}-{:.2} MHz, strongest {:.2} MHz ({:.1})",
                    spectrum.len(),
                    first.frequency_mhz,
                    last.frequency_mhz,
                    peak.frequency_mhz,
                    peak.signal_level
                );
            }
        }
        Err(e) => {
            warn!("probe: spectrum unavailable: {}", e);
            println!("spectrum: unavailable ({})", e);
        }
    }

    Ok(())
}
