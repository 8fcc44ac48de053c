//! Shared data model for the FM-DX tuner client.
//!
//! Everything in here is plain data plus the bits of persistence that sit
//! underneath the session layer: the command surface spoken to the tuner,
//! user settings, the TOML config file and the JSON settings store.

pub mod command;
pub mod config;
pub mod model;
pub mod platform;
pub mod settings;
pub mod store;

pub use command::TunerCommand;
pub use model::{SignalUnit, SpectrumPoint, TunerInfo, TunerState};
pub use settings::Settings;
