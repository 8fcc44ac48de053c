//! Session orchestration for a networked FM-DX tuner.
//!
//! [`SessionCore`] is a single-owner event loop holding the [`SessionState`].
//! User intents, control-connection pushes, scan results and audio play-state
//! reports all arrive as [`SessionEvent`]s; nothing else writes the state.
//! Presentation observes snapshots through a `watch` channel obtained from
//! [`SessionHandle::subscribe`].
//!
//! The buffering pipeline is owned by the [`BufferReconfigurator`], which
//! swaps in a freshly built pipeline whenever the buffer settings change.

pub mod address;
pub mod buffer;
pub mod collab;
pub mod core;
pub mod error;
pub mod http;
pub mod logging;
pub mod queue;
pub mod scan;
pub mod state;

pub use crate::buffer::{BufferProfile, BufferReconfigurator};
pub use crate::core::{Collaborators, SessionCore, SessionEvent, SessionHandle};
pub use crate::error::{Result, SessionError};
pub use crate::state::{ConnectionPhase, SessionState};
