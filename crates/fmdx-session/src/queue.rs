//! Outbound command queue.
//!
//! Bursty user input (a tuning knob spun quickly) must never block on the
//! network.  Commands go into a bounded FIFO that evicts the *oldest* entry
//! when full, and a single forwarding task drains it into the control
//! connection in submission order.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use fmdx_proto::command::TunerCommand;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::collab::ControlHandle;

pub const COMMAND_QUEUE_CAPACITY: usize = 64;

struct Inner {
    items: VecDeque<TunerCommand>,
    closed: bool,
    dropped: u64,
}

pub struct CommandQueue {
    inner: Mutex<Inner>,
    notify: Notify,
    capacity: usize,
}

impl CommandQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(Inner {
                items: VecDeque::with_capacity(capacity),
                closed: false,
                dropped: 0,
            }),
            notify: Notify::new(),
            capacity,
        }
    }

    /// Enqueue without waiting.  Returns the command evicted to make room,
    /// if any.  Pushing to a closed queue drops the new command.
    pub fn push(&self, cmd: TunerCommand) -> Option<TunerCommand> {
        let evicted = {
            let mut inner = self.lock();
            if inner.closed {
                debug!("queue: closed, dropping {}", cmd);
                return Some(cmd);
            }
            let evicted = if inner.items.len() >= self.capacity {
                inner.dropped += 1;
                inner.items.pop_front()
            } else {
                None
            };
            inner.items.push_back(cmd);
            evicted
        };
        if let Some(old) = &evicted {
            debug!("queue: full, dropped oldest {}", old);
        }
        self.notify.notify_one();
        evicted
    }

    /// Wait for the next command.  `None` once the queue is closed.
    pub async fn pop(&self) -> Option<TunerCommand> {
        loop {
            let notified = self.notify.notified();
            {
                let mut inner = self.lock();
                if inner.closed {
                    return None;
                }
                if let Some(cmd) = inner.items.pop_front() {
                    return Some(cmd);
                }
            }
            notified.await;
        }
    }

    /// Close the queue and discard anything still pending.
    pub fn close(&self) {
        {
            let mut inner = self.lock();
            inner.closed = true;
            inner.items.clear();
        }
        self.notify.notify_waiters();
        self.notify.notify_one();
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of commands evicted by overflow.
    pub fn dropped(&self) -> u64 {
        self.lock().dropped
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Drain `queue` into `handle` until the queue closes or `cancel` fires.
pub async fn forward(
    queue: Arc<CommandQueue>,
    handle: Arc<dyn ControlHandle>,
    cancel: CancellationToken,
) {
    loop {
        let cmd = tokio::select! {
            _ = cancel.cancelled() => break,
            cmd = queue.pop() => match cmd {
                Some(cmd) => cmd,
                None => break,
            },
        };
        let wire = cmd.to_string();
        debug!("control: sending command={}", wire);
        if let Err(e) = handle.send(&wire).await {
            warn!("control: send '{}' failed: {}", wire, e);
        }
    }
    debug!("control: command forwarder stopped");
}
