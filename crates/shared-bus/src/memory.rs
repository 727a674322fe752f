//! # In-Memory Transport
//!
//! Reference transport connecting contexts inside one process.

use crate::channel::{Channel, Delivery, TransportError};
use crate::faults::FaultConfig;
use crate::inbox::Inbox;
use parking_lot::{Mutex, RwLock};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared_types::Origin;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Delivery counters.
#[derive(Debug, Default)]
pub struct TransportStats {
    /// Messages accepted by `send`.
    pub sent: AtomicU64,
    /// Copies handed to an inbox (duplicates counted).
    pub delivered: AtomicU64,
    /// Messages lost to fault injection.
    pub dropped: AtomicU64,
    /// Extra copies produced by fault injection.
    pub duplicated: AtomicU64,
}

struct TransportInner {
    /// Mailbox per attached origin.
    mailboxes: RwLock<HashMap<Origin, mpsc::UnboundedSender<Delivery>>>,
    faults: FaultConfig,
    rng: Mutex<StdRng>,
    stats: TransportStats,
}

/// In-memory implementation of the transport.
///
/// Uses one unbounded `tokio::sync::mpsc` channel per attached context.
/// Cloning yields another handle to the same transport.
#[derive(Clone)]
pub struct InMemoryTransport {
    inner: Arc<TransportInner>,
}

impl InMemoryTransport {
    /// Create a transport that delivers every message once, immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::with_faults(FaultConfig::reliable())
    }

    /// Create a transport with the given fault profile.
    #[must_use]
    pub fn with_faults(faults: FaultConfig) -> Self {
        let rng = StdRng::seed_from_u64(faults.seed);
        Self {
            inner: Arc::new(TransportInner {
                mailboxes: RwLock::new(HashMap::new()),
                faults,
                rng: Mutex::new(rng),
                stats: TransportStats::default(),
            }),
        }
    }

    /// Attach a context under `origin`.
    ///
    /// Returns the context's sending handle and its single subscription.
    /// An origin whose previous inbox was dropped may attach again.
    pub fn attach(
        &self,
        origin: impl Into<Origin>,
    ) -> Result<(ContextHandle, Inbox), TransportError> {
        let origin = origin.into();
        let (sender, receiver) = mpsc::unbounded_channel();

        {
            let mut mailboxes = self.inner.mailboxes.write();
            if let Some(existing) = mailboxes.get(&origin) {
                if !existing.is_closed() {
                    return Err(TransportError::AlreadyAttached(origin));
                }
            }
            mailboxes.insert(origin.clone(), sender);
        }

        debug!(origin = %origin, "Context attached");

        let handle = ContextHandle {
            origin: origin.clone(),
            inner: self.inner.clone(),
        };
        Ok((handle, Inbox::new(origin, receiver)))
    }

    /// Detach a context; later sends to it fail with `UnknownTarget`.
    pub fn detach(&self, origin: &Origin) {
        if self.inner.mailboxes.write().remove(origin).is_some() {
            debug!(origin = %origin, "Context detached");
        }
    }

    /// Whether a live context is attached under `origin`.
    pub fn is_attached(&self, origin: &Origin) -> bool {
        self.inner
            .mailboxes
            .read()
            .get(origin)
            .is_some_and(|mailbox| !mailbox.is_closed())
    }

    pub fn stats(&self) -> &TransportStats {
        &self.inner.stats
    }
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportInner {
    fn deliver(&self, sender: &Origin, target: &Origin, message: String) -> Result<(), TransportError> {
        let mailbox = self
            .mailboxes
            .read()
            .get(target)
            .cloned()
            .ok_or_else(|| TransportError::UnknownTarget(target.clone()))?;

        if mailbox.is_closed() {
            return Err(TransportError::Disconnected(target.clone()));
        }

        self.stats.sent.fetch_add(1, Ordering::Relaxed);

        let (lost, duplicated, delays) = self.roll_faults();
        if lost {
            self.stats.dropped.fetch_add(1, Ordering::Relaxed);
            debug!(sender = %sender, target = %target, "Message lost (fault injection)");
            return Ok(());
        }
        if duplicated {
            self.stats.duplicated.fetch_add(1, Ordering::Relaxed);
        }

        for delay in delays {
            let delivery = Delivery {
                message: message.clone(),
                sender: sender.clone(),
            };
            self.stats.delivered.fetch_add(1, Ordering::Relaxed);
            push_after(mailbox.clone(), delivery, delay);
        }

        Ok(())
    }

    /// Decide the fate of one message: lost, duplicated, and the delay of
    /// each delivered copy.
    fn roll_faults(&self) -> (bool, bool, Vec<Duration>) {
        let faults = &self.faults;
        if faults.is_reliable() {
            return (false, false, vec![Duration::ZERO]);
        }

        let mut rng = self.rng.lock();
        let lost = rng.gen::<f64>() < faults.drop_rate;
        let duplicated = !lost && rng.gen::<f64>() < faults.duplicate_rate;
        let copies = if duplicated { 2 } else { 1 };

        let max_delay_ms = u64::try_from(faults.max_delay.as_millis()).unwrap_or(u64::MAX);
        let delays = (0..copies)
            .map(|_| {
                if max_delay_ms == 0 {
                    Duration::ZERO
                } else {
                    Duration::from_millis(rng.gen_range(0..=max_delay_ms))
                }
            })
            .collect();

        (lost, duplicated, delays)
    }
}

/// Push a delivery into a mailbox, after `delay` if non-zero.
///
/// Delayed pushes need a Tokio runtime; without one the copy is delivered
/// immediately.
fn push_after(mailbox: mpsc::UnboundedSender<Delivery>, delivery: Delivery, delay: Duration) {
    if !delay.is_zero() {
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                tokio::time::sleep(delay).await;
                if mailbox.send(delivery).is_err() {
                    debug!("Delayed delivery discarded (inbox dropped)");
                }
            });
            return;
        }
    }

    if mailbox.send(delivery).is_err() {
        warn!("Delivery discarded (inbox dropped)");
    }
}

/// Sending handle of one attached context.
#[derive(Clone)]
pub struct ContextHandle {
    origin: Origin,
    inner: Arc<TransportInner>,
}

impl std::fmt::Debug for ContextHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextHandle")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

impl Channel for ContextHandle {
    fn local_origin(&self) -> &Origin {
        &self.origin
    }

    fn send(&self, target: &Origin, message: String) -> Result<(), TransportError> {
        self.inner.deliver(&self.origin, target, message)
    }
}
