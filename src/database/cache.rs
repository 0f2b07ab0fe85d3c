//! Process-wide, lazily established connection handle.
//!
//! The first caller starts a connection attempt and parks it in the cache as a
//! shared future; callers arriving before it resolves await that same attempt.
//! A successful attempt is replaced by the resolved handle. A failed attempt is
//! evicted so that the next call starts a fresh one.

use crate::utils::error::AppError;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Produces a new connection handle. One call is one network-level setup.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Handle: Clone + Send + Sync + 'static;

    async fn connect(&self) -> Result<Self::Handle, AppError>;
}

type Attempt<H> = Shared<BoxFuture<'static, Result<H, AppError>>>;

enum Slot<H> {
    Empty,
    Pending { generation: u64, attempt: Attempt<H> },
    Ready(H),
}

pub struct ConnectionCache<C: Connector> {
    connector: Arc<C>,
    slot: Mutex<Slot<C::Handle>>,
    generation: AtomicU64,
}

impl<C: Connector> ConnectionCache<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector: Arc::new(connector),
            slot: Mutex::new(Slot::Empty),
            generation: AtomicU64::new(0),
        }
    }

    /// Returns the cached handle, or joins (or starts) the in-flight attempt.
    pub async fn get(&self) -> Result<C::Handle, AppError> {
        let (generation, attempt) = {
            let mut slot = self.lock_slot()?;
            let joined = match &*slot {
                Slot::Ready(handle) => return Ok(handle.clone()),
                Slot::Pending { generation, attempt } => (*generation, attempt.clone()),
                Slot::Empty => {
                    let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
                    let connector = Arc::clone(&self.connector);
                    let attempt = async move { connector.connect().await }.boxed().shared();

                    log::debug!("🔌 Starting database connection attempt #{}", generation);
                    *slot = Slot::Pending {
                        generation,
                        attempt: attempt.clone(),
                    };
                    (generation, attempt)
                }
            };
            joined
        };

        let result = attempt.await;

        // Only the generation that is still parked may settle the slot.
        let mut slot = self.lock_slot()?;
        if let Slot::Pending { generation: current, .. } = &*slot {
            if *current == generation {
                match &result {
                    Ok(handle) => {
                        log::info!("✅ Database connection #{} established", generation);
                        *slot = Slot::Ready(handle.clone());
                    }
                    Err(e) => {
                        log::error!("❌ Database connection #{} failed: {}", generation, e);
                        *slot = Slot::Empty;
                    }
                }
            }
        }

        result
    }

    /// True once a handle has been resolved and cached.
    pub fn is_connected(&self) -> bool {
        matches!(self.slot.lock().as_deref(), Ok(Slot::Ready(_)))
    }

    fn lock_slot(&self) -> Result<std::sync::MutexGuard<'_, Slot<C::Handle>>, AppError> {
        self.slot
            .lock()
            .map_err(|_| AppError::Connection("connection cache poisoned".to_string()))
    }
}
