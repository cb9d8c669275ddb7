use bytes::Bytes;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use ferrous_relay_domain::DomainError;
use std::sync::atomic::{AtomicU16, Ordering};
use tokio::sync::oneshot;

/// Outstanding queries on one connection, keyed by the transaction id we
/// put on the wire. Concurrent callers never share an id.
pub(crate) struct PendingQueries {
    waiters: DashMap<u16, oneshot::Sender<Bytes>>,
    next_id: AtomicU16,
}

impl PendingQueries {
    pub fn new() -> Self {
        Self {
            waiters: DashMap::new(),
            next_id: AtomicU16::new(fastrand::u16(..)),
        }
    }

    /// Reserve a free id. The returned guard releases it when dropped, so a
    /// caller that times out never leaks its slot.
    pub fn register(&self, server: &str) -> Result<PendingQuery<'_>, DomainError> {
        if self.waiters.len() > u16::MAX as usize {
            return Err(DomainError::TooManyInflight {
                server: server.to_string(),
            });
        }

        let (tx, rx) = oneshot::channel();
        loop {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            if let Entry::Vacant(slot) = self.waiters.entry(id) {
                slot.insert(tx);
                return Ok(PendingQuery {
                    owner: self,
                    id,
                    rx: Some(rx),
                });
            }
        }
    }

    /// Hand a response to its waiter. Returns false for unknown ids.
    pub fn complete(&self, id: u16, payload: Bytes) -> bool {
        match self.waiters.remove(&id) {
            Some((_, tx)) => tx.send(payload).is_ok(),
            None => false,
        }
    }

    /// Whether a caller is still waiting on `id`.
    pub fn is_waiting(&self, id: u16) -> bool {
        self.waiters.contains_key(&id)
    }

    /// Drop every waiter; their receivers observe a closed channel.
    pub fn fail_all(&self) {
        self.waiters.clear();
    }

    pub fn len(&self) -> usize {
        self.waiters.len()
    }
}

pub(crate) struct PendingQuery<'a> {
    owner: &'a PendingQueries,
    id: u16,
    rx: Option<oneshot::Receiver<Bytes>>,
}

impl PendingQuery<'_> {
    pub fn id(&self) -> u16 {
        self.id
    }

    /// `None` when the connection went away before a response arrived.
    pub async fn response(&mut self) -> Option<Bytes> {
        let rx = self.rx.take()?;
        rx.await.ok()
    }
}

impl Drop for PendingQuery<'_> {
    fn drop(&mut self) {
        self.owner.waiters.remove(&self.id);
    }
}
