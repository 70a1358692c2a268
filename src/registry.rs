// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pool Content - the Stream Registry
//!
//! `PoolContent` maps stream identities to registry slots. It is the only
//! mutable state shared between callers of a pool, and every mutation goes
//! through one of two atomic primitives:
//!
//! - [`PoolContent::register_if_absent`]: direct registration of a stream
//! - [`PoolContent::claim`]: start of a lazy materialization
//!
//! # Slot Lifecycle
//!
//! ```text
//!            claim() wins               complete(Ok)
//! absent ───────────────────> pending ───────────────> resolved
//!   │  ▲                         │
//!   │  └─────────────────────────┘ complete(Err) / ticket dropped
//!   │
//!   └────────────────────────────────────────────────> resolved
//!            register_if_absent()
//! ```
//!
//! A resolved slot is never replaced or evicted. A pending slot is owned by
//! exactly one [`PendingSlot`] ticket; other claimants receive a
//! [`PendingOutcome`] and wait for that ticket's result instead of building
//! the stream themselves.
//!
//! The map is sharded, so callers working on unrelated ids do not contend on
//! a single lock, and no lock is held while a stream is being built.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::debug;

use crate::config::MAX_HOOK_CAPACITY;
use crate::errors::{PoolError, PoolResult};
use crate::stream::ReactiveStream;
use crate::stream_id::StreamKey;

/// Type-erased handle to a registered `ReactiveStream`
#[derive(Clone)]
pub struct AnyStream {
    stream: Arc<dyn Any + Send + Sync>,
    item_type: &'static str,
}

impl AnyStream {
    /// Erase the item type of a stream
    pub fn new<T: Send + 'static>(stream: ReactiveStream<T>) -> Self {
        Self {
            stream: Arc::new(stream),
            item_type: type_name::<T>(),
        }
    }

    /// Name of the item type the stream carries
    pub fn item_type(&self) -> &'static str {
        self.item_type
    }

    /// Recover the typed stream registered under `id`
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if the stream does not carry items of type `T`.
    pub fn downcast<T: Send + 'static>(&self, id: &StreamKey) -> PoolResult<ReactiveStream<T>> {
        self.stream
            .downcast_ref::<ReactiveStream<T>>()
            .cloned()
            .ok_or_else(|| PoolError::TypeMismatch {
                id: id.clone(),
                expected: type_name::<T>(),
                found: self.item_type,
            })
    }

    /// Whether both handles wrap the same registered stream
    pub fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.stream, &other.stream)
    }
}

impl fmt::Debug for AnyStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyStream")
            .field("item_type", &self.item_type)
            .finish_non_exhaustive()
    }
}

type Outcome = Option<PoolResult<AnyStream>>;

enum Slot {
    Pending(watch::Receiver<Outcome>),
    Resolved(AnyStream),
}

/// Result of trying to claim a slot for materialization
pub enum Claim<'a> {
    /// The id is already resolved
    Resolved(AnyStream),
    /// Another caller is building the stream
    Pending(PendingOutcome),
    /// This caller must build the stream and complete the ticket
    Won(PendingSlot<'a>),
}

/// Concurrent registry of streams by identity
pub struct PoolContent {
    slots: DashMap<StreamKey, Slot>,
    registrations: broadcast::Sender<StreamKey>,
}

impl PoolContent {
    /// Create an empty registry
    ///
    /// # Arguments
    ///
    /// * `hook_capacity` - Registration events buffered per slow subscriber,
    ///   clamped to `1..=MAX_HOOK_CAPACITY`
    pub fn new(hook_capacity: usize) -> Self {
        let (registrations, _) = broadcast::channel(hook_capacity.clamp(1, MAX_HOOK_CAPACITY));
        Self {
            slots: DashMap::new(),
            registrations,
        }
    }

    /// The resolved stream for `key`, if any
    ///
    /// Never waits: a pending slot reads as absent.
    pub fn lookup(&self, key: &StreamKey) -> Option<AnyStream> {
        let slot = self.slots.get(key)?;
        match slot.value() {
            Slot::Resolved(stream) => Some(stream.clone()),
            Slot::Pending(_) => None,
        }
    }

    /// Register `stream` under `key` unless an entry already exists
    ///
    /// Returns true if this call performed the insertion.
    pub fn register_if_absent(&self, key: StreamKey, stream: AnyStream) -> bool {
        let inserted = match self.slots.entry(key.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(Slot::Resolved(stream));
                true
            }
        };

        if inserted {
            self.publish(&key);
        }
        inserted
    }

    /// Claim the slot for `key` in order to materialize it
    ///
    /// Exactly one concurrent claimant of an absent slot receives
    /// [`Claim::Won`]; the others receive [`Claim::Pending`] until the winner
    /// completes or abandons its ticket.
    pub fn claim(&self, key: &StreamKey) -> Claim<'_> {
        match self.slots.entry(key.clone()) {
            Entry::Occupied(occupied) => match occupied.get() {
                Slot::Resolved(stream) => Claim::Resolved(stream.clone()),
                Slot::Pending(receiver) => Claim::Pending(PendingOutcome {
                    receiver: receiver.clone(),
                }),
            },
            Entry::Vacant(vacant) => {
                let (sender, receiver) = watch::channel(None);
                vacant.insert(Slot::Pending(receiver));
                debug!(id = %key, "Claimed pending slot");
                Claim::Won(PendingSlot {
                    content: self,
                    key: key.clone(),
                    sender,
                    completed: false,
                })
            }
        }
    }

    /// Whether a resolved entry exists for `key`
    pub fn contains(&self, key: &StreamKey) -> bool {
        self.lookup(key).is_some()
    }

    /// Snapshot of every resolved key
    pub fn resolved_keys(&self) -> Vec<StreamKey> {
        self.slots
            .iter()
            .filter(|entry| matches!(entry.value(), Slot::Resolved(_)))
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Sender feeding the registration hook
    pub fn registrations(&self) -> broadcast::Sender<StreamKey> {
        self.registrations.clone()
    }

    fn publish(&self, key: &StreamKey) {
        if *key == StreamKey::NewStreamHook {
            return;
        }
        // Err only means nobody is listening.
        let _ = self.registrations.send(key.clone());
    }
}

impl Default for PoolContent {
    fn default() -> Self {
        Self::new(crate::config::PoolConfig::default().hook_capacity)
    }
}

/// Ticket owning a pending slot
///
/// Completing the ticket resolves or retracts the slot and wakes every
/// waiter. Dropping it without completing retracts the slot.
pub struct PendingSlot<'a> {
    content: &'a PoolContent,
    key: StreamKey,
    sender: watch::Sender<Outcome>,
    completed: bool,
}

impl PendingSlot<'_> {
    /// The id this ticket is materializing
    pub fn key(&self) -> &StreamKey {
        &self.key
    }

    /// Publish the outcome of the materialization
    ///
    /// On success the slot becomes resolved. On failure it is removed so a
    /// later attempt starts from absent; current waiters receive the failure.
    pub fn complete(mut self, outcome: PoolResult<AnyStream>) -> PoolResult<AnyStream> {
        match &outcome {
            Ok(stream) => {
                self.content
                    .slots
                    .insert(self.key.clone(), Slot::Resolved(stream.clone()));
                self.content.publish(&self.key);
                debug!(id = %self.key, "Materialized stream");
            }
            Err(error) => {
                self.retract();
                debug!(id = %self.key, %error, "Materialization failed, slot retracted");
            }
        }

        self.completed = true;
        self.sender.send_replace(Some(outcome.clone()));
        outcome
    }

    fn retract(&self) {
        self.content
            .slots
            .remove_if(&self.key, |_, slot| matches!(slot, Slot::Pending(_)));
    }
}

impl Drop for PendingSlot<'_> {
    fn drop(&mut self) {
        if !self.completed {
            self.retract();
            debug!(id = %self.key, "Pending slot abandoned");
        }
    }
}

/// Handle for waiting on another caller's materialization
pub struct PendingOutcome {
    receiver: watch::Receiver<Outcome>,
}

impl PendingOutcome {
    /// Wait for the owning ticket to finish
    ///
    /// Returns `None` if the ticket was abandoned, in which case the slot has
    /// been retracted and the caller may claim it again.
    pub async fn wait(mut self) -> Option<PoolResult<AnyStream>> {
        match self.receiver.wait_for(Option::is_some).await {
            Ok(outcome) => (*outcome).clone(),
            Err(_) => None,
        }
    }
}
