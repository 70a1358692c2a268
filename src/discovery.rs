// Copyright (c) 2025 - Cowboy AI, Inc.
//! Tracking Discovery - Resolution with Cycle Detection
//!
//! Every top-level `discover` on a pool creates a fresh `TrackingDiscovery`.
//! It resolves the requested id and, through the factories it hands itself
//! to, every id that id depends on. The ids currently being resolved form
//! the [`ResolutionChain`]; meeting one of them again is a cycle.
//!
//! # Resolution Steps
//!
//! ```text
//! discover(id)
//!   │
//!   ├─ resolved in registry? ──────────────> return cached stream
//!   ├─ id already in chain? ───────────────> CycleDetected(chain)
//!   ├─ push id onto chain
//!   ├─ claim registry slot
//!   │    ├─ resolved meanwhile ────────────> return it
//!   │    ├─ pending elsewhere ─────────────> wait for that outcome
//!   │    └─ won ──> ask factories in order
//!   │                 ├─ first Some wins ──> resolve slot
//!   │                 └─ all None ─────────> UnresolvableIdentity
//!   └─ pop id from chain
//! ```
//!
//! The chain is passed explicitly through every nested call rather than kept
//! in thread-local state, so resolution is correct whichever task or thread
//! executes a given step.

use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::errors::{PoolError, PoolResult};
use crate::factory::StreamFactory;
use crate::registry::{AnyStream, Claim, PoolContent};
use crate::stream::ReactiveStream;
use crate::stream_id::{StreamId, StreamKey};

/// Ids being resolved by one top-level discovery, outermost first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionChain {
    ids: Vec<StreamKey>,
}

impl ResolutionChain {
    /// Whether `id` is currently being resolved
    pub fn contains(&self, id: &StreamKey) -> bool {
        self.ids.contains(id)
    }

    /// The ids in resolution order
    pub fn ids(&self) -> &[StreamKey] {
        &self.ids
    }

    /// Number of ids being resolved
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is being resolved
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn push(&mut self, id: StreamKey) {
        self.ids.push(id);
    }

    fn pop(&mut self) {
        self.ids.pop();
    }
}

/// Resolution context for one top-level discovery
pub struct TrackingDiscovery<'a> {
    content: &'a PoolContent,
    factories: &'a [Arc<dyn StreamFactory>],
    chain: ResolutionChain,
}

impl<'a> TrackingDiscovery<'a> {
    /// Create a context with an empty chain
    pub fn new(content: &'a PoolContent, factories: &'a [Arc<dyn StreamFactory>]) -> Self {
        Self {
            content,
            factories,
            chain: ResolutionChain::default(),
        }
    }

    /// The ids currently being resolved
    pub fn chain(&self) -> &ResolutionChain {
        &self.chain
    }

    /// Discover the stream for `id`
    ///
    /// # Errors
    ///
    /// - `CycleDetected` if `id` is already being resolved by this context
    /// - `UnresolvableIdentity` if no factory could create it
    /// - `TypeMismatch` if the stream does not carry items of type `T`
    pub async fn discover<T: Send + 'static>(
        &mut self,
        id: &StreamId<T>,
    ) -> PoolResult<ReactiveStream<T>> {
        self.discover_any(id.key()).await?.downcast(id.key())
    }

    /// Discover the type-erased stream for `key`
    pub fn discover_any<'s>(&'s mut self, key: &'s StreamKey) -> BoxFuture<'s, PoolResult<AnyStream>> {
        Box::pin(async move {
            if let Some(stream) = self.content.lookup(key) {
                debug!(id = %key, "Discovered cached stream");
                return Ok(stream);
            }

            if self.chain.contains(key) {
                let chain = self.chain.ids().to_vec();
                warn!(id = %key, depth = chain.len(), "Cycle in stream discovery detected");
                return Err(PoolError::CycleDetected {
                    id: key.clone(),
                    chain,
                });
            }

            self.chain.push(key.clone());
            let outcome = self.materialize(key).await;
            self.chain.pop();
            outcome
        })
    }

    async fn materialize(&mut self, key: &StreamKey) -> PoolResult<AnyStream> {
        let content = self.content;
        loop {
            match content.claim(key) {
                Claim::Resolved(stream) => return Ok(stream),
                Claim::Pending(pending) => {
                    debug!(id = %key, "Waiting for concurrent materialization");
                    if let Some(outcome) = pending.wait().await {
                        return outcome;
                    }
                }
                Claim::Won(ticket) => {
                    let outcome = self.create(key).await;
                    return ticket.complete(outcome);
                }
            }
        }
    }

    async fn create(&mut self, key: &StreamKey) -> PoolResult<AnyStream> {
        let factories = self.factories;
        for factory in factories {
            if let Some(stream) = factory.create(key, self).await? {
                debug!(id = %key, factory = factory.name(), "Stream created by factory");
                return Ok(stream);
            }
        }

        warn!(id = %key, "No factory could create stream");
        Err(PoolError::UnresolvableIdentity(key.clone()))
    }
}
