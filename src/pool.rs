// Copyright (c) 2025 - Cowboy AI, Inc.
//! Local Pool - Providing and Discovery of Streams
//!
//! `LocalPool` is the facade callers use. It owns the registry and the
//! ordered factory list, and offers two operations:
//!
//! - `provide(id, stream)`: register an already built stream
//! - `discover(id)`: obtain the stream for an id, creating it through the
//!   factories when nobody provided it
//!
//! Each `discover` runs in a fresh [`TrackingDiscovery`], so cycle tracking
//! is scoped to that call. A pool is cheap to clone; clones share the same
//! registry.
//!
//! # Example
//!
//! ```rust
//! use stream_pool::{LocalPool, PoolError, ReactiveStream, StreamId};
//!
//! # tokio_test::block_on(async {
//! let pool = LocalPool::new();
//! let id: StreamId<&str> = StreamId::named("greetings");
//!
//! pool.provide(&id, ReactiveStream::from_iter(vec!["hello"])).unwrap();
//! assert!(matches!(
//!     pool.provide(&id, ReactiveStream::empty()),
//!     Err(PoolError::DuplicateRegistration(_))
//! ));
//!
//! let stream = pool.discover(&id).await.unwrap();
//! assert_eq!(stream.collect_all().await, vec!["hello"]);
//! # });
//! ```

use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use crate::composition::CompositionFactory;
use crate::config::PoolConfig;
use crate::discovery::TrackingDiscovery;
use crate::errors::{PoolError, PoolResult};
use crate::factory::StreamFactory;
use crate::hook;
use crate::registry::{AnyStream, PoolContent};
use crate::stream::ReactiveStream;
use crate::stream_id::{StreamId, StreamKey};

/// Pool for providing and discovering streams within one process
#[derive(Clone)]
pub struct LocalPool {
    name: Arc<str>,
    content: Arc<PoolContent>,
    factories: Arc<[Arc<dyn StreamFactory>]>,
}

impl LocalPool {
    /// Create a pool with default configuration and no factories
    ///
    /// Only provided streams can be discovered from such a pool.
    pub fn new() -> Self {
        Self::from_parts(PoolConfig::default(), Vec::new())
    }

    /// Create a pool with default configuration that resolves composite ids
    pub fn with_composition() -> Self {
        let factories: Vec<Arc<dyn StreamFactory>> = vec![Arc::new(CompositionFactory::new())];
        Self::from_parts(PoolConfig::default(), factories)
    }

    /// Start building a pool
    pub fn builder() -> PoolBuilder {
        PoolBuilder::default()
    }

    fn from_parts(config: PoolConfig, factories: Vec<Arc<dyn StreamFactory>>) -> Self {
        let content = PoolContent::new(config.hook_capacity);
        hook::install(&content);

        let names: Vec<&str> = factories.iter().map(|factory| factory.name()).collect();
        info!(pool = %config.name, factories = ?names, "Available stream factories");

        Self {
            name: config.name.into(),
            content: Arc::new(content),
            factories: factories.into(),
        }
    }

    /// Name of this pool
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register `stream` under `id`
    ///
    /// # Errors
    ///
    /// `DuplicateRegistration` if `id` is already registered or being
    /// materialized. The stream registered first stays in place.
    pub fn provide<T: Send + 'static>(
        &self,
        id: &StreamId<T>,
        stream: ReactiveStream<T>,
    ) -> PoolResult<()> {
        if self
            .content
            .register_if_absent(id.key().clone(), AnyStream::new(stream))
        {
            info!(pool = %self.name, id = %id, "Stream provided");
            Ok(())
        } else {
            warn!(pool = %self.name, id = %id, "Rejected duplicate stream registration");
            Err(PoolError::DuplicateRegistration(id.key().clone()))
        }
    }

    /// Start a fluent registration: `pool.provide_stream(stream).as_id(&id)`
    pub fn provide_stream<T: Send + 'static>(&self, stream: ReactiveStream<T>) -> Provision<'_, T> {
        Provision { pool: self, stream }
    }

    /// Discover the stream for `id`
    ///
    /// Returns the registered stream, or builds it through the factories
    /// and registers it. Every successful discovery of an id returns the
    /// same stream instance.
    ///
    /// # Errors
    ///
    /// - `CycleDetected` if building `id` requires `id` itself
    /// - `UnresolvableIdentity` if no factory can build `id`
    /// - `TypeMismatch` if the stream does not carry items of type `T`
    /// - any error raised by a factory
    ///
    /// # Deadlocks
    ///
    /// Cycle tracking is scoped to one call. If one call resolves `a` while
    /// depending on `b`, and a concurrent call resolves `b` while depending
    /// on `a`, each waits for the other's pending slot and neither returns.
    /// Wrap the call in `tokio::time::timeout` where factory dependencies
    /// may form such cross-call loops.
    pub async fn discover<T: Send + 'static>(
        &self,
        id: &StreamId<T>,
    ) -> PoolResult<ReactiveStream<T>> {
        TrackingDiscovery::new(&self.content, &self.factories)
            .discover(id)
            .await
    }

    /// Whether a stream is registered under `id`
    pub fn contains<T>(&self, id: &StreamId<T>) -> bool {
        self.content.contains(id.key())
    }

    /// Every registered id, including the registration hook
    pub fn registered_ids(&self) -> Vec<StreamKey> {
        self.content.resolved_keys()
    }
}

impl Default for LocalPool {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LocalPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.factories.iter().map(|factory| factory.name()).collect();
        f.debug_struct("LocalPool")
            .field("name", &self.name)
            .field("factories", &names)
            .finish_non_exhaustive()
    }
}

/// Pending registration created by [`LocalPool::provide_stream`]
#[must_use = "the stream is only registered once `as_id` is called"]
pub struct Provision<'p, T> {
    pool: &'p LocalPool,
    stream: ReactiveStream<T>,
}

impl<T: Send + 'static> Provision<'_, T> {
    /// Register the stream under `id`
    pub fn as_id(self, id: &StreamId<T>) -> PoolResult<()> {
        self.pool.provide(id, self.stream)
    }
}

/// Builder for [`LocalPool`]
///
/// Factories are consulted in the order they are added.
#[derive(Default)]
pub struct PoolBuilder {
    config: PoolConfig,
    factories: Vec<Arc<dyn StreamFactory>>,
}

impl PoolBuilder {
    /// Use `config` instead of the default configuration
    pub fn config(mut self, config: PoolConfig) -> Self {
        self.config = config;
        self
    }

    /// Append a factory
    pub fn factory<F: StreamFactory + 'static>(mut self, factory: F) -> Self {
        self.factories.push(Arc::new(factory));
        self
    }

    /// Append a factory that is shared with other owners
    pub fn shared_factory(mut self, factory: Arc<dyn StreamFactory>) -> Self {
        self.factories.push(factory);
        self
    }

    /// Build the pool
    ///
    /// # Errors
    ///
    /// `Configuration` if the configuration is invalid.
    pub fn build(self) -> PoolResult<LocalPool> {
        self.config.validate()?;
        Ok(LocalPool::from_parts(self.config, self.factories))
    }
}
