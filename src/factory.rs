// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stream Factories
//!
//! A factory is consulted when a discovered id has not been registered yet.
//! The pool holds an ordered list of factories and asks each in turn; the
//! first one returning a stream wins, so list order is the only tie-break
//! between factories that could answer the same id.
//!
//! Factories receive the [`TrackingDiscovery`] of the resolution in progress.
//! Any stream a factory discovers through it extends the same resolution
//! chain, which is how cycles spanning several factories are detected.
//!
//! # Example
//!
//! ```rust
//! use stream_pool::{CreatorStreamFactory, LocalPool, ReactiveStream, StreamId};
//!
//! # tokio_test::block_on(async {
//! let readings: StreamId<i32> = StreamId::named("readings");
//!
//! let mut creators = CreatorStreamFactory::new();
//! creators
//!     .provide_fn(readings.clone(), || ReactiveStream::from_iter(vec![1, 2, 3]))
//!     .unwrap();
//!
//! let pool = LocalPool::builder().factory(creators).build().unwrap();
//! let stream = pool.discover(&readings).await.unwrap();
//! assert_eq!(stream.collect_all().await, vec![1, 2, 3]);
//! # });
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::discovery::TrackingDiscovery;
use crate::errors::{PoolError, PoolResult};
use crate::registry::AnyStream;
use crate::stream::ReactiveStream;
use crate::stream_id::{StreamId, StreamKey};

/// Capability creating streams for ids nobody has provided
#[async_trait]
pub trait StreamFactory: Send + Sync {
    /// Create the stream for `id`, or return `None` if this factory does not
    /// know the id
    ///
    /// # Arguments
    ///
    /// * `id` - Identity being resolved
    /// * `discovery` - Resolution context for discovering source streams
    async fn create(
        &self,
        id: &StreamKey,
        discovery: &mut TrackingDiscovery<'_>,
    ) -> PoolResult<Option<AnyStream>>;

    /// Name used in log output
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Creator of the stream for one specific id
#[async_trait]
pub trait StreamCreator<T: Send + 'static>: Send + Sync {
    /// Build the stream, discovering any sources through `discovery`
    async fn create(&self, discovery: &mut TrackingDiscovery<'_>) -> PoolResult<ReactiveStream<T>>;
}

struct FnCreator<F>(F);

#[async_trait]
impl<T, F> StreamCreator<T> for FnCreator<F>
where
    T: Send + 'static,
    F: Fn() -> ReactiveStream<T> + Send + Sync,
{
    async fn create(&self, _discovery: &mut TrackingDiscovery<'_>) -> PoolResult<ReactiveStream<T>> {
        Ok((self.0)())
    }
}

#[async_trait]
trait ErasedCreator: Send + Sync {
    async fn create(&self, discovery: &mut TrackingDiscovery<'_>) -> PoolResult<AnyStream>;
}

struct TypedCreator<T, C> {
    creator: C,
    _item: PhantomData<fn() -> T>,
}

#[async_trait]
impl<T, C> ErasedCreator for TypedCreator<T, C>
where
    T: Send + 'static,
    C: StreamCreator<T>,
{
    async fn create(&self, discovery: &mut TrackingDiscovery<'_>) -> PoolResult<AnyStream> {
        self.creator.create(discovery).await.map(AnyStream::new)
    }
}

/// Factory answering a fixed table of ids, each with its own creator
#[derive(Default)]
pub struct CreatorStreamFactory {
    creators: HashMap<StreamKey, Arc<dyn ErasedCreator>>,
}

impl CreatorStreamFactory {
    /// Create a factory with no creators
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the creator for `id`
    ///
    /// # Errors
    ///
    /// `DuplicateRegistration` if `id` already has a creator.
    pub fn provide<T, C>(&mut self, id: StreamId<T>, creator: C) -> PoolResult<()>
    where
        T: Send + 'static,
        C: StreamCreator<T> + 'static,
    {
        let key = id.into_key();
        if self.creators.contains_key(&key) {
            return Err(PoolError::DuplicateRegistration(key));
        }

        self.creators.insert(
            key,
            Arc::new(TypedCreator {
                creator,
                _item: PhantomData,
            }),
        );
        Ok(())
    }

    /// Register a creator that needs no other streams
    pub fn provide_fn<T, F>(&mut self, id: StreamId<T>, f: F) -> PoolResult<()>
    where
        T: Send + 'static,
        F: Fn() -> ReactiveStream<T> + Send + Sync + 'static,
    {
        self.provide(id, FnCreator(f))
    }

    /// Number of registered creators
    pub fn len(&self) -> usize {
        self.creators.len()
    }

    /// Whether no creators are registered
    pub fn is_empty(&self) -> bool {
        self.creators.is_empty()
    }
}

impl fmt::Debug for CreatorStreamFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreatorStreamFactory")
            .field("ids", &self.creators.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[async_trait]
impl StreamFactory for CreatorStreamFactory {
    async fn create(
        &self,
        id: &StreamKey,
        discovery: &mut TrackingDiscovery<'_>,
    ) -> PoolResult<Option<AnyStream>> {
        let Some(creator) = self.creators.get(id).cloned() else {
            return Ok(None);
        };
        creator.create(discovery).await.map(Some)
    }

    fn name(&self) -> &str {
        "creator"
    }
}
