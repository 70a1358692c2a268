// Copyright (c) 2025 - Cowboy AI, Inc.
//! Reactive Streams - Shareable Push-Based Event Streams
//!
//! This module provides `ReactiveStream<T>`, the stream handle stored in and
//! discovered from the pool. A `ReactiveStream` is a *description* of a flow of
//! items: every call to [`ReactiveStream::subscribe`] starts a fresh
//! `futures::Stream` over the same source.
//!
//! # Characteristics
//!
//! - **Cold by default**: Each subscriber sees the source from its beginning
//! - **Shareable**: Handles are cheap to clone and `Send + Sync`
//! - **Identity-preserving**: Clones of a handle are the *same instance*
//! - **Pure combinators**: Deriving a stream never mutates its source
//!
//! ```text
//! ReactiveStream<T> ──subscribe()──> BoxStream<T>   (subscriber 1)
//!        │
//!        └─────────subscribe()──> BoxStream<T>   (subscriber 2)
//! ```
//!
//! # Hot Streams
//!
//! [`ReactiveStream::from_broadcast`] wraps a `tokio::sync::broadcast` sender.
//! Subscribers only observe items sent after they subscribed, which is how
//! the registration hook publishes pool activity.
//!
//! # Examples
//!
//! ```rust
//! use stream_pool::stream::ReactiveStream;
//!
//! # tokio_test::block_on(async {
//! let numbers = ReactiveStream::from_iter(vec![1, 2, 3, 4]);
//! let evens = numbers.filter(|n| n % 2 == 0);
//!
//! assert_eq!(evens.collect_all().await, vec![2, 4]);
//! # });
//! ```

use futures::future;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::warn;

pub mod combinators;

type Source<T> = dyn Fn() -> BoxStream<'static, T> + Send + Sync;

/// Shareable handle to a stream of items of type `T`
///
/// Cloning the handle does not create a new stream: both clones report
/// [`same_instance`](ReactiveStream::same_instance) and subscribe to the
/// same source.
pub struct ReactiveStream<T> {
    source: Arc<Source<T>>,
}

impl<T: Send + 'static> ReactiveStream<T> {
    /// Create a stream whose subscribers each receive the stream built by `f`
    ///
    /// # Arguments
    ///
    /// * `f` - Called once per subscription to start a new flow of items
    pub fn from_fn<F, S>(f: F) -> Self
    where
        F: Fn() -> S + Send + Sync + 'static,
        S: Stream<Item = T> + Send + 'static,
    {
        Self {
            source: Arc::new(move || f().boxed()),
        }
    }

    /// Create a stream replaying a fixed list of items to every subscriber
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stream_pool::stream::ReactiveStream;
    ///
    /// # tokio_test::block_on(async {
    /// let letters = ReactiveStream::from_iter(vec!["a", "b"]);
    /// assert_eq!(letters.collect_all().await, vec!["a", "b"]);
    /// assert_eq!(letters.collect_all().await, vec!["a", "b"]);
    /// # });
    /// ```
    pub fn from_iter<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Clone + Sync,
    {
        let items: Arc<[T]> = items.into_iter().collect();
        Self::from_fn(move || stream::iter(items.to_vec()))
    }

    /// Create a stream that completes immediately without items
    pub fn empty() -> Self {
        Self::from_fn(stream::empty)
    }

    /// Create a hot stream over a broadcast channel
    ///
    /// Subscribers receive items sent after they subscribed. A subscriber
    /// that falls more than the channel capacity behind skips the missed
    /// items and keeps going.
    pub fn from_broadcast(sender: broadcast::Sender<T>) -> Self
    where
        T: Clone,
    {
        Self::from_fn(move || {
            BroadcastStream::new(sender.subscribe()).filter_map(|item| {
                future::ready(match item {
                    Ok(value) => Some(value),
                    Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                        warn!(skipped, "Broadcast subscriber lagged, items dropped");
                        None
                    }
                })
            })
        })
    }

    /// Start a new subscription to this stream
    pub fn subscribe(&self) -> BoxStream<'static, T> {
        (self.source)()
    }

    /// Subscribe and gather every item until the stream completes
    ///
    /// Never returns for streams that do not complete.
    pub async fn collect_all(&self) -> Vec<T> {
        self.subscribe().collect().await
    }
}

impl<T> ReactiveStream<T> {
    /// Whether both handles denote the same stream instance
    pub fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.source, &other.source)
    }
}

impl<T> Clone for ReactiveStream<T> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

impl<T> fmt::Debug for ReactiveStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveStream")
            .field("item", &std::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}
