// Copyright (c) 2025 - Cowboy AI, Inc.
//! Registration Hook
//!
//! Every pool registers one reserved id at construction. Its stream emits
//! the id of each stream registered afterwards, whether it was provided
//! directly or materialized lazily during discovery. The hook's own
//! registration is not reported.
//!
//! The hook stream is hot: a subscriber sees registrations made after it
//! subscribed.
//!
//! ```rust
//! use futures::StreamExt;
//! use stream_pool::{hook, LocalPool, ReactiveStream, StreamId};
//!
//! # tokio_test::block_on(async {
//! let pool = LocalPool::new();
//! let registrations = pool.discover(&hook::new_stream_hook()).await.unwrap();
//! let mut events = registrations.subscribe();
//!
//! let id: StreamId<i32> = StreamId::named("a");
//! pool.provide(&id, ReactiveStream::from_iter(vec![1])).unwrap();
//!
//! assert_eq!(events.next().await, Some(id.into_key()));
//! # });
//! ```

use crate::registry::{AnyStream, PoolContent};
use crate::stream::ReactiveStream;
use crate::stream_id::{StreamId, StreamKey};

/// The reserved id of the registration hook stream
pub fn new_stream_hook() -> StreamId<StreamKey> {
    StreamId::from_key(StreamKey::NewStreamHook)
}

/// Register the hook stream in `content`
///
/// Returns false if the hook was already installed.
pub(crate) fn install(content: &PoolContent) -> bool {
    let stream = ReactiveStream::from_broadcast(content.registrations());
    content.register_if_absent(StreamKey::NewStreamHook, AnyStream::new(stream))
}
