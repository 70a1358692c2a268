// Copyright (c) 2025 - Cowboy AI, Inc.
//! Composed Streams
//!
//! Builders for stream ids that *define* a stream as a transformation of
//! other identified streams, and the [`CompositionFactory`] that resolves
//! them. A composite id is discovered like any other id: its sources are
//! discovered first, through the same resolution chain, then the
//! transformation is applied and the result is cached under the composite id.
//!
//! ```text
//! filtered_stream(source, "even", ..)
//!        │
//!        ▼
//! CompositionFactory ──discover──> source ──> ReactiveStream<i32>
//!        │                                          │
//!        └────────────── filter(even) <─────────────┘
//! ```
//!
//! Combinators taking closures also take a label. Two composite ids are equal
//! when they have the same combinator, label or parameters, and sources, so
//! the label is what distinguishes two different transformations of one
//! source.
//!
//! # Example
//!
//! ```rust
//! use stream_pool::composition::{filtered_stream, mapped_stream};
//! use stream_pool::{LocalPool, ReactiveStream, StreamId};
//!
//! # tokio_test::block_on(async {
//! let pool = LocalPool::with_composition();
//! let numbers: StreamId<i32> = StreamId::named("numbers");
//! pool.provide(&numbers, ReactiveStream::from_iter(vec![1, 2, 3, 4])).unwrap();
//!
//! let evens = filtered_stream(&numbers, "even", |n| n % 2 == 0);
//! let tens = mapped_stream(&evens, "x10", |n| Some(n * 10));
//!
//! let stream = pool.discover(&tens).await.unwrap();
//! assert_eq!(stream.collect_all().await, vec![20, 40]);
//! # });
//! ```

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::discovery::TrackingDiscovery;
use crate::errors::{PoolError, PoolResult};
use crate::factory::StreamFactory;
use crate::registry::AnyStream;
use crate::stream::ReactiveStream;
use crate::stream_id::{Combinator, Composition, StreamId, StreamKey};

fn source_at<X: Send + 'static>(
    streams: &[AnyStream],
    index: usize,
    key: &StreamKey,
) -> PoolResult<ReactiveStream<X>> {
    streams
        .get(index)
        .ok_or_else(|| PoolError::MalformedComposition(format!("source {key} was not resolved")))?
        .downcast(key)
}

fn unary<X, T, F>(source: &StreamId<X>, combinator: Combinator, derive: F) -> StreamId<T>
where
    X: Send + 'static,
    T: Send + 'static,
    F: Fn(ReactiveStream<X>) -> ReactiveStream<T> + Send + Sync + 'static,
{
    let key = source.key().clone();
    let sources = vec![key.clone()];
    let compose = move |streams: &[AnyStream]| -> PoolResult<AnyStream> {
        let source = source_at::<X>(streams, 0, &key)?;
        Ok(AnyStream::new(derive(source)))
    };

    StreamId::composite(Composition::unchecked(combinator, sources, Arc::new(compose)))
}

/// Id of the stream converting each item of `source`, dropping `None` results
pub fn mapped_stream<X, T, F>(
    source: &StreamId<X>,
    label: impl Into<Arc<str>>,
    conversion: F,
) -> StreamId<T>
where
    X: Send + 'static,
    T: Send + 'static,
    F: Fn(X) -> Option<T> + Send + Sync + 'static,
{
    let conversion = Arc::new(conversion);
    unary(source, Combinator::Map(label.into()), move |stream| {
        let conversion = Arc::clone(&conversion);
        stream.map_some(move |item| conversion(item))
    })
}

/// Id of the stream expanding each item of `source` into a sub-stream
///
/// Sub-stream outputs are interleaved as they arrive.
pub fn flat_mapped_stream<X, T, F>(
    source: &StreamId<X>,
    label: impl Into<Arc<str>>,
    conversion: F,
) -> StreamId<T>
where
    X: Send + 'static,
    T: Send + 'static,
    F: Fn(X) -> ReactiveStream<T> + Send + Sync + 'static,
{
    let conversion = Arc::new(conversion);
    unary(source, Combinator::FlatMap(label.into()), move |stream| {
        let conversion = Arc::clone(&conversion);
        stream.flat_map(move |item| conversion(item))
    })
}

/// Id of the stream keeping the items of `source` that match `predicate`
pub fn filtered_stream<X, F>(
    source: &StreamId<X>,
    label: impl Into<Arc<str>>,
    predicate: F,
) -> StreamId<X>
where
    X: Send + 'static,
    F: Fn(&X) -> bool + Send + Sync + 'static,
{
    let predicate = Arc::new(predicate);
    unary(source, Combinator::Filter(label.into()), move |stream| {
        let predicate = Arc::clone(&predicate);
        stream.filter(move |item| predicate(item))
    })
}

/// Id of the stream re-emitting the items of `source` after `duration`
pub fn delayed_stream<X>(source: &StreamId<X>, duration: Duration) -> StreamId<X>
where
    X: Send + 'static,
{
    unary(source, Combinator::Delay(duration), move |stream| {
        stream.delay(duration)
    })
}

/// Id of the stream merging every item of `sources`
///
/// # Errors
///
/// `MalformedComposition` if `sources` is empty.
pub fn merged_stream<X>(sources: Vec<StreamId<X>>) -> PoolResult<StreamId<X>>
where
    X: Send + 'static,
{
    let keys: Vec<StreamKey> = sources.into_iter().map(StreamId::into_key).collect();
    let source_keys = keys.clone();
    let compose = move |streams: &[AnyStream]| -> PoolResult<AnyStream> {
        let typed = source_keys
            .iter()
            .enumerate()
            .map(|(index, key)| source_at::<X>(streams, index, key))
            .collect::<PoolResult<Vec<_>>>()?;
        Ok(AnyStream::new(ReactiveStream::merge(typed)))
    };

    Composition::new(Combinator::Merge, keys, Arc::new(compose)).map(StreamId::composite)
}

/// Id of the stream pairing items of `first` and `second` positionally
///
/// Pairs for which `zip` returns `None` are dropped. The stream completes
/// when either source does.
pub fn zipped_stream<X, Y, T, F>(
    first: &StreamId<X>,
    second: &StreamId<Y>,
    label: impl Into<Arc<str>>,
    zip: F,
) -> StreamId<T>
where
    X: Send + 'static,
    Y: Send + 'static,
    T: Send + 'static,
    F: Fn(X, Y) -> Option<T> + Send + Sync + 'static,
{
    let first_key = first.key().clone();
    let second_key = second.key().clone();
    let sources = vec![first_key.clone(), second_key.clone()];
    let zip = Arc::new(zip);
    let compose = move |streams: &[AnyStream]| -> PoolResult<AnyStream> {
        let left = source_at::<X>(streams, 0, &first_key)?;
        let right = source_at::<Y>(streams, 1, &second_key)?;
        let zip = Arc::clone(&zip);
        Ok(AnyStream::new(left.zip_some(&right, move |a, b| zip(a, b))))
    };

    StreamId::composite(Composition::unchecked(
        Combinator::Zip(label.into()),
        sources,
        Arc::new(compose),
    ))
}

/// Factory resolving composite stream ids
///
/// Any other id is left to the next factory.
#[derive(Debug, Default, Clone, Copy)]
pub struct CompositionFactory;

impl CompositionFactory {
    /// Create the factory
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StreamFactory for CompositionFactory {
    async fn create(
        &self,
        id: &StreamKey,
        discovery: &mut TrackingDiscovery<'_>,
    ) -> PoolResult<Option<AnyStream>> {
        let Some(composition) = id.as_composition() else {
            return Ok(None);
        };

        let mut streams = Vec::with_capacity(composition.sources().len());
        for source in composition.sources() {
            streams.push(discovery.discover_any(source).await?);
        }

        composition.compose(&streams).map(Some)
    }

    fn name(&self) -> &str {
        "composition"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::PoolContent;
    use pretty_assertions::assert_eq;

    fn resolve_with<'a>(
        content: &'a PoolContent,
        factories: &'a [Arc<dyn StreamFactory>],
    ) -> TrackingDiscovery<'a> {
        TrackingDiscovery::new(content, factories)
    }

    #[test]
    fn test_empty_merge_is_rejected_eagerly() {
        let result = merged_stream::<i32>(Vec::new());
        assert!(matches!(result, Err(PoolError::MalformedComposition(_))));
    }

    #[test]
    fn test_same_definition_gives_equal_ids() {
        let source: StreamId<i32> = StreamId::named("a");

        let first = filtered_stream(&source, "even", |n| n % 2 == 0);
        let second = filtered_stream(&source, "even", |n| n % 2 == 0);
        let other = filtered_stream(&source, "odd", |n| n % 2 == 1);

        assert_eq!(first, second);
        assert_ne!(first, other);
    }

    #[tokio::test]
    async fn test_plain_ids_are_left_to_other_factories() {
        let content = PoolContent::default();
        let factories: Vec<Arc<dyn StreamFactory>> = Vec::new();
        let mut discovery = resolve_with(&content, &factories);

        let created = CompositionFactory
            .create(&StreamKey::named("a"), &mut discovery)
            .await
            .unwrap();
        assert!(created.is_none());
    }

    #[tokio::test]
    async fn test_composite_resolves_sources_and_caches_result() {
        let content = PoolContent::default();
        let source: StreamId<i32> = StreamId::named("numbers");
        content.register_if_absent(
            source.key().clone(),
            AnyStream::new(ReactiveStream::from_iter(vec![1, 2, 3, 4])),
        );
        let factories: Vec<Arc<dyn StreamFactory>> = vec![Arc::new(CompositionFactory)];
        let mut discovery = resolve_with(&content, &factories);

        let evens = filtered_stream(&source, "even", |n| n % 2 == 0);
        let stream = discovery.discover(&evens).await.unwrap();

        assert_eq!(stream.collect_all().await, vec![2, 4]);
        assert!(content.contains(evens.key()));
    }

    #[tokio::test]
    async fn test_source_type_mismatch_is_reported() {
        let content = PoolContent::default();
        let as_text: StreamId<String> = StreamId::named("numbers");
        content.register_if_absent(
            as_text.key().clone(),
            AnyStream::new(ReactiveStream::from_iter(vec![1, 2])),
        );
        let factories: Vec<Arc<dyn StreamFactory>> = vec![Arc::new(CompositionFactory)];
        let mut discovery = resolve_with(&content, &factories);

        let lengths = mapped_stream(&as_text, "len", |s: String| Some(s.len()));
        assert!(matches!(
            discovery.discover(&lengths).await,
            Err(PoolError::TypeMismatch { .. })
        ));
    }
}
