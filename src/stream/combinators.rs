// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stream Combinators
//!
//! This module provides the operators composite stream ids are built from.
//! All combinators are pure: they return a new `ReactiveStream` and leave the
//! source untouched. The derived stream subscribes to its sources each time
//! it is itself subscribed.
//!
//! # Available Combinators
//!
//! | Combinator | Sources | Behaviour |
//! |---|---|---|
//! | `map_some` | 1 | Convert each item, dropping `None` results |
//! | `flat_map` | 1 | Expand each item into a sub-stream, outputs interleaved |
//! | `merge` | N | Re-emit items of all sources in arrival order |
//! | `filter` | 1 | Keep items matching a predicate |
//! | `delay` | 1 | Re-emit each item after a fixed duration, order kept |
//! | `zip_some` | 2 | Pair items positionally, dropping `None` results |
//!
//! # Examples
//!
//! ```rust
//! use stream_pool::stream::ReactiveStream;
//!
//! # tokio_test::block_on(async {
//! let numbers = ReactiveStream::from_iter(vec![1, 2, 3]);
//! let letters = ReactiveStream::from_iter(vec!["a", "b"]);
//!
//! let pairs = numbers.zip_some(&letters, |n, s| Some(format!("{n}{s}")));
//! assert_eq!(pairs.collect_all().await, vec!["1a", "2b"]);
//! # });
//! ```

use futures::future;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;

use super::ReactiveStream;

impl<T: Send + 'static> ReactiveStream<T> {
    /// Convert each item, emitting only the conversions that return `Some`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stream_pool::stream::ReactiveStream;
    ///
    /// # tokio_test::block_on(async {
    /// let numbers = ReactiveStream::from_iter(vec![1, 2, 3, 4]);
    /// let tens = numbers.map_some(|n| (n % 2 == 0).then(|| n * 10));
    /// assert_eq!(tens.collect_all().await, vec![20, 40]);
    /// # });
    /// ```
    pub fn map_some<U, F>(&self, conversion: F) -> ReactiveStream<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Option<U> + Send + Sync + 'static,
    {
        let source = self.clone();
        let conversion = Arc::new(conversion);
        ReactiveStream::from_fn(move || {
            let conversion = Arc::clone(&conversion);
            source
                .subscribe()
                .filter_map(move |item| future::ready(conversion(item)))
        })
    }

    /// Keep only the items matching `predicate`
    pub fn filter<F>(&self, predicate: F) -> ReactiveStream<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let source = self.clone();
        let predicate = Arc::new(predicate);
        ReactiveStream::from_fn(move || {
            let predicate = Arc::clone(&predicate);
            source
                .subscribe()
                .filter(move |item| future::ready(predicate(item)))
        })
    }

    /// Expand each item into a sub-stream and interleave their outputs
    ///
    /// Sub-streams are started as items arrive and run concurrently, so the
    /// result is a fan-out rather than a concatenation.
    pub fn flat_map<U, F>(&self, conversion: F) -> ReactiveStream<U>
    where
        U: Send + 'static,
        F: Fn(T) -> ReactiveStream<U> + Send + Sync + 'static,
    {
        let source = self.clone();
        let conversion = Arc::new(conversion);
        ReactiveStream::from_fn(move || {
            let conversion = Arc::clone(&conversion);
            source
                .subscribe()
                .map(move |item| conversion(item).subscribe())
                .flatten_unordered(None::<usize>)
        })
    }

    /// Re-emit every item `duration` after it arrived, preserving order
    pub fn delay(&self, duration: Duration) -> ReactiveStream<T> {
        let source = self.clone();
        ReactiveStream::from_fn(move || {
            source
                .subscribe()
                .map(move |item| async move {
                    tokio::time::sleep(duration).await;
                    item
                })
                .buffered(usize::MAX)
        })
    }

    /// Pair items positionally with `other`, emitting the `Some` results of `combiner`
    ///
    /// Completes as soon as either side is exhausted.
    pub fn zip_some<U, V, F>(&self, other: &ReactiveStream<U>, combiner: F) -> ReactiveStream<V>
    where
        U: Send + 'static,
        V: Send + 'static,
        F: Fn(T, U) -> Option<V> + Send + Sync + 'static,
    {
        let left = self.clone();
        let right = other.clone();
        let combiner = Arc::new(combiner);
        ReactiveStream::from_fn(move || {
            let combiner = Arc::clone(&combiner);
            left.subscribe()
                .zip(right.subscribe())
                .filter_map(move |(a, b)| future::ready(combiner(a, b)))
        })
    }

    /// Re-emit the items of every source in arrival order
    ///
    /// Each source keeps its own internal order; interleaving across sources
    /// is unconstrained.
    pub fn merge(sources: Vec<ReactiveStream<T>>) -> ReactiveStream<T> {
        ReactiveStream::from_fn(move || {
            stream::select_all(sources.iter().map(ReactiveStream::subscribe))
        })
    }

    /// Merge this stream with one other
    pub fn merge_with(&self, other: &ReactiveStream<T>) -> ReactiveStream<T> {
        Self::merge(vec![self.clone(), other.clone()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::time::Instant;

    fn numbers() -> ReactiveStream<i32> {
        ReactiveStream::from_iter(vec![1, 2, 3, 4])
    }

    #[tokio::test]
    async fn test_map_some_converts_every_item() {
        let tens = numbers().map_some(|n| Some(n * 10));
        assert_eq!(tens.collect_all().await, vec![10, 20, 30, 40]);
    }

    #[tokio::test]
    async fn test_map_some_drops_absent_results() {
        let tens = numbers().map_some(|n| if n % 2 == 0 { Some(n * 10) } else { None });
        assert_eq!(tens.collect_all().await, vec![20, 40]);
    }

    #[tokio::test]
    async fn test_filter_keeps_matching_items() {
        let evens = numbers().filter(|n| n % 2 == 0);
        assert_eq!(evens.collect_all().await, vec![2, 4]);
    }

    #[tokio::test]
    async fn test_flat_map_emits_every_sub_item() {
        let expanded = numbers().flat_map(|n| ReactiveStream::from_iter(vec![n; n as usize]));

        let mut items = expanded.collect_all().await;
        items.sort_unstable();
        assert_eq!(items, vec![1, 2, 2, 3, 3, 3, 4, 4, 4, 4]);
    }

    #[tokio::test]
    async fn test_zip_stops_at_shorter_source() {
        let letters = ReactiveStream::from_iter(vec!["a", "b"]);
        let zipped = ReactiveStream::from_iter(vec![1, 2, 3])
            .zip_some(&letters, |n, s| Some(format!("{n}{s}")));

        assert_eq!(zipped.collect_all().await, vec!["1a", "2b"]);
    }

    #[tokio::test]
    async fn test_zip_drops_absent_pairs() {
        let zipped = numbers().zip_some(&numbers(), |a, b| (a > 2).then_some(a + b));
        assert_eq!(zipped.collect_all().await, vec![6, 8]);
    }

    #[tokio::test]
    async fn test_merge_keeps_per_source_order() {
        let left = ReactiveStream::from_iter(vec![1, 2, 3]);
        let right = ReactiveStream::from_iter(vec![10, 20, 30]);

        let merged = left.merge_with(&right).collect_all().await;

        assert_eq!(merged.len(), 6);
        let from_left: Vec<_> = merged.iter().copied().filter(|n| *n < 10).collect();
        let from_right: Vec<_> = merged.iter().copied().filter(|n| *n >= 10).collect();
        assert_eq!(from_left, vec![1, 2, 3]);
        assert_eq!(from_right, vec![10, 20, 30]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_shifts_items_and_keeps_order() {
        let start = Instant::now();
        let delayed = numbers().delay(Duration::from_millis(100));

        assert_eq!(delayed.collect_all().await, vec![1, 2, 3, 4]);
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_combinators_leave_source_untouched() {
        let source = numbers();
        let _derived = source.map_some(|n| Some(n + 1)).filter(|n| *n > 2);

        assert_eq!(source.collect_all().await, vec![1, 2, 3, 4]);
    }
}
