// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Composed Streams
//!
//! Composite streams discovered from a pool must agree with the equivalent
//! iterator pipelines over the same items.

use proptest::prelude::*;

use stream_pool::composition::{filtered_stream, mapped_stream, merged_stream, zipped_stream};
use stream_pool::{LocalPool, ReactiveStream, StreamId};

fn run<F: std::future::Future>(future: F) -> F::Output {
    tokio_test::block_on(future)
}

fn pool_with(name: &str, items: Vec<i32>) -> (LocalPool, StreamId<i32>) {
    let pool = LocalPool::with_composition();
    let id = StreamId::named(name);
    pool.provide(&id, ReactiveStream::from_iter(items)).unwrap();
    (pool, id)
}

proptest! {
    #[test]
    fn prop_filter_matches_iterator_filter(items in prop::collection::vec(-100i32..100, 0..50)) {
        let (pool, source) = pool_with("source", items.clone());
        let evens = filtered_stream(&source, "even", |n| n % 2 == 0);

        let discovered = run(async { pool.discover(&evens).await.unwrap().collect_all().await });
        let expected: Vec<i32> = items.into_iter().filter(|n| n % 2 == 0).collect();

        prop_assert_eq!(discovered, expected);
    }

    #[test]
    fn prop_map_matches_iterator_filter_map(items in prop::collection::vec(-100i32..100, 0..50)) {
        let (pool, source) = pool_with("source", items.clone());
        let positive_tens = mapped_stream(&source, "positive-x10", |n: i32| (n > 0).then_some(n * 10));

        let discovered = run(async { pool.discover(&positive_tens).await.unwrap().collect_all().await });
        let expected: Vec<i32> = items.into_iter().filter(|n| *n > 0).map(|n| n * 10).collect();

        prop_assert_eq!(discovered, expected);
    }

    #[test]
    fn prop_zip_length_is_shorter_source(
        left in prop::collection::vec(any::<i32>(), 0..30),
        right in prop::collection::vec(any::<i32>(), 0..30),
    ) {
        let (pool, left_id) = pool_with("left", left.clone());
        let right_id: StreamId<i32> = StreamId::named("right");
        pool.provide(&right_id, ReactiveStream::from_iter(right.clone())).unwrap();

        let pairs = zipped_stream(&left_id, &right_id, "pair", |a, b| Some((a, b)));
        let discovered = run(async { pool.discover(&pairs).await.unwrap().collect_all().await });
        let expected: Vec<(i32, i32)> = left.into_iter().zip(right).collect();

        prop_assert_eq!(discovered, expected);
    }

    #[test]
    fn prop_merge_preserves_per_source_order(
        left in prop::collection::vec(0i32..1000, 0..30),
        right in prop::collection::vec(1000i32..2000, 0..30),
    ) {
        let (pool, left_id) = pool_with("left", left.clone());
        let right_id: StreamId<i32> = StreamId::named("right");
        pool.provide(&right_id, ReactiveStream::from_iter(right.clone())).unwrap();

        let merged = merged_stream(vec![left_id, right_id]).unwrap();
        let discovered = run(async { pool.discover(&merged).await.unwrap().collect_all().await });

        let from_left: Vec<i32> = discovered.iter().copied().filter(|n| *n < 1000).collect();
        let from_right: Vec<i32> = discovered.iter().copied().filter(|n| *n >= 1000).collect();
        prop_assert_eq!(discovered.len(), left.len() + right.len());
        prop_assert_eq!(from_left, left);
        prop_assert_eq!(from_right, right);
    }
}
