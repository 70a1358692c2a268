// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Stream Identities
//!
//! Identity equality must be structural: ids built independently from equal
//! data are equal and hash alike, and ids differing in any defining part are
//! distinct.

use proptest::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use stream_pool::composition::{delayed_stream, filtered_stream, merged_stream};
use stream_pool::StreamId;

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

proptest! {
    #[test]
    fn prop_named_ids_equal_iff_names_equal(a in "[a-z]{1,8}", b in "[a-z]{1,8}") {
        let left: StreamId<i32> = StreamId::named(a.as_str());
        let right: StreamId<i32> = StreamId::named(b.as_str());

        prop_assert_eq!(left == right, a == b);
        if a == b {
            prop_assert_eq!(hash_of(&left), hash_of(&right));
        }
    }

    #[test]
    fn prop_composites_built_twice_are_equal(name in "[a-z]{1,8}", label in "[a-z]{1,8}") {
        let source: StreamId<i32> = StreamId::named(name.as_str());

        let first = filtered_stream(&source, label.as_str(), |n| *n > 0);
        let second = filtered_stream(&source, label.as_str(), |n| *n < 0);

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(hash_of(&first), hash_of(&second));
    }

    #[test]
    fn prop_delay_parameter_is_part_of_identity(a in 0u64..1000, b in 0u64..1000) {
        let source: StreamId<i32> = StreamId::named("source");

        let left = delayed_stream(&source, Duration::from_millis(a));
        let right = delayed_stream(&source, Duration::from_millis(b));

        prop_assert_eq!(left == right, a == b);
    }

    #[test]
    fn prop_merge_identity_follows_source_list(names in prop::collection::vec("[a-z]{1,4}", 1..6)) {
        let sources: Vec<StreamId<i32>> = names.iter().map(|n| StreamId::named(n.as_str())).collect();
        let mut reversed = sources.clone();
        reversed.reverse();

        let forward = merged_stream(sources.clone()).unwrap();
        let again = merged_stream(sources).unwrap();
        let backward = merged_stream(reversed).unwrap();

        prop_assert_eq!(&forward, &again);
        let mut reversed_names = names.clone();
        reversed_names.reverse();
        prop_assert_eq!(forward == backward, names == reversed_names);
    }
}
