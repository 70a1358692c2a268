// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-based tests for identities and composed streams

mod composed_streams;
mod identity;
