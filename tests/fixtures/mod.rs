// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for stream-pool
//!
//! Shared factories and streams for the integration tests. Every stream here
//! is finite and deterministic so results can be compared exactly.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

use stream_pool::{
    AnyStream, PoolError, PoolResult, ReactiveStream, StreamFactory, StreamId, StreamKey,
    TrackingDiscovery,
};

pub const SOURCE_NAME: &str = "numbers";

/// Install a test subscriber honouring `RUST_LOG`; safe to call repeatedly
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// The id of the integer source stream
pub fn numbers_id() -> StreamId<i32> {
    StreamId::named(SOURCE_NAME)
}

/// A stream emitting `[1, 2, 3, 4]`
pub fn numbers() -> ReactiveStream<i32> {
    ReactiveStream::from_iter(vec![1, 2, 3, 4])
}

/// Factory answering one id after a delay, counting how often it builds
pub struct SlowFactory {
    pub id: StreamKey,
    pub delay: Duration,
    pub builds: AtomicUsize,
}

impl SlowFactory {
    pub fn new(id: StreamKey, delay: Duration) -> Self {
        Self {
            id,
            delay,
            builds: AtomicUsize::new(0),
        }
    }

    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StreamFactory for SlowFactory {
    async fn create(
        &self,
        id: &StreamKey,
        _discovery: &mut TrackingDiscovery<'_>,
    ) -> PoolResult<Option<AnyStream>> {
        if *id != self.id {
            return Ok(None);
        }
        self.builds.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(Some(AnyStream::new(numbers())))
    }
}

/// Factory failing its first `failures` attempts for one id
pub struct FlakyFactory {
    pub id: StreamKey,
    pub failures: usize,
    pub delay: Duration,
    pub attempts: AtomicUsize,
}

impl FlakyFactory {
    pub fn new(id: StreamKey, failures: usize) -> Self {
        Self {
            id,
            failures,
            delay: Duration::ZERO,
            attempts: AtomicUsize::new(0),
        }
    }

    /// Sleep for `delay` before every attempt
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StreamFactory for FlakyFactory {
    async fn create(
        &self,
        id: &StreamKey,
        _discovery: &mut TrackingDiscovery<'_>,
    ) -> PoolResult<Option<AnyStream>> {
        if *id != self.id {
            return Ok(None);
        }
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if attempt < self.failures {
            return Err(PoolError::FactoryFailed {
                id: id.clone(),
                reason: format!("attempt {attempt} failed"),
            });
        }
        Ok(Some(AnyStream::new(numbers())))
    }
}

/// Factory holding its id pending until the test releases it
pub struct GatedFactory {
    pub id: StreamKey,
    pub started: Notify,
    pub release: Notify,
}

impl GatedFactory {
    pub fn new(id: StreamKey) -> Self {
        Self {
            id,
            started: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl StreamFactory for GatedFactory {
    async fn create(
        &self,
        id: &StreamKey,
        _discovery: &mut TrackingDiscovery<'_>,
    ) -> PoolResult<Option<AnyStream>> {
        if *id != self.id {
            return Ok(None);
        }
        self.started.notify_one();
        self.release.notified().await;
        Ok(Some(AnyStream::new(numbers())))
    }
}
