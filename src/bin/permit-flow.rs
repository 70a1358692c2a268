// Copyright (c) 2025 - Cowboy AI, Inc.
//! Permit Flow Demo
//!
//! Provides a stream of interlock register values, flat-maps every register
//! value into one user permit per permit bit, and provides a stream per
//! permit id. Two permits are then zipped to report whether both were given
//! for each register value. Every stream the pool registers along the way is
//! reported through the registration hook.
//!
//! Run with: cargo run --bin permit-flow
//!
//! Environment:
//! - `STREAM_POOL_NAME` / `STREAM_POOL_HOOK_CAPACITY`: pool configuration
//! - `RUST_LOG`: log filter

use anyhow::{Context, Result};
use futures::StreamExt;
use std::fmt;
use std::time::Duration;
use stream_pool::composition::{flat_mapped_stream, zipped_stream};
use stream_pool::{hook, CompositionFactory, LocalPool, PoolConfig, ReactiveStream, StreamId};
use tracing::info;

const SOURCE_STREAM_ELEMENTS: u32 = 20;
const SOURCE_INTERVAL: Duration = Duration::from_millis(10);
const USER_PERMIT_1_A_AND_B_TRUE: u32 = 65537;

/// Bits of the register carrying user permits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PermitId {
    UserPermit1A,
    UserPermit1B,
    UserPermit2A,
    UserPermit2B,
}

impl PermitId {
    const ALL: [PermitId; 4] = [
        PermitId::UserPermit1A,
        PermitId::UserPermit1B,
        PermitId::UserPermit2A,
        PermitId::UserPermit2B,
    ];

    fn offset(self) -> u32 {
        match self {
            PermitId::UserPermit1A => 0,
            PermitId::UserPermit1B => 16,
            PermitId::UserPermit2A => 1,
            PermitId::UserPermit2B => 17,
        }
    }

    /// Id of the stream carrying this permit's bit for every register value
    fn stream_id(self) -> StreamId<UserPermit> {
        StreamId::named(self.to_string())
    }
}

impl fmt::Display for PermitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}


/// One permit bit of one register value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct UserPermit {
    permit_id: PermitId,
    given: bool,
}

/// Expand a register value into the state of every permit bit
fn permits_of(register: u32) -> ReactiveStream<UserPermit> {
    ReactiveStream::from_iter(PermitId::ALL.map(|permit_id| UserPermit {
        permit_id,
        given: (register >> permit_id.offset()) & 1 == 1,
    }))
}

fn register_values() -> Vec<u32> {
    (0..SOURCE_STREAM_ELEMENTS)
        .map(|i| if i % 3 == 0 { 0 } else { USER_PERMIT_1_A_AND_B_TRUE })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = PoolConfig::from_env().context("Invalid pool configuration")?;
    let pool = LocalPool::builder()
        .config(config)
        .factory(CompositionFactory::new())
        .build()?;

    let registrations = pool.discover(&hook::new_stream_hook()).await?;
    let mut events = registrations.subscribe();
    let monitor = tokio::spawn(async move {
        while let Some(id) = events.next().await {
            info!(id = %id, "Stream registered");
        }
    });

    let source: StreamId<u32> = StreamId::named("SourceStream");
    pool.provide_stream(ReactiveStream::from_iter(register_values()).delay(SOURCE_INTERVAL))
        .as_id(&source)?;

    let permit_bits = flat_mapped_stream(&source, "permit-bits", permits_of);
    let bits = pool
        .discover(&permit_bits)
        .await
        .with_context(|| format!("Failed to discover {permit_bits}"))?;

    for permit_id in PermitId::ALL {
        pool.provide_stream(bits.filter(move |permit| permit.permit_id == permit_id))
            .as_id(&permit_id.stream_id())?;
    }

    let permit_a = PermitId::UserPermit1A.stream_id();
    let permit_b = PermitId::UserPermit1B.stream_id();
    let both_given = zipped_stream(
        &permit_a,
        &permit_b,
        "both-given",
        |a: UserPermit, b: UserPermit| Some(a.given && b.given),
    );

    let results = pool
        .discover(&both_given)
        .await
        .with_context(|| format!("Failed to discover {both_given}"))?
        .collect_all()
        .await;

    for (index, given) in results.iter().enumerate() {
        info!(index, given, "User permit 1 A and B");
    }

    // Let the monitor drain registrations before shutting down.
    tokio::time::sleep(SOURCE_INTERVAL).await;
    monitor.abort();
    Ok(())
}
