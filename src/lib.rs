//! Discovery of event streams by identity
//!
//! Producers provide a stream under a [`StreamId`]; consumers discover it by
//! the same id without knowing whether it already exists, is built on demand
//! by a [`StreamFactory`], or is derived from other streams through a
//! composite id. Construction happens at most once per id, and dependency
//! cycles formed while resolving are reported instead of recursing forever.

pub mod composition;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod factory;
pub mod hook;
pub mod pool;
pub mod registry;
pub mod stream;
pub mod stream_id;

// Re-export commonly used types
pub use composition::CompositionFactory;
pub use config::PoolConfig;
pub use discovery::{ResolutionChain, TrackingDiscovery};
pub use errors::{PoolError, PoolResult};
pub use factory::{CreatorStreamFactory, StreamCreator, StreamFactory};
pub use pool::{LocalPool, PoolBuilder};
pub use registry::AnyStream;
pub use stream::ReactiveStream;
pub use stream_id::{Combinator, StreamId, StreamKey};
