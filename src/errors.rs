// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for pool operations

use thiserror::Error;

use crate::stream_id::StreamKey;

/// Errors that can occur while providing or discovering streams
///
/// Every variant is `Clone` so that a single failed materialization can be
/// handed to every caller waiting on the same pending slot.
#[derive(Debug, Clone, Error)]
pub enum PoolError {
    /// `provide` was called for an id that is already registered
    #[error("Id {0} already registered! Cannot register twice.")]
    DuplicateRegistration(StreamKey),

    /// A discovery chain revisited an id it was already resolving
    #[error("Cycle in stream discovery detected at {id}: {}", render_chain(.chain, .id))]
    CycleDetected {
        /// The id that was requested a second time
        id: StreamKey,
        /// The ids being resolved when the cycle was found, outermost first
        chain: Vec<StreamKey>,
    },

    /// No factory in the configured chain could create the id
    #[error("No stream could be discovered for id {0}")]
    UnresolvableIdentity(StreamKey),

    /// A composite id was declared with an invalid configuration
    #[error("Malformed composition: {0}")]
    MalformedComposition(String),

    /// The stream registered under an id does not carry the requested element type
    #[error("Stream {id} does not carry items of type {expected} (found {found})")]
    TypeMismatch {
        /// The id whose stream was requested
        id: StreamKey,
        /// Element type the caller asked for
        expected: &'static str,
        /// Element type of the registered stream
        found: &'static str,
    },

    /// A factory recognised the id but could not build its stream
    #[error("Factory failed to create stream {id}: {reason}")]
    FactoryFailed {
        /// The id being created
        id: StreamKey,
        /// Factory-supplied reason
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for pool operations
pub type PoolResult<T> = Result<T, PoolError>;

fn render_chain(chain: &[StreamKey], id: &StreamKey) -> String {
    let mut rendered: Vec<String> = chain.iter().map(ToString::to_string).collect();
    rendered.push(id.to_string());
    rendered.join(" -> ")
}
