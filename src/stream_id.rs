// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stream Identities
//!
//! Streams are registered and discovered by identity rather than by
//! reference. An identity is an immutable value compared structurally: two
//! ids built from equal data denote the same stream, wherever they were
//! constructed.
//!
//! # Identity Shapes
//!
//! ```text
//! StreamKey
//!   ├── Named("source")                      plain named identity
//!   ├── Composite(map[x10](source))          derived from other identities
//!   └── NewStreamHook                        reserved, see crate::hook
//! ```
//!
//! `StreamKey` is the type-erased form used by the registry and by
//! factories. `StreamId<T>` adds a compile-time tag for the item type the
//! stream carries; the tag takes no part in equality.
//!
//! # Composite Equality
//!
//! A composite identity is equal to another when its combinator (kind plus
//! parameters) and its ordered source identities are equal. The closure that
//! builds the stream is carried along but never compared, so combinators
//! taking closures also take a label that names the transformation.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::{PoolError, PoolResult};
use crate::registry::AnyStream;

/// Function building a composite stream from its resolved sources
///
/// Sources are passed in declaration order.
pub type ComposeFn = dyn Fn(&[AnyStream]) -> PoolResult<AnyStream> + Send + Sync;

/// Kind and parameters of the transformation a composite identity applies
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// Per-item optional conversion, named by its label
    Map(Arc<str>),
    /// Per-item expansion into sub-streams, named by its label
    FlatMap(Arc<str>),
    /// Interleaving of all sources
    Merge,
    /// Per-item predicate, named by its label
    Filter(Arc<str>),
    /// Re-emission after a fixed duration
    Delay(Duration),
    /// Positional pairing of two sources, named by its label
    Zip(Arc<str>),
}

impl Combinator {
    fn accepts(&self, source_count: usize) -> bool {
        match self {
            Combinator::Merge => source_count >= 1,
            Combinator::Zip(_) => source_count == 2,
            _ => source_count == 1,
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combinator::Map(label) => write!(f, "map[{label}]"),
            Combinator::FlatMap(label) => write!(f, "flat-map[{label}]"),
            Combinator::Merge => write!(f, "merge"),
            Combinator::Filter(label) => write!(f, "filter[{label}]"),
            Combinator::Delay(duration) => write!(f, "delay[{duration:?}]"),
            Combinator::Zip(label) => write!(f, "zip[{label}]"),
        }
    }
}

/// Definition of a stream derived from other identified streams
pub struct Composition {
    combinator: Combinator,
    sources: Vec<StreamKey>,
    compose: Arc<ComposeFn>,
}

impl Composition {
    /// Create a composition, checking the source count against the combinator
    ///
    /// # Errors
    ///
    /// `MalformedComposition` if the combinator cannot take that many sources
    /// (for example a merge of nothing).
    pub fn new(
        combinator: Combinator,
        sources: Vec<StreamKey>,
        compose: Arc<ComposeFn>,
    ) -> PoolResult<Self> {
        if !combinator.accepts(sources.len()) {
            return Err(PoolError::MalformedComposition(format!(
                "{combinator} cannot be built from {} source stream(s)",
                sources.len()
            )));
        }

        Ok(Self::unchecked(combinator, sources, compose))
    }

    /// For builders whose signature already fixes the source count
    pub(crate) fn unchecked(
        combinator: Combinator,
        sources: Vec<StreamKey>,
        compose: Arc<ComposeFn>,
    ) -> Self {
        debug_assert!(combinator.accepts(sources.len()));
        Self {
            combinator,
            sources,
            compose,
        }
    }

    /// The transformation this composition applies
    pub fn combinator(&self) -> &Combinator {
        &self.combinator
    }

    /// Source identities, in declaration order
    pub fn sources(&self) -> &[StreamKey] {
        &self.sources
    }

    /// Build the composite stream from resolved sources
    pub fn compose(&self, streams: &[AnyStream]) -> PoolResult<AnyStream> {
        (self.compose)(streams)
    }
}

impl PartialEq for Composition {
    fn eq(&self, other: &Self) -> bool {
        self.combinator == other.combinator && self.sources == other.sources
    }
}

impl Eq for Composition {}

impl Hash for Composition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.combinator.hash(state);
        self.sources.hash(state);
    }
}

impl fmt::Debug for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Composition")
            .field("combinator", &self.combinator)
            .field("sources", &self.sources)
            .finish_non_exhaustive()
    }
}

/// Type-erased stream identity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StreamKey {
    /// Identity given by a name
    Named(Arc<str>),
    /// Identity defined as a transformation of other identities
    Composite(Arc<Composition>),
    /// The reserved registration hook identity
    NewStreamHook,
}

impl StreamKey {
    /// Create a named key
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        StreamKey::Named(name.into())
    }

    /// The composition behind this key, if it is a composite
    pub fn as_composition(&self) -> Option<&Composition> {
        match self {
            StreamKey::Composite(composition) => Some(composition),
            _ => None,
        }
    }
}

impl fmt::Display for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKey::Named(name) => write!(f, "{name}"),
            StreamKey::NewStreamHook => write!(f, "<new-stream-hook>"),
            StreamKey::Composite(composition) => {
                write!(f, "{}(", composition.combinator)?;
                for (i, source) in composition.sources.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{source}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Identity of a stream carrying items of type `T`
///
/// `T` is a compile-time tag only. Equality and hashing use the underlying
/// [`StreamKey`].
pub struct StreamId<T> {
    key: StreamKey,
    _item: PhantomData<fn() -> T>,
}

impl<T> StreamId<T> {
    /// Create a named identity
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stream_pool::StreamId;
    ///
    /// let a: StreamId<i32> = StreamId::named("temperature");
    /// let b: StreamId<i32> = StreamId::named("temperature");
    /// assert_eq!(a, b);
    /// ```
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Self::from_key(StreamKey::named(name))
    }

    /// Wrap an existing key, asserting the item type it carries
    pub fn from_key(key: StreamKey) -> Self {
        Self {
            key,
            _item: PhantomData,
        }
    }

    /// Create a composite identity from a validated composition
    pub fn composite(composition: Composition) -> Self {
        Self::from_key(StreamKey::Composite(Arc::new(composition)))
    }

    /// The type-erased key
    pub fn key(&self) -> &StreamKey {
        &self.key
    }

    /// Consume the id, returning its key
    pub fn into_key(self) -> StreamKey {
        self.key
    }
}

impl<T> Clone for StreamId<T> {
    fn clone(&self) -> Self {
        Self::from_key(self.key.clone())
    }
}

impl<T> PartialEq for StreamId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T> Eq for StreamId<T> {}

impl<T> Hash for StreamId<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl<T> fmt::Debug for StreamId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StreamId").field(&self.key).finish()
    }
}

impl<T> fmt::Display for StreamId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.key.fmt(f)
    }
}
