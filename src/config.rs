// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pool configuration

use crate::errors::{PoolError, PoolResult};

/// Environment variable overriding the pool name
pub const ENV_POOL_NAME: &str = "STREAM_POOL_NAME";

/// Environment variable overriding the registration hook capacity
pub const ENV_HOOK_CAPACITY: &str = "STREAM_POOL_HOOK_CAPACITY";

/// Largest accepted registration hook capacity
pub const MAX_HOOK_CAPACITY: usize = 1 << 20;

/// Configuration for a [`LocalPool`](crate::pool::LocalPool)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Name used in log output
    pub name: String,
    /// Number of registration events buffered for slow hook subscribers
    pub hook_capacity: usize,
}

impl PoolConfig {
    /// Create a configuration with the given pool name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the hook channel capacity
    pub fn with_hook_capacity(mut self, hook_capacity: usize) -> Self {
        self.hook_capacity = hook_capacity;
        self
    }

    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> PoolResult<Self> {
        let mut config = Self::default();

        if let Ok(name) = std::env::var(ENV_POOL_NAME) {
            config.name = name;
        }

        if let Ok(raw) = std::env::var(ENV_HOOK_CAPACITY) {
            config.hook_capacity = raw.parse().map_err(|e| {
                PoolError::Configuration(format!("{ENV_HOOK_CAPACITY}={raw:?}: {e}"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the pool cannot work with
    pub fn validate(&self) -> PoolResult<()> {
        if self.hook_capacity == 0 {
            return Err(PoolError::Configuration(
                "hook_capacity must be greater than zero".to_string(),
            ));
        }
        if self.hook_capacity > MAX_HOOK_CAPACITY {
            return Err(PoolError::Configuration(format!(
                "hook_capacity {} exceeds the maximum of {MAX_HOOK_CAPACITY}",
                self.hook_capacity
            )));
        }
        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            name: "local-pool".to_string(),
            hook_capacity: 1024,
        }
    }
}
