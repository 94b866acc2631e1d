//! Resolver configuration

use std::time::Duration;

/// Default cap on fixed-point rounds per clause
pub const DEFAULT_MAX_ROUNDS: usize = 64;

/// Tuning knobs for a [`Resolver`](crate::Resolver)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Rounds allowed per clause before it is reported as partially solved
    pub max_rounds: usize,
    /// Issue one round's source calls concurrently
    pub concurrent_sources: bool,
    /// Deadline for a whole `process_query` call
    pub timeout: Option<Duration>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            concurrent_sources: true,
            timeout: None,
        }
    }
}

impl ResolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn with_concurrent_sources(mut self, concurrent: bool) -> Self {
        self.concurrent_sources = concurrent;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
