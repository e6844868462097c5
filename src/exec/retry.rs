// src/exec/retry.rs

//! Retry policy and the delay abstraction used between attempts.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::dag::Node;

/// How many times a node's command may run, and how long to wait between
/// consecutive attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn for_node(node: &Node) -> Self {
        Self::new(node.max_attempts(), node.retry_delay())
    }

    /// Whether another attempt is allowed after `attempt` (1-based) failed.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

/// Trait abstracting the wait between attempts.
///
/// Production code uses [`TokioSleeper`]; tests can record the requested
/// delays without waiting on the wall clock.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, delay: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Sleeps on the Tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, delay: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(tokio::time::sleep(delay))
    }
}
