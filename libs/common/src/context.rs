//! Per-request cancellation and deadline signal
//!
//! A [`RequestContext`] is created once per inbound request and handed down
//! through every layer of the pipeline. Each layer checks it before issuing
//! I/O so that an expired request never reaches the next hop. Across the RPC
//! boundary the remaining time travels as the standard `grpc-timeout` header.

use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use thiserror::Error;

/// Why a context is no longer usable
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    /// The request was cancelled by its caller
    #[error("context canceled")]
    Cancelled,

    /// The request deadline has passed
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Cancellation and deadline signal for one request
#[derive(Debug, Clone)]
pub struct RequestContext {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::background()
    }
}

impl RequestContext {
    /// A context without a deadline
    pub fn background() -> Self {
        Self {
            deadline: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A context that expires `timeout` from now
    ///
    /// A timeout too large to express as an `Instant` yields a context
    /// without a deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => Self::with_deadline(deadline),
            None => Self::background(),
        }
    }

    /// A context that expires at `deadline`
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Rebuild a context from a `grpc-timeout` header value.
    ///
    /// A missing or malformed value yields a context without a deadline.
    pub fn from_grpc_timeout(value: Option<&str>) -> Self {
        match value.and_then(parse_grpc_timeout) {
            Some(timeout) => Self::with_timeout(timeout),
            None => Self::background(),
        }
    }

    /// Mark this context and all of its clones as cancelled
    ///
    /// This is an explicit hook for callers and tests. A client that
    /// disconnects does not set it; its handler future is dropped instead.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// The absolute deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; zero once it has passed
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Fail if the context has been cancelled or its deadline has passed
    pub fn check(&self) -> Result<(), ContextError> {
        if self.cancelled.load(Ordering::SeqCst) {
            return Err(ContextError::Cancelled);
        }

        match self.remaining() {
            Some(remaining) if remaining.is_zero() => Err(ContextError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Drive `future` to completion, bounded by the remaining deadline
    pub async fn run<F>(&self, future: F) -> Result<F::Output, ContextError>
    where
        F: Future,
    {
        self.check()?;

        match self.remaining() {
            Some(remaining) => tokio::time::timeout(remaining, future)
                .await
                .map_err(|_| ContextError::DeadlineExceeded),
            None => Ok(future.await),
        }
    }
}

/// Parse a `grpc-timeout` value: at most eight ASCII digits followed by one
/// of the units `H`, `M`, `S`, `m`, `u`, `n`.
fn parse_grpc_timeout(value: &str) -> Option<Duration> {
    let value = value.trim();
    let unit = value.chars().last()?;
    let digits = &value[..value.len() - unit.len_utf8()];

    if digits.is_empty() || digits.len() > 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let amount: u64 = digits.parse().ok()?;
    let timeout = match unit {
        'H' => Duration::from_secs(amount * 60 * 60),
        'M' => Duration::from_secs(amount * 60),
        'S' => Duration::from_secs(amount),
        'm' => Duration::from_millis(amount),
        'u' => Duration::from_micros(amount),
        'n' => Duration::from_nanos(amount),
        _ => return None,
    };

    Some(timeout)
}
