//! Bounded parallel execution
//!
//! [`Simultaneously`] drives a list of futures with a concurrency cap and
//! returns their outputs in input order. In the default fail-fast mode the
//! first error stops scheduling and drops the work still in flight; in
//! collect mode every job runs and the errors are joined. An optional
//! [`CancellationToken`] aborts the whole run with [`Error::Cancelled`].

use crate::error::{Error, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Default number of jobs in flight
pub const DEFAULT_CONCURRENCY: usize = 8;

/// What to do when a job fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Return the first error, dropping in-flight jobs
    #[default]
    FailFast,
    /// Run every job and return all errors joined
    CollectAll,
}

/// Concurrency-capped runner
#[derive(Debug, Clone)]
pub struct Simultaneously {
    max_concurrency: usize,
    mode: FailureMode,
    cancel: Option<CancellationToken>,
}

impl Default for Simultaneously {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}

impl Simultaneously {
    /// Runner with at most `max_concurrency` jobs in flight (minimum 1)
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
            mode: FailureMode::FailFast,
            cancel: None,
        }
    }

    /// Run every job even after failures and join the errors
    #[must_use]
    pub fn collect_errors(mut self) -> Self {
        self.mode = FailureMode::CollectAll;
        self
    }

    /// Abort when the token is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Run the jobs, returning outputs in the order the jobs were given
    pub async fn run<I, F, T>(&self, jobs: I) -> Result<Vec<T>>
    where
        I: IntoIterator<Item = F>,
        F: Future<Output = Result<T>>,
    {
        let mut pending = jobs.into_iter().enumerate();
        let mut in_flight = FuturesUnordered::new();
        let mut outputs: Vec<Option<T>> = Vec::new();
        let mut errors = Vec::new();

        loop {
            while in_flight.len() < self.max_concurrency {
                let Some((index, job)) = pending.next() else {
                    break;
                };
                outputs.push(None);
                in_flight.push(async move { (index, job.await) });
            }

            let next = match &self.cancel {
                Some(token) => tokio::select! {
                    biased;
                    () = token.cancelled() => {
                        debug!("Parallel run cancelled");
                        return Err(Error::Cancelled);
                    }
                    next = in_flight.next() => next,
                },
                None => in_flight.next().await,
            };

            let Some((index, outcome)) = next else {
                break;
            };
            match outcome {
                Ok(value) => outputs[index] = Some(value),
                Err(e) if self.mode == FailureMode::FailFast => {
                    debug!(job = index, error = %e, "Parallel job failed, stopping");
                    return Err(e);
                }
                Err(e) => errors.push(e),
            }
        }

        if !errors.is_empty() {
            return Err(Error::join(errors));
        }
        Ok(outputs.into_iter().flatten().collect())
    }
}
