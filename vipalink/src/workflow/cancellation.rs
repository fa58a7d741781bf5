// vipalink-rs/vipalink/src/workflow/cancellation.rs

//! Bounded execution of device work under a shared cancellation token.

use crate::Result;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// What became of one brokered piece of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionOutcome<T> {
    /// Work finished inside the window.
    Success(T),
    /// Timed out, was cancelled, or returned an error.
    Failure,
}

/// Runs device work under a timeout and a cancellation token.
///
/// The broker absorbs the work's own `Err`: the workflow records a single
/// failure classification either way, and the distinction lives in the logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct CancellationBroker;

impl CancellationBroker {
    /// Run `work` to completion, the timeout, or cancellation, whichever
    /// comes first. `work` is polled exactly once through one `select!`.
    pub async fn execute_with_timeout<F, T>(
        &self,
        work: F,
        timeout: Duration,
        token: &CancellationToken,
    ) -> ExecutionOutcome<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            _ = token.cancelled() => ExecutionOutcome::Failure,
            finished = tokio::time::timeout(timeout, work) => match finished {
                Ok(Ok(value)) => ExecutionOutcome::Success(value),
                Ok(Err(e)) => {
                    log::warn!("brokered work failed: {}", e);
                    ExecutionOutcome::Failure
                }
                Err(_) => ExecutionOutcome::Failure,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[tokio::test]
    async fn success_inside_window() {
        let broker = CancellationBroker;
        let token = CancellationToken::new();
        let outcome = broker
            .execute_with_timeout(async { Ok(7u32) }, Duration::from_secs(1), &token)
            .await;
        assert_eq!(outcome, ExecutionOutcome::Success(7));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_is_failure() {
        let broker = CancellationBroker;
        let token = CancellationToken::new();
        let outcome = broker
            .execute_with_timeout(
                async {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(())
                },
                Duration::from_millis(10),
                &token,
            )
            .await;
        assert_eq!(outcome, ExecutionOutcome::Failure);
    }

    #[tokio::test]
    async fn cancellation_is_failure() {
        let broker = CancellationBroker;
        let token = CancellationToken::new();
        token.cancel();
        let outcome = broker
            .execute_with_timeout(
                async {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(())
                },
                Duration::from_secs(60),
                &token,
            )
            .await;
        assert_eq!(outcome, ExecutionOutcome::Failure);
    }

    #[tokio::test]
    async fn work_error_is_absorbed() {
        let broker = CancellationBroker;
        let token = CancellationToken::new();
        let outcome: ExecutionOutcome<()> = broker
            .execute_with_timeout(
                async { Err(Error::Connection("port died".to_string())) },
                Duration::from_secs(1),
                &token,
            )
            .await;
        assert_eq!(outcome, ExecutionOutcome::Failure);
    }
}
