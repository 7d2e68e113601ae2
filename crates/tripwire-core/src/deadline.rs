//! Optional deadlines around remote calls.
//!
//! An elapsed deadline becomes the port's own `Timeout` fault, so callers
//! handle it on the same path as any other transport failure.

use std::future::Future;
use std::time::Duration;

use crate::domain::{ObjectStoreError, QueueError};

/// Fault types that can express "the call did not finish in time".
pub trait TimeoutFault {
    fn timed_out(after: Duration) -> Self;
}

impl TimeoutFault for QueueError {
    fn timed_out(after: Duration) -> Self {
        QueueError::Timeout(after)
    }
}

impl TimeoutFault for ObjectStoreError {
    fn timed_out(after: Duration) -> Self {
        ObjectStoreError::Timeout(after)
    }
}

/// Await `call`, giving up after `limit` when one is set.
pub async fn bounded<T, E, F>(limit: Option<Duration>, call: F) -> Result<T, E>
where
    E: TimeoutFault,
    F: Future<Output = Result<T, E>>,
{
    let Some(limit) = limit else {
        return call.await;
    };
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(E::timed_out(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn elapsed_deadline_maps_to_timeout_fault() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, QueueError>(())
        };
        let result = bounded(Some(Duration::from_secs(5)), slow).await;
        assert_eq!(result, Err(QueueError::Timeout(Duration::from_secs(5))));
    }

    #[tokio::test]
    async fn no_limit_passes_result_through() {
        let result: Result<u32, ObjectStoreError> = bounded(None, async { Ok(7) }).await;
        assert_eq!(result, Ok(7));
    }
}
