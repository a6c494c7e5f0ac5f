use crate::core::kernel::transport::TransportError;
use std::future::Future;
use std::num::NonZeroU32;
use tracing::debug;

/// Re-invoke `op` up to `attempts` times while it fails with a fault the
/// `retryable` predicate accepts. Non-retryable faults surface immediately;
/// exhausting the budget wraps the last fault in `RetriesExhausted`.
///
/// `attempts` is non-zero by type, so the "which fault do we surface after
/// zero iterations" question cannot arise. No delay between attempts.
pub async fn with_retry<T, F, Fut>(
    attempts: NonZeroU32,
    retryable: impl Fn(&TransportError) -> bool,
    mut op: F,
) -> Result<T, TransportError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TransportError>>,
{
    let mut remaining = attempts.get();
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(fault) if retryable(&fault) => {
                remaining -= 1;
                if remaining == 0 {
                    return Err(TransportError::RetriesExhausted {
                        attempts: attempts.get(),
                        source: Box::new(fault),
                    });
                }
                debug!(%fault, remaining, "retrying after transient fault");
            }
            Err(fault) => return Err(fault),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn attempts(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[tokio::test]
    async fn test_succeeds_on_last_attempt() {
        let calls = AtomicU32::new(0);
        let result = with_retry(attempts(3), TransportError::is_transient, || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(TransportError::Connect("refused".to_string()))
            } else {
                Ok(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausts_after_exactly_n_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> =
            with_retry(attempts(3), TransportError::is_transient, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TransportError::Connect("refused".to_string()))
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result.unwrap_err() {
            TransportError::RetriesExhausted { attempts, source } => {
                assert_eq!(attempts, 3);
                assert!(matches!(*source, TransportError::Connect(_)));
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_retryable_fault_surfaces_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> =
            with_retry(attempts(3), TransportError::is_transient, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TransportError::Decode("not json".to_string()))
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result.unwrap_err(), TransportError::Decode(_)));
    }

    #[tokio::test]
    async fn test_single_attempt_budget() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> =
            with_retry(attempts(1), TransportError::is_transient, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TransportError::Timeout("deadline".to_string()))
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            result.unwrap_err(),
            TransportError::RetriesExhausted { attempts: 1, .. }
        ));
    }
}
