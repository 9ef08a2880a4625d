//! Per-attempt deadline enforcement.

use std::future::Future;
use std::time::Duration;

use crate::{HttpClientError, Result};

/// Run a transport call under a deadline.
///
/// Returns the call's own result if it finishes in time. On expiry the
/// in-flight future is dropped, which abandons the underlying connection,
/// and the guard fails with [`HttpClientError::Timeout`]. The timer is
/// scoped to this call and released on every exit path.
pub async fn with_deadline<T, F>(deadline: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(outcome) => outcome,
        Err(_) => Err(HttpClientError::Timeout(deadline)),
    }
}
