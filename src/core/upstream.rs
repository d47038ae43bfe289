//! Time-bounded collaborator calls

use std::future::Future;
use std::time::Duration;

use tracing::error;

use crate::types::CreditError;

/// Await a collaborator call for at most `limit`
///
/// An elapsed timeout becomes `UpstreamUnavailable` naming `service`; errors the call
/// itself returns pass through unchanged.
pub async fn bounded<T, F>(service: &str, limit: Duration, call: F) -> Result<T, CreditError>
where
    F: Future<Output = Result<T, CreditError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            error!(service, timeout_ms = limit.as_millis() as u64, "collaborator call timed out");
            Err(CreditError::upstream_unavailable(
                service,
                format!("no answer within {} ms", limit.as_millis()),
            ))
        }
    }
}
