use anyhow::Error;
use reqwest::StatusCode;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Whether a failed request may succeed when sent again: connection problems,
/// timeouts, rate limiting and server errors. Other 4xx responses are final.
pub fn is_transient(err: &reqwest::Error) -> bool {
    match err.status() {
        Some(status) => status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS,
        None => err.is_connect() || err.is_timeout() || err.is_request(),
    }
}

/// Runs a Firebase request, retrying transient failures up to `retries` times
/// with a delay that doubles after each attempt, starting at `delay_ms`.
pub async fn with_retry<F, Fut, T>(
    mut operation: F,
    retries: usize,
    delay_ms: u64,
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, reqwest::Error>>,
{
    let mut attempt = 0;
    let mut delay = Duration::from_millis(delay_ms);
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(err) if attempt < retries && is_transient(&err) => {
                attempt += 1;
                debug!(attempt, retries, error = %err, "Transient remote failure, retrying in {delay:?}");
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            Err(err) => return Err(err.into()),
        }
    }
}
