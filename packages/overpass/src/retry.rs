//! HTTP retry helper for Overpass requests.
//!
//! The public Overpass instance sheds load with HTTP 429 and answers
//! slow queries with HTTP 504. Both are worth one more try after a short
//! pause; anything else is reported to the caller immediately.
//!
//! This is transport-level retry of the *same* request. Widening the
//! search radius is a separate concern handled by the caller.

use std::time::Duration;

use reqwest::StatusCode;

use crate::OverpassError;

/// How a single Overpass request is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one.
    pub max_retries: u32,
    /// Pause before each extra attempt.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            delay: Duration::from_secs(2),
        }
    }
}

/// Sends an HTTP request and parses the response body as JSON.
///
/// The `build_request` closure is called on each attempt to construct a
/// fresh [`reqwest::RequestBuilder`] (builders are consumed by
/// `.send()`).
///
/// # Errors
///
/// Returns [`OverpassError`] if the request fails after all retries, the
/// server returns a non-retryable status code, or the body is not JSON.
#[allow(clippy::future_not_send)]
pub async fn send_json<F>(
    build_request: F,
    policy: &RetryPolicy,
) -> Result<serde_json::Value, OverpassError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = send_inner(&build_request, policy).await?;
    let text = response.text().await?;

    serde_json::from_str(&text).map_err(|e| OverpassError::Parse {
        message: format!("JSON parse failed: {e} (received {} bytes)", text.len()),
    })
}

/// Sends the request built by `build_request`, retrying on transient
/// errors up to `policy.max_retries` times. Returns the successful
/// [`reqwest::Response`].
#[allow(clippy::future_not_send)]
async fn send_inner<F>(
    build_request: &F,
    policy: &RetryPolicy,
) -> Result<reqwest::Response, OverpassError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let max_retries = policy.max_retries;
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            log::warn!(
                "  retry {attempt}/{max_retries} in {:?}...",
                policy.delay
            );
            tokio::time::sleep(policy.delay).await;
        }

        let can_retry = attempt < max_retries;
        attempt += 1;

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && can_retry {
                    log::warn!("  transient error: {e}");
                    continue;
                }
                return Err(OverpassError::Http(e));
            }
            Ok(response) => {
                let status = response.status();

                if is_retryable_status(status) {
                    if can_retry {
                        log::warn!("  HTTP {status} from Overpass");
                        continue;
                    }
                    return Err(OverpassError::Status {
                        status: status.as_u16(),
                    });
                }

                if !status.is_success() {
                    return Err(OverpassError::Status {
                        status: status.as_u16(),
                    });
                }

                return Ok(response);
            }
        }
    }
}

/// Statuses the Overpass instance uses for temporary overload.
fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::GATEWAY_TIMEOUT
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_request()
}
