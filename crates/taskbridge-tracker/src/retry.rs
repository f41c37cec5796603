//! HTTP send loop with exponential backoff.
//!
//! Retries 5xx and 429 responses, timeouts and connect failures.
//! Everything else returns immediately. When attempts run out the last
//! failure is returned.

use std::time::Duration;

use tracing::warn;

use crate::config::RetryPolicy;

/// Zero-based attempt counter sent with every request.
pub const RETRY_ATTEMPT_HEADER: &str = "x-taskbridge-retry-attempt";

const MAX_DELAY_MS: u64 = 30_000;
const MAX_ERROR_BODY_CHARS: usize = 800;

/// Why an HTTP exchange did not produce a success response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpFailure {
    Status { status: u16, body: String },
    Transport(String),
}

/// Send the request built by `build` until it succeeds, fails permanently,
/// or `policy.max_attempts` is reached.
///
/// `build` is called once per attempt because a `RequestBuilder` is
/// consumed by `send`.
pub async fn send_with_retry<F>(
    policy: &RetryPolicy,
    operation: &str,
    mut build: F,
) -> Result<reqwest::Response, HttpFailure>
where
    F: FnMut() -> reqwest::RequestBuilder,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0_u32;

    loop {
        let request = build().header(RETRY_ATTEMPT_HEADER, attempt.to_string());
        attempt = attempt.saturating_add(1);
        match request.send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return Ok(response);
                }

                let retry_after = parse_retry_after(response.headers());
                let body = response.text().await.unwrap_or_default();
                if attempt < max_attempts && is_retryable_status(status.as_u16()) {
                    let delay = retry_delay(policy.base_delay_ms, attempt, retry_after);
                    warn!(
                        operation = %operation,
                        attempt = attempt,
                        status = status.as_u16(),
                        delay_ms = delay.as_millis() as u64,
                        "retrying after server error"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }

                return Err(HttpFailure::Status {
                    status: status.as_u16(),
                    body: truncate_for_error(&body, MAX_ERROR_BODY_CHARS),
                });
            }
            Err(error) => {
                if attempt < max_attempts && is_retryable_transport_error(&error) {
                    let delay = retry_delay(policy.base_delay_ms, attempt, None);
                    warn!(
                        operation = %operation,
                        attempt = attempt,
                        error = %error,
                        delay_ms = delay.as_millis() as u64,
                        "retrying after transport error"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
                return Err(HttpFailure::Transport(error.to_string()));
            }
        }
    }
}

fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    let raw = headers.get(reqwest::header::RETRY_AFTER)?.to_str().ok()?;
    let seconds = raw.trim().parse::<u64>().ok()?;
    Some(Duration::from_secs(seconds))
}

/// Delay before the retry that follows `attempt` (1-based).
///
/// A `Retry-After` value is kept between the base delay and the 30 s cap.
pub fn retry_delay(base_delay_ms: u64, attempt: u32, retry_after: Option<Duration>) -> Duration {
    let ceiling = Duration::from_millis(MAX_DELAY_MS);
    if let Some(delay) = retry_after {
        let floor = Duration::from_millis(base_delay_ms).min(ceiling);
        return delay.clamp(floor, ceiling);
    }
    let exponent = attempt.saturating_sub(1).min(10);
    let scaled = base_delay_ms.saturating_mul(2_u64.saturating_pow(exponent));
    Duration::from_millis(scaled.min(MAX_DELAY_MS))
}

pub fn is_retryable_status(status: u16) -> bool {
    status == 429 || status >= 500
}

fn is_retryable_transport_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect()
}

fn truncate_for_error(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated = text.chars().take(max_chars).collect::<String>();
    truncated.push_str("...");
    truncated
}
