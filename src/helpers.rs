//! Shared HTTP plumbing and the retry combinator used around collaborator
//! calls.

use crate::error::Error;
use crate::types::HttpClient;
use std::future::Future;
use std::time::Duration;
use reqwest::header;
use reqwest_middleware::ClientBuilder;
use serde::de::DeserializeOwned;

/// Builds the default middleware client with the given user agent.
pub fn get_default_middleware(user_agent_string: &'static str) -> HttpClient {
    let mut headers = header::HeaderMap::new();

    headers.insert(header::USER_AGENT, header::HeaderValue::from_static(user_agent_string));

    let client = reqwest::ClientBuilder::new()
        .default_headers(headers)
        .build()
        .unwrap();

    ClientBuilder::new(client).build()
}

/// Checks a response's status, returning its body on success.
pub async fn check_response(response: reqwest::Response) -> Result<bytes::Bytes, Error> {
    let status = response.status();

    match status.as_u16() {
        400..=599 => Err(Error::Http(status)),
        _ => Ok(response.bytes().await?),
    }
}

/// Checks and deserializes a JSON response body.
pub async fn parses_response<D>(response: reqwest::Response) -> Result<D, Error>
where
    D: DeserializeOwned,
{
    let body = check_response(response).await?;

    match serde_json::from_slice::<D>(&body) {
        Ok(body) => Ok(body),
        Err(parse_error) => {
            log::debug!("Unexpected response body: {}", String::from_utf8_lossy(&body));
            Err(Error::Parse(parse_error))
        },
    }
}

/// How a failed call should be reattempted: wait `delay` between attempts,
/// giving up after `max_attempts` calls, or never when unset.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// The fixed delay between attempts.
    pub delay: Duration,
    /// The maximum number of attempts. `None` retries until the call
    /// succeeds or fails with a non-retryable error.
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    /// A policy which retries forever on the given delay.
    pub fn unbounded(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
        }
    }

    /// A policy capped at `max_attempts` total calls.
    pub fn attempts(delay: Duration, max_attempts: u32) -> Self {
        Self {
            delay,
            max_attempts: Some(max_attempts),
        }
    }
}

/// Calls `operation` until it succeeds, fails with an error `retryable`
/// rejects, or the policy's attempts run out. Retries are logged at debug
/// level only; these are expected turbulence, not failures.
pub async fn retry<T, F, Fut, P>(
    policy: RetryPolicy,
    retryable: P,
    mut operation: F,
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Error>>,
    P: Fn(&Error) -> bool,
{
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) if retryable(&error) => {
                if let Some(max_attempts) = policy.max_attempts {
                    if attempt >= max_attempts {
                        return Err(error);
                    }
                }

                log::debug!(
                    "Attempt {attempt} failed ({error}), retrying in {:?}..",
                    policy.delay,
                );
                async_std::task::sleep(policy.delay).await;
            },
            Err(error) => return Err(error),
        }
    }
}
