use std::thread;
use std::time::Duration;

use anyhow::Context as _;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONNECTION, HeaderMap, HeaderValue, USER_AGENT};
use scraper::Html;
use url::Url;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// When and how long to wait before re-issuing a failed GET.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub base_backoff: Duration,
    pub retry_statuses: Vec<StatusCode>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_backoff: Duration::from_secs(1),
            retry_statuses: vec![
                StatusCode::TOO_MANY_REQUESTS,
                StatusCode::INTERNAL_SERVER_ERROR,
                StatusCode::BAD_GATEWAY,
                StatusCode::SERVICE_UNAVAILABLE,
                StatusCode::GATEWAY_TIMEOUT,
            ],
        }
    }
}

impl RetryPolicy {
    pub fn should_retry_status(&self, status: StatusCode) -> bool {
        self.retry_statuses.contains(&status)
    }

    pub fn should_retry_error(&self, err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() || err.is_decode()
    }

    /// `failed_attempts` counts attempts that already failed (1 after the first failure).
    pub fn backoff(&self, failed_attempts: u32) -> Duration {
        let exponent = failed_attempts.saturating_sub(1).min(10);
        self.base_backoff.saturating_mul(1 << exponent)
    }

    pub fn has_attempts_left(&self, failed_attempts: u32) -> bool {
        failed_attempts < self.max_attempts.max(1)
    }
}

/// Where pages come from. The crawler only talks to this trait so it can run
/// against canned documents in tests.
pub trait PageSource {
    fn get_text(&self, url: &Url) -> anyhow::Result<String>;

    fn fetch(&self, url: &Url) -> anyhow::Result<Html> {
        let body = self.get_text(url)?;
        Ok(Html::parse_document(&body))
    }
}

/// Blocking HTTP fetcher sharing one keep-alive client across all requests.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    policy: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, policy: RetryPolicy) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(browser_headers())
            .build()
            .context("build http client")?;
        Ok(Self { client, policy })
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl PageSource for HttpFetcher {
    fn get_text(&self, url: &Url) -> anyhow::Result<String> {
        let mut failed_attempts = 0_u32;
        loop {
            // A body that breaks off mid-read is retried like a failed send.
            let err = match self.client.get(url.clone()).send() {
                Ok(response) if response.status().is_success() => match response.text() {
                    Ok(body) => return Ok(body),
                    Err(err) => err,
                },
                Ok(response) => {
                    let status = response.status();
                    failed_attempts += 1;
                    if self.policy.should_retry_status(status)
                        && self.policy.has_attempts_left(failed_attempts)
                    {
                        let delay = self.policy.backoff(failed_attempts);
                        tracing::warn!(%url, %status, attempt = failed_attempts, ?delay, "retrying GET");
                        thread::sleep(delay);
                        continue;
                    }
                    anyhow::bail!("GET {url} failed with status {status}");
                }
                Err(err) => err,
            };

            failed_attempts += 1;
            if self.policy.should_retry_error(&err) && self.policy.has_attempts_left(failed_attempts) {
                let delay = self.policy.backoff(failed_attempts);
                tracing::warn!(%url, ?err, attempt = failed_attempts, ?delay, "retrying GET");
                thread::sleep(delay);
                continue;
            }
            return Err(anyhow::Error::new(err).context(format!("GET {url}")));
        }
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers
}
