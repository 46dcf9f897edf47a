//! HTTP retrieval with a bounded retry loop.
//!
//! Every attempt picks the next user agent from a fixed pool. The first
//! attempt gets a short timeout and later attempts a longer one, with a
//! fixed pause in between. All failures count against the same budget.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use wisata_core::{Result, WisataError};

pub const USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
];

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGES: &str = "id-ID,id;q=0.9,en-US;q=0.8,en;q=0.7";

/// Body and metadata of a successful response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub url: String,
    pub status: u16,
    /// Lowercased `Content-Type` header, empty when the server sent none.
    pub content_type: String,
    /// Body decoded with the `charset` of the `Content-Type` header, UTF-8
    /// when none is given.
    pub body: String,
    pub retrieved_at: DateTime<Utc>,
}

impl RawResponse {
    pub fn text(&self) -> &str {
        &self.body
    }
}

/// A single request with a given identity and timeout.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str, user_agent: &str, timeout: Duration) -> Result<RawResponse>;
}

#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str, user_agent: &str, timeout: Duration) -> Result<RawResponse> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .header(ACCEPT, ACCEPT_HTML)
            .header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGES)
            .timeout(timeout)
            .send()
            .await?
            .error_for_status()?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_lowercase())
            .unwrap_or_default();
        let body = response.text().await?;

        debug!("Received {} bytes ({}) from {}", body.len(), content_type, final_url);
        Ok(RawResponse {
            url: final_url,
            status,
            content_type,
            body,
            retrieved_at: Utc::now(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub first_timeout: Duration,
    pub retry_timeout: Duration,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            first_timeout: Duration::from_secs(30),
            retry_timeout: Duration::from_secs(60),
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Zero-based attempt index to user agent, cycling through the pool.
    pub fn user_agent(&self, attempt: u32) -> &'static str {
        USER_AGENTS[attempt as usize % USER_AGENTS.len()]
    }

    pub fn timeout(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            self.first_timeout
        } else {
            self.retry_timeout
        }
    }
}

pub struct Retriever<F: Fetch = HttpFetcher> {
    fetcher: F,
    policy: RetryPolicy,
}

impl Retriever<HttpFetcher> {
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_fetcher(HttpFetcher::new(), policy)
    }
}

impl<F: Fetch> Retriever<F> {
    pub fn with_fetcher(fetcher: F, policy: RetryPolicy) -> Self {
        Self { fetcher, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub async fn retrieve(&self, url: &str) -> Result<RawResponse> {
        let attempts = self.policy.max_attempts.max(1);
        let mut last_error = String::from("no attempt made");

        for attempt in 0..attempts {
            let timeout = self.policy.timeout(attempt);
            info!(
                "Attempt {}/{} for {} (timeout {}s)",
                attempt + 1,
                attempts,
                url,
                timeout.as_secs()
            );

            match self
                .fetcher
                .fetch(url, self.policy.user_agent(attempt), timeout)
                .await
            {
                Ok(response) => {
                    info!("Response received (status {})", response.status);
                    return Ok(response);
                }
                Err(e) => {
                    warn!("Attempt {} failed: {}", attempt + 1, e);
                    last_error = e.to_string();
                }
            }

            if attempt + 1 < attempts {
                sleep(self.policy.delay).await;
            }
        }

        Err(WisataError::Retrieval {
            url: url.to_string(),
            attempts,
            reason: last_error,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use mockito::Server;
    use std::sync::Mutex;

    /// Fails the first `failures` calls, then answers with `body`.
    pub(crate) struct FakeFetcher {
        failures: u32,
        content_type: String,
        body: String,
        pub calls: Mutex<Vec<(String, Duration)>>,
    }

    impl FakeFetcher {
        pub(crate) fn new(failures: u32, content_type: &str, body: &str) -> Self {
            Self {
                failures,
                content_type: content_type.to_string(),
                body: body.to_string(),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Fetch for FakeFetcher {
        async fn fetch(&self, url: &str, user_agent: &str, timeout: Duration) -> Result<RawResponse> {
            let attempt = {
                let mut calls = self.calls.lock().unwrap();
                calls.push((user_agent.to_string(), timeout));
                calls.len() as u32
            };
            if attempt <= self.failures {
                return Err(WisataError::Parse(format!("connection reset ({})", attempt)));
            }
            Ok(RawResponse {
                url: url.to_string(),
                status: 200,
                content_type: self.content_type.clone(),
                body: self.body.clone(),
                retrieved_at: Utc::now(),
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_rotates_agent_and_escalates_timeout() {
        let fetcher = FakeFetcher::new(2, "text/csv", "a,b\n1,2");
        let retriever = Retriever::with_fetcher(fetcher, RetryPolicy::default());

        let response = retriever.retrieve("https://example.com/data.csv").await.unwrap();
        assert_eq!(response.text(), "a,b\n1,2");

        let calls = retriever.fetcher.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], (USER_AGENTS[0].to_string(), Duration::from_secs(30)));
        assert_eq!(calls[1], (USER_AGENTS[1].to_string(), Duration::from_secs(60)));
        assert_eq!(calls[2], (USER_AGENTS[2].to_string(), Duration::from_secs(60)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_budget_is_exhausted() {
        let fetcher = FakeFetcher::new(10, "text/html", "");
        let retriever = Retriever::with_fetcher(fetcher, RetryPolicy::default());

        let started = tokio::time::Instant::now();
        let err = retriever.retrieve("https://example.com").await.unwrap_err();
        match err {
            WisataError::Retrieval { attempts, reason, .. } => {
                assert_eq!(attempts, 3);
                assert!(reason.contains("connection reset (3)"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(retriever.fetcher.call_count(), 3);
        // Two pauses: none after the final attempt.
        assert_eq!(started.elapsed(), Duration::from_secs(4));
    }

    #[test]
    fn test_user_agents_cycle() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.user_agent(4), USER_AGENTS[0]);
        assert_eq!(policy.user_agent(5), USER_AGENTS[1]);
    }

    #[tokio::test]
    async fn test_http_fetcher_sends_identity_headers() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/wisata.csv")
            .match_header("user-agent", USER_AGENTS[1])
            .match_header("accept-language", ACCEPT_LANGUAGES)
            .with_status(200)
            .with_header("content-type", "text/CSV; charset=utf-8")
            .with_body("nama,provinsi\nMonas,DKI Jakarta\n")
            .expect(1)
            .create_async()
            .await;

        let fetcher = HttpFetcher::new();
        let response = fetcher
            .fetch(&format!("{}/wisata.csv", server.url()), USER_AGENTS[1], Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.content_type, "text/csv; charset=utf-8");
        assert!(response.text().starts_with("nama,provinsi"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_fetcher_decodes_declared_charset() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/kafe")
            .with_status(200)
            .with_header("content-type", "text/html; charset=windows-1252")
            .with_body(b"<p>Kaf\xe9 Batavia</p>".as_slice())
            .create_async()
            .await;

        let response = HttpFetcher::new()
            .fetch(&format!("{}/kafe", server.url()), USER_AGENTS[0], Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(response.text(), "<p>Kaf\u{e9} Batavia</p>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_fetcher_rejects_error_status() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .with_body("Not Found")
            .create_async()
            .await;

        let result = HttpFetcher::new()
            .fetch(&format!("{}/missing", server.url()), USER_AGENTS[0], Duration::from_secs(5))
            .await;
        assert!(matches!(result, Err(WisataError::Http(_))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_every_attempt_hits_the_server() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/down")
            .with_status(503)
            .expect(2)
            .create_async()
            .await;

        let policy = RetryPolicy {
            max_attempts: 2,
            delay: Duration::ZERO,
            ..RetryPolicy::default()
        };
        let err = Retriever::new(policy)
            .retrieve(&format!("{}/down", server.url()))
            .await
            .unwrap_err();
        assert!(matches!(err, WisataError::Retrieval { attempts: 2, .. }));
        mock.assert_async().await;
    }
}
