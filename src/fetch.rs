use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::settings::Settings;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Anything that can hand back the HTML body of a URL.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// reqwest-backed source with timeout, identifying user agent and retries.
pub struct HttpClient {
    client: reqwest::Client,
    max_attempts: u32,
    backoff_base: Duration,
}

impl HttpClient {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let client = Self::builder(settings).build()?;
        Ok(Self::with_client(client, settings))
    }

    fn builder(settings: &Settings) -> reqwest::ClientBuilder {
        reqwest::Client::builder()
            .user_agent(&settings.user_agent)
            .timeout(Duration::from_secs(settings.timeout_secs))
    }

    fn with_client(client: reqwest::Client, settings: &Settings) -> Self {
        HttpClient {
            client,
            max_attempts: settings.max_attempts.max(1),
            backoff_base: Duration::from_millis(settings.backoff_base_ms),
        }
    }

    async fn fetch_once(&self, url: &Url) -> Result<String, FetchError> {
        let network = |source: reqwest::Error| FetchError::Network {
            url: url.to_string(),
            source,
        };
        let response = self.client.get(url.as_str()).send().await.map_err(network)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(network)
    }
}

impl PageSource for HttpClient {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let mut attempt = 1;
        loop {
            debug!(%url, attempt, "GET");
            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt >= self.max_attempts => return Err(e),
                Err(e) => {
                    let delay = backoff(self.backoff_base, attempt);
                    warn!(
                        "{} (attempt {}/{}), retrying in {:.1}s",
                        e,
                        attempt,
                        self.max_attempts,
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Delay before retrying after failed `attempt` (1-based): base, 2x base, 4x base, ...
pub fn backoff(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    const UNAVAILABLE: &str =
        "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
    const OK: &str = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 11\r\nConnection: close\r\n\r\n<h1>ok</h1>";

    /// Serves `responses` in order (repeating the last) and counts connections.
    async fn serve(responses: Vec<&'static str>) -> (Url, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        tokio::spawn(async move {
            while let Ok((mut sock, _)) = listener.accept().await {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let response = responses[n.min(responses.len() - 1)];

                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match sock.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(k) => request.extend_from_slice(&buf[..k]),
                    }
                }
                let _ = sock.write_all(response.as_bytes()).await;
                let _ = sock.shutdown().await;
            }
        });

        (Url::parse(&format!("http://{}/", addr)).unwrap(), hits)
    }

    fn local_client(max_attempts: u32) -> HttpClient {
        let settings = Settings {
            max_attempts,
            backoff_base_ms: 1,
            timeout_secs: 5,
            ..Settings::default()
        };
        let client = HttpClient::builder(&settings).no_proxy().build().unwrap();
        HttpClient::with_client(client, &settings)
    }

    #[test]
    fn backoff_doubles() {
        let base = Duration::from_millis(1000);
        assert_eq!(backoff(base, 1), Duration::from_secs(1));
        assert_eq!(backoff(base, 2), Duration::from_secs(2));
        assert_eq!(backoff(base, 3), Duration::from_secs(4));
    }

    #[test]
    fn backoff_saturates() {
        let d = backoff(Duration::from_secs(1), 200);
        assert!(d >= Duration::from_secs(1 << 31));
    }

    #[test]
    fn status_error_message() {
        let e = FetchError::Status {
            url: "https://aitoolfor.org/x".into(),
            status: 503,
        };
        assert_eq!(e.to_string(), "HTTP 503 for https://aitoolfor.org/x");
    }

    #[tokio::test]
    async fn persistent_503_is_retried_then_surfaced() {
        let (url, hits) = serve(vec![UNAVAILABLE]).await;
        let err = local_client(3).fetch(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn recovers_after_transient_503() {
        let (url, hits) = serve(vec![UNAVAILABLE, OK]).await;
        let body = local_client(3).fetch(&url).await.unwrap();
        assert_eq!(body, "<h1>ok</h1>");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn single_attempt_does_not_retry() {
        let (url, hits) = serve(vec![UNAVAILABLE, OK]).await;
        let err = local_client(1).fetch(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unreachable_host_exhausts_attempts() {
        let settings = Settings {
            max_attempts: 2,
            backoff_base_ms: 1,
            timeout_secs: 2,
            ..Settings::default()
        };
        let client = HttpClient::with_client(
            HttpClient::builder(&settings).no_proxy().build().unwrap(),
            &settings,
        );
        // Port 1 on loopback refuses connections immediately.
        let url = Url::parse("http://127.0.0.1:1/").unwrap();
        let err = client.fetch(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Network { .. }));
    }
}
