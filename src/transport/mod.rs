//! Content transport: one outbound HTTP exchange per call, no retries.
//!
//! [`HttpTransport`] owns the `reqwest::Client` and classifies every outcome
//! into a [`TransportError`] kind. The endpoint clients in this module's
//! children build URLs and wire types on top of it; their serde types are
//! private, callers only see domain records.
//!
//! The `PictureSource`, `TextGenerator` and `SummaryLookup` traits are the
//! seams the resolver, coordinator and search mapper are generic over, so
//! tests substitute in-memory stubs without a network.

pub mod apod;
pub mod gemini;
pub mod wiki;

use std::future::Future;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::{Client, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error, trace, warn};

use crate::model::PictureResource;

pub use apod::ApodClient;
pub use gemini::GeminiClient;
pub use wiki::{SummaryRecord, Thumbnail, WikiClient};

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The outbound request could not be built. Programmer error; not retried.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// The origin answered with a non-success status.
    #[error("invalid response: HTTP {0}")]
    InvalidResponse(u16),
    /// No HTTP exchange took place (connect, DNS, timeout).
    #[error("network failure: {0}")]
    Network(String),
    /// The origin answered 200 with an empty body.
    #[error("no data in response")]
    NoData,
    /// The origin answered 200 but the body did not match the expected shape.
    #[error("failed to parse response: {0}")]
    ParseFailure(String),
}

impl TransportError {
    /// Whether a caller-level retry could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportError::InvalidResponse(_) | TransportError::Network(_))
    }
}

// ── Seams ─────────────────────────────────────────────────────────────────────

/// Dated picture resources (the picture-of-the-day service).
pub trait PictureSource: Send + Sync + 'static {
    fn fetch_picture(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<PictureResource, TransportError>> + Send;
}

/// Prompt in, generated text out.
pub trait TextGenerator: Send + Sync + 'static {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, TransportError>> + Send;
}

/// Encyclopedia-style summary lookup keyed by a free-text term.
pub trait SummaryLookup: Send + Sync {
    fn summary(&self, query: &str) -> impl Future<Output = Result<SummaryRecord, TransportError>> + Send;
}

// ── HTTP core ─────────────────────────────────────────────────────────────────

/// Shared, stateless HTTP primitive. Cheap to clone (`reqwest::Client` is an
/// `Arc` internally).
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout_seconds: u64) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| TransportError::InvalidRequest(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// GET `url` and decode a JSON body.
    ///
    /// With `bypass_cache`, the request carries `Cache-Control: no-cache` and
    /// `Pragma: no-cache` so intermediaries revalidate with the origin.
    pub async fn get_json<T: DeserializeOwned>(&self, url: Url, bypass_cache: bool) -> Result<T, TransportError> {
        let mut req = self.client.get(url);
        if bypass_cache {
            req = req.header(CACHE_CONTROL, "no-cache").header(PRAGMA, "no-cache");
        }
        self.execute(req).await
    }

    /// POST `body` as JSON to `url` and decode a JSON body.
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(&self, url: Url, body: &B) -> Result<T, TransportError> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| TransportError::InvalidRequest(format!("failed to serialize body: {e}")))?;
        if tracing::enabled!(tracing::Level::TRACE) {
            trace!(body = %String::from_utf8_lossy(&bytes), "outbound payload");
        }
        let req = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(bytes);
        self.execute(req).await
    }

    async fn execute<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, TransportError> {
        let request = req.build().map_err(|e| TransportError::InvalidRequest(e.without_url().to_string()))?;
        // Only the path is logged; query strings carry API keys.
        let path = request.url().path().to_string();
        debug!(method = %request.method(), %path, "sending request");

        let response = self.client.execute(request).await.map_err(|e| {
            let e = e.without_url();
            error!(%path, error = %e, timeout = e.is_timeout(), connect = e.is_connect(), "HTTP request failed (transport)");
            TransportError::Network(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%path, %status, "request returned HTTP error");
            return Err(TransportError::InvalidResponse(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| {
            let e = e.without_url();
            error!(%path, error = %e, "failed to read response body");
            TransportError::Network(e.to_string())
        })?;
        decode_body(&body).inspect_err(|e| warn!(%path, error = %e, "response body rejected"))
    }
}

/// Classify a 200 body: empty (or whitespace-only) → `NoData`, shape mismatch →
/// `ParseFailure`.
fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, TransportError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(TransportError::NoData);
    }
    serde_json::from_slice(body).map_err(|e| TransportError::ParseFailure(e.to_string()))
}

/// Join `segments` onto `base`, percent-encoding each segment.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<Url, TransportError> {
    let mut url = Url::parse(base).map_err(|e| TransportError::InvalidRequest(format!("bad base url '{base}': {e}")))?;
    url.path_segments_mut()
        .map_err(|_| TransportError::InvalidRequest(format!("base url cannot carry a path: '{base}'")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Ping {
        ok: bool,
    }

    #[test]
    fn empty_body_is_no_data() {
        assert_eq!(decode_body::<Ping>(b"").unwrap_err(), TransportError::NoData);
        assert_eq!(decode_body::<Ping>(b"  \n").unwrap_err(), TransportError::NoData);
    }

    #[test]
    fn wrong_shape_is_parse_failure() {
        let err = decode_body::<Ping>(br#"{"nope": 1}"#).unwrap_err();
        assert!(matches!(err, TransportError::ParseFailure(_)));
        let err = decode_body::<Ping>(b"<html>").unwrap_err();
        assert!(matches!(err, TransportError::ParseFailure(_)));
    }

    #[test]
    fn good_body_decodes() {
        assert_eq!(decode_body::<Ping>(br#"{"ok": true}"#).unwrap(), Ping { ok: true });
    }

    #[test]
    fn endpoint_encodes_segments() {
        let url = endpoint("https://en.wikipedia.org/", &["api", "rest_v1", "page", "summary", "Orion Nebula"]).unwrap();
        assert_eq!(url.as_str(), "https://en.wikipedia.org/api/rest_v1/page/summary/Orion%20Nebula");
        let url = endpoint("https://x.test", &["a/b"]).unwrap();
        assert_eq!(url.path(), "/a%2Fb");
    }

    #[test]
    fn endpoint_rejects_bad_base() {
        assert!(matches!(endpoint("not a url", &["a"]), Err(TransportError::InvalidRequest(_))));
        assert!(matches!(endpoint("mailto:x@y.z", &["a"]), Err(TransportError::InvalidRequest(_))));
    }

    #[test]
    fn retryability() {
        assert!(TransportError::InvalidResponse(500).is_retryable());
        assert!(TransportError::Network("refused".into()).is_retryable());
        assert!(!TransportError::ParseFailure("x".into()).is_retryable());
        assert!(!TransportError::InvalidRequest("x".into()).is_retryable());
        assert!(!TransportError::NoData.is_retryable());
    }

    #[tokio::test]
    async fn get_classifies_status_and_sends_no_cache() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ping")
            .match_header("cache-control", "no-cache")
            .match_header("pragma", "no-cache")
            .with_status(503)
            .create_async()
            .await;

        let http = HttpTransport::new(5).unwrap();
        let url = endpoint(&server.url(), &["ping"]).unwrap();
        let err = http.get_json::<Ping>(url, true).await.unwrap_err();

        mock.assert_async().await;
        assert_eq!(err, TransportError::InvalidResponse(503));
    }

    /// Log sink shared between the subscriber and the test.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[tokio::test]
    async fn network_failure_logs_never_carry_query_keys() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .finish();
        // Current-thread test runtime, so the thread-local default covers every poll.
        let _guard = tracing::subscriber::set_default(subscriber);

        let http = HttpTransport::new(2).unwrap();
        let url = Url::parse("http://127.0.0.1:9/planetary/apod?api_key=SECRET123&date=2024-01-01").unwrap();
        let err = http.get_json::<Ping>(url, true).await.unwrap_err();

        let captured = logs.contents();
        assert!(captured.contains("HTTP request failed"), "logs: {captured}");
        assert!(captured.contains("/planetary/apod"));
        assert!(!captured.contains("SECRET123"), "logs: {captured}");
        assert!(!err.to_string().contains("SECRET123"));
    }

    #[tokio::test]
    async fn unreachable_origin_is_network_failure() {
        let http = HttpTransport::new(2).unwrap();
        // Port 9 (discard) on localhost is not expected to be listening.
        let url = Url::parse("http://127.0.0.1:9/ping").unwrap();
        let err = http.get_json::<Ping>(url, false).await.unwrap_err();
        assert!(matches!(err, TransportError::Network(_)));
    }
}
