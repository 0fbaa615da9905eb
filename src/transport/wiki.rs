//! Encyclopedia summary client (`/api/rest_v1/page/summary/{term}`).

use serde::Deserialize;
use tracing::debug;

use super::{HttpTransport, SummaryLookup, TransportError, endpoint};

/// Page summary as returned by the lookup service. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SummaryRecord {
    pub title: String,
    pub extract: String,
    #[serde(default)]
    pub thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Thumbnail {
    pub source: String,
}

#[derive(Debug, Clone)]
pub struct WikiClient {
    http: HttpTransport,
    api_base_url: String,
}

impl WikiClient {
    pub fn new(http: HttpTransport, api_base_url: String) -> Self {
        Self { http, api_base_url }
    }
}

impl SummaryLookup for WikiClient {
    async fn summary(&self, query: &str) -> Result<SummaryRecord, TransportError> {
        // Each segment is percent-encoded, so spaces and slashes in the term are safe.
        let url = endpoint(&self.api_base_url, &["api", "rest_v1", "page", "summary", query])?;
        let record: SummaryRecord = self.http.get_json(url, false).await?;
        debug!(%query, title = %record.title, has_thumbnail = record.thumbnail.is_some(), "summary fetched");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn looks_up_percent_encoded_term() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/rest_v1/page/summary/Crab%20Nebula")
            .with_status(200)
            .with_body(
                r#"{"type":"standard","title":"Crab Nebula","extract":"A supernova remnant.",
                    "thumbnail":{"source":"https://img.test/crab.jpg","width":320,"height":240}}"#,
            )
            .create_async()
            .await;

        let client = WikiClient::new(HttpTransport::new(5).unwrap(), server.url());
        let rec = client.summary("Crab Nebula").await.unwrap();

        mock.assert_async().await;
        assert_eq!(rec.title, "Crab Nebula");
        assert_eq!(rec.thumbnail.map(|t| t.source).as_deref(), Some("https://img.test/crab.jpg"));
    }

    #[tokio::test]
    async fn not_found_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/rest_v1/page/summary/Nowhere")
            .with_status(404)
            .create_async()
            .await;

        let client = WikiClient::new(HttpTransport::new(5).unwrap(), server.url());
        assert_eq!(client.summary("Nowhere").await.unwrap_err(), TransportError::InvalidResponse(404));
    }

    #[test]
    fn thumbnail_is_optional() {
        let rec: SummaryRecord = serde_json::from_str(r#"{"title":"Vega","extract":"A star."}"#).unwrap();
        assert!(rec.thumbnail.is_none());
    }
}
