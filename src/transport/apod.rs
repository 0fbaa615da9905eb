//! Picture-of-the-day client (`/planetary/apod`).

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use super::{HttpTransport, PictureSource, TransportError, endpoint};
use crate::model::{MediaKind, PictureResource};

/// Client for NASA's Astronomy Picture of the Day endpoint.
#[derive(Debug, Clone)]
pub struct ApodClient {
    http: HttpTransport,
    api_base_url: String,
    api_key: String,
}

impl ApodClient {
    pub fn new(http: HttpTransport, api_base_url: String, api_key: String) -> Self {
        Self { http, api_base_url, api_key }
    }
}

impl PictureSource for ApodClient {
    async fn fetch_picture(&self, date: NaiveDate) -> Result<PictureResource, TransportError> {
        let mut url = endpoint(&self.api_base_url, &["planetary", "apod"])?;
        url.query_pairs_mut()
            .append_pair("api_key", &self.api_key)
            .append_pair("date", &date.format("%Y-%m-%d").to_string());

        let record: ApodRecord = self.http.get_json(url, true).await?;
        let picture = record.into_resource()?;
        debug!(requested = %date, resolved = %picture.date, media = %picture.media_kind, "picture fetched");
        Ok(picture)
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ApodRecord {
    date: String,
    explanation: String,
    title: String,
    /// Absent for some non-image entries.
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    media_type: Option<String>,
    #[serde(default)]
    hdurl: Option<String>,
    #[serde(default)]
    copyright: Option<String>,
}

impl ApodRecord {
    fn into_resource(self) -> Result<PictureResource, TransportError> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .map_err(|e| TransportError::ParseFailure(format!("bad date '{}': {e}", self.date)))?;
        let media_kind = match self.media_type.as_deref() {
            Some(kind) => kind.parse::<MediaKind>().unwrap_or(MediaKind::Other),
            None => MediaKind::Other,
        };
        let url = match (media_kind, self.url) {
            (_, Some(url)) => url,
            (MediaKind::Image, None) => {
                return Err(TransportError::ParseFailure("image entry without url".into()));
            }
            (_, None) => String::new(),
        };
        Ok(PictureResource {
            date,
            media_kind,
            title: self.title,
            explanation: self.explanation,
            url,
            hd_url: self.hdurl,
            attribution: self.copyright.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(base: String) -> ApodClient {
        ApodClient::new(HttpTransport::new(5).unwrap(), base, "test-key".into())
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn fetches_dated_image_without_cache() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/planetary/apod")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("api_key".into(), "test-key".into()),
                Matcher::UrlEncoded("date".into(), "2024-03-01".into()),
            ]))
            .match_header("cache-control", "no-cache")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"date":"2024-03-01","explanation":"Dust.","title":"Horsehead",
                    "url":"https://apod.test/h.jpg","hdurl":"https://apod.test/h_big.jpg",
                    "media_type":"image","copyright":"\n Jane Doe \n","service_version":"v1"}"#,
            )
            .create_async()
            .await;

        let pic = client(server.url()).fetch_picture(date("2024-03-01")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(pic.media_kind, MediaKind::Image);
        assert_eq!(pic.title, "Horsehead");
        assert_eq!(pic.hd_url.as_deref(), Some("https://apod.test/h_big.jpg"));
        assert_eq!(pic.attribution.as_deref(), Some("Jane Doe"));
    }

    #[tokio::test]
    async fn video_entry_is_returned_as_video() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/planetary/apod")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"date":"2024-03-02","explanation":"e","title":"t","url":"https://youtube.test/x","media_type":"video"}"#)
            .create_async()
            .await;

        let pic = client(server.url()).fetch_picture(date("2024-03-02")).await.unwrap();
        assert_eq!(pic.media_kind, MediaKind::Video);
    }

    #[tokio::test]
    async fn missing_fields_are_parse_failures() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/planetary/apod")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"date":"2024-03-02","media_type":"image"}"#)
            .create_async()
            .await;

        let err = client(server.url()).fetch_picture(date("2024-03-02")).await.unwrap_err();
        assert!(matches!(err, TransportError::ParseFailure(_)));
    }

    #[test]
    fn record_without_media_type_is_other() {
        let rec = ApodRecord {
            date: "2020-01-01".into(),
            explanation: String::new(),
            title: String::new(),
            url: None,
            media_type: None,
            hdurl: None,
            copyright: None,
        };
        let pic = rec.into_resource().unwrap();
        assert_eq!(pic.media_kind, MediaKind::Other);
        assert!(pic.url.is_empty());
    }

    #[test]
    fn image_without_url_is_rejected() {
        let rec = ApodRecord {
            date: "2020-01-01".into(),
            explanation: String::new(),
            title: String::new(),
            url: None,
            media_type: Some("image".into()),
            hdurl: None,
            copyright: None,
        };
        assert!(matches!(rec.into_resource(), Err(TransportError::ParseFailure(_))));
    }
}
