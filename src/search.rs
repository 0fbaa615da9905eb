//! Search: encyclopedia lookup → [`Subject`].

use tracing::{debug, info};

use crate::model::Subject;
use crate::transport::{SummaryLookup, SummaryRecord, TransportError};

/// Image shown when the lookup record has no thumbnail.
pub const FALLBACK_IMAGE_URL: &str = "https://apod.nasa.gov/apod/image/0601/orion_gendler_sm.jpg";

/// Characters of the extract kept in [`Subject::summary`].
pub const SUMMARY_LEN: usize = 100;

/// Map a summary record into a subject.
///
/// `constellation` is set to `query`, not to the resolved title, so the
/// caller's search term survives redirects like "orion" → "Orion Nebula".
pub fn map_summary(record: SummaryRecord, query: &str) -> Subject {
    let summary: String = record.extract.chars().take(SUMMARY_LEN).collect();
    let mut subject = Subject::named(record.title);
    subject.summary = format!("{summary}...");
    subject.image_url = record
        .thumbnail
        .map(|t| t.source)
        .unwrap_or_else(|| FALLBACK_IMAGE_URL.to_string());
    subject.description = record.extract;
    subject.constellation = Some(query.to_string());
    subject
}

/// Look `query` up and map the result.
///
/// Returns no subjects for a blank query (without a request) or when the
/// service has no page for the term (HTTP 404). Every other failure is
/// returned to the caller.
pub async fn search<L: SummaryLookup>(lookup: &L, query: &str) -> Result<Vec<Subject>, TransportError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }
    match lookup.summary(query).await {
        Ok(record) => {
            let subject = map_summary(record, query);
            info!(%query, title = %subject.display_name, category = %subject.category, "search resolved");
            Ok(vec![subject])
        }
        Err(TransportError::InvalidResponse(404)) => {
            debug!(%query, "no page for query");
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::model::Category;
    use crate::transport::Thumbnail;

    fn orion() -> SummaryRecord {
        SummaryRecord {
            title: "Orion Nebula".into(),
            extract: "A bright nebula...".into(),
            thumbnail: Some(Thumbnail { source: "http://x/img.jpg".into() }),
        }
    }

    #[test]
    fn maps_record_and_preserves_query() {
        let s = map_summary(orion(), "orion");
        assert_eq!(s.display_name, "Orion Nebula");
        assert_eq!(s.constellation.as_deref(), Some("orion"));
        assert_eq!(s.image_url, "http://x/img.jpg");
        assert_eq!(s.category, Category::Nebula);
        assert_eq!(s.description, "A bright nebula...");
    }

    #[test]
    fn missing_thumbnail_uses_fallback() {
        let mut rec = orion();
        rec.thumbnail = None;
        assert_eq!(map_summary(rec, "orion").image_url, FALLBACK_IMAGE_URL);
    }

    #[test]
    fn summary_is_fixed_length_prefix() {
        let mut rec = orion();
        rec.extract = "é".repeat(250);
        let s = map_summary(rec, "q");
        assert_eq!(s.summary.chars().count(), SUMMARY_LEN + 3);
        assert!(s.summary.ends_with("..."));
        assert_eq!(s.description.chars().count(), 250);
    }

    struct StubLookup {
        result: Result<SummaryRecord, TransportError>,
        queries: Mutex<Vec<String>>,
    }

    impl SummaryLookup for StubLookup {
        async fn summary(&self, query: &str) -> Result<SummaryRecord, TransportError> {
            self.queries.lock().unwrap().push(query.to_string());
            self.result.clone()
        }
    }

    fn stub(result: Result<SummaryRecord, TransportError>) -> StubLookup {
        StubLookup { result, queries: Mutex::new(Vec::new()) }
    }

    #[tokio::test]
    async fn search_trims_and_maps() {
        let lookup = stub(Ok(orion()));
        let found = search(&lookup, "  orion ").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].constellation.as_deref(), Some("orion"));
        assert_eq!(*lookup.queries.lock().unwrap(), vec!["orion".to_string()]);
    }

    #[tokio::test]
    async fn blank_query_makes_no_request() {
        let lookup = stub(Ok(orion()));
        assert!(search(&lookup, "   ").await.unwrap().is_empty());
        assert!(lookup.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn not_found_is_empty_other_errors_propagate() {
        let lookup = stub(Err(TransportError::InvalidResponse(404)));
        assert!(search(&lookup, "zzz").await.unwrap().is_empty());

        let lookup = stub(Err(TransportError::InvalidResponse(503)));
        assert_eq!(search(&lookup, "zzz").await.unwrap_err(), TransportError::InvalidResponse(503));
    }
}
