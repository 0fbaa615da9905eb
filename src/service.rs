//! Orchestration facade wiring the resolver, coordinator and search over
//! concrete service clients.

use tracing::{info, warn};

use crate::config::Config;
use crate::enrich::{ContentField, EnrichmentCoordinator, SessionHandle};
use crate::error::AppError;
use crate::model::{PictureResource, Subject};
use crate::picture::{PictureResolver, ResolveError};
use crate::search;
use crate::transport::{
    ApodClient, GeminiClient, HttpTransport, PictureSource, SummaryLookup, TextGenerator, TransportError,
    WikiClient,
};

/// The facade backed by the real HTTP services.
pub type HttpStellarTales = StellarTales<ApodClient, GeminiClient, WikiClient>;

pub struct StellarTales<P, T, L> {
    resolver: PictureResolver<P>,
    coordinator: EnrichmentCoordinator<T>,
    lookup: L,
    default_attempts: u32,
    default_fields: Vec<ContentField>,
}

impl<P, T, L> StellarTales<P, T, L>
where
    P: PictureSource,
    T: TextGenerator,
    L: SummaryLookup,
{
    pub fn new(resolver: PictureResolver<P>, coordinator: EnrichmentCoordinator<T>, lookup: L) -> Self {
        Self {
            resolver,
            coordinator,
            lookup,
            default_attempts: 7,
            default_fields: ContentField::ALL.to_vec(),
        }
    }

    /// Override the attempt budget and field set used by the `*_default` calls.
    pub fn with_defaults(mut self, attempts: u32, fields: Vec<ContentField>) -> Self {
        self.default_attempts = attempts;
        self.default_fields = fields;
        self
    }

    pub fn default_attempts(&self) -> u32 {
        self.default_attempts
    }

    pub fn default_fields(&self) -> &[ContentField] {
        &self.default_fields
    }

    pub async fn resolve_picture_of_day(&self, max_attempts: u32) -> Result<PictureResource, ResolveError> {
        self.resolver.resolve(max_attempts).await
    }

    pub fn enrich_subject(
        &self,
        subject: Subject,
        fields: impl IntoIterator<Item = ContentField>,
    ) -> SessionHandle {
        self.coordinator.enrich(subject, fields)
    }

    /// Enrich with the configured default field set.
    pub fn enrich_subject_default(&self, subject: Subject) -> SessionHandle {
        self.coordinator.enrich(subject, self.default_fields.iter().copied())
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Subject>, TransportError> {
        search::search(&self.lookup, query).await
    }
}

impl HttpStellarTales {
    /// Build every client from resolved configuration.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let picture_http = HttpTransport::new(config.picture.timeout_seconds)?;
        let content_http = HttpTransport::new(config.content.timeout_seconds)?;
        let lookup_http = HttpTransport::new(config.lookup.timeout_seconds)?;

        let apod = ApodClient::new(
            picture_http,
            config.picture.api_base_url.clone(),
            config.nasa_api_key.clone(),
        );
        let mut resolver = PictureResolver::new(apod, config.picture.date_policy.clone());
        if let Some(anchor) = config.picture.anchor_date {
            resolver = resolver.with_anchor(anchor);
        }

        let gemini_key = match &config.gemini_api_key {
            Some(key) => key.clone(),
            None => {
                warn!("GEMINI_API_KEY not set; enrichment fields will show placeholders");
                String::new()
            }
        };
        let gemini = GeminiClient::new(
            content_http,
            config.content.api_base_url.clone(),
            config.content.model.clone(),
            gemini_key,
        );
        let wiki = WikiClient::new(lookup_http, config.lookup.api_base_url.clone());

        info!(
            picture = %config.picture.api_base_url,
            content = %config.content.api_base_url,
            lookup = %config.lookup.api_base_url,
            model = %config.content.model,
            "service clients ready"
        );

        Ok(StellarTales::new(resolver, EnrichmentCoordinator::new(gemini), wiki)
            .with_defaults(config.picture.max_attempts, config.content.fields.clone()))
    }
}
