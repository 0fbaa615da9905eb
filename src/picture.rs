//! Picture-of-the-day resolution.
//!
//! The service sometimes publishes a video (or an interactive page) instead of
//! an image. [`PictureResolver::resolve`] walks a sequence of distinct
//! candidate dates, one request per date, until a date yields an image or the
//! attempt budget runs out.
//!
//! # Date policy
//!
//! Candidate order is fully determined by the [`DatePolicy`] and the anchor
//! date, so a fixed anchor and seed reproduce the same request sequence:
//!
//! - [`DatePolicy::WalkBack`]: anchor, anchor − 1 day, anchor − 2 days, …
//! - [`DatePolicy::SeededWindow`]: the offsets `0..window_days` back from the
//!   anchor, shuffled with a `StdRng` seeded from `seed`.
//!
//! Neither policy yields a date before [`first_picture_date`].

use chrono::{Days, NaiveDate, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::{MediaKind, PictureResource};
use crate::transport::PictureSource;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no image available after {attempts} attempt(s)")]
    Exhausted { attempts: u32 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DatePolicy {
    #[default]
    WalkBack,
    SeededWindow { window_days: u32, seed: u64 },
}

/// The first date the service published a picture for.
pub fn first_picture_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1995, 6, 16).unwrap_or(NaiveDate::MIN)
}

/// Up to `limit` distinct candidate dates in request order.
pub fn candidate_dates(policy: &DatePolicy, anchor: NaiveDate, limit: usize) -> Vec<NaiveDate> {
    let earliest = first_picture_date();
    let back = |offset: u64| anchor.checked_sub_days(Days::new(offset)).filter(|d| *d >= earliest);

    match policy {
        DatePolicy::WalkBack => (0..).map_while(back).take(limit).collect(),
        DatePolicy::SeededWindow { window_days, seed } => {
            // Offsets past the first picture would be filtered anyway; don't allocate them.
            let available = u64::try_from((anchor - earliest).num_days() + 1).unwrap_or(0);
            let mut offsets: Vec<u64> = (0..u64::from(*window_days).min(available)).collect();
            let mut rng = StdRng::seed_from_u64(*seed);
            offsets.shuffle(&mut rng);
            offsets.into_iter().filter_map(back).take(limit).collect()
        }
    }
}

/// Retries across candidate dates until an image resolves.
#[derive(Debug, Clone)]
pub struct PictureResolver<S> {
    source: S,
    policy: DatePolicy,
    anchor: Option<NaiveDate>,
}

impl<S: PictureSource> PictureResolver<S> {
    /// Resolver anchored at today's UTC date.
    pub fn new(source: S, policy: DatePolicy) -> Self {
        Self { source, policy, anchor: None }
    }

    /// Pin the anchor date instead of using today.
    pub fn with_anchor(mut self, anchor: NaiveDate) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// Return the first image found within `max_attempts` requests.
    ///
    /// A non-image entry and a failed request each consume one attempt; a
    /// failed request never aborts the sequence early. `max_attempts = 0`
    /// fails without any request.
    pub async fn resolve(&self, max_attempts: u32) -> Result<PictureResource, ResolveError> {
        if max_attempts == 0 {
            warn!("picture resolution requested with zero attempts");
            return Err(ResolveError::Exhausted { attempts: 0 });
        }

        let anchor = self.anchor.unwrap_or_else(|| Utc::now().date_naive());
        let dates = candidate_dates(&self.policy, anchor, max_attempts as usize);
        debug!(%anchor, policy = ?self.policy, candidates = dates.len(), "resolving picture of the day");

        let mut attempts = 0;
        for date in dates {
            attempts += 1;
            match self.source.fetch_picture(date).await {
                Ok(picture) if picture.media_kind == MediaKind::Image => {
                    info!(%date, attempts, title = %picture.title, "picture of the day resolved");
                    return Ok(picture);
                }
                Ok(picture) => {
                    debug!(%date, media = %picture.media_kind, "skipping non-image entry");
                }
                Err(e) => {
                    warn!(%date, error = %e, retryable = e.is_retryable(), "picture request failed");
                }
            }
        }

        warn!(attempts, "no image found within attempt budget");
        Err(ResolveError::Exhausted { attempts })
    }
}
