//! Domain records shared by the resolver, coordinator, and search mapper.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::classify::classify;
use crate::measurements::Measurements;

// ── Category ──────────────────────────────────────────────────────────────────

/// Coarse kind of celestial object. Drives iconography in the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Star,
    Constellation,
    Planet,
    Galaxy,
    Nebula,
    Cluster,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Star => "star",
            Category::Constellation => "constellation",
            Category::Planet => "planet",
            Category::Galaxy => "galaxy",
            Category::Nebula => "nebula",
            Category::Cluster => "cluster",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Subject ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    pub light_years: Option<f64>,
    pub parsecs: Option<f64>,
}

impl Distance {
    pub fn is_empty(&self) -> bool {
        self.light_years.is_none() && self.parsecs.is_none()
    }
}

/// When the subject is above the horizon for an observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityWindow {
    pub rise: DateTime<Utc>,
    pub transit: DateTime<Utc>,
    pub set: DateTime<Utc>,
    pub best_viewing: DateTime<Utc>,
}

/// A celestial object the user can look up and enrich.
///
/// `display_name` is the query key for every enrichment fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: Uuid,
    pub display_name: String,
    pub summary: String,
    pub description: String,
    pub image_url: String,
    pub category: Category,
    pub magnitude: Option<f64>,
    pub distance: Option<Distance>,
    pub visibility: Option<VisibilityWindow>,
    /// Free-form context; for search results this is the caller's original query.
    pub constellation: Option<String>,
}

impl Subject {
    /// New subject with its category classified from `display_name`.
    pub fn named(display_name: impl Into<String>) -> Self {
        let display_name = display_name.into();
        let category = classify(&display_name);
        Self {
            id: Uuid::new_v4(),
            display_name,
            summary: String::new(),
            description: String::new(),
            image_url: String::new(),
            category,
            magnitude: None,
            distance: None,
            visibility: None,
            constellation: None,
        }
    }

    /// Replace the classified category with one from a trusted data source.
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Fill attributes that are still unset from parsed measurements.
    /// Values already present are left alone.
    pub fn apply_measurements(&mut self, m: &Measurements) {
        if self.magnitude.is_none() {
            self.magnitude = m.apparent_magnitude;
        }
        let fresh = Distance { light_years: m.distance_light_years, parsecs: m.distance_parsecs };
        match &mut self.distance {
            None if !fresh.is_empty() => self.distance = Some(fresh),
            Some(d) => {
                d.light_years = d.light_years.or(fresh.light_years);
                d.parsecs = d.parsecs.or(fresh.parsecs);
            }
            None => {}
        }
    }
}

// ── Picture of the day ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Other,
}

impl FromStr for MediaKind {
    type Err = std::convert::Infallible;

    /// Total: anything other than `image`/`video` is `Other`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "image" => MediaKind::Image,
            "video" => MediaKind::Video,
            _ => MediaKind::Other,
        })
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Other => "other",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PictureResource {
    pub date: NaiveDate,
    pub media_kind: MediaKind,
    pub title: String,
    pub explanation: String,
    pub url: String,
    pub hd_url: Option<String>,
    pub attribution: Option<String>,
}
