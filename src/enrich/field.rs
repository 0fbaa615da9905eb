//! Content fields and their prompt rules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One independently fetched piece of content about a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentField {
    NarrativeHistory,
    TechnicalSummary,
    PracticalGuidance,
    StructuredMeasurements,
}

impl ContentField {
    pub const ALL: [ContentField; 4] = [
        ContentField::NarrativeHistory,
        ContentField::TechnicalSummary,
        ContentField::PracticalGuidance,
        ContentField::StructuredMeasurements,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentField::NarrativeHistory => "narrative-history",
            ContentField::TechnicalSummary => "technical-summary",
            ContentField::PracticalGuidance => "practical-guidance",
            ContentField::StructuredMeasurements => "structured-measurements",
        }
    }

    /// Heading shown next to the field's text.
    pub fn title(self) -> &'static str {
        match self {
            ContentField::NarrativeHistory => "Mythology & History",
            ContentField::TechnicalSummary => "Scientific Overview",
            ContentField::PracticalGuidance => "Observation Tips",
            ContentField::StructuredMeasurements => "Astronomical Data",
        }
    }

    /// Build the generative prompt for `subject_name`.
    pub fn prompt(self, subject_name: &str) -> String {
        match self {
            ContentField::NarrativeHistory => format!(
                "Tell me about the mythology and historical significance of {subject_name} in astronomy.\n\
                 Include both ancient cultural stories and early astronomical observations.\n\
                 Keep the response concise but informative, around 150 words.\n\
                 Format in simple text without special characters."
            ),
            ContentField::TechnicalSummary => format!(
                "Provide detailed scientific information about {subject_name} including:\n\
                 - Physical characteristics\n\
                 - Composition\n\
                 - Notable features\n\
                 - Recent discoveries\n\
                 Keep it concise but technical, around 150 words.\n\
                 Format in simple text without special characters."
            ),
            ContentField::PracticalGuidance => format!(
                "Provide practical observation tips for viewing {subject_name}:\n\
                 - Best equipment to use\n\
                 - Optimal viewing conditions\n\
                 - What features to look for\n\
                 - Common challenges and solutions\n\
                 Keep it practical and specific, around 150 words.\n\
                 Format in simple text without special characters."
            ),
            ContentField::StructuredMeasurements => format!(
                "Provide specific astronomical data for {subject_name}, one 'label: value' per line:\n\
                 - Distance from Earth (in light years or AU)\n\
                 - Apparent magnitude\n\
                 - Absolute magnitude\n\
                 - Constellation location\n\
                 - Right ascension and declination\n\
                 - Physical characteristics (size, mass, temperature)\n\
                 Format as short, precise measurements without explanatory text.\n\
                 Use numerical values where possible."
            ),
        }
    }
}

impl fmt::Display for ContentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentField {
    type Err = String;

    /// Accepts the kebab-case tag or a short alias.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "narrative-history" | "history" | "mythology" => Ok(ContentField::NarrativeHistory),
            "technical-summary" | "technical" | "scientific" => Ok(ContentField::TechnicalSummary),
            "practical-guidance" | "guidance" | "tips" => Ok(ContentField::PracticalGuidance),
            "structured-measurements" | "measurements" | "data" => Ok(ContentField::StructuredMeasurements),
            other => Err(format!("unknown content field: '{other}'")),
        }
    }
}
