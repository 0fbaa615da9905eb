//! Keyword classifier: display name → [`Category`].

use crate::model::Category;

/// Category used when no keyword matches.
pub const DEFAULT_CATEGORY: Category = Category::Constellation;

/// Checked in order; the first keyword found in the name wins.
/// "constellation" precedes "star" so names like "Star Constellation" stay
/// constellations.
const KEYWORDS: [(&str, Category); 6] = [
    ("constellation", Category::Constellation),
    ("star", Category::Star),
    ("planet", Category::Planet),
    ("galaxy", Category::Galaxy),
    ("nebula", Category::Nebula),
    ("cluster", Category::Cluster),
];

/// Classify a subject from its display name. Total and pure.
pub fn classify(display_name: &str) -> Category {
    let lowered = display_name.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|&(_, category)| category)
        .unwrap_or(DEFAULT_CATEGORY)
}
