//! Best-effort extraction of numeric attributes from the structured-measurements
//! field text.
//!
//! The generative service is asked for "short, precise measurements", which in
//! practice come back as one `label: value unit` pair per line, sometimes with
//! bullets. Anything that does not look like that is skipped.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Measurements {
    pub apparent_magnitude: Option<f64>,
    pub absolute_magnitude: Option<f64>,
    pub distance_light_years: Option<f64>,
    pub distance_parsecs: Option<f64>,
    pub distance_au: Option<f64>,
}

impl Measurements {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Parse measurement text. Never fails; unknown or malformed lines are ignored
/// and the first value seen for each attribute is kept.
pub fn parse_measurements(text: &str) -> Measurements {
    let mut m = Measurements::default();

    for raw in text.lines() {
        let line = raw.trim().trim_start_matches(['-', '*', '•']).trim().to_lowercase();
        let (label, value) = match line.split_once(':') {
            Some((l, v)) => (l.trim(), v.trim()),
            None => (line.as_str(), line.as_str()),
        };
        let Some(number) = first_number(value) else { continue };

        if label.contains("apparent magnitude") {
            m.apparent_magnitude.get_or_insert(number);
        } else if label.contains("absolute magnitude") {
            m.absolute_magnitude.get_or_insert(number);
        } else if label.contains("distance") {
            if value.contains("light year") || value.contains("light-year") || has_unit(value, "ly") {
                m.distance_light_years.get_or_insert(number);
            } else if value.contains("parsec") || has_unit(value, "pc") {
                m.distance_parsecs.get_or_insert(number);
            } else if has_unit(value, "au") || value.contains("astronomical unit") {
                m.distance_au.get_or_insert(number);
            }
        }
    }

    m
}

/// `true` if `unit` appears as a standalone word in `value`.
fn has_unit(value: &str, unit: &str) -> bool {
    value
        .split(|c: char| !c.is_ascii_alphabetic())
        .any(|word| word == unit)
}

/// First decimal number in `s`. Accepts a leading sign (ASCII or U+2212) and
/// thousands separators.
fn first_number(s: &str) -> Option<f64> {
    let chars: Vec<char> = s.chars().collect();
    let start = chars.iter().position(|c| c.is_ascii_digit())?;

    let negative = start > 0 && matches!(chars[start - 1], '-' | '\u{2212}');
    let mut digits = String::new();
    let mut seen_dot = false;
    for &c in &chars[start..] {
        match c {
            '0'..='9' => digits.push(c),
            ',' => {}
            '.' if !seen_dot => {
                seen_dot = true;
                digits.push(c);
            }
            _ => break,
        }
    }
    let digits = digits.trim_end_matches('.');
    let value: f64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}
