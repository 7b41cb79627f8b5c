//! Per-tick metric sample lookup

use crate::models::MetricSample;
use std::collections::HashMap;

/// Sample titles published by the real-time feed
pub mod titles {
    pub const PRODUCTION_RATE: &str = "Tablet Production Rate";
    pub const QUALITY_SCORE: &str = "Quality Score";
    pub const DRUG_RELEASE: &str = "Drug Release Rate";
    pub const API_CONTENT: &str = "API Content";
}

/// The latest samples of one line, keyed by title
#[derive(Debug, Clone, Default)]
pub struct MetricSet {
    samples: HashMap<String, MetricSample>,
}

impl MetricSet {
    pub fn new(samples: impl IntoIterator<Item = MetricSample>) -> Self {
        Self {
            samples: samples
                .into_iter()
                .map(|s| (s.title.clone(), s))
                .collect(),
        }
    }

    pub fn get(&self, title: &str) -> Option<&MetricSample> {
        self.samples.get(title)
    }

    /// Numeric value of a sample, `None` when missing or not numeric
    pub fn value(&self, title: &str) -> Option<f64> {
        self.get(title).and_then(|s| parse_number(&s.value))
    }

    pub fn value_or(&self, title: &str, default: f64) -> f64 {
        self.value(title).unwrap_or(default)
    }

    /// Signed percent change of a sample (`"+8.2%"` -> `8.2`)
    pub fn change_percent(&self, title: &str) -> Option<f64> {
        self.get(title).and_then(|s| parse_number(&s.change))
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl From<Vec<MetricSample>> for MetricSet {
    fn from(samples: Vec<MetricSample>) -> Self {
        Self::new(samples)
    }
}

/// Parse the leading decimal number of a string, ignoring trailing units
///
/// Accepts an optional sign, digits and one decimal point: `"95.0"`,
/// `"+8.2%"`, `"-2"`, `" 200 tablets/min"`. Returns `None` when no digits
/// lead the string.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    for (i, c) in trimmed.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }

    if !seen_digit {
        return None;
    }

    trimmed[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Trend;

    fn sample(title: &str, value: &str, change: &str) -> MetricSample {
        MetricSample {
            title: title.to_string(),
            value: value.to_string(),
            unit: String::new(),
            change: change.to_string(),
            trend: Trend::Up,
            color: String::new(),
        }
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("200"), Some(200.0));
        assert_eq!(parse_number("95.5"), Some(95.5));
        assert_eq!(parse_number("+8.2%"), Some(8.2));
        assert_eq!(parse_number("-1.5%"), Some(-1.5));
        assert_eq!(parse_number(" 42 tablets/min"), Some(42.0));
        assert_eq!(parse_number("1.2.3"), Some(1.2));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("n/a"), None);
        assert_eq!(parse_number("-"), None);
    }

    #[test]
    fn test_metric_set_lookup() {
        let set = MetricSet::new(vec![
            sample(titles::PRODUCTION_RATE, "200", "+4.0%"),
            sample(titles::QUALITY_SCORE, "garbage", "-0.5%"),
        ]);

        assert_eq!(set.len(), 2);
        assert_eq!(set.value(titles::PRODUCTION_RATE), Some(200.0));
        assert_eq!(set.value(titles::QUALITY_SCORE), None);
        assert_eq!(set.value_or(titles::QUALITY_SCORE, 95.0), 95.0);
        assert_eq!(set.value_or(titles::API_CONTENT, 98.0), 98.0);
        assert_eq!(set.change_percent(titles::QUALITY_SCORE), Some(-0.5));
    }

    #[test]
    fn test_later_sample_with_same_title_wins() {
        let set = MetricSet::new(vec![
            sample(titles::PRODUCTION_RATE, "100", ""),
            sample(titles::PRODUCTION_RATE, "150", ""),
        ]);

        assert_eq!(set.len(), 1);
        assert_eq!(set.value(titles::PRODUCTION_RATE), Some(150.0));
    }
}
