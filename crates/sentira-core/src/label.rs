// Sentiment label domain type
//
// The label set is closed: exactly the four values the managed classifier
// can return. Anything else is rejected when it enters the system.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::SentimentError;

/// Sentiment label assigned by the classifier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    Mixed,
}

impl SentimentLabel {
    /// All labels, in their canonical order
    pub const ALL: [SentimentLabel; 4] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
        SentimentLabel::Mixed,
    ];

    /// Canonical wire/storage form (upper case)
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "POSITIVE",
            SentimentLabel::Negative => "NEGATIVE",
            SentimentLabel::Neutral => "NEUTRAL",
            SentimentLabel::Mixed => "MIXED",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = SentimentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "POSITIVE" => Ok(SentimentLabel::Positive),
            "NEGATIVE" => Ok(SentimentLabel::Negative),
            "NEUTRAL" => Ok(SentimentLabel::Neutral),
            "MIXED" => Ok(SentimentLabel::Mixed),
            other => Err(SentimentError::invalid_argument(format!(
                "unknown sentiment label: {other:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_canonical_labels() {
        for label in SentimentLabel::ALL {
            assert_eq!(label.as_str().parse::<SentimentLabel>().unwrap(), label);
        }
    }

    #[test]
    fn rejects_unknown_and_lowercase_labels() {
        assert!("HAPPY".parse::<SentimentLabel>().is_err());
        assert!("positive".parse::<SentimentLabel>().is_err());
        assert!("".parse::<SentimentLabel>().is_err());
    }

    #[test]
    fn serializes_upper_case() {
        let json = serde_json::to_string(&SentimentLabel::Neutral).unwrap();
        assert_eq!(json, "\"NEUTRAL\"");
        let back: SentimentLabel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SentimentLabel::Neutral);
    }
}
