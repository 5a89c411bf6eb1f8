//! Churn-risk categories derived from the composite RFM score

use serde::Serialize;

/// Churn-risk category of a customer.
///
/// Scores map through half-open intervals: (-1, 1] Churn, (1, 2] Average,
/// (2, 3] Loyal, (3, 5] Best. Scores above 5 are reachable (the maximum is
/// 12) but fall in no interval and become [`RfmCategory::Uncategorized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RfmCategory {
    Churn,
    Average,
    Loyal,
    Best,
    Uncategorized,
}

impl RfmCategory {
    /// Report order
    pub const ALL: [RfmCategory; 5] = [
        RfmCategory::Churn,
        RfmCategory::Average,
        RfmCategory::Loyal,
        RfmCategory::Best,
        RfmCategory::Uncategorized,
    ];

    pub fn from_score(score: u8) -> Self {
        match score {
            0..=1 => RfmCategory::Churn,
            2 => RfmCategory::Average,
            3 => RfmCategory::Loyal,
            4..=5 => RfmCategory::Best,
            _ => RfmCategory::Uncategorized,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RfmCategory::Churn => "Churn",
            RfmCategory::Average => "Average",
            RfmCategory::Loyal => "Loyal",
            RfmCategory::Best => "Best",
            RfmCategory::Uncategorized => "Uncategorized",
        }
    }
}

impl std::fmt::Display for RfmCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for RfmCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RfmCategory::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown RFM category: '{}'", s))
    }
}
