use crate::error::{GapscanError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// GapStatus
// ---------------------------------------------------------------------------

/// Coarse classification of an item before confidence scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapStatus {
    Complete,
    Partial,
    Stub,
    Missing,
}

impl GapStatus {
    pub fn all() -> &'static [GapStatus] {
        &[
            GapStatus::Complete,
            GapStatus::Partial,
            GapStatus::Stub,
            GapStatus::Missing,
        ]
    }

    /// Base confidence score contributed by the status alone.
    pub fn base_score(self) -> i32 {
        match self {
            GapStatus::Complete => 90,
            GapStatus::Partial => 60,
            GapStatus::Stub => 40,
            GapStatus::Missing => 20,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GapStatus::Complete => "complete",
            GapStatus::Partial => "partial",
            GapStatus::Stub => "stub",
            GapStatus::Missing => "missing",
        }
    }
}

impl fmt::Display for GapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GapStatus {
    type Err = GapscanError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "complete" => Ok(GapStatus::Complete),
            "partial" => Ok(GapStatus::Partial),
            "stub" => Ok(GapStatus::Stub),
            "missing" => Ok(GapStatus::Missing),
            _ => Err(GapscanError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ConfidenceLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfidenceLevel {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ConfidenceLevel {
    /// Bucket a 0-100 score into a qualitative level.
    pub fn from_score(score: u32) -> Self {
        match score {
            90..=u32::MAX => ConfidenceLevel::VeryHigh,
            70..=89 => ConfidenceLevel::High,
            50..=69 => ConfidenceLevel::Medium,
            30..=49 => ConfidenceLevel::Low,
            _ => ConfidenceLevel::VeryLow,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConfidenceLevel::VeryLow => "very-low",
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::High => "high",
            ConfidenceLevel::VeryHigh => "very-high",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    P0,
    P1,
    P2,
    P3,
}

impl Priority {
    pub fn all() -> &'static [Priority] {
        &[Priority::P0, Priority::P1, Priority::P2, Priority::P3]
    }

    /// 1-based phase number used by priority-bucketed phasing (P0 -> 1).
    pub fn phase_number(self) -> usize {
        self as usize + 1
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::P0 => "P0",
            Priority::P1 => "P1",
            Priority::P2 => "P2",
            Priority::P3 => "P3",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = GapscanError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "P0" | "p0" => Ok(Priority::P0),
            "P1" | "p1" => Ok(Priority::P1),
            "P2" | "p2" => Ok(Priority::P2),
            "P3" | "p3" => Ok(Priority::P3),
            _ => Err(GapscanError::InvalidPriority(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ItemType / ItemStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Gap,
    Feature,
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ItemType::Gap => "gap",
            ItemType::Feature => "feature",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    Completed,
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// ClaimVerdict
// ---------------------------------------------------------------------------

/// Verdict on a single documentation claim after verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimVerdict {
    Accurate,
    Misleading,
    False,
}

impl fmt::Display for ClaimVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ClaimVerdict::Accurate => "accurate",
            ClaimVerdict::Misleading => "misleading",
            ClaimVerdict::False => "false",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Recommendation
// ---------------------------------------------------------------------------

/// Derived deterministically from verdict and score, never user-set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Recommendation {
    RemoveClaim,
    UpdateDocumentation,
    ImplementFeature,
}

impl Recommendation {
    /// Decision table: `false` claims should be removed; misleading claims with
    /// low accuracy need a docs fix; everything else is an implementation gap.
    pub fn derive(verdict: ClaimVerdict, score: u32) -> Self {
        match verdict {
            ClaimVerdict::False => Recommendation::RemoveClaim,
            ClaimVerdict::Misleading if score < 50 => Recommendation::UpdateDocumentation,
            _ => Recommendation::ImplementFeature,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Recommendation::RemoveClaim => "remove-claim",
            Recommendation::UpdateDocumentation => "update-documentation",
            Recommendation::ImplementFeature => "implement-feature",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EffortEstimate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffortConfidence {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffortSource {
    Heuristic,
    Ai,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffortRange {
    pub optimistic: f64,
    pub pessimistic: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffortEstimate {
    /// Point estimate in hours.
    pub hours: f64,
    pub range: EffortRange,
    pub confidence: EffortConfidence,
    pub source: EffortSource,
}

impl EffortEstimate {
    /// Build an estimate, enforcing `optimistic <= hours <= pessimistic`.
    pub fn new(
        hours: f64,
        optimistic: f64,
        pessimistic: f64,
        confidence: EffortConfidence,
        source: EffortSource,
    ) -> Result<Self> {
        if optimistic > pessimistic || hours < optimistic || hours > pessimistic {
            return Err(GapscanError::InvalidEffortRange {
                optimistic,
                pessimistic,
            });
        }
        Ok(Self {
            hours,
            range: EffortRange {
                optimistic,
                pessimistic,
            },
            confidence,
            source,
        })
    }

    /// Heuristic estimate with a symmetric +/-50% range.
    pub fn heuristic(hours: f64) -> Self {
        Self {
            hours,
            range: EffortRange {
                optimistic: hours * 0.5,
                pessimistic: hours * 1.5,
            },
            confidence: EffortConfidence::Low,
            source: EffortSource::Heuristic,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn gap_status_base_scores() {
        assert_eq!(GapStatus::Complete.base_score(), 90);
        assert_eq!(GapStatus::Partial.base_score(), 60);
        assert_eq!(GapStatus::Stub.base_score(), 40);
        assert_eq!(GapStatus::Missing.base_score(), 20);
    }

    #[test]
    fn gap_status_roundtrip() {
        for status in GapStatus::all() {
            let parsed = GapStatus::from_str(status.as_str()).unwrap();
            assert_eq!(*status, parsed);
        }
        assert!(GapStatus::from_str("bogus").is_err());
    }

    #[test]
    fn confidence_level_buckets() {
        assert_eq!(ConfidenceLevel::from_score(100), ConfidenceLevel::VeryHigh);
        assert_eq!(ConfidenceLevel::from_score(90), ConfidenceLevel::VeryHigh);
        assert_eq!(ConfidenceLevel::from_score(89), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(70), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(50), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(30), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_score(29), ConfidenceLevel::VeryLow);
        assert_eq!(ConfidenceLevel::from_score(0), ConfidenceLevel::VeryLow);
    }

    #[test]
    fn priority_ordering_and_phase() {
        assert!(Priority::P0 < Priority::P1);
        assert_eq!(Priority::P0.phase_number(), 1);
        assert_eq!(Priority::P3.phase_number(), 4);
    }

    #[test]
    fn priority_parse() {
        assert_eq!(Priority::from_str("P0").unwrap(), Priority::P0);
        assert_eq!(Priority::from_str("p2").unwrap(), Priority::P2);
        assert!(Priority::from_str("P4").is_err());
    }

    #[test]
    fn recommendation_decision_table() {
        assert_eq!(
            Recommendation::derive(ClaimVerdict::False, 10),
            Recommendation::RemoveClaim
        );
        assert_eq!(
            Recommendation::derive(ClaimVerdict::Misleading, 40),
            Recommendation::UpdateDocumentation
        );
        assert_eq!(
            Recommendation::derive(ClaimVerdict::Misleading, 60),
            Recommendation::ImplementFeature
        );
        assert_eq!(
            Recommendation::derive(ClaimVerdict::Accurate, 95),
            Recommendation::ImplementFeature
        );
    }

    #[test]
    fn effort_estimate_validates_range() {
        assert!(EffortEstimate::new(
            8.0,
            4.0,
            16.0,
            EffortConfidence::Medium,
            EffortSource::Manual
        )
        .is_ok());
        assert!(EffortEstimate::new(
            8.0,
            10.0,
            6.0,
            EffortConfidence::Medium,
            EffortSource::Manual
        )
        .is_err());
        assert!(EffortEstimate::new(
            20.0,
            4.0,
            16.0,
            EffortConfidence::Medium,
            EffortSource::Manual
        )
        .is_err());
    }

    #[test]
    fn effort_heuristic_range_brackets_hours() {
        let e = EffortEstimate::heuristic(10.0);
        assert!(e.range.optimistic <= e.hours);
        assert!(e.hours <= e.range.pessimistic);
        assert_eq!(e.source, EffortSource::Heuristic);
    }

    #[test]
    fn status_serde_snake_case() {
        let json = serde_json::to_string(&GapStatus::Missing).unwrap();
        assert_eq!(json, "\"missing\"");
        let level = serde_json::to_string(&ConfidenceLevel::VeryHigh).unwrap();
        assert_eq!(level, "\"very-high\"");
    }
}
