use crate::claims::DocumentationClaim;
use crate::config::ProjectContext;
use crate::evidence::Evidence;
use crate::types::{ClaimVerdict, EffortEstimate, GapStatus, Recommendation};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Id derivation
// ---------------------------------------------------------------------------

/// Deterministic item id from a source position. Stable across runs so that
/// progress deltas can match items up.
pub fn derive_id(prefix: &str, file: &str, line: usize) -> String {
    let slug: String = file
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();
    let slug = slug.trim_matches('-').replace("--", "-");
    format!("{prefix}-{slug}-{line}")
}

// ---------------------------------------------------------------------------
// SpecGap
// ---------------------------------------------------------------------------

/// A requirement declared in a specification file with no convincing
/// implementation behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecGap {
    pub id: String,
    pub requirement: String,
    /// `file:line`, plus the section heading when known.
    pub source: String,
    pub status: GapStatus,
    /// 0-100.
    pub confidence_score: u32,
    pub evidence: Vec<Evidence>,
    pub recommendation: Recommendation,
}

// ---------------------------------------------------------------------------
// FeatureGap
// ---------------------------------------------------------------------------

/// A documentation claim whose verified accuracy fell below threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureGap {
    pub id: String,
    pub claim: DocumentationClaim,
    pub verdict: ClaimVerdict,
    pub status: GapStatus,
    /// 0-100.
    pub accuracy_score: u32,
    pub evidence: Vec<Evidence>,
    /// Synthesized description of what the evidence actually showed.
    pub reality: String,
    pub recommendation: Recommendation,
}

// ---------------------------------------------------------------------------
// DesirableFeature
// ---------------------------------------------------------------------------

fn default_alignment() -> u8 {
    5
}

/// A candidate feature no spec has asked for yet. Produced by an external
/// brainstormer; the engine only scores and schedules it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesirableFeature {
    pub id: String,
    pub category: String,
    pub title: String,
    pub description: String,
    pub effort: EffortEstimate,
    /// 0-10, brainstormer-assigned; defaults to the neutral midpoint.
    #[serde(default = "default_alignment")]
    pub strategic_alignment: u8,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// Black-box producer of candidate features.
pub trait FeatureSource {
    fn brainstorm(&self, context: &ProjectContext) -> Vec<DesirableFeature>;
}

// ---------------------------------------------------------------------------
// CompletenessAssessment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletenessAssessment {
    pub total_requirements: usize,
    pub implemented: usize,
    pub partial: usize,
    pub missing: usize,
    /// Linear implemented/total confidence, 0-100.
    pub confidence: u32,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_deterministic_and_slugged() {
        let a = derive_id("gap", "docs/README.md", 12);
        let b = derive_id("gap", "docs/README.md", 12);
        assert_eq!(a, b);
        assert_eq!(a, "gap-docs-readme-md-12");
    }

    #[test]
    fn id_differs_by_line() {
        assert_ne!(
            derive_id("gap", "README.md", 1),
            derive_id("gap", "README.md", 2)
        );
    }

    #[test]
    fn desirable_feature_default_alignment() {
        let json = r#"{
            "id": "feat-export",
            "category": "ux",
            "title": "CSV export",
            "description": "Export roadmaps to CSV",
            "effort": {
                "hours": 8.0,
                "range": { "optimistic": 4.0, "pessimistic": 12.0 },
                "confidence": "medium",
                "source": "ai"
            }
        }"#;
        let feature: DesirableFeature = serde_json::from_str(json).unwrap();
        assert_eq!(feature.strategic_alignment, 5);
        assert!(feature.dependencies.is_empty());
    }
}
