use crate::evidence::{Evidence, EvidenceKind};
use crate::types::{ConfidenceLevel, GapStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Breakdown types
// ---------------------------------------------------------------------------

/// One named adjustment applied after base + evidence summation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Adjustment {
    pub reason: String,
    pub delta: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base_score: i32,
    pub evidence_score: i32,
    pub adjustments: Vec<Adjustment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceResult {
    /// Final clamped score, 0-100.
    pub score: u32,
    pub level: ConfidenceLevel,
    pub breakdown: ScoreBreakdown,
    pub reasoning: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConfidenceSummary {
    pub score: u32,
    pub level: ConfidenceLevel,
}

// ---------------------------------------------------------------------------
// ConfidenceScorer
// ---------------------------------------------------------------------------

/// Pure evidence-to-confidence mapping. Deterministic, no I/O, never fails:
/// any well-typed input produces a result.
#[derive(Debug, Clone)]
pub struct ConfidenceScorer {
    /// Per-kind weight overrides; kinds not present use the built-in table.
    weight_overrides: HashMap<EvidenceKind, i32>,
    stub_penalty: i32,
    test_bonus: i32,
}

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self {
            weight_overrides: HashMap::new(),
            stub_penalty: -15,
            test_bonus: 10,
        }
    }
}

impl ConfidenceScorer {
    pub fn with_weight(mut self, kind: EvidenceKind, weight: i32) -> Self {
        self.weight_overrides.insert(kind, weight);
        self
    }

    fn weight_for(&self, evidence: &Evidence) -> i32 {
        if let Some(impact) = evidence.confidence_impact {
            return impact;
        }
        self.weight_overrides
            .get(&evidence.kind)
            .copied()
            .unwrap_or_else(|| evidence.kind.default_weight())
    }

    /// Score one `(status, evidence)` pair: fixed base per status, plus the
    /// signed evidence weights, plus named adjustments, clamped to 0-100.
    pub fn calculate_score(&self, status: GapStatus, evidence: &[Evidence]) -> ConfidenceResult {
        let base_score = status.base_score();

        let mut evidence_score = 0;
        let mut adjustments = Vec::new();
        for e in evidence {
            if e.kind == EvidenceKind::Unknown && e.confidence_impact.is_none() {
                adjustments.push(Adjustment {
                    reason: format!("unknown evidence type: {}", e.description),
                    delta: 0,
                });
                continue;
            }
            evidence_score += self.weight_for(e);
        }

        let has_stub_evidence = evidence.iter().any(|e| {
            matches!(
                e.kind,
                EvidenceKind::ReturnsTodoComment | EvidenceKind::ReturnsGuidanceText
            )
        });
        if status == GapStatus::Stub && has_stub_evidence {
            adjustments.push(Adjustment {
                reason: "stub detected: placeholder body confirms stub status".to_string(),
                delta: self.stub_penalty,
            });
        }

        let has_test_evidence = evidence.iter().any(|e| {
            matches!(
                e.kind,
                EvidenceKind::TestFileExists | EvidenceKind::TestFileCoversCase
            )
        });
        if has_test_evidence {
            adjustments.push(Adjustment {
                reason: "test coverage present".to_string(),
                delta: self.test_bonus,
            });
        }

        let adjustment_total: i32 = adjustments.iter().map(|a| a.delta).sum();
        let raw = base_score + evidence_score + adjustment_total;
        let score = raw.clamp(0, 100) as u32;

        ConfidenceResult {
            score,
            level: ConfidenceLevel::from_score(score),
            breakdown: ScoreBreakdown {
                base_score,
                evidence_score,
                adjustments,
            },
            reasoning: reasoning_for(status).to_string(),
        }
    }

    /// Average a set of results into one summary. Empty input scores 0.
    pub fn aggregate_scores(&self, results: &[ConfidenceResult]) -> ConfidenceSummary {
        if results.is_empty() {
            return ConfidenceSummary {
                score: 0,
                level: ConfidenceLevel::VeryLow,
            };
        }
        let total: u32 = results.iter().map(|r| r.score).sum();
        let score = (total as f64 / results.len() as f64).round() as u32;
        ConfidenceSummary {
            score,
            level: ConfidenceLevel::from_score(score),
        }
    }
}

/// Linear implemented/total mapping, separate from evidence scoring.
pub fn completeness_confidence(implemented: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((implemented as f64 / total as f64) * 100.0).round() as u32
}

fn reasoning_for(status: GapStatus) -> &'static str {
    match status {
        GapStatus::Complete => "Implementation found and verified",
        GapStatus::Partial => "Partial implementation found",
        GapStatus::Stub => "Implementation exists but is a stub",
        GapStatus::Missing => "No implementation found",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
