use crate::config::ProjectContext;
use crate::gap::{DesirableFeature, FeatureGap, SpecGap};
use crate::types::{EffortEstimate, ItemType, Priority};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ScoringWeights
// ---------------------------------------------------------------------------

/// Composite weights. Defaults sum to 1.0 so the composite stays on the
/// 1-10 scale of the sub-scores.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoringWeights {
    #[serde(default = "default_impact_weight")]
    pub impact: f64,
    #[serde(default = "default_effort_weight")]
    pub effort: f64,
    #[serde(default = "default_strategic_weight")]
    pub strategic_value: f64,
    #[serde(default = "default_risk_weight")]
    pub risk: f64,
}

fn default_impact_weight() -> f64 {
    0.35
}

fn default_effort_weight() -> f64 {
    0.25
}

fn default_strategic_weight() -> f64 {
    0.25
}

fn default_risk_weight() -> f64 {
    0.15
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            impact: default_impact_weight(),
            effort: default_effort_weight(),
            strategic_value: default_strategic_weight(),
            risk: default_risk_weight(),
        }
    }
}

// ---------------------------------------------------------------------------
// ScoringPolicy
// ---------------------------------------------------------------------------

/// The tunable heuristics behind the four sub-scores. Swappable as a whole;
/// the scoring algorithm never reads keyword lists from anywhere else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringPolicy {
    #[serde(default)]
    pub weights: ScoringWeights,
    /// `(keyword, boost)` pairs matched against title + description.
    #[serde(default = "default_impact_keywords")]
    pub impact_keywords: Vec<(String, f64)>,
    #[serde(default = "default_complexity_keywords")]
    pub complexity_keywords: Vec<(String, f64)>,
    #[serde(default = "default_simplicity_keywords")]
    pub simplicity_keywords: Vec<(String, f64)>,
    #[serde(default = "default_strategic_keywords")]
    pub strategic_keywords: Vec<(String, f64)>,
    #[serde(default = "default_risk_keywords")]
    pub risk_keywords: Vec<(String, f64)>,
    /// Quartile cutoffs for P0 / P1 / P2 on the 1-10 composite scale.
    #[serde(default = "default_priority_thresholds")]
    pub priority_thresholds: (f64, f64, f64),
}

fn pairs(raw: &[(&str, f64)]) -> Vec<(String, f64)> {
    raw.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn default_impact_keywords() -> Vec<(String, f64)> {
    pairs(&[
        ("security", 2.0),
        ("vulnerability", 2.0),
        ("data loss", 2.0),
        ("crash", 1.5),
        ("corruption", 1.5),
        ("core", 1.0),
    ])
}

fn default_complexity_keywords() -> Vec<(String, f64)> {
    pairs(&[
        ("machine learning", 2.0),
        ("distributed", 2.0),
        ("ai", 1.5),
        ("real-time", 1.5),
        ("migration", 1.0),
        ("concurrent", 1.0),
    ])
}

fn default_simplicity_keywords() -> Vec<(String, f64)> {
    pairs(&[("simple", -1.5), ("basic", -1.5), ("trivial", -2.0), ("rename", -1.0)])
}

fn default_strategic_keywords() -> Vec<(String, f64)> {
    pairs(&[
        ("ai", 1.0),
        ("llm", 1.0),
        ("cloud", 1.0),
        ("real-time", 1.0),
        ("competitive", 1.0),
        ("unique", 1.0),
        ("requested", 1.0),
    ])
}

fn default_risk_keywords() -> Vec<(String, f64)> {
    pairs(&[
        ("breaking", 2.0),
        ("migration", 2.0),
        ("schema", 1.5),
        ("authentication", 1.5),
        ("payment", 2.0),
        ("experimental", 1.5),
    ])
}

fn default_priority_thresholds() -> (f64, f64, f64) {
    (7.75, 5.5, 3.25)
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            impact_keywords: default_impact_keywords(),
            complexity_keywords: default_complexity_keywords(),
            simplicity_keywords: default_simplicity_keywords(),
            strategic_keywords: default_strategic_keywords(),
            risk_keywords: default_risk_keywords(),
            priority_thresholds: default_priority_thresholds(),
        }
    }
}

impl ScoringPolicy {
    pub fn priority_for(&self, score: f64) -> Priority {
        let (p0, p1, p2) = self.priority_thresholds;
        if score >= p0 {
            Priority::P0
        } else if score >= p1 {
            Priority::P1
        } else if score >= p2 {
            Priority::P2
        } else {
            Priority::P3
        }
    }
}

// ---------------------------------------------------------------------------
// RoadmapCandidate
// ---------------------------------------------------------------------------

/// Uniform scoring input: gaps and brainstormed features reduce to this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapCandidate {
    pub id: String,
    pub title: String,
    pub description: String,
    pub item_type: ItemType,
    pub category: String,
    /// 0-10; gaps default to the neutral midpoint.
    pub strategic_alignment: u8,
    pub effort: EffortEstimate,
    pub dependencies: Vec<String>,
    pub tags: Vec<String>,
}

impl From<&SpecGap> for RoadmapCandidate {
    fn from(gap: &SpecGap) -> Self {
        Self {
            id: gap.id.clone(),
            title: gap.requirement.clone(),
            description: format!("{} ({})", gap.requirement, gap.source),
            item_type: ItemType::Gap,
            category: "spec-gap".to_string(),
            strategic_alignment: 5,
            effort: effort_for_status(gap.status),
            dependencies: Vec::new(),
            tags: vec![gap.status.to_string()],
        }
    }
}

impl From<&FeatureGap> for RoadmapCandidate {
    fn from(gap: &FeatureGap) -> Self {
        Self {
            id: gap.id.clone(),
            title: gap.claim.text.clone(),
            description: gap.reality.clone(),
            item_type: ItemType::Gap,
            category: "feature-gap".to_string(),
            strategic_alignment: 5,
            effort: effort_for_status(gap.status),
            dependencies: Vec::new(),
            tags: vec![gap.recommendation.as_str().to_string()],
        }
    }
}

impl From<&DesirableFeature> for RoadmapCandidate {
    fn from(feature: &DesirableFeature) -> Self {
        Self {
            id: feature.id.clone(),
            title: feature.title.clone(),
            description: feature.description.clone(),
            item_type: ItemType::Feature,
            category: feature.category.clone(),
            strategic_alignment: feature.strategic_alignment.min(10),
            effort: feature.effort.clone(),
            dependencies: feature.dependencies.clone(),
            tags: vec![feature.category.clone()],
        }
    }
}

/// Heuristic effort by how far from done the gap is.
fn effort_for_status(status: crate::types::GapStatus) -> EffortEstimate {
    use crate::types::GapStatus;
    let hours = match status {
        GapStatus::Complete => 2.0,
        GapStatus::Partial => 8.0,
        GapStatus::Stub => 16.0,
        GapStatus::Missing => 24.0,
    };
    EffortEstimate::heuristic(hours)
}

// ---------------------------------------------------------------------------
// ScoredFeature
// ---------------------------------------------------------------------------

/// Per-sub-score contributing reasons. Recording these is a hard requirement:
/// downstream consumers must be able to justify any P0 assignment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringDetails {
    pub impact_factors: Vec<String>,
    pub effort_factors: Vec<String>,
    pub strategic_factors: Vec<String>,
    pub risk_factors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredFeature {
    pub candidate: RoadmapCandidate,
    pub impact: f64,
    pub effort: f64,
    pub strategic_value: f64,
    pub risk: f64,
    pub roi: f64,
    pub priority_score: f64,
    pub priority: Priority,
    pub scoring_details: ScoringDetails,
}

// ---------------------------------------------------------------------------
// ScoringEngine
// ---------------------------------------------------------------------------

const EFFORT_EPSILON: f64 = 0.1;

/// Impact-to-effort ratio. Zero effort is treated as a small epsilon, not a
/// division error.
pub fn calculate_roi(impact: f64, effort: f64) -> f64 {
    impact / effort.max(EFFORT_EPSILON)
}

fn clamp_score(value: f64) -> f64 {
    value.clamp(1.0, 10.0)
}

pub struct ScoringEngine {
    policy: ScoringPolicy,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(ScoringPolicy::default())
    }
}

impl ScoringEngine {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Score every candidate and return them sorted by priority score,
    /// descending. Ties keep insertion order (stable sort) so output is
    /// reproducible run to run.
    pub fn score_features(
        &self,
        candidates: &[RoadmapCandidate],
        context: &ProjectContext,
    ) -> Vec<ScoredFeature> {
        let mut scored: Vec<ScoredFeature> = candidates
            .iter()
            .map(|c| self.score_one(c, context))
            .collect();
        scored.sort_by(|a, b| {
            b.priority_score
                .partial_cmp(&a.priority_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored
    }

    fn score_one(&self, candidate: &RoadmapCandidate, context: &ProjectContext) -> ScoredFeature {
        let mut details = ScoringDetails::default();
        let text = format!("{} {}", candidate.title, candidate.description).to_lowercase();

        let impact = self.impact_score(candidate, &text, &mut details);
        let effort = self.effort_score(candidate, &text, context, &mut details);
        let strategic_value = self.strategic_score(candidate, &text, &mut details);
        let risk = self.risk_score(&text, &mut details);

        let w = &self.policy.weights;
        let priority_score = w.impact * impact
            + w.effort * (11.0 - effort)
            + w.strategic_value * strategic_value
            + w.risk * (11.0 - risk);

        ScoredFeature {
            candidate: candidate.clone(),
            impact,
            effort,
            strategic_value,
            risk,
            roi: calculate_roi(impact, effort),
            priority_score,
            priority: self.policy.priority_for(priority_score),
            scoring_details: details,
        }
    }

    fn impact_score(
        &self,
        candidate: &RoadmapCandidate,
        text: &str,
        details: &mut ScoringDetails,
    ) -> f64 {
        let mut score = if candidate.category.contains("core") {
            details
                .impact_factors
                .push(format!("core category '{}': base 7", candidate.category));
            7.0
        } else if candidate.item_type == ItemType::Gap {
            details
                .impact_factors
                .push("documented-but-unimplemented gap: base 6".to_string());
            6.0
        } else {
            details.impact_factors.push("base 5".to_string());
            5.0
        };

        for (keyword, boost) in &self.policy.impact_keywords {
            if text.contains(keyword.as_str()) {
                score += boost;
                details
                    .impact_factors
                    .push(format!("keyword '{keyword}': +{boost}"));
            }
        }

        let alignment_term = (candidate.strategic_alignment as f64 - 5.0) * 0.3;
        if alignment_term != 0.0 {
            score += alignment_term;
            details.impact_factors.push(format!(
                "strategic alignment {}: {alignment_term:+.1}",
                candidate.strategic_alignment
            ));
        }

        clamp_score(score)
    }

    fn effort_score(
        &self,
        candidate: &RoadmapCandidate,
        text: &str,
        context: &ProjectContext,
        details: &mut ScoringDetails,
    ) -> f64 {
        let mut score = match candidate.effort.hours {
            h if h >= 40.0 => {
                details
                    .effort_factors
                    .push(format!("{h}h estimate: base 8"));
                8.0
            }
            h if h >= 16.0 => {
                details
                    .effort_factors
                    .push(format!("{h}h estimate: base 6"));
                6.0
            }
            h if h >= 4.0 => {
                details
                    .effort_factors
                    .push(format!("{h}h estimate: base 4"));
                4.0
            }
            h => {
                details
                    .effort_factors
                    .push(format!("{h}h estimate: base 2"));
                2.0
            }
        };

        for (keyword, boost) in &self.policy.complexity_keywords {
            if contains_word(text, keyword) {
                score += boost;
                details
                    .effort_factors
                    .push(format!("complexity keyword '{keyword}': +{boost}"));
            }
        }
        for (keyword, discount) in &self.policy.simplicity_keywords {
            if contains_word(text, keyword) {
                score += discount;
                details
                    .effort_factors
                    .push(format!("simplicity keyword '{keyword}': {discount}"));
            }
        }

        // Familiarity: work inside the existing stack is cheaper than work
        // that drags in new technology.
        let mut stack: Vec<&str> = context.frameworks.iter().map(|f| f.as_str()).collect();
        if !context.language.is_empty() {
            stack.push(context.language.as_str());
        }
        let familiar = stack
            .iter()
            .find(|tech| contains_word(text, &tech.to_lowercase()));
        if let Some(tech) = familiar {
            score -= 1.5;
            details
                .effort_factors
                .push(format!("familiar technology '{tech}': -1.5"));
        } else if !stack.is_empty() {
            score += 1.0;
            details
                .effort_factors
                .push("technology outside current stack: +1".to_string());
        }

        clamp_score(score)
    }

    fn strategic_score(
        &self,
        candidate: &RoadmapCandidate,
        text: &str,
        details: &mut ScoringDetails,
    ) -> f64 {
        let mut score = 4.0 + (candidate.strategic_alignment as f64 - 5.0) * 0.5;
        details.strategic_factors.push(format!(
            "alignment {}: base {score:.1}",
            candidate.strategic_alignment
        ));

        for (keyword, boost) in &self.policy.strategic_keywords {
            if contains_word(text, keyword) {
                score += boost;
                details
                    .strategic_factors
                    .push(format!("keyword '{keyword}': +{boost}"));
            }
        }

        clamp_score(score)
    }

    fn risk_score(&self, text: &str, details: &mut ScoringDetails) -> f64 {
        let mut score = 3.0;
        details.risk_factors.push("base 3".to_string());

        for (keyword, boost) in &self.policy.risk_keywords {
            if contains_word(text, keyword) {
                score += boost;
                details
                    .risk_factors
                    .push(format!("keyword '{keyword}': +{boost}"));
            }
        }

        clamp_score(score)
    }
}

/// Word-boundary containment, so "ai" doesn't fire inside "maintain".
fn contains_word(text: &str, keyword: &str) -> bool {
    if keyword.contains(' ') || keyword.contains('-') {
        return text.contains(keyword);
    }
    text.split(|c: char| !c.is_alphanumeric())
        .any(|w| w == keyword)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GapStatus;

    fn candidate(id: &str, title: &str, description: &str) -> RoadmapCandidate {
        RoadmapCandidate {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            item_type: ItemType::Feature,
            category: "general".to_string(),
            strategic_alignment: 5,
            effort: EffortEstimate::heuristic(8.0),
            dependencies: Vec::new(),
            tags: Vec::new(),
        }
    }

    fn context() -> ProjectContext {
        ProjectContext {
            name: "demo".to_string(),
            language: "rust".to_string(),
            frameworks: vec!["axum".to_string()],
        }
    }

    #[test]
    fn roi_basic_and_epsilon_guard() {
        assert_eq!(calculate_roi(8.0, 4.0), 2.0);
        let roi = calculate_roi(5.0, 0.0);
        assert!(roi.is_finite());
        assert_eq!(roi, 50.0);
    }

    #[test]
    fn sub_scores_stay_in_bounds() {
        let engine = ScoringEngine::default();
        let loaded = candidate(
            "a",
            "Breaking security migration with payment schema changes",
            "experimental distributed machine learning vulnerability crash data loss",
        );
        let scored = engine.score_features(&[loaded], &context());
        let s = &scored[0];
        for v in [s.impact, s.effort, s.strategic_value, s.risk] {
            assert!((1.0..=10.0).contains(&v), "sub-score out of bounds: {v}");
        }
    }

    #[test]
    fn security_outranks_trivial_cleanup() {
        let engine = ScoringEngine::default();
        let security = candidate(
            "sec",
            "Fix authentication vulnerability",
            "security issue can cause data loss",
        );
        let cleanup = candidate("clean", "Rename internal helper", "simple rename, basic cleanup");
        let scored = engine.score_features(&[cleanup, security], &context());
        assert_eq!(scored[0].candidate.id, "sec");
        assert!(scored[0].priority_score > scored[1].priority_score);
    }

    #[test]
    fn ties_preserve_insertion_order() {
        let engine = ScoringEngine::default();
        let a = candidate("first", "Improve docs", "plain work");
        let b = candidate("second", "Improve docs", "plain work");
        let scored = engine.score_features(&[a, b], &context());
        assert_eq!(scored[0].priority_score, scored[1].priority_score);
        assert_eq!(scored[0].candidate.id, "first");
        assert_eq!(scored[1].candidate.id, "second");
    }

    #[test]
    fn factor_strings_recorded_for_keyword_hits() {
        let engine = ScoringEngine::default();
        let item = candidate(
            "a",
            "Cloud sync with AI assist",
            "breaking change to the schema",
        );
        let scored = engine.score_features(&[item], &context());
        let details = &scored[0].scoring_details;
        assert!(details
            .strategic_factors
            .iter()
            .any(|f| f.contains("'cloud'")));
        assert!(details.strategic_factors.iter().any(|f| f.contains("'ai'")));
        assert!(details.risk_factors.iter().any(|f| f.contains("'breaking'")));
        assert!(details.risk_factors.iter().any(|f| f.contains("'schema'")));
        assert!(!details.impact_factors.is_empty());
        assert!(!details.effort_factors.is_empty());
    }

    #[test]
    fn familiar_technology_discounts_effort() {
        let engine = ScoringEngine::default();
        let familiar = candidate("f", "Add rust module for parsing", "new rust code");
        let unfamiliar = candidate(
            "u",
            "Add distributed consensus layer",
            "distributed erlang cluster",
        );
        let scored = engine.score_features(&[familiar, unfamiliar], &context());
        let f = scored.iter().find(|s| s.candidate.id == "f").unwrap();
        let u = scored.iter().find(|s| s.candidate.id == "u").unwrap();
        assert!(f.effort < u.effort);
        assert!(f
            .scoring_details
            .effort_factors
            .iter()
            .any(|x| x.contains("familiar technology")));
    }

    #[test]
    fn unfamiliar_technology_raises_effort_without_complexity_keywords() {
        let engine = ScoringEngine::default();
        let inside = candidate("in", "Tidy up the rust parser", "small rust change");
        let outside = candidate("out", "Tidy up the kotlin parser", "small kotlin change");
        let scored = engine.score_features(&[inside, outside], &context());
        let i = scored.iter().find(|s| s.candidate.id == "in").unwrap();
        let o = scored.iter().find(|s| s.candidate.id == "out").unwrap();
        assert!(o.effort > i.effort);
        assert!(o
            .scoring_details
            .effort_factors
            .iter()
            .any(|x| x.contains("outside current stack")));
    }

    #[test]
    fn empty_stack_is_effort_neutral() {
        let engine = ScoringEngine::default();
        let item = candidate("a", "Plain work item", "nothing special");
        let scored = engine.score_features(&[item], &ProjectContext::default());
        assert!(!scored[0]
            .scoring_details
            .effort_factors
            .iter()
            .any(|x| x.contains("outside current stack")));
    }

    #[test]
    fn word_boundary_matching() {
        assert!(contains_word("uses ai models", "ai"));
        assert!(!contains_word("needs maintainance work", "ai"));
        assert!(contains_word("data loss on restart", "data loss"));
    }

    #[test]
    fn priority_thresholds() {
        let policy = ScoringPolicy::default();
        assert_eq!(policy.priority_for(9.0), Priority::P0);
        assert_eq!(policy.priority_for(7.75), Priority::P0);
        assert_eq!(policy.priority_for(6.0), Priority::P1);
        assert_eq!(policy.priority_for(4.0), Priority::P2);
        assert_eq!(policy.priority_for(2.0), Priority::P3);
    }

    #[test]
    fn custom_weights_change_composite() {
        let mut policy = ScoringPolicy::default();
        policy.weights = ScoringWeights {
            impact: 1.0,
            effort: 0.0,
            strategic_value: 0.0,
            risk: 0.0,
        };
        let engine = ScoringEngine::new(policy);
        let item = candidate("a", "Plain work item", "nothing special");
        let scored = engine.score_features(&[item], &context());
        assert!((scored[0].priority_score - scored[0].impact).abs() < 1e-9);
    }

    #[test]
    fn gap_conversion_carries_status_effort() {
        let gap = SpecGap {
            id: "gap-1".to_string(),
            requirement: "must support exports".to_string(),
            source: "spec.md:3".to_string(),
            status: GapStatus::Missing,
            confidence_score: 20,
            evidence: Vec::new(),
            recommendation: crate::types::Recommendation::ImplementFeature,
        };
        let candidate = RoadmapCandidate::from(&gap);
        assert_eq!(candidate.item_type, ItemType::Gap);
        assert_eq!(candidate.effort.hours, 24.0);
    }
}
