use crate::config::ProjectContext;
use crate::error::{GapscanError, Result};
use crate::gap::{DesirableFeature, FeatureGap, SpecGap};
use crate::prioritizer::{detect_circular_dependencies, resolve_dependencies};
use crate::scoring::{RoadmapCandidate, ScoredFeature, ScoringEngine};
use crate::types::{EffortEstimate, ItemStatus, ItemType, Priority};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

// ---------------------------------------------------------------------------
// PhasingStrategy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhasingStrategy {
    /// Bucket strictly by priority (P0 -> phase 1), dependency-constrained.
    Priority,
    /// Phase = 1 + max phase of dependencies.
    Dependency,
    /// Greedily fill phases up to an effort-hours budget.
    Timeline,
}

impl PhasingStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            PhasingStrategy::Priority => "priority",
            PhasingStrategy::Dependency => "dependency",
            PhasingStrategy::Timeline => "timeline",
        }
    }
}

impl fmt::Display for PhasingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PhasingStrategy {
    type Err = GapscanError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "priority" => Ok(PhasingStrategy::Priority),
            "dependency" => Ok(PhasingStrategy::Dependency),
            "timeline" => Ok(PhasingStrategy::Timeline),
            _ => Err(GapscanError::InvalidStrategy(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// RoadmapConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapConfig {
    #[serde(default = "default_strategy")]
    pub strategy: PhasingStrategy,
    #[serde(default = "default_team_size")]
    pub team_size: usize,
    #[serde(default = "default_weekly_hours")]
    pub weekly_hours_per_dev: f64,
    #[serde(default = "default_weeks_per_phase")]
    pub weeks_per_phase: f64,
}

fn default_strategy() -> PhasingStrategy {
    PhasingStrategy::Priority
}

fn default_team_size() -> usize {
    2
}

fn default_weekly_hours() -> f64 {
    35.0
}

fn default_weeks_per_phase() -> f64 {
    2.0
}

impl Default for RoadmapConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            team_size: default_team_size(),
            weekly_hours_per_dev: default_weekly_hours(),
            weeks_per_phase: default_weeks_per_phase(),
        }
    }
}

impl RoadmapConfig {
    fn weekly_capacity(&self) -> f64 {
        (self.team_size.max(1) as f64) * self.weekly_hours_per_dev.max(1.0)
    }

    fn phase_budget_hours(&self) -> f64 {
        self.weekly_capacity() * self.weeks_per_phase.max(0.5)
    }
}

// ---------------------------------------------------------------------------
// Roadmap data model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapItem {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub priority: Priority,
    /// 1-based; assigned only after dependency resolution.
    pub phase: usize,
    pub effort: EffortEstimate,
    #[serde(default)]
    pub dependencies: Vec<String>,
    pub status: ItemStatus,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl RoadmapItem {
    fn from_scored(scored: &ScoredFeature, phase: usize) -> Self {
        Self {
            id: scored.candidate.id.clone(),
            title: scored.candidate.title.clone(),
            item_type: scored.candidate.item_type,
            priority: scored.priority,
            phase,
            effort: scored.candidate.effort.clone(),
            dependencies: scored.candidate.dependencies.clone(),
            status: ItemStatus::Pending,
            tags: scored.candidate.tags.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phase {
    pub number: usize,
    pub items: Vec<RoadmapItem>,
    pub estimated_weeks: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapMetadata {
    pub project: String,
    pub generated_at: DateTime<Utc>,
    pub strategy: PhasingStrategy,
    #[serde(default)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roadmap {
    pub metadata: RoadmapMetadata,
    pub phases: Vec<Phase>,
    /// Flattened, deduplicated union of all phase items; each item appears in
    /// exactly one phase.
    pub all_items: Vec<RoadmapItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    pub total_hours: f64,
    pub total_weeks: u32,
    /// `(phase number, weeks)` per phase.
    pub phase_weeks: Vec<(usize, u32)>,
}

// ---------------------------------------------------------------------------
// RoadmapGenerator
// ---------------------------------------------------------------------------

pub struct RoadmapGenerator {
    config: RoadmapConfig,
    engine: ScoringEngine,
}

impl RoadmapGenerator {
    pub fn new(config: RoadmapConfig, engine: ScoringEngine) -> Self {
        Self { config, engine }
    }

    /// Full pipeline: score, order by dependencies, detect cycles, bucket
    /// into phases.
    pub fn generate_roadmap(
        &self,
        spec_gaps: &[SpecGap],
        feature_gaps: &[FeatureGap],
        features: &[DesirableFeature],
        context: &ProjectContext,
    ) -> Roadmap {
        let mut candidates: Vec<RoadmapCandidate> = Vec::new();
        candidates.extend(spec_gaps.iter().map(RoadmapCandidate::from));
        candidates.extend(feature_gaps.iter().map(RoadmapCandidate::from));
        candidates.extend(features.iter().map(RoadmapCandidate::from));

        let scored = self.engine.score_features(&candidates, context);
        let ordered = resolve_dependencies(&scored);

        let mut warnings = Vec::new();
        for cycle in detect_circular_dependencies(&ordered) {
            let chain = cycle.join(" -> ");
            warn!(cycle = %chain, "circular dependency in roadmap items");
            warnings.push(format!("circular dependency: {chain}"));
        }

        let phases = self.create_phases(&ordered);
        let all_items = flatten_items(&phases);

        Roadmap {
            metadata: RoadmapMetadata {
                project: context.name.clone(),
                generated_at: Utc::now(),
                strategy: self.config.strategy,
                warnings,
            },
            phases,
            all_items,
        }
    }

    /// Bucket dependency-ordered items into phases per the configured
    /// strategy. Items that would land before a dependency are bumped
    /// forward, never silently misplaced.
    pub fn create_phases(&self, ordered: &[ScoredFeature]) -> Vec<Phase> {
        let mut phase_of: HashMap<&str, usize> = HashMap::new();
        let mut assignments: Vec<(usize, &ScoredFeature)> = Vec::new();

        let budget = self.config.phase_budget_hours();
        let mut timeline_phase = 1usize;
        let mut timeline_used = 0.0f64;

        for item in ordered {
            let dep_floor = item
                .candidate
                .dependencies
                .iter()
                .filter_map(|d| phase_of.get(d.as_str()).copied())
                .max();

            let phase = match self.config.strategy {
                PhasingStrategy::Priority => {
                    let wanted = item.priority.phase_number();
                    // Bump forward past any dependency placed later.
                    wanted.max(dep_floor.unwrap_or(1))
                }
                PhasingStrategy::Dependency => dep_floor.map(|p| p + 1).unwrap_or(1),
                PhasingStrategy::Timeline => {
                    let hours = item.candidate.effort.hours;
                    if timeline_used > 0.0 && timeline_used + hours > budget {
                        timeline_phase += 1;
                        timeline_used = 0.0;
                    }
                    timeline_used += hours;
                    // Dependencies were placed in earlier or equal phases by
                    // construction; keep the floor anyway for cycle stragglers.
                    let phase = timeline_phase.max(dep_floor.unwrap_or(1));
                    if phase > timeline_phase {
                        timeline_phase = phase;
                        timeline_used = hours;
                    }
                    phase
                }
            };

            phase_of.insert(item.candidate.id.as_str(), phase);
            assignments.push((phase, item));
        }

        let max_phase = assignments.iter().map(|(p, _)| *p).max().unwrap_or(0);
        let mut phases = Vec::new();
        for number in 1..=max_phase {
            let items: Vec<RoadmapItem> = assignments
                .iter()
                .filter(|(p, _)| *p == number)
                .map(|(p, s)| RoadmapItem::from_scored(s, *p))
                .collect();
            if items.is_empty() {
                continue;
            }
            let hours: f64 = items.iter().map(|i| i.effort.hours).sum();
            let estimated_weeks = (hours / self.config.weekly_capacity()).ceil().max(1.0) as u32;
            phases.push(Phase {
                number,
                items,
                estimated_weeks,
            });
        }
        phases
    }

    /// Re-estimate a roadmap's timeline for a different team size.
    pub fn estimate_timeline(&self, roadmap: &Roadmap, team_size: usize) -> Timeline {
        let capacity = (team_size.max(1) as f64) * self.config.weekly_hours_per_dev.max(1.0);
        let mut phase_weeks = Vec::new();
        let mut total_weeks = 0u32;
        let mut total_hours = 0.0f64;

        for phase in &roadmap.phases {
            let hours: f64 = phase.items.iter().map(|i| i.effort.hours).sum();
            let weeks = (hours / capacity).ceil().max(1.0) as u32;
            total_hours += hours;
            total_weeks += weeks;
            phase_weeks.push((phase.number, weeks));
        }

        Timeline {
            total_hours,
            total_weeks,
            phase_weeks,
        }
    }
}

fn flatten_items(phases: &[Phase]) -> Vec<RoadmapItem> {
    let mut seen = std::collections::HashSet::new();
    let mut items = Vec::new();
    for phase in phases {
        for item in &phase.items {
            if seen.insert(item.id.clone()) {
                items.push(item.clone());
            }
        }
    }
    items
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoringPolicy;

    fn scored(id: &str, deps: &[&str], priority: Priority, hours: f64) -> ScoredFeature {
        ScoredFeature {
            candidate: RoadmapCandidate {
                id: id.to_string(),
                title: id.to_string(),
                description: String::new(),
                item_type: ItemType::Feature,
                category: "general".to_string(),
                strategic_alignment: 5,
                effort: EffortEstimate::heuristic(hours),
                dependencies: deps.iter().map(|d| d.to_string()).collect(),
                tags: Vec::new(),
            },
            impact: 5.0,
            effort: 5.0,
            strategic_value: 5.0,
            risk: 3.0,
            roi: 1.0,
            priority_score: 5.0,
            priority,
            scoring_details: Default::default(),
        }
    }

    fn generator(strategy: PhasingStrategy) -> RoadmapGenerator {
        let config = RoadmapConfig {
            strategy,
            ..RoadmapConfig::default()
        };
        RoadmapGenerator::new(config, ScoringEngine::new(ScoringPolicy::default()))
    }

    #[test]
    fn priority_strategy_buckets_by_priority() {
        let items = vec![
            scored("a", &[], Priority::P0, 8.0),
            scored("b", &[], Priority::P1, 8.0),
            scored("c", &[], Priority::P2, 8.0),
        ];
        let phases = generator(PhasingStrategy::Priority).create_phases(&items);
        assert_eq!(phases.len(), 3);
        assert_eq!(phases[0].items[0].id, "a");
        assert_eq!(phases[1].items[0].id, "b");
        assert_eq!(phases[2].items[0].id, "c");
    }

    #[test]
    fn priority_strategy_bumps_past_dependency() {
        // P0 item depends on a P2 item: it must be bumped to the dep's phase.
        let items = vec![
            scored("base", &[], Priority::P2, 8.0),
            scored("urgent", &["base"], Priority::P0, 8.0),
        ];
        let phases = generator(PhasingStrategy::Priority).create_phases(&items);
        let urgent = phases
            .iter()
            .flat_map(|p| &p.items)
            .find(|i| i.id == "urgent")
            .unwrap();
        let base = phases
            .iter()
            .flat_map(|p| &p.items)
            .find(|i| i.id == "base")
            .unwrap();
        assert!(urgent.phase >= base.phase);
        assert_eq!(base.phase, 3);
    }

    #[test]
    fn dependency_strategy_chains_phases() {
        let items = vec![
            scored("x", &[], Priority::P1, 8.0),
            scored("y", &["x"], Priority::P1, 8.0),
            scored("z", &["y"], Priority::P1, 8.0),
        ];
        let phases = generator(PhasingStrategy::Dependency).create_phases(&items);
        let phase_of = |id: &str| {
            phases
                .iter()
                .flat_map(|p| &p.items)
                .find(|i| i.id == id)
                .unwrap()
                .phase
        };
        assert_eq!(phase_of("x"), 1);
        assert_eq!(phase_of("y"), 2);
        assert_eq!(phase_of("z"), 3);
    }

    #[test]
    fn dependency_strategy_independent_items_share_phase_one() {
        let items = vec![
            scored("x", &[], Priority::P0, 8.0),
            scored("y", &[], Priority::P3, 8.0),
        ];
        let phases = generator(PhasingStrategy::Dependency).create_phases(&items);
        assert_eq!(phases.len(), 1);
        assert_eq!(phases[0].items.len(), 2);
    }

    #[test]
    fn timeline_strategy_respects_budget() {
        // Budget: 2 devs * 35h * 2 weeks = 140h per phase.
        let items = vec![
            scored("a", &[], Priority::P1, 100.0),
            scored("b", &[], Priority::P1, 100.0),
            scored("c", &[], Priority::P1, 30.0),
        ];
        let phases = generator(PhasingStrategy::Timeline).create_phases(&items);
        let phase_of = |id: &str| {
            phases
                .iter()
                .flat_map(|p| &p.items)
                .find(|i| i.id == id)
                .unwrap()
                .phase
        };
        assert_eq!(phase_of("a"), 1);
        assert_eq!(phase_of("b"), 2);
        assert_eq!(phase_of("c"), 2);
    }

    #[test]
    fn estimated_weeks_rounds_up() {
        // 2 devs * 35h = 70h/week; 71h -> 2 weeks.
        let items = vec![scored("a", &[], Priority::P0, 71.0)];
        let phases = generator(PhasingStrategy::Priority).create_phases(&items);
        assert_eq!(phases[0].estimated_weeks, 2);
    }

    #[test]
    fn generate_roadmap_dependency_scenario() {
        let features = vec![
            DesirableFeature {
                id: "X".to_string(),
                category: "core".to_string(),
                title: "Foundation".to_string(),
                description: "base layer".to_string(),
                effort: EffortEstimate::heuristic(8.0),
                strategic_alignment: 5,
                dependencies: vec![],
            },
            DesirableFeature {
                id: "Y".to_string(),
                category: "core".to_string(),
                title: "Built on top".to_string(),
                description: "depends on foundation".to_string(),
                effort: EffortEstimate::heuristic(8.0),
                strategic_alignment: 5,
                dependencies: vec!["X".to_string()],
            },
        ];
        let generator = generator(PhasingStrategy::Dependency);
        let roadmap = generator.generate_roadmap(&[], &[], &features, &ProjectContext::default());

        let x = roadmap.all_items.iter().find(|i| i.id == "X").unwrap();
        let y = roadmap.all_items.iter().find(|i| i.id == "Y").unwrap();
        assert_eq!(x.phase, 1);
        assert!(y.phase >= 2);
        assert!(roadmap.metadata.warnings.is_empty());
    }

    #[test]
    fn generate_roadmap_reports_cycles() {
        let features = vec![
            DesirableFeature {
                id: "a".to_string(),
                category: "core".to_string(),
                title: "A".to_string(),
                description: String::new(),
                effort: EffortEstimate::heuristic(8.0),
                strategic_alignment: 5,
                dependencies: vec!["b".to_string()],
            },
            DesirableFeature {
                id: "b".to_string(),
                category: "core".to_string(),
                title: "B".to_string(),
                description: String::new(),
                effort: EffortEstimate::heuristic(8.0),
                strategic_alignment: 5,
                dependencies: vec!["a".to_string()],
            },
        ];
        let generator = generator(PhasingStrategy::Dependency);
        let roadmap = generator.generate_roadmap(&[], &[], &features, &ProjectContext::default());
        assert_eq!(roadmap.metadata.warnings.len(), 1);
        assert!(roadmap.metadata.warnings[0].contains("circular dependency"));
        // Cycle members are still scheduled.
        assert_eq!(roadmap.all_items.len(), 2);
    }

    #[test]
    fn all_items_union_is_deduplicated() {
        let items = vec![
            scored("a", &[], Priority::P0, 8.0),
            scored("b", &[], Priority::P1, 8.0),
        ];
        let generator = generator(PhasingStrategy::Priority);
        let phases = generator.create_phases(&items);
        let flat = flatten_items(&phases);
        assert_eq!(flat.len(), 2);
        let total: usize = phases.iter().map(|p| p.items.len()).sum();
        assert_eq!(total, flat.len());
    }

    #[test]
    fn estimate_timeline_scales_with_team() {
        let items = vec![scored("a", &[], Priority::P0, 140.0)];
        let generator = generator(PhasingStrategy::Priority);
        let phases = generator.create_phases(&items);
        let roadmap = Roadmap {
            metadata: RoadmapMetadata {
                project: "t".to_string(),
                generated_at: Utc::now(),
                strategy: PhasingStrategy::Priority,
                warnings: vec![],
            },
            all_items: flatten_items(&phases),
            phases,
        };
        let small = generator.estimate_timeline(&roadmap, 1);
        let large = generator.estimate_timeline(&roadmap, 4);
        assert!(small.total_weeks > large.total_weeks);
        assert_eq!(small.total_hours, 140.0);
    }

    #[test]
    fn strategy_parse_roundtrip() {
        use std::str::FromStr;
        for s in [
            PhasingStrategy::Priority,
            PhasingStrategy::Dependency,
            PhasingStrategy::Timeline,
        ] {
            assert_eq!(PhasingStrategy::from_str(s.as_str()).unwrap(), s);
        }
        assert!(PhasingStrategy::from_str("chaotic").is_err());
    }
}
