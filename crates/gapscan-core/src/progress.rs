use crate::error::Result;
use crate::io::atomic_write;
use crate::roadmap::Roadmap;
use crate::types::ItemStatus;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

// ---------------------------------------------------------------------------
// VelocityConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VelocityConfig {
    /// How many trailing snapshots feed the velocity average.
    #[serde(default = "default_window")]
    pub window: usize,
    /// Nominal days between snapshots, used to scale deltas to per-week.
    #[serde(default = "default_days_per_snapshot")]
    pub days_per_snapshot: f64,
    /// Weekly team hours assumed when there is no velocity history yet.
    #[serde(default = "default_fallback_team_hours")]
    pub fallback_team_hours: f64,
}

fn default_window() -> usize {
    4
}

fn default_days_per_snapshot() -> f64 {
    7.0
}

fn default_fallback_team_hours() -> f64 {
    35.0
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            days_per_snapshot: default_days_per_snapshot(),
            fallback_team_hours: default_fallback_team_hours(),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots and progress
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub timestamp: DateTime<Utc>,
    pub items_complete: usize,
    pub items_total: usize,
    pub percent_complete: f64,
}

/// Sidecar file contents. History is append-only: `update_progress` never
/// rewrites past snapshots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressHistory {
    #[serde(default)]
    pub snapshots: Vec<ProgressSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapProgress {
    pub timestamp: DateTime<Utc>,
    pub items_complete: usize,
    pub items_total: usize,
    pub percent_complete: f64,
    /// Items per week, averaged over the trailing snapshot window.
    pub velocity: f64,
    pub estimated_completion: DateTime<Utc>,
    /// The roadmap the counters were derived from, so consumers get a
    /// self-contained report.
    pub roadmap: Roadmap,
    pub history: Vec<ProgressSnapshot>,
}

// ---------------------------------------------------------------------------
// Deltas
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemChange {
    pub id: String,
    pub changes: Vec<String>,
}

/// Differences between two roadmap versions. `completed` and `regressions`
/// are mutually exclusive by construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoadmapDelta {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub completed: Vec<String>,
    pub regressions: Vec<String>,
    pub modified: Vec<ItemChange>,
}

impl RoadmapDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.completed.is_empty()
            && self.regressions.is_empty()
            && self.modified.is_empty()
    }
}

// ---------------------------------------------------------------------------
// ProgressTracker
// ---------------------------------------------------------------------------

/// Single-writer tracker over a roadmap's `.progress.json` sidecar. The
/// sidecar lives next to the roadmap file and is written atomically.
pub struct ProgressTracker {
    config: VelocityConfig,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(VelocityConfig::default())
    }
}

impl ProgressTracker {
    pub fn new(config: VelocityConfig) -> Self {
        Self { config }
    }

    /// `roadmap.json` -> `roadmap.progress.json`, same directory.
    pub fn sidecar_path(roadmap_path: &Path) -> PathBuf {
        let stem = roadmap_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("roadmap");
        roadmap_path.with_file_name(format!("{stem}.progress.json"))
    }

    /// Absent sidecar means no history yet, not an error.
    pub fn load_history(&self, roadmap_path: &Path) -> Result<ProgressHistory> {
        let path = Self::sidecar_path(roadmap_path);
        if !path.exists() {
            debug!(path = %path.display(), "no progress sidecar yet");
            return Ok(ProgressHistory::default());
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save_history(&self, roadmap_path: &Path, history: &ProgressHistory) -> Result<()> {
        let path = Self::sidecar_path(roadmap_path);
        let content = serde_json::to_string_pretty(history)?;
        atomic_write(&path, content.as_bytes())
    }

    /// Record the roadmap's current state as a new snapshot and return the
    /// derived progress view.
    pub fn update_progress(&self, roadmap: &Roadmap, roadmap_path: &Path) -> Result<RoadmapProgress> {
        let mut history = self.load_history(roadmap_path)?;

        let items_total = roadmap.all_items.len();
        let items_complete = roadmap
            .all_items
            .iter()
            .filter(|i| i.status == ItemStatus::Completed)
            .count();
        let percent_complete = if items_total == 0 {
            100.0
        } else {
            ((items_complete as f64 / items_total as f64) * 100.0).round()
        };

        let now = Utc::now();
        history.snapshots.push(ProgressSnapshot {
            timestamp: now,
            items_complete,
            items_total,
            percent_complete,
        });
        self.save_history(roadmap_path, &history)?;

        let velocity = self.calculate_velocity(&history.snapshots);
        let remaining_hours: f64 = roadmap
            .all_items
            .iter()
            .filter(|i| i.status != ItemStatus::Completed)
            .map(|i| i.effort.hours)
            .sum();
        let estimated_completion =
            self.estimate_completion(items_total - items_complete, remaining_hours, velocity, now);

        Ok(RoadmapProgress {
            timestamp: now,
            items_complete,
            items_total,
            percent_complete,
            velocity,
            estimated_completion,
            roadmap: roadmap.clone(),
            history: history.snapshots,
        })
    }

    /// Items completed per week, averaged over consecutive deltas in the
    /// trailing window. Fewer than two snapshots yields 0.
    pub fn calculate_velocity(&self, snapshots: &[ProgressSnapshot]) -> f64 {
        if snapshots.len() < 2 {
            return 0.0;
        }
        let window = self.config.window.max(2);
        let recent = if snapshots.len() > window {
            &snapshots[snapshots.len() - window..]
        } else {
            snapshots
        };

        let mut total_delta = 0.0;
        for pair in recent.windows(2) {
            total_delta += pair[1].items_complete as f64 - pair[0].items_complete as f64;
        }
        let per_snapshot = total_delta / (recent.len() - 1) as f64;
        let per_week = per_snapshot * (7.0 / self.config.days_per_snapshot.max(1.0));
        per_week.max(0.0)
    }

    /// Dual-mode estimate: observed velocity when we have it, effort-hours
    /// over assumed team capacity when we do not.
    pub fn estimate_completion(
        &self,
        remaining_items: usize,
        remaining_hours: f64,
        velocity: f64,
        from: DateTime<Utc>,
    ) -> DateTime<Utc> {
        if remaining_items == 0 {
            return from;
        }
        let weeks = if velocity <= 0.0 {
            (remaining_hours / self.config.fallback_team_hours.max(1.0)).ceil()
        } else {
            (remaining_items as f64 / velocity).ceil()
        };
        from + Duration::days((weeks.max(1.0) as i64) * 7)
    }

    /// Compare two roadmap versions item by item.
    pub fn calculate_delta(&self, old: &Roadmap, new: &Roadmap) -> RoadmapDelta {
        let old_items: HashMap<&str, &crate::roadmap::RoadmapItem> = old
            .all_items
            .iter()
            .map(|i| (i.id.as_str(), i))
            .collect();
        let new_items: HashMap<&str, &crate::roadmap::RoadmapItem> = new
            .all_items
            .iter()
            .map(|i| (i.id.as_str(), i))
            .collect();

        let mut delta = RoadmapDelta::default();

        for item in &new.all_items {
            let Some(previous) = old_items.get(item.id.as_str()) else {
                delta.added.push(item.id.clone());
                continue;
            };

            match (previous.status, item.status) {
                (ItemStatus::Pending, ItemStatus::Completed) => {
                    delta.completed.push(item.id.clone())
                }
                (ItemStatus::Completed, ItemStatus::Pending) => {
                    delta.regressions.push(item.id.clone())
                }
                _ => {}
            }

            let mut changes = Vec::new();
            if previous.title != item.title {
                changes.push(format!("title: '{}' -> '{}'", previous.title, item.title));
            }
            if previous.priority != item.priority {
                changes.push(format!(
                    "priority: {} -> {}",
                    previous.priority, item.priority
                ));
            }
            if previous.phase != item.phase {
                changes.push(format!("phase: {} -> {}", previous.phase, item.phase));
            }
            if previous.effort.hours != item.effort.hours {
                changes.push(format!(
                    "effort: {}h -> {}h",
                    previous.effort.hours, item.effort.hours
                ));
            }
            if !changes.is_empty() {
                delta.modified.push(ItemChange {
                    id: item.id.clone(),
                    changes,
                });
            }
        }

        for item in &old.all_items {
            if !new_items.contains_key(item.id.as_str()) {
                delta.removed.push(item.id.clone());
            }
        }

        delta
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
