use crate::scoring::ScoredFeature;
use std::collections::{HashMap, HashSet};

// ---------------------------------------------------------------------------
// Dependency resolution
// ---------------------------------------------------------------------------

/// Order scored items so every item comes after its dependencies. Among
/// items whose dependencies are satisfied, higher priority score goes first;
/// ties keep input order. Dependencies on unknown ids are treated as already
/// satisfied. Items trapped in a cycle are appended at the end in input
/// order rather than dropped — the roadmap generator surfaces the cycle as a
/// warning.
pub fn resolve_dependencies(items: &[ScoredFeature]) -> Vec<ScoredFeature> {
    let known: HashSet<&str> = items.iter().map(|i| i.candidate.id.as_str()).collect();

    // Remaining unmet dependency count per item index.
    let mut pending: Vec<usize> = items
        .iter()
        .map(|i| {
            i.candidate
                .dependencies
                .iter()
                .filter(|d| known.contains(d.as_str()))
                .count()
        })
        .collect();

    // dependency id -> indexes of items waiting on it
    let mut waiters: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, item) in items.iter().enumerate() {
        for dep in &item.candidate.dependencies {
            if known.contains(dep.as_str()) {
                waiters.entry(dep.as_str()).or_default().push(idx);
            }
        }
    }

    let mut placed = vec![false; items.len()];
    let mut ordered = Vec::with_capacity(items.len());

    loop {
        // Highest priority score among ready items; stable on input index.
        let next = (0..items.len())
            .filter(|&i| !placed[i] && pending[i] == 0)
            .max_by(|&a, &b| {
                items[a]
                    .priority_score
                    .partial_cmp(&items[b].priority_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(b.cmp(&a))
            });
        let Some(idx) = next else { break };

        placed[idx] = true;
        let id = items[idx].candidate.id.as_str();
        if let Some(waiting) = waiters.get(id) {
            for &w in waiting {
                pending[w] = pending[w].saturating_sub(1);
            }
        }
        ordered.push(items[idx].clone());
    }

    // Anything left is on a cycle.
    for (idx, item) in items.iter().enumerate() {
        if !placed[idx] {
            ordered.push(item.clone());
        }
    }

    ordered
}

// ---------------------------------------------------------------------------
// Cycle detection
// ---------------------------------------------------------------------------

/// DFS over the dependency graph, returning each cycle as its full id chain.
/// Never fails: an acyclic graph yields an empty list.
pub fn detect_circular_dependencies(items: &[ScoredFeature]) -> Vec<Vec<String>> {
    let graph: HashMap<&str, Vec<&str>> = items
        .iter()
        .map(|i| {
            (
                i.candidate.id.as_str(),
                i.candidate
                    .dependencies
                    .iter()
                    .map(|d| d.as_str())
                    .collect(),
            )
        })
        .collect();

    let mut visited = HashSet::new();
    let mut cycles: Vec<Vec<String>> = Vec::new();
    let mut seen_cycles: HashSet<Vec<String>> = HashSet::new();

    for item in items {
        let node = item.candidate.id.as_str();
        if visited.contains(node) {
            continue;
        }
        let mut rec_stack = Vec::new();
        dfs_cycles(
            node,
            &graph,
            &mut visited,
            &mut rec_stack,
            &mut cycles,
            &mut seen_cycles,
        );
    }

    cycles
}

fn dfs_cycles<'a>(
    node: &'a str,
    graph: &HashMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<&'a str>,
    rec_stack: &mut Vec<&'a str>,
    cycles: &mut Vec<Vec<String>>,
    seen: &mut HashSet<Vec<String>>,
) {
    if let Some(pos) = rec_stack.iter().position(|&n| n == node) {
        // Back-edge: the chain from the first occurrence onward is the cycle.
        let chain: Vec<String> = rec_stack[pos..].iter().map(|s| s.to_string()).collect();
        let mut key = chain.clone();
        key.sort();
        if seen.insert(key) {
            cycles.push(chain);
        }
        return;
    }
    if visited.contains(node) {
        return;
    }

    rec_stack.push(node);
    if let Some(deps) = graph.get(node) {
        for dep in deps {
            if graph.contains_key(dep) {
                dfs_cycles(dep, graph, visited, rec_stack, cycles, seen);
            }
        }
    }
    rec_stack.pop();
    visited.insert(node);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::RoadmapCandidate;
    use crate::types::{EffortEstimate, ItemType, Priority};

    fn item(id: &str, deps: &[&str], score: f64) -> ScoredFeature {
        ScoredFeature {
            candidate: RoadmapCandidate {
                id: id.to_string(),
                title: id.to_string(),
                description: String::new(),
                item_type: ItemType::Feature,
                category: "general".to_string(),
                strategic_alignment: 5,
                effort: EffortEstimate::heuristic(8.0),
                dependencies: deps.iter().map(|d| d.to_string()).collect(),
                tags: Vec::new(),
            },
            impact: 5.0,
            effort: 5.0,
            strategic_value: 5.0,
            risk: 3.0,
            roi: 1.0,
            priority_score: score,
            priority: Priority::P2,
            scoring_details: Default::default(),
        }
    }

    fn ids(items: &[ScoredFeature]) -> Vec<&str> {
        items.iter().map(|i| i.candidate.id.as_str()).collect()
    }

    #[test]
    fn dependency_before_dependent() {
        let items = vec![item("y", &["x"], 9.0), item("x", &[], 1.0)];
        let ordered = resolve_dependencies(&items);
        assert_eq!(ids(&ordered), vec!["x", "y"]);
    }

    #[test]
    fn independent_items_by_priority_score() {
        let items = vec![item("low", &[], 2.0), item("high", &[], 8.0)];
        let ordered = resolve_dependencies(&items);
        assert_eq!(ids(&ordered), vec!["high", "low"]);
    }

    #[test]
    fn equal_scores_keep_input_order() {
        let items = vec![item("a", &[], 5.0), item("b", &[], 5.0), item("c", &[], 5.0)];
        let ordered = resolve_dependencies(&items);
        assert_eq!(ids(&ordered), vec!["a", "b", "c"]);
    }

    #[test]
    fn unknown_dependency_is_satisfied() {
        let items = vec![item("a", &["ghost"], 5.0)];
        let ordered = resolve_dependencies(&items);
        assert_eq!(ids(&ordered), vec!["a"]);
    }

    #[test]
    fn cycle_members_still_emitted() {
        let items = vec![
            item("a", &["b"], 5.0),
            item("b", &["a"], 5.0),
            item("free", &[], 1.0),
        ];
        let ordered = resolve_dependencies(&items);
        assert_eq!(ordered.len(), 3);
        assert_eq!(ordered[0].candidate.id, "free");
    }

    #[test]
    fn three_node_cycle_detected_with_full_chain() {
        let items = vec![
            item("a", &["c"], 5.0),
            item("b", &["a"], 5.0),
            item("c", &["b"], 5.0),
        ];
        let cycles = detect_circular_dependencies(&items);
        assert_eq!(cycles.len(), 1);
        let cycle = &cycles[0];
        assert_eq!(cycle.len(), 3);
        for id in ["a", "b", "c"] {
            assert!(cycle.contains(&id.to_string()));
        }
    }

    #[test]
    fn acyclic_graph_has_no_cycles() {
        let items = vec![
            item("a", &[], 5.0),
            item("b", &["a"], 5.0),
            item("c", &["a", "b"], 5.0),
        ];
        assert!(detect_circular_dependencies(&items).is_empty());
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let items = vec![item("a", &["a"], 5.0)];
        let cycles = detect_circular_dependencies(&items);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0], vec!["a".to_string()]);
    }

    #[test]
    fn diamond_resolves_once_each() {
        let items = vec![
            item("d", &["b", "c"], 9.0),
            item("b", &["a"], 5.0),
            item("c", &["a"], 4.0),
            item("a", &[], 1.0),
        ];
        let ordered = resolve_dependencies(&items);
        let order = ids(&ordered);
        assert_eq!(order.len(), 4);
        let pos = |id: &str| order.iter().position(|x| *x == id).unwrap();
        assert!(pos("a") < pos("b"));
        assert!(pos("a") < pos("c"));
        assert!(pos("b") < pos("d"));
        assert!(pos("c") < pos("d"));
    }
}
