//! Graph view over a [`ConstructionPlan`].
//!
//! Nodes are plan indexes; an edge `a → b` means component `a` needs `b`
//! constructed first. Deferred proxy parameters are not edges, so a
//! well-formed plan always yields an acyclic graph.

use std::collections::{BTreeSet, HashMap, VecDeque};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use super::ConstructionPlan;
use crate::constants::MAX_TREE_DEPTH;
use crate::core::{Result, WiregraphError};

/// Color states for DFS-based cycle detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Construction-order graph of a plan.
pub struct PlanGraph {
    /// Edge weights are the display form of the claim behind the edge.
    graph: DiGraph<usize, String>,
    labels: Vec<String>,
}

impl PlanGraph {
    /// Build the graph of construction edges of `plan`.
    pub fn from_plan(plan: &ConstructionPlan) -> Self {
        let mut graph = DiGraph::new();
        let mut labels = Vec::with_capacity(plan.len());
        for component in &plan.components {
            graph.add_node(component.index);
            labels.push(format!("{}: {}", component.name, component.ty));
        }

        for component in &plan.components {
            let from = NodeIndex::new(component.index);
            for edge in &component.dependencies {
                for target in edge.construction_targets() {
                    if target >= labels.len() {
                        continue;
                    }
                    let to = NodeIndex::new(target);
                    if !graph.contains_edge(from, to) {
                        graph.add_edge(from, to, edge.claim().to_string());
                    }
                }
            }
        }

        Self {
            graph,
            labels,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Edges that point to an equal or later index, as `(from, to)` pairs.
    pub fn monotonicity_violations(&self) -> Vec<(usize, usize)> {
        self.graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(from, to)| (self.graph[from], self.graph[to]))
            .filter(|(from, to)| to >= from)
            .collect()
    }

    /// Detect cycles using DFS with colors.
    ///
    /// The walk keeps its own stack, so chain depth is not limited by the
    /// thread's stack size.
    pub fn detect_cycles(&self) -> Result<()> {
        let mut colors: HashMap<NodeIndex, Color> =
            self.graph.node_indices().map(|n| (n, Color::White)).collect();

        for node in self.graph.node_indices() {
            if colors.get(&node) != Some(&Color::White) {
                continue;
            }
            if let Some((cycle, claim)) = self.dfs_visit(node, &mut colors) {
                return Err(WiregraphError::CircularDependency {
                    claim,
                    chain: cycle.iter().map(|n| self.labels[self.graph[*n]].clone()).collect(),
                });
            }
        }
        Ok(())
    }

    /// Visit everything reachable from `start`, returning the first cycle
    /// found and the claim of the edge that closes it.
    fn dfs_visit(
        &self,
        start: NodeIndex,
        colors: &mut HashMap<NodeIndex, Color>,
    ) -> Option<(Vec<NodeIndex>, String)> {
        let mut path = vec![start];
        let mut pending = vec![self.ordered_neighbors(start)];
        colors.insert(start, Color::Gray);

        while let Some(neighbors) = pending.last_mut() {
            let Some(neighbor) = neighbors.pop() else {
                pending.pop();
                if let Some(done) = path.pop() {
                    colors.insert(done, Color::Black);
                }
                continue;
            };

            match colors.get(&neighbor) {
                Some(Color::Gray) => {
                    let claim = path
                        .last()
                        .and_then(|from| self.graph.find_edge(*from, neighbor))
                        .map(|edge| self.graph[edge].clone())
                        .unwrap_or_default();
                    let start = path.iter().position(|n| *n == neighbor).unwrap_or(0);
                    let mut cycle = path[start..].to_vec();
                    cycle.push(neighbor);
                    return Some((cycle, claim));
                }
                Some(Color::White) => {
                    colors.insert(neighbor, Color::Gray);
                    path.push(neighbor);
                    pending.push(self.ordered_neighbors(neighbor));
                }
                _ => {}
            }
        }
        None
    }

    /// Neighbors of `node` reversed, so popping yields them in petgraph order.
    fn ordered_neighbors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut neighbors: Vec<NodeIndex> = self.graph.neighbors(node).collect();
        neighbors.reverse();
        neighbors
    }

    /// Plan indexes with every dependency before its dependents.
    pub fn topological_order(&self) -> Result<Vec<usize>> {
        self.detect_cycles()?;
        let indices = toposort(&self.graph, None).map_err(|cycle| WiregraphError::CircularDependency {
            claim: String::new(),
            chain: vec![self.labels[self.graph[cycle.node_id()]].clone()],
        })?;
        Ok(indices.into_iter().rev().map(|idx| self.graph[idx]).collect())
    }

    /// Direct dependencies of `index`, in edge insertion order.
    pub fn direct_deps(&self, index: usize) -> Vec<usize> {
        if index >= self.graph.node_count() {
            return Vec::new();
        }
        // petgraph yields neighbors most-recent first
        let mut deps: Vec<usize> = self.graph.neighbors(NodeIndex::new(index)).map(|n| self.graph[n]).collect();
        deps.reverse();
        deps
    }

    /// Every component `index` depends on, directly or indirectly.
    pub fn transitive_deps(&self, index: usize) -> BTreeSet<usize> {
        let mut deps = BTreeSet::new();
        let mut queue = VecDeque::from([index]);
        while let Some(current) = queue.pop_front() {
            for dep in self.direct_deps(current) {
                if deps.insert(dep) {
                    queue.push_back(dep);
                }
            }
        }
        deps
    }

    /// Components that depend directly on `index`.
    pub fn dependents(&self, index: usize) -> Vec<usize> {
        if index >= self.graph.node_count() {
            return Vec::new();
        }
        let mut users: Vec<usize> = self
            .graph
            .neighbors_directed(NodeIndex::new(index), petgraph::Direction::Incoming)
            .map(|n| self.graph[n])
            .collect();
        users.sort_unstable();
        users
    }

    /// Human-readable dependency tree rooted at `index`.
    ///
    /// Components already printed are marked `(shown above)` instead of being
    /// expanded again. Branches deeper than [`MAX_TREE_DEPTH`] are cut off.
    pub fn to_tree_string(&self, index: usize) -> String {
        let mut result = String::new();
        if index >= self.labels.len() {
            return result;
        }

        let mut visited = BTreeSet::new();
        let mut stack = vec![TreeEntry {
            index,
            prefix: String::new(),
            is_last: true,
            depth: 0,
        }];
        while let Some(entry) = stack.pop() {
            let (connector, child_indent) = if entry.is_last {
                ("└── ", "    ")
            } else {
                ("├── ", "│   ")
            };
            result.push_str(&format!("{}{connector}[{}] {}\n", entry.prefix, entry.index, self.labels[entry.index]));

            let child_prefix = format!("{}{child_indent}", entry.prefix);
            if !visited.insert(entry.index) {
                result.push_str(&format!("{child_prefix}└── (shown above)\n"));
                continue;
            }

            let deps = self.direct_deps(entry.index);
            if deps.is_empty() {
                continue;
            }
            if entry.depth >= MAX_TREE_DEPTH {
                result.push_str(&format!("{child_prefix}└── (truncated)\n"));
                continue;
            }
            // Pushed in reverse so the first dependency is rendered first
            let last = deps.len() - 1;
            for (i, dep) in deps.into_iter().enumerate().rev() {
                stack.push(TreeEntry {
                    index: dep,
                    prefix: child_prefix.clone(),
                    is_last: i == last,
                    depth: entry.depth + 1,
                });
            }
        }
        result
    }
}

/// A component waiting to be rendered by [`PlanGraph::to_tree_string`].
struct TreeEntry {
    index: usize,
    prefix: String,
    is_last: bool,
    depth: usize,
}
