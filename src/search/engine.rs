use log::{debug, trace};
use std::fmt;
use std::hash::Hash;
use std::time::{Duration, Instant};

use crate::grid::Point;
use crate::statistics::Stats;

use super::frontier::{DuplicatePolicy, NodeId, Priority, SearchFrontier};
use super::path::reconstruct;

/// A search node. `state` carries the algorithm-specific payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<S> {
    pub state: S,
    pub g: f64,
    pub h: f64,
    pub f: f64,
    pub parent: Option<NodeId>,
}

impl<S> Node<S> {
    pub fn new(state: S, g: f64, h: f64, parent: Option<NodeId>) -> Self {
        Node {
            state,
            g,
            h,
            f: g + h,
            parent,
        }
    }

    pub fn priority(&self) -> Priority {
        Priority::new(self.f, self.g)
    }
}

/// Outcome of inspecting a freshly popped node before the goal test.
pub enum Refinement<S> {
    Ready,
    /// The node's cost was corrected; queue this replacement instead.
    Requeue(Node<S>),
}

/// Successor generation for one algorithm family.
///
/// A generator is built for a single run and may keep per-run state.
pub trait SuccessorGenerator {
    type State: fmt::Debug;
    type Key: Copy + Eq + Hash;

    fn start_node(&mut self) -> Node<Self::State>;

    /// Identity used by the frontier's closed set and best-cost map.
    fn key(&self, state: &Self::State) -> Self::Key;

    fn is_goal(&self, node: &Node<Self::State>) -> bool;

    /// Path vertex a node stands for.
    fn anchor(&self, state: &Self::State) -> Point;

    fn refine(&mut self, _nodes: &[Node<Self::State>], _id: NodeId) -> Refinement<Self::State> {
        Refinement::Ready
    }

    fn successors(
        &mut self,
        nodes: &[Node<Self::State>],
        id: NodeId,
        out: &mut Vec<Node<Self::State>>,
    );

    /// Last chance to drop a successor before it reaches the frontier.
    fn accept(&mut self, _node: &Node<Self::State>) -> bool {
        true
    }
}

/// Optional limits checked once per loop iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchBudget {
    pub max_expansions: Option<usize>,
    pub max_runtime: Option<Duration>,
}

impl SearchBudget {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn with_max_expansions(mut self, expansions: usize) -> Self {
        self.max_expansions = Some(expansions);
        self
    }

    pub fn with_max_runtime(mut self, runtime: Duration) -> Self {
        self.max_runtime = Some(runtime);
        self
    }

    fn exceeded(&self, expansions: usize, started: Instant) -> bool {
        self.max_expansions.is_some_and(|max| expansions >= max)
            || self.max_runtime.is_some_and(|max| started.elapsed() >= max)
    }
}

/// Result of one search. `path` is empty and `cost` zero when nothing was
/// found.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub found: bool,
    pub path: Vec<Point>,
    pub cost: f64,
    pub stats: Stats,
}

impl SearchResult {
    /// Start equals goal.
    pub fn trivial(start: Point) -> Self {
        SearchResult {
            found: true,
            path: vec![start],
            cost: 0.0,
            stats: Stats {
                found: true,
                ..Stats::default()
            },
        }
    }

    pub fn not_found(stats: Stats) -> Self {
        SearchResult {
            found: false,
            path: Vec::new(),
            cost: 0.0,
            stats,
        }
    }
}

/// Generic best-first loop.
pub struct SearchEngine<G: SuccessorGenerator> {
    generator: G,
    frontier: SearchFrontier<G::Key>,
    nodes: Vec<Node<G::State>>,
    budget: SearchBudget,
}

impl<G: SuccessorGenerator> SearchEngine<G> {
    pub fn new(generator: G, policy: DuplicatePolicy) -> Self {
        SearchEngine {
            generator,
            frontier: SearchFrontier::new(policy),
            nodes: Vec::new(),
            budget: SearchBudget::unlimited(),
        }
    }

    pub fn with_budget(mut self, budget: SearchBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Run to goal extraction, exhaustion or budget. Consumes the engine so
    /// node arenas and caches never outlive the run.
    pub fn run(mut self, start: Point, goal: Point) -> SearchResult {
        let started = Instant::now();
        if start == goal {
            let mut result = SearchResult::trivial(start);
            result.stats.runtime = started.elapsed();
            return result;
        }

        let mut stats = Stats::new();
        trace!("{} -> {} with {} duplicate handling", start, goal, self.frontier.policy());
        let root = self.generator.start_node();
        let key = self.generator.key(&root.state);
        let priority = root.priority();
        self.nodes.push(root);
        self.frontier.push(key, priority, 0);

        let mut successors = Vec::new();
        loop {
            if self.budget.exceeded(stats.expansions, started) {
                stats.budget_exceeded = true;
                debug!("search budget exceeded after {} expansions", stats.expansions);
                break;
            }
            let Some((key, id)) = self.frontier.pop_best() else {
                break;
            };

            if let Refinement::Requeue(node) = self.generator.refine(&self.nodes, id) {
                let key = self.generator.key(&node.state);
                let priority = node.priority();
                self.nodes.push(node);
                self.frontier.reinsert(key, priority, self.nodes.len() - 1);
                continue;
            }

            if self.generator.is_goal(&self.nodes[id]) {
                let generator = &self.generator;
                let path = reconstruct(&self.nodes, id, goal, |state| generator.anchor(state));
                stats.found = true;
                stats.way_length = path.length;
                stats.runtime = started.elapsed();
                stats.max_tree_size = stats.max_tree_size.max(self.frontier.size());
                debug!(
                    "found path {} -> {} of length {:.4} after {} expansions",
                    start, goal, path.length, stats.expansions
                );
                return SearchResult {
                    found: true,
                    cost: path.length,
                    path: path.points,
                    stats,
                };
            }

            self.frontier.mark_closed(key);
            stats.expansions += 1;
            trace!("expand #{}: {:?} g={:.4}", id, self.nodes[id].state, self.nodes[id].g);

            self.generator.successors(&self.nodes, id, &mut successors);
            for node in successors.drain(..) {
                if !self.generator.accept(&node) {
                    continue;
                }
                let key = self.generator.key(&node.state);
                let next = self.nodes.len();
                if self.frontier.push(key, node.priority(), next) {
                    self.nodes.push(node);
                }
            }

            stats.max_tree_size = stats.max_tree_size.max(self.frontier.size());
        }

        stats.runtime = started.elapsed();
        debug!(
            "no path {} -> {} after {} expansions",
            start, goal, stats.expansions
        );
        SearchResult::not_found(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A one-row corridor of points `(0, 0)..=(0, length)`.
    struct Corridor {
        length: i32,
        goal: Point,
    }

    impl SuccessorGenerator for Corridor {
        type State = Point;
        type Key = Point;

        fn start_node(&mut self) -> Node<Point> {
            let start = Point::new(0, 0);
            Node::new(start, 0.0, start.distance(&self.goal), None)
        }

        fn key(&self, state: &Point) -> Point {
            *state
        }

        fn is_goal(&self, node: &Node<Point>) -> bool {
            node.state == self.goal
        }

        fn anchor(&self, state: &Point) -> Point {
            *state
        }

        fn successors(&mut self, nodes: &[Node<Point>], id: NodeId, out: &mut Vec<Node<Point>>) {
            let here = nodes[id].state;
            for step in [-1, 1] {
                let next = Point::new(0, here.col + step);
                if (0..=self.length).contains(&next.col) {
                    let g = nodes[id].g + 1.0;
                    out.push(Node::new(next, g, next.distance(&self.goal), Some(id)));
                }
            }
        }
    }

    #[test]
    fn walks_the_corridor() {
        let goal = Point::new(0, 5);
        let engine = SearchEngine::new(Corridor { length: 10, goal }, DuplicatePolicy::LazyRemoval);
        let result = engine.run(Point::new(0, 0), goal);
        assert!(result.found);
        assert_eq!(result.path.len(), 6);
        assert_eq!(result.path.last(), Some(&goal));
        assert!((result.cost - 5.0).abs() < 1e-12);
        assert_eq!(result.stats.expansions, 5);
        assert!(result.stats.max_tree_size >= 5);
        assert!(!result.stats.budget_exceeded);
    }

    #[test]
    fn budget_stops_the_run() {
        let goal = Point::new(0, 5);
        let corridor = Corridor { length: 10, goal };
        let engine = SearchEngine::new(corridor, DuplicatePolicy::SemiDuplicateDetection)
            .with_budget(SearchBudget::unlimited().with_max_expansions(2));
        let result = engine.run(Point::new(0, 0), goal);
        assert!(!result.found);
        assert!(result.stats.budget_exceeded);
        assert_eq!(result.stats.expansions, 2);
        assert!(result.path.is_empty());
        assert_eq!(result.cost, 0.0);
    }

    #[test]
    fn unreachable_goal_exhausts() {
        let goal = Point::new(0, 15);
        let engine = SearchEngine::new(Corridor { length: 10, goal }, DuplicatePolicy::Reexpansion);
        let result = engine.run(Point::new(0, 0), goal);
        assert!(!result.found);
        assert!(!result.stats.budget_exceeded);
        assert_eq!(result.stats.expansions, 11);
    }

    #[test]
    fn start_equal_to_goal_is_trivial() {
        let goal = Point::new(0, 0);
        let engine = SearchEngine::new(Corridor { length: 3, goal }, DuplicatePolicy::LazyRemoval);
        let result = engine.run(goal, goal);
        assert!(result.found);
        assert_eq!(result.path, vec![goal]);
        assert_eq!(result.cost, 0.0);
        assert_eq!(result.stats.expansions, 0);
    }
}
