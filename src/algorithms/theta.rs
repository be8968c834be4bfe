use crate::algorithms::common::{
    can_stop_at, check_endpoints, Heuristic, Neighborhood, PathfindingAlgorithm,
};
use crate::error::{PlannerError, Result};
use crate::grid::{Grid, GridKey, Point};
use crate::search::{
    DuplicatePolicy, Node, NodeId, SearchBudget, SearchEngine, SearchResult, SuccessorGenerator,
};

/// Settings shared by the Theta* family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThetaSettings {
    pub neighborhood: Neighborhood,
    pub heuristic: Heuristic,
    /// Multiplier on `h`; values above 1 trade optimality for speed.
    pub weight: f64,
    /// How many ancestors to try for line of sight (Theta* only).
    pub ancestors: usize,
    /// Queue one successor per visible candidate parent instead of only the
    /// oldest one (Theta* only).
    pub multi_parent: bool,
    pub policy: DuplicatePolicy,
    pub budget: SearchBudget,
}

impl Default for ThetaSettings {
    fn default() -> Self {
        ThetaSettings {
            neighborhood: Neighborhood::Eight,
            heuristic: Heuristic::Euclidean,
            weight: 1.0,
            ancestors: 1,
            multi_parent: false,
            policy: DuplicatePolicy::LazyRemoval,
            budget: SearchBudget::unlimited(),
        }
    }
}

impl ThetaSettings {
    pub(crate) fn validate(&self) -> Result<()> {
        if !(self.weight.is_finite() && self.weight > 0.0) {
            return Err(PlannerError::InvalidValue(format!(
                "heuristic weight must be positive, got {}",
                self.weight
            )));
        }
        if let Heuristic::ParentBlend(wh) = self.heuristic {
            if !(0.0..=1.0).contains(&wh) {
                return Err(PlannerError::InvalidValue(format!(
                    "parent blend factor must lie in [0, 1], got {}",
                    wh
                )));
            }
        }
        Ok(())
    }
}

/// Theta*: A* over grid points where each successor tries to inherit an
/// ancestor as parent when that ancestor can see it directly.
#[derive(Debug, Clone, Default)]
pub struct ThetaStar {
    pub settings: ThetaSettings,
}

impl ThetaStar {
    pub fn new(settings: ThetaSettings) -> Self {
        ThetaStar { settings }
    }
}

impl PathfindingAlgorithm for ThetaStar {
    fn name(&self) -> &'static str {
        "theta"
    }

    fn search(&self, grid: &Grid, start: Point, goal: Point) -> Result<SearchResult> {
        check_endpoints(grid, start, goal)?;
        self.settings.validate()?;
        let expander = ThetaExpander {
            grid,
            start,
            goal,
            settings: self.settings,
        };
        let engine =
            SearchEngine::new(expander, self.settings.policy).with_budget(self.settings.budget);
        Ok(engine.run(start, goal))
    }
}

struct ThetaExpander<'a> {
    grid: &'a Grid,
    start: Point,
    goal: Point,
    settings: ThetaSettings,
}

impl ThetaExpander<'_> {
    /// Oldest of the first `ancestors` ancestors of `id` that sees `target`,
    /// or `id` itself.
    fn choose_parent(
        &self,
        nodes: &[Node<Point>],
        id: NodeId,
        chain: &[NodeId],
        target: Point,
    ) -> NodeId {
        chain
            .iter()
            .rev()
            .copied()
            .find(|&a| self.grid.visible(nodes[a].state, target))
            .unwrap_or(id)
    }

    fn make_node(&self, nodes: &[Node<Point>], parent: NodeId, next: Point) -> Node<Point> {
        let parent_node = &nodes[parent];
        let g = parent_node.g + parent_node.state.distance(&next);
        let h = self
            .settings
            .heuristic
            .estimate(next, parent_node.state, parent_node.g, self.goal);
        Node::new(next, g, h * self.settings.weight, Some(parent))
    }
}

impl SuccessorGenerator for ThetaExpander<'_> {
    type State = Point;
    type Key = GridKey;

    fn start_node(&mut self) -> Node<Point> {
        let h = self.start.distance(&self.goal) * self.settings.weight;
        Node::new(self.start, 0.0, h, None)
    }

    fn key(&self, state: &Point) -> GridKey {
        *state
    }

    fn is_goal(&self, node: &Node<Point>) -> bool {
        node.state == self.goal
    }

    fn anchor(&self, state: &Point) -> Point {
        *state
    }

    fn successors(&mut self, nodes: &[Node<Point>], id: NodeId, out: &mut Vec<Node<Point>>) {
        let current = nodes[id].state;

        let mut chain = Vec::with_capacity(self.settings.ancestors);
        let mut cursor = nodes[id].parent;
        while let Some(ancestor) = cursor {
            if chain.len() == self.settings.ancestors {
                break;
            }
            chain.push(ancestor);
            cursor = nodes[ancestor].parent;
        }

        for &(di, dj) in self.settings.neighborhood.offsets() {
            let next = Point::new(current.row + di, current.col + dj);
            if !self.grid.contains(next)
                || !can_stop_at(self.grid, next, self.goal)
                || !self.grid.visible(current, next)
            {
                continue;
            }
            if self.settings.multi_parent {
                for &ancestor in chain.iter().rev() {
                    if self.grid.visible(nodes[ancestor].state, next) {
                        out.push(self.make_node(nodes, ancestor, next));
                    }
                }
                out.push(self.make_node(nodes, id, next));
            } else {
                let parent = self.choose_parent(nodes, id, &chain, next);
                out.push(self.make_node(nodes, parent, next));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(
        rows: &str,
        start: (i32, i32),
        goal: (i32, i32),
        settings: ThetaSettings,
    ) -> SearchResult {
        let grid = Grid::parse(rows).unwrap();
        ThetaStar::new(settings)
            .search(&grid, start.into(), goal.into())
            .unwrap()
    }

    #[test]
    fn shortcuts_through_open_space() {
        let result = run("....\n....\n....", (0, 0), (3, 4), ThetaSettings::default());
        assert!(result.found);
        assert_eq!(result.path, vec![Point::new(0, 0), Point::new(3, 4)]);
        assert!((result.cost - 5.0).abs() < 1e-9);
    }

    #[test]
    fn bends_around_an_obstacle() {
        let result = run(
            "....\n..#.\n.##.\n....",
            (3, 1),
            (1, 3),
            ThetaSettings::default(),
        );
        assert!(result.found);
        assert!((result.cost - (2.0 + 2f64.sqrt())).abs() < 1e-9);
    }

    #[test]
    fn four_neighbors_can_return_longer_paths() {
        let settings = ThetaSettings {
            neighborhood: Neighborhood::Four,
            ..ThetaSettings::default()
        };
        let result = run("....\n..#.\n.##.\n....", (3, 1), (1, 3), settings);
        assert!(result.found);
        assert!((result.cost - 4.0).abs() < 1e-9);
    }

    #[test]
    fn every_duplicate_policy_agrees_on_scenarios() {
        for policy in [
            DuplicatePolicy::LazyRemoval,
            DuplicatePolicy::SemiDuplicateDetection,
            DuplicatePolicy::Reexpansion,
        ] {
            for neighborhood in [Neighborhood::Eight, Neighborhood::Sixteen] {
                let settings = ThetaSettings {
                    policy,
                    neighborhood,
                    ..ThetaSettings::default()
                };
                let result = run("..#.\n#...\n...#\n.#..", (0, 0), (4, 0), settings);
                let label = format!("{policy} {neighborhood:?}");
                assert!((result.cost - 4.650281539872885).abs() < 1e-9, "{label}");
            }
        }
    }

    #[test]
    fn deeper_ancestor_lookback_never_hurts_on_open_grids() {
        let settings = ThetaSettings {
            ancestors: 3,
            ..ThetaSettings::default()
        };
        let result = run("......\n......\n......\n......", (4, 0), (0, 6), settings);
        assert_eq!(result.path.len(), 2);
    }

    #[test]
    fn multi_parent_queues_every_visible_candidate() {
        let rows = "......\n..#...\n.##...\n......\n......";
        for policy in [DuplicatePolicy::LazyRemoval, DuplicatePolicy::Reexpansion] {
            let settings = ThetaSettings {
                ancestors: 2,
                policy,
                ..ThetaSettings::default()
            };
            let single = run(rows, (4, 0), (0, 5), settings);
            let multi = run(
                rows,
                (4, 0),
                (0, 5),
                ThetaSettings {
                    multi_parent: true,
                    ..settings
                },
            );
            assert!(single.found && multi.found);
            assert!(multi.cost <= single.cost + 1e-9, "{policy}");
            assert!((multi.cost - 6.767828935632369).abs() < 1e-9, "{policy}: {}", multi.cost);
            assert!(multi.stats.max_tree_size >= single.stats.max_tree_size);
        }
    }

    #[test]
    fn parent_blend_still_finds_valid_paths() {
        let settings = ThetaSettings {
            heuristic: Heuristic::ParentBlend(0.3),
            ..ThetaSettings::default()
        };
        let grid = Grid::parse("..#.\n#...\n...#\n.#..").unwrap();
        let result = ThetaStar::new(settings)
            .search(&grid, Point::new(0, 0), Point::new(4, 0))
            .unwrap();
        assert!(result.found);
        assert!(result.cost >= 4.650281539872885 - 1e-9);
        for pair in result.path.windows(2) {
            assert!(grid.visible(pair[0], pair[1]));
        }
    }

    #[test]
    fn rejects_bad_weights() {
        let grid = Grid::parse("..").unwrap();
        let settings = ThetaSettings {
            weight: 0.0,
            ..ThetaSettings::default()
        };
        assert!(ThetaStar::new(settings)
            .search(&grid, Point::new(0, 0), Point::new(1, 2))
            .is_err());
    }
}
