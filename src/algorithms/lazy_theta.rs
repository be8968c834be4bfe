use crate::algorithms::common::{can_stop_at, check_endpoints, PathfindingAlgorithm};
use crate::algorithms::theta::ThetaSettings;
use crate::error::{PlannerError, Result};
use crate::grid::{Grid, GridKey, Point};
use crate::search::{
    DuplicatePolicy, Node, NodeId, Refinement, SearchEngine, SearchResult, SuccessorGenerator,
};

/// Lazy Theta*: successors assume their grandparent sees them and only pay
/// for the line-of-sight check once they reach the top of the queue.
#[derive(Debug, Clone)]
pub struct LazyThetaStar {
    pub settings: ThetaSettings,
}

impl Default for LazyThetaStar {
    fn default() -> Self {
        LazyThetaStar {
            settings: ThetaSettings {
                policy: DuplicatePolicy::Reexpansion,
                ..ThetaSettings::default()
            },
        }
    }
}

impl LazyThetaStar {
    pub fn new(settings: ThetaSettings) -> Self {
        LazyThetaStar { settings }
    }
}

impl PathfindingAlgorithm for LazyThetaStar {
    fn name(&self) -> &'static str {
        "lazy_theta"
    }

    fn search(&self, grid: &Grid, start: Point, goal: Point) -> Result<SearchResult> {
        check_endpoints(grid, start, goal)?;
        self.settings.validate()?;
        if self.settings.policy != DuplicatePolicy::Reexpansion {
            return Err(PlannerError::InvalidValue(format!(
                "lazy theta needs the reexpansion policy, got {}",
                self.settings.policy
            )));
        }
        let expander = LazyExpander {
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

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LazyState {
    pub point: Point,
    /// Parent to fall back on when the optimistic one is not visible.
    pub lazy_parent: Option<NodeId>,
    pub verified: bool,
}

struct LazyExpander<'a> {
    grid: &'a Grid,
    start: Point,
    goal: Point,
    settings: ThetaSettings,
}

impl LazyExpander<'_> {
    fn make_node(
        &self,
        nodes: &[Node<LazyState>],
        state: LazyState,
        parent: NodeId,
    ) -> Node<LazyState> {
        let parent_node = &nodes[parent];
        let g = parent_node.g + parent_node.state.point.distance(&state.point);
        let h = self.settings.heuristic.estimate(
            state.point,
            parent_node.state.point,
            parent_node.g,
            self.goal,
        );
        Node::new(state, g, h * self.settings.weight, Some(parent))
    }
}

impl SuccessorGenerator for LazyExpander<'_> {
    type State = LazyState;
    type Key = GridKey;

    fn start_node(&mut self) -> Node<LazyState> {
        let state = LazyState {
            point: self.start,
            lazy_parent: None,
            verified: true,
        };
        let h = self.start.distance(&self.goal) * self.settings.weight;
        Node::new(state, 0.0, h, None)
    }

    fn key(&self, state: &LazyState) -> GridKey {
        state.point
    }

    fn is_goal(&self, node: &Node<LazyState>) -> bool {
        node.state.point == self.goal
    }

    fn anchor(&self, state: &LazyState) -> Point {
        state.point
    }

    fn refine(&mut self, nodes: &[Node<LazyState>], id: NodeId) -> Refinement<LazyState> {
        let node = &nodes[id];
        let (Some(parent), Some(fallback)) = (node.parent, node.state.lazy_parent) else {
            return Refinement::Ready;
        };
        if node.state.verified {
            return Refinement::Ready;
        }
        let parent = if self.grid.visible(nodes[parent].state.point, node.state.point) {
            parent
        } else {
            fallback
        };
        let state = LazyState {
            verified: true,
            ..node.state
        };
        Refinement::Requeue(self.make_node(nodes, state, parent))
    }

    fn successors(
        &mut self,
        nodes: &[Node<LazyState>],
        id: NodeId,
        out: &mut Vec<Node<LazyState>>,
    ) {
        let current = nodes[id].state.point;
        let parent = nodes[id].parent.unwrap_or(id);
        for &(di, dj) in self.settings.neighborhood.offsets() {
            let next = Point::new(current.row + di, current.col + dj);
            if !self.grid.contains(next)
                || !can_stop_at(self.grid, next, self.goal)
                || !self.grid.visible(current, next)
            {
                continue;
            }
            let state = LazyState {
                point: next,
                lazy_parent: Some(id),
                verified: parent == id,
            };
            out.push(self.make_node(nodes, state, parent));
        }
    }
}
