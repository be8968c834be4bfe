use rustc_hash::FxHashMap;
use std::f64::consts::PI;

use crate::algorithms::common::{
    can_stop_at, check_endpoints, Neighborhood, PathfindingAlgorithm,
};
use crate::algorithms::theta::ThetaSettings;
use crate::error::{PlannerError, Result};
use crate::grid::{Grid, GridKey, Point};
use crate::search::{Node, NodeId, SearchEngine, SearchResult, SuccessorGenerator};

/// Signed angle at `origin` from the ray towards `from` to the ray towards
/// `to`, in `(-PI, PI]`. Collinear rays in the same direction give exactly
/// zero.
pub fn angle_at(origin: Point, from: Point, to: Point) -> f64 {
    let (ai, aj) = ((from.row - origin.row) as i64, (from.col - origin.col) as i64);
    let (bi, bj) = ((to.row - origin.row) as i64, (to.col - origin.col) as i64);
    let cross = ai * bj - aj * bi;
    let dot = ai * bi + aj * bj;
    if cross == 0 && dot >= 0 {
        return 0.0;
    }
    (cross as f64).atan2(dot as f64)
}

fn squared_distance(a: Point, b: Point) -> i64 {
    let (di, dj) = ((a.row - b.row) as i64, (a.col - b.col) as i64);
    di * di + dj * dj
}

/// Directions, measured at a point's parent relative to the ray through the
/// point, in which the parent is known to see past the point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleBounds {
    pub lower: f64,
    pub upper: f64,
}

impl AngleBounds {
    pub const UNBOUNDED: AngleBounds = AngleBounds {
        lower: -PI,
        upper: PI,
    };

    pub fn contains(&self, angle: f64) -> bool {
        self.lower <= angle && angle <= self.upper
    }
}

/// What an expanded point left behind for its neighbors.
#[derive(Debug, Clone, Copy)]
struct Expanded {
    parent: Option<Point>,
    bounds: AngleBounds,
}

/// Theta* with angle propagation: line of sight to the grandparent is read
/// off angle bounds propagated from blocked cells and already expanded
/// neighbors, so expansion does no visibility walk for the parent test.
/// Works on the 8-neighborhood.
#[derive(Debug, Clone, Default)]
pub struct ThetaAp {
    pub settings: ThetaSettings,
}

impl ThetaAp {
    pub fn new(settings: ThetaSettings) -> Self {
        ThetaAp { settings }
    }
}

impl PathfindingAlgorithm for ThetaAp {
    fn name(&self) -> &'static str {
        "theta_ap"
    }

    fn search(&self, grid: &Grid, start: Point, goal: Point) -> Result<SearchResult> {
        check_endpoints(grid, start, goal)?;
        self.settings.validate()?;
        if self.settings.neighborhood != Neighborhood::Eight {
            return Err(PlannerError::InvalidValue(format!(
                "theta_ap propagates angles over 8 neighbors, got {:?}",
                self.settings.neighborhood
            )));
        }
        let expander = ApExpander {
            grid,
            start,
            goal,
            settings: self.settings,
            expanded: FxHashMap::default(),
        };
        let engine =
            SearchEngine::new(expander, self.settings.policy).with_budget(self.settings.budget);
        Ok(engine.run(start, goal))
    }
}

struct ApExpander<'a> {
    grid: &'a Grid,
    start: Point,
    goal: Point,
    settings: ThetaSettings,
    expanded: FxHashMap<Point, Expanded>,
}

impl ApExpander<'_> {
    fn bounds(&self, point: Point, parent: Point) -> AngleBounds {
        let mut bounds = AngleBounds::UNBOUNDED;
        let near = squared_distance(parent, point);

        // A blocked cell touching the point cuts off every direction on its side.
        for (bi, bj) in [(-1, -1), (-1, 0), (0, -1), (0, 0)] {
            let (bi, bj) = (point.row + bi, point.col + bj);
            if !self.grid.blocked(bi, bj) {
                continue;
            }
            let mut lower = true;
            let mut upper = true;
            for (di, dj) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                let corner = Point::new(bi + di, bj + dj);
                let theta = angle_at(parent, point, corner);
                let behind = corner == parent
                    || (theta == 0.0 && squared_distance(parent, corner) <= near);
                lower &= behind || theta < 0.0;
                upper &= behind || theta > 0.0;
            }
            if lower {
                bounds.lower = 0.0;
            }
            if upper {
                bounds.upper = 0.0;
            }
        }

        for &(di, dj) in Neighborhood::Eight.offsets() {
            let next = Point::new(point.row + di, point.col + dj);
            if !self.grid.contains(next) || !self.grid.visible(point, next) {
                continue;
            }
            let theta = angle_at(parent, point, next);
            let sibling = self
                .expanded
                .get(&next)
                .filter(|e| e.parent == Some(parent));
            if let Some(sibling) = sibling.filter(|_| next != self.start) {
                let lower = sibling.bounds.lower + theta;
                let upper = sibling.bounds.upper + theta;
                if lower <= 0.0 {
                    bounds.lower = bounds.lower.max(lower);
                }
                if upper >= 0.0 {
                    bounds.upper = bounds.upper.min(upper);
                }
            }
            if sibling.is_none() && next != parent && squared_distance(parent, next) < near {
                if theta < 0.0 {
                    bounds.lower = bounds.lower.max(theta);
                }
                if theta > 0.0 {
                    bounds.upper = bounds.upper.min(theta);
                }
            }
        }
        bounds
    }
}

impl SuccessorGenerator for ApExpander<'_> {
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
        let parent_id = nodes[id].parent;
        let parent_point = parent_id.map(|p| nodes[p].state);
        let bounds = match parent_point {
            Some(parent) => self.bounds(current, parent),
            None => AngleBounds::UNBOUNDED,
        };
        self.expanded.insert(
            current,
            Expanded {
                parent: parent_point,
                bounds,
            },
        );

        for &(di, dj) in Neighborhood::Eight.offsets() {
            let next = Point::new(current.row + di, current.col + dj);
            if !self.grid.contains(next)
                || !can_stop_at(self.grid, next, self.goal)
                || !self.grid.visible(current, next)
            {
                continue;
            }
            // Inherit the parent when `next` lies inside the propagated bounds.
            let parent = match (parent_id, parent_point) {
                (Some(inherited), Some(p))
                    if next != self.start && bounds.contains(angle_at(p, current, next)) =>
                {
                    inherited
                }
                _ => id,
            };
            let parent_node = &nodes[parent];
            let g = parent_node.g + parent_node.state.distance(&next);
            let h = self
                .settings
                .heuristic
                .estimate(next, parent_node.state, parent_node.g, self.goal);
            out.push(Node::new(next, g, h * self.settings.weight, Some(parent)));
        }
    }
}
