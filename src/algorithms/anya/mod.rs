//! Anya: optimal any-angle search over intervals of grid rows.
//!
//! A node is an interval of points on one row together with a root, the
//! last turning point of the path. Every point of the interval is visible
//! from the root, so the search never commits to a single successor point
//! and returns the true Euclidean shortest path.
//!
//! Nodes come in three kinds. The start node is the source itself. Flat
//! nodes lie on the root's row and extend away from it. Cone nodes lie on
//! another row and are pushed one row further from the root per
//! expansion. When the sight line from the root grazes a corner point, that
//! point becomes the root of new intervals that bend around the obstacle.

mod interval;

pub use interval::{Interval, IntervalKey};

use log::trace;
use rustc_hash::FxHashMap;

use crate::algorithms::common::{check_endpoints, PathfindingAlgorithm};
use crate::error::Result;
use crate::grid::{Grid, Point};
use crate::rational::Rational;
use crate::search::{
    DuplicatePolicy, Node, NodeId, SearchBudget, SearchEngine, SearchResult, SuccessorGenerator,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Start,
    Flat,
    Cone,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnyaState {
    pub interval: Interval,
    pub root: Point,
    pub kind: NodeKind,
}

impl AnyaState {
    fn new(interval: Interval, root: Point) -> Self {
        let kind = if interval.row == root.row {
            NodeKind::Flat
        } else {
            NodeKind::Cone
        };
        AnyaState { interval, root, kind }
    }

    fn start(source: Point) -> Self {
        AnyaState {
            interval: Interval::point(source),
            root: source,
            kind: NodeKind::Start,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Anya {
    pub policy: DuplicatePolicy,
    pub budget: SearchBudget,
}

impl Anya {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_budget(mut self, budget: SearchBudget) -> Self {
        self.budget = budget;
        self
    }
}

impl PathfindingAlgorithm for Anya {
    fn name(&self) -> &'static str {
        "anya"
    }

    fn search(&self, grid: &Grid, start: Point, goal: Point) -> Result<SearchResult> {
        check_endpoints(grid, start, goal)?;
        let expander = AnyaExpander {
            grid,
            start,
            goal,
            root_history: FxHashMap::default(),
        };
        Ok(SearchEngine::new(expander, self.policy)
            .with_budget(self.budget)
            .run(start, goal))
    }
}

fn sign(x: i32) -> i32 {
    x.signum()
}

fn hypot(dr: f64, dc: f64) -> f64 {
    dr.hypot(dc)
}

/// Column where the ray from `root` through `(row, x)` meets `target_row`.
fn project(root: Point, row: i32, x: Rational, target_row: i32) -> Rational {
    debug_assert_ne!(row, root.row, "projection along the root row");
    let c = Rational::from(root.col);
    c + (x - c) * Rational::new((target_row - root.row) as i64, (row - root.row) as i64)
}

struct AnyaExpander<'a> {
    grid: &'a Grid,
    start: Point,
    goal: Point,
    /// Cheapest `g` seen for every root during this run.
    root_history: FxHashMap<Point, f64>,
}

impl AnyaExpander<'_> {
    /// Walk along `row` from column `from` in direction `dir` until the
    /// edge ahead is blocked on both sides, or a corner point, an
    /// impassable point or the boundary is reached.
    fn flat_extent(&self, row: i32, from: i32, dir: i32) -> i32 {
        let width = self.grid.width() as i32;
        let mut x = from;
        loop {
            let next = x + dir;
            if next < 0 || next > width {
                break;
            }
            let edge = x.min(next);
            if self.grid.blocked(row - 1, edge) && self.grid.blocked(row, edge) {
                break;
            }
            x = next;
            if self.grid.is_corner_point(row, x) || !self.grid.passable_point(row, x) {
                break;
            }
        }
        x
    }

    /// Far end of the free cells of `band` starting at point column `from`.
    fn run_end(&self, band: i32, from: i32, dir: i32) -> i32 {
        let mut end = from;
        if dir > 0 {
            while self.grid.traversable(band, end) {
                end += 1;
            }
        } else {
            while self.grid.traversable(band, end - 1) {
                end -= 1;
            }
        }
        end
    }

    /// Maximal free runs `[l, r]` of cell row `band` that touch the columns
    /// `left..=right`.
    fn free_runs(&self, band: i32, left: Rational, right: Rational) -> Vec<(i32, i32)> {
        let mut runs = Vec::new();
        let mut j = left.ceil() as i32 - 1;
        let last = right.floor() as i32;
        while j <= last {
            if self.grid.traversable(band, j) {
                let l = self.run_end(band, j, -1);
                let r = self.run_end(band, j, 1);
                runs.push((l, r));
                j = r + 1;
            } else {
                j += 1;
            }
        }
        runs
    }

    fn start_successors(&self, out: &mut Vec<Interval>) {
        let (row, col) = (self.start.row, self.start.col);
        let mut raw = Vec::with_capacity(4);
        for dir in [-1, 1] {
            let end = self.flat_extent(row, col, dir);
            if end != col {
                raw.push(Interval::spanning(row, col, end, false));
            }
        }
        for (next_row, band) in [(row + 1, row), (row - 1, row - 1)] {
            if !self.grid.in_bounds_point(next_row, 0) {
                continue;
            }
            let l = self.run_end(band, col, -1);
            let r = self.run_end(band, col, 1);
            if l != r {
                raw.push(Interval::closed(next_row, l.into(), r.into()));
            }
        }
        for interval in raw {
            interval.split_at_corners(self.grid, out);
        }
    }

    /// Intervals rooted at `(row, p)` when the sight line from `root` bends
    /// around the corner there.
    fn turning_successors(&self, root: Point, row: i32, p: i32, out: &mut Vec<(Point, Interval)>) {
        let corner = Point::new(row, p);
        if corner == root || !self.grid.is_corner_point(row, p) {
            return;
        }
        let Some((qi, qj)) = self.grid.blocked_quadrant(row, p) else {
            return;
        };
        let (sr, sc) = (sign(root.row - row), sign(root.col - p));
        let obstacle_on_root_side = sr == qi;
        let obstacle_behind = sc == qj;
        if obstacle_on_root_side == obstacle_behind {
            return;
        }

        let mut raw = Vec::with_capacity(2);
        let height = self.grid.height() as i32;
        if obstacle_on_root_side {
            let end = self.flat_extent(row, p, qj);
            if end != p {
                raw.push(Interval::spanning(row, p, end, false));
            }
            let next_row = row - sr;
            if (0..=height).contains(&next_row) {
                let band = if next_row > row { row } else { row - 1 };
                let ray = project(root, row, p.into(), next_row);
                let end = Rational::from(self.run_end(band, p, qj));
                if qj > 0 && end >= ray {
                    raw.push(Interval::closed(next_row, ray, end));
                }
                if qj < 0 && end <= ray {
                    raw.push(Interval::closed(next_row, end, ray));
                }
            }
        } else {
            let next_row = row + qi;
            if (0..=height).contains(&next_row) {
                let band = if qi > 0 { row } else { row - 1 };
                let end = Rational::from(self.run_end(band, p, -qj));
                let far = if sr != 0 {
                    let ray = project(root, row, p.into(), next_row);
                    if qj > 0 {
                        end.max(ray)
                    } else {
                        end.min(ray)
                    }
                } else {
                    end
                };
                let p = Rational::from(p);
                if far != p {
                    raw.push(Interval::closed(next_row, p.min(far), p.max(far)));
                }
            }
        }
        let mut pieces = Vec::new();
        for interval in raw {
            interval.split_at_corners(self.grid, &mut pieces);
        }
        out.extend(pieces.into_iter().map(|interval| (corner, interval)));
    }

    fn flat_successors(
        &self,
        state: &AnyaState,
        observable: &mut Vec<Interval>,
        turning: &mut Vec<(Point, Interval)>,
    ) {
        let interval = &state.interval;
        let root = state.root;
        let far = if Rational::from(root.col) <= interval.left {
            interval.right
        } else {
            interval.left
        };
        let Some(p) = far.to_integer() else {
            return;
        };
        let p = p as i32;
        if self.grid.passable_point(interval.row, p) {
            let end = self.flat_extent(interval.row, p, sign(p - root.col));
            if end != p {
                Interval::spanning(interval.row, p, end, true)
                    .split_at_corners(self.grid, observable);
            }
        }
        self.turning_successors(root, interval.row, p, turning);
    }

    fn cone_successors(
        &self,
        state: &AnyaState,
        observable: &mut Vec<Interval>,
        turning: &mut Vec<(Point, Interval)>,
    ) {
        let interval = &state.interval;
        let (root, row) = (state.root, interval.row);
        let dir = sign(row - root.row);
        let next_row = row + dir;

        if self.grid.in_bounds_point(next_row, 0) {
            let band = if dir > 0 { row } else { row - 1 };
            let left = project(root, row, interval.left, next_row);
            let right = project(root, row, interval.right, next_row);
            for (l, r) in self.free_runs(band, interval.left, interval.right) {
                let (l_ray, r_ray) = (
                    project(root, row, l.into(), next_row),
                    project(root, row, r.into(), next_row),
                );
                let lo = left.max(l.into()).max(l_ray);
                let hi = right.min(r.into()).min(r_ray);

                let mut lo_closed = true;
                if lo == left && !interval.left_closed {
                    lo_closed = false;
                }
                // The ray through an impassable run edge only grazes it.
                if lo == l_ray
                    && Rational::from(l) >= interval.left
                    && !self.grid.passable_point(row, l)
                {
                    lo_closed = false;
                }
                let mut hi_closed = true;
                if hi == right && !interval.right_closed {
                    hi_closed = false;
                }
                if hi == r_ray
                    && Rational::from(r) <= interval.right
                    && !self.grid.passable_point(row, r)
                {
                    hi_closed = false;
                }

                let next = Interval::new(next_row, lo, hi, lo_closed, hi_closed);
                if !next.is_empty() {
                    next.split_at_corners(self.grid, observable);
                }
            }
        }

        for (end, closed) in [
            (interval.left, interval.left_closed),
            (interval.right, interval.right_closed),
        ] {
            if let (true, Some(p)) = (closed, end.to_integer()) {
                self.turning_successors(root, row, p as i32, turning);
            }
        }
    }

    /// Lower bound on the cost from the root through the interval to the
    /// goal, excluding `g`.
    fn estimate(&self, state: &AnyaState) -> f64 {
        let goal = self.goal;
        let root = state.root;
        let interval = &state.interval;
        let row = interval.row;
        let root_col = Rational::from(root.col);
        let x = match state.kind {
            NodeKind::Start => return root.distance(&goal),
            NodeKind::Flat => {
                if (interval.left - root_col).abs() <= (interval.right - root_col).abs() {
                    interval.left
                } else {
                    interval.right
                }
            }
            NodeKind::Cone => {
                let mut goal_row = goal.row;
                if (goal.row - row) * (root.row - row) > 0 {
                    goal_row = 2 * row - goal.row;
                }
                let crossing = root_col
                    + (Rational::from(goal.col) - root_col)
                        * Rational::new((row - root.row) as i64, (goal_row - root.row) as i64);
                crossing.max(interval.left).min(interval.right)
            }
        };
        let x = x.to_f64();
        let to_interval = hypot((row - root.row) as f64, x - root.col as f64);
        let to_goal = hypot((goal.row - row) as f64, goal.col as f64 - x);
        to_interval + to_goal
    }

    fn node(&self, interval: Interval, root: Point, g: f64, parent: NodeId) -> Node<AnyaState> {
        let state = AnyaState::new(interval, root);
        let h = self.estimate(&state);
        Node::new(state, g, h, Some(parent))
    }
}

impl SuccessorGenerator for AnyaExpander<'_> {
    type State = AnyaState;
    type Key = IntervalKey;

    fn start_node(&mut self) -> Node<AnyaState> {
        let state = AnyaState::start(self.start);
        let h = self.estimate(&state);
        Node::new(state, 0.0, h, None)
    }

    fn key(&self, state: &AnyaState) -> IntervalKey {
        IntervalKey::new(&state.interval, state.root)
    }

    fn is_goal(&self, node: &Node<AnyaState>) -> bool {
        node.state.interval.contains(self.goal)
    }

    fn anchor(&self, state: &AnyaState) -> Point {
        state.root
    }

    fn successors(
        &mut self,
        nodes: &[Node<AnyaState>],
        id: NodeId,
        out: &mut Vec<Node<AnyaState>>,
    ) {
        let node = &nodes[id];
        let state = node.state;
        trace!("anya expand {} root {} ({:?})", state.interval, state.root, state.kind);

        let mut observable = Vec::new();
        let mut turning = Vec::new();
        match state.kind {
            NodeKind::Start => self.start_successors(&mut observable),
            NodeKind::Flat => self.flat_successors(&state, &mut observable, &mut turning),
            NodeKind::Cone => self.cone_successors(&state, &mut observable, &mut turning),
        }

        out.extend(
            observable
                .into_iter()
                .map(|interval| self.node(interval, state.root, node.g, id)),
        );
        for (root, interval) in turning {
            let g = node.g + state.root.distance(&root);
            out.push(self.node(interval, root, g, id));
        }
    }

    fn accept(&mut self, node: &Node<AnyaState>) -> bool {
        let root = node.state.root;
        match self.root_history.get(&root) {
            Some(&best) if best < node.g => false,
            Some(&best) => {
                self.root_history.insert(root, best.min(node.g));
                true
            }
            None => {
                self.root_history.insert(root, node.g);
                true
            }
        }
    }
}
