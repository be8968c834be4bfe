use crate::algorithms::common::{can_stop_at, check_endpoints, PathfindingAlgorithm};
use crate::error::{PlannerError, Result};
use crate::grid::{Grid, Point};
use crate::search::{
    DuplicatePolicy, Node, NodeId, SearchBudget, SearchEngine, SearchResult, SuccessorGenerator,
};

/// Largest supported `k`; the direction set doubles with every step.
pub const MAX_K: u32 = 12;

/// Move vectors for a `2^k` neighborhood, counter-clockwise from `(1, 0)`.
///
/// Each round inserts the sum of every pair of neighboring vectors between
/// them, so `k = 3` is the usual 8-neighborhood and `k = 4` adds the knight
/// moves.
pub fn directions(k: u32) -> Result<Vec<(i32, i32)>> {
    if !(3..=MAX_K).contains(&k) {
        return Err(PlannerError::InvalidK { k, max: MAX_K });
    }
    let mut dirs = vec![(1, 0), (0, 1), (-1, 0), (0, -1)];
    for _ in 0..k - 2 {
        let n = dirs.len();
        dirs = (0..n)
            .flat_map(|a| {
                let u = dirs[a];
                let v = dirs[(a + 1) % n];
                [u, (u.0 + v.0, u.1 + v.1)]
            })
            .collect();
    }
    Ok(dirs)
}

/// Length of the shortest obstacle-free path using `2^k` directions.
///
/// Works like a Stern-Brocot descent: each round picks the half-plane the
/// target lies in and peels off whole copies of the shorter vector.
pub fn h_2k(from: Point, to: Point, k: u32) -> f64 {
    let mut x = (from.row - to.row).abs() as i64;
    let mut y = (from.col - to.col).abs() as i64;
    let mut l = (1i64, 0i64);
    let mut r = (0i64, 1i64);
    for _ in 0..k.saturating_sub(2) {
        if x > y {
            r = (r.0 + l.0, r.1 + l.1);
            x -= y;
        } else {
            l = (l.0 + r.0, l.1 + r.1);
            y -= x;
        }
    }
    let norm = |v: (i64, i64)| ((v.0 * v.0 + v.1 * v.1) as f64).sqrt();
    x as f64 * norm(l) + y as f64 * norm(r)
}

/// A point touching a blocked or out-of-bounds cell. Canonical search may
/// turn freely there.
pub fn is_forced_point(grid: &Grid, p: Point) -> bool {
    [(-1, -1), (-1, 0), (0, -1), (0, 0)]
        .iter()
        .any(|&(di, dj)| grid.blocked(p.row + di, p.col + dj))
}

/// Whether `path` could have been produced by canonical 2^k search: every
/// step is a legal move along one of the directions, and turns sharper than
/// one direction step only happen at forced points.
pub fn is_canonical_path(grid: &Grid, path: &[Point], k: u32) -> Result<bool> {
    let dirs = directions(k)?;
    let n = dirs.len();
    let Some(&goal) = path.last() else {
        return Ok(true);
    };

    let mut previous: Option<usize> = None;
    for pair in path.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let delta = (to.row - from.row, to.col - from.col);
        let Some(d) = dirs.iter().position(|&v| v == delta) else {
            return Ok(false);
        };
        if !grid.move_is_correct(from, to) || !can_stop_at(grid, to, goal) {
            return Ok(false);
        }
        if let Some(m) = previous {
            let turn = (d + n - m) % n;
            let sharp = turn > 1 && turn < n - 1;
            if sharp && !is_forced_point(grid, from) {
                return Ok(false);
            }
        }
        previous = Some(d);
    }
    Ok(true)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoKSettings {
    pub k: u32,
    /// Restrict natural successors to the incoming direction and its two
    /// neighbors.
    pub canonical: bool,
    pub policy: DuplicatePolicy,
    pub budget: SearchBudget,
}

impl Default for TwoKSettings {
    fn default() -> Self {
        TwoKSettings {
            k: 4,
            canonical: false,
            policy: DuplicatePolicy::LazyRemoval,
            budget: SearchBudget::unlimited(),
        }
    }
}

/// A* restricted to `2^k` move directions.
#[derive(Debug, Clone, Default)]
pub struct TwoKAStar {
    pub settings: TwoKSettings,
}

impl TwoKAStar {
    pub fn new(settings: TwoKSettings) -> Self {
        TwoKAStar { settings }
    }

    pub fn canonical(k: u32) -> Self {
        TwoKAStar {
            settings: TwoKSettings {
                k,
                canonical: true,
                ..TwoKSettings::default()
            },
        }
    }
}

impl PathfindingAlgorithm for TwoKAStar {
    fn name(&self) -> &'static str {
        if self.settings.canonical {
            "canonical_2k"
        } else {
            "astar_2k"
        }
    }

    fn search(&self, grid: &Grid, start: Point, goal: Point) -> Result<SearchResult> {
        check_endpoints(grid, start, goal)?;
        let dirs = directions(self.settings.k)?;
        let lengths = dirs
            .iter()
            .map(|&(di, dj)| ((di * di + dj * dj) as f64).sqrt())
            .collect();
        let expander = TwoKExpander {
            grid,
            start,
            goal,
            k: self.settings.k,
            canonical: self.settings.canonical,
            dirs,
            lengths,
        };
        let engine =
            SearchEngine::new(expander, self.settings.policy).with_budget(self.settings.budget);
        Ok(engine.run(start, goal))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TwoKState {
    pub point: Point,
    /// Index of the move that reached `point`; `None` at the start.
    pub direction: Option<usize>,
}

struct TwoKExpander<'a> {
    grid: &'a Grid,
    start: Point,
    goal: Point,
    k: u32,
    canonical: bool,
    dirs: Vec<(i32, i32)>,
    lengths: Vec<f64>,
}

impl TwoKExpander<'_> {
    fn candidate_directions(&self, state: &TwoKState) -> Vec<usize> {
        let n = self.dirs.len();
        match state.direction {
            Some(m) if self.canonical && !is_forced_point(self.grid, state.point) => {
                vec![(m + n - 1) % n, m, (m + 1) % n]
            }
            _ => (0..n).collect(),
        }
    }
}

impl SuccessorGenerator for TwoKExpander<'_> {
    type State = TwoKState;
    type Key = (Point, Option<usize>);

    fn start_node(&mut self) -> Node<TwoKState> {
        let state = TwoKState {
            point: self.start,
            direction: None,
        };
        Node::new(state, 0.0, h_2k(self.start, self.goal, self.k), None)
    }

    fn key(&self, state: &TwoKState) -> (Point, Option<usize>) {
        if self.canonical {
            (state.point, state.direction)
        } else {
            (state.point, None)
        }
    }

    fn is_goal(&self, node: &Node<TwoKState>) -> bool {
        node.state.point == self.goal
    }

    fn anchor(&self, state: &TwoKState) -> Point {
        state.point
    }

    fn successors(
        &mut self,
        nodes: &[Node<TwoKState>],
        id: NodeId,
        out: &mut Vec<Node<TwoKState>>,
    ) {
        let current = nodes[id].state;
        for d in self.candidate_directions(&current) {
            let (di, dj) = self.dirs[d];
            let next = Point::new(current.point.row + di, current.point.col + dj);
            if !self.grid.move_is_correct(current.point, next)
                || !can_stop_at(self.grid, next, self.goal)
            {
                continue;
            }
            let g = nodes[id].g + self.lengths[d];
            let state = TwoKState {
                point: next,
                direction: Some(d),
            };
            out.push(Node::new(state, g, h_2k(next, self.goal, self.k), Some(id)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQRT2: f64 = std::f64::consts::SQRT_2;

    fn scenario_costs(settings: TwoKSettings) -> Vec<Option<f64>> {
        let cases: [(&str, (i32, i32), (i32, i32)); 5] = [
            ("....\n..#.\n.##.\n....", (3, 1), (1, 3)),
            ("..#.\n##.#\n#..#\n...#", (0, 4), (2, 2)),
            ("..#.\n#...\n...#\n.#..", (0, 0), (4, 0)),
            (".@@@\n.@@.\n....\n....", (2, 2), (2, 2)),
            ("@...\n@...\n@@..\n@@@@", (3, 4), (0, 2)),
        ];
        cases
            .iter()
            .map(|&(rows, start, goal)| {
                let grid = Grid::parse(rows).unwrap();
                let result = TwoKAStar::new(settings)
                    .search(&grid, start.into(), goal.into())
                    .unwrap();
                result.found.then_some(result.cost)
            })
            .collect()
    }

    fn assert_costs(actual: &[Option<f64>], expected: &[Option<f64>]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            match (a, e) {
                (Some(a), Some(e)) => assert!((a - e).abs() < 1e-9, "{a} != {e}"),
                (None, None) => {}
                _ => panic!("{actual:?} != {expected:?}"),
            }
        }
    }

    #[test]
    fn direction_sets() {
        assert_eq!(
            directions(3).unwrap(),
            vec![(1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1), (0, -1), (1, -1)]
        );
        let sixteen = directions(4).unwrap();
        assert_eq!(sixteen.len(), 16);
        assert_eq!(&sixteen[..4], &[(1, 0), (2, 1), (1, 1), (1, 2)]);
        assert_eq!(directions(6).unwrap().len(), 64);
        assert_eq!(directions(2).unwrap_err(), PlannerError::InvalidK { k: 2, max: MAX_K });
    }

    #[test]
    fn heuristic_matches_known_distances() {
        let origin = Point::new(0, 0);
        assert!((h_2k(origin, Point::new(3, 1), 3) - (2.0 + SQRT2)).abs() < 1e-12);
        assert!((h_2k(origin, Point::new(2, 1), 4) - 5f64.sqrt()).abs() < 1e-12);
        assert!((h_2k(origin, Point::new(0, 7), 5) - 7.0).abs() < 1e-12);
        assert!(h_2k(origin, Point::new(5, 3), 6) >= Point::new(5, 3).distance(&origin) - 1e-12);
    }

    #[test]
    fn plain_search_scenarios() {
        let k3 = TwoKSettings { k: 3, ..TwoKSettings::default() };
        assert_costs(
            &scenario_costs(k3),
            &[
                Some(2.0 + SQRT2),
                None,
                Some(2.0 + 2.0 * SQRT2),
                Some(0.0),
                Some(2.0 + 2.0 * SQRT2 - 1.0),
            ],
        );
        let k4 = TwoKSettings::default();
        assert_costs(
            &scenario_costs(k4),
            &[
                Some(2.0 + SQRT2),
                None,
                Some(4.650281539872885),
                Some(0.0),
                Some(SQRT2 + 5f64.sqrt()),
            ],
        );
        let k5 = TwoKSettings {
            k: 5,
            ..TwoKSettings::default()
        };
        assert_costs(
            &scenario_costs(k5),
            &[Some(2.0 + SQRT2), None, Some(4.650281539872885), Some(0.0), Some(3.605551275463989)],
        );
    }

    #[test]
    fn canonical_search_agrees_with_plain_search() {
        for k in 3..=5 {
            let plain = scenario_costs(TwoKSettings { k, ..TwoKSettings::default() });
            let canonical = scenario_costs(TwoKAStar::canonical(k).settings);
            assert_costs(&canonical, &plain);
        }
    }

    #[test]
    fn canonical_paths_turn_only_at_forced_points() {
        let grid = Grid::parse("......\n.##...\n...#..\n......").unwrap();
        let result = TwoKAStar::canonical(4)
            .search(&grid, Point::new(0, 0), Point::new(4, 6))
            .unwrap();
        assert!(result.found);
        assert!(is_canonical_path(&grid, &result.path, 4).unwrap());
    }

    #[test]
    fn detects_non_canonical_paths() {
        let grid = Grid::parse("....\n....\n....\n....").unwrap();
        let p = Point::new;
        // Straight east then a right angle in open space.
        let zigzag = [p(2, 0), p(2, 1), p(2, 2), p(1, 2)];
        assert!(!is_canonical_path(&grid, &zigzag, 3).unwrap());
        let gentle = [p(2, 0), p(2, 1), p(1, 2)];
        assert!(is_canonical_path(&grid, &gentle, 3).unwrap());
        // Not a k = 3 direction.
        assert!(!is_canonical_path(&grid, &[p(0, 0), p(1, 2)], 3).unwrap());
        assert!(is_canonical_path(&grid, &[p(1, 1)], 3).unwrap());
    }

    #[test]
    fn open_grid_cost_equals_heuristic() {
        let grid = Grid::new(6, 7).unwrap();
        let (start, goal) = (Point::new(1, 1), Point::new(6, 4));
        for k in 3..=5 {
            let result = TwoKAStar::canonical(k).search(&grid, start, goal).unwrap();
            assert!((result.cost - h_2k(start, goal, k)).abs() < 1e-9);
        }
    }
}
