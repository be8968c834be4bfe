use crate::algorithms::common::{can_stop_at, check_endpoints, PathfindingAlgorithm};
use crate::error::Result;
use crate::grid::{Grid, Point};
use crate::search::SearchResult;
use crate::statistics::Stats;
use crate::visibility::gcd;
use log::debug;
use num_traits::Zero;
use pathfinding::prelude::astar;
use std::cmp::Ordering;
use std::ops::Add;
use std::time::Instant;

/// Path length usable as an `astar` cost. Lengths are never NaN, so the
/// total order of `f64` is the numeric one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length(pub f64);

impl Eq for Length {}

impl Ord for Length {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for Length {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add for Length {
    type Output = Length;

    fn add(self, other: Length) -> Length {
        Length(self.0 + other.0)
    }
}

impl Zero for Length {
    fn zero() -> Self {
        Length(0.0)
    }

    fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

/// A* over the full visibility graph of grid points.
///
/// Every point links to every visible point in a primitive direction, so
/// the result is the exact any-angle optimum. Far too slow for real maps;
/// used as the reference in tests and comparisons.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisibilityGraph;

impl VisibilityGraph {
    pub fn new() -> Self {
        VisibilityGraph
    }

    fn neighbors(grid: &Grid, p: Point, goal: Point) -> Vec<(Point, Length)> {
        grid.points()
            .filter(|&q| {
                q != p
                    && gcd(q.row - p.row, q.col - p.col) == 1
                    && can_stop_at(grid, q, goal)
                    && grid.visible(p, q)
            })
            .map(|q| (q, Length(p.distance(&q))))
            .collect()
    }
}

impl PathfindingAlgorithm for VisibilityGraph {
    fn name(&self) -> &'static str {
        "visibility_graph"
    }

    fn search(&self, grid: &Grid, start: Point, goal: Point) -> Result<SearchResult> {
        check_endpoints(grid, start, goal)?;
        let started = Instant::now();
        if start == goal {
            return Ok(SearchResult::trivial(start));
        }

        let mut stats = Stats::new();
        let result = astar(
            &start,
            |p| {
                stats.expansions += 1;
                Self::neighbors(grid, *p, goal)
            },
            |p| Length(p.distance(&goal)),
            |p| *p == goal,
        );
        stats.runtime = started.elapsed();

        let Some((path, Length(cost))) = result else {
            debug!("visibility graph: no path {} -> {}", start, goal);
            return Ok(SearchResult::not_found(stats));
        };
        stats.found = true;
        stats.way_length = cost;
        debug!(
            "visibility graph: {} -> {} costs {:.4} after {} expansions",
            start, goal, cost, stats.expansions
        );
        Ok(SearchResult {
            found: true,
            path,
            cost,
            stats,
        })
    }
}
