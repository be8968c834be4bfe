use crate::error::{PlannerError, Result};
use crate::grid::{Grid, Point};
use crate::search::SearchResult;

pub trait PathfindingAlgorithm {
    fn name(&self) -> &'static str;

    /// Find a path between two grid points.
    ///
    /// `Err` is reserved for configuration problems; an unreachable goal is a
    /// normal result with `found == false`.
    fn search(&self, grid: &Grid, start: Point, goal: Point) -> Result<SearchResult>;
}

pub fn check_endpoints(grid: &Grid, start: Point, goal: Point) -> Result<()> {
    if !grid.contains(start) {
        return Err(PlannerError::OutOfBounds {
            which: "start",
            point: start,
        });
    }
    if !grid.contains(goal) {
        return Err(PlannerError::OutOfBounds {
            which: "goal",
            point: goal,
        });
    }
    Ok(())
}

/// A path may end a segment at `p`: it is passable, or it is the goal.
pub fn can_stop_at(grid: &Grid, p: Point, goal: Point) -> bool {
    p == goal || grid.passable_point(p.row, p.col)
}

/// Neighbor offsets for cell-based any-angle searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Neighborhood {
    Four,
    #[default]
    Eight,
    /// Eight plus the knight moves.
    Sixteen,
}

const OFFSETS_16: [(i32, i32); 16] = [
    (-1, 0),
    (0, 1),
    (1, 0),
    (0, -1),
    (-1, -1),
    (-1, 1),
    (1, 1),
    (1, -1),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
];

impl Neighborhood {
    pub fn offsets(&self) -> &'static [(i32, i32)] {
        match self {
            Neighborhood::Four => &OFFSETS_16[..4],
            Neighborhood::Eight => &OFFSETS_16[..8],
            Neighborhood::Sixteen => &OFFSETS_16,
        }
    }
}

impl TryFrom<usize> for Neighborhood {
    type Error = PlannerError;

    fn try_from(size: usize) -> Result<Self> {
        match size {
            4 => Ok(Neighborhood::Four),
            8 => Ok(Neighborhood::Eight),
            16 => Ok(Neighborhood::Sixteen),
            other => Err(PlannerError::InvalidNeighborhood(other)),
        }
    }
}

/// Heuristics for the Theta* family.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Heuristic {
    #[default]
    Euclidean,
    /// `(1 - wh) * |point goal| + wh * (g(parent) + |parent goal|)` for a
    /// factor `wh` in `[0, 1]`. The second term estimates the whole path
    /// through the parent, so the blend is not admissible for `wh > 0`.
    ParentBlend(f64),
}

impl Heuristic {
    /// Estimate for `point` whose parent is `parent` with cost `parent_g`.
    pub fn estimate(&self, point: Point, parent: Point, parent_g: f64, goal: Point) -> f64 {
        let direct = point.distance(&goal);
        match *self {
            Heuristic::Euclidean => direct,
            Heuristic::ParentBlend(wh) => {
                let through_parent = (parent_g + parent.distance(&goal)).max(0.0);
                (1.0 - wh) * direct + wh * through_parent
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighborhood_sizes() {
        assert_eq!(Neighborhood::Four.offsets().len(), 4);
        assert_eq!(Neighborhood::Eight.offsets().len(), 8);
        assert_eq!(Neighborhood::Sixteen.offsets().len(), 16);
        assert_eq!(Neighborhood::try_from(16).unwrap(), Neighborhood::Sixteen);
        assert_eq!(
            Neighborhood::try_from(6).unwrap_err(),
            PlannerError::InvalidNeighborhood(6)
        );
    }

    #[test]
    fn endpoints_must_be_grid_points() {
        let grid = Grid::parse("..\n..").unwrap();
        assert!(check_endpoints(&grid, Point::new(0, 0), Point::new(2, 2)).is_ok());
        assert!(matches!(
            check_endpoints(&grid, Point::new(0, 0), Point::new(3, 0)),
            Err(PlannerError::OutOfBounds { which: "goal", .. })
        ));
    }

    #[test]
    fn parent_blend_mixes_in_the_path_through_the_parent() {
        let goal = Point::new(0, 5);
        let (point, parent) = (Point::new(0, 1), Point::new(0, 0));
        let blended = Heuristic::ParentBlend(0.1).estimate(point, parent, 0.0, goal);
        assert!((blended - 4.1).abs() < 1e-12, "{blended}");

        let (point, parent) = (Point::new(3, 4), Point::new(3, 0));
        let blended = Heuristic::ParentBlend(0.5).estimate(point, parent, 2.0, goal);
        let expected = 0.5 * 10f64.sqrt() + 0.5 * (2.0 + 34f64.sqrt());
        assert!((blended - expected).abs() < 1e-12);

        let (point, parent) = (Point::new(0, 1), Point::new(0, 0));
        assert_eq!(Heuristic::ParentBlend(0.0).estimate(point, parent, 7.0, goal), 4.0);
        assert_eq!(Heuristic::Euclidean.estimate(point, parent, 7.0, goal), 4.0);
    }
}
