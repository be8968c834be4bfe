//! Exact line-of-sight geometry on grid points.
//!
//! Every query here uses integer arithmetic only. Segments are rasterised by
//! reflecting them into the first octant, so the same code walks all eight
//! directions and `visible(a, b) == visible(b, a)` holds exactly.

use crate::grid::{Grid, Point};

pub fn gcd(mut a: i32, mut b: i32) -> i32 {
    a = a.abs();
    b = b.abs();
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Cells whose interior the segment `from -> to` crosses.
///
/// The segment must not be axis-aligned. Cells only touched at a corner are
/// not included. The result is sorted and free of duplicates.
pub fn intersect_cells(from: Point, to: Point) -> Vec<(i32, i32)> {
    let di = to.row - from.row;
    let dj = to.col - from.col;
    debug_assert!(di != 0 && dj != 0, "axis-aligned segment {from} -> {to}");

    let g = gcd(di, dj);
    let (si, sj) = (di.signum(), dj.signum());
    let (step_i, step_j) = (di / g, dj / g);
    let transposed = step_j.abs() > step_i.abs();
    let (n, m) = if transposed {
        (step_j.abs(), step_i.abs())
    } else {
        (step_i.abs(), step_j.abs())
    };
    // A cell spanning [x, x+1] in a mirrored axis starts one unit lower.
    let shift_i = if si < 0 { -1 } else { 0 };
    let shift_j = if sj < 0 { -1 } else { 0 };

    let mut cells = Vec::with_capacity((2 * n * g) as usize);
    for k in 0..g {
        let base_i = from.row + k * step_i;
        let base_j = from.col + k * step_j;
        let mut push = |x: i32, y: i32| {
            let (oi, oj) = if transposed { (y, x) } else { (x, y) };
            cells.push((base_i + si * oi + shift_i, base_j + sj * oj + shift_j));
        };
        for x in 0..n {
            let y = x * m / n;
            push(x, y);
            if y * n != x * m && x > 0 {
                push(x - 1, y);
            }
        }
    }
    cells.sort_unstable();
    cells.dedup();
    cells
}

/// Lattice points strictly between `from` and `to`.
pub fn intersect_points(from: Point, to: Point) -> Vec<Point> {
    let di = to.row - from.row;
    let dj = to.col - from.col;
    let g = gcd(di, dj);
    if g <= 1 {
        return Vec::new();
    }
    (1..g)
        .map(|k| Point::new(from.row + k * di / g, from.col + k * dj / g))
        .collect()
}

fn cross(o: Point, a: Point, b: (i32, i32)) -> i64 {
    let (ax, ay) = ((a.row - o.row) as i64, (a.col - o.col) as i64);
    let (bx, by) = ((b.0 - o.row) as i64, (b.1 - o.col) as i64);
    ax * by - ay * bx
}

impl Grid {
    /// Straight segment between two points crosses no blocked cell and
    /// passes through no diagonal squeeze.
    pub fn visible(&self, from: Point, to: Point) -> bool {
        if !self.contains(from) || !self.contains(to) {
            return false;
        }
        if from == to {
            return true;
        }
        if from.row == to.row || from.col == to.col {
            return self.visible_axes(from, to);
        }
        intersect_cells(from, to)
            .iter()
            .all(|&(i, j)| self.traversable(i, j))
            && intersect_points(from, to)
                .iter()
                .all(|p| self.passable_point(p.row, p.col))
    }

    /// Line of sight along a row or a column. Each unit edge needs a free
    /// cell on at least one side.
    pub fn visible_axes(&self, from: Point, to: Point) -> bool {
        debug_assert!(
            from.row == to.row || from.col == to.col,
            "visible_axes called with {from} -> {to}"
        );
        if from.row == to.row {
            let r = from.row;
            let (lo, hi) = (from.col.min(to.col), from.col.max(to.col));
            (lo..hi).all(|j| self.traversable(r - 1, j) || self.traversable(r, j))
                && (lo + 1..hi).all(|j| self.passable_point(r, j))
        } else {
            let c = from.col;
            let (lo, hi) = (from.row.min(to.row), from.row.max(to.row));
            (lo..hi).all(|i| self.traversable(i, c - 1) || self.traversable(i, c))
                && (lo + 1..hi).all(|i| self.passable_point(i, c))
        }
    }

    /// Legality of a single bounded-angle move.
    ///
    /// Axis-aligned moves need a free cell beside every edge they follow.
    /// Any other move is blocked by a blocked cell whose corners lie on both
    /// sides of the move's line; cells merely touched at a corner do not block.
    pub fn move_is_correct(&self, from: Point, to: Point) -> bool {
        if !self.contains(from) || !self.contains(to) {
            return false;
        }
        if from.row == to.row || from.col == to.col {
            return self.visible_axes(from, to);
        }
        let (i_lo, i_hi) = (from.row.min(to.row), from.row.max(to.row));
        let (j_lo, j_hi) = (from.col.min(to.col), from.col.max(to.col));
        for i in i_lo..i_hi {
            for j in j_lo..j_hi {
                if self.traversable(i, j) {
                    continue;
                }
                let corners = [(i, j), (i + 1, j), (i, j + 1), (i + 1, j + 1)];
                let mut positive = false;
                let mut negative = false;
                for corner in corners {
                    let c = cross(from, to, corner);
                    positive |= c > 0;
                    negative |= c < 0;
                }
                if positive && negative {
                    return false;
                }
            }
        }
        true
    }
}
