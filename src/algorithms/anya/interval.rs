use std::fmt;

use crate::grid::{Grid, Point};
use crate::rational::Rational;

/// A horizontal run of points on one grid row, with exact endpoints.
///
/// Either end may be open: an open end belongs to a neighboring interval or
/// is a point that cannot be observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    pub row: i32,
    pub left: Rational,
    pub right: Rational,
    pub left_closed: bool,
    pub right_closed: bool,
}

impl Interval {
    pub fn new(
        row: i32,
        left: Rational,
        right: Rational,
        left_closed: bool,
        right_closed: bool,
    ) -> Self {
        Interval {
            row,
            left,
            right,
            left_closed,
            right_closed,
        }
    }

    pub fn closed(row: i32, left: Rational, right: Rational) -> Self {
        Self::new(row, left, right, true, true)
    }

    /// The degenerate interval holding a single point.
    pub fn point(p: Point) -> Self {
        let col = Rational::from(p.col);
        Self::closed(p.row, col, col)
    }

    /// Integer interval between two columns in either order, closed at both
    /// ends unless the caller opens `from`.
    pub(crate) fn spanning(row: i32, from: i32, to: i32, from_closed: bool) -> Self {
        let (lo, hi) = (from.min(to), from.max(to));
        let (left_closed, right_closed) = if from <= to {
            (from_closed, true)
        } else {
            (true, from_closed)
        };
        Self::new(row, lo.into(), hi.into(), left_closed, right_closed)
    }

    pub fn is_empty(&self) -> bool {
        self.left > self.right
            || (self.left == self.right && !(self.left_closed && self.right_closed))
    }

    pub fn contains(&self, p: Point) -> bool {
        if p.row != self.row {
            return false;
        }
        let x = Rational::from(p.col);
        if x < self.left || x > self.right {
            return false;
        }
        !(x == self.left && !self.left_closed) && !(x == self.right && !self.right_closed)
    }

    /// Cut at every corner point strictly inside the interval. Each cut point
    /// closes both pieces. Empty pieces are dropped.
    pub fn split_at_corners(self, grid: &Grid, out: &mut Vec<Interval>) {
        let mut left = self.left;
        let mut left_closed = self.left_closed;
        let first = self.left.floor() + 1;
        let last = self.right.ceil();
        for x in first..last {
            let col = x as i32;
            if !grid.is_corner_point(self.row, col) {
                continue;
            }
            let cut = Rational::from_int(x);
            let piece = Interval::new(self.row, left, cut, left_closed, true);
            if !piece.is_empty() {
                out.push(piece);
            }
            left = cut;
            left_closed = true;
        }
        let last_piece = Interval::new(self.row, left, self.right, left_closed, self.right_closed);
        if !last_piece.is_empty() {
            out.push(last_piece);
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}, {}{} @ row {}",
            if self.left_closed { '[' } else { '(' },
            self.left,
            self.right,
            if self.right_closed { ']' } else { ')' },
            self.row
        )
    }
}

/// Identity of an Anya search node in the closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntervalKey {
    pub row: i32,
    pub left: Rational,
    pub right: Rational,
    pub left_closed: bool,
    pub right_closed: bool,
    pub root: Point,
}

impl IntervalKey {
    pub fn new(interval: &Interval, root: Point) -> Self {
        IntervalKey {
            row: interval.row,
            left: interval.left,
            right: interval.right,
            left_closed: interval.left_closed,
            right_closed: interval.right_closed,
            root,
        }
    }
}
