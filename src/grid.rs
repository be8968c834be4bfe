use rand::Rng;
use std::fmt;
use std::str::FromStr;

use crate::error::{Dimension, PlannerError, Result};

/// A grid point: a corner shared by up to four cells.
///
/// Points range over `0..=height` rows and `0..=width` columns. Cell `(i, j)`
/// spans rows `i..i+1` and columns `j..j+1`, so its corners are the points
/// `(i, j)`, `(i, j+1)`, `(i+1, j)` and `(i+1, j+1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub row: i32,
    pub col: i32,
}

impl Point {
    pub const fn new(row: i32, col: i32) -> Self {
        Point { row, col }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        let dr = (self.row - other.row) as f64;
        let dc = (self.col - other.col) as f64;
        dr.hypot(dc)
    }
}

impl From<(i32, i32)> for Point {
    fn from((row, col): (i32, i32)) -> Self {
        Point { row, col }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Key used for closed sets and best-g maps of cell-based searches.
pub type GridKey = Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Wall,
    /// Trees in MovingAI maps; blocked like walls.
    Obstacle,
}

impl Cell {
    fn from_char(ch: char) -> Option<Cell> {
        match ch {
            '.' => Some(Cell::Empty),
            '@' | '#' => Some(Cell::Wall),
            'T' => Some(Cell::Obstacle),
            _ => None,
        }
    }

    fn to_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Wall => '#',
            Cell::Obstacle => 'T',
        }
    }

    pub fn is_blocked(self) -> bool {
        self != Cell::Empty
    }
}

/// Immutable obstacle bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Vec<Cell>>,
}

impl Grid {
    /// An obstacle-free grid.
    pub fn new(height: usize, width: usize) -> Result<Self> {
        if height == 0 || width == 0 {
            return Err(PlannerError::EmptyGrid);
        }
        Ok(Grid {
            width,
            height,
            cells: vec![vec![Cell::Empty; width]; height],
        })
    }

    /// Build a grid from rows of cells. Every row must have the same length.
    pub fn from_cells(cells: Vec<Vec<Cell>>) -> Result<Self> {
        let height = cells.len();
        let width = cells.first().map_or(0, Vec::len);
        if height == 0 || width == 0 {
            return Err(PlannerError::EmptyGrid);
        }
        if let Some(row) = cells.iter().find(|row| row.len() != width) {
            return Err(PlannerError::SizeMismatch {
                dimension: Dimension::Columns,
                expected: width,
                found: row.len(),
            });
        }
        Ok(Grid {
            width,
            height,
            cells,
        })
    }

    /// Parse newline-separated rows, inferring the size from the first row.
    pub fn parse(text: &str) -> Result<Self> {
        let rows = Self::parse_rows(text)?;
        Self::from_cells(rows)
    }

    /// Parse newline-separated rows and check them against a declared size.
    pub fn parse_with_size(text: &str, width: usize, height: usize) -> Result<Self> {
        let rows = Self::parse_rows(text)?;
        if rows.len() != height {
            return Err(PlannerError::SizeMismatch {
                dimension: Dimension::Rows,
                expected: height,
                found: rows.len(),
            });
        }
        if let Some(row) = rows.iter().find(|row| row.len() != width) {
            return Err(PlannerError::SizeMismatch {
                dimension: Dimension::Columns,
                expected: width,
                found: row.len(),
            });
        }
        Self::from_cells(rows)
    }

    fn parse_rows(text: &str) -> Result<Vec<Vec<Cell>>> {
        text.lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .enumerate()
            .map(|(row, line)| {
                line.chars()
                    .enumerate()
                    .map(|(col, ch)| {
                        Cell::from_char(ch).ok_or(PlannerError::UnknownCell { ch, row, col })
                    })
                    .collect()
            })
            .collect()
    }

    /// Scatter up to `num_walls` wall cells uniformly at random.
    pub fn random<R: Rng>(
        height: usize,
        width: usize,
        num_walls: usize,
        rng: &mut R,
    ) -> Result<Self> {
        let mut grid = Self::new(height, width)?;

        let mut walls_placed = 0;
        let mut attempts = 0;
        while walls_placed < num_walls && attempts < num_walls * 3 {
            let i = rng.gen_range(0..height);
            let j = rng.gen_range(0..width);
            if grid.cells[i][j] == Cell::Empty {
                grid.cells[i][j] = Cell::Wall;
                walls_placed += 1;
            }
            attempts += 1;
        }

        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell at `(i, j)`, `None` outside the grid.
    pub fn cell(&self, i: i32, j: i32) -> Option<Cell> {
        if self.in_bounds_cell(i, j) {
            Some(self.cells[i as usize][j as usize])
        } else {
            None
        }
    }

    pub fn in_bounds_cell(&self, i: i32, j: i32) -> bool {
        i >= 0 && j >= 0 && (i as usize) < self.height && (j as usize) < self.width
    }

    pub fn in_bounds_point(&self, i: i32, j: i32) -> bool {
        i >= 0 && j >= 0 && (i as usize) <= self.height && (j as usize) <= self.width
    }

    pub fn contains(&self, p: Point) -> bool {
        self.in_bounds_point(p.row, p.col)
    }

    /// Free cell inside the grid. Everything outside counts as blocked.
    pub fn traversable(&self, i: i32, j: i32) -> bool {
        matches!(self.cell(i, j), Some(Cell::Empty))
    }

    pub fn blocked(&self, i: i32, j: i32) -> bool {
        !self.traversable(i, j)
    }

    /// Exactly one of the four cells around an interior point is blocked.
    pub fn is_corner_point(&self, i: i32, j: i32) -> bool {
        if i < 1 || j < 1 || i as usize >= self.height || j as usize >= self.width {
            return false;
        }
        let blocked = [(i - 1, j - 1), (i - 1, j), (i, j - 1), (i, j)]
            .iter()
            .filter(|&&(a, b)| self.blocked(a, b))
            .count();
        blocked == 1
    }

    /// The point sits between two diagonally touching blocked cells.
    pub fn is_between_obstacles(&self, i: i32, j: i32) -> bool {
        (self.blocked(i, j) && self.blocked(i - 1, j - 1))
            || (self.blocked(i, j - 1) && self.blocked(i - 1, j))
    }

    /// A path may pass through or stop at this point without cutting a
    /// diagonal squeeze.
    pub fn passable_point(&self, i: i32, j: i32) -> bool {
        !self.is_between_obstacles(i, j)
    }

    /// Quadrant of the single blocked cell around a corner point, as
    /// `(row side, column side)` with `-1` meaning above or left.
    pub fn blocked_quadrant(&self, i: i32, j: i32) -> Option<(i32, i32)> {
        [(-1, -1), (-1, 1), (1, -1), (1, 1)]
            .into_iter()
            .find(|&(qi, qj)| {
                let ci = if qi < 0 { i - 1 } else { i };
                let cj = if qj < 0 { j - 1 } else { j };
                self.blocked(ci, cj)
            })
    }

    /// Iterate every grid point, row-major.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        (0..=self.height as i32)
            .flat_map(move |i| (0..=self.width as i32).map(move |j| Point::new(i, j)))
    }

    /// Mirror top to bottom. Point `(i, j)` maps to `(height - i, j)`.
    pub fn flipped_rows(&self) -> Grid {
        let mut cells = self.cells.clone();
        cells.reverse();
        Grid { cells, ..*self }
    }

    /// Mirror left to right. Point `(i, j)` maps to `(i, width - j)`.
    pub fn flipped_cols(&self) -> Grid {
        let cells = self
            .cells
            .iter()
            .map(|row| row.iter().rev().copied().collect())
            .collect();
        Grid { cells, ..*self }
    }

    /// Swap rows and columns. Point `(i, j)` maps to `(j, i)`.
    pub fn transposed(&self) -> Grid {
        let cells = (0..self.width)
            .map(|j| (0..self.height).map(|i| self.cells[i][j]).collect())
            .collect();
        Grid {
            width: self.height,
            height: self.width,
            cells,
        }
    }

    pub fn num_blocked(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| cell.is_blocked())
            .count()
    }
}

impl FromStr for Grid {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        Grid::parse(s)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            let line: String = row.iter().map(|cell| cell.to_char()).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
