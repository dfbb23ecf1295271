//! The [`Grid`] type: a fixed 2D array of [`Cell`]s with 4-way adjacency.
//!
//! Cell identity and topology are built first ([`Grid::new`]); walls are laid
//! down afterwards by a separate pass, so tests can describe deterministic
//! layouts with [`Grid::from_rows`] or [`Grid::set_wall`].

use std::fmt;

use crate::cell::Cell;
use crate::geom::{Point, Range};

/// Upper bound on the number of neighbours a cell can have.
const MAX_NEIGHBOURS: usize = 4;

// ---------------------------------------------------------------------------
// Adjacency
// ---------------------------------------------------------------------------

/// Neighbour indices of one cell, in linking order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
struct Adjacency {
    idx: [usize; MAX_NEIGHBOURS],
    len: u8,
}

impl Adjacency {
    #[inline]
    fn as_slice(&self) -> &[usize] {
        &self.idx[..self.len as usize]
    }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// A `cols × rows` grid of search cells.
///
/// Cells are stored row-major. Each cell's neighbour set is computed once
/// when the grid is created and never changes.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    cells: Vec<Cell>,
    adjacency: Vec<Adjacency>,
    bounds: Range,
}

impl Grid {
    /// Create a fully linked grid with every cell passable.
    pub fn new(cols: i32, rows: i32) -> Self {
        let bounds = Range::new(0, 0, cols.max(0), rows.max(0));
        let cells: Vec<Cell> = bounds.iter().map(Cell::new).collect();
        let mut grid = Self {
            cells,
            adjacency: Vec::new(),
            bounds,
        };
        grid.link();
        grid
    }

    /// Build a grid from text rows: `#` is a wall, anything else is passable.
    ///
    /// Rows shorter than the longest one are padded with passable cells.
    pub fn from_rows(rows: &[&str]) -> Self {
        let cols = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut grid = Self::new(cols as i32, rows.len() as i32);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if ch == '#' {
                    grid.set_wall(Point::new(x as i32, y as i32), true);
                }
            }
        }
        grid
    }

    /// Compute every cell's neighbour set. Called once, after all cells exist.
    fn link(&mut self) {
        let adjacency = self
            .bounds
            .iter()
            .map(|p| {
                let mut adj = Adjacency::default();
                for n in p.neighbors_4() {
                    if let Some(ni) = self.idx(n) {
                        adj.idx[adj.len as usize] = ni;
                        adj.len += 1;
                    }
                }
                adj
            })
            .collect();
        self.adjacency = adjacency;
    }

    /// The bounding range of the grid.
    #[inline]
    pub fn bounds(&self) -> Range {
        self.bounds
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> i32 {
        self.bounds.width()
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> i32 {
        self.bounds.height()
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the grid has no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether `p` is inside the grid.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        self.bounds.contains(p)
    }

    // -----------------------------------------------------------------------
    // Coordinate helpers
    // -----------------------------------------------------------------------

    /// Convert a `Point` to a flat index. Returns `None` if out of bounds.
    #[inline]
    pub fn idx(&self, p: Point) -> Option<usize> {
        if !self.bounds.contains(p) {
            return None;
        }
        Some(p.y as usize * self.cols() as usize + p.x as usize)
    }

    /// Convert a flat index back to a `Point`.
    #[inline]
    pub fn point(&self, idx: usize) -> Point {
        self.cells[idx].pos()
    }

    // -----------------------------------------------------------------------
    // Cell access
    // -----------------------------------------------------------------------

    /// The cell at `p`, if inside the grid.
    #[inline]
    pub fn at(&self, p: Point) -> Option<&Cell> {
        self.idx(p).map(|i| &self.cells[i])
    }

    /// The cell at flat index `idx`.
    #[inline]
    pub fn cell(&self, idx: usize) -> &Cell {
        &self.cells[idx]
    }

    /// Mutable access to the cell at flat index `idx`.
    #[inline]
    pub fn cell_mut(&mut self, idx: usize) -> &mut Cell {
        &mut self.cells[idx]
    }

    /// Whether `p` is a wall. Points outside the grid are not walls; they
    /// simply do not exist.
    #[inline]
    pub fn is_wall(&self, p: Point) -> bool {
        self.at(p).is_some_and(|c| c.wall)
    }

    /// Set or clear the wall flag at `p`. No-op if `p` is outside the grid.
    pub fn set_wall(&mut self, p: Point, wall: bool) {
        if let Some(i) = self.idx(p) {
            self.cells[i].wall = wall;
        }
    }

    /// Number of wall cells.
    pub fn count_walls(&self) -> usize {
        self.cells.iter().filter(|c| c.wall).count()
    }

    /// Neighbour indices of the cell at `idx`, in linking order.
    #[inline]
    pub fn neighbours(&self, idx: usize) -> &[usize] {
        self.adjacency[idx].as_slice()
    }

    /// The up-to-4 axis-adjacent points of `p` that lie inside the grid.
    pub fn neighbours_of(&self, p: Point) -> impl Iterator<Item = Point> + '_ {
        let adj = self.idx(p).map(|i| self.neighbours(i)).unwrap_or(&[]);
        adj.iter().map(move |&i| self.point(i))
    }

    /// Row-major iterator over all cells.
    pub fn iter(&self) -> std::slice::Iter<'_, Cell> {
        self.cells.iter()
    }
}

impl fmt::Display for Grid {
    /// Draws walls as `#` and passable cells as `.`, one line per row.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.cols().max(1) as usize) {
            for c in row {
                f.write_str(if c.wall { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
