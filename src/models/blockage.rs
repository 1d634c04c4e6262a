//! Time-bounded road closures.

use serde::{Deserialize, Serialize};

use super::{Position, Time};

/// An integer grid cell.
pub type Cell = (i64, i64);

/// A closed polyline on the street grid, valid during `[start, end)`.
///
/// Each segment closes every unit street it covers and every cell strictly
/// between its two vertices, so the line can be neither followed nor
/// crossed. Vertices stay passable. Only axis-aligned segments between
/// integer vertices close anything; the city grid has no diagonal streets.
///
/// # Examples
///
/// ```
/// use glp_routing::models::{Blockage, Position, Time};
///
/// let start = Time::from_ymd_hm(2025, 1, 1, 0, 0).unwrap();
/// let b = Blockage::new(1, start, start.add_minutes(120))
///     .with_vertices(vec![Position::new(2.0, 0.0), Position::new(2.0, 3.0)]);
/// assert!(b.blocks_segment(Position::new(2.0, 1.0), Position::new(2.0, 2.0)));
/// assert!(!b.blocks_segment(Position::new(1.0, 0.0), Position::new(2.0, 0.0)));
/// assert!(b.closes_cell((2, 1)));
/// assert!(!b.closes_cell((2, 0)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blockage {
    id: u32,
    start: Time,
    end: Time,
    vertices: Vec<Position>,
}

impl Blockage {
    pub fn new(id: u32, start: Time, end: Time) -> Self {
        Self {
            id,
            start,
            end,
            vertices: Vec::new(),
        }
    }

    pub fn with_vertices(mut self, vertices: Vec<Position>) -> Self {
        self.vertices = vertices;
        self
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn start(&self) -> Time {
        self.start
    }

    pub fn end(&self) -> Time {
        self.end
    }

    pub fn vertices(&self) -> &[Position] {
        &self.vertices
    }

    /// Returns `true` if the closure overlaps the window `[from, to)`.
    pub fn is_active_during(&self, from: Time, to: Time) -> bool {
        self.start < to && self.end > from
    }

    /// Axis-aligned integer segments of the polyline as cell pairs.
    fn segments(&self) -> impl Iterator<Item = (Cell, Cell)> + '_ {
        self.vertices.windows(2).filter_map(|pair| {
            let (a, b) = (pair[0], pair[1]);
            if !a.is_integer() || !b.is_integer() || (a.x != b.x && a.y != b.y) {
                return None;
            }
            Some(((a.x as i64, a.y as i64), (b.x as i64, b.y as i64)))
        })
    }

    /// Unit street edges closed by this blockage, each as an ordered cell pair.
    pub fn closed_edges(&self) -> Vec<(Cell, Cell)> {
        let mut edges = Vec::new();
        for ((ax, ay), (bx, by)) in self.segments() {
            if ax == bx {
                for y in ay.min(by)..ay.max(by) {
                    edges.push(((ax, y), (ax, y + 1)));
                }
            } else {
                for x in ax.min(bx)..ax.max(bx) {
                    edges.push(((x, ay), (x + 1, ay)));
                }
            }
        }
        edges
    }

    /// Cells lying strictly inside a segment of the polyline.
    pub fn closed_cells(&self) -> Vec<Cell> {
        let mut cells = Vec::new();
        for ((ax, ay), (bx, by)) in self.segments() {
            if ax == bx {
                cells.extend((ay.min(by) + 1..ay.max(by)).map(|y| (ax, y)));
            } else {
                cells.extend((ax.min(bx) + 1..ax.max(bx)).map(|x| (x, ay)));
            }
        }
        cells
    }

    /// Returns `true` if `cell` sits inside the line, away from its vertices.
    pub fn closes_cell(&self, cell: Cell) -> bool {
        self.closed_cells().contains(&cell)
    }

    /// Returns `true` if the unit street between two adjacent cells is closed,
    /// either because it runs along the line or because it enters the line.
    pub fn blocks_segment(&self, a: Position, b: Position) -> bool {
        if !a.is_integer() || !b.is_integer() || a.manhattan_to(b) != 1.0 {
            return false;
        }
        let ca = (a.x as i64, a.y as i64);
        let cb = (b.x as i64, b.y as i64);
        let edge = if ca <= cb { (ca, cb) } else { (cb, ca) };
        self.closes_cell(ca) || self.closes_cell(cb) || self.closed_edges().contains(&edge)
    }
}
