//! # Wall Lines
//!
//! Straight wall runs extracted from a finished grid, for renderers that
//! draw walls as line segments instead of cells.
//!
//! Coordinates are doubled so that a door can split a run half a cell
//! either side of it: a horizontal line at grid row `y` has `u = 2y`, and
//! its ends are `2x` of the cells where it starts and stops.

use super::{Cell, Grid, WallMask};
use crate::Position;
use log::warn;
use serde::{Deserialize, Serialize};

/// One straight wall run in doubled coordinates.
///
/// For horizontal lines `u` is the doubled row and `v1..=v2` the doubled
/// columns; vertical lines swap the roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallLine {
    pub u: u32,
    pub v1: u32,
    pub v2: u32,
}

/// Collects runs along one row or column.
struct RunTracer {
    u: u32,
    open: Option<u32>,
    lines: Vec<WallLine>,
}

impl RunTracer {
    fn new(u: u32) -> Self {
        Self {
            u,
            open: None,
            lines: Vec::new(),
        }
    }

    /// Feeds the cell at doubled offset `v`. `axis` selects the two wall
    /// bits along the run; `start` is the bit that opens one.
    fn visit(&mut self, v: u32, cell: Cell, axis: WallMask, start: WallMask) {
        match cell {
            Cell::Wall(mask) => {
                let along = mask & axis;
                if along == start {
                    self.open = Some(v);
                } else if along == axis.difference(start) {
                    match self.open.take() {
                        Some(v1) => self.lines.push(WallLine { u: self.u, v1, v2: v }),
                        None => warn!("wall line ends at {} on {} without a start", v, self.u),
                    }
                }
            }
            Cell::Door => {
                if let Some(v1) = self.open {
                    self.lines.push(WallLine { u: self.u, v1, v2: v - 1 });
                    self.open = Some(v + 1);
                }
            }
            Cell::Unused | Cell::Floor => {}
        }
    }

    fn finish(self) -> Vec<WallLine> {
        if let Some(v1) = self.open {
            warn!("unclosed wall line on {} from {}", self.u, v1);
        }
        self.lines
    }
}

/// Horizontal wall runs, top to bottom, each row left to right.
///
/// A run opens at a wall joining only east and closes at one joining only
/// west; doors split it.
pub fn horizontal_lines(grid: &Grid) -> Vec<WallLine> {
    let mut lines = Vec::new();
    for y in 0..grid.height() {
        let mut tracer = RunTracer::new(y * 2);
        for x in 0..grid.width() {
            let cell = grid.cell_or_unused(Position::new(x as i32, y as i32));
            tracer.visit(x * 2, cell, WallMask::HORIZONTAL, WallMask::EAST);
        }
        lines.extend(tracer.finish());
    }
    lines
}

/// Vertical wall runs, left to right, each column top to bottom.
pub fn vertical_lines(grid: &Grid) -> Vec<WallLine> {
    let mut lines = Vec::new();
    for x in 0..grid.width() {
        let mut tracer = RunTracer::new(x * 2);
        for y in 0..grid.height() {
            let cell = grid.cell_or_unused(Position::new(x as i32, y as i32));
            tracer.visit(y * 2, cell, WallMask::VERTICAL, WallMask::SOUTH);
        }
        lines.extend(tracer.finish());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rect;

    #[test]
    fn test_single_room_lines() {
        let mut grid = Grid::new(10, 10);
        grid.paint_feature(&Rect::new(2, 2, 5, 4));

        let h = horizontal_lines(&grid);
        assert_eq!(
            h,
            vec![WallLine { u: 2, v1: 2, v2: 10 }, WallLine { u: 8, v1: 2, v2: 10 }]
        );
        let v = vertical_lines(&grid);
        assert_eq!(
            v,
            vec![WallLine { u: 2, v1: 2, v2: 8 }, WallLine { u: 10, v1: 2, v2: 8 }]
        );
    }

    #[test]
    fn test_door_splits_line() {
        let mut grid = Grid::new(10, 10);
        grid.paint_feature(&Rect::new(2, 2, 6, 4));
        grid.set(Position::new(3, 1), Cell::Door);

        let top: Vec<WallLine> = horizontal_lines(&grid).into_iter().filter(|l| l.u == 2).collect();
        assert_eq!(
            top,
            vec![WallLine { u: 2, v1: 2, v2: 5 }, WallLine { u: 2, v1: 7, v2: 12 }]
        );
    }

    #[test]
    fn test_shared_wall_is_one_vertical_line() {
        let mut grid = Grid::new(14, 8);
        grid.paint_feature(&Rect::new(1, 1, 4, 4));
        grid.paint_feature(&Rect::new(5, 1, 8, 4));

        let v = vertical_lines(&grid);
        assert_eq!(v.len(), 3);
        assert_eq!(v[1], WallLine { u: 8, v1: 0, v2: 8 });

        // the top row runs straight across both rooms
        let h = horizontal_lines(&grid);
        assert_eq!(h[0], WallLine { u: 0, v1: 0, v2: 16 });
    }

    #[test]
    fn test_empty_grid_has_no_lines() {
        let grid = Grid::new(6, 6);
        assert!(horizontal_lines(&grid).is_empty());
        assert!(vertical_lines(&grid).is_empty());
    }
}
