//! # Grid
//!
//! The scratch cell buffer a generation attempt paints into.

use super::Rect;
use crate::Position;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Which neighbours a wall segment joins with.
    ///
    /// A horizontal wall is `EAST | WEST`, a top-left corner `SOUTH | EAST`;
    /// walls shared by two features carry the union of both.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct WallMask: u8 {
        const NORTH = 1;
        const EAST = 2;
        const SOUTH = 4;
        const WEST = 8;
    }
}

impl WallMask {
    pub const HORIZONTAL: WallMask = WallMask::EAST.union(WallMask::WEST);
    pub const VERTICAL: WallMask = WallMask::NORTH.union(WallMask::SOUTH);

    /// A plain straight segment, the only wall a corridor may run into.
    pub fn is_straight(self) -> bool {
        self == Self::HORIZONTAL || self == Self::VERTICAL
    }
}

/// Contents of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Unused,
    Floor,
    Door,
    Wall(WallMask),
}

impl Cell {
    pub fn is_unused(self) -> bool {
        self == Cell::Unused
    }

    pub fn is_floor(self) -> bool {
        self == Cell::Floor
    }

    /// The wall bits, if this is a wall.
    pub fn wall(self) -> Option<WallMask> {
        match self {
            Cell::Wall(mask) => Some(mask),
            _ => None,
        }
    }
}

/// Fixed-size 2D cell buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates a grid with every cell [`Cell::Unused`].
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Unused; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Clears every cell back to [`Cell::Unused`].
    pub fn reset(&mut self) {
        self.cells.fill(Cell::Unused);
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.y as usize * self.width as usize + pos.x as usize)
    }

    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Like [`Grid::get`], with everything off the grid reading as unused.
    pub fn cell_or_unused(&self, pos: Position) -> Cell {
        self.get(pos).unwrap_or(Cell::Unused)
    }

    /// Writes a cell; writes off the grid are ignored.
    pub fn set(&mut self, pos: Position, cell: Cell) {
        if let Some(i) = self.index(pos) {
            self.cells[i] = cell;
        }
    }

    /// Joins wall bits into a cell. Floor and doors are left alone.
    pub fn merge_wall(&mut self, pos: Position, mask: WallMask) {
        if let Some(i) = self.index(pos) {
            self.cells[i] = match self.cells[i] {
                Cell::Unused => Cell::Wall(mask),
                Cell::Wall(existing) => Cell::Wall(existing | mask),
                other => other,
            };
        }
    }

    /// True when every cell of `rect` exists and is unused.
    pub fn is_unused_area(&self, rect: &Rect) -> bool {
        rect.positions()
            .all(|pos| self.get(pos).is_some_and(Cell::is_unused))
    }

    /// Iterates `(position, cell)` row by row.
    pub fn iter(&self) -> impl Iterator<Item = (Position, Cell)> + '_ {
        let width = self.width as usize;
        self.cells.iter().enumerate().map(move |(i, &cell)| {
            (Position::new((i % width) as i32, (i / width) as i32), cell)
        })
    }

    /// Paints a feature: floor over `rect` and walls on its border ring.
    ///
    /// The caller has already checked that `rect` is unused; border cells may
    /// already hold walls of neighbouring features and are merged.
    pub fn paint_feature(&mut self, rect: &Rect) {
        let outer = rect.outer();
        let (left, top, right, bottom) = (outer.x1, outer.y1, rect.x2, rect.y2);

        self.merge_wall(Position::new(left, top), WallMask::SOUTH | WallMask::EAST);
        self.merge_wall(Position::new(right, top), WallMask::SOUTH | WallMask::WEST);
        self.merge_wall(Position::new(left, bottom), WallMask::NORTH | WallMask::EAST);
        self.merge_wall(Position::new(right, bottom), WallMask::NORTH | WallMask::WEST);

        for x in rect.x1..rect.x2 {
            self.merge_wall(Position::new(x, top), WallMask::HORIZONTAL);
            self.merge_wall(Position::new(x, bottom), WallMask::HORIZONTAL);
        }
        for y in rect.y1..rect.y2 {
            self.merge_wall(Position::new(left, y), WallMask::VERTICAL);
            self.merge_wall(Position::new(right, y), WallMask::VERTICAL);
        }
        for pos in rect.positions() {
            self.set(pos, Cell::Floor);
        }
    }
}
