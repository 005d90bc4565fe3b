//! Axis-aligned rectangles in grid coordinates.

use crate::Position;
use serde::{Deserialize, Serialize};

/// Half-open rectangle `[x1, x2) x [y1, y2)`.
///
/// For rooms and corridors this is the floor area; the walls sit on the
/// one-cell ring returned by [`Rect::outer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Creates a rectangle from its top-left corner and size.
    pub fn from_size(top_left: Position, width: u32, height: u32) -> Self {
        Self::new(
            top_left.x,
            top_left.y,
            top_left.x + width as i32,
            top_left.y + height as i32,
        )
    }

    pub fn width(&self) -> u32 {
        (self.x2 - self.x1).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.y2 - self.y1).max(0) as u32
    }

    /// Center cell, rounding toward the top-left.
    pub fn center(&self) -> Position {
        Position::new((self.x1 + self.x2) >> 1, (self.y1 + self.y2) >> 1)
    }

    /// Checks if a position is inside this rectangle.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Position, Rect};
    ///
    /// let r = Rect::new(5, 5, 10, 8);
    /// assert!(r.contains(Position::new(5, 5)));
    /// assert!(!r.contains(Position::new(10, 5)));
    /// ```
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.x1 && pos.x < self.x2 && pos.y >= self.y1 && pos.y < self.y2
    }

    /// Checks whether the two rectangles share any cell.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x1 < other.x2 && other.x1 < self.x2 && self.y1 < other.y2 && other.y1 < self.y2
    }

    /// The rectangle grown by the one-cell wall border.
    pub fn outer(&self) -> Rect {
        Rect::new(self.x1 - 1, self.y1 - 1, self.x2 + 1, self.y2 + 1)
    }

    /// True when the rectangle and its walls fit a `width` x `height` grid,
    /// leaving every floor cell off the border.
    pub fn inside_margin(&self, width: u32, height: u32) -> bool {
        self.x1 > 0 && self.y1 > 0 && self.x2 < width as i32 && self.y2 < height as i32
    }

    /// Iterates all cells row by row.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (self.y1..self.y2).flat_map(move |y| (self.x1..self.x2).map(move |x| Position::new(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_geometry() {
        let r = Rect::from_size(Position::new(5, 5), 10, 8);
        assert_eq!(r, Rect::new(5, 5, 15, 13));
        assert_eq!(r.width(), 10);
        assert_eq!(r.height(), 8);
        assert_eq!(r.center(), Position::new(10, 9));
        assert_eq!(r.positions().count(), 80);
    }

    #[test]
    fn test_rect_intersection() {
        let a = Rect::new(5, 5, 10, 10);
        let b = Rect::new(9, 9, 12, 12);
        let c = Rect::new(10, 5, 12, 10);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        // touching edges do not intersect
        assert!(!a.intersects(&c));
        assert!(a.outer().intersects(&c));
    }

    #[test]
    fn test_inside_margin() {
        assert!(Rect::new(1, 1, 63, 47).inside_margin(64, 48));
        assert!(!Rect::new(0, 1, 10, 10).inside_margin(64, 48));
        assert!(!Rect::new(1, 1, 64, 10).inside_margin(64, 48));
    }
}
