//! # Game Module
//!
//! Shared world types consumed by generation and by the play loop:
//! coordinates, compass directions, and the creature records that the
//! finalizer seeds with a starting position.

use crate::config::SCALE_BITS;
use crate::generation::RoomId;
use serde::{Deserialize, Serialize};

/// Represents a 2D coordinate on the dungeon grid (or at display scale).
///
/// # Examples
///
/// ```
/// use delve::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.y, 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Octile-style distance that favours diagonal proximity:
    /// `dx + dy - min(dx, dy) / 2`.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::Position;
    ///
    /// let a = Position::new(0, 0);
    /// assert_eq!(a.octile_distance(Position::new(4, 4)), 6);
    /// assert_eq!(a.octile_distance(Position::new(5, 0)), 5);
    /// ```
    pub fn octile_distance(self, other: Position) -> u32 {
        let dx = (self.x - other.x).unsigned_abs();
        let dy = (self.y - other.y).unsigned_abs();
        dx + dy - (dx.min(dy) >> 1)
    }

    /// Moves one cell in `direction`.
    pub fn step(self, direction: Direction) -> Position {
        self + direction.to_delta()
    }

    /// Converts grid units to the finest display coordinate scale.
    ///
    /// Columns are twice as wide as rows on the display, so `x` gains one
    /// extra bit; `y` lands on the middle of its scaled row.
    pub fn to_display(self) -> Position {
        Position::new(
            self.x << (SCALE_BITS + 1),
            (self.y << SCALE_BITS) + (1 << (SCALE_BITS - 1)),
        )
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// Compass directions for exits and facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All four directions in clockwise order from north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Converts a direction to a position delta.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Direction, Position};
    ///
    /// let delta = Direction::North.to_delta();
    /// assert_eq!(delta, Position::new(0, -1));
    /// ```
    pub fn to_delta(self) -> Position {
        match self {
            Direction::North => Position::new(0, -1),
            Direction::East => Position::new(1, 0),
            Direction::South => Position::new(0, 1),
            Direction::West => Position::new(-1, 0),
        }
    }

    /// Returns the opposite direction.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }
}

/// Where the player begins, computed once by the finalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStart {
    /// The entrance room.
    pub room: RoomId,
    /// Position at the finest display scale.
    pub pos: Position,
    /// Facing direction; always into the dungeon.
    pub dir: Direction,
}

/// Creature record shared by monsters and the player.
///
/// Only the data lives here; movement and combat belong to the play loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creature {
    pub room: RoomId,
    pub pos: Position,
    pub dir: Direction,
    pub wounds: u8,
    pub fatigue: u8,
}

/// The player character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub creature: Creature,
    pub weight: u8,
    pub arrows: u8,
    pub magic_arrows: u8,
    pub current_enemy: Option<u16>,
    pub slain: u8,
}

impl Player {
    /// A fresh player standing at the generated start.
    pub fn at_start(start: PlayerStart) -> Self {
        Self {
            creature: Creature {
                room: start.room,
                pos: start.pos,
                dir: start.dir,
                wounds: 0,
                fatigue: 0,
            },
            weight: 0,
            arrows: 0,
            magic_arrows: 0,
            current_enemy: None,
            slain: 0,
        }
    }
}
