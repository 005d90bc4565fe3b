//! # Feature Placement
//!
//! Grows the dungeon by one room or corridor at a time from an unresolved
//! exit. Corridors always end in a room, either one they run into or one
//! placed at their far end.

use super::{Cell, DungeonBuilder, DungeonRng, ExitId, FeatureKind, Rect, RoomId};
use crate::config::ROOM_CHANCE_DENOMINATOR;
use crate::{DelveError, DelveResult, Direction, Position};
use log::{debug, trace};

/// What lies at the far end of a corridor of a given length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CorridorProbe {
    /// Fits, and the end cell is empty.
    Open,
    /// Fits, and ends on a straight wall it can break through.
    Hit,
    /// Does not fit, or ends on a corner, floor, or door.
    Blocked,
}

/// Floor rectangle of a `width` x `height` room entered through `entry`.
///
/// With no direction (the first room) the room is centered on `entry`;
/// otherwise it lies beyond `entry`, centered across the direction of travel.
fn room_box(entry: Position, dir: Option<Direction>, width: u32, height: u32) -> Rect {
    let (w, h) = (width as i32, height as i32);
    let (x, y) = (entry.x, entry.y);
    let top_left = match dir {
        None => Position::new(x - (w >> 1), y - (h >> 1)),
        Some(Direction::North) => Position::new(x - (w >> 1), y - h),
        Some(Direction::South) => Position::new(x - (w >> 1), y + 1),
        Some(Direction::East) => Position::new(x + 1, y - (h >> 1)),
        Some(Direction::West) => Position::new(x - w, y - (h >> 1)),
    };
    Rect::from_size(top_left, width, height)
}

/// Floor of a one-cell-wide corridor of `len` cells leading away from
/// `entry`, and the wall cell at its far end.
fn corridor_box(entry: Position, dir: Direction, len: u32) -> (Rect, Position) {
    let l = len as i32;
    let (x, y) = (entry.x, entry.y);
    match dir {
        Direction::North => (Rect::new(x, y - l, x + 1, y), Position::new(x, y - l - 1)),
        Direction::East => (Rect::new(x + 1, y, x + 1 + l, y + 1), Position::new(x + 1 + l, y)),
        Direction::South => (Rect::new(x, y + 1, x + 1, y + 1 + l), Position::new(x, y + 1 + l)),
        Direction::West => (Rect::new(x - l, y, x, y + 1), Position::new(x - l - 1, y)),
    }
}

impl DungeonBuilder {
    /// Places the first room, centered on the grid.
    pub fn place_first_room<R: DungeonRng>(&mut self, rng: &mut R) -> DelveResult<RoomId> {
        let center = Position::new((self.config.width / 2) as i32, (self.config.height / 2) as i32);
        self.random_room(rng, center, None)?.ok_or_else(|| {
            DelveError::InvalidConfig("first room does not fit the grid".to_string())
        })
    }

    /// Tries to add one feature.
    ///
    /// Returns `Ok(false)` when no unresolved exit could be grown within the
    /// configured number of tries; the dungeon is then full, which is not an
    /// error. Capacity overflow aborts at once.
    pub fn grow<R: DungeonRng>(&mut self, rng: &mut R) -> DelveResult<bool> {
        for attempt in 0..self.config.placement_tries {
            let open: Vec<ExitId> = self.open_exits().collect();
            if open.is_empty() {
                debug!("no unresolved exits left");
                return Ok(false);
            }

            let id = open[rng.random_below(open.len() as u32) as usize];
            let exit = self.exits[id.index()].clone();

            // corridors must end in rooms
            let want_room = exit.from_corridor
                || rng.random_below(ROOM_CHANCE_DENOMINATOR) < self.config.room_chance;

            let attached = match self.spontaneous_exit(&exit) {
                Some(other) => {
                    trace!("spontaneous exit rooms {} -> {}", exit.room, other);
                    Some(other)
                }
                None if want_room => self.random_room(rng, exit.pos, Some(exit.dir))?,
                None => self.random_corridor(rng, exit.pos, exit.dir)?,
            };

            if let Some(other) = attached {
                self.set_exit_door(id, Some(other))?;
                trace!("feature attached after {} tries", attempt + 1);
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// The floor fits inside the grid margin and covers only unused cells.
    fn check_rect(&self, rect: &Rect) -> bool {
        rect.inside_margin(self.config.width, self.config.height) && self.grid.is_unused_area(rect)
    }

    /// Rolls a room size and places the room beyond `entry` if it fits.
    pub(crate) fn random_room<R: DungeonRng>(
        &mut self,
        rng: &mut R,
        entry: Position,
        dir: Option<Direction>,
    ) -> DelveResult<Option<RoomId>> {
        let width = rng.random_in_range(self.config.min_room_width, self.config.max_room_width);
        let height = rng.random_in_range(self.config.min_room_height, self.config.max_room_height);

        let rect = room_box(entry, dir, width, height);
        if !self.check_rect(&rect) {
            return Ok(None);
        }

        let id = self.add_room(rect, FeatureKind::Room)?;
        self.add_room_exits(rng, id, &rect, dir)?;
        Ok(Some(id))
    }

    /// One exit on every side except the one the room was entered through.
    /// Exits avoid the cells next to corners.
    fn add_room_exits<R: DungeonRng>(
        &mut self,
        rng: &mut R,
        room: RoomId,
        rect: &Rect,
        entered: Option<Direction>,
    ) -> DelveResult<()> {
        let outer = rect.outer();
        let along_x = |rng: &mut R| rect.x1 + 1 + rng.random_below(rect.width() - 2) as i32;
        let along_y = |rng: &mut R| rect.y1 + 1 + rng.random_below(rect.height() - 2) as i32;

        if entered != Some(Direction::South) {
            let x = along_x(rng);
            self.add_exit(Position::new(x, outer.y1), Direction::North, room, false)?;
        }
        if entered != Some(Direction::North) {
            let x = along_x(rng);
            self.add_exit(Position::new(x, rect.y2), Direction::South, room, false)?;
        }
        if entered != Some(Direction::East) {
            let y = along_y(rng);
            self.add_exit(Position::new(outer.x1, y), Direction::West, room, false)?;
        }
        if entered != Some(Direction::West) {
            let y = along_y(rng);
            self.add_exit(Position::new(rect.x2, y), Direction::East, room, false)?;
        }
        Ok(())
    }

    fn probe_corridor(&self, entry: Position, dir: Direction, len: u32) -> CorridorProbe {
        let (rect, end) = corridor_box(entry, dir, len);
        if !self.check_rect(&rect) {
            return CorridorProbe::Blocked;
        }
        match self.grid.cell_or_unused(end) {
            Cell::Unused => CorridorProbe::Open,
            Cell::Wall(mask) if mask.is_straight() => CorridorProbe::Hit,
            _ => CorridorProbe::Blocked,
        }
    }

    /// Places a corridor from `entry`.
    ///
    /// Scans lengths upward until the corridor stops fitting or runs into a
    /// wall. A short run into a straight wall is paved as is and will open
    /// into whatever lies behind that wall. Anything else gets a shorter
    /// corridor with a room at its end, or nothing if no room fits.
    pub(crate) fn random_corridor<R: DungeonRng>(
        &mut self,
        rng: &mut R,
        entry: Position,
        dir: Direction,
    ) -> DelveResult<Option<RoomId>> {
        let (min, max, connect) = (
            self.config.min_corridor_length,
            self.config.max_corridor_length,
            self.config.max_corridor_connect,
        );

        let mut len = min;
        let mut probe = CorridorProbe::Blocked;
        while len <= connect {
            probe = self.probe_corridor(entry, dir, len);
            if probe != CorridorProbe::Open {
                break;
            }
            len += 1;
        }

        // A straight wall reached at any length up to the maximum is paved,
        // the minimum length included.
        let len = if probe == CorridorProbe::Hit && len <= max {
            len
        } else if len <= min {
            return Ok(None);
        } else {
            match self.corridor_end_room(rng, entry, dir, (len - 1).min(max))? {
                Some(len) => len,
                None => return Ok(None),
            }
        };

        let (rect, end) = corridor_box(entry, dir, len);
        let id = self.add_room(rect, FeatureKind::Corridor)?;
        self.add_exit(end, dir, id, true)?;
        Ok(Some(id))
    }

    /// Tries a few corridor lengths up to `longest`, each with a room at the
    /// far end. Returns the length whose room fitted.
    fn corridor_end_room<R: DungeonRng>(
        &mut self,
        rng: &mut R,
        entry: Position,
        dir: Direction,
        longest: u32,
    ) -> DelveResult<Option<u32>> {
        for _ in 0..self.config.corridor_room_tries {
            let len = rng.random_in_range(self.config.min_corridor_length, longest);
            let (_, end) = corridor_box(entry, dir, len);
            if self.random_room(rng, end, Some(dir))?.is_some() {
                return Ok(Some(len));
            }
        }
        Ok(None)
    }
}
