//! # Finalizer
//!
//! Turns a grown [`DungeonBuilder`] into a finished [`Dungeon`]: leftover
//! exits that open onto a neighbouring room become doors, the west-most
//! and east-most open exits become the entrance and the exit, and rooms are
//! numbered by distance from the entrance.

use super::{dungeon::wall_lines, Dungeon, DungeonBuilder, ExitId};
use crate::{DelveError, DelveResult, Direction, PlayerStart, Position};
use log::{debug, warn};

/// Closest candidate so far, by distance to a grid corner.
#[derive(Debug, Default)]
struct Candidate {
    best: Option<(u32, ExitId)>,
}

impl Candidate {
    /// Keeps `id` if strictly closer than the current pick; ties keep the
    /// earlier exit.
    fn offer(&mut self, distance: u32, id: ExitId) {
        if self.best.map_or(true, |(d, _)| distance < d) {
            self.best = Some((distance, id));
        }
    }

    fn take(self) -> Option<ExitId> {
        self.best.map(|(_, id)| id)
    }
}

impl DungeonBuilder {
    /// Finishes the attempt.
    ///
    /// The entrance is the west-facing exit with nothing beyond it that lies
    /// closest to the bottom-left corner; the exit is the east-facing one
    /// closest to the top-right corner.
    pub fn finish(mut self) -> DelveResult<Dungeon> {
        let (width, height) = (self.config.width as i32, self.config.height as i32);
        let bottom_left = Position::new(0, height);
        let top_right = Position::new(width, 0);

        let mut entrance = Candidate::default();
        let mut exit = Candidate::default();

        for index in 0..self.exits.len() {
            let id = ExitId::from_index(index);
            let candidate = self.exits[index].clone();
            if candidate.is_final {
                continue;
            }

            if let Some(other) = self.spontaneous_exit(&candidate) {
                self.set_exit_door(id, Some(other))?;
                continue;
            }

            if !self.grid.cell_or_unused(candidate.beyond()).is_unused() {
                continue;
            }
            match candidate.dir {
                Direction::West => entrance.offer(candidate.pos.octile_distance(bottom_left), id),
                Direction::East => exit.offer(candidate.pos.octile_distance(top_right), id),
                Direction::North | Direction::South => {}
            }
        }

        let (entrance, exit) = match (entrance.take(), exit.take()) {
            (Some(entrance), Some(exit)) => (entrance, exit),
            _ => return Err(DelveError::EntranceExitNotFound),
        };
        self.set_exit_door(entrance, None)?;
        self.set_exit_door(exit, None)?;

        let entrance_exit = &self.exits[entrance.index()];
        let entrance_room = entrance_exit.room;
        let player = PlayerStart {
            room: entrance_room,
            pos: entrance_exit.pos.step(Direction::East).to_display(),
            dir: Direction::East,
        };

        let numbers = self.graph().breadth_first_label(entrance_room);
        for (room, number) in self.rooms.iter_mut().zip(numbers) {
            room.number = number;
        }

        let unreached = self.rooms.iter().filter(|r| r.number.is_none()).count();
        if unreached > 0 {
            warn!("{} features unreachable from the entrance", unreached);
        }

        let (hlines, vlines) = wall_lines(&self.grid);
        debug!(
            "entrance at {:?}, exit at {:?}, {} wall lines",
            self.exits[entrance.index()].pos,
            self.exits[exit.index()].pos,
            hlines.len() + vlines.len()
        );

        Ok(Dungeon {
            grid: self.grid,
            rooms: self.rooms,
            exits: self.exits,
            corridor_count: self.corridor_count,
            entrance,
            exit,
            entrance_room,
            player,
            hlines,
            vlines,
            attempts: 1,
        })
    }
}
