//! # Exit / Connectivity Graph
//!
//! Exits are the potential and resolved doorways on the sides of features.
//! Resolved exits link two rooms (or one room to the outside) and together
//! form the dungeon's connectivity graph.

use super::Room;
use crate::{Direction, Position};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::num::NonZeroU16;

/// 1-based handle into the room table. "No room" is `Option::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(NonZeroU16);

impl RoomId {
    /// Handle for the room at table index `index`, for walking tables
    /// whose size was already checked. Growing tables go through
    /// [`RoomId::try_from_index`].
    ///
    /// # Panics
    ///
    /// If `index` does not fit a 16-bit handle.
    pub fn from_index(index: usize) -> Self {
        Self::try_from_index(index).expect("room index exceeds handle range")
    }

    /// Handle for table index `index`, if it fits.
    pub fn try_from_index(index: usize) -> Option<Self> {
        u16::try_from(index + 1).ok().and_then(NonZeroU16::new).map(Self)
    }

    /// Zero-based table index.
    pub fn index(self) -> usize {
        self.0.get() as usize - 1
    }

    /// The 1-based handle value.
    pub fn get(self) -> u16 {
        self.0.get()
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle into the exit table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExitId(u16);

impl ExitId {
    /// Handle for an entry of an already checked exit table.
    ///
    /// # Panics
    ///
    /// If `index` does not fit a 16-bit handle.
    pub fn from_index(index: usize) -> Self {
        Self::try_from_index(index).expect("exit index exceeds handle range")
    }

    pub fn try_from_index(index: usize) -> Option<Self> {
        u16::try_from(index).ok().map(Self)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A doorway candidate on one side of a feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exit {
    /// Wall cell holding the (future) door.
    pub pos: Position,
    /// Outward direction from the owning feature.
    pub dir: Direction,
    /// Set on the open end of a corridor; whatever grows here must be a room.
    pub from_corridor: bool,
    /// Resolved into a door.
    pub is_final: bool,
    /// The feature that created the exit.
    pub room: RoomId,
    /// The room on the far side; `None` while unresolved or for doors that
    /// lead out of the dungeon.
    pub other_room: Option<RoomId>,
}

impl Exit {
    pub fn new(pos: Position, dir: Direction, room: RoomId, from_corridor: bool) -> Self {
        Self {
            pos,
            dir,
            from_corridor,
            is_final: false,
            room,
            other_room: None,
        }
    }

    /// The cell just beyond the doorway.
    pub fn beyond(&self) -> Position {
        self.pos.step(self.dir)
    }

    /// The room across this exit as seen from `room`.
    ///
    /// `Some(None)` is a door to nowhere (unresolved or leading outside);
    /// `None` means the exit does not touch `room` at all.
    pub fn across_from(&self, room: RoomId) -> Option<Option<RoomId>> {
        if self.room == room {
            Some(self.other_room)
        } else if self.other_room == Some(room) {
            Some(Some(self.room))
        } else {
            None
        }
    }
}

/// Read-only view of the room and exit tables as a graph.
#[derive(Debug, Clone, Copy)]
pub struct ExitGraph<'a> {
    rooms: &'a [Room],
    exits: &'a [Exit],
}

impl<'a> ExitGraph<'a> {
    pub fn new(rooms: &'a [Room], exits: &'a [Exit]) -> Self {
        Self { rooms, exits }
    }

    /// The room behind door `slot` of `room`'s exit list.
    ///
    /// `None` past the end of the list; `Some(None)` for a door leading
    /// outside.
    pub fn connected_room(&self, room: RoomId, slot: usize) -> Option<Option<RoomId>> {
        let id = self.rooms.get(room.index())?.exits.get(slot)?;
        let across = self.exits.get(id.index())?.across_from(room);
        if across.is_none() {
            log::warn!("room {} lists exit it does not own", room);
        }
        across
    }

    /// Rooms reachable through each door of `room`, in exit-list order.
    /// Doors to the outside yield `None`.
    pub fn neighbours(&self, room: RoomId) -> impl Iterator<Item = Option<RoomId>> + 'a {
        let graph = *self;
        (0..).map_while(move |slot| graph.connected_room(room, slot))
    }

    /// True iff one of `a`'s doors leads directly into `b`.
    ///
    /// Adjacency only; this is not transitive reachability.
    pub fn direct_connect(&self, a: RoomId, b: RoomId) -> bool {
        self.neighbours(a).any(|other| other == Some(b))
    }

    /// Numbers every room reachable from `start` by breadth-first visiting
    /// order, starting at 1. Unreached rooms stay `None`.
    pub fn breadth_first_label(&self, start: RoomId) -> Vec<Option<u16>> {
        let mut numbers = vec![None; self.rooms.len()];
        let mut listed = vec![false; self.rooms.len()];
        let mut queue = VecDeque::new();
        let mut next = 1u16;

        listed[start.index()] = true;
        queue.push_back(start);

        while let Some(room) = queue.pop_front() {
            numbers[room.index()] = Some(next);
            next += 1;

            for other in self.neighbours(room).flatten() {
                if !listed[other.index()] {
                    listed[other.index()] = true;
                    queue.push_back(other);
                }
            }
        }

        numbers
    }
}
