//! # Dungeon Generation
//!
//! Grows a connected dungeon outward from a central room.
//!
//! Each generation attempt runs the same pipeline on a fresh
//! [`DungeonBuilder`]:
//! 1. Place the first room in the middle of the grid
//! 2. Grow rooms and corridors from randomly chosen unresolved exits
//! 3. Finalize: resolve leftover exits, elect entrance and exit, number rooms
//!
//! An attempt that overflows one of its fixed tables is thrown away and the
//! [`DungeonGenerator`] starts over.

use super::{lines, Cell, DungeonRng, Exit, ExitGraph, ExitId, GenerationConfig, Generator, Grid, Rect, RoomId, WallLine};
use crate::{Capacity, DelveError, DelveResult, PlayerStart, Position};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// What a feature is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureKind {
    Room,
    Corridor,
}

/// A placed feature: a room or a corridor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Floor area; the walls sit one cell outside.
    pub rect: Rect,
    pub kind: FeatureKind,
    /// Breadth-first number from the entrance room, assigned when the
    /// dungeon is finished. `None` means unreached.
    pub number: Option<u16>,
    /// Doors bounding this feature, in the order they were resolved.
    pub exits: Vec<ExitId>,
}

impl Room {
    pub fn new(rect: Rect, kind: FeatureKind) -> Self {
        Self {
            rect,
            kind,
            number: None,
            exits: Vec::new(),
        }
    }

    pub fn is_corridor(&self) -> bool {
        self.kind == FeatureKind::Corridor
    }
}

/// A finished dungeon layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dungeon {
    pub grid: Grid,
    /// Rooms and corridors in placement order; [`RoomId`] indexes this table.
    pub rooms: Vec<Room>,
    pub exits: Vec<Exit>,
    pub corridor_count: usize,
    /// The west-side door leading into the dungeon.
    pub entrance: ExitId,
    /// The east-side door leading out.
    pub exit: ExitId,
    pub entrance_room: RoomId,
    pub player: PlayerStart,
    /// Horizontal wall runs, doubled coordinates.
    pub hlines: Vec<WallLine>,
    /// Vertical wall runs, doubled coordinates.
    pub vlines: Vec<WallLine>,
    /// Pipeline runs it took to produce this layout.
    pub attempts: u32,
}

impl Dungeon {
    pub fn graph(&self) -> ExitGraph<'_> {
        ExitGraph::new(&self.rooms, &self.exits)
    }

    pub fn room(&self, id: RoomId) -> &Room {
        &self.rooms[id.index()]
    }

    /// Number of non-corridor features.
    pub fn room_count(&self) -> usize {
        self.rooms.len() - self.corridor_count
    }

    pub fn door_count(&self) -> usize {
        self.exits.iter().filter(|e| e.is_final).count()
    }

    /// Rooms the breadth-first labeling never reached.
    pub fn unreached_rooms(&self) -> impl Iterator<Item = RoomId> + '_ {
        self.rooms
            .iter()
            .enumerate()
            .filter(|(_, room)| room.number.is_none())
            .map(|(i, _)| RoomId::from_index(i))
    }

    /// Checks the structural guarantees of a finished layout.
    pub fn check_layout(&self) -> DelveResult<()> {
        let invalid = |msg: String| Err(DelveError::InvalidLayout(msg));
        let (width, height) = (self.grid.width(), self.grid.height());

        for (i, room) in self.rooms.iter().enumerate() {
            if !room.rect.inside_margin(width, height) {
                return invalid(format!("feature {} at {:?} leaves the grid", i + 1, room.rect));
            }
            for (j, other) in self.rooms.iter().enumerate().skip(i + 1) {
                if room.rect.intersects(&other.rect.outer()) || other.rect.intersects(&room.rect.outer()) {
                    return invalid(format!("features {} and {} overlap", i + 1, j + 1));
                }
            }
        }

        for (pos, cell) in self.grid.iter() {
            let border = pos.x == 0 || pos.y == 0 || pos.x == width as i32 - 1 || pos.y == height as i32 - 1;
            if border && cell.is_floor() {
                return invalid(format!("floor on the border at {:?}", pos));
            }
        }

        if let Some(room) = self.unreached_rooms().next() {
            return invalid(format!("feature {} is unreachable from the entrance", room));
        }
        if self.room(self.entrance_room).number != Some(1) {
            return invalid("entrance room is not numbered 1".to_string());
        }

        let outside: Vec<&Exit> = self
            .exits
            .iter()
            .filter(|e| e.is_final && e.other_room.is_none())
            .collect();
        if outside.len() != 2 {
            return invalid(format!("{} doors lead outside, expected 2", outside.len()));
        }
        for id in [self.entrance, self.exit] {
            let exit = &self.exits[id.index()];
            if !exit.is_final || exit.other_room.is_some() || self.grid.get(exit.pos) != Some(Cell::Door) {
                return invalid(format!("door {:?} is not an outside door", exit.pos));
            }
        }
        Ok(())
    }
}

/// One generation attempt's scratch state: grid plus room and exit tables.
#[derive(Debug, Clone)]
pub struct DungeonBuilder {
    pub(crate) config: GenerationConfig,
    pub(crate) grid: Grid,
    pub(crate) rooms: Vec<Room>,
    pub(crate) exits: Vec<Exit>,
    pub(crate) corridor_count: usize,
}

impl DungeonBuilder {
    /// Starts an attempt with an empty grid.
    pub fn new(config: &GenerationConfig) -> DelveResult<Self> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            grid: Grid::new(config.width, config.height),
            rooms: Vec::with_capacity(config.max_rooms()),
            exits: Vec::with_capacity(config.max_exits),
            corridor_count: 0,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn exits(&self) -> &[Exit] {
        &self.exits
    }

    pub fn feature_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn graph(&self) -> ExitGraph<'_> {
        ExitGraph::new(&self.rooms, &self.exits)
    }

    /// Unresolved exits, in table order.
    pub fn open_exits(&self) -> impl Iterator<Item = ExitId> + '_ {
        self.exits
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.is_final)
            .map(|(i, _)| ExitId::from_index(i))
    }

    /// First feature whose floor contains `pos`.
    pub fn find_room(&self, pos: Position) -> Option<RoomId> {
        self.rooms
            .iter()
            .position(|room| room.rect.contains(pos))
            .map(RoomId::from_index)
    }

    /// A free connection: the cell beyond the exit is already floor of a room
    /// that `from` has no door into yet.
    pub(crate) fn spontaneous_exit(&self, exit: &Exit) -> Option<RoomId> {
        let beyond = exit.beyond();
        if !self.grid.cell_or_unused(beyond).is_floor() {
            return None;
        }
        let other = self.find_room(beyond)?;
        (other != exit.room && !self.graph().direct_connect(exit.room, other)).then_some(other)
    }

    /// Registers a feature and paints it into the grid.
    pub(crate) fn add_room(&mut self, rect: Rect, kind: FeatureKind) -> DelveResult<RoomId> {
        let limit = self.config.max_rooms();
        let id = RoomId::try_from_index(self.rooms.len())
            .filter(|_| self.rooms.len() < limit)
            .ok_or(DelveError::CapacityExceeded(Capacity::Rooms { limit }))?;

        self.grid.paint_feature(&rect);
        self.rooms.push(Room::new(rect, kind));
        if kind == FeatureKind::Corridor {
            self.corridor_count += 1;
        }
        Ok(id)
    }

    pub(crate) fn add_exit(
        &mut self,
        pos: Position,
        dir: crate::Direction,
        room: RoomId,
        from_corridor: bool,
    ) -> DelveResult<ExitId> {
        let limit = self.config.max_exits;
        let id = ExitId::try_from_index(self.exits.len())
            .filter(|_| self.exits.len() < limit)
            .ok_or(DelveError::CapacityExceeded(Capacity::Exits { limit }))?;

        self.exits.push(Exit::new(pos, dir, room, from_corridor));
        Ok(id)
    }

    fn add_room_exit(&mut self, room: RoomId, exit: ExitId) -> DelveResult<()> {
        let limit = self.config.max_room_exits;
        let list = &mut self.rooms[room.index()].exits;
        if list.len() >= limit {
            return Err(DelveError::CapacityExceeded(Capacity::RoomExits { room, limit }));
        }
        list.push(exit);
        Ok(())
    }

    /// Turns an exit into a door, linking it to `other` when it leads to
    /// another room rather than outside.
    pub(crate) fn set_exit_door(&mut self, id: ExitId, other: Option<RoomId>) -> DelveResult<()> {
        let exit = &mut self.exits[id.index()];
        debug_assert!(!exit.is_final, "exit {:?} resolved twice", exit.pos);
        debug_assert!(exit.other_room.is_none(), "exit {:?} already links a room", exit.pos);

        exit.is_final = true;
        exit.other_room = other;
        let (pos, room) = (exit.pos, exit.room);

        self.grid.set(pos, Cell::Door);
        self.add_room_exit(room, id)?;
        if let Some(other) = other {
            self.add_room_exit(other, id)?;
        }
        Ok(())
    }
}

/// Drives whole-pipeline attempts until one produces a dungeon.
#[derive(Debug, Clone, Default)]
pub struct DungeonGenerator;

impl DungeonGenerator {
    /// Creates a new dungeon generator.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{DungeonGenerator, GenerationConfig, Generator};
    /// use delve::generation::utils;
    ///
    /// let config = GenerationConfig::for_testing(7);
    /// let mut rng = utils::create_rng(&config);
    /// let dungeon = DungeonGenerator::new().generate(&config, &mut rng).unwrap();
    /// assert!(dungeon.rooms.len() > 1);
    /// ```
    pub fn new() -> Self {
        Self
    }

    /// Runs the pipeline once. Capacity overflow comes back as an error.
    pub fn generate_attempt<R: DungeonRng>(
        &self,
        config: &GenerationConfig,
        rng: &mut R,
    ) -> DelveResult<Dungeon> {
        let mut builder = DungeonBuilder::new(config)?;
        builder.place_first_room(rng)?;

        while builder.feature_count() < config.max_features {
            if !builder.grow(rng)? {
                debug!("cannot add any more features");
                break;
            }
        }
        debug!(
            "placed {} features ({} corridors)",
            builder.feature_count(),
            builder.corridor_count
        );

        builder.finish()
    }
}

impl Generator<Dungeon> for DungeonGenerator {
    fn generate<R: DungeonRng>(&self, config: &GenerationConfig, rng: &mut R) -> DelveResult<Dungeon> {
        config.validate()?;

        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.generate_attempt(config, rng) {
                Ok(mut dungeon) => {
                    dungeon.attempts = attempts;
                    info!(
                        "generated {} rooms and {} corridors in {} attempt(s)",
                        dungeon.room_count(),
                        dungeon.corridor_count,
                        attempts
                    );
                    return Ok(dungeon);
                }
                Err(e) if e.is_capacity() => warn!("generation attempt {} failed: {}", attempts, e),
                Err(e) => return Err(e),
            }

            if config.max_attempts.is_some_and(|max| attempts >= max) {
                return Err(DelveError::AttemptsExhausted { attempts });
            }
        }
    }

    fn validate(&self, dungeon: &Dungeon, _config: &GenerationConfig) -> DelveResult<()> {
        dungeon.check_layout()
    }

    fn generator_type(&self) -> &'static str {
        "DungeonGenerator"
    }
}

pub(crate) fn wall_lines(grid: &Grid) -> (Vec<WallLine>, Vec<WallLine>) {
    (lines::horizontal_lines(grid), lines::vertical_lines(grid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::utils;
    use crate::{Direction, FixedRng};

    #[test]
    fn test_room_creation() {
        let room = Room::new(Rect::new(5, 5, 10, 9), FeatureKind::Corridor);
        assert!(room.is_corridor());
        assert_eq!(room.number, None);
        assert!(room.exits.is_empty());
    }

    #[test]
    fn test_room_table_capacity() {
        let mut config = GenerationConfig::default();
        config.max_features = 1;
        let mut builder = DungeonBuilder::new(&config).unwrap();
        builder.add_room(Rect::new(2, 2, 5, 5), FeatureKind::Room).unwrap();
        builder.add_room(Rect::new(10, 2, 13, 5), FeatureKind::Room).unwrap();
        let err = builder.add_room(Rect::new(20, 2, 23, 5), FeatureKind::Room).unwrap_err();
        assert!(matches!(err, DelveError::CapacityExceeded(Capacity::Rooms { limit: 2 })));
    }

    #[test]
    fn test_exit_table_capacity() {
        let mut config = GenerationConfig::default();
        config.max_exits = 1;
        let mut builder = DungeonBuilder::new(&config).unwrap();
        let room = builder.add_room(Rect::new(2, 2, 5, 5), FeatureKind::Room).unwrap();
        builder.add_exit(Position::new(3, 1), Direction::North, room, false).unwrap();
        let err = builder
            .add_exit(Position::new(3, 5), Direction::South, room, false)
            .unwrap_err();
        assert!(matches!(err, DelveError::CapacityExceeded(Capacity::Exits { limit: 1 })));
    }

    #[test]
    fn test_set_exit_door_links_both_rooms() {
        let config = GenerationConfig::default();
        let mut builder = DungeonBuilder::new(&config).unwrap();
        let a = builder.add_room(Rect::new(2, 2, 6, 6), FeatureKind::Room).unwrap();
        let b = builder.add_room(Rect::new(7, 2, 11, 6), FeatureKind::Room).unwrap();
        let door = builder.add_exit(Position::new(6, 3), Direction::East, a, false).unwrap();

        builder.set_exit_door(door, Some(b)).unwrap();

        assert_eq!(builder.grid().get(Position::new(6, 3)), Some(Cell::Door));
        assert!(builder.graph().direct_connect(a, b));
        assert!(builder.graph().direct_connect(b, a));
        assert_eq!(builder.open_exits().count(), 0);
    }

    #[test]
    fn test_spontaneous_exit_requires_unconnected_floor() {
        let config = GenerationConfig::default();
        let mut builder = DungeonBuilder::new(&config).unwrap();
        let a = builder.add_room(Rect::new(2, 2, 6, 6), FeatureKind::Room).unwrap();
        let b = builder.add_room(Rect::new(7, 2, 11, 6), FeatureKind::Room).unwrap();
        let first = builder.add_exit(Position::new(6, 3), Direction::East, a, false).unwrap();
        let second = builder.add_exit(Position::new(6, 4), Direction::East, a, false).unwrap();
        let north = builder.add_exit(Position::new(3, 1), Direction::North, a, false).unwrap();

        let exit = builder.exits()[first.index()].clone();
        assert_eq!(builder.spontaneous_exit(&exit), Some(b));
        builder.set_exit_door(first, Some(b)).unwrap();

        // already directly connected
        let exit = builder.exits()[second.index()].clone();
        assert_eq!(builder.spontaneous_exit(&exit), None);

        // nothing beyond
        let exit = builder.exits()[north.index()].clone();
        assert_eq!(builder.spontaneous_exit(&exit), None);
    }

    #[test]
    fn test_generate_with_default_config() {
        let config = GenerationConfig::for_testing(12345);
        let mut rng = utils::create_rng(&config);
        let generator = DungeonGenerator::new();

        let dungeon = generator.generate(&config, &mut rng).unwrap();
        assert!(dungeon.attempts >= 1);
        assert!(dungeon.rooms.len() <= config.max_rooms());
        assert!(generator.validate(&dungeon, &config).is_ok());
        assert_eq!(generator.generator_type(), "DungeonGenerator");
    }

    #[test]
    fn test_bounded_driver_gives_up() {
        let mut config = GenerationConfig::for_testing(1);
        config.max_room_exits = 0;
        config.max_attempts = Some(3);
        let mut rng = utils::create_rng(&config);

        let err = DungeonGenerator::new().generate(&config, &mut rng).unwrap_err();
        assert!(matches!(err, DelveError::AttemptsExhausted { attempts: 3 }));
    }

    #[test]
    fn test_attempt_with_fixed_rng_terminates() {
        let config = GenerationConfig::new(0);
        let result = DungeonGenerator::new().generate_attempt(&config, &mut FixedRng::Min);
        match result {
            Ok(dungeon) => assert!(dungeon.check_layout().is_ok()),
            Err(e) => assert!(e.is_capacity(), "unexpected error {}", e),
        }
    }
}
