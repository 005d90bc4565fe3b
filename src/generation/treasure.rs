//! # Treasure Distribution
//!
//! Scatters a catalog of treasures over a finished dungeon. The most
//! valuable treasures are placed first and lean toward rooms added late in
//! generation, which tend to lie deep in the dungeon.

use super::{DungeonRng, GenerationConfig, Room, RoomId};
use crate::config::BASE_TREASURE_ID;
use crate::{Capacity, DelveError, DelveResult, Position};
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

/// A kind of treasure and how many of it to place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasureTemplate {
    pub name: String,
    pub value: u32,
    /// Instances to place; zero also places one.
    pub count: u32,
}

impl TreasureTemplate {
    pub fn new(name: impl Into<String>, value: u32, count: u32) -> Self {
        Self {
            name: name.into(),
            value,
            count,
        }
    }

    /// Number of instances this template asks for.
    pub fn instances(&self) -> u32 {
        self.count.max(1)
    }
}

/// One placed treasure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasureInstance {
    /// Catalog index plus [`BASE_TREASURE_ID`].
    pub id: u16,
    /// Index of the template in the catalog.
    pub template: usize,
    pub room: RoomId,
    /// Center of the room, in display units.
    pub pos: Position,
}

/// The catalog the game ships with.
pub fn default_catalog() -> Vec<TreasureTemplate> {
    vec![
        TreasureTemplate::new("copper coins", 8, 4),
        TreasureTemplate::new("silver goblet", 16, 2),
        TreasureTemplate::new("jeweled dagger", 24, 1),
        TreasureTemplate::new("gold bracelet", 32, 2),
        TreasureTemplate::new("elven cloak", 40, 1),
        TreasureTemplate::new("ruby amulet", 48, 1),
        TreasureTemplate::new("crystal orb", 64, 1),
        TreasureTemplate::new("dragon egg", 80, 0),
        TreasureTemplate::new("crown of kings", 120, 0),
    ]
}

/// Allocation state of one room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Free,
    /// The entrance room and corridors never hold treasure.
    Excluded,
    /// Holds a treasure.
    Taken,
    /// Next to a taken room in the table; freed when nothing else is left.
    Blocked,
}

/// Instances of a template still to place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Remaining {
    Left(u32),
    Allocated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    SelectTemplate,
    BuildWeights,
    Release,
    PickRoom { total: u32 },
    Record { room: usize },
    NextInstance,
    Done,
}

/// Places treasure instances from a catalog.
///
/// # Examples
///
/// ```
/// use delve::{DungeonGenerator, GenerationConfig, Generator, TreasureDistributor, default_catalog};
/// use delve::generation::utils;
///
/// let config = GenerationConfig::for_testing(3);
/// let mut rng = utils::create_rng(&config);
/// let dungeon = DungeonGenerator::new().generate(&config, &mut rng).unwrap();
///
/// let catalog = default_catalog();
/// let treasure = TreasureDistributor::new(&catalog)
///     .distribute(&dungeon.rooms, &config, &mut rng)
///     .unwrap();
/// assert!(treasure.iter().all(|t| t.room.get() != 1));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TreasureDistributor<'a> {
    catalog: &'a [TreasureTemplate],
}

impl<'a> TreasureDistributor<'a> {
    pub fn new(catalog: &'a [TreasureTemplate]) -> Self {
        Self { catalog }
    }

    /// Assigns every template instance to its own eligible room.
    ///
    /// Instances that find no room are dropped, so the result may be shorter
    /// than the catalog asks for.
    pub fn distribute<R: DungeonRng>(
        &self,
        rooms: &[Room],
        config: &GenerationConfig,
        rng: &mut R,
    ) -> DelveResult<Vec<TreasureInstance>> {
        let requested: usize = self.catalog.iter().map(|t| t.instances() as usize).sum();
        if requested > config.max_treasures {
            return Err(DelveError::CapacityExceeded(Capacity::Treasures {
                requested,
                limit: config.max_treasures,
            }));
        }
        if self.catalog.len() > (u16::MAX - BASE_TREASURE_ID) as usize {
            return Err(DelveError::InvalidConfig(format!(
                "catalog of {} templates overflows treasure ids",
                self.catalog.len()
            )));
        }
        if rooms.is_empty() {
            return Ok(Vec::new());
        }
        if RoomId::try_from_index(rooms.len() - 1).is_none() {
            return Err(DelveError::InvalidLayout(format!(
                "{} rooms overflow room handles",
                rooms.len()
            )));
        }

        debug!(
            "distributing {} treasures into {} rooms",
            requested,
            rooms.iter().filter(|r| !r.is_corridor()).count().saturating_sub(1)
        );

        let mut run = Distribution::new(self.catalog, rooms);
        run.run(rng);
        debug!("placed {} of {} treasures", run.placed.len(), requested);
        Ok(run.placed)
    }
}

/// Convenience wrapper around [`TreasureDistributor::distribute`].
pub fn distribute_treasure<R: DungeonRng>(
    catalog: &[TreasureTemplate],
    rooms: &[Room],
    config: &GenerationConfig,
    rng: &mut R,
) -> DelveResult<Vec<TreasureInstance>> {
    TreasureDistributor::new(catalog).distribute(rooms, config, rng)
}

/// Working state of one distribution pass.
struct Distribution<'a> {
    catalog: &'a [TreasureTemplate],
    rooms: &'a [Room],
    marks: Vec<Mark>,
    remaining: Vec<Remaining>,
    weights: Vec<u32>,
    /// Template being placed.
    current: usize,
    placed: Vec<TreasureInstance>,
}

impl<'a> Distribution<'a> {
    fn new(catalog: &'a [TreasureTemplate], rooms: &'a [Room]) -> Self {
        let marks = rooms
            .iter()
            .enumerate()
            .map(|(i, room)| {
                if i == 0 || room.is_corridor() {
                    Mark::Excluded
                } else {
                    Mark::Free
                }
            })
            .collect();

        Self {
            catalog,
            rooms,
            marks,
            remaining: catalog.iter().map(|t| Remaining::Left(t.instances())).collect(),
            weights: vec![0; rooms.len()],
            current: 0,
            placed: Vec::new(),
        }
    }

    fn run<R: DungeonRng>(&mut self, rng: &mut R) {
        let mut step = Step::SelectTemplate;
        while step != Step::Done {
            step = match step {
                Step::SelectTemplate => self.select_template(),
                Step::BuildWeights => match self.build_weights() {
                    0 => Step::Release,
                    total => Step::PickRoom { total },
                },
                Step::Release => self.release(),
                Step::PickRoom { total } => self.pick_room(rng, total),
                Step::Record { room } => self.record(room),
                Step::NextInstance => self.next_instance(),
                Step::Done => Step::Done,
            };
        }
    }

    /// Most valuable template with instances left; ties go to the later one.
    fn select_template(&mut self) -> Step {
        let best = self
            .catalog
            .iter()
            .enumerate()
            .filter(|(i, _)| self.remaining[*i] != Remaining::Allocated)
            .fold(None, |best: Option<(usize, u32)>, (i, t)| match best {
                Some((_, value)) if t.value < value => best,
                _ => Some((i, t.value)),
            });

        match best {
            Some((index, _)) => {
                self.current = index;
                trace!("placing '{}'", self.catalog[index].name);
                Step::BuildWeights
            }
            None => Step::Done,
        }
    }

    /// Fills the per-room weights and returns their total.
    ///
    /// The multiplier starts at `1 - v/2` and grows by one each time the
    /// running sum of `v` wraps the room count, so valuable templates get
    /// weight only in the later part of the table.
    fn build_weights(&mut self) -> u32 {
        let count = self.rooms.len() as u32;
        let step = self.catalog[self.current].value / 8;
        let mut acc = 0u32;
        let mut multiplier = 1 - i64::from(step >> 1);
        let mut total = 0;

        for (weight, mark) in self.weights.iter_mut().zip(&self.marks) {
            acc += step;
            while acc >= count {
                acc -= count;
                multiplier += 1;
            }

            *weight = if multiplier > 0 && *mark == Mark::Free {
                multiplier as u32
            } else {
                0
            };
            total += *weight;
        }
        total
    }

    /// Frees blocked rooms; with none to free the instance is abandoned.
    fn release(&mut self) -> Step {
        let mut released = 0;
        for mark in self.marks.iter_mut().filter(|m| **m == Mark::Blocked) {
            *mark = Mark::Free;
            released += 1;
        }

        if released == 0 {
            warn!(
                "no room left for '{}', dropping one",
                self.catalog[self.current].name
            );
            Step::NextInstance
        } else {
            trace!("released {} blocked rooms", released);
            Step::BuildWeights
        }
    }

    /// Draws in `[1, total]` and walks the weights down to the chosen room.
    fn pick_room<R: DungeonRng>(&mut self, rng: &mut R, total: u32) -> Step {
        let mut left = i64::from(rng.random_below(total)) + 1;
        for (room, &weight) in self.weights.iter().enumerate() {
            left -= i64::from(weight);
            if left <= 0 {
                return Step::Record { room };
            }
        }
        Step::Release
    }

    fn record(&mut self, room: usize) -> Step {
        let template = self.current;
        let id = BASE_TREASURE_ID + template as u16;
        let handle = RoomId::from_index(room);

        trace!("T{} '{}' to room {}", id, self.catalog[template].name, handle);
        self.placed.push(TreasureInstance {
            id,
            template,
            room: handle,
            pos: self.rooms[room].rect.center().to_display(),
        });

        self.marks[room] = Mark::Taken;
        let neighbours = [room.checked_sub(1), Some(room + 1)];
        for i in neighbours.into_iter().flatten() {
            if let Some(mark) = self.marks.get_mut(i) {
                if *mark == Mark::Free {
                    *mark = Mark::Blocked;
                }
            }
        }
        Step::NextInstance
    }

    fn next_instance(&mut self) -> Step {
        let remaining = &mut self.remaining[self.current];
        match *remaining {
            Remaining::Left(n) if n > 1 => {
                *remaining = Remaining::Left(n - 1);
                Step::BuildWeights
            }
            _ => {
                *remaining = Remaining::Allocated;
                Step::SelectTemplate
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FeatureKind, FixedRng, Rect};

    fn rooms(count: usize) -> Vec<Room> {
        (0..count)
            .map(|i| {
                let x = 1 + (i as i32 % 8) * 7;
                let y = 1 + (i as i32 / 8) * 7;
                Room::new(Rect::new(x, y, x + 5, y + 5), FeatureKind::Room)
            })
            .collect()
    }

    #[test]
    fn test_instances_count_zero_is_one() {
        assert_eq!(TreasureTemplate::new("a", 1, 0).instances(), 1);
        assert_eq!(TreasureTemplate::new("a", 1, 3).instances(), 3);
    }

    #[test]
    fn test_default_catalog_fits() {
        let catalog = default_catalog();
        let total: u32 = catalog.iter().map(|t| t.instances()).sum();
        assert!(total as usize <= GenerationConfig::default().max_treasures);
    }

    #[test]
    fn test_most_valuable_first() {
        let catalog = vec![
            TreasureTemplate::new("cheap", 8, 1),
            TreasureTemplate::new("dear", 80, 1),
        ];
        let placed = distribute_treasure(&catalog, &rooms(10), &GenerationConfig::default(), &mut FixedRng::Min)
            .unwrap();
        assert_eq!(placed.len(), 2);
        assert_eq!(placed[0].template, 1);
        assert_eq!(placed[0].id, 102);
        assert_eq!(placed[1].id, 101);
    }

    #[test]
    fn test_equal_values_prefer_later_entry() {
        let catalog = vec![
            TreasureTemplate::new("first", 16, 1),
            TreasureTemplate::new("second", 16, 1),
        ];
        let placed = distribute_treasure(&catalog, &rooms(10), &GenerationConfig::default(), &mut FixedRng::Min)
            .unwrap();
        assert_eq!(placed[0].template, 1);
    }

    #[test]
    fn test_blocked_rooms_released_when_needed() {
        // room 1 is excluded, leaving table indices 1 and 2
        let catalog = vec![TreasureTemplate::new("coin", 0, 2)];
        let placed = distribute_treasure(&catalog, &rooms(3), &GenerationConfig::default(), &mut FixedRng::Min)
            .unwrap();
        let taken: Vec<usize> = placed.iter().map(|t| t.room.index()).collect();
        assert_eq!(taken, vec![1, 2]);
    }

    #[test]
    fn test_instance_dropped_when_no_room() {
        let catalog = vec![TreasureTemplate::new("coin", 0, 3)];
        let placed = distribute_treasure(&catalog, &rooms(3), &GenerationConfig::default(), &mut FixedRng::Min)
            .unwrap();
        assert_eq!(placed.len(), 2);
    }

    #[test]
    fn test_corridors_excluded() {
        let mut table = rooms(6);
        for room in table.iter_mut().skip(1).step_by(2) {
            room.kind = FeatureKind::Corridor;
        }
        let catalog = vec![TreasureTemplate::new("coin", 8, 5)];
        let placed = distribute_treasure(&catalog, &table, &GenerationConfig::default(), &mut FixedRng::Max)
            .unwrap();
        assert!(!placed.is_empty());
        for t in &placed {
            assert!(!table[t.room.index()].is_corridor());
            assert_ne!(t.room.index(), 0);
        }
    }

    #[test]
    fn test_position_is_room_center() {
        let table = rooms(2);
        let catalog = vec![TreasureTemplate::new("coin", 0, 1)];
        let placed = distribute_treasure(&catalog, &table, &GenerationConfig::default(), &mut FixedRng::Min)
            .unwrap();
        assert_eq!(placed[0].pos, table[1].rect.center().to_display());
    }

    #[test]
    fn test_catalog_capacity() {
        let mut config = GenerationConfig::default();
        config.max_treasures = 2;
        let catalog = vec![TreasureTemplate::new("coin", 8, 3)];
        let err = distribute_treasure(&catalog, &rooms(10), &config, &mut FixedRng::Min).unwrap_err();
        assert!(matches!(
            err,
            DelveError::CapacityExceeded(Capacity::Treasures { requested: 3, limit: 2 })
        ));
    }

    #[test]
    fn test_no_rooms() {
        let placed =
            distribute_treasure(&default_catalog(), &[], &GenerationConfig::default(), &mut FixedRng::Min).unwrap();
        assert!(placed.is_empty());
    }

    #[test]
    fn test_room_table_beyond_handles_is_rejected() {
        let table = vec![Room::new(Rect::new(1, 1, 4, 4), FeatureKind::Room); u16::MAX as usize + 1];
        let catalog = vec![TreasureTemplate::new("coin", 8, 1)];
        let err = distribute_treasure(&catalog, &table, &GenerationConfig::default(), &mut FixedRng::Min)
            .unwrap_err();
        assert!(matches!(err, DelveError::InvalidLayout(_)));
    }
}
