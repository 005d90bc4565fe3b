//! # Generation Module
//!
//! Procedural generation of dungeon layouts and treasure distribution.
//!
//! A [`DungeonBuilder`] session owns the scratch [`Grid`] and the room and
//! exit tables for one attempt. The [`DungeonGenerator`] driver repeats
//! attempts until one finishes, and [`distribute_treasure`] then places a
//! treasure catalog across the finished rooms.

pub mod dungeon;
pub mod exits;
pub mod finalize;
pub mod grid;
pub mod lines;
pub mod placement;
pub mod rect;
pub mod rng;
pub mod treasure;

pub use dungeon::*;
pub use exits::*;
pub use grid::*;
pub use lines::*;
pub use rect::*;
pub use rng::*;
pub use treasure::*;

use crate::config;
use crate::{DelveError, DelveResult};
use serde::{Deserialize, Serialize};

/// Configuration for dungeon generation.
///
/// Controls the grid size, feature dimensions, and the capacities of the
/// fixed tables that bound a single generation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Grid width in cells
    pub width: u32,
    /// Grid height in cells
    pub height: u32,
    /// Minimum room interior width
    pub min_room_width: u32,
    /// Maximum room interior width
    pub max_room_width: u32,
    /// Minimum room interior height
    pub min_room_height: u32,
    /// Maximum room interior height
    pub max_room_height: u32,
    /// Shortest corridor
    pub min_corridor_length: u32,
    /// Longest corridor that may end in a merge with existing walls
    pub max_corridor_length: u32,
    /// How far a corridor scan looks for something to connect to
    pub max_corridor_connect: u32,
    /// Chance of a room rather than a corridor, out of 128
    pub room_chance: u32,
    /// Generation stops once this many features are placed
    pub max_features: usize,
    /// Doors a single room may hold
    pub max_room_exits: usize,
    /// Capacity of the exit table
    pub max_exits: usize,
    /// Exit picks per feature before the dungeon counts as full
    pub placement_tries: u32,
    /// Room placements attempted at the end of a long corridor
    pub corridor_room_tries: u32,
    /// Capacity of the treasure table
    pub max_treasures: usize,
    /// Bound on whole-pipeline retries; `None` retries until success
    pub max_attempts: Option<u32>,
}

impl GenerationConfig {
    /// Creates a default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(7);
    /// assert_eq!(config.width, 64);
    /// assert!(config.max_room_width >= config.min_room_width);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(seed: u64) -> Self {
        let max_features = config::DEFAULT_MAX_FEATURES;
        Self {
            seed,
            width: config::DEFAULT_DUNGEON_WIDTH,
            height: config::DEFAULT_DUNGEON_HEIGHT,
            min_room_width: 4,
            max_room_width: 6,
            min_room_height: 4,
            max_room_height: 7,
            min_corridor_length: 4,
            max_corridor_length: 7,
            max_corridor_connect: 10,
            room_chance: 64,
            max_features,
            max_room_exits: 7,
            // if every feature were a room this could still be exceeded
            max_exits: (max_features + 1) * 3 + 2,
            placement_tries: 256,
            corridor_room_tries: 3,
            max_treasures: config::DEFAULT_MAX_TREASURES,
            max_attempts: None,
        }
    }

    /// Creates a configuration for testing with a bounded retry driver.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            max_attempts: Some(1000),
            ..Self::new(seed)
        }
    }

    /// Capacity of the room table: one more than the feature target, since a
    /// corridor ending in a room adds two features at once.
    pub fn max_rooms(&self) -> usize {
        self.max_features + 1
    }

    /// Rejects configurations that cannot produce a dungeon.
    pub fn validate(&self) -> DelveResult<()> {
        let invalid = |msg: String| Err(DelveError::InvalidConfig(msg));

        if self.min_room_width < 3 || self.min_room_height < 3 {
            return invalid("rooms need an interior of at least 3x3".to_string());
        }
        if self.min_room_width > self.max_room_width
            || self.min_room_height > self.max_room_height
        {
            return invalid("room size range is empty".to_string());
        }
        if self.min_corridor_length == 0
            || self.min_corridor_length > self.max_corridor_length
            || self.max_corridor_length > self.max_corridor_connect
        {
            return invalid(format!(
                "corridor lengths must satisfy 0 < {} <= {} <= {}",
                self.min_corridor_length, self.max_corridor_length, self.max_corridor_connect
            ));
        }
        if self.room_chance > config::ROOM_CHANCE_DENOMINATOR {
            return invalid(format!(
                "room chance {} exceeds {}",
                self.room_chance,
                config::ROOM_CHANCE_DENOMINATOR
            ));
        }
        if self.width < self.max_room_width + 4 || self.height < self.max_room_height + 4 {
            return invalid(format!(
                "{}x{} grid cannot hold the largest room",
                self.width, self.height
            ));
        }
        if self.width > i32::MAX as u32 || self.height > i32::MAX as u32 {
            return invalid("grid dimensions overflow".to_string());
        }
        if self.width.checked_mul(self.height).is_none() {
            return invalid(format!(
                "{}x{} grid has too many cells",
                self.width, self.height
            ));
        }
        if self.max_features == 0 || self.max_features >= u16::MAX as usize {
            return invalid(format!("feature count {} out of range", self.max_features));
        }
        if self.max_exits >= u16::MAX as usize {
            return invalid(format!("exit table of {} overflows handles", self.max_exits));
        }
        if self.placement_tries == 0 || self.corridor_room_tries == 0 {
            return invalid("retry counts must be positive".to_string());
        }
        if self.max_attempts == Some(0) {
            return invalid("max_attempts must be positive".to_string());
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Trait for procedural generators.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random source.
    fn generate<R: DungeonRng>(&self, config: &GenerationConfig, rng: &mut R) -> DelveResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> DelveResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation.
pub mod utils {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_config_creation() {
        let config = GenerationConfig::new(12345);
        assert_eq!(config.seed, 12345);
        assert_eq!(config.max_exits, 155);
        assert_eq!(config.max_rooms(), 51);
        assert_eq!(config.max_attempts, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_testing_config_is_bounded() {
        let config = GenerationConfig::for_testing(1);
        assert!(config.max_attempts.is_some());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_ranges() {
        let mut config = GenerationConfig::default();
        config.min_room_width = 8;
        assert!(matches!(config.validate(), Err(DelveError::InvalidConfig(_))));

        let mut config = GenerationConfig::default();
        config.max_corridor_length = 12;
        assert!(config.validate().is_err());

        let mut config = GenerationConfig::default();
        config.room_chance = 200;
        assert!(config.validate().is_err());

        let mut config = GenerationConfig::default();
        config.width = 8;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_oversized_grid() {
        let mut config = GenerationConfig::default();
        config.width = 70_000;
        config.height = 70_000;
        assert!(matches!(config.validate(), Err(DelveError::InvalidConfig(_))));
        assert!(matches!(
            DungeonBuilder::new(&config),
            Err(DelveError::InvalidConfig(_))
        ));

        config.height = 60_000;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = GenerationConfig::for_testing(99);
        let json = serde_json::to_string(&config).unwrap();
        let back: GenerationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_utils_rng_is_seeded() {
        let config = GenerationConfig::new(12345);
        let mut a = utils::create_rng(&config);
        let mut b = utils::create_rng(&config);
        let xs: Vec<u32> = (0..8).map(|_| a.random_below(1000)).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.random_below(1000)).collect();
        assert_eq!(xs, ys);
    }
}
