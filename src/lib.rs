//! # Delve
//!
//! Procedural dungeon layouts for a tile-based exploration game.
//!
//! ## Architecture Overview
//!
//! The crate generates one connected dungeon at a time and then scatters a
//! catalog of treasures across it:
//!
//! - **Grid**: a fixed-size cell buffer of floor, doors, and wall segments
//! - **Placement Engine**: grows the dungeon one room or corridor at a time
//!   from unresolved exits
//! - **Connectivity Graph**: exits link rooms; breadth-first labeling numbers
//!   the rooms by distance from the entrance
//! - **Finalizer**: resolves leftover exits and elects the entrance and exit
//! - **Treasure Distributor**: places valuable items toward rooms added
//!   later in generation
//!
//! Rendering, input, and the play loop are collaborators that only read the
//! generated [`Dungeon`].

pub mod game;
pub mod generation;
pub mod rendering;

pub use game::*;
pub use generation::*;
pub use rendering::*;

/// Fixed-capacity table that refused another entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    /// A room already holds `limit` doors.
    RoomExits { room: RoomId, limit: usize },
    /// The global exit table holds `limit` exits.
    Exits { limit: usize },
    /// The room table holds `limit` features.
    Rooms { limit: usize },
    /// The catalog asks for more treasure instances than the table holds.
    Treasures { requested: usize, limit: usize },
}

impl std::fmt::Display for Capacity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capacity::RoomExits { room, limit } => {
                write!(f, "room {} exit list is full ({} exits)", room, limit)
            }
            Capacity::Exits { limit } => write!(f, "exit table is full ({} exits)", limit),
            Capacity::Rooms { limit } => write!(f, "room table is full ({} features)", limit),
            Capacity::Treasures { requested, limit } => write!(
                f,
                "catalog requests {} treasures but only {} fit",
                requested, limit
            ),
        }
    }
}

/// Core error type for dungeon generation.
#[derive(thiserror::Error, Debug)]
pub enum DelveError {
    /// A fixed-capacity table overflowed; the generation attempt is void.
    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(Capacity),

    /// The finalizer found no west-side entrance or no east-side exit.
    #[error("Finished layout has no entrance or no exit")]
    EntranceExitNotFound,

    /// The bounded retry driver gave up.
    #[error("Generation failed after {attempts} attempts")]
    AttemptsExhausted { attempts: u32 },

    /// Configuration cannot produce a dungeon.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A finished layout broke one of its structural guarantees.
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl DelveError {
    /// True for overflow of a fixed-capacity table.
    pub fn is_capacity(&self) -> bool {
        matches!(self, DelveError::CapacityExceeded(_))
    }
}

/// Result type used throughout the Delve codebase.
pub type DelveResult<T> = Result<T, DelveError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Generation constants.
pub mod config {
    /// Default dungeon width in cells
    pub const DEFAULT_DUNGEON_WIDTH: u32 = 64;

    /// Default dungeon height in cells
    pub const DEFAULT_DUNGEON_HEIGHT: u32 = 48;

    /// Default number of features (rooms plus corridors) per dungeon
    pub const DEFAULT_MAX_FEATURES: usize = 50;

    /// Room probability is expressed as a fraction of this value
    pub const ROOM_CHANCE_DENOMINATOR: u32 = 128;

    /// Finest display zoom is `1 << SCALE_BITS`
    pub const SCALE_BITS: u32 = 3;

    /// Treasure ids are the catalog index plus this base
    pub const BASE_TREASURE_ID: u16 = 101;

    /// Default capacity of the treasure table
    pub const DEFAULT_MAX_TREASURES: usize = 30;
}
