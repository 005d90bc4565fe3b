//! # Text Rendering
//!
//! Character dumps of a finished dungeon for terminals and logs.

use crate::{Cell, Dungeon, TreasureInstance, TreasureTemplate, WallMask};
use serde::{Deserialize, Serialize};

/// Character set for wall glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Charset {
    #[default]
    Ascii,
    /// Box-drawing characters.
    Unicode,
}

/// Layout totals printed under a map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonStats {
    pub rooms: usize,
    pub corridors: usize,
    pub doors: usize,
    pub features: usize,
    pub hlines: usize,
    pub vlines: usize,
    pub attempts: u32,
}

impl DungeonStats {
    pub fn of(dungeon: &Dungeon) -> Self {
        Self {
            rooms: dungeon.room_count(),
            corridors: dungeon.corridor_count,
            doors: dungeon.door_count(),
            features: dungeon.rooms.len(),
            hlines: dungeon.hlines.len(),
            vlines: dungeon.vlines.len(),
            attempts: dungeon.attempts,
        }
    }
}

impl std::fmt::Display for DungeonStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Number of rooms: {}", self.rooms)?;
        writeln!(f, "Number of corridors: {}", self.corridors)?;
        writeln!(f, "Number of doors: {}", self.doors)?;
        writeln!(f, "Total features: {}", self.features)?;
        writeln!(f, "Total hlines: {}", self.hlines)?;
        writeln!(f, "Total vlines: {}", self.vlines)?;
        write!(f, "Attempts: {}", self.attempts)
    }
}

/// Renders dungeons as text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer {
    pub charset: Charset,
}

impl TextRenderer {
    pub fn new(charset: Charset) -> Self {
        Self { charset }
    }

    /// Glyph for one cell.
    pub fn glyph(&self, cell: Cell) -> char {
        match cell {
            Cell::Unused => '.',
            Cell::Floor => ' ',
            Cell::Door => '+',
            Cell::Wall(mask) => match self.charset {
                Charset::Ascii => ascii_wall(mask),
                Charset::Unicode => box_wall(mask),
            },
        }
    }

    /// The whole grid, one line per row, with room numbers written across
    /// the middle of each feature.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{DungeonGenerator, GenerationConfig, Generator, TextRenderer};
    /// use delve::generation::utils;
    ///
    /// let config = GenerationConfig::for_testing(11);
    /// let mut rng = utils::create_rng(&config);
    /// let dungeon = DungeonGenerator::new().generate(&config, &mut rng).unwrap();
    ///
    /// let map = TextRenderer::default().render_map(&dungeon);
    /// assert_eq!(map.lines().count(), 48);
    /// ```
    pub fn render_map(&self, dungeon: &Dungeon) -> String {
        let (width, height) = (dungeon.grid.width() as usize, dungeon.grid.height() as usize);
        let mut rows: Vec<Vec<char>> = (0..height).map(|_| Vec::with_capacity(width)).collect();
        for (pos, cell) in dungeon.grid.iter() {
            rows[pos.y as usize].push(self.glyph(cell));
        }

        for room in &dungeon.rooms {
            let Some(number) = room.number else { continue };
            let center = room.rect.center();
            let label = format!("{:>2}", number);
            let x = (center.x - 1).max(0) as usize;
            for (offset, ch) in label.chars().enumerate() {
                if let Some(slot) = rows[center.y as usize].get_mut(x + offset) {
                    *slot = ch;
                }
            }
        }

        let mut out = String::with_capacity((width + 1) * height);
        for row in rows {
            out.extend(row);
            out.push('\n');
        }
        out
    }

    /// Doors of each feature by room number, `nowhere` for outside doors.
    pub fn render_connections(&self, dungeon: &Dungeon) -> String {
        let graph = dungeon.graph();
        let label = |number: Option<u16>| number.map_or_else(|| "?".to_string(), |n| n.to_string());

        let mut out = String::new();
        for (index, room) in dungeon.rooms.iter().enumerate() {
            out.push_str(&format!("({}) ->", label(room.number)));
            for other in graph.neighbours(crate::RoomId::from_index(index)) {
                match other {
                    Some(other) => {
                        out.push_str(&format!(" {}", label(dungeon.room(other).number)));
                    }
                    None => out.push_str(" nowhere"),
                }
            }
            out.push('\n');
        }
        out
    }

    /// One line per placed treasure.
    pub fn render_treasure(&self, dungeon: &Dungeon, catalog: &[TreasureTemplate], placed: &[TreasureInstance]) -> String {
        let mut out = String::new();
        for treasure in placed {
            let name = catalog.get(treasure.template).map_or("?", |t| t.name.as_str());
            let number = dungeon.room(treasure.room).number.unwrap_or(0);
            out.push_str(&format!("T{} {} in room {}\n", treasure.id, name, number));
        }
        out
    }
}

fn ascii_wall(mask: WallMask) -> char {
    if mask == WallMask::VERTICAL {
        '|'
    } else if mask == WallMask::HORIZONTAL {
        '-'
    } else {
        '#'
    }
}

fn box_wall(mask: WallMask) -> char {
    const N: u8 = WallMask::NORTH.bits();
    const E: u8 = WallMask::EAST.bits();
    const S: u8 = WallMask::SOUTH.bits();
    const W: u8 = WallMask::WEST.bits();

    match mask.bits() {
        b if b == N | S => '\u{2502}',
        b if b == E | W => '\u{2500}',
        b if b == E | S => '\u{250c}',
        b if b == N | E => '\u{2514}',
        b if b == W | S => '\u{2510}',
        b if b == N | W => '\u{2518}',
        b if b == W | E | S => '\u{252c}',
        b if b == W | E | N => '\u{2534}',
        b if b == N | S | W => '\u{2524}',
        b if b == N | S | E => '\u{251c}',
        b if b == N | S | E | W => '\u{253c}',
        _ => '?',
    }
}
