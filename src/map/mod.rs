//! Tile map - the soccer field layout
//!
//! Maps are plain text files (see `assets/maps/soccer.txt`). The map decides
//! which tiles are walkable and where each team spawns and scores.

mod parser;

pub use parser::{MapError, parse_map};

use bevy::log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::env::Team;

/// Map compiled into the crate, used when no map file is available
const BUILTIN_MAP: &str = include_str!("../../assets/maps/soccer.txt");

/// Grid coordinate (x grows right, y grows down)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for TilePos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

/// Single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Ground,
    /// Ground where agents of the team may spawn
    Spawn(Team),
    /// Ground where a ball holder of the team wins
    Goal(Team),
}

impl Tile {
    pub fn is_walkable(&self) -> bool {
        !matches!(self, Tile::Wall)
    }
}

/// Loaded soccer field
#[derive(Debug, Clone)]
pub struct SoccerMap {
    pub name: String,
    pub tile_size: u32,
    pub width: i32,
    pub height: i32,
    /// Row-major tiles, `width * height` entries
    pub tiles: Vec<Tile>,
    walkable: HashSet<TilePos>,
    /// Spawn tiles indexed by `Team::index()`
    spawn: [Vec<TilePos>; 2],
    /// Goal tiles indexed by `Team::index()`
    goals: [Vec<TilePos>; 2],
}

impl SoccerMap {
    /// Build a map from a validated tile grid
    pub(crate) fn from_tiles(name: String, tile_size: u32, width: i32, height: i32, tiles: Vec<Tile>) -> Self {
        let mut walkable = HashSet::new();
        let mut spawn: [Vec<TilePos>; 2] = [Vec::new(), Vec::new()];
        let mut goals: [Vec<TilePos>; 2] = [Vec::new(), Vec::new()];

        for y in 0..height {
            for x in 0..width {
                let pos = TilePos::new(x, y);
                let tile = tiles[(y * width + x) as usize];
                if tile.is_walkable() {
                    walkable.insert(pos);
                }
                match tile {
                    Tile::Spawn(team) => spawn[team.index()].push(pos),
                    Tile::Goal(team) => goals[team.index()].push(pos),
                    Tile::Wall | Tile::Ground => {}
                }
            }
        }

        Self {
            name,
            tile_size,
            width,
            height,
            tiles,
            walkable,
            spawn,
            goals,
        }
    }

    /// Load a map file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.display().to_string(),
            source,
        })?;
        parse_map(&content)
    }

    /// Load a map file, falling back to the built-in map on error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(map) => map,
            Err(e) => {
                warn!("Failed to load map from {}: {}, using built-in map", path.display(), e);
                Self::builtin()
            }
        }
    }

    /// The map shipped with the crate
    pub fn builtin() -> Self {
        match parse_map(BUILTIN_MAP) {
            Ok(map) => map,
            Err(e) => panic!("Built-in map is invalid: {}", e),
        }
    }

    pub fn in_bounds(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    /// Tile at a position, `None` outside the grid
    pub fn tile(&self, pos: TilePos) -> Option<Tile> {
        if !self.in_bounds(pos) {
            return None;
        }
        Some(self.tiles[(pos.y * self.width + pos.x) as usize])
    }

    pub fn is_walkable(&self, pos: TilePos) -> bool {
        self.walkable.contains(&pos)
    }

    pub fn spawn_area(&self, team: Team) -> &[TilePos] {
        &self.spawn[team.index()]
    }

    pub fn goal_area(&self, team: Team) -> &[TilePos] {
        &self.goals[team.index()]
    }

    pub fn is_goal(&self, team: Team, pos: TilePos) -> bool {
        self.goals[team.index()].contains(&pos)
    }

    /// Size of the rendered map in pixels (width, height)
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            self.width as u32 * self.tile_size,
            self.height as u32 * self.tile_size,
        )
    }
}

impl Default for SoccerMap {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_map_layout() {
        let map = SoccerMap::builtin();
        assert_eq!(map.name, "Soccer");
        assert_eq!(map.width, 14);
        assert_eq!(map.height, 10);
        assert_eq!(map.tile_size, 32);
        assert_eq!(map.pixel_size(), (448, 320));
        assert_eq!(map.spawn_area(Team::Player).len(), 6);
        assert_eq!(map.spawn_area(Team::Computer).len(), 6);
        // Players attack the right side, computers the left
        assert!(map.goal_area(Team::Player).iter().all(|p| p.x == 13));
        assert!(map.goal_area(Team::Computer).iter().all(|p| p.x == 0));
    }

    #[test]
    fn test_walkable_tiles() {
        let map = SoccerMap::builtin();
        assert!(!map.is_walkable(TilePos::new(0, 0)));
        assert!(map.is_walkable(TilePos::new(1, 1)));
        assert!(map.is_walkable(TilePos::new(0, 4)));
        assert!(!map.is_walkable(TilePos::new(-1, 4)));
        assert!(!map.is_walkable(TilePos::new(14, 4)));
        assert_eq!(map.tile(TilePos::new(2, 2)), Some(Tile::Spawn(Team::Player)));
        assert_eq!(map.tile(TilePos::new(99, 2)), None);
    }

    #[test]
    fn test_load_or_default_falls_back() {
        let map = SoccerMap::load_or_default("does/not/exist.txt");
        assert_eq!(map.name, "Soccer");
    }
}
