//! Map file parsing

use thiserror::Error;

use super::{SoccerMap, Tile};
use crate::constants::{DEFAULT_TILE_SIZE, MAX_TILE_SIZE};
use crate::env::Team;

/// Errors raised while loading a map
#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("map has no rows")]
    EmptyGrid,
    #[error("row {row} has {found} tiles, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown tile '{tile}' at ({x}, {y})")]
    UnknownTile { tile: char, x: usize, y: usize },
    #[error("invalid tile size '{0}'")]
    InvalidTileSize(String),
    #[error("no spawn area for team {0}")]
    MissingSpawn(Team),
    #[error("no goal area for team {0}")]
    MissingGoal(Team),
}

fn parse_tile(c: char) -> Option<Tile> {
    match c {
        '#' => Some(Tile::Wall),
        '.' => Some(Tile::Ground),
        'P' => Some(Tile::Spawn(Team::Player)),
        'C' => Some(Tile::Spawn(Team::Computer)),
        'p' => Some(Tile::Goal(Team::Player)),
        'c' => Some(Tile::Goal(Team::Computer)),
        _ => None,
    }
}

/// Parse a map from the text format
pub fn parse_map(content: &str) -> Result<SoccerMap, MapError> {
    let mut name = String::from("Untitled");
    let mut tile_size = DEFAULT_TILE_SIZE;
    let mut rows: Vec<&str> = Vec::new();

    for line in content.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(value) = line.strip_prefix("name:") {
            name = value.trim().to_string();
        } else if let Some(value) = line.strip_prefix("tile_size:") {
            let value = value.trim();
            tile_size = match value.parse::<u32>() {
                Ok(size) if (1..=MAX_TILE_SIZE).contains(&size) => size,
                _ => return Err(MapError::InvalidTileSize(value.to_string())),
            };
        } else if let Some(row) = line.strip_prefix("row:") {
            rows.push(row.trim());
        }
    }

    let Some(first) = rows.first() else {
        return Err(MapError::EmptyGrid);
    };
    let width = first.chars().count();
    if width == 0 {
        return Err(MapError::EmptyGrid);
    }

    let mut tiles = Vec::with_capacity(width * rows.len());
    for (y, row) in rows.iter().enumerate() {
        let found = row.chars().count();
        if found != width {
            return Err(MapError::RaggedRow {
                row: y,
                expected: width,
                found,
            });
        }
        for (x, c) in row.chars().enumerate() {
            let tile = parse_tile(c).ok_or(MapError::UnknownTile { tile: c, x, y })?;
            tiles.push(tile);
        }
    }

    let map = SoccerMap::from_tiles(name, tile_size, width as i32, rows.len() as i32, tiles);

    for team in Team::ALL {
        if map.spawn_area(team).is_empty() {
            return Err(MapError::MissingSpawn(team));
        }
        if map.goal_area(team).is_empty() {
            return Err(MapError::MissingGoal(team));
        }
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::TilePos;

    const SMALL: &str = r#"
# tiny field
name: Tiny
tile_size: 16
row: #####
row: cP.Cp
row: #####
"#;

    #[test]
    fn test_parse_small_map() {
        let map = parse_map(SMALL).unwrap();
        assert_eq!(map.name, "Tiny");
        assert_eq!(map.tile_size, 16);
        assert_eq!((map.width, map.height), (5, 3));
        assert_eq!(map.spawn_area(Team::Player), &[TilePos::new(1, 1)]);
        assert_eq!(map.spawn_area(Team::Computer), &[TilePos::new(3, 1)]);
        assert_eq!(map.goal_area(Team::Player), &[TilePos::new(4, 1)]);
        assert_eq!(map.goal_area(Team::Computer), &[TilePos::new(0, 1)]);
        // Goals and spawns are walkable
        assert!(map.is_walkable(TilePos::new(0, 1)));
        assert!(map.is_walkable(TilePos::new(3, 1)));
        assert!(!map.is_walkable(TilePos::new(2, 0)));
    }

    #[test]
    fn test_tile_size_defaults() {
        let map = parse_map("row: cPCp").unwrap();
        assert_eq!(map.tile_size, DEFAULT_TILE_SIZE);
        assert_eq!(map.name, "Untitled");
    }

    #[test]
    fn test_rejects_bad_maps() {
        assert!(matches!(parse_map("name: Empty"), Err(MapError::EmptyGrid)));
        assert!(matches!(
            parse_map("row: cPCp\nrow: ##"),
            Err(MapError::RaggedRow { row: 1, expected: 4, found: 2 })
        ));
        assert!(matches!(
            parse_map("row: cPxCp"),
            Err(MapError::UnknownTile { tile: 'x', x: 2, y: 0 })
        ));
        assert!(matches!(
            parse_map("row: c.Cp"),
            Err(MapError::MissingSpawn(Team::Player))
        ));
        assert!(matches!(
            parse_map("row: cPC."),
            Err(MapError::MissingGoal(Team::Player))
        ));
        assert!(matches!(
            parse_map("tile_size: 0\nrow: cPCp"),
            Err(MapError::InvalidTileSize(_))
        ));
        assert!(matches!(
            parse_map("tile_size: 4294967295\nrow: cPCp"),
            Err(MapError::InvalidTileSize(_))
        ));
        assert!(parse_map(&format!("tile_size: {}\nrow: cPCp", MAX_TILE_SIZE)).is_ok());
    }
}
