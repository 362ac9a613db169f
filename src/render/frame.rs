//! Software frame renderer
//!
//! Draws the field once into a background image, then draws agents and the
//! ball on a copy of it for every frame.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_circle_mut};
use imageproc::rect::Rect;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::constants::*;
use crate::env::{SoccerState, Team};
use crate::map::{SoccerMap, Tile, TilePos};

/// Renders soccer states to RGB images
pub struct FrameRenderer {
    map: Arc<SoccerMap>,
    background: RgbImage,
}

impl FrameRenderer {
    pub fn new(map: Arc<SoccerMap>) -> Self {
        let background = draw_background(&map);
        Self { map, background }
    }

    pub fn tile_size(&self) -> u32 {
        self.map.tile_size
    }

    /// Size of a full frame in pixels (width, height)
    pub fn display_size(&self) -> (u32, u32) {
        self.map.pixel_size()
    }

    /// Full frame of a state
    pub fn render(&self, state: &SoccerState) -> RgbImage {
        let mut frame = self.background.clone();
        let ts = self.map.tile_size as f32;
        let body_radius = ((ts * AGENT_RADIUS_FRACTION).round() as i32).max(1);
        let ball_radius = ((ts * BALL_RADIUS_FRACTION).round() as i32).max(1);

        for (agent_index, agent) in state.agents.iter().enumerate() {
            let (cx, cy) = tile_center(agent.pos, self.map.tile_size);
            let color = Rgb(agent_color(state, agent_index));
            draw_filled_circle_mut(&mut frame, (cx, cy), body_radius, color);
            draw_hollow_circle_mut(&mut frame, (cx, cy), body_radius, Rgb(OUTLINE_COLOR));

            if agent.has_ball {
                // Ball sits at the agent's feet, lower right
                let offset = body_radius - ball_radius / 2;
                let ball_center = (cx + offset, cy + offset);
                draw_filled_circle_mut(&mut frame, ball_center, ball_radius, Rgb(BALL_COLOR));
                draw_hollow_circle_mut(&mut frame, ball_center, ball_radius, Rgb(OUTLINE_COLOR));
            }
        }

        frame
    }

    /// Full screenshot, rows top to bottom
    pub fn screenshot(&self, state: &SoccerState) -> RgbImage {
        self.render(state)
    }

    /// Partially observable screenshot centered on an agent
    ///
    /// The image is a square of `tile_size * (2 * radius + 1)` pixels with the
    /// agent's tile in the middle. Parts outside the map are black.
    pub fn po_screenshot(&self, state: &SoccerState, agent_index: usize, radius: u32) -> RgbImage {
        let frame = self.render(state);
        let ts = self.map.tile_size as i64;
        let side = self.map.tile_size * (2 * radius + 1);
        let pos = state.agent_pos(agent_index);

        // Top-left corner of the crop area in frame pixels (may be negative)
        let crop_x = ts * (pos.x as i64 - radius as i64);
        let crop_y = ts * (pos.y as i64 - radius as i64);

        let mut po = RgbImage::new(side, side);
        image::imageops::overlay(&mut po, &frame, -crop_x, -crop_y);
        po
    }
}

fn tile_center(pos: TilePos, tile_size: u32) -> (i32, i32) {
    let ts = tile_size as i32;
    (pos.x * ts + ts / 2, pos.y * ts + ts / 2)
}

/// Body color of an agent by team and team member index
pub fn agent_color(state: &SoccerState, agent_index: usize) -> [u8; 3] {
    let team = state.team_of(agent_index);
    let member = (agent_index - state.team_size * team.index()).min(1);
    match team {
        Team::Player => PLAYER_COLORS[member],
        Team::Computer => COMPUTER_COLORS[member],
    }
}

/// Fill color of a map tile
pub fn tile_color(tile: Tile, pos: TilePos) -> [u8; 3] {
    match tile {
        Tile::Wall => WALL_COLOR,
        Tile::Ground if pos.x % 2 == 0 => GROUND_LIGHT,
        Tile::Ground => GROUND_DARK,
        Tile::Spawn(_) => SPAWN_TINT,
        Tile::Goal(Team::Player) => PLAYER_GOAL_COLOR,
        Tile::Goal(Team::Computer) => COMPUTER_GOAL_COLOR,
    }
}

fn draw_background(map: &SoccerMap) -> RgbImage {
    let (width, height) = map.pixel_size();
    let ts = map.tile_size;
    let mut image = RgbImage::new(width, height);

    for y in 0..map.height {
        for x in 0..map.width {
            let pos = TilePos::new(x, y);
            let Some(tile) = map.tile(pos) else {
                continue;
            };
            let rect = Rect::at(x * ts as i32, y * ts as i32).of_size(ts, ts);
            draw_filled_rect_mut(&mut image, rect, Rgb(tile_color(tile, pos)));
        }
    }

    // Halfway line across the walkable part of the middle column
    let line_width = (ts / 16).max(1);
    let mid = map.width / 2;
    for y in 0..map.height {
        if map.is_walkable(TilePos::new(mid, y)) {
            let rect = Rect::at(mid * ts as i32, y * ts as i32).of_size(line_width, ts);
            draw_filled_rect_mut(&mut image, rect, Rgb(LINE_COLOR));
        }
    }

    image
}

/// Save an image as PNG, creating parent directories
pub fn save_png(image: &RgbImage, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
    }
    image
        .save(path)
        .map_err(|e| format!("Failed to save {}: {}", path.display(), e))
}
