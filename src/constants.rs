//! Tunable constants for the soccer environment
//!
//! Gameplay values, rendering colors and file locations are defined here.

// =============================================================================
// ENVIRONMENT
// =============================================================================

pub const MAX_TEAM_SIZE: usize = 2;
pub const DEFAULT_MAX_TIME_STEP: u32 = 100; // Episode length limit

pub const REWARD_PLAYER_WIN: f32 = 1.0;
pub const REWARD_COMPUTER_WIN: f32 = -1.0;
pub const REWARD_NONE: f32 = 0.0;

// =============================================================================
// FILES
// =============================================================================

pub const DEFAULT_MAP_FILE: &str = "assets/maps/soccer.txt";
pub const DEFAULT_TILE_SIZE: u32 = 32;
pub const MAX_TILE_SIZE: u32 = 1024;

// =============================================================================
// RENDER COLORS (RGB)
// =============================================================================

pub const GROUND_LIGHT: [u8; 3] = [88, 160, 72];
pub const GROUND_DARK: [u8; 3] = [76, 146, 62]; // Alternating stripes
pub const WALL_COLOR: [u8; 3] = [46, 52, 44];
pub const SPAWN_TINT: [u8; 3] = [104, 172, 88];
pub const PLAYER_GOAL_COLOR: [u8; 3] = [214, 214, 206]; // Goal the player attacks
pub const COMPUTER_GOAL_COLOR: [u8; 3] = [188, 176, 150]; // Goal the computer attacks
pub const LINE_COLOR: [u8; 3] = [232, 240, 228];

/// Body colors per team member (player team)
pub const PLAYER_COLORS: [[u8; 3]; 2] = [[52, 106, 214], [92, 168, 236]];
/// Body colors per team member (computer team)
pub const COMPUTER_COLORS: [[u8; 3]; 2] = [[206, 58, 52], [236, 128, 66]];

pub const BALL_COLOR: [u8; 3] = [250, 250, 245];
pub const OUTLINE_COLOR: [u8; 3] = [20, 20, 20];

/// Agent body radius as a fraction of the tile size
pub const AGENT_RADIUS_FRACTION: f32 = 0.38;
/// Ball radius as a fraction of the tile size
pub const BALL_RADIUS_FRACTION: f32 = 0.16;

// =============================================================================
// VIEWER
// =============================================================================

pub const VIEWER_TITLE: &str = "Soccer";
pub const VIEWER_SCALE: f32 = 2.0; // Window pixels per rendered pixel
pub const VIEWER_HUD_HEIGHT: f32 = 40.0;
