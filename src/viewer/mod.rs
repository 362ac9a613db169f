//! Interactive viewer - the field drawn with Bevy sprites
//!
//! Arrow keys move player 1 one tile per press (`.` stands still), `1` gives
//! player 1 the ball and `2` takes it away again. Space toggles random
//! auto-play, `R` starts a new episode and Escape quits.

mod control;

pub use control::{BallMemory, ViewerCommand};

use bevy::prelude::*;
use std::time::Duration;

use crate::constants::*;
use crate::env::{Action, EnvError, SoccerEnvironment};
use crate::map::{SoccerMap, TilePos};
use crate::render::{RendererOptions, agent_color, tile_color};
use crate::session::RandomAgent;

/// The environment being shown and what the keyboard did to it
#[derive(Resource)]
pub struct ViewerState {
    pub env: SoccerEnvironment,
    pub ball_memory: BallMemory,
    /// Drives the player team during auto-play
    pub agent: RandomAgent,
    pub episode: u32,
    pub last_reward: f32,
    pub total_reward: f32,
}

impl ViewerState {
    pub fn new(env: SoccerEnvironment, agent_seed: Option<u64>) -> Self {
        Self {
            env,
            ball_memory: BallMemory::default(),
            agent: RandomAgent::new(agent_seed),
            episode: 1,
            last_reward: REWARD_NONE,
            total_reward: REWARD_NONE,
        }
    }

    pub fn reset(&mut self) {
        self.env.reset();
        self.ball_memory.forget();
        self.episode += 1;
        self.last_reward = REWARD_NONE;
        self.total_reward = REWARD_NONE;
    }

    /// Move player 1, the other player agents stand
    pub fn step_player(&mut self, action: Action) -> Result<(), EnvError> {
        let mut actions = vec![Action::Stand; self.env.options().team_size];
        actions[0] = action;
        self.step(&actions)
    }

    /// Random actions for the whole player team
    pub fn step_random(&mut self) -> Result<(), EnvError> {
        let actions = self.agent.act(self.env.options().team_size);
        self.step(&actions)
    }

    /// A step from a terminal state starts the next episode instead
    fn step(&mut self, actions: &[Action]) -> Result<(), EnvError> {
        if self.env.is_terminal() {
            self.reset();
            return Ok(());
        }
        let observation = self.env.take_action(actions)?;
        self.last_reward = observation.reward;
        self.total_reward += observation.reward;
        if observation.done {
            match self.env.winner() {
                Some(team) => info!("Episode {}: {} wins", self.episode, team),
                None => info!("Episode {}: time limit reached", self.episode),
            }
        }
        Ok(())
    }

    pub fn apply(&mut self, command: ViewerCommand) -> Result<(), EnvError> {
        match command {
            ViewerCommand::Step(action) => self.step_player(action),
            ViewerCommand::GiveBall => self.ball_memory.give(&mut self.env, 0),
            ViewerCommand::RemoveBall => self.ball_memory.remove(&mut self.env, 0).map(|_| ()),
            ViewerCommand::Reset => {
                self.reset();
                Ok(())
            }
            ViewerCommand::ToggleAuto | ViewerCommand::Quit => Ok(()),
        }
    }

    pub fn hud_text(&self, auto_play: bool) -> String {
        let state = self.env.state();
        let ball = match state.ball_possession() {
            Some(p) => format!("{} {}", p.team, p.team_agent_index + 1),
            None => "nobody".to_string(),
        };
        let status = match (self.env.is_terminal(), self.env.winner()) {
            (true, Some(team)) => format!("{} WINS", team),
            (true, None) => "TIME".to_string(),
            (false, _) if auto_play => "AUTO".to_string(),
            (false, _) => String::new(),
        };
        format!(
            "Episode {}  Step {}/{}  Ball: {}  Reward {:+.0}  {}",
            self.episode,
            state.time_step,
            self.env.options().max_time_step,
            ball,
            self.total_reward,
            status
        )
    }
}

#[derive(Resource)]
pub struct ViewerSettings {
    pub options: RendererOptions,
    pub auto_play: bool,
}

/// Pace of auto-play; without a timer it steps once per frame
#[derive(Resource)]
pub struct AutoStepTimer(pub Option<Timer>);

impl AutoStepTimer {
    pub fn from_options(options: &RendererOptions) -> Self {
        Self(
            options
                .frame_interval()
                .map(|interval| Timer::new(interval, TimerMode::Repeating)),
        )
    }

    /// Advance by one frame, true when a step is due
    pub fn tick(&mut self, delta: Duration) -> bool {
        match &mut self.0 {
            Some(timer) => {
                timer.tick(delta);
                timer.just_finished()
            }
            None => true,
        }
    }
}

#[derive(Component)]
pub struct AgentSprite(pub usize);

#[derive(Component)]
pub struct BallSprite;

#[derive(Component)]
pub struct HudText;

/// Window size in pixels for a map
pub fn window_size(map: &SoccerMap) -> (u32, u32) {
    let (width, height) = map.pixel_size();
    (
        (width as f32 * VIEWER_SCALE) as u32,
        (height as f32 * VIEWER_SCALE + VIEWER_HUD_HEIGHT) as u32,
    )
}

fn tile_world_size(map: &SoccerMap) -> f32 {
    map.tile_size as f32 * VIEWER_SCALE
}

/// World position of a tile center; the HUD strip sits above the field
fn tile_translation(map: &SoccerMap, pos: TilePos, z: f32) -> Vec3 {
    let ts = tile_world_size(map);
    let field_w = map.width as f32 * ts;
    let field_h = map.height as f32 * ts;
    Vec3::new(
        (pos.x as f32 + 0.5) * ts - field_w / 2.0,
        field_h / 2.0 - (pos.y as f32 + 0.5) * ts - VIEWER_HUD_HEIGHT / 2.0,
        z,
    )
}

fn rgb(color: [u8; 3]) -> Color {
    Color::srgb_u8(color[0], color[1], color[2])
}

/// Spawn the camera, field tiles, agent and ball sprites and the HUD
pub fn setup_viewer(mut commands: Commands, viewer: Res<ViewerState>, settings: Res<ViewerSettings>) {
    commands.spawn(Camera2d);

    let map = viewer.env.map();
    let ts = tile_world_size(map);

    for y in 0..map.height {
        for x in 0..map.width {
            let pos = TilePos::new(x, y);
            let Some(tile) = map.tile(pos) else {
                continue;
            };
            commands.spawn((
                Sprite::from_color(rgb(tile_color(tile, pos)), Vec2::splat(ts)),
                Transform::from_translation(tile_translation(map, pos, 0.0)),
            ));
        }
    }

    let state = viewer.env.state();
    let body = ts * 2.0 * AGENT_RADIUS_FRACTION;
    for (agent_index, agent) in state.agents.iter().enumerate() {
        commands.spawn((
            Sprite::from_color(rgb(agent_color(state, agent_index)), Vec2::splat(body)),
            Transform::from_translation(tile_translation(map, agent.pos, 1.0)),
            AgentSprite(agent_index),
        ));
    }

    commands.spawn((
        Sprite::from_color(rgb(BALL_COLOR), Vec2::splat(ts * 2.0 * BALL_RADIUS_FRACTION)),
        Transform::default(),
        Visibility::Hidden,
        BallSprite,
    ));

    let field_h = map.height as f32 * ts;
    commands.spawn((
        Text2d::new(viewer.hud_text(settings.auto_play)),
        TextFont {
            font_size: 18.0,
            ..default()
        },
        TextColor(rgb(LINE_COLOR)),
        Transform::from_xyz(0.0, field_h / 2.0, 2.0),
        HudText,
    ));
}

/// Turn key presses into viewer commands
pub fn handle_keys(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut viewer: ResMut<ViewerState>,
    mut settings: ResMut<ViewerSettings>,
    mut exit: MessageWriter<AppExit>,
) {
    for key in keyboard.get_just_pressed() {
        let Some(command) = ViewerCommand::from_key(*key) else {
            continue;
        };
        match command {
            ViewerCommand::Quit => {
                exit.write(AppExit::Success);
            }
            ViewerCommand::ToggleAuto => {
                settings.auto_play = !settings.auto_play;
                info!("Auto-play {}", if settings.auto_play { "on" } else { "off" });
            }
            ViewerCommand::Step(_) | ViewerCommand::GiveBall | ViewerCommand::RemoveBall
                if !settings.options.enable_key_events => {}
            command => {
                if let Err(e) = viewer.apply(command) {
                    warn!("{:?} failed: {}", command, e);
                }
            }
        }
    }
}

/// Step with random player actions while auto-play is on
pub fn auto_step(
    time: Res<Time>,
    settings: Res<ViewerSettings>,
    mut timer: ResMut<AutoStepTimer>,
    mut viewer: ResMut<ViewerState>,
) {
    if !settings.auto_play {
        return;
    }
    if timer.tick(time.delta()) {
        if let Err(e) = viewer.step_random() {
            warn!("Auto-play step failed: {}", e);
        }
    }
}

/// Move sprites and refresh the HUD after the state changed
pub fn sync_sprites(
    viewer: Res<ViewerState>,
    settings: Res<ViewerSettings>,
    mut agents: Query<(&AgentSprite, &mut Transform), Without<BallSprite>>,
    mut ball: Query<(&mut Transform, &mut Visibility), (With<BallSprite>, Without<AgentSprite>)>,
    mut hud: Query<&mut Text2d, With<HudText>>,
) {
    if !viewer.is_changed() && !settings.is_changed() {
        return;
    }

    let map = viewer.env.map();
    let state = viewer.env.state();
    for (sprite, mut transform) in &mut agents {
        if let Some(agent) = state.agents.get(sprite.0) {
            transform.translation = tile_translation(map, agent.pos, 1.0);
        }
    }

    let ts = tile_world_size(map);
    let offset = ts * (AGENT_RADIUS_FRACTION - BALL_RADIUS_FRACTION / 2.0);
    for (mut transform, mut visibility) in &mut ball {
        match state.ball_possession() {
            Some(p) => {
                let center = tile_translation(map, state.agent_pos(p.agent_index), 1.5);
                transform.translation = center + Vec3::new(offset, -offset, 0.0);
                *visibility = Visibility::Visible;
            }
            None => *visibility = Visibility::Hidden,
        }
    }

    for mut text in &mut hud {
        text.0 = viewer.hud_text(settings.auto_play);
    }
}
