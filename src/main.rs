//! Soccer viewer - play the grid soccer environment by keyboard
//!
//! Usage:
//!   cargo run                                  # 1v1 on the built-in map
//!   cargo run -- --team-size 2 --seed 7        # 2v2, reproducible
//!   cargo run -- --auto --fps 8                # random player team
//!   cargo run -- --screenshot frame.png        # render the first frame and quit

use bevy::prelude::*;
use std::path::Path;

use soccer::constants::*;
use soccer::env::{EnvOptions, SoccerEnvironment};
use soccer::logging::init_logging;
use soccer::render::{FrameRenderer, RendererOptions, save_png};
use soccer::viewer::{
    AutoStepTimer, ViewerSettings, ViewerState, auto_step, handle_keys, setup_viewer, sync_sprites,
    window_size,
};

/// Command line options of the viewer
struct ViewerArgs {
    env: EnvOptions,
    renderer: RendererOptions,
    auto_play: bool,
    screenshot: Option<String>,
    po_radius: Option<u32>,
}

impl ViewerArgs {
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let mut parsed = Self {
            env: EnvOptions::default(),
            renderer: RendererOptions::new(true, 0, true),
            auto_play: false,
            screenshot: None,
            po_radius: None,
        };

        let mut i = 1;
        while i < args.len() {
            let value = args.get(i + 1);
            match args[i].as_str() {
                "--map" => {
                    parsed.env.map_path = value.map(Into::into);
                    i += 1;
                }
                "--env" => {
                    if let Some(path) = value {
                        match EnvOptions::from_file(path) {
                            Ok(env) => parsed.env = env,
                            Err(e) => eprintln!("Warning: {}", e),
                        }
                    }
                    i += 1;
                }
                "--team-size" => {
                    if let Some(n) = value.and_then(|v| v.parse().ok()) {
                        parsed.env.team_size = n;
                    }
                    i += 1;
                }
                "--seed" => {
                    parsed.env.seed = value.and_then(|v| v.parse().ok());
                    i += 1;
                }
                "--max-steps" => {
                    if let Some(n) = value.and_then(|v| v.parse().ok()) {
                        parsed.env.max_time_step = n;
                    }
                    i += 1;
                }
                "--fps" => {
                    if let Some(n) = value.and_then(|v| v.parse().ok()) {
                        parsed.renderer.max_fps = n;
                    }
                    i += 1;
                }
                "--screenshot" => {
                    parsed.screenshot = value.cloned();
                    parsed.renderer.show_display = false;
                    i += 1;
                }
                "--po-radius" => {
                    parsed.po_radius = value.and_then(|v| v.parse().ok());
                    i += 1;
                }
                "--auto" => parsed.auto_play = true,
                "--no-keys" => parsed.renderer.enable_key_events = false,
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                other => eprintln!("Warning: unknown argument '{}'", other),
            }
            i += 1;
        }
        parsed
    }
}

fn print_help() {
    println!("Soccer viewer");
    println!();
    println!("  --map <file>          Map file (default: built-in map)");
    println!("  --env <file>          Load environment options from a JSON file");
    println!("  --team-size <n>       Agents per team, 1 or 2 (default 1)");
    println!("  --seed <n>            RNG seed");
    println!("  --max-steps <n>       Episode length limit (default {})", DEFAULT_MAX_TIME_STEP);
    println!("  --fps <n>             Auto-play steps per second (0 = one per frame)");
    println!("  --auto                Start with random auto-play");
    println!("  --no-keys             Ignore movement and ball keys");
    println!("  --screenshot <file>   Save the first frame as PNG and quit");
    println!("  --po-radius <n>       With --screenshot, also save the view around player 1");
    println!();
    println!("Keys: arrows move player 1, '.' stands, 1 gives player 1 the ball,");
    println!("      2 takes it away, space toggles auto-play, R resets, Esc quits");
}

fn main() {
    let args = ViewerArgs::from_args();
    if !args.renderer.show_display {
        // Bevy's LogPlugin installs the subscriber when a window opens
        init_logging();
    }

    let env = match SoccerEnvironment::new(args.env.clone()) {
        Ok(env) => env,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if !args.renderer.show_display {
        if let Err(e) = save_screenshots(&env, &args) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let (width, height) = window_size(env.map());
    let auto_step_timer = AutoStepTimer::from_options(&args.renderer);

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                // Set scale_factor_override to 1.0 for consistent behavior on HiDPI displays
                resolution: bevy::window::WindowResolution::new(width, height)
                    .with_scale_factor_override(1.0),
                title: VIEWER_TITLE.into(),
                resizable: false,
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(Color::srgb_u8(
            WALL_COLOR[0],
            WALL_COLOR[1],
            WALL_COLOR[2],
        )))
        .insert_resource(ViewerState::new(env, args.env.seed))
        .insert_resource(ViewerSettings {
            options: args.renderer,
            auto_play: args.auto_play,
        })
        .insert_resource(auto_step_timer)
        .add_systems(Startup, setup_viewer)
        .add_systems(Update, (handle_keys, auto_step, sync_sprites).chain())
        .run();
}

/// Off-screen rendering of the reset state
fn save_screenshots(env: &SoccerEnvironment, args: &ViewerArgs) -> Result<(), String> {
    let Some(path) = &args.screenshot else {
        return Ok(());
    };
    let renderer = FrameRenderer::new(env.map_handle());
    let path = Path::new(path);
    save_png(&renderer.screenshot(env.state()), path)?;
    info!("Saved {}", path.display());

    if let Some(radius) = args.po_radius {
        let po_path = path.with_extension("po.png");
        save_png(&renderer.po_screenshot(env.state(), 0, radius), &po_path)?;
        info!("Saved {}", po_path.display());
    }
    Ok(())
}
