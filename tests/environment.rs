//! Random-play properties of the environment and the session runner

use std::collections::HashSet;
use std::sync::Arc;

use soccer::env::{Action, EnvOptions, SoccerEnvironment, Team};
use soccer::map::SoccerMap;
use soccer::session::{RandomAgent, RunConfig, SessionDatabase, run_session};

fn check_invariants(env: &SoccerEnvironment) {
    let state = env.state();
    let holders = state.agents.iter().filter(|a| a.has_ball).count();
    assert_eq!(holders, 1, "exactly one agent holds the ball\n{}", state);

    let positions: HashSet<_> = state.agents.iter().map(|a| a.pos).collect();
    assert_eq!(positions.len(), state.agent_count(), "agents share a tile\n{}", state);

    for agent in &state.agents {
        assert!(env.map().is_walkable(agent.pos), "agent off the field\n{}", state);
    }
}

#[test]
fn random_play_keeps_invariants() {
    let map = Arc::new(SoccerMap::builtin());
    for team_size in 1..=2 {
        for seed in 0..20 {
            let options = EnvOptions::new(team_size).unwrap().with_seed(seed);
            let mut env = SoccerEnvironment::with_map(options, Arc::clone(&map)).unwrap();
            let mut agent = RandomAgent::new(Some(seed));
            check_invariants(&env);

            let mut steps = 0;
            while !env.is_terminal() {
                let observation = env.take_action(&agent.act(team_size)).unwrap();
                steps += 1;
                check_invariants(&env);

                let expected = match env.winner() {
                    Some(Team::Player) => 1.0,
                    Some(Team::Computer) => -1.0,
                    None => 0.0,
                };
                assert_eq!(observation.reward, expected);
                assert_eq!(observation.done, env.is_terminal());
            }
            assert!(steps <= 100);
        }
    }
}

#[test]
fn same_seed_same_episode() {
    let play = |seed: u64| {
        let options = EnvOptions::new(2).unwrap().with_seed(seed);
        let mut env = SoccerEnvironment::new(options).unwrap();
        let mut states = vec![env.state().clone()];
        for _ in 0..30 {
            env.take_action(&[Action::MoveRight, Action::MoveUp]).unwrap();
            states.push(env.state().clone());
        }
        states
    };
    assert_eq!(play(42), play(42));
}

#[test]
fn session_writes_summary_and_database() {
    let dir = std::env::temp_dir().join(format!("soccer_session_{}", uuid::Uuid::new_v4()));
    let db_path = dir.join("results.db");
    let config = RunConfig {
        episodes: 4,
        team_size: 2,
        seed: Some(8),
        output_dir: dir.to_string_lossy().to_string(),
        db_path: Some(db_path.to_string_lossy().to_string()),
        quiet: true,
        ..RunConfig::default()
    };

    let summary = run_session(&config).unwrap();
    assert_eq!(summary.episodes_played, 4);
    assert_eq!(summary.player_wins + summary.computer_wins + summary.draws, 4);

    let written: Vec<_> = std::fs::read_dir(&dir)
        .unwrap()
        .flatten()
        .filter(|e| e.path().extension().is_some_and(|x| x == "json"))
        .collect();
    assert_eq!(written.len(), 1);

    let db = SessionDatabase::open(&db_path).unwrap();
    assert_eq!(db.episode_count().unwrap(), 4);
    let counts = db.win_counts(&summary.session_id).unwrap();
    assert_eq!(counts.player, summary.player_wins);
    assert_eq!(counts.draws, summary.draws);

    drop(db);
    std::fs::remove_dir_all(dir).unwrap();
}
