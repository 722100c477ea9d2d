//! Game, level and wave setup
//!
//! Everything that creates entities outside collision response lives here:
//! new games, level/wave generation, lane-game obstacles and fly respawns.

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;

use super::collision::{enemy_radius, is_splittable};
use super::entity::{Card, EntityKind, ObstacleKind, TargetMotion};
use super::state::{GameEvent, GamePhase, GameState, Lane, PlayerState};
use crate::settings::GameKind;

/// Reset everything and start level 1 with the current options
pub fn start_new_game(state: &mut GameState) {
    state.entities.clear();
    state.player = initial_player(state);
    state.level = 1;
    state.time_ticks = 0;
    state.spawn_counter = 0;
    state.speed_ups = 0;
    state.break_ticks = None;
    state.first_flip = None;
    state.pending_flip = None;
    state.clear_ticks = None;
    state.fatal = false;
    state.winner = None;
    state.scroll = 0.0;
    setup_level(state);
    log::info!(
        "New {} game (seed {}, {} Hz)",
        state.kind().as_str(),
        state.config.seed,
        state.config.tick_hz
    );
    state.set_phase(GamePhase::Playing);
    state.push_event(GameEvent::LevelStarted { level: 1 });
}

/// Advance to the next level/wave and resume play
pub fn start_next_level(state: &mut GameState) {
    state.level += 1;
    state.break_ticks = None;
    state.entities.clear();
    setup_level(state);
    log::info!("{}: level {} begins", state.kind().as_str(), state.level);
    state.set_phase(GamePhase::Playing);
    state.push_event(GameEvent::LevelStarted { level: state.level });
}

/// Tear down a game and return to the welcome screen
pub fn go_home(state: &mut GameState) {
    state.entities.clear();
    state.player = PlayerState::default();
    state.break_ticks = None;
    state.first_flip = None;
    state.pending_flip = None;
    state.clear_ticks = None;
    state.fatal = false;
    state.set_phase(GamePhase::Welcome);
}

fn initial_player(state: &GameState) -> PlayerState {
    let size = state.playfield();
    let config = &state.config;
    let mut player = PlayerState::default();
    match state.kind() {
        GameKind::LaneDodge => {
            player.lane = Lane::Center;
            player.speed = config.dodge.start_speed;
            player.pos = Vec2::new(size.x * 0.5, size.y - config.dodge.player_inset);
        }
        GameKind::SpaceShooter => {
            player.resource = config.shooter.lives;
            player.pos = Vec2::new(size.x * 0.5, size.y - config.shooter.ship_inset);
        }
        GameKind::Slingshot => {
            player.resource = config.sling.soaps;
            player.pos = state.sling_anchor();
        }
        GameKind::KartRace => {
            player.lateral = 0.5;
        }
        GameKind::FlyZapper | GameKind::CardMatch => {}
    }
    player
}

/// Populate the store for the current level
pub fn setup_level(state: &mut GameState) {
    match state.kind() {
        GameKind::FlyZapper => {
            let speed = state.config.fly.start_speed;
            spawn_fly(state, speed);
        }
        GameKind::LaneDodge => {}
        GameKind::CardMatch => deal_cards(state),
        GameKind::SpaceShooter => spawn_wave(state),
        GameKind::Slingshot => spawn_targets(state),
        GameKind::KartRace => {
            state.entities.spawn(
                EntityKind::Racer,
                Vec2::new(0.5, 0.0),
                Vec2::ZERO,
                0.0,
            );
        }
    }
}

/// Random fly start: anywhere along the top edge, inside the side margins
pub fn fly_spawn_point(state: &mut GameState) -> Vec2 {
    let margin = state.config.fly.spawn_margin;
    let width = state.playfield().x;
    let x = if width > 2.0 * margin {
        state.rng.random_range(margin..=width - margin)
    } else {
        width * 0.5
    };
    Vec2::new(x, margin)
}

fn spawn_fly(state: &mut GameState, speed: f32) -> u32 {
    let pos = fly_spawn_point(state);
    let goal = state.fly_goal();
    state.entities.spawn(
        EntityKind::FlyingTarget(TargetMotion::Homing { goal, speed }),
        pos,
        Vec2::ZERO,
        state.config.fly.goal_radius * 0.5,
    )
}

/// Drop one obstacle into a random lane above the top edge
pub fn spawn_obstacle(state: &mut GameState) -> u32 {
    let tuning = &state.config.dodge;
    let (golden, rotten, radius, y) = (
        tuning.golden_chance,
        tuning.rotten_chance,
        tuning.obstacle_radius,
        tuning.spawn_y,
    );
    let lane = Lane::ALL[state.rng.random_range(0..Lane::ALL.len())];
    let roll: f32 = state.rng.random();
    let kind = if roll < golden {
        ObstacleKind::GoldenBanana
    } else if roll < golden + rotten {
        ObstacleKind::RottenBanana
    } else {
        ObstacleKind::Poo
    };
    let pos = Vec2::new(state.playfield().x * lane.x_fraction(), y);
    let vel = Vec2::new(0.0, state.player.speed);
    let id = state
        .entities
        .spawn(EntityKind::Obstacle(kind), pos, vel, radius);
    log::debug!("Spawned {:?} #{} in {:?} lane", kind, id, lane);
    id
}

/// Number of card pairs dealt on `level`
pub fn pairs_for_level(level: u32, pairs_per_level: u32, symbols: u32) -> u32 {
    (pairs_per_level * level).min(symbols)
}

fn deal_cards(state: &mut GameState) {
    let tuning = &state.config.cards;
    let pairs = pairs_for_level(state.level, tuning.pairs_per_level, tuning.symbols);

    let mut symbols: Vec<u32> = (0..tuning.symbols).collect();
    symbols.shuffle(&mut state.rng);
    let mut faces: Vec<u32> = symbols
        .iter()
        .take(pairs as usize)
        .flat_map(|&face| [face, face])
        .collect();
    faces.shuffle(&mut state.rng);

    state.entities.clear();
    for face in faces {
        state.entities.spawn(
            EntityKind::Card(Card {
                face,
                face_up: false,
                matched: false,
            }),
            Vec2::ZERO,
            Vec2::ZERO,
            0.0,
        );
    }
    state.first_flip = None;
    state.pending_flip = None;
    state.clear_ticks = None;
    log::debug!("Dealt {} cards for level {}", pairs * 2, state.level);
}

/// Rows in the wave for `level`
pub fn wave_rows(level: u32, max_rows: u32) -> u32 {
    (1 + level / 2).min(max_rows)
}

fn spawn_wave(state: &mut GameState) {
    let tuning = &state.config.shooter;
    let width = state.playfield().x;
    let rows = wave_rows(state.level, tuning.max_rows);
    let columns = tuning.columns.max(1);
    let size = tuning.enemy_size;
    let speed = tuning.formation_speed + tuning.speed_per_level * (state.level - 1) as f32;
    let splittable = is_splittable(size, tuning.split_floor);

    let spacing = size * 1.5;
    let formation_width = spacing * (columns - 1) as f32;
    let left = (width - formation_width) * 0.5;
    let top = size * 2.0;

    let mut spawned = 0;
    for row in 0..rows {
        for col in 0..columns {
            let pos = Vec2::new(left + col as f32 * spacing, top + row as f32 * spacing);
            state.entities.spawn(
                EntityKind::Enemy { size, splittable },
                pos,
                Vec2::new(speed, 0.0),
                enemy_radius(size),
            );
            spawned += 1;
        }
    }
    state.player.cooldown = 0;
    log::info!(
        "Wave {}: {} enemies, formation speed {:.2}",
        state.level,
        spawned,
        speed
    );
}

/// Targets on slingshot `level`
pub fn targets_for_level(level: u32, base: u32, max: u32) -> u32 {
    (base + level).min(max)
}

fn spawn_targets(state: &mut GameState) {
    let tuning = state.config.sling.clone();
    let size = state.playfield();
    let count = targets_for_level(state.level, tuning.base_targets, tuning.max_targets);

    let min = Vec2::new(30.0, 80.0);
    let max = Vec2::new(size.x - 30.0, size.y - 150.0).max(min);
    let spawn_min = Vec2::new(size.x * 0.5, 100.0).min(max);
    let spawn_max = Vec2::new(size.x - 50.0, size.y - 150.0).max(spawn_min);
    let v = tuning.max_target_speed;

    for _ in 0..count {
        let pos = Vec2::new(
            state.rng.random_range(spawn_min.x..=spawn_max.x),
            state.rng.random_range(spawn_min.y..=spawn_max.y),
        );
        let vel = Vec2::new(
            state.rng.random_range(-v..=v),
            state.rng.random_range(-v..=v),
        );
        state.entities.spawn(
            EntityKind::FlyingTarget(TargetMotion::Bouncing { min, max }),
            pos,
            vel,
            tuning.target_radius,
        );
    }
    state.player.resource = tuning.soaps;
    state.player.aim = None;
    log::debug!("Level {}: {} targets", state.level, count);
}
