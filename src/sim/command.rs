//! Player commands
//!
//! Commands are the only way input reaches the simulation. Anything that
//! doesn't apply in the current phase, or that needs a slot that is taken,
//! is dropped without touching state.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{EntityKind, TargetMotion};
use super::physics::launch_velocity;
use super::spawn;
use super::state::{Direction, GameEvent, GamePhase, GameState, PendingFlip};
use crate::settings::{GameKind, OptionValue};
use crate::{clamp_to_playfield, distance, is_finite};

/// Something the player asked for
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Start,
    SelectOption(OptionValue),
    Restart,
    GoHome,
    NextLevel,
    TogglePause,
    MoveLane(Direction),
    Jump,
    /// Tap at a point (zap the fly, or move the ship there and fire)
    ShootAt(Vec2),
    Shoot,
    AimStart(Vec2),
    AimUpdate(Vec2),
    AimRelease,
    AimCancel,
    /// Race throttle from the dial
    Accelerate(f32),
    Brake,
    Steer(Direction),
    /// Move the ship to a given x
    SteerTo(f32),
    FlipCard(usize),
}

impl Command {
    /// Commands that only make sense while playing
    pub fn is_gameplay(&self) -> bool {
        !matches!(
            self,
            Command::Start
                | Command::SelectOption(_)
                | Command::Restart
                | Command::GoHome
                | Command::NextLevel
                | Command::TogglePause
        )
    }
}

/// Apply one command; returns whether it changed anything
pub fn apply_command(state: &mut GameState, command: Command) -> bool {
    let accepted = if command.is_gameplay() {
        state.phase == GamePhase::Playing && apply_gameplay(state, command)
    } else {
        apply_lifecycle(state, command)
    };
    if !accepted {
        log::trace!("Ignored {:?} in {:?}", command, state.phase);
    }
    accepted
}

fn apply_lifecycle(state: &mut GameState, command: Command) -> bool {
    match (command, state.phase) {
        (Command::Start, GamePhase::Welcome) => {
            match state.kind().option_steps().first() {
                Some(&step) => state.set_phase(GamePhase::OptionSelection(step)),
                None => spawn::start_new_game(state),
            }
            true
        }
        (Command::SelectOption(value), GamePhase::OptionSelection(step)) if value.step() == step => {
            state.options.apply(value);
            let steps = state.kind().option_steps();
            let next = steps
                .iter()
                .position(|&s| s == step)
                .and_then(|i| steps.get(i + 1));
            match next {
                Some(&next) => state.set_phase(GamePhase::OptionSelection(next)),
                None => spawn::start_new_game(state),
            }
            true
        }
        (Command::Restart, phase)
            if !matches!(phase, GamePhase::Welcome | GamePhase::OptionSelection(_)) =>
        {
            spawn::start_new_game(state);
            true
        }
        (Command::GoHome, _) => {
            spawn::go_home(state);
            true
        }
        (Command::NextLevel, GamePhase::LevelComplete) => {
            spawn::start_next_level(state);
            true
        }
        (Command::TogglePause, GamePhase::Playing) => {
            state.set_phase(GamePhase::Paused);
            true
        }
        (Command::TogglePause, GamePhase::Paused) => {
            state.set_phase(GamePhase::Playing);
            true
        }
        _ => false,
    }
}

fn apply_gameplay(state: &mut GameState, command: Command) -> bool {
    let size = state.playfield();
    match (state.kind(), command) {
        (GameKind::LaneDodge, Command::MoveLane(dir) | Command::Steer(dir)) => {
            let lane = state.player.lane.shifted(dir);
            if lane == state.player.lane {
                return false;
            }
            state.player.lane = lane;
            state.player.pos = state.runner_pos();
            true
        }
        (GameKind::LaneDodge, Command::Jump) => {
            if state.player.jump.is_some() {
                return false;
            }
            state.player.jump = Some(0.0);
            true
        }

        (GameKind::FlyZapper, Command::ShootAt(pos)) => {
            if !is_finite(pos) {
                return false;
            }
            zap(state, clamp_to_playfield(pos, size));
            true
        }

        (GameKind::SpaceShooter, Command::ShootAt(pos)) => {
            if !is_finite(pos) {
                return false;
            }
            // Moving still counts when the gun is cooling down
            let moved = steer_ship_to(state, pos.x);
            let fired = fire(state);
            moved || fired
        }
        (GameKind::SpaceShooter, Command::Shoot) => fire(state),
        (GameKind::SpaceShooter, Command::Steer(dir)) => {
            let x = state.player.pos.x + dir.sign() * state.config.shooter.ship_step;
            steer_ship_to(state, x)
        }
        (GameKind::SpaceShooter, Command::SteerTo(x)) => x.is_finite() && steer_ship_to(state, x),

        (GameKind::Slingshot, Command::AimStart(pos)) => {
            if !is_finite(pos)
                || state.player.aim.is_some()
                || state.player.resource == 0
                || state.projectile_in_flight()
            {
                return false;
            }
            state.player.aim = Some(clamp_to_playfield(pos, size));
            true
        }
        (GameKind::Slingshot, Command::AimUpdate(pos)) => {
            if !is_finite(pos) || state.player.aim.is_none() {
                return false;
            }
            state.player.aim = Some(clamp_to_playfield(pos, size));
            true
        }
        (GameKind::Slingshot, Command::AimRelease) => {
            let Some(drag) = state.player.aim.take() else {
                return false;
            };
            let anchor = state.sling_anchor();
            let tuning = &state.config.sling;
            let vel = launch_velocity(anchor, drag, tuning.max_pull, tuning.launch_scale);
            let radius = tuning.soap_radius;
            let id = state
                .entities
                .spawn(EntityKind::Projectile, anchor, vel, radius);
            log::debug!("Launched soap #{} at {:?}", id, vel);
            true
        }
        (GameKind::Slingshot, Command::AimCancel) => state.player.aim.take().is_some(),

        (GameKind::KartRace, Command::Accelerate(amount)) => {
            if !amount.is_finite() || amount <= 0.0 {
                return false;
            }
            let tuning = &state.config.race;
            state.player.speed =
                (state.player.speed + amount * tuning.dial_gain).min(tuning.player_max_speed);
            true
        }
        (GameKind::KartRace, Command::Brake) => {
            state.player.speed = (state.player.speed - state.config.race.brake).max(0.0);
            true
        }
        (GameKind::KartRace, Command::Steer(dir)) => {
            let tuning = &state.config.race;
            let lateral = match dir {
                Direction::Left => tuning.left_lane,
                Direction::Right => tuning.right_lane,
            };
            if lateral == state.player.lateral {
                return false;
            }
            state.player.lateral = lateral;
            true
        }

        (GameKind::CardMatch, Command::FlipCard(index)) => flip_card(state, index),

        _ => false,
    }
}

/// Tap against the fly: a hit scores, speeds it up and sends it back to the top
fn zap(state: &mut GameState, pos: Vec2) {
    let radius = state.config.fly.zap_radius;
    let per_zap = state.config.fly.speed_per_zap;
    let hit = state.entities.iter().find_map(|e| match e.kind {
        EntityKind::FlyingTarget(TargetMotion::Homing { .. })
            if e.is_active() && distance(e.pos, pos) < radius =>
        {
            Some(e.id)
        }
        _ => None,
    });
    let Some(id) = hit else {
        return;
    };

    let respawn = spawn::fly_spawn_point(state);
    if let Some(fly) = state.entities.get_mut(id) {
        if let EntityKind::FlyingTarget(TargetMotion::Homing { speed, .. }) = &mut fly.kind {
            *speed += per_zap;
        }
        fly.pos = respawn;
        fly.vel = Vec2::ZERO;
    }
    state.player.score += 1;
    state.push_event(GameEvent::Zapped { id });
    log::debug!("Zapped fly #{}, score {}", id, state.player.score);
}

fn steer_ship_to(state: &mut GameState, x: f32) -> bool {
    let r = state.config.shooter.ship_radius;
    let x = x.clamp(r, (state.playfield().x - r).max(r));
    if x == state.player.pos.x {
        return false;
    }
    state.player.pos.x = x;
    true
}

fn fire(state: &mut GameState) -> bool {
    if state.player.cooldown > 0 {
        return false;
    }
    let tuning = &state.config.shooter;
    let cooldown = if state.options.weapon.splits_on_hit() {
        tuning.yoke_cooldown
    } else {
        tuning.machine_gun_cooldown
    };
    let pos = state.player.pos - Vec2::new(0.0, tuning.ship_radius);
    let vel = Vec2::new(0.0, -tuning.bullet_speed);
    let radius = tuning.bullet_radius;
    // Cooldowns are authored in 60 Hz ticks
    let scale = state.speed_scale();
    state.player.cooldown = (cooldown as f32 / scale).ceil() as u32;
    state.entities.spawn(EntityKind::Bullet, pos, vel, radius);
    true
}

fn flip_card(state: &mut GameState, index: usize) -> bool {
    if state.pending_flip.is_some() || state.clear_ticks.is_some() {
        return false;
    }
    let ids = state.card_ids();
    let Some(&id) = ids.get(index) else {
        return false;
    };
    let face = match state.entities.get_mut(id).and_then(|e| e.card_mut()) {
        Some(card) if !card.face_up && !card.matched => {
            card.face_up = true;
            card.face
        }
        _ => return false,
    };

    let Some(first) = state.first_flip.take() else {
        state.first_flip = Some(id);
        return true;
    };
    let first_face = state
        .entities
        .get(first)
        .and_then(|e| e.card())
        .map(|c| c.face);

    if first_face == Some(face) {
        for card_id in [first, id] {
            if let Some(card) = state.entities.get_mut(card_id).and_then(|e| e.card_mut()) {
                card.matched = true;
            }
        }
        state.player.score += 1;
        state.push_event(GameEvent::CardsMatched { first, second: id });
        let all_matched = state
            .entities
            .iter()
            .filter_map(|e| e.card())
            .all(|c| c.matched);
        if all_matched {
            state.clear_ticks = Some(state.config.secs_to_ticks(state.config.cards.clear_delay));
        }
    } else {
        let ticks_left = state.config.secs_to_ticks(state.config.cards.mismatch_delay);
        state.pending_flip = Some(PendingFlip {
            first,
            second: id,
            ticks_left,
        });
        state.push_event(GameEvent::CardsMismatched { first, second: id });
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{GameConfig, OptionStep, Track, Weapon};

    fn playing(kind: GameKind) -> GameState {
        let mut state = GameState::new(GameConfig::for_kind(kind));
        spawn::start_new_game(&mut state);
        state
    }

    #[test]
    fn test_start_walks_option_steps() {
        let mut state = GameState::new(GameConfig::for_kind(GameKind::KartRace));
        assert!(apply_command(&mut state, Command::Start));
        assert_eq!(state.phase, GamePhase::OptionSelection(OptionStep::Difficulty));

        // Wrong step is ignored
        assert!(!apply_command(
            &mut state,
            Command::SelectOption(OptionValue::Track(Track::Hairpin))
        ));
        assert!(apply_command(
            &mut state,
            Command::SelectOption(OptionValue::Difficulty(crate::settings::Difficulty::Hard))
        ));
        assert_eq!(state.phase, GamePhase::OptionSelection(OptionStep::Track));
        assert!(apply_command(
            &mut state,
            Command::SelectOption(OptionValue::Track(Track::Hairpin))
        ));
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.options.track, Track::Hairpin);
    }

    #[test]
    fn test_start_without_options_plays_immediately() {
        let mut state = GameState::new(GameConfig::for_kind(GameKind::FlyZapper));
        assert!(apply_command(&mut state, Command::Start));
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_gameplay_ignored_when_not_playing() {
        let mut state = GameState::new(GameConfig::for_kind(GameKind::LaneDodge));
        assert!(!apply_command(&mut state, Command::Jump));
        assert!(state.player.jump.is_none());
    }

    #[test]
    fn test_jump_while_jumping_is_rejected() {
        let mut state = playing(GameKind::LaneDodge);
        assert!(apply_command(&mut state, Command::Jump));
        state.player.jump = Some(0.3);
        assert!(!apply_command(&mut state, Command::Jump));
        assert_eq!(state.player.jump, Some(0.3));
    }

    #[test]
    fn test_pause_toggles() {
        let mut state = playing(GameKind::LaneDodge);
        assert!(apply_command(&mut state, Command::TogglePause));
        assert_eq!(state.phase, GamePhase::Paused);
        assert!(!apply_command(&mut state, Command::MoveLane(Direction::Left)));
        assert!(apply_command(&mut state, Command::TogglePause));
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_aim_rules() {
        let mut state = playing(GameKind::Slingshot);
        let anchor = state.sling_anchor();
        assert!(apply_command(&mut state, Command::AimStart(anchor)));
        assert!(!apply_command(&mut state, Command::AimStart(anchor)));
        assert!(apply_command(
            &mut state,
            Command::AimUpdate(anchor + Vec2::new(-500.0, 300.0))
        ));
        assert!(apply_command(&mut state, Command::AimRelease));
        assert!(state.projectile_in_flight());
        // Another shot must wait for this one to land
        assert!(!apply_command(&mut state, Command::AimStart(anchor)));
    }

    #[test]
    fn test_aim_needs_soap() {
        let mut state = playing(GameKind::Slingshot);
        state.player.resource = 0;
        let anchor = state.sling_anchor();
        assert!(!apply_command(&mut state, Command::AimStart(anchor)));
    }

    #[test]
    fn test_shoot_respects_cooldown() {
        let mut state = playing(GameKind::SpaceShooter);
        let enemies = state.entities.len();
        assert!(apply_command(&mut state, Command::Shoot));
        assert!(!apply_command(&mut state, Command::Shoot));
        assert_eq!(state.entities.len(), enemies + 1);
        assert_eq!(state.player.cooldown, 6);
    }

    #[test]
    fn test_tap_moves_ship_while_cooling_down() {
        let mut state = playing(GameKind::SpaceShooter);
        assert!(apply_command(&mut state, Command::Shoot));
        let count = state.entities.len();

        // The move is a state change, so the command counts as accepted
        assert!(apply_command(&mut state, Command::ShootAt(Vec2::new(50.0, 500.0))));
        assert_eq!(state.player.pos.x, 50.0);
        assert_eq!(state.entities.len(), count);

        // Same spot, gun still cooling: nothing changes
        assert!(!apply_command(&mut state, Command::ShootAt(Vec2::new(50.0, 500.0))));
        assert_eq!(state.player.pos.x, 50.0);
        assert_eq!(state.entities.len(), count);
    }

    #[test]
    fn test_yoke_cooldown_at_low_rate() {
        let mut config = GameConfig::for_kind(GameKind::SpaceShooter);
        config.tick_hz = 30;
        config.options.weapon = Weapon::YokeShooter;
        let mut state = GameState::new(config);
        spawn::start_new_game(&mut state);
        assert!(apply_command(&mut state, Command::Shoot));
        assert_eq!(state.player.cooldown, 9);
    }

    #[test]
    fn test_zap_hits_and_respawns_fly() {
        let mut state = playing(GameKind::FlyZapper);
        let fly = state.entities.iter().next().unwrap().pos;
        assert!(apply_command(&mut state, Command::ShootAt(fly + Vec2::new(10.0, 10.0))));
        assert_eq!(state.player.score, 1);
        let e = state.entities.iter().next().unwrap();
        assert_eq!(e.pos.y, 40.0);
        assert!(matches!(
            e.kind,
            EntityKind::FlyingTarget(TargetMotion::Homing { speed, .. }) if speed == 120.0
        ));
    }

    #[test]
    fn test_zap_miss_is_accepted_noop() {
        let mut state = playing(GameKind::FlyZapper);
        assert!(apply_command(&mut state, Command::ShootAt(Vec2::new(200.0, 790.0))));
        assert_eq!(state.player.score, 0);
        assert!(!apply_command(
            &mut state,
            Command::ShootAt(Vec2::new(f32::NAN, 0.0))
        ));
    }

    #[test]
    fn test_race_throttle_and_brake() {
        let mut state = playing(GameKind::KartRace);
        assert!(apply_command(&mut state, Command::Accelerate(10.0)));
        assert_eq!(state.player.speed, 1.5);
        assert!(!apply_command(&mut state, Command::Accelerate(-1.0)));
        assert!(apply_command(&mut state, Command::Brake));
        assert!((state.player.speed - 1.25).abs() < 1e-6);
        assert!(apply_command(&mut state, Command::Steer(Direction::Left)));
        assert_eq!(state.player.lateral, 0.3);
    }

    fn face_of(state: &GameState, index: usize) -> u32 {
        let id = state.card_ids()[index];
        state.entities.get(id).unwrap().card().unwrap().face
    }

    #[test]
    fn test_card_mismatch_blocks_flips() {
        let mut state = playing(GameKind::CardMatch);
        let first = face_of(&state, 0);
        let other = (1..4).find(|&i| face_of(&state, i) != first).unwrap();
        let third = (1..4).find(|&i| i != other).unwrap();

        assert!(apply_command(&mut state, Command::FlipCard(0)));
        assert!(!apply_command(&mut state, Command::FlipCard(0)));
        assert!(apply_command(&mut state, Command::FlipCard(other)));
        assert!(state.pending_flip.is_some());
        assert_eq!(state.pending_flip.unwrap().ticks_left, 48);
        assert!(!apply_command(&mut state, Command::FlipCard(third)));
        assert!(!apply_command(&mut state, Command::FlipCard(99)));
    }

    #[test]
    fn test_card_match_all_starts_clear_timer() {
        let mut state = playing(GameKind::CardMatch);
        let first = face_of(&state, 0);
        let pair = (1..4).find(|&i| face_of(&state, i) == first).unwrap();
        let rest: Vec<usize> = (1..4).filter(|&i| i != pair).collect();

        assert!(apply_command(&mut state, Command::FlipCard(0)));
        assert!(apply_command(&mut state, Command::FlipCard(pair)));
        assert!(state.clear_ticks.is_none());
        assert!(apply_command(&mut state, Command::FlipCard(rest[0])));
        assert!(apply_command(&mut state, Command::FlipCard(rest[1])));
        assert_eq!(state.clear_ticks, Some(60));
        assert_eq!(state.player.score, 2);
    }

    #[test]
    fn test_restart_and_home() {
        let mut state = playing(GameKind::LaneDodge);
        state.player.score = 40;
        state.set_phase(GamePhase::GameOver);
        assert!(!apply_command(&mut state, Command::NextLevel));
        assert!(apply_command(&mut state, Command::Restart));
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.score, 0);
        assert!(apply_command(&mut state, Command::GoHome));
        assert_eq!(state.phase, GamePhase::Welcome);
        assert!(!apply_command(&mut state, Command::Restart));
    }
}
