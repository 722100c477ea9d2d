//! Fixed timestep simulation tick
//!
//! One call advances exactly one tick. Stages always run in the same order:
//! age dying entities, integrate motion, decay, spawn, collide, clean up,
//! evaluate the phase. Per-tick tunings are authored at 60 Hz and scaled by
//! `GameState::speed_scale` so a 30 Hz game plays at the same pace.

use glam::Vec2;
use rand::Rng;

use super::collision::{
    HitOutcome, circles_overlap, enemy_hit_outcome, enemy_radius, first_hit, is_live_enemy,
    is_splittable,
};
use super::entity::{Entity, EntityKind, TargetMotion};
use super::physics::{bounce_in_box, decay_factor, fall, homing_velocity};
use super::race::{on_road, road_bounds, turn_amount};
use super::spawn;
use super::state::{GameEvent, GamePhase, GameState, RaceWinner};
use crate::consts::MIN_MAGNITUDE;
use crate::distance;
use crate::settings::GameKind;

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState) {
    match state.phase {
        GamePhase::Playing => {}
        GamePhase::LevelComplete => {
            tick_level_break(state);
            return;
        }
        _ => return,
    }

    state.time_ticks += 1;
    state.fatal = false;

    age_dying(state);
    integrate(state);
    decay(state);
    spawn_step(state);
    resolve_collisions(state);
    cleanup(state);
    evaluate_phase(state);
}

/// Cosmetic background scroll, on its own cadence
pub fn scroll_tick(state: &mut GameState) {
    if state.phase != GamePhase::Playing {
        return;
    }
    let step = match state.kind() {
        GameKind::KartRace => state.player.speed * 10.0,
        GameKind::LaneDodge => state.player.speed,
        _ => 1.0,
    };
    state.scroll = (state.scroll + step) % 30.0;
}

fn tick_level_break(state: &mut GameState) {
    match state.break_ticks {
        Some(t) if t <= 1 => spawn::start_next_level(state),
        Some(t) => state.break_ticks = Some(t - 1),
        None => {}
    }
}

fn age_dying(state: &mut GameState) {
    let scale = state.speed_scale();
    let enemy_rate = 1.0 / state.config.shooter.death_ticks.max(1) as f32;
    let target_rate = state.config.sling.hit_anim_rate;
    state.entities.for_each_mut(|e, _| {
        let rate = match e.kind {
            EntityKind::Enemy { .. } => enemy_rate,
            EntityKind::FlyingTarget(_) => target_rate,
            _ => 1.0,
        };
        e.advance_dying(rate * scale);
    });
    let purged = state.entities.remove_where(|e| e.progress() >= 1.0);
    if purged > 0 {
        log::debug!("Purged {} finished entities", purged);
    }
}

fn integrate(state: &mut GameState) {
    let scale = state.speed_scale();
    advance_player(state, scale);
    advance_timers(state);
    if state.kind() == GameKind::SpaceShooter {
        steer_formation(state, scale);
    }

    let gravity = state.config.sling.gravity;
    let jitter = state.config.fly.jitter;
    let obstacle_speed = state.player.speed;
    let rng = &mut state.rng;
    state.entities.for_each_mut(|e, _| {
        if e.is_dying() {
            return;
        }
        match e.kind {
            EntityKind::Obstacle(_) => {
                e.vel = Vec2::new(0.0, obstacle_speed);
                e.pos += e.vel * scale;
            }
            EntityKind::Enemy { .. } | EntityKind::Bullet => {
                e.pos += e.vel * scale;
            }
            EntityKind::FlyingTarget(TargetMotion::Homing { goal, speed }) => {
                let aim = goal + Vec2::new(rng.random_range(-jitter..=jitter), 0.0);
                e.vel = homing_velocity(e.pos, aim, speed);
                e.pos += e.vel * scale;
            }
            EntityKind::FlyingTarget(TargetMotion::Bouncing { min, max }) => {
                (e.pos, e.vel) = bounce_in_box(e.pos + e.vel * scale, e.vel, min, max);
            }
            EntityKind::Projectile => {
                (e.pos, e.vel) = fall(e.pos, e.vel, gravity, scale);
            }
            EntityKind::Racer => {
                e.pos.y += e.vel.y * scale;
            }
            EntityKind::Card(_) => {}
        }
    });
}

fn advance_player(state: &mut GameState, scale: f32) {
    let player = &mut state.player;
    match state.config.kind {
        GameKind::LaneDodge => {
            if let Some(progress) = player.jump {
                let next = progress + state.config.dodge.jump_rate * scale;
                player.jump = if next >= 1.0 { None } else { Some(next) };
            }
            player.distance += player.speed / 60.0 * scale;
        }
        GameKind::KartRace => {
            player.distance += player.speed * scale;
        }
        GameKind::SpaceShooter => {
            player.cooldown = player.cooldown.saturating_sub(1);
        }
        _ => {}
    }
}

/// Card countdowns
fn advance_timers(state: &mut GameState) {
    if let Some(mut pending) = state.pending_flip {
        if pending.ticks_left <= 1 {
            for id in [pending.first, pending.second] {
                if let Some(card) = state.entities.get_mut(id).and_then(|e| e.card_mut()) {
                    card.face_up = false;
                }
            }
            state.pending_flip = None;
        } else {
            pending.ticks_left -= 1;
            state.pending_flip = Some(pending);
        }
    }
    if let Some(t) = state.clear_ticks {
        state.clear_ticks = Some(t.saturating_sub(1));
    }
}

/// The formation turns around as one when any enemy would cross a side margin
fn steer_formation(state: &mut GameState, scale: f32) {
    let margin = state.config.shooter.side_margin;
    let step_down = state.config.shooter.step_down;
    let width = state.playfield().x;

    let at_edge = state.entities.iter().any(|e| {
        if !matches!(e.kind, EntityKind::Enemy { .. }) || e.is_dying() {
            return false;
        }
        let next = e.pos.x + e.vel.x * scale;
        (e.vel.x < 0.0 && next - e.radius < margin)
            || (e.vel.x > 0.0 && next + e.radius > width - margin)
    });
    if !at_edge {
        return;
    }
    state.entities.for_each_mut(|e, _| {
        if matches!(e.kind, EntityKind::Enemy { .. }) && !e.is_dying() {
            e.vel.x = -e.vel.x;
            e.pos.y += step_down;
        }
    });
}

fn decay(state: &mut GameState) {
    if state.kind() != GameKind::KartRace {
        return;
    }
    let factor = decay_factor(state.config.race.decay, state.speed_scale());
    state.player.speed *= factor;
    state.entities.for_each_mut(|e, _| {
        if matches!(e.kind, EntityKind::Racer) {
            e.vel.y *= factor;
        }
    });
}

fn spawn_step(state: &mut GameState) {
    if state.kind() != GameKind::LaneDodge {
        return;
    }
    let tuning = &state.config.dodge;

    // Difficulty ramp: a little faster at every distance milestone
    let milestone = (state.player.distance / tuning.speed_up_every.max(1.0)).floor() as u32;
    if milestone > state.speed_ups {
        state.speed_ups = milestone;
        state.player.speed = (state.player.speed + tuning.speed_step).min(tuning.max_speed);
        log::debug!("Lane speed now {:.2}", state.player.speed);
    }

    let per_60hz = (tuning.spawn_base / state.player.speed.max(MIN_MAGNITUDE)).floor();
    let threshold = (per_60hz / state.config.speed_scale()).max(1.0) as u32;
    state.spawn_counter += 1;
    if state.spawn_counter >= threshold {
        state.spawn_counter = 0;
        spawn::spawn_obstacle(state);
    }
}

fn resolve_collisions(state: &mut GameState) {
    match state.kind() {
        GameKind::LaneDodge => collide_runner(state),
        GameKind::FlyZapper => check_fly_goal(state),
        GameKind::SpaceShooter => {
            collide_bullets(state);
            collide_ship(state);
        }
        GameKind::Slingshot => collide_projectile(state),
        GameKind::KartRace => check_road(state),
        GameKind::CardMatch => {}
    }
}

fn collide_runner(state: &mut GameState) {
    let tuning = &state.config.dodge;
    if state.player.is_invulnerable(tuning.invulnerable_window) {
        return;
    }
    let pos = state.runner_pos();
    let radius = tuning.player_radius;

    let mut hits = Vec::new();
    for e in state.entities.as_mut_slice() {
        if let EntityKind::Obstacle(kind) = e.kind {
            if e.is_active() && circles_overlap(pos, radius, e.pos, e.radius) {
                e.mark_collected();
                hits.push((e.id, kind.points()));
            }
        }
    }
    for (id, points) in hits {
        state.player.score += points;
        state.push_event(GameEvent::Scored { id, points });
        log::debug!("Obstacle #{} {:+}, score {}", id, points, state.player.score);
    }
}

fn check_fly_goal(state: &mut GameState) {
    let radius = state.config.fly.goal_radius;
    let reached = state.entities.iter().any(|e| match e.kind {
        EntityKind::FlyingTarget(TargetMotion::Homing { goal, .. }) => {
            e.is_active() && distance(e.pos, goal) < radius
        }
        _ => false,
    });
    if reached {
        state.fatal = true;
    }
}

fn collide_bullets(state: &mut GameState) {
    let floor = state.config.shooter.split_floor;
    let kill_points = state.config.shooter.kill_points;
    let split_points = state.config.shooter.split_points;
    let splits = state.options.weapon.splits_on_hit();

    let bullets: Vec<(u32, Vec2, f32)> = state
        .entities
        .iter()
        .filter(|e| matches!(e.kind, EntityKind::Bullet) && e.is_active())
        .map(|e| (e.id, e.pos, e.radius))
        .collect();

    let mut spent = Vec::new();
    let mut split_parents = Vec::new();
    let mut scored = Vec::new();
    for (bullet, pos, radius) in bullets {
        let slice = state.entities.as_mut_slice();
        let Some(i) = first_hit(slice, pos, radius, |e| {
            matches!(e.kind, EntityKind::Enemy { .. })
        }) else {
            continue;
        };
        let enemy = &mut slice[i];
        let EntityKind::Enemy { size, splittable } = enemy.kind else {
            continue;
        };
        enemy.mark_dying();
        spent.push(bullet);
        match enemy_hit_outcome(enemy.pos, size, splittable, splits, floor) {
            HitOutcome::Killed => scored.push((enemy.id, kill_points)),
            HitOutcome::Split { size, centers } => {
                split_parents.push((enemy.id, size, centers));
                scored.push((enemy.id, split_points));
            }
        }
    }

    state.entities.remove_where(|e| spent.contains(&e.id));
    if !split_parents.is_empty() {
        // Children join the store after the pass, so they can't be hit this tick
        let mut splits = Vec::new();
        state.entities.for_each_mut(|e, spawner| {
            let Some(&(parent, size, centers)) = split_parents.iter().find(|p| p.0 == e.id)
            else {
                return;
            };
            let splittable = is_splittable(size, floor);
            let children = centers.map(|c| {
                spawner.spawn(
                    EntityKind::Enemy { size, splittable },
                    c,
                    e.vel,
                    enemy_radius(size),
                )
            });
            log::debug!("Enemy #{} split into {:?}", parent, children);
            splits.push(GameEvent::Split { parent, children });
        });
        for event in splits {
            state.push_event(event);
        }
    }
    for (id, points) in scored {
        state.player.score += points;
        state.push_event(GameEvent::Scored { id, points });
    }
}

/// Enemies that touch the ship or get past it cost a life each
fn collide_ship(state: &mut GameState) {
    let ship = state.player.pos;
    let radius = state.config.shooter.ship_radius;
    let mut hits = 0u32;
    for e in state.entities.as_mut_slice() {
        if is_live_enemy(e) && (circles_overlap(ship, radius, e.pos, e.radius) || e.pos.y >= ship.y)
        {
            e.mark_dying();
            hits += 1;
        }
    }
    for _ in 0..hits {
        state.player.resource = state.player.resource.saturating_sub(1);
        let remaining = state.player.resource;
        state.push_event(GameEvent::LifeLost { remaining });
        log::info!("Ship hit, {} lives left", remaining);
    }
}

fn collide_projectile(state: &mut GameState) {
    let Some((soap, pos, radius)) = state
        .entities
        .iter()
        .find(|e| e.kind.is_projectile())
        .map(|e| (e.id, e.pos, e.radius))
    else {
        return;
    };
    let slice = state.entities.as_mut_slice();
    let Some(i) = first_hit(slice, pos, radius, |e| {
        matches!(e.kind, EntityKind::FlyingTarget(TargetMotion::Bouncing { .. }))
    }) else {
        return;
    };
    slice[i].mark_dying();
    let target = slice[i].id;

    state.entities.remove_where(|e| e.id == soap);
    let points = state.config.sling.points_per_level * state.level as i64;
    state.player.score += points;
    state.push_event(GameEvent::Scored { id: target, points });
    log::debug!("Soap #{} hit target #{}", soap, target);
}

fn check_road(state: &mut GameState) {
    let tuning = &state.config.race;
    let turn = turn_amount(state.options.track, state.player.distance, tuning.finish_distance);
    let bounds = road_bounds(turn, tuning);
    if !on_road(state.player.lateral, bounds) && state.player.speed > tuning.crash_speed {
        log::info!(
            "Crashed at {:.1} (lateral {:.2}, road {:.2}..{:.2})",
            state.player.distance,
            state.player.lateral,
            bounds.0,
            bounds.1
        );
        state.fatal = true;
        state.push_event(GameEvent::Crashed);
    }
}

/// Remove whatever has left the playfield; a lost soap costs one soap
fn cleanup(state: &mut GameState) {
    let size = state.playfield();
    let margin = state.config.dodge.purge_margin;
    let mut lost_soap = false;
    state.entities.remove_where(|e| {
        let gone = match e.kind {
            EntityKind::Obstacle(_) => e.pos.y > size.y + margin,
            EntityKind::Bullet => e.pos.y + e.radius < 0.0 || e.pos.x < 0.0 || e.pos.x > size.x,
            EntityKind::Enemy { .. } => e.pos.y - e.radius > size.y,
            EntityKind::Projectile => {
                e.pos.x < 0.0 || e.pos.x > size.x || e.pos.y < 0.0 || e.pos.y > size.y
            }
            _ => false,
        };
        lost_soap |= gone && e.kind.is_projectile();
        gone
    });
    if lost_soap {
        state.player.resource = state.player.resource.saturating_sub(1);
        let remaining = state.player.resource;
        state.push_event(GameEvent::ProjectileLost { remaining });
        log::debug!("Soap lost, {} left", remaining);
    }
}

fn evaluate_phase(state: &mut GameState) {
    if state.fatal {
        if state.kind() == GameKind::KartRace {
            finish_race(state, RaceWinner::Ai);
        } else {
            state.set_phase(GamePhase::GameOver);
        }
        return;
    }

    match state.kind() {
        GameKind::LaneDodge => {
            if state.player.score < 0 {
                state.set_phase(GamePhase::GameOver);
            }
        }
        GameKind::SpaceShooter => {
            let enemies = state
                .entities
                .count_where(|e| matches!(e.kind, EntityKind::Enemy { .. }));
            if state.player.resource == 0 {
                state.set_phase(GamePhase::GameOver);
            } else if enemies == 0 {
                let tuning = &state.config.shooter;
                let (breather, max_level) = (tuning.breather_ticks, tuning.max_level);
                level_cleared(state, Some(breather), Some(max_level));
            }
        }
        GameKind::Slingshot => {
            let in_flight = state.projectile_in_flight();
            let is_target = |e: &Entity| matches!(e.kind, EntityKind::FlyingTarget(_));
            let targets = state.entities.count_where(is_target);
            let live = state
                .entities
                .count_where(|e| is_target(e) && e.is_active());
            if targets == 0 && !in_flight {
                let breather = state.config.sling.breather_ticks;
                level_cleared(state, Some(breather), None);
            } else if state.player.resource == 0 && !in_flight && live > 0 {
                state.set_phase(GamePhase::GameOver);
            }
        }
        GameKind::KartRace => {
            let finish = state.config.race.finish_distance;
            if state.player.distance >= finish {
                finish_race(state, RaceWinner::Player);
            } else if state
                .entities
                .iter()
                .any(|e| matches!(e.kind, EntityKind::Racer) && e.pos.y >= finish)
            {
                finish_race(state, RaceWinner::Ai);
            }
        }
        GameKind::CardMatch => {
            if state.clear_ticks == Some(0) {
                state.clear_ticks = None;
                let max_level = state.config.cards.max_level;
                level_cleared(state, None, Some(max_level));
            }
        }
        GameKind::FlyZapper => {}
    }
}

/// Level done: either the whole game is won or the next level is queued
fn level_cleared(state: &mut GameState, breather: Option<u32>, max_level: Option<u32>) {
    if max_level.is_some_and(|max| state.level >= max) {
        state.set_phase(GamePhase::GameComplete);
        return;
    }
    let scale = state.speed_scale();
    state.break_ticks = breather.map(|t| ((t as f32 / scale).ceil() as u32).max(1));
    state.set_phase(GamePhase::LevelComplete);
}

fn finish_race(state: &mut GameState, winner: RaceWinner) {
    state.winner = Some(winner);
    state.push_event(GameEvent::RaceWon { winner });
    state.set_phase(GamePhase::Finished);
}
