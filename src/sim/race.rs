//! Kart race: track curves, road bounds and the AI driver

use rand::Rng;

use super::entity::EntityKind;
use super::state::{GamePhase, GameState};
use crate::settings::{AiProfile, RaceTuning, Track};

/// Triangular bump: 0 outside `[start, end]`, `height` at `peak`
fn bump(p: f32, start: f32, peak: f32, end: f32, height: f32) -> f32 {
    if p <= start || p >= end {
        0.0
    } else if p <= peak {
        height * (p - start) / (peak - start)
    } else {
        height * (end - p) / (end - peak)
    }
}

/// How hard the road turns at `distance` (positive = right)
pub fn turn_amount(track: Track, distance: f32, finish: f32) -> f32 {
    let p = distance / finish.max(1.0);
    match track {
        Track::Straightaway => 0.0,
        Track::SCurve => bump(p, 0.4, 0.55, 0.7, 1.0) + bump(p, 0.75, 0.83, 0.92, -1.0),
        Track::Hairpin => bump(p, 0.3, 0.5, 0.7, 2.0),
        Track::Chicane => {
            bump(p, 0.2, 0.25, 0.3, 1.0)
                + bump(p, 0.35, 0.4, 0.45, -1.0)
                + bump(p, 0.6, 0.65, 0.7, 1.0)
                + bump(p, 0.75, 0.8, 0.85, -1.0)
        }
    }
}

/// Lateral extent `(left, right)` of the road for a given turn amount
pub fn road_bounds(turn: f32, tuning: &RaceTuning) -> (f32, f32) {
    let center = 0.5 + turn * tuning.turn_shift;
    (center - tuning.road_half_width, center + tuning.road_half_width)
}

#[inline]
pub fn on_road(lateral: f32, bounds: (f32, f32)) -> bool {
    lateral >= bounds.0 && lateral <= bounds.1
}

/// Uniform rolls in `[0, 1)` feeding one AI decision
#[derive(Debug, Clone, Copy)]
pub struct AiRolls {
    pub accel: f32,
    pub lane: f32,
    pub side: f32,
}

/// One AI decision: returns the new `(lane, speed)`.
///
/// Lane changes only ever target a lane that is on the road, and an AI caught
/// off the road moves back onto it.
pub fn ai_decide(
    lane: f32,
    speed: f32,
    profile: &AiProfile,
    rolls: AiRolls,
    bounds: (f32, f32),
    tuning: &RaceTuning,
) -> (f32, f32) {
    let mut speed = speed;
    if rolls.accel > profile.accel_chance {
        speed = (speed + profile.accel).min(profile.max_speed);
    }

    let mut lane = lane;
    if rolls.lane > tuning.lane_change_chance {
        let wanted = if rolls.side < 0.5 {
            tuning.left_lane
        } else {
            tuning.right_lane
        };
        if on_road(wanted, bounds) {
            lane = wanted;
        }
    }
    if !on_road(lane, bounds) {
        for candidate in [tuning.left_lane, tuning.right_lane] {
            if on_road(candidate, bounds) {
                lane = candidate;
                break;
            }
        }
    }
    (lane, speed)
}

/// AI cadence: every racer makes one decision
pub fn ai_tick(state: &mut GameState) {
    if state.phase != GamePhase::Playing {
        return;
    }
    let profile = state.options.difficulty.ai_profile();
    let tuning = state.config.race.clone();
    let track = state.options.track;
    let rng = &mut state.rng;
    state.entities.for_each_mut(|e, _| {
        if !matches!(e.kind, EntityKind::Racer) {
            return;
        }
        let rolls = AiRolls {
            accel: rng.random(),
            lane: rng.random(),
            side: rng.random(),
        };
        let bounds = road_bounds(turn_amount(track, e.pos.y, tuning.finish_distance), &tuning);
        let (lane, speed) = ai_decide(e.pos.x, e.vel.y, &profile, rolls, bounds, &tuning);
        e.pos.x = lane;
        e.vel.y = speed;
    });
}
