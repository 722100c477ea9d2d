//! Motion helpers shared by the tick stages

use glam::Vec2;

use crate::{clamp_length, safe_normalize};

/// Launch velocity for a slingshot pulled from `anchor` to `drag`.
///
/// The pull is clamped to `max_pull` before scaling, so the result never
/// exceeds `max_pull * launch_scale` however far the pointer went.
pub fn launch_velocity(anchor: Vec2, drag: Vec2, max_pull: f32, launch_scale: f32) -> Vec2 {
    let pull = anchor - drag;
    clamp_length(pull, max_pull) * launch_scale
}

/// Semi-implicit Euler step under constant downward gravity
#[inline]
pub fn fall(pos: Vec2, vel: Vec2, gravity: f32, scale: f32) -> (Vec2, Vec2) {
    let vel = vel + Vec2::new(0.0, gravity * scale);
    (pos + vel * scale, vel)
}

/// Reflect off the inside of the box `[min, max]`, keeping the point inside
pub fn bounce_in_box(pos: Vec2, vel: Vec2, min: Vec2, max: Vec2) -> (Vec2, Vec2) {
    let mut pos = pos;
    let mut vel = vel;
    if pos.x < min.x || pos.x > max.x {
        vel.x = -vel.x;
        pos.x = pos.x.clamp(min.x, max.x);
    }
    if pos.y < min.y || pos.y > max.y {
        vel.y = -vel.y;
        pos.y = pos.y.clamp(min.y, max.y);
    }
    (pos, vel)
}

/// Per-tick velocity heading from `pos` toward `aim` at `speed` points per
/// second (authored at 60 Hz)
pub fn homing_velocity(pos: Vec2, aim: Vec2, speed: f32) -> Vec2 {
    safe_normalize(aim - pos) * (speed / crate::consts::REFERENCE_TICK_HZ as f32)
}

/// Per-tick decay factor adjusted for the tick rate
#[inline]
pub fn decay_factor(decay: f32, scale: f32) -> f32 {
    decay.powf(scale)
}
