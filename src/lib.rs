//! Pocket Arcade - simulation core for a handful of casual mini-games
//!
//! Core modules:
//! - `sim`: Deterministic per-tick simulation (entities, collisions, phases)
//! - `scheduler`: Fixed-rate cadences (physics, AI, cosmetic scroll)
//! - `session`: One running game, owning its state and timers
//! - `input`: Raw pointer/button events to simulation commands
//! - `snapshot`: Read-only view the frontend polls every frame
//! - `settings`: Game configuration and option presets

pub mod input;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod sim;
pub mod snapshot;

pub use session::Session;
pub use settings::{GameConfig, GameKind, GameOptions};
pub use snapshot::Snapshot;

use glam::Vec2;

/// Engine-wide constants
pub mod consts {
    /// Reference tick rate all per-tick tunings are authored against
    pub const REFERENCE_TICK_HZ: u32 = 60;
    /// Slower tick rate some games run at
    pub const LOW_TICK_HZ: u32 = 30;
    /// AI decision cadence (Hz)
    pub const AI_TICK_HZ: u32 = 10;
    /// Cosmetic background scroll cadence (Hz)
    pub const SCROLL_TICK_HZ: u32 = 20;
    /// Longest frame delta accepted by the scheduler (seconds)
    pub const MAX_FRAME_DT: f64 = 0.1;
    /// Maximum catch-up steps per cadence per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Smallest magnitude we are willing to divide by
    pub const MIN_MAGNITUDE: f32 = 1e-3;
}

/// Distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}

/// Linear interpolation between two points (`t` is not clamped)
#[inline]
pub fn lerp(a: Vec2, b: Vec2, t: f32) -> Vec2 {
    a + (b - a) * t
}

/// Normalize a vector, treating anything shorter than `MIN_MAGNITUDE` as zero.
///
/// Never produces NaN or infinity for finite input.
#[inline]
pub fn safe_normalize(v: Vec2) -> Vec2 {
    let len = v.length();
    if len < consts::MIN_MAGNITUDE {
        Vec2::ZERO
    } else {
        v / len
    }
}

/// Clamp the length of a vector to `max_len`, keeping its direction
#[inline]
pub fn clamp_length(v: Vec2, max_len: f32) -> Vec2 {
    let len = v.length();
    if len <= max_len {
        v
    } else {
        v * (max_len / len.max(consts::MIN_MAGNITUDE))
    }
}

/// Clamp a point into the rectangle `[0, size.x] x [0, size.y]`
#[inline]
pub fn clamp_to_playfield(p: Vec2, size: Vec2) -> Vec2 {
    p.clamp(Vec2::ZERO, size)
}

/// True when both components are finite
#[inline]
pub fn is_finite(v: Vec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}
