//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod command;
pub mod entity;
pub mod physics;
pub mod race;
pub mod spawn;
pub mod state;
pub mod tick;

pub use command::{Command, apply_command};
pub use entity::{
    Card, Entity, EntityKind, EntityStore, Lifecycle, ObstacleKind, Spawner, TargetMotion,
};
pub use race::ai_tick;
pub use state::{
    Direction, GameEvent, GamePhase, GameState, Lane, PendingFlip, PlayerState, RaceWinner,
};
pub use tick::{scroll_tick, tick};
