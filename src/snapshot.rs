//! Read-only view of a session for the frontend
//!
//! The frontend polls a `Snapshot` each frame instead of observing state
//! directly. Snapshots are plain data and serialize to JSON; `diff` tells a
//! renderer what appeared, what went away and whether the phase moved.

use std::collections::{HashMap, HashSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::settings::{GameKind, GameOptions};
use crate::sim::race::turn_amount;
use crate::sim::{Entity, GamePhase, GameState, Lane, Lifecycle, RaceWinner};

/// What the frontend needs to draw the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub lane: Lane,
    pub lateral: f32,
    pub speed: f32,
    pub distance: f32,
    /// Vertical draw offset of the current jump
    pub jump_offset: f32,
    /// Drag point while aiming
    pub aim: Option<Vec2>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Bumped on every state change
    pub revision: u64,
    pub kind: GameKind,
    pub phase: GamePhase,
    pub options: GameOptions,
    pub level: u32,
    pub score: i64,
    /// Lives or soaps, depending on the game
    pub resource: u32,
    pub player: PlayerView,
    pub entities: Vec<Entity>,
    pub winner: Option<RaceWinner>,
    /// Current road turn amount (race only)
    pub turn: f32,
    pub scroll: f32,
}

/// Changes between two snapshots
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDiff {
    pub spawned: Vec<u32>,
    pub removed: Vec<u32>,
    /// Entities that started their death animation
    pub dying: Vec<u32>,
    /// Entities the player just picked up or ran into
    pub collected: Vec<u32>,
    pub phase_changed: Option<(GamePhase, GamePhase)>,
    pub score_delta: i64,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.spawned.is_empty()
            && self.removed.is_empty()
            && self.dying.is_empty()
            && self.collected.is_empty()
            && self.phase_changed.is_none()
            && self.score_delta == 0
    }
}

impl Snapshot {
    pub fn capture(state: &GameState, revision: u64) -> Self {
        let player = &state.player;
        let turn = match state.kind() {
            GameKind::KartRace => turn_amount(
                state.options.track,
                player.distance,
                state.config.race.finish_distance,
            ),
            _ => 0.0,
        };
        let pos = match state.kind() {
            GameKind::LaneDodge => state.runner_pos(),
            _ => player.pos,
        };
        Self {
            revision,
            kind: state.kind(),
            phase: state.phase,
            options: state.options,
            level: state.level,
            score: player.score,
            resource: player.resource,
            player: PlayerView {
                pos,
                lane: player.lane,
                lateral: player.lateral,
                speed: player.speed,
                distance: player.distance,
                jump_offset: player.jump_offset(),
                aim: player.aim,
            },
            entities: state.entities.as_slice().to_vec(),
            winner: state.winner,
            turn,
            scroll: state.scroll,
        }
    }

    /// The AI kart, if this is a race
    pub fn ai_racer(&self) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|e| matches!(e.kind, crate::sim::EntityKind::Racer))
    }

    /// Changes from `prev` to `self`
    pub fn diff(&self, prev: &Snapshot) -> SnapshotDiff {
        let before: HashMap<u32, &Entity> = prev.entities.iter().map(|e| (e.id, e)).collect();
        let after: HashSet<u32> = self.entities.iter().map(|e| e.id).collect();
        let changed_to = |wanted: fn(&Entity) -> bool| -> Vec<u32> {
            self.entities
                .iter()
                .filter(|e| wanted(e) && !before.get(&e.id).is_some_and(|p| wanted(p)))
                .map(|e| e.id)
                .collect()
        };
        SnapshotDiff {
            spawned: self
                .entities
                .iter()
                .map(|e| e.id)
                .filter(|id| !before.contains_key(id))
                .collect(),
            removed: prev
                .entities
                .iter()
                .map(|e| e.id)
                .filter(|id| !after.contains(id))
                .collect(),
            dying: changed_to(|e| matches!(e.lifecycle(), Lifecycle::Dying { .. })),
            collected: changed_to(Entity::is_collected),
            phase_changed: (prev.phase != self.phase).then_some((prev.phase, self.phase)),
            score_delta: self.score - prev.score,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
