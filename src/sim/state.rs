//! Game state and core simulation types
//!
//! `GameState` is the single owner of everything a running game mutates: the
//! phase, the player, the entity store, level counters and the seeded RNG.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::EntityStore;
use crate::settings::{GameConfig, GameKind, GameOptions, OptionStep};

/// Events kept for the frontend between drains
pub const MAX_PENDING_EVENTS: usize = 1024;

/// Current phase of a game session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen
    Welcome,
    /// Picking a mode/difficulty/track/weapon
    OptionSelection(OptionStep),
    /// Active gameplay
    Playing,
    /// Gameplay frozen by the player
    Paused,
    /// Level cleared, next one pending
    LevelComplete,
    /// Lost (score, lives, or a fatal hit)
    GameOver,
    /// Every level cleared
    GameComplete,
    /// Race over (someone crossed the line or crashed)
    Finished,
}

impl GamePhase {
    /// Phases that only a restart or home command can leave
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GamePhase::GameOver | GamePhase::GameComplete | GamePhase::Finished
        )
    }

    /// Phases in which the tick clock keeps running
    pub fn keeps_clock_running(&self) -> bool {
        matches!(self, GamePhase::Playing | GamePhase::LevelComplete)
    }
}

/// Left/right input direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn sign(&self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }
}

/// Discrete lane for the lane game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Lane {
    Left,
    #[default]
    Center,
    Right,
}

impl Lane {
    pub const ALL: [Lane; 3] = [Lane::Left, Lane::Center, Lane::Right];

    /// Lane centre as a fraction of the playfield width
    pub fn x_fraction(&self) -> f32 {
        match self {
            Lane::Left => 0.25,
            Lane::Center => 0.5,
            Lane::Right => 0.75,
        }
    }

    /// Neighbouring lane, staying put at the edges
    pub fn shifted(&self, dir: Direction) -> Lane {
        match (self, dir) {
            (Lane::Center, Direction::Left) | (Lane::Left, Direction::Left) => Lane::Left,
            (Lane::Right, Direction::Left) => Lane::Center,
            (Lane::Center, Direction::Right) | (Lane::Right, Direction::Right) => Lane::Right,
            (Lane::Left, Direction::Right) => Lane::Center,
        }
    }
}

/// Who won a race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceWinner {
    Player,
    Ai,
}

/// Things that happened during a tick or command, for the frontend to react to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged { from: GamePhase, to: GamePhase },
    LevelStarted { level: u32 },
    /// An entity was hit or collected and changed the score
    Scored { id: u32, points: i64 },
    Split { parent: u32, children: [u32; 2] },
    Zapped { id: u32 },
    LifeLost { remaining: u32 },
    ProjectileLost { remaining: u32 },
    CardsMatched { first: u32, second: u32 },
    CardsMismatched { first: u32, second: u32 },
    Crashed,
    RaceWon { winner: RaceWinner },
}

/// The player's avatar and counters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerState {
    /// Score (can go negative in the lane game)
    pub score: i64,
    /// Lives or soaps remaining, depending on the game
    pub resource: u32,
    /// Lane in the lane game
    pub lane: Lane,
    /// Continuous position (ship, runner, slingshot anchor)
    pub pos: Vec2,
    /// Lateral road position in the race, 0..1
    pub lateral: f32,
    /// Race speed or lane-game scroll speed
    pub speed: f32,
    /// Race progress or lane-game distance
    pub distance: f32,
    /// Jump progress while airborne
    pub jump: Option<f32>,
    /// Drag point while aiming the slingshot
    pub aim: Option<Vec2>,
    /// Ticks until the weapon can fire again
    pub cooldown: u32,
}

impl PlayerState {
    /// Whether the current jump protects against obstacles
    pub fn is_invulnerable(&self, window: (f32, f32)) -> bool {
        self.jump
            .is_some_and(|p| super::collision::in_invulnerable_window(p, window))
    }

    /// Vertical draw offset of the jump arc
    pub fn jump_offset(&self) -> f32 {
        match self.jump {
            Some(p) => -(p * std::f32::consts::PI).sin() * 150.0,
            None => 0.0,
        }
    }
}

/// A mismatched card pair waiting to flip back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingFlip {
    pub first: u32,
    pub second: u32,
    pub ticks_left: u32,
}

/// Complete state of one game instance
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    pub options: GameOptions,
    pub phase: GamePhase,
    pub player: PlayerState,
    pub entities: EntityStore,
    /// Current level / wave (1-based)
    pub level: u32,
    /// Ticks simulated while playing
    pub time_ticks: u64,
    /// Ticks since the last spawn
    pub spawn_counter: u32,
    /// Distance milestones already rewarded with a speed-up
    pub speed_ups: u32,
    /// Countdown before the next level starts (None = wait for a command)
    pub break_ticks: Option<u32>,
    /// Card the player flipped first, by entity id
    pub first_flip: Option<u32>,
    pub pending_flip: Option<PendingFlip>,
    /// Countdown from the last match to the level-complete screen
    pub clear_ticks: Option<u32>,
    /// A fatal collision happened this tick
    pub fatal: bool,
    pub winner: Option<RaceWinner>,
    /// Cosmetic background scroll offset
    pub scroll: f32,
    pub events: Vec<GameEvent>,
    pub(crate) rng: Pcg32,
}

impl GameState {
    /// Fresh state on the welcome screen
    pub fn new(config: GameConfig) -> Self {
        let rng = Pcg32::seed_from_u64(config.seed);
        let options = config.options;
        Self {
            config,
            options,
            phase: GamePhase::Welcome,
            player: PlayerState::default(),
            entities: EntityStore::new(),
            level: 1,
            time_ticks: 0,
            spawn_counter: 0,
            speed_ups: 0,
            break_ticks: None,
            first_flip: None,
            pending_flip: None,
            clear_ticks: None,
            fatal: false,
            winner: None,
            scroll: 0.0,
            events: Vec::new(),
            rng,
        }
    }

    pub fn kind(&self) -> GameKind {
        self.config.kind
    }

    /// Playfield size (width, height)
    pub fn playfield(&self) -> Vec2 {
        self.config.playfield
    }

    /// 60 Hz tuning multiplier for this game's tick rate
    pub fn speed_scale(&self) -> f32 {
        self.config.speed_scale()
    }

    /// Switch phase, recording the transition
    pub fn set_phase(&mut self, to: GamePhase) {
        let from = self.phase;
        if from == to {
            return;
        }
        log::info!("{}: {:?} -> {:?}", self.kind().as_str(), from, to);
        self.phase = to;
        self.push_event(GameEvent::PhaseChanged { from, to });
    }

    /// Record an event, dropping the oldest once `MAX_PENDING_EVENTS` are queued
    pub fn push_event(&mut self, event: GameEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            self.events.remove(0);
        }
        self.events.push(event);
    }

    /// Lane-game runner position
    pub fn runner_pos(&self) -> Vec2 {
        let size = self.playfield();
        Vec2::new(
            size.x * self.player.lane.x_fraction(),
            size.y - self.config.dodge.player_inset,
        )
    }

    /// Slingshot anchor point
    pub fn sling_anchor(&self) -> Vec2 {
        let size = self.playfield();
        let (fx, inset) = self.config.sling.anchor;
        Vec2::new(size.x * fx, size.y - inset)
    }

    /// Fly Zapper goal (the thing the fly is after)
    pub fn fly_goal(&self) -> Vec2 {
        let size = self.playfield();
        Vec2::new(size.x * 0.5, size.y - self.config.fly.goal_inset)
    }

    /// Whether a slingshot projectile is currently flying
    pub fn projectile_in_flight(&self) -> bool {
        self.entities.iter().any(|e| e.kind.is_projectile())
    }

    /// Cards in deal order
    pub fn card_ids(&self) -> Vec<u32> {
        self.entities
            .iter()
            .filter(|e| e.card().is_some())
            .map(|e| e.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_shift_clamps_at_edges() {
        assert_eq!(Lane::Left.shifted(Direction::Left), Lane::Left);
        assert_eq!(Lane::Left.shifted(Direction::Right), Lane::Center);
        assert_eq!(Lane::Center.shifted(Direction::Right), Lane::Right);
        assert_eq!(Lane::Right.shifted(Direction::Right), Lane::Right);
    }

    #[test]
    fn test_set_phase_records_event_once() {
        let mut state = GameState::new(GameConfig::default());
        state.set_phase(GamePhase::Playing);
        state.set_phase(GamePhase::Playing);
        assert_eq!(state.events.len(), 1);
        assert_eq!(
            state.events[0],
            GameEvent::PhaseChanged {
                from: GamePhase::Welcome,
                to: GamePhase::Playing
            }
        );
    }

    #[test]
    fn test_jump_window() {
        let mut player = PlayerState::default();
        let window = (0.2, 0.8);
        assert!(!player.is_invulnerable(window));
        player.jump = Some(0.1);
        assert!(!player.is_invulnerable(window));
        player.jump = Some(0.5);
        assert!(player.is_invulnerable(window));
        player.jump = Some(0.85);
        assert!(!player.is_invulnerable(window));
    }

    #[test]
    fn test_terminal_phases() {
        assert!(GamePhase::GameOver.is_terminal());
        assert!(GamePhase::Finished.is_terminal());
        assert!(!GamePhase::LevelComplete.is_terminal());
        assert!(GamePhase::LevelComplete.keeps_clock_running());
        assert!(!GamePhase::Paused.keeps_clock_running());
    }
}
