//! Raw input to commands
//!
//! Frontends report pointer, button and dial events in playfield
//! coordinates. `InputAdapter` turns them into `Command`s for the current
//! game, tracking the little gesture state it needs (where a swipe began).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::settings::GameKind;
use crate::sim::{Command, Direction, GameState};
use crate::{clamp_to_playfield, distance, is_finite};

/// Minimum pointer travel for a swipe
pub const SWIPE_THRESHOLD: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Button {
    Left,
    Right,
    Up,
    Fire,
    Brake,
    Pause,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    PointerDown(Vec2),
    PointerMove(Vec2),
    PointerUp(Vec2),
    Button(Button),
    /// Rotation of a crown/dial since the last event
    Dial(f32),
}

/// Card grid layout, shared by the hit test and frontends that draw cards
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardGrid {
    /// Space reserved above the grid
    pub top: f32,
    pub spacing: f32,
    /// Height / width of a card
    pub aspect: f32,
}

impl Default for CardGrid {
    fn default() -> Self {
        Self {
            top: 100.0,
            spacing: 10.0,
            aspect: 1.4,
        }
    }
}

impl CardGrid {
    pub fn columns(count: usize) -> usize {
        match count {
            0..=16 => 4,
            17..=32 => 6,
            _ => 8,
        }
    }

    /// Top-left corner and size of card `index`
    pub fn card_rect(&self, index: usize, count: usize, playfield: Vec2) -> (Vec2, Vec2) {
        let cols = Self::columns(count);
        let rows = count.div_ceil(cols).max(1);
        let width = ((playfield.x - self.spacing * (cols + 1) as f32) / cols as f32).max(0.0);
        let fit = (playfield.y - self.top - self.spacing * (rows + 1) as f32) / rows as f32;
        let height = (width * self.aspect).min(fit).max(0.0);

        let (col, row) = (index % cols, index / cols);
        let min = Vec2::new(
            self.spacing + col as f32 * (width + self.spacing),
            self.top + self.spacing + row as f32 * (height + self.spacing),
        );
        (min, Vec2::new(width, height))
    }

    /// Index of the card under `pos`, if any
    pub fn card_at(&self, pos: Vec2, count: usize, playfield: Vec2) -> Option<usize> {
        (0..count).find(|&i| {
            let (min, size) = self.card_rect(i, count, playfield);
            let max = min + size;
            pos.x >= min.x && pos.x <= max.x && pos.y >= min.y && pos.y <= max.y
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct InputAdapter {
    press: Option<Vec2>,
    pub grid: CardGrid,
}

impl InputAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate one event for the game in `state`
    pub fn translate(&mut self, event: InputEvent, state: &GameState) -> Option<Command> {
        let size = state.playfield();
        let event = match event {
            InputEvent::Button(Button::Pause) => return Some(Command::TogglePause),
            InputEvent::PointerDown(p) | InputEvent::PointerMove(p) | InputEvent::PointerUp(p)
                if !is_finite(p) =>
            {
                return None;
            }
            InputEvent::PointerDown(p) => InputEvent::PointerDown(clamp_to_playfield(p, size)),
            InputEvent::PointerMove(p) => InputEvent::PointerMove(clamp_to_playfield(p, size)),
            InputEvent::PointerUp(p) => InputEvent::PointerUp(clamp_to_playfield(p, size)),
            other => other,
        };

        match state.kind() {
            GameKind::FlyZapper => match event {
                InputEvent::PointerUp(p) => Some(Command::ShootAt(p)),
                _ => None,
            },
            GameKind::LaneDodge => self.lane_gesture(event),
            GameKind::CardMatch => match event {
                InputEvent::PointerUp(p) => self
                    .grid
                    .card_at(p, state.card_ids().len(), size)
                    .map(Command::FlipCard),
                _ => None,
            },
            GameKind::SpaceShooter => match event {
                InputEvent::PointerDown(p) | InputEvent::PointerMove(p) => {
                    Some(Command::SteerTo(p.x))
                }
                InputEvent::PointerUp(_) | InputEvent::Button(Button::Fire) => {
                    Some(Command::Shoot)
                }
                InputEvent::Button(Button::Left) => Some(Command::Steer(Direction::Left)),
                InputEvent::Button(Button::Right) => Some(Command::Steer(Direction::Right)),
                _ => None,
            },
            GameKind::Slingshot => {
                let anchor = state.sling_anchor();
                let grab = state.config.sling.grab_radius;
                let aiming = state.player.aim.is_some();
                match event {
                    InputEvent::PointerDown(p) | InputEvent::PointerMove(p)
                        if !aiming && distance(p, anchor) < grab =>
                    {
                        Some(Command::AimStart(p))
                    }
                    InputEvent::PointerMove(p) if aiming => Some(Command::AimUpdate(p)),
                    InputEvent::PointerUp(_) if aiming => Some(Command::AimRelease),
                    _ => None,
                }
            }
            GameKind::KartRace => match event {
                InputEvent::Dial(delta) if delta.is_finite() && delta > 0.0 => {
                    Some(Command::Accelerate(delta))
                }
                InputEvent::Button(Button::Left) => Some(Command::Steer(Direction::Left)),
                InputEvent::Button(Button::Right) => Some(Command::Steer(Direction::Right)),
                InputEvent::Button(Button::Brake) => Some(Command::Brake),
                _ => None,
            },
        }
    }

    fn lane_gesture(&mut self, event: InputEvent) -> Option<Command> {
        match event {
            InputEvent::Button(Button::Left) => Some(Command::MoveLane(Direction::Left)),
            InputEvent::Button(Button::Right) => Some(Command::MoveLane(Direction::Right)),
            InputEvent::Button(Button::Up) => Some(Command::Jump),
            InputEvent::PointerDown(p) => {
                self.press = Some(p);
                None
            }
            InputEvent::PointerUp(p) => {
                let delta = p - self.press.take()?;
                if delta.x.abs() >= SWIPE_THRESHOLD && delta.x.abs() >= delta.y.abs() {
                    let dir = if delta.x < 0.0 {
                        Direction::Left
                    } else {
                        Direction::Right
                    };
                    Some(Command::MoveLane(dir))
                } else if delta.y <= -SWIPE_THRESHOLD || delta.length() < SWIPE_THRESHOLD {
                    Some(Command::Jump)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GameConfig;
    use crate::sim::spawn::start_new_game;

    fn state_for(kind: GameKind) -> GameState {
        let mut state = GameState::new(GameConfig::for_kind(kind));
        start_new_game(&mut state);
        state
    }

    fn swipe(adapter: &mut InputAdapter, state: &GameState, from: Vec2, to: Vec2) -> Option<Command> {
        adapter.translate(InputEvent::PointerDown(from), state);
        adapter.translate(InputEvent::PointerUp(to), state)
    }

    #[test]
    fn test_lane_swipes() {
        let state = state_for(GameKind::LaneDodge);
        let mut adapter = InputAdapter::new();
        let start = Vec2::new(200.0, 400.0);
        assert_eq!(
            swipe(&mut adapter, &state, start, start + Vec2::new(-60.0, 10.0)),
            Some(Command::MoveLane(Direction::Left))
        );
        assert_eq!(
            swipe(&mut adapter, &state, start, start + Vec2::new(45.0, 0.0)),
            Some(Command::MoveLane(Direction::Right))
        );
        assert_eq!(
            swipe(&mut adapter, &state, start, start + Vec2::new(5.0, -80.0)),
            Some(Command::Jump)
        );
        // Tap
        assert_eq!(
            swipe(&mut adapter, &state, start, start + Vec2::new(3.0, 2.0)),
            Some(Command::Jump)
        );
        // Downward swipe does nothing
        assert_eq!(
            swipe(&mut adapter, &state, start, start + Vec2::new(0.0, 80.0)),
            None
        );
        // Release without press
        assert_eq!(adapter.translate(InputEvent::PointerUp(start), &state), None);
    }

    #[test]
    fn test_pointer_clamped_into_playfield() {
        let state = state_for(GameKind::FlyZapper);
        let mut adapter = InputAdapter::new();
        assert_eq!(
            adapter.translate(InputEvent::PointerUp(Vec2::new(-50.0, 2000.0)), &state),
            Some(Command::ShootAt(Vec2::new(0.0, 800.0)))
        );
        assert_eq!(
            adapter.translate(InputEvent::PointerUp(Vec2::new(f32::NAN, 1.0)), &state),
            None
        );
    }

    #[test]
    fn test_card_hit_test() {
        let state = state_for(GameKind::CardMatch);
        let mut adapter = InputAdapter::new();
        let size = state.playfield();
        let (min, card) = adapter.grid.card_rect(2, 4, size);
        let center = min + card * 0.5;
        assert_eq!(
            adapter.translate(InputEvent::PointerUp(center), &state),
            Some(Command::FlipCard(2))
        );
        // Header area hits nothing
        assert_eq!(
            adapter.translate(InputEvent::PointerUp(Vec2::new(200.0, 20.0)), &state),
            None
        );
    }

    #[test]
    fn test_grid_columns() {
        assert_eq!(CardGrid::columns(4), 4);
        assert_eq!(CardGrid::columns(16), 4);
        assert_eq!(CardGrid::columns(20), 6);
        assert_eq!(CardGrid::columns(32), 6);
        assert_eq!(CardGrid::columns(33), 8);
    }

    #[test]
    fn test_sling_needs_grab_near_anchor() {
        let mut state = state_for(GameKind::Slingshot);
        let mut adapter = InputAdapter::new();
        let anchor = state.sling_anchor();
        assert_eq!(
            adapter.translate(InputEvent::PointerDown(anchor + Vec2::new(200.0, 0.0)), &state),
            None
        );
        let grab = anchor + Vec2::new(-20.0, 10.0);
        assert_eq!(
            adapter.translate(InputEvent::PointerDown(grab), &state),
            Some(Command::AimStart(grab))
        );
        state.player.aim = Some(grab);
        let far = anchor + Vec2::new(-300.0, 50.0);
        assert_eq!(
            adapter.translate(InputEvent::PointerMove(far), &state),
            Some(Command::AimUpdate(Vec2::new(0.0, far.y)))
        );
        assert_eq!(
            adapter.translate(InputEvent::PointerUp(far), &state),
            Some(Command::AimRelease)
        );
    }

    #[test]
    fn test_race_dial_and_buttons() {
        let state = state_for(GameKind::KartRace);
        let mut adapter = InputAdapter::new();
        assert_eq!(
            adapter.translate(InputEvent::Dial(0.5), &state),
            Some(Command::Accelerate(0.5))
        );
        assert_eq!(adapter.translate(InputEvent::Dial(-0.5), &state), None);
        assert_eq!(
            adapter.translate(InputEvent::Button(Button::Brake), &state),
            Some(Command::Brake)
        );
        assert_eq!(
            adapter.translate(InputEvent::Button(Button::Pause), &state),
            Some(Command::TogglePause)
        );
    }

    #[test]
    fn test_shooter_follows_pointer() {
        let state = state_for(GameKind::SpaceShooter);
        let mut adapter = InputAdapter::new();
        assert_eq!(
            adapter.translate(InputEvent::PointerMove(Vec2::new(120.0, 500.0)), &state),
            Some(Command::SteerTo(120.0))
        );
        assert_eq!(
            adapter.translate(InputEvent::Button(Button::Fire), &state),
            Some(Command::Shoot)
        );
    }
}
