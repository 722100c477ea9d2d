//! One running game
//!
//! A `Session` owns the game state, the input adapter and the scheduler
//! whose cadences drive physics, AI and scroll. The frontend feeds it frame
//! deltas and input, and polls snapshots back out.

use crate::consts::{AI_TICK_HZ, SCROLL_TICK_HZ};
use crate::input::{InputAdapter, InputEvent};
use crate::scheduler::{CadenceId, Scheduler};
use crate::settings::{GameConfig, GameKind, GameOptions};
use crate::sim::{self, Command, GameEvent, GamePhase, GameState};
use crate::snapshot::Snapshot;

#[derive(Debug, Clone)]
pub struct Session {
    state: GameState,
    input: InputAdapter,
    scheduler: Scheduler,
    physics: CadenceId,
    ai: Option<CadenceId>,
    scroll: CadenceId,
    revision: u64,
}

impl Session {
    /// New session on the welcome screen. Invalid parts of `config` fall
    /// back to their defaults (see `GameConfig::sanitized`).
    pub fn new(config: GameConfig) -> Self {
        let config = config.sanitized();
        let mut scheduler = Scheduler::new();
        let physics = scheduler.register("physics", config.tick_hz);
        let ai = (config.kind == GameKind::KartRace).then(|| scheduler.register("ai", AI_TICK_HZ));
        let scroll = scheduler.register("scroll", SCROLL_TICK_HZ);
        log::info!(
            "Session for {} at {} Hz",
            config.kind.as_str(),
            config.tick_hz
        );
        Self {
            state: GameState::new(config),
            input: InputAdapter::new(),
            scheduler,
            physics,
            ai,
            scroll,
            revision: 0,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.state.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Change token: differs whenever anything visible may have changed
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Skip the option screens and start playing with `options`
    pub fn start_game(&mut self, options: GameOptions) {
        self.state.options = options;
        sim::spawn::start_new_game(&mut self.state);
        self.changed();
    }

    /// Apply a command; returns whether it was accepted
    pub fn command(&mut self, command: Command) -> bool {
        let accepted = sim::apply_command(&mut self.state, command);
        if accepted {
            self.changed();
        }
        accepted
    }

    /// Translate and apply a raw input event
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        match self.input.translate(event, &self.state) {
            Some(command) => self.command(command),
            None => false,
        }
    }

    /// Advance by one frame of wall-clock time; returns physics ticks run
    pub fn update(&mut self, frame_dt: f64) -> u32 {
        self.scheduler.advance(frame_dt);
        let mut ticks = 0;
        while let Some(cadence) = self.scheduler.poll() {
            log::trace!("{} fired", self.scheduler.name(cadence));
            if cadence == self.physics {
                self.step();
                ticks += 1;
            } else if Some(cadence) == self.ai {
                self.ai_step();
            } else if cadence == self.scroll {
                sim::scroll_tick(&mut self.state);
                self.revision += 1;
            }
        }
        ticks
    }

    /// Run exactly one physics tick
    pub fn step(&mut self) {
        sim::tick(&mut self.state);
        self.changed();
    }

    /// Run exactly one AI decision
    pub fn ai_step(&mut self) {
        sim::ai_tick(&mut self.state);
        self.changed();
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state, self.revision)
    }

    /// Take every event recorded since the last drain.
    ///
    /// Frontends are expected to drain once per frame. Undrained events are
    /// kept up to `sim::state::MAX_PENDING_EVENTS`; past that the oldest are dropped.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.state.events)
    }

    /// Tear the game down and return to the welcome screen
    pub fn go_home(&mut self) {
        self.command(Command::GoHome);
    }

    /// Bump the revision and keep the cadences in step with the phase
    fn changed(&mut self) {
        self.revision += 1;
        let should_run = self.state.phase.keeps_clock_running();
        if should_run && !self.scheduler.is_running() {
            self.scheduler.start();
        } else if !should_run && self.scheduler.is_running() {
            self.scheduler.cancel_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Button;
    use crate::settings::{Difficulty, OptionValue, Track};
    use crate::sim::{Direction, EntityKind};
    use glam::Vec2;

    const FRAME: f64 = 1.0 / 60.0;

    #[test]
    fn test_start_game_zero_ticks() {
        let mut session = Session::new(GameConfig::for_kind(GameKind::Slingshot));
        session.start_game(GameOptions::default());
        let snap = session.snapshot();
        assert_eq!(snap.phase, GamePhase::Playing);
        assert_eq!(snap.score, 0);
        assert_eq!(snap.resource, 3);
        assert_eq!(snap.level, 1);
    }

    #[test]
    fn test_clock_only_runs_while_playing() {
        let mut session = Session::new(GameConfig::for_kind(GameKind::LaneDodge));
        assert_eq!(session.update(FRAME), 0);

        session.start_game(GameOptions::default());
        assert_eq!(session.update(FRAME), 1);

        assert!(session.command(Command::TogglePause));
        assert_eq!(session.update(FRAME), 0);
        assert_eq!(session.update(1.0), 0);

        assert!(session.command(Command::TogglePause));
        assert_eq!(session.update(FRAME), 1);
    }

    #[test]
    fn test_long_stall_is_capped() {
        let mut session = Session::new(GameConfig::for_kind(GameKind::LaneDodge));
        session.start_game(GameOptions::default());
        assert_eq!(session.update(3.0), 6);
        assert_eq!(session.state().time_ticks, 6);
    }

    #[test]
    fn test_low_rate_session() {
        let mut config = GameConfig::for_kind(GameKind::LaneDodge);
        config.tick_hz = 30;
        let mut session = Session::new(config);
        session.start_game(GameOptions::default());
        let ticks: u32 = (0..60).map(|_| session.update(FRAME)).sum();
        assert_eq!(ticks, 30);
    }

    #[test]
    fn test_game_over_stops_ticking() {
        let mut session = Session::new(GameConfig::for_kind(GameKind::LaneDodge));
        session.start_game(GameOptions::default());
        let pos = session.state.runner_pos();
        session.state.entities.spawn(
            EntityKind::Obstacle(crate::sim::ObstacleKind::Poo),
            pos,
            Vec2::ZERO,
            20.0,
        );
        // Three frames worth of time, but the first tick ends the game
        assert_eq!(session.update(3.0 * FRAME), 1);
        assert_eq!(session.phase(), GamePhase::GameOver);
        assert_eq!(session.update(FRAME), 0);

        let events = session.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::PhaseChanged {
                to: GamePhase::GameOver,
                ..
            }
        )));
        assert!(session.drain_events().is_empty());

        assert!(session.command(Command::Restart));
        assert_eq!(session.update(FRAME), 1);
    }

    #[test]
    fn test_race_options_and_ai_cadence() {
        let mut session = Session::new(GameConfig::for_kind(GameKind::KartRace));
        assert!(session.command(Command::Start));
        assert!(session.command(Command::SelectOption(OptionValue::Difficulty(
            Difficulty::Hard
        ))));
        assert!(session.command(Command::SelectOption(OptionValue::Track(
            Track::Straightaway
        ))));
        assert_eq!(session.phase(), GamePhase::Playing);

        for _ in 0..60 {
            session.update(FRAME);
        }
        let snap = session.snapshot();
        let ai = snap.ai_racer().unwrap();
        assert!(ai.pos.y > 0.0);
        assert!(ai.vel.y <= Difficulty::Hard.ai_profile().max_speed);
    }

    #[test]
    fn test_input_drives_commands() {
        let mut session = Session::new(GameConfig::for_kind(GameKind::KartRace));
        session.start_game(GameOptions::default());
        assert!(session.handle_input(InputEvent::Dial(1.0)));
        assert!((session.state().player.speed - 0.3).abs() < 1e-6);
        assert!(session.handle_input(InputEvent::Button(Button::Left)));
        assert!(!session.handle_input(InputEvent::Button(Button::Up)));
        assert!(session.handle_input(InputEvent::Button(Button::Pause)));
        assert_eq!(session.phase(), GamePhase::Paused);
        assert!(!session.command(Command::Steer(Direction::Right)));
    }

    #[test]
    fn test_revision_moves_on_change_only() {
        let mut session = Session::new(GameConfig::for_kind(GameKind::CardMatch));
        let r0 = session.revision();
        assert!(!session.command(Command::FlipCard(0)));
        assert_eq!(session.revision(), r0);
        session.start_game(GameOptions::default());
        assert!(session.revision() > r0);
    }

    #[test]
    fn test_go_home_tears_down() {
        let mut session = Session::new(GameConfig::for_kind(GameKind::SpaceShooter));
        session.start_game(GameOptions::default());
        session.update(FRAME);
        session.go_home();
        assert_eq!(session.phase(), GamePhase::Welcome);
        assert!(session.snapshot().entities.is_empty());
        assert_eq!(session.update(FRAME), 0);
    }

    #[test]
    fn test_revision_follows_ship_move_during_cooldown() {
        let mut session = Session::new(GameConfig::for_kind(GameKind::SpaceShooter));
        session.start_game(GameOptions::default());
        assert!(session.command(Command::Shoot));
        let before = session.revision();
        assert!(session.command(Command::ShootAt(Vec2::new(50.0, 500.0))));
        assert!(session.revision() > before);
        assert_eq!(session.snapshot().player.pos.x, 50.0);
    }

    #[test]
    fn test_undrained_events_are_capped() {
        let mut session = Session::new(GameConfig::for_kind(GameKind::SpaceShooter));
        session.start_game(GameOptions::default());
        for _ in 0..2000 {
            session.command(Command::TogglePause);
        }
        let events = session.drain_events();
        assert_eq!(events.len(), sim::state::MAX_PENDING_EVENTS);
        // Oldest dropped first: the tail is still the latest toggle
        assert!(matches!(
            events.last(),
            Some(GameEvent::PhaseChanged {
                to: GamePhase::Playing,
                ..
            })
        ));
    }

    #[test]
    fn test_bad_tuning_falls_back_to_defaults() {
        let mut config = GameConfig::for_kind(GameKind::Slingshot);
        config.sling.max_target_speed = -1.0;
        let mut session = Session::new(config);
        session.start_game(GameOptions::default());
        assert_eq!(session.config().sling.max_target_speed, 3.0);
        assert_eq!(session.update(FRAME), 1);

        let mut config = GameConfig::for_kind(GameKind::FlyZapper);
        config.fly.jitter = -5.0;
        let mut session = Session::new(config);
        session.start_game(GameOptions::default());
        assert_eq!(session.update(FRAME), 1);

        let mut config = GameConfig::for_kind(GameKind::CardMatch);
        config.cards.symbols = 0;
        let mut session = Session::new(config);
        session.start_game(GameOptions::default());
        assert_eq!(session.snapshot().entities.len(), 4);
    }

    #[test]
    fn test_same_seed_same_session() {
        let run = || {
            let mut session = Session::new(GameConfig::for_kind(GameKind::Slingshot));
            session.start_game(GameOptions::default());
            let anchor = session.state().sling_anchor();
            session.handle_input(InputEvent::PointerDown(anchor));
            session.handle_input(InputEvent::PointerMove(anchor + Vec2::new(-60.0, 40.0)));
            session.handle_input(InputEvent::PointerUp(anchor + Vec2::new(-60.0, 40.0)));
            for _ in 0..240 {
                session.update(FRAME);
            }
            session.snapshot()
        };
        let a = run();
        let b = run();
        assert_eq!(a.score, b.score);
        assert_eq!(a.resource, b.resource);
        let pos = |s: &Snapshot| -> Vec<Vec2> { s.entities.iter().map(|e| e.pos).collect() };
        assert_eq!(pos(&a), pos(&b));
    }
}
