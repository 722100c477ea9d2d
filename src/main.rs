//! Pocket Arcade headless runner
//!
//! Plays one game on autopilot at a simulated 60 fps and prints the final
//! snapshot as JSON. Usage: `pocket-arcade [game | config.json]`.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::error::Error;

    use glam::Vec2;
    use pocket_arcade::input::{Button, InputEvent};
    use pocket_arcade::sim::race::{on_road, road_bounds};
    use pocket_arcade::sim::{Command, Direction, EntityKind, GameEvent, GamePhase, ObstacleKind};
    use pocket_arcade::{GameConfig, GameKind, GameOptions, Session};

    const FRAME_DT: f64 = 1.0 / 60.0;
    /// Give up after five simulated minutes
    const MAX_FRAMES: u64 = 60 * 60 * 5;

    fn load_config(arg: Option<String>) -> Result<GameConfig, Box<dyn Error>> {
        let Some(arg) = arg else {
            return Ok(GameConfig::for_kind(GameKind::LaneDodge));
        };
        if let Some(kind) = GameKind::from_str(&arg) {
            return Ok(GameConfig::for_kind(kind));
        }
        Ok(GameConfig::load(&arg)?)
    }

    pub fn run() -> Result<(), Box<dyn Error>> {
        env_logger::init();
        let config = load_config(std::env::args().nth(1))?;
        log::info!("Pocket Arcade (headless) playing {}", config.kind.as_str());
        log::debug!("Config: {}", config.to_json()?);

        let mut session = Session::new(config);
        session.start_game(GameOptions::default());

        let mut frame = 0;
        while frame < MAX_FRAMES && !session.phase().is_terminal() {
            autopilot(&mut session, frame);
            session.update(FRAME_DT);
            for event in session.drain_events() {
                match event {
                    GameEvent::PhaseChanged { from, to } => {
                        log::info!("frame {}: {:?} -> {:?}", frame, from, to)
                    }
                    GameEvent::LevelStarted { level } => log::info!("Level {}", level),
                    other => log::trace!("{:?}", other),
                }
            }
            if session.phase() == GamePhase::LevelComplete {
                session.command(Command::NextLevel);
            }
            frame += 1;
        }

        let snapshot = session.snapshot();
        log::info!(
            "Stopped after {} frames in {:?}, score {}",
            frame,
            snapshot.phase,
            snapshot.score
        );
        println!("{}", snapshot.to_json()?);
        Ok(())
    }

    /// Feed the session whatever a lazy player would do this frame
    fn autopilot(session: &mut Session, frame: u64) {
        let state = session.state();
        let command = match state.kind() {
            GameKind::FlyZapper => {
                if frame % 10 != 0 {
                    return;
                }
                state
                    .entities
                    .iter()
                    .find(|e| matches!(e.kind, EntityKind::FlyingTarget(_)) && e.is_active())
                    .map(|fly| Command::ShootAt(fly.pos))
            }
            GameKind::LaneDodge => {
                let runner = state.runner_pos();
                let threatened = state.entities.iter().any(|e| {
                    matches!(
                        e.kind,
                        EntityKind::Obstacle(ObstacleKind::Poo | ObstacleKind::RottenBanana)
                    ) && e.is_active()
                        && (e.pos.x - runner.x).abs() < 1.0
                        && e.pos.y > runner.y - 200.0
                        && e.pos.y < runner.y
                });
                threatened.then(|| {
                    let dir = if state.player.lane.shifted(Direction::Left) == state.player.lane {
                        Direction::Right
                    } else {
                        Direction::Left
                    };
                    Command::MoveLane(dir)
                })
            }
            GameKind::CardMatch => {
                if frame % 20 != 0 {
                    return;
                }
                let cards: Vec<_> = state
                    .entities
                    .iter()
                    .filter_map(|e| e.card().map(|c| (e.id, c)))
                    .collect();
                let wanted_face = state
                    .first_flip
                    .and_then(|id| cards.iter().find(|(cid, _)| *cid == id))
                    .map(|(_, c)| c.face);
                cards
                    .iter()
                    .position(|(_, c)| {
                        !c.matched && !c.face_up && wanted_face.is_none_or(|f| c.face == f)
                    })
                    .map(Command::FlipCard)
            }
            GameKind::SpaceShooter => {
                let lowest = state
                    .entities
                    .iter()
                    .filter(|e| matches!(e.kind, EntityKind::Enemy { .. }) && e.is_active())
                    .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                    .map(|e| e.pos.x);
                if let Some(x) = lowest {
                    session.command(Command::SteerTo(x));
                }
                session.handle_input(InputEvent::Button(Button::Fire));
                return;
            }
            GameKind::Slingshot => {
                if frame % 90 != 0 || state.projectile_in_flight() {
                    return;
                }
                let anchor = state.sling_anchor();
                let pull = anchor + Vec2::new(-70.0, 30.0 + (frame % 270) as f32 / 9.0);
                session.handle_input(InputEvent::PointerDown(anchor));
                session.handle_input(InputEvent::PointerMove(pull));
                session.handle_input(InputEvent::PointerUp(pull));
                return;
            }
            GameKind::KartRace => {
                let snapshot = session.snapshot();
                let tuning = &session.config().race;
                let bounds = road_bounds(snapshot.turn, tuning);
                let lateral = snapshot.player.lateral;
                if !on_road(lateral, bounds) || frame % 30 == 0 {
                    let dir = if on_road(tuning.left_lane, bounds) {
                        Direction::Left
                    } else {
                        Direction::Right
                    };
                    session.command(Command::Steer(dir));
                }
                if frame % 5 == 0 {
                    session.handle_input(InputEvent::Dial(0.15));
                }
                return;
            }
        };
        if let Some(command) = command {
            session.command(command);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page; nothing to run here
}
