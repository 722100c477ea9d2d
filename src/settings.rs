//! Game configuration and option presets
//!
//! Every game instance is built from a `GameConfig`: which game, how fast it
//! ticks, how big the playfield is, and the per-game tuning. Configs are plain
//! serde structs so they can be loaded from JSON.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{LOW_TICK_HZ, REFERENCE_TICK_HZ};

/// Which mini-game a session runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameKind {
    #[default]
    FlyZapper,
    LaneDodge,
    CardMatch,
    SpaceShooter,
    Slingshot,
    KartRace,
}

impl GameKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::FlyZapper => "Fly Zapper",
            GameKind::LaneDodge => "Dodge the Yuckies",
            GameKind::CardMatch => "Yucky Card Sort",
            GameKind::SpaceShooter => "Poo Space Battle",
            GameKind::Slingshot => "Sling-Poo",
            GameKind::KartRace => "Race the Loo",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fly" | "flyzapper" => Some(GameKind::FlyZapper),
            "dodge" | "lanedodge" => Some(GameKind::LaneDodge),
            "cards" | "cardmatch" => Some(GameKind::CardMatch),
            "shooter" | "spaceshooter" => Some(GameKind::SpaceShooter),
            "sling" | "slingshot" => Some(GameKind::Slingshot),
            "race" | "kartrace" => Some(GameKind::KartRace),
            _ => None,
        }
    }

    /// Option screens shown between Welcome and Playing, in order
    pub fn option_steps(&self) -> &'static [OptionStep] {
        match self {
            GameKind::LaneDodge => &[OptionStep::ViewMode],
            GameKind::KartRace => &[OptionStep::Difficulty, OptionStep::Track],
            GameKind::SpaceShooter => &[OptionStep::Weapon],
            GameKind::FlyZapper | GameKind::CardMatch | GameKind::Slingshot => &[],
        }
    }
}

/// One option-selection screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionStep {
    ViewMode,
    Difficulty,
    Track,
    Weapon,
}

/// AI racer difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// AI racer parameters derived from a difficulty
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AiProfile {
    /// Roll threshold: the AI accelerates when a uniform roll in [0, 1] exceeds it
    pub accel_chance: f32,
    /// Speed added per successful roll
    pub accel: f32,
    /// Speed cap for the AI racer
    pub max_speed: f32,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn ai_profile(&self) -> AiProfile {
        match self {
            Difficulty::Easy => AiProfile {
                accel_chance: 0.6,
                accel: 0.03,
                max_speed: 0.8,
            },
            Difficulty::Medium => AiProfile {
                accel_chance: 0.4,
                accel: 0.05,
                max_speed: 0.9,
            },
            Difficulty::Hard => AiProfile {
                accel_chance: 0.10,
                accel: 0.075,
                max_speed: 1.6,
            },
        }
    }
}

/// Race track layout (shape of the turn curve)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Track {
    #[default]
    Straightaway,
    SCurve,
    Hairpin,
    Chicane,
}

impl Track {
    pub fn as_str(&self) -> &'static str {
        match self {
            Track::Straightaway => "Straightaway",
            Track::SCurve => "S-Curve",
            Track::Hairpin => "Hairpin",
            Track::Chicane => "Chicane",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "straightaway" | "straight" => Some(Track::Straightaway),
            "scurve" | "s-curve" => Some(Track::SCurve),
            "hairpin" => Some(Track::Hairpin),
            "chicane" => Some(Track::Chicane),
            _ => None,
        }
    }
}

/// Camera style for the lane game (cosmetic only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewMode {
    #[default]
    #[serde(rename = "2D")]
    TwoD,
    #[serde(rename = "3D")]
    ThreeD,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::TwoD => "2D",
            ViewMode::ThreeD => "3D",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "2d" => Some(ViewMode::TwoD),
            "3d" => Some(ViewMode::ThreeD),
            _ => None,
        }
    }
}

/// Space shooter weapon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Weapon {
    #[default]
    MachineGun,
    YokeShooter,
}

impl Weapon {
    pub fn as_str(&self) -> &'static str {
        match self {
            Weapon::MachineGun => "Machine Gun",
            Weapon::YokeShooter => "Yoke Shooter",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "machinegun" | "machine-gun" => Some(Weapon::MachineGun),
            "yokeshooter" | "yoke-shooter" | "yoke" => Some(Weapon::YokeShooter),
            _ => None,
        }
    }

    /// Whether hits from this weapon split large enemies
    pub fn splits_on_hit(&self) -> bool {
        matches!(self, Weapon::YokeShooter)
    }
}

/// A value chosen on an option screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionValue {
    ViewMode(ViewMode),
    Difficulty(Difficulty),
    Track(Track),
    Weapon(Weapon),
}

impl OptionValue {
    /// The option screen this value answers
    pub fn step(&self) -> OptionStep {
        match self {
            OptionValue::ViewMode(_) => OptionStep::ViewMode,
            OptionValue::Difficulty(_) => OptionStep::Difficulty,
            OptionValue::Track(_) => OptionStep::Track,
            OptionValue::Weapon(_) => OptionStep::Weapon,
        }
    }
}

/// Options picked before a game starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameOptions {
    pub difficulty: Difficulty,
    pub track: Track,
    pub view_mode: ViewMode,
    pub weapon: Weapon,
}

impl GameOptions {
    /// Record a selected option value
    pub fn apply(&mut self, value: OptionValue) {
        match value {
            OptionValue::ViewMode(v) => self.view_mode = v,
            OptionValue::Difficulty(d) => self.difficulty = d,
            OptionValue::Track(t) => self.track = t,
            OptionValue::Weapon(w) => self.weapon = w,
        }
    }
}

/// Fly Zapper tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlyTuning {
    /// Starting fly speed (points per second)
    pub start_speed: f32,
    /// Speed added per zap
    pub speed_per_zap: f32,
    /// Tap distance that counts as a zap
    pub zap_radius: f32,
    /// Fly-to-goal distance that ends the game
    pub goal_radius: f32,
    /// Random horizontal jitter of the fly's heading
    pub jitter: f32,
    /// Goal distance above the bottom edge
    pub goal_inset: f32,
    /// Fly spawn margin from the side edges / top
    pub spawn_margin: f32,
}

impl Default for FlyTuning {
    fn default() -> Self {
        Self {
            start_speed: 100.0,
            speed_per_zap: 20.0,
            zap_radius: 50.0,
            goal_radius: 40.0,
            jitter: 80.0,
            goal_inset: 50.0,
            spawn_margin: 40.0,
        }
    }
}

/// Lane dodge tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DodgeTuning {
    pub start_speed: f32,
    pub max_speed: f32,
    /// Speed added each time distance crosses `speed_up_every`
    pub speed_step: f32,
    pub speed_up_every: f32,
    /// Spawn threshold is `spawn_base / speed` ticks
    pub spawn_base: f32,
    /// Jump progress added per tick
    pub jump_rate: f32,
    /// Jump progress window `(start, end)` in which obstacles can't hit
    pub invulnerable_window: (f32, f32),
    /// Player line above the bottom edge
    pub player_inset: f32,
    pub player_radius: f32,
    pub obstacle_radius: f32,
    /// Spawn line above the top edge
    pub spawn_y: f32,
    /// Off-screen margin below the bottom edge before purge
    pub purge_margin: f32,
    pub golden_chance: f32,
    pub rotten_chance: f32,
}

impl Default for DodgeTuning {
    fn default() -> Self {
        Self {
            start_speed: 5.0,
            max_speed: 15.0,
            speed_step: 0.01,
            speed_up_every: 100.0,
            spawn_base: 1200.0,
            jump_rate: 0.04,
            invulnerable_window: (0.2, 0.8),
            player_inset: 150.0,
            player_radius: 20.0,
            obstacle_radius: 20.0,
            spawn_y: -50.0,
            purge_margin: 50.0,
            golden_chance: 0.15,
            rotten_chance: 0.45,
        }
    }
}

/// Card matching tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CardTuning {
    /// Number of distinct card faces available
    pub symbols: u32,
    pub pairs_per_level: u32,
    pub max_level: u32,
    /// Seconds a mismatched pair stays face up
    pub mismatch_delay: f32,
    /// Seconds between the last match and the level-complete screen
    pub clear_delay: f32,
}

impl Default for CardTuning {
    fn default() -> Self {
        Self {
            symbols: 16,
            pairs_per_level: 2,
            max_level: 10,
            mismatch_delay: 0.8,
            clear_delay: 1.0,
        }
    }
}

/// Space shooter tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShooterTuning {
    pub lives: u32,
    pub ship_inset: f32,
    pub ship_radius: f32,
    /// Horizontal step for a discrete steer command
    pub ship_step: f32,
    pub bullet_speed: f32,
    pub bullet_radius: f32,
    pub machine_gun_cooldown: u32,
    pub yoke_cooldown: u32,
    pub enemy_size: f32,
    /// Enemies at or below this size die instead of splitting
    pub split_floor: f32,
    pub columns: u32,
    pub max_rows: u32,
    pub formation_speed: f32,
    pub speed_per_level: f32,
    pub step_down: f32,
    /// Lateral margin at which the formation turns around
    pub side_margin: f32,
    pub kill_points: i64,
    pub split_points: i64,
    pub max_level: u32,
    /// Ticks between a cleared wave and the next one
    pub breather_ticks: u32,
    /// Ticks a hit enemy takes to disappear
    pub death_ticks: u32,
}

impl Default for ShooterTuning {
    fn default() -> Self {
        Self {
            lives: 3,
            ship_inset: 60.0,
            ship_radius: 16.0,
            ship_step: 20.0,
            bullet_speed: 8.0,
            bullet_radius: 4.0,
            machine_gun_cooldown: 6,
            yoke_cooldown: 18,
            enemy_size: 40.0,
            split_floor: 20.0,
            columns: 5,
            max_rows: 4,
            formation_speed: 1.0,
            speed_per_level: 0.25,
            step_down: 20.0,
            side_margin: 20.0,
            kill_points: 10,
            split_points: 5,
            max_level: 10,
            breather_ticks: 90,
            death_ticks: 20,
        }
    }
}

/// Slingshot tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlingTuning {
    pub gravity: f32,
    pub max_pull: f32,
    pub launch_scale: f32,
    /// Soaps per level
    pub soaps: u32,
    pub soap_radius: f32,
    pub target_radius: f32,
    /// Pointer distance from the anchor that starts aiming
    pub grab_radius: f32,
    pub base_targets: u32,
    pub max_targets: u32,
    pub max_target_speed: f32,
    /// Spin-out progress added per tick after a hit
    pub hit_anim_rate: f32,
    pub points_per_level: i64,
    /// Anchor position as (fraction of width, inset from bottom)
    pub anchor: (f32, f32),
    /// Ticks of the level-complete pause
    pub breather_ticks: u32,
}

impl Default for SlingTuning {
    fn default() -> Self {
        Self {
            gravity: 0.3,
            max_pull: 100.0,
            launch_scale: 0.15,
            soaps: 3,
            soap_radius: 15.0,
            target_radius: 15.0,
            grab_radius: 150.0,
            base_targets: 5,
            max_targets: 15,
            max_target_speed: 3.0,
            hit_anim_rate: 0.05,
            points_per_level: 10,
            anchor: (0.2, 100.0),
            breather_ticks: 30,
        }
    }
}

/// Kart race tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceTuning {
    pub finish_distance: f32,
    pub decay: f32,
    pub player_max_speed: f32,
    /// Speed added per unit of dial rotation
    pub dial_gain: f32,
    pub brake: f32,
    pub left_lane: f32,
    pub right_lane: f32,
    /// Roll threshold for the AI to switch lanes
    pub lane_change_chance: f32,
    /// Road half-width in lateral units
    pub road_half_width: f32,
    /// Lateral road shift per unit of turn amount
    pub turn_shift: f32,
    /// Below this speed leaving the road is harmless
    pub crash_speed: f32,
}

impl Default for RaceTuning {
    fn default() -> Self {
        Self {
            finish_distance: 500.0,
            decay: 0.98,
            player_max_speed: 1.5,
            dial_gain: 0.3,
            brake: 0.25,
            left_lane: 0.3,
            right_lane: 0.7,
            lane_change_chance: 0.7,
            road_half_width: 0.25,
            turn_shift: 0.1,
            crash_speed: 0.1,
        }
    }
}

/// Everything needed to build a game session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub kind: GameKind,
    /// Physics rate, 60 or 30 Hz
    pub tick_hz: u32,
    /// Run seed for reproducibility
    pub seed: u64,
    /// Playfield size in points (width, height)
    pub playfield: Vec2,
    pub options: GameOptions,
    pub fly: FlyTuning,
    pub dodge: DodgeTuning,
    pub cards: CardTuning,
    pub shooter: ShooterTuning,
    pub sling: SlingTuning,
    pub race: RaceTuning,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            kind: GameKind::default(),
            tick_hz: REFERENCE_TICK_HZ,
            seed: 0x5EED,
            playfield: Vec2::new(400.0, 800.0),
            options: GameOptions::default(),
            fly: FlyTuning::default(),
            dodge: DodgeTuning::default(),
            cards: CardTuning::default(),
            shooter: ShooterTuning::default(),
            sling: SlingTuning::default(),
            race: RaceTuning::default(),
        }
    }
}

/// Errors from loading a configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported tick rate {0} Hz (expected 60 or 30)")]
    TickRate(u32),
    #[error("playfield must be positive and finite, got {0}x{1}")]
    Playfield(f32, f32),
    #[error("invalid tuning value {field} = {value}")]
    Tuning { field: &'static str, value: f32 },
}

/// Finite and accepted by `ok`, or a `Tuning` error naming the field
fn require(
    field: &'static str,
    value: f32,
    ok: impl Fn(f32) -> bool,
) -> Result<(), ConfigError> {
    if value.is_finite() && ok(value) {
        Ok(())
    } else {
        Err(ConfigError::Tuning { field, value })
    }
}

fn positive(v: f32) -> bool {
    v > 0.0
}

fn non_negative(v: f32) -> bool {
    v >= 0.0
}

fn unit(v: f32) -> bool {
    (0.0..=1.0).contains(&v)
}

impl FlyTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require("fly.start_speed", self.start_speed, non_negative)?;
        require("fly.speed_per_zap", self.speed_per_zap, non_negative)?;
        require("fly.zap_radius", self.zap_radius, non_negative)?;
        require("fly.goal_radius", self.goal_radius, non_negative)?;
        require("fly.jitter", self.jitter, non_negative)?;
        require("fly.goal_inset", self.goal_inset, |_| true)?;
        require("fly.spawn_margin", self.spawn_margin, non_negative)
    }
}

impl DodgeTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require("dodge.start_speed", self.start_speed, positive)?;
        require("dodge.max_speed", self.max_speed, |v| v >= self.start_speed)?;
        require("dodge.speed_step", self.speed_step, non_negative)?;
        require("dodge.speed_up_every", self.speed_up_every, positive)?;
        require("dodge.spawn_base", self.spawn_base, positive)?;
        require("dodge.jump_rate", self.jump_rate, positive)?;
        require("dodge.invulnerable_window", self.invulnerable_window.0, unit)?;
        require("dodge.invulnerable_window", self.invulnerable_window.1, unit)?;
        require("dodge.player_radius", self.player_radius, non_negative)?;
        require("dodge.obstacle_radius", self.obstacle_radius, non_negative)?;
        require("dodge.spawn_y", self.spawn_y, |_| true)?;
        require("dodge.purge_margin", self.purge_margin, non_negative)?;
        require("dodge.golden_chance", self.golden_chance, unit)?;
        require("dodge.rotten_chance", self.rotten_chance, unit)?;
        require(
            "dodge.golden_chance + rotten_chance",
            self.golden_chance + self.rotten_chance,
            unit,
        )
    }
}

impl CardTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require("cards.symbols", self.symbols as f32, positive)?;
        require("cards.pairs_per_level", self.pairs_per_level as f32, positive)?;
        require("cards.max_level", self.max_level as f32, positive)?;
        require("cards.mismatch_delay", self.mismatch_delay, non_negative)?;
        require("cards.clear_delay", self.clear_delay, non_negative)
    }
}

impl ShooterTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require("shooter.lives", self.lives as f32, positive)?;
        require("shooter.ship_radius", self.ship_radius, non_negative)?;
        require("shooter.ship_step", self.ship_step, non_negative)?;
        require("shooter.bullet_speed", self.bullet_speed, positive)?;
        require("shooter.bullet_radius", self.bullet_radius, non_negative)?;
        require("shooter.enemy_size", self.enemy_size, positive)?;
        require("shooter.split_floor", self.split_floor, non_negative)?;
        require("shooter.formation_speed", self.formation_speed, non_negative)?;
        require("shooter.speed_per_level", self.speed_per_level, non_negative)?;
        require("shooter.step_down", self.step_down, non_negative)?;
        require("shooter.side_margin", self.side_margin, non_negative)?;
        require("shooter.max_level", self.max_level as f32, positive)
    }
}

impl SlingTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require("sling.gravity", self.gravity, non_negative)?;
        require("sling.max_pull", self.max_pull, positive)?;
        require("sling.launch_scale", self.launch_scale, positive)?;
        require("sling.soaps", self.soaps as f32, positive)?;
        require("sling.soap_radius", self.soap_radius, non_negative)?;
        require("sling.target_radius", self.target_radius, non_negative)?;
        require("sling.grab_radius", self.grab_radius, positive)?;
        require("sling.max_target_speed", self.max_target_speed, non_negative)?;
        require("sling.hit_anim_rate", self.hit_anim_rate, positive)?;
        require("sling.anchor", self.anchor.0, unit)?;
        require("sling.anchor", self.anchor.1, non_negative)
    }
}

impl RaceTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require("race.finish_distance", self.finish_distance, positive)?;
        require("race.decay", self.decay, |v| v > 0.0 && v <= 1.0)?;
        require("race.player_max_speed", self.player_max_speed, positive)?;
        require("race.dial_gain", self.dial_gain, positive)?;
        require("race.brake", self.brake, non_negative)?;
        require("race.left_lane", self.left_lane, unit)?;
        require("race.right_lane", self.right_lane, unit)?;
        require("race.lane_change_chance", self.lane_change_chance, unit)?;
        require("race.road_half_width", self.road_half_width, positive)?;
        require("race.turn_shift", self.turn_shift, |_| true)?;
        require("race.crash_speed", self.crash_speed, non_negative)
    }
}

impl GameConfig {
    /// Default config for a given game
    pub fn for_kind(kind: GameKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Multiplier converting 60 Hz per-tick tunings to this config's tick rate
    pub fn speed_scale(&self) -> f32 {
        REFERENCE_TICK_HZ as f32 / self.tick_hz as f32
    }

    /// Convert seconds to whole ticks at this config's rate
    pub fn secs_to_ticks(&self, secs: f32) -> u32 {
        (secs * self.tick_hz as f32).round().max(0.0) as u32
    }

    /// Check the values the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_hz != REFERENCE_TICK_HZ && self.tick_hz != LOW_TICK_HZ {
            return Err(ConfigError::TickRate(self.tick_hz));
        }
        let Vec2 { x, y } = self.playfield;
        if !(x.is_finite() && y.is_finite() && x > 0.0 && y > 0.0) {
            return Err(ConfigError::Playfield(x, y));
        }
        self.fly.validate()?;
        self.dodge.validate()?;
        self.cards.validate()?;
        self.shooter.validate()?;
        self.sling.validate()?;
        self.race.validate()
    }

    /// Replace every invalid part of the config with its default, so a
    /// session built from hand-edited fields can't panic or stall
    pub fn sanitized(mut self) -> Self {
        let defaults = GameConfig::default();
        if self.tick_hz != REFERENCE_TICK_HZ && self.tick_hz != LOW_TICK_HZ {
            log::warn!(
                "Tick rate {} Hz unsupported, using {}",
                self.tick_hz,
                defaults.tick_hz
            );
            self.tick_hz = defaults.tick_hz;
        }
        let Vec2 { x, y } = self.playfield;
        if !(x.is_finite() && y.is_finite() && x > 0.0 && y > 0.0) {
            log::warn!("Playfield {}x{} invalid, using default", x, y);
            self.playfield = defaults.playfield;
        }
        fn reset<T>(block: &mut T, default: T, check: fn(&T) -> Result<(), ConfigError>) {
            if let Err(err) = check(block) {
                log::warn!("{}; using default tuning", err);
                *block = default;
            }
        }
        reset(&mut self.fly, defaults.fly, FlyTuning::validate);
        reset(&mut self.dodge, defaults.dodge, DodgeTuning::validate);
        reset(&mut self.cards, defaults.cards, CardTuning::validate);
        reset(&mut self.shooter, defaults.shooter, ShooterTuning::validate);
        reset(&mut self.sling, defaults.sling, SlingTuning::validate);
        reset(&mut self.race, defaults.race, RaceTuning::validate);
        self
    }

    /// Parse and validate a JSON config (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&json)?;
        log::info!(
            "Loaded {} config from {}",
            config.kind.as_str(),
            path.as_ref().display()
        );
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
