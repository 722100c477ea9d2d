//! Entities and the store that owns them
//!
//! Every simulated object is an `Entity`: a position, a velocity, a collision
//! radius, a lifecycle, and a tagged `EntityKind` payload. The store keeps
//! them in spawn order, which is also collision order.

use glam::Vec2;
use serde::{Deserialize, Serialize};

const PROGRESS_EPSILON: f32 = 1e-4;

/// Falling things in the lane game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    RottenBanana,
    Poo,
    GoldenBanana,
}

impl ObstacleKind {
    /// Score change when the player runs into it
    pub fn points(&self) -> i64 {
        match self {
            ObstacleKind::RottenBanana | ObstacleKind::Poo => -10,
            ObstacleKind::GoldenBanana => 10,
        }
    }
}

/// How a flying target moves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TargetMotion {
    /// Re-aims at `goal` every tick, moving `speed` points per second
    Homing { goal: Vec2, speed: f32 },
    /// Constant velocity, reflecting off the box `[min, max]`
    Bouncing { min: Vec2, max: Vec2 },
}

/// Card payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Index of the card face (pairs share a face)
    pub face: u32,
    pub face_up: bool,
    pub matched: bool,
}

/// Entity kind plus kind-specific data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Obstacle(ObstacleKind),
    /// Wave enemy; `size` is its diameter
    Enemy { size: f32, splittable: bool },
    Bullet,
    FlyingTarget(TargetMotion),
    /// Slingshot ammo, affected by gravity
    Projectile,
    /// AI kart: `pos.x` is the lateral lane position, `pos.y` the distance
    /// travelled and `vel.y` the speed
    Racer,
    Card(Card),
}

impl EntityKind {
    pub fn is_projectile(&self) -> bool {
        matches!(self, EntityKind::Projectile)
    }
}

/// Where an entity is in its life
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Lifecycle {
    Active,
    /// Already interacted with the player; keeps moving but never collides
    Collected,
    /// Playing its death animation; purged once progress reaches 1.0
    Dying { progress: f32 },
}

/// A simulated object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    life: Lifecycle,
}

impl Entity {
    pub fn new(id: u32, kind: EntityKind, pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self {
            id,
            kind,
            pos,
            vel,
            radius,
            life: Lifecycle::Active,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.life
    }

    /// Can still take part in collisions
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self.life, Lifecycle::Active)
    }

    #[inline]
    pub fn is_dying(&self) -> bool {
        matches!(self.life, Lifecycle::Dying { .. })
    }

    #[inline]
    pub fn is_collected(&self) -> bool {
        matches!(self.life, Lifecycle::Collected)
    }

    /// Death animation progress (0 unless dying)
    pub fn progress(&self) -> f32 {
        match self.life {
            Lifecycle::Dying { progress } => progress,
            _ => 0.0,
        }
    }

    /// Mark as collected; only active entities can be collected
    pub fn mark_collected(&mut self) {
        if self.is_active() {
            self.life = Lifecycle::Collected;
        }
    }

    /// Start the death animation. A dying entity stays dying.
    pub fn mark_dying(&mut self) {
        if !self.is_dying() {
            self.life = Lifecycle::Dying { progress: 0.0 };
        }
    }

    /// Advance the death animation; returns true once it has finished
    pub fn advance_dying(&mut self, rate: f32) -> bool {
        if let Lifecycle::Dying { ref mut progress } = self.life {
            *progress = (*progress + rate.max(0.0)).min(1.0);
            // Absorb float drift so N steps of 1/N always finish
            if *progress > 1.0 - PROGRESS_EPSILON {
                *progress = 1.0;
            }
            *progress >= 1.0
        } else {
            false
        }
    }

    pub fn card(&self) -> Option<&Card> {
        match &self.kind {
            EntityKind::Card(card) => Some(card),
            _ => None,
        }
    }

    pub fn card_mut(&mut self) -> Option<&mut Card> {
        match &mut self.kind {
            EntityKind::Card(card) => Some(card),
            _ => None,
        }
    }
}

/// Hands out ids while the store is being iterated; spawned entities join
/// the store once the pass is over.
pub struct Spawner<'a> {
    next_id: &'a mut u32,
    pending: Vec<Entity>,
}

impl Spawner<'_> {
    pub fn spawn(&mut self, kind: EntityKind, pos: Vec2, vel: Vec2, radius: f32) -> u32 {
        let id = *self.next_id;
        *self.next_id += 1;
        self.pending.push(Entity::new(id, kind, pos, vel, radius));
        id
    }
}

/// All entities of one session, in spawn order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityStore {
    entities: Vec<Entity>,
    next_id: u32,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            next_id: 1,
        }
    }

    /// Add an entity right away and return its id
    pub fn spawn(&mut self, kind: EntityKind, pos: Vec2, vel: Vec2, radius: f32) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.entities.push(Entity::new(id, kind, pos, vel, radius));
        id
    }

    /// Mutate every entity in place. Spawns made through the `Spawner` are
    /// appended after the pass, so the closure only ever sees the entities
    /// that existed when the pass began.
    pub fn for_each_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut Entity, &mut Spawner<'_>),
    {
        let mut spawner = Spawner {
            next_id: &mut self.next_id,
            pending: Vec::new(),
        };
        for entity in self.entities.iter_mut() {
            f(entity, &mut spawner);
        }
        let Spawner { pending, .. } = spawner;
        if !pending.is_empty() {
            log::debug!("Deferred spawn of {} entities", pending.len());
            self.entities.extend(pending);
        }
    }

    /// Remove every entity matching `pred`; returns how many went
    pub fn remove_where<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&Entity) -> bool,
    {
        let before = self.entities.len();
        self.entities.retain(|e| !pred(e));
        before - self.entities.len()
    }

    pub fn get(&self, id: u32) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// Entities in store order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn as_slice(&self) -> &[Entity] {
        &self.entities
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of entities matching `pred`
    pub fn count_where<F>(&self, pred: F) -> usize
    where
        F: Fn(&Entity) -> bool,
    {
        self.entities.iter().filter(|e| pred(e)).count()
    }

    /// Drop every entity (ids keep counting up)
    pub fn clear(&mut self) {
        self.entities.clear();
    }
}
