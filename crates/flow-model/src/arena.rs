//! Entity arena.
//!
//! All entities live in one id-indexed `Vec` owned by the engine.  Locations
//! and operators refer to entities by `EntityId` only, so an entity can be
//! logically "handed over" between containers without any ownership
//! gymnastics.  Entities are never freed mid-run — retirement appends the id
//! to the completed list and the slot stays valid for statistics.

use flow_core::{EntityId, SimTime};

use crate::entity::{Entity, EntityState, Retirement};

/// Id-indexed storage for every entity created during one run.
#[derive(Default)]
pub struct EntityArena {
    entities:  Vec<Entity>,
    completed: Vec<EntityId>,
}

impl EntityArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new entity of `kind`.  Ids are monotonic and unique for
    /// the lifetime of the run.
    pub fn alloc(&mut self, kind: impl Into<String>, now: SimTime) -> EntityId {
        let id = EntityId(self.entities.len() as u32);
        self.entities.push(Entity::new(id, kind, now));
        id
    }

    #[inline]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.index())
    }

    #[inline]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id.index())
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.iter()
    }

    /// Retire `id`: mark `Completed`, stamp the completion time and reason,
    /// and append to the completed list.  The caller is responsible for
    /// removing the id from whatever container still holds it.
    pub fn retire(&mut self, id: EntityId, now: SimTime, retirement: Retirement) {
        if let Some(entity) = self.entities.get_mut(id.index()) {
            entity.set_state(now, EntityState::Completed);
            entity.completed_at = Some(now);
            entity.retirement = Some(retirement);
            entity.location = None;
            self.completed.push(id);
        }
    }

    /// Ids of all retired entities, in retirement order.
    pub fn completed_ids(&self) -> &[EntityId] {
        &self.completed
    }

    /// Entities still active (not retired).
    pub fn active(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.iter().filter(|e| !e.is_completed())
    }

    // ── Snapshots (defensive copies for UI/report collaborators) ──────────

    /// Cloned snapshot of every entity.
    pub fn snapshot(&self) -> Vec<Entity> {
        self.entities.clone()
    }

    /// Cloned snapshot of retired entities, in retirement order.
    pub fn completed_snapshot(&self) -> Vec<Entity> {
        self.completed
            .iter()
            .map(|&id| self.entities[id.index()].clone())
            .collect()
    }
}
