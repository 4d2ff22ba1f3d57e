//! Multi-input JOIN synchronization.
//!
//! A `JoinOperation` sits at one location and accumulates typed inputs.
//! When every required type's waiting queue covers its recipe count, the
//! operation fires: it atomically drains *exactly* the recipe amounts and
//! the engine creates one output entity in their place.  Partial recipes
//! never fire, and feeding a type outside the recipe is a no-op rather than
//! an error — a stray entity must not poison the barrier.

use std::collections::{BTreeMap, VecDeque};

use flow_core::EntityId;

/// A named multi-input synchronization barrier.
#[derive(Clone, Debug, Default)]
pub struct JoinOperation {
    /// Location this barrier is attached to.
    pub location: String,

    /// Entity type produced when the recipe fires.
    pub output_type: String,

    /// Required input counts per entity type.
    recipe: BTreeMap<String, u32>,

    /// Per-type waiting queues (FIFO).
    waiting: BTreeMap<String, VecDeque<EntityId>>,
}

impl JoinOperation {
    pub fn new(location: impl Into<String>, output_type: impl Into<String>) -> Self {
        Self {
            location:    location.into(),
            output_type: output_type.into(),
            recipe:      BTreeMap::new(),
            waiting:     BTreeMap::new(),
        }
    }

    /// Add `count` units of `kind` to the recipe (fluent).
    pub fn require(mut self, kind: impl Into<String>, count: u32) -> Self {
        let kind = kind.into();
        debug_assert!(count > 0, "recipe counts must be positive");
        self.recipe.insert(kind.clone(), count);
        self.waiting.entry(kind).or_default();
        self
    }

    /// Required input counts, per type.
    pub fn recipe(&self) -> &BTreeMap<String, u32> {
        &self.recipe
    }

    /// Entities of `kind` currently waiting at the barrier.
    pub fn waiting_count(&self, kind: &str) -> usize {
        self.waiting.get(kind).map_or(0, VecDeque::len)
    }

    /// Offer an entity to the barrier.
    ///
    /// Returns `false` (no-op) when `kind` is not part of the recipe.
    pub fn add_entity(&mut self, kind: &str, id: EntityId) -> bool {
        if !self.recipe.contains_key(kind) {
            return false;
        }
        self.waiting.get_mut(kind).expect("recipe keys pre-seeded").push_back(id);
        true
    }

    /// Is every required type's queue long enough to fire?
    pub fn can_execute(&self) -> bool {
        self.recipe
            .iter()
            .all(|(kind, &count)| self.waiting_count(kind) >= count as usize)
    }

    /// Fire the barrier: drain exactly the recipe counts (FIFO per type) and
    /// return the consumed ids.  Returns `None` without touching any queue
    /// when the recipe is not yet satisfied.
    pub fn execute(&mut self) -> Option<Vec<EntityId>> {
        if !self.can_execute() {
            return None;
        }
        let mut consumed = Vec::new();
        for (kind, &count) in &self.recipe {
            let queue = self.waiting.get_mut(kind).expect("recipe keys pre-seeded");
            for _ in 0..count {
                consumed.push(queue.pop_front().expect("can_execute checked the length"));
            }
        }
        Some(consumed)
    }

    /// Drop all waiting entities (used by `reset`).
    pub fn clear(&mut self) {
        for queue in self.waiting.values_mut() {
            queue.clear();
        }
    }
}
