//! Authoritative entity storage and identifier allocation.

use std::collections::BTreeMap;

use maze_survival_core::{Entity, EntityId, EntityKind, EntityView, Vec2};

/// Registry that stores entities and manages identifier allocation.
///
/// Entries are kept ordered by identifier so iteration, snapshots and
/// removal passes are deterministic.
#[derive(Clone, Debug)]
pub struct EntityRegistry {
    entries: BTreeMap<EntityId, Entity>,
    next_entity_id: EntityId,
}

impl EntityRegistry {
    /// Creates an empty registry with a reset identifier counter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_entity_id: EntityId::new(0),
        }
    }

    /// Stores a new entity and returns its freshly allocated identifier.
    pub fn insert(&mut self, position: Vec2, kind: EntityKind) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id = EntityId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(id, Entity { id, position, kind });
        id
    }

    /// Looks up an entity by identifier.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entries.get(&id)
    }

    /// Mutable lookup by identifier.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entries.get_mut(&id)
    }

    /// Removes and returns an entity.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entries.remove(&id)
    }

    /// Finds the first entity matching the predicate.
    pub fn find<P>(&self, mut predicate: P) -> Option<&Entity>
    where
        P: FnMut(&Entity) -> bool,
    {
        self.entries.values().find(|entity| predicate(entity))
    }

    /// The player entity, if one has been created.
    #[must_use]
    pub fn player(&self) -> Option<&Entity> {
        self.find(|entity| entity.as_player().is_some())
    }

    /// Mutable access to the player entity.
    pub fn player_mut(&mut self) -> Option<&mut Entity> {
        self.entries
            .values_mut()
            .find(|entity| entity.as_player().is_some())
    }

    /// Altars in identifier order; the first one is the oldest.
    pub fn altars(&self) -> impl Iterator<Item = &Entity> {
        self.entries.values().filter(|entity| entity.is_altar())
    }

    /// Removes every entity rejected by the predicate, returning the removed ones
    /// in identifier order.
    pub fn drain_where<P>(&mut self, mut predicate: P) -> Vec<Entity>
    where
        P: FnMut(&Entity) -> bool,
    {
        let doomed: Vec<EntityId> = self
            .entries
            .values()
            .filter(|entity| predicate(entity))
            .map(|entity| entity.id)
            .collect();
        doomed
            .into_iter()
            .filter_map(|id| self.entries.remove(&id))
            .collect()
    }

    /// Captures a read-only snapshot of every entity.
    #[must_use]
    pub fn snapshot(&self) -> EntityView {
        EntityView::from_snapshots(self.entries.values().cloned().collect())
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}
