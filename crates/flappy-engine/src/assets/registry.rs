use std::collections::HashMap;

use crate::components::entity::Entity;

/// What a registry name refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetSlot {
    /// A single named entity (e.g. "background", "bird").
    Single(Entity),
    /// An ordered group instantiated from one or more images (e.g. "pipes").
    Collection(Vec<Entity>),
}

impl AssetSlot {
    fn reset(&mut self) {
        match self {
            AssetSlot::Single(entity) => entity.reset(),
            AssetSlot::Collection(entities) => entities.iter_mut().for_each(Entity::reset),
        }
    }

    fn entity_count(&self) -> usize {
        match self {
            AssetSlot::Single(_) => 1,
            AssetSlot::Collection(entities) => entities.len(),
        }
    }
}

/// Registry of loaded entities, keyed by asset or collection name.
/// Entities live here for the lifetime of the engine.
#[derive(Debug, Default)]
pub struct AssetRegistry {
    slots: HashMap<String, AssetSlot>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    /// Look up a single asset by name. Returns None for collections.
    pub fn get(&self, name: &str) -> Option<&Entity> {
        match self.slots.get(name) {
            Some(AssetSlot::Single(entity)) => Some(entity),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Entity> {
        match self.slots.get_mut(name) {
            Some(AssetSlot::Single(entity)) => Some(entity),
            _ => None,
        }
    }

    /// Look up a collection by name. Returns None for single assets.
    pub fn collection(&self, name: &str) -> Option<&[Entity]> {
        match self.slots.get(name) {
            Some(AssetSlot::Collection(entities)) => Some(entities),
            _ => None,
        }
    }

    pub fn collection_mut(&mut self, name: &str) -> Option<&mut [Entity]> {
        match self.slots.get_mut(name) {
            Some(AssetSlot::Collection(entities)) => Some(entities),
            _ => None,
        }
    }

    pub fn slot(&self, name: &str) -> Option<&AssetSlot> {
        self.slots.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Create an empty collection unless one already exists.
    /// Returns true if it was created. A single asset of the same name is left untouched.
    pub fn ensure_collection(&mut self, name: &str) -> bool {
        if self.slots.contains_key(name) {
            return false;
        }
        self.slots
            .insert(name.to_string(), AssetSlot::Collection(Vec::new()));
        true
    }

    /// Append an entity to an existing collection. Returns false if there is none.
    pub fn push_to_collection(&mut self, name: &str, entity: Entity) -> bool {
        match self.slots.get_mut(name) {
            Some(AssetSlot::Collection(entities)) => {
                entities.push(entity);
                true
            }
            _ => false,
        }
    }

    /// Register a single asset, replacing any previous asset of that name.
    pub fn insert_single(&mut self, name: impl Into<String>, entity: Entity) -> Option<AssetSlot> {
        self.slots.insert(name.into(), AssetSlot::Single(entity))
    }

    /// Reset every entity, single or collected, to its offset at rest.
    pub fn reset_all(&mut self) {
        self.slots.values_mut().for_each(AssetSlot::reset);
    }

    /// Iterate over all (name, slot) pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AssetSlot)> {
        self.slots.iter().map(|(name, slot)| (name.as_str(), slot))
    }

    /// Number of names in the registry.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of entities across all slots.
    pub fn entity_count(&self) -> usize {
        self.slots.values().map(AssetSlot::entity_count).sum()
    }
}
