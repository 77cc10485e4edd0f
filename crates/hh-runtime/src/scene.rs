use std::collections::BTreeMap;

use hh_core::Entity;

/// Named drawables for one run. No bounds checks: off-canvas positions are
/// kept as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneTable {
    entities: BTreeMap<String, Entity>,
}

impl SceneTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the entity under `id`.
    pub fn create(&mut self, id: impl Into<String>, entity: Entity) {
        self.entities.insert(id.into(), entity);
    }

    /// Returns false when `id` is unknown.
    pub fn update_position(&mut self, id: &str, dx: i64, dy: i64) -> bool {
        match self.entities.get_mut(id) {
            Some(entity) => {
                entity.translate(dx, dy);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn all(&self) -> impl Iterator<Item = (&str, &Entity)> {
        self.entities.iter().map(|(id, entity)| (id.as_str(), entity))
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
