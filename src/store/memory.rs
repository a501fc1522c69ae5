use crate::errors::AppResult;
use crate::models::{Entity, EntityKind, EntityRef};
use crate::store::{ObjectStore, Predicate, SortOrder};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entities: BTreeMap<EntityRef, Entity>,
    dirty: BTreeSet<EntityRef>,
    deleted: BTreeSet<EntityRef>,
    commits: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn load(&mut self, entity: Entity) {
        self.entities.insert(entity.reference(), entity);
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn commits(&self) -> u64 {
        self.commits
    }

    pub fn has_changes(&self) -> bool {
        !self.dirty.is_empty() || !self.deleted.is_empty()
    }

    /// Pending writes and deletions, left in place until [`MemoryStore::mark_committed`].
    pub(crate) fn pending_changes(&self) -> (Vec<Entity>, Vec<EntityRef>) {
        let written = self
            .dirty
            .iter()
            .filter_map(|reference| self.entities.get(reference).cloned())
            .collect();
        (written, self.deleted.iter().cloned().collect())
    }

    pub(crate) fn mark_committed(&mut self) {
        self.dirty.clear();
        self.deleted.clear();
        self.commits += 1;
    }
}

impl ObjectStore for MemoryStore {
    fn fetch(&self, kind: EntityKind, predicate: &Predicate, sort: SortOrder) -> AppResult<Vec<Entity>> {
        let mut found = self
            .entities
            .values()
            .filter(|entity| entity.kind() == kind && predicate.matches(entity))
            .cloned()
            .collect::<Vec<_>>();
        sort.apply(&mut found);
        Ok(found)
    }

    fn get(&self, reference: &EntityRef) -> AppResult<Option<Entity>> {
        Ok(self.entities.get(reference).cloned())
    }

    fn put(&mut self, entity: Entity) -> AppResult<()> {
        let reference = entity.reference();
        self.deleted.remove(&reference);
        self.dirty.insert(reference.clone());
        self.entities.insert(reference, entity);
        Ok(())
    }

    fn delete(&mut self, reference: &EntityRef) -> AppResult<bool> {
        let existed = self.entities.remove(reference).is_some();
        if existed {
            self.dirty.remove(reference);
            self.deleted.insert(reference.clone());
        }
        Ok(existed)
    }

    fn save(&mut self) -> AppResult<()> {
        let (written, deleted) = self.pending_changes();
        self.mark_committed();
        tracing::debug!(
            written = written.len(),
            deleted = deleted.len(),
            commits = self.commits,
            "memory store committed"
        );
        Ok(())
    }
}
